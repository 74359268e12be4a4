pub mod back;
pub mod ui;
