//! Paints a `DashboardView` with egui widgets.

use eframe::{
    egui::{self, ComboBox, Frame, Label, Layout, RichText, TextEdit, Ui},
    emath::Align,
};
use egui_extras::{Column, TableBuilder};

use super::calculator::{CalculatorInputs, ReturnsText};
use super::render::{Availability, BondRow, MoverCard, StatCard, StockRow, SymbolOption, BUY_URL};
use super::theme::{tone_color, ACCENT, CARD, POSITIVE, SECONDARY};

const ROW_HEIGHT: f32 = 20.0;

fn card<R>(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui) -> R) -> R {
    Frame::group(ui.style())
        .fill(CARD)
        .show(ui, |ui| {
            ui.set_min_width(160.0);
            add_contents(ui)
        })
        .inner
}

pub fn section(ui: &mut Ui, title: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(title).heading().color(egui::Color32::WHITE));
    ui.add_space(4.0);
}

pub fn stat_cards(ui: &mut Ui, cards: &[StatCard]) {
    ui.horizontal_wrapped(|ui| {
        for stat in cards {
            card(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(&stat.label).small().color(SECONDARY));
                    ui.label(RichText::new(&stat.value).strong().size(18.0).color(ACCENT));
                });
            });
        }
    });
}

pub fn top_movers(ui: &mut Ui, cards: &[MoverCard]) {
    ui.horizontal_wrapped(|ui| {
        for mover in cards {
            card(ui, |ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.label(RichText::new(&mover.symbol).strong());
                            ui.label(RichText::new(&mover.name).small().color(SECONDARY));
                        });
                        ui.with_layout(Layout::right_to_left(Align::TOP), |ui| {
                            ui.label(
                                RichText::new(&mover.change)
                                    .strong()
                                    .color(tone_color(mover.tone)),
                            );
                        });
                    });
                    ui.label(RichText::new(&mover.price).size(20.0).strong());
                });
            });
        }
    });
}

/// Returns the symbol the user picked this frame, if any.
pub fn symbol_selector(ui: &mut Ui, options: &[SymbolOption]) -> Option<String> {
    let selected_text = options
        .iter()
        .find(|o| o.selected)
        .map(|o| o.label.as_str())
        .unwrap_or("Select a stock");
    let mut chosen = None;
    ComboBox::from_id_salt("stock_select")
        .width(240.0)
        .selected_text(selected_text)
        .show_ui(ui, |ui| {
            for option in options {
                if ui.selectable_label(option.selected, &option.label).clicked() {
                    chosen = Some(option.value.clone());
                }
            }
        });
    chosen
}

pub fn stock_table(ui: &mut Ui, rows: &[StockRow]) {
    ui.push_id("stocks_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(Column::auto().at_least(70.0))
            .column(Column::auto().at_least(180.0))
            .columns(Column::auto().at_least(80.0), 4)
            .column(Column::remainder())
            .header(ROW_HEIGHT, |mut header| {
                for title in ["Symbol", "Name", "Price", "Change", "Volume", "Status", ""] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for stock in rows {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.label(RichText::new(&stock.symbol).strong().color(ACCENT));
                        });
                        row.col(|ui| {
                            ui.add(Label::new(&stock.name).truncate());
                        });
                        row.col(|ui| {
                            ui.label(&stock.price);
                        });
                        row.col(|ui| {
                            ui.label(RichText::new(&stock.change).color(tone_color(stock.tone)));
                        });
                        row.col(|ui| {
                            ui.label(&stock.volume);
                        });
                        row.col(|ui| {
                            let color = match stock.availability {
                                Availability::Active => POSITIVE,
                                Availability::Inactive => SECONDARY,
                            };
                            ui.label(RichText::new(stock.availability.label()).color(color));
                        });
                        row.col(|ui| {
                            ui.hyperlink_to("Buy", BUY_URL);
                        });
                    });
                }
            });
    });
}

pub fn bond_table(ui: &mut Ui, rows: &[BondRow]) {
    ui.push_id("bonds_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(Column::auto().at_least(160.0))
            .columns(Column::auto().at_least(90.0), 3)
            .column(Column::remainder())
            .header(ROW_HEIGHT, |mut header| {
                for title in ["Security", "Coupon", "Maturity", "Price", "Yield"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for bond in rows {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.label(RichText::new(&bond.security).strong());
                        });
                        for cell in [&bond.coupon, &bond.maturity, &bond.price, &bond.yield_percentage] {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
}

/// Returns `true` when any field was edited this frame.
pub fn calculator(ui: &mut Ui, inputs: &mut CalculatorInputs, returns: &ReturnsText) -> bool {
    let mut changed = false;
    egui::Grid::new("calculator_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for (label, field, hint) in [
                ("Amount (RWF)", &mut inputs.amount, "1000000"),
                ("Duration (years)", &mut inputs.duration, "2"),
                ("Annual rate (%)", &mut inputs.rate, "10"),
            ] {
                ui.label(RichText::new(label).color(SECONDARY));
                changed |= ui
                    .add(TextEdit::singleline(field).hint_text(hint).desired_width(160.0))
                    .changed();
                ui.end_row();
            }
            for (label, value) in [
                ("Total interest", &returns.interest),
                ("Monthly income", &returns.monthly),
                ("Total return", &returns.total),
            ] {
                ui.label(RichText::new(label).color(SECONDARY));
                ui.label(RichText::new(value).strong().color(ACCENT));
                ui.end_row();
            }
        });
    changed
}
