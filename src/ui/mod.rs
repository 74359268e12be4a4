use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender};
use eframe::{
    egui::{
        self, menu, Button, CentralPanel, Context, Frame, Key, Layout, RichText, ScrollArea,
        Separator, SidePanel, Slider, TextStyle, TopBottomPanel,
    },
    emath::Align,
    epaint::Color32,
    App, CreationContext,
};
use tracing::{error, info};

use crate::back::{
    api::{MarketApi, MarketSource},
    message::{ToBackend, ToFrontend},
    Back,
};

pub mod calculator;
pub mod chart;
pub mod format;
pub mod panels;
pub mod render;
pub mod session;
pub mod setting;
pub mod theme;

use calculator::{CalculatorInputs, ReturnsText};
use session::Session;
use setting::Setting;

const CHART_HEIGHT: f32 = 260.0;

pub struct DashboardApp {
    setting: Setting,
    session: Session,
    calculator: CalculatorInputs,
    returns: ReturnsText,
    editing_url: String,
    // Data transferring
    front_tx: Option<Sender<ToBackend>>,
    back_rx: Option<Receiver<ToFrontend>>,
}

impl DashboardApp {
    pub fn new(cc: &CreationContext) -> Self {
        theme::configure_style(&cc.egui_ctx);
        let setting: Setting = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let mut new_app = Self::with_setting(setting);
        new_app.start_backend();
        new_app
    }

    /// App state without a running poller.
    pub fn with_setting(setting: Setting) -> Self {
        let calculator = CalculatorInputs::default();
        let returns = calculator.returns().formatted();
        Self {
            editing_url: setting.base_url.clone(),
            setting,
            session: Session::new(),
            calculator,
            returns,
            front_tx: None,
            back_rx: None,
        }
    }

    fn start_backend(&mut self) {
        let source: Arc<dyn MarketSource> =
            match MarketApi::new(&self.setting.base_url, self.setting.timeout()) {
                Ok(api) => Arc::new(api),
                Err(e) => {
                    error!("cannot start poller for {} : {}", self.setting.base_url, e);
                    return;
                }
            };
        let (front_tx, front_rx) = crossbeam::channel::unbounded();
        let (back_tx, back_rx) = crossbeam::channel::unbounded();
        let poll_interval = self.setting.poll_interval();
        let chart_interval = self.setting.chart_poll_interval();
        thread::spawn(move || {
            Back::new(source, back_tx, front_rx, poll_interval, chart_interval).run()
        });
        info!("polling {}", self.setting.base_url);
        self.front_tx = Some(front_tx);
        self.back_rx = Some(back_rx);
        self.session.reset_epochs();
        if let Some(symbol) = self.session.current_symbol() {
            self.send(ToBackend::SelectSymbol(symbol.to_string()));
        }
    }

    fn stop_backend(&mut self) {
        self.send(ToBackend::Shutdown);
        self.front_tx = None;
        self.back_rx = None;
    }

    fn restart_backend(&mut self) {
        self.stop_backend();
        self.start_backend();
    }

    /// Applies the edited base URL and timeout by restarting the poller.
    fn reconnect(&mut self) {
        self.setting.base_url = self.editing_url.trim().to_string();
        self.restart_backend();
    }

    fn send(&self, message: ToBackend) {
        if let Some(tx) = &self.front_tx {
            if let Err(e) = tx.send(message) {
                error!("send ToBackend msg failed : {}", e);
            }
        }
    }

    fn drain_backend(&mut self) {
        let messages: Vec<ToFrontend> = match &self.back_rx {
            Some(rx) => rx.try_iter().collect(),
            None => return,
        };
        for message in messages {
            match message {
                ToFrontend::Snapshot(snapshot) => {
                    if let Some(symbol) = self.session.apply_snapshot(snapshot) {
                        self.send(ToBackend::SelectSymbol(symbol));
                    }
                }
                ToFrontend::History(history) => {
                    self.session.apply_history(history);
                }
                ToFrontend::DataFailed(epoch) => self.session.apply_failure(epoch),
            }
        }
    }

    fn render_top_panel(&mut self, ctx: &Context) {
        TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(2.0);
            menu::bar(ui, |ui| {
                ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                    ui.label(
                        RichText::new("📈 RSE Market Dashboard")
                            .text_style(TextStyle::Heading)
                            .color(theme::ACCENT),
                    );
                });
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    let config_btn = ui.add(Button::new(
                        RichText::new("🛠")
                            .text_style(TextStyle::Body)
                            .color(Color32::LIGHT_BLUE),
                    ));
                    if config_btn.clicked() {
                        self.setting.open = !self.setting.open
                    }

                    let refresh_btn = ui.add(Button::new(
                        RichText::new("🔄")
                            .text_style(TextStyle::Body)
                            .color(Color32::GREEN),
                    ));
                    if refresh_btn.clicked() {
                        self.send(ToBackend::Refresh);
                    }

                    let status = match (self.session.last_updated(), self.session.is_stale()) {
                        (_, true) => RichText::new("⚠ stale").color(Color32::YELLOW),
                        (Some(at), false) => {
                            RichText::new(format!("updated {}", at.format("%-I:%M:%S %p")))
                                .color(theme::SECONDARY)
                        }
                        (None, false) => RichText::new("connecting…").color(theme::SECONDARY),
                    };
                    ui.label(status);
                });
            });
            ui.add_space(2.0);
        });
    }

    fn setting_panel(&mut self, ctx: &Context) {
        if !self.setting.open {
            return;
        }
        SidePanel::right("setting")
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.label(RichText::new("⚙ setting").color(Color32::LIGHT_BLUE));
                ui.add(Separator::default().spacing(4.0));

                ui.horizontal(|ui| {
                    ui.label(RichText::new("🕘 data").color(Color32::GREEN));
                    let slider = ui.add(Slider::new(&mut self.setting.interval, 1..=60).suffix(" s"));
                    if slider.changed() {
                        self.send(ToBackend::SetInterval(self.setting.interval));
                    }
                });
                ui.horizontal(|ui| {
                    ui.label(RichText::new("🕘 chart").color(Color32::GREEN));
                    let slider =
                        ui.add(Slider::new(&mut self.setting.chart_interval, 1..=60).suffix(" s"));
                    if slider.changed() {
                        self.send(ToBackend::SetChartInterval(self.setting.chart_interval));
                    }
                });
                ui.add(Separator::default().spacing(4.0));

                ui.label(RichText::new("🌐 backend").color(Color32::LIGHT_GRAY));
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.editing_url).desired_width(f32::INFINITY),
                );
                ui.horizontal(|ui| {
                    ui.label("timeout");
                    ui.add(Slider::new(&mut self.setting.request_timeout, 1..=60).suffix(" s"))
                        .on_hover_text("applied on reconnect");
                });
                let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
                let clicked = ui.button("reconnect").clicked();
                if submitted || clicked {
                    self.reconnect();
                }
            });
    }

    fn render_dashboard(&mut self, ui: &mut egui::Ui) {
        ScrollArea::vertical().show(ui, |ui| {
            panels::section(ui, "Market Overview");
            panels::stat_cards(ui, &self.session.view().stat_cards);

            panels::section(ui, "Top Movers");
            panels::top_movers(ui, &self.session.view().top_movers);

            ui.horizontal(|ui| {
                panels::section(ui, "Price History");
                ui.add_space(12.0);
                if let Some(symbol) = panels::symbol_selector(ui, &self.session.view().options) {
                    if self.session.select(&symbol) {
                        self.send(ToBackend::SelectSymbol(symbol));
                    }
                }
            });
            Frame::dark_canvas(ui.style()).show(ui, |ui| {
                self.session.chart().show(ui, CHART_HEIGHT);
            });

            panels::section(ui, "Equities");
            panels::stock_table(ui, &self.session.view().stock_rows);

            panels::section(ui, "Bonds");
            panels::bond_table(ui, &self.session.view().bond_rows);

            panels::section(ui, "Investment Calculator");
            if panels::calculator(ui, &mut self.calculator, &self.returns) {
                self.returns = self.calculator.returns().formatted();
            }
            ui.add_space(12.0);
        });
    }
}

impl App for DashboardApp {
    fn update(&mut self, ctx: &eframe::egui::Context, _frame: &mut eframe::Frame) {
        self.drain_backend();
        self.render_top_panel(ctx);
        self.setting_panel(ctx);
        CentralPanel::default().show(ctx, |ui| {
            self.render_dashboard(ui);
        });
        ctx.request_repaint_after(Duration::from_millis(200));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.setting);
    }
}

impl Drop for DashboardApp {
    fn drop(&mut self) {
        self.stop_backend();
    }
}
