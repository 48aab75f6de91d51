use std::{path::PathBuf, time::Duration};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{domain::MessageCatalog, protocol::SETTINGS_STORE_ID};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiErrorCategory, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{reduce, ViewState};

const APP_DIR_NAME: &str = "rotary_counter";
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    pub data_dir: Option<PathBuf>,
    pub serialize_counter_calls: bool,
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_root: PathBuf,
    pub db_path: PathBuf,
    pub settings_path: PathBuf,
}

impl AppPaths {
    pub fn from_startup(startup: &StartupConfig) -> anyhow::Result<Self> {
        let root = if let Some(p) = &startup.data_dir {
            p.clone()
        } else {
            let base = dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("unable to resolve local app data dir"))?;
            base.join(APP_DIR_NAME)
        };

        Ok(Self {
            db_path: root.join("app.db"),
            settings_path: root.join(SETTINGS_STORE_ID),
            data_root: root,
        })
    }
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Counter => "Counter",
        UiErrorCategory::Storage => "Settings",
        UiErrorCategory::Startup => "Startup",
        UiErrorCategory::Unknown => "Error",
    }
}

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: ViewState,
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        catalog: MessageCatalog,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            view: ViewState::new(catalog),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            reduce(&mut self.view, event);
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.view.status);
    }

    fn show_error_banner(&mut self, ctx: &egui::Context) {
        let Some(banner) = &self.view.banner else {
            return;
        };
        let text = format!("{}: {}", err_label(banner.category()), banner.message());
        let mut dismissed = false;
        egui::TopBottomPanel::top("error_banner").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(ui.visuals().error_fg_color, text);
                if ui.small_button("Dismiss").clicked() {
                    dismissed = true;
                }
            });
        });
        if dismissed {
            self.view.banner = None;
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.view.status).weak());
                if self.view.counter_busy() {
                    ui.spinner();
                }
            });
        });
    }

    fn show_main(&mut self, ctx: &egui::Context) {
        let message = self.view.message_text().to_string();
        let counter = self.view.counter_text();
        let mut clicked = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                ui.heading(message);
                ui.add_space(8.0);
                if ui.button("Change message").clicked() {
                    clicked = Some(BackendCommand::ChangeMessage);
                }

                ui.add_space(32.0);
                ui.label(egui::RichText::new(counter).size(48.0).strong());
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("−").clicked() {
                        clicked = Some(BackendCommand::DecrementCounter);
                    }
                    if ui.button("Reset").clicked() {
                        clicked = Some(BackendCommand::ResetCounter);
                    }
                    if ui.button("+").clicked() {
                        clicked = Some(BackendCommand::IncrementCounter);
                    }
                });
            });
        });

        if let Some(cmd) = clicked {
            self.dispatch(cmd);
        }
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_error_banner(ctx);
        self.show_status_bar(ctx);
        self.show_main(ctx);

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
