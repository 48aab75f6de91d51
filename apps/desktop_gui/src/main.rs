use std::path::PathBuf;

mod backend_bridge;
mod catalog;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::CounterCallPolicy;
use crossbeam_channel::bounded;
use eframe::egui;

use backend_bridge::{
    commands::BackendCommand,
    runtime::{launch, BackendConfig},
};
use controller::events::UiEvent;
use ui::{AppPaths, DesktopGuiApp, StartupConfig};

const APP_TITLE: &str = "Rotary Counter";

#[derive(Parser, Debug)]
#[command(about = "Desktop shell showing a rotating message and a backend-owned counter")]
struct Args {
    /// Directory holding app.db and settings.json.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// tracing filter directive, e.g. `info` or `client_core=debug`.
    #[arg(long, default_value = "info")]
    log_filter: String,
    /// Run counter calls one at a time so responses apply in click order.
    #[arg(long)]
    serialize_counter_calls: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter.as_str())
        .init();

    let startup = StartupConfig {
        data_dir: args.data_dir,
        serialize_counter_calls: args.serialize_counter_calls,
    };
    let paths = AppPaths::from_startup(&startup)?;
    tracing::info!(
        data_root = %paths.data_root.display(),
        db = %paths.db_path.display(),
        settings = %paths.settings_path.display(),
        "resolved application paths"
    );

    let catalog = catalog::builtin().context("built-in message catalog is invalid")?;
    let counter_policy = if startup.serialize_counter_calls {
        CounterCallPolicy::Serialized
    } else {
        CounterCallPolicy::Concurrent
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    // The worker exits once the window drops `cmd_tx`.
    let worker = launch(
        BackendConfig {
            data_dir: paths.data_root.clone(),
            catalog: catalog.clone(),
            counter_policy,
        },
        cmd_rx,
        ui_tx,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([420.0, 320.0])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };
    let ui_result = eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(DesktopGuiApp::new(cmd_tx, ui_rx, catalog)))),
    );

    // Pending settings writes finish before the process exits.
    if worker.join().is_err() {
        tracing::error!("backend worker panicked during shutdown");
    }
    ui_result.map_err(|err| anyhow::anyhow!("desktop shell exited with error: {err}"))
}
