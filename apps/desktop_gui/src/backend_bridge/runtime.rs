//! Runtime bridge between UI command queue and backend event intake.
//!
//! The worker thread owns a tokio runtime. It starts the counter service,
//! builds the controller, forwards every state change to the UI, and runs
//! each queued command as its own task so a slow call never holds up the
//! next one. Once the UI hangs up, outstanding commands (including settings
//! writes) run to completion before the service stops.

use std::{path::PathBuf, sync::Arc, thread};

use client_core::{CounterCallPolicy, UiStateController};
use counter_service::{config::load_settings, CounterServiceTask, Settings};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::domain::MessageCatalog;
use storage::StoreRegistry;
use tokio::{runtime::Runtime, task::JoinSet};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub data_dir: PathBuf,
    pub catalog: MessageCatalog,
    pub counter_policy: CounterCallPolicy,
}

pub fn launch(
    config: BackendConfig,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                send_error(
                    &ui_tx,
                    UiError::startup(format!(
                        "backend worker startup failure: failed to build runtime: {err}"
                    )),
                );
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let Some((controller, service_task)) = runtime.block_on(start_backend(&config, &ui_tx))
        else {
            return;
        };

        spawn_state_forwarder(&runtime, &controller, ui_tx.clone());
        spawn_initialize(&runtime, controller.clone(), ui_tx.clone());

        let mut commands = JoinSet::new();
        while let Ok(cmd) = cmd_rx.recv() {
            while commands.try_join_next().is_some() {}
            commands.spawn_on(
                handle_command(controller.clone(), cmd, ui_tx.clone()),
                runtime.handle(),
            );
        }

        tracing::info!(
            outstanding = commands.len(),
            "UI command queue closed; draining commands before stopping backend"
        );
        runtime.block_on(async {
            while let Some(joined) = commands.join_next().await {
                if let Err(err) = joined {
                    tracing::warn!("ui command task ended abnormally: {err}");
                }
            }
        });
        runtime.block_on(service_task.shutdown());
    })
}

async fn start_backend(
    config: &BackendConfig,
    ui_tx: &Sender<UiEvent>,
) -> Option<(Arc<UiStateController>, CounterServiceTask)> {
    if let Err(err) = std::fs::create_dir_all(&config.data_dir) {
        send_error(
            ui_tx,
            UiError::startup(format!(
                "backend worker startup failure: could not prepare data directory '{}': {err}",
                config.data_dir.display()
            )),
        );
        tracing::error!(
            "failed to create data directory '{}': {err}",
            config.data_dir.display()
        );
        return None;
    }

    let settings = load_settings(Settings::for_data_dir(&config.data_dir), &config.data_dir);
    let (counter, service_task) = match counter_service::start(&settings).await {
        Ok(started) => started,
        Err(err) => {
            send_error(
                ui_tx,
                UiError::startup(format!(
                    "backend worker startup failure: counter service: {err:#}"
                )),
            );
            tracing::error!("failed to start counter service: {err:#}");
            return None;
        }
    };

    let controller = UiStateController::new(
        config.catalog.clone(),
        Arc::new(counter),
        Arc::new(StoreRegistry::new(&config.data_dir)),
    )
    .with_counter_policy(config.counter_policy);

    Some((Arc::new(controller), service_task))
}

fn spawn_state_forwarder(
    runtime: &Runtime,
    controller: &UiStateController,
    ui_tx: Sender<UiEvent>,
) {
    let mut updates = controller.subscribe();
    runtime.spawn(async move {
        loop {
            let snapshot = updates.borrow_and_update().clone();
            if let Err(TrySendError::Disconnected(_)) =
                ui_tx.try_send(UiEvent::StateChanged(snapshot))
            {
                break;
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
    });
}

fn spawn_initialize(runtime: &Runtime, controller: Arc<UiStateController>, ui_tx: Sender<UiEvent>) {
    runtime.spawn(async move {
        let report = match controller.initialize().await {
            Ok(report) => report,
            Err(err) => {
                send_error(
                    &ui_tx,
                    UiError::from_controller(UiErrorContext::Initialize, &err),
                );
                return;
            }
        };

        let mut degraded = 0;
        if let Err(err) = &report.message_index {
            degraded += 1;
            send_error(
                &ui_tx,
                UiError::from_controller(UiErrorContext::Initialize, err),
            );
        }
        if let Err(err) = &report.counter {
            degraded += 1;
            send_error(
                &ui_tx,
                UiError::from_controller(UiErrorContext::Initialize, err),
            );
        }
        let _ = ui_tx.try_send(UiEvent::Ready { degraded });
    });
}

async fn handle_command(
    controller: Arc<UiStateController>,
    cmd: BackendCommand,
    ui_tx: Sender<UiEvent>,
) {
    tracing::debug!(command = cmd.name(), "handling ui command");
    let (context, result) = match cmd {
        BackendCommand::ChangeMessage => (
            UiErrorContext::ChangeMessage,
            controller.request_random_message().wait().await,
        ),
        BackendCommand::IncrementCounter => (
            UiErrorContext::Counter,
            controller.increment().await.map(drop),
        ),
        BackendCommand::DecrementCounter => (
            UiErrorContext::Counter,
            controller.decrement().await.map(drop),
        ),
        BackendCommand::ResetCounter => (
            UiErrorContext::Counter,
            controller.reset().await.map(drop),
        ),
    };

    if let Err(err) = result {
        send_error(&ui_tx, UiError::from_controller(context, &err));
    }
}

fn send_error(ui_tx: &Sender<UiEvent>, err: UiError) {
    if ui_tx.try_send(UiEvent::Error(err)).is_err() {
        tracing::warn!("dropping UI error event; UI queue unavailable");
    }
}
