//! Isolated counter backend.
//!
//! The service owns the counter storage on its own task. Callers only hold a
//! [`CounterServiceHandle`] and talk to it through request/reply messages.

use anyhow::Context;
use shared::{domain::CounterValue, error::ServiceError, protocol::CounterCommand};
use storage::Storage;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod config;

pub use config::Settings;

const REQUEST_QUEUE_CAPACITY: usize = 64;

type Reply = oneshot::Sender<Result<CounterValue, ServiceError>>;

struct CounterRequest {
    command: CounterCommand,
    reply: Reply,
}

/// Cloneable client side of the counter service.
#[derive(Clone)]
pub struct CounterServiceHandle {
    tx: mpsc::Sender<CounterRequest>,
}

impl CounterServiceHandle {
    pub async fn call(&self, command: CounterCommand) -> Result<CounterValue, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(CounterRequest { command, reply })
            .await
            .map_err(|_| ServiceError::unavailable("counter service is not running"))?;
        response.await.map_err(|_| {
            ServiceError::unavailable(format!(
                "counter service stopped before answering {command}"
            ))
        })?
    }

    pub async fn get(&self) -> Result<CounterValue, ServiceError> {
        self.call(CounterCommand::Get).await
    }

    pub async fn increment(&self) -> Result<CounterValue, ServiceError> {
        self.call(CounterCommand::Increment).await
    }

    pub async fn decrement(&self) -> Result<CounterValue, ServiceError> {
        self.call(CounterCommand::Decrement).await
    }

    pub async fn reset(&self) -> Result<CounterValue, ServiceError> {
        self.call(CounterCommand::Reset).await
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Owner side of a running service. Dropping it also stops the service.
pub struct CounterServiceTask {
    shutdown_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl CounterServiceTask {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(err) = self.join.await {
            warn!("counter service task ended abnormally: {err}");
        }
    }
}

/// Opens the configured database and starts the service.
pub async fn start(
    settings: &Settings,
) -> anyhow::Result<(CounterServiceHandle, CounterServiceTask)> {
    let database_url = config::normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url)
        .await
        .with_context(|| format!("failed to initialize counter storage at '{database_url}'"))?;
    info!(%database_url, "counter service storage ready");
    Ok(spawn(storage))
}

/// Starts the service on the current runtime over an already opened storage.
pub fn spawn(storage: Storage) -> (CounterServiceHandle, CounterServiceTask) {
    let (tx, rx) = mpsc::channel(REQUEST_QUEUE_CAPACITY);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(run(storage, rx, shutdown_rx));
    (
        CounterServiceHandle { tx },
        CounterServiceTask { shutdown_tx, join },
    )
}

async fn run(
    storage: Storage,
    mut rx: mpsc::Receiver<CounterRequest>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    info!("counter service started");
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            request = rx.recv() => {
                let Some(CounterRequest { command, reply }) = request else {
                    break;
                };
                let result = execute(&storage, command).await;
                match &result {
                    Ok(value) => debug!(%command, %value, "counter command handled"),
                    Err(err) => warn!(%command, "counter command failed: {err}"),
                }
                // The caller may have given up waiting.
                let _ = reply.send(result);
            }
        }
    }
    rx.close();
    info!("counter service stopped");
}

async fn execute(
    storage: &Storage,
    command: CounterCommand,
) -> Result<CounterValue, ServiceError> {
    let result = match command {
        CounterCommand::Get => storage.get_count().await,
        CounterCommand::Increment => storage.increment().await,
        CounterCommand::Decrement => storage.decrement().await,
        CounterCommand::Reset => storage.reset().await,
    };
    result.map_err(|err| ServiceError::storage(format!("{err:#}")))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
