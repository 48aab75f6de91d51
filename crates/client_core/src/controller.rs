//! UI state controller: the single owner of what the presentation renders.
//!
//! Two state slices live here. The message index is owned locally and
//! mirrored into the settings store. The counter value is owned by the
//! counter service and only ever copied from its responses.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde_json::Value;
use shared::{
    domain::{CounterValue, MessageCatalog, MessageIndex},
    protocol::{CounterCommand, MESSAGE_INDEX_KEY, SETTINGS_STORE_ID},
};
use tokio::{
    sync::{watch, Mutex, OnceCell},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    error::{ControllerError, StoreOperation},
    random::{IndexSource, ThreadRngSource},
    CounterClient, KeyValueStore, StoreLoader,
};

/// What the presentation renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiSnapshot {
    pub message_index: MessageIndex,
    /// `None` until the counter service has answered once.
    pub counter: Option<CounterValue>,
    pub pending_counter_calls: usize,
}

impl Default for UiSnapshot {
    fn default() -> Self {
        Self {
            message_index: MessageIndex::DEFAULT,
            counter: None,
            pending_counter_calls: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CounterCallPolicy {
    /// Responses are applied as they arrive, in whatever order that is.
    #[default]
    Concurrent,
    /// One counter call at a time; responses apply in issue order.
    Serialized,
}

/// Outcome of the two independent startup reads.
#[derive(Debug)]
pub struct InitReport {
    pub message_index: Result<MessageIndex, ControllerError>,
    pub counter: Result<CounterValue, ControllerError>,
}

impl InitReport {
    pub fn is_complete(&self) -> bool {
        self.message_index.is_ok() && self.counter.is_ok()
    }

    pub fn into_result(self) -> Result<(MessageIndex, CounterValue), ControllerError> {
        Ok((self.message_index?, self.counter?))
    }
}

/// Background persistence of a message selection. Dropping it does not
/// cancel the write.
#[derive(Debug)]
pub struct PendingWrite {
    index: MessageIndex,
    join: JoinHandle<Result<(), ControllerError>>,
}

impl PendingWrite {
    /// Index that was selected in memory when the write was issued.
    pub fn index(&self) -> MessageIndex {
        self.index
    }

    pub async fn wait(self) -> Result<(), ControllerError> {
        self.join
            .await
            .map_err(|err| ControllerError::WriteAborted(err.to_string()))?
    }
}

/// Lazily opened settings store shared by every reader and writer.
struct StoreSlot {
    loader: Arc<dyn StoreLoader>,
    handle: OnceCell<Arc<dyn KeyValueStore>>,
    write_gate: Mutex<()>,
}

impl StoreSlot {
    async fn handle(&self) -> Result<Arc<dyn KeyValueStore>, ControllerError> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                debug!(store_id = SETTINGS_STORE_ID, "opening settings store");
                self.loader
                    .load(SETTINGS_STORE_ID)
                    .await
                    .map_err(|source| ControllerError::store(StoreOperation::Load, source))
            })
            .await?;
        Ok(handle.clone())
    }
}

/// Decrements the in-flight counter even if the call future is dropped.
struct InFlight<'a> {
    state: &'a watch::Sender<UiSnapshot>,
}

impl<'a> InFlight<'a> {
    fn start(state: &'a watch::Sender<UiSnapshot>) -> Self {
        state.send_modify(|snapshot| snapshot.pending_counter_calls += 1);
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|snapshot| {
            snapshot.pending_counter_calls = snapshot.pending_counter_calls.saturating_sub(1);
        });
    }
}

pub struct UiStateController {
    catalog: MessageCatalog,
    counter: Arc<dyn CounterClient>,
    store: Arc<StoreSlot>,
    state: Arc<watch::Sender<UiSnapshot>>,
    index_source: Box<dyn IndexSource>,
    policy: CounterCallPolicy,
    counter_gate: Mutex<()>,
    initialized: AtomicBool,
    selected_locally: AtomicBool,
}

impl UiStateController {
    pub fn new(
        catalog: MessageCatalog,
        counter: Arc<dyn CounterClient>,
        store_loader: Arc<dyn StoreLoader>,
    ) -> Self {
        let (state, _) = watch::channel(UiSnapshot::default());
        Self {
            catalog,
            counter,
            store: Arc::new(StoreSlot {
                loader: store_loader,
                handle: OnceCell::new(),
                write_gate: Mutex::new(()),
            }),
            state: Arc::new(state),
            index_source: Box::new(ThreadRngSource),
            policy: CounterCallPolicy::default(),
            counter_gate: Mutex::new(()),
            initialized: AtomicBool::new(false),
            selected_locally: AtomicBool::new(false),
        }
    }

    pub fn with_index_source(mut self, source: impl IndexSource + 'static) -> Self {
        self.index_source = Box::new(source);
        self
    }

    pub fn with_counter_policy(mut self, policy: CounterCallPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn snapshot(&self) -> UiSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiSnapshot> {
        self.state.subscribe()
    }

    pub fn message_text(&self) -> &str {
        let index = self.state.borrow().message_index;
        self.catalog.text(index)
    }

    /// Restores the persisted message index and fetches the counter, both at
    /// once. Each result is applied as soon as it arrives; a failure on one
    /// side never holds back the other.
    pub async fn initialize(&self) -> Result<InitReport, ControllerError> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return Err(ControllerError::AlreadyInitialized);
        }

        let (message_index, counter) =
            tokio::join!(self.restore_message_index(), self.call_counter(CounterCommand::Get));

        if let Err(err) = &message_index {
            warn!("message index not restored: {err}");
        }
        if let Err(err) = &counter {
            warn!("initial counter value not loaded: {err}");
        }
        let snapshot = self.snapshot();
        info!(
            message_index = %snapshot.message_index,
            counter = ?snapshot.counter,
            "controller initialized"
        );

        Ok(InitReport {
            message_index,
            counter,
        })
    }

    async fn restore_message_index(&self) -> Result<MessageIndex, ControllerError> {
        let store = self.store.handle().await?;
        let raw = store
            .get(MESSAGE_INDEX_KEY)
            .await
            .map_err(|source| ControllerError::store(StoreOperation::Get, source))?;

        let index = match raw {
            None | Some(Value::Null) => {
                debug!("no persisted message index; keeping default");
                MessageIndex::DEFAULT
            }
            Some(raw) => self.catalog.index_from_json(&raw).unwrap_or_else(|| {
                warn!(
                    persisted = %raw,
                    catalog_len = self.catalog.len(),
                    "persisted message index is unusable; falling back to default"
                );
                MessageIndex::DEFAULT
            }),
        };

        // A selection made while the read was in flight is newer than disk.
        // The flag is checked under the state lock so a racing selection
        // always lands after us.
        let mut current = index;
        self.state.send_if_modified(|snapshot| {
            if self.selected_locally.load(Ordering::Acquire) {
                current = snapshot.message_index;
                return false;
            }
            snapshot.message_index = index;
            true
        });
        if current != index {
            debug!(%index, %current, "restored message index superseded by local selection");
        }
        Ok(current)
    }

    /// Picks a random message, shows it immediately, and persists the choice
    /// in the background.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, before any state changes.
    pub fn request_random_message(&self) -> PendingWrite {
        let runtime = tokio::runtime::Handle::current();
        let len = self.catalog.len();
        let index = MessageIndex(self.index_source.next_index(len) % len);

        self.selected_locally.store(true, Ordering::Release);
        self.state.send_modify(|snapshot| snapshot.message_index = index);
        debug!(%index, "message selected");

        let store = self.store.clone();
        let state = self.state.clone();
        let join = runtime.spawn(async move { persist_message_index(&store, &state).await });
        PendingWrite { index, join }
    }

    pub async fn increment(&self) -> Result<CounterValue, ControllerError> {
        self.call_counter(CounterCommand::Increment).await
    }

    pub async fn decrement(&self) -> Result<CounterValue, ControllerError> {
        self.call_counter(CounterCommand::Decrement).await
    }

    pub async fn reset(&self) -> Result<CounterValue, ControllerError> {
        self.call_counter(CounterCommand::Reset).await
    }

    /// Re-reads the counter without mutating it.
    pub async fn refresh_counter(&self) -> Result<CounterValue, ControllerError> {
        self.call_counter(CounterCommand::Get).await
    }

    async fn call_counter(&self, command: CounterCommand) -> Result<CounterValue, ControllerError> {
        let _gate = match self.policy {
            CounterCallPolicy::Serialized => Some(self.counter_gate.lock().await),
            CounterCallPolicy::Concurrent => None,
        };
        let in_flight = InFlight::start(&self.state);

        let result = match command {
            CounterCommand::Get => self.counter.get().await,
            CounterCommand::Increment => self.counter.increment().await,
            CounterCommand::Decrement => self.counter.decrement().await,
            CounterCommand::Reset => self.counter.reset().await,
        };

        let value =
            result.map_err(|source| ControllerError::CounterUnavailable { command, source })?;
        self.state.send_modify(|snapshot| snapshot.counter = Some(value));
        drop(in_flight);
        debug!(%command, %value, "counter value applied");
        Ok(value)
    }
}

/// Writes whatever index is current when the write gate is acquired, so the
/// last write to land always carries the latest selection.
async fn persist_message_index(
    store: &StoreSlot,
    state: &watch::Sender<UiSnapshot>,
) -> Result<(), ControllerError> {
    let handle = store.handle().await?;
    let _gate = store.write_gate.lock().await;
    let index = state.borrow().message_index;
    let result = handle
        .set(MESSAGE_INDEX_KEY, Value::from(index.0))
        .await
        .map_err(|source| ControllerError::store(StoreOperation::Set, source));
    match &result {
        Ok(()) => debug!(%index, "message index persisted"),
        Err(err) => warn!(%index, "message index not persisted: {err}"),
    }
    result
}
