use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use shared::domain::CounterValue;

mod adapters;
pub mod controller;
pub mod error;
pub mod random;

pub use controller::{CounterCallPolicy, InitReport, PendingWrite, UiSnapshot, UiStateController};
pub use error::{ControllerError, StoreOperation};
pub use random::{IndexSource, ThreadRngSource};

/// Client view of the backend-owned counter. Every operation returns the
/// value the backend holds after handling it.
#[async_trait]
pub trait CounterClient: Send + Sync {
    async fn get(&self) -> Result<CounterValue>;
    async fn increment(&self) -> Result<CounterValue>;
    async fn decrement(&self) -> Result<CounterValue>;
    async fn reset(&self) -> Result<CounterValue>;
}

/// A loaded key-value store. `get` yields `None` for keys never set.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

#[async_trait]
pub trait StoreLoader: Send + Sync {
    async fn load(&self, store_id: &str) -> Result<Arc<dyn KeyValueStore>>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
