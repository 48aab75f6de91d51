//! Collaborator trait impls for the in-process counter service and the
//! file-backed settings store.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use counter_service::CounterServiceHandle;
use serde_json::Value;
use shared::domain::CounterValue;
use storage::{SettingsStore, StoreRegistry};

use crate::{CounterClient, KeyValueStore, StoreLoader};

#[async_trait]
impl CounterClient for CounterServiceHandle {
    async fn get(&self) -> Result<CounterValue> {
        Ok(CounterServiceHandle::get(self).await?)
    }

    async fn increment(&self) -> Result<CounterValue> {
        Ok(CounterServiceHandle::increment(self).await?)
    }

    async fn decrement(&self) -> Result<CounterValue> {
        Ok(CounterServiceHandle::decrement(self).await?)
    }

    async fn reset(&self) -> Result<CounterValue> {
        Ok(CounterServiceHandle::reset(self).await?)
    }
}

#[async_trait]
impl KeyValueStore for SettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(SettingsStore::get(self, key).await)
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        Ok(SettingsStore::set(self, key, value).await?)
    }
}

#[async_trait]
impl StoreLoader for StoreRegistry {
    async fn load(&self, store_id: &str) -> Result<Arc<dyn KeyValueStore>> {
        let store: Arc<dyn KeyValueStore> = StoreRegistry::load(self, store_id).await?;
        Ok(store)
    }
}
