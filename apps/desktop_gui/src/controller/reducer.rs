//! Applies backend events to the state the window renders.

use client_core::UiSnapshot;
use shared::domain::MessageCatalog;

use crate::controller::events::{UiError, UiEvent};

const COUNTER_PLACEHOLDER: &str = "…";

pub struct ViewState {
    catalog: MessageCatalog,
    pub snapshot: UiSnapshot,
    pub status: String,
    pub banner: Option<UiError>,
    pub ready: bool,
}

impl ViewState {
    pub fn new(catalog: MessageCatalog) -> Self {
        Self {
            catalog,
            snapshot: UiSnapshot::default(),
            status: "Starting...".to_string(),
            banner: None,
            ready: false,
        }
    }

    pub fn message_text(&self) -> &str {
        self.catalog.text(self.snapshot.message_index)
    }

    pub fn counter_text(&self) -> String {
        match self.snapshot.counter {
            Some(value) => value.to_string(),
            None => COUNTER_PLACEHOLDER.to_string(),
        }
    }

    pub fn counter_busy(&self) -> bool {
        self.snapshot.pending_counter_calls > 0
    }
}

pub fn reduce(state: &mut ViewState, event: UiEvent) {
    match event {
        UiEvent::Info(message) => state.status = message,
        UiEvent::Ready { degraded } => {
            state.ready = true;
            state.status = if degraded == 0 {
                "Ready".to_string()
            } else {
                format!("Ready ({degraded} source(s) unavailable; showing defaults)")
            };
        }
        // Snapshots always carry the full state, so the newest one wins.
        UiEvent::StateChanged(snapshot) => state.snapshot = snapshot,
        UiEvent::Error(err) => {
            tracing::warn!(
                category = ?err.category(),
                context = ?err.context(),
                "{}",
                err.message()
            );
            state.status = err.message().to_string();
            state.banner = Some(err);
        }
    }
}
