//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{ControllerError, UiSnapshot};

pub enum UiEvent {
    Info(String),
    /// Backend finished startup; carries the number of collaborators that
    /// failed to load.
    Ready {
        degraded: usize,
    },
    StateChanged(UiSnapshot),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Counter,
    Storage,
    Startup,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Initialize,
    ChangeMessage,
    Counter,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    /// Failure raised before the controller exists.
    pub fn startup(message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Startup,
            context: UiErrorContext::BackendStartup,
            message: message.into(),
        }
    }

    pub fn from_controller(context: UiErrorContext, err: &ControllerError) -> Self {
        let category = match err {
            ControllerError::CounterUnavailable { .. } => UiErrorCategory::Counter,
            ControllerError::StoreUnavailable { .. } | ControllerError::WriteAborted(_) => {
                UiErrorCategory::Storage
            }
            ControllerError::AlreadyInitialized => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use client_core::StoreOperation;
    use shared::protocol::CounterCommand;

    use super::*;

    #[test]
    fn classifies_startup_failures() {
        let err = UiError::startup("failed to build backend runtime");
        assert_eq!(err.category(), UiErrorCategory::Startup);
        assert_eq!(err.context(), UiErrorContext::BackendStartup);
    }

    #[test]
    fn classifies_controller_errors_by_collaborator() {
        let counter = UiError::from_controller(
            UiErrorContext::Counter,
            &ControllerError::CounterUnavailable {
                command: CounterCommand::Increment,
                source: anyhow!("service stopped"),
            },
        );
        assert_eq!(counter.category(), UiErrorCategory::Counter);
        assert!(counter.message().contains("increment"));

        let store = UiError::from_controller(
            UiErrorContext::ChangeMessage,
            &ControllerError::StoreUnavailable {
                operation: StoreOperation::Set,
                source: anyhow!("disk full"),
            },
        );
        assert_eq!(store.category(), UiErrorCategory::Storage);
        assert_eq!(store.context(), UiErrorContext::ChangeMessage);
        assert!(store.message().contains("disk full"));
    }
}
