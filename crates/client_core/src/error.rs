use std::fmt;

use shared::protocol::CounterCommand;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Load,
    Get,
    Set,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOperation::Load => "load",
            StoreOperation::Get => "get",
            StoreOperation::Set => "set",
        })
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("counter service unavailable during {command}: {source:#}")]
    CounterUnavailable {
        command: CounterCommand,
        #[source]
        source: anyhow::Error,
    },
    #[error("settings store unavailable during {operation}: {source:#}")]
    StoreUnavailable {
        operation: StoreOperation,
        #[source]
        source: anyhow::Error,
    },
    #[error("controller is already initialized")]
    AlreadyInitialized,
    #[error("settings write task did not finish: {0}")]
    WriteAborted(String),
}

impl ControllerError {
    pub(crate) fn store(operation: StoreOperation, source: anyhow::Error) -> Self {
        Self::StoreUnavailable { operation, source }
    }

    /// True when the failure came from one of the two collaborators.
    pub fn is_collaborator_unavailable(&self) -> bool {
        matches!(
            self,
            ControllerError::CounterUnavailable { .. } | ControllerError::StoreUnavailable { .. }
        )
    }
}
