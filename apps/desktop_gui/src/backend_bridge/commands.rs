//! Backend commands queued from UI to backend worker.

/// The four user intents the window can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCommand {
    ChangeMessage,
    IncrementCounter,
    DecrementCounter,
    ResetCounter,
}

impl BackendCommand {
    pub fn name(self) -> &'static str {
        match self {
            BackendCommand::ChangeMessage => "change_message",
            BackendCommand::IncrementCounter => "increment_counter",
            BackendCommand::DecrementCounter => "decrement_counter",
            BackendCommand::ResetCounter => "reset_counter",
        }
    }
}
