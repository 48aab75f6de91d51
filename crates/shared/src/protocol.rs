use std::fmt;

use serde::{Deserialize, Serialize};

/// Store file holding UI settings.
pub const SETTINGS_STORE_ID: &str = "settings.json";
/// Key under which the selected message index is persisted.
pub const MESSAGE_INDEX_KEY: &str = "messageIndex";

/// Operations understood by the counter service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterCommand {
    Get,
    Increment,
    Decrement,
    Reset,
}

impl CounterCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            CounterCommand::Get => "get_count",
            CounterCommand::Increment => "increment",
            CounterCommand::Decrement => "decrement",
            CounterCommand::Reset => "reset",
        }
    }
}

impl fmt::Display for CounterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
