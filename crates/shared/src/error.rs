use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Server,
    Transport,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("required input '{field}' is empty")]
    EmptyInput { field: &'static str },
    #[error("submission declined by user")]
    Declined,
    #[error("server reported failure: {0}")]
    Server(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("another action is already in flight")]
    Busy,
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::EmptyInput { .. } | ActionError::Declined => ErrorKind::Validation,
            ActionError::Server(_) => ErrorKind::Server,
            ActionError::Transport(_) => ErrorKind::Transport,
            ActionError::Busy => ErrorKind::Busy,
        }
    }
}
