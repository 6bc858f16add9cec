//! Error taxonomy shared by the registry, the dispatcher and the CLI.
//!
//! Startup errors (`ConfigError`, `RegistryError`) are fatal and abort the
//! process before any request is served. `DispatchError` is per request and
//! always converted into a response.

use serde_json::Value;
use thiserror::Error;

/// Registration-time programming errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),
}

/// Per-request failures produced by `CommandRegistry::invoke`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid argument '{field}': expected {expected}, got {actual}")]
    InvalidArgument {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("command '{command}' failed: {message}")]
    HandlerFailure {
        command: String,
        message: String,
        cause: Option<Value>,
    },
}

impl DispatchError {
    pub fn invalid(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        DispatchError::InvalidArgument {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Wrap a handler error, lifting the structured cause of an SDK rejection.
    pub fn handler_failure(command: &str, err: &anyhow::Error) -> Self {
        let cause = match err.downcast_ref::<crate::sdk::SdkError>() {
            Some(crate::sdk::SdkError::Rejected { cause, .. }) => cause.clone(),
            _ => None,
        };
        DispatchError::HandlerFailure {
            command: command.to_string(),
            message: format!("{err:#}"),
            cause,
        }
    }

    /// Structured detail for protocol-level error payloads.
    pub fn detail(&self) -> Value {
        match self {
            DispatchError::UnknownCommand(name) => serde_json::json!({ "command": name }),
            DispatchError::InvalidArgument {
                field,
                expected,
                actual,
            } => serde_json::json!({
                "field": field,
                "expected": expected,
                "actual": actual,
            }),
            DispatchError::HandlerFailure {
                command,
                message,
                cause,
            } => serde_json::json!({
                "command": command,
                "message": message,
                "cause": cause,
            }),
        }
    }
}
