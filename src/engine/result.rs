use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::ObservedLogs;
use crate::error::Result;

/// Outcome of one evaluation, in the wire shape the UI consumes.
///
/// For a normal run `value` holds the transformed payload JSON. For a
/// debug run the outer result has `debug` set and `value` holds a JSON
/// array of per-step results, each with `line` set to the 1-based
/// configuration line it executed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionResult {
    pub value: String,
    /// Wall-clock execution time in milliseconds.
    pub execution_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub logs: String,
    pub debug: bool,
    pub line: i64,
}

impl ExecutionResult {
    pub fn error(error: impl Into<String>, logs: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            logs: logs.into(),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Runs `command`, timing it and draining `logs` into the result.
    pub fn capture<F>(logs: &ObservedLogs, command: F) -> Result<Self>
    where
        F: FnOnce() -> Result<String>,
    {
        let start = Instant::now();
        let value = command()?;
        Ok(Self {
            value,
            execution_time: start.elapsed().as_millis() as i64,
            logs: logs.take_all_string(),
            ..Default::default()
        })
    }
}
