//! Typed boundary to the statement evaluation engine.
//!
//! The engine itself is opaque: executors take configuration and
//! payload text and hand back transformed text. This module defines the
//! executor traits, the registry that dispatches on executor id, and
//! the [`Evaluator`] capability the UI layer is given. The evaluator
//! never fails outward; every failure is folded into an error
//! [`ExecutionResult`] the result panel can display.

mod logs;
mod metadata;
mod result;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{EngineError, Result};

pub use logs::ObservedLogs;
pub use metadata::{ComponentType, Metadata, ResultView};
pub use result::ExecutionResult;

/// The telemetry signal a payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadType {
    Logs,
    Traces,
    Metrics,
    Profiles,
}

impl PayloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadType::Logs => "logs",
            PayloadType::Traces => "traces",
            PayloadType::Metrics => "metrics",
            PayloadType::Profiles => "profiles",
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "logs" => Ok(PayloadType::Logs),
            "traces" => Ok(PayloadType::Traces),
            "metrics" => Ok(PayloadType::Metrics),
            "profiles" => Ok(PayloadType::Profiles),
            other => Err(EngineError::UnsupportedPayloadType(other.to_string())),
        }
    }
}

/// Anything that captures logs while it runs.
pub trait Observable {
    fn observed_logs(&self) -> &ObservedLogs;
}

/// Evaluates statements using a specific configuration and input.
pub trait Executor: Observable {
    fn metadata(&self) -> &Metadata;

    /// Runs `config` against `payload`, returning the transformed
    /// payload JSON.
    fn execute(&self, payload_type: PayloadType, config: &str, payload: &str) -> Result<String>;

    /// The executor's debugger, when it supports debug runs.
    fn debugger(&self) -> Option<&dyn Debugger> {
        None
    }
}

/// Debug-mode evaluation: one fully formed result per executed
/// statement, each with `line` set to the configuration line it ran on,
/// in execution order.
pub trait Debugger: Observable {
    fn debug(
        &self,
        payload_type: PayloadType,
        config: &str,
        payload: &str,
    ) -> Result<Vec<ExecutionResult>>;
}

/// Injected capability the UI layer evaluates through: strings in,
/// structured result out, never an error or a panic.
pub trait Evaluator {
    fn execute(
        &self,
        config: &str,
        payload_type: &str,
        payload: &str,
        executor_id: &str,
        debug: bool,
    ) -> ExecutionResult;
}

/// Registered executors, dispatched by id.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: Vec<Box<dyn Executor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, executor: Box<dyn Executor>) {
        self.executors.push(executor);
    }

    pub fn get(&self, id: &str) -> Option<&dyn Executor> {
        self.executors
            .iter()
            .find(|e| e.metadata().id == id)
            .map(|e| e.as_ref())
    }

    /// Metadata for every registered executor, with `debuggable`
    /// reflecting whether the executor actually carries a debugger.
    pub fn metadata(&self) -> Vec<Metadata> {
        self.executors
            .iter()
            .map(|e| {
                let mut meta = e.metadata().clone();
                meta.debuggable = e.debugger().is_some();
                meta
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl Evaluator for ExecutorRegistry {
    fn execute(
        &self,
        config: &str,
        payload_type: &str,
        payload: &str,
        executor_id: &str,
        debug: bool,
    ) -> ExecutionResult {
        let Some(executor) = self.get(executor_id) else {
            return ExecutionResult::error(format!("unsupported evaluator {executor_id}"), "");
        };
        let kind = match payload_type.parse::<PayloadType>() {
            Ok(kind) => kind,
            Err(err) => return ExecutionResult::error(err.to_string(), ""),
        };
        // `debug` the local bool shadows the name imported by `use tracing::debug`,
        // so bind it to a distinct name for the field value.
        let debug_flag = debug;
        debug!(executor = executor_id, %kind, debug = debug_flag, "dispatching evaluation");

        if debug {
            return self.execute_debug(executor, executor_id, kind, config, payload);
        }

        match ExecutionResult::capture(executor.observed_logs(), || {
            executor.execute(kind, config, payload)
        }) {
            Ok(result) => result,
            Err(err) => ExecutionResult::error(
                format!("unable to run {kind} statements: {err}"),
                executor.observed_logs().take_all_string(),
            ),
        }
    }
}

impl ExecutorRegistry {
    fn execute_debug(
        &self,
        executor: &dyn Executor,
        executor_id: &str,
        kind: PayloadType,
        config: &str,
        payload: &str,
    ) -> ExecutionResult {
        let Some(debugger) = executor.debugger() else {
            return ExecutionResult::error(
                format!("executor {executor_id} does not support debugging"),
                "",
            );
        };
        match debugger.debug(kind, config, payload) {
            Ok(steps) => match serde_json::to_string(&steps) {
                Ok(value) => ExecutionResult {
                    value,
                    debug: true,
                    ..Default::default()
                },
                Err(err) => ExecutionResult::error(
                    format!("unable to encode {kind} debug results: {err}"),
                    debugger.observed_logs().take_all_string(),
                ),
            },
            Err(err) => ExecutionResult::error(
                format!("unable to run {kind} statements: {err}"),
                debugger.observed_logs().take_all_string(),
            ),
        }
    }
}
