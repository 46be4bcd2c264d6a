//! Execution-side core of a telemetry statement playground: breakpoint
//! tracking, the debug stepper, and the typed boundary to the statement
//! evaluation engine.
//!
//! The surrounding web UI (editors, result rendering, shareable links)
//! lives elsewhere and talks to this crate through [`ConfigPanel`] and
//! the [`Evaluator`] capability.

mod document;
mod error;
mod panel;

pub mod debugger;
pub mod engine;

pub use document::{Document, TextAnchor, TextEdit};
pub use error::{EngineError, Result};
pub use panel::ConfigPanel;

pub use debugger::{BreakpointSet, DebugStepper, DebuggingInfo, StepperState, NO_RESULT};
pub use engine::{
    ComponentType, Debugger, Evaluator, ExecutionResult, Executor, ExecutorRegistry, Metadata,
    Observable, ObservedLogs, PayloadType, ResultView,
};
