mod breakpoints;
mod info;
mod stepper;

pub use breakpoints::BreakpointSet;
pub use info::DebuggingInfo;
pub use stepper::{DebugStepper, StepperState};

/// Sentinel emitted on `debugging-line-changed` to clear the displayed
/// result.
pub const NO_RESULT: i64 = -1;
