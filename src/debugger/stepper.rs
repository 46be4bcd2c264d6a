use std::collections::BTreeSet;

use tracing::debug;

use super::{DebuggingInfo, NO_RESULT};

/// Where the stepper currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperState {
    /// No debug session.
    Inactive,
    /// Paused on the executed-lines entry at this offset.
    AtBreakpoint(usize),
    /// Ran past the last entry; no line is highlighted.
    RunningToEnd,
}

impl Default for StepperState {
    fn default() -> Self {
        StepperState::Inactive
    }
}

type LineHandler = Box<dyn FnMut(i64)>;
type StopHandler = Box<dyn FnMut()>;

/// Drives a step-through session over one debug run.
///
/// The stepper owns the [`DebuggingInfo`] snapshot and an offset into
/// its executed-lines list. Every transition emits the index of the
/// per-step result to display (or [`NO_RESULT`] to clear) to the
/// registered `debugging-line-changed` handlers; leaving the session
/// additionally notifies the `stop-requested` handlers so the host can
/// drop the editor out of read-only mode.
///
/// All operations are total: stepping past either end of the list is
/// ignored rather than an error.
#[derive(Default)]
pub struct DebugStepper {
    info: DebuggingInfo,
    state: StepperState,
    current_line: Option<i64>,
    line_handlers: Vec<LineHandler>,
    stop_handlers: Vec<StopHandler>,
}

impl std::fmt::Debug for DebugStepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugStepper")
            .field("state", &self.state)
            .field("current_line", &self.current_line)
            .field("lines", &self.info.lines)
            .finish()
    }
}

impl DebugStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a `debugging-line-changed` handler. Handlers run
    /// synchronously, in registration order.
    pub fn on_debugging_line_changed(&mut self, handler: impl FnMut(i64) + 'static) {
        self.line_handlers.push(Box::new(handler));
    }

    /// Registers a `stop-requested` handler.
    pub fn on_stop_requested(&mut self, handler: impl FnMut() + 'static) {
        self.stop_handlers.push(Box::new(handler));
    }

    pub fn state(&self) -> StepperState {
        self.state
    }

    /// The highlighted source line, if the stepper is paused on one.
    pub fn current_line(&self) -> Option<i64> {
        self.current_line
    }

    pub fn offset(&self) -> Option<usize> {
        match self.state {
            StepperState::AtBreakpoint(o) => Some(o),
            _ => None,
        }
    }

    /// True while a debug session is live. Goes false on stop and when
    /// a resume runs past the last breakpoint.
    pub fn is_debugging(&self) -> bool {
        self.info.debugging
    }

    pub fn info(&self) -> &DebuggingInfo {
        &self.info
    }

    /// Begins a session from a fresh snapshot: runs until the first
    /// breakpointed line, or to the end when none qualifies.
    ///
    /// A snapshot without the debugging flag set just clears the
    /// stepper.
    pub fn start(&mut self, info: DebuggingInfo, breakpoints: &BTreeSet<i64>) {
        self.info = info;
        self.state = StepperState::Inactive;
        self.current_line = None;
        if !self.info.debugging {
            return;
        }
        debug!(steps = self.info.len(), "starting debug session");
        self.advance_to_breakpoint(None, breakpoints);
    }

    /// Advances one step. At the last entry this runs to the end while
    /// keeping the session live; past the end it is a no-op.
    pub fn step_forward(&mut self) {
        let StepperState::AtBreakpoint(offset) = self.state else {
            return;
        };
        let next = offset + 1;
        if next < self.info.len() {
            self.state = StepperState::AtBreakpoint(next);
            self.current_line = Some(self.info.lines[next]);
            debug!(offset = next, "step forward");
            let idx = self.result_index_before(next);
            self.notify_line(idx);
        } else {
            self.run_to_end(false);
        }
    }

    /// Steps back one entry. A no-op at the first entry and outside a
    /// live session.
    pub fn step_backward(&mut self) {
        let offset = match self.state {
            StepperState::AtBreakpoint(o) if o > 0 => o,
            // Stepping forward past the end leaves the session live with
            // the cursor past the list; backing up lands on the last entry.
            StepperState::RunningToEnd if self.info.debugging && !self.info.is_empty() => {
                self.info.len()
            }
            _ => return,
        };
        let prev = offset - 1;
        self.state = StepperState::AtBreakpoint(prev);
        self.current_line = Some(self.info.lines[prev]);
        debug!(offset = prev, "step backward");
        let idx = self.result_index_before(prev);
        self.notify_line(idx);
    }

    /// Runs ahead to the next breakpointed line, or to the end (ending
    /// the session) when none remains.
    ///
    /// The breakpoint set is re-read on every resume, so toggles made
    /// while paused take effect.
    pub fn resume(&mut self, breakpoints: &BTreeSet<i64>) {
        match self.state {
            StepperState::AtBreakpoint(_) => {
                self.advance_to_breakpoint(self.current_line, breakpoints);
            }
            // Past the end with the session still live: rerun from the top.
            StepperState::RunningToEnd if self.info.debugging => {
                self.advance_to_breakpoint(None, breakpoints);
            }
            _ => {}
        }
    }

    /// Ends the session: clears the snapshot, emits [`NO_RESULT`] to
    /// clear the display, and signals stop. A no-op when already
    /// inactive, so stopping twice is safe.
    pub fn stop(&mut self) {
        if self.state == StepperState::Inactive {
            return;
        }
        debug!("stopping debug session");
        self.state = StepperState::Inactive;
        self.current_line = None;
        self.info = DebuggingInfo::default();
        self.notify_line(NO_RESULT);
        self.notify_stop();
    }

    /// Clears all session state without emitting events. Used when a
    /// debug run's output cannot be parsed.
    pub(crate) fn reset(&mut self) {
        self.state = StepperState::Inactive;
        self.current_line = None;
        self.info = DebuggingInfo::default();
    }

    /// Selection rule shared by start and resume: the first entry in
    /// execution order whose line is breakpointed and numbered strictly
    /// greater than `after`. Lines that execute more than once are
    /// considered at every occurrence, so a later pass through a loop
    /// body can be selected even though its offset is lower.
    fn advance_to_breakpoint(&mut self, after: Option<i64>, breakpoints: &BTreeSet<i64>) {
        let hit = self
            .info
            .lines
            .iter()
            .position(|line| breakpoints.contains(line) && after.map_or(true, |a| *line > a));
        match hit {
            Some(offset) => {
                self.state = StepperState::AtBreakpoint(offset);
                self.current_line = Some(self.info.lines[offset]);
                debug!(offset, line = self.info.lines[offset], "paused at breakpoint");
                let idx = self.result_index_before(offset);
                self.notify_line(idx);
            }
            None => self.run_to_end(true),
        }
    }

    /// Moves past the last entry. With `end_session` the run is over:
    /// the session stops being live and stop is signalled so the host
    /// exits read-only mode. Without it (step-forward) the session
    /// stays live for backward steps and reruns.
    fn run_to_end(&mut self, end_session: bool) {
        self.state = StepperState::RunningToEnd;
        self.current_line = None;
        let len = self.info.len();
        debug!(end_session, "ran to end");
        if len > 0 {
            let idx = self.result_index_before(len);
            self.notify_line(idx);
        }
        if end_session {
            self.info.debugging = false;
            self.notify_stop();
        }
    }

    /// Result index for the entry just before `offset`: the state to
    /// display while paused there. [`NO_RESULT`] before the first entry.
    /// Repeated lines resolve to their final execution's result.
    fn result_index_before(&self, offset: usize) -> i64 {
        if offset == 0 {
            return NO_RESULT;
        }
        let line = self.info.lines[offset - 1];
        self.info
            .result_index(line)
            .map(|i| i as i64)
            .unwrap_or(offset as i64 - 1)
    }

    fn notify_line(&mut self, idx: i64) {
        for handler in &mut self.line_handlers {
            handler(idx);
        }
    }

    fn notify_stop(&mut self) {
        for handler in &mut self.stop_handlers {
            handler();
        }
    }
}
