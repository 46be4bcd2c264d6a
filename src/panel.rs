use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::debugger::{BreakpointSet, DebugStepper, DebuggingInfo, StepperState};
use crate::document::{Document, TextEdit};
use crate::engine::{Evaluator, ExecutionResult};

/// One configuration editor panel: the document, its breakpoints, the
/// debug stepper, and the evaluator it runs against.
///
/// The host editor renders text and gutters; this type owns everything
/// behind them. The evaluator is injected at construction, never
/// resolved from ambient state.
pub struct ConfigPanel {
    document: Document,
    breakpoints: BreakpointSet,
    stepper: DebugStepper,
    evaluator: Arc<dyn Evaluator>,
    executor_id: String,
    debugger_enabled: bool,
    read_only: bool,
    debug_steps: Vec<ExecutionResult>,
}

impl ConfigPanel {
    pub fn new(evaluator: Arc<dyn Evaluator>, executor_id: impl Into<String>) -> Self {
        Self {
            document: Document::default(),
            breakpoints: BreakpointSet::new(),
            stepper: DebugStepper::new(),
            evaluator,
            executor_id: executor_id.into(),
            debugger_enabled: true,
            read_only: false,
            debug_steps: Vec::new(),
        }
    }

    pub fn config(&self) -> &str {
        self.document.text()
    }

    /// Replaces the whole configuration, dropping line breakpoints the
    /// replacement invalidates (which is all of them, bar position 0 of
    /// a previously empty document).
    pub fn set_config(&mut self, text: impl Into<String>) {
        let edit = self.document.set_text(text);
        self.breakpoints.apply_edit(&edit);
    }

    /// Applies one edit to the document, rebasing breakpoints with it.
    pub fn edit(&mut self, edit: &TextEdit) {
        self.document.apply(edit);
        self.breakpoints.apply_edit(edit);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Gutter click: flips the breakpoint on a 1-based line. Returns
    /// whether the line now carries one; unknown lines are ignored.
    pub fn toggle_breakpoint_line(&mut self, line: usize) -> bool {
        match self.document.line_start(line) {
            Some(pos) => self.breakpoints.toggle(pos),
            None => false,
        }
    }

    pub fn has_breakpoints(&self) -> bool {
        self.breakpoints.has_any(&self.document)
    }

    pub fn breakpoint_lines(&self) -> BTreeSet<i64> {
        self.breakpoints.lines(&self.document)
    }

    pub fn executor_id(&self) -> &str {
        &self.executor_id
    }

    /// Switches the target executor. An active debug session belongs to
    /// the previous executor's run, so it is stopped first.
    pub fn set_executor(&mut self, executor_id: impl Into<String>) {
        if self.is_debugging() {
            self.stop_debugging();
        }
        self.executor_id = executor_id.into();
    }

    pub fn set_debugger_enabled(&mut self, enabled: bool) {
        self.debugger_enabled = enabled;
    }

    /// Host-requested base read-only state, independent of debugging.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// True while the editor should refuse edits: either the host asked
    /// for read-only, or a debug session is live.
    pub fn is_read_only(&self) -> bool {
        self.read_only || self.stepper.is_debugging()
    }

    pub fn is_debugging(&self) -> bool {
        self.stepper.is_debugging()
    }

    pub fn stepper_state(&self) -> StepperState {
        self.stepper.state()
    }

    pub fn current_line(&self) -> Option<i64> {
        self.stepper.current_line()
    }

    /// Registers a `debugging-line-changed` handler on the stepper.
    pub fn on_debugging_line_changed(&mut self, handler: impl FnMut(i64) + 'static) {
        self.stepper.on_debugging_line_changed(handler);
    }

    /// Registers a `stop-requested` handler on the stepper.
    pub fn on_stop_requested(&mut self, handler: impl FnMut() + 'static) {
        self.stepper.on_stop_requested(handler);
    }

    /// Evaluates the current configuration against `payload`.
    ///
    /// Debug mode is requested when the debugger is enabled and any
    /// line carries a breakpoint. On a successful debug run the
    /// per-step results are retained for display and the stepper starts
    /// a session; debug output that fails to parse degrades silently to
    /// no session at all.
    pub fn run(&mut self, payload_type: &str, payload: &str) -> ExecutionResult {
        let want_debug = self.debugger_enabled && self.has_breakpoints();
        let result = self.evaluator.execute(
            self.document.text(),
            payload_type,
            payload,
            &self.executor_id,
            want_debug,
        );

        self.debug_steps.clear();
        if want_debug && result.debug && !result.is_error() {
            match DebuggingInfo::parse(&result.value) {
                Some((info, steps)) => {
                    self.debug_steps = steps;
                    self.stepper.start(info, &self.breakpoint_lines());
                }
                None => {
                    debug!("discarding unparsable debug output");
                    self.stepper.reset();
                }
            }
        } else {
            // Every run replaces the previous snapshot; a non-debug run
            // replaces it with nothing.
            self.stepper.reset();
        }
        result
    }

    /// The per-step result at `index` from the most recent debug run.
    /// Negative indices (the clear sentinel) resolve to `None`.
    pub fn debug_step(&self, index: i64) -> Option<&ExecutionResult> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.debug_steps.get(i))
    }

    pub fn step_forward(&mut self) {
        self.stepper.step_forward();
    }

    pub fn step_backward(&mut self) {
        self.stepper.step_backward();
    }

    /// Resumes to the next breakpointed line, re-reading the breakpoint
    /// set so toggles made while paused take effect.
    pub fn resume(&mut self) {
        let lines = self.breakpoint_lines();
        self.stepper.resume(&lines);
    }

    pub fn stop_debugging(&mut self) {
        self.stepper.stop();
    }
}

impl std::fmt::Debug for ConfigPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigPanel")
            .field("executor_id", &self.executor_id)
            .field("breakpoints", &self.breakpoints)
            .field("stepper", &self.stepper)
            .finish()
    }
}
