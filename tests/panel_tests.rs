use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use statement_playground::{
    ConfigPanel, Debugger, EngineError, Evaluator, ExecutionResult, Executor, ExecutorRegistry,
    Metadata, Observable, ObservedLogs, PayloadType, StepperState,
};

const CONFIG: &str = "set(one)\nset(two)\nset(three)\n";

// An evaluator that records what it was asked and replays a canned result
struct ScriptedEvaluator {
    calls: RefCell<Vec<(String, String, String, bool)>>,
    result: RefCell<ExecutionResult>,
}

impl ScriptedEvaluator {
    fn returning(result: ExecutionResult) -> Arc<Self> {
        Arc::new(Self {
            calls: RefCell::new(Vec::new()),
            result: RefCell::new(result),
        })
    }

    fn last_call(&self) -> (String, String, String, bool) {
        self.calls.borrow().last().cloned().expect("evaluated once")
    }
}

impl Evaluator for ScriptedEvaluator {
    fn execute(
        &self,
        config: &str,
        payload_type: &str,
        payload: &str,
        _executor_id: &str,
        debug: bool,
    ) -> ExecutionResult {
        self.calls.borrow_mut().push((
            config.to_string(),
            payload_type.to_string(),
            payload.to_string(),
            debug,
        ));
        self.result.borrow().clone()
    }
}

// Debug payload: one per-step result per executed line
fn debug_result(lines: &[i64]) -> ExecutionResult {
    let steps: Vec<ExecutionResult> = lines
        .iter()
        .map(|line| ExecutionResult {
            line: *line,
            value: format!("{{\"after_line\":{line}}}"),
            ..Default::default()
        })
        .collect();
    ExecutionResult {
        value: serde_json::to_string(&steps).unwrap(),
        debug: true,
        ..Default::default()
    }
}

fn watch_lines(panel: &mut ConfigPanel) -> Rc<RefCell<Vec<i64>>> {
    let emitted = Rc::new(RefCell::new(Vec::new()));
    let sink = emitted.clone();
    panel.on_debugging_line_changed(move |idx| sink.borrow_mut().push(idx));
    emitted
}

mod panel_run_tests {
    use super::*;

    #[test]
    fn run_without_breakpoints_skips_debug_mode() {
        let evaluator = ScriptedEvaluator::returning(ExecutionResult {
            value: "{}".into(),
            ..Default::default()
        });
        let mut panel = ConfigPanel::new(evaluator.clone(), "transform_processor");
        panel.set_config(CONFIG);

        let result = panel.run("logs", "{}");

        let (config, payload_type, _, debug) = evaluator.last_call();
        assert_eq!(config, CONFIG);
        assert_eq!(payload_type, "logs");
        assert!(!debug, "no breakpoints, no debug request");
        assert!(!result.is_error());
        assert!(!panel.is_debugging());
        assert!(!panel.is_read_only());
    }

    #[test]
    fn run_with_breakpoints_starts_a_session() {
        let evaluator = ScriptedEvaluator::returning(debug_result(&[1, 2, 3]));
        let mut panel = ConfigPanel::new(evaluator.clone(), "transform_processor");
        panel.set_config(CONFIG);
        panel.toggle_breakpoint_line(2);
        let emitted = watch_lines(&mut panel);

        panel.run("logs", "{}");

        let (_, _, _, debug) = evaluator.last_call();
        assert!(debug, "breakpoints present, debug requested");
        assert!(panel.is_debugging());
        assert!(panel.is_read_only(), "editing is locked while debugging");
        assert_eq!(panel.stepper_state(), StepperState::AtBreakpoint(1));
        assert_eq!(panel.current_line(), Some(2));
        assert_eq!(*emitted.borrow(), vec![0]);
        let step = panel.debug_step(0).expect("step retained for display");
        assert_eq!(step.value, "{\"after_line\":1}");
    }

    #[test]
    fn debug_disabled_never_requests_debug() {
        let evaluator = ScriptedEvaluator::returning(ExecutionResult::default());
        let mut panel = ConfigPanel::new(evaluator.clone(), "transform_processor");
        panel.set_config(CONFIG);
        panel.toggle_breakpoint_line(2);
        panel.set_debugger_enabled(false);

        panel.run("logs", "{}");

        let (_, _, _, debug) = evaluator.last_call();
        assert!(!debug);
    }

    #[test]
    fn malformed_debug_output_degrades_silently() {
        let evaluator = ScriptedEvaluator::returning(ExecutionResult {
            value: "not json at all".into(),
            debug: true,
            ..Default::default()
        });
        let mut panel = ConfigPanel::new(evaluator, "transform_processor");
        panel.set_config(CONFIG);
        panel.toggle_breakpoint_line(2);
        let emitted = watch_lines(&mut panel);

        let result = panel.run("logs", "{}");

        assert!(!result.is_error(), "the raw result is still handed back");
        assert!(!panel.is_debugging(), "no session on unparsable output");
        assert!(!panel.is_read_only());
        assert!(emitted.borrow().is_empty(), "degradation is silent");
        assert_eq!(panel.stepper_state(), StepperState::Inactive);
    }

    #[test]
    fn error_results_do_not_start_a_session() {
        let evaluator = ScriptedEvaluator::returning(ExecutionResult::error("bad config", ""));
        let mut panel = ConfigPanel::new(evaluator, "transform_processor");
        panel.set_config(CONFIG);
        panel.toggle_breakpoint_line(1);

        let result = panel.run("logs", "{}");

        assert!(result.is_error());
        assert!(!panel.is_debugging());
    }

    #[test]
    fn stop_unlocks_the_editor_and_clears_display() {
        let evaluator = ScriptedEvaluator::returning(debug_result(&[1, 2, 3]));
        let mut panel = ConfigPanel::new(evaluator, "transform_processor");
        panel.set_config(CONFIG);
        panel.toggle_breakpoint_line(2);
        let emitted = watch_lines(&mut panel);
        let stops = Rc::new(RefCell::new(0usize));
        let counter = stops.clone();
        panel.on_stop_requested(move || *counter.borrow_mut() += 1);

        panel.run("logs", "{}");
        panel.stop_debugging();

        assert!(!panel.is_debugging());
        assert!(!panel.is_read_only());
        assert_eq!(*emitted.borrow(), vec![0, -1]);
        assert_eq!(*stops.borrow(), 1);
    }

    #[test]
    fn stepping_through_a_session_walks_the_results() {
        let evaluator = ScriptedEvaluator::returning(debug_result(&[1, 2, 3]));
        let mut panel = ConfigPanel::new(evaluator, "transform_processor");
        panel.set_config(CONFIG);
        panel.toggle_breakpoint_line(2);
        let emitted = watch_lines(&mut panel);

        panel.run("logs", "{}");
        panel.step_forward();
        panel.step_backward();
        panel.resume();

        // Pause before line 2, step to line 3, back to line 2, then no
        // breakpoint remains past line 2 so resume runs out the session.
        assert_eq!(*emitted.borrow(), vec![0, 1, 0, 2]);
        assert!(!panel.is_debugging());
        assert!(!panel.is_read_only());
    }

    #[test]
    fn resume_honors_breakpoints_toggled_mid_session() {
        let evaluator = ScriptedEvaluator::returning(debug_result(&[1, 2, 3]));
        let mut panel = ConfigPanel::new(evaluator, "transform_processor");
        panel.set_config(CONFIG);
        panel.toggle_breakpoint_line(1);
        let emitted = watch_lines(&mut panel);

        panel.run("logs", "{}");
        panel.toggle_breakpoint_line(3);
        panel.resume();

        assert_eq!(panel.current_line(), Some(3));
        assert_eq!(*emitted.borrow(), vec![-1, 1]);
    }

    #[test]
    fn switching_executor_stops_an_active_session() {
        let evaluator = ScriptedEvaluator::returning(debug_result(&[1, 2]));
        let mut panel = ConfigPanel::new(evaluator, "transform_processor");
        panel.set_config(CONFIG);
        panel.toggle_breakpoint_line(1);
        panel.run("logs", "{}");
        assert!(panel.is_debugging());

        panel.set_executor("filter_processor");

        assert!(!panel.is_debugging());
        assert_eq!(panel.executor_id(), "filter_processor");
    }

    #[test]
    fn fresh_run_replaces_retained_steps() {
        let evaluator = ScriptedEvaluator::returning(debug_result(&[1, 2]));
        let mut panel = ConfigPanel::new(evaluator.clone(), "transform_processor");
        panel.set_config(CONFIG);
        panel.toggle_breakpoint_line(1);
        panel.run("logs", "{}");
        assert!(panel.debug_step(1).is_some());

        *evaluator.result.borrow_mut() = ExecutionResult::default();
        panel.run("logs", "{}");

        assert!(panel.debug_step(0).is_none(), "stale steps are dropped");
        assert!(panel.debug_step(-1).is_none());
        assert!(!panel.is_debugging(), "the old session does not outlive its run");
    }
}

// A minimal executor pair backing the registry tests: execution echoes
// the payload, debugging yields one step per non-empty config line.
struct EchoDebugger {
    logs: ObservedLogs,
}

impl Observable for EchoDebugger {
    fn observed_logs(&self) -> &ObservedLogs {
        &self.logs
    }
}

impl Debugger for EchoDebugger {
    fn debug(
        &self,
        _payload_type: PayloadType,
        config: &str,
        payload: &str,
    ) -> Result<Vec<ExecutionResult>, EngineError> {
        Ok(config
            .lines()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, _)| ExecutionResult {
                line: (i + 1) as i64,
                value: payload.to_string(),
                ..Default::default()
            })
            .collect())
    }
}

struct EchoExecutor {
    metadata: Metadata,
    logs: ObservedLogs,
    debugger: Option<EchoDebugger>,
    fail_with: Option<String>,
}

impl EchoExecutor {
    fn new(id: &str, debuggable: bool) -> Self {
        Self {
            metadata: Metadata::processor(id, "Echo", "echo", "v0.1.0", "https://example.invalid"),
            logs: ObservedLogs::new(),
            debugger: debuggable.then(|| EchoDebugger {
                logs: ObservedLogs::new(),
            }),
            fail_with: None,
        }
    }

    fn failing(id: &str, message: &str) -> Self {
        let mut executor = Self::new(id, false);
        executor.fail_with = Some(message.to_string());
        executor
    }
}

impl Observable for EchoExecutor {
    fn observed_logs(&self) -> &ObservedLogs {
        &self.logs
    }
}

impl Executor for EchoExecutor {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn execute(
        &self,
        payload_type: PayloadType,
        _config: &str,
        payload: &str,
    ) -> Result<String, EngineError> {
        if let Some(message) = &self.fail_with {
            return Err(EngineError::Execution(message.clone()));
        }
        self.logs.push(format!("ran {payload_type} statements"));
        Ok(payload.to_string())
    }

    fn debugger(&self) -> Option<&dyn Debugger> {
        self.debugger.as_ref().map(|d| d as &dyn Debugger)
    }
}

fn registry() -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();
    registry.register(Box::new(EchoExecutor::new("transform_processor", true)));
    registry.register(Box::new(EchoExecutor::new("filter_processor", false)));
    registry
}

mod registry_tests {
    use super::*;

    #[test]
    fn unknown_executor_becomes_an_error_result() {
        let result = registry().execute("", "logs", "{}", "nope", false);
        assert_eq!(result.error.as_deref(), Some("unsupported evaluator nope"));
    }

    #[test]
    fn unknown_payload_type_becomes_an_error_result() {
        let result = registry().execute("", "gauges", "{}", "transform_processor", false);
        assert_eq!(
            result.error.as_deref(),
            Some("unsupported payload type gauges")
        );
    }

    #[test]
    fn normal_run_times_and_drains_logs() {
        let result = registry().execute("set(one)", "logs", "{\"a\":1}", "transform_processor", false);

        assert!(!result.is_error());
        assert_eq!(result.value, "{\"a\":1}");
        assert!(result.execution_time >= 0);
        assert!(result.logs.contains("ran logs statements"));
        assert!(!result.debug);
    }

    #[test]
    fn execution_failure_carries_logs_into_the_error_result() {
        let mut registry = ExecutorRegistry::new();
        registry.register(Box::new(EchoExecutor::failing("broken", "boom")));

        let result = registry.execute("", "traces", "{}", "broken", false);

        assert_eq!(
            result.error.as_deref(),
            Some("unable to run traces statements: execution failed: boom")
        );
    }

    #[test]
    fn debug_request_without_debugger_is_an_error_result() {
        let result = registry().execute("", "logs", "{}", "filter_processor", true);
        assert_eq!(
            result.error.as_deref(),
            Some("executor filter_processor does not support debugging")
        );
    }

    #[test]
    fn debug_run_encodes_per_step_results() {
        let result = registry().execute(CONFIG, "logs", "{}", "transform_processor", true);

        assert!(result.debug);
        assert!(!result.is_error());
        let steps: Vec<ExecutionResult> = serde_json::from_str(&result.value).unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].line, 1);
        assert_eq!(steps[2].line, 3);
    }

    #[test]
    fn metadata_reports_actual_debuggability() {
        let all = registry().metadata();
        let by_id = |id: &str| all.iter().find(|m| m.id == id).unwrap().clone();

        assert!(by_id("transform_processor").debuggable);
        assert!(!by_id("filter_processor").debuggable);
    }

    #[test]
    fn metadata_serializes_with_frontend_field_names() {
        let meta = registry().metadata().remove(0);
        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["type"], "processor");
        assert_eq!(json["id"], "transform_processor");
        assert_eq!(json["docsURL"], "https://example.invalid");
        assert_eq!(json["resultViewConfig"]["visual_delta"], true);
    }

    #[test]
    fn payload_types_parse_round_trip() {
        for name in ["logs", "traces", "metrics", "profiles"] {
            let parsed: PayloadType = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
        assert!("gauges".parse::<PayloadType>().is_err());
    }
}

mod end_to_end_tests {
    use super::*;

    #[test]
    fn panel_debugs_through_the_registry() {
        let mut panel = ConfigPanel::new(Arc::new(registry()), "transform_processor");
        panel.set_config(CONFIG);
        panel.toggle_breakpoint_line(2);
        let emitted = watch_lines(&mut panel);

        let result = panel.run("logs", "{\"resource\":{}}");

        assert!(result.debug);
        assert!(panel.is_debugging());
        assert_eq!(panel.current_line(), Some(2));
        assert_eq!(*emitted.borrow(), vec![0]);
        assert_eq!(
            panel.debug_step(0).map(|s| s.value.as_str()),
            Some("{\"resource\":{}}")
        );

        panel.resume();
        assert!(!panel.is_debugging(), "no breakpoint after line 2");
        assert_eq!(*emitted.borrow(), vec![0, 2]);
    }

    #[test]
    fn serialized_results_round_trip_the_wire_shape() {
        let result = registry().execute("set(one)", "logs", "{}", "transform_processor", false);
        let json = serde_json::to_value(&result).unwrap();

        assert!(json.get("executionTime").is_some(), "camelCase wire name");
        assert!(json.get("error").is_none(), "error omitted when absent");

        let back: ExecutionResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
