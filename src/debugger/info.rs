use std::collections::HashMap;

use crate::engine::ExecutionResult;

/// Snapshot of one debug run.
///
/// `lines` is the source line executed at each step, in execution order
/// and with duplicates preserved. `line_result_index` maps a line
/// number to the index of that line's per-step result; when a line
/// executes more than once the last execution wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebuggingInfo {
    pub debugging: bool,
    pub lines: Vec<i64>,
    pub line_result_index: HashMap<i64, usize>,
}

impl DebuggingInfo {
    /// Builds a snapshot from the engine's ordered per-step results.
    pub fn from_steps(steps: &[ExecutionResult]) -> Self {
        let lines: Vec<i64> = steps.iter().map(|s| s.line).collect();
        let mut line_result_index = HashMap::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            line_result_index.insert(*line, i);
        }
        Self {
            debugging: true,
            lines,
            line_result_index,
        }
    }

    /// Parses the raw debug `value` payload (a JSON array of per-step
    /// results). Returns `None` when the payload does not parse; the
    /// caller degrades to an inactive session.
    pub fn parse(debug_value: &str) -> Option<(Self, Vec<ExecutionResult>)> {
        let steps: Vec<ExecutionResult> = serde_json::from_str(debug_value).ok()?;
        let info = Self::from_steps(&steps);
        Some((info, steps))
    }

    /// Index of `line`'s per-step result, if the line was executed.
    pub fn result_index(&self, line: i64) -> Option<usize> {
        self.line_result_index.get(&line).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
