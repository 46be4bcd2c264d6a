use std::sync::{Arc, Mutex};

/// Log lines captured while an executor runs.
///
/// Clones share the same buffer, so an executor can hand one side to
/// the engine internals and drain the other into results. Draining
/// empties the buffer.
#[derive(Debug, Clone, Default)]
pub struct ObservedLogs {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ObservedLogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(line.into());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn take_all(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }

    /// Drains the buffer into one newline-separated string.
    pub fn take_all_string(&self) -> String {
        self.take_all().join("\n")
    }
}
