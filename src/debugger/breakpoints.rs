use std::collections::BTreeSet;

use crate::document::{Document, TextAnchor, TextEdit};

/// Line-anchored breakpoints for one document.
///
/// Anchors are byte positions, set by gutter clicks at line starts, and
/// are rebased across every edit. An anchor only counts as a line
/// breakpoint while it still sits exactly at a line start; an anchor
/// that an edit dragged into the middle of a line keeps existing but no
/// longer marks a line.
#[derive(Debug, Clone, Default)]
pub struct BreakpointSet {
    anchors: BTreeSet<TextAnchor>,
}

impl BreakpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips breakpoint presence at `pos`. Returns whether a breakpoint
    /// is present afterwards.
    pub fn toggle(&mut self, pos: usize) -> bool {
        let anchor = TextAnchor::new(pos);
        if self.anchors.remove(&anchor) {
            false
        } else {
            self.anchors.insert(anchor);
            true
        }
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.anchors.contains(&TextAnchor::new(pos))
    }

    pub fn count(&self) -> usize {
        self.anchors.len()
    }

    pub fn clear(&mut self) {
        self.anchors.clear();
    }

    /// Rebases every anchor through `edit`. Anchors whose byte range was
    /// deleted are dropped; anchors that collapse onto the same position
    /// are merged.
    pub fn apply_edit(&mut self, edit: &TextEdit) {
        self.anchors = self.anchors.iter().filter_map(|a| a.map(edit)).collect();
    }

    /// True if at least one breakpoint sits on a line of `doc`.
    pub fn has_any(&self, doc: &Document) -> bool {
        self.anchors.iter().any(|a| doc.is_line_start(a.pos()))
    }

    /// The 1-based lines of `doc` carrying a breakpoint.
    pub fn lines(&self, doc: &Document) -> BTreeSet<i64> {
        self.anchors
            .iter()
            .filter(|a| doc.is_line_start(a.pos()))
            .map(|a| doc.line_at(a.pos()) as i64)
            .collect()
    }
}
