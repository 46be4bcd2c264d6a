/// A single edit: replace the byte range `[from, to)` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub from: usize,
    pub to: usize,
    pub text: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            from: at,
            to: at,
            text: text.into(),
        }
    }

    pub fn delete(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            text: String::new(),
        }
    }

    pub fn replace(from: usize, to: usize, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            text: text.into(),
        }
    }

    /// Replaces an entire document of length `len`.
    pub fn replace_all(len: usize, text: impl Into<String>) -> Self {
        Self::replace(0, len, text)
    }

    pub fn inserted_len(&self) -> usize {
        self.text.len()
    }

    pub fn deleted_len(&self) -> usize {
        self.to - self.from
    }
}

/// A byte position that survives document edits.
///
/// Anchors use standard rebasing rules: edits before the anchor shift
/// it, edits after it leave it alone, and a deletion covering the
/// anchored byte removes it. A pure insertion exactly at the anchor
/// keeps the anchor before the inserted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextAnchor {
    pos: usize,
}

impl TextAnchor {
    pub fn new(pos: usize) -> Self {
        Self { pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Rebases this anchor through `edit`, or `None` if the anchored
    /// byte was deleted.
    pub fn map(self, edit: &TextEdit) -> Option<TextAnchor> {
        if self.pos < edit.from {
            return Some(self);
        }
        if edit.from == edit.to {
            // Pure insertion. At the anchor itself the anchor stays put;
            // strictly before it, the anchor shifts right.
            if self.pos == edit.from {
                return Some(self);
            }
            return Some(TextAnchor::new(self.pos + edit.inserted_len()));
        }
        if self.pos < edit.to {
            // The anchored byte is inside the replaced range.
            return None;
        }
        Some(TextAnchor::new(
            self.pos - edit.deleted_len() + edit.inserted_len(),
        ))
    }
}

/// In-memory model of the configuration text with a line-start index.
///
/// Lines are 1-based. `line_starts[i]` is the byte offset of line
/// `i + 1`; the index is rebuilt after every edit.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = index_lines(&text);
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based line containing byte offset `pos`.
    pub fn line_at(&self, pos: usize) -> usize {
        match self.line_starts.binary_search(&pos) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    /// Byte offset of the start of 1-based `line`, if it exists.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return None;
        }
        self.line_starts.get(line - 1).copied()
    }

    pub fn is_line_start(&self, pos: usize) -> bool {
        self.line_starts.binary_search(&pos).is_ok()
    }

    /// Applies `edit`, clamping its range to the document bounds.
    pub fn apply(&mut self, edit: &TextEdit) {
        let from = edit.from.min(self.text.len());
        let to = edit.to.clamp(from, self.text.len());
        self.text.replace_range(from..to, &edit.text);
        self.line_starts = index_lines(&self.text);
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> TextEdit {
        let edit = TextEdit::replace_all(self.text.len(), text);
        self.apply(&edit);
        edit
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

fn index_lines(text: &str) -> Vec<usize> {
    let mut starts = vec![0usize];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}
