use ropey::Rope;

/// A text edit that does not fit inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("edit {start}..{end} is outside a buffer of {len} chars")]
pub struct EditError {
    pub start: usize,
    pub end: usize,
    pub len: usize,
}

/// Position and size of one applied edit, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditDelta {
    /// Char offset where the edit happened.
    pub position: usize,
    /// Number of chars removed at `position`.
    pub removed: usize,
    /// Number of chars inserted at `position`.
    pub inserted: usize,
}

impl EditDelta {
    /// Whether the edit added characters (typing rather than replacing).
    pub const fn grew(&self) -> bool {
        self.inserted > self.removed
    }
}

/// A text buffer backed by a rope data structure.
///
/// All offsets are char (Unicode scalar value) indices, never bytes.
pub struct TextBuffer {
    rope: Rope,
}

impl TextBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Whether the buffer text ends with `suffix`.
    pub fn ends_with(&self, suffix: &str) -> bool {
        let n = suffix.chars().count();
        let len = self.len();
        n <= len && self.rope.slice(len - n..len) == suffix
    }

    /// Replace `removed` chars at `position` with `text`.
    ///
    /// # Errors
    /// Returns [`EditError`] if `position + removed` is past the end of the buffer.
    pub fn replace(
        &mut self,
        position: usize,
        removed: usize,
        text: &str,
    ) -> Result<EditDelta, EditError> {
        let len = self.len();
        let end = position.saturating_add(removed);
        if end > len {
            return Err(EditError {
                start: position,
                end,
                len,
            });
        }
        if removed > 0 {
            self.rope.remove(position..end);
        }
        let inserted = text.chars().count();
        if inserted > 0 {
            self.rope.insert(position, text);
        }
        Ok(EditDelta {
            position,
            removed,
            inserted,
        })
    }

    /// Append `text` at the end. Appending can never be out of bounds.
    pub fn append(&mut self, text: &str) -> EditDelta {
        let position = self.len();
        self.rope.insert(position, text);
        EditDelta {
            position,
            removed: 0,
            inserted: text.chars().count(),
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field(
                "rope",
                &format_args!(
                    "Rope({} chars, {} lines)",
                    self.rope.len_chars(),
                    self.rope.len_lines()
                ),
            )
            .finish()
    }
}
