use std::ops::Range;

use tracing::{trace, warn};

use crate::annotation::{AnnotationId, AnnotationStore, InlineStyle, RangeError};
use crate::editor::buffer::EditDelta;

/// Apply `style` once over a selected range.
///
/// # Errors
/// Returns [`RangeError`] if the selection is not a valid range of the buffer.
pub fn style_selection(
    store: &mut AnnotationStore,
    style: InlineStyle,
    range: Range<usize>,
) -> Result<AnnotationId, RangeError> {
    trace!(?style, ?range, "styling selection");
    store.add_annotation(style.mark(), range)
}

/// An armed "style the next characters typed" subscription.
///
/// Each keystroke gets its own single-char annotation, so styled and plain
/// runs typed back to back stay separate annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingSession {
    style: InlineStyle,
}

impl TypingSession {
    pub const fn new(style: InlineStyle) -> Self {
        Self { style }
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }

    /// Style the char typed at the start of `delta`, if the edit typed anything.
    pub fn observe(&self, store: &mut AnnotationStore, delta: EditDelta) -> Option<AnnotationId> {
        if !delta.grew() {
            return None;
        }
        let range = delta.position..delta.position + 1;
        match store.add_annotation(self.style.mark(), range) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(style = ?self.style, %err, "could not style typed character");
                None
            }
        }
    }
}
