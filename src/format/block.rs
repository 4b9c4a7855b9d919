use tracing::{debug, warn};

use super::EditContext;
use crate::annotation::{AnnotationId, ListStyle, RangeError};
use crate::editor::buffer::EditDelta;

/// An armed list mode: re-seeds the next item marker on every newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContinuation {
    style: ListStyle,
    next_ordinal: usize,
}

impl ListContinuation {
    /// Seed the first item marker at the end of the buffer and arm continuation.
    ///
    /// A fresh line is started unless the buffer is empty or already ends
    /// with a newline that no other list kind is sitting on.
    ///
    /// # Errors
    /// Returns [`RangeError`] if the marker annotation can not be placed.
    pub fn seed(style: ListStyle, ctx: &mut EditContext<'_>) -> Result<Self, RangeError> {
        let len = ctx.store.len();
        if len > 0 {
            let trailing = len.saturating_sub(2);
            let mixed = !ctx
                .store
                .query_in_range(&style.other_kinds(), trailing, len)
                .is_empty();
            if mixed || !ctx.store.buffer().ends_with("\n") {
                ctx.store.append("\n");
            }
        }
        let mut continuation = Self {
            style,
            next_ordinal: 1,
        };
        continuation.place_marker(ctx)?;
        debug!(?style, "list mode seeded");
        Ok(continuation)
    }

    pub const fn style(&self) -> ListStyle {
        self.style
    }

    /// Ordinal the next ordered item will carry.
    pub const fn next_ordinal(&self) -> usize {
        self.next_ordinal
    }

    /// Seed a new marker if the user just ended the buffer with a newline.
    pub fn observe(&mut self, ctx: &mut EditContext<'_>, delta: EditDelta) -> Option<AnnotationId> {
        if !delta.grew() || !ctx.store.buffer().ends_with("\n") {
            return None;
        }
        match self.place_marker(ctx) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(style = ?self.style, %err, "could not continue list");
                None
            }
        }
    }

    fn place_marker(&mut self, ctx: &mut EditContext<'_>) -> Result<AnnotationId, RangeError> {
        let placeholder = self.style.placeholder();
        let delta = ctx.store.append(placeholder);
        let range = delta.position..delta.position + delta.inserted;
        let id = ctx
            .store
            .add_annotation(self.style.seed_mark(self.next_ordinal), range)?;
        if self.style == ListStyle::Ordered {
            self.next_ordinal += 1;
        }
        if self.style == ListStyle::Task {
            ctx.activations.register(id);
        }
        Ok(id)
    }
}
