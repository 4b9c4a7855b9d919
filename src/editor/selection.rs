//! Selection tracking and reflection of the active inline style.

use std::ops::Range;

use tracing::trace;

use crate::annotation::{AnnotationKind, AnnotationStore, InlineStyle, StyleFamily};

/// Receiver of style toggle state, typically a toolbar.
pub trait StylesBar {
    fn on_style_active_changed(&mut self, style: InlineStyle, active: bool);
}

impl<F> StylesBar for F
where
    F: FnMut(InlineStyle, bool),
{
    fn on_style_active_changed(&mut self, style: InlineStyle, active: bool) {
        self(style, active);
    }
}

/// A style toggling on or off under the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleChange {
    pub style: InlineStyle,
    pub active: bool,
}

/// Caret/selection plus what was last reported to the styles bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    start: usize,
    end: usize,
    reflected: Option<InlineStyle>,
    selection_styling: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub const fn caret(&self) -> usize {
        self.end
    }

    pub const fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Style last reported as active, if any.
    pub const fn reflected(&self) -> Option<InlineStyle> {
        self.reflected
    }

    /// Whether the next style trigger applies to the selection once.
    pub const fn is_selection_styling(&self) -> bool {
        self.selection_styling
    }

    pub(crate) fn finish_selection_styling(&mut self) {
        self.selection_styling = false;
    }

    /// Record a new selection and return the style changes to report.
    ///
    /// A collapsed caret at `p > 0` looks at the char before it. A caret at
    /// the very start reports nothing. A style already reported active is
    /// not reported again.
    pub fn update(&mut self, store: &AnnotationStore, range: Range<usize>) -> Vec<StyleChange> {
        self.start = range.start;
        self.end = range.end;
        if !self.is_collapsed() {
            self.selection_styling = true;
            trace!(?range, "selection styling armed");
            return Vec::new();
        }
        self.selection_styling = false;

        let caret = self.end;
        if caret == 0 {
            return Vec::new();
        }
        let under = store
            .query_in_range(&AnnotationKind::INLINE, caret - 1, caret)
            .iter()
            .find_map(|a| match a.kind().family() {
                StyleFamily::Inline(style) => Some(style),
                StyleFamily::List(_) | StyleFamily::Quote => None,
            });

        let mut changes = Vec::with_capacity(2);
        match (self.reflected, under) {
            (Some(old), Some(new)) if old == new => {}
            (old, Some(new)) => {
                if let Some(old) = old {
                    changes.push(StyleChange {
                        style: old,
                        active: false,
                    });
                }
                changes.push(StyleChange {
                    style: new,
                    active: true,
                });
                self.reflected = Some(new);
            }
            (Some(old), None) => {
                changes.push(StyleChange {
                    style: old,
                    active: false,
                });
                self.reflected = None;
            }
            (None, None) => {}
        }
        for change in &changes {
            trace!(style = ?change.style, active = change.active, "reflecting style");
        }
        changes
    }
}
