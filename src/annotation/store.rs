use std::ops::Range;

use tracing::trace;

use super::types::{Annotation, AnnotationId, AnnotationKind, Mark, RangeError};
use crate::editor::buffer::{EditDelta, EditError, TextBuffer};

/// The document text plus every annotation attached to it.
///
/// Annotation ranges follow exclusive-exclusive semantics: an insertion
/// exactly at `start` or `end` never grows the annotation, only insertions
/// strictly inside it do. Ranges are kept valid across every edit and an
/// annotation whose range collapses to nothing is dropped.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    buffer: TextBuffer,
    annotations: Vec<Annotation>,
    next_id: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `text` with no annotations.
    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: TextBuffer::from_text(text),
            ..Self::default()
        }
    }

    /// A store holding `text` with the given annotations.
    ///
    /// # Errors
    /// Returns the first [`RangeError`] among `marks`.
    pub fn from_parts(
        text: &str,
        marks: impl IntoIterator<Item = (Mark, Range<usize>)>,
    ) -> Result<Self, RangeError> {
        let mut store = Self::from_text(text);
        for (mark, range) in marks {
            store.add_annotation(mark, range)?;
        }
        Ok(store)
    }

    pub const fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Buffer length in chars.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Insert `text` at `pos`.
    ///
    /// # Errors
    /// Returns [`EditError`] if `pos` is past the end of the buffer.
    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<EditDelta, EditError> {
        self.replace_text(pos, 0, text)
    }

    /// Delete `len` chars at `pos`.
    ///
    /// # Errors
    /// Returns [`EditError`] if the range runs past the end of the buffer.
    pub fn delete_text(&mut self, pos: usize, len: usize) -> Result<EditDelta, EditError> {
        self.replace_text(pos, len, "")
    }

    /// Replace `removed` chars at `pos` with `text`, then adjust annotations:
    /// first for the removal, then for the insertion.
    ///
    /// # Errors
    /// Returns [`EditError`] if the replaced range runs past the end of the buffer.
    pub fn replace_text(
        &mut self,
        pos: usize,
        removed: usize,
        text: &str,
    ) -> Result<EditDelta, EditError> {
        let delta = self.buffer.replace(pos, removed, text)?;
        self.shift_for_removal(delta.position, delta.removed);
        self.shift_for_insertion(delta.position, delta.inserted);
        Ok(delta)
    }

    /// Append text at the end of the buffer.
    pub(crate) fn append(&mut self, text: &str) -> EditDelta {
        let delta = self.buffer.append(text);
        self.shift_for_insertion(delta.position, delta.inserted);
        delta
    }

    /// Attach an annotation to `range`.
    ///
    /// # Errors
    /// Returns [`RangeError`] if the range is reversed, empty or past the end.
    pub fn add_annotation(
        &mut self,
        mark: Mark,
        range: Range<usize>,
    ) -> Result<AnnotationId, RangeError> {
        self.validate(&range)?;
        let id = AnnotationId(self.next_id);
        self.next_id += 1;
        trace!(?id, ?mark, ?range, "annotation added");
        self.annotations.push(Annotation { id, mark, range });
        Ok(id)
    }

    fn validate(&self, range: &Range<usize>) -> Result<(), RangeError> {
        let (start, end) = (range.start, range.end);
        if start > end {
            return Err(RangeError::Reversed { start, end });
        }
        if end > self.len() {
            return Err(RangeError::OutOfBounds {
                start,
                end,
                len: self.len(),
            });
        }
        if start == end {
            return Err(RangeError::Empty { at: start });
        }
        Ok(())
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// Swap the payload of an annotation in place, keeping its range.
    ///
    /// Returns the previous mark, or `None` if the annotation is gone.
    pub fn replace_mark(&mut self, id: AnnotationId, mark: Mark) -> Option<Mark> {
        let annotation = self.annotations.iter_mut().find(|a| a.id == id)?;
        Some(std::mem::replace(&mut annotation.mark, mark))
    }

    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let idx = self.annotations.iter().position(|a| a.id == id)?;
        Some(self.annotations.remove(idx))
    }

    /// Every annotation in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Annotations covering the char at `pos`.
    pub fn query_at(&self, pos: usize) -> Vec<&Annotation> {
        self.annotations.iter().filter(|a| a.contains(pos)).collect()
    }

    /// Annotations of `kinds` intersecting `start..end`, ordered by `(start, end)`.
    ///
    /// A non-empty query only matches annotations that overlap it; sharing a
    /// boundary is not enough. An empty query matches annotations touching
    /// the position.
    pub fn query_in_range(
        &self,
        kinds: &[AnnotationKind],
        start: usize,
        end: usize,
    ) -> Vec<&Annotation> {
        let mut found: Vec<&Annotation> = self
            .annotations
            .iter()
            .filter(|a| kinds.contains(&a.kind()))
            .filter(|a| {
                if start == end {
                    a.start() <= start && start <= a.end()
                } else {
                    a.start() < end && a.end() > start
                }
            })
            .collect();
        found.sort_by_key(|a| (a.start(), a.end()));
        found
    }

    /// Every annotation of `kinds`, in no particular order.
    pub fn all_of_kinds(&self, kinds: &[AnnotationKind]) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .filter(|a| kinds.contains(&a.kind()))
            .collect()
    }

    fn shift_for_insertion(&mut self, pos: usize, inserted: usize) {
        if inserted == 0 {
            return;
        }
        for annotation in &mut self.annotations {
            let range = &mut annotation.range;
            if pos <= range.start {
                range.start += inserted;
                range.end += inserted;
            } else if pos < range.end {
                range.end += inserted;
            }
        }
    }

    fn shift_for_removal(&mut self, pos: usize, removed: usize) {
        if removed == 0 {
            return;
        }
        let cut_end = pos + removed;
        let map = |x: usize| {
            if x <= pos {
                x
            } else if x >= cut_end {
                x - removed
            } else {
                pos
            }
        };
        self.annotations.retain_mut(|annotation| {
            annotation.range = map(annotation.range.start)..map(annotation.range.end);
            if annotation.range.is_empty() {
                trace!(id = ?annotation.id, "annotation collapsed by deletion");
                return false;
            }
            true
        });
    }
}
