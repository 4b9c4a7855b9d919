//! Pointer activation of task-item markers.
//!
//! Every task item registers an activation region equal to its own range.
//! Activating a position inside that region flips the item's `done` flag in
//! place. The text is never touched and nothing is re-serialized.

use tracing::debug;

use crate::annotation::{AnnotationId, AnnotationStore, Mark};

/// Outcome of a successful task toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskToggle {
    pub id: AnnotationId,
    pub done: bool,
}

/// Task items that respond to pointer activation.
#[derive(Debug, Default)]
pub struct ActivationRegistry {
    targets: Vec<AnnotationId>,
}

impl ActivationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: AnnotationId) {
        if !self.targets.contains(&id) {
            self.targets.push(id);
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Flip the task item whose region contains `pos`.
    ///
    /// Targets whose annotation has since been removed are stale and are
    /// dropped here; activating one is a no-op.
    pub fn activate(&mut self, store: &mut AnnotationStore, pos: usize) -> Option<TaskToggle> {
        let before = self.targets.len();
        self.targets.retain(|id| store.get(*id).is_some());
        if self.targets.len() != before {
            debug!(
                pruned = before - self.targets.len(),
                "dropped stale task activation targets"
            );
        }

        let (id, done) = self.targets.iter().find_map(|id| {
            let annotation = store.get(*id)?;
            match annotation.mark() {
                Mark::TaskItem { done } if annotation.contains(pos) => Some((*id, done)),
                _ => None,
            }
        })?;

        store.replace_mark(id, Mark::TaskItem { done: !done })?;
        debug!(?id, done = !done, "task item toggled");
        Some(TaskToggle { id, done: !done })
    }
}
