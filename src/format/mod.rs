//! Live formatting controllers.
//!
//! Controllers observe user edits after the annotation store has already
//! shifted its ranges, and may add annotations of their own kind in
//! response. Text they insert themselves goes straight to the store and is
//! never fed back to the controllers, so a continuation can not re-trigger
//! itself.

mod block;
mod inline;
mod session;

pub use block::ListContinuation;
pub use inline::{TypingSession, style_selection};
pub use session::{Session, SessionRegistry};

use crate::annotation::AnnotationStore;
use crate::interaction::ActivationRegistry;

/// Mutable state a controller may touch while reacting to an edit.
#[derive(Debug)]
pub struct EditContext<'a> {
    pub store: &'a mut AnnotationStore,
    pub activations: &'a mut ActivationRegistry,
}

impl<'a> EditContext<'a> {
    pub const fn new(
        store: &'a mut AnnotationStore,
        activations: &'a mut ActivationRegistry,
    ) -> Self {
        Self { store, activations }
    }
}
