//! Ranged formatting annotations over the editable text.
//!
//! This module handles:
//! - The annotation kinds and their payloads
//! - Keeping annotation ranges offset-correct while text is edited
//! - Range-intersection queries used by the controllers and serialization

mod store;
mod types;

pub use store::AnnotationStore;
pub use types::{
    Annotation, AnnotationId, AnnotationKind, InlineStyle, ListStyle, Mark, RangeError,
    StyleFamily,
};
