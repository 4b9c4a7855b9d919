// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. annotation::AnnotationKind)
    clippy::module_name_repetitions
)]

//! # Markedit
//!
//! An embeddable rich-text editing core that keeps a text buffer, its
//! formatting annotations and a markdown rendering of both in sync.
//!
//! Markedit handles:
//! - Offset-correct annotation ranges while text is typed and deleted
//! - Live styling of typed text (bold, italic, strikethrough)
//! - Bullet, ordered and task list continuation on every newline
//! - Serializing the annotated buffer back to markdown
//! - Reflecting the style under the caret and toggling task items
//!
//! ## Architecture
//!
//! Every user edit flows through the [`editor::Editor`]:
//! - **Store**: the text is edited and annotation ranges are shifted
//! - **Sessions**: armed formatting controllers observe the edit
//! - **Selection**: the caret moves and the active style is reflected
//! - **Markdown**: serialization and rendering happen on demand
//!
//! ## Modules
//!
//! - [`annotation`]: Annotation types and the annotation store
//! - [`format`]: Live formatting controllers and their sessions
//! - [`markdown`]: Markdown serialization and rendering
//! - [`editor`]: The editing surface and input scripts
//! - [`interaction`]: Task item activation
//! - [`config`]: Configuration flags and the task palette
//! - [`perf`]: Timing and debug event logging

pub mod annotation;
pub mod config;
pub mod editor;
pub mod format;
pub mod interaction;
pub mod markdown;
pub mod perf;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::annotation::{AnnotationKind, AnnotationStore, Mark};
    pub use crate::editor::{Editor, EditorError, StylesBar};
    pub use crate::markdown::{Renderer, to_markdown};
}
