//! Converting between markdown and the annotated buffer.
//!
//! [`to_markdown`] rebuilds markdown from a store; a [`Renderer`] goes the
//! other way, producing plain text plus the annotations over it.

mod render;
mod serialize;

pub use render::{ComrakRenderer, RenderError, Rendered, Renderer};
pub use serialize::to_markdown;
