//! Core annotation types.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// The kind of formatting an annotation applies.
///
/// Declaration order matters: inline kinds sort before list kinds, which is
/// the order serialization decorates a shared range in (inline innermost).
#[derive(
    clap::ValueEnum,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Bold,
    Italic,
    Strike,
    BulletItem,
    OrderedItem,
    TaskItem,
    Quote,
}

impl AnnotationKind {
    /// Kinds reflected by the styles bar.
    pub const INLINE: [Self; 3] = [Self::Bold, Self::Italic, Self::Strike];

    /// List-item kinds driven by the continuation controller.
    pub const LISTS: [Self; 3] = [Self::BulletItem, Self::OrderedItem, Self::TaskItem];

    /// Kinds that serialize to markdown delimiters.
    pub const SERIALIZABLE: [Self; 6] = [
        Self::Bold,
        Self::Italic,
        Self::Strike,
        Self::BulletItem,
        Self::OrderedItem,
        Self::TaskItem,
    ];

    /// Which controller family handles this kind.
    pub const fn family(self) -> StyleFamily {
        match self {
            Self::Bold => StyleFamily::Inline(InlineStyle::Bold),
            Self::Italic => StyleFamily::Inline(InlineStyle::Italic),
            Self::Strike => StyleFamily::Inline(InlineStyle::Strike),
            Self::BulletItem => StyleFamily::List(ListStyle::Bullet),
            Self::OrderedItem => StyleFamily::List(ListStyle::Ordered),
            Self::TaskItem => StyleFamily::List(ListStyle::Task),
            Self::Quote => StyleFamily::Quote,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Strike => "strike",
            Self::BulletItem => "bullet-item",
            Self::OrderedItem => "ordered-item",
            Self::TaskItem => "task-item",
            Self::Quote => "quote",
        }
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Controller family of an [`AnnotationKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFamily {
    Inline(InlineStyle),
    List(ListStyle),
    Quote,
}

/// Character-level styles applied by the inline controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InlineStyle {
    Bold,
    Italic,
    Strike,
}

impl InlineStyle {
    pub const fn kind(self) -> AnnotationKind {
        match self {
            Self::Bold => AnnotationKind::Bold,
            Self::Italic => AnnotationKind::Italic,
            Self::Strike => AnnotationKind::Strike,
        }
    }

    pub const fn mark(self) -> Mark {
        match self {
            Self::Bold => Mark::Bold,
            Self::Italic => Mark::Italic,
            Self::Strike => Mark::Strike,
        }
    }

    /// Markdown delimiter wrapped around a styled run.
    pub const fn delimiter(self) -> &'static str {
        match self {
            Self::Bold => "**",
            Self::Italic => "_",
            Self::Strike => "~~",
        }
    }
}

/// List-item styles driven by the continuation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListStyle {
    Bullet,
    Ordered,
    Task,
}

impl ListStyle {
    pub const fn kind(self) -> AnnotationKind {
        match self {
            Self::Bullet => AnnotationKind::BulletItem,
            Self::Ordered => AnnotationKind::OrderedItem,
            Self::Task => AnnotationKind::TaskItem,
        }
    }

    /// The two list kinds a line of this style may not share.
    pub const fn other_kinds(self) -> [AnnotationKind; 2] {
        match self {
            Self::Bullet => [AnnotationKind::OrderedItem, AnnotationKind::TaskItem],
            Self::Ordered => [AnnotationKind::TaskItem, AnnotationKind::BulletItem],
            Self::Task => [AnnotationKind::OrderedItem, AnnotationKind::BulletItem],
        }
    }

    /// Spaces inserted to host the item marker before any content is typed.
    ///
    /// Ordered items reserve two columns for the numeral.
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Bullet | Self::Task => " ",
            Self::Ordered => "  ",
        }
    }

    /// The mark for a freshly seeded item.
    pub const fn seed_mark(self, ordinal: usize) -> Mark {
        match self {
            Self::Bullet => Mark::BulletItem,
            Self::Ordered => Mark::OrderedItem { ordinal },
            Self::Task => Mark::TaskItem { done: false },
        }
    }
}

/// An annotation's kind together with its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Strike,
    BulletItem,
    OrderedItem { ordinal: usize },
    TaskItem { done: bool },
    Quote,
}

impl Mark {
    pub const fn kind(self) -> AnnotationKind {
        match self {
            Self::Bold => AnnotationKind::Bold,
            Self::Italic => AnnotationKind::Italic,
            Self::Strike => AnnotationKind::Strike,
            Self::BulletItem => AnnotationKind::BulletItem,
            Self::OrderedItem { .. } => AnnotationKind::OrderedItem,
            Self::TaskItem { .. } => AnnotationKind::TaskItem,
            Self::Quote => AnnotationKind::Quote,
        }
    }
}

/// Stable identity of an annotation inside one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AnnotationId(pub(crate) u64);

/// A typed, ranged attribute attached to a region of the text buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub(crate) id: AnnotationId,
    pub(crate) mark: Mark,
    pub(crate) range: Range<usize>,
}

impl Annotation {
    pub const fn id(&self) -> AnnotationId {
        self.id
    }

    pub const fn mark(&self) -> Mark {
        self.mark
    }

    pub const fn kind(&self) -> AnnotationKind {
        self.mark.kind()
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub const fn start(&self) -> usize {
        self.range.start
    }

    pub const fn end(&self) -> usize {
        self.range.end
    }

    pub const fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    pub const fn is_empty(&self) -> bool {
        self.range.end == self.range.start
    }

    /// Whether the char at `pos` is covered. Touching the end does not count.
    pub const fn contains(&self, pos: usize) -> bool {
        self.range.start <= pos && pos < self.range.end
    }
}

/// An annotation range that is invalid for the current buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("annotation range {start}..{end} is reversed")]
    Reversed { start: usize, end: usize },
    #[error("annotation range {start}..{end} exceeds buffer length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("annotation range at {at} is empty")]
    Empty { at: usize },
}
