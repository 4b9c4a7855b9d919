//! Markdown to buffer-and-annotations rendering with comrak.

use std::ops::Range;

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{Arena, Options, parse_document};
use tracing::debug;

use crate::annotation::{AnnotationStore, Mark, RangeError, StyleFamily};
use crate::config::TaskPalette;

/// A markdown string that could not be turned into an annotated buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("markdown contains a NUL character at byte {offset}")]
    NulByte { offset: usize },
    #[error("renderer produced an invalid annotation: {0}")]
    InvalidAnnotation(#[from] RangeError),
}

/// Output of a [`Renderer`]: plain text plus the annotations over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub marks: Vec<(Mark, Range<usize>)>,
    /// Task item colors, carried through untouched for the view.
    pub palette: TaskPalette,
}

impl Rendered {
    /// Build a fresh annotation store from the rendered output.
    ///
    /// # Errors
    /// Returns [`RenderError::InvalidAnnotation`] if any mark does not fit the text.
    pub fn into_store(self) -> Result<AnnotationStore, RenderError> {
        Ok(AnnotationStore::from_parts(&self.text, self.marks)?)
    }
}

/// Parses markdown into the buffer + annotation shape the editor works on.
pub trait Renderer {
    /// # Errors
    /// Returns [`RenderError`] if the markdown can not be rendered.
    fn render(&self, markdown: &str) -> Result<Rendered, RenderError>;
}

/// The default [`Renderer`], built on comrak's GFM parser.
///
/// List items come out exactly as the list controller seeds them: a
/// placeholder (two spaces for ordered items, one otherwise) carrying the
/// item annotation, followed by the item's text. Soft line breaks become
/// real newlines.
#[derive(Debug, Clone, Default)]
pub struct ComrakRenderer {
    palette: TaskPalette,
}

impl ComrakRenderer {
    pub const fn new(palette: TaskPalette) -> Self {
        Self { palette }
    }

    pub const fn palette(&self) -> &TaskPalette {
        &self.palette
    }
}

impl Renderer for ComrakRenderer {
    fn render(&self, markdown: &str) -> Result<Rendered, RenderError> {
        let _scope = crate::perf::scope("markdown.render");
        if let Some(offset) = markdown.find('\0') {
            return Err(RenderError::NulByte { offset });
        }

        let arena = Arena::new();
        let options = create_options();
        let root = parse_document(&arena, markdown, &options);

        let mut layout = Layout::default();
        process_node(root, &mut layout, None);
        debug!(
            chars = layout.len,
            annotations = layout.marks.len(),
            "rendered markdown"
        );
        Ok(Rendered {
            text: layout.text,
            marks: layout.marks,
            palette: self.palette,
        })
    }
}

fn create_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options
}

/// Text and annotations being built up during the AST walk.
#[derive(Debug, Default)]
struct Layout {
    text: String,
    /// Length of `text` in chars.
    len: usize,
    marks: Vec<(Mark, Range<usize>)>,
    /// An item marker was just placed; its first block continues the line.
    after_marker: bool,
}

impl Layout {
    fn push(&mut self, s: &str) {
        self.len += s.chars().count();
        self.text.push_str(s);
    }

    fn push_text(&mut self, s: &str) {
        if self.after_marker {
            self.after_marker = false;
            self.push(s.trim_start());
        } else {
            self.push(s);
        }
    }

    /// Start a new line unless one is already open.
    fn begin_block(&mut self) {
        if self.after_marker {
            return;
        }
        if self.len > 0 && !self.text.ends_with('\n') {
            self.push("\n");
        }
    }

    fn place_marker(&mut self, mark: Mark) {
        self.after_marker = false;
        self.begin_block();
        let placeholder = match mark.kind().family() {
            StyleFamily::List(style) => style.placeholder(),
            StyleFamily::Inline(_) | StyleFamily::Quote => " ",
        };
        let start = self.len;
        self.push(placeholder);
        self.marks.push((mark, start..self.len));
        self.after_marker = true;
    }

    fn annotate(&mut self, mark: Mark, start: usize) {
        if self.len > start {
            self.marks.push((mark, start..self.len));
        }
    }
}

fn process_children<'a>(node: &'a AstNode<'a>, layout: &mut Layout) {
    for child in node.children() {
        process_node(child, layout, None);
    }
}

fn process_node<'a>(node: &'a AstNode<'a>, layout: &mut Layout, item_mark: Option<Mark>) {
    match &node.data.borrow().value {
        NodeValue::List(list) => {
            for (index, child) in node.children().enumerate() {
                let mark = match list.list_type {
                    ListType::Bullet => Mark::BulletItem,
                    ListType::Ordered => Mark::OrderedItem {
                        ordinal: list.start + index,
                    },
                };
                process_node(child, layout, Some(mark));
            }
        }

        NodeValue::Item(_) => {
            layout.place_marker(item_mark.unwrap_or(Mark::BulletItem));
            process_children(node, layout);
            layout.after_marker = false;
        }

        NodeValue::TaskItem(symbol) => {
            layout.place_marker(Mark::TaskItem {
                done: symbol.is_some(),
            });
            process_children(node, layout);
            layout.after_marker = false;
        }

        NodeValue::Paragraph | NodeValue::Heading(_) | NodeValue::TableRow(_) => {
            layout.begin_block();
            process_children(node, layout);
        }

        NodeValue::BlockQuote => {
            layout.begin_block();
            let start = layout.len;
            process_children(node, layout);
            layout.annotate(Mark::Quote, start);
        }

        NodeValue::CodeBlock(block) => {
            layout.begin_block();
            layout.push_text(block.literal.trim_end_matches('\n'));
        }

        NodeValue::HtmlBlock(block) => {
            layout.begin_block();
            layout.push_text(block.literal.trim_end_matches('\n'));
        }

        NodeValue::ThematicBreak => {}

        NodeValue::Text(text) => layout.push_text(text),
        NodeValue::Code(code) => layout.push_text(&code.literal),
        NodeValue::HtmlInline(html) => layout.push_text(html),
        NodeValue::SoftBreak | NodeValue::LineBreak => layout.push("\n"),

        NodeValue::Strong => styled(node, layout, Mark::Bold),
        NodeValue::Emph => styled(node, layout, Mark::Italic),
        NodeValue::Strikethrough => styled(node, layout, Mark::Strike),

        _ => process_children(node, layout),
    }
}

fn styled<'a>(node: &'a AstNode<'a>, layout: &mut Layout, mark: Mark) {
    let start = layout.len;
    process_children(node, layout);
    // Leading whitespace trimmed right after a marker moves the real start.
    let start = start.min(layout.len);
    layout.annotate(mark, start);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> Rendered {
        ComrakRenderer::default().render(md).unwrap()
    }

    #[test]
    fn test_render_empty_document() {
        let out = render("");
        assert_eq!(out.text, "");
        assert!(out.marks.is_empty());
    }

    #[test]
    fn test_render_inline_styles() {
        let out = render("**bold** and _it_ and ~~gone~~");
        assert_eq!(out.text, "bold and it and gone");
        assert_eq!(
            out.marks,
            vec![(Mark::Bold, 0..4), (Mark::Italic, 9..11), (Mark::Strike, 16..20)]
        );
    }

    #[test]
    fn test_render_bullet_list_uses_placeholders() {
        let out = render("* milk\n* eggs");
        assert_eq!(out.text, " milk\n eggs");
        assert_eq!(
            out.marks,
            vec![(Mark::BulletItem, 0..1), (Mark::BulletItem, 6..7)]
        );
    }

    #[test]
    fn test_render_ordered_list_carries_ordinals() {
        let out = render("3. c\n4. d");
        assert_eq!(out.text, "  c\n  d");
        assert_eq!(
            out.marks,
            vec![
                (Mark::OrderedItem { ordinal: 3 }, 0..2),
                (Mark::OrderedItem { ordinal: 4 }, 4..6),
            ]
        );
    }

    #[test]
    fn test_render_task_list_states() {
        let out = render("* [ ] todo\n* [x] done");
        assert_eq!(out.text, " todo\n done");
        assert_eq!(
            out.marks,
            vec![
                (Mark::TaskItem { done: false }, 0..1),
                (Mark::TaskItem { done: true }, 6..7),
            ]
        );
    }

    #[test]
    fn test_render_paragraph_then_list() {
        let out = render("intro\n\n* item");
        assert_eq!(out.text, "intro\n item");
        assert_eq!(out.marks, vec![(Mark::BulletItem, 6..7)]);
    }

    #[test]
    fn test_soft_break_becomes_newline() {
        let out = render("one\ntwo");
        assert_eq!(out.text, "one\ntwo");
    }

    #[test]
    fn test_blockquote_gets_quote_annotation() {
        let out = render("> wise words");
        assert_eq!(out.text, "wise words");
        assert_eq!(out.marks, vec![(Mark::Quote, 0..10)]);
    }

    #[test]
    fn test_bold_inside_item() {
        let out = render("* **milk**");
        assert_eq!(out.text, " milk");
        assert_eq!(
            out.marks,
            vec![(Mark::BulletItem, 0..1), (Mark::Bold, 1..5)]
        );
    }

    #[test]
    fn test_nul_byte_is_rejected() {
        let err = ComrakRenderer::default().render("a\0b").unwrap_err();
        assert_eq!(err, RenderError::NulByte { offset: 1 });
    }

    #[test]
    fn test_palette_is_carried_through() {
        let palette = TaskPalette::default();
        let out = ComrakRenderer::new(palette).render("text").unwrap();
        assert_eq!(out.palette, palette);
    }

    #[test]
    fn test_into_store_builds_annotations() {
        let store = render("**hi** there").into_store().unwrap();
        assert_eq!(store.text(), "hi there");
        assert_eq!(store.iter().count(), 1);
    }

    mod property_tests {
        use super::*;
        use crate::markdown::to_markdown;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        struct Item {
            marker: Mark,
            words: Vec<String>,
            bold: bool,
            italic: Option<usize>,
        }

        fn item() -> impl Strategy<Value = Item> {
            let marker = prop_oneof![
                Just(Mark::BulletItem),
                Just(Mark::TaskItem { done: false }),
                Just(Mark::TaskItem { done: true }),
            ];
            (
                marker,
                prop::collection::vec("[a-z]{1,8}", 1..4),
                any::<bool>(),
                proptest::option::of(any::<prop::sample::Index>()),
            )
                .prop_map(|(marker, words, bold, italic)| Item {
                    italic: italic.map(|i| i.index(words.len())),
                    marker,
                    words,
                    bold,
                })
        }

        fn build(intro: Option<&str>, items: &[Item]) -> AnnotationStore {
            let mut text = intro.unwrap_or_default().to_string();
            let mut marks = Vec::new();
            for item in items {
                if !text.is_empty() {
                    text.push('\n');
                }
                let start = text.chars().count();
                text.push(' ');
                marks.push((item.marker, start..start + 1));
                for (index, word) in item.words.iter().enumerate() {
                    if index > 0 {
                        text.push(' ');
                    }
                    let word_start = text.chars().count();
                    text.push_str(word);
                    if item.italic == Some(index) {
                        marks.push((Mark::Italic, word_start..word_start + word.len()));
                    }
                }
                if item.bold {
                    marks.push((Mark::Bold, start + 1..text.chars().count()));
                }
            }
            AnnotationStore::from_parts(&text, marks).unwrap()
        }

        fn snapshot(store: &AnnotationStore) -> Vec<(Mark, Range<usize>)> {
            let mut marks: Vec<_> = store.iter().map(|a| (a.mark(), a.range())).collect();
            marks.sort_by_key(|(mark, range)| (range.start, range.end, mark.kind()));
            marks
        }

        proptest! {
            #[test]
            fn render_inverts_serialization(
                intro in proptest::option::of("[a-z]{1,8}( [a-z]{1,8}){0,3}"),
                items in prop::collection::vec(item(), 1..8),
            ) {
                let store = build(intro.as_deref(), &items);
                let md = to_markdown(&store);
                let rendered = ComrakRenderer::default()
                    .render(&md)
                    .unwrap()
                    .into_store()
                    .unwrap();
                prop_assert_eq!(rendered.text(), store.text());
                prop_assert_eq!(snapshot(&rendered), snapshot(&store));
            }
        }
    }
}
