//! Rebuilding markdown text from the buffer and its annotations.

use std::cmp::Reverse;

use tracing::debug;

use crate::annotation::{Annotation, AnnotationKind, AnnotationStore, Mark, StyleFamily};

/// Delimiters one group of identically-ranged annotations contributes.
#[derive(Debug)]
struct Delimiters {
    start: usize,
    end: usize,
    open: String,
    close: String,
    /// Placeholder chars at `start` that the opening delimiter replaces.
    slot: usize,
}

/// Serialize the store's text and annotations into markdown.
///
/// Annotations sharing an identical range are combined into one group (at
/// most one delimiter pair per kind), with inline styles innermost and list
/// markers outermost. Each group opens at its start offset and closes at
/// its end offset; source text is copied through unchanged except for the
/// ordered item slot its `N- ` prefix replaces. At a shared offset, groups
/// ending there close first (innermost first), then groups starting there
/// open (outermost first), so nested and touching ranges come out exact.
/// Ranges that interleave still get every delimiter, but the result may
/// not be valid markdown.
///
/// Inline styles covering nothing but a single whitespace char (a typed
/// newline or a leftover placeholder) are skipped. Single visible chars are
/// kept, since typing mode styles one keystroke at a time and `hi` typed in
/// bold must come out as `**h****i**`.
pub fn to_markdown(store: &AnnotationStore) -> String {
    let _scope = crate::perf::scope("markdown.serialize");
    let mut annotations = store.all_of_kinds(&AnnotationKind::SERIALIZABLE);
    annotations.sort_by_key(|a| (a.start(), a.end(), a.kind()));

    let source: Vec<char> = store.text().chars().collect();
    let mut groups = Vec::new();
    let mut rest = annotations.as_slice();
    while let Some(first) = rest.first() {
        let same_range = rest
            .iter()
            .take_while(|a| a.range == first.range)
            .count();
        let (group, tail) = rest.split_at(same_range);
        rest = tail;

        let start = first.start().min(source.len());
        let end = first.end().min(source.len()).max(start);
        if let Some(delimiters) = delimit_group(group, start, &source[start..end]) {
            groups.push(delimiters);
        }
    }

    let mut opens: Vec<&Delimiters> = groups.iter().collect();
    opens.sort_by_key(|g| (g.start, Reverse(g.end)));
    let mut closes: Vec<&Delimiters> = groups.iter().collect();
    closes.sort_by_key(|g| (g.end, Reverse(g.start)));
    let mut opens = opens.into_iter().peekable();
    let mut closes = closes.into_iter().peekable();

    let mut out = String::with_capacity(source.len() + groups.len() * 4);
    let mut slot_end = 0usize;
    for pos in 0..=source.len() {
        while let Some(group) = closes.next_if(|g| g.end == pos) {
            out.push_str(&group.close);
        }
        while let Some(group) = opens.next_if(|g| g.start == pos) {
            out.push_str(&group.open);
            slot_end = slot_end.max(pos + group.slot);
        }
        if let Some(&ch) = source.get(pos).filter(|_| pos >= slot_end) {
            out.push(ch);
        }
    }

    let drift = out.chars().count().saturating_sub(source.len());
    debug!(
        annotations = annotations.len(),
        substitutions = groups.len(),
        drift,
        "serialized buffer to markdown"
    );
    crate::perf::log_event(
        "markdown.serialize",
        format!("annotations={} drift={drift}", annotations.len()),
    );
    out
}

/// Combine every distinct kind in `group`, in kind order, innermost first.
///
/// Returns `None` when no annotation in the group contributes anything.
fn delimit_group(group: &[&Annotation], start: usize, covered: &[char]) -> Option<Delimiters> {
    let mut seen: Vec<AnnotationKind> = Vec::with_capacity(group.len());
    let mut delimiters = Delimiters {
        start,
        end: start + covered.len(),
        open: String::new(),
        close: String::new(),
        slot: 0,
    };
    let mut changed = false;
    for annotation in group {
        let kind = annotation.kind();
        if seen.contains(&kind) {
            continue;
        }
        seen.push(kind);
        if let Some((prefix, suffix, slot)) = delimit(annotation.mark(), covered) {
            delimiters.open.insert_str(0, &prefix);
            delimiters.close.push_str(suffix);
            delimiters.slot = delimiters.slot.max(slot);
            changed = true;
        }
    }
    changed.then_some(delimiters)
}

/// Prefix, suffix and replaced slot length for a single mark.
fn delimit(mark: Mark, covered: &[char]) -> Option<(String, &'static str, usize)> {
    match mark {
        Mark::BulletItem => Some(("* ".to_string(), "", 0)),
        Mark::TaskItem { done: true } => Some(("* [x] ".to_string(), "", 0)),
        Mark::TaskItem { done: false } => Some(("* [ ] ".to_string(), "", 0)),
        Mark::OrderedItem { ordinal } => Some((format!("{ordinal}- "), "", covered.len().min(2))),
        Mark::Bold | Mark::Italic | Mark::Strike => {
            if is_placeholder(covered) {
                return None;
            }
            let StyleFamily::Inline(style) = mark.kind().family() else {
                return None;
            };
            Some((style.delimiter().to_string(), style.delimiter(), 0))
        }
        Mark::Quote => None,
    }
}

fn is_placeholder(covered: &[char]) -> bool {
    match covered {
        [] => true,
        [only] => only.is_whitespace(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Range;

    fn store(text: &str, marks: Vec<(Mark, Range<usize>)>) -> AnnotationStore {
        AnnotationStore::from_parts(text, marks).unwrap()
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(to_markdown(&store("just text", vec![])), "just text");
        assert_eq!(to_markdown(&AnnotationStore::new()), "");
    }

    #[test]
    fn test_inline_styles_wrap_their_runs() {
        let s = store(
            "bold and italic and gone",
            vec![(Mark::Bold, 0..4), (Mark::Italic, 9..15), (Mark::Strike, 20..24)],
        );
        assert_eq!(to_markdown(&s), "**bold** and _italic_ and ~~gone~~");
    }

    #[test]
    fn test_per_keystroke_annotations_wrap_each_char() {
        let s = store("hi", vec![(Mark::Bold, 0..1), (Mark::Bold, 1..2)]);
        assert_eq!(to_markdown(&s), "**h****i**");
    }

    #[test]
    fn test_single_whitespace_inline_run_is_skipped() {
        let s = store("a\nb", vec![(Mark::Bold, 1..2)]);
        assert_eq!(to_markdown(&s), "a\nb");
    }

    #[test]
    fn test_bullets_and_tasks_prefix_their_placeholder() {
        let s = store(
            " milk\n eggs",
            vec![
                (Mark::BulletItem, 0..1),
                (Mark::TaskItem { done: true }, 6..7),
            ],
        );
        assert_eq!(to_markdown(&s), "*  milk\n* [x]  eggs");
    }

    #[test]
    fn test_ordered_items_replace_their_slot() {
        let s = store(
            "  a\n  b\n  c",
            vec![
                (Mark::OrderedItem { ordinal: 1 }, 0..2),
                (Mark::OrderedItem { ordinal: 2 }, 4..6),
                (Mark::OrderedItem { ordinal: 3 }, 8..10),
            ],
        );
        assert_eq!(to_markdown(&s), "1- a\n2- b\n3- c");
    }

    #[test]
    fn test_multi_digit_ordinals_keep_later_offsets_right() {
        let s = store(
            "  a\n  b",
            vec![
                (Mark::OrderedItem { ordinal: 10 }, 0..2),
                (Mark::OrderedItem { ordinal: 11 }, 4..6),
            ],
        );
        assert_eq!(to_markdown(&s), "10- a\n11- b");
    }

    #[test]
    fn test_identical_ranges_combine_once_per_kind() {
        let s = store(
            "both",
            vec![(Mark::Strike, 0..4), (Mark::Bold, 0..4), (Mark::Bold, 0..4)],
        );
        assert_eq!(to_markdown(&s), "~~**both**~~");
    }

    #[test]
    fn test_quote_is_not_serialized() {
        let s = store("quoted", vec![(Mark::Quote, 0..6)]);
        assert_eq!(to_markdown(&s), "quoted");
    }

    #[test]
    fn test_drift_accumulates_across_mixed_kinds() {
        let s = store(
            " task\n  first\nsome bold",
            vec![
                (Mark::TaskItem { done: false }, 0..1),
                (Mark::OrderedItem { ordinal: 1 }, 6..8),
                (Mark::Bold, 19..23),
            ],
        );
        assert_eq!(to_markdown(&s), "* [ ]  task\n1- first\nsome **bold**");
    }

    #[test]
    fn test_serialization_does_not_mutate_the_store() {
        let s = store("x y", vec![(Mark::Italic, 0..3)]);
        let before: Vec<_> = s.iter().cloned().collect();
        let _ = to_markdown(&s);
        let after: Vec<_> = s.iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(s.text(), "x y");
    }

    #[test]
    fn test_nested_inline_run_keeps_surrounding_text() {
        let s = store("a b c", vec![(Mark::Italic, 2..3), (Mark::Bold, 0..5)]);
        assert_eq!(to_markdown(&s), "**a _b_ c**");
    }

    #[test]
    fn test_nested_ranges_sharing_an_offset_close_inner_first() {
        let s = store("abcde", vec![(Mark::Bold, 0..5), (Mark::Italic, 2..5)]);
        assert_eq!(to_markdown(&s), "**ab_cde_**");

        let s = store("abcde", vec![(Mark::Bold, 0..5), (Mark::Italic, 0..3)]);
        assert_eq!(to_markdown(&s), "**_abc_de**");
    }

    #[test]
    fn test_bold_spanning_list_items_keeps_every_char() {
        let s = store(
            " ab\n cd",
            vec![
                (Mark::BulletItem, 0..1),
                (Mark::BulletItem, 4..5),
                (Mark::Bold, 1..7),
            ],
        );
        assert_eq!(to_markdown(&s), "*  **ab\n*  cd**");
    }

    #[test]
    fn test_ordered_slot_with_nested_bold() {
        let s = store(
            "  one two",
            vec![(Mark::OrderedItem { ordinal: 4 }, 0..2), (Mark::Bold, 2..9), (Mark::Italic, 6..9)],
        );
        assert_eq!(to_markdown(&s), "4- **one _two_**");
    }

    #[test]
    fn test_interleaved_ranges_do_not_panic() {
        let s = store(
            "abcdefgh",
            vec![(Mark::Bold, 0..5), (Mark::Italic, 2..8), (Mark::Strike, 3..4)],
        );
        let md = to_markdown(&s);
        assert!(md.contains("**"));
        assert!(md.len() > 8);
    }
}
