//! End-to-end editing sessions through the public API.

use std::sync::{Arc, Mutex};

use markedit::annotation::InlineStyle;
use markedit::prelude::*;

fn typed(editor: &mut Editor, text: &str) {
    editor.type_text(text).unwrap();
}

#[test]
fn test_shopping_list_session() {
    let mut editor = Editor::new();
    typed(&mut editor, "Shopping");
    editor.trigger_style(AnnotationKind::TaskItem, false).unwrap();
    typed(&mut editor, "milk\neggs\nbread");
    editor.trigger_style(AnnotationKind::TaskItem, true).unwrap();

    // Tick off eggs.
    let eggs = editor.text().find("eggs").unwrap() - 1;
    editor.activate_pointer(eggs).unwrap();

    assert_eq!(
        editor.to_markdown(),
        "Shopping\n* [ ]  milk\n* [x]  eggs\n* [ ]  bread"
    );
}

#[test]
fn test_numbered_steps_with_emphasis() {
    let mut editor = Editor::new();
    editor.trigger_style(AnnotationKind::OrderedItem, false).unwrap();
    typed(&mut editor, "mix\nbake");
    editor.trigger_style(AnnotationKind::OrderedItem, true).unwrap();
    let start = editor.text().find("bake").unwrap();
    editor.set_selection(start, start + 4).unwrap();
    editor.trigger_style(AnnotationKind::Italic, false).unwrap();

    assert_eq!(editor.to_markdown(), "1- mix\n2- _bake_");
}

#[test]
fn test_markdown_round_trip_through_renderer() {
    let md = "*  milk\n* [x]  eggs\n* [ ]  **bread**";
    let mut first = Editor::new();
    first.render_markdown(md).unwrap();
    assert_eq!(first.to_markdown(), md);

    let mut second = Editor::new();
    second.render_markdown(&first.to_markdown()).unwrap();
    assert_eq!(second.text(), first.text());
    let marks = |e: &Editor| {
        e.store()
            .iter()
            .map(|a| (a.mark(), a.range()))
            .collect::<Vec<_>>()
    };
    assert_eq!(marks(&second), marks(&first));
}

#[test]
fn test_store_edits_keep_serialization_aligned() {
    let mut store = AnnotationStore::from_parts(
        "alpha beta",
        vec![(Mark::Bold, 0..5), (Mark::Strike, 6..10)],
    )
    .unwrap();
    store.insert_text(5, ",").unwrap();
    store.delete_text(0, 2).unwrap();
    assert_eq!(to_markdown(&store), "**pha**, ~~beta~~");
}

#[test]
fn test_styles_bar_sees_caret_moves() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut editor = Editor::new();
    editor.set_styles_bar(move |style: InlineStyle, active: bool| {
        sink.lock().unwrap().push((style, active));
    });
    editor.render_markdown("plain ~~struck~~").unwrap();
    editor.set_selection(8, 8).unwrap();
    editor.set_selection(2, 2).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![(InlineStyle::Strike, true), (InlineStyle::Strike, false)]
    );
}
