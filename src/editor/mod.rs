//! The editing surface.
//!
//! [`Editor`] owns the annotated buffer and wires user input through it:
//! text edits are applied to the store first, then every armed formatting
//! session observes the edit. Controller edits (list placeholders) go
//! straight to the store and are never observed, so a continuation can not
//! trigger itself.

pub mod buffer;
mod script;
mod selection;


use std::fmt;
use std::ops::Range;

use tracing::debug;

pub use buffer::{EditDelta, EditError, TextBuffer};
pub use script::Input;
pub use selection::{SelectionState, StyleChange, StylesBar};

use crate::annotation::{AnnotationKind, AnnotationStore, RangeError, StyleFamily};
use crate::config::TaskPalette;
use crate::format::{
    EditContext, ListContinuation, Session, SessionRegistry, TypingSession, style_selection,
};
use crate::interaction::{ActivationRegistry, TaskToggle};
use crate::markdown::{self, ComrakRenderer, RenderError, Renderer};

/// Anything that can go wrong while driving an [`Editor`].
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },
}

/// An annotated text buffer with live formatting.
pub struct Editor<R = ComrakRenderer> {
    store: AnnotationStore,
    sessions: SessionRegistry,
    activations: ActivationRegistry,
    selection: SelectionState,
    styles_bar: Option<Box<dyn StylesBar>>,
    renderer: R,
}

impl Editor<ComrakRenderer> {
    pub fn new() -> Self {
        Self::with_renderer(ComrakRenderer::default())
    }

    pub fn with_palette(palette: TaskPalette) -> Self {
        Self::with_renderer(ComrakRenderer::new(palette))
    }

    pub const fn palette(&self) -> &TaskPalette {
        self.renderer.palette()
    }
}

impl Default for Editor<ComrakRenderer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: fmt::Debug> fmt::Debug for Editor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("store", &self.store)
            .field("sessions", &self.sessions)
            .field("activations", &self.activations)
            .field("selection", &self.selection)
            .field("styles_bar", &self.styles_bar.is_some())
            .field("renderer", &self.renderer)
            .finish()
    }
}

impl<R: Renderer> Editor<R> {
    pub fn with_renderer(renderer: R) -> Self {
        Self {
            store: AnnotationStore::new(),
            sessions: SessionRegistry::new(),
            activations: ActivationRegistry::new(),
            selection: SelectionState::new(),
            styles_bar: None,
            renderer,
        }
    }

    pub const fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn text(&self) -> String {
        self.store.text()
    }

    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.range()
    }

    pub const fn caret(&self) -> usize {
        self.selection.caret()
    }

    /// Attach the receiver of style toggle reports, replacing any previous one.
    pub fn set_styles_bar(&mut self, bar: impl StylesBar + 'static) {
        self.styles_bar = Some(Box::new(bar));
    }

    pub fn clear_styles_bar(&mut self) {
        self.styles_bar = None;
    }

    /// Replace `removed` chars at `pos` with `text` as a user edit.
    ///
    /// Armed sessions observe the edit once the store is updated. The caret
    /// lands after the inserted text, or after any placeholder a list
    /// session appended there.
    ///
    /// # Errors
    /// Returns [`EditorError::Edit`] if the range is outside the buffer.
    pub fn replace_text(
        &mut self,
        pos: usize,
        removed: usize,
        text: &str,
    ) -> Result<EditDelta, EditorError> {
        let delta = self.store.replace_text(pos, removed, text)?;
        let edited_len = self.store.len();
        self.sessions.notify(
            &mut EditContext::new(&mut self.store, &mut self.activations),
            delta,
        );
        crate::perf::log_event(
            "editor.edit",
            format!(
                "pos={} removed={} inserted={}",
                delta.position, delta.removed, delta.inserted
            ),
        );

        let mut caret = delta.position + delta.inserted;
        if caret == edited_len {
            caret = self.store.len();
        }
        self.move_selection(caret..caret);
        Ok(delta)
    }

    /// # Errors
    /// Returns [`EditorError::Edit`] if `pos` is past the end of the buffer.
    pub fn insert_text(&mut self, pos: usize, text: &str) -> Result<EditDelta, EditorError> {
        self.replace_text(pos, 0, text)
    }

    /// # Errors
    /// Returns [`EditorError::Edit`] if the range runs past the end of the buffer.
    pub fn delete_text(&mut self, pos: usize, len: usize) -> Result<EditDelta, EditorError> {
        self.replace_text(pos, len, "")
    }

    /// Type `text` at the caret, one keystroke per char. A non-empty
    /// selection is replaced by the first keystroke.
    ///
    /// # Errors
    /// Returns [`EditorError::Edit`] if the selection is outside the buffer.
    pub fn type_text(&mut self, text: &str) -> Result<(), EditorError> {
        let mut keystroke = [0u8; 4];
        for ch in text.chars() {
            let selected = self.selection.range();
            self.replace_text(selected.start, selected.len(), ch.encode_utf8(&mut keystroke))?;
        }
        Ok(())
    }

    /// Move the selection, reflecting the style under a collapsed caret.
    ///
    /// # Errors
    /// Returns [`EditorError::Edit`] if the range is reversed or past the end.
    pub fn set_selection(&mut self, start: usize, end: usize) -> Result<(), EditorError> {
        let len = self.store.len();
        if start > end || end > len {
            return Err(EditError { start, end, len }.into());
        }
        self.move_selection(start..end);
        Ok(())
    }

    fn move_selection(&mut self, range: Range<usize>) {
        let changes = self.selection.update(&self.store, range);
        if let Some(bar) = self.styles_bar.as_mut() {
            for change in changes {
                bar.on_style_active_changed(change.style, change.active);
            }
        }
    }

    /// Start or stop a formatting style.
    ///
    /// Stopping disarms every session, whatever `kind` is. Starting an
    /// inline style styles the current selection once if one was made,
    /// otherwise it arms typing mode. Starting a list seeds an item at the
    /// end of the buffer and arms continuation.
    ///
    /// # Errors
    /// Returns [`EditorError::Range`] if the annotation can not be placed.
    pub fn trigger_style(&mut self, kind: AnnotationKind, stop: bool) -> Result<(), EditorError> {
        if stop {
            let cleared = self.sessions.clear_all();
            debug!(%kind, cleared, "style stopped");
            return Ok(());
        }

        match kind.family() {
            StyleFamily::Inline(style) if self.selection.is_selection_styling() => {
                style_selection(&mut self.store, style, self.selection.range())?;
                self.selection.finish_selection_styling();
            }
            StyleFamily::Inline(style) => {
                self.sessions
                    .arm(Session::Typing(TypingSession::new(style)));
            }
            StyleFamily::List(style) => {
                let list = ListContinuation::seed(
                    style,
                    &mut EditContext::new(&mut self.store, &mut self.activations),
                )?;
                self.sessions.arm(Session::Continuation(list));
                let end = self.store.len();
                self.move_selection(end..end);
            }
            StyleFamily::Quote => debug!(%kind, "no live controller for style"),
        }
        Ok(())
    }

    /// Pointer activation at `pos`: flips the task item there, if any.
    pub fn activate_pointer(&mut self, pos: usize) -> Option<TaskToggle> {
        self.activations.activate(&mut self.store, pos)
    }

    pub fn to_markdown(&self) -> String {
        markdown::to_markdown(&self.store)
    }

    /// Replace the buffer and annotations with the rendering of `md`.
    ///
    /// Armed sessions are cleared and rendered task items become
    /// activation targets. Nothing changes if rendering fails.
    ///
    /// # Errors
    /// Returns [`EditorError::Render`] if the renderer rejects `md`.
    pub fn render_markdown(&mut self, md: &str) -> Result<(), EditorError> {
        let store = self.renderer.render(md)?.into_store()?;
        self.store = store;
        self.sessions.clear_all();
        self.activations.clear();
        let tasks: Vec<_> = self
            .store
            .all_of_kinds(&[AnnotationKind::TaskItem])
            .iter()
            .map(|a| a.id())
            .collect();
        for id in tasks {
            self.activations.register(id);
        }
        debug!(
            chars = self.store.len(),
            tasks = self.activations.len(),
            "markdown loaded"
        );
        let end = self.store.len();
        self.move_selection(end..end);
        Ok(())
    }

    /// Render the buffer's own text as markdown.
    ///
    /// # Errors
    /// Returns [`EditorError::Render`] if the renderer rejects the text.
    pub fn rerender(&mut self) -> Result<(), EditorError> {
        let md = self.store.text();
        self.render_markdown(&md)
    }

    /// Apply one scripted input.
    ///
    /// # Errors
    /// Propagates whatever the underlying operation returns.
    pub fn apply(&mut self, input: &Input) -> Result<(), EditorError> {
        match input {
            Input::Type(text) => self.type_text(text),
            Input::Delete { pos, len } => self.delete_text(*pos, *len).map(|_| ()),
            Input::Select { start, end } => self.set_selection(*start, *end),
            Input::Style { kind, stop } => self.trigger_style(*kind, *stop),
            Input::Tap(pos) => {
                if self.activate_pointer(*pos).is_none() {
                    debug!(pos, "tap hit no task item");
                }
                Ok(())
            }
            Input::Load(md) => self.render_markdown(md),
        }
    }

    /// Parse and apply a whole input script, stopping at the first error.
    ///
    /// # Errors
    /// Returns [`EditorError::Script`] for a malformed line, or the error of
    /// the first input that fails.
    pub fn run_script(&mut self, script: &str) -> Result<(), EditorError> {
        let _scope = crate::perf::scope("editor.run_script");
        for input in Input::parse_script(script)? {
            self.apply(&input)?;
        }
        Ok(())
    }
}
