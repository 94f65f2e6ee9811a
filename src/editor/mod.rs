//! Editor window contract
//!
//! Toolkit-free re-expression of the note window controller: the window
//! wiring, the resize-driven text-container inset recomputation and the
//! undo-manager resolution rule. Embedders map these onto their platform's
//! window and text view.

/// Default inset when the window is narrower than the maximum line width.
const MIN_INSET: f64 = 20.0;

/// Window size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

/// Who currently receives key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstResponder {
    Editor,
    TitleField,
    #[default]
    None,
}

/// Observer for window geometry changes.
pub trait ResizeObserver {
    fn window_did_resize(&mut self, size: WindowSize);
}

/// Undo state of the editor's text storage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UndoManager {
    undo_stack: Vec<String>,
    redo_stack: Vec<String>,
}

impl UndoManager {
    pub fn register(&mut self, action: impl Into<String>) {
        self.undo_stack.push(action.into());
        self.redo_stack.clear();
    }

    pub fn undo(&mut self) -> Option<String> {
        let action = self.undo_stack.pop()?;
        self.redo_stack.push(action.clone());
        Some(action)
    }

    pub fn redo(&mut self) -> Option<String> {
        let action = self.redo_stack.pop()?;
        self.undo_stack.push(action.clone());
        Some(action)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }
}

/// The text editor view: editability, layout inset and its undo manager.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorView {
    pub editable: bool,
    /// Maximum line width before content is centered with side insets.
    pub max_line_width: f64,
    inset: f64,
    undo_manager: UndoManager,
}

impl EditorView {
    pub fn new(max_line_width: f64) -> Self {
        Self {
            editable: true,
            max_line_width,
            inset: MIN_INSET,
            undo_manager: UndoManager::default(),
        }
    }

    /// Recompute the horizontal inset so content is centered up to the
    /// maximum line width.
    pub fn update_text_container_inset(&mut self, window_width: f64) {
        self.inset = ((window_width - self.max_line_width) / 2.0).max(MIN_INSET);
    }

    pub fn text_container_inset(&self) -> f64 {
        self.inset
    }

    pub fn undo_manager(&self) -> &UndoManager {
        &self.undo_manager
    }

    pub fn undo_manager_mut(&mut self) -> &mut UndoManager {
        &mut self.undo_manager
    }
}

/// Window chrome state for a single-note window.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteWindow {
    pub title: String,
    pub title_visible: bool,
    pub titlebar_transparent: bool,
    pub first_responder: FirstResponder,
    size: WindowSize,
}

/// Controller wiring an editor view to its window.
#[derive(Debug)]
pub struct NoteWindowController {
    pub window: NoteWindow,
    pub editor: EditorView,
}

impl NoteWindowController {
    /// Wire a fresh window: default title, hidden title, transparent titlebar.
    pub fn init_window(editor: EditorView, size: WindowSize) -> Self {
        Self {
            window: NoteWindow {
                title: "New note".to_string(),
                title_visible: false,
                titlebar_transparent: true,
                first_responder: FirstResponder::None,
                size,
            },
            editor,
        }
    }

    /// Undo manager resolution: the editor's undo manager is offered only
    /// when the editor is the first responder and currently editable.
    /// Anything else yields `None`, deferring to the platform default.
    pub fn resolve_undo_manager(&self) -> Option<&UndoManager> {
        if self.window.first_responder == FirstResponder::Editor && self.editor.editable {
            Some(self.editor.undo_manager())
        } else {
            None
        }
    }
}

impl ResizeObserver for NoteWindowController {
    fn window_did_resize(&mut self, size: WindowSize) {
        self.window.size = size;
        self.editor.update_text_container_inset(size.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> NoteWindowController {
        NoteWindowController::init_window(
            EditorView::new(600.0),
            WindowSize {
                width: 800.0,
                height: 600.0,
            },
        )
    }

    #[test]
    fn test_init_window_chrome() {
        let controller = controller();
        assert_eq!(controller.window.title, "New note");
        assert!(!controller.window.title_visible);
        assert!(controller.window.titlebar_transparent);
    }

    #[test]
    fn test_resize_recomputes_inset() {
        let mut controller = controller();
        controller.window_did_resize(WindowSize {
            width: 1000.0,
            height: 700.0,
        });
        assert_eq!(controller.editor.text_container_inset(), 200.0);

        // Narrow window falls back to the minimum inset.
        controller.window_did_resize(WindowSize {
            width: 500.0,
            height: 700.0,
        });
        assert_eq!(controller.editor.text_container_inset(), 20.0);
    }

    #[test]
    fn test_undo_manager_requires_editor_focus_and_editability() {
        let mut controller = controller();
        assert!(controller.resolve_undo_manager().is_none());

        controller.window.first_responder = FirstResponder::Editor;
        assert!(controller.resolve_undo_manager().is_some());

        controller.editor.editable = false;
        assert!(controller.resolve_undo_manager().is_none());

        controller.editor.editable = true;
        controller.window.first_responder = FirstResponder::TitleField;
        assert!(controller.resolve_undo_manager().is_none());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut undo = UndoManager::default();
        undo.register("typing");
        assert!(undo.can_undo());
        assert_eq!(undo.undo().as_deref(), Some("typing"));
        assert!(!undo.can_undo());
        assert_eq!(undo.redo().as_deref(), Some("typing"));
        assert!(undo.can_undo());
    }
}
