//! Customizable keyboard shortcuts.
//!
//! A [`KeyBindings`] maps key presses to [`Action`]s. Character keys match
//! case-insensitively and ignore shift, so layouts that need shift for `?` or
//! `+` still work. Bindings marked `command` require Ctrl (Cmd on macOS).

use mothra_ui::{Key, Modifiers};
use serde::{Deserialize, Serialize};

use crate::interaction::EditMode;
use crate::model::{CLASSES, ClassId};

/// Something the keyboard can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetActiveClass(ClassId),
    SetEditMode(EditMode),
    /// Cancel the gesture in progress, else clear the selection
    Escape,
    /// Drop the box being drawn, leaving other gestures alone
    CancelDraw,
    /// Drop the move/resize in progress without committing
    CancelDrag,
    DeleteSelected,
    Undo,
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleLabels,
    ToggleHelp,
    /// Write the session to storage now
    QuickSave,
}

impl Action {
    pub fn description(&self) -> String {
        match self {
            Action::SetActiveClass(id) => format!("Class: {}", crate::model::class_name(*id)),
            Action::SetEditMode(mode) => format!("{} mode", mode.as_str()),
            Action::Escape => "Cancel / deselect".to_string(),
            Action::CancelDraw => "Cancel drawing".to_string(),
            Action::CancelDrag => "Cancel move/resize".to_string(),
            Action::DeleteSelected => "Delete selected".to_string(),
            Action::Undo => "Undo".to_string(),
            Action::ZoomIn => "Zoom in".to_string(),
            Action::ZoomOut => "Zoom out".to_string(),
            Action::ResetView => "Reset view".to_string(),
            Action::ToggleLabels => "Toggle labels".to_string(),
            Action::ToggleHelp => "Toggle help".to_string(),
            Action::QuickSave => "Save now".to_string(),
        }
    }
}

/// One key, optionally requiring the command modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: Key,
    #[serde(default)]
    pub command: bool,
}

impl KeyBinding {
    pub const fn plain(key: Key) -> Self {
        Self { key, command: false }
    }

    pub const fn command(key: Key) -> Self {
        Self { key, command: true }
    }

    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        !modifiers.alt && self.key.normalized() == key.normalized() && self.command == modifiers.command()
    }

    pub fn label(&self) -> String {
        if self.command {
            format!("Ctrl+{}", self.key.label())
        } else {
            self.key.label()
        }
    }
}

/// Keybinding configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub draw_mode: Vec<KeyBinding>,
    pub select_mode: Vec<KeyBinding>,
    pub escape: Vec<KeyBinding>,
    #[serde(default)]
    pub cancel_draw: Vec<KeyBinding>,
    #[serde(default)]
    pub cancel_drag: Vec<KeyBinding>,
    pub delete: Vec<KeyBinding>,
    pub undo: Vec<KeyBinding>,
    pub zoom_in: Vec<KeyBinding>,
    pub zoom_out: Vec<KeyBinding>,
    pub reset_view: Vec<KeyBinding>,
    pub toggle_labels: Vec<KeyBinding>,
    pub toggle_help: Vec<KeyBinding>,
    pub quick_save: Vec<KeyBinding>,

    /// Hotkey per class, in class order
    #[serde(default = "default_class_hotkeys")]
    pub class_hotkeys: Vec<Option<KeyBinding>>,
}

fn default_class_hotkeys() -> Vec<Option<KeyBinding>> {
    CLASSES
        .iter()
        .map(|class| Some(KeyBinding::plain(Key::Char(class.hotkey))))
        .collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        use KeyBinding as B;
        Self {
            draw_mode: vec![B::plain(Key::Char('d'))],
            select_mode: vec![B::plain(Key::Char('v'))],
            escape: vec![B::plain(Key::Escape)],
            cancel_draw: Vec::new(),
            cancel_drag: Vec::new(),
            delete: vec![B::plain(Key::Delete), B::plain(Key::Backspace)],
            undo: vec![B::command(Key::Char('z'))],
            zoom_in: vec![B::plain(Key::Char('+')), B::plain(Key::Char('='))],
            zoom_out: vec![B::plain(Key::Char('-'))],
            reset_view: vec![B::plain(Key::Char('0'))],
            toggle_labels: vec![B::plain(Key::Char('l'))],
            toggle_help: vec![B::plain(Key::Char('?'))],
            quick_save: vec![B::command(Key::Char('s'))],
            class_hotkeys: default_class_hotkeys(),
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> [(&[KeyBinding], Action); 13] {
        [
            (self.undo.as_slice(), Action::Undo),
            (self.quick_save.as_slice(), Action::QuickSave),
            (self.escape.as_slice(), Action::Escape),
            (self.cancel_draw.as_slice(), Action::CancelDraw),
            (self.cancel_drag.as_slice(), Action::CancelDrag),
            (self.delete.as_slice(), Action::DeleteSelected),
            (self.draw_mode.as_slice(), Action::SetEditMode(EditMode::Draw)),
            (self.select_mode.as_slice(), Action::SetEditMode(EditMode::Select)),
            (self.zoom_in.as_slice(), Action::ZoomIn),
            (self.zoom_out.as_slice(), Action::ZoomOut),
            (self.reset_view.as_slice(), Action::ResetView),
            (self.toggle_labels.as_slice(), Action::ToggleLabels),
            (self.toggle_help.as_slice(), Action::ToggleHelp),
        ]
    }

    /// The action bound to a key press, if any.
    pub fn action_for(&self, key: Key, modifiers: Modifiers) -> Option<Action> {
        if let Some(class_id) = self.class_for_key(key, modifiers) {
            return Some(Action::SetActiveClass(class_id));
        }
        self.table()
            .into_iter()
            .find(|(bindings, _)| bindings.iter().any(|b| b.matches(key, modifiers)))
            .map(|(_, action)| action)
    }

    /// Class whose hotkey matches the press.
    pub fn class_for_key(&self, key: Key, modifiers: Modifiers) -> Option<ClassId> {
        self.class_hotkeys
            .iter()
            .zip(CLASSES.iter())
            .find(|(hotkey, _)| hotkey.is_some_and(|b| b.matches(key, modifiers)))
            .map(|(_, class)| class.id)
    }

    /// What `binding` is already used for, if anything.
    pub fn key_conflict(&self, binding: KeyBinding) -> Option<String> {
        let probe = Modifiers {
            ctrl: binding.command,
            ..Modifiers::NONE
        };
        self.action_for(binding.key, probe).map(|action| action.description())
    }

    /// Key/description pairs for the help overlay.
    pub fn help_entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .class_hotkeys
            .iter()
            .zip(CLASSES.iter())
            .filter_map(|(hotkey, class)| {
                hotkey.map(|b| (b.label(), Action::SetActiveClass(class.id).description()))
            })
            .collect();
        for (bindings, action) in self.table() {
            if bindings.is_empty() {
                continue;
            }
            let keys: Vec<String> = bindings.iter().map(KeyBinding::label).collect();
            entries.push((keys.join(" / "), action.description()));
        }
        entries.push(("Space + drag".to_string(), "Pan".to_string()));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let kb = KeyBindings::new();
        let none = Modifiers::NONE;
        assert_eq!(kb.action_for(Key::Char('2'), none), Some(Action::SetActiveClass(2)));
        assert_eq!(kb.action_for(Key::Char('d'), none), Some(Action::SetEditMode(EditMode::Draw)));
        assert_eq!(kb.action_for(Key::Char('V'), Modifiers::shift()), Some(Action::SetEditMode(EditMode::Select)));
        assert_eq!(kb.action_for(Key::Backspace, none), Some(Action::DeleteSelected));
        assert_eq!(kb.action_for(Key::Char('='), none), Some(Action::ZoomIn));
        assert_eq!(kb.action_for(Key::Char('?'), Modifiers::shift()), Some(Action::ToggleHelp));
        assert_eq!(kb.action_for(Key::Char('x'), none), None);
    }

    #[test]
    fn test_command_bindings() {
        let kb = KeyBindings::new();
        assert_eq!(kb.action_for(Key::Char('z'), Modifiers::ctrl()), Some(Action::Undo));
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(kb.action_for(Key::Char('s'), cmd), Some(Action::QuickSave));
        assert_eq!(kb.action_for(Key::Char('z'), Modifiers::NONE), None);
        assert_eq!(kb.action_for(Key::Char('d'), Modifiers::ctrl()), None);
    }

    #[test]
    fn test_alt_never_matches() {
        let kb = KeyBindings::new();
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        assert_eq!(kb.action_for(Key::Char('1'), alt), None);
    }

    #[test]
    fn test_rebinding_and_conflicts() {
        let mut kb = KeyBindings::new();
        assert_eq!(kb.key_conflict(KeyBinding::plain(Key::Char('l'))), Some("Toggle labels".to_string()));
        assert_eq!(kb.key_conflict(KeyBinding::plain(Key::Char('b'))), None);

        kb.draw_mode = vec![KeyBinding::plain(Key::Char('b'))];
        assert_eq!(kb.action_for(Key::Char('b'), Modifiers::NONE), Some(Action::SetEditMode(EditMode::Draw)));
        assert_eq!(kb.action_for(Key::Char('d'), Modifiers::NONE), None);
    }

    #[test]
    fn test_cancel_actions_unbound_by_default() {
        let mut kb = KeyBindings::new();
        assert!(kb.help_entries().iter().all(|(_, desc)| desc != "Cancel drawing"));

        kb.cancel_drag = vec![KeyBinding::plain(Key::Char('c'))];
        assert_eq!(kb.action_for(Key::Char('c'), Modifiers::NONE), Some(Action::CancelDrag));
    }

    #[test]
    fn test_bindings_without_cancel_fields_load() {
        let mut value = serde_json::to_value(KeyBindings::new()).unwrap();
        let map = value.as_object_mut().unwrap();
        map.remove("cancel_draw");
        map.remove("cancel_drag");
        let back: KeyBindings = serde_json::from_value(value).unwrap();
        assert_eq!(back, KeyBindings::new());
    }

    #[test]
    fn test_serde_keeps_bindings() {
        let kb = KeyBindings::new();
        let json = serde_json::to_string(&kb).unwrap();
        let back: KeyBindings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kb);
    }

    #[test]
    fn test_help_entries_cover_classes_and_actions() {
        let entries = KeyBindings::new().help_entries();
        assert!(entries.contains(&("1".to_string(), "Class: text".to_string())));
        assert!(entries.contains(&("Ctrl+Z".to_string(), "Undo".to_string())));
        assert!(entries.contains(&("Delete / Backspace".to_string(), "Delete selected".to_string())));
    }
}
