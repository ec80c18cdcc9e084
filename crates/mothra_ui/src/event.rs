//! Input events delivered by the embedding drawing surface.

use serde::{Deserialize, Serialize};

/// A position in surface (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Events the surface can deliver.
#[derive(Debug, Clone)]
pub enum Event {
    /// Pointer button pressed over the surface.
    PointerDown(PointerEvent),
    /// Pointer moved (delivered while captured even outside the surface).
    PointerMove(PointerEvent),
    /// Pointer button released.
    PointerUp(PointerEvent),
    /// The platform aborted the pointer sequence.
    PointerCancel { pointer_id: u32 },
    /// Pointer left the surface.
    PointerLeave,
    /// Mouse wheel or trackpad scroll.
    Wheel(WheelEvent),
    /// Keyboard key pressed.
    KeyPressed { key: Key, modifiers: Modifiers },
    /// Keyboard key released.
    KeyReleased { key: Key, modifiers: Modifiers },
    /// Surface resized. `width`/`height` are CSS pixels.
    Resized {
        width: f64,
        height: f64,
        scale_factor: f64,
    },
}

/// A pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub pointer_id: u32,
}

impl PointerEvent {
    /// Primary pointer sample with no modifiers.
    pub fn new(x: f64, y: f64, button: MouseButton) -> Self {
        Self {
            position: Point::new(x, y),
            button,
            modifiers: Modifiers::default(),
            pointer_id: 1,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A wheel sample. Deltas are in pixels; positive `delta_y` scrolls down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
    pub position: Point,
    pub modifiers: Modifiers,
    /// True when any pointer button is held during the scroll.
    pub buttons_held: bool,
}

impl WheelEvent {
    pub fn vertical(delta_y: f64, x: f64, y: f64) -> Self {
        Self {
            delta_x: 0.0,
            delta_y,
            position: Point::new(x, y),
            modifiers: Modifiers::default(),
            buttons_held: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard keys.
///
/// Printable keys arrive as `Char` with the character the layout produced,
/// so `'?'` and `'+'` are reported as typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Space,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// Lowercase the character of a `Char` key so bindings match regardless of shift.
    pub fn normalized(self) -> Self {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }

    /// Display label for help overlays.
    pub fn label(&self) -> String {
        match self {
            Key::Char(c) => c.to_ascii_uppercase().to_string(),
            Key::Enter => "Enter".to_string(),
            Key::Escape => "Esc".to_string(),
            Key::Backspace => "Backspace".to_string(),
            Key::Delete => "Delete".to_string(),
            Key::Tab => "Tab".to_string(),
            Key::Space => "Space".to_string(),
            Key::Up => "Up".to_string(),
            Key::Down => "Down".to_string(),
            Key::Left => "Left".to_string(),
            Key::Right => "Right".to_string(),
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Cursor glyph the surface should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorIcon {
    #[default]
    Default,
    Crosshair,
    Pointer,
    Move,
    Grab,
    Grabbing,
    /// North-south resize
    ResizeNs,
    /// East-west resize
    ResizeEw,
    /// Northeast-southwest resize
    ResizeNesw,
    /// Northwest-southeast resize
    ResizeNwse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalized_lowercases_chars() {
        assert_eq!(Key::Char('D').normalized(), Key::Char('d'));
        assert_eq!(Key::Escape.normalized(), Key::Escape);
    }

    #[test]
    fn test_command_modifier() {
        assert!(Modifiers::ctrl().command());
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(meta.command());
        assert!(!Modifiers::shift().command());
        assert!(Modifiers::default().is_empty());
    }

    #[test]
    fn test_key_serde() {
        let json = serde_json::to_string(&Key::Char('v')).unwrap();
        let back: Key = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Key::Char('v'));
    }
}
