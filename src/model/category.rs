//! The fixed set of annotation classes.

use mothra_ui::Color;

/// Class identifier (1-based).
pub type ClassId = u32;

/// An annotation class with a name, color and hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Unique identifier for the class
    pub id: ClassId,
    /// Display name of the class
    pub name: &'static str,
    /// `#RRGGBB` color
    pub color: &'static str,
    /// Key that activates the class
    pub hotkey: char,
}

/// All known classes, in YOLO index order.
pub const CLASSES: [Category; 3] = [
    Category {
        id: 1,
        name: "text",
        color: "#3B82F6",
        hotkey: '1',
    },
    Category {
        id: 2,
        name: "music",
        color: "#EF4444",
        hotkey: '2',
    },
    Category {
        id: 3,
        name: "staves",
        color: "#10B981",
        hotkey: '3',
    },
];

/// Class selected when a session starts.
pub const DEFAULT_CLASS_ID: ClassId = 1;

/// Color used for ids outside [`CLASSES`].
pub const UNKNOWN_CLASS_COLOR: &str = "#888888";

pub fn category(id: ClassId) -> Option<&'static Category> {
    CLASSES.iter().find(|c| c.id == id)
}

pub fn is_known_class(id: ClassId) -> bool {
    category(id).is_some()
}

/// Zero-based position of the class, used as the YOLO class index.
pub fn class_index(id: ClassId) -> Option<usize> {
    CLASSES.iter().position(|c| c.id == id)
}

pub fn class_name(id: ClassId) -> &'static str {
    category(id).map_or("unknown", |c| c.name)
}

pub fn class_color(id: ClassId) -> Color {
    let hex = category(id).map_or(UNKNOWN_CLASS_COLOR, |c| c.color);
    Color::from_hex(hex).unwrap_or(Color::rgb(0.5, 0.5, 0.5))
}
