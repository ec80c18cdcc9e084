//! Centralized constants for mothra_ui

// =============================================================================
// Typography
// =============================================================================

/// Approximate character width as a ratio of font size.
/// Used for text measurement when no font could be loaded.
pub const CHAR_WIDTH_FACTOR: f32 = 0.6;

/// Candidate system font files, tried in order.
pub const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/Carlito-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];
