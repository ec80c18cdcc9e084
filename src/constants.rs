//! Global constants for the mothra application

// =============================================================================
// Geometry
// =============================================================================

/// Smallest committed box side, in image pixels
pub const MIN_BOX_SIZE: f64 = 4.0;

/// Zoom floor used while the canvas or image size is still unknown
pub const MIN_ZOOM: f64 = 0.25;

/// Upper zoom bound (500%)
pub const MAX_ZOOM: f64 = 5.0;

/// Additive zoom increment for keyboard and ctrl+wheel zoom
pub const ZOOM_STEP: f64 = 0.1;

/// Half side of a resize handle, in screen pixels. Also the grab tolerance.
pub const HANDLE_HALFSIZE_PX: f64 = 5.0;

/// A drag whose preview differs from the original by no more than this
/// (image pixels, per component) is treated as a click.
pub const DRAG_COMMIT_EPSILON: f64 = 0.5;

// =============================================================================
// Rendering
// =============================================================================

/// Default fill opacity of annotation boxes
pub const DEFAULT_BOX_OPACITY: f64 = 0.3;

/// Fill opacity of the in-progress draw preview
pub const DRAW_PREVIEW_OPACITY: f64 = 0.15;

/// Border width in screen pixels (divided by zoom when painting)
pub const BORDER_WIDTH_PX: f64 = 2.0;

/// Border width of the selected box in screen pixels
pub const SELECTED_BORDER_WIDTH_PX: f64 = 3.0;

/// Selection dashed stroke width in screen pixels
pub const SELECTION_DASH_WIDTH_PX: f64 = 1.5;

/// Selection dash pattern `[on, off]` in screen pixels
pub const SELECTION_DASH_PX: [f64; 2] = [6.0, 4.0];

/// Label font size in screen pixels; never smaller than [`LABEL_MIN_FONT_SIZE`] image pixels
pub const LABEL_FONT_SIZE_PX: f64 = 14.0;

/// Minimum label font size in image pixels
pub const LABEL_MIN_FONT_SIZE: f64 = 12.0;

/// Label pill padding in screen pixels
pub const LABEL_PADDING_PX: f64 = 3.0;

/// Canvas background behind the image
pub const BACKGROUND_HEX: &str = "#F3F4F6";

// =============================================================================
// History & persistence
// =============================================================================

/// Default number of undo snapshots kept per session; 0 keeps every snapshot
pub const UNDO_HISTORY_LIMIT: usize = 0;

/// Key prefix for persisted sessions
pub const STORAGE_PREFIX: &str = "mothra-session-";

/// Default autosave debounce in seconds
pub const AUTOSAVE_DEBOUNCE_SECS: f64 = 1.0;

/// Default minimum interval between autosaves in seconds
pub const AUTOSAVE_MIN_INTERVAL_SECS: f64 = 5.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_bounds_ordered() {
        assert!(MIN_ZOOM > 0.0);
        assert!(MIN_ZOOM < MAX_ZOOM);
        assert!(ZOOM_STEP > 0.0);
    }

    #[test]
    fn test_opacities_in_range() {
        assert!((0.0..=1.0).contains(&DEFAULT_BOX_OPACITY));
        assert!((0.0..=1.0).contains(&DRAW_PREVIEW_OPACITY));
    }
}
