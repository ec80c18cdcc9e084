//! Clamped box geometry for drag, resize and draw commits.

use crate::constants::MIN_BOX_SIZE;
use crate::hit_test::Handle;
use crate::model::{BoundingBox, Point};

/// Translate `original` by `(dx, dy)`, clamping the position per axis so the
/// box stays inside the image. Size is unchanged.
pub fn translate_clamped(
    original: &BoundingBox,
    dx: f64,
    dy: f64,
    image_w: f64,
    image_h: f64,
) -> BoundingBox {
    let max_x = (image_w - original.width).max(0.0);
    let max_y = (image_h - original.height).max(0.0);
    BoundingBox {
        x: (original.x + dx).clamp(0.0, max_x),
        y: (original.y + dy).clamp(0.0, max_y),
        ..*original
    }
}

/// Move the edge(s) `handle` controls by `(dx, dy)`.
///
/// The opposite edge stays pinned. Each moved edge is clamped to the image
/// and to at least [`MIN_BOX_SIZE`] from the pinned edge.
pub fn resize_with_handle(
    original: &BoundingBox,
    handle: Handle,
    dx: f64,
    dy: f64,
    image_w: f64,
    image_h: f64,
) -> BoundingBox {
    let mut left = original.x;
    let mut top = original.y;
    let mut right = original.right();
    let mut bottom = original.bottom();

    if handle.moves_left() {
        left = (left + dx).min(right - MIN_BOX_SIZE).max(0.0);
    }
    if handle.moves_right() {
        right = (right + dx).max(left + MIN_BOX_SIZE).min(image_w);
    }
    if handle.moves_top() {
        top = (top + dy).min(bottom - MIN_BOX_SIZE).max(0.0);
    }
    if handle.moves_bottom() {
        bottom = (bottom + dy).max(top + MIN_BOX_SIZE).min(image_h);
    }

    BoundingBox::new(left, top, right - left, bottom - top)
}

/// Finalize a drawn rectangle: clamp both corners to the image and normalize.
///
/// Returns None when either side is below [`MIN_BOX_SIZE`].
pub fn commit_draw_rect(start: Point, current: Point, image_w: f64, image_h: f64) -> Option<BoundingBox> {
    let a = start.clamped(image_w, image_h);
    let b = current.clamped(image_w, image_h);
    let bbox = BoundingBox::from_corners(a, b);
    (bbox.width >= MIN_BOX_SIZE && bbox.height >= MIN_BOX_SIZE).then_some(bbox)
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f64 = 200.0;
    const H: f64 = 100.0;

    #[test]
    fn test_draw_commit_normalizes() {
        let bbox = commit_draw_rect(Point::new(10.0, 10.0), Point::new(50.0, 40.0), W, H);
        assert_eq!(bbox, Some(BoundingBox::new(10.0, 10.0, 40.0, 30.0)));
        let reversed = commit_draw_rect(Point::new(50.0, 40.0), Point::new(10.0, 10.0), W, H);
        assert_eq!(reversed, bbox);
    }

    #[test]
    fn test_draw_commit_rejects_tiny() {
        assert_eq!(commit_draw_rect(Point::new(10.0, 10.0), Point::new(11.0, 11.0), W, H), None);
        assert_eq!(commit_draw_rect(Point::new(10.0, 10.0), Point::new(60.0, 13.0), W, H), None);
    }

    #[test]
    fn test_draw_commit_clamps_to_image() {
        let bbox = commit_draw_rect(Point::new(-20.0, 90.0), Point::new(30.0, 150.0), W, H);
        assert_eq!(bbox, Some(BoundingBox::new(0.0, 90.0, 30.0, 10.0)));
    }

    #[test]
    fn test_translate_stays_in_bounds() {
        let original = BoundingBox::new(50.0, 20.0, 40.0, 30.0);
        for (dx, dy) in [(-500.0, -500.0), (500.0, 500.0), (13.0, -7.0), (160.0, 0.0)] {
            let moved = translate_clamped(&original, dx, dy, W, H);
            assert!(moved.x >= 0.0 && moved.x <= W - moved.width, "dx {}", dx);
            assert!(moved.y >= 0.0 && moved.y <= H - moved.height, "dy {}", dy);
            assert_eq!((moved.width, moved.height), (40.0, 30.0));
        }
        let moved = translate_clamped(&original, 13.0, -7.0, W, H);
        assert_eq!((moved.x, moved.y), (63.0, 13.0));
    }

    #[test]
    fn test_se_handle_never_below_min() {
        let original = BoundingBox::new(50.0, 20.0, 40.0, 30.0);
        for (dx, dy) in [(-100.0, -100.0), (-38.0, -27.0), (-40.0, -30.0)] {
            let resized = resize_with_handle(&original, Handle::SouthEast, dx, dy, W, H);
            assert!(resized.width >= MIN_BOX_SIZE);
            assert!(resized.height >= MIN_BOX_SIZE);
            assert_eq!((resized.x, resized.y), (50.0, 20.0));
        }
    }

    #[test]
    fn test_se_handle_clamped_to_image() {
        let original = BoundingBox::new(50.0, 20.0, 40.0, 30.0);
        let resized = resize_with_handle(&original, Handle::SouthEast, 1000.0, 1000.0, W, H);
        assert_eq!(resized, BoundingBox::new(50.0, 20.0, 150.0, 80.0));
    }

    #[test]
    fn test_edge_handle_moves_one_edge() {
        let original = BoundingBox::new(50.0, 20.0, 40.0, 30.0);
        let resized = resize_with_handle(&original, Handle::West, -10.0, 25.0, W, H);
        assert_eq!(resized, BoundingBox::new(40.0, 20.0, 50.0, 30.0));
        let resized = resize_with_handle(&original, Handle::North, 10.0, 100.0, W, H);
        assert_eq!(resized, BoundingBox::new(50.0, 46.0, 40.0, 4.0));
    }

    #[test]
    fn test_nw_handle_pins_se_corner() {
        let original = BoundingBox::new(50.0, 20.0, 40.0, 30.0);
        let resized = resize_with_handle(&original, Handle::NorthWest, -100.0, -100.0, W, H);
        assert_eq!(resized, BoundingBox::new(0.0, 0.0, 90.0, 50.0));
    }
}
