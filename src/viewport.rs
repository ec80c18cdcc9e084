//! Viewport transform: zoom and pan between screen and image space.
//!
//! Screen space is CSS pixels with the origin at the canvas' top-left corner.
//! `pan` is the screen position of the image origin, so
//! `screen = image * zoom + pan`.

use crate::constants::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::model::Point;

/// Map a screen coordinate to image space.
pub fn screen_to_image(sx: f64, sy: f64, zoom: f64, pan_x: f64, pan_y: f64) -> (f64, f64) {
    ((sx - pan_x) / zoom, (sy - pan_y) / zoom)
}

/// Map an image coordinate to screen space. Exact inverse of [`screen_to_image`].
pub fn image_to_screen(ix: f64, iy: f64, zoom: f64, pan_x: f64, pan_y: f64) -> (f64, f64) {
    (ix * zoom + pan_x, iy * zoom + pan_y)
}

/// Zoom at which the whole image exactly fits the canvas.
///
/// Returns None while either size is unknown (zero or negative).
pub fn fit_zoom(canvas_w: f64, canvas_h: f64, image_w: f64, image_h: f64) -> Option<f64> {
    if canvas_w <= 0.0 || canvas_h <= 0.0 || image_w <= 0.0 || image_h <= 0.0 {
        return None;
    }
    Some((canvas_w / image_w).min(canvas_h / image_h))
}

/// Zoom/pan state plus the sizes that bound it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    canvas_w: f64,
    canvas_h: f64,
    image_w: f64,
    image_h: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            canvas_w: 0.0,
            canvas_h: 0.0,
            image_w: 0.0,
            image_h: 0.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.set_canvas(width, height);
        self
    }

    pub fn with_image(mut self, width: f64, height: f64) -> Self {
        self.set_image(width, height);
        self
    }

    /// Update the canvas size. Does not refit; callers decide.
    pub fn set_canvas(&mut self, width: f64, height: f64) {
        self.canvas_w = width;
        self.canvas_h = height;
    }

    pub fn set_image(&mut self, width: f64, height: f64) {
        self.image_w = width;
        self.image_h = height;
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_w, self.canvas_h)
    }

    pub fn image_size(&self) -> (f64, f64) {
        (self.image_w, self.image_h)
    }

    pub fn fit_zoom(&self) -> Option<f64> {
        fit_zoom(self.canvas_w, self.canvas_h, self.image_w, self.image_h)
    }

    /// Lower zoom bound: the fit zoom, or [`MIN_ZOOM`] while sizes are unknown.
    pub fn min_zoom(&self) -> f64 {
        self.fit_zoom().unwrap_or(MIN_ZOOM)
    }

    /// Upper zoom bound. Raised to the fit zoom for images smaller than
    /// `canvas / MAX_ZOOM` so the bounds never cross.
    pub fn max_zoom(&self) -> f64 {
        MAX_ZOOM.max(self.min_zoom())
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.max(self.min_zoom()).min(self.max_zoom())
    }

    pub fn screen_to_image(&self, screen: Point) -> Point {
        let (x, y) = screen_to_image(screen.x, screen.y, self.zoom, self.pan_x, self.pan_y);
        Point::new(x, y)
    }

    pub fn image_to_screen(&self, image: Point) -> Point {
        let (x, y) = image_to_screen(image.x, image.y, self.zoom, self.pan_x, self.pan_y);
        Point::new(x, y)
    }

    /// Zoom to `new_zoom` (clamped) keeping the image point under the anchor fixed.
    ///
    /// Returns false and leaves the viewport untouched when the clamped zoom
    /// equals the current one.
    pub fn zoom_at(&mut self, new_zoom: f64, anchor_x: f64, anchor_y: f64) -> bool {
        let new_zoom = self.clamp_zoom(new_zoom);
        if new_zoom == self.zoom {
            return false;
        }
        let ratio = new_zoom / self.zoom;
        self.pan_x = anchor_x - (anchor_x - self.pan_x) * ratio;
        self.pan_y = anchor_y - (anchor_y - self.pan_y) * ratio;
        log::trace!(
            "zoom {:.3} -> {:.3} at ({:.1}, {:.1})",
            self.zoom,
            new_zoom,
            anchor_x,
            anchor_y
        );
        self.zoom = new_zoom;
        true
    }

    /// Step zoom in by [`ZOOM_STEP`] around the canvas centre.
    pub fn zoom_in(&mut self) -> bool {
        let (cx, cy) = self.canvas_center();
        self.zoom_at(self.zoom + ZOOM_STEP, cx, cy)
    }

    /// Step zoom out by [`ZOOM_STEP`] around the canvas centre.
    pub fn zoom_out(&mut self) -> bool {
        let (cx, cy) = self.canvas_center();
        self.zoom_at(self.zoom - ZOOM_STEP, cx, cy)
    }

    /// Apply a pan delta in screen pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) {
        self.pan_x = pan_x;
        self.pan_y = pan_y;
    }

    /// Fit the image and centre it. With unknown sizes, resets to 100% at the origin.
    pub fn reset(&mut self) {
        match self.fit_zoom() {
            Some(fit) => {
                self.zoom = fit;
                self.pan_x = (self.canvas_w - self.image_w * fit) / 2.0;
                self.pan_y = (self.canvas_h - self.image_h * fit) / 2.0;
            }
            None => {
                self.zoom = 1.0;
                self.pan_x = 0.0;
                self.pan_y = 0.0;
            }
        }
        log::debug!(
            "view reset: zoom {:.3}, pan ({:.1}, {:.1})",
            self.zoom,
            self.pan_x,
            self.pan_y
        );
    }

    /// Zoom as a rounded percentage for status display.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round().max(0.0) as u32
    }

    fn canvas_center(&self) -> (f64, f64) {
        (self.canvas_w / 2.0, self.canvas_h / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn fitted() -> Viewport {
        let mut vp = Viewport::new().with_canvas(800.0, 600.0).with_image(400.0, 400.0);
        vp.reset();
        vp
    }

    #[test]
    fn test_fit_zoom_picks_smaller_ratio() {
        assert_eq!(fit_zoom(800.0, 600.0, 400.0, 400.0), Some(1.5));
        assert_eq!(fit_zoom(0.0, 600.0, 400.0, 400.0), None);
    }

    #[test]
    fn test_round_trip_across_zoom_range() {
        let vp = fitted();
        let mut zoom = vp.min_zoom();
        while zoom <= MAX_ZOOM {
            for &(px, py) in &[(0.0, 0.0), (123.4, -56.7), (799.0, 599.0)] {
                let (ix, iy) = screen_to_image(px, py, zoom, 37.5, -12.25);
                let (sx, sy) = image_to_screen(ix, iy, zoom, 37.5, -12.25);
                assert!(approx_eq(sx, px) && approx_eq(sy, py), "zoom {}", zoom);
            }
            zoom += 0.37;
        }
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut vp = fitted();
        let anchor = Point::new(312.0, 215.0);
        let before = vp.screen_to_image(anchor);
        assert!(vp.zoom_at(3.2, anchor.x, anchor.y));
        let after = vp.screen_to_image(anchor);
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_zoom_never_below_fit() {
        let mut vp = fitted();
        assert!(!vp.zoom_at(0.1, 10.0, 10.0));
        assert!(approx_eq(vp.zoom, 1.5));
        vp.zoom_at(4.0, 0.0, 0.0);
        vp.zoom_at(0.01, 0.0, 0.0);
        assert!(approx_eq(vp.zoom, 1.5));
    }

    #[test]
    fn test_zoom_clamped_to_max() {
        let mut vp = fitted();
        vp.zoom_at(50.0, 0.0, 0.0);
        assert!(approx_eq(vp.zoom, MAX_ZOOM));
        assert!(!vp.zoom_at(60.0, 0.0, 0.0));
    }

    #[test]
    fn test_tiny_image_max_follows_fit() {
        let mut vp = Viewport::new().with_canvas(1000.0, 1000.0).with_image(10.0, 10.0);
        vp.reset();
        assert!(approx_eq(vp.zoom, 100.0));
        assert!(approx_eq(vp.max_zoom(), 100.0));
    }

    #[test]
    fn test_reset_centers_image() {
        let vp = fitted();
        assert!(approx_eq(vp.pan_x, 100.0));
        assert!(approx_eq(vp.pan_y, 0.0));
    }

    #[test]
    fn test_zoom_in_out_steps() {
        let mut vp = fitted();
        assert!(vp.zoom_in());
        assert!(approx_eq(vp.zoom, 1.6));
        assert!(vp.zoom_out());
        assert!(approx_eq(vp.zoom, 1.5));
        vp.zoom_out();
        assert_eq!(vp.zoom, 1.5);
        assert!(!vp.zoom_out());
    }

    #[test]
    fn test_unknown_sizes_use_min_zoom_floor() {
        let mut vp = Viewport::new();
        assert!(approx_eq(vp.min_zoom(), MIN_ZOOM));
        vp.zoom_at(0.01, 0.0, 0.0);
        assert!(approx_eq(vp.zoom, MIN_ZOOM));
    }

    #[test]
    fn test_pan_by() {
        let mut vp = Viewport::new();
        vp.pan_by(5.0, -3.0);
        vp.pan_by(1.0, 1.0);
        assert!(approx_eq(vp.pan_x, 6.0) && approx_eq(vp.pan_y, -2.0));
    }
}
