//! Software renderer over a tiny-skia pixmap.
//!
//! Drawing happens in *user space*; [`Renderer::set_transform`] maps user
//! space to device pixels with a uniform scale plus translation, which is all
//! an image viewer needs (device-pixel-ratio x zoom, then pan).

use std::collections::HashMap;

use ab_glyph::{point, Font, FontArc, ScaleFont};
use thiserror::Error;
use tiny_skia::{
    FilterQuality, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, StrokeDash,
    Transform,
};

use crate::constants::{CHAR_WIDTH_FACTOR, FONT_SEARCH_PATHS};
use crate::image::ImageHandle;

/// Renderer failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate {width}x{height} pixmap")]
    Allocation { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// An axis-aligned rectangle in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `2 * half` centred on `(cx, cy)`.
    pub fn centered(cx: f32, cy: f32, half: f32) -> Self {
        Self::new(cx - half, cy - half, half * 2.0, half * 2.0)
    }

    /// Shrink every side by `amount`, never below zero size.
    pub fn inset(self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - amount * 2.0).max(0.0),
            (self.height - amount * 2.0).max(0.0),
        )
    }

    fn to_rect(self) -> Option<Rect> {
        Rect::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// RGBA color with straight alpha, components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    fn paint(self) -> Paint<'static> {
        let [r, g, b, a] = self.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        paint
    }
}

/// Try the well-known system font locations.
pub fn load_system_font() -> Option<FontArc> {
    for path in FONT_SEARCH_PATHS {
        let Ok(data) = std::fs::read(path) else {
            continue;
        };
        match FontArc::try_from_vec(data) {
            Ok(font) => {
                log::debug!("Loaded font from {}", path);
                return Some(font);
            }
            Err(e) => log::debug!("Failed to parse font {}: {:?}", path, e),
        }
    }
    log::warn!("No system font found; text will not be rendered");
    None
}

/// Draws into an owned RGBA pixmap.
pub struct Renderer {
    pixmap: Pixmap,
    transform: Transform,
    font: Option<FontArc>,
    /// Premultiplied copies of image handles, keyed by `ImageHandle::id`
    image_cache: HashMap<u64, Pixmap>,
}

impl Renderer {
    /// Create a renderer with a `width` x `height` device-pixel target.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap =
            Pixmap::new(width.max(1), height.max(1)).ok_or(RenderError::Allocation { width, height })?;
        Ok(Self {
            pixmap,
            transform: Transform::identity(),
            font: None,
            image_cache: HashMap::new(),
        })
    }

    /// Attach the font used by [`Renderer::fill_text`].
    pub fn with_font(mut self, font: Option<FontArc>) -> Self {
        self.font = font;
        self
    }

    /// Reallocate the target if the size changed.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        let (width, height) = (width.max(1), height.max(1));
        if width == self.pixmap.width() && height == self.pixmap.height() {
            return Ok(());
        }
        self.pixmap = Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        log::debug!("Renderer resized to {}x{}", width, height);
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Fill the whole target, ignoring the transform.
    pub fn clear(&mut self, color: Color) {
        let [r, g, b, a] = color.to_rgba8();
        self.pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));
    }

    /// Map user space to device space: `device = user * scale + (tx, ty)`.
    pub fn set_transform(&mut self, scale: f32, tx: f32, ty: f32) {
        self.transform = Transform::from_row(scale, 0.0, 0.0, scale, tx, ty);
    }

    pub fn reset_transform(&mut self) {
        self.transform = Transform::identity();
    }

    /// Current user-to-device scale.
    pub fn scale(&self) -> f32 {
        self.transform.sx
    }

    /// Draw an image with its top-left corner at the user-space origin.
    pub fn draw_image(&mut self, handle: &ImageHandle) {
        let key = handle.id();
        if !self.image_cache.contains_key(&key) {
            let Some(converted) = premultiplied_pixmap(handle) else {
                log::warn!(
                    "Cannot convert {}x{} image for drawing",
                    handle.width(),
                    handle.height()
                );
                return;
            };
            // Single image per session; drop stale conversions.
            self.image_cache.clear();
            self.image_cache.insert(key, converted);
        }
        if let Some(image) = self.image_cache.get(&key) {
            let paint = PixmapPaint {
                quality: FilterQuality::Nearest,
                ..Default::default()
            };
            self.pixmap
                .draw_pixmap(0, 0, image.as_ref(), &paint, self.transform, None);
        }
    }

    pub fn fill_rect(&mut self, bounds: Bounds, color: Color) {
        let Some(rect) = bounds.to_rect() else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &color.paint(), self.transform, None);
    }

    /// Stroke a rectangle outline. `dash` is `[on, off]` in user units.
    pub fn stroke_rect(&mut self, bounds: Bounds, color: Color, width: f32, dash: Option<[f32; 2]>) {
        let Some(rect) = bounds.to_rect() else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width,
            dash: dash.and_then(|[on, off]| StrokeDash::new(vec![on, off], 0.0)),
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &color.paint(), &stroke, self.transform, None);
    }

    /// Advance width of `text` at `size`, in user units.
    pub fn measure_text(&self, text: &str, size: f32) -> f32 {
        let Some(font) = &self.font else {
            return text.chars().count() as f32 * size * CHAR_WIDTH_FACTOR;
        };
        let scaled = font.as_scaled(size);
        let mut width = 0.0;
        let mut last = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = last {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            last = Some(id);
        }
        width
    }

    /// Draw a single line of text with its top-left at `(x, y)` in user space.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        let Some(font) = &self.font else {
            return;
        };
        let t = self.transform;
        let device_size = size * t.sx;
        if device_size <= 0.0 {
            return;
        }
        let origin_x = x * t.sx + t.tx;
        let origin_y = y * t.sy + t.ty;

        let scaled = font.as_scaled(device_size);
        let baseline = origin_y + scaled.ascent();
        let width = self.pixmap.width() as i32;
        let height = self.pixmap.height() as i32;
        let data = self.pixmap.data_mut();

        let mut caret = origin_x;
        let mut last = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(device_size, point(caret, baseline));
            caret += scaled.h_advance(id);
            last = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                let index = (py as usize * width as usize + px as usize) * 4;
                blend_over(&mut data[index..index + 4], color, coverage);
            });
        }
    }

    /// The rendered target.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}

/// Source-over blend of a straight-alpha color into one premultiplied pixel.
fn blend_over(pixel: &mut [u8], color: Color, coverage: f32) {
    let alpha = (color.a * coverage).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    let src = [color.r * alpha, color.g * alpha, color.b * alpha, alpha];
    for (dst, s) in pixel.iter_mut().zip(src) {
        let blended = s * 255.0 + *dst as f32 * inv;
        *dst = blended.round().clamp(0.0, 255.0) as u8;
    }
}

fn premultiplied_pixmap(handle: &ImageHandle) -> Option<Pixmap> {
    let mut data = handle.data().to_vec();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a < 255 {
            for c in &mut px[..3] {
                *c = ((*c as u16 * a + 127) / 255) as u8;
            }
        }
    }
    let size = IntSize::from_wh(handle.width(), handle.height())?;
    Pixmap::from_vec(data, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(renderer: &Renderer, x: u32, y: u32) -> [u8; 4] {
        let p = renderer.pixmap().pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex("#3B82F6").unwrap();
        assert_eq!(c.to_rgba8(), [0x3B, 0x82, 0xF6, 255]);
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("zzzzzz").is_none());
    }

    #[test]
    fn test_clear_and_fill_rect() {
        let mut renderer = Renderer::new(10, 10).unwrap();
        renderer.clear(Color::BLACK);
        renderer.fill_rect(Bounds::new(2.0, 2.0, 4.0, 4.0), Color::WHITE);
        assert_eq!(pixel(&renderer, 3, 3), [255, 255, 255, 255]);
        assert_eq!(pixel(&renderer, 8, 8), [0, 0, 0, 255]);
    }

    #[test]
    fn test_transform_scales_user_space() {
        let mut renderer = Renderer::new(20, 20).unwrap();
        renderer.clear(Color::BLACK);
        renderer.set_transform(2.0, 4.0, 0.0);
        renderer.fill_rect(Bounds::new(0.0, 0.0, 2.0, 2.0), Color::WHITE);
        // user (0..2) -> device (4..8)
        assert_eq!(pixel(&renderer, 5, 1), [255, 255, 255, 255]);
        assert_eq!(pixel(&renderer, 2, 1), [0, 0, 0, 255]);
        assert_eq!(renderer.scale(), 2.0);
    }

    #[test]
    fn test_draw_image_uses_cache() {
        let handle = ImageHandle::from_rgba8(vec![255, 0, 0, 255].repeat(4), 2, 2).unwrap();
        let mut renderer = Renderer::new(4, 4).unwrap();
        renderer.clear(Color::BLACK);
        renderer.draw_image(&handle);
        renderer.draw_image(&handle);
        assert_eq!(pixel(&renderer, 1, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&renderer, 3, 3), [0, 0, 0, 255]);
        assert_eq!(renderer.image_cache.len(), 1);
    }

    #[test]
    fn test_bounds_inset() {
        let b = Bounds::new(10.0, 20.0, 8.0, 4.0);
        assert_eq!(b.inset(1.0), Bounds::new(11.0, 21.0, 6.0, 2.0));
        assert_eq!(b.inset(3.0).height, 0.0);
    }

    #[test]
    fn test_measure_text_without_font() {
        let renderer = Renderer::new(1, 1).unwrap();
        let w = renderer.measure_text("abcd", 10.0);
        assert!((w - 4.0 * 10.0 * CHAR_WIDTH_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn test_blend_over_half_alpha() {
        let mut px = [0u8, 0, 0, 255];
        blend_over(&mut px, Color::WHITE, 0.5);
        assert_eq!(px, [128, 128, 128, 255]);
    }

    #[test]
    fn test_png_encodes() {
        let renderer = Renderer::new(3, 3).unwrap();
        let png = renderer.encode_png().unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}
