//! Paints one frame from the store, the view settings and a gesture snapshot.
//!
//! Paint order: clear, image, then per visible annotation its fill, border,
//! selection decoration and label, then screen-space resize handles for the
//! selection in select mode, and finally the draw preview on top.

use std::cell::Cell;

use mothra_ui::{Bounds, Color, ImageHandle, Renderer};

use crate::constants::{
    BACKGROUND_HEX, BORDER_WIDTH_PX, DRAW_PREVIEW_OPACITY, HANDLE_HALFSIZE_PX, LABEL_FONT_SIZE_PX,
    LABEL_MIN_FONT_SIZE, LABEL_PADDING_PX, SELECTED_BORDER_WIDTH_PX, SELECTION_DASH_PX,
    SELECTION_DASH_WIDTH_PX,
};
use crate::hit_test::Handle;
use crate::interaction::{EditMode, GestureSnapshot};
use crate::model::{Annotation, AnnotationId, BoundingBox, ClassId, class_color, class_name};
use crate::view::ViewSettings;
use crate::viewport::Viewport;

/// Everything a frame reads. Borrowed, never mutated.
pub struct Scene<'a> {
    pub image: Option<&'a ImageHandle>,
    pub annotations: &'a [Annotation],
    pub selected: Option<&'a AnnotationId>,
    pub active_class: ClassId,
    pub mode: EditMode,
    pub gesture: &'a GestureSnapshot,
    pub viewport: &'a Viewport,
    pub view: &'a ViewSettings,
    /// Device pixels per logical pixel
    pub scale_factor: f64,
}

fn bounds(bbox: &BoundingBox) -> Bounds {
    Bounds::new(bbox.x as f32, bbox.y as f32, bbox.width as f32, bbox.height as f32)
}

fn dash(zoom: f64) -> [f32; 2] {
    [(SELECTION_DASH_PX[0] / zoom) as f32, (SELECTION_DASH_PX[1] / zoom) as f32]
}

#[derive(Debug, Default)]
pub struct Compositor {
    warned_no_font: Cell<bool>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paint(&self, renderer: &mut Renderer, scene: &Scene<'_>) {
        let viewport = scene.viewport;
        let zoom = viewport.zoom;
        let dpr = scene.scale_factor;

        renderer.reset_transform();
        renderer.clear(Color::from_hex(BACKGROUND_HEX).unwrap_or(Color::WHITE));
        renderer.set_transform(
            (dpr * zoom) as f32,
            (dpr * viewport.pan_x) as f32,
            (dpr * viewport.pan_y) as f32,
        );

        if let Some(image) = scene.image {
            renderer.draw_image(image);
        }

        let mut selected_bbox = None;
        for annotation in scene.annotations {
            if scene.view.is_hidden(annotation.class_id) {
                continue;
            }
            let bbox = scene
                .gesture
                .preview_for(&annotation.id)
                .unwrap_or(annotation.bbox);
            let is_selected = scene.selected == Some(&annotation.id);
            if is_selected {
                selected_bbox = Some((bbox, annotation.class_id));
            }
            self.paint_annotation(renderer, scene, annotation.class_id, &bbox, is_selected);
        }

        if scene.mode == EditMode::Select {
            if let Some((bbox, class_id)) = selected_bbox {
                renderer.set_transform(dpr as f32, 0.0, 0.0);
                paint_handles(renderer, viewport, &bbox, class_color(class_id));
                renderer.set_transform(
                    (dpr * zoom) as f32,
                    (dpr * viewport.pan_x) as f32,
                    (dpr * viewport.pan_y) as f32,
                );
            }
        }

        if let Some(preview) = scene.gesture.draw_preview {
            let color = class_color(scene.active_class);
            let rect = bounds(&preview);
            renderer.fill_rect(rect, color.with_alpha(DRAW_PREVIEW_OPACITY as f32));
            renderer.stroke_rect(rect, color, (BORDER_WIDTH_PX / zoom) as f32, Some(dash(zoom)));
        }

        renderer.reset_transform();
    }

    fn paint_annotation(
        &self,
        renderer: &mut Renderer,
        scene: &Scene<'_>,
        class_id: ClassId,
        bbox: &BoundingBox,
        is_selected: bool,
    ) {
        let zoom = scene.viewport.zoom;
        let color = class_color(class_id);
        let rect = bounds(bbox);

        renderer.fill_rect(rect, color.with_alpha(scene.view.box_opacity() as f32));
        let border = if is_selected {
            SELECTED_BORDER_WIDTH_PX
        } else {
            BORDER_WIDTH_PX
        };
        renderer.stroke_rect(rect, color, (border / zoom) as f32, None);

        if is_selected {
            // Dash runs just inside the border.
            let width = (SELECTION_DASH_WIDTH_PX / zoom) as f32;
            renderer.stroke_rect(rect.inset(width / 2.0), Color::WHITE, width, Some(dash(zoom)));
        }

        if scene.view.show_labels {
            self.paint_label(renderer, class_name(class_id), bbox, color, zoom);
        }
    }

    /// Class-coloured pill sitting on the top edge of the box.
    fn paint_label(&self, renderer: &mut Renderer, name: &str, bbox: &BoundingBox, color: Color, zoom: f64) {
        let font_size = LABEL_MIN_FONT_SIZE.max(LABEL_FONT_SIZE_PX / zoom) as f32;
        let padding = (LABEL_PADDING_PX / zoom) as f32;
        let pill_w = renderer.measure_text(name, font_size) + padding * 2.0;
        let pill_h = font_size + padding * 2.0;
        let x = bbox.x as f32;
        let y = bbox.y as f32 - pill_h;

        renderer.fill_rect(Bounds::new(x, y, pill_w, pill_h), color);
        if !renderer.has_font() && !self.warned_no_font.replace(true) {
            log::warn!("No font loaded; drawing label pills without text");
        }
        renderer.fill_text(name, x + padding, y + padding, font_size, Color::WHITE);
    }
}

/// Fixed-size squares at the handle anchors, in logical screen pixels.
fn paint_handles(renderer: &mut Renderer, viewport: &Viewport, bbox: &BoundingBox, color: Color) {
    let half = HANDLE_HALFSIZE_PX as f32;
    for handle in Handle::ALL {
        let anchor = viewport.image_to_screen(handle.anchor(bbox));
        let square = Bounds::centered(anchor.x as f32, anchor.y as f32, half);
        renderer.fill_rect(square, Color::WHITE);
        renderer.stroke_rect(square, color, 1.0, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionState;

    struct Fixture {
        annotations: Vec<Annotation>,
        viewport: Viewport,
        view: ViewSettings,
        gesture: GestureSnapshot,
    }

    impl Fixture {
        fn new() -> Self {
            let mut viewport = Viewport::new().with_canvas(100.0, 100.0).with_image(100.0, 100.0);
            viewport.reset();
            let mut view = ViewSettings::new();
            view.show_labels = false;
            view.set_box_opacity(1.0);
            Self {
                annotations: vec![Annotation::new("a".into(), 2, BoundingBox::new(20.0, 20.0, 40.0, 40.0))],
                viewport,
                view,
                gesture: GestureSnapshot::default(),
            }
        }

        fn paint(&self, selected: Option<&AnnotationId>, mode: EditMode) -> Renderer {
            let mut renderer = Renderer::new(100, 100).unwrap();
            let scene = Scene {
                image: None,
                annotations: &self.annotations,
                selected,
                active_class: 1,
                mode,
                gesture: &self.gesture,
                viewport: &self.viewport,
                view: &self.view,
                scale_factor: 1.0,
            };
            Compositor::new().paint(&mut renderer, &scene);
            renderer
        }
    }

    fn rgba(renderer: &Renderer, x: u32, y: u32) -> [u8; 4] {
        let p = renderer.pixmap().pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    const MUSIC_RED: [u8; 4] = [0xEF, 0x44, 0x44, 255];
    const BACKGROUND: [u8; 4] = [0xF3, 0xF4, 0xF6, 255];

    #[test]
    fn test_background_and_box_fill() {
        let f = Fixture::new();
        let r = f.paint(None, EditMode::Draw);
        assert_eq!(rgba(&r, 5, 5), BACKGROUND);
        assert_eq!(rgba(&r, 40, 40), MUSIC_RED);
    }

    #[test]
    fn test_hidden_class_not_painted() {
        let mut f = Fixture::new();
        f.view.toggle_class_visibility(2);
        let r = f.paint(None, EditMode::Draw);
        assert_eq!(rgba(&r, 40, 40), BACKGROUND);
    }

    #[test]
    fn test_drag_preview_replaces_stored_bbox() {
        let mut f = Fixture::new();
        f.gesture = GestureSnapshot {
            state: InteractionState::DraggingBody,
            draw_preview: None,
            drag_preview: Some(("a".into(), BoundingBox::new(60.0, 60.0, 30.0, 30.0))),
        };
        let r = f.paint(None, EditMode::Select);
        assert_eq!(rgba(&r, 30, 30), BACKGROUND);
        assert_eq!(rgba(&r, 75, 75), MUSIC_RED);
    }

    #[test]
    fn test_handles_only_in_select_mode() {
        let f = Fixture::new();
        let id = AnnotationId::from("a");
        // nw handle square spans 15..25 around (20, 20); (16, 16) is outside the box
        let select = f.paint(Some(&id), EditMode::Select);
        assert_eq!(rgba(&select, 16, 16), [255, 255, 255, 255]);
        let draw = f.paint(Some(&id), EditMode::Draw);
        assert_eq!(rgba(&draw, 16, 16), BACKGROUND);
    }

    #[test]
    fn test_selection_dash_inside_box() {
        let f = Fixture::new();
        let id = AnnotationId::from("a");
        let r = f.paint(Some(&id), EditMode::Draw);
        // Box top edge at y=20: the dash covers 20..21.5, the row above is border only
        assert_eq!(rgba(&r, 23, 20), [255, 255, 255, 255]);
        assert_eq!(rgba(&r, 23, 19), MUSIC_RED);
    }

    #[test]
    fn test_draw_preview_on_top() {
        let mut f = Fixture::new();
        f.gesture = GestureSnapshot {
            state: InteractionState::Drawing,
            draw_preview: Some(BoundingBox::new(50.0, 50.0, 30.0, 30.0)),
            drag_preview: None,
        };
        let r = f.paint(None, EditMode::Draw);
        // Translucent blue over the opaque red fill
        let [red, _, blue, _] = rgba(&r, 55, 55);
        assert!(blue > 0x44 && red < 0xEF);
    }

    #[test]
    fn test_label_pill_above_box() {
        let mut f = Fixture::new();
        f.view.show_labels = true;
        let r = f.paint(None, EditMode::Draw);
        // 14px text plus 3px padding: the pill spans y 0..20 starting at x 20
        assert_eq!(rgba(&r, 21, 2), MUSIC_RED);
        assert_eq!(rgba(&r, 18, 2), BACKGROUND);
    }
}
