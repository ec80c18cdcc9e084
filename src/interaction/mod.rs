//! Interaction state machine.
//!
//! Turns pointer, wheel and keyboard input into gesture state and, when a
//! gesture completes, into a single committed store mutation. While a gesture
//! runs, the store is never written; the compositor reads the live preview
//! through [`InteractionEngine::snapshot`].
//!
//! ```text
//!            left (draw mode)                 up: add if >= MIN_BOX_SIZE
//!   Idle ──────────────────────▶ Drawing ───────────────────────────▶ Idle
//!    │  left on handle (select)                up: move if changed > 0.5px
//!    ├───────────────────────────▶ DraggingHandle(h) ──────────────────▶ Idle
//!    │  left on body (select)
//!    ├───────────────────────────▶ DraggingBody ───────────────────────▶ Idle
//!    │  middle, or space + left (any mode)
//!    └───────────────────────────▶ Panning ────────────────────────────▶ Idle
//! ```
//!
//! Escape and pointer-cancel return to Idle from any state without touching
//! the store.

mod gesture;
mod resize;

use std::collections::HashSet;

use mothra_ui::{CursorIcon, MouseButton, Point as ScreenPoint, PointerEvent, WheelEvent};

use crate::constants::{DRAG_COMMIT_EPSILON, ZOOM_STEP};
use crate::hit_test::{hit_test_body, hit_test_handle};
use crate::model::{ClassId, Point};
use crate::store::StoreHandle;
use crate::viewport::Viewport;

pub use gesture::{DragTarget, Gesture, GestureSnapshot, InteractionState};
pub use resize::{commit_draw_rect, resize_with_handle, translate_clamped};

/// Which pointer gestures may start a box interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// No image loaded; only panning is available.
    #[default]
    Idle,
    /// Left-drag draws a new box.
    Draw,
    /// Left-click selects; drag moves or resizes the selection.
    Select,
}

impl EditMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EditMode::Idle => "idle",
            EditMode::Draw => "draw",
            EditMode::Select => "select",
        }
    }
}

/// Pointer capture request for the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Acquire(u32),
    Release(u32),
}

/// What the host should do after an input was handled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reaction {
    /// Schedule a repaint.
    pub redraw: bool,
    pub capture: Option<Capture>,
    /// New cursor glyph, if it changed.
    pub cursor: Option<CursorIcon>,
}

impl Reaction {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    fn with_capture(mut self, capture: Option<Capture>) -> Self {
        self.capture = capture.or(self.capture);
        self
    }

    fn with_cursor(mut self, cursor: Option<CursorIcon>) -> Self {
        self.cursor = cursor.or(self.cursor);
        self
    }

    /// Combine two reactions; `other` wins where both set a value.
    pub fn merge(self, other: Reaction) -> Self {
        Self {
            redraw: self.redraw || other.redraw,
            capture: other.capture.or(self.capture),
            cursor: other.cursor.or(self.cursor),
        }
    }
}

/// Collaborators an input handler needs besides the store.
pub struct InputContext<'a> {
    pub viewport: &'a mut Viewport,
    pub hidden_classes: &'a HashSet<ClassId>,
}

/// The pointer-driven state machine.
#[derive(Debug)]
pub struct InteractionEngine {
    store: StoreHandle,
    mode: EditMode,
    gesture: Gesture,
    space_held: bool,
    captured: Option<u32>,
    cursor: CursorIcon,
}

impl InteractionEngine {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            store,
            mode: EditMode::Idle,
            gesture: Gesture::None,
            space_held: false,
            captured: None,
            cursor: CursorIcon::Default,
        }
    }

    pub fn with_mode(mut self, mode: EditMode) -> Self {
        self.mode = mode;
        self.cursor = Self::idle_cursor(mode, false);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn state(&self) -> InteractionState {
        self.gesture.state()
    }

    /// Read-only copy of the gesture for rendering.
    pub fn snapshot(&self) -> GestureSnapshot {
        self.gesture.snapshot()
    }

    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    pub fn is_capturing(&self) -> bool {
        self.captured.is_some()
    }

    pub fn space_held(&self) -> bool {
        self.space_held
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    pub fn pointer_down(&mut self, event: &PointerEvent, ctx: &mut InputContext<'_>) -> Reaction {
        if self.gesture.is_active() {
            log::trace!("pointer down ignored: {:?} in progress", self.state());
            return Reaction::none();
        }

        let wants_pan = event.button == MouseButton::Middle
            || (event.button == MouseButton::Left && self.space_held);
        if wants_pan {
            return self.begin_pan(event, ctx.viewport);
        }
        if event.button != MouseButton::Left || !event.modifiers.is_empty() {
            return Reaction::none();
        }

        let point = to_image(ctx.viewport, event.position);
        match self.mode {
            EditMode::Idle => Reaction::none(),
            EditMode::Draw => {
                self.store.borrow_mut().set_selected(None);
                self.gesture = Gesture::Drawing {
                    start: point,
                    current: point,
                };
                log::debug!("Drawing started at ({:.1}, {:.1})", point.x, point.y);
                let capture = self.acquire(event.pointer_id);
                Reaction::redraw().with_capture(capture)
            }
            EditMode::Select => self.begin_select(event, point, ctx),
        }
    }

    fn begin_pan(&mut self, event: &PointerEvent, viewport: &Viewport) -> Reaction {
        self.gesture = Gesture::Panning {
            origin_screen: event.position,
            origin_pan: (viewport.pan_x, viewport.pan_y),
            via_space: event.button == MouseButton::Left,
        };
        log::debug!("Pan started at ({:.0}, {:.0})", event.position.x, event.position.y);
        let capture = self.acquire(event.pointer_id);
        Reaction::none()
            .with_capture(capture)
            .with_cursor(self.set_cursor(CursorIcon::Grabbing))
    }

    fn begin_select(&mut self, event: &PointerEvent, point: Point, ctx: &mut InputContext<'_>) -> Reaction {
        let hidden = ctx.hidden_classes;
        let zoom = ctx.viewport.zoom;

        let hit = {
            let store = self.store.borrow();
            let handle_hit = store
                .selected_annotation()
                .filter(|ann| !hidden.contains(&ann.class_id))
                .and_then(|ann| {
                    hit_test_handle(&ann.bbox, point, zoom)
                        .map(|handle| (ann.id.clone(), ann.bbox, DragTarget::Handle(handle)))
                });
            handle_hit.or_else(|| {
                hit_test_body(store.annotations(), point, |class| hidden.contains(&class)).map(|index| {
                    let ann = &store.annotations()[index];
                    (ann.id.clone(), ann.bbox, DragTarget::Body)
                })
            })
        };

        let Some((annotation_id, bbox, target)) = hit else {
            self.store.borrow_mut().set_selected(None);
            return Reaction::redraw();
        };

        log::debug!("Drag {:?} started on {}", target, annotation_id);
        self.store
            .borrow_mut()
            .set_selected(Some(annotation_id.clone()));
        self.gesture = Gesture::Dragging {
            annotation_id,
            target,
            origin: point,
            original: bbox,
            preview: bbox,
        };
        let cursor = match target {
            DragTarget::Body => CursorIcon::Move,
            DragTarget::Handle(handle) => handle.cursor(),
        };
        let capture = self.acquire(event.pointer_id);
        Reaction::redraw()
            .with_capture(capture)
            .with_cursor(self.set_cursor(cursor))
    }

    /// Apply a (latched) pointer position.
    pub fn pointer_move(&mut self, position: ScreenPoint, ctx: &mut InputContext<'_>) -> Reaction {
        let point = to_image(ctx.viewport, position);
        let (image_w, image_h) = ctx.viewport.image_size();
        if !self.gesture.is_active() {
            return self.hover(point, ctx);
        }

        match &mut self.gesture {
            Gesture::None => Reaction::none(),
            Gesture::Panning {
                origin_screen,
                origin_pan,
                ..
            } => {
                ctx.viewport.set_pan(
                    origin_pan.0 + (position.x - origin_screen.x),
                    origin_pan.1 + (position.y - origin_screen.y),
                );
                Reaction::redraw()
            }
            Gesture::Drawing { current, .. } => {
                if *current == point {
                    return Reaction::none();
                }
                *current = point;
                Reaction::redraw()
            }
            Gesture::Dragging {
                target,
                origin,
                original,
                preview,
                ..
            } => {
                let (dx, dy) = (point.x - origin.x, point.y - origin.y);
                let next = match *target {
                    DragTarget::Body => translate_clamped(original, dx, dy, image_w, image_h),
                    DragTarget::Handle(handle) => {
                        resize_with_handle(original, handle, dx, dy, image_w, image_h)
                    }
                };
                if next == *preview {
                    return Reaction::none();
                }
                *preview = next;
                Reaction::redraw()
            }
        }
    }

    /// Hover feedback while no gesture runs.
    fn hover(&mut self, point: Point, ctx: &InputContext<'_>) -> Reaction {
        let cursor = if self.space_held || self.mode != EditMode::Select {
            Self::idle_cursor(self.mode, self.space_held)
        } else {
            let store = self.store.borrow();
            let hidden = ctx.hidden_classes;
            let on_handle = store
                .selected_annotation()
                .filter(|ann| !hidden.contains(&ann.class_id))
                .and_then(|ann| hit_test_handle(&ann.bbox, point, ctx.viewport.zoom));
            match on_handle {
                Some(handle) => handle.cursor(),
                None if hit_test_body(store.annotations(), point, |c| hidden.contains(&c)).is_some() => {
                    CursorIcon::Move
                }
                None => CursorIcon::Default,
            }
        };
        Reaction::none().with_cursor(self.set_cursor(cursor))
    }

    pub fn pointer_up(&mut self, event: &PointerEvent, ctx: &mut InputContext<'_>) -> Reaction {
        if !self.gesture.is_active() {
            return Reaction::none();
        }
        if self.captured.is_some_and(|id| id != event.pointer_id) {
            log::trace!("pointer up from uncaptured pointer {}", event.pointer_id);
            return Reaction::none();
        }

        // Commit against the release position, not the last latched one.
        self.pointer_move(event.position, ctx);

        let finished = std::mem::take(&mut self.gesture);
        let (image_w, image_h) = ctx.viewport.image_size();
        match finished {
            Gesture::Drawing { start, current } => {
                match commit_draw_rect(start, current, image_w, image_h) {
                    Some(bbox) => {
                        self.store.borrow_mut().add_annotation(bbox);
                    }
                    None => log::debug!("Drawn box below minimum size, discarded"),
                }
            }
            Gesture::Dragging {
                annotation_id,
                original,
                preview,
                ..
            } => {
                if preview.max_component_delta(&original) > DRAG_COMMIT_EPSILON {
                    self.store
                        .borrow_mut()
                        .move_annotation(&annotation_id, preview);
                } else {
                    log::trace!("Drag on {} below threshold, treated as click", annotation_id);
                }
            }
            Gesture::Panning { .. } => {
                log::debug!("Pan ended at ({:.1}, {:.1})", ctx.viewport.pan_x, ctx.viewport.pan_y);
            }
            Gesture::None => {}
        }

        let release = self.release();
        let point = to_image(ctx.viewport, event.position);
        Reaction::redraw()
            .with_capture(release)
            .merge(self.hover(point, ctx))
    }

    /// Platform aborted the pointer sequence: drop the gesture, keep the store.
    pub fn pointer_cancel(&mut self, pointer_id: u32) -> Reaction {
        if self.captured.is_some_and(|id| id != pointer_id) {
            return Reaction::none();
        }
        self.cancel_gesture()
    }

    pub fn wheel(&mut self, event: &WheelEvent, ctx: &mut InputContext<'_>) -> Reaction {
        if event.buttons_held || self.gesture.is_active() {
            return Reaction::none();
        }
        let viewport = &mut *ctx.viewport;
        if event.modifiers.command() {
            let step = if event.delta_y < 0.0 { ZOOM_STEP } else { -ZOOM_STEP };
            let changed = viewport.zoom_at(viewport.zoom + step, event.position.x, event.position.y);
            return Reaction {
                redraw: changed,
                ..Reaction::none()
            };
        }

        if event.modifiers.shift {
            let delta = if event.delta_x != 0.0 { event.delta_x } else { event.delta_y };
            viewport.pan_by(-delta, 0.0);
        } else {
            viewport.pan_by(0.0, -event.delta_y);
        }
        Reaction::redraw()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Drop any gesture without committing.
    pub fn cancel_gesture(&mut self) -> Reaction {
        if !self.gesture.is_active() {
            return Reaction::none();
        }
        log::debug!("Cancelled {:?}", self.state());
        self.gesture = Gesture::None;
        let release = self.release();
        let cursor = self.set_cursor(Self::idle_cursor(self.mode, self.space_held));
        Reaction::redraw().with_capture(release).with_cursor(cursor)
    }

    pub fn cancel_draw(&mut self) -> Reaction {
        match self.gesture {
            Gesture::Drawing { .. } => self.cancel_gesture(),
            _ => Reaction::none(),
        }
    }

    pub fn cancel_drag(&mut self) -> Reaction {
        match self.gesture {
            Gesture::Dragging { .. } => self.cancel_gesture(),
            _ => Reaction::none(),
        }
    }

    /// Cancel the gesture in progress, or clear the selection when idle.
    pub fn escape(&mut self) -> Reaction {
        if self.gesture.is_active() {
            return self.cancel_gesture();
        }
        let had_selection = self.store.borrow().selected().is_some();
        self.store.borrow_mut().set_selected(None);
        Reaction {
            redraw: had_selection,
            ..Reaction::none()
        }
    }

    pub fn delete_selected(&mut self) -> Reaction {
        let Some(id) = self.store.borrow().selected().cloned() else {
            return Reaction::none();
        };
        let cancelled = self.cancel_drag();
        self.store.borrow_mut().delete_annotation(&id);
        cancelled.merge(Reaction::redraw())
    }

    pub fn undo(&mut self) -> Reaction {
        let cancelled = self.cancel_gesture();
        let undone = self.store.borrow_mut().undo();
        cancelled.merge(Reaction {
            redraw: undone,
            ..Reaction::none()
        })
    }

    pub fn set_active_class(&mut self, class_id: ClassId) -> Reaction {
        let changed = {
            let mut store = self.store.borrow_mut();
            let before = store.active_class();
            store.set_active_class(class_id) && before != class_id
        };
        Reaction {
            redraw: changed,
            ..Reaction::none()
        }
    }

    /// Switch edit mode, cancelling any gesture first.
    pub fn set_mode(&mut self, mode: EditMode) -> Reaction {
        let cancelled = self.cancel_gesture();
        if self.mode == mode {
            return cancelled;
        }
        log::debug!("Edit mode {} -> {}", self.mode.as_str(), mode.as_str());
        self.mode = mode;
        let cursor = self.set_cursor(Self::idle_cursor(mode, self.space_held));
        cancelled.merge(Reaction::redraw().with_cursor(cursor))
    }

    /// Track the space key. Releasing it ends a space-started pan.
    pub fn set_space_held(&mut self, held: bool) -> Reaction {
        if self.space_held == held {
            return Reaction::none();
        }
        self.space_held = held;
        if !held && matches!(self.gesture, Gesture::Panning { via_space: true, .. }) {
            return self.cancel_gesture();
        }
        if self.gesture.is_active() {
            return Reaction::none();
        }
        Reaction::none().with_cursor(self.set_cursor(Self::idle_cursor(self.mode, held)))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn acquire(&mut self, pointer_id: u32) -> Option<Capture> {
        self.captured = Some(pointer_id);
        Some(Capture::Acquire(pointer_id))
    }

    /// Release capture unconditionally.
    fn release(&mut self) -> Option<Capture> {
        self.captured.take().map(Capture::Release)
    }

    /// Record the cursor; returns it only if it changed.
    fn set_cursor(&mut self, cursor: CursorIcon) -> Option<CursorIcon> {
        if self.cursor == cursor {
            return None;
        }
        self.cursor = cursor;
        Some(cursor)
    }

    fn idle_cursor(mode: EditMode, space_held: bool) -> CursorIcon {
        if space_held {
            return CursorIcon::Grab;
        }
        match mode {
            EditMode::Draw => CursorIcon::Crosshair,
            EditMode::Select | EditMode::Idle => CursorIcon::Default,
        }
    }
}

fn to_image(viewport: &Viewport, screen: ScreenPoint) -> Point {
    viewport.screen_to_image(Point::new(screen.x, screen.y))
}
