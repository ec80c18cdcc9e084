//! Transient gesture state owned by the interaction engine.

use mothra_ui::Point as ScreenPoint;

use crate::hit_test::Handle;
use crate::model::{AnnotationId, BoundingBox, Point};

/// What part of a box a drag grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Body,
    Handle(Handle),
}

/// The gesture in progress. Image-space unless named `*_screen`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    None,
    Drawing {
        start: Point,
        current: Point,
    },
    Dragging {
        annotation_id: AnnotationId,
        target: DragTarget,
        /// Pointer position when the drag began
        origin: Point,
        /// Stored bbox when the drag began
        original: BoundingBox,
        preview: BoundingBox,
    },
    Panning {
        origin_screen: ScreenPoint,
        origin_pan: (f64, f64),
        /// Started with space+left rather than the middle button
        via_space: bool,
    },
}

impl Gesture {
    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::None)
    }

    pub fn state(&self) -> InteractionState {
        match self {
            Gesture::None => InteractionState::Idle,
            Gesture::Drawing { .. } => InteractionState::Drawing,
            Gesture::Dragging {
                target: DragTarget::Body,
                ..
            } => InteractionState::DraggingBody,
            Gesture::Dragging {
                target: DragTarget::Handle(handle),
                ..
            } => InteractionState::DraggingHandle(*handle),
            Gesture::Panning { .. } => InteractionState::Panning,
        }
    }

    /// Read-only view for the compositor.
    pub fn snapshot(&self) -> GestureSnapshot {
        match self {
            Gesture::Drawing { start, current } => GestureSnapshot {
                state: self.state(),
                draw_preview: Some(BoundingBox::from_corners(*start, *current)),
                drag_preview: None,
            },
            Gesture::Dragging {
                annotation_id,
                preview,
                ..
            } => GestureSnapshot {
                state: self.state(),
                draw_preview: None,
                drag_preview: Some((annotation_id.clone(), *preview)),
            },
            Gesture::None | Gesture::Panning { .. } => GestureSnapshot {
                state: self.state(),
                ..GestureSnapshot::default()
            },
        }
    }
}

/// Named states of the interaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Drawing,
    DraggingBody,
    DraggingHandle(Handle),
    Panning,
}

/// Copy of the renderable parts of a gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureSnapshot {
    pub state: InteractionState,
    /// Normalized rectangle being drawn
    pub draw_preview: Option<BoundingBox>,
    /// Live bbox of the annotation being dragged, replacing its stored one
    pub drag_preview: Option<(AnnotationId, BoundingBox)>,
}

impl GestureSnapshot {
    /// Preview bbox for `id`, if it is the one mid-drag.
    pub fn preview_for(&self, id: &AnnotationId) -> Option<BoundingBox> {
        self.drag_preview
            .as_ref()
            .filter(|(drag_id, _)| drag_id == id)
            .map(|(_, bbox)| *bbox)
    }
}
