//! Authoritative annotation state for the loaded image.
//!
//! The store owns the annotation list, the selection, the active class and
//! the undo history. Consumers hold a [`StoreHandle`] and observe mutations
//! through [`AnnotationStore::subscribe`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use mothra_ui::UndoStack;

use crate::constants::UNDO_HISTORY_LIMIT;
use crate::model::{Annotation, AnnotationId, BoundingBox, CLASSES, ClassId, DEFAULT_CLASS_ID, is_known_class};

/// Shared handle to the single store of a session.
pub type StoreHandle = Rc<RefCell<AnnotationStore>>;

/// What changed in a store mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    Added(AnnotationId),
    /// Emitted for every delete request, including ids that did not match.
    Deleted(AnnotationId),
    Moved(AnnotationId),
    SelectionChanged(Option<AnnotationId>),
    ActiveClassChanged(ClassId),
    Undone,
    Cleared,
    Restored,
}

impl StoreChange {
    /// Whether the annotation list (and so the persisted session) may have changed.
    pub fn affects_annotations(&self) -> bool {
        !matches!(
            self,
            StoreChange::SelectionChanged(_) | StoreChange::ActiveClassChanged(_)
        )
    }
}

/// Token returned by [`AnnotationStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreChange)>;

/// Annotation list, selection, active class and undo history.
///
/// Listeners run synchronously inside the mutating call while the store is
/// borrowed; they must not borrow the store themselves.
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    selected: Option<AnnotationId>,
    active_class: ClassId,
    history: UndoStack<Vec<Annotation>>,
    /// Whether `move_annotation` records an undo snapshot
    undoable_moves: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnnotationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationStore")
            .field("annotations", &self.annotations.len())
            .field("selected", &self.selected)
            .field("active_class", &self.active_class)
            .field("undo_count", &self.history.undo_count())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            annotations: Vec::new(),
            selected: None,
            active_class: DEFAULT_CLASS_ID,
            history: UndoStack::new(UNDO_HISTORY_LIMIT),
            undoable_moves: false,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = UndoStack::new(limit);
        self
    }

    /// Record undo snapshots for drag/resize commits as well.
    pub fn with_undoable_moves(mut self, enabled: bool) -> Self {
        self.undoable_moves = enabled;
        self
    }

    /// Wrap into a shareable handle.
    pub fn into_handle(self) -> StoreHandle {
        Rc::new(RefCell::new(self))
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, change: StoreChange) {
        log::trace!("store change: {:?}", change);
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn push_history(&mut self) {
        self.history.push(self.annotations.clone());
    }

    fn fresh_id(&self) -> AnnotationId {
        loop {
            let id = AnnotationId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Append a box with the active class. The caller clamps and size-checks `bbox`.
    pub fn add_annotation(&mut self, bbox: BoundingBox) -> AnnotationId {
        self.push_history();
        let id = self.fresh_id();
        self.annotations
            .push(Annotation::new(id.clone(), self.active_class, bbox));
        log::debug!(
            "Added annotation {} (class {}) at [{:.1}, {:.1}, {:.1}, {:.1}]",
            id,
            self.active_class,
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height
        );
        self.emit(StoreChange::Added(id.clone()));
        id
    }

    /// Remove an annotation. An undo snapshot is pushed even when `id` matches nothing.
    ///
    /// Returns whether an annotation was removed.
    pub fn delete_annotation(&mut self, id: &AnnotationId) -> bool {
        self.push_history();
        let before = self.annotations.len();
        self.annotations.retain(|ann| &ann.id != id);
        let removed = self.annotations.len() != before;
        if !removed {
            log::debug!("Delete of unknown annotation {} still recorded an undo step", id);
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.emit(StoreChange::Deleted(id.clone()));
        removed
    }

    /// Replace the bbox of an annotation in place.
    ///
    /// Only records undo when built [`with_undoable_moves`](Self::with_undoable_moves).
    pub fn move_annotation(&mut self, id: &AnnotationId, bbox: BoundingBox) -> bool {
        let Some(index) = self.annotations.iter().position(|ann| &ann.id == id) else {
            log::debug!("Move of unknown annotation {} ignored", id);
            return false;
        };
        if self.undoable_moves {
            self.push_history();
        }
        self.annotations[index].bbox = bbox;
        self.emit(StoreChange::Moved(id.clone()));
        true
    }

    pub fn set_selected(&mut self, id: Option<AnnotationId>) {
        if self.selected == id {
            return;
        }
        self.selected = id.clone();
        self.emit(StoreChange::SelectionChanged(id));
    }

    /// Set the class used for new annotations. Ids outside [`CLASSES`] are ignored.
    pub fn set_active_class(&mut self, class_id: ClassId) -> bool {
        if !is_known_class(class_id) {
            log::warn!("Ignoring unknown class id {}", class_id);
            return false;
        }
        if self.active_class != class_id {
            self.active_class = class_id;
            self.emit(StoreChange::ActiveClassChanged(class_id));
        }
        true
    }

    /// Restore the most recent snapshot and clear the selection.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo() else {
            log::debug!("Nothing to undo");
            return false;
        };
        self.annotations = previous;
        self.selected = None;
        log::debug!(
            "Undo: {} annotations, {} steps left",
            self.annotations.len(),
            self.history.undo_count()
        );
        self.emit(StoreChange::Undone);
        true
    }

    pub fn clear_all(&mut self) {
        self.push_history();
        self.annotations.clear();
        self.selected = None;
        self.emit(StoreChange::Cleared);
    }

    /// Replace the list wholesale, dropping undo history and selection.
    pub fn restore_session(&mut self, annotations: Vec<Annotation>) {
        log::info!("Restoring session with {} annotations", annotations.len());
        self.annotations = annotations;
        self.history.clear();
        self.selected = None;
        self.emit(StoreChange::Restored);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Annotations in insertion (paint) order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|ann| &ann.id == id)
    }

    pub fn selected(&self) -> Option<&AnnotationId> {
        self.selected.as_ref()
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn active_class(&self) -> ClassId {
        self.active_class
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn undo_count(&self) -> usize {
        self.history.undo_count()
    }

    /// Annotations ordered newest first, for list displays.
    pub fn newest_first(&self) -> Vec<&Annotation> {
        let mut list: Vec<&Annotation> = self.annotations.iter().collect();
        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        list
    }

    /// Number of annotations per known class, in class order.
    pub fn class_counts(&self) -> Vec<(ClassId, usize)> {
        CLASSES
            .iter()
            .map(|class| {
                let count = self
                    .annotations
                    .iter()
                    .filter(|ann| ann.class_id == class.id)
                    .count();
                (class.id, count)
            })
            .collect()
    }
}
