//! The annotator: wires the store, interaction engine, viewport, view
//! settings and collaborators behind one event/frame interface.
//!
//! The host feeds [`Event`]s through [`Annotator::handle_event`] and calls
//! [`Annotator::frame`] once per animation frame. Pointer moves are latched
//! and applied at most once per frame; every state change collapses into a
//! single repaint.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mothra_ui::{CursorIcon, Event, FrameScheduler, Key, Latch, Point as ScreenPoint, RenderError, Renderer};

use crate::compositor::{Compositor, Scene};
use crate::config::AppConfig;
use crate::format::{DimensionMismatch, ExportFormat, FormatError, SessionRecord, export_formats, parse_record};
use crate::interaction::{EditMode, InputContext, InteractionEngine, Reaction};
use crate::keybindings::{Action, KeyBindings};
use crate::loader::LoadedImage;
use crate::model::{ClassId, ImageInfo, Session};
use crate::persistence::{AutoSaveManager, SessionStorage, load_quietly, save_quietly};
use crate::store::StoreHandle;
use crate::view::ViewSettings;
use crate::viewport::Viewport;

/// Result of [`Annotator::import_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The record replaced the session; holds the annotation count.
    Applied(usize),
    /// Dimensions differed and the confirmation said no.
    Declined,
    /// There is no image to attach the record to.
    NoImage,
}

/// What one frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutcome {
    pub painted: bool,
    /// New cursor glyph from hover changes applied this frame.
    pub cursor: Option<CursorIcon>,
}

/// Read-only summary for status displays.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub image: Option<ImageInfo>,
    pub zoom_percent: u32,
    pub cursor_image_coords: Option<(i64, i64)>,
    pub active_class: ClassId,
    pub mode: EditMode,
    pub total: usize,
    pub class_counts: Vec<(ClassId, usize)>,
    pub can_undo: bool,
}

fn input<'a>(viewport: &'a mut Viewport, view: &'a ViewSettings) -> InputContext<'a> {
    InputContext {
        viewport,
        hidden_classes: &view.hidden_classes,
    }
}

pub struct Annotator {
    store: StoreHandle,
    engine: InteractionEngine,
    viewport: Viewport,
    view: ViewSettings,
    keybindings: KeyBindings,
    scheduler: Rc<FrameScheduler>,
    pointer: Latch<ScreenPoint>,
    cursor_image_coords: Option<(i64, i64)>,
    image: Option<LoadedImage>,
    storage: Box<dyn SessionStorage>,
    auto_save: Rc<RefCell<AutoSaveManager>>,
    compositor: Compositor,
    scale_factor: f64,
}

impl Annotator {
    pub fn new(config: &AppConfig, storage: Box<dyn SessionStorage>) -> Self {
        let prefs = &config.preferences;
        let scheduler = Rc::new(FrameScheduler::new());
        let auto_save = Rc::new(RefCell::new(prefs.build_auto_save()));

        let store = prefs.build_store().into_handle();
        {
            let scheduler = scheduler.clone();
            let auto_save = auto_save.clone();
            store.borrow_mut().subscribe(move |change| {
                scheduler.request();
                if change.affects_annotations() {
                    auto_save.borrow_mut().mark_dirty();
                }
            });
        }

        let mut view = ViewSettings::new();
        view.set_box_opacity(prefs.box_opacity);
        view.show_labels = prefs.show_labels;

        Self {
            engine: InteractionEngine::new(store.clone()),
            store,
            viewport: Viewport::new(),
            view,
            keybindings: config.keybindings.clone(),
            scheduler,
            pointer: Latch::new(),
            cursor_image_coords: None,
            image: None,
            storage,
            auto_save,
            compositor: Compositor::new(),
            scale_factor: 1.0,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn view(&self) -> &ViewSettings {
        &self.view
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    pub fn scheduler(&self) -> &Rc<FrameScheduler> {
        &self.scheduler
    }

    pub fn storage(&self) -> &dyn SessionStorage {
        self.storage.as_ref()
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn cursor_image_coords(&self) -> Option<(i64, i64)> {
        self.cursor_image_coords
    }

    /// Current image and annotations, if an image is loaded.
    pub fn session(&self) -> Option<Session> {
        let image = self.image.as_ref()?;
        Some(Session::new(
            image.info(),
            self.store.borrow().annotations().to_vec(),
        ))
    }

    pub fn status(&self) -> StatusSnapshot {
        let store = self.store.borrow();
        StatusSnapshot {
            image: self.image.as_ref().map(LoadedImage::info),
            zoom_percent: self.viewport.zoom_percent(),
            cursor_image_coords: self.cursor_image_coords,
            active_class: store.active_class(),
            mode: self.engine.mode(),
            total: store.len(),
            class_counts: store.class_counts(),
            can_undo: store.can_undo(),
        }
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Make `image` the current image, restoring its stored session when the
    /// recorded size matches. Returns the number of restored annotations.
    pub fn load_image(&mut self, image: LoadedImage) -> usize {
        if self.auto_save.borrow().is_dirty() {
            self.save_now();
        }
        self.engine.cancel_gesture();
        self.pointer.clear();

        let restored = match load_quietly(self.storage.as_ref(), &image.name) {
            Some(record) if image.info().same_dimensions(record.image_width, record.image_height) => {
                match record.into_session() {
                    Ok(session) => session.annotations,
                    Err(e) => {
                        log::warn!("Ignoring invalid stored session for '{}': {}", image.name, e);
                        Vec::new()
                    }
                }
            }
            Some(record) => {
                log::info!(
                    "Stored session for '{}' is {}x{}, image is {}x{}; starting fresh",
                    image.name,
                    record.image_width,
                    record.image_height,
                    image.width,
                    image.height
                );
                Vec::new()
            }
            None => Vec::new(),
        };
        let count = restored.len();
        self.store.borrow_mut().restore_session(restored);
        self.auto_save.borrow_mut().reset();

        self.viewport
            .set_image(f64::from(image.width), f64::from(image.height));
        self.viewport.reset();
        log::info!("Opened '{}' with {} annotations", image.name, count);
        self.image = Some(image);
        self.engine.set_mode(EditMode::Draw);
        self.scheduler.request();
        count
    }

    /// Replace the session with a JSON record.
    ///
    /// The record is fully validated first; a malformed record changes nothing.
    /// When its recorded size differs from the loaded image, `confirm`
    /// decides whether to proceed.
    pub fn import_record(
        &mut self,
        data: &[u8],
        confirm: impl FnOnce(&DimensionMismatch) -> bool,
    ) -> Result<ImportOutcome, FormatError> {
        let record = parse_record(data)?;
        let Some(image) = &self.image else {
            log::warn!("Import of '{}' ignored: no image loaded", record.image_name);
            return Ok(ImportOutcome::NoImage);
        };
        let mismatch = DimensionMismatch::between(&record, &image.info());
        let session = record.into_session()?;

        if let Some(mismatch) = mismatch {
            if !confirm(&mismatch) {
                log::info!("Import declined: {}", mismatch);
                return Ok(ImportOutcome::Declined);
            }
            log::warn!("Importing despite size mismatch: {}", mismatch);
        }

        self.engine.cancel_gesture();
        let count = session.annotations.len();
        self.store.borrow_mut().restore_session(session.annotations);
        log::info!("Imported {} annotations", count);
        Ok(ImportOutcome::Applied(count))
    }

    /// Write the session to storage now. Failures are logged and swallowed.
    pub fn save_now(&mut self) -> bool {
        let Some(session) = self.session() else {
            return false;
        };
        let saved = save_quietly(self.storage.as_mut(), &SessionRecord::from_session(&session));
        let mut auto_save = self.auto_save.borrow_mut();
        if saved {
            auto_save.mark_saved();
        } else {
            auto_save.mark_save_failed();
        }
        saved
    }

    /// Serialize the session in `format`. None without an image.
    pub fn export(&self, format: &dyn ExportFormat) -> Result<Option<(String, Vec<u8>)>, FormatError> {
        let Some(session) = self.session() else {
            return Ok(None);
        };
        let bytes = format.export(&session)?;
        Ok(Some((format.file_name(&session), bytes)))
    }

    /// Write every export format into `dir`, returning the written paths.
    pub fn export_all_to(&self, dir: &Path) -> Result<Vec<PathBuf>, FormatError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for format in export_formats() {
            if let Some((name, bytes)) = self.export(format.as_ref())? {
                let path = dir.join(name);
                std::fs::write(&path, bytes)?;
                log::info!("Exported {} to {:?}", format.display_name(), path);
                written.push(path);
            }
        }
        Ok(written)
    }

    // =========================================================================
    // View settings
    // =========================================================================

    pub fn set_box_opacity(&mut self, opacity: f64) {
        self.view.set_box_opacity(opacity);
        self.scheduler.request();
    }

    pub fn toggle_class_visibility(&mut self, class_id: ClassId) {
        self.view.toggle_class_visibility(class_id);
        self.scheduler.request();
    }

    pub fn toggle_all_class_visibility(&mut self) {
        self.view.toggle_all_class_visibility();
        self.scheduler.request();
    }

    // =========================================================================
    // Input
    // =========================================================================

    fn react(&self, reaction: Reaction) -> Reaction {
        if reaction.redraw {
            self.scheduler.request();
        }
        reaction
    }

    /// Apply a latched pointer move, if any.
    fn flush_pointer(&mut self) -> Reaction {
        let Some(position) = self.pointer.take() else {
            return Reaction::none();
        };
        let image_point = self
            .viewport
            .screen_to_image(crate::model::Point::new(position.x, position.y));
        let coords = Some((image_point.x.round() as i64, image_point.y.round() as i64));
        if coords != self.cursor_image_coords {
            self.cursor_image_coords = coords;
            self.scheduler.request();
        }
        let mut ctx = input(&mut self.viewport, &self.view);
        self.engine.pointer_move(position, &mut ctx)
    }

    pub fn handle_event(&mut self, event: &Event) -> Reaction {
        let reaction = match event {
            Event::PointerDown(pointer) => {
                let flushed = self.flush_pointer();
                let mut ctx = input(&mut self.viewport, &self.view);
                flushed.merge(self.engine.pointer_down(pointer, &mut ctx))
            }
            Event::PointerMove(pointer) => {
                self.pointer.set(pointer.position);
                self.scheduler.request();
                Reaction::none()
            }
            Event::PointerUp(pointer) => {
                self.pointer.clear();
                let mut ctx = input(&mut self.viewport, &self.view);
                self.engine.pointer_up(pointer, &mut ctx)
            }
            Event::PointerCancel { pointer_id } => {
                self.pointer.clear();
                self.engine.pointer_cancel(*pointer_id)
            }
            Event::PointerLeave => {
                if !self.engine.is_capturing() {
                    self.pointer.clear();
                }
                self.cursor_image_coords = None;
                Reaction::redraw()
            }
            Event::Wheel(wheel) => {
                let mut ctx = input(&mut self.viewport, &self.view);
                self.engine.wheel(wheel, &mut ctx)
            }
            Event::KeyPressed { key: Key::Space, .. } => self.engine.set_space_held(true),
            Event::KeyReleased { key: Key::Space, .. } => self.engine.set_space_held(false),
            Event::KeyPressed { key, modifiers } => match self.keybindings.action_for(*key, *modifiers) {
                Some(action) => self.perform(action),
                None => Reaction::none(),
            },
            Event::KeyReleased { .. } => Reaction::none(),
            Event::Resized {
                width,
                height,
                scale_factor,
            } => {
                self.resize(*width, *height, *scale_factor);
                Reaction::redraw()
            }
        };
        self.react(reaction)
    }

    /// New surface size: refit the image.
    pub fn resize(&mut self, width: f64, height: f64, scale_factor: f64) {
        if scale_factor.is_finite() && scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
        self.viewport.set_canvas(width, height);
        self.viewport.reset();
        self.scheduler.request();
    }

    pub fn perform(&mut self, action: Action) -> Reaction {
        log::debug!("Action: {:?}", action);
        let reaction = match action {
            Action::SetActiveClass(class_id) => self.engine.set_active_class(class_id),
            Action::SetEditMode(mode) => {
                if self.image.is_none() {
                    log::debug!("Ignoring {} mode: no image loaded", mode.as_str());
                    return Reaction::none();
                }
                self.engine.set_mode(mode)
            }
            Action::Escape => self.engine.escape(),
            Action::CancelDraw => self.engine.cancel_draw(),
            Action::CancelDrag => self.engine.cancel_drag(),
            Action::DeleteSelected => self.engine.delete_selected(),
            Action::Undo => self.engine.undo(),
            Action::ZoomIn => Reaction {
                redraw: self.viewport.zoom_in(),
                ..Reaction::none()
            },
            Action::ZoomOut => Reaction {
                redraw: self.viewport.zoom_out(),
                ..Reaction::none()
            },
            Action::ResetView => {
                self.viewport.reset();
                Reaction::redraw()
            }
            Action::ToggleLabels => {
                self.view.toggle_labels();
                Reaction::redraw()
            }
            Action::ToggleHelp => {
                self.view.toggle_help();
                Reaction::redraw()
            }
            Action::QuickSave => {
                self.save_now();
                Reaction::none()
            }
        };
        self.react(reaction)
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Per-frame tick: apply the latched pointer, run auto-save, and repaint
    /// if anything requested it since the last frame.
    pub fn frame(&mut self, renderer: &mut Renderer) -> Result<FrameOutcome, RenderError> {
        let moved = self.flush_pointer();
        if moved.redraw {
            self.scheduler.request();
        }

        if self.auto_save.borrow().should_save() {
            self.save_now();
        }

        let mut outcome = FrameOutcome {
            painted: false,
            cursor: moved.cursor,
        };
        if !self.scheduler.take() {
            return Ok(outcome);
        }

        let (canvas_w, canvas_h) = self.viewport.canvas_size();
        renderer.resize(
            (canvas_w * self.scale_factor).round() as u32,
            (canvas_h * self.scale_factor).round() as u32,
        )?;

        let store = self.store.borrow();
        let gesture = self.engine.snapshot();
        let scene = Scene {
            image: self.image.as_ref().map(|image| &image.handle),
            annotations: store.annotations(),
            selected: store.selected(),
            active_class: store.active_class(),
            mode: self.engine.mode(),
            gesture: &gesture,
            viewport: &self.viewport,
            view: &self.view,
            scale_factor: self.scale_factor,
        };
        self.compositor.paint(renderer, &scene);
        outcome.painted = true;
        Ok(outcome)
    }
}
