//! mothra - interactive bounding-box annotation over a single raster image
//!
//! The core is the canvas interaction engine: the [`viewport`] transform, the
//! [`hit_test`] geometry, the undo-capable [`store`], and the pointer-driven
//! [`interaction`] state machine. The [`compositor`] paints frames from a
//! read-only view of that state. Image [`loader`], record [`format`]s and
//! [`persistence`] are the collaborators around it, all wired together by
//! [`Annotator`].

pub mod app;
pub mod compositor;
pub mod config;
pub mod constants;
pub mod format;
pub mod interaction;
pub mod keybindings;
pub mod loader;
pub mod model;
pub mod persistence;
pub mod store;
pub mod view;
pub mod viewport;

pub use app::{Annotator, FrameOutcome, ImportOutcome, StatusSnapshot};
pub use config::AppConfig;
pub use interaction::{EditMode, InteractionEngine, InteractionState};
pub use loader::{LoadError, LoadedImage, load_image_bytes, load_image_file};
pub use store::{AnnotationStore, StoreChange, StoreHandle};
pub use viewport::Viewport;
