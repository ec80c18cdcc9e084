//! Session record import and export.
//!
//! The JSON record is the exchange layout for a [`Session`](crate::model::Session);
//! it is what gets imported, persisted and exported. Other outputs implement
//! [`ExportFormat`]:
//!
//! - **JSON**: the record itself, pretty-printed (`<base>.json`)
//! - **YOLO**: normalized label lines (`<base>.txt`)
//! - **Bundle**: a zip archive with both (`<base>_annotations.zip`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mothra::format::{ExportFormat, YoloFormat, import_session};
//!
//! let session = import_session(&std::fs::read("page.json")?)?;
//! let bytes = YoloFormat.export(&session)?;
//! std::fs::write(YoloFormat.file_name(&session), bytes)?;
//! ```

mod error;
pub mod formats;
mod record;
mod traits;

pub use error::FormatError;
pub use formats::{BundleFormat, JsonFormat, YoloFormat};
pub use record::{AnnotationRecord, DimensionMismatch, SessionRecord, import_session, parse_record};
pub use traits::ExportFormat;

/// All export formats, in menu order.
pub fn export_formats() -> Vec<Box<dyn ExportFormat>> {
    vec![
        Box::new(JsonFormat::new()),
        Box::new(YoloFormat::new()),
        Box::new(BundleFormat::new()),
    ]
}

/// Look up an export format by [`ExportFormat::id`].
pub fn export_format(id: &str) -> Option<Box<dyn ExportFormat>> {
    export_formats().into_iter().find(|format| format.id() == id)
}
