//! Trait definitions for export format implementations.

use crate::format::error::FormatError;
use crate::model::Session;

/// A serialization of a [`Session`] into a downloadable file.
pub trait ExportFormat {
    /// Unique identifier for this format (e.g., "json", "yolo").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// Suffix appended to the image base name, including the extension.
    fn file_suffix(&self) -> &'static str;

    /// Serialize the session.
    fn export(&self, session: &Session) -> Result<Vec<u8>, FormatError>;

    /// Output file name: image name without extension plus [`file_suffix`](Self::file_suffix).
    fn file_name(&self, session: &Session) -> String {
        format!("{}{}", session.image.base_name(), self.file_suffix())
    }
}
