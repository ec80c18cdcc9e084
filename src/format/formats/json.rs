//! Pretty-printed session record export.

use crate::format::error::FormatError;
use crate::format::record::SessionRecord;
use crate::format::traits::ExportFormat;
use crate::model::Session;

/// The native record layout, two-space indented.
pub struct JsonFormat;

impl JsonFormat {
    pub fn new() -> Self {
        Self
    }

    pub fn to_string(session: &Session) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(&SessionRecord::from_session(session))?)
    }
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportFormat for JsonFormat {
    fn id(&self) -> &'static str {
        "json"
    }

    fn display_name(&self) -> &'static str {
        "Session JSON"
    }

    fn file_suffix(&self) -> &'static str {
        ".json"
    }

    fn export(&self, session: &Session) -> Result<Vec<u8>, FormatError> {
        Ok(Self::to_string(session)?.into_bytes())
    }
}
