//! Zip archive holding both the JSON record and the YOLO labels.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::json::JsonFormat;
use super::yolo::YoloFormat;
use crate::format::error::FormatError;
use crate::format::traits::ExportFormat;
use crate::model::Session;

pub struct BundleFormat;

impl BundleFormat {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BundleFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportFormat for BundleFormat {
    fn id(&self) -> &'static str {
        "bundle"
    }

    fn display_name(&self) -> &'static str {
        "JSON + YOLO (zip)"
    }

    fn file_suffix(&self) -> &'static str {
        "_annotations.zip"
    }

    fn export(&self, session: &Session) -> Result<Vec<u8>, FormatError> {
        let base = session.image.base_name();
        let json = JsonFormat::to_string(session)?;
        let yolo = YoloFormat::to_string(session);

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file(format!("{}.json", base), options)?;
        zip.write_all(json.as_bytes())?;
        zip.start_file(format!("{}.txt", base), options)?;
        zip.write_all(yolo.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}
