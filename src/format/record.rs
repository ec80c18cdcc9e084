//! The exchanged session record and its validation.
//!
//! Layout (camelCase JSON):
//!
//! ```json
//! {
//!   "imageName": "page.png",
//!   "imageWidth": 800,
//!   "imageHeight": 600,
//!   "annotations": [
//!     { "id": "…", "classId": 1, "bbox": [x, y, w, h], "timestamp": "2024-01-01T00:00:00.000Z" }
//!   ]
//! }
//! ```
//!
//! Conversion into a [`Session`] is all-or-nothing: the first bad entry
//! rejects the whole record.
//!
//! Sizes and class ids may be written as integral floats (`200.0`). Class
//! ids outside the known set are kept. Timestamps may be full RFC 3339,
//! zone-less (read as UTC) or date-only; anything else falls back to the
//! import time.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::format::error::FormatError;
use crate::model::{Annotation, AnnotationId, BoundingBox, ClassId, ImageInfo, Session};

/// Serialized form of a [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub image_name: String,
    #[serde(deserialize_with = "integral_number")]
    pub image_width: u32,
    #[serde(deserialize_with = "integral_number")]
    pub image_height: u32,
    pub annotations: Vec<AnnotationRecord>,
}

/// Serialized form of one [`Annotation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub id: String,
    #[serde(deserialize_with = "integral_number")]
    pub class_id: ClassId,
    pub bbox: [f64; 4],
    /// ISO-8601 creation time
    #[serde(default)]
    pub timestamp: String,
}

/// A JSON number that is a non-negative integer, written with or without a
/// fractional part.
fn integral_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {}",
            value
        )))
    }
}

/// Recorded image size disagreeing with the loaded image.
///
/// Not an error: handed to a confirmation callback that decides whether the
/// import proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub recorded: (u32, u32),
    pub loaded: (u32, u32),
}

impl DimensionMismatch {
    /// Some when `record` and `image` differ in width or height.
    pub fn between(record: &SessionRecord, image: &ImageInfo) -> Option<Self> {
        (!image.same_dimensions(record.image_width, record.image_height)).then_some(Self {
            recorded: (record.image_width, record.image_height),
            loaded: (image.width, image.height),
        })
    }
}

impl std::fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record is for a {}x{} image, loaded image is {}x{}",
            self.recorded.0, self.recorded.1, self.loaded.0, self.loaded.1
        )
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// RFC 3339, then zone-less date-time as UTC, then a bare date at midnight UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl SessionRecord {
    pub fn from_session(session: &Session) -> Self {
        Self {
            image_name: session.image.name.clone(),
            image_width: session.image.width,
            image_height: session.image.height,
            annotations: session
                .annotations
                .iter()
                .map(|ann| AnnotationRecord {
                    id: ann.id.as_str().to_string(),
                    class_id: ann.class_id,
                    bbox: ann.bbox.to_array(),
                    timestamp: format_timestamp(&ann.timestamp),
                })
                .collect(),
        }
    }

    /// Validate every entry and build a session. Nothing is returned on failure.
    pub fn into_session(self) -> Result<Session, FormatError> {
        if self.image_name.is_empty() {
            return Err(FormatError::malformed("imageName is empty"));
        }

        let mut seen = HashSet::with_capacity(self.annotations.len());
        let mut annotations = Vec::with_capacity(self.annotations.len());
        for (index, entry) in self.annotations.into_iter().enumerate() {
            annotations.push(entry.into_annotation(index, &mut seen)?);
        }

        Ok(Session::new(
            ImageInfo::new(self.image_name, self.image_width, self.image_height),
            annotations,
        ))
    }

    pub fn image_info(&self) -> ImageInfo {
        ImageInfo::new(self.image_name.clone(), self.image_width, self.image_height)
    }
}

impl AnnotationRecord {
    fn into_annotation(self, index: usize, seen: &mut HashSet<String>) -> Result<Annotation, FormatError> {
        if self.id.is_empty() {
            return Err(FormatError::malformed_entry(index, "id is empty"));
        }
        if !seen.insert(self.id.clone()) {
            return Err(FormatError::malformed_entry(index, format!("duplicate id {}", self.id)));
        }
        if self.bbox.iter().any(|v| !v.is_finite()) {
            return Err(FormatError::malformed_entry(index, "bbox has non-finite values"));
        }
        let timestamp = parse_timestamp(&self.timestamp).unwrap_or_else(|| {
            log::warn!(
                "annotations[{}]: unreadable timestamp '{}', using import time",
                index,
                self.timestamp
            );
            Utc::now()
        });

        Ok(Annotation::new(
            AnnotationId::from(self.id),
            self.class_id,
            BoundingBox::from_array(self.bbox),
        )
        .with_timestamp(timestamp))
    }
}

/// Parse record JSON. Structural problems (missing fields, wrong types,
/// a bbox that is not four numbers) surface as `MalformedRecord`.
pub fn parse_record(data: &[u8]) -> Result<SessionRecord, FormatError> {
    serde_json::from_slice(data).map_err(|e| {
        log::debug!("Rejected record: {}", e);
        FormatError::malformed(e.to_string())
    })
}

/// Parse and validate a record in one step.
pub fn import_session(data: &[u8]) -> Result<Session, FormatError> {
    let session = parse_record(data)?.into_session()?;
    log::info!(
        "Imported {} annotations for '{}' ({}x{})",
        session.annotations.len(),
        session.image.name,
        session.image.width,
        session.image.height
    );
    Ok(session)
}
