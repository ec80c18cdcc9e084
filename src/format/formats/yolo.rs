//! YOLO format export.
//!
//! One line per box:
//! ```text
//! <class_index> <x_center> <y_center> <width> <height>
//! ```
//! Coordinates are normalized to [0, 1] and printed with six decimals.
//! The class index is the zero-based position of the class. Boxes narrower
//! or shorter than one pixel are left out.

use crate::format::error::FormatError;
use crate::format::traits::ExportFormat;
use crate::model::{Annotation, Session, class_index};

/// Darknet/Ultralytics label file.
pub struct YoloFormat;

impl YoloFormat {
    pub fn new() -> Self {
        Self
    }

    fn line(annotation: &Annotation, image_w: f64, image_h: f64) -> Option<String> {
        let bbox = &annotation.bbox;
        if bbox.width < 1.0 || bbox.height < 1.0 {
            log::trace!("YOLO: skipping sub-pixel box {}", annotation.id);
            return None;
        }
        let Some(index) = class_index(annotation.class_id) else {
            log::warn!(
                "YOLO: skipping annotation {} with unknown class {}",
                annotation.id,
                annotation.class_id
            );
            return None;
        };
        let center = bbox.center();
        Some(format!(
            "{} {:.6} {:.6} {:.6} {:.6}",
            index,
            center.x / image_w,
            center.y / image_h,
            bbox.width / image_w,
            bbox.height / image_h
        ))
    }

    /// Lines joined with `\n`, no trailing newline.
    pub fn to_string(session: &Session) -> String {
        let image_w = f64::from(session.image.width);
        let image_h = f64::from(session.image.height);
        if image_w <= 0.0 || image_h <= 0.0 {
            log::warn!("YOLO: image '{}' has no size, nothing exported", session.image.name);
            return String::new();
        }
        session
            .annotations
            .iter()
            .filter_map(|ann| Self::line(ann, image_w, image_h))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for YoloFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportFormat for YoloFormat {
    fn id(&self) -> &'static str {
        "yolo"
    }

    fn display_name(&self) -> &'static str {
        "YOLO"
    }

    fn file_suffix(&self) -> &'static str {
        ".txt"
    }

    fn export(&self, session: &Session) -> Result<Vec<u8>, FormatError> {
        Ok(Self::to_string(session).into_bytes())
    }
}
