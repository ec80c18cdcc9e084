//! Unit tests for record parsing and the export formats.

mod yolo_tests;

use chrono::{TimeZone, Utc};

use crate::model::{Annotation, BoundingBox, ImageInfo, Session};

/// 200x100 image with one box of each class.
pub(super) fn sample_session() -> Session {
    let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    Session::new(
        ImageInfo::new("scan.page.png", 200, 100),
        vec![
            Annotation::new("a".into(), 1, BoundingBox::new(25.0, 12.5, 50.0, 25.0)).with_timestamp(timestamp),
            Annotation::new("b".into(), 2, BoundingBox::new(100.0, 50.0, 100.0, 50.0)).with_timestamp(timestamp),
            Annotation::new("c".into(), 3, BoundingBox::new(0.0, 0.0, 20.0, 10.0)).with_timestamp(timestamp),
        ],
    )
}
