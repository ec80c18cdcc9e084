//! Tests for the YOLO format.

use super::sample_session;
use crate::format::formats::YoloFormat;
use crate::format::traits::ExportFormat;
use crate::model::{Annotation, BoundingBox, ImageInfo, Session};

#[test]
fn test_yolo_format_metadata() {
    let format = YoloFormat;
    assert_eq!(format.id(), "yolo");
    assert_eq!(format.file_suffix(), ".txt");
    assert_eq!(format.file_name(&sample_session()), "scan.page.txt");
}

#[test]
fn test_yolo_single_box() {
    let session = Session::new(
        ImageInfo::new("page.png", 100, 100),
        vec![Annotation::new("x".into(), 1, BoundingBox::new(0.0, 0.0, 50.0, 50.0))],
    );
    assert_eq!(YoloFormat::to_string(&session), "0 0.250000 0.250000 0.500000 0.500000");
}

#[test]
fn test_yolo_class_index_and_line_order() {
    let output = YoloFormat::to_string(&sample_session());
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "0 0.250000 0.250000 0.250000 0.250000",
            "1 0.750000 0.750000 0.500000 0.500000",
            "2 0.050000 0.050000 0.100000 0.100000",
        ]
    );
    assert!(!output.ends_with('\n'));
}

#[test]
fn test_yolo_skips_sub_pixel_boxes() {
    let session = Session::new(
        ImageInfo::new("page.png", 100, 100),
        vec![
            Annotation::new("thin".into(), 1, BoundingBox::new(10.0, 10.0, 0.5, 30.0)),
            Annotation::new("flat".into(), 2, BoundingBox::new(10.0, 10.0, 30.0, 0.9)),
            Annotation::new("ok".into(), 3, BoundingBox::new(10.0, 10.0, 1.0, 1.0)),
        ],
    );
    assert_eq!(YoloFormat::to_string(&session), "2 0.105000 0.105000 0.010000 0.010000");
}

#[test]
fn test_yolo_skips_unknown_class() {
    let session = Session::new(
        ImageInfo::new("page.png", 100, 100),
        vec![Annotation::new("x".into(), 9, BoundingBox::new(0.0, 0.0, 10.0, 10.0))],
    );
    assert_eq!(YoloFormat::to_string(&session), "");
}

#[test]
fn test_yolo_empty_session() {
    let session = Session::new(ImageInfo::new("page.png", 100, 100), Vec::new());
    assert!(YoloFormat.export(&session).unwrap().is_empty());
}
