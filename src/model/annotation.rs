//! Annotation data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::ClassId;

/// A 2D point in image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates into `[0, width] x [0, height]`.
    pub fn clamped(self, width: f64, height: f64) -> Self {
        Self::new(self.x.clamp(0.0, width), self.y.clamp(0.0, height))
    }
}

/// An axis-aligned bounding box in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top-left corner X coordinate
    pub x: f64,
    /// Top-left corner Y coordinate
    pub y: f64,
    /// Width of the box
    pub width: f64,
    /// Height of the box
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a bounding box from two corner points in any order.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        let width = (p1.x - p2.x).abs();
        let height = (p1.y - p2.y).abs();
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `[x, y, w, h]`, the record layout.
    pub fn from_array([x, y, width, height]: [f64; 4]) -> Self {
        Self::new(x, y, width, height)
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Get the center point of the box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive point-in-rectangle test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Whether the box lies within `[0, width] x [0, height]`.
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= width && self.bottom() <= height
    }

    /// Largest absolute difference over the four components.
    pub fn max_component_delta(&self, other: &BoundingBox) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.width - other.width).abs())
            .max((self.height - other.height).abs())
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Unique identifier of an annotation within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// A fresh random (v4 UUID) id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnnotationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AnnotationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A labelled box on the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub class_id: ClassId,
    pub bbox: BoundingBox,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
}

impl Annotation {
    pub fn new(id: AnnotationId, class_id: ClassId, bbox: BoundingBox) -> Self {
        Self {
            id,
            class_id,
            bbox,
            timestamp: Utc::now(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_any_direction() {
        let expected = BoundingBox::new(10.0, 10.0, 40.0, 30.0);
        let a = Point::new(10.0, 10.0);
        let b = Point::new(50.0, 40.0);
        assert_eq!(BoundingBox::from_corners(a, b), expected);
        assert_eq!(BoundingBox::from_corners(b, a), expected);
        assert_eq!(
            BoundingBox::from_corners(Point::new(50.0, 10.0), Point::new(10.0, 40.0)),
            expected
        );
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(bbox.contains(Point::new(0.0, 0.0)));
        assert!(bbox.contains(Point::new(10.0, 10.0)));
        assert!(!bbox.contains(Point::new(10.01, 5.0)));
    }

    #[test]
    fn test_max_component_delta() {
        let a = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        let b = BoundingBox::new(1.2, 2.0, 3.0, 4.7);
        assert!((a.max_component_delta(&b) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_is_within() {
        let bbox = BoundingBox::new(90.0, 40.0, 10.0, 10.0);
        assert!(bbox.is_within(100.0, 50.0));
        assert!(!bbox.is_within(99.0, 50.0));
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(AnnotationId::generate(), AnnotationId::generate());
    }

    #[test]
    fn test_point_clamped() {
        let p = Point::new(-3.0, 120.0).clamped(100.0, 50.0);
        assert_eq!(p, Point::new(0.0, 50.0));
    }
}
