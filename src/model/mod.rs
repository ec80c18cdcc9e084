//! Data models for mothra.

mod annotation;
mod category;
mod session;

pub use annotation::{Annotation, AnnotationId, BoundingBox, Point};
pub use category::{
    CLASSES, Category, ClassId, DEFAULT_CLASS_ID, UNKNOWN_CLASS_COLOR, category, class_color,
    class_index, class_name, is_known_class,
};
pub use session::{ImageInfo, Session};
