//! Per-image session data.

use super::annotation::Annotation;

/// Metadata of the loaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// Whether `width` x `height` matches this image exactly.
    pub fn same_dimensions(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }

    /// File name with the last extension stripped, used for export names.
    pub fn base_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) if dot > 0 => &self.name[..dot],
            _ => &self.name,
        }
    }
}

/// Snapshot of everything annotated on one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub image: ImageInfo,
    pub annotations: Vec<Annotation>,
}

impl Session {
    pub fn new(image: ImageInfo, annotations: Vec<Annotation>) -> Self {
        Self { image, annotations }
    }
}
