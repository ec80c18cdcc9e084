use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of [`ImageHandle::id`] values. Never reused within a process.
static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// A handle to decoded image pixels.
///
/// Cloning is cheap; the renderer keys its converted pixmap cache on the
/// handle's id so repeated frames do not re-convert the image.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    /// Unique per decoded image, shared by clones
    id: u64,
    /// The raw RGBA8 image data (straight alpha)
    data: Arc<Vec<u8>>,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
}

impl ImageHandle {
    /// Create a new image handle from RGBA8 data.
    ///
    /// Returns None if `data.len() != width * height * 4`.
    pub fn from_rgba8(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if data.len() != expected {
            log::warn!(
                "Image data size mismatch: got {} bytes for {}x{}",
                data.len(),
                width,
                height
            );
            return None;
        }

        Some(Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            data: Arc::new(data),
            width,
            height,
        })
    }

    /// Get the image data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the image width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Identity of the decoded image, stable across clones.
    pub fn id(&self) -> u64 {
        self.id
    }
}
