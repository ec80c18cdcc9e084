//! Image loading: format sniffing and decoding into an [`ImageHandle`].

use std::path::Path;

use mothra_ui::ImageHandle;
use thiserror::Error;

use crate::model::ImageInfo;

#[derive(Debug, Error)]
pub enum LoadError {
    /// Input is not a recognised raster image.
    #[error("Unsupported file type: {name}")]
    UnsupportedFileType { name: String },

    /// Recognised as an image but the bytes could not be decoded.
    #[error("Failed to decode {name}: {message}")]
    DecodeFailure { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raster formats accepted by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

impl ImageKind {
    /// Identify the format from its magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if data.starts_with(b"BM") {
            return Some(Self::Bmp);
        }
        // little endian or big endian
        if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
            return Some(Self::Tiff);
        }
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }
        None
    }

    fn format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Gif => image::ImageFormat::Gif,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tiff => image::ImageFormat::Tiff,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

/// A decoded image ready for display.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub handle: ImageHandle,
}

impl LoadedImage {
    pub fn info(&self) -> ImageInfo {
        ImageInfo::new(self.name.clone(), self.width, self.height)
    }
}

/// Decode `data`, naming the result `name`.
pub fn load_image_bytes(name: &str, data: &[u8]) -> Result<LoadedImage, LoadError> {
    let Some(kind) = ImageKind::sniff(data) else {
        return Err(LoadError::UnsupportedFileType { name: name.to_string() });
    };
    log::debug!("Decoding {} as {:?} ({} bytes)", name, kind, data.len());

    let decode_failure = |message: String| LoadError::DecodeFailure {
        name: name.to_string(),
        message,
    };
    let rgba = image::load_from_memory_with_format(data, kind.format())
        .map_err(|e| decode_failure(e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(decode_failure("image has no pixels".to_string()));
    }
    let handle = ImageHandle::from_rgba8(rgba.into_raw(), width, height)
        .ok_or_else(|| decode_failure("pixel buffer size mismatch".to_string()))?;

    log::info!("Loaded {}: {}x{}", name, width, height);
    Ok(LoadedImage {
        name: name.to_string(),
        width,
        height,
        handle,
    })
}

/// Read and decode a file; the image is named after the file name.
pub fn load_image_file(path: &Path) -> Result<LoadedImage, LoadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let data = std::fs::read(path)?;
    load_image_bytes(&name, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_sniff_magic_bytes() {
        assert_eq!(ImageKind::sniff(&png_bytes(1, 1)), Some(ImageKind::Png));
        assert_eq!(ImageKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::sniff(b"GIF89a...."), Some(ImageKind::Gif));
        assert_eq!(ImageKind::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageKind::WebP));
        assert_eq!(ImageKind::sniff(b"RIFF\0\0\0\0WAVEfmt "), None);
        assert_eq!(ImageKind::sniff(b"{\"imageName\":1}"), None);
        assert_eq!(ImageKind::sniff(&[]), None);
    }

    #[test]
    fn test_load_png() {
        let loaded = load_image_bytes("page.png", &png_bytes(7, 3)).unwrap();
        assert_eq!((loaded.width, loaded.height), (7, 3));
        assert_eq!(loaded.handle.data().len(), 7 * 3 * 4);
        assert_eq!(&loaded.handle.data()[..4], &[10, 20, 30, 255]);
        assert_eq!(loaded.info(), ImageInfo::new("page.png", 7, 3));
    }

    #[test]
    fn test_non_image_is_unsupported() {
        let err = load_image_bytes("notes.txt", b"hello world").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFileType { .. }));
    }

    #[test]
    fn test_truncated_png_is_decode_failure() {
        let bytes = png_bytes(8, 8);
        let err = load_image_bytes("cut.png", &bytes[..20]).unwrap_err();
        assert!(matches!(err, LoadError::DecodeFailure { .. }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, png_bytes(4, 2)).unwrap();
        let loaded = load_image_file(&path).unwrap();
        assert_eq!(loaded.name, "scan.png");
        assert!(matches!(
            load_image_file(&dir.path().join("missing.png")),
            Err(LoadError::Io(_))
        ));
    }
}
