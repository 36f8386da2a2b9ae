use crate::{Error, Result};
use bytes::Bytes;
use image::{DynamicImage, RgbImage};
use std::path::PathBuf;

/// The forms an image can arrive in
#[derive(Debug, Clone)]
pub enum ImageInput {
    Path(PathBuf),
    Bytes(Bytes),
    Decoded(DynamicImage),
}

impl ImageInput {
    /// Decode and convert to 8-bit RGB
    pub fn into_rgb(self) -> Result<RgbImage> {
        let image = match self {
            ImageInput::Path(path) => {
                if !path.is_file() {
                    return Err(Error::NotFound { what: "Image", path });
                }
                image::open(&path)?
            }
            ImageInput::Bytes(bytes) => {
                if bytes.is_empty() {
                    return Err(Error::InvalidInput("image content is empty".into()));
                }
                image::load_from_memory(&bytes)?
            }
            ImageInput::Decoded(image) => image,
        };
        Ok(image.into_rgb8())
    }
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        ImageInput::Path(path)
    }
}

impl From<Bytes> for ImageInput {
    fn from(bytes: Bytes) -> Self {
        ImageInput::Bytes(bytes)
    }
}

impl From<Vec<u8>> for ImageInput {
    fn from(bytes: Vec<u8>) -> Self {
        ImageInput::Bytes(Bytes::from(bytes))
    }
}

impl From<DynamicImage> for ImageInput {
    fn from(image: DynamicImage) -> Self {
        ImageInput::Decoded(image)
    }
}

/// Reject anything whose declared media type is not `image/*`.
pub fn ensure_image_media_type(content_type: Option<&str>) -> Result<()> {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match essence.split_once('/') {
        Some(("image", subtype)) if !subtype.is_empty() => Ok(()),
        _ => Err(Error::InvalidInput(format!(
            "File must be an image, got content type '{}'",
            content_type.unwrap_or("")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = RgbImage::from_pixel(4, 3, Rgb([12, 34, 56]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_all_forms_normalize_to_same_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let from_path = ImageInput::from(path).into_rgb().unwrap();
        let from_bytes = ImageInput::from(png_bytes()).into_rgb().unwrap();
        let decoded = image::load_from_memory(&png_bytes()).unwrap();
        let from_decoded = ImageInput::from(decoded).into_rgb().unwrap();

        assert_eq!(from_path, from_bytes);
        assert_eq!(from_bytes, from_decoded);
        assert_eq!(from_path.dimensions(), (4, 3));
    }

    #[test]
    fn test_rgba_dropped_to_rgb() {
        let rgba = RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4]));
        let rgb = ImageInput::from(DynamicImage::ImageRgba8(rgba)).into_rgb().unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_undecodable_bytes_are_invalid_input() {
        let err = ImageInput::from(b"%PDF-1.4 not an image".to_vec()).into_rgb().unwrap_err();
        assert_eq!(err.kind(), agroflow_core::ErrorKind::InvalidInput);

        let err = ImageInput::from(Vec::new()).into_rgb().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_missing_path() {
        let err = ImageInput::Path("/definitely/not/here.jpg".into()).into_rgb().unwrap_err();
        assert!(matches!(err, Error::NotFound { what: "Image", .. }));
    }

    #[test]
    fn test_media_type_check() {
        assert!(ensure_image_media_type(Some("image/jpeg")).is_ok());
        assert!(ensure_image_media_type(Some("IMAGE/PNG; charset=binary")).is_ok());
        assert!(ensure_image_media_type(Some("application/pdf")).is_err());
        assert!(ensure_image_media_type(Some("image/")).is_err());
        assert!(ensure_image_media_type(Some("imagery/png")).is_err());
        assert!(ensure_image_media_type(None).is_err());
    }
}
