//! Photo processing pipeline
//!
//! Every uploaded photo goes through the same normalization before it
//! touches disk: EXIF orientation applied, fit within 2000x2000 without
//! upscaling, re-encoded as JPEG quality 85. Raw upload bytes are never
//! written out, so a conversion failure leaves no orphan file.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType};
use shared::AppError;
use uuid::Uuid;

use super::upload_session::UploadedFile;

pub const MAX_DIMENSION: u32 = 2000;
pub const JPEG_QUALITY: u8 = 85;

/// EXIF orientation value, 1 when absent or unreadable
fn exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    exif::Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|meta| {
            meta.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .unwrap_or(1)
}

/// Undo the camera rotation recorded in EXIF orientation 1..=8
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Normalize raw upload bytes into JPEG bytes ready to store
pub fn process(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::validation(format!("unsupported or corrupt image: {e}")))?;

    let img = apply_orientation(img, exif_orientation(bytes));
    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| AppError::internal(format!("jpeg encode failed: {e}")))?;
    Ok(out)
}

/// Process and persist an upload under `upload_dir`
pub fn save(upload_dir: &Path, bytes: &[u8]) -> Result<UploadedFile, AppError> {
    let encoded = process(bytes)?;
    let filename = format!("product_{}.jpg", Uuid::new_v4());
    let path = upload_dir.join(&filename);
    if let Err(e) = std::fs::write(&path, &encoded) {
        let _ = std::fs::remove_file(&path);
        return Err(e.into());
    }
    Ok(UploadedFile {
        path: path.to_string_lossy().into_owned(),
        url: format!("/uploads/{filename}"),
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([120, 40, 200]),
        ));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn small_image_keeps_its_size() {
        let out = process(&png_bytes(640, 480)).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (640, 480));
    }

    #[test]
    fn oversized_image_fits_within_bounds() {
        let out = process(&png_bytes(4000, 1000)).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert!(img.width() <= MAX_DIMENSION && img.height() <= MAX_DIMENSION);
        // aspect ratio preserved
        assert_eq!(img.width(), 2000);
        assert_eq!(img.height(), 500);
    }

    #[test]
    fn output_is_jpeg() {
        let out = process(&png_bytes(10, 10)).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn garbage_bytes_rejected_as_validation() {
        let err = process(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn rotation_orientations_swap_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 2));
        for orientation in [5, 6, 7, 8] {
            let rotated = apply_orientation(img.clone(), orientation);
            assert_eq!((rotated.width(), rotated.height()), (2, 4));
        }
        for orientation in [1, 2, 3, 4] {
            let kept = apply_orientation(img.clone(), orientation);
            assert_eq!((kept.width(), kept.height()), (4, 2));
        }
    }

    #[test]
    fn save_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = save(dir.path(), b"not an image").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
