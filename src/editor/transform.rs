use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("crop fraction must be in (0, 1], got {0}")]
    InvalidCrop(f32),

    #[error("only quarter turns are supported, got {0} degrees")]
    UnsupportedRotation(i32),

    #[error("target size must be non-zero, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Keeps the centred `fraction` of each side.
pub fn crop_center(img: &DynamicImage, fraction: f32) -> Result<DynamicImage, EditError> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(EditError::InvalidCrop(fraction));
    }
    let (w, h) = (img.width(), img.height());
    let new_w = ((w as f32 * fraction) as u32).max(1).min(w.max(1));
    let new_h = ((h as f32 * fraction) as u32).max(1).min(h.max(1));
    let x = (w - new_w.min(w)) / 2;
    let y = (h - new_h.min(h)) / 2;
    Ok(img.crop_imm(x, y, new_w, new_h))
}

/// Clockwise rotation by a multiple of 90 degrees (negative values allowed).
pub fn rotate(img: &DynamicImage, degrees: i32) -> Result<DynamicImage, EditError> {
    match degrees.rem_euclid(360) {
        0 => Ok(img.clone()),
        90 => Ok(img.rotate90()),
        180 => Ok(img.rotate180()),
        270 => Ok(img.rotate270()),
        _ => Err(EditError::UnsupportedRotation(degrees)),
    }
}

pub fn resize(img: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage, EditError> {
    if width == 0 || height == 0 {
        return Err(EditError::InvalidSize { width, height });
    }
    Ok(img.resize_exact(width, height, FilterType::Triangle))
}

/// Parses `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.trim().split_once(['x', 'X'])?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| Rgb([x as u8, y as u8, 0])))
    }

    #[test]
    fn test_crop_center_eighty_percent() {
        let out = crop_center(&sample(100, 50), 0.8).unwrap();
        assert_eq!((out.width(), out.height()), (80, 40));
        assert_eq!(out.to_rgb8().get_pixel(0, 0).0, [10, 5, 0]);
    }

    #[test]
    fn test_crop_rejects_bad_fraction() {
        assert_eq!(crop_center(&sample(4, 4), 0.0).unwrap_err(), EditError::InvalidCrop(0.0));
        assert!(crop_center(&sample(4, 4), 1.5).is_err());
    }

    #[test]
    fn test_rotate_quarter_turns() {
        let img = sample(6, 3);
        let r = rotate(&img, 90).unwrap();
        assert_eq!((r.width(), r.height()), (3, 6));
        assert_eq!((rotate(&img, -90).unwrap().width()), 3);
        assert_eq!(rotate(&img, 720).unwrap().width(), 6);
        assert_eq!(rotate(&img, 45).unwrap_err(), EditError::UnsupportedRotation(45));
    }

    #[test]
    fn test_resize() {
        let out = resize(&sample(10, 10), 4, 7).unwrap();
        assert_eq!((out.width(), out.height()), (4, 7));
        assert!(resize(&sample(2, 2), 0, 3).is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("640x480"), Some((640, 480)));
        assert_eq!(parse_size(" 12 X 3 "), Some((12, 3)));
        assert_eq!(parse_size("640"), None);
    }
}
