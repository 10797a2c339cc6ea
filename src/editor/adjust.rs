use crate::editor::matrix::ColorMatrix;
use image::{DynamicImage, RgbaImage};

/// Editor slider values. Every factor is neutral at 1.0; `hue` is in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustments {
    pub saturation: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub hue: f32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            brightness: 1.0,
            contrast: 1.0,
            red: 1.0,
            green: 1.0,
            blue: 1.0,
            hue: 0.0,
        }
    }
}

impl Adjustments {
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Hue, then saturation, then contrast, then brightness folded into the
    /// per-channel balance.
    pub fn matrix(&self) -> ColorMatrix {
        let mut m = ColorMatrix::identity();
        if self.hue != 0.0 {
            m = m.post_concat(&ColorMatrix::hue_rotation(self.hue));
        }
        m.post_concat(&ColorMatrix::saturation(self.saturation))
            .post_concat(&ColorMatrix::contrast(self.contrast))
            .post_concat(&ColorMatrix::scale(
                self.brightness * self.red,
                self.brightness * self.green,
                self.brightness * self.blue,
                1.0,
            ))
    }

    pub fn apply(&self, img: &DynamicImage) -> RgbaImage {
        let mut rgba = img.to_rgba8();
        if self.is_neutral() {
            return rgba;
        }
        let m = self.matrix();
        for px in rgba.pixels_mut() {
            px.0 = m.apply(px.0);
        }
        rgba
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_neutral_adjustments_keep_pixels() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40])));
        let out = Adjustments::default().apply(&img);
        assert!(out.pixels().all(|p| p.0 == [10, 20, 30, 40]));
    }

    #[test]
    fn test_brightness_and_channel_balance() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([100, 100, 100, 255])));
        let adj = Adjustments {
            brightness: 1.5,
            red: 2.0,
            blue: 0.0,
            ..Default::default()
        };
        assert_eq!(adj.apply(&img).get_pixel(0, 0).0, [255, 150, 0, 255]);
    }

    #[test]
    fn test_desaturate_then_contrast() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255])));
        let adj = Adjustments {
            saturation: 0.0,
            contrast: 0.0,
            ..Default::default()
        };
        assert_eq!(adj.apply(&img).get_pixel(0, 0).0, [128, 128, 128, 255]);
    }
}
