/// 4x5 colour transform in row-major order. Each output channel is
/// `m[row*5+0]*R + m[row*5+1]*G + m[row*5+2]*B + m[row*5+3]*A + m[row*5+4]`,
/// with channels on the 0..=255 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    pub m: [f32; 20],
}

// Rec. 709 luma weights.
const LUM_R: f32 = 0.213;
const LUM_G: f32 = 0.715;
const LUM_B: f32 = 0.072;

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl ColorMatrix {
    pub fn identity() -> Self {
        let mut m = [0.0; 20];
        m[0] = 1.0;
        m[6] = 1.0;
        m[12] = 1.0;
        m[18] = 1.0;
        Self { m }
    }

    pub fn scale(r: f32, g: f32, b: f32, a: f32) -> Self {
        let mut out = Self::identity();
        out.m[0] = r;
        out.m[6] = g;
        out.m[12] = b;
        out.m[18] = a;
        out
    }

    /// 0 is greyscale, 1 is unchanged, above 1 oversaturates.
    pub fn saturation(sat: f32) -> Self {
        let inv = 1.0 - sat;
        let r = LUM_R * inv;
        let g = LUM_G * inv;
        let b = LUM_B * inv;
        let mut out = Self::identity();
        out.m[0] = r + sat;
        out.m[1] = g;
        out.m[2] = b;
        out.m[5] = r;
        out.m[6] = g + sat;
        out.m[7] = b;
        out.m[10] = r;
        out.m[11] = g;
        out.m[12] = b + sat;
        out
    }

    /// Scales around mid-grey so that 127.5 stays fixed.
    pub fn contrast(c: f32) -> Self {
        let offset = (1.0 - c) * 127.5;
        let mut out = Self::scale(c, c, c, 1.0);
        out.m[4] = offset;
        out.m[9] = offset;
        out.m[14] = offset;
        out
    }

    /// Luminance-preserving hue rotation.
    pub fn hue_rotation(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let mut out = Self::identity();
        out.m[0] = LUM_R + cos * (1.0 - LUM_R) - sin * LUM_R;
        out.m[1] = LUM_G - cos * LUM_G - sin * LUM_G;
        out.m[2] = LUM_B - cos * LUM_B + sin * (1.0 - LUM_B);
        out.m[5] = LUM_R - cos * LUM_R + sin * 0.143;
        out.m[6] = LUM_G + cos * (1.0 - LUM_G) + sin * 0.140;
        out.m[7] = LUM_B - cos * LUM_B - sin * 0.283;
        out.m[10] = LUM_R - cos * LUM_R - sin * (1.0 - LUM_R);
        out.m[11] = LUM_G - cos * LUM_G + sin * LUM_G;
        out.m[12] = LUM_B + cos * (1.0 - LUM_B) + sin * LUM_B;
        out
    }

    /// `self` first, then `post`.
    pub fn post_concat(&self, post: &ColorMatrix) -> ColorMatrix {
        let a = &post.m;
        let b = &self.m;
        let mut out = [0.0f32; 20];
        for row in 0..4 {
            for col in 0..5 {
                let mut v = 0.0;
                for k in 0..4 {
                    v += a[row * 5 + k] * b[k * 5 + col];
                }
                if col == 4 {
                    v += a[row * 5 + 4];
                }
                out[row * 5 + col] = v;
            }
        }
        ColorMatrix { m: out }
    }

    pub fn apply(&self, px: [u8; 4]) -> [u8; 4] {
        let [r, g, b, a] = px.map(f32::from);
        let m = &self.m;
        let mut out = [0u8; 4];
        for (row, slot) in out.iter_mut().enumerate() {
            let base = row * 5;
            let v = m[base] * r + m[base + 1] * g + m[base + 2] * b + m[base + 3] * a + m[base + 4];
            *slot = v.round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}
