use super::error::PaletteError;
use image::RgbImage;

/// Most-significant bits kept per channel when bucketing a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitDepth(u8);

impl BitDepth {
    pub const DEFAULT: BitDepth = BitDepth(4);

    pub fn new(bits: u8) -> Result<Self, PaletteError> {
        if (1..=7).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(PaletteError::InvalidBitDepth(bits))
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Right shift applied to an 8-bit channel.
    pub fn shift(self) -> u8 {
        8 - self.0
    }

    /// Largest quantized channel value, `2^B - 1`.
    pub fn max_level(self) -> u32 {
        (1u32 << self.0) - 1
    }

    pub fn bucket_count(self) -> usize {
        1usize << (3 * self.0 as usize)
    }
}

impl Default for BitDepth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Packs the truncated channels as `(Rq << 2B) | (Gq << B) | Bq`.
pub fn bucket_key(rgb: [u8; 3], depth: BitDepth) -> u32 {
    let shift = depth.shift();
    let b = depth.bits() as u32;
    let rq = (rgb[0] >> shift) as u32;
    let gq = (rgb[1] >> shift) as u32;
    let bq = (rgb[2] >> shift) as u32;
    (rq << (2 * b)) | (gq << b) | bq
}

/// Quantized `[Rq, Gq, Bq]` levels stored in `key`.
pub fn unpack_key(key: u32, depth: BitDepth) -> [u32; 3] {
    let b = depth.bits() as u32;
    let mask = depth.max_level();
    [(key >> (2 * b)) & mask, (key >> b) & mask, key & mask]
}

/// Occurrence count per bucket. Dense: one slot for every possible key, so
/// memory depends on the bit depth only, never on the image size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    depth: BitDepth,
    counts: Vec<u64>,
    total: u64,
}

impl Histogram {
    pub fn new(depth: BitDepth) -> Self {
        Self {
            depth,
            counts: vec![0; depth.bucket_count()],
            total: 0,
        }
    }

    pub fn from_image(img: &RgbImage, depth: BitDepth) -> Self {
        Self::from_pixels(img.pixels().map(|p| p.0), depth)
    }

    pub fn from_pixels<I>(pixels: I, depth: BitDepth) -> Self
    where
        I: IntoIterator<Item = [u8; 3]>,
    {
        let mut hist = Self::new(depth);
        for rgb in pixels {
            hist.add(rgb);
        }
        hist
    }

    pub fn add(&mut self, rgb: [u8; 3]) {
        let key = bucket_key(rgb, self.depth) as usize;
        self.counts[key] += 1;
        self.total += 1;
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    /// Sum of all counts; equals the number of pixels scanned.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn count(&self, key: u32) -> u64 {
        self.counts.get(key as usize).copied().unwrap_or(0)
    }

    /// Number of occupied buckets.
    pub fn len(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Occupied buckets in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(k, &c)| (k as u32, c))
    }
}
