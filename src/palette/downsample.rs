use super::error::PaletteError;
use image::codecs::jpeg::JpegDecoder;
use image::codecs::png::PngDecoder;
use image::error::{LimitError, LimitErrorKind};
use image::io::{Limits, Reader};
use image::{ColorType, GenericImageView, ImageDecoder, ImageError, ImageFormat, Pixel, Rgb, RgbImage};
use std::borrow::Cow;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::PathBuf;

/// Longest side, in pixels, that the histogram pass will ever see.
pub const MAX_DIMENSION: u32 = 300;

/// Where the pixels come from. The pipeline never cares which.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn read_bytes(&self) -> Result<Cow<'_, [u8]>, PaletteError> {
        match self {
            ImageSource::Path(p) => Ok(Cow::Owned(std::fs::read(p)?)),
            ImageSource::Bytes(b) => Ok(Cow::Borrowed(b.as_slice())),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(p) => write!(f, "{}", p.display()),
            ImageSource::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// Integer decimation factor so that `max(width, height) / factor` lands at or
/// below `max_dimension` (rounded the same way as a platform `inSampleSize`).
pub fn sample_factor(width: u32, height: u32, max_dimension: u32) -> u32 {
    let longest = width.max(height);
    (longest / max_dimension.max(1)).max(1)
}

fn read_header(bytes: &[u8]) -> Result<(Option<ImageFormat>, u32, u32), PaletteError> {
    let reader = Reader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format();
    let (w, h) = reader.into_dimensions()?;
    Ok((format, w, h))
}

/// Reads only the header to learn the image size.
pub fn header_dimensions(bytes: &[u8]) -> Result<(u32, u32), PaletteError> {
    let (_, w, h) = read_header(bytes)?;
    Ok((w, h))
}

/// Keeps the pixel at every `sample`-th row and column, original values only.
pub fn subsample<I>(img: &I, sample: u32) -> RgbImage
where
    I: GenericImageView,
    I::Pixel: Pixel<Subpixel = u8>,
{
    let sample = sample.max(1);
    let (w, h) = img.dimensions();
    let new_w = (w / sample).max(1);
    let new_h = (h / sample).max(1);
    RgbImage::from_fn(new_w, new_h, |x, y| img.get_pixel(x * sample, y * sample).to_rgb())
}

fn out_of_budget() -> PaletteError {
    PaletteError::Decode(ImageError::Limits(LimitError::from_kind(LimitErrorKind::InsufficientMemory)))
}

fn limits(budget: u64) -> Limits {
    let mut limits = Limits::default();
    limits.max_alloc = Some(budget);
    limits
}

fn channel16(px: &[u8], i: usize) -> u8 {
    (u16::from_ne_bytes([px[2 * i], px[2 * i + 1]]) >> 8) as u8
}

fn channel32f(px: &[u8], i: usize) -> u8 {
    let v = f32::from_ne_bytes([px[4 * i], px[4 * i + 1], px[4 * i + 2], px[4 * i + 3]]);
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Alpha is dropped; grey is spread over all three channels.
fn to_rgb(color: ColorType, px: &[u8]) -> Option<[u8; 3]> {
    Some(match color {
        ColorType::L8 | ColorType::La8 => [px[0]; 3],
        ColorType::Rgb8 | ColorType::Rgba8 => [px[0], px[1], px[2]],
        ColorType::L16 | ColorType::La16 => [channel16(px, 0); 3],
        ColorType::Rgb16 | ColorType::Rgba16 => [channel16(px, 0), channel16(px, 1), channel16(px, 2)],
        ColorType::Rgb32F | ColorType::Rgba32F => [channel32f(px, 0), channel32f(px, 1), channel32f(px, 2)],
        _ => return None,
    })
}

/// Pulls decoded rows one at a time and keeps every `sample`-th row and
/// column. For PNG only one source row is ever buffered.
fn stream_subsample<'a, D: ImageDecoder<'a>>(decoder: D, sample: u32, budget: u64) -> Result<RgbImage, PaletteError> {
    let sample = sample.max(1);
    let (w, h) = decoder.dimensions();
    let color = decoder.color_type();
    if to_rgb(color, &[0; 16]).is_none() {
        return Err(PaletteError::UnsupportedColor(color));
    }

    let bpp = color.bytes_per_pixel() as usize;
    let row_len = w as usize * bpp;
    let new_w = (w / sample).max(1);
    let new_h = (h / sample).max(1);
    if row_len as u64 + new_w as u64 * new_h as u64 * 3 > budget {
        return Err(out_of_budget());
    }

    let mut reader = decoder.into_reader()?;
    let mut row = vec![0u8; row_len];
    let mut out = RgbImage::new(new_w, new_h);
    for y in 0..h {
        reader.read_exact(&mut row)?;
        if y % sample != 0 || y / sample >= new_h {
            continue;
        }
        for x in 0..new_w {
            let at = (x * sample) as usize * bpp;
            if let Some(rgb) = to_rgb(color, &row[at..at + bpp]) {
                out.put_pixel(x, y / sample, Rgb(rgb));
            }
        }
    }
    Ok(out)
}

/// JPEG can shrink by 1/2, 1/4 or 1/8 inside the IDCT; whatever is left of
/// the factor is taken by row skipping.
fn decode_jpeg(bytes: &[u8], w: u32, h: u32, sample: u32, budget: u64) -> Result<RgbImage, PaletteError> {
    let mut decoder = JpegDecoder::new(Cursor::new(bytes))?;
    let target_w = (w / sample).max(1);
    let target_h = (h / sample).max(1);
    let clamp = |v: u32| v.min(u16::MAX as u32) as u16;
    let (sw, sh) = decoder.scale(clamp(target_w), clamp(target_h))?;
    if decoder.total_bytes() > budget {
        return Err(out_of_budget());
    }
    let residual = (u32::from(sw.max(sh)) / target_w.max(target_h)).max(1);
    log::debug!("jpeg scaled to {sw}x{sh}, residual factor {residual}");
    stream_subsample(decoder, residual, budget)
}

/// Formats without a streaming path decode whole, under the same budget.
fn decode_whole(bytes: &[u8], w: u32, h: u32, sample: u32, budget: u64) -> Result<RgbImage, PaletteError> {
    if u64::from(w) * u64::from(h) * 4 > budget {
        return Err(out_of_budget());
    }
    let mut reader = Reader::new(Cursor::new(bytes)).with_guessed_format()?;
    reader.limits(limits(budget));
    let img = reader.decode()?;
    Ok(subsample(&img, sample))
}

/// Decode budget for one analysis.
pub const DECODE_BUDGET: u64 = 64 * 1024 * 1024;

pub fn load_downsampled(source: &ImageSource, max_dimension: u32) -> Result<RgbImage, PaletteError> {
    load_downsampled_within(source, max_dimension, DECODE_BUDGET)
}

/// Decodes at roughly `1/sample` of the source size, never allocating more
/// than `budget` bytes for pixel data.
pub fn load_downsampled_within(source: &ImageSource, max_dimension: u32, budget: u64) -> Result<RgbImage, PaletteError> {
    let bytes = source.read_bytes()?;
    let (format, w, h) = read_header(&bytes)?;
    if w == 0 || h == 0 {
        return Err(PaletteError::EmptyInput { width: w, height: h });
    }

    let sample = sample_factor(w, h, max_dimension);
    log::debug!("decoding {source} ({w}x{h}, {format:?}) with sample factor {sample}");

    match format {
        Some(ImageFormat::Png) => stream_subsample(PngDecoder::new(Cursor::new(&bytes[..]))?, sample, budget),
        Some(ImageFormat::Jpeg) => decode_jpeg(&bytes, w, h, sample, budget),
        _ => decode_whole(&bytes, w, h, sample, budget),
    }
}
