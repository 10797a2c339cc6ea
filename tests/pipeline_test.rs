use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use swatchlab::data::history::{save_analysis, FileHistory, HistoryStore, SaveOutcome};
use swatchlab::palette::{ExtractorConfig, ImageSource, PaletteError, PaletteExtractor};

fn png_bytes(img: RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .unwrap();
    buf
}

fn extractor() -> PaletteExtractor {
    PaletteExtractor::new(ExtractorConfig::default())
}

#[test]
fn solid_red_is_one_full_swatch() {
    let bytes = png_bytes(RgbImage::from_pixel(10, 10, Rgb([255, 0, 0])));
    let out = extractor().extract(&ImageSource::Bytes(bytes));

    assert!(out.failure.is_none());
    assert_eq!(out.buckets, 1);
    assert_eq!(out.swatches.len(), 1);
    assert_eq!(out.swatches[0].percent_times10, 1000);
    assert_eq!(out.swatches[0].rgb(), (255, 0, 0));
    assert_eq!(out.discarded_times10(), 0);
}

#[test]
fn half_white_half_black_ties_break_by_bucket() {
    let img = RgbImage::from_fn(10, 10, |_, y| if y < 5 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) });
    let out = extractor().extract(&ImageSource::Bytes(png_bytes(img)));

    let got: Vec<(String, u32)> = out.swatches.iter().map(|s| (s.hex(), s.percent_times10)).collect();
    assert_eq!(got, vec![("#000000".to_string(), 500), ("#FFFFFF".to_string(), 500)]);
}

#[test]
fn rare_colour_is_filtered_out() {
    let img = RgbImage::from_fn(20, 10, |x, y| if (x, y) == (0, 0) { Rgb([0, 0, 255]) } else { Rgb([0, 255, 0]) });
    let out = extractor().extract(&ImageSource::Bytes(png_bytes(img)));

    assert_eq!(out.buckets, 2);
    assert_eq!(out.swatches.len(), 1);
    assert_eq!(out.swatches[0].hex(), "#00FF00");
    assert_eq!(out.retained_times10(), 995);
    assert_eq!(out.discarded_times10(), 5);
}

#[test]
fn malformed_bytes_give_empty_result() {
    let out = extractor().extract(&ImageSource::Bytes(b"definitely not a png".to_vec()));

    assert!(out.is_empty());
    assert!(out.dimensions.is_none());
    assert!(matches!(out.failure, Some(PaletteError::Decode(_))));
}

#[test]
fn missing_file_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let out = extractor().extract(&ImageSource::Path(dir.path().join("nope.png")));

    assert!(out.is_empty());
    assert!(matches!(out.failure, Some(PaletteError::Io(_))));
}

#[test]
fn large_file_is_downsampled_before_counting() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.png");
    std::fs::write(&path, png_bytes(RgbImage::from_pixel(600, 400, Rgb([10, 200, 30])))).unwrap();

    let out = extractor().extract(&ImageSource::Path(path));
    assert_eq!(out.dimensions, Some((300, 200)));
    assert_eq!(out.swatches.len(), 1);
}

#[test]
fn large_jpeg_is_one_swatch() {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(1200, 800, Rgb([200, 40, 40])))
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Jpeg(90))
        .unwrap();
    let out = extractor().extract(&ImageSource::Bytes(buf));

    assert!(out.failure.is_none());
    assert_eq!(out.dimensions, Some((300, 200)));
    assert_eq!(out.swatches.len(), 1);
    assert_eq!(out.swatches[0].percent_times10, 1000);
}

#[test]
fn coarser_depth_merges_near_colours() {
    let img = RgbImage::from_fn(10, 10, |x, _| if x < 5 { Rgb([250, 0, 0]) } else { Rgb([200, 0, 0]) });
    let bytes = png_bytes(img);

    let fine = extractor().extract(&ImageSource::Bytes(bytes.clone()));
    assert_eq!(fine.swatches.len(), 2);

    let coarse = PaletteExtractor::new(ExtractorConfig {
        bits_per_channel: 1,
        ..ExtractorConfig::default()
    })
    .extract(&ImageSource::Bytes(bytes));
    assert_eq!(coarse.swatches.len(), 1);
    assert_eq!(coarse.swatches[0].rgb(), (255, 0, 0));
}

#[test]
fn extraction_saves_once_to_history() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileHistory::new(dir.path().join("history.toml"));
    let bytes = png_bytes(RgbImage::from_pixel(4, 4, Rgb([0, 0, 255])));
    let out = extractor().extract(&ImageSource::Bytes(bytes));

    let first = save_analysis(&mut store, "file:///blue.png", &out.swatches, 1_000).unwrap();
    let again = save_analysis(&mut store, "file:///blue.png", &out.swatches, 2_000).unwrap();
    assert_eq!(first, SaveOutcome::Saved);
    assert_eq!(again, SaveOutcome::Duplicate);

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].swatches[0].color_hex, "#0000FF");
    assert_eq!(listed[0].swatches[0].to_swatch(), out.swatches.first().copied());
}
