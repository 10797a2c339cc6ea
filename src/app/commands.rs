use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::GenericImageView;
use serde::Serialize;

use crate::data::additives::{pretty_additive, AdditiveTable};
use crate::data::assets;
use crate::data::config::{Config, GraphConfig};
use crate::data::history::{save_analysis, FileHistory, HistoryStore, SaveOutcome};
use crate::dataviz::{ChartType, DataTable};
use crate::editor::{crop_center, parse_size, resize, rotate, Adjustments};
use crate::food::{pie_slices, FoodClient};
use crate::graph::{self, PlotBounds};
use crate::palette::{Extraction, ImageSource, PaletteExtractor, Swatch};
use crate::render::color::ColorCapability;
use crate::render::{graph_view, swatch_view};
use crate::utils::timefmt;

const BAR_WIDTH: usize = 24;

/// Command-line overrides for the `[palette]` config section.
#[derive(Debug, Clone, Default)]
pub struct PaletteArgs {
    pub image: PathBuf,
    pub max_dimension: Option<u32>,
    pub bits: Option<u8>,
    pub threshold: Option<f32>,
    pub save: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct SwatchJson {
    color: String,
    percent_times10: u32,
}

#[derive(Serialize)]
struct PaletteJson<'a> {
    image: &'a str,
    dimensions: Option<(u32, u32)>,
    buckets: usize,
    discarded_times10: u32,
    swatches: Vec<SwatchJson>,
    failure: Option<String>,
}

fn image_uri(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

pub fn palette(config: &Config, args: &PaletteArgs) -> Result<()> {
    let mut tuning = config.palette;
    if let Some(v) = args.max_dimension {
        tuning.max_dimension = v;
    }
    if let Some(v) = args.bits {
        tuning.bits_per_channel = v;
    }
    if let Some(v) = args.threshold {
        tuning.threshold_percent = v;
    }
    tuning.validate().context("invalid palette settings")?;

    let uri = image_uri(&args.image);
    let extraction = PaletteExtractor::new(tuning).extract(&ImageSource::Path(args.image.clone()));

    if args.json {
        print_palette_json(&uri, &extraction)?;
    } else {
        print_palette(&uri, &extraction);
    }

    if args.save && worth_saving(&extraction) {
        let mut store = FileHistory::new(config.history_path());
        match save_analysis(&mut store, &uri, &extraction.swatches, timefmt::now_ms())? {
            SaveOutcome::Saved => log::info!("saved analysis to {}", store.path().display()),
            SaveOutcome::Duplicate => eprintln!("already in history: {uri}"),
        }
    }
    Ok(())
}

/// Failed or fully thresholded analyses never reach history.
fn worth_saving(extraction: &Extraction) -> bool {
    extraction.failure.is_none() && !extraction.is_empty()
}

fn print_palette_json(uri: &str, extraction: &Extraction) -> Result<()> {
    let out = PaletteJson {
        image: uri,
        dimensions: extraction.dimensions,
        buckets: extraction.buckets,
        discarded_times10: extraction.discarded_times10(),
        swatches: extraction
            .swatches
            .iter()
            .map(|s| SwatchJson {
                color: s.hex(),
                percent_times10: s.percent_times10,
            })
            .collect(),
        failure: extraction.failure.as_ref().map(|e| e.to_string()),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_palette(uri: &str, extraction: &Extraction) {
    if let Some(err) = &extraction.failure {
        eprintln!("could not analyse {uri}: {err}");
        return;
    }
    let cap = ColorCapability::detect();
    if let Some((w, h)) = extraction.dimensions {
        println!("{uri} ({w}x{h} scanned, {} buckets)", extraction.buckets);
    }
    for line in swatch_view::render_swatches(&extraction.swatches, cap, BAR_WIDTH) {
        println!("{line}");
    }
    let discarded = extraction.discarded_times10();
    if discarded > 0 {
        println!("{:.1}% below threshold", discarded as f32 / 10.0);
    }
}

pub fn history(config: &Config, limit: Option<usize>) -> Result<()> {
    let store = FileHistory::new(config.history_path());
    let records = store.list()?;
    if records.is_empty() {
        println!("no saved analyses in {}", store.path().display());
        return Ok(());
    }
    let cap = ColorCapability::detect();
    for record in records.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}  {}", timefmt::timestamp_label(record.timestamp_ms), record.image_uri);
        let swatches: Vec<Swatch> = record.swatches.iter().filter_map(|s| s.to_swatch()).collect();
        for line in swatch_view::render_swatches(&swatches, cap, BAR_WIDTH / 2) {
            println!("  {line}");
        }
    }
    Ok(())
}

/// The user's copy of the additive table when present, else the bundled one.
pub fn additive_table() -> Cow<'static, AdditiveTable> {
    let path = assets::resolve_additives_path();
    if path.exists() {
        match AdditiveTable::load(&path) {
            Ok(table) => return Cow::Owned(table),
            Err(e) => log::warn!("{}: {e}; using bundled additives", path.display()),
        }
    }
    Cow::Borrowed(AdditiveTable::bundled())
}

pub fn food(config: &Config, barcode: &str) -> Result<()> {
    let table = additive_table();
    let client = FoodClient::new(&config.food);
    let report = client
        .fetch_product(barcode, &table)
        .with_context(|| format!("lookup {barcode}"))?;

    println!("{}", report.name);
    if let Some(brand) = &report.brand {
        println!("brand: {brand}");
    }
    if let Some(size) = &report.serving_size {
        println!("serving: {size}");
    }
    if let Some(origin) = &report.origin {
        println!("origin: {origin}");
    }

    let slices = pie_slices(&report.nutrients, config.food.pie_slices);
    let total: f64 = slices.iter().map(|s| s.value).sum();
    if total > 0.0 {
        println!("\nper 100 g:");
        for slice in &slices {
            println!("  {:<28} {:>8.2}  {:>5.1}%", slice.label, slice.value, slice.value * 100.0 / total);
        }
    }

    if !report.additives.is_empty() {
        println!("\nadditives:");
        for code in &report.additives {
            let (title, subtitle) = pretty_additive(code);
            let name = table
                .get(code)
                .and_then(|a| a.name_en.clone().or_else(|| a.name_fi.clone()))
                .unwrap_or(subtitle);
            println!("  {title:<8} {name}");
        }
    }
    if !report.allergens_text.is_empty() {
        println!("\nallergens: {}", report.allergens_text);
    } else if !report.allergens_tags.is_empty() {
        println!("\nallergens: {}", report.allergens_tags.join(", "));
    }
    if !report.ingredients_text.is_empty() {
        println!("\ningredients: {}", report.ingredients_text);
    }
    Ok(())
}

pub fn additives_detect(text: &str) -> Result<()> {
    let table = additive_table();
    let codes = table.detect_ecodes(text);
    if codes.is_empty() {
        println!("no additives found");
    }
    for code in codes {
        let name = table.get(&code).and_then(|a| a.name_en.as_deref()).unwrap_or("");
        println!("{code:<6} {name}");
    }
    Ok(())
}

pub fn additives_list(query: &str, category: Option<&str>) -> Result<()> {
    let table = additive_table();
    if let Some(c) = category {
        if !table.categories().iter().any(|known| known == c) {
            bail!("unknown category {c:?}; known: {}", table.categories().join(", "));
        }
    }
    for a in table.search(query, category) {
        println!(
            "{:<6} {:<32} {:<32} {}",
            a.code,
            a.name_en.as_deref().unwrap_or("-"),
            a.name_fi.as_deref().unwrap_or("-"),
            a.category()
        );
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct EditArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub adjustments: Adjustments,
    pub crop: Option<f32>,
    pub rotate: Option<i32>,
    pub resize: Option<String>,
}

pub fn edit(args: &EditArgs) -> Result<()> {
    let mut img = image::open(&args.input).with_context(|| format!("open {}", args.input.display()))?;
    if let Some(fraction) = args.crop {
        img = crop_center(&img, fraction)?;
    }
    if let Some(deg) = args.rotate {
        img = rotate(&img, deg)?;
    }
    if let Some(size) = &args.resize {
        let Some((w, h)) = parse_size(size) else {
            bail!("bad size {size:?}, expected WIDTHxHEIGHT");
        };
        img = resize(&img, w, h)?;
    }

    let out = image::DynamicImage::ImageRgba8(args.adjustments.apply(&img));
    let is_jpeg = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    let out = if is_jpeg {
        image::DynamicImage::ImageRgb8(out.to_rgb8())
    } else {
        out
    };
    out.save(&args.output)
        .with_context(|| format!("write {}", args.output.display()))?;
    log::info!("wrote {}x{} to {}", out.width(), out.height(), args.output.display());
    Ok(())
}

pub fn graph(cfg: &GraphConfig, expression: &str) -> Result<()> {
    if cfg.x_min >= cfg.x_max {
        bail!("x range is empty: {} .. {}", cfg.x_min, cfg.x_max);
    }
    let expr = graph::parse(expression).with_context(|| format!("parse {expression:?}"))?;
    let points = graph::sample(&expr, cfg.x_min, cfg.x_max, cfg.steps);
    if points.is_empty() {
        bail!("{expression:?} is undefined everywhere on {} .. {}", cfg.x_min, cfg.x_max);
    }

    let bounds = PlotBounds::from_points(&points);
    println!("y = {}  ({})", graph::expr::clean(expression), graph::classify(expression));
    for line in graph_view::render_graph(&points, &bounds, cfg.width, cfg.height) {
        println!("{line}");
    }
    let xt: Vec<String> = graph::ticks(bounds.x_min, bounds.x_max, 5)
        .iter()
        .map(|&v| graph_view::axis_label(v))
        .collect();
    println!("x ticks: {}", xt.join("  "));
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DatavizArgs {
    pub file: PathBuf,
    pub chart: ChartType,
    pub column: Option<String>,
}

pub fn dataviz(config: &Config, args: &DatavizArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file).with_context(|| format!("read {}", args.file.display()))?;
    let table = DataTable::parse_file(&args.file, &text).with_context(|| format!("parse {}", args.file.display()))?;
    log::debug!("{} rows, value columns {:?}", table.rows().len(), table.metric_columns());

    match args.chart {
        ChartType::Bar => {
            if args.column.is_some() {
                log::warn!("--column only applies to pie charts");
            }
            println!("{} by {}", table.metric_columns().join(", "), table.label_column());
            let lines = graph_view::render_bars(
                &table.labels(),
                table.metric_columns(),
                &table.groups(),
                config.graph.width,
                config.graph.height,
            );
            if lines.is_empty() {
                bail!("{} rows do not fit in {} columns", table.rows().len(), config.graph.width);
            }
            for line in lines {
                println!("{line}");
            }
        }
        ChartType::Pie => {
            let idx = table.metric_index(args.column.as_deref())?;
            let slices = table.pie_shares(args.column.as_deref(), config.food.pie_slices)?;
            let total: f64 = slices.iter().map(|s| s.value).sum();
            if total <= 0.0 {
                bail!("column {:?} sums to zero", table.metric_columns()[idx]);
            }
            println!("{} by {}", table.metric_columns()[idx], table.label_column());
            for slice in &slices {
                println!("  {:<28} {:>8}  {:>5.1}%", slice.label, slice.value, slice.value * 100.0 / total);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteError;

    #[test]
    fn test_only_non_empty_successes_are_saved() {
        let empty = Extraction {
            dimensions: Some((10, 10)),
            buckets: 100,
            ..Extraction::default()
        };
        assert!(!worth_saving(&empty));

        let failed = Extraction {
            failure: Some(PaletteError::InvalidMaxDimension),
            ..Extraction::default()
        };
        assert!(!worth_saving(&failed));

        let found = Extraction {
            swatches: vec![Swatch::from_rgb(255, 0, 0, 1000)],
            dimensions: Some((10, 10)),
            buckets: 1,
            failure: None,
        };
        assert!(worth_saving(&found));
    }
}
