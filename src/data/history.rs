use crate::palette::Swatch;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("history encode failed: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Persisted form of a swatch: hex colour plus a one-decimal percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwatchRecord {
    pub color_hex: String,
    pub percent: f32,
}

impl From<&Swatch> for SwatchRecord {
    fn from(s: &Swatch) -> Self {
        Self {
            color_hex: s.hex(),
            percent: s.percent(),
        }
    }
}

impl SwatchRecord {
    pub fn to_swatch(&self) -> Option<Swatch> {
        let hex = self.color_hex.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let rgb = u32::from_str_radix(hex, 16).ok()?;
        Some(Swatch {
            color: 0xFF00_0000 | rgb,
            percent_times10: (self.percent * 10.0).round().max(0.0) as u32,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub image_uri: String,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub swatches: Vec<SwatchRecord>,
}

impl AnalysisRecord {
    pub fn new(image_uri: impl Into<String>, timestamp_ms: i64, swatches: &[Swatch]) -> Self {
        Self {
            image_uri: image_uri.into(),
            timestamp_ms,
            swatches: swatches.iter().map(SwatchRecord::from).collect(),
        }
    }
}

/// Ordered record storage with an equality lookup on the image URI.
pub trait HistoryStore {
    /// All records, newest first.
    fn list(&self) -> Result<Vec<AnalysisRecord>, HistoryError>;
    fn find_by_image_uri(&self, uri: &str) -> Result<Vec<AnalysisRecord>, HistoryError>;
    fn insert(&mut self, record: AnalysisRecord) -> Result<(), HistoryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Duplicate,
}

/// Stores an analysis unless one already exists for the same image.
pub fn save_analysis<S: HistoryStore + ?Sized>(
    store: &mut S,
    image_uri: &str,
    swatches: &[Swatch],
    timestamp_ms: i64,
) -> Result<SaveOutcome, HistoryError> {
    if !store.find_by_image_uri(image_uri)?.is_empty() {
        log::info!("analysis for {image_uri} already saved");
        return Ok(SaveOutcome::Duplicate);
    }
    store.insert(AnalysisRecord::new(image_uri, timestamp_ms, swatches))?;
    Ok(SaveOutcome::Saved)
}

fn newest_first(mut records: Vec<AnalysisRecord>) -> Vec<AnalysisRecord> {
    records.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    records
}

#[derive(Debug, Default)]
pub struct MemoryHistory {
    records: Vec<AnalysisRecord>,
}

impl HistoryStore for MemoryHistory {
    fn list(&self) -> Result<Vec<AnalysisRecord>, HistoryError> {
        Ok(newest_first(self.records.clone()))
    }

    fn find_by_image_uri(&self, uri: &str) -> Result<Vec<AnalysisRecord>, HistoryError> {
        Ok(self.records.iter().filter(|r| r.image_uri == uri).cloned().collect())
    }

    fn insert(&mut self, record: AnalysisRecord) -> Result<(), HistoryError> {
        self.records.push(record);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    analyses: Vec<AnalysisRecord>,
}

/// TOML file of `[[analyses]]` tables. Reads the whole file per call; the
/// history is small and this keeps external edits visible.
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: PathBuf,
}

impl FileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<HistoryFile, HistoryError> {
        if !self.path.exists() {
            return Ok(HistoryFile::default());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| HistoryError::Io {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| HistoryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, file: &HistoryFile) -> Result<(), HistoryError> {
        let io_err = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = toml::to_string_pretty(file)?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, raw).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl HistoryStore for FileHistory {
    fn list(&self) -> Result<Vec<AnalysisRecord>, HistoryError> {
        Ok(newest_first(self.read()?.analyses))
    }

    fn find_by_image_uri(&self, uri: &str) -> Result<Vec<AnalysisRecord>, HistoryError> {
        Ok(self
            .read()?
            .analyses
            .into_iter()
            .filter(|r| r.image_uri == uri)
            .collect())
    }

    fn insert(&mut self, record: AnalysisRecord) -> Result<(), HistoryError> {
        let mut file = self.read()?;
        file.analyses.push(record);
        self.write(&file)
    }
}
