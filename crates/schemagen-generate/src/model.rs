use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::PREVIEW_LIMIT;

/// How array nodes turn a drawn length into an output length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Every drawn element is produced.
    #[default]
    Full,
    /// Output arrays are capped at [`PREVIEW_LIMIT`] elements. The length is
    /// still drawn over the full declared range first.
    Preview,
}

impl GenerationMode {
    pub fn from_preview(preview: bool) -> Self {
        if preview {
            GenerationMode::Preview
        } else {
            GenerationMode::Full
        }
    }

    /// Effective element count for a drawn array length.
    pub fn cap(self, drawn: usize) -> usize {
        match self {
            GenerationMode::Full => drawn,
            GenerationMode::Preview => drawn.min(PREVIEW_LIMIT),
        }
    }
}

/// Options for the generation engine.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory where datasets are written.
    pub out_dir: PathBuf,
    /// Cap every generated array at the preview limit.
    pub preview: bool,
    /// Indent the exported JSON.
    pub pretty: bool,
    /// Seed for the session RNG. A random seed is picked when absent.
    pub seed: Option<u64>,
    /// Write `generation_report.json` next to the datasets.
    pub write_report: bool,
    /// Bundle every dataset into one `data.zip` instead of separate files.
    pub zip: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            preview: false,
            pretty: false,
            seed: None,
            write_report: true,
            zip: false,
        }
    }
}

impl GenerateOptions {
    pub fn mode(&self) -> GenerationMode {
        GenerationMode::from_preview(self.preview)
    }
}

/// Counters collected while expanding schemas in one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionStats {
    pub arrays_expanded: u64,
    pub leaves_drawn: u64,
    /// Elements drawn but not produced because of the preview cap.
    pub elements_capped: u64,
}

/// Summary of one exported dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetReport {
    pub name: String,
    /// Top-level length when the dataset is an array.
    pub elements: Option<u64>,
    pub bytes_written: u64,
    pub path: PathBuf,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub mode: GenerationMode,
    pub seed: u64,
    pub routines: Vec<String>,
    pub datasets: Vec<DatasetReport>,
    pub stats: ExpansionStats,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, mode: GenerationMode, seed: u64) -> Self {
        Self {
            run_id,
            mode,
            seed,
            routines: Vec::new(),
            datasets: Vec::new(),
            stats: ExpansionStats::default(),
            bytes_written: 0,
            duration_ms: 0,
        }
    }

    pub fn record_dataset(&mut self, dataset: DatasetReport) {
        self.bytes_written = self.bytes_written.saturating_add(dataset.bytes_written);
        self.datasets.push(dataset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_write_loose_files_into_the_working_directory() {
        let options = GenerateOptions::default();
        assert_eq!(options.out_dir, PathBuf::from("."));
        assert!(options.write_report);
        assert!(!options.zip);
        assert_eq!(options.mode(), GenerationMode::Full);
    }

    #[test]
    fn preview_caps_only_long_arrays() {
        assert_eq!(GenerationMode::Preview.cap(3), 3);
        assert_eq!(GenerationMode::Preview.cap(500), PREVIEW_LIMIT);
        assert_eq!(GenerationMode::Full.cap(500), 500);
    }
}
