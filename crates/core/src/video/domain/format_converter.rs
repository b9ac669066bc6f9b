use std::path::{Path, PathBuf};

/// Outcome of converting container-format sources in one directory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConversionReport {
    pub converted: Vec<PathBuf>,
    /// Sources whose converted sibling already existed.
    pub already_present: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Converts sources the pipeline cannot scan directly (e.g. HEIC) into
/// standard raster files next to them.
pub trait FormatConverter: Send {
    fn convert_directory(&self, dir: &Path)
        -> Result<ConversionReport, Box<dyn std::error::Error>>;
}
