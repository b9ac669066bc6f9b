use std::path::Path;

use crate::sequencing::domain::capture_date_source::CaptureDateSource;
use crate::shared::capture_date::CaptureDate;
use crate::video::infrastructure::image_file_reader::read_tags;

/// Reads capture dates from the EXIF and container tags ffmpeg exposes.
pub struct FfmpegCaptureDateReader;

impl FfmpegCaptureDateReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegCaptureDateReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureDateSource for FfmpegCaptureDateReader {
    fn read_capture_date(
        &self,
        path: &Path,
    ) -> Result<Option<CaptureDate>, Box<dyn std::error::Error>> {
        Ok(CaptureDate::from_tags(&read_tags(path)?))
    }
}
