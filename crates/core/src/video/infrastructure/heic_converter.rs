use std::path::{Path, PathBuf};

use crate::sequencing::infrastructure::directory_scanner::{list_files, scan_images};
use crate::shared::capture_date::CaptureDate;
use crate::shared::constants::{HEIC_EXTENSIONS, OUTPUT_EXTENSION};
use crate::video::domain::format_converter::{ConversionReport, FormatConverter};
use crate::video::domain::image_writer::ImageWriter;
use crate::video::infrastructure::exif_segment::{embed_date_time_original, is_exif_timestamp};
use crate::video::infrastructure::image_file_reader::decode_image;

/// Converts `.heic`/`.heif` photos to `<stem>.jpg` siblings.
///
/// The capture time is embedded in the JPEG as `DateTimeOriginal` and its
/// modification time is set to the capture date, so either lookup finds it.
pub struct HeicConverter {
    writer: Box<dyn ImageWriter>,
}

impl HeicConverter {
    pub fn new(writer: Box<dyn ImageWriter>) -> Self {
        Self { writer }
    }

    fn convert_one(&self, source: &Path, target: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let decoded = decode_image(source)?;
        self.writer.write(target, &decoded.frame)?;

        let date = match CaptureDate::from_tags(&decoded.tags) {
            Some(date) => Some(date),
            None => CaptureDate::from_modified_time(source).ok(),
        };
        // Keep the original time of day when the source carries one
        let stamp = decoded
            .tags
            .get("DateTimeOriginal")
            .map(|v| v.trim_end_matches('\0'))
            .filter(|v| is_exif_timestamp(v))
            .map(str::to_string)
            .or_else(|| date.map(|d| d.exif_timestamp()));
        if let Some(stamp) = stamp {
            let jpeg = std::fs::read(target)?;
            std::fs::write(target, embed_date_time_original(&jpeg, &stamp))?;
        }

        if let Some(time) = date.and_then(|d| d.to_system_time()) {
            let file = std::fs::File::options().write(true).open(target)?;
            file.set_modified(time)?;
        }
        Ok(())
    }
}

pub fn converted_path(source: &Path) -> PathBuf {
    source.with_extension(OUTPUT_EXTENSION)
}

/// A png/jpg/jpeg next to `source` with the same stem, whatever the case of
/// its extension.
fn existing_sibling<'a>(source: &Path, images: &'a [PathBuf]) -> Option<&'a PathBuf> {
    images
        .iter()
        .find(|image| image.file_stem() == source.file_stem())
}

impl FormatConverter for HeicConverter {
    fn convert_directory(
        &self,
        dir: &Path,
    ) -> Result<ConversionReport, Box<dyn std::error::Error>> {
        let mut report = ConversionReport::default();
        let images = scan_images(dir)?;
        for source in list_files(dir, HEIC_EXTENSIONS)? {
            if let Some(existing) = existing_sibling(&source, &images) {
                log::debug!("{} already converted as {}", source.display(), existing.display());
                report.already_present.push(source);
                continue;
            }
            let target = converted_path(&source);
            match self.convert_one(&source, &target) {
                Ok(()) => {
                    log::info!("Converted {} to {}", source.display(), target.display());
                    report.converted.push(source);
                }
                Err(e) => {
                    log::error!("Failed to convert {}: {e}", source.display());
                    // Never leave a partial JPEG behind for the scanner
                    let _ = std::fs::remove_file(&target);
                    report.failed.push((source, e.to_string()));
                }
            }
        }
        Ok(report)
    }
}
