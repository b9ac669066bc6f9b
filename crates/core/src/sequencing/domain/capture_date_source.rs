use std::path::Path;

use crate::shared::capture_date::CaptureDate;

/// Domain interface for resolving when a photo was taken.
///
/// `Ok(None)` means the file carries no usable date metadata; callers fall
/// back to the filesystem modification time.
pub trait CaptureDateSource: Send {
    fn read_capture_date(
        &self,
        path: &Path,
    ) -> Result<Option<CaptureDate>, Box<dyn std::error::Error>>;
}

/// Metadata date when present, modification time otherwise.
///
/// Returns `None` only when neither is available.
pub fn resolve_capture_date(source: &dyn CaptureDateSource, path: &Path) -> Option<CaptureDate> {
    match source.read_capture_date(path) {
        Ok(Some(date)) => return Some(date),
        Ok(None) => {}
        Err(e) => log::debug!("No metadata date for {}: {e}", path.display()),
    }
    match CaptureDate::from_modified_time(path) {
        Ok(date) => Some(date),
        Err(e) => {
            log::warn!("Could not read modification time of {}: {e}", path.display());
            None
        }
    }
}
