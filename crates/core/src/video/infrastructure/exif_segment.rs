//! Minimal EXIF APP1 segment carrying a single `DateTimeOriginal` entry.
//!
//! Converted JPEGs are written from decoded pixels, so the source's EXIF
//! block is lost on the way. Re-embedding the capture time keeps the date
//! readable from the file itself rather than only from its mtime.

use chrono::NaiveDateTime;

/// EXIF ASCII timestamp layout, e.g. `2021:06:15 10:30:00`.
pub const EXIF_TIMESTAMP_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

const DATE_TIME_ORIGINAL: u16 = 0x9003;
const TIFF_ASCII: u16 = 2;
const TIMESTAMP_LEN: usize = 19;

pub fn is_exif_timestamp(value: &str) -> bool {
    value.len() == TIMESTAMP_LEN
        && NaiveDateTime::parse_from_str(value, EXIF_TIMESTAMP_FORMAT).is_ok()
}

/// Inserts an APP1 `Exif` segment holding `timestamp` as `DateTimeOriginal`
/// directly after the JPEG start-of-image marker.
///
/// Returns the input unchanged if it does not start with SOI or if
/// `timestamp` is not in [`EXIF_TIMESTAMP_FORMAT`].
pub fn embed_date_time_original(jpeg: &[u8], timestamp: &str) -> Vec<u8> {
    if jpeg.len() < 2 || jpeg[0..2] != [0xFF, 0xD8] || !is_exif_timestamp(timestamp) {
        return jpeg.to_vec();
    }

    let segment = app1_segment(timestamp);
    let mut out = Vec::with_capacity(jpeg.len() + segment.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn app1_segment(timestamp: &str) -> Vec<u8> {
    // Little-endian TIFF: header (8) + IFD0 with one entry (2 + 12 + 4),
    // then the NUL-terminated string the entry points at.
    let entry_count: u16 = 1;
    let value_offset: u32 = 8 + 2 + 12 + 4;
    let value_len = (TIMESTAMP_LEN + 1) as u32;

    let mut tiff = Vec::with_capacity(value_offset as usize + value_len as usize);
    tiff.extend_from_slice(b"II*\0");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&entry_count.to_le_bytes());
    tiff.extend_from_slice(&DATE_TIME_ORIGINAL.to_le_bytes());
    tiff.extend_from_slice(&TIFF_ASCII.to_le_bytes());
    tiff.extend_from_slice(&value_len.to_le_bytes());
    tiff.extend_from_slice(&value_offset.to_le_bytes());
    // No further IFDs
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(timestamp.as_bytes());
    tiff.push(0);

    // Segment length counts itself but not the marker
    let length = (2 + 6 + tiff.len()) as u16;
    let mut segment = Vec::with_capacity(2 + length as usize);
    segment.extend_from_slice(&[0xFF, 0xE1]);
    segment.extend_from_slice(&length.to_be_bytes());
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(&tiff);
    segment
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAMP: &str = "2021:06:15 10:30:00";

    #[test]
    fn test_segment_follows_start_of_image() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x02];
        let out = embed_date_time_original(&jpeg, STAMP);

        assert_eq!(&out[..4], &[0xFF, 0xD8, 0xFF, 0xE1]);
        let length = u16::from_be_bytes([out[4], out[5]]) as usize;
        assert_eq!(length, 2 + 6 + 46);
        assert_eq!(&out[6..12], b"Exif\0\0");
        assert_eq!(&out[2 + 2 + length..], &jpeg[2..]);
    }

    #[test]
    fn test_entry_points_at_timestamp() {
        let out = embed_date_time_original(&[0xFF, 0xD8], STAMP);
        let tiff = &out[12..];

        assert_eq!(&tiff[..4], b"II*\0");
        assert_eq!(u16::from_le_bytes([tiff[10], tiff[11]]), DATE_TIME_ORIGINAL);
        let offset = u32::from_le_bytes([tiff[18], tiff[19], tiff[20], tiff[21]]) as usize;
        assert_eq!(&tiff[offset..offset + TIMESTAMP_LEN], STAMP.as_bytes());
        assert_eq!(tiff[offset + TIMESTAMP_LEN], 0);
    }

    #[test]
    fn test_non_jpeg_is_returned_unchanged() {
        let png = b"\x89PNG\r\n\x1a\n";
        assert_eq!(embed_date_time_original(png, STAMP), png.to_vec());
    }

    #[test]
    fn test_malformed_timestamp_is_not_embedded() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xD9];
        assert_eq!(embed_date_time_original(&jpeg, "2021-06-15"), jpeg.to_vec());
        assert!(!is_exif_timestamp("2021:06:15 10:30:00\0"));
        assert!(is_exif_timestamp(STAMP));
    }
}
