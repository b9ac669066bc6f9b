//! Ordering of source images and gap-free numbering of output frames.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::capture_date::CaptureDate;
use crate::shared::constants::{MIN_INDEX_WIDTH, OUTPUT_EXTENSION, OUTPUT_PREFIX};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    /// Lexical order of file names.
    #[default]
    Filename,
    /// Ascending capture date, ties in file-name order.
    CaptureDate,
}

/// A candidate image with its resolved capture date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceItem {
    pub path: PathBuf,
    pub capture_date: Option<CaptureDate>,
}

impl SourceItem {
    pub fn new(path: impl Into<PathBuf>, capture_date: Option<CaptureDate>) -> Self {
        Self {
            path: path.into(),
            capture_date,
        }
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

/// A source image that produced an output frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequencedItem {
    pub source: PathBuf,
    pub capture_date: Option<CaptureDate>,
    pub index: usize,
    pub output: PathBuf,
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sorts candidates for processing.
///
/// Both modes are total orders over the input, so the result does not
/// depend on the order items were listed in. Items without a date sort
/// after dated ones in capture-date mode.
pub fn order(mut items: Vec<SourceItem>, mode: OrderingMode) -> Vec<SourceItem> {
    items.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.path.cmp(&b.path)));
    if mode == OrderingMode::CaptureDate {
        // Stable sort keeps file-name order within a date
        items.sort_by(|a, b| match (a.capture_date, b.capture_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }
    items
}

/// Zero-pad width for `count` output frames.
pub fn index_width(count: usize) -> usize {
    let max_index = count.saturating_sub(1);
    let digits = max_index.to_string().len();
    digits.max(MIN_INDEX_WIDTH)
}

pub fn output_file_name(index: usize, width: usize) -> String {
    format!("{OUTPUT_PREFIX}{index:0width$}.{OUTPUT_EXTENSION}")
}

/// Hands out contiguous output indices starting at 0.
///
/// An index is only taken once a frame is known to be written, so skipped
/// sources leave no gaps.
pub struct OutputIndexer {
    output_dir: PathBuf,
    width: usize,
    next: usize,
}

impl OutputIndexer {
    /// `capacity` is the number of candidates; it fixes the pad width.
    pub fn new(output_dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            width: index_width(capacity),
            next: 0,
        }
    }

    /// Path the next frame will be written to.
    pub fn peek_path(&self) -> PathBuf {
        self.output_dir.join(output_file_name(self.next, self.width))
    }

    /// Claims the next index for a successfully written frame.
    pub fn commit(&mut self, item: &SourceItem) -> SequencedItem {
        let sequenced = SequencedItem {
            source: item.path.clone(),
            capture_date: item.capture_date,
            index: self.next,
            output: self.peek_path(),
        };
        self.next += 1;
        sequenced
    }
}
