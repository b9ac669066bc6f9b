use std::path::PathBuf;

use crate::pipeline::processing_error::ProcessingError;
use crate::sequencing::domain::sequencer::SequencedItem;

/// What happened to every candidate in a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub candidates: usize,
    /// Frames written, in output order.
    pub written: Vec<SequencedItem>,
    pub skipped_no_face: Vec<PathBuf>,
    pub failed: Vec<ProcessingError>,
}

impl RunSummary {
    pub fn new(candidates: usize) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub fn succeeded(&self) -> usize {
        self.written.len()
    }

    pub fn skipped(&self) -> usize {
        self.skipped_no_face.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Written frame paths in index order, as the video encoder consumes them.
    pub fn frame_paths(&self) -> Vec<PathBuf> {
        self.written.iter().map(|item| item.output.clone()).collect()
    }

    pub fn report(&self) -> String {
        format!(
            "{} candidate(s): {} written, {} without a face, {} failed",
            self.candidates,
            self.succeeded(),
            self.skipped(),
            self.failed_count()
        )
    }
}
