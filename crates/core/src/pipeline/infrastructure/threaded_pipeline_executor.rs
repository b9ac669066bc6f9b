use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::pipeline::pipeline_executor::{prepare, PipelineExecutor, PreparedItem};
use crate::sequencing::domain::sequencer::SourceItem;
use crate::video::domain::image_reader::ImageReader;

const DEFAULT_PREFETCH: usize = 4;

/// Decodes and detects on a worker thread while the caller finishes
/// earlier items.
///
/// Layout: `worker [decode → detect] → bounded channel → consume`
///
/// The channel is FIFO and fed in input order, so `consume` sees items in
/// exactly the order a sequential run would.
pub struct ThreadedPipelineExecutor {
    prefetch: usize,
}

impl ThreadedPipelineExecutor {
    pub fn new() -> Self {
        Self::with_prefetch(DEFAULT_PREFETCH)
    }

    /// `prefetch` bounds how many prepared images may wait in memory.
    pub fn with_prefetch(prefetch: usize) -> Self {
        Self {
            prefetch: prefetch.max(1),
        }
    }
}

impl Default for ThreadedPipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineExecutor for ThreadedPipelineExecutor {
    fn execute(
        &self,
        items: &[SourceItem],
        reader: &mut dyn ImageReader,
        detector: &mut dyn LandmarkDetector,
        consume: &mut dyn FnMut(PreparedItem),
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (tx, rx) = crossbeam_channel::bounded::<PreparedItem>(self.prefetch);

        std::thread::scope(|scope| {
            let worker = scope.spawn(move || {
                for item in items {
                    if tx.send(prepare(item, reader, detector)).is_err() {
                        break;
                    }
                }
            });

            for mut prepared in rx.iter() {
                prepared.queued = Some(rx.len());
                consume(prepared);
            }

            worker
                .join()
                .map_err(|_| -> Box<dyn std::error::Error> { "prefetch worker panicked".into() })
        })
    }
}
