use std::time::Instant;

use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::detection::domain::landmark_set::LandmarkSet;
use crate::pipeline::processing_error::ProcessingError;
use crate::sequencing::domain::sequencer::SourceItem;
use crate::shared::frame::Frame;
use crate::video::domain::image_reader::ImageReader;

/// A source image after the decode and detect stages.
pub struct PreparedItem {
    pub item: SourceItem,
    /// `Ok(None)` landmarks means no face was found.
    pub outcome: Result<(Frame, Option<LandmarkSet>), ProcessingError>,
    pub decode_ms: f64,
    pub detect_ms: f64,
    /// Items still waiting behind this one when it left the prefetch
    /// queue. `None` when nothing is queued ahead of the consumer.
    pub queued: Option<usize>,
}

/// Runs the decode → detect front half of the pipeline over `items`.
///
/// This is a port: infrastructure decides whether the work overlaps with
/// the consumer. Every implementation hands items to `consume` exactly once
/// each and strictly in the order given, so output numbering stays
/// deterministic.
pub trait PipelineExecutor: Send {
    fn execute(
        &self,
        items: &[SourceItem],
        reader: &mut dyn ImageReader,
        detector: &mut dyn LandmarkDetector,
        consume: &mut dyn FnMut(PreparedItem),
    ) -> Result<(), Box<dyn std::error::Error>>;
}

/// Decodes and detects one item.
pub fn prepare(
    item: &SourceItem,
    reader: &mut dyn ImageReader,
    detector: &mut dyn LandmarkDetector,
) -> PreparedItem {
    let path = item.path.clone();

    let t0 = Instant::now();
    let decoded = reader.read(&item.path);
    let decode_ms = elapsed_ms(t0);

    let frame = match decoded {
        Ok(frame) => frame,
        Err(e) => {
            return PreparedItem {
                item: item.clone(),
                outcome: Err(ProcessingError::Decode {
                    path,
                    message: e.to_string(),
                }),
                decode_ms,
                detect_ms: 0.0,
                queued: None,
            }
        }
    };

    let t1 = Instant::now();
    let detected = detector.detect(&frame);
    let detect_ms = elapsed_ms(t1);

    let outcome = match detected {
        Ok(landmarks) => Ok((frame, landmarks)),
        Err(e) => Err(ProcessingError::Detection {
            path,
            message: e.to_string(),
        }),
    };
    PreparedItem {
        item: item.clone(),
        outcome,
        decode_ms,
        detect_ms,
        queued: None,
    }
}

pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Processes items one at a time on the calling thread.
pub struct SequentialPipelineExecutor;

impl PipelineExecutor for SequentialPipelineExecutor {
    fn execute(
        &self,
        items: &[SourceItem],
        reader: &mut dyn ImageReader,
        detector: &mut dyn LandmarkDetector,
        consume: &mut dyn FnMut(PreparedItem),
    ) -> Result<(), Box<dyn std::error::Error>> {
        for item in items {
            consume(prepare(item, reader, detector));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::detection::domain::landmark_set::FacialRegion;

    /// Serves frames from memory; paths it does not know fail to decode.
    pub struct StubReader {
        pub frames: HashMap<PathBuf, Frame>,
    }

    impl ImageReader for StubReader {
        fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
            self.frames
                .get(path)
                .cloned()
                .ok_or_else(|| format!("cannot decode {}", path.display()).into())
        }
    }

    /// Reads eye positions from the first two pixels of a frame:
    /// pixel 0 holds `(left_x, left_y, 1)`, pixel 1 `(right_x, right_y, 1)`.
    /// A zero marker channel means "no face"; 255 means detector failure.
    pub struct PixelCodedDetector;

    impl LandmarkDetector for PixelCodedDetector {
        fn detect(
            &mut self,
            frame: &Frame,
        ) -> Result<Option<LandmarkSet>, Box<dyn std::error::Error>> {
            let d = frame.data();
            match d[2] {
                0 => Ok(None),
                255 => Err("detector exploded".into()),
                _ => Ok(LandmarkSet::from_regions([
                    (FacialRegion::LeftEye, vec![(d[0] as f64, d[1] as f64)]),
                    (FacialRegion::RightEye, vec![(d[3] as f64, d[4] as f64)]),
                ])),
            }
        }
    }

    /// 64x64 gray frame whose first pixels encode eye positions for
    /// [`PixelCodedDetector`].
    pub fn coded_frame(left: (u8, u8), right: (u8, u8), marker: u8) -> Frame {
        let mut data = vec![128u8; 64 * 64 * 3];
        data[..6].copy_from_slice(&[left.0, left.1, marker, right.0, right.1, marker]);
        Frame::new(data, 64, 64, 3)
    }

    pub fn face_frame() -> Frame {
        coded_frame((20, 30), (44, 30), 1)
    }

    pub fn faceless_frame() -> Frame {
        coded_frame((0, 0), (0, 0), 0)
    }
}
