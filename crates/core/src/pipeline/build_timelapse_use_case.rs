use std::path::Path;
use std::time::Instant;

use crate::alignment::domain::frame_normalizer::FrameNormalizer;
use crate::alignment::domain::frame_resampler::FrameResampler;
use crate::color::domain::color_matcher::ColorMatcher;
use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::detection::domain::landmark_set::LandmarkSet;
use crate::labeling::domain::label_compositor::LabelCompositor;
use crate::pipeline::pipeline_executor::{elapsed_ms, PipelineExecutor, PreparedItem};
use crate::pipeline::pipeline_logger::{metric, stage, PipelineLogger};
use crate::pipeline::processing_error::{PipelineError, ProcessingError};
use crate::pipeline::run_config::RunConfig;
use crate::pipeline::run_summary::RunSummary;
use crate::sequencing::domain::capture_date_source::{resolve_capture_date, CaptureDateSource};
use crate::sequencing::domain::sequencer::{order, OrderingMode, OutputIndexer, SourceItem};
use crate::sequencing::infrastructure::directory_scanner::scan_images;
use crate::shared::frame::Frame;
use crate::video::domain::format_converter::FormatConverter;
use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::image_writer::ImageWriter;

/// Turns a folder of photos into numbered, face-aligned frames.
///
/// Run states: validate → convert → sequence → per item
/// (decode → detect → align → color → label → write). Per-item failures are
/// recorded in the [`RunSummary`]; only run-level problems return `Err`.
pub struct BuildTimelapseUseCase {
    config: RunConfig,
    converter: Box<dyn FormatConverter>,
    date_source: Box<dyn CaptureDateSource>,
    reader: Box<dyn ImageReader>,
    detector: Box<dyn LandmarkDetector>,
    normalizer: FrameNormalizer,
    color_matcher: Box<dyn ColorMatcher>,
    labeler: Box<dyn LabelCompositor>,
    writer: Box<dyn ImageWriter>,
    executor: Box<dyn PipelineExecutor>,
    logger: Box<dyn PipelineLogger>,
}

impl BuildTimelapseUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RunConfig,
        converter: Box<dyn FormatConverter>,
        date_source: Box<dyn CaptureDateSource>,
        reader: Box<dyn ImageReader>,
        detector: Box<dyn LandmarkDetector>,
        resampler: Box<dyn FrameResampler>,
        color_matcher: Box<dyn ColorMatcher>,
        labeler: Box<dyn LabelCompositor>,
        writer: Box<dyn ImageWriter>,
        executor: Box<dyn PipelineExecutor>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        let normalizer =
            FrameNormalizer::new(resampler, config.placement, config.frame_size, config.margin);
        Self {
            config,
            converter,
            date_source,
            reader,
            detector,
            normalizer,
            color_matcher,
            labeler,
            writer,
            executor,
            logger,
        }
    }

    pub fn execute(&mut self) -> Result<RunSummary, PipelineError> {
        self.config.validate()?;
        let input_dir = self.config.input_dir.clone();

        // Converting
        let report = self
            .converter
            .convert_directory(&input_dir)
            .map_err(|e| PipelineError::Conversion {
                dir: input_dir.clone(),
                message: e.to_string(),
            })?;
        if !report.converted.is_empty() || !report.failed.is_empty() {
            self.logger.info(&format!(
                "Converted {} HEIC file(s), {} failed",
                report.converted.len(),
                report.failed.len()
            ));
        }

        // Sequencing
        let items = self.sequence(&input_dir)?;
        self.logger.info(&format!(
            "Found {} candidate image(s) in {}",
            items.len(),
            input_dir.display()
        ));

        let reference = self.load_reference()?;

        let finisher = FrameFinisher {
            normalizer: &self.normalizer,
            color: reference
                .as_ref()
                .map(|r| (self.color_matcher.as_ref(), r)),
            labeler: self
                .config
                .label
                .enabled
                .then_some(self.labeler.as_ref()),
            writer: self.writer.as_ref(),
        };
        let mut indexer = OutputIndexer::new(&self.config.output_dir, items.len());
        let mut summary = RunSummary::new(items.len());
        let logger = self.logger.as_mut();
        let total = items.len();
        let mut handled = 0;

        let mut consume = |prepared: PreparedItem| {
            handled += 1;
            logger.timing(stage::DECODE, prepared.decode_ms);
            if prepared.outcome.is_ok() {
                logger.timing(stage::DETECT, prepared.detect_ms);
            }
            if let Some(depth) = prepared.queued {
                logger.metric(metric::PREFETCH_DEPTH, depth as f64);
            }

            let item = prepared.item;
            match prepared.outcome {
                Err(e) => {
                    log::error!("{e}");
                    summary.failed.push(e);
                }
                Ok((_, None)) => {
                    log::warn!("No face detected in {}. Skipping.", item.file_name());
                    summary.skipped_no_face.push(item.path);
                }
                Ok((frame, Some(landmarks))) => {
                    let output = indexer.peek_path();
                    match finisher.finish(&item, &frame, &landmarks, &output, &mut *logger) {
                        Ok(()) => {
                            let sequenced = indexer.commit(&item);
                            log::info!(
                                "Processed {} -> {}",
                                item.file_name(),
                                sequenced.output.display()
                            );
                            summary.written.push(sequenced);
                        }
                        Err(e) => {
                            log::error!("{e}");
                            summary.failed.push(e);
                        }
                    }
                }
            }
            logger.progress(handled, total);
        };

        self.executor
            .execute(
                &items,
                self.reader.as_mut(),
                self.detector.as_mut(),
                &mut consume,
            )
            .map_err(|e| PipelineError::Executor(e.to_string()))?;

        self.logger.summary();
        log::info!("{}", summary.report());

        if summary.written.is_empty() {
            return Err(PipelineError::NoFrames {
                candidates: summary.candidates,
            });
        }
        Ok(summary)
    }

    fn sequence(&self, input_dir: &Path) -> Result<Vec<SourceItem>, PipelineError> {
        let paths = scan_images(input_dir).map_err(|source| PipelineError::Scan {
            dir: input_dir.to_path_buf(),
            source,
        })?;

        let needs_dates =
            self.config.ordering == OrderingMode::CaptureDate || self.config.label.enabled;
        let items = paths
            .into_iter()
            .map(|path| {
                let date = if needs_dates {
                    resolve_capture_date(self.date_source.as_ref(), &path)
                } else {
                    None
                };
                SourceItem::new(path, date)
            })
            .collect();
        Ok(order(items, self.config.ordering))
    }

    /// Decodes the reference once, and only when color matching is on.
    fn load_reference(&self) -> Result<Option<Frame>, PipelineError> {
        if !self.config.color_match {
            return Ok(None);
        }
        let Some(path) = &self.config.reference_image else {
            return Ok(None);
        };
        self.reader
            .read(path)
            .map(Some)
            .map_err(|e| PipelineError::Reference {
                path: path.clone(),
                message: e.to_string(),
            })
    }
}

/// Back half of the per-item pipeline: align → color → label → write.
struct FrameFinisher<'a> {
    normalizer: &'a FrameNormalizer,
    color: Option<(&'a dyn ColorMatcher, &'a Frame)>,
    labeler: Option<&'a dyn LabelCompositor>,
    writer: &'a dyn ImageWriter,
}

impl FrameFinisher<'_> {
    fn finish(
        &self,
        item: &SourceItem,
        frame: &Frame,
        landmarks: &LandmarkSet,
        output: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), ProcessingError> {
        let path = || item.path.clone();

        let t = Instant::now();
        let mut aligned = self
            .normalizer
            .normalize(frame, landmarks)
            .map_err(|source| ProcessingError::Alignment {
                path: path(),
                source,
            })?;
        logger.timing(stage::ALIGN, elapsed_ms(t));

        if let Some((matcher, reference)) = self.color {
            let t = Instant::now();
            aligned = matcher
                .match_to(&aligned, reference)
                .map_err(|e| ProcessingError::ColorMatch {
                    path: path(),
                    message: e.to_string(),
                })?;
            logger.timing(stage::COLOR, elapsed_ms(t));
        }

        if let Some(labeler) = self.labeler {
            match item.capture_date {
                Some(date) => {
                    let t = Instant::now();
                    labeler
                        .compose(&mut aligned, &date.period_label())
                        .map_err(|e| ProcessingError::Label {
                            path: path(),
                            message: e.to_string(),
                        })?;
                    logger.timing(stage::LABEL, elapsed_ms(t));
                }
                None => log::warn!("No capture date for {}, frame left unlabeled", item.file_name()),
            }
        }

        let t = Instant::now();
        self.writer
            .write(output, &aligned)
            .map_err(|e| ProcessingError::Encode {
                path: path(),
                message: e.to_string(),
            })?;
        logger.timing(stage::WRITE, elapsed_ms(t));
        Ok(())
    }
}
