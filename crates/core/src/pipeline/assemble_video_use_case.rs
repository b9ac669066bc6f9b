use std::path::{Path, PathBuf};

use crate::alignment::domain::frame_resampler::FrameResampler;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::processing_error::PipelineError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes the numbered frames of a run into the output video:
/// read → (resize) → encode, in the order given.
pub struct AssembleVideoUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn VideoWriter>,
    resampler: Box<dyn FrameResampler>,
    logger: Box<dyn PipelineLogger>,
}

impl AssembleVideoUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn VideoWriter>,
        resampler: Box<dyn FrameResampler>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            writer,
            resampler,
            logger,
        }
    }

    /// Video dimensions come from the first frame. Later frames of a
    /// different size are resized to match rather than failing the run.
    pub fn execute(
        &mut self,
        frames: &[PathBuf],
        output: &Path,
        fps: u32,
    ) -> Result<VideoMetadata, PipelineError> {
        let encode_err = |message: String| PipelineError::VideoEncode {
            path: output.to_path_buf(),
            message,
        };

        let Some(first_path) = frames.first() else {
            return Err(PipelineError::NoFrames { candidates: 0 });
        };
        let first = self
            .reader
            .read(first_path)
            .map_err(|e| encode_err(format!("cannot read {}: {e}", first_path.display())))?;

        let metadata = VideoMetadata {
            width: first.width(),
            height: first.height(),
            fps,
            total_frames: frames.len(),
        };
        self.logger.info(&format!(
            "Assembling {} frame(s) into {} ({:.1}s at {} fps)",
            frames.len(),
            output.display(),
            metadata.duration_secs(),
            fps
        ));

        self.writer
            .open(output, &metadata)
            .map_err(|e| encode_err(e.to_string()))?;
        self.writer
            .write(&first)
            .map_err(|e| encode_err(e.to_string()))?;

        for (i, path) in frames.iter().enumerate().skip(1) {
            let mut frame = self
                .reader
                .read(path)
                .map_err(|e| encode_err(format!("cannot read {}: {e}", path.display())))?;

            if frame.width() != metadata.width || frame.height() != metadata.height {
                log::warn!(
                    "{} is {}x{}, resizing to {}x{}",
                    path.display(),
                    frame.width(),
                    frame.height(),
                    metadata.width,
                    metadata.height
                );
                frame = self
                    .resampler
                    .resize(&frame, metadata.width, metadata.height)
                    .map_err(|e| encode_err(e.to_string()))?;
            }

            self.writer
                .write(&frame)
                .map_err(|e| encode_err(e.to_string()))?;
            self.logger.progress(i + 1, frames.len());
        }

        self.writer.close().map_err(|e| encode_err(e.to_string()))?;
        log::info!("Video saved to {}", output.display());
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::infrastructure::imageproc_resampler::ImageprocResampler;
    use crate::pipeline::pipeline_executor::test_support::StubReader;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::frame::Frame;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        opened: Option<(PathBuf, VideoMetadata)>,
        frames: Vec<(u32, u32, u8)>,
        closed: bool,
    }

    struct RecordingWriter(Arc<Mutex<Recorded>>);

    impl VideoWriter for RecordingWriter {
        fn open(
            &mut self,
            path: &Path,
            metadata: &VideoMetadata,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.0.lock().unwrap().opened = Some((path.to_path_buf(), metadata.clone()));
            Ok(())
        }

        fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.0
                .lock()
                .unwrap()
                .frames
                .push((frame.width(), frame.height(), frame.data()[0]));
            Ok(())
        }

        fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            self.0.lock().unwrap().closed = true;
            Ok(())
        }
    }

    struct FailingWriter;

    impl VideoWriter for FailingWriter {
        fn open(&mut self, _: &Path, _: &VideoMetadata) -> Result<(), Box<dyn std::error::Error>> {
            Err("no encoder".into())
        }
        fn write(&mut self, _: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    fn solid(w: u32, h: u32, v: u8) -> Frame {
        Frame::new(vec![v; (w * h * 3) as usize], w, h, 3)
    }

    fn setup(frames: &[(&str, Frame)]) -> (Vec<PathBuf>, StubReader) {
        let mut map = HashMap::new();
        let mut paths = Vec::new();
        for (name, frame) in frames {
            let path = PathBuf::from(format!("/frames/{name}"));
            map.insert(path.clone(), frame.clone());
            paths.push(path);
        }
        (paths, StubReader { frames: map })
    }

    fn use_case(reader: StubReader, writer: Box<dyn VideoWriter>) -> AssembleVideoUseCase {
        AssembleVideoUseCase::new(
            Box::new(reader),
            writer,
            Box::new(ImageprocResampler::new()),
            Box::new(NullPipelineLogger),
        )
    }

    #[test]
    fn test_frames_are_encoded_in_order() {
        let (paths, reader) = setup(&[
            ("img0000.jpg", solid(32, 32, 10)),
            ("img0001.jpg", solid(32, 32, 20)),
            ("img0002.jpg", solid(32, 32, 30)),
        ]);
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut uc = use_case(reader, Box::new(RecordingWriter(recorded.clone())));

        let metadata = uc.execute(&paths, Path::new("/out/t.mp4"), 12).unwrap();

        assert_eq!(
            metadata,
            VideoMetadata {
                width: 32,
                height: 32,
                fps: 12,
                total_frames: 3
            }
        );
        let rec = recorded.lock().unwrap();
        assert_eq!(rec.opened.as_ref().unwrap().0, PathBuf::from("/out/t.mp4"));
        let values: Vec<u8> = rec.frames.iter().map(|f| f.2).collect();
        assert_eq!(values, [10, 20, 30]);
        assert!(rec.closed);
    }

    #[test]
    fn test_mismatched_frame_is_resized_to_first() {
        let (paths, reader) = setup(&[
            ("img0000.jpg", solid(32, 24, 50)),
            ("img0001.jpg", solid(64, 40, 50)),
        ]);
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut uc = use_case(reader, Box::new(RecordingWriter(recorded.clone())));

        uc.execute(&paths, Path::new("/out/t.mp4"), 24).unwrap();

        let rec = recorded.lock().unwrap();
        assert_eq!(rec.frames.len(), 2);
        assert_eq!((rec.frames[1].0, rec.frames[1].1), (32, 24));
    }

    #[test]
    fn test_no_frames_is_an_error() {
        let (_, reader) = setup(&[]);
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut uc = use_case(reader, Box::new(RecordingWriter(recorded.clone())));

        let result = uc.execute(&[], Path::new("/out/t.mp4"), 24);

        assert!(matches!(result, Err(PipelineError::NoFrames { candidates: 0 })));
        assert!(recorded.lock().unwrap().opened.is_none());
    }

    #[test]
    fn test_unreadable_frame_fails_the_encode() {
        let (mut paths, reader) = setup(&[("img0000.jpg", solid(16, 16, 0))]);
        paths.push(PathBuf::from("/frames/img0001.jpg"));
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut uc = use_case(reader, Box::new(RecordingWriter(recorded)));

        let result = uc.execute(&paths, Path::new("/out/t.mp4"), 24);

        match result {
            Err(PipelineError::VideoEncode { path, message }) => {
                assert_eq!(path, PathBuf::from("/out/t.mp4"));
                assert!(message.contains("img0001.jpg"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_encoder_open_failure_is_reported() {
        let (paths, reader) = setup(&[("img0000.jpg", solid(16, 16, 0))]);
        let mut uc = use_case(reader, Box::new(FailingWriter));
        assert!(matches!(
            uc.execute(&paths, Path::new("/out/t.mp4"), 24),
            Err(PipelineError::VideoEncode { .. })
        ));
    }
}
