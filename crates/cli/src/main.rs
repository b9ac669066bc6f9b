use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};

use facelapse_core::alignment::domain::placement_policy::{OutputShaping, PlacementPolicy};
use facelapse_core::alignment::infrastructure::imageproc_resampler::ImageprocResampler;
use facelapse_core::color::infrastructure::histogram_color_matcher::HistogramColorMatcher;
use facelapse_core::detection::domain::landmark_detector::LandmarkDetector;
use facelapse_core::detection::infrastructure::model_resolver::ModelResolver;
use facelapse_core::detection::infrastructure::onnx_yolo_landmark_detector::OnnxYoloLandmarkDetector;
use facelapse_core::labeling::infrastructure::text_label_compositor::TextLabelCompositor;
use facelapse_core::pipeline::assemble_video_use_case::AssembleVideoUseCase;
use facelapse_core::pipeline::build_timelapse_use_case::BuildTimelapseUseCase;
use facelapse_core::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
use facelapse_core::pipeline::pipeline_executor::{PipelineExecutor, SequentialPipelineExecutor};
use facelapse_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facelapse_core::pipeline::run_config::RunConfig;
use facelapse_core::sequencing::domain::sequencer::OrderingMode;
use facelapse_core::sequencing::infrastructure::ffmpeg_capture_date_reader::FfmpegCaptureDateReader;
use facelapse_core::shared::constants::{YOLO_MODEL_NAME, YOLO_MODEL_URL};
use facelapse_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use facelapse_core::video::infrastructure::heic_converter::HeicConverter;
use facelapse_core::video::infrastructure::image_file_reader::ImageFileReader;
use facelapse_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Progress is logged every this many images.
const PROGRESS_THROTTLE: usize = 10;

/// Builds a face-aligned time-lapse video from a folder of selfies.
#[derive(Parser, Debug)]
#[command(name = "facelapse")]
struct Cli {
    /// JSON run configuration used as the base; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Folder of source photos.
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Folder for the numbered aligned frames.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Path of the encoded video.
    #[arg(long)]
    output_video: Option<PathBuf>,

    /// Output frame edge length in pixels.
    #[arg(long)]
    frame_size: Option<u32>,

    /// Video frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Match every frame's colors to --reference-image.
    #[arg(long)]
    color_match: bool,

    /// Reference photo for color matching.
    #[arg(long)]
    reference_image: Option<PathBuf>,

    /// Frame order.
    #[arg(long, value_enum)]
    ordering: Option<Ordering>,

    /// Where the aligned face is placed.
    #[arg(long, value_enum)]
    placement: Option<Placement>,

    /// Extra canvas around the face for full-frame placement (fraction).
    #[arg(long)]
    margin: Option<f64>,

    /// Do not burn the capture month into frames.
    #[arg(long)]
    no_label: bool,

    /// TrueType/OpenType font for the date label.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Decode and detect the next images on a worker thread.
    #[arg(long)]
    threads: bool,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Landmark model file (skips the cache and download).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Only write frames; do not encode the video.
    #[arg(long)]
    no_video: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Ordering {
    Filename,
    CaptureDate,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Placement {
    /// Fixed size x size canvas around the face.
    DirectCanvas,
    /// Whole photo aligned, then the center square cut out.
    CenterCrop,
    /// Whole photo aligned, then scaled to the frame width.
    ResizeToWidth,
}

impl From<Ordering> for OrderingMode {
    fn from(o: Ordering) -> Self {
        match o {
            Ordering::Filename => OrderingMode::Filename,
            Ordering::CaptureDate => OrderingMode::CaptureDate,
        }
    }
}

impl From<Placement> for PlacementPolicy {
    fn from(p: Placement) -> Self {
        match p {
            Placement::DirectCanvas => PlacementPolicy::DirectCanvas,
            Placement::CenterCrop => PlacementPolicy::FullFrame {
                shaping: OutputShaping::CenterCrop,
            },
            Placement::ResizeToWidth => PlacementPolicy::FullFrame {
                shaping: OutputShaping::ResizeToWidth,
            },
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = match &cli.config {
        Some(path) => load_config(path)?,
        None => RunConfig::default(),
    };
    let config = apply_overrides(&cli, base);
    // Fail on bad settings before the model download.
    config.validate()?;

    let detector = build_detector(cli.model.clone(), config.confidence)?;
    let executor: Box<dyn PipelineExecutor> = if config.threads {
        Box::new(ThreadedPipelineExecutor::new())
    } else {
        Box::new(SequentialPipelineExecutor)
    };

    let mut build = BuildTimelapseUseCase::new(
        config.clone(),
        Box::new(HeicConverter::new(Box::new(ImageFileWriter::new()))),
        Box::new(FfmpegCaptureDateReader::new()),
        Box::new(ImageFileReader::new()),
        detector,
        Box::new(ImageprocResampler::new()),
        Box::new(HistogramColorMatcher::new()),
        Box::new(TextLabelCompositor::new(config.label.font.as_deref())),
        Box::new(ImageFileWriter::new()),
        executor,
        Box::new(StdoutPipelineLogger::new(PROGRESS_THROTTLE)),
    );
    let summary = build.execute()?;
    log::info!(
        "Frames written to {} ({})",
        config.output_dir.display(),
        summary.report()
    );

    if cli.no_video {
        return Ok(());
    }

    let mut assemble = AssembleVideoUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(FfmpegWriter::new()),
        Box::new(ImageprocResampler::new()),
        Box::new(StdoutPipelineLogger::new(PROGRESS_THROTTLE * 5)),
    );
    let metadata = assemble.execute(&summary.frame_paths(), &config.output_video, config.fps)?;
    log::info!(
        "Encoded {} frame(s), {}x{}, {:.1}s",
        metadata.total_frames,
        metadata.width,
        metadata.height,
        metadata.duration_secs()
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {e}", path.display()))?;
    let config = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid config {}: {e}", path.display()))?;
    Ok(config)
}

/// Explicit flags win over the config file; boolean switches only ever
/// turn their feature on (or, for `--no-label`, off).
fn apply_overrides(cli: &Cli, mut config: RunConfig) -> RunConfig {
    if let Some(dir) = &cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(path) = &cli.output_video {
        config.output_video = path.clone();
    }
    if let Some(size) = cli.frame_size {
        config.frame_size = size;
    }
    if let Some(fps) = cli.fps {
        config.fps = fps;
    }
    if cli.color_match {
        config.color_match = true;
    }
    if let Some(path) = &cli.reference_image {
        config.reference_image = Some(path.clone());
    }
    if let Some(ordering) = cli.ordering {
        config.ordering = ordering.into();
    }
    if let Some(placement) = cli.placement {
        config.placement = placement.into();
    }
    if let Some(margin) = cli.margin {
        config.margin = margin;
    }
    if cli.no_label {
        config.label.enabled = false;
    }
    if let Some(font) = &cli.font {
        config.label.font = Some(font.clone());
    }
    if cli.threads {
        config.threads = true;
    }
    if let Some(confidence) = cli.confidence {
        config.confidence = confidence;
    }
    config
}

fn build_detector(
    model: Option<PathBuf>,
    confidence: f64,
) -> Result<Box<dyn LandmarkDetector>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {YOLO_MODEL_NAME}");
    let resolver = ModelResolver::new(model)?;
    let model_path = resolver.resolve(
        YOLO_MODEL_NAME,
        YOLO_MODEL_URL,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    Ok(Box::new(OnnxYoloLandmarkDetector::new(
        &model_path,
        confidence,
    )?))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face landmark model... {pct}%");
    } else {
        eprint!("\rDownloading face landmark model... {downloaded} bytes");
    }
}
