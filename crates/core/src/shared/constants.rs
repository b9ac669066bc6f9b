pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Extensions the sequencer picks up, matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Container formats converted to JPEG before scanning.
pub const HEIC_EXTENSIONS: &[&str] = &["heic", "heif"];

/// Output frames are `img0000.jpg`, `img0001.jpg`, ...
pub const OUTPUT_PREFIX: &str = "img";
pub const OUTPUT_EXTENSION: &str = "jpg";
pub const MIN_INDEX_WIDTH: usize = 4;

pub const DEFAULT_FRAME_SIZE: u32 = 256;
pub const DEFAULT_FPS: u32 = 24;

/// Extra canvas around the face so rotation doesn't clip it (full-frame policy).
pub const DEFAULT_MARGIN: f64 = 0.10;

/// Target eye layout as fractions of the canvas edge.
pub const LEFT_EYE_X: f64 = 0.35;
pub const RIGHT_EYE_X: f64 = 0.65;
pub const EYE_LINE_Y: f64 = 0.35;
