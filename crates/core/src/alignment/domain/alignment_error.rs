use thiserror::Error;

/// Reasons a detected face cannot be normalized into the canonical frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    #[error("eye landmarks coincide near ({x:.1}, {y:.1}), cannot derive scale")]
    DegenerateGeometry { x: f64, y: f64 },

    #[error("aligned image is {width}x{height}, smaller than the {size}x{size} crop")]
    InsufficientFrameSize { width: u32, height: u32, size: u32 },

    #[error("landmarks are missing a left or right eye")]
    MissingEyes,

    #[error("resampling failed: {0}")]
    Resample(String),
}
