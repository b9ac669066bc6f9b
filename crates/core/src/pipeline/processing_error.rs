use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::alignment::domain::alignment_error::AlignmentError;
use crate::pipeline::run_config::ConfigurationError;

/// Why a single source image produced no frame.
///
/// Local to one item: the run logs it and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("landmark detection failed for {}: {message}", path.display())]
    Detection { path: PathBuf, message: String },

    #[error("failed to align {}: {source}", path.display())]
    Alignment {
        path: PathBuf,
        #[source]
        source: AlignmentError,
    },

    #[error("color matching failed for {}: {message}", path.display())]
    ColorMatch { path: PathBuf, message: String },

    #[error("failed to label {}: {message}", path.display())]
    Label { path: PathBuf, message: String },

    #[error("failed to write frame for {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },
}

impl ProcessingError {
    /// Source image the failure belongs to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Decode { path, .. }
            | Self::Detection { path, .. }
            | Self::Alignment { path, .. }
            | Self::ColorMatch { path, .. }
            | Self::Label { path, .. }
            | Self::Encode { path, .. } => path,
        }
    }
}

/// Failures that end a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("failed to convert sources in {}: {message}", dir.display())]
    Conversion { dir: PathBuf, message: String },

    #[error("failed to scan {}: {source}", dir.display())]
    Scan {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load reference image {}: {message}", path.display())]
    Reference { path: PathBuf, message: String },

    #[error("no frames produced from {candidates} candidate image(s)")]
    NoFrames { candidates: usize },

    #[error("pipeline executor failed: {0}")]
    Executor(String),

    #[error("failed to encode video {}: {message}", path.display())]
    VideoEncode { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_file() {
        let err = ProcessingError::Decode {
            path: PathBuf::from("/in/IMG_0042.jpg"),
            message: "truncated".into(),
        };
        assert_eq!(err.to_string(), "failed to decode /in/IMG_0042.jpg: truncated");

        let err = ProcessingError::Alignment {
            path: PathBuf::from("/in/a.jpg"),
            source: AlignmentError::DegenerateGeometry { x: 1.0, y: 2.0 },
        };
        assert!(err.to_string().contains("/in/a.jpg"));
        assert!(err.to_string().contains("coincide"));
    }

    #[test]
    fn test_path_accessor_covers_every_variant() {
        let p = PathBuf::from("x.jpg");
        let errors = [
            ProcessingError::Decode { path: p.clone(), message: String::new() },
            ProcessingError::Detection { path: p.clone(), message: String::new() },
            ProcessingError::Alignment { path: p.clone(), source: AlignmentError::MissingEyes },
            ProcessingError::ColorMatch { path: p.clone(), message: String::new() },
            ProcessingError::Label { path: p.clone(), message: String::new() },
            ProcessingError::Encode { path: p.clone(), message: String::new() },
        ];
        for err in &errors {
            assert_eq!(err.path(), p.as_path());
        }
    }

    #[test]
    fn test_errors_are_send() {
        fn assert_send<T: Send + 'static>() {}
        assert_send::<ProcessingError>();
        assert_send::<PipelineError>();
    }

    #[test]
    fn test_configuration_error_converts() {
        let err: PipelineError = ConfigurationError::ZeroFps.into();
        assert!(matches!(err, PipelineError::Configuration(ConfigurationError::ZeroFps)));
    }
}
