//! Run configuration shared by the CLI and library callers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alignment::domain::placement_policy::PlacementPolicy;
use crate::sequencing::domain::sequencer::OrderingMode;
use crate::shared::constants::{DEFAULT_FPS, DEFAULT_FRAME_SIZE, DEFAULT_MARGIN};

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("color matching is enabled but no reference image was given")]
    MissingReferenceImage,
    #[error("frame size must be positive")]
    ZeroFrameSize,
    #[error("frame rate must be positive")]
    ZeroFps,
    #[error("margin must be a finite, non-negative fraction (got {0})")]
    InvalidMargin(f64),
    #[error("confidence must be within [0, 1] (got {0})")]
    InvalidConfidence(f64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub enabled: bool,
    /// TrueType/OpenType font; the built-in bitmap font is used when unset
    /// or unreadable.
    pub font: Option<PathBuf>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            font: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub output_video: PathBuf,
    /// Edge of the square canvas, or output width under resize-to-width.
    pub frame_size: u32,
    pub fps: u32,
    pub color_match: bool,
    pub reference_image: Option<PathBuf>,
    pub ordering: OrderingMode,
    pub placement: PlacementPolicy,
    pub label: LabelConfig,
    /// Extra canvas fraction around the face under full-frame placement.
    pub margin: f64,
    /// Decode and detect the next images on a worker thread.
    pub threads: bool,
    pub confidence: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("images/processed"),
            output_video: PathBuf::from("output/timelapse.mp4"),
            frame_size: DEFAULT_FRAME_SIZE,
            fps: DEFAULT_FPS,
            color_match: false,
            reference_image: None,
            ordering: OrderingMode::default(),
            placement: PlacementPolicy::default(),
            label: LabelConfig::default(),
            margin: DEFAULT_MARGIN,
            threads: false,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl RunConfig {
    /// Checks preconditions that must hold before any file is touched.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.color_match && self.reference_image.is_none() {
            return Err(ConfigurationError::MissingReferenceImage);
        }
        if self.frame_size == 0 {
            return Err(ConfigurationError::ZeroFrameSize);
        }
        if self.fps == 0 {
            return Err(ConfigurationError::ZeroFps);
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(ConfigurationError::InvalidMargin(self.margin));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigurationError::InvalidConfidence(self.confidence));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::domain::placement_policy::OutputShaping;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.frame_size, 256);
        assert_eq!(config.fps, 24);
        assert!(!config.color_match);
        assert!(config.label.enabled);
        assert_eq!(config.ordering, OrderingMode::Filename);
        assert_eq!(config.placement, PlacementPolicy::DirectCanvas);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_color_match_requires_reference() {
        let config = RunConfig {
            color_match: true,
            ..RunConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::MissingReferenceImage)
        );

        let config = RunConfig {
            reference_image: Some(PathBuf::from("ref.jpg")),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reference_without_color_match_is_fine() {
        let config = RunConfig {
            reference_image: Some(PathBuf::from("ref.jpg")),
            ..RunConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::zero_size(RunConfig { frame_size: 0, ..RunConfig::default() }, ConfigurationError::ZeroFrameSize)]
    #[case::zero_fps(RunConfig { fps: 0, ..RunConfig::default() }, ConfigurationError::ZeroFps)]
    #[case::negative_margin(RunConfig { margin: -0.1, ..RunConfig::default() }, ConfigurationError::InvalidMargin(-0.1))]
    #[case::confidence(RunConfig { confidence: 1.5, ..RunConfig::default() }, ConfigurationError::InvalidConfidence(1.5))]
    fn test_invalid_values(#[case] config: RunConfig, #[case] expected: ConfigurationError) {
        assert_eq!(config.validate(), Err(expected));
    }

    #[test]
    fn test_nan_margin_is_rejected() {
        let config = RunConfig {
            margin: f64::NAN,
            ..RunConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidMargin(_))
        ));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "input_dir": "selfies",
            "ordering": "capture_date",
            "placement": { "kind": "full_frame", "shaping": "resize_to_width" },
            "label": { "font": "fonts/Playfair.ttf" }
        }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("selfies"));
        assert_eq!(config.ordering, OrderingMode::CaptureDate);
        assert_eq!(
            config.placement,
            PlacementPolicy::FullFrame {
                shaping: OutputShaping::ResizeToWidth
            }
        );
        assert!(config.label.enabled);
        assert_eq!(config.label.font, Some(PathBuf::from("fonts/Playfair.ttf")));
        assert_eq!(config.frame_size, 256);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = RunConfig {
            color_match: true,
            reference_image: Some(PathBuf::from("ref.png")),
            threads: true,
            ..RunConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
