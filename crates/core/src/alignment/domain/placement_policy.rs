use serde::{Deserialize, Serialize};

/// How a full-frame aligned image is reduced to the run's frame size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShaping {
    /// Exact `size × size` square cut from the center.
    #[default]
    CenterCrop,
    /// Scaled to `size` wide; height follows the source aspect ratio.
    ResizeToWidth,
}

/// Where the aligned face is placed. One policy per run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// Warp straight into a `size × size` canvas.
    #[default]
    DirectCanvas,
    /// Warp the whole photo at native resolution, then shape it.
    FullFrame {
        #[serde(default)]
        shaping: OutputShaping,
    },
}
