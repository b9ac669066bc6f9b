/// Shape of the time-lapse video being encoded.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub total_frames: usize,
}

impl VideoMetadata {
    /// Dimensions rounded down to even values, as YUV 4:2:0 requires.
    pub fn encoded_dimensions(&self) -> (u32, u32) {
        ((self.width & !1).max(2), (self.height & !1).max(2))
    }

    pub fn duration_secs(&self) -> f64 {
        if self.fps == 0 {
            return 0.0;
        }
        self.total_frames as f64 / self.fps as f64
    }
}
