use crate::shared::frame::Frame;

/// Domain interface for burning a text label into a frame.
pub trait LabelCompositor: Send {
    fn compose(&self, frame: &mut Frame, text: &str) -> Result<(), Box<dyn std::error::Error>>;
}
