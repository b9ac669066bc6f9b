use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

use super::builtin_font::BitmapFont;
use crate::labeling::domain::label_compositor::LabelCompositor;
use crate::shared::frame::Frame;

/// Distance from the left and bottom edges to the label, in pixels.
pub const LABEL_INSET: i32 = 10;
/// Label height as a fraction of the frame height.
const LABEL_HEIGHT_RATIO: f32 = 1.0 / 16.0;
const MIN_LABEL_PX: f32 = 8.0;

const OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);
const FILL: Rgb<u8> = Rgb([255, 255, 255]);
const OUTLINE_OFFSETS: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

enum LabelFont {
    Outline(FontVec),
    Bitmap,
}

/// Draws outlined light-on-dark text at the bottom-left of a frame.
///
/// Uses the configured TrueType/OpenType font when it loads, and the
/// built-in bitmap font otherwise.
pub struct TextLabelCompositor {
    font: LabelFont,
}

impl TextLabelCompositor {
    pub fn new(font_path: Option<&Path>) -> Self {
        let font = match font_path {
            Some(path) => match load_font(path) {
                Ok(font) => LabelFont::Outline(font),
                Err(e) => {
                    log::warn!(
                        "Could not load label font {}: {e}. Using built-in font.",
                        path.display()
                    );
                    LabelFont::Bitmap
                }
            },
            None => LabelFont::Bitmap,
        };
        Self { font }
    }

    pub fn builtin() -> Self {
        Self {
            font: LabelFont::Bitmap,
        }
    }

    #[cfg(test)]
    pub fn uses_builtin_font(&self) -> bool {
        matches!(self.font, LabelFont::Bitmap)
    }

    fn draw(&self, img: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, px: f32, text: &str) {
        match &self.font {
            LabelFont::Outline(font) => draw_text_mut(img, color, x, y, PxScale::from(px), font, text),
            LabelFont::Bitmap => BitmapFont::for_height(px).draw(img, color, x, y, text),
        }
    }

    fn measure(&self, px: f32, text: &str) -> (u32, u32) {
        match &self.font {
            LabelFont::Outline(font) => text_size(PxScale::from(px), font, text),
            LabelFont::Bitmap => BitmapFont::for_height(px).text_size(text),
        }
    }
}

fn load_font(path: &Path) -> Result<FontVec, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    Ok(FontVec::try_from_vec(bytes)?)
}

impl LabelCompositor for TextLabelCompositor {
    fn compose(&self, frame: &mut Frame, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut img = frame
            .to_rgb_image()
            .ok_or_else(|| format!("cannot label a {}-channel frame", frame.channels()))?;

        let px = (img.height() as f32 * LABEL_HEIGHT_RATIO).max(MIN_LABEL_PX);
        let (_, text_height) = self.measure(px, text);
        let x = LABEL_INSET;
        let y = img.height() as i32 - LABEL_INSET - text_height as i32;

        for (dx, dy) in OUTLINE_OFFSETS {
            self.draw(&mut img, OUTLINE, x + dx, y + dy, px, text);
        }
        self.draw(&mut img, FILL, x, y, px, text);

        *frame = Frame::from_rgb_image(img);
        Ok(())
    }
}
