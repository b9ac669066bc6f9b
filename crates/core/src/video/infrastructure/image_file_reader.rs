use std::collections::BTreeMap;
use std::path::Path;

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::frame::Frame;
use crate::video::domain::image_reader::ImageReader;

/// A decoded still image together with every metadata tag ffmpeg exposed
/// for it (decoded EXIF entries, stream tags, container tags).
pub struct DecodedImage {
    pub frame: Frame,
    pub tags: BTreeMap<String, String>,
}

/// Decodes still images (PNG, JPEG, HEIC where the linked ffmpeg supports
/// it) via ffmpeg, which is significantly faster than the pure-Rust
/// `image` crate for large camera photos.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        Ok(decode_image(path)?.frame)
    }
}

/// Decodes `path` to RGB and collects its metadata tags.
pub fn decode_image(path: &Path) -> Result<DecodedImage, Box<dyn std::error::Error>> {
    let (decoded, tags) = first_frame_with_tags(path)?;
    Ok(DecodedImage {
        frame: to_rgb_frame(&decoded)?,
        tags,
    })
}

/// Metadata tags of `path` without converting its pixels.
///
/// JPEG EXIF entries only surface on the decoded frame, so the first frame
/// is still decoded, but the RGB conversion and pixel copy are skipped.
pub fn read_tags(path: &Path) -> Result<BTreeMap<String, String>, Box<dyn std::error::Error>> {
    Ok(first_frame_with_tags(path)?.1)
}

fn first_frame_with_tags(
    path: &Path,
) -> Result<(Video, BTreeMap<String, String>), Box<dyn std::error::Error>> {
    ffmpeg_next::init()?;

    let mut ictx = ffmpeg_next::format::input(path)?;
    let mut tags = BTreeMap::new();
    collect_tags(&mut tags, ictx.metadata().iter());

    let stream = ictx
        .streams()
        .best(ffmpeg_next::media::Type::Video)
        .ok_or("No image data found")?;
    collect_tags(&mut tags, stream.metadata().iter());

    let stream_index = stream.index();
    let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
    let mut decoder = codec_ctx.decoder().video()?;

    let decoded = decode_first_frame(&mut ictx, &mut decoder, stream_index)?;
    // Decoder-level tags (EXIF) take precedence over container tags
    collect_tags(&mut tags, decoded.metadata().iter());
    Ok((decoded, tags))
}

fn collect_tags<'a>(
    tags: &mut BTreeMap<String, String>,
    entries: impl Iterator<Item = (&'a str, &'a str)>,
) {
    for (key, value) in entries {
        tags.insert(key.to_string(), value.to_string());
    }
}

fn decode_first_frame(
    ictx: &mut ffmpeg_next::format::context::Input,
    decoder: &mut ffmpeg_next::decoder::Video,
    stream_index: usize,
) -> Result<Video, Box<dyn std::error::Error>> {
    let mut decoded = Video::empty();
    for (stream, packet) in ictx.packets() {
        if stream.index() != stream_index {
            continue;
        }
        decoder.send_packet(&packet)?;
        if decoder.receive_frame(&mut decoded).is_ok() {
            return Ok(decoded);
        }
    }

    // Flush decoder for formats that buffer the single frame
    let _ = decoder.send_eof();
    if decoder.receive_frame(&mut decoded).is_ok() {
        Ok(decoded)
    } else {
        Err("Failed to decode image".into())
    }
}

fn to_rgb_frame(decoded: &Video) -> Result<Frame, Box<dyn std::error::Error>> {
    let (width, height) = (decoded.width(), decoded.height());
    let mut scaler = scaling::Context::get(
        decoded.format(),
        width,
        height,
        Pixel::RGB24,
        width,
        height,
        scaling::Flags::BILINEAR,
    )?;
    let mut rgb = Video::empty();
    scaler.run(decoded, &mut rgb)?;
    Ok(Frame::new(extract_rgb_pixels(&rgb, width, height), width, height, 3))
}

fn extract_rgb_pixels(rgb_frame: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
