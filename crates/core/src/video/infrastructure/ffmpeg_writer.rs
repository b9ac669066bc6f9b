use std::path::Path;

use ffmpeg_next::codec::{self, encoder};
use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;
use ffmpeg_next::{Dictionary, Packet, Rational};

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Codecs tried in order; the first one that opens wins.
const CODEC_PREFERENCE: [codec::Id; 2] = [codec::Id::H264, codec::Id::MPEG4];
const H264_CRF: &str = "20";
/// Target bitrate for the MPEG-4 fallback, in bits per pixel per frame.
const MPEG4_BITS_PER_PIXEL: f64 = 0.4;

/// Encodes RGB frames into an H.264 (or MPEG-4 Part 2) video via ffmpeg-next.
///
/// Frames are converted to YUV420P and scaled to even dimensions on the way
/// in, so odd-sized canvases encode without error.
pub struct FfmpegWriter {
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<encoder::video::Encoder>,
    scaler: Option<scaling::Context>,
    width: u32,
    height: u32,
    time_base: Rational,
    frame_count: usize,
    codec_name: String,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            time_base: Rational(1, 1),
            frame_count: 0,
            codec_name: String::new(),
        }
    }

    /// Name of the encoder chosen by the last `open`.
    #[cfg(test)]
    pub fn codec_name(&self) -> &str {
        &self.codec_name
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn open_encoder(
    id: codec::Id,
    width: u32,
    height: u32,
    fps: i32,
    global_header: bool,
) -> Result<(codec::Codec, encoder::video::Encoder), Box<dyn std::error::Error>> {
    let found = encoder::find(id).ok_or_else(|| format!("{id:?} encoder not found"))?;

    let mut ctx = codec::context::Context::new_with_codec(found)
        .encoder()
        .video()?;
    ctx.set_width(width);
    ctx.set_height(height);
    ctx.set_format(Pixel::YUV420P);
    ctx.set_time_base(Rational(1, fps));
    ctx.set_frame_rate(Some(Rational(fps, 1)));
    if global_header {
        ctx.set_flags(codec::Flags::GLOBAL_HEADER);
    }

    let mut options = Dictionary::new();
    if id == codec::Id::H264 {
        options.set("crf", H264_CRF);
    } else {
        let bits = width as f64 * height as f64 * fps as f64 * MPEG4_BITS_PER_PIXEL;
        ctx.set_bit_rate(bits as usize);
    }

    let opened = ctx.open_with(options)?;
    Ok((found, opened))
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        if metadata.fps == 0 {
            return Err("frame rate must be positive".into());
        }
        let fps = i32::try_from(metadata.fps)?;
        let (enc_width, enc_height) = metadata.encoded_dimensions();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut octx = ffmpeg_next::format::output(path)?;
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let mut last_err: Option<Box<dyn std::error::Error>> = None;
        let mut chosen = None;
        for id in CODEC_PREFERENCE {
            match open_encoder(id, enc_width, enc_height, fps, global_header) {
                Ok(pair) => {
                    chosen = Some(pair);
                    break;
                }
                Err(e) => {
                    log::debug!("Encoder {id:?} unavailable: {e}");
                    last_err = Some(e);
                }
            }
        }
        let (codec, encoder) = match chosen {
            Some(pair) => pair,
            None => return Err(last_err.unwrap_or_else(|| "no video encoder available".into())),
        };

        let mut ost = octx.add_stream(Some(codec))?;
        ost.set_parameters(&encoder);
        octx.write_header()?;

        let scaler = scaling::Context::get(
            Pixel::RGB24,
            metadata.width,
            metadata.height,
            Pixel::YUV420P,
            enc_width,
            enc_height,
            scaling::Flags::BICUBIC,
        )?;

        self.codec_name = codec.name().to_string();
        log::info!(
            "Encoding {}x{} @ {} fps with {}",
            enc_width,
            enc_height,
            metadata.fps,
            self.codec_name
        );

        self.width = metadata.width;
        self.height = metadata.height;
        self.time_base = Rational(1, fps);
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(scaler), Some(octx)) =
            (self.encoder.as_mut(), self.scaler.as_mut(), self.octx.as_mut())
        else {
            return Err("FfmpegWriter: not opened".into());
        };
        if frame.width() != self.width || frame.height() != self.height || frame.channels() != 3 {
            return Err(format!(
                "frame is {}x{}x{}, writer expects {}x{}x3",
                frame.width(),
                frame.height(),
                frame.channels(),
                self.width,
                self.height
            )
            .into());
        }

        let mut rgb_frame = Video::new(Pixel::RGB24, self.width, self.height);
        let stride = rgb_frame.stride(0);
        let row_len = self.width as usize * 3;
        let dst = rgb_frame.data_mut(0);
        for (row, src) in frame.data().chunks_exact(row_len).enumerate() {
            dst[row * stride..row * stride + row_len].copy_from_slice(src);
        }

        let mut yuv_frame = Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&yuv_frame)?;
        drain_packets(encoder, octx, self.time_base)?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) {
            encoder.send_eof()?;
            drain_packets(encoder, octx, self.time_base)?;
            octx.write_trailer()?;
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;
        Ok(())
    }
}

fn drain_packets(
    encoder: &mut encoder::video::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    time_base: Rational,
) -> Result<(), Box<dyn std::error::Error>> {
    let ost_time_base = octx
        .stream(0)
        .ok_or("output has no video stream")?
        .time_base();

    let mut encoded = Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(0);
        encoded.rescale_ts(time_base, ost_time_base);
        encoded.write_interleaved(octx)?;
    }
    Ok(())
}
