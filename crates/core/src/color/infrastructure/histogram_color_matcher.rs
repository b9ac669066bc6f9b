//! Channel-wise histogram matching.
//!
//! Each channel of the frame is remapped so its cumulative distribution
//! follows the reference's: a frame value at quantile `q` becomes the
//! reference value at quantile `q`, interpolated between the reference's
//! occupied levels.

use crate::color::domain::color_matcher::ColorMatcher;
use crate::shared::frame::Frame;

const LEVELS: usize = 256;

pub struct HistogramColorMatcher;

impl HistogramColorMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HistogramColorMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorMatcher for HistogramColorMatcher {
    fn match_to(
        &self,
        frame: &Frame,
        reference: &Frame,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        if frame.channels() != reference.channels() {
            return Err(format!(
                "channel mismatch: frame has {}, reference has {}",
                frame.channels(),
                reference.channels()
            )
            .into());
        }

        let channels = frame.channels() as usize;
        let luts: Vec<[u8; LEVELS]> = (0..channels)
            .map(|c| {
                let source = histogram(frame.data(), channels, c);
                let template = histogram(reference.data(), channels, c);
                lookup_table(&source, &template)
            })
            .collect();

        let mut out = frame.clone();
        for (i, value) in out.data_mut().iter_mut().enumerate() {
            *value = luts[i % channels][*value as usize];
        }
        Ok(out)
    }
}

fn histogram(data: &[u8], channels: usize, channel: usize) -> [u64; LEVELS] {
    let mut hist = [0u64; LEVELS];
    for &v in data.iter().skip(channel).step_by(channels) {
        hist[v as usize] += 1;
    }
    hist
}

/// Occupied levels and their cumulative quantiles, in ascending order.
fn quantiles(hist: &[u64; LEVELS]) -> Vec<(f64, f64)> {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut cumulative = 0u64;
    hist.iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(level, &count)| {
            cumulative += count;
            (level as f64, cumulative as f64 / total as f64)
        })
        .collect()
}

fn lookup_table(source: &[u64; LEVELS], template: &[u64; LEVELS]) -> [u8; LEVELS] {
    let mut lut = [0u8; LEVELS];
    for (level, slot) in lut.iter_mut().enumerate() {
        *slot = level as u8;
    }

    let template_q = quantiles(template);
    if template_q.is_empty() {
        return lut;
    }
    for (level, q) in quantiles(source) {
        let mapped = interpolate(q, &template_q);
        // Truncates toward zero like an 8-bit cast
        lut[level as usize] = mapped.clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Piecewise-linear value at quantile `q`, clamped to the end points.
fn interpolate(q: f64, points: &[(f64, f64)]) -> f64 {
    let (first_level, first_q) = points[0];
    if q <= first_q {
        return first_level;
    }
    for pair in points.windows(2) {
        let (l0, q0) = pair[0];
        let (l1, q1) = pair[1];
        if q <= q1 {
            let t = if q1 > q0 { (q - q0) / (q1 - q0) } else { 0.0 };
            return l0 + t * (l1 - l0);
        }
    }
    points[points.len() - 1].0
}
