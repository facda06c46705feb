//! Per-channel range thresholding

use crate::error::VisionError;
use opencv::{
    core::{self, Mat, Scalar},
    prelude::*,
};
use tracing::debug;

/// Inclusive per-channel bounds for three channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelRange {
    pub low: [f64; 3],
    pub high: [f64; 3],
}

impl ChannelRange {
    /// Split six bounds in source order: three lows, then three highs.
    pub fn from_bounds(bounds: [f64; 6]) -> Self {
        Self {
            low: [bounds[0], bounds[1], bounds[2]],
            high: [bounds[3], bounds[4], bounds[5]],
        }
    }

    pub fn contains(&self, pixel: [f64; 3]) -> bool {
        (0..3).all(|c| self.low[c] <= pixel[c] && pixel[c] <= self.high[c])
    }
}

/// Single-channel mask: 255 where every channel lies within its bounds, 0
/// elsewhere. Same spatial size as `src`.
pub fn threshold_range(src: &Mat, range: &ChannelRange) -> Result<Mat, VisionError> {
    let lower = Scalar::new(range.low[0], range.low[1], range.low[2], 0.0);
    let upper = Scalar::new(range.high[0], range.high[1], range.high[2], 0.0);
    let mut mask = Mat::default();
    core::in_range(src, &lower, &upper, &mut mask)?;
    debug!(
        "Thresholded {}x{} buffer, {} pixel(s) in range",
        mask.cols(),
        mask.rows(),
        core::count_non_zero(&mask)?
    );
    Ok(mask)
}
