//! Color-space conversion

use crate::error::VisionError;
use opencv::{core::Mat, imgproc};
use tracing::debug;

/// Supported color-space conversions.
///
/// New conversions are added here; anything not listed is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorConversion {
    BgrToHsv,
    HsvToBgr,
    BgrToGray,
}

impl ColorConversion {
    pub const ALL: &'static [ColorConversion] = &[
        ColorConversion::BgrToHsv,
        ColorConversion::HsvToBgr,
        ColorConversion::BgrToGray,
    ];

    fn tokens(self) -> &'static [&'static str] {
        match self {
            ColorConversion::BgrToHsv => &["bgr2hsv", "cv2.color_bgr2hsv"],
            ColorConversion::HsvToBgr => &["hsv2bgr", "cv2.color_hsv2bgr"],
            ColorConversion::BgrToGray => &["bgr2gray", "cv2.color_bgr2gray"],
        }
    }

    pub fn parse(token: &str) -> Result<Self, VisionError> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.tokens().iter().any(|t| t.eq_ignore_ascii_case(token)))
            .ok_or_else(|| VisionError::UnsupportedConversion(token.to_string()))
    }

    pub fn token(self) -> &'static str {
        self.tokens()[0]
    }

    fn code(self) -> i32 {
        match self {
            ColorConversion::BgrToHsv => imgproc::COLOR_BGR2HSV,
            ColorConversion::HsvToBgr => imgproc::COLOR_HSV2BGR,
            ColorConversion::BgrToGray => imgproc::COLOR_BGR2GRAY,
        }
    }
}

/// Convert `src` into a freshly allocated buffer.
pub fn convert_color(src: &Mat, conversion: ColorConversion) -> Result<Mat, VisionError> {
    let mut dst = Mat::default();
    imgproc::cvt_color(src, &mut dst, conversion.code(), 0)?;
    debug!("Converted buffer with {}", conversion.token());
    Ok(dst)
}
