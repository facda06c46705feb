//! Configuration for iris-eye

use opencv::core::Scalar;
use opencv::videoio;
use serde::{Deserialize, Serialize};

/// Native capture backend preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureBackend {
    /// Let OpenCV pick
    Any,
    V4l2,
    Ffmpeg,
    Gstreamer,
}

impl CaptureBackend {
    pub fn api_preference(self) -> i32 {
        match self {
            CaptureBackend::Any => videoio::CAP_ANY,
            CaptureBackend::V4l2 => videoio::CAP_V4L2,
            CaptureBackend::Ffmpeg => videoio::CAP_FFMPEG,
            CaptureBackend::Gstreamer => videoio::CAP_GSTREAMER,
        }
    }
}

/// Vision form configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Contours with fewer boundary points are skipped
    pub min_contour_points: usize,
    /// Polygon approximation tolerance as a fraction of the contour perimeter
    pub approx_epsilon_factor: f64,
    /// Approximated polygons with more vertices are skipped
    pub max_polygon_vertices: usize,
    /// Line thickness in pixels for both outlines
    pub outline_thickness: i32,
    /// Axis-aligned bounding box color (BGR)
    pub bounding_box_color: [u8; 3],
    /// Rotated bounding rectangle color (BGR)
    pub rotated_box_color: [u8; 3],
    /// Event-loop pump after each display, in milliseconds
    pub display_wait_ms: i32,
    /// Capture backend
    pub capture_backend: CaptureBackend,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            min_contour_points: 150,
            approx_epsilon_factor: 0.02,
            max_polygon_vertices: 4,
            outline_thickness: 2,
            bounding_box_color: [0, 255, 0],
            rotated_box_color: [255, 0, 0],
            display_wait_ms: 1,
            capture_backend: CaptureBackend::Any,
        }
    }
}

impl VisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_contour_points == 0 {
            return Err("min_contour_points must be at least 1".to_string());
        }

        if !(self.approx_epsilon_factor > 0.0 && self.approx_epsilon_factor <= 1.0) {
            return Err("approx_epsilon_factor must be in (0, 1]".to_string());
        }

        if self.max_polygon_vertices < 3 {
            return Err("max_polygon_vertices must be at least 3".to_string());
        }

        if self.outline_thickness < 1 || self.outline_thickness > 50 {
            return Err("outline_thickness must be between 1 and 50".to_string());
        }

        // wait_key(0) blocks until a key press
        if self.display_wait_ms < 1 || self.display_wait_ms > 1000 {
            return Err("display_wait_ms must be between 1 and 1000".to_string());
        }

        Ok(())
    }

    pub(crate) fn bounding_box_scalar(&self) -> Scalar {
        bgr_scalar(self.bounding_box_color)
    }

    pub(crate) fn rotated_box_scalar(&self) -> Scalar {
        bgr_scalar(self.rotated_box_color)
    }
}

fn bgr_scalar([b, g, r]: [u8; 3]) -> Scalar {
    Scalar::new(b as f64, g as f64, r as f64, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = VisionConfig::default();
        assert_eq!(config.min_contour_points, 150);
        assert_eq!(config.approx_epsilon_factor, 0.02);
        assert_eq!(config.max_polygon_vertices, 4);
        assert_eq!(config.outline_thickness, 2);
        assert_eq!(config.bounding_box_color, [0, 255, 0]);
        assert_eq!(config.rotated_box_color, [255, 0, 0]);
        assert_eq!(config.capture_backend, CaptureBackend::Any);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_wait() {
        let mut config = VisionConfig::default();
        config.display_wait_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_epsilon() {
        let mut config = VisionConfig::default();
        config.approx_epsilon_factor = 0.0;
        assert!(config.validate().is_err());
        config.approx_epsilon_factor = f64::NAN;
        assert!(config.validate().is_err());
        config.approx_epsilon_factor = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_vertices() {
        let mut config = VisionConfig::default();
        config.max_polygon_vertices = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_thickness() {
        let mut config = VisionConfig::default();
        config.outline_thickness = 0;
        assert!(config.validate().is_err());
        config.outline_thickness = 51;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_colors_as_scalars() {
        let config = VisionConfig::default();
        let green = config.bounding_box_scalar();
        assert_eq!(green.0, [0.0, 255.0, 0.0, 0.0]);
        let blue = config.rotated_box_scalar();
        assert_eq!(blue.0, [255.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: VisionConfig =
            serde_json::from_str(r#"{"min_contour_points": 60, "capture_backend": "v4l2"}"#).unwrap();
        assert_eq!(config.min_contour_points, 60);
        assert_eq!(config.capture_backend, CaptureBackend::V4l2);
        assert_eq!(config.max_polygon_vertices, 4);
    }

    #[test]
    fn test_backend_api_preference() {
        assert_eq!(CaptureBackend::Any.api_preference(), videoio::CAP_ANY);
        assert_ne!(CaptureBackend::Ffmpeg.api_preference(), videoio::CAP_ANY);
    }
}
