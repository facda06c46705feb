//! Error types for iris-eye

use thiserror::Error;
use iris_core::Error as CoreError;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Arity error in {form}: expected {expected} argument(s), got {actual}")]
    Arity {
        form: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Type error in {form}: argument {position} should be {expected}, got {actual}")]
    Type {
        form: &'static str,
        position: usize,
        expected: &'static str,
        actual: String,
    },

    #[error("Unsupported color conversion: {0}")]
    UnsupportedConversion(String),

    #[error("Unrecognized capture property: {0}")]
    UnrecognizedProperty(String),

    #[error("Method not found: {kind} has no method '{method}'")]
    MethodNotFound { kind: &'static str, method: String },

    #[error("Failed to open capture {resource}: {reason}")]
    ResourceOpen { resource: String, reason: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("OpenCV error: {0}")]
    OpenCv(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Host(#[from] CoreError),
}

impl VisionError {
    /// Recover a vision error that travelled through the host evaluator.
    pub fn from_host(err: &CoreError) -> Option<&VisionError> {
        err.extension::<VisionError>()
    }
}

impl From<VisionError> for CoreError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Host(inner) => inner,
            other => CoreError::Extension(Box::new(other)),
        }
    }
}

impl From<opencv::Error> for VisionError {
    fn from(err: opencv::Error) -> Self {
        VisionError::OpenCv(err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_found_display() {
        let err = VisionError::MethodNotFound {
            kind: "capture",
            method: "rewind".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("capture"));
        assert!(msg.contains("rewind"));
    }

    #[test]
    fn test_round_trip_through_host() {
        let err = VisionError::UnrecognizedProperty("exposure".to_string());
        let core_err: CoreError = err.into();
        match VisionError::from_host(&core_err) {
            Some(VisionError::UnrecognizedProperty(name)) => assert_eq!(name, "exposure"),
            other => panic!("Expected UnrecognizedProperty, got {:?}", other),
        }
    }

    #[test]
    fn test_host_error_not_double_wrapped() {
        let vision_err: VisionError = CoreError::Unbound("frame".to_string()).into();
        let core_err: CoreError = vision_err.into();
        match core_err {
            CoreError::Unbound(name) => assert_eq!(name, "frame"),
            other => panic!("Expected Unbound, got {:?}", other),
        }
    }

    #[test]
    fn test_from_opencv() {
        let cv_err = opencv::Error::new(0, "bad mat".to_string());
        let vision_err: VisionError = cv_err.into();
        match vision_err {
            VisionError::OpenCv(msg) => assert_eq!(msg, "bad mat"),
            _ => panic!("Expected OpenCv error"),
        }
    }
}
