//! iris-eye: OpenCV forms for the iris evaluator
//!
//! Binds video captures and image buffers as first-class procedures and adds
//! five special forms to the host evaluator: `open-capture`, `show-buffer`,
//! `convert-color`, `threshold-range` and `detect-and-annotate-contours`.
//!
//! Errors raised here travel through the host as `iris_core::Error::Extension`
//! and can be recovered with [`VisionError::from_host`].

pub mod buffer;
pub mod capture;
pub mod config;
pub mod display;
pub mod error;
pub mod forms;
pub mod method;
pub mod processing;
pub mod registry;
pub mod session;

pub use buffer::{BufferMethod, BufferProcedure};
pub use capture::{CaptureMethod, CaptureProcedure, CaptureProperty, CaptureSource};
pub use config::{CaptureBackend, VisionConfig};
pub use error::VisionError;
pub use forms::{ArgPolicy, FormContext, FormKind, FormSpec};
pub use registry::SpecialFormRegistry;
pub use session::CaptureSession;
