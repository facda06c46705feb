//! Video capture devices and files as first-class values

use crate::buffer::BufferProcedure;
use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::method::{self, literal_token, strip_quotes, MethodSet};
use iris_core::{Env, Evaluator, Expr, Procedure, Value};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use tracing::{debug, info, warn};

/// Where a capture reads frames from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    /// Camera device index (0, 1, 2, ...)
    Device(i32),
    /// Video file or stream URL
    Path(String),
}

impl CaptureSource {
    /// Interpret a literal (unevaluated) argument.
    pub fn from_literal(expr: &Expr) -> Result<Self, VisionError> {
        match expr {
            Expr::Int(index) => i32::try_from(*index)
                .map(CaptureSource::Device)
                .map_err(|_| VisionError::ResourceOpen {
                    resource: index.to_string(),
                    reason: "device index out of range".to_string(),
                }),
            Expr::Str(path) => Ok(CaptureSource::Path(strip_quotes(path).to_string())),
            other => Err(VisionError::Type {
                form: "open-capture",
                position: 1,
                expected: "device index or path string",
                actual: other.kind().to_string(),
            }),
        }
    }
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureSource::Device(index) => write!(f, "{}", index),
            CaptureSource::Path(path) => write!(f, "{:?}", path),
        }
    }
}

/// Capture properties that `set` forwards to the native handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureProperty {
    /// 0-based index of the next frame to decode
    PosFrames,
}

impl CaptureProperty {
    pub const ALL: &'static [CaptureProperty] = &[CaptureProperty::PosFrames];

    fn tokens(self) -> &'static [&'static str] {
        match self {
            CaptureProperty::PosFrames => &["pos-frames", "cv2.cap_prop_pos_frames"],
        }
    }

    pub fn native_id(self) -> i32 {
        match self {
            CaptureProperty::PosFrames => videoio::CAP_PROP_POS_FRAMES,
        }
    }

    pub fn parse(token: &str) -> Result<Self, VisionError> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.tokens().iter().any(|t| t.eq_ignore_ascii_case(token)))
            .ok_or_else(|| VisionError::UnrecognizedProperty(token.to_string()))
    }
}

/// Methods understood by a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMethod {
    /// `(cap read)` -> buffer, empty when no frame is available
    Read,
    /// `(cap set property value)`
    Set,
}

impl MethodSet for CaptureMethod {
    const RECEIVER: &'static str = "capture";
    const ALL: &'static [Self] = &[CaptureMethod::Read, CaptureMethod::Set];

    fn token(self) -> &'static str {
        match self {
            CaptureMethod::Read => "read",
            CaptureMethod::Set => "set",
        }
    }

    fn arity(self) -> usize {
        match self {
            CaptureMethod::Read => 0,
            CaptureMethod::Set => 2,
        }
    }
}

/// Owns exactly one native capture handle.
///
/// The handle is released only through [`CaptureProcedure::release`], called
/// by whoever drives the interpreter once evaluation is over.
pub struct CaptureProcedure {
    source: CaptureSource,
    capture: Mutex<Option<VideoCapture>>,
}

impl CaptureProcedure {
    /// Open the native handle synchronously.
    pub fn open(source: CaptureSource, config: &VisionConfig) -> Result<Self, VisionError> {
        let api = config.capture_backend.api_preference();
        let capture = match &source {
            CaptureSource::Device(index) => VideoCapture::new(*index, api),
            CaptureSource::Path(path) => VideoCapture::from_file(path, api),
        }
        .map_err(|e| VisionError::ResourceOpen {
            resource: source.to_string(),
            reason: e.message,
        })?;

        let opened = capture.is_opened().map_err(|e| VisionError::ResourceOpen {
            resource: source.to_string(),
            reason: e.message,
        })?;
        if !opened {
            return Err(VisionError::ResourceOpen {
                resource: source.to_string(),
                reason: "source could not be opened".to_string(),
            });
        }

        info!("Capture {} opened", source);
        Ok(Self {
            source,
            capture: Mutex::new(Some(capture)),
        })
    }

    pub fn source(&self) -> &CaptureSource {
        &self.source
    }

    pub fn is_released(&self) -> bool {
        self.capture.lock().is_none()
    }

    /// Grab and decode the next frame.
    ///
    /// A failed or exhausted read yields an empty buffer, not an error.
    pub fn read(&self) -> Result<BufferProcedure, VisionError> {
        let mut guard = self.capture.lock();
        let capture = guard
            .as_mut()
            .ok_or_else(|| VisionError::InvalidState(format!("capture {} was released", self.source)))?;

        let mut frame = Mat::default();
        match capture.read(&mut frame) {
            Ok(true) if !frame.empty() => Ok(BufferProcedure::new(frame)),
            Ok(_) => {
                warn!("No frame available from capture {}", self.source);
                Ok(BufferProcedure::empty())
            }
            Err(e) => {
                warn!("Capture {} read error: {}", self.source, e);
                Ok(BufferProcedure::empty())
            }
        }
    }

    /// Forward a recognized property to the native handle.
    pub fn set(&self, property: CaptureProperty, value: f64) -> Result<(), VisionError> {
        let mut guard = self.capture.lock();
        let capture = guard
            .as_mut()
            .ok_or_else(|| VisionError::InvalidState(format!("capture {} was released", self.source)))?;

        let accepted = capture.set(property.native_id(), value)?;
        if !accepted {
            warn!("Capture {} ignored {:?} = {}", self.source, property, value);
        }
        debug!("Capture {} set {:?} = {}", self.source, property, value);
        Ok(())
    }

    /// Release the native handle. Idempotent.
    pub fn release(&self) -> Result<(), VisionError> {
        if let Some(mut capture) = self.capture.lock().take() {
            capture.release()?;
            info!("Capture {} released", self.source);
        }
        Ok(())
    }

    fn invoke(&self, args: &[Expr], env: &Env, evaluator: &dyn Evaluator) -> Result<Value, VisionError> {
        let (method, rest) = method::resolve::<CaptureMethod>(args)?;
        match method {
            CaptureMethod::Read => Ok(Value::procedure(self.read()?)),
            CaptureMethod::Set => {
                let token = literal_token(&rest[0])
                    .ok_or_else(|| VisionError::UnrecognizedProperty(rest[0].to_string()))?;
                let property = CaptureProperty::parse(&token)?;
                let value = evaluator.eval(&rest[1], env)?;
                let number = value.as_number().ok_or_else(|| VisionError::Type {
                    form: "set",
                    position: 2,
                    expected: "number",
                    actual: value.kind().to_string(),
                })?;
                self.set(property, number)?;
                Ok(Value::Nil)
            }
        }
    }
}

impl fmt::Display for CaptureProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<capture {}>", self.source)
    }
}

impl fmt::Debug for CaptureProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureProcedure")
            .field("source", &self.source)
            .field("released", &self.is_released())
            .finish()
    }
}

impl Procedure for CaptureProcedure {
    fn kind(&self) -> &'static str {
        CaptureMethod::RECEIVER
    }

    fn apply(&self, args: &[Expr], env: &Env, evaluator: &dyn Evaluator) -> iris_core::Result<Value> {
        self.invoke(args, env, evaluator).map_err(Into::into)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
