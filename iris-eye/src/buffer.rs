//! Pixel buffers as first-class values

use crate::error::VisionError;
use crate::method::{self, MethodSet};
use iris_core::{Env, Evaluator, Expr, Procedure, Value};
use opencv::core::{Mat, Size};
use opencv::prelude::*;
use std::any::Any;
use std::fmt;

/// Methods understood by a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferMethod {
    /// `(buf size)` -> `(width height)`
    Size,
}

impl MethodSet for BufferMethod {
    const RECEIVER: &'static str = "buffer";
    const ALL: &'static [Self] = &[BufferMethod::Size];

    fn token(self) -> &'static str {
        match self {
            BufferMethod::Size => "size",
        }
    }

    fn arity(self) -> usize {
        match self {
            BufferMethod::Size => 0,
        }
    }
}

/// A pixel buffer snapshot, or the empty marker for "no frame available".
///
/// Every native operation that produces image data returns a fresh buffer;
/// an existing buffer is never written to.
pub struct BufferProcedure {
    mat: Option<Mat>,
}

impl BufferProcedure {
    /// Wrap `mat`; an empty mat becomes the empty marker.
    pub fn new(mat: Mat) -> Self {
        if mat.empty() {
            Self::empty()
        } else {
            Self { mat: Some(mat) }
        }
    }

    pub fn empty() -> Self {
        Self { mat: None }
    }

    pub fn is_empty(&self) -> bool {
        self.mat.is_none()
    }

    pub fn mat(&self) -> Option<&Mat> {
        self.mat.as_ref()
    }

    /// Spatial dimensions as `(width, height)`.
    pub fn size(&self) -> Result<(i32, i32), VisionError> {
        let mat = self
            .mat
            .as_ref()
            .ok_or_else(|| VisionError::InvalidState("size of an empty buffer".to_string()))?;
        let Size { width, height } = mat.size()?;
        Ok((width, height))
    }

    pub fn channels(&self) -> Option<i32> {
        self.mat.as_ref().map(|m| m.channels())
    }

    fn invoke(&self, args: &[Expr]) -> Result<Value, VisionError> {
        let (method, _) = method::resolve::<BufferMethod>(args)?;
        match method {
            BufferMethod::Size => {
                let (width, height) = self.size()?;
                Ok(Value::List(vec![
                    Value::Int(width as i64),
                    Value::Int(height as i64),
                ]))
            }
        }
    }
}

impl fmt::Display for BufferProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mat {
            Some(mat) => write!(f, "#<buffer {}x{}x{}>", mat.cols(), mat.rows(), mat.channels()),
            None => write!(f, "#<buffer empty>"),
        }
    }
}

impl fmt::Debug for BufferProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferProcedure({})", self)
    }
}

impl Procedure for BufferProcedure {
    fn kind(&self) -> &'static str {
        BufferMethod::RECEIVER
    }

    fn apply(&self, args: &[Expr], _env: &Env, _evaluator: &dyn Evaluator) -> iris_core::Result<Value> {
        self.invoke(args).map_err(Into::into)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
