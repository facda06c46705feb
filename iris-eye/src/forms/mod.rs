//! Vision special forms
//!
//! Each form declares, per argument position, whether the sub-expression is
//! taken literally or evaluated by the host. Binding applies that policy and
//! checks the exact arity before any handler code runs.

mod handlers;

use crate::buffer::BufferProcedure;
use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::session::CaptureSession;
use iris_core::{Env, Evaluator, Expr, Value};
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

/// State shared by every installed form.
#[derive(Debug, Clone)]
pub struct FormContext {
    pub config: Arc<VisionConfig>,
    /// Owner of the captures opened by `open-capture`
    pub session: Rc<CaptureSession>,
}

impl FormContext {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            config: Arc::new(config),
            session: Rc::new(CaptureSession::new()),
        }
    }
}

/// How one argument position is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgPolicy {
    /// Passed through as the unevaluated expression
    Literal,
    /// Evaluated recursively by the host evaluator
    Evaluate,
}

/// Argument policy descriptor of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSpec {
    pub name: &'static str,
    pub args: &'static [ArgPolicy],
}

use ArgPolicy::{Evaluate, Literal};

pub const OPEN_CAPTURE: FormSpec = FormSpec {
    name: "open-capture",
    args: &[Literal],
};

pub const SHOW_BUFFER: FormSpec = FormSpec {
    name: "show-buffer",
    args: &[Literal, Evaluate],
};

pub const CONVERT_COLOR: FormSpec = FormSpec {
    name: "convert-color",
    args: &[Evaluate, Literal],
};

pub const THRESHOLD_RANGE: FormSpec = FormSpec {
    name: "threshold-range",
    args: &[Evaluate, Literal, Literal, Literal, Literal, Literal, Literal],
};

pub const DETECT_AND_ANNOTATE_CONTOURS: FormSpec = FormSpec {
    name: "detect-and-annotate-contours",
    args: &[Evaluate, Evaluate],
};

impl FormSpec {
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Check arity, then evaluate or pass through each position in order.
    pub fn bind<'a>(
        &self,
        tail: &'a [Expr],
        env: &Env,
        evaluator: &dyn Evaluator,
    ) -> Result<BoundArgs<'a>, VisionError> {
        if tail.len() != self.arity() {
            return Err(VisionError::Arity {
                form: self.name,
                expected: self.arity(),
                actual: tail.len(),
            });
        }

        let mut args = Vec::with_capacity(tail.len());
        for (policy, expr) in self.args.iter().zip(tail) {
            args.push(match policy {
                ArgPolicy::Literal => BoundArg::Literal(expr),
                ArgPolicy::Evaluate => BoundArg::Evaluated(evaluator.eval(expr, env)?),
            });
        }

        Ok(BoundArgs { form: self.name, args })
    }
}

/// One bound argument.
#[derive(Debug)]
pub enum BoundArg<'a> {
    Literal(&'a Expr),
    Evaluated(Value),
}

/// Arguments of one form invocation after applying its policy.
///
/// Accessors take 0-based positions; errors report 1-based positions.
#[derive(Debug)]
pub struct BoundArgs<'a> {
    form: &'static str,
    args: Vec<BoundArg<'a>>,
}

impl<'a> BoundArgs<'a> {
    pub fn form(&self) -> &'static str {
        self.form
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    fn get(&self, index: usize) -> Result<&BoundArg<'a>, VisionError> {
        self.args.get(index).ok_or(VisionError::Arity {
            form: self.form,
            expected: index + 1,
            actual: self.args.len(),
        })
    }

    pub fn literal(&self, index: usize) -> Result<&'a Expr, VisionError> {
        match self.get(index)? {
            BoundArg::Literal(expr) => Ok(expr),
            BoundArg::Evaluated(_) => Err(VisionError::Config(format!(
                "{}: argument {} is not declared literal",
                self.form,
                index + 1
            ))),
        }
    }

    pub fn value(&self, index: usize) -> Result<&Value, VisionError> {
        match self.get(index)? {
            BoundArg::Evaluated(value) => Ok(value),
            BoundArg::Literal(_) => Err(VisionError::Config(format!(
                "{}: argument {} is not declared evaluated",
                self.form,
                index + 1
            ))),
        }
    }

    /// Evaluated argument that must be a buffer.
    pub fn buffer(&self, index: usize) -> Result<&BufferProcedure, VisionError> {
        let value = self.value(index)?;
        value.downcast::<BufferProcedure>().ok_or_else(|| VisionError::Type {
            form: self.form,
            position: index + 1,
            expected: "buffer",
            actual: value.kind().to_string(),
        })
    }

    /// Literal argument that must be a string.
    pub fn string_literal(&self, index: usize) -> Result<&'a str, VisionError> {
        match self.literal(index)? {
            Expr::Str(s) => Ok(s.as_str()),
            other => Err(VisionError::Type {
                form: self.form,
                position: index + 1,
                expected: "string literal",
                actual: other.kind().to_string(),
            }),
        }
    }

    /// Literal argument that must be a number.
    pub fn number_literal(&self, index: usize) -> Result<f64, VisionError> {
        let expr = self.literal(index)?;
        expr.as_number().ok_or_else(|| VisionError::Type {
            form: self.form,
            position: index + 1,
            expected: "number literal",
            actual: expr.kind().to_string(),
        })
    }
}

/// The closed set of vision forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    OpenCapture,
    ShowBuffer,
    ConvertColor,
    ThresholdRange,
    DetectAndAnnotateContours,
}

impl FormKind {
    pub const ALL: [FormKind; 5] = [
        FormKind::OpenCapture,
        FormKind::ShowBuffer,
        FormKind::ConvertColor,
        FormKind::ThresholdRange,
        FormKind::DetectAndAnnotateContours,
    ];

    pub fn spec(self) -> &'static FormSpec {
        match self {
            FormKind::OpenCapture => &OPEN_CAPTURE,
            FormKind::ShowBuffer => &SHOW_BUFFER,
            FormKind::ConvertColor => &CONVERT_COLOR,
            FormKind::ThresholdRange => &THRESHOLD_RANGE,
            FormKind::DetectAndAnnotateContours => &DETECT_AND_ANNOTATE_CONTOURS,
        }
    }

    /// Bind the unevaluated tail and run the form.
    pub fn evaluate(
        self,
        tail: &[Expr],
        env: &Env,
        evaluator: &dyn Evaluator,
        context: &FormContext,
    ) -> Result<Value, VisionError> {
        let args = self.spec().bind(tail, env, evaluator)?;
        let config = &context.config;
        let result = match self {
            FormKind::OpenCapture => handlers::open_capture(&args, context),
            FormKind::ShowBuffer => handlers::show_buffer(&args, config),
            FormKind::ConvertColor => handlers::convert_color(&args),
            FormKind::ThresholdRange => handlers::threshold_range(&args),
            FormKind::DetectAndAnnotateContours => handlers::detect_and_annotate_contours(&args, config),
        }?;
        debug!("{} -> {}", args.form(), result);
        Ok(result)
    }
}
