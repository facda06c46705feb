use super::{BoundArgs, FormContext};
use crate::buffer::BufferProcedure;
use crate::capture::{CaptureProcedure, CaptureSource};
use crate::config::VisionConfig;
use crate::display;
use crate::error::VisionError;
use crate::method::literal_token;
use crate::processing::{self, ChannelRange, ColorConversion};
use iris_core::Value;
use opencv::prelude::*;
use std::rc::Rc;
use tracing::debug;

fn empty_buffer() -> Value {
    Value::procedure(BufferProcedure::empty())
}

pub(super) fn open_capture(args: &BoundArgs<'_>, context: &FormContext) -> Result<Value, VisionError> {
    let source = CaptureSource::from_literal(args.literal(0)?)?;
    let capture = Rc::new(CaptureProcedure::open(source, &context.config)?);
    context.session.track(Rc::clone(&capture));
    Ok(Value::Procedure(capture))
}

pub(super) fn show_buffer(args: &BoundArgs<'_>, config: &VisionConfig) -> Result<Value, VisionError> {
    let window = args.string_literal(0)?;
    let buffer = args.buffer(1)?;
    match buffer.mat() {
        Some(mat) => display::show(window, mat, config.display_wait_ms)?,
        None => debug!("show-buffer: empty buffer, window {:?} not updated", window),
    }
    Ok(Value::Nil)
}

pub(super) fn convert_color(args: &BoundArgs<'_>) -> Result<Value, VisionError> {
    let buffer = args.buffer(0)?;
    let token_expr = args.literal(1)?;
    let token = literal_token(token_expr)
        .ok_or_else(|| VisionError::UnsupportedConversion(token_expr.to_string()))?;
    let conversion = ColorConversion::parse(&token)?;

    let Some(src) = buffer.mat() else {
        return Ok(empty_buffer());
    };
    let converted = processing::convert_color(src, conversion)?;
    Ok(Value::procedure(BufferProcedure::new(converted)))
}

pub(super) fn threshold_range(args: &BoundArgs<'_>) -> Result<Value, VisionError> {
    let buffer = args.buffer(0)?;
    let mut bounds = [0.0; 6];
    for (offset, bound) in bounds.iter_mut().enumerate() {
        *bound = args.number_literal(offset + 1)?;
    }
    let range = ChannelRange::from_bounds(bounds);

    let Some(src) = buffer.mat() else {
        return Ok(empty_buffer());
    };
    let mask = processing::threshold_range(src, &range)?;
    Ok(Value::procedure(BufferProcedure::new(mask)))
}

pub(super) fn detect_and_annotate_contours(
    args: &BoundArgs<'_>,
    config: &VisionConfig,
) -> Result<Value, VisionError> {
    let mask = args.buffer(0)?;
    let frame = args.buffer(1)?;

    let (Some(mask), Some(frame)) = (mask.mat(), frame.mat()) else {
        return Ok(empty_buffer());
    };
    if mask.size()? != frame.size()? {
        return Err(VisionError::InvalidState(format!(
            "detect-and-annotate-contours: mask {}x{} does not match frame {}x{}",
            mask.cols(),
            mask.rows(),
            frame.cols(),
            frame.rows()
        )));
    }

    let annotated = processing::annotate_contours(mask, frame, config)?;
    debug!("detect-and-annotate-contours: {} shapes drawn", annotated.shapes);
    Ok(Value::procedure(BufferProcedure::new(annotated.frame)))
}
