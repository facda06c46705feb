//! Capture tests against a clip written to a temporary directory

use iris_core::{Env, Environment, Error, Interpreter, Value};
use iris_eye::{
    BufferProcedure, CaptureProcedure, CaptureProperty, CaptureSource, SpecialFormRegistry, VisionConfig, VisionError,
};
use opencv::core::{Mat, Scalar, Size, CV_8UC3};
use opencv::prelude::*;
use opencv::videoio::VideoWriter;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CLIP_WIDTH: i32 = 64;
const CLIP_HEIGHT: i32 = 48;
const CLIP_FRAMES: usize = 5;

/// Write a short MJPG clip and return its path.
fn write_clip(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("clip.avi");
    let fourcc = VideoWriter::fourcc('M', 'J', 'P', 'G').unwrap();
    let mut writer = VideoWriter::new(
        path.to_str().unwrap(),
        fourcc,
        10.0,
        Size::new(CLIP_WIDTH, CLIP_HEIGHT),
        true,
    )
    .unwrap();
    assert!(writer.is_opened().unwrap());

    for i in 0..CLIP_FRAMES {
        let level = 40.0 * i as f64;
        let frame =
            Mat::new_rows_cols_with_default(CLIP_HEIGHT, CLIP_WIDTH, CV_8UC3, Scalar::new(level, 100.0, 200.0, 0.0))
                .unwrap();
        writer.write(&frame).unwrap();
    }
    writer.release().unwrap();
    path
}

fn setup(clip: &Path) -> (SpecialFormRegistry, Interpreter, Env) {
    let registry = SpecialFormRegistry::new(VisionConfig::default()).unwrap();
    let mut interp = Interpreter::new();
    registry.install(&mut interp).unwrap();
    let env = Environment::global();
    let source = format!("(define cap (open-capture {:?}))", clip.to_string_lossy());
    interp.eval_source(&source, &env).unwrap();
    (registry, interp, env)
}

fn vision_error(interp: &Interpreter, env: &Env, source: &str) -> VisionError {
    match interp.eval_source(source, env).unwrap_err() {
        Error::Extension(boxed) => match boxed.downcast::<VisionError>() {
            Ok(err) => *err,
            Err(other) => panic!("{}: unexpected extension error {}", source, other),
        },
        other => panic!("{}: expected a vision error, got {:?}", source, other),
    }
}

fn read_buffer(interp: &Interpreter, env: &Env) -> Value {
    let value = interp.eval_source("(cap read)", env).unwrap();
    assert!(value.downcast::<BufferProcedure>().is_some());
    value
}

#[test]
fn test_read_returns_frame_of_clip_size() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_clip(&dir);
    let (_registry, interp, env) = setup(&clip);

    let size = interp.eval_source("((cap read) size)", &env).unwrap();
    assert_eq!(
        size,
        Value::List(vec![Value::Int(CLIP_WIDTH as i64), Value::Int(CLIP_HEIGHT as i64)])
    );

    let frame = read_buffer(&interp, &env);
    assert_eq!(frame.downcast::<BufferProcedure>().unwrap().channels(), Some(3));
    assert!(env.lookup("cap").unwrap().to_string().starts_with("#<capture "));
}

#[test]
fn test_read_past_end_yields_empty_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_clip(&dir);
    let (_registry, interp, env) = setup(&clip);

    let mut frames = 0;
    let mut reached_end = false;
    for _ in 0..(CLIP_FRAMES * 4) {
        let value = read_buffer(&interp, &env);
        if value.downcast::<BufferProcedure>().unwrap().is_empty() {
            reached_end = true;
            break;
        }
        frames += 1;
    }
    assert!(reached_end);
    assert!(frames >= 1 && frames <= CLIP_FRAMES);

    // Still empty, still not an error
    let value = read_buffer(&interp, &env);
    assert!(value.downcast::<BufferProcedure>().unwrap().is_empty());
}

#[test]
fn test_set_frame_position() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_clip(&dir);
    let (_registry, interp, env) = setup(&clip);

    assert!(interp.eval_source("(cap set pos-frames 0)", &env).unwrap().is_nil());
    assert!(interp
        .eval_source("(cap set \"CV2.CAP_PROP_POS_FRAMES\" (quote 1))", &env)
        .unwrap()
        .is_nil());

    env.define("start", Value::Int(0));
    assert!(interp.eval_source("(cap set 'pos-frames start)", &env).unwrap().is_nil());
    assert!(!read_buffer(&interp, &env).downcast::<BufferProcedure>().unwrap().is_empty());
}

#[test]
fn test_set_unknown_property() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_clip(&dir);
    let (_registry, interp, env) = setup(&clip);

    match vision_error(&interp, &env, "(cap set \"unknown_property\" 5)") {
        VisionError::UnrecognizedProperty(property) => assert_eq!(property, "unknown_property"),
        other => panic!("Expected UnrecognizedProperty, got {:?}", other),
    }
    assert!(matches!(
        vision_error(&interp, &env, "(cap set frame-width 5)"),
        VisionError::UnrecognizedProperty(_)
    ));
}

#[test]
fn test_set_value_must_be_number() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_clip(&dir);
    let (_registry, interp, env) = setup(&clip);

    match vision_error(&interp, &env, "(cap set pos-frames \"two\")") {
        VisionError::Type { form, position, .. } => assert_eq!((form, position), ("set", 2)),
        other => panic!("Expected Type error, got {:?}", other),
    }
}

#[test]
fn test_capture_method_errors() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_clip(&dir);
    let (_registry, interp, env) = setup(&clip);

    match vision_error(&interp, &env, "(cap size)") {
        VisionError::MethodNotFound { kind, method } => {
            assert_eq!(kind, "capture");
            assert_eq!(method, "size");
        }
        other => panic!("Expected MethodNotFound, got {:?}", other),
    }
    assert!(matches!(
        vision_error(&interp, &env, "(cap read 1)"),
        VisionError::Arity { form: "read", expected: 0, actual: 1 }
    ));
    assert!(matches!(
        vision_error(&interp, &env, "(cap set pos-frames)"),
        VisionError::Arity { form: "set", expected: 2, actual: 1 }
    ));
}

#[test]
fn test_release_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_clip(&dir);
    let source = CaptureSource::Path(clip.to_string_lossy().into_owned());
    let capture = CaptureProcedure::open(source, &VisionConfig::default()).unwrap();

    assert!(!capture.is_released());
    capture.release().unwrap();
    assert!(capture.is_released());
    capture.release().unwrap();
    assert!(capture.is_released());

    assert!(matches!(capture.read(), Err(VisionError::InvalidState(_))));
    assert!(matches!(
        capture.set(CaptureProperty::PosFrames, 0.0),
        Err(VisionError::InvalidState(_))
    ));
}

#[test]
fn test_session_owns_unbound_captures() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_clip(&dir);
    let (registry, interp, env) = setup(&clip);

    let source = format!("(open-capture {:?})", clip.to_string_lossy());
    interp.eval_source(&source, &env).unwrap();
    interp.eval_source(&format!("(define cap {})", source), &env).unwrap();

    // the first `cap` binding was replaced, the second capture never bound
    let session = registry.session();
    assert_eq!(session.open_count(), 3);
    assert_eq!(session.release_all(), 3);
    assert_eq!(session.open_count(), 0);
    assert_eq!(session.release_all(), 0);

    let cap = env.lookup("cap").unwrap();
    assert!(cap.downcast::<CaptureProcedure>().unwrap().is_released());
}
