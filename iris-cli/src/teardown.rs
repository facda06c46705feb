// Release of native resources at the end of a session

use iris_core::Env;
use iris_eye::{display, CaptureProcedure, CaptureSession};
use tracing::{info, warn};

/// Release every capture the session opened, any capture bound in `env`
/// that was created outside the forms, and close all display windows.
///
/// Returns the number of captures released. Failures are logged and do not
/// stop the remaining releases.
pub fn release_resources(session: &CaptureSession, env: &Env) -> usize {
    let mut released = session.release_all();

    for (name, value) in env.bindings() {
        let Some(capture) = value.downcast::<CaptureProcedure>() else {
            continue;
        };
        if capture.is_released() {
            continue;
        }
        match capture.release() {
            Ok(()) => released += 1,
            Err(e) => warn!("Failed to release capture bound to '{}': {}", name, e),
        }
    }

    if let Err(e) = display::close_all_windows() {
        warn!("Failed to close display windows: {}", e);
    }

    if released > 0 {
        info!("Released {} capture(s)", released);
    }
    released
}
