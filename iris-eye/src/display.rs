//! HighGUI window output

use crate::error::VisionError;
use opencv::{core::Mat, highgui};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Set once any window has been shown in this process.
static WINDOWS_OPENED: AtomicBool = AtomicBool::new(false);

/// Show `mat` in the named window and pump the event loop for `wait_ms`.
///
/// The window is created on first use and reused by name afterwards.
pub fn show(window: &str, mat: &Mat, wait_ms: i32) -> Result<(), VisionError> {
    highgui::imshow(window, mat)?;
    WINDOWS_OPENED.store(true, Ordering::Relaxed);
    let key = highgui::wait_key(wait_ms)?;
    if key >= 0 {
        trace!("Key {} pressed in window {:?}", key, window);
    }
    Ok(())
}

/// Destroy every window opened by `show`. Does nothing if none was.
pub fn close_all_windows() -> Result<(), VisionError> {
    if !WINDOWS_OPENED.swap(false, Ordering::Relaxed) {
        return Ok(());
    }
    highgui::destroy_all_windows()?;
    debug!("All display windows closed");
    Ok(())
}
