//! Ownership of the captures opened during one evaluation session

use crate::capture::CaptureProcedure;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};

/// Every capture opened through `open-capture`, kept until the driver
/// releases them, whether or not a binding still refers to them.
#[derive(Debug, Default)]
pub struct CaptureSession {
    captures: RefCell<Vec<Rc<CaptureProcedure>>>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, capture: Rc<CaptureProcedure>) {
        self.captures.borrow_mut().push(capture);
    }

    /// Number of tracked captures whose handle is still open.
    pub fn open_count(&self) -> usize {
        self.captures.borrow().iter().filter(|c| !c.is_released()).count()
    }

    /// Release every tracked capture and forget them.
    ///
    /// Returns how many open handles were released. Failures are logged and
    /// do not stop the remaining releases.
    pub fn release_all(&self) -> usize {
        let captures = std::mem::take(&mut *self.captures.borrow_mut());
        let mut released = 0;
        for capture in captures {
            if capture.is_released() {
                continue;
            }
            match capture.release() {
                Ok(()) => released += 1,
                Err(e) => warn!("Failed to release capture {}: {}", capture.source(), e),
            }
        }
        if released > 0 {
            info!("Session released {} capture(s)", released);
        }
        released
    }
}
