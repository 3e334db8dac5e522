use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::SorrelError;

static INTERRUPTED: Lazy<Arc<AtomicBool>> = Lazy::new(|| Arc::new(AtomicBool::new(false)));

/// Asks the evaluator to stop at its next step.
pub fn request() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// The raw flag, for wiring to a signal handler.
pub fn flag() -> Arc<AtomicBool> {
    INTERRUPTED.clone()
}

pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

pub fn clear() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Called by the evaluator once per trampoline step. The flag stays
/// set until the host clears it, so an interrupt unwinds through any
/// `try` on the way out.
pub fn check() -> Result<(), SorrelError> {
    if is_interrupted() {
        return Err(SorrelError::interrupted("evaluation interrupted"));
    }
    Ok(())
}
