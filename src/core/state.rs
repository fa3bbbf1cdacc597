//! Shutdown tracking.
//!
//! Ctrl+C only raises a flag. Long-running loops (page rendering, the watch
//! loop) poll it between units of work and stop at the next boundary.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Set while a second Ctrl+C should terminate immediately.
static INTERRUPTED_ONCE: AtomicBool = AtomicBool::new(false);

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// The first Ctrl+C requests a cooperative stop; a second one exits.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if INTERRUPTED_ONCE.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        request_shutdown();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Ask running loops to stop.
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// Check if shutdown has been requested
///
/// Relaxed ordering: a loop may finish one more unit of work before noticing.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
