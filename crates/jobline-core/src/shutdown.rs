//! Graceful shutdown support via atomic flag

use std::sync::atomic::{AtomicBool, Ordering};

/// Global shutdown flag, set by the SIGTERM/SIGINT handler
pub fn shutdown_flag() -> &'static AtomicBool {
    static FLAG: AtomicBool = AtomicBool::new(false);
    &FLAG
}

/// Check if shutdown was requested
pub fn is_shutdown_requested() -> bool {
    shutdown_flag().load(Ordering::Relaxed)
}

/// Request shutdown (for signal handlers)
pub fn request_shutdown() {
    shutdown_flag().store(true, Ordering::Relaxed);
}

/// Register SIGINT/SIGTERM handlers.
///
/// First signal sets the flag so pagination stops after the current page and
/// collected records are still written. A second signal exits immediately.
pub fn install_signal_handlers() -> std::io::Result<()> {
    for signal in [signal_hook::consts::SIGTERM, signal_hook::consts::SIGINT] {
        // SAFETY: AtomicBool::swap and process::exit are async-signal-safe
        unsafe {
            signal_hook::low_level::register(signal, || {
                if shutdown_flag().swap(true, Ordering::Relaxed) {
                    std::process::exit(130);
                }
            })?;
        }
    }
    Ok(())
}
