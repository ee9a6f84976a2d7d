//! Logging setup shared by the server binary and tools.

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (format, filter).
pub mod tracing;
