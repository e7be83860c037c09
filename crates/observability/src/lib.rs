//! Process-wide tracing setup.

pub mod tracing;

pub use self::tracing::{LogFormat, ParseLogFormatError};

/// Initialize process-wide tracing/logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    self::tracing::init(format);
}
