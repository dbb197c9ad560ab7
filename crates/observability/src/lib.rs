//! Tracing/logging setup shared by the shell binaries.

/// Initialize process-wide tracing.
///
/// Output is JSON unless `SACCO_LOG_FORMAT=pretty`. This is safe to call
/// multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env_or(tracing::LogFormat::Json));
}

/// Tracing configuration (filters, formats).
pub mod tracing;

pub use self::tracing::LogFormat;
