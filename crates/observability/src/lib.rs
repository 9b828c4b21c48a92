//! Process-wide tracing/logging setup shared by the binaries.

/// Initialize structured logging from the environment.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env(), tracing::DEFAULT_FILTER);
}

/// Tracing configuration (filters, output format).
pub mod tracing;
