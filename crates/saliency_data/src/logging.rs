//! Logger setup for binaries and tests.
//!
//! The library only emits through the `log` macros; call [`init`] once to see
//! them on stderr.

use env_logger::Env;

/// Installs an `env_logger` reading `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
