//! Core infrastructure: error handling, shared types, defaults and logging
//! setup.
//!
//! - [`types`]: Fundamental data types and enumerations
//! - [`constants`]: Default hyperparameters
//! - [`error`]: Error type and `Result` alias

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{BaggingError, Result};
pub use types::*;

use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Install `env_logger` as the `log` backend.
///
/// Defaults to the `info` level when `RUST_LOG` is not set. Calling this more
/// than once, or after another logger was installed, is harmless.
pub fn initialize_logging() {
    LOGGING_INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        let _ = env_logger::Builder::from_env(env).try_init();
        log::debug!("bagging-rust {} logging initialized", BAGGING_RUST_VERSION);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_logging_is_idempotent() {
        initialize_logging();
        initialize_logging();
    }

    #[test]
    fn test_version_constant() {
        assert!(!BAGGING_RUST_VERSION.is_empty());
    }
}
