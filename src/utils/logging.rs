use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::env::EnvConfig;

pub struct LoggingConfig;

impl LoggingConfig {
    /// Installs the global subscriber.
    ///
    /// - `RUST_LOG` sets the filter when present.
    /// - `NEEDSFLOW_DEBUG` switches the default filter to `needsflow=debug`
    ///   and adds targets, files and line numbers.
    ///
    /// Calling it twice is harmless; the second call is ignored.
    pub fn init() {
        let is_debug = Self::is_debug();

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if is_debug {
                EnvFilter::new("needsflow=debug,info")
            } else {
                EnvFilter::new("needsflow=info,warn")
            }
        });

        let fmt_layer = fmt::layer()
            .with_target(is_debug)
            .with_file(is_debug)
            .with_line_number(is_debug)
            .with_writer(std::io::stderr);

        let installed = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok();

        if installed && is_debug {
            tracing::debug!("debug logging enabled");
        }
    }

    pub fn is_debug() -> bool {
        EnvConfig::is_debug_mode()
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;
    use crate::config::env::DEBUG_ENV;

    #[test]
    fn debug_flag_follows_environment() {
        env::remove_var(DEBUG_ENV);
        assert!(!LoggingConfig::is_debug());

        env::set_var(DEBUG_ENV, "1");
        assert!(LoggingConfig::is_debug());

        env::remove_var(DEBUG_ENV);
    }
}
