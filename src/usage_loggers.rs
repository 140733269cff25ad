//! Process-wide switch for every logger.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable that disables logging for the whole process.
pub const DISABLE_ENV: &str = "USAGE_LOGGERS_DISABLE";

/// Environment variable naming the default destination URL.
pub const URL_ENV: &str = "USAGE_LOGGERS_URL";

/// Environment variable forcing synchronous dispatch.
pub const DEBUG_ENV: &str = "USAGE_LOGGERS_DEBUG";

static DISABLED_BY_ENVIRONMENT: Lazy<bool> =
    Lazy::new(|| std::env::var(DISABLE_ENV).is_ok_and(|v| v == "True"));

static DISABLED: Lazy<AtomicBool> = Lazy::new(|| AtomicBool::new(*DISABLED_BY_ENVIRONMENT));

/// Process-wide logging switch.
///
/// A logger only logs while both its own flag and this switch are on. When
/// `USAGE_LOGGERS_DISABLE=True` is set at first use, [`UsageLoggers::enable`]
/// has no effect.
#[derive(Debug, Clone, Copy)]
pub struct UsageLoggers;

impl UsageLoggers {
    /// Turn logging off for every logger.
    pub fn disable() {
        DISABLED.store(true, Ordering::Release);
    }

    /// Turn logging back on, unless disabled by the environment.
    pub fn enable() {
        if !*DISABLED_BY_ENVIRONMENT {
            DISABLED.store(false, Ordering::Release);
        }
    }

    /// Whether logging is on.
    pub fn is_enabled() -> bool {
        !DISABLED.load(Ordering::Acquire)
    }

    /// Whether the environment disabled logging.
    pub fn is_disabled_by_environment() -> bool {
        *DISABLED_BY_ENVIRONMENT
    }

    /// Destination URL from the environment.
    pub fn url_by_default() -> Option<String> {
        std::env::var(URL_ENV).ok()
    }

    /// Whether the environment asks for synchronous dispatch.
    pub fn is_debug() -> bool {
        std::env::var(DEBUG_ENV).is_ok_and(|v| v == "True")
    }
}
