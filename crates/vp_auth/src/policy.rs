//! Security policy constants
//!
//! These are product policy, not user configuration. The structs exist so
//! tests (and embedders with unusual requirements) can override them; the
//! defaults are the shipped behavior.

use chrono::Duration;

/// Session lifetime policy: dual timeouts plus the sweep cadence.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Maximum inactivity before a session expires.
    pub idle_timeout: Duration,
    /// Maximum total lifetime regardless of activity.
    pub absolute_timeout: Duration,
    /// How often the background sweep deletes expired sessions.
    pub cleanup_interval: std::time::Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::minutes(30),
            absolute_timeout: Duration::hours(8),
            cleanup_interval: std::time::Duration::from_secs(30),
        }
    }
}

/// Progressive lockout policy. Password and second-factor attempts are
/// counted separately, with a tighter bound on second-factor guesses; both
/// trip the same lockout window.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    pub max_password_attempts: u32,
    pub max_second_factor_attempts: u32,
    pub lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_password_attempts: 5,
            max_second_factor_attempts: 3,
            lockout_duration: Duration::minutes(15),
        }
    }
}
