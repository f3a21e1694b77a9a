//! Retry bounds for actions

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ActionError;

/// Upper bound on any single backoff pause
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Pause between failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    Fixed(Duration),
    /// `base * 2^(attempt-1)`, capped at `cap`
    Exponential { base: Duration, cap: Duration },
}

impl Backoff {
    /// Pause after failed attempt number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, cap } => {
                let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1));
                let total_ms = (base.as_millis() as u64).saturating_mul(multiplier);
                Duration::from_millis(total_ms).min(cap)
            }
        };
        delay.min(MAX_BACKOFF)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential {
            base: Duration::from_millis(200),
            cap: Duration::from_secs(2),
        }
    }
}

/// Bounds how long and how often an action is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub per_attempt_timeout: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            per_attempt_timeout: Duration::from_secs(5),
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, per_attempt_timeout: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            per_attempt_timeout,
            backoff,
        }
    }

    /// Single attempt, no backoff.
    pub fn once(per_attempt_timeout: Duration) -> Self {
        Self::new(1, per_attempt_timeout, Backoff::Fixed(Duration::ZERO))
    }

    pub fn validate(&self) -> Result<(), ActionError> {
        if self.max_attempts < 1 {
            return Err(ActionError::InvalidPolicy(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.per_attempt_timeout.is_zero() {
            return Err(ActionError::InvalidPolicy(
                "per_attempt_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_backoff_doubles_up_to_the_cap() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(1000),
            cap: Duration::from_secs(60),
        };
        assert_eq!(backoff.delay(1).as_millis(), 1000);
        assert_eq!(backoff.delay(2).as_millis(), 2000);
        assert_eq!(backoff.delay(3).as_millis(), 4000);
        assert_eq!(backoff.delay(4).as_millis(), 8000);
        assert_eq!(backoff.delay(10).as_millis(), 60_000);
        assert_eq!(backoff.delay(200).as_millis(), 60_000);
    }

    #[test]
    fn fixed_backoff_is_still_capped() {
        assert_eq!(
            Backoff::Fixed(Duration::from_secs(600)).delay(1),
            MAX_BACKOFF
        );
    }

    #[test]
    fn validation_enforces_invariants() {
        assert!(RetryPolicy::default().validate().is_ok());
        let zero_attempts = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert!(matches!(
            zero_attempts.validate(),
            Err(ActionError::InvalidPolicy(_))
        ));
        let zero_timeout = RetryPolicy::once(Duration::ZERO);
        assert!(zero_timeout.validate().is_err());
    }
}
