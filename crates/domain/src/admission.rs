//! Admission policy and decisions for the request gate.

use std::time::Duration;

use pickadrive_core::{AppError, AppResult};

/// Milliseconds in a 24 hour window.
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

const HOUR_MILLIS: i64 = 60 * 60 * 1000;
const MINUTE_MILLIS: i64 = 60 * 1000;

/// Quota applied to every client key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    max_attempts_per_window: u32,
    window_ms: i64,
    fail_open: bool,
}

impl AdmissionPolicy {
    /// Creates a fail-open policy allowing `max_attempts_per_window` admissions
    /// per rolling `window`.
    pub fn new(max_attempts_per_window: u32, window: Duration) -> AppResult<Self> {
        if max_attempts_per_window == 0 {
            return Err(AppError::Validation(
                "max attempts per window must be greater than zero".to_owned(),
            ));
        }

        let window_ms = i64::try_from(window.as_millis()).map_err(|error| {
            AppError::Validation(format!("admission window is too large: {error}"))
        })?;
        if window_ms <= 0 {
            return Err(AppError::Validation(
                "admission window must be at least one millisecond".to_owned(),
            ));
        }

        Ok(Self {
            max_attempts_per_window,
            window_ms,
            fail_open: true,
        })
    }

    /// Sets whether an attempt is admitted when its persistence write fails.
    #[must_use]
    pub fn with_fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    /// Maximum admitted attempts per key and window.
    #[must_use]
    pub fn max_attempts_per_window(&self) -> u32 {
        self.max_attempts_per_window
    }

    /// Rolling window length in milliseconds.
    #[must_use]
    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Whether persistence failures still admit.
    #[must_use]
    pub fn fail_open(&self) -> bool {
        self.fail_open
    }

    /// Client-facing explanation of the quota.
    #[must_use]
    pub fn limit_message(&self) -> String {
        format!(
            "request limit exceeded: maximum {} requests {} from this device",
            self.max_attempts_per_window,
            describe_window(self.window_ms)
        )
    }
}

impl Default for AdmissionPolicy {
    /// Three attempts per 24 hours, fail-open.
    fn default() -> Self {
        Self {
            max_attempts_per_window: 3,
            window_ms: DAY_MILLIS,
            fail_open: true,
        }
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Attempt counted and durably recorded.
    Admitted,
    /// Quota exhausted; nothing was recorded.
    Denied {
        /// Milliseconds until the oldest counted attempt leaves the window.
        retry_after_ms: u64,
    },
    /// The durable write failed. `admitted` reflects the fail-open setting.
    PersistenceFailed {
        /// Whether the caller may proceed anyway.
        admitted: bool,
        /// Store error description, for operators.
        reason: String,
    },
}

impl AdmissionDecision {
    /// Returns true when the caller may go on with the gated action.
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        match self {
            Self::Admitted => true,
            Self::Denied { .. } => false,
            Self::PersistenceFailed { admitted, .. } => *admitted,
        }
    }
}

fn describe_window(window_ms: i64) -> String {
    if window_ms == DAY_MILLIS {
        return "per day".to_owned();
    }

    let (amount, unit) = if window_ms % DAY_MILLIS == 0 {
        (window_ms / DAY_MILLIS, "day")
    } else if window_ms % HOUR_MILLIS == 0 {
        (window_ms / HOUR_MILLIS, "hour")
    } else if window_ms % MINUTE_MILLIS == 0 {
        (window_ms / MINUTE_MILLIS, "minute")
    } else if window_ms % 1000 == 0 {
        (window_ms / 1000, "second")
    } else {
        (window_ms, "millisecond")
    };

    if amount == 1 {
        format!("per {unit}")
    } else {
        format!("per {amount} {unit}s")
    }
}
