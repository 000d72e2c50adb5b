//! Reconnection policy for the results stream.
//!
//! The policy only counts consecutive failures and turns the count into a
//! user-facing severity. The delay before the next attempt is fixed: a
//! reconnect is cheap, and the counter alone drives what the user sees.

use std::time::Duration;

/// Severity of the live-update connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionSeverity {
    #[default]
    Ok,
    Degraded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionHealth {
    pub consecutive_failures: u32,
    pub severity: ConnectionSeverity,
}

/// Configuration for reconnect behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Delay before every reconnect attempt.
    pub reconnect_delay: Duration,
    /// Highest failure count still reported as degraded.
    pub degraded_threshold: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_millis(3000),
            degraded_threshold: 3,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    #[must_use]
    pub fn with_degraded_threshold(mut self, threshold: u32) -> Self {
        self.degraded_threshold = threshold;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionRetryPolicy {
    config: RetryConfig,
    health: ConnectionHealth,
}

impl ConnectionRetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            health: ConnectionHealth::default(),
        }
    }

    pub fn record_success(&mut self) -> ConnectionHealth {
        self.health = ConnectionHealth::default();
        self.health
    }

    pub fn record_failure(&mut self) -> ConnectionHealth {
        let failures = self.health.consecutive_failures.saturating_add(1);
        let severity = if failures <= self.config.degraded_threshold {
            ConnectionSeverity::Degraded
        } else {
            ConnectionSeverity::Failed
        };
        self.health = ConnectionHealth {
            consecutive_failures: failures,
            severity,
        };
        self.health
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.config.reconnect_delay
    }

    pub fn health(&self) -> ConnectionHealth {
        self.health
    }

    pub fn severity(&self) -> ConnectionSeverity {
        self.health.severity
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.health.consecutive_failures
    }
}
