use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{Result, ScheduleError};

/// Tunables for the duration model and the inter-batch buffer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Roasting minutes added per kilogram of green coffee.
    pub rate_minutes_per_kg: f64,
    /// Fixed setup and cooldown overhead per batch.
    pub base_minutes: f64,
    /// Idle time required after a batch before the next one on the same machine.
    pub buffer_minutes: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            rate_minutes_per_kg: 10.0,
            base_minutes: 20.0,
            buffer_minutes: 30,
        }
    }
}

impl SchedulingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.rate_minutes_per_kg.is_finite() && self.rate_minutes_per_kg > 0.0) {
            return Err(ScheduleError::InvalidConfig(format!(
                "rate_minutes_per_kg must be positive, got {}",
                self.rate_minutes_per_kg
            )));
        }
        if !(self.base_minutes.is_finite() && self.base_minutes >= 0.0) {
            return Err(ScheduleError::InvalidConfig(format!(
                "base_minutes must not be negative, got {}",
                self.base_minutes
            )));
        }
        if !(0..=24 * 60).contains(&self.buffer_minutes) {
            return Err(ScheduleError::InvalidConfig(format!(
                "buffer_minutes must be between 0 and 1440, got {}",
                self.buffer_minutes
            )));
        }
        Ok(())
    }

    pub fn buffer(&self) -> Duration {
        Duration::minutes(self.buffer_minutes)
    }
}
