use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default flat hourly rate, in currency units.
pub const DEFAULT_RATE_PER_HOUR: i64 = 20;

/// Flat hourly parking tariff.
///
/// Stays are billed in whole hours, floored, with a minimum of one hour
/// billed even for shorter stays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tariff {
    rate_per_hour: i64,
}

impl Tariff {
    pub fn new(rate_per_hour: i64) -> Self {
        Self { rate_per_hour }
    }

    pub fn rate_per_hour(&self) -> i64 {
        self.rate_per_hour
    }

    /// Fee for a stay from `entry` to `exit`.
    ///
    /// An exit earlier than the entry is a recoverable input error; the
    /// caller decides whether to abort or record a zero fee.
    pub fn quote(&self, entry: DateTime<Utc>, exit: DateTime<Utc>) -> Result<i64, TariffError> {
        if exit < entry {
            return Err(TariffError::ExitBeforeEntry { entry, exit });
        }

        let hours = (exit - entry).num_hours().max(1);
        Ok(self.rate_per_hour * hours)
    }
}

impl Default for Tariff {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_PER_HOUR)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TariffError {
    #[error("Exit time {exit} cannot be before entry time {entry}")]
    ExitBeforeEntry {
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    },
}
