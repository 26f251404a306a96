//! Search configuration for the route planner.

use chrono::Duration;

/// Configuration parameters for route search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Dwell charged when changing lines at a station (minutes).
    /// Covers walking between platforms and waiting to re-board.
    pub transfer_mins: i64,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(transfer_mins: i64) -> Self {
        Self { transfer_mins }
    }

    /// Returns the transfer dwell as a Duration.
    pub fn transfer_dwell(&self) -> Duration {
        Duration::minutes(self.transfer_mins)
    }

    /// Returns the transfer dwell in whole seconds.
    pub fn transfer_secs(&self) -> u32 {
        (self.transfer_mins.max(0) as u32) * 60
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { transfer_mins: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.transfer_mins, 5);
        assert_eq!(config.transfer_secs(), 300);
    }

    #[test]
    fn duration_methods() {
        let config = SearchConfig::new(8);
        assert_eq!(config.transfer_dwell(), Duration::minutes(8));
        assert_eq!(config.transfer_secs(), 480);
    }
}
