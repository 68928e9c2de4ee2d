//! Poll delay schedule
//!
//! Verification polling waits a fixed, table-driven delay between status
//! checks. Past the end of the table the last entry repeats until the
//! attempt cap cuts the loop off.

use std::time::Duration;

/// Delay table between status checks, in order
const DEFAULT_DELAYS_MS: [u64; 6] = [0, 2000, 2000, 3000, 5000, 8000];

/// Hard cap on status checks per session
const DEFAULT_MAX_ATTEMPTS: u32 = 12;

/// Poll schedule configuration
#[derive(Debug, Clone)]
pub struct PollSchedule {
    delays: Vec<Duration>,
    max_attempts: u32,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            delays: DEFAULT_DELAYS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollSchedule {
    /// Build a schedule from explicit delays
    pub fn new(delays: Vec<Duration>, max_attempts: u32) -> Self {
        assert!(!delays.is_empty(), "schedule needs at least one delay");
        assert!(max_attempts > 0, "schedule needs at least one attempt");
        Self {
            delays,
            max_attempts,
        }
    }

    /// Constant delay between every check
    pub fn constant(delay: Duration, max_attempts: u32) -> Self {
        Self::new(vec![delay], max_attempts)
    }

    /// Override the attempt cap
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        assert!(max_attempts > 0, "schedule needs at least one attempt");
        self.max_attempts = max_attempts;
        self
    }

    /// Maximum number of status checks before the session times out
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay for a given attempt index (0-based), clamped to the last entry
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let index = (attempt as usize).min(self.delays.len() - 1);
        self.delays[index]
    }
}
