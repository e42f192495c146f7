use std::fmt;
use std::time::Duration;

/// Remaining exam time, counted down one second per tick and floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    total_secs: u64,
    remaining_secs: u64,
}

impl Countdown {
    pub fn new(duration: Duration) -> Self {
        let total_secs = duration.as_secs();
        Self {
            total_secs,
            remaining_secs: total_secs,
        }
    }

    pub fn tick(&mut self) {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    pub fn reset(&mut self) {
        self.remaining_secs = self.total_secs;
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }
}
