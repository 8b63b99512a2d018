//! Bounded attempt counter

use serde::{Deserialize, Serialize};

/// A count paired with its ceiling
///
/// Resend and wrong-code attempts each get their own counter because they
/// are incremented and cleared by different events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptCounter {
    count: u32,
    ceiling: u32,
}

impl AttemptCounter {
    /// Create an empty counter with the given ceiling
    pub fn new(ceiling: u32) -> Self {
        Self { count: 0, ceiling }
    }

    /// Attempts recorded so far
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Maximum number of attempts
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Attempts left before the ceiling
    pub fn remaining(&self) -> u32 {
        self.ceiling.saturating_sub(self.count)
    }

    /// Whether the ceiling has been reached
    pub fn is_exhausted(&self) -> bool {
        self.count >= self.ceiling
    }

    /// Whether exactly one attempt is left
    pub fn is_last_attempt(&self) -> bool {
        self.remaining() == 1
    }

    /// Record one attempt
    ///
    /// Returns `false` without counting when the ceiling was already reached.
    pub fn record(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.count += 1;
        true
    }

    /// Clear the count, keeping the ceiling
    pub fn reset(&mut self) {
        self.count = 0;
    }
}
