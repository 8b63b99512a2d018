//! Progressive resend cooldown

/// Default escalation in seconds
pub const DEFAULT_COOLDOWN_TABLE: [u64; 4] = [60, 60, 120, 300];

/// Escalating wait times between code sends
///
/// Index 0 applies after the first send and index `k` after the k-th resend,
/// so the first resend still waits the base time and escalation starts with
/// the second one. Indices past the table reuse its last entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownPolicy {
    table: Vec<u64>,
}

impl CooldownPolicy {
    /// Build a policy from a table; an empty table falls back to the default
    pub fn new(table: Vec<u64>) -> Self {
        if table.is_empty() {
            return Self::default();
        }
        Self { table }
    }

    /// Cooldown in seconds for a send index
    pub fn cooldown_seconds(&self, index: usize) -> u64 {
        let last = self.table.len() - 1;
        self.table[index.min(last)]
    }

    /// Cooldown after a send, given resends made so far including this one
    pub fn after_send(&self, resend_attempts: u32) -> u64 {
        self.cooldown_seconds(resend_attempts as usize)
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            table: DEFAULT_COOLDOWN_TABLE.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_table() {
        let policy = CooldownPolicy::default();
        assert_eq!(policy.cooldown_seconds(0), 60);
        assert_eq!(policy.cooldown_seconds(1), 60);
        assert_eq!(policy.cooldown_seconds(2), 120);
        assert_eq!(policy.cooldown_seconds(3), 300);
    }

    #[test]
    fn test_clamped_to_last_entry() {
        let policy = CooldownPolicy::default();
        assert_eq!(policy.cooldown_seconds(4), 300);
        assert_eq!(policy.cooldown_seconds(100), 300);
    }

    #[test]
    fn test_first_resend_is_not_penalized() {
        let policy = CooldownPolicy::default();
        let observed: Vec<u64> = (0..=3).map(|resends| policy.after_send(resends)).collect();
        assert_eq!(observed, vec![60, 60, 120, 300]);
    }

    #[test]
    fn test_empty_table_uses_default() {
        assert_eq!(CooldownPolicy::new(Vec::new()), CooldownPolicy::default());
        assert_eq!(CooldownPolicy::new(vec![10]).cooldown_seconds(5), 10);
    }
}
