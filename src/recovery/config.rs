// src/recovery/config.rs
//! Tunables for the recovery pipeline. None of these affect whether a key
//! is found, only how much work is spent finding it and whether the search
//! stops at the first verified match.

/// Configuration for `recovery::recover_with_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryConfig {
    /// Number of even-parity enumerator worker threads to run concurrently.
    /// The sixteen `fc`-preimage indices are distributed round-robin across
    /// this many threads; values above 16 are clamped to 16.
    pub even_workers: usize,
    /// Bound on the channel used to stream verified matches back to the
    /// caller. A small bound is fine: matches are rare by construction.
    pub queue_bound: usize,
    /// If `true`, the search runs to completion and reports every verified
    /// match instead of cancelling at the first one. Useful for diagnosing
    /// a keystream that is ambiguous or too short to pin down uniquely.
    pub all_matches: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self { even_workers: 16, queue_bound: 64, all_matches: false }
    }
}
