// src/recovery/pipeline.rs
//! The key-recovery search itself: split even/odd subkey enumeration,
//! linear-feedback-consistent joining, and forward-clocked verification.
//!
//! Worker shape: one thread per even-parity `fc` index (up to 16, bounded
//! by `RecoveryConfig::even_workers`) enumerates and extends its 2^15
//! subkeys, and for every surviving 24-bit even half joins it against the
//! full set of odd-parity survivors (computed once, up front, since odd
//! extension depends only on the observed bits, never on the even half).
//! Each even worker therefore plays the role of up to 16 of the
//! even-index/odd-index worker pairs the design calls for; verified
//! matches are reported over a bounded channel, and a shared `AtomicBool`
//! lets the first match (when `all_matches` is false) cancel the rest of
//! the search between enumerator steps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use log::{debug, info, trace, warn};

use crate::bits::BitVector;
use crate::cipher::{Cipher, CipherMode};
use crate::enumerate::{half_filter, SubkeyEnumerator};
use crate::error::{Crypto1Error, Result};

use super::config::RecoveryConfig;

const SEARCH_PREFIX_LEN: usize = 10;

/// Run the recovery search and return every verified 48-bit initial state
/// consistent with `bitstream`, honoring `config.all_matches`.
pub fn attack(bitstream: &BitVector, config: &RecoveryConfig) -> Result<Vec<u64>> {
    if bitstream.len() < 48 {
        return Err(Crypto1Error::TooShort(bitstream.len()));
    }

    let bits = bitstream.as_slice();
    let search_len = SEARCH_PREFIX_LEN;
    let verify = &bits[search_len..];

    let even_search: Vec<u8> = (0..search_len).step_by(2).map(|i| bits[i]).collect();
    let odd_search: Vec<u8> = (1..search_len).step_by(2).map(|i| bits[i]).collect();
    let y_even = even_search[0];
    let y_odd = odd_search[0];
    let even_checks = &even_search[1..];
    let odd_checks = &odd_search[1..];

    debug!("recovery: search prefix partitioned, y_even={y_even} y_odd={y_odd}");

    info!("recovery: enumerating odd-parity survivors across 16 fc indices");
    let odd_survivors: Vec<u32> = (0..16u8)
        .map(|index| extend_all(index, y_odd, odd_checks))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();
    trace!("recovery: {} odd survivors found", odd_survivors.len());

    let odd_survivors = Arc::new(odd_survivors);
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::sync_channel::<u64>(config.queue_bound.max(1));

    let even_worker_count = config.even_workers.clamp(1, 16);
    let mut handles = Vec::new();
    for worker in 0..even_worker_count {
        let odd_survivors = Arc::clone(&odd_survivors);
        let cancel = Arc::clone(&cancel);
        let tx = tx.clone();
        let even_checks = even_checks.to_vec();
        let verify = verify.to_vec();
        let all_matches = config.all_matches;
        let indices: Vec<u8> = (worker as u8..16).step_by(even_worker_count).collect();

        handles.push(thread::spawn(move || -> Result<()> {
            for index in indices {
                if cancel.load(Ordering::Relaxed) {
                    break;
                }
                let enumerator = SubkeyEnumerator::new(index, y_even)?;
                for subkey in enumerator {
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    for even24 in extend_one(subkey, &even_checks) {
                        for &odd24 in odd_survivors.iter() {
                            let candidate = interleave(even24, odd24);
                            if !linear_feedback_survives(candidate, &verify) {
                                continue;
                            }
                            if verify_candidate(candidate, &verify) {
                                if tx.send(candidate).is_err() {
                                    return Ok(());
                                }
                                if !all_matches {
                                    cancel.store(true, Ordering::Relaxed);
                                }
                            }
                        }
                    }
                }
            }
            Ok(())
        }));
    }
    drop(tx);

    // Drain to a closed channel rather than stopping at the first match:
    // workers only observe `cancel` between enumerator steps, so a sender
    // can still be mid-send after the first match arrives. Breaking out of
    // this loop early would risk those sends blocking forever with nobody
    // left to receive them.
    let mut found = Vec::new();
    while let Ok(state) = rx.recv() {
        found.push(state);
        if !config.all_matches {
            cancel.store(true, Ordering::Relaxed);
        }
    }

    for handle in handles {
        handle.join().expect("recovery worker thread panicked")?;
    }

    if found.is_empty() {
        warn!("recovery: search exhausted with no verified candidate");
        return Err(Crypto1Error::NotFound);
    }
    info!("recovery: {} verified candidate(s) found", found.len());
    found.sort_unstable();
    found.dedup();
    Ok(found)
}

/// Extend every subkey for `(index, output)` against `checks` (four bits),
/// returning every surviving 24-bit half (packed MSB-first: bit 23 is the
/// earliest covered position).
fn extend_all(index: u8, output: u8, checks: &[u8]) -> Result<Vec<u32>> {
    let enumerator = SubkeyEnumerator::new(index, output)?;
    Ok(enumerator.flat_map(|subkey| extend_one(subkey, checks)).collect())
}

/// Extend a single 20-bit subkey by sliding its filter window forward one
/// step per entry in `checks`, branching at each step to keep every bit
/// choice whose predicted filter output matches the corresponding observed
/// bit (there can be zero, one, or two such choices). Returns every
/// surviving combined 24-bit half; a step with no surviving choices prunes
/// that branch from the frontier entirely.
fn extend_one(subkey: u32, checks: &[u8]) -> Vec<u32> {
    let mut frontier = vec![(subkey, 0u32)];
    for &expected in checks {
        let mut next_frontier = Vec::new();
        for (window, extension) in frontier {
            for nb in 0..2u32 {
                let candidate_window = ((window << 1) | nb) & 0xFFFFF;
                if half_filter(candidate_window) == expected {
                    next_frontier.push((candidate_window, (extension << 1) | nb));
                }
            }
        }
        frontier = next_frontier;
    }
    frontier.into_iter().map(|(_, extension)| (subkey << 4) | extension).collect()
}

/// The even and odd 24-bit halves, as extended here, already cover their
/// target positions (0,2,…,46 and 1,3,…,47 respectively) directly; no
/// rotation of either half is needed before placement (see DESIGN.md's
/// "Interleave rotation" note).
fn interleave(even24: u32, odd24: u32) -> u64 {
    let mut state = 0u64;
    for k in 0..24u32 {
        let even_bit = (even24 >> (23 - k)) & 1;
        let odd_bit = (odd24 >> (23 - k)) & 1;
        state |= (even_bit as u64) << (2 * k);
        state |= (odd_bit as u64) << (2 * k + 1);
    }
    state
}

/// A cheap pre-filter ahead of the full forward verify: advance a fresh
/// copy of the candidate ten plain clocks past the search prefix (to the
/// boundary already covered by enumeration and extension) and check its
/// filter output against the first bit of the verify suffix. This is the
/// same computation `verify_candidate` would do for its first bit, just
/// performed once, up front, so a mismatch is detected before the
/// (potentially much longer) full suffix is clocked through.
fn linear_feedback_survives(candidate: u64, verify: &[u8]) -> bool {
    let Some(&expected) = verify.first() else { return true };
    let mut cipher = Cipher::from_state(candidate).expect("candidate is always a valid 48-bit state");
    for _ in 0..SEARCH_PREFIX_LEN {
        cipher.step(false, CipherMode::Plain);
    }
    cipher.filter() == expected
}

/// Clock a fresh copy of `candidate` forward through the whole verify
/// suffix (search-prefix clocks plus the suffix itself) and compare the
/// produced keystream bit for bit.
fn verify_candidate(candidate: u64, verify: &[u8]) -> bool {
    let mut cipher = Cipher::from_state(candidate).expect("candidate is always a valid 48-bit state");
    for _ in 0..SEARCH_PREFIX_LEN {
        cipher.step(false, CipherMode::Plain);
    }
    for &expected in verify {
        if cipher.step(false, CipherMode::Plain) != (expected != 0) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_reconstructs_a_known_state() {
        let state = 0x27568D75631Fu64;
        let even24 = (0..24).fold(0u32, |acc, k| acc | (((state >> (2 * k)) & 1) as u32) << (23 - k));
        let odd24 = (0..24).fold(0u32, |acc, k| acc | (((state >> (2 * k + 1)) & 1) as u32) << (23 - k));
        assert_eq!(interleave(even24, odd24), state);
    }

    #[test]
    fn extend_one_survives_for_the_true_subkey() {
        let state = 0x27568D75631Fu64;
        let mut cipher = Cipher::from_state(state).unwrap();
        let mut bits = Vec::new();
        for _ in 0..9 {
            bits.push(cipher.step(false, CipherMode::Plain) as u8);
        }
        let even_search: Vec<u8> = bits.iter().step_by(2).copied().collect();
        let v20 = (0..20).fold(0u32, |acc, p| acc | (((state >> (2 * p)) & 1) as u32) << (19 - p));
        // even_search[0] is the output bit already consumed by the
        // enumerator itself; extension checks against the next four.
        let extended = extend_one(v20, &even_search[1..5]);
        assert!(!extended.is_empty());
        let expected_even24 = (0..24).fold(0u32, |acc, k| acc | (((state >> (2 * k)) & 1) as u32) << (23 - k));
        assert!(extended.contains(&expected_even24));
    }

    #[test]
    fn extend_one_with_no_checks_returns_only_the_seed_subkey() {
        assert_eq!(extend_one(0x12345, &[]), vec![0x12345 << 4]);
    }

    #[test]
    fn verify_candidate_accepts_the_true_state_and_rejects_a_wrong_one() {
        let state = 0x27568D75631Fu64;
        let mut cipher = Cipher::from_state(state).unwrap();
        let mut bits = Vec::new();
        for _ in 0..48 {
            bits.push(cipher.step(false, CipherMode::Plain) as u8);
        }
        let verify = &bits[SEARCH_PREFIX_LEN..];
        assert!(verify_candidate(state, verify));
        assert!(!verify_candidate(state ^ 1, verify));
    }
}
