// src/recovery/mod.rs
//! Public entry points for the key-recovery attack: reconstruct a 48-bit
//! Crypto-1 initial state from an observed keystream.

mod collaborator;
mod config;
mod pipeline;

pub use collaborator::KeyRecoveryCollaborator;
pub use config::RecoveryConfig;

use crate::bits::BitVector;
use crate::cipher::Cipher;
use crate::error::Result;

/// Recover the 48-bit key that produced `bitstream`, using the default
/// `RecoveryConfig` (first match, sixteen worker threads). Returns
/// `Crypto1Error::TooShort` if fewer than 48 bits are supplied, or
/// `Crypto1Error::NotFound` if no candidate verifies.
pub fn recover(bitstream: &BitVector) -> Result<u64> {
    recover_with_config(bitstream, &RecoveryConfig::default())
}

/// As `recover`, with an explicit `RecoveryConfig`. If `config.all_matches`
/// is set, the search runs to completion and the key for the lowest
/// verified state is returned; use `attack_all` directly to see every
/// match's state.
pub fn recover_with_config(bitstream: &BitVector, config: &RecoveryConfig) -> Result<u64> {
    let mut matches = pipeline::attack(bitstream, config)?;
    let state = matches.remove(0);
    Ok(Cipher::from_state(state)?.key())
}

/// Run the full search and return every verified initial state, instead of
/// stopping at the first one. Primarily useful for diagnosing an
/// under-constrained or ambiguous keystream.
pub fn attack_all(bitstream: &BitVector, config: &RecoveryConfig) -> Result<Vec<u64>> {
    let mut config = *config;
    config.all_matches = true;
    pipeline::attack(bitstream, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{Cipher, CipherMode};

    fn keystream(state: u64, len: u32) -> BitVector {
        let mut cipher = Cipher::from_state(state).unwrap();
        let bits: Vec<u8> = (0..len).map(|_| cipher.step(false, CipherMode::Plain) as u8).collect();
        BitVector::from_bits(bits).unwrap()
    }

    #[test]
    fn recovers_the_key_for_a_known_initial_state() {
        for state in [0x000000000001u64, 0x27568D75631F, 0xFFFFFFFFFFFF, 0xEE3DE5499562] {
            let stream = keystream(state, 48);
            let recovered = recover(&stream).unwrap_or_else(|e| panic!("state {state:#x} failed: {e}"));
            let expected_key = Cipher::from_state(state).unwrap().key();
            assert_eq!(recovered, expected_key, "state {state:#x}");
        }
    }

    #[test]
    fn recovers_the_key_that_produced_a_stream() {
        for key in [0x1u64, 0xAC6E61B52810, 0x27568D75631F] {
            let cipher = Cipher::from_key(key).unwrap();
            let state = cipher.state();
            let stream = keystream(state, 48);
            let recovered_key = recover(&stream).unwrap();
            assert_eq!(recovered_key, key);
        }
    }

    #[test]
    fn too_short_a_stream_is_rejected() {
        let short = BitVector::from_bits(vec![0; 20]).unwrap();
        assert!(recover(&short).is_err());
    }

    #[test]
    fn all_matches_includes_the_true_state() {
        let state = 0x123456789ABCu64;
        let stream = keystream(state, 48);
        let matches = attack_all(&stream, &RecoveryConfig::default()).unwrap();
        assert!(matches.contains(&state));
    }

    #[test]
    fn longer_keystreams_still_recover_correctly() {
        let state = 0x0C0FFEE15BADu64 & 0xFFFFFFFFFFFF;
        let stream = keystream(state, 80);
        let expected_key = Cipher::from_state(state).unwrap().key();
        assert_eq!(recover(&stream).unwrap(), expected_key);
    }
}
