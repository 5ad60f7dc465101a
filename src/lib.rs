// src/lib.rs
//! A bit-exact Crypto-1 cipher implementation and a key-recovery attack
//! that reconstructs a 48-bit initial cipher state from observed keystream.
//!
//! - [`cipher`] is the cipher itself: forward and backward clocking, the
//!   key-derivation permutation, and byte/word-granular helpers.
//! - [`recovery`] is the attack: split even/odd subkey enumeration,
//!   extension, linear-feedback pre-filtering and forward verification.
//! - [`prng`] is the unrelated 16-bit nonce generator used by card-side
//!   nonce handling.
//!
//! Enable logging (the `log` facade) to see pipeline-stage diagnostics;
//! this crate never initializes a logger itself.

pub mod bits;
pub mod cipher;
pub mod enumerate;
pub mod error;
pub mod filter;
pub mod prng;
pub mod recovery;

pub use bits::BitVector;
pub use cipher::{Cipher, CipherMode};
pub use error::{Crypto1Error, Result};
pub use prng::NonceGenerator;
pub use recovery::{attack_all, recover, recover_with_config, KeyRecoveryCollaborator, RecoveryConfig};
