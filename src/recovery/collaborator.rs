// src/recovery/collaborator.rs
//! Hook for an out-of-core hardware collaborator (an FPGA search
//! accelerator reached over some transport). No transport is implemented
//! here — that lives outside this crate's scope — but the trait documents
//! the contract an external implementation must satisfy, including the
//! bookkeeping difference from the pure-software path described in
//! `recovery::recover`.

use crate::bits::BitVector;
use crate::error::Result;

/// A collaborator capable of running (or accelerating) the same search
/// this crate performs in software, typically over a much larger keystream
/// or at much higher throughput.
///
/// Implementations report the cipher state as of the *end* of the supplied
/// bitstream, not the initial state: callers must rewind the reported state
/// by `bitstream.len()` clocks (45 for the canonical handshake-window
/// length this crate's FPGA-facing callers use) to recover the initial
/// state, mirroring `Cipher::rewind`. The pure-software path in this crate
/// does this rewind internally and never needs the adjustment.
pub trait KeyRecoveryCollaborator {
    /// Attempt recovery against the given observed keystream, returning the
    /// raw, un-rewound state as reported by the collaborator.
    fn recover_raw(&self, bitstream: &BitVector) -> Result<Option<u64>>;
}
