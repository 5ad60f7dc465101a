// src/error.rs
use thiserror::Error;

/// Errors surfaced at the public API boundary of the cipher and the
/// recovery pipeline. Internal arithmetic cannot fail; only caller-supplied
/// values and the outcome of the recovery search produce an `Err`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Crypto1Error {
    /// A key, state, or bit-vector argument fell outside its valid width.
    #[error("value out of range: expected {expected}, got {actual}")]
    InvalidLength { expected: String, actual: String },

    /// A bit value outside {0, 1} was supplied where a single bit was expected.
    #[error("invalid bit value: {0} (must be 0 or 1)")]
    InvalidBit(u8),

    /// The recovery input was shorter than the minimum 48 observed bits.
    #[error("recovery input too short: need at least 48 bits, got {0}")]
    TooShort(usize),

    /// The recovery pipeline exhausted every candidate without a verified match.
    #[error("no key recovered: input is not valid Crypto-1 keystream")]
    NotFound,

    /// The optional hardware collaborator (e.g. an FPGA transport) failed.
    #[error("collaborator failure: {0}")]
    CollaboratorFailure(String),
}

pub type Result<T> = std::result::Result<T, Crypto1Error>;
