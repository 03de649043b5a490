//! Error types for the crate.
//!
//! Two layers, mirroring the split between raw curve arithmetic and the
//! protocol built on top of it: [`BackendError`] is returned by the
//! pairing backend (bad encodings, failed inversions), while [`Error`] is
//! the protocol-facing type. Protocol errors carry the offending
//! participant's index whenever one exists, so the enclosing driver can
//! attribute faults without re-deriving them.

use thiserror::Error;

/// Errors bubbled up from the curve backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("serialization failure: {0}")]
    Serialization(&'static str),
    #[error("point not on curve")]
    NotOnCurve,
    #[error("point not in the prime-order subgroup")]
    NotInSubgroup,
    #[error("random source failure")]
    Rng,
    #[error("math error: {0}")]
    Math(&'static str),
}

/// High-level errors returned by the DKG protocol API.
///
/// Only [`Error::PeerFaulty`] is recoverable: the peer is recorded
/// dishonest and the run continues while a quorum remains. Every other
/// variant is fatal to the current run.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input. Carries the participant index
    /// when the bad value was attributable to one.
    #[error("bad input{}: {reason}", fmt_index(.index))]
    BadInput {
        index: Option<u32>,
        reason: &'static str,
    },
    /// The random source failed. Never suppressed, never retried here.
    #[error("random source failure")]
    RngFailure,
    /// An internal mathematical postcondition failed. Indicates a bug,
    /// fatal to the run.
    #[error("arithmetic invariant violated: {0}")]
    ArithmeticInvariant(&'static str),
    /// A cryptographic check against a specific peer failed.
    #[error("participant {index} faulty: {reason}")]
    PeerFaulty { index: u32, reason: &'static str },
    /// Fewer than `threshold + 1` honest participants remain.
    #[error("insufficient honest participants: required {required}, have {provided}")]
    InsufficientHonest { required: usize, provided: usize },
    #[error("backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        // RNG trouble is a first-class protocol failure, not a generic
        // backend problem.
        match err {
            BackendError::Rng => Error::RngFailure,
            other => Error::Backend(other),
        }
    }
}

impl Error {
    /// Convenience constructor for unattributable bad input.
    pub(crate) fn bad_input(reason: &'static str) -> Self {
        Error::BadInput {
            index: None,
            reason,
        }
    }

    /// Bad input attributable to a specific participant index.
    pub(crate) fn bad_input_from(index: u32, reason: &'static str) -> Self {
        Error::BadInput {
            index: Some(index),
            reason,
        }
    }
}

fn fmt_index(index: &Option<u32>) -> String {
    match index {
        Some(idx) => format!(" (participant {idx})"),
        None => String::new(),
    }
}
