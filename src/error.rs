//! Errors returned by the primitives, the switching protocols and the survey pipeline.
//!
//! Every pipeline error is local and synchronous: it means the caller (transport
//! or switching layer) fed the pipeline something it never asked for, and the
//! round should be aborted rather than retried.
use std::fmt::{Display, Formatter, Result as FmtResult};
use rabe_bn::FieldError;
use thiserror::Error;
use crate::primitives::deterministic::GroupingKey;
use crate::survey::ids::TempId;

/// The crate-wide error type
#[derive(Clone, PartialEq, Debug, Error)]
pub enum ColaggError {
    /// An elementwise operation was applied to vectors of different lengths.
    #[error("vector length mismatch: expected {expected}, got {actual}")]
    VectorLengthMismatch { expected: usize, actual: usize },
    /// A switching result references an identifier this round never handed out
    /// (or one that was already consumed).
    #[error("unknown temporary id {0}")]
    UnknownTempId(TempId),
    /// The grouping and aggregate halves of a delivery do not cover the same keys.
    #[error("incomplete delivery pair for group {0}")]
    IncompleteDeliveryPair(GroupingKey),
    /// Two distinct deterministic representatives collided on one grouping key.
    #[error("duplicate grouping key {0} with a different representative")]
    DuplicateGroupKey(GroupingKey),
    /// A collective result carries an identity without aggregate, or the reverse.
    #[error("group {0} has no matching counterpart in the collective result")]
    UnpairedGroup(GroupingKey),
    #[error("plaintext outside of the discrete logarithm table")]
    DecryptionOutOfRange,
    #[error("invalid scalar: {0}")]
    InvalidScalar(String),
    #[error("field error: {0}")]
    Field(String),
    #[error("survey store lock poisoned")]
    LockPoisoned,
    /// A checkpoint could not be written or read back.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl From<FieldError> for ColaggError {
    fn from(error: FieldError) -> Self {
        match error {
            FieldError::InvalidSliceLength => ColaggError::Field("InvalidSliceLength".to_string()),
            FieldError::InvalidU512Encoding => ColaggError::Field("InvalidU512Encoding".to_string()),
            FieldError::NotMember => ColaggError::Field("NotMember".to_string()),
        }
    }
}

/// The phase of an aggregation round, used to report where a round failed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    DeterministicSwitching,
    LocalGrouping,
    CollectiveCombination,
    KeySwitching,
    Delivery,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let name = match self {
            Phase::DeterministicSwitching => "deterministic switching",
            Phase::LocalGrouping => "local grouping",
            Phase::CollectiveCombination => "collective combination",
            Phase::KeySwitching => "key switching",
            Phase::Delivery => "delivery",
        };
        write!(f, "{}", name)
    }
}

/// A failed round: which phase failed, on which node, and why.
#[derive(Clone, PartialEq, Debug, Error)]
#[error("round failed during {phase} on node {node}: {source}")]
pub struct RoundError {
    pub phase: Phase,
    pub node: String,
    #[source]
    pub source: ColaggError,
}

impl RoundError {
    pub fn new(phase: Phase, node: &str, source: ColaggError) -> RoundError {
        RoundError { phase, node: node.to_string(), source }
    }
}

pub type Result<T> = std::result::Result<T, ColaggError>;
