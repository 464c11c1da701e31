//! The closed taxonomy of reasons a transaction is rejected.

use itertools::Itertools;
use std::fmt;
use tessera_primitives::{EntryId, GraphError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("{0}")]
    Structural(#[from] StructuralError),

    #[error("{0}")]
    Type(#[from] TypeError),

    #[error("{0}")]
    ValueFlow(#[from] ValueFlowError),

    #[error("{0}")]
    Conservation(#[from] ConservationError),

    #[error("{0}")]
    Program(#[from] ProgramError),

    #[error("{0}")]
    IssuanceAnchor(#[from] IssuanceAnchorError),

    #[error("{0}")]
    TimeRange(#[from] TimeRangeError),

    #[error("{0}")]
    Extension(#[from] ExtensionError),

    #[error("{0}")]
    State(#[from] StateError),
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StructuralError {
    #[error("a referenced entry is not present in the transaction")]
    MissingEntry,

    #[error("two distinct entries hash to the same id")]
    DuplicateEntry,

    #[error("transaction version is not known")]
    BadVersion,

    #[error("transaction header lists no results")]
    EmptyResults,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum TypeError {
    #[error("pointer target cannot act as a value source")]
    NotASource,

    #[error("pointer target cannot act as a value destination")]
    NotADestination,

    #[error("pointer target is not an output")]
    NotAnOutput,

    #[error("pointer target cannot anchor an issuance")]
    NotAnAnchor,

    #[error("pointer target is not a time range")]
    NotATimeRange,

    #[error("pointer target is not an issuance")]
    NotAnIssuance,

    #[error("header result is not an output or retirement")]
    NotAResult,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ValueFlowError {
    #[error("edge position points outside the entry it references")]
    PositionOutOfRange,

    #[error("paired edge does not point back at this entry")]
    RefMismatch,

    #[error("paired edge disagrees on position")]
    PositionMismatch,

    #[error("paired edge disagrees on value")]
    ValueMismatch,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConservationError {
    #[error("per-asset source and destination sums differ")]
    UnbalancedAsset,

    #[error("value sum does not fit in 63 bits")]
    Overflow,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ProgramError {
    #[error("program evaluation returned false")]
    Unsatisfied,

    #[error("program vm version is not available at this transaction version")]
    UnsupportedVmVersion,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum IssuanceAnchorError {
    #[error("asset definition does not hash to the issued asset id")]
    AssetDefinitionMismatch,

    #[error("nonce issuance is not reachable from the header")]
    IssuanceNotReachable,

    #[error("anchored issuance does not reference this nonce")]
    AnchorMismatch,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum TimeRangeError {
    #[error("time range starts after the header mintime")]
    MintimeAboveHeader,

    #[error("time range ends before the header maxtime")]
    MaxtimeBelowHeader,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ExtensionError {
    #[error("extension hash must be all zeros at a known version")]
    NonZeroExtHash,
}

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StateError {
    #[error("spent output is not in the utxo set")]
    MissingUtxo,

    #[error("nonce was already consumed")]
    DuplicateNonce,

    #[error("block timestamp is not past the header mintime")]
    BeforeMintime,

    #[error("block timestamp is past the header maxtime")]
    AfterMaxtime,
}

/// A rejection: the violated rule plus the path of entry ids that led to it,
/// root first.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    pub error: ValidationError,
    pub trace: Vec<EntryId>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.trace.is_empty() {
            return write!(f, "{}", self.error);
        }
        write!(f, "{} (at {})", self.error, self.trace.iter().join(" -> "))
    }
}

impl std::error::Error for ValidationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<GraphError> for ValidationFailure {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::DuplicateEntry(id) => ValidationFailure {
                error: StructuralError::DuplicateEntry.into(),
                trace: vec![id],
            },
        }
    }
}

pub type ValidationResult = Result<(), ValidationFailure>;
