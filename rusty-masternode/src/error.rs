//! Error taxonomy for the DKG session handler.
//!
//! Mirrors `rusty-consensus::error::ConsensusError`: a flat `thiserror` enum
//! with short, greppable messages, one variant per propagation policy a
//! caller needs to distinguish.

use thiserror::Error;

use crate::collaborators::PeerId;

/// Errors raised while running a single DKG session or one of its phases.
///
/// Variant grouping:
/// - `InputReject`/`PeerMisbehavior` are handled locally by the caller.
/// - `AbortRound` unwinds the scheduler to `wait_for_new_quorum`.
/// - `Fatal` terminates only the scheduler thread that raised it.
#[derive(Debug, Error)]
pub enum DkgError {
    #[error("message from peer {peer:?} rejected: over per-peer quota")]
    OverQuota { peer: PeerId },

    #[error("message from peer {peer:?} rejected: duplicate")]
    Duplicate { peer: PeerId },

    #[error("peer {peer:?} sent cryptographically invalid content: {reason}")]
    PeerMisbehavior { peer: PeerId, reason: String },

    #[error("message arrived for phase {expected:?} while session is in phase {actual:?}")]
    WrongPhase {
        expected: crate::dkg_session::DkgPhase,
        actual: crate::dkg_session::DkgPhase,
    },

    #[error("no session exists for quorum hash {0:?}")]
    NoActiveSession(crate::collaborators::Hash32),

    #[error("chain reorg invalidated quorum hash {0:?}")]
    AbortedByReorg(crate::collaborators::Hash32),

    #[error("too few members ({found}) for quorum type {type_id}: need at least {min_size}")]
    InsufficientMembers {
        type_id: u8,
        found: usize,
        min_size: usize,
    },

    #[error("premature commitment has no valid-member bitset matching a threshold of peers")]
    NoFinalizingQuorum,

    #[error("underlying cryptographic worker failed: {0}")]
    CryptoWorkerFailed(String),

    #[error("codec failed to decode a {kind} message: {reason}")]
    DecodeFailed { kind: &'static str, reason: String },

    #[error("internal invariant violated: {0}")]
    Fatal(String),
}

/// Errors raised validating a `DkgHandlerConfig` or a `QuorumParams` at
/// startup, before any scheduler thread is spawned.
#[derive(Debug, Error)]
pub enum DkgConfigError {
    #[error("quorum type id {0} is configured more than once")]
    DuplicateQuorumType(u8),

    #[error("quorum type {type_id}: size must be > 0")]
    ZeroSize { type_id: u8 },

    #[error("quorum type {type_id}: min_size ({min_size}) must be <= size ({size})")]
    MinSizeExceedsSize {
        type_id: u8,
        min_size: u32,
        size: u32,
    },

    #[error("quorum type {type_id}: threshold ({threshold}) must be in 1..=size ({size})")]
    ThresholdOutOfRange {
        type_id: u8,
        threshold: u32,
        size: u32,
    },

    #[error("quorum type {type_id}: dkg_interval and dkg_phase_blocks must both be > 0")]
    ZeroBlockWindow { type_id: u8 },
}
