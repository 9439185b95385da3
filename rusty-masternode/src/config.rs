//! Configuration knobs for the DKG session handler.
//!
//! Field-per-knob layout with a `Default` impl, in the shape of
//! `QuorumConfig`/`PoSeConfig`/`MNNetworkCoordinatorConfig`. Validation
//! happens once, at construction, via `DkgHandlerConfig::validate`, long
//! before any scheduler thread starts, so a misconfigured node fails fast
//! rather than mid-round.

use crate::error::DkgConfigError;

/// Immutable parameters for one quorum type (spec section 3, `QuorumParams`).
#[derive(Debug, Clone)]
pub struct QuorumParams {
    /// Small integer distinguishing this quorum type from others configured
    /// on the same node (e.g. a 50-member and a 400-member rotation).
    pub type_id: u8,
    /// Target member count.
    pub size: u32,
    /// Minimum eligible members required to attempt a round at all.
    pub min_size: u32,
    /// Signatures/shares required to finalize, typically `⅔·size + 1`.
    pub threshold: u32,
    /// Blocks between successive quorum rotations for this type.
    pub dkg_interval: u64,
    /// Blocks allotted to each of the four active phases.
    pub dkg_phase_blocks: u64,
    /// Block-height offset (from the round's base block) at which the final
    /// commitment transaction becomes mineable.
    pub dkg_mining_window_start: u64,
    /// Block-height offset at which the mining window closes.
    pub dkg_mining_window_end: u64,
    /// Complaints against a single peer at or above this count mark it bad.
    pub dkg_bad_votes_threshold: u32,
    /// How many of the most recent quorums of this type remain eligible to
    /// sign, i.e. are still considered "active" by consumers of the output.
    pub signing_active_quorum_count: u32,
    /// Whether connections to the previous round's members are kept warm
    /// rather than torn down once a new round starts.
    pub keep_old_connections: bool,
    /// Extra members beyond `size` kept connected as hot standbys for
    /// recovery signing requests.
    pub recovery_members: u32,
}

impl QuorumParams {
    fn validate(&self) -> Result<(), DkgConfigError> {
        if self.size == 0 {
            return Err(DkgConfigError::ZeroSize { type_id: self.type_id });
        }
        if self.min_size > self.size {
            return Err(DkgConfigError::MinSizeExceedsSize {
                type_id: self.type_id,
                min_size: self.min_size,
                size: self.size,
            });
        }
        if self.threshold == 0 || self.threshold > self.size {
            return Err(DkgConfigError::ThresholdOutOfRange {
                type_id: self.type_id,
                threshold: self.threshold,
                size: self.size,
            });
        }
        if self.dkg_interval == 0 || self.dkg_phase_blocks == 0 {
            return Err(DkgConfigError::ZeroBlockWindow { type_id: self.type_id });
        }
        Ok(())
    }

    /// `⅔·size + 1` per spec section 3's `QuorumParams.threshold`. One more
    /// than `quorum_formation.rs`'s own `calculate_threshold` (`(2n+2)/3`,
    /// i.e. `⌈2n/3⌉` with no `+1`); offered as the recommended default for
    /// callers that don't want to pick a threshold by hand.
    pub fn default_threshold(size: u32) -> u32 {
        (size * 2).div_ceil(3) + 1
    }
}

/// Per-message-type admission limits for one quorum's pending buffers
/// (spec section 4.3).
#[derive(Debug, Clone, Copy)]
pub struct PendingBufferConfig {
    /// Upper bound on buffered-but-unconsumed messages per peer, per
    /// message type. Implementation default: 5.
    pub max_messages_per_peer: usize,
    /// Messages popped per drain iteration. Implementation default: 16.
    pub drain_batch_size: usize,
}

impl Default for PendingBufferConfig {
    fn default() -> Self {
        Self {
            max_messages_per_peer: 5,
            drain_batch_size: 16,
        }
    }
}

/// Top-level configuration for the DKG session handler, covering every
/// configured quorum type plus the scheduler- and buffer-wide knobs.
#[derive(Debug, Clone)]
pub struct DkgHandlerConfig {
    pub quorums: Vec<QuorumParams>,
    /// Enables watch-mode connections for non-member nodes (default off).
    pub watch_quorums: bool,
    pub pending_buffers: PendingBufferConfig,
    /// Fraction of a phase window to sleep before starting phase work,
    /// de-synchronizing members' CPU/bandwidth load. Default 0.5.
    pub phase_sleep_factor: f64,
    /// Upper bound, in milliseconds, on any single suspension inside the
    /// scheduler loop; every wait re-checks shutdown and reorg at least
    /// this often. Spec section 5 requires this to be <= 100ms.
    pub wakeup_ceiling_ms: u64,
    /// Score reported to `PeerMisbehavior::punish` for cryptographically
    /// invalid content.
    pub misbehavior_score_invalid_content: u32,
    /// Score reported for `InputReject`-class offenses (over-quota,
    /// duplicate) that are tracked but not cryptographic misbehavior.
    pub misbehavior_score_input_reject: u32,
    /// Membership cache bound, per quorum type, of immutable
    /// `(type_id, base_block_hash)` entries kept before evicting the
    /// oldest.
    pub membership_cache_size: usize,
    /// Seconds since a member's last successful outbound before the
    /// connection planner schedules a PoSe probe connection to it (spec
    /// section 4.2's "10 minutes", default 600).
    pub probe_retry_after_secs: u64,
    /// Fixes the watch-mode random walk's starting seed instead of
    /// drawing one from OS randomness at process start. See DESIGN.md for
    /// the rationale behind defaulting this to a fresh seed per restart.
    pub watch_seed_override: Option<[u8; 32]>,
}

impl Default for DkgHandlerConfig {
    fn default() -> Self {
        Self {
            quorums: Vec::new(),
            watch_quorums: false,
            pending_buffers: PendingBufferConfig::default(),
            phase_sleep_factor: 0.5,
            wakeup_ceiling_ms: 100,
            misbehavior_score_invalid_content: 10,
            misbehavior_score_input_reject: 1,
            membership_cache_size: 8,
            probe_retry_after_secs: 600,
            watch_seed_override: None,
        }
    }
}

impl DkgHandlerConfig {
    /// Validates every configured quorum type and rejects duplicate
    /// `type_id`s. Called once at startup; no scheduler thread is spawned
    /// until this returns `Ok`.
    pub fn validate(&self) -> Result<(), DkgConfigError> {
        let mut seen = std::collections::HashSet::new();
        for q in &self.quorums {
            if !seen.insert(q.type_id) {
                return Err(DkgConfigError::DuplicateQuorumType(q.type_id));
            }
            q.validate()?;
        }
        Ok(())
    }
}
