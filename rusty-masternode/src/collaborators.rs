//! Trait boundary to this handler's external collaborators.
//!
//! Friendship between a manager and its handler, the pattern
//! `network_coordinator.rs`'s callbacks use, is an implementation
//! artifact; here that relation is replaced with explicit method
//! signatures between collaborator interfaces. Every external system this
//! crate touches (chain state, the masternode registry, the p2p
//! connection manager, the BLS worker pool, the wire codec, and the
//! peer-scoring sink) is named here as a trait. Production wiring for
//! these traits (backed by `rusty-core`, `rusty-p2p`, `rusty-crypto`,
//! ...) belongs to the binary that assembles a node, not to this crate.

use std::fmt;

use rusty_shared_types::MasternodeID;

/// A 32-byte digest: a block hash, a quorum hash, or a message digest.
pub type Hash32 = [u8; 32];

/// Network-level peer identifier, as handed out by the p2p layer.
pub type PeerId = String;

/// A masternode's collateral-derived identifier (`pro_tx_hash`).
/// Re-exported from `rusty-shared-types` since it is the one type every
/// crate in the workspace already agrees on.
pub type MemberId = MasternodeID;

/// Small integer identifying a family of quorums (e.g. "50-member DKG",
/// "400-member DKG", "platform signing"). Opaque to this crate: semantics
/// live entirely in configuration, never hardcoded here.
pub type QuorumTypeId = u8;

/// A member as seen by the membership calculator and connection planner:
/// the identity plus the two fields `members_for` hashes together to derive
/// a deterministic score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredMember {
    pub member_id: MemberId,
    /// Hash of the registration transaction that most recently confirmed
    /// this masternode's collateral, the second input to the per-member
    /// score hash, so re-registration (which changes this hash) reshuffles
    /// a member's score even if its `member_id` is reused.
    pub confirmed_hash_with_pro_tx_hash: Hash32,
    /// BLS operator public key, opaque to this crate beyond being handed to
    /// the BLS worker collaborator.
    pub bls_public_key: Vec<u8>,
    /// `"ip:port"` the connection manager should dial.
    pub network_address: String,
    /// Whether the registry currently considers this masternode eligible
    /// (not banned, not in PoSe probation past the ban threshold).
    pub eligible: bool,
}

/// A handle to a specific chain block: hash, height, and the ability to walk
/// ancestors. The DKG core never materializes a full block; it only ever
/// needs this much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainAnchor {
    pub hash: Hash32,
    pub height: u64,
}

/// Read-only view of chain state: ancestor lookups and active-chain
/// membership, used to detect reorgs and to locate a quorum's base block.
pub trait ChainView: Send + Sync {
    /// The ancestor of `block` exactly `depth` blocks back, or `None` if
    /// `block` is shorter than `depth` or unknown.
    fn ancestor(&self, block: ChainAnchor, depth: u64) -> Option<ChainAnchor>;

    /// Whether `block` is on the chain this node currently considers active.
    /// Returns `false` after a reorg has orphaned it.
    fn is_on_active_chain(&self, block: ChainAnchor) -> bool;

    /// The current chain tip.
    fn tip(&self) -> ChainAnchor;
}

/// Deterministic masternode-list snapshot at a given anchor. Implementations
/// are expected to be pure functions of `(anchor, underlying registry
/// state)`.
pub trait MasternodeRegistry: Send + Sync {
    fn members_at(&self, anchor: ChainAnchor) -> Vec<RegisteredMember>;
}

/// Declarative interface to the p2p connection manager. The core only ever
/// *declares* which members must be reachable; it never opens a socket
/// itself.
pub trait ConnectionManager: Send + Sync {
    fn declare_quorum_nodes(
        &self,
        quorum_type: QuorumTypeId,
        base_block_hash: Hash32,
        members: Vec<MemberId>,
    );

    fn declare_relay_members(
        &self,
        quorum_type: QuorumTypeId,
        base_block_hash: Hash32,
        members: Vec<MemberId>,
    );

    fn add_pending_probes(&self, members: Vec<MemberId>);

    /// Seconds since `member`'s last successful outbound connection, or
    /// `None` if this node has never successfully connected to it. The
    /// connection planner's `QUORUM_POSE` probe selection (spec section
    /// 4.2, "Probe connections") is computed from this.
    fn seconds_since_last_outbound(&self, member: &MemberId) -> Option<u64>;
}

/// Outcome of an asynchronous BLS verification job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlsVerifyOutcome {
    Valid,
    Invalid,
}

/// One unit of cryptographic work the session hands to the worker pool:
/// verifying a Feldman VSS share against its sender's published verification
/// vector, or verifying an aggregate signature over a premature commitment.
#[derive(Debug, Clone)]
pub enum BlsVerifyJob {
    ShareAgainstVerificationVector {
        verification_vector: Vec<Vec<u8>>,
        recipient_index: u32,
        encrypted_share: Vec<u8>,
        recipient_secret_key: Vec<u8>,
    },
    AggregateSignature {
        public_keys: Vec<Vec<u8>>,
        message: Vec<u8>,
        signature: Vec<u8>,
    },
}

/// This node's own Feldman VSS polynomial commitment and the shares it
/// produces for every other member of the quorum, as generated by the BLS
/// worker for the `Contribute` phase.
#[derive(Debug, Clone)]
pub struct OwnContribution {
    pub verification_vector: Vec<Vec<u8>>,
    /// One encrypted share per recipient index, in member-index order.
    pub shares_by_recipient_index: Vec<Vec<u8>>,
}

/// BLS cryptographic worker pool: share generation, decryption, point
/// checks, and signature aggregation are dispatched here so phase handling
/// on the scheduler thread stays responsive (spec section 4.4,
/// "cryptographic offload").
pub trait BlsWorker: Send + Sync {
    /// Runs `job` to completion and returns its outcome. A thread-per-worker
    /// or pool-backed implementation may block here; the scheduler always
    /// calls this off its own thread (see `phase_scheduler`'s drain loop,
    /// which dispatches verification jobs and does not itself block past
    /// its 100ms wakeup ceiling).
    fn verify(&self, job: BlsVerifyJob) -> Result<BlsVerifyOutcome, String>;

    /// Generates this node's Feldman VSS polynomial of degree `threshold -
    /// 1` and one encrypted share per member of `recipient_count`.
    fn generate_contribution(&self, member_index: u32, threshold: u32, recipient_count: u32) -> OwnContribution;

    /// Decrypts and re-publishes in the clear the share this node sent to
    /// `recipient_index`, for the `Justify` phase.
    fn reveal_share(&self, recipient_index: u32) -> Vec<u8>;

    /// Signs `message` (the encoding of this node's premature-commitment
    /// view) with this node's BLS secret key.
    fn sign(&self, message: &[u8]) -> Vec<u8>;

    /// This node's BLS public key, used to build the aggregated public key
    /// a premature commitment publishes.
    fn public_key(&self) -> Vec<u8>;

    /// Combines the constant-term commitments of the quorum's valid
    /// members' verification vectors into the quorum's standing public key.
    fn aggregate_public_key(&self, commitments: &[Vec<u8>]) -> Vec<u8>;

    /// Combines `threshold`-many agreeing members' premature-commitment
    /// signatures into the quorum's final commitment signature.
    fn aggregate_signatures(&self, signatures: &[Vec<u8>]) -> Vec<u8>;
}

/// Wire codec: (de)serialization of DKG protocol messages. Kept as a trait
/// rather than a free function so tests can swap in a codec that injects
/// malformed bytes without touching the scheduler.
pub trait DkgCodec: Send + Sync {
    fn encode(&self, msg: &crate::wire::DkgMessage) -> Vec<u8>;
    fn decode(&self, bytes: &[u8]) -> Result<crate::wire::DkgMessage, String>;
}

/// Sink for peer misbehavior reports. The core never scores peers itself;
/// it only ever calls `punish` once per offense and moves on.
pub trait PeerMisbehavior: Send + Sync {
    /// Punishes a network-level peer, used for admission-layer offenses
    /// (over-quota, duplicate, undecodable bytes) discovered before a
    /// message's sender identity is known to be genuine.
    fn punish(&self, peer: &PeerId, score: u32);

    /// Punishes the masternode identified by `member`, used once a
    /// message has been decoded and its protocol-level sender is known to
    /// have behaved badly (invalid share, failed justification).
    fn punish_member(&self, member: &MemberId, score: u32);
}

/// Runtime-configured feature flags this core consults but never defines.
/// Resolves Open Question (a): spork semantics are policy, injected here.
pub trait SporkView: Send + Sync {
    fn is_active(&self, spork: SporkId, quorum_type: QuorumTypeId) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SporkId {
    AllConnected,
    QuorumPose,
}

impl fmt::Display for SporkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SporkId::AllConnected => write!(f, "ALL_CONNECTED"),
            SporkId::QuorumPose => write!(f, "QUORUM_POSE"),
        }
    }
}
