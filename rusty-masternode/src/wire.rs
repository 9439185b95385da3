//! Wire representation of the four DKG protocol message kinds.
//!
//! Shape grounded on `rusty_shared_types::dkg_messages`'s envelope
//! (`session_id`/`sender`/`timestamp`/`signature` on every message),
//! collapsed down to the four kinds this handler's phases actually produce
//! and consume: `qcontrib`, `qcomplaint`, `qjustify`, `qpcommit`.

use serde::{Deserialize, Serialize};

use crate::collaborators::{Hash32, MemberId};

/// Identifies the DKG round a message belongs to: the quorum type plus the
/// base block hash it was anchored at. Two sessions can never share a
/// `QuorumHash` for the same `type_id` unless a reorg reused a block height,
/// which the scheduler's reorg check (Invariant C) is responsible for
/// catching before any stale message is acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuorumHash {
    pub type_id: u8,
    pub base_block_hash: Hash32,
}

/// One recipient's encrypted Feldman VSS share, as sent during `Contribute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptedShare {
    pub recipient: MemberId,
    pub recipient_index: u32,
    pub ciphertext: Vec<u8>,
}

/// Command tag `qcontrib`. Broadcasts a verification vector (the public
/// coefficients of the sender's secret polynomial) plus one encrypted share
/// per recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub quorum: QuorumHash,
    pub sender: MemberId,
    pub sender_index: u32,
    pub verification_vector: Vec<Vec<u8>>,
    pub shares: Vec<EncryptedShare>,
    pub timestamp: u64,
}

/// Command tag `qcomplaint`. Names members whose contribution failed local
/// verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub quorum: QuorumHash,
    pub sender: MemberId,
    pub accused: Vec<MemberId>,
    pub timestamp: u64,
}

/// Command tag `qjustify`. An accused member's rebuttal: the plaintext
/// shares it claims to have sent to each accuser, so every peer can
/// re-verify in the open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Justification {
    pub quorum: QuorumHash,
    pub sender: MemberId,
    pub plaintext_shares: Vec<(MemberId, Vec<u8>)>,
    pub timestamp: u64,
}

/// Command tag `qpcommit`. A surviving member's view of the final
/// valid-member bitset, the aggregated public key it implies, and a
/// signature attesting to that view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrematureCommitment {
    pub quorum: QuorumHash,
    pub sender: MemberId,
    pub valid_member_bitset: Vec<bool>,
    pub aggregated_public_key: Vec<u8>,
    pub signature: Vec<u8>,
    pub timestamp: u64,
}

/// Union of the four message kinds this handler's codec ever decodes,
/// dispatched on a message's command tag before the bytes are even
/// deserialized (see `lifecycle_coordinator::process_message`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DkgMessage {
    Contribution(Contribution),
    Complaint(Complaint),
    Justification(Justification),
    PrematureCommitment(PrematureCommitment),
}

impl DkgMessage {
    pub fn quorum(&self) -> QuorumHash {
        match self {
            DkgMessage::Contribution(m) => m.quorum,
            DkgMessage::Complaint(m) => m.quorum,
            DkgMessage::Justification(m) => m.quorum,
            DkgMessage::PrematureCommitment(m) => m.quorum,
        }
    }

    pub fn sender(&self) -> &MemberId {
        match self {
            DkgMessage::Contribution(m) => &m.sender,
            DkgMessage::Complaint(m) => &m.sender,
            DkgMessage::Justification(m) => &m.sender,
            DkgMessage::PrematureCommitment(m) => &m.sender,
        }
    }

    pub fn command_tag(&self) -> &'static str {
        match self {
            DkgMessage::Contribution(_) => "qcontrib",
            DkgMessage::Complaint(_) => "qcomplaint",
            DkgMessage::Justification(_) => "qjustify",
            DkgMessage::PrematureCommitment(_) => "qpcommit",
        }
    }
}

/// A command tag as it arrives off the wire, before decode. Separate from
/// `DkgMessage`'s own `command_tag()` because the pending buffer is keyed on
/// this before any bytes are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DkgMessageKind {
    Contribution,
    Complaint,
    Justification,
    PrematureCommitment,
}

impl DkgMessageKind {
    pub fn from_command_tag(tag: &str) -> Option<Self> {
        match tag {
            "qcontrib" => Some(DkgMessageKind::Contribution),
            "qcomplaint" => Some(DkgMessageKind::Complaint),
            "qjustify" => Some(DkgMessageKind::Justification),
            "qpcommit" => Some(DkgMessageKind::PrematureCommitment),
            _ => None,
        }
    }

    pub const ALL: [DkgMessageKind; 4] = [
        DkgMessageKind::Contribution,
        DkgMessageKind::Complaint,
        DkgMessageKind::Justification,
        DkgMessageKind::PrematureCommitment,
    ];
}

/// Default wire codec: `bincode` over `serde`, matching every other message
/// type in the workspace (`rusty_shared_types::dkg_messages::DKGMessage`
/// uses the same pair).
pub struct BincodeDkgCodec;

impl crate::collaborators::DkgCodec for BincodeDkgCodec {
    fn encode(&self, msg: &DkgMessage) -> Vec<u8> {
        bincode::serialize(msg).expect("DkgMessage serialization is infallible")
    }

    fn decode(&self, bytes: &[u8]) -> Result<DkgMessage, String> {
        bincode::deserialize(bytes).map_err(|e| e.to_string())
    }
}
