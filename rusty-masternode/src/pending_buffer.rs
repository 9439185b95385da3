//! Bounded, per-peer, per-message-type pending buffer.
//!
//! Grounded on `dkg_manager.rs`'s `Arc<Mutex<Vec<_>>>` outgoing-message
//! queue pattern, generalized into the handler's ingress-side buffer with
//! per-peer admission caps and digest-based duplicate suppression (spec
//! section 4.3). One instance exists per `(quorum_type, message_type)` and
//! is safe to `push` concurrently from many network-handler threads while a
//! single scheduler thread `pop`s.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use crate::collaborators::{Hash32, PeerId};

struct Inner {
    messages: VecDeque<(PeerId, Vec<u8>)>,
    per_peer_count: HashMap<PeerId, usize>,
    seen_hashes: HashSet<Hash32>,
}

/// One message type's FIFO queue for one quorum round.
pub struct PendingBuffer {
    max_per_peer: usize,
    inner: Mutex<Inner>,
}

impl PendingBuffer {
    pub fn new(max_per_peer: usize) -> Self {
        Self {
            max_per_peer,
            inner: Mutex::new(Inner {
                messages: VecDeque::new(),
                per_peer_count: HashMap::new(),
                seen_hashes: HashSet::new(),
            }),
        }
    }

    /// Admits `bytes` from `peer_id` unless the peer is already at quota or
    /// the message's digest has already been seen this round. Returns
    /// `true` if admitted.
    pub fn push(&self, peer_id: PeerId, bytes: Vec<u8>) -> bool {
        let digest = *blake3::hash(&bytes).as_bytes();
        let mut inner = self.inner.lock().unwrap();

        let count = inner.per_peer_count.get(&peer_id).copied().unwrap_or(0);
        if count >= self.max_per_peer {
            return false;
        }
        if inner.seen_hashes.contains(&digest) {
            return false;
        }

        inner.messages.push_back((peer_id.clone(), bytes));
        *inner.per_peer_count.entry(peer_id).or_insert(0) += 1;
        inner.seen_hashes.insert(digest);
        true
    }

    /// Pops up to `n` items in FIFO order, decrementing each sender's
    /// per-peer count. Does not remove anything from `seen_hashes`;
    /// duplicates stay suppressed for the buffer's lifetime.
    pub fn pop(&self, n: usize) -> Vec<(PeerId, Vec<u8>)> {
        let mut inner = self.inner.lock().unwrap();
        let mut out = Vec::with_capacity(n.min(inner.messages.len()));
        for _ in 0..n {
            match inner.messages.pop_front() {
                Some((peer, bytes)) => {
                    if let Some(count) = inner.per_peer_count.get_mut(&peer) {
                        *count = count.saturating_sub(1);
                    }
                    out.push((peer, bytes));
                }
                None => break,
            }
        }
        out
    }

    /// Empties the queue, counters, and seen set. Called at the start of
    /// every new DKG round and on abort.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.messages.clear();
        inner.per_peer_count.clear();
        inner.seen_hashes.clear();
    }

    pub fn has_seen(&self, digest: Hash32) -> bool {
        self.inner.lock().unwrap().seen_hashes.contains(&digest)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The four per-type buffers a single quorum round needs, bundled so the
/// scheduler and lifecycle coordinator can address them as one unit.
pub struct QuorumBuffers {
    pub contribution: PendingBuffer,
    pub complaint: PendingBuffer,
    pub justification: PendingBuffer,
    pub premature_commitment: PendingBuffer,
}

impl QuorumBuffers {
    pub fn new(max_per_peer: usize) -> Self {
        Self {
            contribution: PendingBuffer::new(max_per_peer),
            complaint: PendingBuffer::new(max_per_peer),
            justification: PendingBuffer::new(max_per_peer),
            premature_commitment: PendingBuffer::new(max_per_peer),
        }
    }

    pub fn for_kind(&self, kind: crate::wire::DkgMessageKind) -> &PendingBuffer {
        match kind {
            crate::wire::DkgMessageKind::Contribution => &self.contribution,
            crate::wire::DkgMessageKind::Complaint => &self.complaint,
            crate::wire::DkgMessageKind::Justification => &self.justification,
            crate::wire::DkgMessageKind::PrematureCommitment => &self.premature_commitment,
        }
    }

    pub fn clear_all(&self) {
        self.contribution.clear();
        self.complaint.clear();
        self.justification.clear();
        self.premature_commitment.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_peer_quota_is_enforced() {
        let buf = PendingBuffer::new(2);
        assert!(buf.push("peerA".to_string(), vec![1]));
        assert!(buf.push("peerA".to_string(), vec![2]));
        assert!(!buf.push("peerA".to_string(), vec![3]));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn duplicate_bytes_are_suppressed() {
        let buf = PendingBuffer::new(5);
        let digest = *blake3::hash(&[7, 7, 7]).as_bytes();
        assert!(buf.push("peerA".to_string(), vec![7, 7, 7]));
        assert!(buf.has_seen(digest));
        assert!(!buf.push("peerA".to_string(), vec![7, 7, 7]));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn pop_preserves_fifo_order_and_decrements_counts() {
        let buf = PendingBuffer::new(10);
        buf.push("peerA".to_string(), vec![1]);
        buf.push("peerB".to_string(), vec![2]);
        buf.push("peerA".to_string(), vec![3]);

        let popped = buf.pop(2);
        assert_eq!(popped, vec![("peerA".to_string(), vec![1]), ("peerB".to_string(), vec![2])]);
        assert_eq!(buf.len(), 1);

        assert!(buf.push("peerA".to_string(), vec![4]));
    }

    #[test]
    fn clear_resets_seen_hashes_allowing_resubmission() {
        let buf = PendingBuffer::new(1);
        buf.push("peerA".to_string(), vec![9]);
        buf.clear();
        assert!(buf.push("peerA".to_string(), vec![9]));
    }

    #[test]
    fn flood_of_one_peer_admits_exactly_max_per_peer() {
        let buf = PendingBuffer::new(5);
        for i in 0..6u8 {
            buf.push("peerX".to_string(), vec![i]);
        }
        assert_eq!(buf.len(), 5);
    }
}
