//! Deterministic quorum membership calculation.
//!
//! Grounded on `quorum_formation.rs::deterministic_selection`/
//! `generate_selection_seed` (seed the whole round from a blake3 hash of
//! `(block_height, block_hash, quorum_type)`), simplified to a pure
//! score-sort rather than weighted sampling. Must be byte-identical across
//! independent nodes given the same inputs, so no process-local randomness
//! may enter it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::collaborators::{ChainAnchor, Hash32, MasternodeRegistry, MemberId, QuorumTypeId};

/// A member as positioned in a quorum's ordered list: its identity plus the
/// index the connection planner and DKG session address it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSlot {
    pub member_id: MemberId,
    pub index: u32,
    pub bls_public_key: Vec<u8>,
    pub network_address: String,
}

/// The deterministically ordered member list for one `(quorum_type,
/// base_block)` pair (spec section 3, `QuorumMemberList`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuorumMemberList {
    pub type_id: QuorumTypeId,
    pub base_block_hash: Hash32,
    pub members: Vec<MemberSlot>,
}

impl QuorumMemberList {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn index_of(&self, member: &MemberId) -> Option<u32> {
        self.members.iter().find(|m| &m.member_id == member).map(|m| m.index)
    }
}

fn modifier(type_id: QuorumTypeId, base_block_hash: Hash32) -> Hash32 {
    let mut data = Vec::with_capacity(1 + 32);
    data.push(type_id);
    data.extend_from_slice(&base_block_hash);
    *blake3::hash(&data).as_bytes()
}

fn member_score(member_id: &MemberId, confirmed_hash: Hash32, modifier: Hash32) -> [u8; 32] {
    let mut data = Vec::with_capacity(32 + 32 + 32);
    data.extend_from_slice(&member_id.0.txid);
    data.extend_from_slice(&member_id.0.vout.to_le_bytes());
    data.extend_from_slice(&confirmed_hash);
    data.extend_from_slice(&modifier);
    *blake3::hash(&data).as_bytes()
}

struct CacheKey {
    type_id: QuorumTypeId,
    base_block_hash: Hash32,
}

/// Bounded cache of computed `QuorumMemberList`s, keyed by `(type_id,
/// base_block_hash)`. Entries are immutable once inserted; oldest entries
/// are evicted once a per-type bound is exceeded (spec section 3,
/// "Ownership & invariants").
pub struct MembershipCalculator {
    registry: Arc<dyn MasternodeRegistry>,
    cache_bound_per_type: usize,
    cache: Mutex<HashMap<(QuorumTypeId, Hash32), QuorumMemberList>>,
    order: Mutex<VecDeque<CacheKey>>,
}

impl MembershipCalculator {
    pub fn new(registry: Arc<dyn MasternodeRegistry>, cache_bound_per_type: usize) -> Self {
        Self {
            registry,
            cache_bound_per_type,
            cache: Mutex::new(HashMap::new()),
            order: Mutex::new(VecDeque::new()),
        }
    }

    /// `members_for(quorum_type, base_block)`: snapshot the registry, score
    /// and sort every eligible candidate, and take the top `size`.
    ///
    /// Returns a short list (smaller than `size`, possibly smaller than
    /// `min_size`) when the registry doesn't have enough eligible members;
    /// the caller decides whether that's viable.
    pub fn members_for(&self, type_id: QuorumTypeId, base_block: ChainAnchor, size: u32) -> QuorumMemberList {
        let key = (type_id, base_block.hash);
        if let Some(cached) = self.cache.lock().unwrap().get(&key) {
            return cached.clone();
        }

        let list = self.compute(type_id, base_block, size);
        self.insert_into_cache(key, list.clone());
        list
    }

    fn compute(&self, type_id: QuorumTypeId, base_block: ChainAnchor, size: u32) -> QuorumMemberList {
        let modifier = modifier(type_id, base_block.hash);
        let candidates = self.registry.members_at(base_block);

        let mut scored: Vec<([u8; 32], crate::collaborators::RegisteredMember)> = candidates
            .into_iter()
            .filter(|c| c.eligible)
            .map(|c| {
                let score = member_score(&c.member_id, c.confirmed_hash_with_pro_tx_hash, modifier);
                (score, c)
            })
            .collect();

        scored.sort_by(|(score_a, member_a), (score_b, member_b)| {
            score_a.cmp(score_b).then_with(|| member_a.member_id.0.txid.cmp(&member_b.member_id.0.txid))
        });

        let members = scored
            .into_iter()
            .take(size as usize)
            .enumerate()
            .map(|(index, (_score, candidate))| MemberSlot {
                member_id: candidate.member_id,
                index: index as u32,
                bls_public_key: candidate.bls_public_key,
                network_address: candidate.network_address,
            })
            .collect();

        QuorumMemberList {
            type_id,
            base_block_hash: base_block.hash,
            members,
        }
    }

    fn insert_into_cache(&self, key: (QuorumTypeId, Hash32), list: QuorumMemberList) {
        let mut cache = self.cache.lock().unwrap();
        let mut order = self.order.lock().unwrap();

        cache.insert(key, list);
        order.push_back(CacheKey {
            type_id: key.0,
            base_block_hash: key.1,
        });

        let type_count = order.iter().filter(|k| k.type_id == key.0).count();
        if type_count > self.cache_bound_per_type {
            if let Some(pos) = order.iter().position(|k| k.type_id == key.0) {
                let evicted = order.remove(pos).unwrap();
                cache.remove(&(evicted.type_id, evicted.base_block_hash));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::RegisteredMember;
    use rusty_shared_types::{MasternodeID, OutPoint};

    struct FakeRegistry {
        members: Vec<RegisteredMember>,
    }

    impl MasternodeRegistry for FakeRegistry {
        fn members_at(&self, _anchor: ChainAnchor) -> Vec<RegisteredMember> {
            self.members.clone()
        }
    }

    fn member(seed: u8) -> RegisteredMember {
        RegisteredMember {
            member_id: MasternodeID(OutPoint {
                txid: [seed; 32],
                vout: 0,
            }),
            confirmed_hash_with_pro_tx_hash: [seed.wrapping_add(1); 32],
            bls_public_key: vec![seed],
            network_address: format!("10.0.0.{seed}:9999"),
            eligible: true,
        }
    }

    fn anchor(height: u64, hash_byte: u8) -> ChainAnchor {
        ChainAnchor {
            hash: [hash_byte; 32],
            height,
        }
    }

    #[test]
    fn members_for_is_deterministic_across_calls() {
        let registry = FakeRegistry {
            members: (0..10).map(member).collect(),
        };
        let calc = MembershipCalculator::new(Arc::new(registry), 8);
        let base = anchor(24, 7);

        let a = calc.members_for(1, base, 3);
        let b = calc.members_for(1, base, 3);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn different_quorum_type_yields_different_order() {
        let registry = FakeRegistry {
            members: (0..10).map(member).collect(),
        };
        let calc = MembershipCalculator::new(Arc::new(registry), 8);
        let base = anchor(24, 7);

        let a = calc.members_for(1, base, 5);
        let b = calc.members_for(2, base, 5);
        let ids_a: Vec<_> = a.members.iter().map(|m| m.member_id.clone()).collect();
        let ids_b: Vec<_> = b.members.iter().map(|m| m.member_id.clone()).collect();
        assert_ne!(ids_a, ids_b);
    }

    #[test]
    fn short_list_returned_when_registry_has_too_few_members() {
        let registry = FakeRegistry {
            members: (0..2).map(member).collect(),
        };
        let calc = MembershipCalculator::new(Arc::new(registry), 8);
        let list = calc.members_for(1, anchor(24, 1), 5);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn cache_evicts_oldest_entry_per_type_once_bound_exceeded() {
        let registry = FakeRegistry {
            members: (0..10).map(member).collect(),
        };
        let calc = MembershipCalculator::new(Arc::new(registry), 2);

        calc.members_for(1, anchor(24, 1), 3);
        calc.members_for(1, anchor(48, 2), 3);
        calc.members_for(1, anchor(72, 3), 3);

        let cache = calc.cache.lock().unwrap();
        let remaining = cache.keys().filter(|(t, _)| *t == 1).count();
        assert_eq!(remaining, 2);
        assert!(!cache.contains_key(&(1, [1u8; 32])));
    }
}
