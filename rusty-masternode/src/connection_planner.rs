//! Derives the connection topology a member needs for one quorum round.
//!
//! Grounded on `pose.rs`'s deterministic `ChaCha8Rng::from_seed(blake3_hash)`
//! pattern for selecting small deterministic subsets of a member list,
//! generalized here into the handler's four connection sets: ring-relay,
//! all-connected, watch-mode, and PoSe probes (spec section 4.2).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::collaborators::{Hash32, MemberId, QuorumTypeId};
use crate::membership::QuorumMemberList;

/// The connection sets a member (or watching non-member) needs for one
/// quorum round, handed verbatim to `ConnectionManager`. PoSe probe targets
/// are not part of this plan: unlike membership/relay topology, which is a
/// pure function of the member list, probes depend on live per-member
/// outbound-staleness state and are computed separately by `probe_targets`.
#[derive(Debug, Clone, Default)]
pub struct ConnectionPlan {
    pub quorum_nodes: Vec<MemberId>,
    pub relay_members: Vec<MemberId>,
}

/// Ring-relay neighbor indices for a member at `index` within a list of
/// `n` members: `(index + 2^k) mod n` for `k = 0..=max(1, floor(log2(n-1)) - 1)`,
/// skipping any index that maps back to the member itself.
pub fn ring_relay_indices(index: u32, n: u32) -> Vec<u32> {
    if n <= 1 {
        return Vec::new();
    }
    let max_k = {
        let log2_floor = 31 - (n - 1).leading_zeros();
        std::cmp::max(1, log2_floor.saturating_sub(1))
    };

    let mut out = Vec::new();
    for k in 0..=max_k {
        let step = 1u32 << k;
        let candidate = (index + step) % n;
        if candidate != index && !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

fn pair_initiator_hash(lo: &MemberId, hi: &MemberId, x: &MemberId) -> [u8; 32] {
    let mut data = Vec::new();
    data.extend_from_slice(&lo.0.txid);
    data.extend_from_slice(&lo.0.vout.to_le_bytes());
    data.extend_from_slice(&hi.0.txid);
    data.extend_from_slice(&hi.0.vout.to_le_bytes());
    data.extend_from_slice(&x.0.txid);
    data.extend_from_slice(&x.0.vout.to_le_bytes());
    *blake3::hash(&data).as_bytes()
}

/// Whether `me` is the deterministically chosen initiator of the pair
/// `(me, other)` in all-connected mode: the peer whose pairwise hash is
/// smaller initiates (spec section 4.2).
pub fn is_initiator(me: &MemberId, other: &MemberId) -> bool {
    let (lo, hi) = if me.0.txid <= other.0.txid { (me, other) } else { (other, me) };
    let h_me = pair_initiator_hash(lo, hi, me);
    let h_other = pair_initiator_hash(lo, hi, other);
    h_me < h_other
}

/// Advances the watch-mode random walk one step: `r_{k+1} = H(r_k ||
/// type_id || base_block_hash)`.
pub fn advance_watch_seed(seed: Hash32, type_id: QuorumTypeId, base_block_hash: Hash32) -> Hash32 {
    let mut data = Vec::with_capacity(32 + 1 + 32);
    data.extend_from_slice(&seed);
    data.push(type_id);
    data.extend_from_slice(&base_block_hash);
    *blake3::hash(&data).as_bytes()
}

/// Index of the single member a watching non-member connects to, given the
/// current walk state `seed`.
pub fn watch_target_index(seed: Hash32, n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut acc = 0u32;
    for b in &seed[..4] {
        acc = (acc << 8) | *b as u32;
    }
    acc % n
}

/// Builds the connection plan for a member at `my_index` within `members`.
/// `all_connected` mirrors whether the `ALL_CONNECTED` spork is active for
/// this quorum type (policy external to this crate, see
/// `collaborators::SporkView`).
pub fn plan_for_member(members: &QuorumMemberList, my_index: u32, all_connected: bool) -> ConnectionPlan {
    let n = members.len() as u32;
    let me = match members.members.iter().find(|m| m.index == my_index) {
        Some(m) => &m.member_id,
        None => return ConnectionPlan::default(),
    };

    if all_connected {
        let quorum_nodes = members
            .members
            .iter()
            .filter(|m| &m.member_id != me)
            .map(|m| m.member_id.clone())
            .collect();
        return ConnectionPlan {
            quorum_nodes,
            relay_members: Vec::new(),
        };
    }

    let relay_members = ring_relay_indices(my_index, n)
        .into_iter()
        .filter_map(|i| members.members.iter().find(|m| m.index == i))
        .map(|m| m.member_id.clone())
        .collect();

    ConnectionPlan {
        quorum_nodes: Vec::new(),
        relay_members,
    }
}

/// Builds the single-connection plan for a watching non-member, walking the
/// seed forward once per quorum round (spec section 4.2, "Watch mode").
pub fn plan_for_watcher(members: &QuorumMemberList, seed: Hash32) -> (ConnectionPlan, Hash32) {
    let n = members.len() as u32;
    if n == 0 {
        return (ConnectionPlan::default(), seed);
    }
    let next_seed = advance_watch_seed(seed, members.type_id, members.base_block_hash);
    let target_index = watch_target_index(next_seed, n);
    let target = members
        .members
        .iter()
        .find(|m| m.index == target_index)
        .map(|m| m.member_id.clone());

    let plan = ConnectionPlan {
        quorum_nodes: target.into_iter().collect(),
        relay_members: Vec::new(),
    };
    (plan, next_seed)
}

/// Members whose last successful outbound connection is stale enough to
/// warrant a PoSe probe (spec section 4.2, "Probe connections"). `staleness`
/// reports seconds-since-last-success per member, sourced from
/// `ConnectionManager::seconds_since_last_outbound`; members absent from it
/// (never successfully connected) are always probed.
pub fn probe_targets(members: &QuorumMemberList, staleness_seconds: impl Fn(&MemberId) -> Option<u64>, threshold_seconds: u64) -> Vec<MemberId> {
    members
        .members
        .iter()
        .filter(|m| staleness_seconds(&m.member_id).map(|secs| secs >= threshold_seconds).unwrap_or(true))
        .map(|m| m.member_id.clone())
        .collect()
}

/// Deterministic jitter fraction (in `[0, 1)`) for the sleep-before-phase
/// step, seeded from `(quorum_hash, member_index)` so it is reproducible
/// and auditable across runs (spec section 4.5, step 3a).
pub fn phase_sleep_jitter(quorum_hash: Hash32, member_index: u32) -> f64 {
    let mut data = Vec::with_capacity(32 + 4);
    data.extend_from_slice(&quorum_hash);
    data.extend_from_slice(&member_index.to_le_bytes());
    let seed = *blake3::hash(&data).as_bytes();
    let mut rng = ChaCha8Rng::from_seed(seed);
    rng.gen::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MemberSlot;
    use rusty_shared_types::{MasternodeID, OutPoint};

    fn member_list(n: u8) -> QuorumMemberList {
        QuorumMemberList {
            type_id: 1,
            base_block_hash: [9u8; 32],
            members: (0..n)
                .map(|i| MemberSlot {
                    member_id: MasternodeID(OutPoint { txid: [i; 32], vout: 0 }),
                    index: i as u32,
                    bls_public_key: vec![i],
                    network_address: format!("10.0.0.{i}:9999"),
                })
                .collect(),
        }
    }

    #[test]
    fn ring_relay_set_never_contains_self_and_is_logarithmic() {
        for n in 2u32..64 {
            for index in 0..n {
                let set = ring_relay_indices(index, n);
                assert!(!set.contains(&index));
                assert!((set.len() as u32) <= 32 - (n - 1).leading_zeros());
            }
        }
    }

    #[test]
    fn exactly_one_side_of_a_pair_initiates() {
        let a = MasternodeID(OutPoint { txid: [1u8; 32], vout: 0 });
        let b = MasternodeID(OutPoint { txid: [2u8; 32], vout: 0 });
        assert_ne!(is_initiator(&a, &b), is_initiator(&b, &a));
    }

    #[test]
    fn watch_walk_is_deterministic_given_same_seed() {
        let members = member_list(10);
        let seed = [3u8; 32];
        let (plan_a, next_a) = plan_for_watcher(&members, seed);
        let (plan_b, next_b) = plan_for_watcher(&members, seed);
        assert_eq!(plan_a.quorum_nodes, plan_b.quorum_nodes);
        assert_eq!(next_a, next_b);
        assert_eq!(plan_a.quorum_nodes.len(), 1);
    }

    #[test]
    fn probe_targets_includes_never_connected_members() {
        let members = member_list(3);
        let probes = probe_targets(&members, |_| None, 600);
        assert_eq!(probes.len(), 3);
    }

    #[test]
    fn probe_targets_excludes_recently_connected_members() {
        let members = member_list(3);
        let probes = probe_targets(&members, |_| Some(30), 600);
        assert!(probes.is_empty());
    }

    #[test]
    fn probe_targets_includes_only_stale_members() {
        let members = member_list(3);
        let probes = probe_targets(
            &members,
            |m| if m.0.txid[0] == 1 { Some(3600) } else { Some(30) },
            600,
        );
        assert_eq!(probes, vec![members.members[1].member_id.clone()]);
    }
}
