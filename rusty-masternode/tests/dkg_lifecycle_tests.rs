//! End-to-end tests driving `DkgScheduler`/`LifecycleCoordinator` against
//! fake collaborators and a synthetic block-height sequence, the way
//! `rusty-core`'s integration tests drive whole subsystems against
//! constructed fixtures rather than unit-level calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rusty_masternode::collaborators::{
    BlsVerifyJob, BlsVerifyOutcome, BlsWorker, ChainAnchor, ChainView, ConnectionManager, DkgCodec, Hash32, MasternodeRegistry, MemberId, OwnContribution, PeerId,
    PeerMisbehavior, QuorumTypeId, RegisteredMember, SporkId, SporkView,
};
use rusty_masternode::config::{DkgHandlerConfig, PendingBufferConfig, QuorumParams};
use rusty_masternode::lifecycle_coordinator::{Collaborators, LifecycleCoordinator};
use rusty_masternode::wire::BincodeDkgCodec;
use rusty_shared_types::{MasternodeID, OutPoint};

struct FakeChainView {
    hashes: Mutex<HashMap<u64, Hash32>>,
}

impl FakeChainView {
    fn new(max_height: u64) -> Self {
        let mut hashes = HashMap::new();
        for h in 0..=max_height {
            hashes.insert(h, *blake3::hash(&h.to_le_bytes()).as_bytes());
        }
        Self { hashes: Mutex::new(hashes) }
    }

    fn hash_at(&self, height: u64) -> Hash32 {
        *self.hashes.lock().unwrap().get(&height).expect("height not populated")
    }

    fn reorg_at(&self, height: u64) {
        self.hashes.lock().unwrap().insert(height, [0xffu8; 32]);
    }
}

impl ChainView for FakeChainView {
    fn ancestor(&self, block: ChainAnchor, depth: u64) -> Option<ChainAnchor> {
        let target = block.height.checked_sub(depth)?;
        self.hashes.lock().unwrap().get(&target).map(|h| ChainAnchor { hash: *h, height: target })
    }

    fn is_on_active_chain(&self, block: ChainAnchor) -> bool {
        self.hashes.lock().unwrap().get(&block.height) == Some(&block.hash)
    }

    fn tip(&self) -> ChainAnchor {
        let hashes = self.hashes.lock().unwrap();
        let height = *hashes.keys().max().unwrap_or(&0);
        ChainAnchor { hash: hashes[&height], height }
    }
}

struct FakeRegistry {
    members: Vec<RegisteredMember>,
}

impl MasternodeRegistry for FakeRegistry {
    fn members_at(&self, _anchor: ChainAnchor) -> Vec<RegisteredMember> {
        self.members.clone()
    }
}

#[derive(Default)]
struct FakeConnectionManager {
    declared: Mutex<Vec<String>>,
    probed: Mutex<Vec<MemberId>>,
}

impl ConnectionManager for FakeConnectionManager {
    fn declare_quorum_nodes(&self, quorum_type: QuorumTypeId, _base_block_hash: Hash32, members: Vec<MemberId>) {
        self.declared.lock().unwrap().push(format!("nodes:{quorum_type}:{}", members.len()));
    }

    fn declare_relay_members(&self, quorum_type: QuorumTypeId, _base_block_hash: Hash32, members: Vec<MemberId>) {
        self.declared.lock().unwrap().push(format!("relay:{quorum_type}:{}", members.len()));
    }

    fn add_pending_probes(&self, members: Vec<MemberId>) {
        self.probed.lock().unwrap().extend(members);
    }

    fn seconds_since_last_outbound(&self, _member: &MemberId) -> Option<u64> {
        None
    }
}

struct AlwaysValidWorker;

impl BlsWorker for AlwaysValidWorker {
    fn verify(&self, _job: BlsVerifyJob) -> Result<BlsVerifyOutcome, String> {
        Ok(BlsVerifyOutcome::Valid)
    }

    fn generate_contribution(&self, member_index: u32, _threshold: u32, recipient_count: u32) -> OwnContribution {
        OwnContribution {
            verification_vector: vec![vec![member_index as u8]],
            shares_by_recipient_index: (0..recipient_count).map(|_| vec![member_index as u8]).collect(),
        }
    }

    fn reveal_share(&self, _recipient_index: u32) -> Vec<u8> {
        vec![0]
    }

    fn sign(&self, _message: &[u8]) -> Vec<u8> {
        vec![7]
    }

    fn public_key(&self) -> Vec<u8> {
        vec![9]
    }

    fn aggregate_public_key(&self, commitments: &[Vec<u8>]) -> Vec<u8> {
        commitments.concat()
    }

    fn aggregate_signatures(&self, signatures: &[Vec<u8>]) -> Vec<u8> {
        signatures.concat()
    }
}

#[derive(Default)]
struct FakePeerMisbehavior {
    punished: Mutex<Vec<String>>,
}

impl PeerMisbehavior for FakePeerMisbehavior {
    fn punish(&self, peer: &PeerId, score: u32) {
        self.punished.lock().unwrap().push(format!("{peer}:{score}"));
    }

    fn punish_member(&self, member: &MemberId, score: u32) {
        self.punished.lock().unwrap().push(format!("{:?}:{score}", member));
    }
}

struct NoSporksActive;

impl SporkView for NoSporksActive {
    fn is_active(&self, _spork: SporkId, _quorum_type: QuorumTypeId) -> bool {
        false
    }
}

struct QuorumPoseOnly;

impl SporkView for QuorumPoseOnly {
    fn is_active(&self, spork: SporkId, _quorum_type: QuorumTypeId) -> bool {
        matches!(spork, SporkId::QuorumPose)
    }
}

/// Reports a fixed staleness (in seconds) per member, so tests can check the
/// `QUORUM_POSE` probe path actually consults per-member outbound state
/// instead of always probing everyone or no one.
#[derive(Default)]
struct StalenessConnectionManager {
    declared: Mutex<Vec<String>>,
    probed: Mutex<Vec<MemberId>>,
    staleness_seconds: Mutex<HashMap<MemberId, u64>>,
}

impl ConnectionManager for StalenessConnectionManager {
    fn declare_quorum_nodes(&self, quorum_type: QuorumTypeId, _base_block_hash: Hash32, members: Vec<MemberId>) {
        self.declared.lock().unwrap().push(format!("nodes:{quorum_type}:{}", members.len()));
    }

    fn declare_relay_members(&self, quorum_type: QuorumTypeId, _base_block_hash: Hash32, members: Vec<MemberId>) {
        self.declared.lock().unwrap().push(format!("relay:{quorum_type}:{}", members.len()));
    }

    fn add_pending_probes(&self, members: Vec<MemberId>) {
        self.probed.lock().unwrap().extend(members);
    }

    fn seconds_since_last_outbound(&self, member: &MemberId) -> Option<u64> {
        self.staleness_seconds.lock().unwrap().get(member).copied()
    }
}

fn member(i: u8) -> RegisteredMember {
    RegisteredMember {
        member_id: member_id(i),
        confirmed_hash_with_pro_tx_hash: [i.wrapping_add(100); 32],
        bls_public_key: vec![i],
        network_address: format!("10.0.0.{i}:9999"),
        eligible: true,
    }
}

fn member_id(i: u8) -> MemberId {
    MasternodeID(OutPoint { txid: [i; 32], vout: 0 })
}

fn quorum_params() -> QuorumParams {
    QuorumParams {
        type_id: 1,
        size: 3,
        min_size: 3,
        threshold: 2,
        dkg_interval: 8,
        dkg_phase_blocks: 2,
        dkg_mining_window_start: 0,
        dkg_mining_window_end: 0,
        dkg_bad_votes_threshold: 1,
        signing_active_quorum_count: 1,
        keep_old_connections: false,
        recovery_members: 0,
    }
}

fn handler_config(watch_quorums: bool) -> DkgHandlerConfig {
    DkgHandlerConfig {
        quorums: vec![quorum_params()],
        watch_quorums,
        pending_buffers: PendingBufferConfig {
            max_messages_per_peer: 8,
            drain_batch_size: 16,
        },
        phase_sleep_factor: 0.0,
        wakeup_ceiling_ms: 5,
        misbehavior_score_invalid_content: 10,
        misbehavior_score_input_reject: 1,
        membership_cache_size: 8,
        probe_retry_after_secs: 600,
        watch_seed_override: Some([0u8; 32]),
    }
}

fn advance_tip(chain: &FakeChainView, coordinators: &[Arc<LifecycleCoordinator>], from: u64, to: u64) {
    for height in from..=to {
        let anchor = ChainAnchor { height, hash: chain.hash_at(height) };
        for coordinator in coordinators {
            coordinator.updated_block_tip(anchor);
        }
        thread::sleep(Duration::from_millis(3));
    }
}

#[test]
fn three_of_three_members_finalize_over_synthetic_tip_sequence() {
    let chain = Arc::new(FakeChainView::new(64));
    let registry = Arc::new(FakeRegistry { members: (0..3).map(member).collect() });
    let worker: Arc<dyn BlsWorker> = Arc::new(AlwaysValidWorker);
    let codec: Arc<dyn DkgCodec> = Arc::new(BincodeDkgCodec);
    let sporks: Arc<dyn SporkView> = Arc::new(NoSporksActive);

    let mut coordinators = Vec::new();
    for i in 0..3u8 {
        let collaborators = Collaborators {
            chain: chain.clone(),
            registry: registry.clone(),
            connections: Arc::new(FakeConnectionManager::default()),
            bls_worker: worker.clone(),
            codec: codec.clone(),
            peer_misbehavior: Arc::new(FakePeerMisbehavior::default()),
            sporks: sporks.clone(),
        };
        let coordinator = Arc::new(LifecycleCoordinator::new(&handler_config(false), Some(member_id(i)), collaborators));
        coordinator.start();
        coordinators.push(coordinator);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let relay_coordinators = coordinators.clone();
    let relay_stop = stop.clone();
    let relay_handle = thread::spawn(move || {
        while !relay_stop.load(Ordering::SeqCst) {
            for (i, coordinator) in relay_coordinators.iter().enumerate() {
                for bytes in coordinator.drain_outgoing_messages() {
                    let Ok(msg) = BincodeDkgCodec.decode(&bytes) else { continue };
                    let tag = msg.command_tag();
                    for (j, other) in relay_coordinators.iter().enumerate() {
                        if i != j {
                            other.process_message(format!("peer-{i}"), tag, bytes.clone());
                        }
                    }
                }
            }
            thread::sleep(Duration::from_millis(2));
        }
    });

    // One full round: base at height 8, four 2-block phases through height
    // 16. Stops short of height 24 (the next `dkg_interval` multiple) so
    // exactly one round runs.
    advance_tip(&chain, &coordinators, 1, 20);

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let all_finalized = coordinators.iter().all(|c| c.stats(1).map(|s| s.rounds_finalized >= 1).unwrap_or(false));
        if all_finalized || Instant::now() >= deadline {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    stop.store(true, Ordering::SeqCst);
    relay_handle.join().unwrap();
    for coordinator in &coordinators {
        coordinator.stop();
    }

    for coordinator in &coordinators {
        let stats = coordinator.stats(1).unwrap();
        assert_eq!(stats.rounds_finalized, 1, "every honest member should finalize the round exactly once");
        assert_eq!(stats.rounds_aborted, 0);
    }
}

#[test]
fn quorum_pose_spork_probes_only_members_stale_past_the_retry_window() {
    let chain = Arc::new(FakeChainView::new(16));
    let members: Vec<_> = (0..3).map(member).collect();
    let registry = Arc::new(FakeRegistry { members: members.clone() });
    let connections = Arc::new(StalenessConnectionManager::default());
    {
        let mut staleness = connections.staleness_seconds.lock().unwrap();
        staleness.insert(member_id(0), 30); // recently connected, not stale
        staleness.insert(member_id(2), 3_600); // stale past the 600s default
        // member 1 absent: never connected, always probe-eligible
    }

    let collaborators = Collaborators {
        chain: chain.clone(),
        registry,
        connections: connections.clone(),
        bls_worker: Arc::new(AlwaysValidWorker),
        codec: Arc::new(BincodeDkgCodec),
        peer_misbehavior: Arc::new(FakePeerMisbehavior::default()),
        sporks: Arc::new(QuorumPoseOnly),
    };
    let coordinator = Arc::new(LifecycleCoordinator::new(&handler_config(false), Some(member_id(0)), collaborators));
    coordinator.start();

    advance_tip(&chain, std::slice::from_ref(&coordinator), 1, 8);

    let deadline = Instant::now() + Duration::from_secs(2);
    while connections.probed.lock().unwrap().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }

    coordinator.stop();

    let probed = connections.probed.lock().unwrap();
    assert!(probed.contains(&member_id(1)), "never-connected member must be probed: {probed:?}");
    assert!(probed.contains(&member_id(2)), "stale member must be probed: {probed:?}");
    assert!(!probed.contains(&member_id(0)), "recently connected member must not be probed: {probed:?}");
}

#[test]
fn non_member_in_watch_mode_declares_a_connection_but_builds_no_session() {
    let chain = Arc::new(FakeChainView::new(32));
    let registry = Arc::new(FakeRegistry { members: (0..3).map(member).collect() });
    let connections = Arc::new(FakeConnectionManager::default());

    let collaborators = Collaborators {
        chain: chain.clone(),
        registry,
        connections: connections.clone(),
        bls_worker: Arc::new(AlwaysValidWorker),
        codec: Arc::new(BincodeDkgCodec),
        peer_misbehavior: Arc::new(FakePeerMisbehavior::default()),
        sporks: Arc::new(NoSporksActive),
    };
    // my_member_id is `None`: this node does not belong to the quorum.
    let coordinator = Arc::new(LifecycleCoordinator::new(&handler_config(true), None, collaborators));
    coordinator.start();

    advance_tip(&chain, std::slice::from_ref(&coordinator), 1, 10);

    let deadline = Instant::now() + Duration::from_secs(2);
    while connections.declared.lock().unwrap().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }

    coordinator.stop();

    let declared = connections.declared.lock().unwrap();
    assert!(declared.contains(&"nodes:1:1".to_string()), "watcher should declare exactly one target: {declared:?}");

    let (phase, quorum_hash) = coordinator.current_phase_and_quorum(1).unwrap();
    assert_eq!(phase, rusty_masternode::dkg_session::DkgPhase::Idle);
    assert!(quorum_hash.is_none(), "a non-member never has a live session");
}

#[test]
fn reorg_mid_round_aborts_without_finalizing() {
    let chain = Arc::new(FakeChainView::new(64));
    let registry = Arc::new(FakeRegistry { members: (0..3).map(member).collect() });

    let collaborators = Collaborators {
        chain: chain.clone(),
        registry,
        connections: Arc::new(FakeConnectionManager::default()),
        bls_worker: Arc::new(AlwaysValidWorker),
        codec: Arc::new(BincodeDkgCodec),
        peer_misbehavior: Arc::new(FakePeerMisbehavior::default()),
        sporks: Arc::new(NoSporksActive),
    };
    let coordinator = Arc::new(LifecycleCoordinator::new(&handler_config(false), Some(member_id(0)), collaborators));
    coordinator.start();

    advance_tip(&chain, std::slice::from_ref(&coordinator), 1, 9);
    chain.reorg_at(8);
    advance_tip(&chain, std::slice::from_ref(&coordinator), 10, 20);

    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        let stats = coordinator.stats(1).unwrap();
        if stats.rounds_aborted >= 1 || Instant::now() >= deadline {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    coordinator.stop();

    let stats = coordinator.stats(1).unwrap();
    assert_eq!(stats.rounds_finalized, 0);
    assert!(stats.rounds_aborted >= 1, "a reorg of the round's base block must abort it");
}
