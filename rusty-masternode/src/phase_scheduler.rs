//! Per-quorum-type phase scheduler: the heart of the handler.
//!
//! Grounded on `network_coordinator.rs`'s `periodic_maintenance`/
//! `run_maintenance` pattern (an `Instant`/`Mutex`-guarded interval check
//! driving a maintenance pass) and `pose_coordinator.rs`'s maintenance
//! config shape, generalized from wall-clock polling to the handler's
//! block-height-driven phase windows (spec section 4.5). One dedicated OS
//! thread runs `DkgScheduler::run` per configured quorum type.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info, warn};

use crate::collaborators::{
    BlsWorker, ChainAnchor, ChainView, ConnectionManager, DkgCodec, MemberId, PeerMisbehavior, QuorumTypeId, SporkId, SporkView,
};
use crate::config::QuorumParams;
use crate::connection_planner::{self, ConnectionPlan};
use crate::dkg_session::{DkgPhase, DkgSession, PhaseOutput};
use crate::membership::{MembershipCalculator, QuorumMemberList};
use crate::pending_buffer::QuorumBuffers;
use crate::wire::{DkgMessage, DkgMessageKind, QuorumHash};

/// A `(phase, quorum_hash)` snapshot, observed and updated under a single
/// mutex (spec section 4.5, Invariant C: "a single observation ... under a
/// mutex").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PhaseSnapshot {
    phase: DkgPhase,
    quorum_hash: Option<[u8; 32]>,
}

/// Cumulative counters surfaced for diagnostics; `current_phase_and_quorum`
/// is the single-value sibling of this.
#[derive(Debug, Default, Clone)]
pub struct SchedulerStats {
    pub rounds_started: u64,
    pub rounds_finalized: u64,
    pub rounds_aborted: u64,
}

struct SharedState {
    tip: AtomicU64,
    tip_hash: Mutex<[u8; 32]>,
    stop_requested: AtomicBool,
    snapshot: Mutex<PhaseSnapshot>,
    condvar: Condvar,
    stats: Mutex<SchedulerStats>,
}

/// Everything the scheduler needs to drive one quorum type end to end.
/// Collaborators are trait objects: this crate never knows their concrete
/// implementation (spec section 9, "friendship ... replaced with explicit
/// method signatures").
pub struct DkgScheduler {
    type_id: QuorumTypeId,
    params: QuorumParams,
    wakeup_ceiling: Duration,
    phase_sleep_factor: f64,

    chain: Arc<dyn ChainView>,
    membership: Arc<MembershipCalculator>,
    connections: Arc<dyn ConnectionManager>,
    bls_worker: Arc<dyn BlsWorker>,
    codec: Arc<dyn DkgCodec>,
    peer_misbehavior: Arc<dyn PeerMisbehavior>,
    sporks: Arc<dyn SporkView>,

    buffers: QuorumBuffers,
    drain_batch_size: usize,
    misbehavior_score_invalid: u32,
    misbehavior_score_reject: u32,
    watch_quorums: bool,
    probe_retry_after_secs: u64,

    shared: Arc<SharedState>,
    my_member_id: Option<MemberId>,

    /// The lifecycle coordinator's single watch-mode walk seed, shared
    /// across every scheduler.
    watch_seed: Arc<Mutex<crate::collaborators::Hash32>>,

    /// Encoded outgoing messages awaiting pickup by the network layer,
    /// mirroring `dkg_manager.rs`'s `outgoing_messages` queue: the
    /// scheduler only ever appends here, never pushes to a socket itself.
    outgoing_messages: Mutex<Vec<Vec<u8>>>,
}

impl DkgScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        params: QuorumParams,
        my_member_id: Option<MemberId>,
        chain: Arc<dyn ChainView>,
        membership: Arc<MembershipCalculator>,
        connections: Arc<dyn ConnectionManager>,
        bls_worker: Arc<dyn BlsWorker>,
        codec: Arc<dyn DkgCodec>,
        peer_misbehavior: Arc<dyn PeerMisbehavior>,
        sporks: Arc<dyn SporkView>,
        watch_seed: Arc<Mutex<crate::collaborators::Hash32>>,
        watch_quorums: bool,
        max_messages_per_peer: usize,
        drain_batch_size: usize,
        phase_sleep_factor: f64,
        wakeup_ceiling: Duration,
        misbehavior_score_invalid: u32,
        misbehavior_score_reject: u32,
        probe_retry_after_secs: u64,
    ) -> Self {
        let type_id = params.type_id;
        Self {
            type_id,
            params,
            wakeup_ceiling,
            phase_sleep_factor,
            chain,
            membership,
            connections,
            bls_worker,
            codec,
            peer_misbehavior,
            sporks,
            watch_seed,
            buffers: QuorumBuffers::new(max_messages_per_peer),
            drain_batch_size,
            misbehavior_score_invalid,
            misbehavior_score_reject,
            watch_quorums,
            probe_retry_after_secs,
            shared: Arc::new(SharedState {
                tip: AtomicU64::new(0),
                tip_hash: Mutex::new([0u8; 32]),
                stop_requested: AtomicBool::new(false),
                snapshot: Mutex::new(PhaseSnapshot {
                    phase: DkgPhase::Idle,
                    quorum_hash: None,
                }),
                condvar: Condvar::new(),
                stats: Mutex::new(SchedulerStats::default()),
            }),
            my_member_id,
            outgoing_messages: Mutex::new(Vec::new()),
        }
    }

    /// Drains and returns every encoded message queued for broadcast since
    /// the last call. The network layer is expected to poll this (e.g. from
    /// its own maintenance pass) rather than the scheduler pushing directly
    /// to a socket.
    pub fn drain_outgoing_messages(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.outgoing_messages.lock().unwrap())
    }

    /// Non-blocking: updates the shared tip and wakes the scheduler thread.
    /// Called from the chain notifier, never from the scheduler thread
    /// itself (spec section 5, "Chain notifications are non-blocking").
    pub fn updated_block_tip(&self, anchor: ChainAnchor) {
        self.shared.tip.store(anchor.height, Ordering::SeqCst);
        *self.shared.tip_hash.lock().unwrap() = anchor.hash;
        self.shared.condvar.notify_all();
    }

    /// Non-blocking: pushes raw bytes into the buffer for `command_tag`.
    pub fn process_message(&self, peer_id: crate::collaborators::PeerId, command_tag: &str, bytes: Vec<u8>) {
        let Some(kind) = DkgMessageKind::from_command_tag(command_tag) else {
            return;
        };
        let admitted = self.buffers.for_kind(kind).push(peer_id.clone(), bytes);
        if !admitted {
            self.peer_misbehavior.punish(&peer_id, self.misbehavior_score_reject);
        }
    }

    pub fn type_id(&self) -> QuorumTypeId {
        self.type_id
    }

    pub fn current_phase_and_quorum(&self) -> (DkgPhase, Option<[u8; 32]>) {
        let snap = *self.shared.snapshot.lock().unwrap();
        (snap.phase, snap.quorum_hash)
    }

    pub fn stats(&self) -> SchedulerStats {
        self.shared.stats.lock().unwrap().clone()
    }

    pub fn stop(&self) {
        self.shared.stop_requested.store(true, Ordering::SeqCst);
        self.shared.condvar.notify_all();
    }

    fn set_snapshot(&self, phase: DkgPhase, quorum_hash: Option<[u8; 32]>) {
        *self.shared.snapshot.lock().unwrap() = PhaseSnapshot { phase, quorum_hash };
    }

    fn should_abort(&self) -> bool {
        self.shared.stop_requested.load(Ordering::SeqCst)
    }

    fn tip(&self) -> ChainAnchor {
        ChainAnchor {
            height: self.shared.tip.load(Ordering::SeqCst),
            hash: *self.shared.tip_hash.lock().unwrap(),
        }
    }

    /// Sleeps in increments no larger than `wakeup_ceiling`, returning early
    /// if `stop_requested` or `predicate` is satisfied (spec section 5,
    /// "Any blocking call in the worker MUST wake at least every 100 ms").
    fn bounded_wait(&self, total: Duration, predicate: impl Fn() -> bool) {
        let deadline = std::time::Instant::now() + total;
        let guard = self.shared.snapshot.lock().unwrap();
        let mut guard = guard;
        loop {
            if self.should_abort() || predicate() {
                return;
            }
            let now = std::time::Instant::now();
            if now >= deadline {
                return;
            }
            let remaining = deadline - now;
            let step = remaining.min(self.wakeup_ceiling);
            let (g, _timeout) = self.shared.condvar.wait_timeout(guard, step).unwrap();
            guard = g;
        }
    }

    fn wait_until_height(&self, target_height: u64) {
        loop {
            if self.should_abort() || self.tip().height >= target_height {
                return;
            }
            let guard = self.shared.snapshot.lock().unwrap();
            let _ = self.shared.condvar.wait_timeout(guard, self.wakeup_ceiling).unwrap();
        }
    }

    fn base_block(&self, tip: ChainAnchor) -> Option<ChainAnchor> {
        let offset = tip.height % self.params.dkg_interval;
        self.chain.ancestor(tip, offset)
    }

    /// The scheduler loop (spec section 4.5, "Scheduler loop (design
    /// level)"). Intended to run on its own dedicated thread; see
    /// `LifecycleCoordinator::start`.
    pub fn run(self: Arc<Self>) {
        info!("dkg scheduler for quorum type {} starting", self.type_id);
        while !self.should_abort() {
            self.set_snapshot(DkgPhase::Idle, None);
            let Some(base) = self.wait_for_new_quorum() else {
                break;
            };

            self.run_one_round(base);
        }
        info!("dkg scheduler for quorum type {} stopped", self.type_id);
    }

    /// **Wait-for-new-quorum.** Blocks until `tip % dkg_interval == 0` and
    /// the base-block hash differs from the last round's.
    fn wait_for_new_quorum(&self) -> Option<ChainAnchor> {
        let mut last_base_hash: Option<[u8; 32]> = None;
        loop {
            if self.should_abort() {
                return None;
            }
            let tip = self.tip();
            if tip.height > 0 && tip.height % self.params.dkg_interval == 0 {
                if let Some(base) = self.base_block(tip) {
                    if Some(base.hash) != last_base_hash {
                        last_base_hash = Some(base.hash);
                        return Some(base);
                    }
                }
            }
            let guard = self.shared.snapshot.lock().unwrap();
            let _ = self.shared.condvar.wait_timeout(guard, self.wakeup_ceiling).unwrap();
        }
    }

    fn run_one_round(&self, base: ChainAnchor) {
        self.buffers.clear_all();
        let members = self.membership.members_for(self.type_id, base, self.params.size);

        if (members.len() as u32) < self.params.min_size {
            warn!(
                "quorum type {} at base {:?}: only {} eligible members (need {}), skipping round",
                self.type_id,
                base.hash,
                members.len(),
                self.params.min_size
            );
            self.shared.stats.lock().unwrap().rounds_aborted += 1;
            return;
        }

        let my_index = self.my_member_id.as_ref().and_then(|me| members.index_of(me));
        let watching = my_index.is_none() && self.watch_quorums;
        if my_index.is_none() && !watching {
            return;
        }

        let quorum = QuorumHash {
            type_id: self.type_id,
            base_block_hash: base.hash,
        };
        self.set_snapshot(DkgPhase::Initialized, Some(base.hash));
        self.shared.stats.lock().unwrap().rounds_started += 1;

        self.declare_connections(&members, my_index);

        if my_index.is_none() {
            // Watch mode: a single connection was declared above, but this
            // node is not a member, so no session is ever constructed.
            self.set_snapshot(DkgPhase::Idle, None);
            return;
        }

        let mut session = DkgSession::new(quorum, members.clone(), my_index, &self.params);

        let phases = [DkgPhase::Contribute, DkgPhase::Complain, DkgPhase::Justify, DkgPhase::Commit];
        let h_base = base.height;
        for (k, phase) in phases.iter().enumerate() {
            let k = k as u64 + 1;
            let window_start = h_base + (k - 1) * self.params.dkg_phase_blocks;
            let window_end = h_base + k * self.params.dkg_phase_blocks;

            if self.reorg_detected(base.hash) {
                self.abort_round(quorum.base_block_hash);
                return;
            }

            session.advance_phase();
            self.set_snapshot(*phase, Some(base.hash));

            self.sleep_before_phase(quorum.base_block_hash, my_index.unwrap_or(0), window_start, window_end);
            if self.reorg_detected(base.hash) {
                self.abort_round(quorum.base_block_hash);
                return;
            }

            let start_output = self.run_phase_entry(&mut session, *phase);
            self.broadcast(start_output);

            self.drain_until(&mut session, *phase, window_end, base.hash);
            if self.reorg_detected(base.hash) {
                self.abort_round(quorum.base_block_hash);
                return;
            }

            self.wait_until_height(window_end);
        }

        if self.reorg_detected(base.hash) {
            self.abort_round(quorum.base_block_hash);
            return;
        }

        session.advance_phase();
        self.set_snapshot(DkgPhase::Finalize, Some(base.hash));
        match session.finalize(self.bls_worker.as_ref()) {
            Ok(output) => {
                self.broadcast(output);
                if session.finalized {
                    self.shared.stats.lock().unwrap().rounds_finalized += 1;
                    info!("quorum type {} finalized at base {:?}", self.type_id, base.hash);
                }
            }
            Err(e) => {
                debug!("quorum type {} failed to finalize: {e}", self.type_id);
            }
        }

        self.buffers.clear_all();
        self.set_snapshot(DkgPhase::Idle, None);
    }

    fn declare_connections(&self, members: &QuorumMemberList, my_index: Option<u32>) {
        let all_connected = self.sporks.is_active(SporkId::AllConnected, self.type_id);
        let plan: ConnectionPlan = match my_index {
            Some(idx) => connection_planner::plan_for_member(members, idx, all_connected),
            None => {
                let mut seed = self.watch_seed.lock().unwrap();
                let (plan, next_seed) = connection_planner::plan_for_watcher(members, *seed);
                *seed = next_seed;
                plan
            }
        };
        self.connections.declare_quorum_nodes(self.type_id, members.base_block_hash, plan.quorum_nodes);
        self.connections.declare_relay_members(self.type_id, members.base_block_hash, plan.relay_members);
        if self.sporks.is_active(SporkId::QuorumPose, self.type_id) {
            let probes = connection_planner::probe_targets(
                members,
                |member| self.connections.seconds_since_last_outbound(member),
                self.probe_retry_after_secs,
            );
            self.connections.add_pending_probes(probes);
        }
    }

    fn sleep_before_phase(&self, quorum_hash: [u8; 32], member_index: u32, window_start: u64, window_end: u64) {
        let jitter = connection_planner::phase_sleep_jitter(quorum_hash, member_index) * self.phase_sleep_factor;
        let window_blocks = window_end.saturating_sub(window_start).max(1);
        let jittered_blocks = ((window_blocks as f64) * jitter) as u64;
        let target = window_start + jittered_blocks.min(window_blocks);
        self.wait_until_height(target);
    }

    fn run_phase_entry(&self, session: &mut DkgSession, phase: DkgPhase) -> PhaseOutput {
        let result = match phase {
            DkgPhase::Contribute => session.enter_contribute(self.bls_worker.as_ref()),
            DkgPhase::Complain => session.enter_complain(),
            DkgPhase::Justify => session.enter_justify(self.bls_worker.as_ref()),
            DkgPhase::Commit => session.enter_commit(self.bls_worker.as_ref()),
            _ => Ok(PhaseOutput::default()),
        };
        match result {
            Ok(output) => output,
            Err(e) => {
                debug!("quorum type {} phase {:?} entry failed: {e}", self.type_id, phase);
                PhaseOutput::default()
            }
        }
    }

    /// **Drain loop.** Pops up to `drain_batch_size` messages per wakeup,
    /// decodes them, and hands them to the session; re-checks reorg every
    /// iteration.
    fn drain_until(&self, session: &mut DkgSession, phase: DkgPhase, window_end: u64, expected_base_hash: [u8; 32]) {
        let kind = match phase {
            DkgPhase::Contribute => DkgMessageKind::Contribution,
            DkgPhase::Complain => DkgMessageKind::Complaint,
            DkgPhase::Justify => DkgMessageKind::Justification,
            DkgPhase::Commit => DkgMessageKind::PrematureCommitment,
            _ => return,
        };
        let buffer = self.buffers.for_kind(kind);

        loop {
            if self.should_abort() || self.reorg_detected(expected_base_hash) || self.tip().height >= window_end {
                return;
            }

            let batch = buffer.pop(self.drain_batch_size);
            if !batch.is_empty() {
                let output = self.decode_and_integrate(session, phase, batch);
                self.broadcast(output);
            }

            self.bounded_wait(self.wakeup_ceiling, || self.tip().height >= window_end);
        }
    }

    fn decode_and_integrate(&self, session: &mut DkgSession, phase: DkgPhase, batch: Vec<(crate::collaborators::PeerId, Vec<u8>)>) -> PhaseOutput {
        let mut contributions = Vec::new();
        let mut complaints = Vec::new();
        let mut justifications = Vec::new();
        let mut premature_commitments = Vec::new();

        for (peer_id, bytes) in batch {
            match self.codec.decode(&bytes) {
                Ok(DkgMessage::Contribution(c)) => contributions.push(c),
                Ok(DkgMessage::Complaint(c)) => complaints.push(c),
                Ok(DkgMessage::Justification(j)) => justifications.push(j),
                Ok(DkgMessage::PrematureCommitment(p)) => premature_commitments.push(p),
                Err(reason) => {
                    debug!("failed to decode {:?} message from {peer_id}: {reason}", phase);
                    self.peer_misbehavior.punish(&peer_id, self.misbehavior_score_invalid);
                }
            }
        }

        let result = match phase {
            DkgPhase::Contribute => session.integrate_contributions(contributions, self.bls_worker.as_ref()),
            DkgPhase::Complain => session.integrate_complaints(complaints),
            DkgPhase::Justify => session.integrate_justifications(justifications, self.bls_worker.as_ref()),
            DkgPhase::Commit => session.integrate_premature_commitments(premature_commitments),
            _ => Ok(PhaseOutput::default()),
        };

        match result {
            Ok(output) => output,
            Err(e) => {
                debug!("quorum type {} phase {:?} integration failed: {e}", self.type_id, phase);
                PhaseOutput::default()
            }
        }
    }

    fn broadcast(&self, output: PhaseOutput) {
        if !output.outgoing.is_empty() {
            let mut queue = self.outgoing_messages.lock().unwrap();
            for msg in output.outgoing {
                queue.push(self.codec.encode(&msg));
            }
        }
        for (member, score, reason) in output.punishments {
            debug!("punishing member {member:?}: {reason}");
            self.peer_misbehavior.punish_member(&member, score);
        }
    }

    /// **Invariant C.** A single observation of `(phase, quorum_hash)`
    /// against the live chain view determines whether the round is still
    /// valid.
    fn reorg_detected(&self, expected_base_hash: [u8; 32]) -> bool {
        let tip = self.tip();
        match self.chain.ancestor(tip, tip.height % self.params.dkg_interval) {
            Some(base) => base.hash != expected_base_hash || !self.chain.is_on_active_chain(base),
            None => true,
        }
    }

    fn abort_round(&self, quorum_hash: [u8; 32]) {
        warn!("quorum type {} aborting round {:?}: reorg detected", self.type_id, quorum_hash);
        self.buffers.clear_all();
        self.shared.stats.lock().unwrap().rounds_aborted += 1;
        self.set_snapshot(DkgPhase::Idle, None);
    }
}

/// Spawns `scheduler.run()` on its own dedicated OS thread, one per quorum
/// type.
pub fn spawn(scheduler: Arc<DkgScheduler>) -> JoinHandle<()> {
    std::thread::Builder::new()
        .name(format!("dkg-scheduler-{}", scheduler.type_id))
        .spawn(move || scheduler.run())
        .expect("failed to spawn dkg scheduler thread")
}
