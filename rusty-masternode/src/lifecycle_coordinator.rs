//! Owns one phase scheduler per configured quorum type.
//!
//! Grounded on `network_coordinator.rs::MNNetworkCoordinator`: it owns a set
//! of per-concern managers, dispatches inbound messages to the right one by
//! variant, and aggregates their outgoing messages for the network layer to
//! pick up. Here the "managers" are `DkgScheduler`s, one per quorum type,
//! and dispatch is by quorum type rather than by message family.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;

use log::{info, warn};

use crate::collaborators::{
    BlsWorker, ChainAnchor, ChainView, ConnectionManager, DkgCodec, Hash32, MasternodeRegistry, MemberId, PeerId, PeerMisbehavior, QuorumTypeId, SporkView,
};
use crate::config::DkgHandlerConfig;
use crate::membership::MembershipCalculator;
use crate::phase_scheduler::{self, DkgScheduler, SchedulerStats};
use crate::wire::DkgMessage;

static PROCESS_WATCH_SEED: OnceLock<Hash32> = OnceLock::new();

fn process_watch_seed(override_seed: Option<Hash32>) -> Hash32 {
    *PROCESS_WATCH_SEED.get_or_init(|| override_seed.unwrap_or_else(random_seed))
}

fn random_seed() -> Hash32 {
    use rand::RngCore;
    let mut seed = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut seed);
    seed
}

/// The collaborators a `LifecycleCoordinator` needs to assemble every
/// scheduler it owns. Bundled into one struct since every scheduler is
/// constructed with the same set (spec section 6, "Consumed from
/// collaborators").
pub struct Collaborators {
    pub chain: Arc<dyn ChainView>,
    pub registry: Arc<dyn MasternodeRegistry>,
    pub connections: Arc<dyn ConnectionManager>,
    pub bls_worker: Arc<dyn BlsWorker>,
    pub codec: Arc<dyn DkgCodec>,
    pub peer_misbehavior: Arc<dyn PeerMisbehavior>,
    pub sporks: Arc<dyn SporkView>,
}

/// Owns one `DkgScheduler` per configured quorum type, the membership
/// cache they share, and the single process-wide watch-mode seed (spec
/// section 9, "Global process-wide caches ... become explicitly owned
/// members of the lifecycle coordinator").
pub struct LifecycleCoordinator {
    schedulers: HashMap<QuorumTypeId, Arc<DkgScheduler>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    codec: Arc<dyn DkgCodec>,
}

impl LifecycleCoordinator {
    pub fn new(config: &DkgHandlerConfig, my_member_id: Option<MemberId>, collaborators: Collaborators) -> Self {
        let membership = Arc::new(MembershipCalculator::new(collaborators.registry.clone(), config.membership_cache_size));
        let watch_seed = Arc::new(Mutex::new(process_watch_seed(config.watch_seed_override)));

        let mut schedulers = HashMap::new();
        for params in &config.quorums {
            let scheduler = Arc::new(DkgScheduler::new(
                params.clone(),
                my_member_id.clone(),
                collaborators.chain.clone(),
                membership.clone(),
                collaborators.connections.clone(),
                collaborators.bls_worker.clone(),
                collaborators.codec.clone(),
                collaborators.peer_misbehavior.clone(),
                collaborators.sporks.clone(),
                watch_seed.clone(),
                config.watch_quorums,
                config.pending_buffers.max_messages_per_peer,
                config.pending_buffers.drain_batch_size,
                config.phase_sleep_factor,
                std::time::Duration::from_millis(config.wakeup_ceiling_ms),
                config.misbehavior_score_invalid_content,
                config.misbehavior_score_input_reject,
                config.probe_retry_after_secs,
            ));
            schedulers.insert(params.type_id, scheduler);
        }

        Self {
            schedulers,
            handles: Mutex::new(Vec::new()),
            codec: collaborators.codec,
        }
    }

    /// Spawns one dedicated OS thread per configured quorum type.
    pub fn start(&self) {
        let mut handles = self.handles.lock().unwrap();
        for scheduler in self.schedulers.values() {
            info!("starting dkg scheduler for quorum type {}", scheduler.type_id());
            handles.push(phase_scheduler::spawn(scheduler.clone()));
        }
    }

    /// Signals every scheduler to stop and joins their worker threads.
    /// Buffers are dropped only once their consumer (the scheduler thread)
    /// has exited, which `join` guarantees here.
    pub fn stop(&self) {
        for scheduler in self.schedulers.values() {
            scheduler.stop();
        }
        let mut handles = self.handles.lock().unwrap();
        for handle in handles.drain(..) {
            if handle.join().is_err() {
                warn!("a dkg scheduler thread panicked while stopping");
            }
        }
    }

    /// Forwards a new chain tip to every scheduler.
    pub fn updated_block_tip(&self, anchor: ChainAnchor) {
        for scheduler in self.schedulers.values() {
            scheduler.updated_block_tip(anchor);
        }
    }

    /// Dispatches an inbound message to the scheduler for its quorum type.
    /// A lightweight structural decode (no cryptographic verification) is
    /// done here only to read the `QuorumHash`; the expensive BLS checks
    /// stay deferred to the scheduler's drain loop, preserving the
    /// network-thread-never-blocks-on-crypto guarantee (spec section 4.3).
    pub fn process_message(&self, peer_id: PeerId, command_tag: &str, bytes: Vec<u8>) {
        let type_id = match self.codec.decode(&bytes) {
            Ok(msg) => self.type_id_of(&msg),
            Err(_) => {
                // Undecodable bytes: admit into every scheduler's buffer so
                // each one's own quota/dup-suppression and misbehavior
                // reporting applies; at most one will ever pop it.
                for scheduler in self.schedulers.values() {
                    scheduler.process_message(peer_id.clone(), command_tag, bytes.clone());
                }
                return;
            }
        };
        if let Some(scheduler) = self.schedulers.get(&type_id) {
            scheduler.process_message(peer_id, command_tag, bytes);
        }
    }

    fn type_id_of(&self, msg: &DkgMessage) -> QuorumTypeId {
        msg.quorum().type_id
    }

    /// Aggregates every scheduler's queued outgoing messages, mirroring
    /// `network_coordinator.rs::get_outgoing_messages`.
    pub fn drain_outgoing_messages(&self) -> Vec<Vec<u8>> {
        self.schedulers.values().flat_map(|s| s.drain_outgoing_messages()).collect()
    }

    pub fn current_phase_and_quorum(&self, type_id: QuorumTypeId) -> Option<(crate::dkg_session::DkgPhase, Option<Hash32>)> {
        self.schedulers.get(&type_id).map(|s| s.current_phase_and_quorum())
    }

    pub fn stats(&self, type_id: QuorumTypeId) -> Option<SchedulerStats> {
        self.schedulers.get(&type_id).map(|s| s.stats())
    }
}
