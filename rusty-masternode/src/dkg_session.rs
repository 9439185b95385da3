//! The per-quorum-instantiation DKG protocol engine.
//!
//! Shape grounded on `dkg_manager.rs`'s phase-gated message handlers
//! (`handle_commitment_message`/`handle_complaint_message`/...) and
//! `rusty_shared_types::dkg::DKGSession::advance_phase`'s state machine,
//! reimplemented here against this handler's own phase set and message
//! kinds. The session is exclusively owned by its scheduler: nothing
//! outside `dkg_session` and `phase_scheduler` ever touches its fields.

use std::collections::{HashMap, HashSet};

use crate::collaborators::{BlsVerifyJob, BlsVerifyOutcome, BlsWorker, MemberId};
use crate::config::QuorumParams;
use crate::error::DkgError;
use crate::membership::QuorumMemberList;
use crate::wire::{Complaint, Contribution, DkgMessage, Justification, PrematureCommitment, QuorumHash};

/// The six-phase state machine plus its `Idle`/`Initialized` lead-in (spec
/// section 3, `PhaseState`). Transitions are forward-only within a session;
/// the only path back to `Idle` is destruction of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DkgPhase {
    Idle,
    Initialized,
    Contribute,
    Complain,
    Justify,
    Commit,
    Finalize,
}

impl DkgPhase {
    pub fn next(self) -> DkgPhase {
        match self {
            DkgPhase::Idle => DkgPhase::Initialized,
            DkgPhase::Initialized => DkgPhase::Contribute,
            DkgPhase::Contribute => DkgPhase::Complain,
            DkgPhase::Complain => DkgPhase::Justify,
            DkgPhase::Justify => DkgPhase::Commit,
            DkgPhase::Commit => DkgPhase::Finalize,
            DkgPhase::Finalize => DkgPhase::Idle,
        }
    }
}

/// Result of integrating a batch of messages into the session: messages to
/// broadcast plus zero or more peer-punishment reports (spec section 4.4,
/// "Contract per phase").
#[derive(Debug, Clone, Default)]
pub struct PhaseOutput {
    pub outgoing: Vec<DkgMessage>,
    pub punishments: Vec<(MemberId, u32, String)>,
}

impl PhaseOutput {
    fn punish(&mut self, member: MemberId, score: u32, reason: impl Into<String>) {
        self.punishments.push((member, score, reason.into()));
    }
}

/// The final output of a successfully finalized quorum: the valid-member
/// bitset a threshold of members agreed on, the aggregated public key, and
/// the aggregated signature over that view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalCommitment {
    pub valid_member_bitset: Vec<bool>,
    pub aggregated_public_key: Vec<u8>,
    pub aggregated_signature: Vec<u8>,
}

struct MemberContribution {
    verification_vector: Vec<Vec<u8>>,
    share_to_me: Option<Vec<u8>>,
}

/// One quorum instantiation's DKG state. Created on `InitNewQuorum`,
/// destroyed when the scheduler returns to idle (spec section 3,
/// `DkgSession`).
pub struct DkgSession {
    quorum: QuorumHash,
    members: QuorumMemberList,
    my_member_index: Option<u32>,
    threshold: u32,
    bad_votes_threshold: u32,
    phase: DkgPhase,

    contributed: bool,
    received_contributions: HashMap<u32, MemberContribution>,
    failed_senders: HashSet<u32>,

    /// accused index -> set of distinct accuser indices
    complaints: HashMap<u32, HashSet<u32>>,
    /// pairs cleared by a valid justification
    justified: HashSet<(u32, u32)>,

    valid_member_bitset: Option<Vec<bool>>,
    premature_commitments: HashMap<u32, PrematureCommitment>,

    pub finalized: bool,
    pub final_commitment: Option<FinalCommitment>,
}

impl DkgSession {
    pub fn new(quorum: QuorumHash, members: QuorumMemberList, my_member_index: Option<u32>, params: &QuorumParams) -> Self {
        Self {
            quorum,
            members,
            my_member_index,
            threshold: params.threshold,
            bad_votes_threshold: params.dkg_bad_votes_threshold,
            phase: DkgPhase::Initialized,
            contributed: false,
            received_contributions: HashMap::new(),
            failed_senders: HashSet::new(),
            complaints: HashMap::new(),
            justified: HashSet::new(),
            valid_member_bitset: None,
            premature_commitments: HashMap::new(),
            finalized: false,
            final_commitment: None,
        }
    }

    pub fn phase(&self) -> DkgPhase {
        self.phase
    }

    pub fn quorum(&self) -> QuorumHash {
        self.quorum
    }

    fn member_id(&self, index: u32) -> Option<MemberId> {
        self.members.members.iter().find(|m| m.index == index).map(|m| m.member_id.clone())
    }

    fn check_phase(&self, expected: DkgPhase) -> Result<(), DkgError> {
        if self.phase != expected {
            return Err(DkgError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// **Initialized -> Contribute.** Idempotent: calling this twice without
    /// an intervening phase advance does not regenerate the contribution.
    pub fn enter_contribute(&mut self, worker: &dyn BlsWorker) -> Result<PhaseOutput, DkgError> {
        self.check_phase(DkgPhase::Contribute)?;
        let mut out = PhaseOutput::default();

        let Some(my_index) = self.my_member_index else {
            return Ok(out);
        };
        if self.contributed {
            return Ok(out);
        }

        let own = worker.generate_contribution(my_index, self.threshold, self.members.len() as u32);
        self.contributed = true;

        let me = self.member_id(my_index).ok_or_else(|| DkgError::Fatal("own index missing from member list".into()))?;
        let shares = own
            .shares_by_recipient_index
            .into_iter()
            .enumerate()
            .filter_map(|(idx, ciphertext)| {
                self.member_id(idx as u32).map(|recipient| crate::wire::EncryptedShare {
                    recipient,
                    recipient_index: idx as u32,
                    ciphertext,
                })
            })
            .collect();

        // Retain our own verification vector under our own index so
        // `enter_commit` aggregates over the full valid-member set,
        // including self, not just the contributions received from others.
        self.received_contributions.insert(
            my_index,
            MemberContribution {
                verification_vector: own.verification_vector.clone(),
                share_to_me: None,
            },
        );

        out.outgoing.push(DkgMessage::Contribution(Contribution {
            quorum: self.quorum,
            sender: me,
            sender_index: my_index,
            verification_vector: own.verification_vector,
            shares,
            timestamp: 0,
        }));
        Ok(out)
    }

    /// Validates and integrates a batch of `Contribute`-phase messages.
    pub fn integrate_contributions(&mut self, msgs: Vec<Contribution>, worker: &dyn BlsWorker) -> Result<PhaseOutput, DkgError> {
        self.check_phase(DkgPhase::Contribute)?;
        let mut out = PhaseOutput::default();

        for msg in msgs {
            let sender_index = msg.sender_index;
            let my_index = self.my_member_index;

            let share_to_me = my_index.and_then(|mine| {
                msg.shares
                    .iter()
                    .find(|s| s.recipient_index == mine)
                    .map(|s| s.ciphertext.clone())
            });

            if let Some(ref ciphertext) = share_to_me {
                if let Some(mine) = my_index {
                    let outcome = worker.verify(BlsVerifyJob::ShareAgainstVerificationVector {
                        verification_vector: msg.verification_vector.clone(),
                        recipient_index: mine,
                        encrypted_share: ciphertext.clone(),
                        recipient_secret_key: Vec::new(),
                    });
                    match outcome {
                        Ok(BlsVerifyOutcome::Valid) => {}
                        Ok(BlsVerifyOutcome::Invalid) => {
                            self.failed_senders.insert(sender_index);
                        }
                        Err(reason) => {
                            out.punish(msg.sender.clone(), 10, format!("contribution verify failed: {reason}"));
                            self.failed_senders.insert(sender_index);
                        }
                    }
                }
            }

            self.received_contributions.insert(
                sender_index,
                MemberContribution {
                    verification_vector: msg.verification_vector,
                    share_to_me,
                },
            );
        }

        Ok(out)
    }

    /// **Contribute -> Complain.**
    pub fn enter_complain(&mut self) -> Result<PhaseOutput, DkgError> {
        self.check_phase(DkgPhase::Complain)?;
        let mut out = PhaseOutput::default();

        let Some(my_index) = self.my_member_index else {
            return Ok(out);
        };

        let mut accused: Vec<MemberId> = Vec::new();
        for member in &self.members.members {
            if member.index == my_index {
                continue;
            }
            let missing = !self.received_contributions.contains_key(&member.index);
            let failed = self.failed_senders.contains(&member.index);
            if missing || failed {
                accused.push(member.member_id.clone());
            }
        }

        if accused.is_empty() {
            return Ok(out);
        }

        let me = self
            .member_id(my_index)
            .ok_or_else(|| DkgError::Fatal("own index missing from member list".into()))?;
        out.outgoing.push(DkgMessage::Complaint(Complaint {
            quorum: self.quorum,
            sender: me,
            accused,
            timestamp: 0,
        }));
        Ok(out)
    }

    /// Integrates a batch of `Complain`-phase messages, incrementing each
    /// accused member's distinct-accuser count.
    pub fn integrate_complaints(&mut self, msgs: Vec<Complaint>) -> Result<PhaseOutput, DkgError> {
        self.check_phase(DkgPhase::Complain)?;
        let out = PhaseOutput::default();

        for msg in msgs {
            let Some(accuser_index) = self.members.index_of(&msg.sender) else {
                continue;
            };
            for accused in msg.accused {
                let Some(accused_index) = self.members.index_of(&accused) else {
                    continue;
                };
                self.complaints.entry(accused_index).or_default().insert(accuser_index);
            }
        }

        Ok(out)
    }

    /// **Complain -> Justify.**
    pub fn enter_justify(&mut self, worker: &dyn BlsWorker) -> Result<PhaseOutput, DkgError> {
        self.check_phase(DkgPhase::Justify)?;
        let mut out = PhaseOutput::default();

        let Some(my_index) = self.my_member_index else {
            return Ok(out);
        };
        let Some(accusers) = self.complaints.get(&my_index).cloned() else {
            return Ok(out);
        };
        if accusers.is_empty() {
            return Ok(out);
        }

        let me = self
            .member_id(my_index)
            .ok_or_else(|| DkgError::Fatal("own index missing from member list".into()))?;
        let plaintext_shares = accusers
            .into_iter()
            .map(|accuser_index| (self.member_id(accuser_index), worker.reveal_share(accuser_index)))
            .filter_map(|(maybe_member, share)| maybe_member.map(|member| (member, share)))
            .collect();

        out.outgoing.push(DkgMessage::Justification(Justification {
            quorum: self.quorum,
            sender: me,
            plaintext_shares,
            timestamp: 0,
        }));
        Ok(out)
    }

    /// Integrates a batch of `Justify`-phase messages. A justification that
    /// fails re-verification is ignored; the accused member remains
    /// accused. A valid one clears that specific accuser's complaint.
    pub fn integrate_justifications(&mut self, msgs: Vec<Justification>, worker: &dyn BlsWorker) -> Result<PhaseOutput, DkgError> {
        self.check_phase(DkgPhase::Justify)?;
        let mut out = PhaseOutput::default();

        for msg in msgs {
            let Some(accused_index) = self.members.index_of(&msg.sender) else {
                continue;
            };
            let Some(contribution) = self.received_contributions.get(&accused_index) else {
                continue;
            };
            let verification_vector = contribution.verification_vector.clone();

            for (accuser, plaintext_share) in msg.plaintext_shares {
                let Some(accuser_index) = self.members.index_of(&accuser) else {
                    continue;
                };
                let outcome = worker.verify(BlsVerifyJob::ShareAgainstVerificationVector {
                    verification_vector: verification_vector.clone(),
                    recipient_index: accuser_index,
                    encrypted_share: plaintext_share,
                    recipient_secret_key: Vec::new(),
                });
                if matches!(outcome, Ok(BlsVerifyOutcome::Valid)) {
                    self.justified.insert((accused_index, accuser_index));
                } else {
                    out.punish(msg.sender.clone(), 10, "justification failed re-verification");
                }
            }
        }

        Ok(out)
    }

    /// **Justify -> Commit.** Finalizes the valid-member bitset: a member
    /// is bad once its count of *unjustified* distinct accusers reaches
    /// `dkg_bad_votes_threshold`.
    pub fn enter_commit(&mut self, worker: &dyn BlsWorker) -> Result<PhaseOutput, DkgError> {
        self.check_phase(DkgPhase::Commit)?;
        let mut out = PhaseOutput::default();

        let n = self.members.len();
        let mut bitset = vec![true; n];
        for member in &self.members.members {
            let outstanding = self
                .complaints
                .get(&member.index)
                .map(|accusers| accusers.iter().filter(|a| !self.justified.contains(&(member.index, **a))).count())
                .unwrap_or(0);
            if outstanding as u32 >= self.bad_votes_threshold {
                bitset[member.index as usize] = false;
            }
        }
        self.valid_member_bitset = Some(bitset.clone());

        let Some(my_index) = self.my_member_index else {
            return Ok(out);
        };
        if !bitset[my_index as usize] {
            return Ok(out);
        }

        let commitments: Vec<Vec<u8>> = self
            .members
            .members
            .iter()
            .filter(|m| bitset[m.index as usize])
            .filter_map(|m| self.received_contributions.get(&m.index).map(|c| c.verification_vector.first().cloned().unwrap_or_default()))
            .collect();
        let aggregated_public_key = worker.aggregate_public_key(&commitments);

        let mut to_sign = Vec::new();
        for v in &bitset {
            to_sign.push(if *v { 1u8 } else { 0u8 });
        }
        to_sign.extend_from_slice(&aggregated_public_key);
        let signature = worker.sign(&to_sign);

        let me = self
            .member_id(my_index)
            .ok_or_else(|| DkgError::Fatal("own index missing from member list".into()))?;
        out.outgoing.push(DkgMessage::PrematureCommitment(PrematureCommitment {
            quorum: self.quorum,
            sender: me,
            valid_member_bitset: bitset,
            aggregated_public_key,
            signature,
            timestamp: 0,
        }));
        Ok(out)
    }

    /// Integrates a batch of `Commit`-phase premature commitments.
    pub fn integrate_premature_commitments(&mut self, msgs: Vec<PrematureCommitment>) -> Result<PhaseOutput, DkgError> {
        self.check_phase(DkgPhase::Commit)?;
        let out = PhaseOutput::default();

        for msg in msgs {
            let Some(sender_index) = self.members.index_of(&msg.sender) else {
                continue;
            };
            self.premature_commitments.insert(sender_index, msg);
        }

        Ok(out)
    }

    /// **Commit -> Finalize.** Groups premature commitments by identical
    /// valid-member bitsets; if a threshold agrees, aggregates their
    /// signatures into the final commitment.
    pub fn finalize(&mut self, worker: &dyn BlsWorker) -> Result<PhaseOutput, DkgError> {
        self.check_phase(DkgPhase::Finalize)?;
        let out = PhaseOutput::default();

        let mut groups: HashMap<Vec<bool>, Vec<&PrematureCommitment>> = HashMap::new();
        for commitment in self.premature_commitments.values() {
            groups.entry(commitment.valid_member_bitset.clone()).or_default().push(commitment);
        }

        let Some((bitset, agreeing)) = groups.into_iter().max_by_key(|(_, v)| v.len()) else {
            return Ok(out);
        };
        if (agreeing.len() as u32) < self.threshold {
            return Err(DkgError::NoFinalizingQuorum);
        }

        let aggregated_public_key = agreeing
            .first()
            .map(|c| c.aggregated_public_key.clone())
            .unwrap_or_default();
        let signatures: Vec<Vec<u8>> = agreeing.iter().map(|c| c.signature.clone()).collect();
        let aggregated_signature = worker.aggregate_signatures(&signatures);

        self.final_commitment = Some(FinalCommitment {
            valid_member_bitset: bitset,
            aggregated_public_key,
            aggregated_signature,
        });
        self.finalized = true;
        Ok(out)
    }

    /// Advances the session's phase pointer. Does not itself run any of the
    /// `enter_*` hooks; the scheduler calls those explicitly once it has
    /// decided it is safe to do so.
    pub fn advance_phase(&mut self) {
        self.phase = self.phase.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::OwnContribution;
    use crate::config::QuorumParams;
    use crate::membership::MemberSlot;
    use rusty_shared_types::{MasternodeID, OutPoint};
    use std::sync::Mutex;

    struct FakeWorker {
        invalid_senders: Mutex<HashSet<u32>>,
    }

    impl FakeWorker {
        fn new() -> Self {
            Self {
                invalid_senders: Mutex::new(HashSet::new()),
            }
        }

        fn mark_invalid(&self, index: u32) {
            self.invalid_senders.lock().unwrap().insert(index);
        }
    }

    impl BlsWorker for FakeWorker {
        fn verify(&self, job: BlsVerifyJob) -> Result<BlsVerifyOutcome, String> {
            match job {
                BlsVerifyJob::ShareAgainstVerificationVector { encrypted_share, .. } => {
                    let sender_marker = encrypted_share.first().copied().unwrap_or(0) as u32;
                    if self.invalid_senders.lock().unwrap().contains(&sender_marker) {
                        Ok(BlsVerifyOutcome::Invalid)
                    } else {
                        Ok(BlsVerifyOutcome::Valid)
                    }
                }
                BlsVerifyJob::AggregateSignature { .. } => Ok(BlsVerifyOutcome::Valid),
            }
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
            vec![1, 2, 3]
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

    fn member_list(n: u8) -> QuorumMemberList {
        QuorumMemberList {
            type_id: 1,
            base_block_hash: [5u8; 32],
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

    fn params() -> QuorumParams {
        QuorumParams {
            type_id: 1,
            size: 3,
            min_size: 3,
            threshold: 2,
            dkg_interval: 24,
            dkg_phase_blocks: 2,
            dkg_mining_window_start: 8,
            dkg_mining_window_end: 10,
            dkg_bad_votes_threshold: 1,
            signing_active_quorum_count: 4,
            keep_old_connections: false,
            recovery_members: 0,
        }
    }

    fn quorum() -> QuorumHash {
        QuorumHash {
            type_id: 1,
            base_block_hash: [5u8; 32],
        }
    }

    fn run_happy_path_contribute(sessions: &mut [DkgSession; 3], worker: &FakeWorker) {
        for s in sessions.iter_mut() {
            s.advance_phase();
        }
        let mut all_contribs = Vec::new();
        for s in sessions.iter_mut() {
            let out = s.enter_contribute(worker).unwrap();
            all_contribs.extend(out.outgoing);
        }
        for s in sessions.iter_mut() {
            let msgs: Vec<Contribution> = all_contribs
                .iter()
                .filter_map(|m| match m {
                    DkgMessage::Contribution(c) => Some(c.clone()),
                    _ => None,
                })
                .collect();
            s.integrate_contributions(msgs, worker).unwrap();
        }
    }

    #[test]
    fn happy_path_three_of_three_finalizes_with_full_bitset() {
        let members = member_list(3);
        let worker = FakeWorker::new();
        let mut sessions: [DkgSession; 3] = [
            DkgSession::new(quorum(), members.clone(), Some(0), &params()),
            DkgSession::new(quorum(), members.clone(), Some(1), &params()),
            DkgSession::new(quorum(), members.clone(), Some(2), &params()),
        ];

        run_happy_path_contribute(&mut sessions, &worker);

        for s in sessions.iter_mut() {
            s.advance_phase();
            let out = s.enter_complain().unwrap();
            assert!(out.outgoing.is_empty());
        }
        for s in sessions.iter_mut() {
            s.advance_phase();
            s.enter_justify(&worker).unwrap();
        }
        for s in sessions.iter_mut() {
            s.advance_phase();
            s.enter_commit(&worker).unwrap();
        }

        let mut commitments = Vec::new();
        for s in sessions.iter_mut() {
            let out = s.enter_commit(&worker).unwrap();
            commitments.extend(out.outgoing);
        }

        for s in sessions.iter_mut() {
            let msgs: Vec<PrematureCommitment> = commitments
                .iter()
                .filter_map(|m| match m {
                    DkgMessage::PrematureCommitment(c) => Some(c.clone()),
                    _ => None,
                })
                .collect();
            s.integrate_premature_commitments(msgs).unwrap();
            s.advance_phase();
            let finalize_out = s.finalize(&worker).unwrap();
            assert!(finalize_out.punishments.is_empty());
            assert!(s.finalized);
            assert_eq!(s.final_commitment.as_ref().unwrap().valid_member_bitset, vec![true, true, true]);
        }

        // Every honest member's own verification vector constant term must
        // be part of the aggregate, not just the ones it received from
        // others, so the published key is identical across all three.
        let keys: Vec<Vec<u8>> = sessions.iter().map(|s| s.final_commitment.as_ref().unwrap().aggregated_public_key.clone()).collect();
        assert_eq!(keys[0].len(), 3, "aggregated key must cover all three members including self");
        assert!(keys.windows(2).all(|w| w[0] == w[1]), "all members must agree on the same aggregated key: {keys:?}");
    }

    #[test]
    fn wrong_phase_call_is_rejected() {
        let members = member_list(3);
        let mut session = DkgSession::new(quorum(), members, Some(0), &params());
        let worker = FakeWorker::new();
        let err = session.enter_complain().unwrap_err();
        assert!(matches!(err, DkgError::WrongPhase { .. }));
        let _ = worker;
    }

    #[test]
    fn single_defector_is_complained_against_and_excluded() {
        let members = member_list(3);
        let worker = FakeWorker::new();
        worker.mark_invalid(1);

        let mut sessions: [DkgSession; 3] = [
            DkgSession::new(quorum(), members.clone(), Some(0), &params()),
            DkgSession::new(quorum(), members.clone(), Some(1), &params()),
            DkgSession::new(quorum(), members.clone(), Some(2), &params()),
        ];

        run_happy_path_contribute(&mut sessions, &worker);

        let mut complaints = Vec::new();
        for s in sessions.iter_mut() {
            s.advance_phase();
            let out = s.enter_complain().unwrap();
            complaints.extend(out.outgoing);
        }
        assert!(!complaints.is_empty());

        for s in sessions.iter_mut() {
            let msgs: Vec<Complaint> = complaints
                .iter()
                .filter_map(|m| match m {
                    DkgMessage::Complaint(c) => Some(c.clone()),
                    _ => None,
                })
                .collect();
            s.integrate_complaints(msgs).unwrap();
            s.advance_phase();
            s.enter_justify(&worker).unwrap();
            s.advance_phase();
        }

        let bob_session = &mut sessions[0];
        let out = bob_session.enter_commit(&worker).unwrap();
        if let Some(DkgMessage::PrematureCommitment(c)) = out.outgoing.first() {
            assert!(!c.valid_member_bitset[1]);
        }
    }
}
