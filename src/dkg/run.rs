//! Per-run state machine.
//!
//! A run walks one way through the phase pipeline; the enclosing driver
//! decides *when* to advance (by block height) and this type decides
//! *whether* the accumulated on-chain payloads satisfy the phase's
//! cryptographic postcondition. Validation failures attributable to a
//! peer mark that peer dishonest and the run continues; anything
//! unattributable, or the loss of the quorum, lands in the terminal
//! `Failed` phase. A failed epoch is abandoned and the driver starts a
//! fresh run.

use std::collections::{BTreeMap, BTreeSet};

use tracing::instrument;

use crate::arith::{Fr, PairingBackend};
use crate::dkg::aggregate::{generate_master_public_key, verify_master_public_key};
use crate::dkg::group_key::PublishedDeal;
use crate::dkg::keyshare::KeyShare;
use crate::dkg::participant::{validate_roster, Participant};
use crate::dkg::share::DisputeVerdict;
use crate::dkg::verify::categorize_group_signers;
use crate::dkg::{signing_message, threshold_for_participants};
use crate::errors::Error;
use crate::wire::{GpkjSubmission, Payload};

/// Phases of a single DKG run. `Complete` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Registration,
    ShareDistribution,
    Dispute,
    KeyShareSubmission,
    MpkSubmission,
    GpkjSubmission,
    Complete,
    Failed,
}

/// Final outcome of a run.
#[derive(Debug)]
pub enum RunOutcome<B: PairingBackend<Scalar = Fr>> {
    Success {
        master_public_key: B::G2,
        quorum: Vec<Participant<B>>,
    },
    Failed {
        reason: &'static str,
        dishonest: Vec<u32>,
    },
}

/// State of one DKG run for one epoch.
#[derive(Debug)]
pub struct DkgRun<B: PairingBackend<Scalar = Fr>> {
    epoch: u64,
    chain_id: u64,
    phase: Phase,
    threshold: usize,
    registration_seen: bool,
    participants: Vec<Participant<B>>,
    deals: BTreeMap<u32, PublishedDeal<B>>,
    key_shares: BTreeMap<u32, KeyShare<B>>,
    master_public_key: Option<B::G2>,
    group_keys: BTreeMap<u32, GpkjSubmission>,
    dishonest: BTreeSet<u32>,
    outcome: Option<RunOutcome<B>>,
}

impl<B: PairingBackend<Scalar = Fr>> DkgRun<B> {
    /// Opens a run over a validated roster.
    pub fn new(epoch: u64, chain_id: u64, participants: Vec<Participant<B>>) -> Result<Self, Error> {
        validate_roster(&participants)?;
        let threshold = threshold_for_participants(participants.len())?;
        Ok(DkgRun {
            epoch,
            chain_id,
            phase: Phase::Registration,
            threshold,
            registration_seen: false,
            participants,
            deals: BTreeMap::new(),
            key_shares: BTreeMap::new(),
            master_public_key: None,
            group_keys: BTreeMap::new(),
            dishonest: BTreeSet::new(),
            outcome: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn dishonest(&self) -> impl Iterator<Item = u32> + '_ {
        self.dishonest.iter().copied()
    }

    pub fn outcome(&self) -> Option<&RunOutcome<B>> {
        self.outcome.as_ref()
    }

    /// The fixed domain-separation message all group signatures cover.
    pub fn message(&self) -> Vec<u8> {
        signing_message(self.epoch, self.chain_id)
    }

    /// Feeds one on-chain payload into the run.
    ///
    /// Peer-attributable validation failures mark the peer dishonest
    /// and return `Ok`; errors are reserved for payloads that cannot be
    /// processed at all (wrong phase, unknown submitter).
    #[instrument(level = "debug", skip_all, fields(phase = ?self.phase))]
    pub fn handle(&mut self, payload: &Payload) -> Result<(), Error> {
        match payload {
            Payload::RegistrationOpen(open) => {
                self.expect_phase(Phase::Registration)?;
                if open.epoch != self.epoch {
                    return Err(Error::bad_input("registration for a different epoch"));
                }
                if open.threshold as usize != self.threshold {
                    self.fail("announced threshold contradicts the roster size");
                    return Ok(());
                }
                self.registration_seen = true;
                Ok(())
            }
            Payload::ShareDistribution(distribution) => {
                self.expect_phase(Phase::ShareDistribution)?;
                let dealer = distribution.dealer_index;
                self.known_index(dealer)?;
                match distribution.decode::<B>(self.participants.len(), self.threshold) {
                    Ok(deal) => {
                        self.deals.insert(dealer, deal);
                    }
                    Err(_) => {
                        self.dishonest.insert(dealer);
                    }
                }
                Ok(())
            }
            Payload::KeyShareSubmission(submission) => {
                self.expect_phase(Phase::KeyShareSubmission)?;
                let dealer = submission.submitter_index;
                self.known_index(dealer)?;
                match submission.decode::<B>() {
                    Ok(share) => {
                        self.key_shares.insert(dealer, share);
                    }
                    Err(_) => {
                        self.dishonest.insert(dealer);
                    }
                }
                Ok(())
            }
            Payload::MpkSubmission(submission) => {
                self.expect_phase(Phase::MpkSubmission)?;
                let qualified: Vec<KeyShare<B>> = self.qualified_key_shares();
                let published = crate::wire::decode_g2::<B>(&submission.master_public_key)
                    .map_err(|_| Error::bad_input("malformed master public key"))?;
                match verify_master_public_key(&published, &qualified, self.threshold) {
                    Ok(faulty) => {
                        // Dealers excluded from the recomputed sum are
                        // at fault whether or not anyone published.
                        self.dishonest.extend(faulty);
                        self.master_public_key = Some(published);
                    }
                    Err(Error::ArithmeticInvariant(_)) => {
                        self.fail("published master public key contradicts dealer key shares");
                    }
                    Err(other) => return Err(other),
                }
                Ok(())
            }
            Payload::GpkjSubmission(submission) => {
                self.expect_phase(Phase::GpkjSubmission)?;
                self.known_index(submission.submitter_index)?;
                self.group_keys
                    .insert(submission.submitter_index, *submission);
                Ok(())
            }
        }
    }

    /// Applies a dispute verdict during the dispute phase.
    pub fn record_dispute(
        &mut self,
        verdict: DisputeVerdict,
        dealer_index: u32,
        accuser_index: u32,
    ) -> Result<(), Error> {
        self.expect_phase(Phase::Dispute)?;
        self.known_index(dealer_index)?;
        self.known_index(accuser_index)?;
        match verdict {
            DisputeVerdict::DealerFaulty => {
                self.dishonest.insert(dealer_index);
                self.deals.remove(&dealer_index);
            }
            DisputeVerdict::AccuserFaulty => {
                self.dishonest.insert(accuser_index);
            }
        }
        Ok(())
    }

    /// Closes the current phase at its block-height deadline: validates
    /// the phase postcondition and moves forward, or into `Failed`.
    #[instrument(level = "info", skip_all, fields(phase = ?self.phase))]
    pub fn advance(&mut self) -> Result<Phase, Error> {
        match self.phase {
            Phase::Registration => {
                if !self.registration_seen {
                    self.fail("registration never opened");
                } else {
                    self.phase = Phase::ShareDistribution;
                }
            }
            Phase::ShareDistribution => {
                // Silent dealers are faulty; their shares cannot reach
                // anyone.
                let silent: Vec<u32> = self
                    .participants
                    .iter()
                    .map(|p| p.index)
                    .filter(|index| !self.deals.contains_key(index))
                    .collect();
                self.dishonest.extend(silent);
                if self.quorum_lost() {
                    self.fail("too few dealers distributed shares");
                } else {
                    self.phase = Phase::Dispute;
                }
            }
            Phase::Dispute => {
                if self.quorum_lost() {
                    self.fail("dispute phase left no quorum");
                } else {
                    self.phase = Phase::KeyShareSubmission;
                }
            }
            Phase::KeyShareSubmission => {
                // Every surviving dealer owes a key share.
                let silent: Vec<u32> = self
                    .deals
                    .keys()
                    .copied()
                    .filter(|index| {
                        !self.key_shares.contains_key(index) && !self.dishonest.contains(index)
                    })
                    .collect();
                self.dishonest.extend(silent);
                if self.quorum_lost() {
                    self.fail("too few dealers submitted key shares");
                } else {
                    self.phase = Phase::MpkSubmission;
                }
            }
            Phase::MpkSubmission => {
                if self.master_public_key.is_none() {
                    // Nobody published; derive it from the qualified
                    // dealer set.
                    let qualified = self.qualified_key_shares();
                    match generate_master_public_key(&qualified, self.threshold) {
                        Ok((master, faulty)) => {
                            self.dishonest.extend(faulty);
                            self.master_public_key = Some(master);
                        }
                        Err(_) => {
                            self.fail("master public key could not be assembled");
                            return Ok(self.phase);
                        }
                    }
                }
                self.phase = Phase::GpkjSubmission;
            }
            Phase::GpkjSubmission => self.finish(),
            Phase::Complete | Phase::Failed => {
                return Err(Error::bad_input("run already terminal"));
            }
        }
        Ok(self.phase)
    }

    fn finish(&mut self) {
        let master = match self.master_public_key {
            Some(master) => master,
            None => {
                self.fail("no master public key at completion");
                return;
            }
        };

        // Participants who never published group keys are dishonest and
        // excluded from categorization input.
        let mut participants = Vec::new();
        let mut public_keys = Vec::new();
        let mut signatures = Vec::new();
        for participant in &self.participants {
            match self.group_keys.get(&participant.index) {
                Some(submission) if !self.dishonest.contains(&participant.index) => {
                    participants.push(*participant);
                    public_keys.push(submission.group_public_key);
                    signatures.push(submission.signature);
                }
                _ => {
                    self.dishonest.insert(participant.index);
                }
            }
        }

        let message = self.message();
        match categorize_group_signers::<B>(
            &message,
            &master,
            &participants,
            &public_keys,
            &signatures,
            self.threshold,
            self.participants.len(),
        ) {
            Ok(categorization) => {
                for participant in &categorization.dishonest {
                    self.dishonest.insert(participant.index);
                }
                if categorization.honest.len() < self.threshold + 1 {
                    self.fail("quorum lost at group-key verification");
                    return;
                }
                self.phase = Phase::Complete;
                self.outcome = Some(RunOutcome::Success {
                    master_public_key: master,
                    quorum: categorization.honest,
                });
            }
            Err(_) => {
                self.fail("group-key verification failed");
            }
        }
    }

    fn qualified_key_shares(&self) -> Vec<KeyShare<B>> {
        self.key_shares
            .iter()
            .filter(|(index, _)| !self.dishonest.contains(index) && self.deals.contains_key(index))
            .map(|(_, share)| *share)
            .collect()
    }

    fn quorum_lost(&self) -> bool {
        let alive = self
            .participants
            .iter()
            .filter(|p| !self.dishonest.contains(&p.index))
            .count();
        alive < self.threshold + 1
    }

    fn fail(&mut self, reason: &'static str) {
        self.phase = Phase::Failed;
        self.outcome = Some(RunOutcome::Failed {
            reason,
            dishonest: self.dishonest.iter().copied().collect(),
        });
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), Error> {
        if self.phase != expected {
            return Err(Error::bad_input("payload does not belong to this phase"));
        }
        Ok(())
    }

    fn known_index(&self, index: u32) -> Result<(), Error> {
        if self.participants.iter().any(|p| p.index == index) {
            Ok(())
        } else {
            Err(Error::bad_input_from(index, "unknown participant index"))
        }
    }
}
