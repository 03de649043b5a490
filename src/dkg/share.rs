//! Share encryption, decryption, and dispute adjudication.
//!
//! A dealer never sends plaintext shares. For each recipient it derives
//! a one-time pad from the Diffie–Hellman point `sk_d · pk_r` and the
//! recipient's index, and publishes `f_d(j) + pad` on-chain. The
//! canonical vector has one slot per participant in ascending index
//! order, the dealer's own slot included, so every observer can locate
//! any slot without extra bookkeeping.
//!
//! Disputes make the pad accountable: the accusing recipient reveals
//! the shared point `sk_r · pk_d` with a discrete-log equality proof,
//! after which anyone can decrypt the disputed slot and test it against
//! the dealer's commitments. Exactly one side ends up at fault.

use rand_core::RngCore;
use tracing::instrument;

use crate::arith::poly::{verify_share, SecretPolynomial};
use crate::arith::{CurvePoint, Fr, PairingBackend};
use crate::dkg::keyshare::EqualDlogProof;
use crate::dkg::participant::{slot_of_index, validate_roster, Participant};
use crate::errors::Error;

/// A dealer's share-distribution output. The polynomial stays with the
/// dealer; the share vector and commitments go on-chain.
#[derive(Debug)]
pub struct ShareDeal<B: PairingBackend<Scalar = Fr>> {
    /// The dealer's secret polynomial (wiped on drop).
    pub polynomial: SecretPolynomial,
    /// Pad-encrypted evaluations, one per participant, ascending index.
    pub encrypted_shares: Vec<Fr>,
    /// Commitments `C_k = a_k · h1`, one per coefficient.
    pub commitments: Vec<B::G1>,
}

/// Derives the one-time pad for a recipient slot from the shared
/// Diffie–Hellman point.
fn shared_pad<B: PairingBackend<Scalar = Fr>>(shared_point: &B::G1, recipient_index: u32) -> Fr {
    let wire = shared_point.to_wire();
    let mut input = Vec::with_capacity(wire.as_ref().len() + 8);
    input.extend_from_slice(wire.as_ref());
    input.extend_from_slice(&u64::from(recipient_index).to_be_bytes());
    B::hash_to_scalar(&input)
}

/// Runs the dealer side of share distribution.
///
/// Samples a secret polynomial of degree `threshold`, commits to it,
/// and encrypts one evaluation per participant. The dealer must itself
/// appear in the roster under `dealer_index` with the public key
/// matching `dealer_secret`.
#[instrument(level = "debug", skip_all, fields(dealer = dealer_index, n = participants.len()))]
pub fn generate_shares<B: PairingBackend<Scalar = Fr>, R: RngCore + ?Sized>(
    rng: &mut R,
    dealer_secret: &Fr,
    dealer_index: u32,
    participants: &[Participant<B>],
    threshold: usize,
) -> Result<ShareDeal<B>, Error> {
    validate_roster(participants)?;
    let dealer_slot = slot_of_index(participants, dealer_index)
        .ok_or(Error::bad_input_from(dealer_index, "dealer not in roster"))?;
    let expected_pk = <B::G1 as CurvePoint<Fr>>::generator().mul_scalar(dealer_secret);
    if participants[dealer_slot].public_key != expected_pk {
        return Err(Error::bad_input_from(
            dealer_index,
            "dealer secret does not match registered public key",
        ));
    }

    let polynomial = SecretPolynomial::generate(rng, threshold)?;
    let commitments = polynomial.commitments::<B>();

    let encrypted_shares = participants
        .iter()
        .map(|recipient| {
            let shared_point = recipient.public_key.mul_scalar(dealer_secret);
            let pad = shared_pad::<B>(&shared_point, recipient.index);
            polynomial.evaluate_at_index(recipient.index) + pad
        })
        .collect();

    Ok(ShareDeal {
        polynomial,
        encrypted_shares,
        commitments,
    })
}

/// Runs the recipient side: recovers `f_d(own_index)` from a dealer's
/// published vector.
pub fn decrypt_share<B: PairingBackend<Scalar = Fr>>(
    own_secret: &Fr,
    own_index: u32,
    dealer: &Participant<B>,
    participants: &[Participant<B>],
    encrypted_shares: &[Fr],
) -> Result<Fr, Error> {
    if encrypted_shares.len() != participants.len() {
        return Err(Error::bad_input_from(
            dealer.index,
            "encrypted share vector has wrong length",
        ));
    }
    let slot = slot_of_index(participants, own_index)
        .ok_or(Error::bad_input_from(own_index, "recipient not in roster"))?;

    let shared_point = dealer.public_key.mul_scalar(own_secret);
    let pad = shared_pad::<B>(&shared_point, own_index);
    Ok(encrypted_shares[slot] - pad)
}

/// A recipient's dispute evidence: the shared Diffie–Hellman point and
/// a proof that it was honestly derived (`log_{g1}(pk_r) =
/// log_{pk_d}(k)`).
#[derive(Debug)]
pub struct SharedKeyReveal<B: PairingBackend<Scalar = Fr>> {
    pub shared_key: B::G1,
    pub proof: EqualDlogProof,
}

impl<B: PairingBackend<Scalar = Fr>> Clone for SharedKeyReveal<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: PairingBackend<Scalar = Fr>> Copy for SharedKeyReveal<B> {}

/// Outcome of a dispute: exactly one side is at fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisputeVerdict {
    DealerFaulty,
    AccuserFaulty,
}

/// Produces the dispute evidence against a dealer.
#[instrument(level = "debug", skip_all, fields(accuser = accuser.index, dealer = dealer.index))]
pub fn reveal_shared_key<B: PairingBackend<Scalar = Fr>, R: RngCore + ?Sized>(
    rng: &mut R,
    accuser_secret: &Fr,
    accuser: &Participant<B>,
    dealer: &Participant<B>,
) -> Result<SharedKeyReveal<B>, Error> {
    let shared_key = dealer.public_key.mul_scalar(accuser_secret);
    let g1 = <B::G1 as CurvePoint<Fr>>::generator();
    let proof = EqualDlogProof::prove::<B, R>(
        rng,
        &g1,
        &accuser.public_key,
        &dealer.public_key,
        &shared_key,
        accuser_secret,
    )?;
    Ok(SharedKeyReveal { shared_key, proof })
}

/// Adjudicates a dispute from public data.
///
/// An invalid reveal proof convicts the accuser. With a valid reveal,
/// the disputed slot is decrypted and tested against the dealer's
/// commitments: a mismatch convicts the dealer, a match convicts the
/// accuser (the share was good all along).
#[instrument(level = "info", skip_all, fields(accuser = accuser.index, dealer = dealer.index))]
pub fn adjudicate_dispute<B: PairingBackend<Scalar = Fr>>(
    dealer: &Participant<B>,
    accuser: &Participant<B>,
    reveal: &SharedKeyReveal<B>,
    encrypted_shares: &[Fr],
    commitments: &[B::G1],
    participants: &[Participant<B>],
) -> Result<DisputeVerdict, Error> {
    if encrypted_shares.len() != participants.len() {
        return Err(Error::bad_input_from(
            dealer.index,
            "encrypted share vector has wrong length",
        ));
    }
    let slot = slot_of_index(participants, accuser.index)
        .ok_or(Error::bad_input_from(accuser.index, "accuser not in roster"))?;

    let g1 = <B::G1 as CurvePoint<Fr>>::generator();
    let proof_ok = reveal.proof.verify::<B>(
        &g1,
        &accuser.public_key,
        &dealer.public_key,
        &reveal.shared_key,
    );
    if !proof_ok {
        return Ok(DisputeVerdict::AccuserFaulty);
    }

    let pad = shared_pad::<B>(&reveal.shared_key, accuser.index);
    let share = encrypted_shares[slot] - pad;
    if verify_share::<B>(commitments, accuser.index, &share) {
        Ok(DisputeVerdict::AccuserFaulty)
    } else {
        Ok(DisputeVerdict::DealerFaulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::Bn254Backend;
    use crate::dkg::participant::Address;
    use crate::dkg::{generate_keypair, threshold_for_participants};
    use rand::thread_rng;

    type B = Bn254Backend;

    fn setup(n: usize) -> (Vec<Fr>, Vec<Participant<B>>) {
        let mut rng = thread_rng();
        let mut secrets = Vec::with_capacity(n);
        let mut participants = Vec::with_capacity(n);
        for index in 1..=n as u32 {
            let (sk, pk) = generate_keypair::<B, _>(&mut rng).unwrap();
            secrets.push(sk);
            participants.push(Participant {
                address: Address([index as u8; 20]),
                index,
                public_key: pk,
            });
        }
        (secrets, participants)
    }

    #[test]
    fn deal_has_canonical_shape() {
        let mut rng = thread_rng();
        let (secrets, participants) = setup(4);
        let threshold = threshold_for_participants(4).unwrap();

        let deal =
            generate_shares::<B, _>(&mut rng, &secrets[0], 1, &participants, threshold).unwrap();
        assert_eq!(deal.encrypted_shares.len(), 4);
        assert_eq!(deal.commitments.len(), threshold + 1);
        assert_eq!(deal.polynomial.coefficients().len(), threshold + 1);
    }

    #[test]
    fn every_recipient_recovers_its_evaluation() {
        let mut rng = thread_rng();
        let (secrets, participants) = setup(5);
        let threshold = threshold_for_participants(5).unwrap();

        let dealer = participants[2];
        let deal =
            generate_shares::<B, _>(&mut rng, &secrets[2], 3, &participants, threshold).unwrap();

        for (secret, recipient) in secrets.iter().zip(&participants) {
            let share = decrypt_share::<B>(
                secret,
                recipient.index,
                &dealer,
                &participants,
                &deal.encrypted_shares,
            )
            .unwrap();
            assert_eq!(share, deal.polynomial.evaluate_at_index(recipient.index));
            assert!(verify_share::<B>(&deal.commitments, recipient.index, &share));
        }
    }

    #[test]
    fn dealer_decrypts_its_own_slot() {
        let mut rng = thread_rng();
        let (secrets, participants) = setup(4);
        let threshold = threshold_for_participants(4).unwrap();

        let deal =
            generate_shares::<B, _>(&mut rng, &secrets[1], 2, &participants, threshold).unwrap();
        let own = decrypt_share::<B>(
            &secrets[1],
            2,
            &participants[1],
            &participants,
            &deal.encrypted_shares,
        )
        .unwrap();
        assert_eq!(own, deal.polynomial.evaluate_at_index(2));
    }

    #[test]
    fn mismatched_dealer_secret_rejected() {
        let mut rng = thread_rng();
        let (secrets, participants) = setup(4);
        let threshold = threshold_for_participants(4).unwrap();

        let err = generate_shares::<B, _>(&mut rng, &secrets[0], 2, &participants, threshold)
            .unwrap_err();
        assert!(matches!(err, Error::BadInput { index: Some(2), .. }));
    }

    #[test]
    fn dispute_convicts_a_cheating_dealer() {
        let mut rng = thread_rng();
        let (secrets, participants) = setup(4);
        let threshold = threshold_for_participants(4).unwrap();

        let mut deal =
            generate_shares::<B, _>(&mut rng, &secrets[0], 1, &participants, threshold).unwrap();
        // Dealer corrupts the slot of participant 3 before publishing.
        deal.encrypted_shares[2] += Fr::from(1u64);

        let reveal =
            reveal_shared_key::<B, _>(&mut rng, &secrets[2], &participants[2], &participants[0])
                .unwrap();
        let verdict = adjudicate_dispute::<B>(
            &participants[0],
            &participants[2],
            &reveal,
            &deal.encrypted_shares,
            &deal.commitments,
            &participants,
        )
        .unwrap();
        assert_eq!(verdict, DisputeVerdict::DealerFaulty);
    }

    #[test]
    fn dispute_convicts_a_false_accuser() {
        let mut rng = thread_rng();
        let (secrets, participants) = setup(4);
        let threshold = threshold_for_participants(4).unwrap();

        let deal =
            generate_shares::<B, _>(&mut rng, &secrets[0], 1, &participants, threshold).unwrap();

        // Honest deal, accusation anyway.
        let reveal =
            reveal_shared_key::<B, _>(&mut rng, &secrets[2], &participants[2], &participants[0])
                .unwrap();
        let verdict = adjudicate_dispute::<B>(
            &participants[0],
            &participants[2],
            &reveal,
            &deal.encrypted_shares,
            &deal.commitments,
            &participants,
        )
        .unwrap();
        assert_eq!(verdict, DisputeVerdict::AccuserFaulty);

        // A reveal with a forged shared key is caught by the proof.
        let mut forged = reveal;
        forged.shared_key = forged.shared_key.add(&B::alt_g1());
        let verdict = adjudicate_dispute::<B>(
            &participants[0],
            &participants[2],
            &forged,
            &deal.encrypted_shares,
            &deal.commitments,
            &participants,
        )
        .unwrap();
        assert_eq!(verdict, DisputeVerdict::AccuserFaulty);
    }

    #[test]
    fn pads_differ_per_recipient() {
        let mut rng = thread_rng();
        let (secrets, participants) = setup(4);
        let threshold = threshold_for_participants(4).unwrap();

        let deal =
            generate_shares::<B, _>(&mut rng, &secrets[0], 1, &participants, threshold).unwrap();
        // If two pads collided, the difference of slots would equal the
        // difference of evaluations; astronomically unlikely, and a
        // cheap regression signal for the pad derivation.
        let d12 = deal.encrypted_shares[1] - deal.encrypted_shares[2];
        let e12 = deal.polynomial.evaluate_at_index(2) - deal.polynomial.evaluate_at_index(3);
        assert_ne!(d12, e12);
    }
}
