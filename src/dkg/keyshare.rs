//! Key-share publication and the equality-of-discrete-logs proof.
//!
//! After share distribution settles, each dealer publishes its constant
//! term `a₀` in three images: `a₀·h1` (already the first commitment),
//! `a₀·g1`, and `a₀·g2`. A Fiat–Shamir Chaum–Pedersen proof ties the
//! two G1 images to the same discrete log, and the pairing equation
//! `e(a₀·g1, g2) = e(g1, a₀·g2)` ties the G2 image to them. Together
//! they pin the dealer's aggregation contribution to the committed
//! polynomial.

use rand_core::RngCore;
use tracing::instrument;

use crate::arith::field::sample_nonzero;
use crate::arith::{CurvePoint, Fr, PairingBackend};
use crate::errors::Error;

/// Fiat–Shamir Chaum–Pedersen proof that two points share one discrete
/// log under their respective bases. Transmitted as `(c, σ)`; the
/// verifier reconstructs the commitments and recomputes the challenge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EqualDlogProof {
    pub challenge: Fr,
    pub response: Fr,
}

impl EqualDlogProof {
    /// Proves `point1 = witness·base1` and `point2 = witness·base2`.
    pub fn prove<B: PairingBackend<Scalar = Fr>, R: RngCore + ?Sized>(
        rng: &mut R,
        base1: &B::G1,
        point1: &B::G1,
        base2: &B::G1,
        point2: &B::G1,
        witness: &Fr,
    ) -> Result<Self, Error> {
        let nonce = sample_nonzero(rng)?;
        let commit1 = base1.mul_scalar(&nonce);
        let commit2 = base2.mul_scalar(&nonce);
        let challenge = transcript_challenge::<B>(base1, base2, point1, point2, &commit1, &commit2);
        let response = nonce + challenge * witness;
        Ok(EqualDlogProof {
            challenge,
            response,
        })
    }

    /// Verifies by reconstructing `R = σ·base − c·point` on both sides
    /// and recomputing the challenge over the transcript.
    pub fn verify<B: PairingBackend<Scalar = Fr>>(
        &self,
        base1: &B::G1,
        point1: &B::G1,
        base2: &B::G1,
        point2: &B::G1,
    ) -> bool {
        let commit1 = base1
            .mul_scalar(&self.response)
            .sub(&point1.mul_scalar(&self.challenge));
        let commit2 = base2
            .mul_scalar(&self.response)
            .sub(&point2.mul_scalar(&self.challenge));
        let expected =
            transcript_challenge::<B>(base1, base2, point1, point2, &commit1, &commit2);
        expected == self.challenge
    }
}

fn transcript_challenge<B: PairingBackend<Scalar = Fr>>(
    base1: &B::G1,
    base2: &B::G1,
    point1: &B::G1,
    point2: &B::G1,
    commit1: &B::G1,
    commit2: &B::G1,
) -> Fr {
    let mut transcript = Vec::with_capacity(6 * 64);
    for point in [base1, base2, point1, point2, commit1, commit2] {
        transcript.extend_from_slice(point.to_wire().as_ref());
    }
    B::hash_to_scalar(&transcript)
}

/// A dealer's key-share publication.
#[derive(Debug)]
pub struct KeyShare<B: PairingBackend<Scalar = Fr>> {
    pub dealer_index: u32,
    /// `a₀·h1`; equals the dealer's first polynomial commitment.
    pub key_share_h1: B::G1,
    /// `a₀·g1`; pinned to `key_share_h1` by the proof.
    pub key_share_g1: B::G1,
    /// `a₀·g2`; the dealer's contribution to the master public key.
    pub key_share_g2: B::G2,
    pub proof: EqualDlogProof,
}

impl<B: PairingBackend<Scalar = Fr>> Clone for KeyShare<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: PairingBackend<Scalar = Fr>> Copy for KeyShare<B> {}

/// Builds a dealer's key-share publication from its constant term.
#[instrument(level = "debug", skip_all, fields(dealer = dealer_index))]
pub fn generate_key_share<B: PairingBackend<Scalar = Fr>, R: RngCore + ?Sized>(
    rng: &mut R,
    dealer_index: u32,
    constant_term: &Fr,
) -> Result<KeyShare<B>, Error> {
    let h1 = B::alt_g1();
    let g1 = <B::G1 as CurvePoint<Fr>>::generator();
    let g2 = <B::G2 as CurvePoint<Fr>>::generator();

    let key_share_h1 = h1.mul_scalar(constant_term);
    let key_share_g1 = g1.mul_scalar(constant_term);
    let key_share_g2 = g2.mul_scalar(constant_term);
    let proof = EqualDlogProof::prove::<B, R>(
        rng,
        &h1,
        &key_share_h1,
        &g1,
        &key_share_g1,
        constant_term,
    )?;

    Ok(KeyShare {
        dealer_index,
        key_share_h1,
        key_share_g1,
        key_share_g2,
        proof,
    })
}

/// Verifies a key-share publication: the equal-discrete-log proof and
/// the pairing tie `e(a₀·g1, g2) = e(g1, a₀·g2)`.
///
/// A failure is attributed to the publishing dealer.
#[instrument(level = "debug", skip_all, fields(dealer = share.dealer_index))]
pub fn verify_key_share<B: PairingBackend<Scalar = Fr>>(share: &KeyShare<B>) -> Result<(), Error> {
    let h1 = B::alt_g1();
    let g1 = <B::G1 as CurvePoint<Fr>>::generator();
    let g2 = <B::G2 as CurvePoint<Fr>>::generator();

    if !share.proof.verify::<B>(
        &h1,
        &share.key_share_h1,
        &g1,
        &share.key_share_g1,
    ) {
        return Err(Error::PeerFaulty {
            index: share.dealer_index,
            reason: "key-share discrete-log proof rejected",
        });
    }

    let lhs = B::pairing(&share.key_share_g1, &g2);
    let rhs = B::pairing(&g1, &share.key_share_g2);
    if lhs != rhs {
        return Err(Error::PeerFaulty {
            index: share.dealer_index,
            reason: "key-share pairing consistency failed",
        });
    }
    Ok(())
}
