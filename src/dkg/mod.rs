//! The distributed key generation protocol.
//!
//! A DKG run is a one-shot linear pipeline across a fixed roster of `n`
//! participants:
//!
//! 1. **Registration**: each participant publishes an encryption key
//!    ([`generate_keypair`]); the roster fixes everyone's evaluation
//!    index.
//! 2. **Share distribution** ([`share`]): each dealer samples a secret
//!    polynomial of degree [`threshold_for_participants`]`(n)`, commits
//!    to it, and publishes pad-encrypted evaluations for every
//!    participant.
//! 3. **Dispute** ([`share`]): a recipient holding a bad share reveals
//!    the shared pad key with a proof, letting everyone adjudicate.
//! 4. **Key shares** ([`keyshare`]): each dealer publishes its constant
//!    term in three group images plus an equality-of-discrete-logs
//!    proof.
//! 5. **Aggregation** ([`aggregate`]): qualified dealers' G2 key shares
//!    sum to the master public key.
//! 6. **Group keys** ([`group_key`]): each participant folds its
//!    received shares into a group private key, and publishes the G2
//!    image plus a BLS signature.
//! 7. **Verification** ([`verify`]): every signer is checked against
//!    the pairing equations and categorized honest or dishonest.
//!
//! All functions are pure and stateless; the enclosing driver sequences
//! phases by block height and moves results on-chain. [`run`] offers the
//! corresponding state machine over wire payloads.

use rand_core::RngCore;
use tracing::instrument;

use crate::arith::field::sample_nonzero;
use crate::arith::{CurvePoint, Fr, PairingBackend};
use crate::errors::Error;

pub mod aggregate;
pub mod group_key;
pub mod keyshare;
pub mod participant;
pub mod run;
pub mod share;
pub mod verify;

pub use aggregate::{generate_master_public_key, verify_master_public_key, MasterPublicKey};
pub use group_key::{generate_group_keys, GroupKeyShare, GroupPrivateKey, PublishedDeal};
pub use keyshare::{generate_key_share, verify_key_share, EqualDlogProof, KeyShare};
pub use participant::{validate_roster, Address, Participant};
pub use run::{DkgRun, Phase, RunOutcome};
pub use share::{
    adjudicate_dispute, decrypt_share, generate_shares, reveal_shared_key, DisputeVerdict,
    ShareDeal, SharedKeyReveal,
};
pub use verify::{categorize_group_signers, verify_group_signers, Categorization};

/// Protocol tag prefixed to every signed message.
const PROTOCOL_TAG: &[u8] = b"ethdkg-bn254-v1";

/// Minimum roster size; below this a single fault can block the run.
pub const MIN_PARTICIPANTS: usize = 4;

/// Threshold rule: `⌈n/2⌉` for `n ≥ 4`.
///
/// The secret polynomials have degree equal to the threshold, so any
/// `threshold + 1` shares reconstruct and any `threshold` reveal
/// nothing.
pub fn threshold_for_participants(n: usize) -> Result<usize, Error> {
    if n < MIN_PARTICIPANTS {
        return Err(Error::bad_input("at least 4 participants required"));
    }
    Ok(n.div_ceil(2))
}

/// Generates an encryption keypair `(sk, pk = sk·g1)`.
///
/// The secret is uniform and nonzero; RNG failure aborts rather than
/// degrading.
#[instrument(level = "debug", skip_all)]
pub fn generate_keypair<B: PairingBackend<Scalar = Fr>, R: RngCore + ?Sized>(
    rng: &mut R,
) -> Result<(Fr, B::G1), Error> {
    let secret = sample_nonzero(rng)?;
    let public = <B::G1 as CurvePoint<Fr>>::generator().mul_scalar(&secret);
    Ok((secret, public))
}

/// Builds the fixed domain-separation message for a run: protocol tag,
/// epoch, and chain id, all big-endian.
pub fn signing_message(epoch: u64, chain_id: u64) -> Vec<u8> {
    let mut message = Vec::with_capacity(PROTOCOL_TAG.len() + 16);
    message.extend_from_slice(PROTOCOL_TAG);
    message.extend_from_slice(&epoch.to_be_bytes());
    message.extend_from_slice(&chain_id.to_be_bytes());
    message
}
