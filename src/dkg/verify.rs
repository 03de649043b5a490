//! Group-signer verification and honest/dishonest categorization.
//!
//! After group-key submission the chain holds, for every participant,
//! a claimed group public key and a BLS signature over the run's
//! message. Acceptance of a single signer requires, in order:
//!
//! 1. a declared index inside `[1, n]` for the full registration
//!    roster size `n`, not claimed by anyone else (a duplicated index
//!    convicts both holders);
//! 2. well-formed points — the public key in the G2 subgroup, the
//!    signature on the G1 curve (malformed bytes never panic);
//! 3. the BLS equation `e(σᵢ, g2) = e(H(m), gpkᵢ)`;
//! 4. consistency with the quorum: the first `threshold + 1` signers
//!    passing 1–3 fix a degree-`threshold` polynomial in G2, and every
//!    other signer's key must lie on it at its own index.
//!
//! The quorum itself must interpolate to the master public key at 0;
//! if it does not, the inconsistency is unattributable and the run
//! fails. All iteration is in ascending declared index, so results are
//! bit-reproducible.

use rayon::prelude::*;
use tracing::instrument;

use crate::arith::lagrange::interpolate_points;
use crate::arith::{CurvePoint, Fr, PairingBackend};
use crate::dkg::participant::Participant;
use crate::errors::Error;
use crate::wire::{decode_g1, decode_g2};

/// Result of categorization: every participant lands in exactly one
/// set, both in ascending declared-index order.
#[derive(Debug)]
pub struct Categorization<B: PairingBackend<Scalar = Fr>> {
    pub honest: Vec<Participant<B>>,
    pub dishonest: Vec<Participant<B>>,
}

/// Per-signer outcome of the stateless point and signature checks.
enum SignerStatus<B: PairingBackend<Scalar = Fr>> {
    Accepted { gpk: B::G2, sig: B::G1 },
    BadEncoding,
    BadSignature,
}

fn check_signers<B: PairingBackend<Scalar = Fr>>(
    message: &[u8],
    public_keys: &[[u8; 128]],
    signatures: &[[u8; 64]],
) -> Vec<SignerStatus<B>> {
    let hashed_message = B::hash_to_g1(message);
    let g2 = <B::G2 as CurvePoint<Fr>>::generator();

    public_keys
        .par_iter()
        .zip(signatures.par_iter())
        .map(|(gpk_wire, sig_wire)| {
            let gpk = match decode_g2::<B>(gpk_wire) {
                Ok(point) => point,
                Err(_) => return SignerStatus::BadEncoding,
            };
            let sig = match decode_g1::<B>(sig_wire) {
                Ok(point) => point,
                Err(_) => return SignerStatus::BadEncoding,
            };
            if B::pairing(&sig, &g2) != B::pairing(&hashed_message, &gpk) {
                return SignerStatus::BadSignature;
            }
            SignerStatus::Accepted { gpk, sig }
        })
        .collect()
}

/// Declared-index validity: inside `[1, roster_size]` and claimed by
/// exactly one signer. The bound is the full registration roster size,
/// not the length of the signer set, which may already be a subset
/// when earlier phases dropped participants.
fn valid_index<B: PairingBackend<Scalar = Fr>>(
    participants: &[Participant<B>],
    roster_size: usize,
    index: u32,
) -> bool {
    index >= 1
        && index as usize <= roster_size
        && participants.iter().filter(|p| p.index == index).count() == 1
}

/// Verifies the full signer set against the master public key.
///
/// Returns `Ok(true)` when every signer is individually valid and the
/// first `threshold + 1` of them reconstruct both the master public key
/// and a valid group signature; `Ok(false)` on any clean cryptographic
/// rejection. Malformed points are reported as [`Error::BadInput`] with
/// the offending participant's index.
#[instrument(level = "info", skip_all, fields(signers = participants.len()))]
pub fn verify_group_signers<B: PairingBackend<Scalar = Fr>>(
    message: &[u8],
    master_public_key: &B::G2,
    participants: &[Participant<B>],
    public_keys: &[[u8; 128]],
    signatures: &[[u8; 64]],
    threshold: usize,
) -> Result<bool, Error> {
    check_input_shape(participants, public_keys, signatures)?;

    let mut accepted = Vec::with_capacity(participants.len());
    for (participant, status) in participants
        .iter()
        .zip(check_signers::<B>(message, public_keys, signatures))
    {
        match status {
            SignerStatus::Accepted { gpk, sig } => {
                accepted.push((participant.index, gpk, sig));
            }
            SignerStatus::BadEncoding => {
                return Err(Error::bad_input_from(
                    participant.index,
                    "malformed group public key or signature",
                ));
            }
            SignerStatus::BadSignature => return Ok(false),
        }
    }

    if accepted.len() < threshold + 1 {
        return Ok(false);
    }
    accepted.sort_by_key(|(index, _, _)| *index);
    let quorum = &accepted[..threshold + 1];

    let gpk_points: Vec<(u32, B::G2)> = quorum.iter().map(|(i, gpk, _)| (*i, *gpk)).collect();
    let sig_points: Vec<(u32, B::G1)> = quorum.iter().map(|(i, _, sig)| (*i, *sig)).collect();

    let zero = Fr::from(0u64);
    if interpolate_points(&gpk_points, zero)? != *master_public_key {
        return Ok(false);
    }
    let group_signature = interpolate_points(&sig_points, zero)?;
    let g2 = <B::G2 as CurvePoint<Fr>>::generator();
    if B::pairing(&group_signature, &g2) != B::pairing(&B::hash_to_g1(message), master_public_key)
    {
        return Ok(false);
    }

    // Everyone outside the quorum must lie on the polynomial the quorum
    // fixes.
    for (index, gpk, _) in &accepted[threshold + 1..] {
        let expected = interpolate_points(&gpk_points, Fr::from(u64::from(*index)))?;
        if expected != *gpk {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Splits the signer set into honest and dishonest participants.
///
/// `roster_size` is the full registration roster size `n`; the signer
/// set may be any subset of it, since participants dropped in earlier
/// phases no longer submit. Declared indices are range-checked against
/// `roster_size`, never against the subset length.
///
/// Never fails on malformed peer input; a participant with undecodable
/// points is simply dishonest. Fails only when fewer than
/// `threshold + 1` signers survive (the run is lost) or when the
/// surviving quorum contradicts the master public key (unattributable,
/// indicates an upstream bug).
#[instrument(level = "info", skip_all, fields(signers = participants.len()))]
pub fn categorize_group_signers<B: PairingBackend<Scalar = Fr>>(
    message: &[u8],
    master_public_key: &B::G2,
    participants: &[Participant<B>],
    public_keys: &[[u8; 128]],
    signatures: &[[u8; 64]],
    threshold: usize,
    roster_size: usize,
) -> Result<Categorization<B>, Error> {
    check_input_shape(participants, public_keys, signatures)?;
    if participants.len() > roster_size {
        return Err(Error::bad_input("signer set larger than the roster"));
    }

    let statuses = check_signers::<B>(message, public_keys, signatures);

    // Participants passing the index and stateless checks, ascending by
    // declared index.
    let mut candidates: Vec<(usize, u32, B::G2)> = statuses
        .iter()
        .enumerate()
        .filter_map(|(pos, status)| match status {
            SignerStatus::Accepted { gpk, .. }
                if valid_index(participants, roster_size, participants[pos].index) =>
            {
                Some((pos, participants[pos].index, *gpk))
            }
            _ => None,
        })
        .collect();
    candidates.sort_by_key(|(_, index, _)| *index);

    if candidates.len() < threshold + 1 {
        return Err(Error::InsufficientHonest {
            required: threshold + 1,
            provided: candidates.len(),
        });
    }

    let quorum: Vec<(u32, B::G2)> = candidates[..threshold + 1]
        .iter()
        .map(|(_, index, gpk)| (*index, *gpk))
        .collect();
    if interpolate_points(&quorum, Fr::from(0u64))? != *master_public_key {
        return Err(Error::ArithmeticInvariant(
            "accepted quorum does not reconstruct the master public key",
        ));
    }

    let mut honest_positions: Vec<usize> = Vec::with_capacity(candidates.len());
    for (pos, index, gpk) in &candidates {
        let expected = if quorum.iter().any(|(i, _)| i == index) {
            *gpk
        } else {
            interpolate_points(&quorum, Fr::from(u64::from(*index)))?
        };
        if expected == *gpk {
            honest_positions.push(*pos);
        }
    }

    if honest_positions.len() < threshold + 1 {
        return Err(Error::InsufficientHonest {
            required: threshold + 1,
            provided: honest_positions.len(),
        });
    }

    let mut honest: Vec<Participant<B>> = honest_positions
        .iter()
        .map(|&pos| participants[pos])
        .collect();
    let mut dishonest: Vec<Participant<B>> = participants
        .iter()
        .enumerate()
        .filter(|(pos, _)| !honest_positions.contains(pos))
        .map(|(_, participant)| *participant)
        .collect();
    honest.sort_by_key(|p| p.index);
    dishonest.sort_by_key(|p| p.index);

    Ok(Categorization { honest, dishonest })
}

fn check_input_shape<B: PairingBackend<Scalar = Fr>>(
    participants: &[Participant<B>],
    public_keys: &[[u8; 128]],
    signatures: &[[u8; 64]],
) -> Result<(), Error> {
    if participants.len() != public_keys.len() || participants.len() != signatures.len() {
        return Err(Error::bad_input(
            "signer, key, and signature lists must have equal length",
        ));
    }
    if participants.is_empty() {
        return Err(Error::bad_input("empty signer set"));
    }
    Ok(())
}
