//! Group key derivation and BLS signing.
//!
//! Once the qualified dealer set is fixed, participant `i`'s group
//! private key is the sum of the decrypted shares `f_d(i)` over those
//! dealers: the evaluations of the aggregate polynomial `F = Σ_d f_d`
//! at `i`. Any `threshold + 1` such evaluations interpolate to the
//! master secret `F(0)`, which nobody ever holds.

use tracing::instrument;
use zeroize::Zeroize;

use crate::arith::poly::verify_share;
use crate::arith::{CurvePoint, Fr, PairingBackend};
use crate::dkg::participant::{slot_of_index, Participant};
use crate::dkg::share::decrypt_share;
use crate::errors::Error;

/// A qualified dealer's published distribution, as read back from the
/// chain.
#[derive(Clone, Debug)]
pub struct PublishedDeal<B: PairingBackend<Scalar = Fr>> {
    pub dealer_index: u32,
    pub encrypted_shares: Vec<Fr>,
    pub commitments: Vec<B::G1>,
}

/// A participant's share of the group secret. Wiped on drop.
#[derive(Debug)]
pub struct GroupPrivateKey(Fr);

impl GroupPrivateKey {
    pub fn as_scalar(&self) -> &Fr {
        &self.0
    }
}

impl Drop for GroupPrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A participant's group-key publication: the G2 image of its group
/// private key and a BLS signature over the run's message.
#[derive(Debug)]
pub struct GroupKeyShare<B: PairingBackend<Scalar = Fr>> {
    pub group_private_key: GroupPrivateKey,
    pub group_public_key: B::G2,
    pub signature: B::G1,
}

/// Derives a participant's group keys from the qualified dealers'
/// published deals.
///
/// Every decrypted share is re-verified against its dealer's
/// commitments; a mismatch at this stage means a dealer survived the
/// dispute phase with a bad share and is reported as faulty.
#[instrument(level = "info", skip_all, fields(participant = own_index, dealers = deals.len()))]
pub fn generate_group_keys<B: PairingBackend<Scalar = Fr>>(
    message: &[u8],
    own_secret: &Fr,
    own_index: u32,
    deals: &[PublishedDeal<B>],
    participants: &[Participant<B>],
    threshold: usize,
) -> Result<GroupKeyShare<B>, Error> {
    if deals.len() < threshold + 1 {
        return Err(Error::InsufficientHonest {
            required: threshold + 1,
            provided: deals.len(),
        });
    }

    let mut ordered: Vec<&PublishedDeal<B>> = deals.iter().collect();
    ordered.sort_by_key(|deal| deal.dealer_index);

    let mut group_private = Fr::from(0u64);
    for deal in ordered {
        let dealer_slot = slot_of_index(participants, deal.dealer_index).ok_or(
            Error::bad_input_from(deal.dealer_index, "dealer not in roster"),
        )?;
        if deal.commitments.len() != threshold + 1 {
            return Err(Error::PeerFaulty {
                index: deal.dealer_index,
                reason: "commitment vector has wrong length",
            });
        }

        let share = decrypt_share::<B>(
            own_secret,
            own_index,
            &participants[dealer_slot],
            participants,
            &deal.encrypted_shares,
        )?;
        if !verify_share::<B>(&deal.commitments, own_index, &share) {
            return Err(Error::PeerFaulty {
                index: deal.dealer_index,
                reason: "decrypted share does not match commitments",
            });
        }
        group_private += share;
    }

    let group_public_key = <B::G2 as CurvePoint<Fr>>::generator().mul_scalar(&group_private);
    let signature = B::hash_to_g1(message).mul_scalar(&group_private);

    Ok(GroupKeyShare {
        group_private_key: GroupPrivateKey(group_private),
        group_public_key,
        signature,
    })
}
