//! On-chain wire formats and serde support.
//!
//! Everything a participant publishes travels as fixed-length
//! big-endian bytes: scalars as 32 bytes, G1 points as 64, G2 points as
//! 128 (Ethereum precompile coordinate order). Payload structs keep the
//! raw bytes — verification has to survive arbitrary garbage, so
//! decoding into typed points is explicit and per-field attributable.
//!
//! Serde impls are hand-written over those representations; the derive
//! machinery cannot see through fixed-length byte arrays of this size,
//! and spelling the impls out keeps the encoding independent of any
//! serde format details.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::arith::{CurvePoint, Fr, PairingBackend};
use crate::dkg::group_key::{GroupKeyShare, PublishedDeal};
use crate::dkg::keyshare::{EqualDlogProof, KeyShare};
use crate::errors::Error;

/// 32-byte big-endian scalar in `[0, r)`.
pub type ScalarRepr = [u8; 32];
/// 64-byte uncompressed G1 point (`x ‖ y`).
pub type G1Repr = [u8; 64];
/// 128-byte uncompressed G2 point (`x.c1 ‖ x.c0 ‖ y.c1 ‖ y.c0`).
pub type G2Repr = [u8; 128];

/// Emitted by the driver when a registration window opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOpen {
    pub epoch: u64,
    pub threshold: u32,
}

/// A dealer's published share distribution: `n` encrypted shares in
/// ascending participant-index order (the dealer's own slot included)
/// and `threshold + 1` commitments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareDistribution {
    pub dealer_index: u32,
    pub encrypted_shares: Vec<ScalarRepr>,
    pub commitments: Vec<G1Repr>,
}

/// A dealer's key-share publication. Carries the `a₀·g1` image as well:
/// without it neither the discrete-log proof nor the pairing tie is
/// checkable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyShareSubmission {
    pub submitter_index: u32,
    pub key_share_h1: G1Repr,
    pub proof_challenge: ScalarRepr,
    pub proof_response: ScalarRepr,
    pub key_share_g1: G1Repr,
    pub key_share_g2: G2Repr,
}

/// The claimed master public key; verifiers recompute and compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MpkSubmission {
    pub master_public_key: G2Repr,
}

/// A participant's group public key and BLS signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpkjSubmission {
    pub submitter_index: u32,
    pub group_public_key: G2Repr,
    pub signature: G1Repr,
}

/// Every payload the chain can deliver to a run, as one tagged sum.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    RegistrationOpen(RegistrationOpen),
    ShareDistribution(ShareDistribution),
    KeyShareSubmission(KeyShareSubmission),
    MpkSubmission(MpkSubmission),
    GpkjSubmission(GpkjSubmission),
}

impl ShareDistribution {
    /// Encodes a dealer's deal for publication.
    pub fn encode<B: PairingBackend<Scalar = Fr>>(
        dealer_index: u32,
        encrypted_shares: &[Fr],
        commitments: &[B::G1],
    ) -> Self {
        use crate::arith::FieldElement;
        ShareDistribution {
            dealer_index,
            encrypted_shares: encrypted_shares.iter().map(|s| s.to_repr()).collect(),
            commitments: commitments
                .iter()
                .map(|c| {
                    let mut repr = [0u8; 64];
                    repr.copy_from_slice(c.to_wire().as_ref());
                    repr
                })
                .collect(),
        }
    }

    /// Decodes and validates against the run's shape. Failures are
    /// attributed to the dealer.
    pub fn decode<B: PairingBackend<Scalar = Fr>>(
        &self,
        participant_count: usize,
        threshold: usize,
    ) -> Result<PublishedDeal<B>, Error> {
        use crate::arith::FieldElement;
        if self.encrypted_shares.len() != participant_count {
            return Err(Error::bad_input_from(
                self.dealer_index,
                "encrypted share vector has wrong length",
            ));
        }
        if self.commitments.len() != threshold + 1 {
            return Err(Error::bad_input_from(
                self.dealer_index,
                "commitment vector has wrong length",
            ));
        }
        let encrypted_shares = self
            .encrypted_shares
            .iter()
            .map(|repr| {
                Fr::from_repr(repr)
                    .map_err(|_| Error::bad_input_from(self.dealer_index, "share out of range"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let commitments = self
            .commitments
            .iter()
            .map(|repr| {
                decode_g1::<B>(repr)
                    .map_err(|_| Error::bad_input_from(self.dealer_index, "malformed commitment"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PublishedDeal {
            dealer_index: self.dealer_index,
            encrypted_shares,
            commitments,
        })
    }
}

impl KeyShareSubmission {
    pub fn encode<B: PairingBackend<Scalar = Fr>>(share: &KeyShare<B>) -> Self {
        use crate::arith::FieldElement;
        let mut key_share_h1 = [0u8; 64];
        key_share_h1.copy_from_slice(share.key_share_h1.to_wire().as_ref());
        let mut key_share_g1 = [0u8; 64];
        key_share_g1.copy_from_slice(share.key_share_g1.to_wire().as_ref());
        let mut key_share_g2 = [0u8; 128];
        key_share_g2.copy_from_slice(share.key_share_g2.to_wire().as_ref());
        KeyShareSubmission {
            submitter_index: share.dealer_index,
            key_share_h1,
            proof_challenge: share.proof.challenge.to_repr(),
            proof_response: share.proof.response.to_repr(),
            key_share_g1,
            key_share_g2,
        }
    }

    pub fn decode<B: PairingBackend<Scalar = Fr>>(&self) -> Result<KeyShare<B>, Error> {
        use crate::arith::FieldElement;
        let fault = |reason| Error::bad_input_from(self.submitter_index, reason);

        let key_share_h1 = decode_g1::<B>(&self.key_share_h1)
            .map_err(|_| fault("malformed h1 key share"))?;
        let key_share_g1 = decode_g1::<B>(&self.key_share_g1)
            .map_err(|_| fault("malformed g1 key share"))?;
        let key_share_g2 = decode_g2::<B>(&self.key_share_g2)
            .map_err(|_| fault("malformed g2 key share"))?;
        let challenge =
            Fr::from_repr(&self.proof_challenge).map_err(|_| fault("proof challenge out of range"))?;
        let response =
            Fr::from_repr(&self.proof_response).map_err(|_| fault("proof response out of range"))?;

        Ok(KeyShare {
            dealer_index: self.submitter_index,
            key_share_h1,
            key_share_g1,
            key_share_g2,
            proof: EqualDlogProof {
                challenge,
                response,
            },
        })
    }
}

impl GpkjSubmission {
    pub fn encode<B: PairingBackend<Scalar = Fr>>(
        submitter_index: u32,
        share: &GroupKeyShare<B>,
    ) -> Self {
        let mut group_public_key = [0u8; 128];
        group_public_key.copy_from_slice(share.group_public_key.to_wire().as_ref());
        let mut signature = [0u8; 64];
        signature.copy_from_slice(share.signature.to_wire().as_ref());
        GpkjSubmission {
            submitter_index,
            group_public_key,
            signature,
        }
    }
}

/// Decodes a 64-byte G1 representation with full validation.
pub fn decode_g1<B: PairingBackend<Scalar = Fr>>(repr: &G1Repr) -> Result<B::G1, Error> {
    Ok(<B::G1 as CurvePoint<Fr>>::from_wire(repr)?)
}

/// Decodes a 128-byte G2 representation with full validation.
pub fn decode_g2<B: PairingBackend<Scalar = Fr>>(repr: &G2Repr) -> Result<B::G2, Error> {
    Ok(<B::G2 as CurvePoint<Fr>>::from_wire(repr)?)
}

// Serde support. Fixed-length reprs serialize as byte sequences and are
// length-checked on the way back in.

fn bytes_to_array<const N: usize, E: de::Error>(bytes: Vec<u8>, field: &'static str) -> Result<[u8; N], E> {
    bytes
        .try_into()
        .map_err(|_| E::custom(format!("{field}: wrong byte length")))
}

impl Serialize for ShareDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ShareDistribution", 3)?;
        state.serialize_field("dealer_index", &self.dealer_index)?;
        let shares: Vec<&[u8]> = self.encrypted_shares.iter().map(|s| s.as_slice()).collect();
        state.serialize_field("encrypted_shares", &shares)?;
        let commitments: Vec<&[u8]> = self.commitments.iter().map(|c| c.as_slice()).collect();
        state.serialize_field("commitments", &commitments)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ShareDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Helper {
            dealer_index: u32,
            encrypted_shares: Vec<Vec<u8>>,
            commitments: Vec<Vec<u8>>,
        }
        let helper = Helper::deserialize(deserializer)?;
        Ok(ShareDistribution {
            dealer_index: helper.dealer_index,
            encrypted_shares: helper
                .encrypted_shares
                .into_iter()
                .map(|b| bytes_to_array::<32, D::Error>(b, "encrypted_shares"))
                .collect::<Result<_, _>>()?,
            commitments: helper
                .commitments
                .into_iter()
                .map(|b| bytes_to_array::<64, D::Error>(b, "commitments"))
                .collect::<Result<_, _>>()?,
        })
    }
}

impl Serialize for KeyShareSubmission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("KeyShareSubmission", 6)?;
        state.serialize_field("submitter_index", &self.submitter_index)?;
        state.serialize_field("key_share_h1", self.key_share_h1.as_slice())?;
        state.serialize_field("proof_challenge", self.proof_challenge.as_slice())?;
        state.serialize_field("proof_response", self.proof_response.as_slice())?;
        state.serialize_field("key_share_g1", self.key_share_g1.as_slice())?;
        state.serialize_field("key_share_g2", self.key_share_g2.as_slice())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for KeyShareSubmission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Helper {
            submitter_index: u32,
            key_share_h1: Vec<u8>,
            proof_challenge: Vec<u8>,
            proof_response: Vec<u8>,
            key_share_g1: Vec<u8>,
            key_share_g2: Vec<u8>,
        }
        let helper = Helper::deserialize(deserializer)?;
        Ok(KeyShareSubmission {
            submitter_index: helper.submitter_index,
            key_share_h1: bytes_to_array::<64, D::Error>(helper.key_share_h1, "key_share_h1")?,
            proof_challenge: bytes_to_array::<32, D::Error>(
                helper.proof_challenge,
                "proof_challenge",
            )?,
            proof_response: bytes_to_array::<32, D::Error>(
                helper.proof_response,
                "proof_response",
            )?,
            key_share_g1: bytes_to_array::<64, D::Error>(helper.key_share_g1, "key_share_g1")?,
            key_share_g2: bytes_to_array::<128, D::Error>(helper.key_share_g2, "key_share_g2")?,
        })
    }
}

impl Serialize for MpkSubmission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MpkSubmission", 1)?;
        state.serialize_field("master_public_key", self.master_public_key.as_slice())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for MpkSubmission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Helper {
            master_public_key: Vec<u8>,
        }
        let helper = Helper::deserialize(deserializer)?;
        Ok(MpkSubmission {
            master_public_key: bytes_to_array::<128, D::Error>(
                helper.master_public_key,
                "master_public_key",
            )?,
        })
    }
}

impl Serialize for GpkjSubmission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GpkjSubmission", 3)?;
        state.serialize_field("submitter_index", &self.submitter_index)?;
        state.serialize_field("group_public_key", self.group_public_key.as_slice())?;
        state.serialize_field("signature", self.signature.as_slice())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for GpkjSubmission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Helper {
            submitter_index: u32,
            group_public_key: Vec<u8>,
            signature: Vec<u8>,
        }
        let helper = Helper::deserialize(deserializer)?;
        Ok(GpkjSubmission {
            submitter_index: helper.submitter_index,
            group_public_key: bytes_to_array::<128, D::Error>(
                helper.group_public_key,
                "group_public_key",
            )?,
            signature: bytes_to_array::<64, D::Error>(helper.signature, "signature")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::field::sample_nonzero;
    use crate::arith::Bn254Backend;
    use crate::dkg::keyshare::generate_key_share;
    use rand::thread_rng;

    type B = Bn254Backend;

    #[test]
    fn key_share_submission_round_trips() {
        let mut rng = thread_rng();
        let a0 = sample_nonzero(&mut rng).unwrap();
        let share = generate_key_share::<B, _>(&mut rng, 2, &a0).unwrap();

        let submission = KeyShareSubmission::encode(&share);
        let decoded = submission.decode::<B>().unwrap();
        assert_eq!(decoded.key_share_h1, share.key_share_h1);
        assert_eq!(decoded.key_share_g1, share.key_share_g1);
        assert_eq!(decoded.key_share_g2, share.key_share_g2);
        assert_eq!(decoded.proof, share.proof);

        let json = serde_json::to_string(&submission).unwrap();
        let back: KeyShareSubmission = serde_json::from_str(&json).unwrap();
        assert_eq!(back, submission);
    }

    #[test]
    fn corrupted_key_share_fails_to_decode() {
        let mut rng = thread_rng();
        let a0 = sample_nonzero(&mut rng).unwrap();
        let share = generate_key_share::<B, _>(&mut rng, 2, &a0).unwrap();

        let mut submission = KeyShareSubmission::encode(&share);
        submission.key_share_g2[127] = submission.key_share_g2[127].wrapping_add(1);
        assert!(matches!(
            submission.decode::<B>(),
            Err(Error::BadInput { index: Some(2), .. })
        ));
    }

    #[test]
    fn payload_enum_round_trips_through_serde() {
        let payload = Payload::RegistrationOpen(RegistrationOpen {
            epoch: 7,
            threshold: 5,
        });
        let json = serde_json::to_string(&payload).unwrap();
        let back: Payload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);

        let payload = Payload::MpkSubmission(MpkSubmission {
            master_public_key: [0u8; 128],
        });
        let json = serde_json::to_string(&payload).unwrap();
        let back: Payload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn share_distribution_shape_is_enforced() {
        let distribution = ShareDistribution {
            dealer_index: 1,
            encrypted_shares: vec![[0u8; 32]; 3],
            commitments: vec![[0u8; 64]; 3],
        };
        // Wrong share count for n = 4.
        assert!(distribution.decode::<B>(4, 2).is_err());
        // Wrong commitment count for threshold 2.
        let distribution = ShareDistribution {
            encrypted_shares: vec![[0u8; 32]; 4],
            ..distribution
        };
        assert!(distribution.decode::<B>(4, 2).is_err());
    }
}
