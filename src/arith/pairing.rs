//! The concrete BN254 pairing backend.

use std::sync::OnceLock;

use ark_bn254::{Bn254, G1Affine, G2Affine};
use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ec::CurveGroup;

use crate::arith::{hash, Fr, G1, G2, PairingBackend};
use crate::errors::BackendError;

/// Pairing backend over arkworks BN254 (alt_bn128).
///
/// The generators `g1` and `g2` are the arkworks defaults, matching the
/// Ethereum precompile conventions; `h1` is derived once by hashing a
/// fixed tag to the curve and cached for the process lifetime.
#[derive(Clone, Copy, Debug)]
pub struct Bn254Backend;

static ALT_G1: OnceLock<G1> = OnceLock::new();

impl PairingBackend for Bn254Backend {
    type Scalar = Fr;
    type G1 = G1;
    type G2 = G2;
    type Target = PairingOutput<Bn254>;

    fn pairing(g1: &G1, g2: &G2) -> Self::Target {
        Bn254::pairing(g1.0.into_affine(), g2.0.into_affine())
    }

    fn multi_pairing(g1: &[G1], g2: &[G2]) -> Result<Self::Target, BackendError> {
        if g1.len() != g2.len() {
            return Err(BackendError::Math("pairing input length mismatch"));
        }
        let lhs: Vec<G1Affine> = g1.iter().map(|p| p.0.into_affine()).collect();
        let rhs: Vec<G2Affine> = g2.iter().map(|p| p.0.into_affine()).collect();
        Ok(Bn254::multi_pairing(lhs, rhs))
    }

    fn alt_g1() -> G1 {
        *ALT_G1.get_or_init(hash::derive_alt_generator)
    }

    fn hash_to_g1(msg: &[u8]) -> G1 {
        hash::hash_to_g1(msg)
    }

    fn hash_to_scalar(msg: &[u8]) -> Fr {
        hash::hash_to_field(msg)
    }
}
