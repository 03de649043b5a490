//! Scalar field `Fr` of BN254 and its [`FieldElement`] impl.

use ark_bn254::Fr as ArkFr;
use ark_ff::{BigInteger, Field, One, PrimeField, Zero};
use rand_core::RngCore;

use crate::arith::FieldElement;
use crate::errors::BackendError;

/// The BN254 scalar field (order `r`, the prime-order subgroup size).
pub type Fr = ArkFr;

impl FieldElement for Fr {
    fn zero() -> Self {
        Zero::zero()
    }

    fn one() -> Self {
        One::one()
    }

    fn sample<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self, BackendError> {
        // 64 bytes keep the mod-r reduction bias below 2^-250.
        let mut bytes = [0u8; 64];
        rng.try_fill_bytes(&mut bytes)
            .map_err(|_| BackendError::Rng)?;
        Ok(Fr::from_be_bytes_mod_order(&bytes))
    }

    fn invert(&self) -> Option<Self> {
        self.inverse()
    }

    fn from_u64(n: u64) -> Self {
        Fr::from(n)
    }

    fn to_repr(&self) -> [u8; 32] {
        let bytes = self.into_bigint().to_bytes_be();
        let mut repr = [0u8; 32];
        repr[32 - bytes.len()..].copy_from_slice(&bytes);
        repr
    }

    fn from_repr(repr: &[u8; 32]) -> Result<Self, BackendError> {
        let value = Fr::from_be_bytes_mod_order(repr);
        // A canonical encoding survives a round-trip unchanged; anything
        // >= r does not.
        if FieldElement::to_repr(&value) != *repr {
            return Err(BackendError::Serialization("scalar not in canonical range"));
        }
        Ok(value)
    }
}

/// Samples a uniform nonzero scalar, resampling zero draws.
///
/// Zero is excluded wherever a scalar acts as a secret: a zero secret
/// key or polynomial coefficient collapses the corresponding public
/// point to the identity.
pub fn sample_nonzero<R: RngCore + ?Sized>(rng: &mut R) -> Result<Fr, BackendError> {
    loop {
        let candidate = <Fr as FieldElement>::sample(rng)?;
        if !candidate.is_zero() {
            return Ok(candidate);
        }
    }
}
