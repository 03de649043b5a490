//! `G1`/`G2` wrappers over the arkworks BN254 groups.
//!
//! Points travel on-chain as fixed-length big-endian affine coordinates:
//! 64 bytes for G1 (`x ‖ y`) and 128 bytes for G2 in Ethereum precompile
//! order (`x.c1 ‖ x.c0 ‖ y.c1 ‖ y.c0`). The all-zero encoding is the
//! point at infinity. Decoding validates curve membership and, for G2,
//! the prime-order subgroup (G1 on BN254 has cofactor 1, so on-curve
//! already implies in-subgroup).

use ark_bn254::{Fq, Fq2, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{AffineRepr, CurveGroup, PrimeGroup};
use ark_ff::{BigInteger, PrimeField, Zero};

use crate::arith::{CurvePoint, Fr};
use crate::errors::BackendError;

/// G1 group element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct G1(pub(crate) G1Projective);

/// G2 group element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct G2(pub(crate) G2Projective);

impl CurvePoint<Fr> for G1 {
    type Wire = [u8; 64];

    fn identity() -> Self {
        G1(G1Projective::zero())
    }

    fn generator() -> Self {
        G1(G1Projective::generator())
    }

    fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    fn add(&self, other: &Self) -> Self {
        G1(self.0 + other.0)
    }

    fn sub(&self, other: &Self) -> Self {
        G1(self.0 - other.0)
    }

    fn negate(&self) -> Self {
        G1(-self.0)
    }

    fn mul_scalar(&self, scalar: &Fr) -> Self {
        G1(self.0 * scalar)
    }

    fn to_wire(&self) -> Self::Wire {
        let mut wire = [0u8; 64];
        if let Some((x, y)) = self.0.into_affine().xy() {
            wire[..32].copy_from_slice(&fq_to_bytes(x));
            wire[32..].copy_from_slice(&fq_to_bytes(y));
        }
        wire
    }

    fn from_wire(bytes: &[u8]) -> Result<Self, BackendError> {
        if bytes.len() != 64 {
            return Err(BackendError::Serialization("G1 encoding must be 64 bytes"));
        }
        if bytes.iter().all(|&b| b == 0) {
            return Ok(<G1 as CurvePoint<Fr>>::identity());
        }
        let x = fq_from_bytes(&bytes[..32])?;
        let y = fq_from_bytes(&bytes[32..])?;
        let affine = G1Affine::new_unchecked(x, y);
        if !affine.is_on_curve() {
            return Err(BackendError::NotOnCurve);
        }
        // Cofactor 1: on-curve is in-subgroup for BN254 G1.
        Ok(G1(affine.into_group()))
    }
}

impl CurvePoint<Fr> for G2 {
    type Wire = [u8; 128];

    fn identity() -> Self {
        G2(G2Projective::zero())
    }

    fn generator() -> Self {
        G2(G2Projective::generator())
    }

    fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    fn add(&self, other: &Self) -> Self {
        G2(self.0 + other.0)
    }

    fn sub(&self, other: &Self) -> Self {
        G2(self.0 - other.0)
    }

    fn negate(&self) -> Self {
        G2(-self.0)
    }

    fn mul_scalar(&self, scalar: &Fr) -> Self {
        G2(self.0 * scalar)
    }

    fn to_wire(&self) -> Self::Wire {
        let mut wire = [0u8; 128];
        if let Some((x, y)) = self.0.into_affine().xy() {
            wire[..32].copy_from_slice(&fq_to_bytes(x.c1));
            wire[32..64].copy_from_slice(&fq_to_bytes(x.c0));
            wire[64..96].copy_from_slice(&fq_to_bytes(y.c1));
            wire[96..].copy_from_slice(&fq_to_bytes(y.c0));
        }
        wire
    }

    fn from_wire(bytes: &[u8]) -> Result<Self, BackendError> {
        if bytes.len() != 128 {
            return Err(BackendError::Serialization("G2 encoding must be 128 bytes"));
        }
        if bytes.iter().all(|&b| b == 0) {
            return Ok(<G2 as CurvePoint<Fr>>::identity());
        }
        let x = Fq2::new(fq_from_bytes(&bytes[32..64])?, fq_from_bytes(&bytes[..32])?);
        let y = Fq2::new(fq_from_bytes(&bytes[96..])?, fq_from_bytes(&bytes[64..96])?);
        let affine = G2Affine::new_unchecked(x, y);
        if !affine.is_on_curve() {
            return Err(BackendError::NotOnCurve);
        }
        if !affine.is_in_correct_subgroup_assuming_on_curve() {
            return Err(BackendError::NotInSubgroup);
        }
        Ok(G2(affine.into_group()))
    }
}

fn fq_to_bytes(value: Fq) -> [u8; 32] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

fn fq_from_bytes(bytes: &[u8]) -> Result<Fq, BackendError> {
    let value = Fq::from_be_bytes_mod_order(bytes);
    if fq_to_bytes(value).as_slice() != bytes {
        return Err(BackendError::Serialization(
            "coordinate not in canonical range",
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::FieldElement;
    use rand::thread_rng;

    fn random_g1() -> G1 {
        let mut rng = thread_rng();
        let s = Fr::sample(&mut rng).unwrap();
        <G1 as CurvePoint<Fr>>::generator().mul_scalar(&s)
    }

    #[test]
    fn g1_wire_round_trip() {
        let p = random_g1();
        let wire = p.to_wire();
        assert_eq!(G1::from_wire(&wire).unwrap(), p);
    }

    #[test]
    fn g2_wire_round_trip() {
        let mut rng = thread_rng();
        let s = Fr::sample(&mut rng).unwrap();
        let p = <G2 as CurvePoint<Fr>>::generator().mul_scalar(&s);
        let wire = p.to_wire();
        assert_eq!(G2::from_wire(&wire).unwrap(), p);
    }

    #[test]
    fn identity_encodes_as_zeroes() {
        let id = <G1 as CurvePoint<Fr>>::identity();
        assert_eq!(id.to_wire(), [0u8; 64]);
        assert!(G1::from_wire(&[0u8; 64]).unwrap().is_identity());

        let id = <G2 as CurvePoint<Fr>>::identity();
        assert_eq!(id.to_wire(), [0u8; 128]);
        assert!(G2::from_wire(&[0u8; 128]).unwrap().is_identity());
    }

    #[test]
    fn off_curve_point_rejected() {
        // Nudging x off a valid point leaves the curve.
        let mut wire = random_g1().to_wire();
        wire[31] = wire[31].wrapping_add(1);
        match G1::from_wire(&wire) {
            Err(BackendError::NotOnCurve) | Err(BackendError::Serialization(_)) => {}
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn corrupted_g2_encoding_rejected() {
        let mut rng = thread_rng();
        let s = Fr::sample(&mut rng).unwrap();
        let mut wire = <G2 as CurvePoint<Fr>>::generator().mul_scalar(&s).to_wire();
        wire[63] = wire[63].wrapping_add(1);
        assert!(G2::from_wire(&wire).is_err());
    }
}
