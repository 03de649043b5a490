//! Keccak-256 based hashing into the field and onto the curve.
//!
//! Every digest in this protocol must be recomputable by an on-chain
//! verifier, which fixes the hash to Keccak-256. Hash-to-field is the
//! rejection-free `Keccak256(input) mod r` (bias below 2^-250 over a
//! 512-bit intermediate). Hash-to-curve is a try-and-increment map: the
//! counter-extended digest is interpreted as an `Fq` x-coordinate until
//! `x^3 + 3` is a square, and the lexicographically smaller root is
//! taken. BN254 G1 has cofactor 1, so the result is already in the
//! prime-order subgroup.

use ark_bn254::{Fq, G1Affine};
use ark_ec::AffineRepr;
use ark_ff::{Field, PrimeField};
use sha3::{Digest, Keccak256};

use crate::arith::{Fr, G1};

/// Domain tag for the protocol's hash-to-curve map.
const HASH_TO_G1_TAG: &[u8] = b"ethdkg-bn254-v1/hash-to-g1";

/// Domain tag under which the independent commitment generator `h1` is
/// derived. Nobody knows `log_g1(h1)` because `h1` is a hash output.
const ALT_GENERATOR_TAG: &[u8] = b"ethdkg-bn254-v1/h1-generator";

/// `H_field`: hashes arbitrary bytes into the scalar field.
pub fn hash_to_field(msg: &[u8]) -> Fr {
    // Two chained digests widen the output to 512 bits before the
    // reduction, keeping the mod-r bias negligible.
    let first = Keccak256::digest(msg);
    let second = Keccak256::digest(first);
    let mut wide = [0u8; 64];
    wide[..32].copy_from_slice(&first);
    wide[32..].copy_from_slice(&second);
    Fr::from_be_bytes_mod_order(&wide)
}

/// `H_G1`: hashes arbitrary bytes onto the curve via try-and-increment.
pub fn hash_to_g1(msg: &[u8]) -> G1 {
    hash_to_g1_tagged(HASH_TO_G1_TAG, msg)
}

/// The independent generator `h1`, derived by hashing a fixed tag.
pub(crate) fn derive_alt_generator() -> G1 {
    hash_to_g1_tagged(ALT_GENERATOR_TAG, b"")
}

fn hash_to_g1_tagged(tag: &[u8], msg: &[u8]) -> G1 {
    let mut counter: u32 = 0;
    loop {
        let mut hasher = Keccak256::new();
        hasher.update(tag);
        hasher.update(msg);
        hasher.update(counter.to_be_bytes());
        let digest = hasher.finalize();

        let x = Fq::from_be_bytes_mod_order(&digest);
        let y_squared = x.square() * x + Fq::from(3u64);
        if let Some(y) = y_squared.sqrt() {
            let y = canonical_root(y);
            let affine = G1Affine::new_unchecked(x, y);
            debug_assert!(affine.is_on_curve());
            return G1(affine.into_group());
        }
        // Roughly half of all x values miss the curve; expected two
        // iterations.
        counter += 1;
    }
}

/// Picks the root with the smaller canonical representation, so both
/// sides of a verification derive the same point.
fn canonical_root(y: Fq) -> Fq {
    let neg = -y;
    if y.into_bigint() <= neg.into_bigint() {
        y
    } else {
        neg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::{CurvePoint, FieldElement};

    #[test]
    fn hash_to_field_deterministic_and_separated() {
        let a = hash_to_field(b"Hello");
        let b = hash_to_field(b"Hello");
        let c = hash_to_field(b"World");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, <Fr as FieldElement>::zero());
    }

    #[test]
    fn hash_to_g1_lands_on_curve() {
        for msg in [b"".as_slice(), b"Hello", &[0u8; 64]] {
            let p = hash_to_g1(msg);
            assert!(!p.is_identity());
            // Round-tripping through the validating decoder proves
            // curve membership.
            assert_eq!(G1::from_wire(&p.to_wire()).unwrap(), p);
        }
    }

    #[test]
    fn hash_to_g1_deterministic() {
        assert_eq!(hash_to_g1(b"Hello"), hash_to_g1(b"Hello"));
        assert_ne!(hash_to_g1(b"Hello"), hash_to_g1(b"World"));
    }

    #[test]
    fn alt_generator_independent_of_message_map() {
        // h1 lives under its own tag: hashing any message must not
        // collide with it.
        let h1 = derive_alt_generator();
        assert!(!h1.is_identity());
        assert_ne!(h1, hash_to_g1(b""));
        assert_ne!(h1, <G1 as CurvePoint<Fr>>::generator());
    }
}
