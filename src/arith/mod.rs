//! Curve arithmetic abstractions and the BN254 backend.
//!
//! The protocol layer never touches a concrete curve library directly.
//! Instead it is parameterized over two narrow capabilities: a random
//! source ([`rand_core::RngCore`]) and a pairing backend expressed by the
//! traits in this module. The submodules provide the single concrete
//! backend this crate ships, built on arkworks' BN254 (alt_bn128, the
//! curve with Ethereum precompile support):
//!
//! - [`field`]: the scalar field `Fr` and fail-closed sampling
//! - [`group`]: `G1`/`G2` wrappers and the fixed-length wire codec
//! - [`pairing`]: the [`Bn254Backend`] tying groups, pairing, and the
//!   protocol's domain constants together
//! - [`hash`]: hash-to-field and hash-to-curve (Keccak-256 based, so an
//!   on-chain verifier can recompute every digest)
//! - [`poly`]: secret polynomials, commitments, share verification
//! - [`lagrange`]: Lagrange coefficients and interpolation in `Fr`,
//!   `G1`, and `G2`

use std::fmt::Debug;

use rand_core::RngCore;
use zeroize::Zeroize;

use crate::errors::BackendError;

pub mod field;
pub mod group;
pub mod hash;
pub mod lagrange;
pub mod pairing;
pub mod poly;

pub use field::Fr;
pub use group::{G1, G2};
pub use pairing::Bn254Backend;

/// Scalar field abstraction.
///
/// Canonical byte form is 32 bytes big-endian in `[0, r)`; out-of-range
/// encodings are rejected on decode rather than silently reduced.
pub trait FieldElement:
    Copy + Clone + Eq + PartialEq + Send + Sync + Debug + Zeroize + 'static
{
    /// Returns the additive identity.
    fn zero() -> Self;

    /// Returns the multiplicative identity.
    fn one() -> Self;

    /// Samples a uniform field element, failing closed if the random
    /// source reports an error.
    fn sample<R: RngCore + ?Sized>(rng: &mut R) -> Result<Self, BackendError>;

    /// Computes the multiplicative inverse, returning `None` for zero.
    fn invert(&self) -> Option<Self>;

    /// Embeds a small integer into the field.
    fn from_u64(n: u64) -> Self;

    /// Serializes to 32 bytes big-endian.
    fn to_repr(&self) -> [u8; 32];

    /// Deserializes from 32 bytes big-endian, rejecting values `>= r`.
    fn from_repr(repr: &[u8; 32]) -> Result<Self, BackendError>;
}

/// Elliptic curve point abstraction for the two source groups.
///
/// Implementations keep points in projective form; the wire type is the
/// fixed-length big-endian affine encoding used on-chain. `from_wire`
/// must reject points that are off-curve or outside the prime-order
/// subgroup, so a decoded point can be trusted everywhere downstream.
pub trait CurvePoint<F: FieldElement>:
    Copy + Clone + Eq + PartialEq + Send + Sync + Debug + 'static
{
    /// Fixed-length wire encoding (64 bytes for G1, 128 for G2).
    type Wire: AsRef<[u8]> + Copy + Debug + Send + Sync + 'static;

    /// Returns the point at infinity.
    fn identity() -> Self;

    /// Returns the standard generator for this group.
    fn generator() -> Self;

    /// Checks whether this point is the identity.
    fn is_identity(&self) -> bool;

    /// Point addition.
    fn add(&self, other: &Self) -> Self;

    /// Point subtraction.
    fn sub(&self, other: &Self) -> Self;

    /// Additive inverse.
    fn negate(&self) -> Self;

    /// Scalar multiplication: `scalar * self`.
    fn mul_scalar(&self, scalar: &F) -> Self;

    /// Serializes to the fixed-length affine wire form. The identity
    /// encodes as all zeroes.
    fn to_wire(&self) -> Self::Wire;

    /// Deserializes from wire bytes with full length, curve, and
    /// subgroup validation.
    fn from_wire(bytes: &[u8]) -> Result<Self, BackendError>;
}

/// Pairing backend capability set.
///
/// This is the whole surface the protocol needs from a curve library:
/// the two source groups, the target group with equality, the pairing,
/// and the protocol's three domain constants (`g1` and `g2` via
/// [`CurvePoint::generator`], `h1` via [`PairingBackend::alt_g1`]).
pub trait PairingBackend: Send + Sync + Debug + Sized + 'static {
    /// Scalar field.
    type Scalar: FieldElement;
    /// First source group.
    type G1: CurvePoint<Self::Scalar>;
    /// Second source group.
    type G2: CurvePoint<Self::Scalar>;
    /// Pairing target group; only equality and accumulation are needed.
    type Target: Clone + Eq + PartialEq + Debug + Send + Sync + 'static;

    /// Computes the bilinear pairing `e(g1, g2)`.
    fn pairing(g1: &Self::G1, g2: &Self::G2) -> Self::Target;

    /// Computes the product of pairings `Π e(g1[i], g2[i])`.
    fn multi_pairing(g1: &[Self::G1], g2: &[Self::G2]) -> Result<Self::Target, BackendError>;

    /// The independent G1 generator `h1` used for polynomial
    /// commitments and key shares. No party knows its discrete log with
    /// respect to `g1`.
    fn alt_g1() -> Self::G1;

    /// Hash-to-curve into G1 (`H_G1` in the protocol).
    fn hash_to_g1(msg: &[u8]) -> Self::G1;

    /// Hash-to-field into the scalar field (`H_field` in the protocol).
    fn hash_to_scalar(msg: &[u8]) -> Self::Scalar;
}
