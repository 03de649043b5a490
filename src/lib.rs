//! # ethdkg: on-chain distributed key generation over BN254
//!
//! This crate is the mathematics core of a distributed key generation
//! protocol run between a fixed roster of `n` on-chain participants.
//! Together they produce a shared group public key, a
//! threshold-distributed secret such that any `threshold + 1` of them
//! can co-sign, and per-participant BLS signatures verifiable against
//! the group key — while identifying exactly who behaved honestly, so
//! the enclosing chain can reward or slash.
//!
//! ## Architecture
//!
//! - **[`arith`]**: field and curve arithmetic behind narrow capability
//!   traits ([`FieldElement`], [`CurvePoint`], [`PairingBackend`]),
//!   with one concrete backend over arkworks BN254 (alt_bn128, the
//!   curve with Ethereum precompile support). Includes the secret
//!   polynomial engine, Lagrange interpolation, and Keccak-256 based
//!   hashing to field and curve.
//! - **[`dkg`]**: the protocol operations — keypair generation,
//!   pad-encrypted share distribution with Pedersen-style commitments,
//!   dispute adjudication, key-share publication with an
//!   equality-of-discrete-logs proof, master-public-key aggregation,
//!   group-key derivation with BLS signing, and signer verification /
//!   honest–dishonest categorization. [`dkg::run`] wraps the phases
//!   into a per-epoch state machine.
//! - **[`wire`]**: the fixed-length big-endian payload encodings that
//!   travel on-chain, with hand-written serde support.
//! - **[`errors`]**: the two-layer error taxonomy; peer-attributable
//!   failures carry the offending participant's index.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ethdkg::dkg::{
//!     generate_keypair, generate_shares, threshold_for_participants, Address, Participant,
//! };
//! use ethdkg::Bn254Backend;
//! use rand::thread_rng;
//!
//! # fn main() -> Result<(), ethdkg::Error> {
//! let mut rng = thread_rng();
//! let n = 4;
//! let threshold = threshold_for_participants(n)?;
//!
//! // Registration: every participant publishes an encryption key.
//! let mut secrets = Vec::new();
//! let mut participants = Vec::new();
//! for index in 1..=n as u32 {
//!     let (sk, pk) = generate_keypair::<Bn254Backend, _>(&mut rng)?;
//!     secrets.push(sk);
//!     participants.push(Participant {
//!         address: Address([index as u8; 20]),
//!         index,
//!         public_key: pk,
//!     });
//! }
//!
//! // Share distribution: one deal per dealer goes on-chain.
//! let deal = generate_shares::<Bn254Backend, _>(
//!     &mut rng,
//!     &secrets[0],
//!     1,
//!     &participants,
//!     threshold,
//! )?;
//! assert_eq!(deal.encrypted_shares.len(), n);
//! assert_eq!(deal.commitments.len(), threshold + 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Properties the implementation pins down
//!
//! - Aggregation and verification iterate in ascending participant
//!   index, so results are bit-identical across implementations.
//! - Every published point is subgroup-checked on decode; malformed
//!   peer input is attributed, never a panic.
//! - The RNG is the only external resource and failure is fatal
//!   ([`Error::RngFailure`]) rather than degraded.
//! - Secrets (polynomials, group private keys) are zeroized when
//!   dropped; everything else is freely copyable public data.
//!
//! All operations are pure, synchronous, and safe to fan out across
//! threads; the enclosing driver owns scheduling, persistence, and
//! transaction submission.

pub mod arith;
pub mod dkg;
pub mod errors;
pub mod wire;

pub use arith::{Bn254Backend, CurvePoint, FieldElement, Fr, PairingBackend, G1, G2};
pub use errors::{BackendError, Error};
