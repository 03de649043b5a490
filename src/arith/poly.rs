//! Secret polynomials and their public commitments.
//!
//! A dealer's secret is a random degree-`t` polynomial over `Fr` whose
//! constant term seeds the group key. The public face of the polynomial
//! is the commitment vector `C_k = a_k · h1`; any evaluation can then be
//! checked against it without learning the coefficients, which is what
//! keeps dealers honest during share distribution.

use ark_poly::univariate::DensePolynomial;
use ark_poly::{DenseUVPolynomial, Polynomial};
use rand_core::RngCore;
use zeroize::Zeroize;

use crate::arith::field::sample_nonzero;
use crate::arith::{CurvePoint, Fr, PairingBackend};
use crate::errors::BackendError;

/// A dealer's secret polynomial. Never leaves the process; coefficients
/// are wiped on drop.
#[derive(Clone, Debug)]
pub struct SecretPolynomial {
    poly: DensePolynomial<Fr>,
}

impl SecretPolynomial {
    /// Samples a uniform polynomial of the given degree with all
    /// coefficients nonzero.
    ///
    /// Zero coefficients are resampled: a zero constant term would
    /// contribute an identity key share, and a zero leading coefficient
    /// would silently lower the degree below the threshold.
    pub fn generate<R: RngCore + ?Sized>(
        rng: &mut R,
        degree: usize,
    ) -> Result<Self, BackendError> {
        let mut coeffs = Vec::with_capacity(degree + 1);
        for _ in 0..=degree {
            coeffs.push(sample_nonzero(rng)?);
        }
        Ok(SecretPolynomial {
            poly: DensePolynomial::from_coefficients_vec(coeffs),
        })
    }

    /// Rebuilds a polynomial from coefficients (test vectors, replay).
    pub fn from_coefficients(coeffs: Vec<Fr>) -> Self {
        SecretPolynomial {
            poly: DensePolynomial::from_coefficients_vec(coeffs),
        }
    }

    pub fn degree(&self) -> usize {
        self.poly.degree()
    }

    /// The constant term `a₀`, the dealer's contribution to the master
    /// secret.
    pub fn constant_term(&self) -> Fr {
        self.poly.coeffs[0]
    }

    pub fn coefficients(&self) -> &[Fr] {
        &self.poly.coeffs
    }

    /// Evaluates `f(index)` with Horner's rule.
    pub fn evaluate_at_index(&self, index: u32) -> Fr {
        self.poly.evaluate(&Fr::from(u64::from(index)))
    }

    /// The public commitment vector `C_k = a_k · h1`.
    pub fn commitments<B: PairingBackend<Scalar = Fr>>(&self) -> Vec<B::G1> {
        let h1 = B::alt_g1();
        self.poly
            .coeffs
            .iter()
            .map(|coeff| h1.mul_scalar(coeff))
            .collect()
    }
}

impl Drop for SecretPolynomial {
    fn drop(&mut self) {
        for coeff in self.poly.coeffs.iter_mut() {
            coeff.zeroize();
        }
    }
}

/// Evaluates a commitment vector at an integer index:
/// `Σ_k index^k · C_k`, i.e. `f(index) · h1` for an honest dealer.
pub fn commitment_evaluation<B: PairingBackend<Scalar = Fr>>(
    commitments: &[B::G1],
    index: u32,
) -> B::G1 {
    let x = Fr::from(u64::from(index));
    let mut acc = <B::G1 as CurvePoint<Fr>>::identity();
    for commitment in commitments.iter().rev() {
        acc = acc.mul_scalar(&x).add(commitment);
    }
    acc
}

/// Checks a plaintext share against a dealer's commitment vector:
/// `share · h1 == Σ_k index^k · C_k`.
pub fn verify_share<B: PairingBackend<Scalar = Fr>>(
    commitments: &[B::G1],
    index: u32,
    share: &Fr,
) -> bool {
    let expected = commitment_evaluation::<B>(commitments, index);
    B::alt_g1().mul_scalar(share) == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::Bn254Backend;
    use rand::thread_rng;

    #[test]
    fn generated_polynomial_has_full_degree() {
        let mut rng = thread_rng();
        let poly = SecretPolynomial::generate(&mut rng, 5).unwrap();
        assert_eq!(poly.degree(), 5);
        assert_eq!(poly.coefficients().len(), 6);
    }

    #[test]
    fn horner_evaluation_matches_naive() {
        // f(x) = 5 + 3x + 2x^2
        let poly = SecretPolynomial::from_coefficients(vec![
            Fr::from(5u64),
            Fr::from(3u64),
            Fr::from(2u64),
        ]);
        assert_eq!(poly.evaluate_at_index(0), Fr::from(5u64));
        assert_eq!(poly.evaluate_at_index(1), Fr::from(10u64));
        assert_eq!(poly.evaluate_at_index(2), Fr::from(19u64));
    }

    #[test]
    fn shares_verify_against_commitments() {
        let mut rng = thread_rng();
        let poly = SecretPolynomial::generate(&mut rng, 3).unwrap();
        let commitments = poly.commitments::<Bn254Backend>();
        assert_eq!(commitments.len(), 4);

        for index in 1..=6u32 {
            let share = poly.evaluate_at_index(index);
            assert!(verify_share::<Bn254Backend>(&commitments, index, &share));
        }
    }

    #[test]
    fn tampered_share_fails_verification() {
        let mut rng = thread_rng();
        let poly = SecretPolynomial::generate(&mut rng, 3).unwrap();
        let commitments = poly.commitments::<Bn254Backend>();

        let bad_share = poly.evaluate_at_index(2) + Fr::from(1u64);
        assert!(!verify_share::<Bn254Backend>(&commitments, 2, &bad_share));
        // Right share at the wrong index fails as well.
        let share = poly.evaluate_at_index(2);
        assert!(!verify_share::<Bn254Backend>(&commitments, 3, &share));
    }
}
