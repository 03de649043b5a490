//! Lagrange coefficients and interpolation.
//!
//! Threshold reconstruction is interpolation of a degree-`t` polynomial
//! from `t+1` evaluations: at `x = 0` it recovers a shared secret (or
//! its group-element image), at a participant's index it reconstructs
//! that participant's expected key. Subsets are always processed in
//! ascending index order so every implementation derives bit-identical
//! results.

use ark_ff::batch_inversion;

use crate::arith::{CurvePoint, Fr};
use crate::errors::BackendError;

/// Computes the Lagrange coefficients `λ_j = Π_{k≠j} (x−k)/(j−k)` for
/// the given evaluation indices at point `x`.
///
/// `indices` must be strictly ascending; duplicates would put a zero in
/// a denominator and also signal a corrupted subset upstream.
pub fn lagrange_coefficients(indices: &[u32], x: Fr) -> Result<Vec<Fr>, BackendError> {
    if indices.is_empty() {
        return Err(BackendError::Math("empty interpolation subset"));
    }
    if indices.windows(2).any(|w| w[0] >= w[1]) {
        return Err(BackendError::Math(
            "interpolation indices must be strictly ascending",
        ));
    }

    let points: Vec<Fr> = indices.iter().map(|&i| Fr::from(u64::from(i))).collect();

    let mut numerators = Vec::with_capacity(points.len());
    let mut denominators = Vec::with_capacity(points.len());
    for (j, &x_j) in points.iter().enumerate() {
        let mut num = Fr::from(1u64);
        let mut den = Fr::from(1u64);
        for (k, &x_k) in points.iter().enumerate() {
            if k == j {
                continue;
            }
            num *= x - x_k;
            den *= x_j - x_k;
        }
        numerators.push(num);
        denominators.push(den);
    }

    batch_inversion(&mut denominators);
    Ok(numerators
        .into_iter()
        .zip(denominators)
        .map(|(num, den_inv)| num * den_inv)
        .collect())
}

/// Interpolates scalar evaluations `(index, f(index))` at point `x`.
pub fn interpolate_scalars(points: &[(u32, Fr)], x: Fr) -> Result<Fr, BackendError> {
    let indices: Vec<u32> = points.iter().map(|(i, _)| *i).collect();
    let lambdas = lagrange_coefficients(&indices, x)?;
    Ok(points
        .iter()
        .zip(&lambdas)
        .map(|((_, y), lambda)| *y * lambda)
        .fold(Fr::from(0u64), |acc, term| acc + term))
}

/// Interpolates group-element evaluations `(index, f(index)·P)` at
/// point `x`. Works uniformly for G1 and G2.
pub fn interpolate_points<P: CurvePoint<Fr>>(points: &[(u32, P)], x: Fr) -> Result<P, BackendError> {
    let indices: Vec<u32> = points.iter().map(|(i, _)| *i).collect();
    let lambdas = lagrange_coefficients(&indices, x)?;
    let mut acc = P::identity();
    for ((_, point), lambda) in points.iter().zip(&lambdas) {
        acc = acc.add(&point.mul_scalar(lambda));
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::poly::SecretPolynomial;
    use crate::arith::G2;
    use rand::thread_rng;

    #[test]
    fn any_subset_recovers_the_constant_term() {
        let mut rng = thread_rng();
        let degree = 3;
        let poly = SecretPolynomial::generate(&mut rng, degree).unwrap();

        let evals: Vec<(u32, Fr)> = (1..=8u32)
            .map(|i| (i, poly.evaluate_at_index(i)))
            .collect();

        // First t+1, last t+1, and a strided subset all agree.
        for subset in [&evals[..4], &evals[4..8], &[evals[0], evals[2], evals[4], evals[6]][..]] {
            let recovered = interpolate_scalars(subset, Fr::from(0u64)).unwrap();
            assert_eq!(recovered, poly.constant_term());
        }
    }

    #[test]
    fn group_interpolation_tracks_scalar_interpolation() {
        let mut rng = thread_rng();
        let poly = SecretPolynomial::generate(&mut rng, 2).unwrap();
        let g2 = <G2 as CurvePoint<Fr>>::generator();

        let points: Vec<(u32, G2)> = (1..=3u32)
            .map(|i| (i, g2.mul_scalar(&poly.evaluate_at_index(i))))
            .collect();

        let at_zero = interpolate_points(&points, Fr::from(0u64)).unwrap();
        assert_eq!(at_zero, g2.mul_scalar(&poly.constant_term()));

        // Reconstruction at a fourth index matches direct evaluation.
        let at_seven = interpolate_points(&points, Fr::from(7u64)).unwrap();
        assert_eq!(at_seven, g2.mul_scalar(&poly.evaluate_at_index(7)));
    }

    #[test]
    fn duplicate_and_unordered_subsets_rejected() {
        assert!(lagrange_coefficients(&[1, 1, 2], Fr::from(0u64)).is_err());
        assert!(lagrange_coefficients(&[3, 2, 1], Fr::from(0u64)).is_err());
        assert!(lagrange_coefficients(&[], Fr::from(0u64)).is_err());
    }

    #[test]
    fn coefficients_sum_to_one_at_zero_for_constant() {
        // Interpolating a constant polynomial must return the constant,
        // i.e. the coefficients sum to 1.
        let lambdas = lagrange_coefficients(&[1, 4, 6], Fr::from(0u64)).unwrap();
        let sum: Fr = lambdas.iter().copied().sum();
        assert_eq!(sum, Fr::from(1u64));
    }
}
