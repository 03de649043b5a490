//! Master-public-key aggregation.

use tracing::instrument;

use crate::arith::{CurvePoint, Fr, PairingBackend};
use crate::dkg::keyshare::{verify_key_share, KeyShare};
use crate::errors::Error;

/// The group's master public key, `Σ_d a₀,d · g2` over qualified
/// dealers.
pub type MasterPublicKey<B> = <B as PairingBackend>::G2;

/// Aggregates qualified dealers' key shares into the master public key.
///
/// Every submission is re-verified (discrete-log proof plus pairing
/// tie); dealers that fail are excluded and reported in the second
/// return value. Summation runs in ascending dealer index so the result
/// is bit-identical across implementations. Fewer than `threshold + 1`
/// qualified dealers fails the run.
#[instrument(level = "info", skip_all, fields(submissions = key_shares.len()))]
pub fn generate_master_public_key<B: PairingBackend<Scalar = Fr>>(
    key_shares: &[KeyShare<B>],
    threshold: usize,
) -> Result<(MasterPublicKey<B>, Vec<u32>), Error> {
    let mut ordered: Vec<&KeyShare<B>> = key_shares.iter().collect();
    ordered.sort_by_key(|share| share.dealer_index);
    if ordered
        .windows(2)
        .any(|w| w[0].dealer_index == w[1].dealer_index)
    {
        return Err(Error::bad_input("duplicate dealer in key-share set"));
    }

    let mut master = <B::G2 as CurvePoint<Fr>>::identity();
    let mut qualified = 0usize;
    let mut faulty = Vec::new();
    for share in ordered {
        match verify_key_share(share) {
            Ok(()) => {
                master = master.add(&share.key_share_g2);
                qualified += 1;
            }
            Err(Error::PeerFaulty { index, .. }) => faulty.push(index),
            Err(other) => return Err(other),
        }
    }

    if qualified < threshold + 1 {
        return Err(Error::InsufficientHonest {
            required: threshold + 1,
            provided: qualified,
        });
    }
    Ok((master, faulty))
}

/// Checks a published master public key against the dealers' key
/// shares, returning the dealers whose shares failed verification and
/// were excluded from the recomputed sum. A mismatch means some
/// component lied about its inputs, which is unattributable here and
/// therefore fatal.
pub fn verify_master_public_key<B: PairingBackend<Scalar = Fr>>(
    published: &MasterPublicKey<B>,
    key_shares: &[KeyShare<B>],
    threshold: usize,
) -> Result<Vec<u32>, Error> {
    let (expected, faulty) = generate_master_public_key(key_shares, threshold)?;
    if expected != *published {
        return Err(Error::ArithmeticInvariant(
            "published master public key does not match dealer key shares",
        ));
    }
    Ok(faulty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::field::sample_nonzero;
    use crate::arith::Bn254Backend;
    use crate::dkg::keyshare::generate_key_share;
    use rand::thread_rng;

    type B = Bn254Backend;

    fn key_shares(n: usize) -> (Vec<Fr>, Vec<KeyShare<B>>) {
        let mut rng = thread_rng();
        let mut constants = Vec::with_capacity(n);
        let mut shares = Vec::with_capacity(n);
        for index in 1..=n as u32 {
            let a0 = sample_nonzero(&mut rng).unwrap();
            shares.push(generate_key_share::<B, _>(&mut rng, index, &a0).unwrap());
            constants.push(a0);
        }
        (constants, shares)
    }

    #[test]
    fn master_key_is_sum_of_contributions() {
        let (constants, shares) = key_shares(4);
        let (master, faulty) = generate_master_public_key(&shares, 2).unwrap();
        assert!(faulty.is_empty());

        let sum: Fr = constants.iter().copied().sum();
        let expected = <<B as PairingBackend>::G2 as CurvePoint<Fr>>::generator().mul_scalar(&sum);
        assert_eq!(master, expected);
        assert!(!master.is_identity());

        // All four affine Fq components are populated.
        let wire = master.to_wire();
        for component in wire.chunks(32) {
            assert!(component.iter().any(|&b| b != 0));
        }
    }

    #[test]
    fn aggregation_order_does_not_change_the_result() {
        let (_, mut shares) = key_shares(4);
        let (master, _) = generate_master_public_key(&shares, 2).unwrap();
        shares.reverse();
        let (reordered, _) = generate_master_public_key(&shares, 2).unwrap();
        assert_eq!(master, reordered);
    }

    #[test]
    fn faulty_dealer_is_excluded_and_reported() {
        let mut rng = thread_rng();
        let (_, mut shares) = key_shares(5);
        // Dealer 3 swaps in a G2 image of a different secret.
        let other = sample_nonzero(&mut rng).unwrap();
        shares[2].key_share_g2 =
            <<B as PairingBackend>::G2 as CurvePoint<Fr>>::generator().mul_scalar(&other);

        let (master, faulty) = generate_master_public_key(&shares, 3).unwrap();
        assert_eq!(faulty, vec![3]);
        assert!(!master.is_identity());
    }

    #[test]
    fn too_few_qualified_dealers_fails() {
        let mut rng = thread_rng();
        let (_, mut shares) = key_shares(4);
        let other = sample_nonzero(&mut rng).unwrap();
        for share in shares.iter_mut().take(2) {
            share.key_share_g2 =
                <<B as PairingBackend>::G2 as CurvePoint<Fr>>::generator().mul_scalar(&other);
        }
        assert!(matches!(
            generate_master_public_key(&shares, 2),
            Err(Error::InsufficientHonest {
                required: 3,
                provided: 2
            })
        ));
    }

    #[test]
    fn published_key_self_check() {
        let (_, shares) = key_shares(4);
        let (master, _) = generate_master_public_key(&shares, 2).unwrap();
        assert!(verify_master_public_key(&master, &shares, 2)
            .unwrap()
            .is_empty());

        let forged = master.add(&<<B as PairingBackend>::G2 as CurvePoint<Fr>>::generator());
        assert!(matches!(
            verify_master_public_key(&forged, &shares, 2),
            Err(Error::ArithmeticInvariant(_))
        ));
    }

    #[test]
    fn self_check_reports_excluded_dealers() {
        let mut rng = thread_rng();
        let (_, mut shares) = key_shares(5);
        let other = sample_nonzero(&mut rng).unwrap();
        shares[1].key_share_g2 =
            <<B as PairingBackend>::G2 as CurvePoint<Fr>>::generator().mul_scalar(&other);

        // The honestly-recomputed sum skips dealer 2; a matching
        // publication verifies and still names the excluded dealer.
        let (master, _) = generate_master_public_key(&shares, 3).unwrap();
        let faulty = verify_master_public_key(&master, &shares, 3).unwrap();
        assert_eq!(faulty, vec![2]);
    }

    #[test]
    fn duplicate_dealer_rejected() {
        let (_, mut shares) = key_shares(4);
        shares[1].dealer_index = 1;
        assert!(generate_master_public_key(&shares, 2).is_err());
    }
}
