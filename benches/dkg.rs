use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use ethdkg::dkg::{
    categorize_group_signers, generate_group_keys, generate_key_share, generate_keypair,
    generate_master_public_key, generate_shares, threshold_for_participants, Address, Participant,
    PublishedDeal,
};
use ethdkg::{Bn254Backend, CurvePoint};

type B = Bn254Backend;

/// Benchmarks the per-phase cost of one DKG run at n = 16: share
/// generation and group-key derivation are the per-participant hot
/// paths, categorization is the verifier-side fan-out. Setup work runs
/// once outside the measured loops.
pub fn bench_dkg(c: &mut Criterion) {
    // Deterministic RNG for repeatable benchmarks
    let mut rng = StdRng::seed_from_u64(0xdead_beef);

    let n = 16usize;
    let threshold = threshold_for_participants(n).expect("valid roster size");

    let mut secrets = Vec::with_capacity(n);
    let mut participants = Vec::with_capacity(n);
    for index in 1..=n as u32 {
        let (sk, pk) = generate_keypair::<B, _>(&mut rng).expect("keypair");
        secrets.push(sk);
        participants.push(Participant {
            address: Address([index as u8; 20]),
            index,
            public_key: pk,
        });
    }

    c.bench_function("dkg_generate_shares", |b| {
        b.iter(|| {
            let deal = generate_shares::<B, _>(&mut rng, &secrets[0], 1, &participants, threshold)
                .expect("share generation");
            black_box(deal);
        })
    });

    // One full distribution for the downstream phases (not measured).
    let mut deals = Vec::with_capacity(n);
    let mut key_shares = Vec::with_capacity(n);
    for (participant, secret) in participants.iter().zip(&secrets) {
        let deal = generate_shares::<B, _>(&mut rng, secret, participant.index, &participants, threshold)
            .expect("share generation");
        key_shares.push(
            generate_key_share::<B, _>(&mut rng, participant.index, &deal.polynomial.constant_term())
                .expect("key share"),
        );
        deals.push(PublishedDeal {
            dealer_index: participant.index,
            encrypted_shares: deal.encrypted_shares,
            commitments: deal.commitments,
        });
    }
    let (master, _) = generate_master_public_key(&key_shares, threshold).expect("aggregation");

    let message = b"benchmark message for group signing";

    c.bench_function("dkg_generate_group_keys", |b| {
        b.iter(|| {
            let share = generate_group_keys::<B>(
                message,
                &secrets[0],
                1,
                &deals,
                &participants,
                threshold,
            )
            .expect("group keys");
            black_box(share);
        })
    });

    // Published signer set for categorization (not measured).
    let mut public_keys = Vec::with_capacity(n);
    let mut signatures = Vec::with_capacity(n);
    for (participant, secret) in participants.iter().zip(&secrets) {
        let share = generate_group_keys::<B>(
            message,
            secret,
            participant.index,
            &deals,
            &participants,
            threshold,
        )
        .expect("group keys");
        public_keys.push(share.group_public_key.to_wire());
        signatures.push(share.signature.to_wire());
    }

    c.bench_function("dkg_categorize_group_signers", |b| {
        b.iter(|| {
            let categorization = categorize_group_signers::<B>(
                message,
                &master,
                &participants,
                &public_keys,
                &signatures,
                threshold,
                n,
            )
            .expect("categorization");
            black_box(categorization);
        })
    });
}

criterion_group!(benches, bench_dkg);
criterion_main!(benches);
