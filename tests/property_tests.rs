use std::collections::BTreeSet;

use indexed_seq::{
    best_encoding, AllOnesSequence, BitVector, BitVectorBuilder, CompactEliasFano,
    CompactRankedBitvector, Encoding, GlobalParameters, IndexedSequence,
    IndexedSequenceEnumerator, Posting, SequenceCollectionBuilder, SequenceEncoding,
    SequenceEnumerator,
};
use proptest::prelude::*;

/// Strictly increasing values plus a universe strictly above the largest one.
fn sorted_set(max_len: usize, max_value: u64) -> impl Strategy<Value = (Vec<u64>, u64)> {
    (
        prop::collection::btree_set(0..max_value, 0..max_len),
        0..64u64,
    )
        .prop_map(|(set, slack): (BTreeSet<u64>, u64)| {
            let values: Vec<u64> = set.into_iter().collect();
            let universe = values.last().map_or(0, |&v| v + 1) + slack;
            (values, universe)
        })
}

/// Mostly-full subsets of a small universe, to reach the bitmap and all-ones encodings.
fn dense_set() -> impl Strategy<Value = (Vec<u64>, u64)> {
    (1..3000u64, 0..4u64).prop_flat_map(|(universe, holes_per_64)| {
        prop::collection::vec(any::<u64>(), (universe as usize).div_ceil(64)).prop_map(
            move |words| {
                let values: Vec<u64> = (0..universe)
                    .filter(|&v| {
                        // a hole wherever the low `holes_per_64` bits are all clear
                        let w = words[(v / 64) as usize].rotate_left((v % 64) as u32);
                        holes_per_64 == 0 || (w & ((1 << holes_per_64) - 1)) != 0
                    })
                    .collect();
                (values, universe)
            },
        )
    })
}

fn params_strategy() -> impl Strategy<Value = GlobalParameters> {
    (1..10u8, 1..10u8, 1..10u8, 1..10u8).prop_map(|(s0, s1, r, p)| {
        GlobalParameters::new()
            .with_ef_sampling(s0, s1)
            .with_rb_sampling(r, p)
    })
}

fn naive_next_geq(values: &[u64], universe: u64, lb: u64) -> Posting {
    let p = values.partition_point(|&v| v < lb);
    values
        .get(p)
        .map_or((values.len() as u64, universe), |&v| (p as u64, v))
}

/// Write `values` behind some unrelated bits and return the stream with the offset.
fn write_with<E: SequenceEncoding>(
    values: &[u64],
    universe: u64,
    params: &GlobalParameters,
) -> (BitVector, u64) {
    let mut b = BitVectorBuilder::new();
    b.append_bits(0x2a, 7);
    let offset = b.len();
    E::write(
        &mut b,
        values.iter().copied(),
        universe,
        values.len() as u64,
        params,
    )
    .unwrap();
    assert_eq!(b.len() - offset, E::bitsize(params, universe, values.len() as u64));
    (b.build(), offset)
}

/// Round trip, seek and random access against the plain vector.
fn check_contract<E: SequenceEncoding>(
    values: &[u64],
    universe: u64,
    params: &GlobalParameters,
    probes: &[u64],
) -> Result<(), TestCaseError> {
    let n = values.len() as u64;
    let (bv, offset) = write_with::<E>(values, universe, params);

    let e = E::enumerator(&bv, offset, universe, n, params);
    prop_assert_eq!(e.size(), n);
    let scanned: Vec<u64> = e.postings().map(|(_, v)| v).collect();
    prop_assert_eq!(&scanned, values);

    let mut e = E::enumerator(&bv, offset, universe, n, params);
    for &lb in probes {
        prop_assert_eq!(e.next_geq(lb), naive_next_geq(values, universe, lb));
    }

    let mut e = E::enumerator(&bv, offset, universe, n, params);
    for &p in probes {
        if n == 0 {
            prop_assert!(e.move_to(p).is_err());
            continue;
        }
        let p = p % n;
        prop_assert_eq!(e.move_to(p).unwrap(), (p, values[p as usize]));
        prop_assert_eq!(e.prev_value().unwrap(), values[p as usize]);
        let after = e.next();
        let expected = values
            .get(p as usize + 1)
            .map_or((n, universe), |&v| (p + 1, v));
        prop_assert_eq!(after, expected);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Next,
    MoveTo(u64),
    NextGeq(u64),
    /// Bound a short distance past the last returned value.
    Step(u8),
    /// Bound a long distance past the last returned value.
    Hop(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Next),
        1 => any::<u64>().prop_map(Op::MoveTo),
        1 => any::<u64>().prop_map(Op::NextGeq),
        2 => any::<u8>().prop_map(Op::Step),
        2 => any::<u16>().prop_map(Op::Hop),
    ]
}

/// Drive one cursor through a mix of operations and compare every answer,
/// and `prev_value` after each step, with a model that only tracks a position.
fn check_interleaved<E: SequenceEncoding>(
    values: &[u64],
    universe: u64,
    params: &GlobalParameters,
    ops: &[Op],
) -> Result<(), TestCaseError> {
    let n = values.len() as u64;
    let (bv, offset) = write_with::<E>(values, universe, params);
    let mut e = E::enumerator(&bv, offset, universe, n, params);

    let at = |p: u64| (p, values.get(p as usize).copied().unwrap_or(universe));
    let mut current: Option<u64> = None;

    for &op in ops {
        let lower_bound = match op {
            Op::Next => {
                let p = current.map_or(0, |p| (p + 1).min(n));
                current = Some(p);
                prop_assert_eq!(e.next(), at(p), "next after {:?}", op);
                None
            }
            Op::MoveTo(raw) => {
                let p = raw % (n + 2);
                if p < n {
                    current = Some(p);
                    prop_assert_eq!(e.move_to(p), Ok(at(p)));
                } else {
                    prop_assert!(e.move_to(p).is_err());
                }
                None
            }
            Op::NextGeq(raw) => Some(raw % (universe + 2)),
            Op::Step(delta) => Some(current.map_or(0, |p| at(p).1) + (delta % 24) as u64),
            Op::Hop(delta) => Some(current.map_or(0, |p| at(p).1) + delta as u64),
        };
        if let Some(lb) = lower_bound {
            let expected = naive_next_geq(values, universe, lb);
            current = Some(expected.0);
            prop_assert_eq!(e.next_geq(lb), expected, "next_geq({})", lb);
        }
        prop_assert_eq!(e.prev_value().ok(), current.map(|p| at(p).1));
    }
    Ok(())
}

proptest! {
    #[test]
    fn indexed_sequence_contract(
        (values, universe) in sorted_set(600, 1 << 20),
        params in params_strategy(),
        probes in prop::collection::vec(0..(1u64 << 20) + 8, 0..64),
    ) {
        check_contract::<IndexedSequence>(&values, universe, &params, &probes)?;
    }

    #[test]
    fn dense_indexed_sequence_contract(
        (values, universe) in dense_set(),
        params in params_strategy(),
        probes in prop::collection::vec(0..3008u64, 0..64),
    ) {
        check_contract::<IndexedSequence>(&values, universe, &params, &probes)?;
    }

    #[test]
    fn elias_fano_contract(
        (values, universe) in sorted_set(800, 1 << 16),
        params in params_strategy(),
        probes in prop::collection::vec(0..(1u64 << 16) + 80, 0..64),
    ) {
        check_contract::<CompactEliasFano>(&values, universe, &params, &probes)?;
    }

    #[test]
    fn elias_fano_sorted_probes(
        (values, universe) in sorted_set(2000, 1 << 18),
        mut probes in prop::collection::vec(0..(1u64 << 18) + 80, 0..200),
    ) {
        // non-decreasing bounds exercise the forward skip paths
        probes.sort_unstable();
        let params = GlobalParameters::new().with_ef_sampling(3, 3);
        check_contract::<CompactEliasFano>(&values, universe, &params, &probes)?;
    }

    #[test]
    fn ranked_bitvector_contract(
        (values, universe) in sorted_set(800, 4096),
        params in params_strategy(),
        probes in prop::collection::vec(0..4200u64, 0..64),
    ) {
        check_contract::<CompactRankedBitvector>(&values, universe, &params, &probes)?;
    }

    #[test]
    fn all_ones_contract(
        universe in 0..5000u64,
        probes in prop::collection::vec(0..5100u64, 0..64),
    ) {
        let values: Vec<u64> = (0..universe).collect();
        check_contract::<AllOnesSequence>(&values, universe, &GlobalParameters::default(), &probes)?;
    }

    #[test]
    fn elias_fano_accepts_duplicates(
        mut values in prop::collection::vec(0..500u64, 0..300),
        probes in prop::collection::vec(0..520u64, 0..32),
    ) {
        values.sort_unstable();
        let params = GlobalParameters::new().with_ef_sampling(2, 2);
        check_contract::<CompactEliasFano>(&values, 500, &params, &probes)?;
    }

    #[test]
    fn selector_is_deterministic_and_minimal(
        universe in any::<u64>(),
        per_mille in 0..=1000u64,
        params in params_strategy(),
    ) {
        let n = (universe as u128 * per_mille as u128 / 1000) as u64;
        let (encoding, cost) = best_encoding(&params, universe, n);
        prop_assert_eq!(best_encoding(&params, universe, n), (encoding, cost));
        for other in Encoding::ALL {
            let other_cost = other.bitsize(&params, universe, n);
            prop_assert!(cost <= other_cost);
            if other < encoding {
                prop_assert!(cost < other_cost);
            }
        }
    }

    #[test]
    fn interleaved_indexed_sequence(
        (values, universe) in sorted_set(600, 1 << 16),
        params in params_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..120),
    ) {
        check_interleaved::<IndexedSequence>(&values, universe, &params, &ops)?;
    }

    #[test]
    fn interleaved_dense_indexed_sequence(
        (values, universe) in dense_set(),
        params in params_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..120),
    ) {
        check_interleaved::<IndexedSequence>(&values, universe, &params, &ops)?;
    }

    #[test]
    fn interleaved_elias_fano_with_duplicates(
        mut values in prop::collection::vec(0..20_000u64, 0..800),
        params in params_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..120),
    ) {
        values.sort_unstable();
        check_interleaved::<CompactEliasFano>(&values, 20_000, &params, &ops)?;
    }

    #[test]
    fn interleaved_ranked_bitvector(
        (values, universe) in sorted_set(800, 4096),
        params in params_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..120),
    ) {
        check_interleaved::<CompactRankedBitvector>(&values, universe, &params, &ops)?;
    }

    #[test]
    fn interleaved_all_ones(
        universe in 0..3000u64,
        ops in prop::collection::vec(op_strategy(), 0..120),
    ) {
        let values: Vec<u64> = (0..universe).collect();
        check_interleaved::<AllOnesSequence>(&values, universe, &GlobalParameters::default(), &ops)?;
    }

    #[test]
    fn collection_matches_input(
        lists in prop::collection::vec(prop::collection::btree_set(0..1500u64, 0..400), 0..12),
    ) {
        let universe = 1500u64;
        let mut builder = SequenceCollectionBuilder::new(universe, GlobalParameters::default()).unwrap();
        for list in &lists {
            builder.add_sequence(list.iter().copied(), list.len() as u64).unwrap();
        }
        let collection = builder.build().unwrap();
        prop_assert_eq!(collection.len(), lists.len());
        for (i, list) in lists.iter().enumerate() {
            let got: Vec<u64> = collection.get(i).unwrap().postings().map(|(_, v)| v).collect();
            let expected: Vec<u64> = list.iter().copied().collect();
            prop_assert_eq!(got, expected);
        }
        prop_assert!(collection.get(lists.len()).is_err());
    }
}

#[test]
fn boundary_scenarios() {
    let params = GlobalParameters::default();
    assert_eq!(best_encoding(&params, 1000, 1000).0, Encoding::AllOnes);
    assert_eq!(best_encoding(&params, 1_000_000, 10).0, Encoding::EliasFano);

    let clustered = [0u64, 1, 2, 3, 5, 8, 9, 10, 11, 12];
    let (bv, offset) = write_with::<IndexedSequence>(&clustered, 1_000_000, &params);
    let mut e = IndexedSequenceEnumerator::new(&bv, offset, 1_000_000, 10, &params);
    assert_eq!(e.encoding(), Encoding::EliasFano);
    assert_eq!(e.next_geq(6), (5, 8));
    assert_eq!(e.next_geq(13), (10, 1_000_000));
}

#[test]
fn encoding_sweep_is_monotone() {
    let params = GlobalParameters::default();
    for universe in [4u64, 64, 1000, 4096, 100_000] {
        let step = (universe / 2000).max(1);
        let mut last = Encoding::EliasFano;
        let mut n = 0;
        while n <= universe {
            let (encoding, _) = best_encoding(&params, universe, n);
            assert!(
                encoding >= last,
                "universe={universe} n={n}: {encoding} after {last}"
            );
            last = encoding;
            n += step;
        }
        assert_eq!(best_encoding(&params, universe, universe).0, Encoding::AllOnes);
        if universe >= 64 {
            assert_eq!(best_encoding(&params, universe, 1).0, Encoding::EliasFano);
        }
    }
}

#[test]
fn enumerators_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<IndexedSequenceEnumerator<'static>>();
    assert_send_sync::<BitVector>();
    assert_send_sync::<indexed_seq::SequenceCollection>();
}

#[test]
fn concurrent_readers_share_one_stream() {
    let params = GlobalParameters::default();
    let values: Vec<u64> = (0..5000u64).map(|i| i * 7 + i % 3).collect();
    let universe = 40_000;
    let (bv, offset) = write_with::<IndexedSequence>(&values, universe, &params);

    std::thread::scope(|s| {
        for t in 0..4u64 {
            let (bv, values, params) = (&bv, &values, &params);
            s.spawn(move || {
                let mut e = IndexedSequenceEnumerator::new(bv, offset, universe, 5000, params);
                for lb in (t..universe).step_by(997) {
                    assert_eq!(e.next_geq(lb), naive_next_geq(values, universe, lb));
                }
            });
        }
    });
}
