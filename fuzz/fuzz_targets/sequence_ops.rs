#![no_main]
use libfuzzer_sys::fuzz_target;
use indexed_seq::{
    BitVectorBuilder, GlobalParameters, IndexedSequence, IndexedSequenceEnumerator,
    SequenceEncoding, SequenceEnumerator,
};

fuzz_target!(|data: (Vec<u16>, u16, u8, Vec<u32>)| {
    let (gaps, slack, sampling, probes) = data;

    // Turn gaps into a strictly increasing sequence.
    let mut values = Vec::with_capacity(gaps.len());
    let mut next = 0u64;
    for g in gaps {
        next += g as u64;
        values.push(next);
        next += 1;
    }
    let universe = next + (slack % 256) as u64;
    let n = values.len() as u64;

    let s = (sampling % 9) + 1;
    let params = GlobalParameters::new()
        .with_ef_sampling(s, s)
        .with_rb_sampling(s, s);

    let mut builder = BitVectorBuilder::new();
    builder.append_bits(1, (sampling % 64) as usize);
    let offset = builder.len();
    IndexedSequence::write(&mut builder, values.iter().copied(), universe, n, &params)
        .expect("ascending input within the universe must encode");
    assert_eq!(
        builder.len() - offset,
        IndexedSequence::bitsize(&params, universe, n)
    );
    let bits = builder.build();

    let mut e = IndexedSequenceEnumerator::new(&bits, offset, universe, n, &params);
    for (i, &v) in values.iter().enumerate() {
        assert_eq!(e.next(), (i as u64, v));
    }
    assert_eq!(e.next(), (n, universe));

    for p in probes {
        let lb = p as u64 % (universe + 2);
        let i = values.partition_point(|&v| v < lb);
        let expected = values
            .get(i)
            .map_or((n, universe), |&v| (i as u64, v));
        assert_eq!(e.next_geq(lb), expected);

        if n > 0 {
            let pos = p as u64 % n;
            assert_eq!(e.move_to(pos), Ok((pos, values[pos as usize])));
        }
    }
});
