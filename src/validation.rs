/// Validation tests across the whole codec.
///
/// These tests verify:
/// 1. **Round-trip correctness** for a broad set of test vectors, both
///    through the container and directly through tree + bit I/O
/// 2. **Container properties** - passthrough bound, header integrity,
///    single-symbol payloads, truncated artifacts
/// 3. **Optimality** - achieved payload size matches the optimal prefix-code cost
/// 4. **Session isolation** - concurrent sessions produce the same bytes
///    as sequential ones
#[cfg(test)]
mod tests {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    use proptest::prelude::*;

    use crate::bitio::{BitReader, BitWriter};
    use crate::container::{self, Header, Mode, PASSTHROUGH_THRESHOLD};
    use crate::frequency::{self, FrequencyTable};
    use crate::huffman::HuffmanTree;
    use crate::pipeline;
    use crate::HuffError;

    // ---------------------------------------------------------------
    // Helper: generate diverse test vectors
    // ---------------------------------------------------------------

    /// Highly compressible: single byte repeated.
    fn data_all_zeros(n: usize) -> Vec<u8> {
        vec![0u8; n]
    }

    /// Every byte value once (uniform distribution, 8 bits entropy).
    fn data_uniform() -> Vec<u8> {
        (0..=255u8).collect()
    }

    /// Skewed distribution: 90% one byte, 10% another.
    fn data_skewed(n: usize) -> Vec<u8> {
        (0..n).map(|i| if i % 10 == 0 { 1 } else { 0 }).collect()
    }

    fn data_repeating_text() -> Vec<u8> {
        b"the quick brown fox jumps over the lazy dog. ".repeat(100)
    }

    /// Binary data with some structure (sawtooth).
    fn data_sawtooth(n: usize) -> Vec<u8> {
        (0..n).map(|i| (i % 256) as u8).collect()
    }

    /// Geometric-ish counts: symbol i appears 2^(i/4) times.
    fn data_geometric() -> Vec<u8> {
        let mut v = Vec::new();
        for i in 0..48u8 {
            v.extend(std::iter::repeat(i).take(1 << (i / 4)));
        }
        v
    }

    /// Optimal prefix-code cost: the sum of all merged weights.
    fn optimal_cost(freq: &FrequencyTable) -> u64 {
        let mut heap: BinaryHeap<Reverse<u64>> =
            freq.symbols().map(|(_, c)| Reverse(c)).collect();
        let mut cost = 0;
        while heap.len() > 1 {
            let Reverse(a) = heap.pop().unwrap();
            let Reverse(b) = heap.pop().unwrap();
            cost += a + b;
            heap.push(Reverse(a + b));
        }
        cost
    }

    // ---------------------------------------------------------------
    // 1. Round-trip validation
    // ---------------------------------------------------------------

    macro_rules! round_trip_test {
        ($name:ident, $data:expr) => {
            mod $name {
                use super::*;

                #[test]
                fn container() {
                    let input = $data;
                    let packed = pipeline::compress(&input).unwrap();
                    let out = pipeline::decompress(&packed).unwrap();
                    assert!(out.is_complete(), "unexpected truncation");
                    assert_eq!(out.data, input, "container round-trip failed");
                }

                #[test]
                fn tree_and_bits() {
                    let input = $data;
                    let tree = HuffmanTree::from_data(&input).unwrap();
                    let mut writer = BitWriter::new(Vec::new());
                    tree.code_table().encode(&input, &mut writer).unwrap();
                    let payload = writer.finish().unwrap();

                    let mut output = Vec::new();
                    let mut reader = BitReader::new(&payload[..]);
                    tree.decode(&mut reader, input.len() as u64, &mut output)
                        .unwrap();
                    assert_eq!(output, input, "tree round-trip failed");
                }

                #[test]
                fn optimal_payload() {
                    let input = $data;
                    let freq = frequency::get_frequency(&input);
                    let codes = HuffmanTree::from_frequency_table(&freq)
                        .unwrap()
                        .code_table();
                    assert_eq!(codes.encoded_bits(&freq), optimal_cost(&freq));
                }
            }
        };
    }

    round_trip_test!(rt_zeros_100, data_all_zeros(100));
    round_trip_test!(rt_zeros_5000, data_all_zeros(5000));
    round_trip_test!(rt_uniform, data_uniform());
    round_trip_test!(rt_skewed_1000, data_skewed(1000));
    round_trip_test!(rt_repeating_text, data_repeating_text());
    round_trip_test!(rt_sawtooth_1024, data_sawtooth(1024));
    round_trip_test!(rt_geometric, data_geometric());
    round_trip_test!(rt_single_byte, vec![42u8]);
    round_trip_test!(rt_two_bytes, vec![0u8, 255]);
    round_trip_test!(rt_nine_bytes, b"AAAAAAAAB".to_vec());

    // ---------------------------------------------------------------
    // 2. Container properties
    // ---------------------------------------------------------------

    #[test]
    fn all_256_symbols_in_one_container() {
        let mut input = data_uniform();
        input.extend(data_skewed(3000));
        let packed = pipeline::compress(&input).unwrap();
        assert_eq!(packed[1], 0, "256 symbols are stored as 0");
        let info = container::inspect(&packed).unwrap();
        assert_eq!(info.unique_symbols, 256);
        assert_eq!(pipeline::decompress(&packed).unwrap().data, input);
    }

    #[test]
    fn compression_shrinks_skewed_data() {
        let input = data_skewed(10_000);
        let packed = pipeline::compress(&input).unwrap();
        assert!(
            packed.len() < input.len() / 4,
            "packed {} bytes, input {} bytes",
            packed.len(),
            input.len()
        );
    }

    #[test]
    fn compression_is_deterministic() {
        let input = data_geometric();
        assert_eq!(
            pipeline::compress(&input).unwrap(),
            pipeline::compress(&input).unwrap()
        );
    }

    #[test]
    fn trailing_garbage_after_payload_is_ignored() {
        let input = data_repeating_text();
        let mut packed = pipeline::compress(&input).unwrap();
        packed.extend_from_slice(&[0xAA; 16]);
        let out = pipeline::decompress(&packed).unwrap();
        assert!(out.is_complete());
        assert_eq!(out.data, input);
    }

    // ---------------------------------------------------------------
    // 3. Session isolation
    // ---------------------------------------------------------------

    #[test]
    fn concurrent_sessions_match_sequential() {
        let inputs = vec![
            data_repeating_text(),
            data_geometric(),
            data_skewed(4096),
            data_sawtooth(777),
        ];
        let sequential: Vec<Vec<u8>> = inputs
            .iter()
            .map(|i| pipeline::compress(i).unwrap())
            .collect();

        let parallel: Vec<Vec<u8>> = std::thread::scope(|s| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|i| s.spawn(move || pipeline::compress(i).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sequential, parallel);
    }

    // ---------------------------------------------------------------
    // 4. Property tests
    // ---------------------------------------------------------------

    proptest! {
        #[test]
        fn proptest_round_trip(data in proptest::collection::vec(any::<u8>(), 1..2048)) {
            let packed = pipeline::compress(&data).unwrap();
            let out = pipeline::decompress(&packed).unwrap();
            prop_assert!(out.is_complete());
            prop_assert_eq!(out.data, data);
        }

        #[test]
        fn proptest_small_alphabet_round_trip(
            data in proptest::collection::vec(0u8..4, 1..4096)
        ) {
            let packed = pipeline::compress(&data).unwrap();
            prop_assert_eq!(pipeline::decompress(&packed).unwrap().data, data);
        }

        #[test]
        fn proptest_passthrough_bound(
            data in proptest::collection::vec(any::<u8>(), 1..=PASSTHROUGH_THRESHOLD)
        ) {
            let packed = pipeline::compress(&data).unwrap();
            prop_assert_eq!(packed.len(), data.len() + 1);
            prop_assert_eq!(packed[0], Mode::Passthrough as u8);
        }

        #[test]
        fn proptest_header_integrity(data in proptest::collection::vec(any::<u8>(), 9..2048)) {
            let packed = pipeline::compress(&data).unwrap();
            match container::read_header(&mut &packed[..]).unwrap() {
                Header::Huffman { original_len, freq } => {
                    let sum: u64 = freq.symbols().map(|(_, c)| c).sum();
                    prop_assert_eq!(sum, original_len);
                    prop_assert_eq!(original_len, data.len() as u64);
                }
                Header::Passthrough => prop_assert!(false, "expected huffman mode"),
            }
        }

        #[test]
        fn proptest_truncation_never_panics(
            data in proptest::collection::vec(any::<u8>(), 9..512),
            cut in any::<prop::sample::Index>()
        ) {
            let packed = pipeline::compress(&data).unwrap();
            let cut = cut.index(packed.len());
            match pipeline::decompress(&packed[..cut]) {
                Ok(out) => {
                    prop_assert!(out.data.len() <= data.len());
                    prop_assert_eq!(&out.data[..], &data[..out.data.len()]);
                }
                Err(HuffError::Format(_)) => {}
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }
}
