#![allow(dead_code)]

use criterion::measurement::WallTime;
use criterion::BenchmarkGroup;
use std::path::Path;
use std::time::Duration;

pub const SIZES_SMALL: &[usize] = &[8192, 65536];
pub const SIZES_ALL: &[usize] = &[8192, 65536, 4_194_304];

pub fn cap(group: &mut BenchmarkGroup<'_, WallTime>) {
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);
}

/// `size` bytes of sample text, taken from `samples/bench.txt` if present.
pub fn get_test_data(size: usize) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("samples")
        .join("bench.txt");
    let seed = match std::fs::read(&path) {
        Ok(data) if !data.is_empty() => data,
        _ => b"The quick brown fox jumps over the lazy dog. ".to_vec(),
    };

    let full = seed.repeat(size / seed.len() + 1);
    full[..size].to_vec()
}

/// Pseudo-random bytes (xorshift), close to incompressible.
pub fn get_random_data(size: usize) -> Vec<u8> {
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    (0..size)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect()
}
