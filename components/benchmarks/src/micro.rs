//! Micro-benchmarks for type dispatch workloads
//!
//! Each workload models a dispatch site: how many types reach it, how
//! their identities are laid out in memory, and in which order they arrive.

use crate::runner::{Benchmark, BenchmarkResult, BenchmarkSuite, Target};
use core_types::TypeIdentity;

/// Lookups per replayed sequence
const SEQUENCE_LEN: usize = 10_000;

/// Replays per run
const ROUNDS: usize = 20;

/// Deterministic xorshift generator so runs are comparable
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }
}

/// `count` identities laid out like descriptors `stride` bytes apart
fn aligned(base: usize, stride: usize, count: usize) -> Vec<TypeIdentity> {
    (1..=count)
        .map(|k| TypeIdentity::from_word(base + k * stride))
        .collect()
}

/// `count` identities with arbitrary bit patterns
fn scattered(count: usize, rng: &mut XorShift) -> Vec<TypeIdentity> {
    let mut identities = Vec::with_capacity(count);
    while identities.len() < count {
        if let Some(identity) = TypeIdentity::new(rng.next() as usize) {
            if !identities.contains(&identity) {
                identities.push(identity);
            }
        }
    }
    identities
}

fn round_robin(count: usize) -> Vec<usize> {
    (0..SEQUENCE_LEN).map(|i| i % count).collect()
}

fn random_order(count: usize, rng: &mut XorShift) -> Vec<usize> {
    (0..SEQUENCE_LEN).map(|_| rng.below(count)).collect()
}

/// Identities of a handful of real Rust types
fn std_types() -> Vec<TypeIdentity> {
    vec![
        TypeIdentity::of::<u8>(),
        TypeIdentity::of::<u16>(),
        TypeIdentity::of::<u32>(),
        TypeIdentity::of::<u64>(),
        TypeIdentity::of::<i32>(),
        TypeIdentity::of::<f64>(),
        TypeIdentity::of::<bool>(),
        TypeIdentity::of::<char>(),
        TypeIdentity::of::<String>(),
        TypeIdentity::of::<Vec<u8>>(),
        TypeIdentity::of::<Option<u32>>(),
        TypeIdentity::of::<()>(),
    ]
}

/// Create all micro-benchmarks
pub fn create_benchmarks() -> Vec<Benchmark> {
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);

    vec![
        Benchmark {
            name: "monomorphic".to_string(),
            description: "One type at the site".to_string(),
            identities: aligned(0x5555_0000, 64, 1),
            sequence: round_robin(1),
            rounds: ROUNDS,
        },
        Benchmark {
            name: "aligned_polymorphic".to_string(),
            description: "8 types, 64-byte aligned, round robin".to_string(),
            identities: aligned(0x5555_0000, 64, 8),
            sequence: round_robin(8),
            rounds: ROUNDS,
        },
        Benchmark {
            name: "megamorphic".to_string(),
            description: "256 types, 32-byte aligned, random order".to_string(),
            identities: aligned(0x7f00_0000, 32, 256),
            sequence: random_order(256, &mut rng),
            rounds: ROUNDS,
        },
        Benchmark {
            name: "scattered".to_string(),
            description: "64 types with arbitrary identities".to_string(),
            identities: scattered(64, &mut rng),
            sequence: random_order(64, &mut rng),
            rounds: ROUNDS,
        },
        Benchmark {
            name: "std_types".to_string(),
            description: "12 std types identified through TypeId".to_string(),
            identities: std_types(),
            sequence: random_order(12, &mut rng),
            rounds: ROUNDS,
        },
    ]
}

/// Collect the micro-benchmarks into a suite
pub fn create_suite() -> BenchmarkSuite {
    let mut suite = BenchmarkSuite::new("micro".to_string());
    for benchmark in create_benchmarks() {
        suite.add(benchmark);
    }
    suite
}

/// Run all micro-benchmarks against every target
pub fn run_all() -> Vec<BenchmarkResult> {
    create_suite().run(&Target::ALL)
}
