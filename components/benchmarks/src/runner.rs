//! Benchmark runner and result types
//!
//! Provides infrastructure for replaying a lookup workload against a
//! dispatch target and collecting timing results.

use core_types::TypeIdentity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hint::black_box;
use std::time::Instant;
use type_cache::DispatchCache;

/// Structure a workload is replayed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The adaptive direct-mapped cache
    DispatchCache,
    /// `std::collections::HashMap` baseline
    HashMap,
}

impl Target {
    /// Every target, cache first
    pub const ALL: [Target; 2] = [Target::DispatchCache, Target::HashMap];
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::DispatchCache => write!(f, "dispatch_cache"),
            Target::HashMap => write!(f, "hash_map"),
        }
    }
}

/// A single benchmark workload
#[derive(Debug, Clone)]
pub struct Benchmark {
    /// Name of the benchmark
    pub name: String,
    /// Description of what the benchmark tests
    pub description: String,
    /// Distinct identities the workload dispatches on
    pub identities: Vec<TypeIdentity>,
    /// Order of lookups, as indices into `identities`
    pub sequence: Vec<usize>,
    /// Number of times the sequence is replayed
    pub rounds: usize,
}

/// Result of running a benchmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Name of the benchmark
    pub name: String,
    /// Description of the benchmark
    pub description: String,
    /// Structure the workload ran against
    pub target: Target,
    /// Number of lookups performed
    pub lookups: u64,
    /// Duration in milliseconds
    pub duration_ms: f64,
    /// Lookups per second
    pub ops_per_sec: Option<f64>,
    /// Fraction of lookups answered by the slot array (cache only)
    pub hit_rate: Option<f64>,
    /// Layout recomputations (cache only)
    pub retunes: Option<u64>,
    /// Final log2 slot count (cache only)
    pub log_size: Option<u32>,
    /// Final shift (cache only)
    pub shift: Option<u32>,
    /// Whether every lookup reached the right value
    pub success: bool,
    /// Error message if failed
    pub error: Option<String>,
}

impl Benchmark {
    /// Number of lookups one run performs
    pub fn lookups(&self) -> u64 {
        (self.sequence.len() * self.rounds) as u64
    }

    /// Run this benchmark against `target`
    ///
    /// Every lookup increments the value of its identity; the run succeeds
    /// when the values add up to the number of lookups.
    pub fn run(&self, target: Target) -> BenchmarkResult {
        let start = Instant::now();

        let (checksum, cache) = match target {
            Target::DispatchCache => {
                let mut cache: DispatchCache<u64> = DispatchCache::with_expected_size(8);
                for _ in 0..self.rounds {
                    for &index in &self.sequence {
                        *cache.lookup(black_box(self.identities[index])) += 1;
                    }
                }
                (cache.iter().map(|(_, count)| *count).sum::<u64>(), Some(cache))
            }
            Target::HashMap => {
                let mut map: HashMap<TypeIdentity, u64> = HashMap::with_capacity(8);
                for _ in 0..self.rounds {
                    for &index in &self.sequence {
                        *map.entry(black_box(self.identities[index])).or_default() += 1;
                    }
                }
                (map.values().sum::<u64>(), None)
            }
        };

        let duration = start.elapsed();
        let duration_ms = duration.as_secs_f64() * 1000.0;
        let lookups = self.lookups();
        let secs = duration.as_secs_f64();

        tracing::debug!(
            benchmark = %self.name,
            %target,
            lookups,
            duration_ms,
            "benchmark finished"
        );

        let error = (checksum != lookups)
            .then(|| format!("checksum {} does not match {} lookups", checksum, lookups));

        BenchmarkResult {
            name: self.name.clone(),
            description: self.description.clone(),
            target,
            lookups,
            duration_ms,
            ops_per_sec: (secs > 0.0).then(|| lookups as f64 / secs),
            hit_rate: cache.as_ref().and_then(|c| c.profile().hit_rate()),
            retunes: cache.as_ref().map(|c| c.profile().retunes),
            log_size: cache.as_ref().map(DispatchCache::log_size),
            shift: cache.as_ref().map(DispatchCache::shift),
            success: error.is_none(),
            error,
        }
    }

    /// Run this benchmark multiple times and return the average
    ///
    /// Stops at the first failing run and returns it.
    pub fn run_multiple(&self, target: Target, iterations: usize) -> BenchmarkResult {
        let iterations = iterations.max(1);
        let mut total_duration_ms = 0.0;
        let mut result = self.run(target);

        for _ in 1..iterations {
            if !result.success {
                return result;
            }
            total_duration_ms += result.duration_ms;
            result = self.run(target);
        }

        if result.success {
            total_duration_ms += result.duration_ms;
            result.duration_ms = total_duration_ms / iterations as f64;
            result.ops_per_sec = (result.duration_ms > 0.0)
                .then(|| result.lookups as f64 / (result.duration_ms / 1000.0));
        }
        result
    }
}

/// Suite of benchmarks
pub struct BenchmarkSuite {
    /// Name of the suite
    pub name: String,
    /// Benchmarks in this suite
    pub benchmarks: Vec<Benchmark>,
}

impl BenchmarkSuite {
    /// Create a new benchmark suite
    pub fn new(name: String) -> Self {
        Self {
            name,
            benchmarks: Vec::new(),
        }
    }

    /// Add a benchmark to this suite
    pub fn add(&mut self, benchmark: Benchmark) {
        self.benchmarks.push(benchmark);
    }

    /// Keep only benchmarks whose name contains `pattern`
    pub fn retain_matching(&mut self, pattern: &str) {
        self.benchmarks.retain(|b| b.name.contains(pattern));
    }

    /// Run every benchmark against every target in `targets`
    pub fn run(&self, targets: &[Target]) -> Vec<BenchmarkResult> {
        self.run_multiple(targets, 1)
    }

    /// Run every benchmark against every target and average
    pub fn run_multiple(&self, targets: &[Target], iterations: usize) -> Vec<BenchmarkResult> {
        self.benchmarks
            .iter()
            .flat_map(|b| targets.iter().map(move |&t| b.run_multiple(t, iterations)))
            .collect()
    }
}

/// Format benchmark results as a human-readable table
pub fn format_results(results: &[BenchmarkResult]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{:<24} {:<16} {:>13} {:>12} {:>9} {:<8}\n",
        "Benchmark", "Target", "Duration (ms)", "Mlookups/s", "Hit rate", "Status"
    ));
    output.push_str(&format!("{}\n", "=".repeat(87)));

    for result in results {
        let status = if result.success { "✓ PASS" } else { "✗ FAIL" };
        let mops = result
            .ops_per_sec
            .map_or_else(|| "-".to_string(), |ops| format!("{:.2}", ops / 1e6));
        let hit_rate = result
            .hit_rate
            .map_or_else(|| "-".to_string(), |rate| format!("{:.1}%", rate * 100.0));

        output.push_str(&format!(
            "{:<24} {:<16} {:>10.2} ms {:>12} {:>9} {:<8}\n",
            result.name,
            result.target.to_string(),
            result.duration_ms,
            mops,
            hit_rate,
            status
        ));

        if let Some(error) = &result.error {
            output.push_str(&format!("  Error: {}\n", error));
        }
    }

    output
}

/// Format benchmark results as JSON
pub fn format_results_json(results: &[BenchmarkResult]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}
