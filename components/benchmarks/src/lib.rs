//! Benchmark infrastructure for the type dispatch cache
//!
//! This crate measures how fast the adaptive dispatch cache resolves type
//! identities compared to a plain hash map. It includes:
//!
//! - Micro-benchmarks modelling monomorphic, polymorphic and megamorphic sites
//! - Benchmark runner with timing and result formatting
//!
//! # Examples
//!
//! ```rust,no_run
//! use benchmarks::micro;
//!
//! let results = micro::run_all();
//! for result in results {
//!     println!("{} [{}]: {:.2}ms", result.name, result.target, result.duration_ms);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod micro;
pub mod runner;

pub use runner::{Benchmark, BenchmarkResult, BenchmarkSuite, Target};
