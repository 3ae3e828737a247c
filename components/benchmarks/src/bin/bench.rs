//! Type dispatch benchmark CLI
//!
//! Command-line interface for running the dispatch micro-benchmarks.

use benchmarks::{micro, runner, Target};
use clap::{Parser, ValueEnum};
use std::process;
use tracing_subscriber::EnvFilter;

/// Which structures to measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TargetArg {
    /// The adaptive dispatch cache only
    Cache,
    /// The hash map baseline only
    Hashmap,
    /// Both, side by side
    Both,
}

impl TargetArg {
    fn targets(self) -> &'static [Target] {
        match self {
            TargetArg::Cache => &[Target::DispatchCache],
            TargetArg::Hashmap => &[Target::HashMap],
            TargetArg::Both => &Target::ALL,
        }
    }
}

/// Benchmark command line arguments.
#[derive(Parser, Debug)]
#[command(name = "typeswitch-bench")]
#[command(about = "Measure the adaptive type dispatch cache against a hash map")]
struct Args {
    /// Only run benchmarks whose name contains this pattern
    #[arg(short, long, value_name = "PATTERN")]
    filter: Option<String>,

    /// Structures to measure
    #[arg(short, long, value_enum, default_value_t = TargetArg::Both)]
    target: TargetArg,

    /// Runs averaged per benchmark
    #[arg(short, long, default_value_t = 1)]
    iterations: usize,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Log every cache retune
    #[arg(short, long)]
    verbose: bool,
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("type_cache=debug,benchmarks=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();

    setup_tracing(args.verbose);

    let mut suite = micro::create_suite();
    if let Some(pattern) = &args.filter {
        suite.retain_matching(pattern);
    }

    if suite.benchmarks.is_empty() {
        eprintln!("Error: no benchmark matches the filter");
        process::exit(1);
    }

    if !args.json {
        println!("Running {} micro-benchmarks...\n", suite.benchmarks.len());
    }

    let results = suite.run_multiple(args.target.targets(), args.iterations);

    // Output results
    if args.json {
        match runner::format_results_json(&results) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error formatting JSON: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", runner::format_results(&results));

        // Summary statistics
        let successful = results.iter().filter(|r| r.success).count();
        let failed = results.len() - successful;
        let total_time: f64 = results.iter().map(|r| r.duration_ms).sum();

        println!("\nSummary:");
        println!("  Total benchmarks: {}", results.len());
        println!("  Successful: {}", successful);
        println!("  Failed: {}", failed);
        println!("  Total time: {:.2} ms ({:.2} s)", total_time, total_time / 1000.0);

        if failed > 0 {
            process::exit(1);
        }
    }
}
