// scripts/benchmark.rs
use fast_bsm::analytics::batch::{value_batch, OptionContract};
use fast_bsm::analytics::bs_analytic;
use fast_bsm::math_utils::Timer;
use fast_bsm::rng::{RngFactory, ScenarioRanges, ScenarioSampler};
use fast_bsm::solvers::implied_vol::{implied_volatility_batch, ImpliedVolQuote, SolverConfig};
use rayon::prelude::*;
use std::env;
use std::fs::File;
use std::io::Write;
use std::process::Command;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::cpu_model().unwrap_or_else(|| "Unknown CPU".to_string()),
            cpu_cores: num_cpus::get(),
            rust_version: Command::new("rustc")
                .arg("--version")
                .output()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .unwrap_or_else(|_| "Unknown Rust version".to_string()),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    #[cfg(target_os = "linux")]
    fn cpu_model() -> Option<String> {
        std::fs::read_to_string("/proc/cpuinfo").ok().and_then(|content| {
            content
                .lines()
                .find(|line| line.starts_with("model name"))
                .and_then(|line| line.split(':').nth(1))
                .map(|s| s.trim().to_string())
        })
    }

    #[cfg(target_os = "macos")]
    fn cpu_model() -> Option<String> {
        Command::new("sysctl")
            .args(["-n", "machdep.cpu.brand_string"])
            .output()
            .ok()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn cpu_model() -> Option<String> {
        None
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    contracts: usize,
    time_ms: f64,
    throughput_per_sec: f64,
    failures: usize,
}

impl BenchmarkResult {
    fn new(name: String, contracts: usize, time_ms: f64, failures: usize) -> Self {
        BenchmarkResult {
            name,
            contracts,
            time_ms,
            throughput_per_sec: contracts as f64 / (time_ms / 1000.0),
            failures,
        }
    }
}

fn sample_contracts(n: usize, seed: u64) -> Vec<OptionContract> {
    let sampler = ScenarioSampler::new(&ScenarioRanges::default()).expect("Valid ranges");
    let factory = RngFactory::new(seed);
    (0..n as u64)
        .into_par_iter()
        .map(|i| {
            let mut rng = factory.create_std_rng(i);
            let (contract_type, params) = sampler.sample(&mut rng).expect("Valid scenario");
            OptionContract::new(contract_type, params)
        })
        .collect()
}

fn run_analytic_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();

    for &n in &[10_000, 100_000, 1_000_000] {
        info!(contracts = n, "running analytic benchmarks");
        let contracts = sample_contracts(n, 42);
        let mut timer = Timer::new();

        // Premium, sequential
        timer.start();
        let failures = contracts
            .iter()
            .map(|c| bs_analytic::premium(c.contract_type, &c.params))
            .filter(Result::is_err)
            .count();
        results.push(BenchmarkResult::new(
            format!("Premium sequential ({}k)", n / 1000),
            n,
            timer.elapsed_ms(),
            failures,
        ));

        // Premium + Greeks, rayon batch
        timer.start();
        let failures = value_batch(&contracts).iter().filter(|r| r.is_err()).count();
        results.push(BenchmarkResult::new(
            format!("Valuation batch ({}k)", n / 1000),
            n,
            timer.elapsed_ms(),
            failures,
        ));
    }

    results
}

fn run_implied_vol_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    let config = SolverConfig::default();

    for &n in &[10_000, 100_000] {
        info!(quotes = n, "running implied volatility benchmarks");
        let quotes: Vec<ImpliedVolQuote> = sample_contracts(n, 7)
            .into_iter()
            .map(|c| ImpliedVolQuote {
                contract_type: c.contract_type,
                underlying_price: c.params.underlying_price,
                strike_price: c.params.strike_price,
                time_to_expiry: c.params.time_to_expiry,
                risk_free_rate: c.params.risk_free_rate,
                dividend_yield: c.params.dividend_yield,
                observed_price: bs_analytic::premium(c.contract_type, &c.params)
                    .expect("Valid scenario"),
            })
            .collect();
        let mut timer = Timer::new();

        timer.start();
        let failures = quotes.iter().filter(|q| q.solve(&config).is_err()).count();
        results.push(BenchmarkResult::new(
            format!("Implied vol sequential ({}k)", n / 1000),
            n,
            timer.elapsed_ms(),
            failures,
        ));

        timer.start();
        let failures = implied_volatility_batch(&quotes, &config)
            .iter()
            .filter(|r| r.is_err())
            .count();
        results.push(BenchmarkResult::new(
            format!("Implied vol batch ({}k)", n / 1000),
            n,
            timer.elapsed_ms(),
            failures,
        ));
    }

    results
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> std::io::Result<()> {
    let mut file = File::create(filename)?;

    // Write system information as comments
    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU: {}", system_info.cpu_model)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# Rust Version: {}", system_info.rust_version)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;

    writeln!(file, "Benchmark,Contracts,Time_ms,Throughput_per_sec,Failures")?;
    for result in results {
        writeln!(
            file,
            "{},{},{:.2},{:.0},{}",
            result.name, result.contracts, result.time_ms, result.throughput_per_sec, result.failures
        )?;
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("fast-bsm Benchmark Suite");
    println!("========================\n");

    let system_info = SystemInfo::gather();

    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let mut all_results = run_analytic_benchmarks();
    all_results.extend(run_implied_vol_benchmarks());

    println!("\n{:=<80}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<80}", "");
    println!(
        "{:<36} {:>10} {:>12} {:>14} {:>6}",
        "Benchmark", "Contracts", "Time (ms)", "Per second", "Fail"
    );
    println!("{:-<80}", "");

    for result in &all_results {
        println!(
            "{:<36} {:>10} {:>12.2} {:>14.0} {:>6}",
            result.name, result.contracts, result.time_ms, result.throughput_per_sec, result.failures
        );
    }

    println!("{:=<80}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    match write_results_to_csv(&all_results, &system_info, &filename) {
        Ok(()) => println!("\nResults saved to: {}", filename),
        Err(e) => eprintln!("\nCould not write {}: {}", filename, e),
    }

    println!("\nTo reproduce these results:");
    println!("1. Use Rust version: {}", system_info.rust_version);
    println!("2. Set RUSTFLAGS: {}", system_info.rustc_flags);
    println!("3. Run: cargo run --bin benchmark --release");
    println!(
        "4. Ensure {} CPU threads available",
        system_info.rayon_threads
    );
}
