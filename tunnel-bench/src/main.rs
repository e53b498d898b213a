#![forbid(unsafe_code)]

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tunnel_bench_lib::config::{validate_config, NoiseConfig};
use tunnel_bench_lib::tunnel::PortAllocator;
use tunnel_bench_lib::{
    load_endpoints, load_from_path, telemetry, BenchReport, Benchmark, CandidateGenerator, Config,
    ConfiguredProvisioner, Endpoint, FamilyMode,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Tunnel endpoint latency and loss benchmark")]
struct Cli {
    /// Path to configuration TOML file; built-in defaults when omitted
    #[arg(short, long, value_name = "FILE", env = "TUNNEL_BENCH_CONFIG")]
    config: Option<PathBuf>,

    /// Candidate endpoints to generate per address family
    #[arg(
        short = 'n',
        long,
        default_value_t = 100,
        value_parser = clap::value_parser!(u32).range(1..=10000)
    )]
    count: u32,

    /// Scan every address of the candidate ranges (IPv6 is capped at 65536
    /// hosts per network); ignores --count
    #[arg(long, conflicts_with = "endpoints_file")]
    all: bool,

    /// Address families to scan; overrides the configuration file
    #[arg(short, long, value_enum)]
    family: Option<FamilyArg>,

    /// Route every tunnel through a UDP noise egress
    #[arg(long)]
    noise: bool,

    /// Number of best endpoints to print
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=1000))]
    top: Option<u32>,

    /// Read endpoints from a file (one `address:port` per line) instead of
    /// generating them
    #[arg(short, long, value_name = "FILE")]
    endpoints_file: Option<PathBuf>,

    /// Result CSV path; overrides the configuration file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FamilyArg {
    Ipv4,
    Ipv6,
    Both,
}

impl From<FamilyArg> for FamilyMode {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Ipv4 => FamilyMode::Ipv4,
            FamilyArg::Ipv6 => FamilyMode::Ipv6,
            FamilyArg::Both => FamilyMode::Both,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match resolve_config(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = telemetry::init_tracing(&cfg.logging) {
        eprintln!("failed to initialize logging: {err}");
        std::process::exit(1);
    }

    let endpoints = match candidate_endpoints(&cli, &cfg) {
        Ok(endpoints) => endpoints,
        Err(err) => {
            error!(%err, "failed to prepare endpoints");
            std::process::exit(1);
        }
    };
    info!(endpoints = endpoints.len(), family = ?cfg.scan.family, "endpoints prepared");

    let provisioner = match ConfiguredProvisioner::from_config(&cfg) {
        Ok(provisioner) => provisioner,
        Err(err) => {
            error!(%err, "no tunnel parameters available");
            std::process::exit(1);
        }
    };

    let bench = Benchmark::new(cfg);
    // The unfinished branch is dropped before exiting, which kills the engine.
    let outcome = tokio::select! {
        result = bench.run(&endpoints, &provisioner) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    let Some(result) = outcome else {
        warn!("interrupted, tunnel engine stopped");
        std::process::exit(130);
    };

    match result {
        Ok(report) => print_report(&report),
        Err(err) => {
            error!(%err, "benchmark failed");
            std::process::exit(1);
        }
    }
}

fn resolve_config(cli: &Cli) -> tunnel_bench_lib::Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => load_from_path(path)?,
        None => Config::default(),
    };
    if let Some(family) = cli.family {
        cfg.scan.family = family.into();
    }
    if let Some(top) = cli.top {
        cfg.scan.top_k = top as usize;
    }
    if let Some(output) = &cli.output {
        cfg.output.path = output.clone();
    }
    if cli.noise && cfg.noise.is_none() {
        cfg.noise = Some(NoiseConfig::default());
    }
    if cli.all && cfg.scan.batch_size.is_none() {
        let ports = PortAllocator::new(cfg.scan.base_port, cfg.scan.max_port).capacity();
        cfg.scan.batch_size = Some(ports);
    }
    validate_config(&cfg)?;
    Ok(cfg)
}

fn candidate_endpoints(cli: &Cli, cfg: &Config) -> tunnel_bench_lib::Result<Vec<Endpoint>> {
    if let Some(path) = &cli.endpoints_file {
        return load_endpoints(path);
    }
    let generator = CandidateGenerator::default();
    let count = if cli.all {
        generator.full_scan_count(cfg.scan.family)
    } else {
        cli.count as usize
    };
    let mut rng = rand::thread_rng();
    Ok(generator.generate(cfg.scan.family, count, &mut rng))
}

fn print_report(report: &BenchReport) {
    let top = report.ranking.top();
    if top.is_empty() {
        println!("No reachable endpoints ({} probed)", report.total);
        return;
    }
    println!("{:<48} {:>10} {:>14}", "Endpoint", "Loss rate", "Avg. Latency");
    for m in top {
        println!(
            "{:<48} {:>9.2}% {:>11} ms",
            m.endpoint.as_str(),
            m.loss_rate_percent,
            m.avg_latency_ms
        );
    }
    println!(
        "{} of {} endpoints unreachable",
        report.unreachable_count(),
        report.total
    );
    if !report.interrupted_batches.is_empty() {
        println!(
            "Tunnel engine exited early in batches {:?}; their unreachable counts are unreliable",
            report.interrupted_batches
        );
    }
}
