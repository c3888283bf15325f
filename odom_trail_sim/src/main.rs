//! Odometry Trail Simulator CLI
//!
//! Drives the trail display with simulated odometry and checks that the
//! trail never outgrows its configured capacity.

use clap::Parser;
use odom_trail_core::RecordingHost;
use odom_trail_sim::{
    RunConfig, RunSummary, ScenarioId, SimError, SimExport, TrailConfig, TrailRunner,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Odometry trail simulation CLI
#[derive(Parser, Debug)]
#[command(name = "odom-trail-sim")]
#[command(about = "Run deterministic odometry trail simulations", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (circle, figure_eight, idle, random_walk, dash, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Simulated duration in seconds
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Odometry rate in Hz
    #[arg(short, long, default_value = "30")]
    rate: u32,

    /// Position noise standard deviation (meters)
    #[arg(long, default_value = "0.005")]
    noise: f64,

    /// Probability of a corrupted odometry message
    #[arg(long, default_value = "0.0")]
    malformed_rate: f64,

    /// JSON configuration file (frames, display settings, schedule)
    #[arg(short, long)]
    config: Option<String>,

    /// Export captured frames to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Stream the run to a spawned Rerun viewer
    #[cfg(feature = "visualization")]
    #[arg(long)]
    rerun: bool,

    /// Save the run to a Rerun `.rrd` file
    #[cfg(feature = "visualization")]
    #[arg(long)]
    save: Option<String>,
}

async fn run_scenario(
    args: &Args,
    seed: u64,
    scenario: ScenarioId,
    export: Option<&mut SimExport>,
) -> Result<RunSummary, SimError> {
    let config = match &args.config {
        Some(path) => TrailConfig::load(path)?,
        None => TrailConfig::for_scenario(scenario),
    };
    let run = RunConfig {
        seed,
        scenario,
        rate_hz: args.rate,
        duration_secs: args.duration,
        noise_std: args.noise,
        malformed_rate: args.malformed_rate,
        ..Default::default()
    };
    let runner = TrailRunner::new(run, config);

    #[cfg(feature = "visualization")]
    {
        use odom_trail_core::visualization::RerunHost;

        let root = format!("world/{}", scenario.name());
        let viewer = if let Some(path) = &args.save {
            Some(RerunHost::save("odom_trail_sim", &root, path))
        } else if args.rerun {
            Some(RerunHost::spawn("odom_trail_sim", &root))
        } else {
            None
        };
        if let Some(viewer) = viewer {
            let mut host = viewer.map_err(|e| SimError::Viewer(e.to_string()))?;
            return runner.run(&mut host, export).await;
        }
    }

    let mut host = RecordingHost::new();
    runner.run(&mut host, export).await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Odometry Trail Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: circle, figure_eight, idle, random_walk, dash, all");
            std::process::exit(1);
        })]
    };

    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    if args.export.is_some() && scenarios.len() > 1 {
        eprintln!("Error: --export only supports a single scenario, not 'all'");
        std::process::exit(1);
    }

    let mut summaries: Vec<RunSummary> = Vec::new();
    let mut failed_count = 0;

    for scenario in &scenarios {
        let mut export = args
            .export
            .as_ref()
            .map(|_| SimExport::new(scenario.name(), seed));

        let summary = match run_scenario(&args, seed, *scenario, export.as_mut()).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("✗ {} (seed={}) ERROR: {}", scenario.name(), seed, e);
                failed_count += 1;
                continue;
            }
        };

        if let (Some(path), Some(mut export)) = (&args.export, export) {
            export.finalize(summary.clone());
            match export.write_to_file(path) {
                Ok(()) => info!("Exported {} frames to {}", export.frames.len(), path),
                Err(e) => {
                    error!("Failed to write export: {}", e);
                    failed_count += 1;
                }
            }
        }

        if !args.json {
            if summary.passed() {
                info!(
                    "✓ {} (seed={}) PASSED | accepted={} rejected={} dropped={} trail={}",
                    scenario.name(),
                    seed,
                    summary.accepted,
                    summary.rejected,
                    summary.dropped,
                    summary.final_len
                );
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {} capacity violations",
                    scenario.name(),
                    seed,
                    summary.capacity_violations
                );
            }
        }

        if !summary.passed() {
            failed_count += 1;
        }
        summaries.push(summary);
    }

    if args.json {
        let report = serde_json::json!({
            "total": scenarios.len(),
            "failed": failed_count,
            "results": summaries,
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to encode report: {}", e),
        }
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", scenarios.len());
        } else {
            error!("❌ {} scenario run(s) failed!", failed_count);
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
