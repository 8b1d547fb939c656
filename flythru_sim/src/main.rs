//! Flythru headless playback CLI
//!
//! Plays camera paths on a virtual clock and checks trajectory invariants.

use clap::Parser;
use flythru_core::PathLoader;
use flythru_sim::scenarios::ScenarioId;
use flythru_sim::{write_steps, Recording, ScenarioResult, ScenarioRunner, SimConfig, SimError, Takeover};
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Flythru headless playback CLI
#[derive(Parser, Debug)]
#[command(name = "flythru-sim")]
#[command(about = "Play camera paths headless and check trajectory invariants", long_about = None)]
struct Args {
    /// Waypoint description to play (file, or name inside the paths directory)
    #[arg(short, long, conflicts_with = "scenario")]
    path: Option<String>,

    /// Built-in scenario to run (straight_line, cubic_corner, fov_zoom, mixed_orders, takeover, showcase, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Nominal frames per second
    #[arg(long, default_value = "60")]
    fps: f64,

    /// Virtual seconds to play
    #[arg(short, long, default_value = "30")]
    duration: f64,

    /// Position samples spread over the path
    #[arg(long, default_value = "30000")]
    step_budget: usize,

    /// Frame length standard deviation, as a fraction of a frame
    #[arg(long, default_value = "0.1")]
    jitter: f64,

    /// Seed for frame pacing (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Start of a manual takeover, in virtual seconds
    #[arg(long, requires = "takeover_for")]
    takeover_at: Option<f64>,

    /// Length of the manual takeover in seconds
    #[arg(long, requires = "takeover_at")]
    takeover_for: Option<f64>,

    /// Export every frame to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Dump the dense step sequences to a JSON file
    #[arg(long)]
    dump_steps: Option<String>,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// What to play.
enum Target {
    Scenario(ScenarioId),
    File(String),
}

impl Target {
    fn name(&self) -> String {
        match self {
            Target::Scenario(id) => id.name().to_string(),
            Target::File(file) => file.clone(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.json { Level::WARN } else { level })
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    info!("Flythru playback simulator v{}", env!("CARGO_PKG_VERSION"));
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let targets: Vec<Target> = match &args.path {
        Some(file) => vec![Target::File(file.clone())],
        None if args.scenario == "all" => ScenarioId::all().into_iter().map(Target::Scenario).collect(),
        None => match args.scenario.parse() {
            Ok(id) => vec![Target::Scenario(id)],
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!(
                    "Available scenarios: straight_line, cubic_corner, fov_zoom, mixed_orders, takeover, showcase, all"
                );
                return ExitCode::FAILURE;
            }
        },
    };

    if (args.export.is_some() || args.dump_steps.is_some()) && targets.len() > 1 {
        eprintln!("Error: --export and --dump-steps only support a single scenario, not 'all'");
        return ExitCode::FAILURE;
    }

    // Determine seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    let takeover = match (args.takeover_at, args.takeover_for) {
        (Some(at_secs), Some(for_secs)) => Some(Takeover { at_secs, for_secs }),
        _ => None,
    };

    let runner = ScenarioRunner::new(SimConfig {
        seed,
        fps: args.fps,
        duration_secs: args.duration,
        jitter: args.jitter,
        step_budget: args.step_budget,
        takeover,
    });

    let recording = args.export.is_some() || args.dump_steps.is_some();
    let mut results: Vec<ScenarioResult> = Vec::new();

    for target in &targets {
        let outcome = if recording {
            record(&runner, target, &args)
        } else {
            play(&runner, target)
        };

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                error!("✗ {} FAILED: {}", target.name(), e);
                if !args.json {
                    return ExitCode::FAILURE;
                }
                continue;
            }
        };

        if !args.json {
            if result.passed {
                info!(
                    "✓ {} (seed={}) PASSED: {} frames, {} position updates, {} loops",
                    result.scenario,
                    result.seed,
                    result.total_frames,
                    result.metrics.position_updates,
                    result.metrics.loops
                );
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    result.scenario,
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
        results.push(result);
    }

    // Summary
    let total = targets.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = total - passed;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed,
            "results": results,
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        if failed == 0 {
            info!("✅ All {} runs passed!", total);
        } else {
            error!("❌ {}/{} runs failed!", failed, total);
        }
    }

    // Exit with proper code for CI
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn play(runner: &ScenarioRunner, target: &Target) -> Result<ScenarioResult, SimError> {
    match target {
        Target::Scenario(id) => Ok(runner.run(*id)),
        Target::File(file) => {
            let path = PathLoader::new().load(file)?;
            Ok(runner.run_path(file, &path, runner.config().takeover))
        }
    }
}

fn record(runner: &ScenarioRunner, target: &Target, args: &Args) -> Result<ScenarioResult, SimError> {
    let Recording {
        result,
        export,
        steps,
    } = match target {
        Target::Scenario(id) => runner.record(*id)?,
        Target::File(file) => {
            let path = PathLoader::new().load(file)?;
            runner.record_path(file, &path, runner.config().takeover)?
        }
    };

    if let Some(file) = &args.export {
        export.write_to_file(file)?;
        info!("Exported {} frames to {}", export.frames.len(), file);
    }
    if let Some(file) = &args.dump_steps {
        write_steps(&steps, file)?;
        info!(
            "Dumped {} position, {} look, {} fov steps to {}",
            steps.position.len(),
            steps.look.len(),
            steps.fov.len(),
            file
        );
    }

    Ok(result)
}
