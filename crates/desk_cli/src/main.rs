use anyhow::Result;
use clap::{Parser, Subcommand};
use desk_cli::sources::{read_readings_csv, write_readings_csv};
use desk_cli::{
    compute_metrics, run_simulation, ConsoleActuator, CsvStepLogger, RunOptions, Scenario,
};
use desk_control::Controller;
use desk_core::{DeskConfig, LoggingConfig};
use desk_reasoning::ExplanationEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "desk", author, version, about = "Smart desk assistant simulator", long_about = None)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "desk.toml", env = "DESK_CONFIG", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the control loop over a scenario or a recorded CSV
    Simulate {
        /// Built-in scenario to generate
        #[arg(short, long, value_enum, default_value_t = Scenario::A, conflicts_with = "input")]
        scenario: Scenario,

        /// Replay readings from a CSV file instead of a scenario
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to write the per-step log
        #[arg(long, default_value = "logs/simulation_log.csv")]
        log_path: PathBuf,

        /// Also save the generated readings as CSV
        #[arg(long)]
        save_csv: Option<PathBuf>,

        /// Seed for the random scenario
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Skip decision and assistant lines
        #[arg(short, long)]
        quiet: bool,
    },
    /// Summarise a step log
    Metrics {
        #[arg(long, default_value = "logs/simulation_log.csv")]
        log_path: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// RUST_LOG wins over the configured level.
fn init_tracing(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cfg.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let (config, load_error) = match DeskConfig::load(&cli.config) {
        Ok(cfg) => (cfg, None),
        Err(e) => (DeskConfig::from_env(), Some(e)),
    };
    init_tracing(&config.logging);
    match load_error {
        None => tracing::info!("Loaded config from {}", cli.config.display()),
        Some(e) => tracing::info!("Config not loaded ({:#}), using defaults", e),
    }

    match cli.command {
        Commands::Simulate {
            scenario,
            input,
            log_path,
            save_csv,
            seed,
            quiet,
        } => {
            let readings = match &input {
                Some(path) => {
                    tracing::info!("Replaying readings from {}", path.display());
                    read_readings_csv(path)?
                }
                None => {
                    tracing::info!("Generating scenario {:?}", scenario);
                    scenario.generate(
                        config.sampling.duration_seconds,
                        config.sampling.period_seconds,
                        seed,
                    )
                }
            };
            if let Some(path) = &save_csv {
                write_readings_csv(path, &readings)?;
                tracing::info!("Saved {} readings to {}", readings.len(), path.display());
            }

            let controller = Controller::from_config(&config);
            let engine = Arc::new(ExplanationEngine::from_config(&config.llm));
            let mut actuator = ConsoleActuator::stdout();
            let mut logger = CsvStepLogger::create(&log_path)?;
            let opts = RunOptions {
                echo: !quiet,
                ..RunOptions::from_config(&config)
            };

            let summary =
                run_simulation(readings, &controller, engine, &mut actuator, &mut logger, &opts)
                    .await?;

            println!();
            println!("Simulation complete. Log saved to {}", log_path.display());
            println!("Steps: {}, decisions: {}", summary.steps, summary.decisions);
            println!(
                "Total energy used (Wh): {:.2}",
                summary.final_state.energy_used_wh
            );
        }
        Commands::Metrics { log_path, json } => {
            let metrics = compute_metrics(&log_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                println!("{metrics}");
            }
        }
    }

    Ok(())
}
