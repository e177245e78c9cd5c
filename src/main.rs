// Office Environment Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/office-simulator
// ```
//
// Or with custom configuration:
//
// ```console
// $ ./target/release/office-simulator --config office.json --ticks 480 --tick-interval-ms 10 --verbose
// ```

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use office_environment_simulator::simulation::{
    ControlCommand, DriverSummary, EngineHandle, LoggingConfig, TickDriver,
};
use office_environment_simulator::types::config::CliArgs;
use office_environment_simulator::types::SimulationConfig;
use std::fs;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    if args.print_config {
        let json = SimulationConfig::default()
            .print_json()
            .context("Failed to serialize default configuration")?;
        println!("{}", json);
        return Ok(());
    }

    let _logging = LoggingConfig::from_flags(args.verbose, args.debug, args.log_json, args.log_dir.as_deref())
        .init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting Office Environment Simulator");

    let dry_run = args.dry_run;
    let config = SimulationConfig::from_cli_args(args).context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    info!("Configuration loaded and validated successfully");

    if dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - simulation will not be executed.");
        print_configuration_summary(&config);
        return Ok(());
    }

    print_startup_banner(&config);

    let handle = EngineHandle::from_config(config.clone()).context("Failed to initialize simulation")?;

    if let Some(path) = &config.command_script {
        apply_command_script(&handle, path)?;
    }

    let summary = run_driver(&handle, &config).await?;
    eprintln!(
        "Driver stopped after {} ticks ({} failed)",
        summary.ticks, summary.failed_ticks
    );

    eprintln!("\n{}", handle.statistics().generate_summary_output());

    if let Some(path) = &config.state_output {
        handle
            .read(|engine| engine.write_state_report(path))
            .with_context(|| format!("Failed to write state output to '{}'", path))?;
        eprintln!("State written to: {}", path);
    }

    info!("Office Environment Simulator completed successfully");
    Ok(())
}

/// Apply a JSON-lines command script before the first tick
fn apply_command_script(handle: &EngineHandle, path: &str) -> Result<()> {
    let script = fs::read_to_string(path)
        .with_context(|| format!("Failed to read command script '{}'", path))?;
    let commands = ControlCommand::parse_script(&script)
        .with_context(|| format!("Failed to parse command script '{}'", path))?;

    let total = commands.len();
    let mut failed = 0;
    for command in commands {
        let name = command.name();
        let outcome = handle.apply(command);
        if !outcome.success {
            failed += 1;
            warn!("Script command {} failed: {}", name, outcome.message);
        }
    }

    eprintln!("Applied command script: {} commands, {} failed", total, failed);
    Ok(())
}

/// Run the tick driver until it reaches `max_ticks` or the process is interrupted
async fn run_driver(handle: &EngineHandle, config: &SimulationConfig) -> Result<DriverSummary> {
    let interrupted = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupted, stopping tick driver"),
            Err(e) => {
                warn!("Cannot listen for Ctrl-C ({}); running until max_ticks", e);
                std::future::pending::<()>().await;
            }
        }
    };

    TickDriver::from_config(handle.clone(), config)
        .start()
        .stop_on(interrupted)
        .await
        .context("Tick driver failed")
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &SimulationConfig) {
    eprintln!("Office Environment Simulator");
    eprintln!("============================");
    eprintln!("A time-varying office world for control agents");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &SimulationConfig) {
    eprintln!("Configuration:");
    eprintln!("  Rooms: {}", config.rooms.len());
    eprintln!(
        "  Tick: {} ms real, {} simulated minutes (x{} speed)",
        config.tick_interval_ms, config.minutes_per_tick, config.time_speed
    );
    eprintln!("  Failure Rate: {:.2}% per hour", config.failure_probability * 100.0);
    eprintln!("  Occupancy Model: {}", config.occupancy_model);
    eprintln!("  Printer Consumption: {}", config.printer_consumption);
    eprintln!("  Light Control: {}", config.light_control);
    eprintln!("  Automatic Alerts: {}", if config.auto_alerts { "on" } else { "off" });
    if let Some(start) = config.start_time {
        eprintln!("  Start Time: {}", start);
    }
    if let Some(seed) = config.seed {
        eprintln!("  Random Seed: {}", seed);
    }
    match config.max_ticks {
        Some(ticks) => eprintln!("  Ticks: {}", ticks),
        None => eprintln!("  Ticks: until interrupted"),
    }
    eprintln!();
}
