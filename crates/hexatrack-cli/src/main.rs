// crates/hexatrack-cli/src/main.rs
// ============================================================================
// Module: Hexatrack CLI Entry Point
// Description: Command dispatcher for pipeline stages and the test publisher.
// Purpose: Run one latency pipeline stage per process until interrupted.
// Dependencies: clap, hexatrack-adapters, hexatrack-config, hexatrack-core, tokio
// ============================================================================

//! ## Overview
//! The `hexatrack` binary runs one stage of the track latency pipeline
//! (`extrapolate`, `delay`, or `finalize`), the simulated track publisher,
//! or configuration helpers. Stage commands run until Ctrl-C, then stop
//! every pipeline and exit 0. Failures exit 1 with the error on stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub(crate) mod logging;
pub(crate) mod publisher;
pub(crate) mod stages;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use hexatrack_adapters::Adapter;
use hexatrack_adapters::RadioOutgoingAdapter;
use hexatrack_config::Channel;
use hexatrack_config::HexatrackConfig;
use hexatrack_config::LogFormat;
use hexatrack_config::config_toml_example;
use hexatrack_core::SystemClock;
use hexatrack_core::TrackData;
use hexatrack_transport::SocketType;
use thiserror::Error;

use crate::logging::LOG_ENV_VAR;
use crate::logging::init_tracing;
use crate::logging::resolve_directive;
use crate::publisher::CONNECT_SETTLE;
use crate::publisher::DEFAULT_INTERVAL_MS;
use crate::publisher::DEFAULT_TRACK_ID;
use crate::publisher::PublishOptions;
use crate::publisher::publish;
use crate::stages::Stage;
use crate::stages::build_delay;
use crate::stages::build_extrapolate;
use crate::stages::build_finalize;
use crate::stages::run_stage;
use crate::stages::udp_sockets;

// ============================================================================
// SECTION: CLI Definitions
// ============================================================================

/// Hexatrack command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "hexatrack",
    version,
    about = "Hexagonal track latency pipeline",
    disable_help_subcommand = true
)]
struct Cli {
    /// Options shared by every command.
    #[command(flatten)]
    global: GlobalArgs,
    /// Selected command.
    #[command(subcommand)]
    command: Commands,
}

/// Options accepted before or after any subcommand.
#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Configuration file path.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Log filter directive, overriding `RUST_LOG` and the configured level.
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
    /// Log output format, overriding the configured format.
    #[arg(long, value_enum, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormatArg>,
}

/// Log format selection.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormatArg {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Stage A: extrapolate TrackData reports to the output rate.
    Extrapolate,
    /// Stage B: stamp first-hop delay on extrapolated tracks.
    Delay,
    /// Stage C: compute second-hop delay and final records.
    Finalize(FinalizeArgs),
    /// Publish simulated TrackData reports.
    Publish(PublishArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Stage C options.
#[derive(Args, Debug)]
struct FinalizeArgs {
    /// Mirror final records as JSON lines to a file, or `-` for stdout.
    #[arg(long, value_name = "PATH")]
    jsonl: Option<PathBuf>,
}

/// Publisher options.
#[derive(Args, Debug)]
struct PublishArgs {
    /// Reports to send; 0 publishes until Ctrl-C.
    #[arg(long, default_value_t = 100)]
    count: u64,
    /// Milliseconds between reports.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval_ms: u64,
    /// Simulated track identifier.
    #[arg(long, default_value_t = DEFAULT_TRACK_ID, value_parser = clap::value_parser!(i32).range(1 ..= 9999))]
    track_id: i32,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration and print the resolved channels.
    Check,
    /// Print an example configuration.
    Example,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Config {
            command,
        } => run_config(command, cli.global.config.as_deref()),
        Commands::Extrapolate => {
            let config = prepare(&cli.global)?;
            let sockets = udp_sockets(config.network.receive_buffer);
            let stage = build_extrapolate(&config, &sockets)?;
            serve(&stage, &config).await
        }
        Commands::Delay => {
            let config = prepare(&cli.global)?;
            let sockets = udp_sockets(config.network.receive_buffer);
            let stage = build_delay(&config, &sockets)?;
            serve(&stage, &config).await
        }
        Commands::Finalize(args) => {
            let config = prepare(&cli.global)?;
            let sink = open_jsonl(args.jsonl.as_deref())?;
            let sockets = udp_sockets(config.network.receive_buffer);
            let stage = build_finalize(&config, &sockets, sink)?;
            serve(&stage, &config).await
        }
        Commands::Publish(args) => {
            let config = prepare(&cli.global)?;
            run_publish(&args, &config).await
        }
    }
}

/// Loads configuration and installs the log subscriber.
fn prepare(global: &GlobalArgs) -> CliResult<HexatrackConfig> {
    let config = load_config(global.config.as_deref())?;
    let env_filter = std::env::var(LOG_ENV_VAR).ok();
    let directive = resolve_directive(global.log_level.as_deref(), env_filter.as_deref(), &config.logging.level);
    let format = global.log_format.map_or(config.logging.format, LogFormat::from);
    init_tracing(directive, format).map_err(CliError::new)?;
    tracing::info!(environment = config.environment.as_str(), "configuration loaded");
    Ok(config)
}

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<HexatrackConfig> {
    HexatrackConfig::load(path).map_err(|err| CliError::new(err.to_string()))
}

/// Runs a stage until Ctrl-C.
async fn serve(stage: &Stage, config: &HexatrackConfig) -> CliResult<ExitCode> {
    run_stage(stage, config.network.linger(), shutdown_signal()).await?;
    Ok(ExitCode::SUCCESS)
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
    }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches `config` subcommands.
fn run_config(command: ConfigCommand, path: Option<&Path>) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Example => {
            write_stdout_line(config_toml_example().trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        ConfigCommand::Check => {
            let config = load_config(path)?;
            for line in describe_config(&config)? {
                write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders the validated configuration summary.
fn describe_config(config: &HexatrackConfig) -> CliResult<Vec<String>> {
    let mut lines = vec![format!("config ok (environment: {})", config.environment.as_str())];
    for channel in Channel::ALL {
        let resolved = config.channel(channel).map_err(|err| CliError::new(err.to_string()))?;
        lines.push(format!("{}: {} group={}", channel.as_str(), resolved.endpoint, resolved.group));
    }
    Ok(lines)
}

// ============================================================================
// SECTION: Stage Helpers
// ============================================================================

/// Opens the JSON-lines mirror, `-` meaning stdout.
fn open_jsonl(path: Option<&Path>) -> CliResult<Option<Box<dyn Write + Send>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if path == Path::new("-") {
        return Ok(Some(Box::new(std::io::stdout())));
    }
    let file = File::create(path)
        .map_err(|err| CliError::new(format!("failed to open {}: {err}", path.display())))?;
    Ok(Some(Box::new(BufWriter::new(file))))
}

/// Runs the simulated publisher.
async fn run_publish(args: &PublishArgs, config: &HexatrackConfig) -> CliResult<ExitCode> {
    let channel = config.channel(Channel::TrackData).map_err(|err| CliError::new(err.to_string()))?;
    let target = format!("{} group {}", channel.endpoint, channel.group);
    let sockets = udp_sockets(config.network.receive_buffer);
    let radio = RadioOutgoingAdapter::<TrackData>::new(sockets(SocketType::Radio), channel.endpoint, channel.group);
    radio.start().await.map_err(|err| CliError::new(format!("failed to start publisher: {err}")))?;
    write_stdout_line(&format!("publishing TrackData to {target}"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    tokio::time::sleep(CONNECT_SETTLE).await;

    let options = PublishOptions {
        count: args.count,
        interval: Duration::from_millis(args.interval_ms),
        track_id: args.track_id,
    };
    let summary = publish(&radio, &SystemClock, options, shutdown_signal(), |count, elapsed| {
        let _ = write_stdout_line(&format!("sent {count} messages ({elapsed:.1}s)"));
    })
    .await;
    radio.stop().await;

    write_stdout_line(&format!(
        "published {} messages in {:.2}s ({:.1} Hz), {} failed",
        summary.sent,
        summary.elapsed.as_secs_f64(),
        summary.rate_hz(),
        summary.failed
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
