//! Entrygate - telemetry entry admission and redaction
//!
//! The `entrygate` binary reads entries as JSON lines, scrubs sensitive
//! fields, and writes only the entries worth retaining:
//! - `filter`: run the pipeline over a stream of entries
//! - `explain`: print the admission decision for every entry
//! - `check`: resolve and validate configuration
//! - `defaults`: print the built-in configuration

use clap::{Args, Parser, Subcommand};
use eg_config::{ConfigFile, Settings};
use eg_core::exit_codes::ExitCode;
use eg_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use eg_core::{JsonlSink, JsonlSource, Outcome, Pipeline, PipelineError, PipelineStats, Sink};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

/// Entrygate - decide which telemetry entries to keep, and hide secrets in them
#[derive(Parser)]
#[command(name = "entrygate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Deployment environment (local, testing, staging, production, ...)
    #[arg(long = "env", short = 'e', global = true)]
    environment: Option<String>,

    /// Path to entrygate.json
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Minimum log level written to stderr
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Redact and filter JSONL entries, writing retained entries to stdout
    Filter(FilterArgs),

    /// Print the admission decision for each JSONL entry
    Explain(InputArgs),

    /// Resolve and validate configuration
    Check,

    /// Print the built-in configuration file
    Defaults,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input file (default: stdin, `-` for stdin)
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Fail on the first malformed line instead of skipping it
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Print run statistics as JSON to stderr
    #[arg(long)]
    stats: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Filter(args) => run_filter(&cli.global, args),
        Commands::Explain(args) => run_explain(&cli.global, args),
        Commands::Check => run_check(&cli.global),
        Commands::Defaults => run_defaults(),
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn load_settings(global: &GlobalOpts) -> Result<Settings, ExitCode> {
    Settings::load(global.config.as_deref(), global.environment.as_deref()).map_err(|e| {
        tracing::error!(code = e.code(), error = %e, "configuration rejected");
        eprintln!("entrygate: configuration error: {}", e);
        ExitCode::ConfigError
    })
}

fn open_input(args: &InputArgs) -> Result<Box<dyn BufRead>, ExitCode> {
    match &args.input {
        Some(path) if path.as_os_str() != "-" => match File::open(path) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) => {
                eprintln!("entrygate: cannot open {}: {}", path.display(), e);
                Err(ExitCode::IoError)
            }
        },
        _ => Ok(Box::new(std::io::stdin().lock())),
    }
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>, ExitCode> {
    match path {
        Some(path) => match File::create(path) {
            Ok(file) => Ok(Box::new(BufWriter::new(file))),
            Err(e) => {
                eprintln!("entrygate: cannot create {}: {}", path.display(), e);
                Err(ExitCode::IoError)
            }
        },
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}

fn pipeline_failure(err: PipelineError) -> ExitCode {
    tracing::error!(error = %err, "pipeline failed");
    eprintln!("entrygate: {}", err);
    ExitCode::IoError
}

/// Handle a malformed input record. Returns an exit code when the run
/// must stop.
fn malformed_input(err: PipelineError, strict: bool, stats: &mut PipelineStats) -> Option<ExitCode> {
    if !err.is_recoverable() {
        return Some(pipeline_failure(err));
    }
    stats.record_malformed();
    if strict {
        eprintln!("entrygate: {}", err);
        return Some(ExitCode::InputError);
    }
    tracing::warn!(error = %err, "skipping malformed entry");
    None
}

fn run_filter(global: &GlobalOpts, args: &FilterArgs) -> ExitCode {
    let settings = match load_settings(global) {
        Ok(settings) => settings,
        Err(code) => return code,
    };
    let pipeline = Pipeline::from_settings(&settings);

    let reader = match open_input(&args.input) {
        Ok(reader) => reader,
        Err(code) => return code,
    };
    let writer = match open_output(args.output.as_ref()) {
        Ok(writer) => writer,
        Err(code) => return code,
    };
    let mut sink = JsonlSink::new(writer);
    let mut stats = PipelineStats::default();

    for item in JsonlSource::new(reader) {
        match item {
            Ok(entry) => {
                if let Err(e) = pipeline.feed(entry, &mut sink, &mut stats) {
                    return pipeline_failure(e);
                }
            }
            Err(e) => {
                if let Some(code) = malformed_input(e, args.input.strict, &mut stats) {
                    return code;
                }
            }
        }
    }
    if let Err(e) = sink.flush() {
        return pipeline_failure(e);
    }

    tracing::info!(
        environment = %pipeline.environment(),
        seen = stats.seen,
        kept = stats.kept,
        dropped = stats.dropped,
        masked_fields = stats.masked_fields,
        malformed = stats.malformed,
        "filter finished"
    );
    if args.stats {
        match serde_json::to_string(&stats) {
            Ok(line) => eprintln!("{}", line),
            Err(e) => return pipeline_failure(e.into()),
        }
    }

    if stats.malformed > 0 {
        ExitCode::PartialInput
    } else {
        ExitCode::Clean
    }
}

fn run_explain(global: &GlobalOpts, args: &InputArgs) -> ExitCode {
    let settings = match load_settings(global) {
        Ok(settings) => settings,
        Err(code) => return code,
    };
    let pipeline = Pipeline::from_settings(&settings);

    let reader = match open_input(args) {
        Ok(reader) => reader,
        Err(code) => return code,
    };
    let mut out = match open_output(None) {
        Ok(out) => out,
        Err(code) => return code,
    };
    let mut stats = PipelineStats::default();

    for item in JsonlSource::new(reader) {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                if let Some(code) = malformed_input(e, args.strict, &mut stats) {
                    return code;
                }
                continue;
            }
        };
        let line = match pipeline.evaluate(entry) {
            Outcome::Kept {
                entry,
                reason,
                masked,
            } => serde_json::json!({
                "uuid": entry.uuid,
                "type": entry.entry_type,
                "decision": "keep",
                "reason": reason,
                "masked": masked,
            }),
            Outcome::Dropped {
                uuid,
                entry_type,
                reason,
            } => serde_json::json!({
                "uuid": uuid,
                "type": entry_type,
                "decision": "drop",
                "reason": reason,
            }),
        };
        if let Err(e) = writeln!(out, "{}", line) {
            return pipeline_failure(e.into());
        }
    }
    if let Err(e) = out.flush() {
        return pipeline_failure(e.into());
    }

    if stats.malformed > 0 {
        ExitCode::PartialInput
    } else {
        ExitCode::Clean
    }
}

fn run_check(global: &GlobalOpts) -> ExitCode {
    let settings = match load_settings(global) {
        Ok(settings) => settings,
        Err(code) => return code,
    };
    let report = serde_json::json!({
        "status": "ok",
        "schema_version": eg_config::CONFIG_SCHEMA_VERSION,
        "settings": settings,
    });
    match serde_json::to_string_pretty(&report) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(e) => {
            eprintln!("entrygate: {}", e);
            ExitCode::InternalError
        }
    }
}

fn run_defaults() -> ExitCode {
    match serde_json::to_string_pretty(&ConfigFile::defaults()) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(e) => {
            eprintln!("entrygate: {}", e);
            ExitCode::InternalError
        }
    }
}
