use clap::{Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

use artiflow_rust::commands::{self, InputSpec, ResolveInputsRequest, ResolveRequest};
use artiflow_rust::config::{AppConfig, POOL_VAR};
use artiflow_rust::errors::AppError;
use artiflow_rust::logging::init_logging;
use artiflow_rust::store::load_pool;

#[derive(Parser)]
#[command(name = "artiflow")]
#[command(about = "Resolve pipeline inputs over a pool of artifacts")]
#[command(version)]
struct Cli {
    /// Pool JSON file (default: $ARTIFLOW_POOL)
    #[arg(long, global = true, value_name = "FILE")]
    pool: Option<PathBuf>,

    /// Log filter (default: $ARTIFLOW_LOG or "info")
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the artifacts of an output, optionally through a resolver operator
    Resolve {
        #[arg(long)]
        producer: String,
        #[arg(long)]
        output_key: String,
        /// Artifact type name of the output
        #[arg(long = "type")]
        type_name: Option<String>,
        /// Operator name, e.g. latest_span or LatestSpan
        #[arg(long)]
        op: Option<String>,
        /// Operator parameters as a JSON object
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Resolve several step inputs at once and report missing required ones
    ResolveInputs {
        /// Step input as key=producer.output_key (repeatable)
        #[arg(long = "input", required = true)]
        inputs: Vec<InputSpec>,
        /// Input key that may resolve to nothing (repeatable)
        #[arg(long)]
        optional: Vec<String>,
        /// Operator applied to every input
        #[arg(long)]
        op: Option<String>,
        #[arg(long, default_value = "{}")]
        params: String,
        /// Resolve inputs one after another (default: $ARTIFLOW_PARALLEL)
        #[arg(long)]
        sequential: bool,
    },
    /// Summarize spans and versions per producer output
    Spans,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[artiflow] {e}");
            return ExitCode::from(2);
        }
    };
    init_logging(cli.log.as_deref().unwrap_or(&config.log_filter));

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("[artiflow] {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: &AppConfig) -> Result<(), AppError> {
    let path = cli.pool
                  .or_else(|| config.pool_path.clone())
                  .ok_or_else(|| AppError::Config(format!("no pool file: use --pool or {POOL_VAR}")))?;
    let pool = load_pool(&path)?;

    let output = match cli.command {
        Command::Resolve { producer,
                           output_key,
                           type_name,
                           op,
                           params, } => {
            let req = ResolveRequest { producer_id: producer,
                                       output_key,
                                       type_name,
                                       op,
                                       params: serde_json::from_str(&params)? };
            serde_json::to_string_pretty(&commands::resolve(&pool, &req)?)?
        }
        Command::ResolveInputs { inputs,
                                 optional,
                                 op,
                                 params,
                                 sequential, } => {
            let req = ResolveInputsRequest { inputs,
                                             optional: optional.into_iter().collect(),
                                             op,
                                             params: serde_json::from_str(&params)?,
                                             parallel: config.parallel && !sequential };
            serde_json::to_string_pretty(&commands::resolve_inputs(&pool, &req)?)?
        }
        Command::Spans => serde_json::to_string_pretty(&commands::span_summaries(&pool))?,
    };
    println!("{output}");
    Ok(())
}
