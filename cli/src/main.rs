use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use command_params_catalog::Catalog;
use command_params_core::{CommandId, CommandSet, Invocation, Value, render_usage};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "params-resolve")]
#[command(about = "Resolve command invocations against a command catalog")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a catalog and report what it declares.
    Check(CheckArgs),
    /// Print usage text for one command.
    Describe(DescribeArgs),
    /// Resolve one invocation.
    Resolve(ResolveArgs),
    /// Resolve a JSON array of invocations in parallel.
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Catalog file (.yaml, .yml or .json).
    #[arg(long)]
    catalog: PathBuf,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Catalog file (.yaml, .yml or .json).
    #[arg(long)]
    catalog: PathBuf,
    /// Command name as declared in the catalog.
    #[arg(long)]
    command: String,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Catalog file (.yaml, .yml or .json).
    #[arg(long)]
    catalog: PathBuf,
    /// Command name as declared in the catalog.
    #[arg(long)]
    command: String,
    /// Positional values as a JSON array.
    #[arg(long = "args")]
    arguments: Option<String>,
    /// Option values as a JSON object; keys may be names, flags or aliases.
    #[arg(long)]
    options: Option<String>,
    /// Output format for the resolved parameters.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Positional values as plain strings (alternative to --args).
    #[arg(last = true)]
    values: Vec<String>,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Catalog file (.yaml, .yml or .json).
    #[arg(long)]
    catalog: PathBuf,
    /// JSON file holding an array of {command, arguments, options}.
    #[arg(long)]
    input: PathBuf,
}

#[derive(Debug, Deserialize)]
struct BatchEntry {
    command: String,
    #[serde(flatten)]
    invocation: Invocation,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Describe(args) => run_describe(args),
        Command::Resolve(args) => run_resolve(args),
        Command::Batch(args) => run_batch(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "params_resolve=debug,command_params_core=debug"
    } else {
        "params_resolve=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_commands(path: &PathBuf) -> Result<CommandSet, String> {
    let catalog = Catalog::load(path)
        .map_err(|err| format!("Failed to load catalog '{}': {err}", path.display()))?;
    let commands = catalog
        .build()
        .map_err(|err| format!("Invalid catalog '{}': {err}", path.display()))?;
    info!(catalog = %path.display(), commands = commands.commands().count(), "Loaded catalog");
    Ok(commands)
}

fn find_command(commands: &CommandSet, name: &str) -> Result<CommandId, String> {
    commands.find(name).ok_or_else(|| {
        let known: Vec<&str> = commands
            .commands()
            .filter(|(_, command)| !command.is_abstract)
            .map(|(_, command)| command.name.as_str())
            .collect();
        format!("Unknown command '{name}' (known: {})", known.join(", "))
    })
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let commands = load_commands(&args.catalog)?;
    let total = commands.commands().count();
    let abstract_count = commands
        .commands()
        .filter(|(_, command)| command.is_abstract)
        .count();
    println!(
        "Catalog OK: {} command type(s) ({} abstract).",
        total, abstract_count
    );
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let commands = load_commands(&args.catalog)?;
    let id = find_command(&commands, &args.command)?;
    print!("{}", render_usage(&commands, id));
    Ok(())
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let commands = load_commands(&args.catalog)?;
    let id = find_command(&commands, &args.command)?;

    let arguments = match (&args.arguments, args.values.is_empty()) {
        (Some(_), false) => {
            return Err("Pass positional values either with --args or after --, not both".into());
        }
        (Some(raw), true) => parse_arguments(raw)?,
        (None, _) => args.values.iter().map(|v| Value::from(v.as_str())).collect(),
    };
    let options = match &args.options {
        Some(raw) => parse_options(raw)?,
        None => IndexMap::new(),
    };

    let invocation = Invocation {
        arguments,
        options: normalize_option_keys(&commands, id, options)?,
    };
    let params = commands
        .resolve(id, &invocation)
        .map_err(|err| err.to_string())?;

    let json = params.to_json();
    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&json)
            .map_err(|err| format!("Failed to serialize parameters: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&json)
            .map_err(|err| format!("Failed to serialize parameters: {err}"))?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<(), String> {
    let commands = load_commands(&args.catalog)?;
    let raw = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    let entries: Vec<BatchEntry> = serde_json::from_str(&raw)
        .map_err(|err| format!("Failed to parse '{}': {err}", args.input.display()))?;

    let results: Vec<serde_json::Value> = entries
        .into_par_iter()
        .map(|entry| resolve_entry(&commands, entry))
        .collect();

    let failures = results
        .iter()
        .filter(|result| result.get("error").is_some())
        .count();
    let rendered = serde_json::to_string_pretty(&results)
        .map_err(|err| format!("Failed to serialize results: {err}"))?;
    println!("{rendered}");

    if failures > 0 {
        return Err(format!(
            "{failures} of {} invocation(s) failed",
            results.len()
        ));
    }
    Ok(())
}

fn resolve_entry(commands: &CommandSet, entry: BatchEntry) -> serde_json::Value {
    let outcome = find_command(commands, &entry.command).and_then(|id| {
        let invocation = Invocation {
            options: normalize_option_keys(commands, id, entry.invocation.options)?,
            arguments: entry.invocation.arguments,
        };
        commands
            .resolve(id, &invocation)
            .map_err(|err| err.to_string())
    });
    match outcome {
        Ok(params) => serde_json::json!({ "command": entry.command, "params": params.to_json() }),
        Err(err) => {
            debug!(command = %entry.command, error = %err, "Batch entry failed");
            serde_json::json!({ "command": entry.command, "error": err })
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Vec<Value>, String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => Ok(items.into_iter().map(Value::from).collect()),
        Ok(_) => Err("--args must be a JSON array".to_string()),
        Err(err) => Err(format!("Invalid --args JSON: {err}")),
    }
}

fn parse_options(raw: &str) -> Result<IndexMap<String, Value>, String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(entries)) => Ok(entries
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect()),
        Ok(_) => Err("--options must be a JSON object".to_string()),
        Err(err) => Err(format!("Invalid --options JSON: {err}")),
    }
}

/// Maps flag names and aliases onto option names. Keys that match no option
/// are kept as-is so resolution reports them as unknown. Two keys naming the
/// same option are rejected.
fn normalize_option_keys(
    commands: &CommandSet,
    id: CommandId,
    options: IndexMap<String, Value>,
) -> Result<IndexMap<String, Value>, String> {
    let table = commands.effective_options(id);
    let mut normalized = IndexMap::with_capacity(options.len());
    let mut given_as: IndexMap<String, String> = IndexMap::new();
    for (key, value) in options {
        let name = table
            .values()
            .find(|spec| spec.matches(&key))
            .map_or_else(|| key.clone(), |spec| spec.name.clone());
        if let Some(previous) = given_as.get(&name) {
            debug!(option = %name, first = %previous, second = %key, "Option given twice");
            return Err(format!(
                "Option '{name}' given more than once (as '{previous}' and '{key}')"
            ));
        }
        given_as.insert(name.clone(), key);
        normalized.insert(name, value);
    }
    Ok(normalized)
}
