use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recolor_contracts::config::{ColorizeConfig, TransportTimeouts, DEFAULT_ENDPOINT};
use recolor_contracts::events::EventWriter;
use recolor_contracts::models::{ModelRegistry, ModelSelector};
use recolor_engine::{Colorizer, DryrunTransport};

#[derive(Debug, Parser)]
#[command(name = "recolor", version, about = "Recolor images through a multimodal chat model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Colorize(ColorizeArgs),
    Models(ModelsArgs),
}

#[derive(Debug, Parser)]
struct ColorizeArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    prompt: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = recolor_contracts::config::DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout_secs: u64,
    /// Echo the input back instead of calling the endpoint.
    #[arg(long)]
    dryrun: bool,
}

#[derive(Debug, Parser)]
struct ModelsArgs {
    #[arg(long)]
    json: bool,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("recolor error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Colorize(args) => run_colorize(args),
        Command::Models(args) => run_models(args),
    }
}

fn run_colorize(args: ColorizeArgs) -> Result<i32> {
    let enabled = match non_empty_env("RECOLOR_ENABLED") {
        Some(raw) => parse_enabled(&raw)
            .with_context(|| format!("RECOLOR_ENABLED has unsupported value '{raw}'"))?,
        None => true,
    };
    if !enabled {
        println!("Recolor is disabled (RECOLOR_ENABLED); nothing to do.");
        return Ok(0);
    }

    let requested_model = args.model.clone().or_else(|| non_empty_env("RECOLOR_MODEL"));
    let selection = ModelSelector::new(None)
        .select(requested_model.as_deref())
        .map_err(anyhow::Error::msg)?;
    if let Some(note) = &selection.note {
        eprintln!("{note}");
    }

    let mut api_key = args
        .api_key
        .clone()
        .or_else(|| non_empty_env("OPENROUTER_API_KEY"))
        .unwrap_or_default();
    if args.dryrun && api_key.trim().is_empty() {
        api_key = "dryrun".to_string();
    }
    let config = ColorizeConfig::new(api_key)
        .with_model(selection.model)
        .with_prompt(args.prompt.clone().or_else(|| non_empty_env("RECOLOR_PROMPT")))
        .with_endpoint(
            args.endpoint
                .clone()
                .or_else(|| non_empty_env("RECOLOR_ENDPOINT"))
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        )
        .with_timeouts(TransportTimeouts::uniform(Duration::from_secs(
            args.timeout_secs,
        )))
        .with_enabled(enabled);

    let mut colorizer = if args.dryrun {
        Colorizer::new(Arc::new(DryrunTransport))
    } else {
        Colorizer::from_config(&config)?
    };
    if let Some(events_path) = &args.events {
        colorizer = colorizer.with_events(EventWriter::new(events_path));
    }

    let output = colorizer
        .colorize(&config, &args.input)
        .with_context(|| format!("colorize failed for {}", args.input.display()))?;
    println!("{}", output.path.display());
    Ok(0)
}

fn run_models(args: ModelsArgs) -> Result<i32> {
    let registry = ModelRegistry::default();
    if args.json {
        let models: Vec<_> = registry.list().collect();
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(0);
    }
    for (idx, model) in registry.list().enumerate() {
        let marker = if idx == 0 { " (default)" } else { "" };
        println!(
            "{}\t{}\t{}{marker}",
            model.name,
            model.provider,
            model.capabilities.join(",")
        );
    }
    Ok(0)
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_enabled(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
