// ABOUTME: CLI for analyzing JSON/XML payloads and previewing them as cards.
// ABOUTME: Loads a URL, file or stdin, then prints analysis, validation or normalized items as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use cardscope_core::{
    analyze, build_role_choices, clean_mapping, mapping_from_json, mapping_quality,
    normalize_analysis, normalize_intent, normalize_items, validate_mapping, Analysis,
    NormalizeOptions, Path, ValidationOptions,
};
use cardscope_ingest::{
    decode_text, fetch, make_preview, parse_raw, summarize, FetchOptions, IngestError,
    DEFAULT_MAX_BYTES,
};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PREVIEW_CHARS: usize = 600;

/// Find the item list in a JSON/XML payload and map it to cards.
#[derive(Parser, Debug)]
#[command(name = "cardscope")]
#[command(about = "Analyze JSON/XML payloads and preview them as cards", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output compact JSON instead of pretty.
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,

    /// Log debug output to stderr (RUST_LOG also works).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Allow fetching from private/local networks.
    #[arg(long, global = true, default_value_t = false)]
    allow_private_networks: bool,

    /// Fetch timeout in seconds.
    #[arg(long, global = true, default_value_t = 8)]
    timeout: u64,

    /// Largest accepted input in bytes, for URLs, files and stdin.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_BYTES)]
    max_bytes: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect the main collection and suggest keys for each role.
    Analyze {
        /// URL (http/https), file path, or "-" for stdin.
        target: String,
    },
    /// Normalize items of the collection into cards.
    Preview {
        target: String,
        /// Role mapping as JSON, or @file to read it from a file.
        #[arg(long)]
        mapping: String,
        /// Maximum number of items.
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Only use mapped keys, no fallback names.
        #[arg(long, default_value_t = false)]
        strict: bool,
        /// Collection path as a JSON array, e.g. '["data", "items"]'.
        #[arg(long)]
        path: Option<String>,
    },
    /// Validate a role mapping against the detected collection.
    Validate {
        target: String,
        #[arg(long)]
        mapping: String,
        /// Comma-separated roles that must be mapped.
        #[arg(long, value_delimiter = ',')]
        require: Option<Vec<String>>,
    },
    /// List selectable keys per role for a mapping form.
    Choices {
        target: String,
        #[arg(long)]
        mapping: Option<String>,
        /// blog, portfolio, catalog, directory or custom.
        #[arg(long)]
        intent: Option<String>,
    },
}

impl Command {
    fn target(&self) -> &str {
        match self {
            Command::Analyze { target }
            | Command::Preview { target, .. }
            | Command::Validate { target, .. }
            | Command::Choices { target, .. } => target,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(args: &Args) -> Result<ExitCode> {
    let fetch_opts = FetchOptions::new()
        .timeout(Duration::from_secs(args.timeout))
        .max_bytes(args.max_bytes)
        .allow_private_networks(args.allow_private_networks);

    let target = args.command.target();
    let raw = load_text(target, &fetch_opts).await?;
    let (format, tree) = parse_raw(&raw)?;
    let analysis = analyze(&tree, Some(&raw));
    debug!(target, found = analysis.main_collection.found, "analyzed");

    let mut code = ExitCode::SUCCESS;
    let output = match &args.command {
        Command::Analyze { .. } => json!({
            "source": target,
            "summary": summarize(format, &tree),
            "preview": make_preview(&raw, PREVIEW_CHARS),
            "analysis": analysis,
        }),
        Command::Preview {
            mapping,
            limit,
            strict,
            path,
            ..
        } => {
            let mapping = clean_mapping(&load_mapping(mapping)?);
            let opts = NormalizeOptions::new().limit(*limit).strict(*strict);
            let (path, items) = match path {
                Some(text) => {
                    let path: Path = serde_json::from_str(text)
                        .context("--path must be a JSON array of keys and indices")?;
                    let items = normalize_items(&tree, &path, &mapping, &opts);
                    (Some(path), items)
                }
                None => (
                    analysis.main_collection.path.clone(),
                    normalize_analysis(&tree, &analysis, &mapping, &opts),
                ),
            };
            json!({
                "path": path,
                "count": items.len(),
                "items": items,
            })
        }
        Command::Validate {
            mapping, require, ..
        } => {
            let mut opts = ValidationOptions::new();
            if let Some(roles) = require {
                opts = opts.required_roles(roles.iter().map(|r| r.trim()).filter(|r| !r.is_empty()));
            }
            let result = validate_mapping(&load_mapping(mapping)?, Some(&analysis), &opts);
            if !result.ok {
                code = ExitCode::from(2);
            }
            let quality = mapping_quality(&result.cleaned);
            json!({
                "validation": result,
                "quality": quality,
            })
        }
        Command::Choices {
            mapping, intent, ..
        } => choices_output(&analysis, mapping.as_deref(), intent.as_deref())?,
    };

    print_json(&output, args.compact)?;
    Ok(code)
}

fn choices_output(analysis: &Analysis, mapping: Option<&str>, intent: Option<&str>) -> Result<Value> {
    let raw = match mapping {
        Some(text) => load_mapping(text)?,
        None => Map::new(),
    };
    let mapping = clean_mapping(&raw);
    let roles = build_role_choices(analysis, &mapping, None, intent);
    Ok(json!({
        "intent": normalize_intent(intent),
        "roles": roles,
    }))
}

fn print_json(value: &Value, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Mapping JSON given inline or as `@path`.
fn load_mapping(arg: &str) -> Result<Map<String, Value>> {
    let text = match arg.strip_prefix('@') {
        Some(file) => fs::read_to_string(file).with_context(|| format!("reading mapping file {}", file))?,
        None => arg.to_string(),
    };
    Ok(mapping_from_json(&text)?)
}

async fn load_text(target: &str, opts: &FetchOptions) -> Result<String> {
    if target.starts_with("http://") || target.starts_with("https://") {
        let result = fetch(target, opts).await?;
        debug!(url = target, summary = %result.summary(), "fetched");
        return Ok(result.text());
    }

    let bytes = if target == "-" {
        read_capped(io::stdin().lock(), target, opts.max_bytes)?
    } else {
        let path = PathBuf::from(target);
        if !path.exists() {
            return Err(anyhow!("file not found: {}", target));
        }
        let file = fs::File::open(&path).with_context(|| format!("opening {}", target))?;
        read_capped(file, target, opts.max_bytes)?
    };
    Ok(decode_text(&bytes, None))
}

/// Reads at most `max_bytes`, failing with `TooLarge` when there is more.
fn read_capped(reader: impl Read, target: &str, max_bytes: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .take((max_bytes as u64).saturating_add(1))
        .read_to_end(&mut buf)
        .with_context(|| format!("reading {}", target))?;
    if buf.len() > max_bytes {
        return Err(IngestError::too_large(target, max_bytes).into());
    }
    Ok(buf)
}
