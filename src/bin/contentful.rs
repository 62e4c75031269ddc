//! contentful: Search a Contentful space and print flattened entries
//!
//! Usage:
//!   # Search entries, credentials from flags or CONTENTFUL_TOKEN / CONTENTFUL_SPACE_ID
//!   contentful search --token TOKEN --space SPACE content_type=page
//!
//!   # Exactly one entry, using the preview API
//!   contentful search --preview --one content_type=page fields.title="Main page"
//!
//!   # Flatten a saved search response
//!   contentful flatten response.json
//!
//!   # Flatten a stream of responses, one per line
//!   cat responses.jsonl | contentful flatten --ndjson

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contentful_flatten::{
    flatten_json, Client, ClientConfig, CollisionPolicy, FlattenConfig, Flattener, ItemWriter,
    OutputFormat, SearchHooks, SearchParameters, SearchResponse, SpanEvent,
};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "contentful")]
#[command(about = "Search Contentful and flatten linked entries into plain JSON", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search entries and print the flattened result
    Search(SearchArgs),
    /// Flatten a saved search response
    Flatten(FlattenArgs),
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Contentful access token
    #[arg(long, env = "CONTENTFUL_TOKEN", hide_env_values = true)]
    token: String,

    /// Contentful space id
    #[arg(long = "space", env = "CONTENTFUL_SPACE_ID")]
    space_id: String,

    /// Whether to use the preview API or not
    #[arg(long)]
    preview: bool,

    /// Expect exactly one entry
    #[arg(long)]
    one: bool,

    /// Seconds to keep retrying when rate limited (default: fail at once)
    #[arg(long, value_name = "SECS")]
    retry_timeout: Option<u64>,

    /// Print span events to stderr
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Query as a list of key=value pairs
    #[arg(value_name = "KEY=VALUE", required = true)]
    query: Vec<String>,
}

#[derive(clap::Args, Debug)]
struct FlattenArgs {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Process newline-delimited JSON (one search response per line)
    #[arg(long)]
    ndjson: bool,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,

    /// Maximum nested link resolutions (default: 64)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Fail when a field uses an injected metadata key
    #[arg(long)]
    reject_collisions: bool,
}

/// Writes span events to stderr
struct StderrHooks;

impl SearchHooks for StderrHooks {
    fn record(&self, event: &SpanEvent) {
        let attributes: Vec<String> = event
            .attributes
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();

        eprintln!(
            "[{}] {} in {:?} {}",
            event.span.as_str(),
            event.status.as_str(),
            event.elapsed,
            attributes.join(" ")
        );
        if let Some(message) = &event.message {
            eprintln!("  {}", message);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Search(search) => run_search(search),
        Command::Flatten(flatten) => run_flatten(flatten),
    }
}

fn run_search(args: SearchArgs) -> Result<()> {
    let params = SearchParameters::from_pairs(&args.query)?;

    let mut config = ClientConfig::new(args.token, args.space_id, args.preview);
    config.retry_timeout = args.retry_timeout.map(Duration::from_secs);

    let mut client = Client::new(config).context("Failed to build client")?;
    if args.verbose {
        client = client.with_hooks(Arc::new(StderrHooks));
    }

    let result: Value = if args.one {
        client.get_one(params).context("Client returned an error")?
    } else {
        Value::Array(client.get_many(params).context("Client returned an error")?)
    };

    println!("{}", serde_json::to_string_pretty(&result).context("Could not encode result")?);
    Ok(())
}

fn run_flatten(args: FlattenArgs) -> Result<()> {
    let mut config = FlattenConfig::default();
    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }
    if args.reject_collisions {
        config.metadata_collision = CollisionPolicy::Reject;
    }

    let format = if args.compact {
        OutputFormat::Compact
    } else {
        OutputFormat::Pretty
    };

    let reader: Box<dyn BufRead> = if let Some(file_path) = &args.input {
        let file = File::open(file_path).with_context(|| format!("Failed to open {}", file_path))?;
        Box::new(BufReader::new(file))
    } else {
        Box::new(BufReader::new(std::io::stdin()))
    };

    if args.ndjson {
        let mut writer = ItemWriter::new(std::io::stdout(), OutputFormat::Lines);
        flatten_json(reader, &mut writer, config)?;
        return writer.flush();
    }

    let response = read_response(reader)?;
    let items = Flattener::new(config).flatten_many(response)?;
    if items.is_empty() {
        eprintln!("Warning: response contains no items");
    }

    let mut writer = ItemWriter::new(std::io::stdout(), format);
    writer.write_items(items)?;
    writer.flush()
}

/// Decode one search response using SIMD-accelerated parsing when possible
fn read_response(mut reader: Box<dyn BufRead>) -> Result<SearchResponse> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content).context("Failed to read input")?;

    // simd-json parses in place, so keep the original bytes for the fallback
    let mut scratch = content.clone();
    match simd_json::serde::from_slice::<SearchResponse>(&mut scratch) {
        Ok(response) => Ok(response),
        Err(_) => serde_json::from_slice(&content).context("Failed to parse search response"),
    }
}
