//! quarry CLI: inspect catalogs and run searches against local documents.

use clap::{Parser, Subcommand};
use quarry_core::EngineConfig;
use quarry_exec::{Engine, MemoryBackend};
use quarry_planner::{parse_yaml_catalog, ParsedCatalog};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "quarry: typed search APIs and backend queries from record schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct CatalogArgs {
    /// Path to the catalog YAML file
    #[arg(short, long)]
    catalog: PathBuf,

    /// Prefix for every index name (overrides env and catalog config)
    #[arg(long)]
    index_prefix: Option<String>,

    /// Trace compiled query documents (needs the `tracing` feature)
    #[arg(long)]
    log_queries: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the generated API schema
    Schema {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Emit JSON instead of SDL
        #[arg(long)]
        json: bool,
    },

    /// Print index-creation bodies keyed by index name
    Mappings {
        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Compile query arguments into a backend search body
    Compile {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Dataset to query
        #[arg(short, long)]
        dataset: String,

        /// Arguments as JSON: {"filter": ..., "order": [...]}
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Run a search over documents loaded from a JSON or JSON-lines file
    Search {
        #[command(flatten)]
        catalog: CatalogArgs,

        #[arg(short, long)]
        dataset: String,

        /// JSON array or one JSON document per line
        #[arg(long)]
        docs: PathBuf,

        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Validate a catalog (parse, check names, generate the schema)
    Validate {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Schema { catalog, json } => print_schema(&catalog, json),
        Commands::Mappings { catalog } => print_mappings(&catalog),
        Commands::Compile {
            catalog,
            dataset,
            args,
        } => compile(&catalog, &dataset, &args),
        Commands::Search {
            catalog,
            dataset,
            docs,
            args,
        } => search(&catalog, &dataset, &docs, &args),
        Commands::Validate { catalog } => match validate(&catalog) {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("Validation failed: {}", e);
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn load(args: &CatalogArgs) -> CliResult<(ParsedCatalog, EngineConfig)> {
    let yaml = fs::read_to_string(&args.catalog)?;
    let parsed = parse_yaml_catalog(&yaml)?;
    let mut config = EngineConfig::from_env();
    parsed.config.apply(&mut config);
    apply_cli_overrides(&mut config, args);
    Ok((parsed, config))
}

fn apply_cli_overrides(config: &mut EngineConfig, args: &CatalogArgs) {
    if let Some(prefix) = &args.index_prefix {
        config.index_prefix = Some(prefix.clone()).filter(|p| !p.is_empty());
    }
    if args.log_queries {
        config.log_queries = true;
    }
}

fn engine(args: &CatalogArgs) -> CliResult<Engine<MemoryBackend>> {
    let (parsed, config) = load(args)?;
    Ok(Engine::new(config, parsed.catalog, MemoryBackend::new())?)
}

fn print_schema(args: &CatalogArgs, json: bool) -> CliResult<()> {
    let engine = engine(args)?;
    if json {
        println!("{}", serde_json::to_string_pretty(engine.api_schema())?);
    } else {
        print!("{}", engine.api_schema());
    }
    Ok(())
}

fn print_mappings(args: &CatalogArgs) -> CliResult<()> {
    let engine = engine(args)?;
    let bodies: serde_json::Map<String, Value> = engine
        .mappings()?
        .into_iter()
        .map(|(index, mapping)| (index, quarry_planner::index_body(mapping)))
        .collect();
    println!("{}", serde_json::to_string_pretty(&bodies)?);
    Ok(())
}

fn compile(args: &CatalogArgs, dataset: &str, query_args: &str) -> CliResult<()> {
    let engine = engine(args)?;
    let query_args: Value = serde_json::from_str(query_args)?;
    let request = engine.compile(dataset, &query_args)?;
    println!("{}", serde_json::to_string_pretty(&request.to_value())?);
    Ok(())
}

fn read_documents(path: &Path) -> CliResult<Vec<Value>> {
    let text = fs::read_to_string(path)?;
    if text.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(&text)?);
    }
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| -> CliResult<Value> { Ok(serde_json::from_str(line)?) })
        .collect()
}

fn search(args: &CatalogArgs, dataset: &str, docs: &Path, query_args: &str) -> CliResult<()> {
    let engine = engine(args)?;
    engine.create_indices()?;
    let index = engine.index_name(dataset)?;
    engine.backend().extend(&index, read_documents(docs)?)?;

    let query_args: Value = serde_json::from_str(query_args)?;
    let hits = engine.search(dataset, &query_args)?;
    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}

fn validate(args: &CatalogArgs) -> CliResult<()> {
    let engine = engine(args)?;
    println!(
        "✓ Catalog is valid ({} datasets, schema {}, quarry {})",
        engine.catalog().datasets.len(),
        engine.fingerprint().short(),
        quarry_core::VERSION
    );
    Ok(())
}
