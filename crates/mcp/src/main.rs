use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use globe_mcp::tools::resolution;
use globe_mcp::{McpServer, ServerConfig};
use globe_mcp_core::{database_fingerprint, LocationBuilder, LocationDatabase};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "globe-mcp")]
#[command(version)]
#[command(about = "MCP server that drives a 3D globe renderer over stdio")]
struct Cli {
    #[arg(short, long, global = true, help = "JSON config file")]
    config: Option<PathBuf>,
    #[arg(short, long, global = true, help = "Binary location database")]
    database: Option<PathBuf>,
    #[arg(long, global = true, env = "GLOBE_MCP_LOG", help = "trace, debug, info, warn or error")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve requests line by line on stdin/stdout (default)
    Serve,
    /// Build a binary location database from JSON or YAML sources
    BuildDb {
        #[arg(help = "Source files or directories")]
        sources: Vec<PathBuf>,
        #[arg(short, long, help = "Output database path")]
        output: PathBuf,
        #[arg(long, help = "Include the built-in location table")]
        builtin: bool,
    },
    /// Show a database header, fingerprint and most populous entries
    Inspect {
        #[arg(help = "Database path")]
        path: PathBuf,
        #[arg(short, long, default_value_t = 10, help = "Entries to list")]
        top: usize,
    },
    /// Resolve a place name against the configured index
    Resolve {
        name: String,
    },
}

fn load_config(cli: &Cli) -> Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(database) = &cli.database {
        config.database = Some(database.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

/// Logs go to stderr; stdout carries protocol traffic only.
fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("globe_mcp={level},globe_mcp_core={level}"))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .try_init()
        .context("failed to initialize tracing subscriber")
}

fn serve(config: ServerConfig) -> Result<()> {
    let mut server = McpServer::from_config(config)?;
    info!(locations = server.index().len(), "serving on stdio");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        if let Some(resp) = server.handle_request(&line) {
            writeln!(stdout, "{}", resp)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn build_db(sources: &[PathBuf], output: &Path, builtin: bool) -> Result<()> {
    let mut builder = if builtin {
        LocationBuilder::with_builtin()
    } else {
        LocationBuilder::new()
    };
    let added = builder.add_source_paths(sources)?;
    let bytes = builder.build_database()?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let db = LocationDatabase::from_bytes(&bytes)?;
    info!(added, records = db.len(), "database built");
    println!(
        "Wrote {} locations to {} ({})",
        db.len(),
        output.display(),
        database_fingerprint(&db)
    );
    Ok(())
}

fn inspect(path: &Path, top: usize) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let db = LocationDatabase::from_bytes(&bytes)
        .with_context(|| format!("invalid database {}", path.display()))?;
    let header = db.header();

    println!("version:     {}", header.version);
    println!("records:     {}", header.record_count);
    if let Some(created) = header.created_at() {
        println!("created:     {}", created.to_rfc3339());
    }
    if let Some(modified) = header.modified_at() {
        println!("modified:    {}", modified.to_rfc3339());
    }
    println!("fingerprint: {}", database_fingerprint(&db));

    for record in db.records().take(top) {
        println!(
            "  {:<32} {:>11.4} {:>10.4} {:>12}",
            record.name(),
            record.longitude(),
            record.latitude(),
            record.population()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.log_level)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config),
        Commands::BuildDb {
            sources,
            output,
            builtin,
        } => build_db(&sources, &output, builtin),
        Commands::Inspect { path, top } => inspect(&path, top),
        Commands::Resolve { name } => {
            let index = config.open_index()?;
            println!("{}", resolution(&index, &name, config.fuzzy_max_distance));
            Ok(())
        }
    }
}
