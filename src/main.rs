use anyhow::Context;
use clap::Parser;

use litegraph::{Engine, OpenFlags};

/// litegraph - run Cypher queries against a SQLite-backed property graph
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the graph database file (created if missing)
    database: String,

    /// Cypher query to execute
    #[arg(short, long)]
    query: String,

    /// JSON object with query parameters, e.g. '{"name": "Alice"}'
    #[arg(short, long)]
    params: Option<String>,

    /// Open the database read-only
    #[arg(long)]
    read_only: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let flags = if cli.read_only {
        OpenFlags::READ_ONLY
    } else {
        OpenFlags::read_write_create()
    };
    let engine = Engine::open(&cli.database, flags)
        .with_context(|| format!("cannot open database {}", cli.database))?;

    let result = match &cli.params {
        Some(params) => engine.exec_with_params(&cli.query, params),
        None => engine.exec(&cli.query),
    };

    match result {
        Ok(result) => {
            if let Some(summary) = litegraph::engine::format_stats(&result.stats) {
                println!("{}", summary);
            }
            if !result.columns.is_empty() {
                println!("{}", result.columns.join("\t"));
                for row in result.text_rows() {
                    println!("{}", row.join("\t"));
                }
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Query failed: {}", err);
            std::process::exit(1);
        }
    }
}
