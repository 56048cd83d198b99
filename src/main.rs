use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use multilang::config::MultiLangConfig;
use multilang::store::TextStore;
use multilang::transfer;

#[derive(Parser)]
#[command(name = "multilang", about = "Manage database-backed translations", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export texts from the database to per-scope YAML files
    Export {
        /// Directory to write {scope}.yml files into
        #[arg(long, default_value = "storage/multilang")]
        dir: std::path::PathBuf,

        /// Scopes to export (global, site, admin)
        #[arg(long = "scope", default_values = ["global"])]
        scopes: Vec<String>,

        /// Overwrite file values with database values on conflict
        #[arg(long)]
        force: bool,

        /// Ignore existing file content entirely
        #[arg(long)]
        clear: bool,
    },
    /// Import texts from per-scope YAML files into the database
    Import {
        /// Directory holding {scope}.yml files
        #[arg(long, default_value = "storage/multilang")]
        dir: std::path::PathBuf,

        /// Scopes to import (global, site, admin)
        #[arg(long = "scope", default_values = ["global"])]
        scopes: Vec<String>,

        /// Restrict the import to these locales
        #[arg(long = "lang")]
        langs: Vec<String>,

        /// Update rows that already exist in the database
        #[arg(long)]
        force: bool,

        /// Wipe each scope before importing
        #[arg(long)]
        clear: bool,
    },
    /// Print the resolved configuration, or one value by dotted path
    Config {
        /// Dotted path into the configuration, e.g. cache.lifetime_minutes
        path: Option<String>,
    },
}

fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("multilang=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = MultiLangConfig::from_env()?;

    match cli.command {
        Command::Export {
            dir,
            scopes,
            force,
            clear,
        } => {
            let store = TextStore::open(&config.db.connection, &config.db.texts_table)?;
            let scopes: Vec<&str> = scopes.iter().map(String::as_str).collect();
            transfer::export(&store, &dir, &scopes, force, clear)?;
            info!(dir = %dir.display(), "export finished");
        }
        Command::Import {
            dir,
            scopes,
            langs,
            force,
            clear,
        } => {
            let store = TextStore::open(&config.db.connection, &config.db.texts_table)?;
            let scopes: Vec<&str> = scopes.iter().map(String::as_str).collect();
            let langs: Vec<&str> = langs.iter().map(String::as_str).collect();
            let langs = if langs.is_empty() {
                None
            } else {
                Some(langs.as_slice())
            };
            let stats = transfer::import(&store, &dir, &scopes, langs, force, clear)?;
            info!(
                inserted = stats.inserted,
                updated = stats.updated,
                "import finished"
            );
        }
        Command::Config { path } => {
            let view = config.view();
            let value = view.get(path.as_deref(), Value::Null);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}
