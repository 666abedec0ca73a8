mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resumestore::config::{CacheBackend, StorageBackend};
use resumestore::{AppState, Config};
use resumestore_core::storage::ChildRetention;

use crate::commands::{ResumeCommand, TemplateCommand};

/// resumestore - Versioned templates and resume records
#[derive(Parser, Debug)]
#[command(name = "resumestore")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Storage backend (`memory` or `sqlite`)
    #[arg(long, global = true, env = "STORAGE_BACKEND")]
    storage: Option<StorageBackend>,

    /// Path to the SQLite database file
    #[arg(long, global = true, env = "SQLITE_PATH")]
    sqlite_path: Option<String>,

    /// Cache backend (`memory`, `redis` or `none`)
    #[arg(long, global = true, env = "CACHE_BACKEND")]
    cache: Option<CacheBackend>,

    /// What a resume update does with children it omits (`retain` or `replace`)
    #[arg(long, global = true, env = "CHILD_RETENTION")]
    retention: Option<ChildRetention>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage template versions
    Template(TemplateCommand),
    /// Manage resumes
    Resume(ResumeCommand),
}

impl Cli {
    /// Applies the flags on top of the environment configuration.
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(storage) = self.storage {
            config.storage_backend = storage;
        }
        if let Some(path) = &self.sqlite_path {
            config.sqlite_path = path.clone();
        }
        if let Some(cache) = self.cache {
            config.cache_backend = cache;
        }
        if let Some(retention) = self.retention {
            config.child_retention = retention;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "resumestore=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = cli.config();
    let state = AppState::new(&config).await?;

    match cli.command {
        Command::Template(cmd) => cmd.execute(&state).await,
        Command::Resume(cmd) => cmd.execute(&state).await,
    }
}
