use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use resumestore::services::parse_id;
use resumestore::AppState;
use resumestore_core::resume::Resume;

use super::{print_json, PageArgs};

#[derive(Debug, Args)]
pub struct ResumeCommand {
    #[command(subcommand)]
    command: ResumeSubcommand,
}

#[derive(Debug, Subcommand)]
enum ResumeSubcommand {
    /// Create a resume from a JSON file (`-` reads stdin)
    Import { file: PathBuf },
    /// Replace a stored resume with the contents of a JSON file
    Update { id: String, file: PathBuf },
    /// Show one resume with all its children
    Get { id: String },
    /// Search full name, bio and position, ignoring case
    Search {
        query: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List resumes whose full name contains a fragment (all when omitted)
    Filter { name: Option<String> },
    /// Delete a resume and the children it owns
    Delete { id: String },
    /// Delete every resume and the children they own
    DeleteAll,
}

impl ResumeCommand {
    pub async fn execute(self, state: &AppState) -> Result<()> {
        let resumes = &state.resumes;

        match self.command {
            ResumeSubcommand::Import { file } => {
                let resume = read_resume(&file).await?;
                print_json(&resumes.create(resume).await?)
            }
            ResumeSubcommand::Update { id, file } => {
                let id = parse_id(&id)?;
                let resume = read_resume(&file).await?;
                print_json(&resumes.update(id, resume).await?)
            }
            ResumeSubcommand::Get { id } => print_json(&resumes.get(parse_id(&id)?).await?),
            ResumeSubcommand::Search { query, page } => {
                print_json(&resumes.search(&query, page.request()?).await?)
            }
            ResumeSubcommand::Filter { name } => {
                print_json(&resumes.load_by_name_filter(name.as_deref()).await?)
            }
            ResumeSubcommand::Delete { id } => {
                let id = parse_id(&id)?;
                resumes.delete(id).await?;
                print_json(&json!({ "deleted": id }))
            }
            ResumeSubcommand::DeleteAll => {
                let deleted = resumes.delete_all().await?;
                print_json(&json!({ "deleted": deleted }))
            }
        }
    }
}

async fn read_resume(path: &Path) -> Result<Resume> {
    let raw = if path == Path::new("-") {
        tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin())).await??
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("parsing resume from {}", path.display()))
}
