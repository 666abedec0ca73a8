use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde_json::json;

use resumestore::services::parse_id;
use resumestore::AppState;
use resumestore_core::storage::DateRange;
use resumestore_core::template::{CreateTemplateRequest, UpdateTemplateRequest};

use super::{print_json, PageArgs};

#[derive(Debug, Args)]
pub struct TemplateCommand {
    #[command(subcommand)]
    command: TemplateSubcommand,
}

#[derive(Debug, Subcommand)]
enum TemplateSubcommand {
    /// Create version 1 of a new template name
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Template body
        #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
        content: Option<String>,
        /// Read the template body from a file
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// Copy a stored version into the next version of its name
    NewVersion { id: String },
    /// List every version of a name, oldest first
    Versions { name: String },
    /// Show the highest version of a name
    Latest { name: String },
    /// List templates page by page
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// List templates created within an inclusive date range (YYYY-MM-DD)
    Between { from: NaiveDate, to: NaiveDate },
    /// Show one template version
    Get { id: String },
    /// Replace description and content of one version
    Update {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete one template version
    Delete { id: String },
}

impl TemplateCommand {
    pub async fn execute(self, state: &AppState) -> Result<()> {
        let templates = &state.templates;

        match self.command {
            TemplateSubcommand::Create {
                name,
                description,
                content,
                content_file,
            } => {
                let content = match (content, content_file) {
                    (Some(content), _) => content,
                    (None, Some(path)) => tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?,
                    (None, None) => anyhow::bail!("--content or --content-file is required"),
                };
                let template = templates
                    .create(CreateTemplateRequest {
                        name,
                        description,
                        content,
                    })
                    .await?;
                print_json(&template)
            }
            TemplateSubcommand::NewVersion { id } => {
                print_json(&templates.create_new_version(parse_id(&id)?).await?)
            }
            TemplateSubcommand::Versions { name } => {
                print_json(&templates.list_versions(&name).await?)
            }
            TemplateSubcommand::Latest { name } => {
                print_json(&templates.latest_version(&name).await?)
            }
            TemplateSubcommand::List { page } => {
                print_json(&templates.list_paged(page.request()?).await?)
            }
            TemplateSubcommand::Between { from, to } => {
                let range = DateRange::new(from, to)?;
                print_json(&templates.list_created_between(range).await?)
            }
            TemplateSubcommand::Get { id } => print_json(&templates.get(parse_id(&id)?).await?),
            TemplateSubcommand::Update {
                id,
                description,
                content,
            } => {
                let request = UpdateTemplateRequest {
                    description,
                    content,
                };
                print_json(&templates.update(parse_id(&id)?, request).await?)
            }
            TemplateSubcommand::Delete { id } => {
                let id = parse_id(&id)?;
                templates.delete(id).await?;
                print_json(&json!({ "deleted": id }))
            }
        }
    }
}
