mod resume;
mod template;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use resumestore_core::storage::PageRequest;

pub use resume::ResumeCommand;
pub use template::TemplateCommand;

/// Paging flags shared by listing commands.
#[derive(Debug, Clone, Copy, Args)]
pub struct PageArgs {
    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    page: u32,

    /// Items per page
    #[arg(long, default_value_t = 10)]
    size: u32,
}

impl PageArgs {
    fn request(self) -> Result<PageRequest> {
        Ok(PageRequest::new(self.page, self.size)?)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
