mod error;
mod status;
mod traits;
mod types;

pub use error::{DateRangeError, PageRequestError, RepositoryError, Result};
pub use status::repository_error_to_status_code;
pub use traits::{ChildRepository, ResumeRepository, TemplateRepository};
pub use types::{ChildRetention, DateRange, Page, PageRequest, DEFAULT_PAGE_SIZE};
