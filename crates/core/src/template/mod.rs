mod error;
mod operations;
mod requests;
mod types;

pub use error::TemplateError;
pub use operations::{
    filter_templates_by_date_range, latest_version, next_version_number, sort_version_chain,
    validate_template, MAX_TEMPLATE_NAME_LEN,
};
pub use requests::{CreateTemplateRequest, UpdateTemplateRequest};
pub use types::Template;
