use crate::storage::DateRange;

use super::error::TemplateError;
use super::types::Template;

/// Maximum length of a template name, in characters.
pub const MAX_TEMPLATE_NAME_LEN: usize = 100;

/// Validates a template before creation or update.
pub fn validate_template(template: &Template) -> Result<(), TemplateError> {
    if template.name.trim().is_empty() {
        return Err(TemplateError::EmptyName);
    }
    if template.name.chars().count() > MAX_TEMPLATE_NAME_LEN {
        return Err(TemplateError::NameTooLong {
            max: MAX_TEMPLATE_NAME_LEN,
        });
    }
    Ok(())
}

/// Returns the version number the next template in a chain should get.
pub fn next_version_number(chain: &[Template]) -> u32 {
    chain.iter().map(|t| t.version).max().unwrap_or(0) + 1
}

/// Sorts a version chain by ascending version.
pub fn sort_version_chain(chain: &mut [Template]) {
    chain.sort_by(|a, b| {
        a.version
            .cmp(&b.version)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

/// Returns the highest version in a chain.
pub fn latest_version(chain: &[Template]) -> Option<&Template> {
    chain.iter().max_by_key(|t| t.version)
}

/// Filters templates whose creation date falls within an inclusive range.
pub fn filter_templates_by_date_range<'a>(
    templates: &'a [Template],
    range: &DateRange,
) -> Vec<&'a Template> {
    templates
        .iter()
        .filter(|t| range.contains(t.created_at.date_naive()))
        .collect()
}
