use serde::{Deserialize, Serialize};

use super::types::Template;

/// Request to create the first version of a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
}

impl CreateTemplateRequest {
    /// Converts the request into a version 1 template.
    pub fn into_template(self) -> Template {
        let template = Template::new(self.name, self.content);
        match self.description {
            Some(description) => template.with_description(description),
            None => template,
        }
    }
}

/// Request to update a stored template version.
///
/// Only the description and content of a version are mutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplateRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateTemplateRequest {
    /// Applies the request to an existing template.
    ///
    /// Fields that are `None` are left unchanged.
    pub fn apply_to(self, template: &Template) -> Template {
        Template {
            description: self.description.or_else(|| template.description.clone()),
            content: self.content.unwrap_or_else(|| template.content.clone()),
            ..template.clone()
        }
    }
}
