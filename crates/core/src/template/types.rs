use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single version of a named template.
///
/// Templates sharing a `name` form a version chain ordered by `version`.
/// `(name, version)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// The template body.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub version: u32,
}

impl Template {
    /// Creates the first version of a template.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            content: content.into(),
            created_at: Utc::now(),
            version: 1,
        }
    }

    /// Sets the description for this template.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a specific ID for this template (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Sets the version number.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Sets the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Derives a new version from this one.
    ///
    /// Name, description and content are copied. The copy gets a fresh id,
    /// the current time and the given version number.
    pub fn derive_version(&self, version: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            created_at: Utc::now(),
            version,
        }
    }
}
