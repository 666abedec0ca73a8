use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of entities the store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Template,
    Resume,
    PersonalData,
    Education,
    Experience,
    SocialLink,
    Hobby,
}

impl EntityKind {
    /// Child kinds owned by a resume, in cascade order.
    ///
    /// Every save or delete of a resume touches exactly these kinds.
    pub const RESUME_CHILDREN: [EntityKind; 5] = [
        EntityKind::PersonalData,
        EntityKind::Education,
        EntityKind::Experience,
        EntityKind::SocialLink,
        EntityKind::Hobby,
    ];

    /// Returns the identifier used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Template => "template",
            EntityKind::Resume => "resume",
            EntityKind::PersonalData => "personal_data",
            EntityKind::Education => "education",
            EntityKind::Experience => "experience",
            EntityKind::SocialLink => "social_link",
            EntityKind::Hobby => "hobby",
        }
    }

    /// Returns the type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            EntityKind::Template => "Template",
            EntityKind::Resume => "Resume",
            EntityKind::PersonalData => "PersonalData",
            EntityKind::Education => "Education",
            EntityKind::Experience => "Experience",
            EntityKind::SocialLink => "SocialLink",
            EntityKind::Hobby => "Hobby",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_cache_identifier() {
        assert_eq!(EntityKind::SocialLink.to_string(), "social_link");
        assert_eq!(EntityKind::Template.to_string(), "template");
    }

    #[test]
    fn test_resume_children_excludes_roots() {
        assert!(!EntityKind::RESUME_CHILDREN.contains(&EntityKind::Resume));
        assert!(!EntityKind::RESUME_CHILDREN.contains(&EntityKind::Template));
        assert_eq!(EntityKind::RESUME_CHILDREN.len(), 5);
    }
}
