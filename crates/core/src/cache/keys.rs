use uuid::Uuid;

use crate::EntityKind;

/// Returns the cache key for a single entity, `"{kind}:{id}"`.
pub fn entity_key(kind: EntityKind, id: Uuid) -> String {
    format!("{}:{}", kind, id)
}

/// Returns the cache key for the "all of kind" collection, `"{kind}:all"`.
pub fn collection_key(kind: EntityKind) -> String {
    format!("{}:all", kind)
}

/// Returns the pattern matching every key of a kind.
pub fn kind_pattern(kind: EntityKind) -> String {
    format!("{}:*", kind)
}

pub fn template_key(id: Uuid) -> String {
    entity_key(EntityKind::Template, id)
}

pub fn resume_key(id: Uuid) -> String {
    entity_key(EntityKind::Resume, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::pattern_matches;

    #[test]
    fn test_entity_key() {
        assert_eq!(
            entity_key(EntityKind::Education, Uuid::nil()),
            "education:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            resume_key(Uuid::nil()),
            "resume:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_collection_key() {
        assert_eq!(collection_key(EntityKind::Template), "template:all");
        assert_eq!(collection_key(EntityKind::PersonalData), "personal_data:all");
    }

    #[test]
    fn test_kind_pattern_covers_entities_and_collection() {
        let pattern = kind_pattern(EntityKind::Hobby);
        let id = Uuid::new_v4();

        assert!(pattern_matches(&pattern, &entity_key(EntityKind::Hobby, id)));
        assert!(pattern_matches(&pattern, &collection_key(EntityKind::Hobby)));
        assert!(!pattern_matches(&pattern, &template_key(id)));
    }
}
