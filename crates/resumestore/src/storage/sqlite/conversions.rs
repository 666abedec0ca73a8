//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! Child tables go through [`SqliteChild`], which pairs each kind with its
//! table, column list and row mapping.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use uuid::Uuid;

use resumestore_core::resume::{
    ChildEntity, Education, Experience, Hobby, PersonalData, SocialLink,
};
use resumestore_core::template::Template;

// ============================================================================
// Template conversions
// ============================================================================

/// Convert a SQLite row to a Template.
///
/// Expected columns: id, name, description, content, created_at, version
pub fn row_to_template(row: &Row) -> rusqlite::Result<Template> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(4)?;

    Ok(Template {
        id: parse_uuid(&id)?,
        name: row.get(1)?,
        description: row.get(2)?,
        content: row.get(3)?,
        created_at: parse_datetime(&created_at)?,
        version: row.get(5)?,
    })
}

/// Convert a resume row to `(id, personal_data_id)`.
pub fn row_to_resume_ids(row: &Row) -> rusqlite::Result<(Uuid, Uuid)> {
    let id: String = row.get(0)?;
    let personal_data_id: String = row.get(1)?;
    Ok((parse_uuid(&id)?, parse_uuid(&personal_data_id)?))
}

// ============================================================================
// Child conversions
// ============================================================================

/// Table layout of a child kind.
///
/// `COLUMNS` starts with `id, resume_id`; `to_values` yields values in the
/// same order.
pub trait SqliteChild: ChildEntity {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const NAME_COLUMN: &'static str;

    fn from_row(row: &Row) -> rusqlite::Result<Self>;
    fn to_values(&self) -> Vec<Value>;
}

impl SqliteChild for PersonalData {
    const TABLE: &'static str = "personal_data";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "resume_id",
        "full_name",
        "address",
        "bio",
        "position",
        "phone",
        "website",
        "email",
    ];
    const NAME_COLUMN: &'static str = "full_name";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let (id, resume_id) = row_ids(row)?;
        Ok(Self {
            id,
            resume_id,
            full_name: row.get(2)?,
            address: row.get(3)?,
            bio: row.get(4)?,
            position: row.get(5)?,
            phone: row.get(6)?,
            website: row.get(7)?,
            email: row.get(8)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            owner_value(self.resume_id),
            Value::Text(self.full_name.clone()),
            text_value(&self.address),
            text_value(&self.bio),
            text_value(&self.position),
            self.phone.map_or(Value::Null, Value::Integer),
            text_value(&self.website),
            text_value(&self.email),
        ]
    }
}

impl SqliteChild for Education {
    const TABLE: &'static str = "educations";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "resume_id",
        "name",
        "description",
        "position",
        "from_year",
        "to_year",
    ];
    const NAME_COLUMN: &'static str = "name";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let (id, resume_id) = row_ids(row)?;
        Ok(Self {
            id,
            resume_id,
            name: row.get(2)?,
            description: row.get(3)?,
            position: row.get(4)?,
            from_year: row.get(5)?,
            to_year: row.get(6)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            owner_value(self.resume_id),
            Value::Text(self.name.clone()),
            text_value(&self.description),
            text_value(&self.position),
            Value::Text(self.from_year.clone()),
            Value::Text(self.to_year.clone()),
        ]
    }
}

impl SqliteChild for Experience {
    const TABLE: &'static str = "experiences";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "resume_id",
        "name",
        "description",
        "position",
        "from_year",
        "to_year",
    ];
    const NAME_COLUMN: &'static str = "name";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let (id, resume_id) = row_ids(row)?;
        Ok(Self {
            id,
            resume_id,
            name: row.get(2)?,
            description: row.get(3)?,
            position: row.get(4)?,
            from_year: row.get(5)?,
            to_year: row.get(6)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            owner_value(self.resume_id),
            Value::Text(self.name.clone()),
            text_value(&self.description),
            text_value(&self.position),
            Value::Text(self.from_year.clone()),
            Value::Text(self.to_year.clone()),
        ]
    }
}

impl SqliteChild for SocialLink {
    const TABLE: &'static str = "social_links";
    const COLUMNS: &'static [&'static str] = &["id", "resume_id", "name", "link"];
    const NAME_COLUMN: &'static str = "name";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let (id, resume_id) = row_ids(row)?;
        Ok(Self {
            id,
            resume_id,
            name: row.get(2)?,
            link: row.get(3)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            owner_value(self.resume_id),
            Value::Text(self.name.clone()),
            text_value(&self.link),
        ]
    }
}

impl SqliteChild for Hobby {
    const TABLE: &'static str = "hobbies";
    const COLUMNS: &'static [&'static str] = &["id", "resume_id", "hobby"];
    const NAME_COLUMN: &'static str = "hobby";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let (id, resume_id) = row_ids(row)?;
        Ok(Self {
            id,
            resume_id,
            hobby: row.get(2)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            owner_value(self.resume_id),
            Value::Text(self.hobby.clone()),
        ]
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Reads the shared `id, resume_id` prefix of a child row.
fn row_ids(row: &Row) -> rusqlite::Result<(Uuid, Option<Uuid>)> {
    let id: String = row.get(0)?;
    let resume_id: Option<String> = row.get(1)?;
    Ok((parse_uuid(&id)?, parse_optional_uuid(resume_id)?))
}

fn owner_value(resume_id: Option<Uuid>) -> Value {
    resume_id.map_or(Value::Null, |id| Value::Text(id.to_string()))
}

fn text_value(value: &Option<String>) -> Value {
    value.clone().map_or(Value::Null, Value::Text)
}

/// Parse a UUID from string.
pub fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub fn parse_optional_uuid(s: Option<String>) -> rusqlite::Result<Option<Uuid>> {
    s.as_deref().map(parse_uuid).transpose()
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Format a DateTime<Utc> for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_round_trip_is_lossless() {
        let now = Utc::now();
        assert_eq!(parse_datetime(&format_datetime(&now)).unwrap(), now);
    }

    #[test]
    fn test_parse_uuid_invalid() {
        assert!(parse_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_parse_optional_uuid() {
        assert_eq!(parse_optional_uuid(None).unwrap(), None);
        let id = Uuid::new_v4();
        assert_eq!(parse_optional_uuid(Some(id.to_string())).unwrap(), Some(id));
    }

    #[test]
    fn test_values_match_column_count() {
        let data = PersonalData::new("Jane Doe").with_email("jane@example.com");
        assert_eq!(data.to_values().len(), PersonalData::COLUMNS.len());
        assert_eq!(
            Education::new("MIT", "2010", "2014").to_values().len(),
            Education::COLUMNS.len()
        );
        assert_eq!(
            Experience::new("Acme", "2014", "2020").to_values().len(),
            Experience::COLUMNS.len()
        );
        assert_eq!(
            SocialLink::new("gh", "https://github.com").to_values().len(),
            SocialLink::COLUMNS.len()
        );
        assert_eq!(
            Hobby::new("chess").to_values().len(),
            Hobby::COLUMNS.len()
        );
    }

    #[test]
    fn test_standalone_child_has_null_owner() {
        let values = Hobby::new("chess").to_values();
        assert_eq!(values[1], Value::Null);
    }

    #[test]
    fn test_name_column_is_a_column() {
        assert!(PersonalData::COLUMNS.contains(&PersonalData::NAME_COLUMN));
        assert!(Education::COLUMNS.contains(&Education::NAME_COLUMN));
        assert!(Experience::COLUMNS.contains(&Experience::NAME_COLUMN));
        assert!(SocialLink::COLUMNS.contains(&SocialLink::NAME_COLUMN));
        assert!(Hobby::COLUMNS.contains(&Hobby::NAME_COLUMN));
    }
}
