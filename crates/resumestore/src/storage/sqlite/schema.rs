//! SQLite schema definitions and SQL query constants.
//!
//! Pure data plus a few string builders for the child tables, which share
//! one row shape (`id`, `resume_id`, then kind-specific columns).

/// Name of the Unicode lowercase function registered on every connection.
pub const FOLD_CASE: &str = "fold_case";

/// SQL statement to create all tables.
///
/// Children reference their resume through a nullable `resume_id`; a NULL
/// owner marks a standalone child. Cascades are issued explicitly by the
/// repository inside one transaction.
pub const CREATE_TABLES: &str = r#"
-- Template versions table
CREATE TABLE IF NOT EXISTS templates (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    version INTEGER NOT NULL,
    UNIQUE (name, version)
);

-- Resume roots table
CREATE TABLE IF NOT EXISTS resumes (
    id TEXT PRIMARY KEY,
    personal_data_id TEXT NOT NULL
);

-- Personal data table
CREATE TABLE IF NOT EXISTS personal_data (
    id TEXT PRIMARY KEY,
    resume_id TEXT,
    full_name TEXT NOT NULL,
    address TEXT,
    bio TEXT,
    position TEXT,
    phone INTEGER,
    website TEXT,
    email TEXT
);

-- Educations table
CREATE TABLE IF NOT EXISTS educations (
    id TEXT PRIMARY KEY,
    resume_id TEXT,
    name TEXT NOT NULL,
    description TEXT,
    position TEXT,
    from_year TEXT NOT NULL,
    to_year TEXT NOT NULL
);

-- Experiences table
CREATE TABLE IF NOT EXISTS experiences (
    id TEXT PRIMARY KEY,
    resume_id TEXT,
    name TEXT NOT NULL,
    description TEXT,
    position TEXT,
    from_year TEXT NOT NULL,
    to_year TEXT NOT NULL
);

-- Social links table
CREATE TABLE IF NOT EXISTS social_links (
    id TEXT PRIMARY KEY,
    resume_id TEXT,
    name TEXT NOT NULL,
    link TEXT
);

-- Hobbies table
CREATE TABLE IF NOT EXISTS hobbies (
    id TEXT PRIMARY KEY,
    resume_id TEXT,
    hobby TEXT NOT NULL
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_templates_name ON templates(name);
CREATE INDEX IF NOT EXISTS idx_personal_data_resume_id ON personal_data(resume_id);
CREATE INDEX IF NOT EXISTS idx_educations_resume_id ON educations(resume_id);
CREATE INDEX IF NOT EXISTS idx_experiences_resume_id ON experiences(resume_id);
CREATE INDEX IF NOT EXISTS idx_social_links_resume_id ON social_links(resume_id);
CREATE INDEX IF NOT EXISTS idx_hobbies_resume_id ON hobbies(resume_id);
"#;

// Template queries
pub const INSERT_TEMPLATE: &str = r#"
INSERT INTO templates (id, name, description, content, created_at, version)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_TEMPLATE_BY_ID: &str = r#"
SELECT id, name, description, content, created_at, version
FROM templates
WHERE id = ?1
"#;

pub const SELECT_ALL_TEMPLATES: &str = r#"
SELECT id, name, description, content, created_at, version
FROM templates
ORDER BY rowid
"#;

pub const SELECT_TEMPLATES_PAGE: &str = r#"
SELECT id, name, description, content, created_at, version
FROM templates
ORDER BY rowid
LIMIT ?1 OFFSET ?2
"#;

pub const COUNT_TEMPLATES: &str = "SELECT COUNT(*) FROM templates";

pub const SELECT_TEMPLATES_BY_NAME: &str = r#"
SELECT id, name, description, content, created_at, version
FROM templates
WHERE name = ?1
"#;

pub const TEMPLATE_NAME_EXISTS: &str =
    "SELECT EXISTS(SELECT 1 FROM templates WHERE name = ?1)";

pub const UPDATE_TEMPLATE: &str = r#"
UPDATE templates
SET description = ?2, content = ?3
WHERE id = ?1
"#;

pub const DELETE_TEMPLATE: &str = "DELETE FROM templates WHERE id = ?1";

// Resume queries
pub const UPSERT_RESUME: &str = r#"
INSERT INTO resumes (id, personal_data_id)
VALUES (?1, ?2)
ON CONFLICT(id) DO UPDATE SET personal_data_id = excluded.personal_data_id
"#;

pub const SELECT_RESUME_BY_ID: &str = r#"
SELECT id, personal_data_id
FROM resumes
WHERE id = ?1
"#;

pub const SELECT_ALL_RESUMES: &str = r#"
SELECT id, personal_data_id
FROM resumes
ORDER BY rowid
"#;

pub const SELECT_RESUMES_BY_NAME: &str = r#"
SELECT r.id, r.personal_data_id
FROM resumes r
JOIN personal_data p ON p.id = r.personal_data_id
WHERE instr(fold_case(p.full_name), ?1) > 0
ORDER BY r.rowid
"#;

/// Matches the lowercase query against full name, bio and position.
const SEARCH_RESUMES_WHERE: &str = r#"
WHERE instr(fold_case(p.full_name), ?1) > 0
   OR instr(fold_case(coalesce(p.bio, '')), ?1) > 0
   OR instr(fold_case(coalesce(p.position, '')), ?1) > 0
"#;

pub fn search_resumes_page() -> String {
    format!(
        "SELECT r.id, r.personal_data_id FROM resumes r \
         JOIN personal_data p ON p.id = r.personal_data_id {SEARCH_RESUMES_WHERE} \
         ORDER BY r.rowid LIMIT ?2 OFFSET ?3"
    )
}

pub fn count_search_resumes() -> String {
    format!(
        "SELECT COUNT(*) FROM resumes r \
         JOIN personal_data p ON p.id = r.personal_data_id {SEARCH_RESUMES_WHERE}"
    )
}

pub const DELETE_RESUME: &str = "DELETE FROM resumes WHERE id = ?1";

// Child queries, built per table from its column list.
// `columns[0]` is always `id` and `columns[1]` is always `resume_id`.

pub fn select_child_by_id(table: &str, columns: &[&str]) -> String {
    format!("SELECT {} FROM {table} WHERE id = ?1", columns.join(", "))
}

pub fn select_all_children(table: &str, columns: &[&str]) -> String {
    format!("SELECT {} FROM {table} ORDER BY rowid", columns.join(", "))
}

pub fn select_children_by_owner(table: &str, columns: &[&str]) -> String {
    format!(
        "SELECT {} FROM {table} WHERE resume_id = ?1 ORDER BY rowid",
        columns.join(", ")
    )
}

pub fn select_children_by_name(table: &str, columns: &[&str], name_column: &str) -> String {
    format!(
        "SELECT {} FROM {table} WHERE instr(fold_case({name_column}), ?1) > 0 ORDER BY rowid",
        columns.join(", ")
    )
}

pub fn select_child_owner(table: &str) -> String {
    format!("SELECT resume_id FROM {table} WHERE id = ?1")
}

pub fn select_owned_child_ids(table: &str) -> String {
    format!("SELECT id FROM {table} WHERE resume_id = ?1")
}

pub fn insert_child(table: &str, columns: &[&str]) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(", "),
        placeholders(columns.len())
    )
}

/// Insert or overwrite by id. An existing row keeps its rowid, and so its
/// position in listings.
pub fn upsert_child(table: &str, columns: &[&str]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .skip(1)
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();
    format!(
        "{} ON CONFLICT(id) DO UPDATE SET {}",
        insert_child(table, columns),
        assignments.join(", ")
    )
}

/// Update every column except `id` and `resume_id`.
pub fn update_child(table: &str, columns: &[&str]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .skip(2)
        .map(|(i, c)| format!("{c} = ?{}", i + 1))
        .collect();
    format!(
        "UPDATE {table} SET {} WHERE id = ?1",
        assignments.join(", ")
    )
}

pub fn delete_child(table: &str) -> String {
    format!("DELETE FROM {table} WHERE id = ?1")
}

pub fn delete_children_by_owner(table: &str) -> String {
    format!("DELETE FROM {table} WHERE resume_id = ?1")
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
