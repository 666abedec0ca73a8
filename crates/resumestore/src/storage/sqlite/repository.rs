//! SQLite repository implementation.
//!
//! Implements the repository traits from `resumestore_core::storage` using SQLite.
//! Every resume write runs in a single transaction, so a cascade either
//! lands completely or not at all.

use std::collections::HashSet;

use async_trait::async_trait;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params_from_iter, OptionalExtension};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use resumestore_core::resume::{
    Education, Experience, Hobby, PersonalData, Resume, SocialLink,
};
use resumestore_core::storage::{
    ChildRepository, ChildRetention, Page, PageRequest, RepositoryError, Result,
    ResumeRepository, TemplateRepository,
};
use resumestore_core::template::Template;

use super::conversions::{
    format_datetime, parse_uuid, row_to_resume_ids, row_to_template, SqliteChild,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for templates, resumes and
/// every child kind.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    ///
    /// Also registers `fold_case`, the Unicode lowercase used by name and
    /// search queries. SQLite's own `lower()` only folds ASCII.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            register_fold_case(conn).map_err(wrap_err)?;
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

// ============================================================================
// Synchronous helpers, run inside `Connection::call`
// ============================================================================

fn register_fold_case(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        schema::FOLD_CASE,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )
}

fn load_child<T: SqliteChild>(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<T>> {
    let mut stmt = conn.prepare_cached(&schema::select_child_by_id(T::TABLE, T::COLUMNS))?;
    stmt.query_row([id], T::from_row).optional()
}

fn load_owned<T: SqliteChild>(conn: &rusqlite::Connection, owner: &str) -> rusqlite::Result<Vec<T>> {
    let mut stmt =
        conn.prepare_cached(&schema::select_children_by_owner(T::TABLE, T::COLUMNS))?;
    let rows = stmt.query_map([owner], T::from_row)?;
    rows.collect()
}

fn compose_resume(
    conn: &rusqlite::Connection,
    id: Uuid,
    personal_data_id: Uuid,
) -> rusqlite::Result<Resume> {
    let owner = id.to_string();
    let personal_data = load_child::<PersonalData>(conn, &personal_data_id.to_string())?
        .ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("resume {id} references missing personal data {personal_data_id}"),
                )),
            )
        })?;

    Ok(Resume {
        id,
        personal_data,
        educations: load_owned(conn, &owner)?,
        experiences: load_owned(conn, &owner)?,
        social_links: load_owned(conn, &owner)?,
        hobbies: load_owned(conn, &owner)?,
    })
}

fn query_resumes<P: rusqlite::Params>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: P,
) -> rusqlite::Result<Vec<Resume>> {
    let rows: Vec<(Uuid, Uuid)> = {
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, row_to_resume_ids)?;
        rows.collect::<rusqlite::Result<_>>()?
    };
    rows.into_iter()
        .map(|(id, personal_data_id)| compose_resume(conn, id, personal_data_id))
        .collect()
}

/// Returns a conflict if an incoming child is owned by a different resume.
fn foreign_claim<T: SqliteChild>(
    conn: &rusqlite::Connection,
    resume_id: Uuid,
    incoming: &[T],
) -> rusqlite::Result<Option<RepositoryError>> {
    let mut stmt = conn.prepare_cached(&schema::select_child_owner(T::TABLE))?;
    for child in incoming {
        let owner: Option<Option<String>> = stmt
            .query_row([child.id().to_string()], |row| row.get(0))
            .optional()?;
        if let Some(Some(owner)) = owner {
            if parse_uuid(&owner)? != resume_id {
                return Ok(Some(RepositoryError::AlreadyExists {
                    entity_type: T::KIND.type_name(),
                    id: child.id().to_string(),
                }));
            }
        }
    }
    Ok(None)
}

fn first_foreign_claim(
    conn: &rusqlite::Connection,
    resume: &Resume,
) -> rusqlite::Result<Option<RepositoryError>> {
    let id = resume.id;
    if let Some(c) = foreign_claim(conn, id, std::slice::from_ref(&resume.personal_data))? {
        return Ok(Some(c));
    }
    if let Some(c) = foreign_claim(conn, id, &resume.educations)? {
        return Ok(Some(c));
    }
    if let Some(c) = foreign_claim(conn, id, &resume.experiences)? {
        return Ok(Some(c));
    }
    if let Some(c) = foreign_claim(conn, id, &resume.social_links)? {
        return Ok(Some(c));
    }
    foreign_claim(conn, id, &resume.hobbies)
}

fn upsert_owned<T: SqliteChild>(
    conn: &rusqlite::Connection,
    resume_id: Uuid,
    incoming: &[T],
    retention: ChildRetention,
) -> rusqlite::Result<()> {
    if retention == ChildRetention::Replace {
        let keep: HashSet<Uuid> = incoming.iter().map(|c| c.id()).collect();
        let owned: Vec<String> = {
            let mut stmt = conn.prepare_cached(&schema::select_owned_child_ids(T::TABLE))?;
            let rows = stmt.query_map([resume_id.to_string()], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };
        let mut delete = conn.prepare_cached(&schema::delete_child(T::TABLE))?;
        for id in owned {
            if !keep.contains(&parse_uuid(&id)?) {
                delete.execute([&id])?;
            }
        }
    }

    let mut upsert = conn.prepare_cached(&schema::upsert_child(T::TABLE, T::COLUMNS))?;
    for child in incoming {
        let mut child = child.clone();
        child.set_resume_id(Some(resume_id));
        upsert.execute(params_from_iter(child.to_values()))?;
    }
    Ok(())
}

fn cascade_save(
    conn: &rusqlite::Connection,
    resume: &Resume,
    retention: ChildRetention,
) -> rusqlite::Result<()> {
    let id = resume.id.to_string();
    let personal_data_id = resume.personal_data.id.to_string();

    // Personal data is 1:1, so a new record replaces the old one.
    let previous: Option<String> = conn
        .prepare_cached(schema::SELECT_RESUME_BY_ID)?
        .query_row([&id], |row| row.get(1))
        .optional()?;
    if let Some(previous) = previous.filter(|p| *p != personal_data_id) {
        conn.execute(&schema::delete_child(PersonalData::TABLE), [&previous])?;
    }

    upsert_owned(
        conn,
        resume.id,
        std::slice::from_ref(&resume.personal_data),
        ChildRetention::Retain,
    )?;
    upsert_owned(conn, resume.id, &resume.educations, retention)?;
    upsert_owned(conn, resume.id, &resume.experiences, retention)?;
    upsert_owned(conn, resume.id, &resume.social_links, retention)?;
    upsert_owned(conn, resume.id, &resume.hobbies, retention)?;

    conn.execute(schema::UPSERT_RESUME, [&id, &personal_data_id])?;
    Ok(())
}

fn delete_owned<T: SqliteChild>(conn: &rusqlite::Connection, owner: &str) -> rusqlite::Result<()> {
    conn.execute(&schema::delete_children_by_owner(T::TABLE), [owner])?;
    Ok(())
}

fn cascade_delete(
    conn: &rusqlite::Connection,
    id: Uuid,
    personal_data_id: Uuid,
) -> rusqlite::Result<()> {
    let owner = id.to_string();
    conn.execute(
        &schema::delete_child(PersonalData::TABLE),
        [personal_data_id.to_string()],
    )?;
    delete_owned::<PersonalData>(conn, &owner)?;
    delete_owned::<Education>(conn, &owner)?;
    delete_owned::<Experience>(conn, &owner)?;
    delete_owned::<SocialLink>(conn, &owner)?;
    delete_owned::<Hobby>(conn, &owner)?;
    conn.execute(schema::DELETE_RESUME, [&owner])?;
    Ok(())
}

// ============================================================================
// TemplateRepository implementation
// ============================================================================

#[async_trait]
impl TemplateRepository for SqliteRepository {
    async fn get_template(&self, id: Uuid) -> Result<Option<Template>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare_cached(schema::SELECT_TEMPLATE_BY_ID)
                    .map_err(wrap_err)?;
                stmt.query_row([&id_str], row_to_template)
                    .optional()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Template", id.to_string()))
    }

    async fn list_templates(&self) -> Result<Vec<Template>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn
                    .prepare_cached(schema::SELECT_ALL_TEMPLATES)
                    .map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_template).map_err(wrap_err)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Template"))
    }

    async fn list_templates_page(&self, page: PageRequest) -> Result<Page<Template>> {
        let limit = i64::from(page.size);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        self.conn
            .call(move |conn| {
                let total: i64 = conn
                    .query_row(schema::COUNT_TEMPLATES, [], |row| row.get(0))
                    .map_err(wrap_err)?;
                let mut stmt = conn
                    .prepare_cached(schema::SELECT_TEMPLATES_PAGE)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([limit, offset], row_to_template)
                    .map_err(wrap_err)?;
                let items = rows
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(wrap_err)?;
                Ok(Page::new(items, page, total as u64))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Template"))
    }

    async fn get_templates_by_name(&self, name: &str) -> Result<Vec<Template>> {
        let name = name.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare_cached(schema::SELECT_TEMPLATES_BY_NAME)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([&name], row_to_template)
                    .map_err(wrap_err)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Template"))
    }

    async fn template_name_exists(&self, name: &str) -> Result<bool> {
        let name = name.to_string();

        self.conn
            .call(move |conn| {
                conn.query_row(schema::TEMPLATE_NAME_EXISTS, [&name], |row| row.get(0))
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Template"))
    }

    async fn create_template(&self, template: &Template) -> Result<()> {
        let id = template.id.to_string();
        let name = template.name.clone();
        let description = template.description.clone();
        let content = template.content.clone();
        let created_at = format_datetime(&template.created_at);
        let version = template.version;
        let slot = format!("{} v{}", template.name, template.version);

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_TEMPLATE,
                    rusqlite::params![id, name, description, content, created_at, version],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Template", slot))
    }

    async fn update_template(&self, template: &Template) -> Result<()> {
        let id = template.id.to_string();
        let description = template.description.clone();
        let content = template.content.clone();
        let template_id = template.id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_TEMPLATE,
                        rusqlite::params![id, description, content],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Template", template_id))
    }

    async fn delete_template(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_TEMPLATE, [&id_str])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Template", id.to_string()))
    }
}

// ============================================================================
// ResumeRepository implementation
// ============================================================================

#[async_trait]
impl ResumeRepository for SqliteRepository {
    async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let row = conn
                    .query_row(schema::SELECT_RESUME_BY_ID, [&id_str], row_to_resume_ids)
                    .optional()
                    .map_err(wrap_err)?;
                row.map(|(id, personal_data_id)| compose_resume(conn, id, personal_data_id))
                    .transpose()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Resume", id.to_string()))
    }

    async fn list_resumes(&self) -> Result<Vec<Resume>> {
        self.conn
            .call(|conn| query_resumes(conn, schema::SELECT_ALL_RESUMES, []).map_err(wrap_err))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Resume"))
    }

    async fn find_resumes_by_name(&self, fragment: &str) -> Result<Vec<Resume>> {
        let fragment = fragment.to_string();

        self.conn
            .call(move |conn| {
                query_resumes(conn, schema::SELECT_RESUMES_BY_NAME, [&fragment]).map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Resume"))
    }

    async fn search_resumes(&self, query: &str, page: PageRequest) -> Result<Page<Resume>> {
        let query = query.to_string();
        let limit = i64::from(page.size);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        self.conn
            .call(move |conn| {
                let total: i64 = conn
                    .query_row(&schema::count_search_resumes(), [&query], |row| row.get(0))
                    .map_err(wrap_err)?;
                let items = query_resumes(
                    conn,
                    &schema::search_resumes_page(),
                    rusqlite::params![query, limit, offset],
                )
                .map_err(wrap_err)?;
                Ok(Page::new(items, page, total as u64))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Resume"))
    }

    async fn save_resume(&self, resume: &Resume, retention: ChildRetention) -> Result<()> {
        let resume = resume.clone();
        let resume_id = resume.id.to_string();

        let outcome = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                if let Some(conflict) = first_foreign_claim(&tx, &resume).map_err(wrap_err)? {
                    // Dropping the transaction rolls it back.
                    return Ok(Err(conflict));
                }
                cascade_save(&tx, &resume, retention).map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(Ok(()))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Resume", resume_id))?;

        outcome
    }

    async fn delete_resume(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let (id, personal_data_id) = tx
                    .query_row(schema::SELECT_RESUME_BY_ID, [&id_str], row_to_resume_ids)
                    .map_err(wrap_err)?;
                cascade_delete(&tx, id, personal_data_id).map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Resume", id.to_string()))
    }

    async fn delete_all_resumes(&self) -> Result<u64> {
        self.conn
            .call(|conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let rows: Vec<(Uuid, Uuid)> = {
                    let mut stmt = tx
                        .prepare_cached(schema::SELECT_ALL_RESUMES)
                        .map_err(wrap_err)?;
                    let rows = stmt.query_map([], row_to_resume_ids).map_err(wrap_err)?;
                    rows.collect::<rusqlite::Result<_>>().map_err(wrap_err)?
                };
                for (id, personal_data_id) in &rows {
                    cascade_delete(&tx, *id, *personal_data_id).map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)?;
                Ok(rows.len() as u64)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Resume"))
    }
}

// ============================================================================
// ChildRepository implementations
// ============================================================================

impl SqliteRepository {
    async fn child_get<T: SqliteChild>(&self, id: Uuid) -> Result<Option<T>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| load_child::<T>(conn, &id_str).map_err(wrap_err))
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, T::KIND.type_name(), id.to_string()))
    }

    async fn child_list<T: SqliteChild>(&self) -> Result<Vec<T>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn
                    .prepare_cached(&schema::select_all_children(T::TABLE, T::COLUMNS))
                    .map_err(wrap_err)?;
                let rows = stmt.query_map([], T::from_row).map_err(wrap_err)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, T::KIND.type_name()))
    }

    async fn child_find_by_name<T: SqliteChild>(&self, fragment: &str) -> Result<Vec<T>> {
        let fragment = fragment.to_string();

        self.conn
            .call(move |conn| {
                let sql = schema::select_children_by_name(T::TABLE, T::COLUMNS, T::NAME_COLUMN);
                let mut stmt = conn.prepare_cached(&sql).map_err(wrap_err)?;
                let rows = stmt
                    .query_map([&fragment], T::from_row)
                    .map_err(wrap_err)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, T::KIND.type_name()))
    }

    async fn child_create<T: SqliteChild>(&self, child: &T) -> Result<()> {
        let values = child.to_values();
        let child_id = child.id().to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    &schema::insert_child(T::TABLE, T::COLUMNS),
                    params_from_iter(values),
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, T::KIND.type_name(), child_id))
    }

    async fn child_update<T: SqliteChild>(&self, child: &T) -> Result<()> {
        let values = child.to_values();
        let child_id = child.id().to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        &schema::update_child(T::TABLE, T::COLUMNS),
                        params_from_iter(values),
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, T::KIND.type_name(), child_id))
    }

    async fn child_delete<T: SqliteChild>(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(&schema::delete_child(T::TABLE), [&id_str])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, T::KIND.type_name(), id.to_string()))
    }
}

macro_rules! child_repository {
    ($ty:ty) => {
        #[async_trait]
        impl ChildRepository<$ty> for SqliteRepository {
            async fn get_child(&self, id: Uuid) -> Result<Option<$ty>> {
                self.child_get(id).await
            }

            async fn list_children(&self) -> Result<Vec<$ty>> {
                self.child_list().await
            }

            async fn find_children_by_name(&self, fragment: &str) -> Result<Vec<$ty>> {
                self.child_find_by_name(fragment).await
            }

            async fn create_child(&self, child: &$ty) -> Result<()> {
                self.child_create(child).await
            }

            async fn update_child(&self, child: &$ty) -> Result<()> {
                self.child_update(child).await
            }

            async fn delete_child(&self, id: Uuid) -> Result<()> {
                self.child_delete::<$ty>(id).await
            }
        }
    };
}

child_repository!(PersonalData);
child_repository!(Education);
child_repository!(Experience);
child_repository!(SocialLink);
child_repository!(Hobby);
