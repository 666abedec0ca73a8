//! In-memory repository implementation.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use resumestore_core::resume::{
    matches_name_filter, matches_search_query, ChildEntity, Education, Experience, Hobby,
    PersonalData, Resume, SocialLink,
};
use resumestore_core::storage::{
    ChildRepository, ChildRetention, Page, PageRequest, RepositoryError, Result,
    ResumeRepository, TemplateRepository,
};
use resumestore_core::template::Template;
use resumestore_core::EntityKind;

use super::table::Table;

/// A stored resume row. Children reference the resume through `resume_id`.
#[derive(Debug, Clone)]
struct ResumeRow {
    id: Uuid,
    personal_data_id: Uuid,
}

#[derive(Debug, Default)]
struct Tables {
    templates: Table<Template>,
    resumes: Table<ResumeRow>,
    personal_data: Table<PersonalData>,
    educations: Table<Education>,
    experiences: Table<Experience>,
    social_links: Table<SocialLink>,
    hobbies: Table<Hobby>,
}

/// Selects the table holding a child kind.
trait StoredChild: ChildEntity {
    fn table(tables: &Tables) -> &Table<Self>;
    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}

macro_rules! stored_child {
    ($ty:ty, $field:ident) => {
        impl StoredChild for $ty {
            fn table(tables: &Tables) -> &Table<Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
                &mut tables.$field
            }
        }
    };
}

stored_child!(PersonalData, personal_data);
stored_child!(Education, educations);
stored_child!(Experience, experiences);
stored_child!(SocialLink, social_links);
stored_child!(Hobby, hobbies);

impl Tables {
    fn owned_by<T: StoredChild>(&self, resume_id: Uuid) -> Vec<T> {
        T::table(self)
            .values()
            .filter(|c| c.resume_id() == Some(resume_id))
            .cloned()
            .collect()
    }

    fn compose(&self, row: &ResumeRow) -> Result<Resume> {
        let personal_data = self
            .personal_data
            .get(&row.personal_data_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::InvalidData(format!(
                    "resume {} references missing personal data {}",
                    row.id, row.personal_data_id
                ))
            })?;

        Ok(Resume {
            id: row.id,
            personal_data,
            educations: self.owned_by(row.id),
            experiences: self.owned_by(row.id),
            social_links: self.owned_by(row.id),
            hobbies: self.owned_by(row.id),
        })
    }

    fn compose_all(&self) -> Result<Vec<Resume>> {
        self.resumes.values().map(|row| self.compose(row)).collect()
    }

    /// Fails if any incoming child is already owned by a different resume.
    fn check_claim<T: StoredChild>(&self, resume_id: Uuid, incoming: &[T]) -> Result<()> {
        for child in incoming {
            if let Some(stored) = T::table(self).get(&child.id()) {
                if stored.resume_id().is_some_and(|owner| owner != resume_id) {
                    return Err(RepositoryError::AlreadyExists {
                        entity_type: T::KIND.type_name(),
                        id: child.id().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn upsert_owned<T: StoredChild>(
        &mut self,
        resume_id: Uuid,
        incoming: &[T],
        retention: ChildRetention,
    ) {
        let table = T::table_mut(self);
        if retention == ChildRetention::Replace {
            let keep: HashSet<Uuid> = incoming.iter().map(|c| c.id()).collect();
            table.remove_where(
                |c| c.resume_id() == Some(resume_id) && !keep.contains(&c.id()),
                |c| c.id(),
            );
        }
        for child in incoming {
            let mut child = child.clone();
            child.set_resume_id(Some(resume_id));
            table.upsert(child.id(), child);
        }
    }

    fn remove_owned<T: StoredChild>(&mut self, resume_id: Uuid) {
        T::table_mut(self).remove_where(|c| c.resume_id() == Some(resume_id), |c| c.id());
    }

    fn cascade_delete(&mut self, row: &ResumeRow) {
        self.personal_data.remove(&row.personal_data_id);
        self.remove_owned::<PersonalData>(row.id);
        self.remove_owned::<Education>(row.id);
        self.remove_owned::<Experience>(row.id);
        self.remove_owned::<SocialLink>(row.id);
        self.remove_owned::<Hobby>(row.id);
    }
}

/// In-memory storage backend for testing.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
        }
    }
}

#[async_trait]
impl TemplateRepository for InMemoryRepository {
    async fn get_template(&self, id: Uuid) -> Result<Option<Template>> {
        let tables = self.tables.read().await;
        Ok(tables.templates.get(&id).cloned())
    }

    async fn list_templates(&self) -> Result<Vec<Template>> {
        let tables = self.tables.read().await;
        Ok(tables.templates.values().cloned().collect())
    }

    async fn list_templates_page(&self, page: PageRequest) -> Result<Page<Template>> {
        let all = self.list_templates().await?;
        Ok(Page::from_items(all, page))
    }

    async fn get_templates_by_name(&self, name: &str) -> Result<Vec<Template>> {
        let tables = self.tables.read().await;
        Ok(tables
            .templates
            .values()
            .filter(|t| t.name == name)
            .cloned()
            .collect())
    }

    async fn template_name_exists(&self, name: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        let exists = tables.templates.values().any(|t| t.name == name);
        Ok(exists)
    }

    async fn create_template(&self, template: &Template) -> Result<()> {
        let mut tables = self.tables.write().await;
        let slot_taken = tables
            .templates
            .values()
            .any(|t| t.name == template.name && t.version == template.version);
        if slot_taken || tables.templates.contains(&template.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: EntityKind::Template.type_name(),
                id: format!("{} v{}", template.name, template.version),
            });
        }
        tables.templates.upsert(template.id, template.clone());
        Ok(())
    }

    async fn update_template(&self, template: &Template) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.templates.contains(&template.id) {
            return Err(RepositoryError::NotFound {
                entity_type: EntityKind::Template.type_name(),
                id: template.id.to_string(),
            });
        }
        tables.templates.upsert(template.id, template.clone());
        Ok(())
    }

    async fn delete_template(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.templates.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: EntityKind::Template.type_name(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ResumeRepository for InMemoryRepository {
    async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>> {
        let tables = self.tables.read().await;
        tables
            .resumes
            .get(&id)
            .map(|row| tables.compose(row))
            .transpose()
    }

    async fn list_resumes(&self) -> Result<Vec<Resume>> {
        let tables = self.tables.read().await;
        tables.compose_all()
    }

    async fn find_resumes_by_name(&self, fragment: &str) -> Result<Vec<Resume>> {
        let tables = self.tables.read().await;
        Ok(tables
            .compose_all()?
            .into_iter()
            .filter(|r| matches_name_filter(r, fragment))
            .collect())
    }

    async fn search_resumes(&self, query: &str, page: PageRequest) -> Result<Page<Resume>> {
        let tables = self.tables.read().await;
        let matches: Vec<Resume> = tables
            .compose_all()?
            .into_iter()
            .filter(|r| matches_search_query(&r.personal_data, query))
            .collect();
        Ok(Page::from_items(matches, page))
    }

    async fn save_resume(&self, resume: &Resume, retention: ChildRetention) -> Result<()> {
        let mut tables = self.tables.write().await;

        tables.check_claim(resume.id, std::slice::from_ref(&resume.personal_data))?;
        tables.check_claim(resume.id, &resume.educations)?;
        tables.check_claim(resume.id, &resume.experiences)?;
        tables.check_claim(resume.id, &resume.social_links)?;
        tables.check_claim(resume.id, &resume.hobbies)?;

        // Personal data is 1:1, so a new record replaces the old one.
        if let Some(previous) = tables.resumes.get(&resume.id).map(|r| r.personal_data_id) {
            if previous != resume.personal_data.id {
                tables.personal_data.remove(&previous);
            }
        }

        tables.upsert_owned(
            resume.id,
            std::slice::from_ref(&resume.personal_data),
            ChildRetention::Retain,
        );
        tables.upsert_owned(resume.id, &resume.educations, retention);
        tables.upsert_owned(resume.id, &resume.experiences, retention);
        tables.upsert_owned(resume.id, &resume.social_links, retention);
        tables.upsert_owned(resume.id, &resume.hobbies, retention);

        tables.resumes.upsert(
            resume.id,
            ResumeRow {
                id: resume.id,
                personal_data_id: resume.personal_data.id,
            },
        );
        Ok(())
    }

    async fn delete_resume(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.resumes.remove(&id) else {
            return Err(RepositoryError::NotFound {
                entity_type: EntityKind::Resume.type_name(),
                id: id.to_string(),
            });
        };
        tables.cascade_delete(&row);
        Ok(())
    }

    async fn delete_all_resumes(&self) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let rows: Vec<ResumeRow> = tables.resumes.values().cloned().collect();
        for row in &rows {
            tables.resumes.remove(&row.id);
            tables.cascade_delete(row);
        }
        Ok(rows.len() as u64)
    }
}

impl InMemoryRepository {
    async fn child_get<T: StoredChild>(&self, id: Uuid) -> Result<Option<T>> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn child_list<T: StoredChild>(&self) -> Result<Vec<T>> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).values().cloned().collect())
    }

    async fn child_find_by_name<T: StoredChild>(&self, fragment: &str) -> Result<Vec<T>> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables)
            .values()
            .filter(|c| c.name_field().to_lowercase().contains(fragment))
            .cloned()
            .collect())
    }

    async fn child_create<T: StoredChild>(&self, child: &T) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = T::table_mut(&mut tables);
        if table.contains(&child.id()) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: T::KIND.type_name(),
                id: child.id().to_string(),
            });
        }
        table.upsert(child.id(), child.clone());
        Ok(())
    }

    async fn child_update<T: StoredChild>(&self, child: &T) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = T::table_mut(&mut tables);
        let Some(owner) = table.get(&child.id()).map(|stored| stored.resume_id()) else {
            return Err(RepositoryError::NotFound {
                entity_type: T::KIND.type_name(),
                id: child.id().to_string(),
            });
        };
        let mut child = child.clone();
        child.set_resume_id(owner);
        table.upsert(child.id(), child);
        Ok(())
    }

    async fn child_delete<T: StoredChild>(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        if T::table_mut(&mut tables).remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: T::KIND.type_name(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

macro_rules! child_repository {
    ($ty:ty) => {
        #[async_trait]
        impl ChildRepository<$ty> for InMemoryRepository {
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
