use async_trait::async_trait;
use uuid::Uuid;

use crate::resume::{ChildEntity, Resume};
use crate::template::Template;

use super::{ChildRetention, Page, PageRequest, Result};

/// Repository for template versions.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Gets a template version by its ID.
    async fn get_template(&self, id: Uuid) -> Result<Option<Template>>;

    /// Gets every template version in insertion order.
    async fn list_templates(&self) -> Result<Vec<Template>>;

    /// Gets one page of template versions in insertion order.
    async fn list_templates_page(&self, page: PageRequest) -> Result<Page<Template>>;

    /// Gets every version with exactly this name. Order is unspecified.
    async fn get_templates_by_name(&self, name: &str) -> Result<Vec<Template>>;

    /// Returns true if at least one version has this name.
    async fn template_name_exists(&self, name: &str) -> Result<bool>;

    /// Creates a template version. Fails with `AlreadyExists` if the
    /// `(name, version)` slot is taken.
    async fn create_template(&self, template: &Template) -> Result<()>;

    /// Updates an existing template version.
    async fn update_template(&self, template: &Template) -> Result<()>;

    /// Deletes a single template version.
    async fn delete_template(&self, id: Uuid) -> Result<()>;
}

/// Repository for resume aggregates.
///
/// Every write is one unit: the resume row and all of its children are
/// committed together or not at all.
#[async_trait]
pub trait ResumeRepository: Send + Sync {
    /// Gets a composed resume by its ID.
    async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>>;

    /// Gets every resume in insertion order.
    async fn list_resumes(&self) -> Result<Vec<Resume>>;

    /// Gets resumes whose full name contains the lowercase fragment.
    async fn find_resumes_by_name(&self, fragment: &str) -> Result<Vec<Resume>>;

    /// Searches full name, bio and position for the lowercase query.
    ///
    /// Results are in insertion order so pages are stable.
    async fn search_resumes(&self, query: &str, page: PageRequest) -> Result<Page<Resume>>;

    /// Inserts or updates a resume and cascades to its children.
    ///
    /// Children already owned by another resume make the save fail with
    /// `AlreadyExists` before anything is written.
    async fn save_resume(&self, resume: &Resume, retention: ChildRetention) -> Result<()>;

    /// Deletes a resume and every child it owns.
    async fn delete_resume(&self, id: Uuid) -> Result<()>;

    /// Deletes every resume and owned child. Returns the number of resumes removed.
    async fn delete_all_resumes(&self) -> Result<u64>;
}

/// Repository for one kind of resume child, owned or standalone.
#[async_trait]
pub trait ChildRepository<T: ChildEntity>: Send + Sync {
    async fn get_child(&self, id: Uuid) -> Result<Option<T>>;

    /// Gets every child of this kind in insertion order.
    async fn list_children(&self) -> Result<Vec<T>>;

    /// Gets children whose name field contains the lowercase fragment.
    async fn find_children_by_name(&self, fragment: &str) -> Result<Vec<T>>;

    async fn create_child(&self, child: &T) -> Result<()>;

    /// Updates a child in place. The stored owner is kept.
    async fn update_child(&self, child: &T) -> Result<()>;

    async fn delete_child(&self, id: Uuid) -> Result<()>;
}
