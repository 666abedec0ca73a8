//! Cached template repository decorator.
//!
//! Wraps a `TemplateRepository` implementation with cache-aside pattern.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use resumestore_core::cache::{collection_key, template_key, Cache};
use resumestore_core::storage::{Page, PageRequest, Result, TemplateRepository};
use resumestore_core::template::Template;
use resumestore_core::EntityKind;

use super::{cache_evict, cache_get, cache_set};

/// Cached template repository decorator.
///
/// Single templates and the `template:all` collection are cached. Name
/// lookups and paged listings always go to the repository.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation
pub struct CachedTemplateRepository<R, C>
where
    R: TemplateRepository + ?Sized,
    C: Cache + ?Sized,
{
    repository: Arc<R>,
    cache: Arc<C>,
    ttl: Duration,
}

impl<R, C> CachedTemplateRepository<R, C>
where
    R: TemplateRepository + ?Sized,
    C: Cache + ?Sized,
{
    /// Creates a new cached template repository.
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }

    /// Replaces the cached entry with the stored row.
    /// A failed re-read drops the entry instead of failing the committed write.
    async fn refresh(&self, id: Uuid) {
        let key = template_key(id);
        match self.repository.get_template(id).await {
            Ok(Some(stored)) => cache_set(&*self.cache, &key, &stored, self.ttl).await,
            Ok(None) => cache_evict(&*self.cache, &key).await,
            Err(err) => {
                tracing::warn!(template_id = %id, error = %err, "Re-read after update failed");
                cache_evict(&*self.cache, &key).await;
            }
        }
    }

    async fn evict_collection(&self) {
        cache_evict(&*self.cache, &collection_key(EntityKind::Template)).await;
    }
}

#[async_trait]
impl<R, C> TemplateRepository for CachedTemplateRepository<R, C>
where
    R: TemplateRepository + ?Sized + 'static,
    C: Cache + ?Sized + 'static,
{
    async fn get_template(&self, id: Uuid) -> Result<Option<Template>> {
        let key = template_key(id);
        if let Some(template) = cache_get(&*self.cache, &key).await {
            return Ok(Some(template));
        }

        let template = self.repository.get_template(id).await?;
        if let Some(ref t) = template {
            cache_set(&*self.cache, &key, t, self.ttl).await;
        }
        Ok(template)
    }

    async fn list_templates(&self) -> Result<Vec<Template>> {
        let key = collection_key(EntityKind::Template);
        if let Some(templates) = cache_get(&*self.cache, &key).await {
            return Ok(templates);
        }

        let templates = self.repository.list_templates().await?;
        cache_set(&*self.cache, &key, &templates, self.ttl).await;
        Ok(templates)
    }

    async fn list_templates_page(&self, page: PageRequest) -> Result<Page<Template>> {
        self.repository.list_templates_page(page).await
    }

    async fn get_templates_by_name(&self, name: &str) -> Result<Vec<Template>> {
        self.repository.get_templates_by_name(name).await
    }

    async fn template_name_exists(&self, name: &str) -> Result<bool> {
        self.repository.template_name_exists(name).await
    }

    async fn create_template(&self, template: &Template) -> Result<()> {
        self.repository.create_template(template).await?;

        cache_set(&*self.cache, &template_key(template.id), template, self.ttl).await;
        self.evict_collection().await;

        tracing::debug!(
            template_id = %template.id,
            name = %template.name,
            version = template.version,
            "Template created"
        );
        Ok(())
    }

    async fn update_template(&self, template: &Template) -> Result<()> {
        self.repository.update_template(template).await?;

        self.refresh(template.id).await;
        self.evict_collection().await;

        tracing::debug!(template_id = %template.id, name = %template.name, "Template updated");
        Ok(())
    }

    async fn delete_template(&self, id: Uuid) -> Result<()> {
        self.repository.delete_template(id).await?;

        cache_evict(&*self.cache, &template_key(id)).await;
        self.evict_collection().await;

        tracing::debug!(template_id = %id, "Template deleted");
        Ok(())
    }
}
