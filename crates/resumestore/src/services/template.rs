//! Template version manager.

use std::sync::Arc;

use uuid::Uuid;

use resumestore_core::storage::{DateRange, Page, PageRequest, TemplateRepository};
use resumestore_core::template::{
    filter_templates_by_date_range, latest_version, next_version_number, sort_version_chain,
    validate_template, CreateTemplateRequest, Template, UpdateTemplateRequest,
};

use super::error::{Result, ServiceError};

/// Manages named template version chains.
///
/// A chain is every template sharing a name, ordered by version. It is
/// computed on read and never stored.
#[derive(Clone)]
pub struct TemplateService {
    repository: Arc<dyn TemplateRepository>,
}

impl TemplateService {
    pub fn new(repository: Arc<dyn TemplateRepository>) -> Self {
        Self { repository }
    }

    /// Creates version 1 of a new template name.
    ///
    /// A name already in use is a conflict. Further versions go through
    /// [`TemplateService::create_new_version`].
    pub async fn create(&self, request: CreateTemplateRequest) -> Result<Template> {
        let template = request.into_template();
        validate_template(&template)?;

        if self.repository.template_name_exists(&template.name).await? {
            return Err(ServiceError::Conflict(format!(
                "Template name already in use: {}",
                template.name
            )));
        }

        self.repository.create_template(&template).await?;
        tracing::info!(template_id = %template.id, name = %template.name, "Template created");
        Ok(template)
    }

    /// Copies a stored template into the next version of its chain.
    ///
    /// Two writers racing for the same version slot leave one of them with
    /// a conflict.
    pub async fn create_new_version(&self, source_id: Uuid) -> Result<Template> {
        let source = self.get(source_id).await?;
        let chain = self.repository.get_templates_by_name(&source.name).await?;

        let template = source.derive_version(next_version_number(&chain));
        self.repository.create_template(&template).await?;

        tracing::info!(
            template_id = %template.id,
            source_id = %source_id,
            name = %template.name,
            version = template.version,
            "Template version created"
        );
        Ok(template)
    }

    /// Returns every version of a name, oldest first.
    pub async fn list_versions(&self, name: &str) -> Result<Vec<Template>> {
        let mut chain = self.repository.get_templates_by_name(name).await?;
        sort_version_chain(&mut chain);
        Ok(chain)
    }

    pub async fn latest_version(&self, name: &str) -> Result<Template> {
        let chain = self.repository.get_templates_by_name(name).await?;
        latest_version(&chain)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("Template", name))
    }

    pub async fn name_exists(&self, name: &str) -> Result<bool> {
        Ok(self.repository.template_name_exists(name).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Template> {
        self.repository
            .get_template(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Template", id))
    }

    pub async fn list_all(&self) -> Result<Vec<Template>> {
        Ok(self.repository.list_templates().await?)
    }

    /// Replaces description and content of one version.
    ///
    /// Id, name, version and creation time are kept.
    pub async fn update(&self, id: Uuid, request: UpdateTemplateRequest) -> Result<Template> {
        let existing = self.get(id).await?;
        let updated = request.apply_to(&existing);
        validate_template(&updated)?;

        self.repository.update_template(&updated).await?;
        tracing::info!(
            template_id = %id,
            name = %updated.name,
            version = updated.version,
            "Template updated"
        );
        Ok(updated)
    }

    /// Deletes a single version. Other versions of the name are untouched.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repository.delete_template(id).await?;
        tracing::info!(template_id = %id, "Template deleted");
        Ok(())
    }

    /// Pages over every template in insertion order.
    pub async fn list_paged(&self, page: PageRequest) -> Result<Page<Template>> {
        Ok(self.repository.list_templates_page(page).await?)
    }

    /// Templates created within an inclusive date range.
    pub async fn list_created_between(&self, range: DateRange) -> Result<Vec<Template>> {
        let all = self.repository.list_templates().await?;
        Ok(filter_templates_by_date_range(&all, &range)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::storage::InMemoryRepository;

    fn service() -> TemplateService {
        TemplateService::new(Arc::new(InMemoryRepository::new()))
    }

    fn request(name: &str) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: name.to_string(),
            description: Some("one column".to_string()),
            content: "<h1>{{full_name}}</h1>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_starts_a_chain() {
        let service = service();

        let template = service.create(request("classic")).await.unwrap();

        assert_eq!(template.version, 1);
        assert!(service.name_exists("classic").await.unwrap());
        assert_eq!(service.get(template.id).await.unwrap(), template);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_and_duplicate_names() {
        let service = service();
        service.create(request("classic")).await.unwrap();

        assert!(matches!(
            service.create(request("   ")).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.create(request(&"x".repeat(101))).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.create(request("classic")).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_new_versions_extend_the_chain() {
        let service = service();
        let v1 = service.create(request("A")).await.unwrap();

        let v2 = service.create_new_version(v1.id).await.unwrap();
        // Versioning from an older source still appends to the chain.
        let v3 = service.create_new_version(v1.id).await.unwrap();

        assert_eq!((v2.version, v3.version), (2, 3));
        assert_eq!(v3.name, "A");
        assert_eq!(v3.content, v1.content);
        let versions: Vec<u32> = service
            .list_versions("A")
            .await
            .unwrap()
            .iter()
            .map(|t| t.version)
            .collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert_eq!(service.latest_version("A").await.unwrap().id, v3.id);
    }

    #[tokio::test]
    async fn test_versions_of_other_names_are_unaffected_by_deletes() {
        let service = service();
        let a = service.create(request("A")).await.unwrap();
        service.create_new_version(a.id).await.unwrap();
        let b = service.create(request("B")).await.unwrap();

        service.delete(b.id).await.unwrap();

        assert_eq!(service.list_versions("A").await.unwrap().len(), 2);
        assert!(service.list_versions("B").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_version_of_missing_source_is_not_found() {
        let service = service();
        let id = Uuid::new_v4();

        assert_eq!(
            service.create_new_version(id).await,
            Err(ServiceError::not_found("Template", id))
        );
    }

    #[tokio::test]
    async fn test_latest_version_of_unknown_name_is_not_found() {
        let service = service();
        assert!(matches!(
            service.latest_version("nope").await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_identity_fields() {
        let service = service();
        let original = service.create(request("classic")).await.unwrap();

        let updated = service
            .update(
                original.id,
                UpdateTemplateRequest {
                    description: None,
                    content: Some("<p/>".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.content, "<p/>");
        assert_eq!(updated.description, original.description);
        assert_eq!(
            (updated.id, &updated.name, updated.version, updated.created_at),
            (original.id, &original.name, original.version, original.created_at)
        );
        assert_eq!(service.get(original.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found() {
        let service = service();
        let id = Uuid::new_v4();

        assert!(matches!(
            service.update(id, UpdateTemplateRequest::default()).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete(id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_deleting_latest_does_not_promote() {
        let service = service();
        let v1 = service.create(request("A")).await.unwrap();
        let v2 = service.create_new_version(v1.id).await.unwrap();

        service.delete(v2.id).await.unwrap();

        assert_eq!(service.latest_version("A").await.unwrap().id, v1.id);
        let v3 = service.create_new_version(v1.id).await.unwrap();
        assert_eq!(v3.version, 2);
    }

    #[tokio::test]
    async fn test_list_paged() {
        let service = service();
        for name in ["a", "b", "c"] {
            service.create(request(name)).await.unwrap();
        }

        let page = service
            .list_paged(PageRequest::new(1, 2).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "c");
    }

    #[tokio::test]
    async fn test_list_created_between() {
        let service = service();
        service.create(request("today")).await.unwrap();
        let today = Utc::now().date_naive();

        let hit = DateRange::new(today - Duration::days(1), today).unwrap();
        let miss = DateRange::new(today - Duration::days(10), today - Duration::days(5)).unwrap();

        assert_eq!(service.list_created_between(hit).await.unwrap().len(), 1);
        assert!(service.list_created_between(miss).await.unwrap().is_empty());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_update_is_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let service = service();
        let original = service.create(request("classic")).await.unwrap();

        service
            .update(original.id, UpdateTemplateRequest::default())
            .await
            .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Template updated"));
        assert!(output.contains(&original.id.to_string()));
    }
}
