//! Resume aggregate service.

use std::sync::Arc;

use uuid::Uuid;

use resumestore_core::resume::{normalize_query, validate_resume, Resume, ResumeError, MAX_QUERY_LEN};
use resumestore_core::storage::{ChildRetention, Page, PageRequest, ResumeRepository};

use super::error::{Result, ServiceError};

/// Creates, updates and queries resumes together with their children.
///
/// Every write validates the whole aggregate first and is persisted as one
/// cascading unit.
#[derive(Clone)]
pub struct ResumeService {
    repository: Arc<dyn ResumeRepository>,
    retention: ChildRetention,
}

impl ResumeService {
    pub fn new(repository: Arc<dyn ResumeRepository>, retention: ChildRetention) -> Self {
        Self {
            repository,
            retention,
        }
    }

    /// The policy applied to children an update does not mention.
    pub fn retention(&self) -> ChildRetention {
        self.retention
    }

    /// Persists a new resume and returns the stored aggregate.
    ///
    /// The resume gets a fresh id and every child is marked as owned by it.
    pub async fn create(&self, mut resume: Resume) -> Result<Resume> {
        validate_resume(&resume)?;

        resume.id = Uuid::new_v4();
        resume.claim_children();
        self.repository.save_resume(&resume, self.retention).await?;

        tracing::info!(
            resume_id = %resume.id,
            full_name = %resume.personal_data.full_name,
            "Resume created"
        );
        self.get(resume.id).await
    }

    /// Replaces the state of an existing resume.
    ///
    /// Children carried by `resume` are inserted or updated by id. Children
    /// it omits are kept or deleted according to the retention policy.
    pub async fn update(&self, id: Uuid, mut resume: Resume) -> Result<Resume> {
        if self.repository.get_resume(id).await?.is_none() {
            return Err(ServiceError::not_found("Resume", id));
        }

        resume.id = id;
        validate_resume(&resume)?;
        resume.claim_children();
        self.repository.save_resume(&resume, self.retention).await?;

        tracing::info!(resume_id = %id, retention = ?self.retention, "Resume updated");
        self.get(id).await
    }

    /// Deletes a resume and every child it owns.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repository.delete_resume(id).await?;
        tracing::info!(resume_id = %id, "Resume deleted");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Resume> {
        self.repository
            .get_resume(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Resume", id))
    }

    pub async fn list_all(&self) -> Result<Vec<Resume>> {
        Ok(self.repository.list_resumes().await?)
    }

    /// Resumes whose full name contains `filter`, ignoring case.
    ///
    /// A missing or blank filter returns every resume.
    pub async fn load_by_name_filter(&self, filter: Option<&str>) -> Result<Vec<Resume>> {
        match filter.and_then(normalize_query) {
            Some(fragment) => Ok(self.repository.find_resumes_by_name(&fragment).await?),
            None => self.list_all().await,
        }
    }

    /// Pages over resumes whose full name, bio or position contains the query.
    ///
    /// A blank query yields an empty page.
    pub async fn search(&self, query: &str, page: PageRequest) -> Result<Page<Resume>> {
        if query.trim().chars().count() > MAX_QUERY_LEN {
            return Err(ResumeError::QueryTooLong { max: MAX_QUERY_LEN }.into());
        }

        match normalize_query(query) {
            Some(query) => Ok(self.repository.search_resumes(&query, page).await?),
            None => Ok(Page::empty(page)),
        }
    }

    /// Deletes every resume and its owned children. Returns how many resumes
    /// were removed.
    pub async fn delete_all(&self) -> Result<u64> {
        let deleted = self.repository.delete_all_resumes().await?;
        tracing::info!(deleted, "All resumes deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use resumestore_core::resume::{Education, Experience, Hobby, PersonalData};

    use crate::storage::InMemoryRepository;

    fn service(retention: ChildRetention) -> ResumeService {
        ResumeService::new(Arc::new(InMemoryRepository::new()), retention)
    }

    fn john() -> Resume {
        Resume::new(PersonalData::new("John").with_position("Backend Developer"))
            .with_education(Education::new("MIT", "2020", "2022"))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = service(ChildRetention::Retain);

        let created = service.create(john()).await.unwrap();
        let fetched = service.get(created.id).await.unwrap();

        assert_eq!(fetched.personal_data.full_name, "John");
        assert_eq!(fetched.educations.len(), 1);
        assert_eq!(fetched.educations[0].resume_id, Some(created.id));
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_years_without_writing() {
        let service = service(ChildRetention::Retain);
        let resume = Resume::new(PersonalData::new("John"))
            .with_education(Education::new("MIT", "2024", "2020"));

        let result = service.create(resume).await;

        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_twice_equals_once() {
        let service = service(ChildRetention::Retain);
        let created = service.create(john()).await.unwrap();

        let mut next = created.clone();
        next.personal_data.bio = Some("Rustacean".to_string());
        let once = service.update(created.id, next.clone()).await.unwrap();
        let twice = service.update(created.id, next).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.educations.len(), 1);
        assert_eq!(service.get(created.id).await.unwrap(), twice);
    }

    #[tokio::test]
    async fn test_update_overwrites_incoming_id() {
        let service = service(ChildRetention::Retain);
        let created = service.create(john()).await.unwrap();

        let stray = john().with_id(Uuid::new_v4());
        let updated = service.update(created.id, stray).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = service(ChildRetention::Retain);
        let id = Uuid::new_v4();

        assert_eq!(
            service.update(id, john()).await,
            Err(ServiceError::not_found("Resume", id))
        );
    }

    #[tokio::test]
    async fn test_retain_keeps_omitted_children() {
        let service = service(ChildRetention::Retain);
        let created = service
            .create(john().with_hobby(Hobby::new("chess")))
            .await
            .unwrap();

        let mut next = created.clone();
        next.hobbies.clear();
        next.experiences.push(Experience::new("Acme", "2022", "2024"));
        let updated = service.update(created.id, next).await.unwrap();

        assert_eq!(updated.hobbies, created.hobbies);
        assert_eq!(updated.experiences.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_deletes_omitted_children() {
        let service = service(ChildRetention::Replace);
        let created = service
            .create(john().with_hobby(Hobby::new("chess")))
            .await
            .unwrap();

        let mut next = created.clone();
        next.hobbies.clear();
        let updated = service.update(created.id, next).await.unwrap();

        assert!(updated.hobbies.is_empty());
        assert_eq!(updated.educations, created.educations);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service(ChildRetention::Retain);
        let created = service.create(john()).await.unwrap();

        service.delete(created.id).await.unwrap();

        assert_eq!(
            service.get(created.id).await,
            Err(ServiceError::not_found("Resume", created.id))
        );
        assert!(matches!(
            service.delete(created.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_by_name_filter() {
        let service = service(ChildRetention::Retain);
        service.create(john()).await.unwrap();
        service
            .create(Resume::new(PersonalData::new("Jane Roe")))
            .await
            .unwrap();

        assert_eq!(service.load_by_name_filter(None).await.unwrap().len(), 2);
        assert_eq!(service.load_by_name_filter(Some("  ")).await.unwrap().len(), 2);
        let found = service.load_by_name_filter(Some("ROE")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].personal_data.full_name, "Jane Roe");
    }

    #[tokio::test]
    async fn test_search_blank_query_is_empty_page() {
        let service = service(ChildRetention::Retain);
        service.create(john()).await.unwrap();
        let page = PageRequest::default();

        for query in ["", "   "] {
            let result = service.search(query, page).await.unwrap();
            assert!(result.items.is_empty());
            assert_eq!(result.total, 0);
        }
    }

    #[tokio::test]
    async fn test_search_matches_position_case_insensitively() {
        let service = service(ChildRetention::Retain);
        service.create(john()).await.unwrap();

        let result = service
            .search("  backend ", PageRequest::default())
            .await
            .unwrap();

        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].personal_data.full_name, "John");
    }

    #[tokio::test]
    async fn test_search_rejects_long_query() {
        let service = service(ChildRetention::Retain);

        let result = service
            .search(&"a".repeat(MAX_QUERY_LEN + 1), PageRequest::default())
            .await;

        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_delete_all() {
        let service = service(ChildRetention::Retain);
        service.create(john()).await.unwrap();
        service.create(john()).await.unwrap();

        assert_eq!(service.delete_all().await.unwrap(), 2);
        assert!(service.list_all().await.unwrap().is_empty());
    }
}
