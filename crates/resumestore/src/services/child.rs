//! Standalone CRUD over resume children.

use std::sync::Arc;

use uuid::Uuid;

use resumestore_core::resume::{normalize_query, ChildEntity};
use resumestore_core::storage::ChildRepository;

use super::error::{Result, ServiceError};

/// CRUD service for one child kind.
///
/// Children created here are standalone. Updates never move a child to
/// another resume.
pub struct ChildService<T: ChildEntity> {
    repository: Arc<dyn ChildRepository<T>>,
}

impl<T: ChildEntity> Clone for ChildService<T> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<T: ChildEntity> ChildService<T> {
    pub fn new(repository: Arc<dyn ChildRepository<T>>) -> Self {
        Self { repository }
    }

    /// Persists a new standalone child with a fresh id.
    pub async fn create(&self, mut entity: T) -> Result<T> {
        entity.validate()?;
        entity.set_id(Uuid::new_v4());
        entity.set_resume_id(None);

        self.repository.create_child(&entity).await?;
        tracing::info!(kind = %T::KIND, id = %entity.id(), "Child created");
        Ok(entity)
    }

    /// Replaces a stored child, keeping its owner.
    pub async fn update(&self, id: Uuid, mut entity: T) -> Result<T> {
        let existing = self.get(id).await?;
        entity.set_id(id);
        entity.set_resume_id(existing.resume_id());
        entity.validate()?;

        self.repository.update_child(&entity).await?;
        tracing::info!(kind = %T::KIND, %id, "Child updated");
        Ok(entity)
    }

    /// Deletes a child.
    ///
    /// A kind every resume requires cannot be deleted while a resume owns it.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let existing = self.get(id).await?;
        if let Some(owner) = existing.resume_id().filter(|_| T::REQUIRED_BY_OWNER) {
            return Err(ServiceError::Conflict(format!(
                "{} {id} is required by resume {owner}",
                T::KIND.type_name()
            )));
        }

        self.repository.delete_child(id).await?;
        tracing::info!(kind = %T::KIND, %id, "Child deleted");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<T> {
        self.repository
            .get_child(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(T::KIND.type_name(), id))
    }

    pub async fn list_all(&self) -> Result<Vec<T>> {
        Ok(self.repository.list_children().await?)
    }

    /// Children whose name field contains `filter`, ignoring case.
    ///
    /// A missing or blank filter returns every child of the kind.
    pub async fn load_by_name_filter(&self, filter: Option<&str>) -> Result<Vec<T>> {
        match filter.and_then(normalize_query) {
            Some(fragment) => Ok(self.repository.find_children_by_name(&fragment).await?),
            None => self.list_all().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use resumestore_core::resume::{Education, Hobby, PersonalData, Resume, SocialLink};
    use resumestore_core::storage::{ChildRetention, ResumeRepository};

    use crate::storage::InMemoryRepository;

    #[tokio::test]
    async fn test_create_assigns_fresh_id_and_no_owner() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ChildService::<Hobby>::new(repo);
        let mut hobby = Hobby::new("chess");
        let requested_id = hobby.id;
        hobby.resume_id = Some(Uuid::new_v4());

        let created = service.create(hobby).await.unwrap();

        assert_ne!(created.id, requested_id);
        assert_eq!(created.resume_id, None);
        assert_eq!(service.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_validates() {
        let service = ChildService::<Education>::new(Arc::new(InMemoryRepository::new()));

        let result = service.create(Education::new("MIT", "2024", "2020")).await;

        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_owner() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut resume = Resume::new(PersonalData::new("John Doe"))
            .with_social_link(SocialLink::new("GitHub", "https://github.com/john"));
        resume.claim_children();
        repo.save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();
        let service = ChildService::<SocialLink>::new(repo.clone());
        let link_id = resume.social_links[0].id;

        let updated = service
            .update(link_id, SocialLink::new("GitLab", "https://gitlab.com/john"))
            .await
            .unwrap();

        assert_eq!(updated.id, link_id);
        assert_eq!(updated.resume_id, Some(resume.id));
        let stored = repo.get_resume(resume.id).await.unwrap().unwrap();
        assert_eq!(stored.social_links[0].name, "GitLab");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = ChildService::<Hobby>::new(Arc::new(InMemoryRepository::new()));
        let id = Uuid::new_v4();

        assert_eq!(
            service.update(id, Hobby::new("chess")).await,
            Err(ServiceError::not_found("Hobby", id))
        );
    }

    #[tokio::test]
    async fn test_owned_personal_data_cannot_be_deleted() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut resume = Resume::new(PersonalData::new("John Doe"));
        resume.claim_children();
        repo.save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();
        let service = ChildService::<PersonalData>::new(repo.clone());

        let result = service.delete(resume.personal_data.id).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert!(repo.get_resume(resume.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_owned_child_removes_it_from_resume() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut resume =
            Resume::new(PersonalData::new("John Doe")).with_hobby(Hobby::new("chess"));
        resume.claim_children();
        repo.save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();
        let service = ChildService::<Hobby>::new(repo.clone());

        service.delete(resume.hobbies[0].id).await.unwrap();

        let stored = repo.get_resume(resume.id).await.unwrap().unwrap();
        assert!(stored.hobbies.is_empty());
        assert!(matches!(
            service.delete(resume.hobbies[0].id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_by_name_filter() {
        let service = ChildService::<Hobby>::new(Arc::new(InMemoryRepository::new()));
        service.create(Hobby::new("Chess")).await.unwrap();
        service.create(Hobby::new("Sailing")).await.unwrap();

        assert_eq!(service.load_by_name_filter(None).await.unwrap().len(), 2);
        let found = service.load_by_name_filter(Some("CHE")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].hobby, "Chess");
    }
}
