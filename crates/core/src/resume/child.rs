use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::error::ResumeError;
use super::operations::{
    validate_education, validate_experience, validate_hobby, validate_personal_data,
    validate_social_link,
};
use super::types::{Education, Experience, Hobby, PersonalData, SocialLink};
use crate::EntityKind;

/// Shared contract of the entities a resume owns.
///
/// Child services and repositories are written once against this trait.
pub trait ChildEntity:
    Clone + std::fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Whether an owning resume cannot exist without this child.
    const REQUIRED_BY_OWNER: bool = false;

    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
    fn resume_id(&self) -> Option<Uuid>;
    fn set_resume_id(&mut self, resume_id: Option<Uuid>);

    /// The field matched by name filters.
    fn name_field(&self) -> &str;

    fn validate(&self) -> Result<(), ResumeError>;
}

macro_rules! impl_child_entity {
    ($ty:ty, $kind:expr, $name:ident, $validate:path $(, $required:expr)?) => {
        impl ChildEntity for $ty {
            const KIND: EntityKind = $kind;
            $(const REQUIRED_BY_OWNER: bool = $required;)?

            fn id(&self) -> Uuid {
                self.id
            }

            fn set_id(&mut self, id: Uuid) {
                self.id = id;
            }

            fn resume_id(&self) -> Option<Uuid> {
                self.resume_id
            }

            fn set_resume_id(&mut self, resume_id: Option<Uuid>) {
                self.resume_id = resume_id;
            }

            fn name_field(&self) -> &str {
                &self.$name
            }

            fn validate(&self) -> Result<(), ResumeError> {
                $validate(self)
            }
        }
    };
}

impl_child_entity!(
    PersonalData,
    EntityKind::PersonalData,
    full_name,
    validate_personal_data,
    true
);
impl_child_entity!(Education, EntityKind::Education, name, validate_education);
impl_child_entity!(Experience, EntityKind::Experience, name, validate_experience);
impl_child_entity!(SocialLink, EntityKind::SocialLink, name, validate_social_link);
impl_child_entity!(Hobby, EntityKind::Hobby, hobby, validate_hobby);
