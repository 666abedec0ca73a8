use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EntityKind;

/// A resume aggregate: one personal-data record plus owned child collections.
///
/// Ids default to fresh values when absent from imported JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resume {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub personal_data: PersonalData,
    #[serde(default)]
    pub educations: Vec<Education>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub hobbies: Vec<Hobby>,
}

impl Resume {
    /// Creates a resume with the given personal data and no other children.
    pub fn new(personal_data: PersonalData) -> Self {
        Self {
            id: Uuid::new_v4(),
            personal_data,
            educations: Vec::new(),
            experiences: Vec::new(),
            social_links: Vec::new(),
            hobbies: Vec::new(),
        }
    }

    /// Sets a specific ID for this resume (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_education(mut self, education: Education) -> Self {
        self.educations.push(education);
        self
    }

    pub fn with_experience(mut self, experience: Experience) -> Self {
        self.experiences.push(experience);
        self
    }

    pub fn with_social_link(mut self, social_link: SocialLink) -> Self {
        self.social_links.push(social_link);
        self
    }

    pub fn with_hobby(mut self, hobby: Hobby) -> Self {
        self.hobbies.push(hobby);
        self
    }

    /// Marks every child as owned by this resume.
    pub fn claim_children(&mut self) {
        let owner = Some(self.id);
        self.personal_data.resume_id = owner;
        self.educations.iter_mut().for_each(|c| c.resume_id = owner);
        self.experiences.iter_mut().for_each(|c| c.resume_id = owner);
        self.social_links.iter_mut().for_each(|c| c.resume_id = owner);
        self.hobbies.iter_mut().for_each(|c| c.resume_id = owner);
    }

    /// Returns the kind and id of every child in this aggregate.
    pub fn child_ids(&self) -> Vec<(EntityKind, Uuid)> {
        let mut ids = vec![(EntityKind::PersonalData, self.personal_data.id)];
        ids.extend(self.educations.iter().map(|c| (EntityKind::Education, c.id)));
        ids.extend(self.experiences.iter().map(|c| (EntityKind::Experience, c.id)));
        ids.extend(self.social_links.iter().map(|c| (EntityKind::SocialLink, c.id)));
        ids.extend(self.hobbies.iter().map(|c| (EntityKind::Hobby, c.id)));
        ids
    }
}

/// Identity and contact details of a resume's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalData {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<Uuid>,
    pub full_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub phone: Option<i64>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl PersonalData {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            resume_id: None,
            full_name: full_name.into(),
            address: None,
            bio: None,
            position: None,
            phone: None,
            website: None,
            email: None,
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A period of study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<Uuid>,
    /// Institution name.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Degree or field of study.
    #[serde(default)]
    pub position: Option<String>,
    pub from_year: String,
    pub to_year: String,
}

impl Education {
    pub fn new(
        name: impl Into<String>,
        from_year: impl Into<String>,
        to_year: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            resume_id: None,
            name: name.into(),
            description: None,
            position: None,
            from_year: from_year.into(),
            to_year: to_year.into(),
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A period of employment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<Uuid>,
    /// Employer name.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Job title.
    #[serde(default)]
    pub position: Option<String>,
    pub from_year: String,
    pub to_year: String,
}

impl Experience {
    pub fn new(
        name: impl Into<String>,
        from_year: impl Into<String>,
        to_year: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            resume_id: None,
            name: name.into(),
            description: None,
            position: None,
            from_year: from_year.into(),
            to_year: to_year.into(),
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl SocialLink {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            resume_id: None,
            name: name.into(),
            link: Some(link.into()),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hobby {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<Uuid>,
    pub hobby: String,
}

impl Hobby {
    pub fn new(hobby: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            resume_id: None,
            hobby: hobby.into(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}
