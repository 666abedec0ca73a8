use super::error::ResumeError;
use super::types::{Education, Experience, Hobby, PersonalData, Resume, SocialLink};

/// Minimum length of a personal-data full name, after trimming.
pub const MIN_FULL_NAME_LEN: usize = 3;

/// Maximum length of a search query, in characters.
pub const MAX_QUERY_LEN: usize = 255;

/// Validates personal data before it is persisted.
pub fn validate_personal_data(data: &PersonalData) -> Result<(), ResumeError> {
    if data.full_name.trim().chars().count() < MIN_FULL_NAME_LEN {
        return Err(ResumeError::FullNameTooShort {
            min: MIN_FULL_NAME_LEN,
        });
    }
    if let Some(email) = &data.email {
        if !is_valid_email(email) {
            return Err(ResumeError::InvalidEmail(email.clone()));
        }
    }
    Ok(())
}

pub fn validate_education(education: &Education) -> Result<(), ResumeError> {
    if education.name.trim().is_empty() {
        return Err(ResumeError::EmptyName { kind: "Education" });
    }
    validate_year_range(&education.from_year, &education.to_year)
}

pub fn validate_experience(experience: &Experience) -> Result<(), ResumeError> {
    if experience.name.trim().is_empty() {
        return Err(ResumeError::EmptyName { kind: "Experience" });
    }
    validate_year_range(&experience.from_year, &experience.to_year)
}

pub fn validate_social_link(link: &SocialLink) -> Result<(), ResumeError> {
    if link.name.trim().is_empty() {
        return Err(ResumeError::EmptyName { kind: "SocialLink" });
    }
    Ok(())
}

pub fn validate_hobby(hobby: &Hobby) -> Result<(), ResumeError> {
    if hobby.hobby.trim().is_empty() {
        return Err(ResumeError::EmptyName { kind: "Hobby" });
    }
    Ok(())
}

/// Validates that both years are integers and `from < to`.
pub fn validate_year_range(from: &str, to: &str) -> Result<(), ResumeError> {
    let parse = |year: &str| {
        year.trim()
            .parse::<i32>()
            .map_err(|_| ResumeError::InvalidYear(year.to_string()))
    };
    let (from, to) = (parse(from)?, parse(to)?);
    if from >= to {
        return Err(ResumeError::InvalidYearRange { from, to });
    }
    Ok(())
}

/// Validates a whole aggregate. Nothing is written unless this passes.
pub fn validate_resume(resume: &Resume) -> Result<(), ResumeError> {
    validate_personal_data(&resume.personal_data)?;
    resume.educations.iter().try_for_each(validate_education)?;
    resume.experiences.iter().try_for_each(validate_experience)?;
    resume.social_links.iter().try_for_each(validate_social_link)?;
    resume.hobbies.iter().try_for_each(validate_hobby)?;
    Ok(())
}

/// Checks that an address has exactly one `@` with non-empty parts on both sides.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        _ => false,
    }
}

/// Case-insensitive substring test. `needle` must already be lowercase.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Trims and lowercases a query. Returns `None` for blank queries.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// True if the resume's full name contains the normalized filter.
pub fn matches_name_filter(resume: &Resume, filter: &str) -> bool {
    contains_ignore_case(&resume.personal_data.full_name, filter)
}

/// True if the normalized query appears in the full name, bio or position.
pub fn matches_search_query(data: &PersonalData, query: &str) -> bool {
    contains_ignore_case(&data.full_name, query)
        || data
            .bio
            .as_deref()
            .is_some_and(|bio| contains_ignore_case(bio, query))
        || data
            .position
            .as_deref()
            .is_some_and(|position| contains_ignore_case(position, query))
}
