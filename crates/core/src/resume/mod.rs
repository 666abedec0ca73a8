mod child;
mod error;
mod operations;
mod types;

pub use child::ChildEntity;
pub use error::ResumeError;
pub use operations::{
    contains_ignore_case, is_valid_email, matches_name_filter, matches_search_query,
    normalize_query, validate_education, validate_experience, validate_hobby,
    validate_personal_data, validate_resume, validate_social_link, validate_year_range,
    MAX_QUERY_LEN, MIN_FULL_NAME_LEN,
};
pub use types::{Education, Experience, Hobby, PersonalData, Resume, SocialLink};
