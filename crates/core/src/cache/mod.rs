mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{collection_key, entity_key, kind_pattern, resume_key, template_key};
pub use patterns::pattern_matches;
pub use serialization::{deserialize_value, serialize_value, SerializationError};
pub use traits::Cache;
