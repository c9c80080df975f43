//! News classification schemas and text sanitization.

mod error;
pub mod sanitize;
pub mod schema;

pub use error::SchemaError;
pub use sanitize::{remove_soft_hyphens, strip_soft_hyphens, SOFT_HYPHEN};
pub use schema::{
    json_schema, response_format, Audience, Clickbait, ClusterInfo, Entity, NewsItem, Sentiment,
    Severity, Topic,
};
