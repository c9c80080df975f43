//! CLI commands module.

mod config;
mod embed;
mod safety;
mod sanitize;
mod schema;
mod secret;
mod util;

pub use config::ConfigCommand;
pub use embed::EmbedCommand;
pub use safety::SafetyCommand;
pub use sanitize::SanitizeCommand;
pub use schema::SchemaCommand;
pub use secret::SecretCommand;

pub(crate) use util::*;
