//! Azure AI Content Safety for the newsdesk pipeline.
//!
//! The main entry points are [`is_violent`] for a one-off check and
//! [`ViolenceClassifier`] for checking many texts with one client.

mod client;
mod error;
mod types;
mod violence;

pub use client::{ContentSafetyClient, Moderator, API_VERSION};
pub use error::{Error, Result};
pub use types::{
    AnalyzeTextOptions, AnalyzeTextResult, BlocklistMatch, CategoryAnalysis, OutputType,
    TextCategory,
};
pub use violence::{is_violent, ClassifierOptions, ViolenceClassifier, DEFAULT_THRESHOLD};
