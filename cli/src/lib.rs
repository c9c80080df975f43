//! CLI utilities for newsdesk.
//!
//! This crate provides configuration, input loading and output helpers
//! for the `newsdesk` binary.

pub mod config;
pub mod output;
pub mod request;

pub use config::{Config, Context};
pub use output::{Output, OutputFormat};
pub use request::{load_records, load_request, Record, RequestError};
