//! Text embedders and the paced batch embedding generator.

pub mod azure;
pub mod batch;
pub mod config;
pub mod embed;
pub mod error;
pub mod openai;
pub(crate) mod openai_compat;

pub use azure::{AzureAuth, AzureOpenAI, TokenSource};
pub use batch::{
    generate, generate_with_pacer, BatchFailure, BatchOptions, EmbeddingResultMap, Pacer,
    TokioPacer,
};
pub use config::EmbedConfig;
pub use embed::{Embedder, EmbeddingRequest};
pub use error::EmbedError;
pub use openai::OpenAI;
