//! Azure plumbing for the newsdesk pipeline.
//!
//! - [`credential`]: Entra ID token credentials and the default chain
//! - [`token_provider`]: cached bearer tokens per scope
//! - [`keyvault`]: Key Vault secrets with environment fallback
//! - [`openai`]: Azure OpenAI client construction

pub mod credential;
pub mod env;
mod error;
pub mod http;
pub mod keyvault;
pub mod openai;
pub mod token_provider;

pub use credential::{
    default_credential, AccessToken, AzureCliCredential, ClientSecretCredential,
    DefaultAzureCredential, StaticTokenCredential, TokenCredential,
};
pub use error::{Error, Result};
pub use keyvault::{SecretClient, SecretStore, Secrets};
pub use openai::{create_azure_client, AzureClientOptions};
pub use token_provider::{
    cognitive_services_token_provider, get_bearer_token_provider, BearerTokenProvider,
};
