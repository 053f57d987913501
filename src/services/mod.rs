// Service exports
pub mod github;
pub mod llm;
pub mod store;

pub use github::{GithubClient, GithubError};
pub use llm::{LlmClient, LlmError, TextGenerator};
pub use store::{StoreClient, StoreCollections, StoreError};
