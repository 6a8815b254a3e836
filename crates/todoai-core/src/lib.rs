pub mod ai;
pub mod config;
pub mod credentials;
pub mod error;
pub mod state;
pub mod tasks;

// Re-export main types for convenience
pub use ai::{MistralClient, TaskGenerator};
pub use config::Config;
pub use credentials::{ConfigStore, CredentialStore, Credentials, KeySource, MemoryStore};
pub use error::GenerateError;
pub use state::{ChatMessage, ChatRole};
pub use tasks::{Task, TaskList};
