//! Secret lookup for model API keys
//!
//! - `SecretStore` trait for pluggable lookups
//! - `EnvSecretStore`: environment variables (and whatever `.env` loaded into them)
//! - `MemorySecretStore`: in-memory, for tests and embedders

mod traits;
mod env_store;
mod memory_store;

pub use traits::SecretStore;
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
