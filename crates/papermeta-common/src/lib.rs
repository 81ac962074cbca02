//! papermeta-common — Shared error types and configuration used across all papermeta crates.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{LlmProvider, PapermetaConfig};
pub use error::{ApiError, PapermetaError, Result};
