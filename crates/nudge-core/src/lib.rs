//! NudgeLang core
//!
//! Prompt-language AST, runtime values, the error taxonomy and the shared prompt
//! registry consumed by `nudge-interpret`.

#[macro_use]
pub mod macros;

pub mod ast;
pub mod collections;
pub mod config;
pub mod error;
pub mod ops;
pub mod registry;
pub mod value;

// Re-export commonly used items for convenience
pub use tracing;

pub use registry::PromptRegistry;
pub use value::{ToJson, Value, ValueFunction, ValueObject};

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
