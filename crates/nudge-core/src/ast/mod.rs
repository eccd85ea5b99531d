//! AST are trees, so Box<T> is fine
//!
//! The front-end (grammar + parse-tree transcription) lives outside this crate and
//! hands a well-formed [`Program`] to the interpreter. Every node is serde-serializable
//! so front-ends in other processes can ship the tree as JSON.

mod expr;
mod prompt;
mod section;
mod stmt;
mod technique;

pub use expr::*;
pub use prompt::*;
pub use section::*;
pub use stmt::*;
pub use technique::*;

pub type Ident = String;
