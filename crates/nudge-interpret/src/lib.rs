//! NudgeLang Interpreter
//!
//! Executes prompt programs produced by a NudgeLang front-end: evaluates expressions,
//! runs sections and statements, applies reasoning techniques and drives the model
//! provider.

pub mod engine;
pub mod error;
pub mod provider;
pub mod techniques;

pub use engine::{
    Environment, Evaluator, ExecutionOutcome, InterpreterOptions, PromptInterpreter, ScopeKind,
    TechniqueResult,
};
pub use provider::{Constraints, EchoProvider, Provider};
pub use techniques::{Annotator, PlaceholderAnnotator};
