use std::result;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every failure aborts the prompt being executed; nothing partial is returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("missing required parameter: {0}")]
    MissingParameter(String),
    #[error("type mismatch in {context}: {message}")]
    TypeMismatch { context: String, message: String },
    #[error("arithmetic error in '{op}': {message}")]
    Arithmetic { op: String, message: String },
    #[error("unresolved prompt reference: {0}")]
    UnresolvedPromptReference(String),
    #[error("unresolved identifier: {0}")]
    UnresolvedIdentifier(String),
    #[error("value is not callable: {0}")]
    NotCallable(String),
    #[error("unknown {technique} strategy: {strategy}")]
    UnknownStrategy { technique: String, strategy: String },
    #[error("{what} exceeded the limit of {limit}")]
    DepthExceeded { what: String, limit: usize },
    #[error("provider call failed: {0}")]
    ProviderFailed(#[source] BoxError),
    #[error("output format error: {0}")]
    OutputFormat(#[source] serde_json::Error),
}

impl Error {
    pub fn type_mismatch(context: impl Into<String>, message: impl Into<String>) -> Self {
        Error::TypeMismatch {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn unknown_strategy(technique: impl Into<String>, strategy: impl Into<String>) -> Self {
        Error::UnknownStrategy {
            technique: technique.into(),
            strategy: strategy.into(),
        }
    }

    pub fn depth_exceeded(what: impl Into<String>, limit: usize) -> Self {
        Error::DepthExceeded {
            what: what.into(),
            limit,
        }
    }

    pub fn provider_failed(report: eyre::Report) -> Self {
        Error::ProviderFailed(report.into())
    }

    /// Stable discriminant for hosts that map failures to exit codes or telemetry.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::MissingParameter(_) => "missing_parameter",
            Error::TypeMismatch { .. } => "type_mismatch",
            Error::Arithmetic { .. } => "arithmetic",
            Error::UnresolvedPromptReference(_) => "unresolved_prompt_reference",
            Error::UnresolvedIdentifier(_) => "unresolved_identifier",
            Error::NotCallable(_) => "not_callable",
            Error::UnknownStrategy { .. } => "unknown_strategy",
            Error::DepthExceeded { .. } => "depth_exceeded",
            Error::ProviderFailed(_) => "provider_failed",
            Error::OutputFormat(_) => "output_format",
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

impl From<strum::ParseError> for Error {
    fn from(e: strum::ParseError) -> Self {
        Error::Validation(e.to_string())
    }
}
