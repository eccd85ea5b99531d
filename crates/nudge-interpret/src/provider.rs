//! The single runtime collaborator: a language-model backend.
//!
//! Concrete network clients live with the host; the interpreter only needs
//! [`Provider::generate_response`].

use async_trait::async_trait;
use nudge_core::value::{ToJson, Value};
use nudge_core::Result;
use serde::{Deserialize, Serialize};

/// Generation settings taken from a prompt's `constraints` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
    pub model: Option<String>,
}

impl Constraints {
    /// Unknown keys are ignored; a known key with the wrong type is a validation error.
    pub fn from_value(value: Option<&Value>) -> Result<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => value.to_value(),
        }
    }
}

#[async_trait]
pub trait Provider: Send + Sync {
    async fn generate_response(&self, prompt: &str, constraints: &Constraints)
        -> eyre::Result<String>;

    fn name(&self) -> &str {
        "provider"
    }
}

/// Returns the prompt unchanged. Used for dry runs where no backend is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoProvider;

#[async_trait]
impl Provider for EchoProvider {
    async fn generate_response(
        &self,
        prompt: &str,
        _constraints: &Constraints,
    ) -> eyre::Result<String> {
        Ok(prompt.to_owned())
    }

    fn name(&self) -> &str {
        "echo"
    }
}
