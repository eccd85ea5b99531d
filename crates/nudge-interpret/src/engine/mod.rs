//! Prompt execution engine.
//!
//! A [`PromptInterpreter`] owns the provider handle and a shared
//! [`PromptRegistry`]; each execution builds a private [`Environment`] and runs
//! the prompt's sections in canonical order before composing the final text and
//! making the provider call.

mod blocks;
mod compose;
mod env;
mod eval_expr;
mod hooks;
mod operators;
mod output;
mod sections;

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use nudge_core::ast::{Program, Prompt};
use nudge_core::config;
use nudge_core::error::Error;
use nudge_core::value::{Value, ValueObject};
use nudge_core::{PromptRegistry, Result};

pub use compose::compose_prompt;
pub use env::{slots, Environment, ScopeKind};
pub use eval_expr::Evaluator;
pub use output::post_process_output;

use crate::interp_bail;
use crate::provider::{Constraints, Provider};
use crate::techniques::{Annotator, PlaceholderAnnotator};

#[derive(Debug, Clone)]
pub struct InterpreterOptions {
    /// Nesting limit for `use` statements.
    pub max_use_depth: usize,
    /// Iteration cap for ReAct loops.
    pub max_react_iterations: usize,
    /// Nesting limit for hook calls.
    pub max_hook_depth: usize,
    /// Provider calls a single technique may have in flight.
    pub max_concurrent_calls: usize,
    /// Ceiling on the provider calls one technique may plan.
    pub max_technique_calls: usize,
    /// Unresolved identifiers fail instead of evaluating to Null.
    pub strict_identifiers: bool,
    pub resolution_order: Vec<ScopeKind>,
    /// Seed for the `random` selection strategies; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_use_depth: config::max_use_depth(),
            max_react_iterations: config::max_react_iterations(),
            max_hook_depth: config::max_hook_depth(),
            max_concurrent_calls: config::max_concurrent_calls(),
            max_technique_calls: config::max_technique_calls(),
            strict_identifiers: config::strict_identifiers(),
            resolution_order: ScopeKind::default_order(),
            seed: None,
        }
    }
}

/// Result of one applied technique, in application order.
#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueResult {
    pub kind: String,
    pub result: Value,
}

impl TechniqueResult {
    pub fn to_value(&self) -> Value {
        Value::object([
            ("kind", Value::string(self.kind.clone())),
            ("result", self.result.clone()),
        ])
    }
}

/// Everything one prompt execution produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub prompt_name: String,
    /// Text sent to the provider.
    pub prompt: String,
    /// Accumulated body text.
    pub body: String,
    /// Raw provider response before hooks and output formatting.
    pub response: String,
    pub output: Value,
    pub techniques: Vec<TechniqueResult>,
}

/// Where a prompt is being executed from: its program (for local `use` lookups)
/// and how deeply `use` statements are nested.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CallScope<'a> {
    pub program: &'a Program,
    pub depth: usize,
}

impl<'a> CallScope<'a> {
    fn root(program: &'a Program) -> Self {
        Self { program, depth: 0 }
    }

    fn nested(self) -> Self {
        Self {
            program: self.program,
            depth: self.depth + 1,
        }
    }
}

pub struct PromptInterpreter {
    registry: Arc<PromptRegistry>,
    provider: Arc<dyn Provider>,
    annotator: Arc<dyn Annotator>,
    options: InterpreterOptions,
}

impl PromptInterpreter {
    pub fn new(provider: Arc<dyn Provider>, registry: Arc<PromptRegistry>) -> Self {
        Self {
            registry,
            provider,
            annotator: Arc::new(PlaceholderAnnotator),
            options: InterpreterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: InterpreterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_annotator(mut self, annotator: Arc<dyn Annotator>) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    pub fn registry(&self) -> &Arc<PromptRegistry> {
        &self.registry
    }

    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.options)
    }

    /// Registers the first prompt of `program` under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, program: &Program) -> Result<()> {
        self.registry.register(name, program)
    }

    pub fn register_prompt(&self, prompt: Prompt) {
        self.registry.register_prompt(prompt)
    }

    /// Runs the first prompt of `program` and returns its (possibly parsed) output.
    pub async fn execute(&self, program: &Program, params: ValueObject) -> Result<Value> {
        Ok(self.execute_with_outcome(program, params).await?.output)
    }

    pub async fn execute_with_outcome(
        &self,
        program: &Program,
        params: ValueObject,
    ) -> Result<ExecutionOutcome> {
        let Some(entry) = program.entry() else {
            interp_bail!("program contains no prompts");
        };
        self.run_prompt(entry, params, CallScope::root(program)).await
    }

    /// Looks a prompt up by name: the executing program first, then the registry.
    fn lookup_prompt(&self, name: &str, scope: CallScope<'_>) -> Result<Arc<Prompt>> {
        if let Some(prompt) = scope.program.prompt(name) {
            return Ok(Arc::new(prompt.clone()));
        }
        self.registry
            .get(name)
            .ok_or_else(|| Error::UnresolvedPromptReference(name.to_string()))
    }

    pub(crate) fn run_prompt<'a>(
        &'a self,
        prompt: &'a Prompt,
        params: ValueObject,
        scope: CallScope<'a>,
    ) -> BoxFuture<'a, Result<ExecutionOutcome>> {
        async move {
            tracing::info!(
                target: "nudge-interpret",
                "executing prompt '{}' (use depth {})",
                prompt.name,
                scope.depth
            );
            let mut env = Environment::with_params(params);
            let (body, techniques) = self.run_sections(prompt, &mut env, scope).await?;

            let composed = compose_prompt(&env, &body);
            let constraints = Constraints::from_value(env.slot(slots::CONSTRAINTS))?;
            let response = self.generate(&composed, &constraints).await?;

            let mut output = Value::string(response.clone());
            if let Some(Value::Function(post_process)) =
                env.slot_member(slots::HOOKS, "postProcess")
            {
                output = self
                    .evaluator()
                    .call_function(&post_process, vec![output], 1)?;
            }
            let output = post_process_output(output, env.slot(slots::OUTPUT))?;

            Ok(ExecutionOutcome {
                prompt_name: prompt.name.clone(),
                prompt: composed,
                body,
                response,
                output,
                techniques,
            })
        }
        .boxed()
    }

    /// One provider call.
    pub(crate) async fn generate(&self, prompt: &str, constraints: &Constraints) -> Result<String> {
        tracing::debug!(
            target: "nudge-interpret",
            "dispatching 1 call to provider '{}'",
            self.provider.name()
        );
        self.provider
            .generate_response(prompt, constraints)
            .await
            .map_err(Error::provider_failed)
    }

    /// Independent provider calls, at most `max_concurrent_calls` in flight. Results
    /// come back in submission order whatever order they complete in.
    pub(crate) async fn generate_all(
        &self,
        prompts: &[String],
        constraints: &Constraints,
    ) -> Result<Vec<String>> {
        tracing::debug!(
            target: "nudge-interpret",
            "dispatching {} calls to provider '{}'",
            prompts.len(),
            self.provider.name()
        );
        let calls: Vec<_> = prompts
            .iter()
            .map(|prompt| self.provider.generate_response(prompt, constraints))
            .collect();
        stream::iter(calls)
            .buffered(self.options.max_concurrent_calls.max(1))
            .map_err(Error::provider_failed)
            .try_collect()
            .await
    }

    pub(crate) fn annotator(&self) -> &dyn Annotator {
        self.annotator.as_ref()
    }
}
