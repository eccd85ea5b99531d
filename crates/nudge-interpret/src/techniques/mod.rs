//! Reasoning techniques.
//!
//! Each technique reads its settings from the environment, optionally calls the
//! provider, and yields a result value. Block-structured techniques (chain of
//! thought, few-shot, ReWOO, ReAct) run ordinary statement blocks; the rest are
//! driven by named fields.

mod active;
mod art;
mod reasoning;
mod sampling;
pub mod strategies;

use nudge_core::ast::{Technique, TechniqueFields, TechniqueKind};
use nudge_core::error::Error;
use nudge_core::value::{format_number, Value, ValueObject};
use nudge_core::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engine::{compose_prompt, slots, CallScope, Environment, Evaluator, PromptInterpreter};
use crate::{interp_bail, interp_ensure};
use crate::provider::Constraints;

/// Supplies annotations for `human_in_the_loop` active prompting.
pub trait Annotator: Send + Sync {
    fn annotate(&self, question: &str) -> eyre::Result<String>;
}

/// Stands in for a human reviewer until the host plugs one in.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderAnnotator;

impl Annotator for PlaceholderAnnotator {
    fn annotate(&self, question: &str) -> eyre::Result<String> {
        tracing::info!(
            target: "nudge-interpret",
            "human annotation requested for: {}",
            question
        );
        Ok("Human annotation placeholder".to_string())
    }
}

impl PromptInterpreter {
    pub(crate) async fn apply_technique(
        &self,
        technique: &Technique,
        env: &mut Environment,
        body: &str,
        scope: CallScope<'_>,
    ) -> Result<Value> {
        tracing::info!(target: "nudge-interpret", "applying {} technique", technique.kind());
        match technique {
            Technique::ChainOfThought(steps) => self.apply_chain_of_thought(steps, env, scope).await,
            Technique::FewShot(examples) => self.apply_few_shot(examples, env, scope).await,
            Technique::ZeroShot(fields) => self.apply_zero_shot(fields, env),
            Technique::SelfConsistency(fields) => {
                self.apply_self_consistency(fields, env, body).await
            }
            Technique::TreeOfThoughts(fields) => {
                self.apply_tree_of_thoughts(fields, env, body).await
            }
            Technique::ActivePrompting(fields) => {
                self.apply_active_prompting(fields, env, body).await
            }
            Technique::ReWOO(blocks) => self.apply_rewoo(blocks, env, scope).await,
            Technique::ReAct(blocks) => self.apply_react(blocks, env, scope).await,
            Technique::Reflection(fields) => self.apply_reflection(fields, env).await,
            Technique::ExpertPrompting(fields) => self.apply_expert_prompting(fields, env),
            Technique::APE(fields) => self.apply_ape(fields, env, body).await,
            Technique::AutoCoT(fields) => self.apply_auto_cot(fields, env, body).await,
            Technique::ART(fields) => self.apply_art(fields, env, body).await,
        }
    }

    fn fields<'a>(
        &'a self,
        kind: TechniqueKind,
        fields: &'a TechniqueFields,
        env: &'a Environment,
    ) -> FieldReader<'a> {
        FieldReader {
            kind,
            fields,
            evaluator: self.evaluator(),
            env,
            limit: self.options().max_technique_calls,
        }
    }

    fn rng(&self) -> StdRng {
        match self.options().seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// The prompt as composed so far, handed to techniques that call the provider.
fn current_prompt(env: &Environment, body: &str) -> String {
    compose_prompt(env, body)
}

fn constraints(env: &Environment) -> Result<Constraints> {
    Constraints::from_value(env.slot(slots::CONSTRAINTS))
}

/// Rejects an unknown strategy name before any provider call is made.
fn ensure_strategy(what: &str, strategy: &str, known: &[&str]) -> Result<()> {
    if known.contains(&strategy) {
        Ok(())
    } else {
        Err(Error::unknown_strategy(what, strategy))
    }
}

/// Typed access to the `name: expr;` settings of a field-driven technique.
pub(crate) struct FieldReader<'a> {
    kind: TechniqueKind,
    fields: &'a TechniqueFields,
    evaluator: Evaluator<'a>,
    env: &'a Environment,
    limit: usize,
}

impl FieldReader<'_> {
    pub fn value(&self, name: &str) -> Result<Option<Value>> {
        self.fields
            .get(name)
            .map(|expr| self.evaluator.evaluate(expr, self.env))
            .transpose()
    }

    pub fn required(&self, name: &str) -> Result<Value> {
        match self.value(name)? {
            Some(value) => Ok(value),
            None => interp_bail!("{} technique requires field '{}'", self.kind, name),
        }
    }

    pub fn text(&self, name: &str) -> Result<String> {
        Ok(self.required(name)?.to_text())
    }

    /// A count such as `generations: 5` or `breadth: "3"`; must be an integer >= 1
    /// and at most `max_technique_calls`.
    pub fn count(&self, name: &str) -> Result<usize> {
        let value = self.required(name)?;
        let number = match &value {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(n) if n >= 1.0 && n.fract() == 0.0 => {
                interp_ensure!(
                    n <= self.limit as f64,
                    "{} field '{}' is {}, above the limit of {}",
                    self.kind,
                    name,
                    format_number(n),
                    self.limit
                );
                Ok(n as usize)
            }
            _ => Err(Error::type_mismatch(
                format!("{} field '{}'", self.kind, name),
                format!("expected an integer >= 1, found {}", value),
            )),
        }
    }

    pub fn object(&self, name: &str) -> Result<ValueObject> {
        match self.required(name)? {
            Value::Object(object) => Ok(object),
            other => Err(Error::type_mismatch(
                format!("{} field '{}'", self.kind, name),
                format!("expected object, found {}", other.type_name()),
            )),
        }
    }
}
