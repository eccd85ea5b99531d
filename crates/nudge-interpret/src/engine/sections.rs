use nudge_core::ast::{Field, ParamBase, ParamDeclaration, ParamType, Prompt, Section, SectionKind};
use nudge_core::error::Error;
use nudge_core::value::{Value, ValueFunction};
use nudge_core::Result;

use super::env::{slots, Environment};
use super::{CallScope, PromptInterpreter, TechniqueResult};

impl PromptInterpreter {
    /// Runs every section in canonical order (document order within a kind) and
    /// returns the accumulated body text with the applied technique results.
    pub(super) async fn run_sections(
        &self,
        prompt: &Prompt,
        env: &mut Environment,
        scope: CallScope<'_>,
    ) -> Result<(String, Vec<TechniqueResult>)> {
        let mut sections: Vec<&Section> = prompt.sections.iter().collect();
        sections.sort_by_key(|section| section.kind());

        let mut body = String::new();
        let mut techniques = Vec::new();
        let mut pre_processed = false;
        for section in sections {
            if !pre_processed && section.kind() > SectionKind::Params {
                self.run_pre_process(prompt, env)?;
                pre_processed = true;
            }
            tracing::debug!(
                target: "nudge-interpret",
                "prompt '{}': {} section",
                prompt.name,
                section.kind()
            );
            match section {
                Section::Meta(fields) => self.populate_slot(slots::META, fields, env)?,
                Section::Context(fields) => self.populate_slot(slots::CONTEXT, fields, env)?,
                Section::Params(declarations) => self.bind_params(declarations, env)?,
                Section::Body(block) => {
                    let text = self.execute_block(block, env, scope).await?;
                    body.push_str(&text);
                }
                Section::Constraints(fields) => {
                    self.populate_slot(slots::CONSTRAINTS, fields, env)?
                }
                Section::Output(fields) => self.populate_slot(slots::OUTPUT, fields, env)?,
                Section::Hooks(hooks) => {
                    for hook in hooks {
                        let function = ValueFunction::new(hook.clone());
                        env.set_slot_field(slots::HOOKS, &hook.name, Value::Function(function));
                    }
                }
                Section::Technique(list) => {
                    for technique in list {
                        let result = self.apply_technique(technique, env, &body, scope).await?;
                        let result = TechniqueResult {
                            kind: technique.kind().to_string(),
                            result,
                        };
                        env.push_slot_item(slots::TECHNIQUES, result.to_value());
                        techniques.push(result);
                    }
                }
            }
        }
        if !pre_processed {
            self.run_pre_process(prompt, env)?;
        }
        Ok((body, techniques))
    }

    fn populate_slot(&self, slot: &str, fields: &[Field], env: &mut Environment) -> Result<()> {
        let evaluator = self.evaluator();
        for field in fields {
            let value = evaluator.evaluate(&field.value, env)?;
            env.set_slot_field(slot, &field.name, value);
        }
        Ok(())
    }

    /// Fills defaults, rejects absent required parameters and checks declared types.
    /// Undeclared caller parameters are kept as they are.
    fn bind_params(&self, declarations: &[ParamDeclaration], env: &mut Environment) -> Result<()> {
        let evaluator = self.evaluator();
        let mut params = env.params();
        for declaration in declarations {
            let value = match params.get(&declaration.name) {
                Some(value) => value.clone(),
                None => match &declaration.default {
                    Some(default) => evaluator.evaluate(default, env)?,
                    None => return Err(Error::MissingParameter(declaration.name.clone())),
                },
            };
            if !type_matches(&declaration.ty, &value) {
                return Err(Error::type_mismatch(
                    format!("parameter '{}'", declaration.name),
                    format!("expected {}, found {}", declaration.ty, value.type_name()),
                ));
            }
            params.insert(declaration.name.clone(), value);
        }
        env.set_slot(slots::PARAMS, Value::Object(params));
        Ok(())
    }

    fn run_pre_process(&self, prompt: &Prompt, env: &mut Environment) -> Result<()> {
        let Some(hook) = prompt.hook("preProcess") else {
            return Ok(());
        };
        let function = ValueFunction::new(hook.clone());
        let params = Value::Object(env.params());
        match self.evaluator().call_function(&function, vec![params], 1)? {
            Value::Object(params) => env.set_slot(slots::PARAMS, Value::Object(params)),
            // finished without returning: params stay as they are
            Value::Null => {}
            other => {
                return Err(Error::type_mismatch(
                    "preProcess hook",
                    format!("must return an object, returned {}", other.type_name()),
                ))
            }
        }
        Ok(())
    }
}

fn type_matches(ty: &ParamType, value: &Value) -> bool {
    match value {
        Value::Null => ty.optional,
        Value::Array(items) if ty.array => items.iter().all(|item| base_matches(ty.base, item)),
        _ if ty.array => false,
        value => base_matches(ty.base, value),
    }
}

fn base_matches(base: ParamBase, value: &Value) -> bool {
    matches!(
        (base, value),
        (ParamBase::String, Value::String(_))
            | (ParamBase::Number, Value::Number(_))
            | (ParamBase::Boolean, Value::Boolean(_))
            | (ParamBase::Array, Value::Array(_))
            | (ParamBase::Object, Value::Object(_))
    )
}
