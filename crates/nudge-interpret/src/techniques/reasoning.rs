use nudge_core::ast::{
    CotStep, FewShotExample, ReActBlocks, ReWooBlocks, TechniqueFields, TechniqueKind,
};
use nudge_core::error::Error;
use nudge_core::value::Value;
use nudge_core::Result;

use super::constraints;
use crate::engine::{slots, CallScope, Environment, PromptInterpreter};
use crate::interp_ensure;

impl PromptInterpreter {
    pub(super) async fn apply_chain_of_thought(
        &self,
        steps: &[CotStep],
        env: &mut Environment,
        scope: CallScope<'_>,
    ) -> Result<Value> {
        let mut rendered = Vec::with_capacity(steps.len());
        for step in steps {
            let mut step_env = env.child();
            let text = self.execute_block(&step.block, &mut step_env, scope).await?;
            rendered.push(Value::string(format!("Step: {}\n{}", step.name, text)));
        }
        let steps = Value::Array(rendered);
        env.set_slot(slots::CHAIN_OF_THOUGHT, steps.clone());
        Ok(steps)
    }

    pub(super) async fn apply_few_shot(
        &self,
        examples: &[FewShotExample],
        env: &mut Environment,
        scope: CallScope<'_>,
    ) -> Result<Value> {
        let mut pairs = Vec::with_capacity(examples.len());
        for example in examples {
            let input = self
                .execute_block(&example.input, &mut env.child(), scope)
                .await?;
            let output = self
                .execute_block(&example.output, &mut env.child(), scope)
                .await?;
            pairs.push(Value::object([
                ("input", Value::string(input)),
                ("output", Value::string(output)),
            ]));
        }
        let pairs = Value::Array(pairs);
        env.set_slot(slots::EXAMPLES, pairs.clone());
        Ok(pairs)
    }

    pub(super) fn apply_zero_shot(
        &self,
        fields: &TechniqueFields,
        env: &mut Environment,
    ) -> Result<Value> {
        let instruction = self
            .fields(TechniqueKind::ZeroShot, fields, env)
            .text("instruction")?;
        let instruction = Value::string(instruction);
        env.set_slot(slots::INSTRUCTION, instruction.clone());
        Ok(instruction)
    }

    pub(super) async fn apply_rewoo(
        &self,
        blocks: &ReWooBlocks,
        env: &mut Environment,
        scope: CallScope<'_>,
    ) -> Result<Value> {
        let plan = Value::string(
            self.execute_block(&blocks.planner, &mut env.child(), scope)
                .await?,
        );
        let mut worker_env = env.extend("plan", plan.clone());
        let work = Value::string(
            self.execute_block(&blocks.worker, &mut worker_env, scope)
                .await?,
        );
        let mut solver_env = env.extend("plan", plan.clone());
        solver_env.bind("work", work.clone());
        let solution = Value::string(
            self.execute_block(&blocks.solver, &mut solver_env, scope)
                .await?,
        );
        Ok(Value::object([
            ("plan", plan),
            ("work", work),
            ("solution", solution),
        ]))
    }

    /// Observation, thought and action blocks repeat until an action mentions
    /// "finish" (any case). Each round sees the previous round's three values.
    pub(super) async fn apply_react(
        &self,
        blocks: &ReActBlocks,
        env: &mut Environment,
        scope: CallScope<'_>,
    ) -> Result<Value> {
        let limit = self.options().max_react_iterations;
        let mut base = env.child();
        let mut steps = Vec::new();
        for iteration in 0..limit {
            let observation = self
                .execute_block(&blocks.observation, &mut base.child(), scope)
                .await?;
            let mut thought_env = base.extend("observation", Value::string(&observation));
            let thought = self
                .execute_block(&blocks.thought, &mut thought_env, scope)
                .await?;
            let mut action_env = base.extend("observation", Value::string(&observation));
            action_env.bind("thought", Value::string(&thought));
            let action = self
                .execute_block(&blocks.action, &mut action_env, scope)
                .await?;

            tracing::debug!(
                target: "nudge-interpret",
                "reAct iteration {}: action '{}'",
                iteration + 1,
                action
            );
            let finished = action.to_lowercase().contains("finish");
            steps.push(Value::object([
                ("observation", Value::string(&observation)),
                ("thought", Value::string(&thought)),
                ("action", Value::string(&action)),
            ]));
            if finished {
                return Ok(Value::Array(steps));
            }
            base.bind("observation", Value::string(observation));
            base.bind("thought", Value::string(thought));
            base.bind("action", Value::string(action));
        }
        Err(Error::depth_exceeded("reAct iterations", limit))
    }

    pub(super) async fn apply_reflection(
        &self,
        fields: &TechniqueFields,
        env: &mut Environment,
    ) -> Result<Value> {
        let reader = self.fields(TechniqueKind::Reflection, fields, env);
        let prompt = reader.text("reflectionPrompt")?;
        let buffer = reader.text("memoryBuffer")?;
        interp_ensure!(
            !slots::is_reserved(&buffer),
            "reflection memoryBuffer '{}' is a reserved slot",
            buffer
        );
        let constraints = constraints(env)?;

        let reflection = Value::string(self.generate(&prompt, &constraints).await?);
        env.set_slot(&buffer, reflection.clone());
        Ok(reflection)
    }

    pub(super) fn apply_expert_prompting(
        &self,
        fields: &TechniqueFields,
        env: &Environment,
    ) -> Result<Value> {
        let reader = self.fields(TechniqueKind::ExpertPrompting, fields, env);
        Ok(Value::object([
            ("identity", Value::string(reader.text("expertIdentity")?)),
            ("description", Value::string(reader.text("expertDescription")?)),
        ]))
    }
}
