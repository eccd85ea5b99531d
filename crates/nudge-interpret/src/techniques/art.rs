use nudge_core::ast::{TechniqueFields, TechniqueKind};
use nudge_core::value::Value;
use nudge_core::Result;

use super::strategies::{decompose_task, select_task, select_tools};
use super::{constraints, current_prompt, ensure_strategy};
use crate::engine::{Environment, PromptInterpreter};
use crate::interp_bail;

impl PromptInterpreter {
    /// Automatic reasoning and tool-use: pick a task and its tools by category,
    /// decompose it and run one provider call per step.
    pub(super) async fn apply_art(
        &self,
        fields: &TechniqueFields,
        env: &Environment,
        body: &str,
    ) -> Result<Value> {
        let reader = self.fields(TechniqueKind::ART, fields, env);
        let task_library = reader.object("taskLibrary")?;
        let tool_library = reader.object("toolLibrary")?;
        let strategy = reader.text("decompositionStrategy")?;
        ensure_strategy("art decomposition", &strategy, &["sequential", "parallel"])?;
        let constraints = constraints(env)?;

        let (category, task) = select_task(&task_library, &current_prompt(env, body));
        let Some(task) = task else {
            interp_bail!(
                "art taskLibrary has no '{}' entry and no 'default' entry",
                category.name()
            );
        };
        let tools = select_tools(&tool_library, category);
        let steps = decompose_task(&task, &strategy)?;
        tracing::debug!(
            target: "nudge-interpret",
            "art selected {} task '{}' with {} tools",
            category.name(),
            task,
            tools.len()
        );
        let results = self.generate_all(&steps, &constraints).await?;

        Ok(Value::object([
            ("task", Value::string(task)),
            ("category", Value::string(category.name())),
            ("tools", Value::array(tools.into_iter().map(Value::string))),
            (
                "steps",
                Value::array(steps.into_iter().zip(results).map(|(step, result)| {
                    Value::object([
                        ("step", Value::string(step)),
                        ("result", Value::string(result)),
                    ])
                })),
            ),
        ]))
    }
}
