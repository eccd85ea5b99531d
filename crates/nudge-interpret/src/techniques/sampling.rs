use nudge_core::ast::{TechniqueFields, TechniqueKind};
use nudge_core::error::Error;
use nudge_core::value::Value;
use nudge_core::Result;

use super::strategies::{
    evaluate_thoughts, first_max_index, local_score, select_most_consistent, tree_size,
};
use super::{constraints, current_prompt, ensure_strategy};
use crate::engine::{Environment, PromptInterpreter};
use crate::interp_ensure;

impl PromptInterpreter {
    /// N independent completions of the current prompt, aggregated by the
    /// selection strategy.
    pub(super) async fn apply_self_consistency(
        &self,
        fields: &TechniqueFields,
        env: &Environment,
        body: &str,
    ) -> Result<Value> {
        let reader = self.fields(TechniqueKind::SelfConsistency, fields, env);
        let generations = reader.count("generations")?;
        let strategy = reader.text("selectionStrategy")?;
        ensure_strategy(
            "selfConsistency selection",
            &strategy,
            &["majority_vote", "average"],
        )?;

        let prompts = vec![current_prompt(env, body); generations];
        let responses = self.generate_all(&prompts, &constraints(env)?).await?;
        let responses: Vec<Value> = responses.into_iter().map(Value::string).collect();
        select_most_consistent(&responses, &strategy)
    }

    /// Expands `breadth` thoughts per node for `depth` levels and returns the
    /// best leaf.
    pub(super) async fn apply_tree_of_thoughts(
        &self,
        fields: &TechniqueFields,
        env: &Environment,
        body: &str,
    ) -> Result<Value> {
        let reader = self.fields(TechniqueKind::TreeOfThoughts, fields, env);
        let breadth = reader.count("breadth")?;
        let depth = reader.count("depth")?;
        let strategy = reader.text("evaluationStrategy")?;
        ensure_strategy(
            "treeOfThoughts evaluation",
            &strategy,
            &["length", "keyword_match"],
        )?;
        let limit = self.options().max_technique_calls;
        interp_ensure!(
            tree_size(breadth, depth).is_some_and(|calls| calls <= limit),
            "treeOfThoughts with breadth {} and depth {} needs more than {} provider calls",
            breadth,
            depth,
            limit
        );
        let constraints = constraints(env)?;

        let initial = vec![current_prompt(env, body); breadth];
        let mut thoughts = self.generate_all(&initial, &constraints).await?;
        let context = env.to_json().to_string();
        for level in 1..depth {
            let prompts: Vec<String> = thoughts
                .iter()
                .flat_map(|thought| {
                    let prompt = format!("{}\n\nExpand on this thought: {}", context, thought);
                    std::iter::repeat(prompt).take(breadth)
                })
                .collect();
            tracing::debug!(
                target: "nudge-interpret",
                "treeOfThoughts level {}: expanding {} thoughts into {}",
                level + 1,
                thoughts.len(),
                prompts.len()
            );
            thoughts = self.generate_all(&prompts, &constraints).await?;
        }
        Ok(Value::string(evaluate_thoughts(&thoughts, &strategy)?))
    }

    /// Automatic prompt engineering: sample candidates and keep the best-scoring one.
    pub(super) async fn apply_ape(
        &self,
        fields: &TechniqueFields,
        env: &Environment,
        body: &str,
    ) -> Result<Value> {
        let reader = self.fields(TechniqueKind::APE, fields, env);
        let pool = reader.count("candidatePool")?;
        let function = reader.text("scoreFunction")?;
        let constraints = constraints(env)?;

        let prompts = vec![current_prompt(env, body); pool];
        let candidates = self.generate_all(&prompts, &constraints).await?;
        let scores = match candidates
            .iter()
            .map(|candidate| local_score(candidate, &function))
            .collect::<Option<Vec<f64>>>()
        {
            Some(scores) => scores,
            None => self.score_remotely(&candidates, &function, &constraints).await?,
        };
        let best = first_max_index(&scores).unwrap_or(0);
        Ok(Value::string(candidates[best].clone()))
    }

    /// Score functions without a local implementation are evaluated by the provider.
    async fn score_remotely(
        &self,
        candidates: &[String],
        function: &str,
        constraints: &crate::provider::Constraints,
    ) -> Result<Vec<f64>> {
        let prompts: Vec<String> = candidates
            .iter()
            .map(|candidate| {
                format!(
                    "Score the following prompt using the '{}' criterion. \
                     Reply with a single number only.\n\n{}",
                    function, candidate
                )
            })
            .collect();
        let replies = self.generate_all(&prompts, constraints).await?;
        replies
            .iter()
            .map(|reply| {
                reply.trim().parse::<f64>().map_err(|_| {
                    Error::type_mismatch(
                        format!("ape score function '{}'", function),
                        format!("expected a numeric score, got {:?}", reply),
                    )
                })
            })
            .collect()
    }
}
