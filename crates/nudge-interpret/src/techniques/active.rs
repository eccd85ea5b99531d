use nudge_core::ast::{TechniqueFields, TechniqueKind};
use nudge_core::error::Error;
use nudge_core::value::Value;
use nudge_core::Result;

use super::strategies::{
    cluster_questions, estimate_uncertainty, select_questions, select_representatives,
    split_questions, ScoredQuestion,
};
use super::{constraints, current_prompt, ensure_strategy};
use crate::engine::{Environment, PromptInterpreter};

impl PromptInterpreter {
    /// Scores each sentence of the current prompt for uncertainty, annotates the
    /// most useful ones and asks the provider again with the annotations attached.
    pub(super) async fn apply_active_prompting(
        &self,
        fields: &TechniqueFields,
        env: &Environment,
        body: &str,
    ) -> Result<Value> {
        let reader = self.fields(TechniqueKind::ActivePrompting, fields, env);
        let estimation = reader.text("uncertaintyEstimation")?;
        let selection = reader.text("selectionStrategy")?;
        let annotation = reader.text("annotationProcess")?;
        ensure_strategy(
            "activePrompting uncertainty estimation",
            &estimation,
            &["entropy", "length"],
        )?;
        ensure_strategy(
            "activePrompting selection",
            &selection,
            &["max_uncertainty", "random"],
        )?;
        ensure_strategy(
            "activePrompting annotation",
            &annotation,
            &["auto", "human_in_the_loop"],
        )?;
        let constraints = constraints(env)?;
        let prompt = current_prompt(env, body);

        let mut candidates = Vec::new();
        for text in split_questions(&prompt) {
            let uncertainty = estimate_uncertainty(&text, &estimation)?;
            candidates.push(ScoredQuestion { text, uncertainty });
        }
        let selected = select_questions(candidates, &selection, &mut self.rng())?;

        let annotations = if annotation == "auto" {
            let texts: Vec<String> = selected.iter().map(|q| q.text.clone()).collect();
            self.generate_all(&texts, &constraints).await?
        } else {
            selected
                .iter()
                .map(|q| self.annotator().annotate(&q.text))
                .collect::<eyre::Result<Vec<String>>>()
                .map_err(Error::provider_failed)?
        };

        let lines: Vec<String> = selected
            .iter()
            .zip(&annotations)
            .map(|(question, annotation)| format!("{}: {}", question.text, annotation))
            .collect();
        let followup = format!("{}\n\nAnnotated questions:\n{}\n", prompt, lines.join("\n"));
        let response = self.generate(&followup, &constraints).await?;

        let questions = selected
            .into_iter()
            .zip(annotations)
            .map(|(question, annotation)| {
                Value::object([
                    ("question", Value::string(question.text)),
                    ("uncertainty", Value::number(question.uncertainty)),
                    ("annotation", Value::string(annotation)),
                ])
            })
            .collect::<Vec<_>>();
        Ok(Value::object([
            ("questions", Value::Array(questions)),
            ("response", Value::string(response)),
        ]))
    }

    /// Clusters the prompt's questions, then asks for a chain of thought for one
    /// representative per cluster.
    pub(super) async fn apply_auto_cot(
        &self,
        fields: &TechniqueFields,
        env: &Environment,
        body: &str,
    ) -> Result<Value> {
        let reader = self.fields(TechniqueKind::AutoCoT, fields, env);
        let method = reader.text("clusteringMethod")?;
        let selection = reader.text("representativeSelection")?;
        ensure_strategy("autoCot clustering", &method, &["keyword", "length"])?;
        ensure_strategy(
            "autoCot representative selection",
            &selection,
            &["longest", "random"],
        )?;
        let constraints = constraints(env)?;

        let clusters = cluster_questions(&current_prompt(env, body), &method)?;
        let representatives = select_representatives(&clusters, &selection, &mut self.rng())?;
        let prompts: Vec<String> = representatives
            .iter()
            .map(|question| format!("Generate a chain of thought for: {}", question))
            .collect();
        let chains = self.generate_all(&prompts, &constraints).await?;

        Ok(Value::array(representatives.into_iter().zip(chains).map(
            |(question, chain)| {
                Value::object([
                    ("question", Value::string(question)),
                    ("chain", Value::string(chain)),
                ])
            },
        )))
    }
}
