//! Selection, scoring and clustering algorithms behind the technique kinds.
//! None of these talk to the provider.

use std::collections::HashSet;

use indexmap::IndexMap;
use itertools::Itertools;
use nudge_core::error::Error;
use nudge_core::value::{Value, ValueObject};
use nudge_core::Result;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::interp_ensure;

/// Words that make a thought or candidate look substantive.
pub const SALIENT_KEYWORDS: [&str; 4] = ["important", "crucial", "significant", "key"];

/// At most this many questions are annotated by active prompting.
pub const MAX_SELECTED_QUESTIONS: usize = 5;

/// Index of the first maximum; later equal scores never replace an earlier one.
pub fn first_max_index(scores: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, score) in scores.iter().copied().enumerate() {
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

pub fn keyword_score(text: &str) -> usize {
    let lower = text.to_lowercase();
    SALIENT_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .count()
}

/// Local candidate scorer, or None when the function has to be delegated.
pub fn local_score(text: &str, function: &str) -> Option<f64> {
    match function {
        "length" => Some(text.chars().count() as f64),
        "keyword_match" => Some(keyword_score(text) as f64),
        _ => None,
    }
}

/// Self-consistency aggregation over responses in submission order.
pub fn select_most_consistent(results: &[Value], strategy: &str) -> Result<Value> {
    match strategy {
        "majority_vote" => {
            interp_ensure!(!results.is_empty(), "majority_vote needs at least one result");
            let mut tally: Vec<(&Value, usize)> = Vec::new();
            for result in results {
                match tally.iter().position(|(seen, _)| *seen == result) {
                    Some(index) => tally[index].1 += 1,
                    None => tally.push((result, 1)),
                }
            }
            let counts: Vec<f64> = tally.iter().map(|(_, count)| *count as f64).collect();
            let winner = first_max_index(&counts).unwrap_or(0);
            Ok(tally[winner].0.clone())
        }
        "average" => {
            interp_ensure!(!results.is_empty(), "average needs at least one result");
            let mut sum = 0.0;
            for (index, result) in results.iter().enumerate() {
                sum += numeric(result).ok_or_else(|| {
                    Error::type_mismatch(
                        "selfConsistency average",
                        format!("result {} is not numeric: {}", index, result),
                    )
                })?;
            }
            Ok(Value::number(sum / results.len() as f64))
        }
        other => Err(Error::unknown_strategy("selfConsistency selection", other)),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Provider calls a thought tree expands into: breadth + breadth^2 + ... + breadth^depth.
/// None when the count does not fit in a usize.
pub fn tree_size(breadth: usize, depth: usize) -> Option<usize> {
    let mut total: usize = 0;
    for level in 1..=depth {
        let level = u32::try_from(level).ok()?;
        total = total.checked_add(breadth.checked_pow(level)?)?;
    }
    Some(total)
}

/// Picks the winning leaf of a thought tree.
pub fn evaluate_thoughts(thoughts: &[String], strategy: &str) -> Result<String> {
    let scores: Vec<f64> = match strategy {
        "length" => thoughts.iter().map(|t| t.chars().count() as f64).collect(),
        "keyword_match" => thoughts.iter().map(|t| keyword_score(t) as f64).collect(),
        other => return Err(Error::unknown_strategy("treeOfThoughts evaluation", other)),
    };
    match first_max_index(&scores) {
        Some(index) => Ok(thoughts[index].clone()),
        None => Err(Error::Validation("no thoughts to evaluate".to_string())),
    }
}

pub fn estimate_uncertainty(text: &str, method: &str) -> Result<f64> {
    match method {
        "entropy" => {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if tokens.is_empty() {
                return Ok(0.0);
            }
            let unique = tokens.iter().collect::<HashSet<_>>().len() as f64;
            let ratio = unique / tokens.len() as f64;
            Ok(-ratio * ratio.log2())
        }
        "length" => Ok(text.chars().count() as f64),
        other => Err(Error::unknown_strategy("activePrompting uncertainty estimation", other)),
    }
}

/// Splits text into sentence-like segments, keeping the terminating punctuation.
/// Label lines such as `Task:` are skipped.
pub fn split_questions(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch != '\n' {
            current.push(ch);
        }
        if matches!(ch, '?' | '.' | '!' | '\n') {
            push_segment(&mut segments, &current);
            current.clear();
        }
    }
    push_segment(&mut segments, &current);
    segments
}

fn push_segment(segments: &mut Vec<String>, raw: &str) {
    let segment = raw.trim();
    if !segment.is_empty() && !segment.ends_with(':') {
        segments.push(segment.to_string());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredQuestion {
    pub text: String,
    pub uncertainty: f64,
}

pub fn select_questions<R: Rng + ?Sized>(
    mut questions: Vec<ScoredQuestion>,
    strategy: &str,
    rng: &mut R,
) -> Result<Vec<ScoredQuestion>> {
    match strategy {
        "max_uncertainty" => {
            // stable: equal scores keep document order
            questions.sort_by(|a, b| b.uncertainty.total_cmp(&a.uncertainty));
        }
        "random" => questions.shuffle(rng),
        other => return Err(Error::unknown_strategy("activePrompting selection", other)),
    }
    questions.truncate(MAX_SELECTED_QUESTIONS);
    Ok(questions)
}

pub type Clusters = IndexMap<String, Vec<String>>;

pub fn cluster_questions(text: &str, method: &str) -> Result<Clusters> {
    let questions = split_questions(text);
    let mut clusters = Clusters::new();
    match method {
        "keyword" => {
            for question in &questions {
                let words = question
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|word| word.chars().count() >= 4)
                    .map(str::to_lowercase)
                    .unique();
                for word in words {
                    clusters.entry(word).or_default().push(question.clone());
                }
            }
        }
        "length" => {
            if questions.is_empty() {
                return Ok(clusters);
            }
            let lengths: Vec<usize> = questions.iter().map(|q| q.chars().count()).collect();
            let mean = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
            for (question, length) in questions.iter().zip(lengths) {
                let bucket = if length as f64 <= mean { "short" } else { "long" };
                clusters
                    .entry(bucket.to_string())
                    .or_default()
                    .push(question.clone());
            }
        }
        other => return Err(Error::unknown_strategy("autoCot clustering", other)),
    }
    Ok(clusters)
}

/// One representative per cluster, duplicates removed in first-seen order.
pub fn select_representatives<R: Rng + ?Sized>(
    clusters: &Clusters,
    strategy: &str,
    rng: &mut R,
) -> Result<Vec<String>> {
    let mut picked = Vec::with_capacity(clusters.len());
    for members in clusters.values() {
        let choice = match strategy {
            "longest" => {
                let lengths: Vec<f64> = members.iter().map(|m| m.chars().count() as f64).collect();
                first_max_index(&lengths).map(|index| &members[index])
            }
            "random" => members.choose(rng),
            other => {
                return Err(Error::unknown_strategy(
                    "autoCot representative selection",
                    other,
                ))
            }
        };
        if let Some(choice) = choice {
            picked.push(choice.clone());
        }
    }
    Ok(picked.into_iter().unique().collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCategory {
    Math,
    Writing,
    Analysis,
    Default,
}

impl TaskCategory {
    pub fn name(self) -> &'static str {
        match self {
            TaskCategory::Math => "math",
            TaskCategory::Writing => "writing",
            TaskCategory::Analysis => "analysis",
            TaskCategory::Default => "default",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            TaskCategory::Math => &[
                "calculate",
                "compute",
                "solve",
                "equation",
                "math",
                "mathematics",
                "mathematical",
                "area",
                "sum",
                "number",
            ],
            TaskCategory::Writing => &[
                "write", "essay", "story", "poem", "draft", "compose", "article",
            ],
            TaskCategory::Analysis => &[
                "analyze", "analyse", "evaluate", "compare", "assess", "impact", "trend",
            ],
            TaskCategory::Default => &[],
        }
    }

    /// Tool library keys associated with the category.
    pub fn tools(self) -> &'static [&'static str] {
        match self {
            TaskCategory::Math => &["calculator", "graphing_tool"],
            TaskCategory::Writing => &["thesaurus", "grammar_checker"],
            TaskCategory::Analysis => &["data_visualizer", "statistical_tool"],
            TaskCategory::Default => &[],
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "math" => TaskCategory::Math,
            "writing" => TaskCategory::Writing,
            "analysis" => TaskCategory::Analysis,
            _ => TaskCategory::Default,
        }
    }
}

/// First category (math, writing, analysis) with a keyword among the prompt's
/// words; inflected forms such as "calculating" or "numbers" count, words that
/// merely start with a keyword ("summer") do not.
pub fn classify_task(prompt: &str) -> TaskCategory {
    let words: Vec<String> = prompt
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect();
    [
        TaskCategory::Math,
        TaskCategory::Writing,
        TaskCategory::Analysis,
    ]
    .into_iter()
    .find(|category| {
        category
            .keywords()
            .iter()
            .any(|keyword| words.iter().any(|word| matches_keyword(word, keyword)))
    })
    .unwrap_or(TaskCategory::Default)
}

/// Endings that inflect a keyword without changing its meaning.
const INFLECTIONS: [&str; 16] = [
    "s", "es", "d", "ed", "ing", "er", "ers", "ion", "ions", "ation", "ations", "al", "ally",
    "ly", "ment", "ments",
];

fn matches_keyword(word: &str, keyword: &str) -> bool {
    if word == keyword {
        return true;
    }
    let stem = keyword.strip_suffix('e').unwrap_or(keyword);
    word.strip_prefix(stem)
        .is_some_and(|ending| INFLECTIONS.contains(&ending))
}

/// The library entry for the prompt's category, falling back to `default`.
pub fn select_task(library: &ValueObject, prompt: &str) -> (TaskCategory, Option<String>) {
    let category = classify_task(prompt);
    let task = library
        .get(category.name())
        .or_else(|| library.get(TaskCategory::Default.name()))
        .map(Value::to_text);
    (category, task)
}

pub fn select_tools(library: &ValueObject, category: TaskCategory) -> Vec<String> {
    category
        .tools()
        .iter()
        .filter_map(|tool| library.get(*tool))
        .map(Value::to_text)
        .collect()
}

pub fn decompose_task(task: &str, strategy: &str) -> Result<Vec<String>> {
    let steps = match strategy {
        "sequential" => vec![
            format!("Understand the requirements of {}", task),
            format!("Gather the information needed for {}", task),
            format!("Apply the relevant methods to {}", task),
            format!("Review the results of {}", task),
            format!("Present the final outcome of {}", task),
        ],
        "parallel" => vec![
            format!("Analyze {} from a theoretical perspective", task),
            format!("Consider the practical implications of {}", task),
            format!("Identify potential challenges in {}", task),
            format!("Explore innovative approaches to {}", task),
            format!("Synthesize findings on {}", task),
        ],
        other => return Err(Error::unknown_strategy("art decomposition", other)),
    };
    Ok(steps)
}
