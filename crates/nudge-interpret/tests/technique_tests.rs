mod support;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use nudge_core::ast::{
    CotStep, Expr, FewShotExample, Field, HookDef, Program, Prompt, ReActBlocks, ReWooBlocks,
    Section, Stmt, Technique, TechniqueFields, Template,
};
use nudge_core::value::Value;
use nudge_interpret::{Annotator, ExecutionOutcome, InterpreterOptions, PromptInterpreter};
use pretty_assertions::assert_eq;
use support::{interpreter, no_params, staggered_interpreter, StaggeredProvider, TestProvider};

fn literal(s: &str) -> Stmt {
    Stmt::text(Template::literal(s))
}

fn with_techniques(body: &str, techniques: Vec<Technique>) -> Program {
    Program::from(Prompt::new(
        "Reasoning",
        vec![
            Section::Body(vec![literal(body)]),
            Section::Technique(techniques),
        ],
    ))
}

fn field_technique(kind: &str, fields: Vec<(&str, Expr)>) -> Technique {
    Technique::from_fields(kind, fields.into_iter().collect::<TechniqueFields>())
        .expect("field-driven technique")
}

async fn run(interpreter: &PromptInterpreter, program: &Program) -> ExecutionOutcome {
    interpreter
        .execute_with_outcome(program, no_params())
        .await
        .expect("execute")
}

fn first_result(outcome: &ExecutionOutcome) -> &Value {
    &outcome.techniques[0].result
}

#[tokio::test]
async fn chain_of_thought_steps_are_composed_before_the_task() {
    let program = with_techniques(
        "Solve 2x = 4.",
        vec![Technique::ChainOfThought(vec![
            CotStep {
                name: "Understand".to_string(),
                block: vec![literal("Restate the equation.")],
            },
            CotStep {
                name: "Solve".to_string(),
                block: vec![literal("Divide both sides by 2.")],
            },
        ])],
    );
    let provider = TestProvider::echo();
    let outcome = run(&interpreter(&provider), &program).await;

    assert_eq!(
        outcome.prompt,
        "Chain of Thought:\nStep: Understand\nRestate the equation.\nStep: Solve\nDivide both sides by 2.\n\nTask:\nSolve 2x = 4."
    );
    assert_eq!(outcome.techniques[0].kind, "chainOfThought");
}

#[tokio::test]
async fn few_shot_and_zero_shot_feed_the_composition() {
    let program = with_techniques(
        "Translate 'cat'.",
        vec![
            Technique::FewShot(vec![FewShotExample {
                input: vec![literal("dog")],
                output: vec![literal("chien")],
            }]),
            field_technique("zeroShot", vec![("instruction", Expr::string("Answer in French."))]),
        ],
    );
    let provider = TestProvider::echo();
    let outcome = run(&interpreter(&provider), &program).await;

    assert_eq!(
        outcome.prompt,
        "Examples:\nInput: dog\nOutput: chien\n\nInstruction:\nAnswer in French.\n\nTask:\nTranslate 'cat'."
    );
    let kinds: Vec<&str> = outcome.techniques.iter().map(|t| t.kind.as_str()).collect();
    assert_eq!(kinds, vec!["fewShot", "zeroShot"]);
}

#[tokio::test]
async fn self_consistency_majority_vote() {
    let program = with_techniques(
        "Pick a letter.",
        vec![field_technique(
            "selfConsistency",
            vec![
                ("generations", Expr::number(5.0)),
                ("selectionStrategy", Expr::string("majority_vote")),
            ],
        )],
    );
    let provider = TestProvider::scripted(&["A", "B", "A", "C", "A"]);
    let outcome = run(&interpreter(&provider), &program).await;

    assert_eq!(first_result(&outcome), &Value::string("A"));
    assert_eq!(provider.calls(), 6);
}

#[tokio::test]
async fn self_consistency_average() {
    let program = with_techniques(
        "Guess a number.",
        vec![field_technique(
            "selfConsistency",
            vec![
                ("generations", Expr::string("5")),
                ("selectionStrategy", Expr::string("average")),
            ],
        )],
    );
    let provider = TestProvider::scripted(&["1", "2", "3", "4", "5"]);
    let outcome = run(&interpreter(&provider), &program).await;
    assert_eq!(first_result(&outcome), &Value::number(3));
}

#[tokio::test]
async fn unknown_strategies_fail_before_calling_the_provider() {
    let program = with_techniques(
        "Pick.",
        vec![field_technique(
            "selfConsistency",
            vec![
                ("generations", Expr::number(3.0)),
                ("selectionStrategy", Expr::string("loudest")),
            ],
        )],
    );
    let provider = TestProvider::echo();
    let err = interpreter(&provider)
        .execute(&program, no_params())
        .await
        .expect_err("unknown strategy");
    assert_eq!(err.code(), "unknown_strategy");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn technique_fields_are_validated() {
    let provider = TestProvider::echo();
    let interpreter = interpreter(&provider);

    let missing = with_techniques(
        "Pick.",
        vec![field_technique("selfConsistency", vec![("generations", Expr::number(3.0))])],
    );
    let err = interpreter
        .execute(&missing, no_params())
        .await
        .expect_err("selectionStrategy missing");
    assert_eq!(err.code(), "validation");
    assert!(err.to_string().contains("selectionStrategy"), "{}", err);

    let zero = with_techniques(
        "Pick.",
        vec![field_technique(
            "selfConsistency",
            vec![
                ("generations", Expr::number(0.0)),
                ("selectionStrategy", Expr::string("majority_vote")),
            ],
        )],
    );
    let err = interpreter
        .execute(&zero, no_params())
        .await
        .expect_err("generations must be positive");
    assert_eq!(err.code(), "type_mismatch");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn tree_of_thoughts_expands_and_evaluates() {
    let program = with_techniques(
        "Plan a trip.",
        vec![field_technique(
            "treeOfThoughts",
            vec![
                ("breadth", Expr::number(2.0)),
                ("depth", Expr::number(2.0)),
                ("evaluationStrategy", Expr::string("keyword_match")),
            ],
        )],
    );
    let expansions = Arc::new(AtomicUsize::new(0));
    let counter = expansions.clone();
    let provider = TestProvider::new(move |prompt| {
        if prompt.contains("Expand on this thought: seed") {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok(if n == 2 {
                "a crucial and key idea".to_string()
            } else {
                "an idea".to_string()
            })
        } else {
            Ok("seed".to_string())
        }
    });
    let outcome = run(&interpreter(&provider), &program).await;

    assert_eq!(first_result(&outcome), &Value::string("a crucial and key idea"));
    // 2 initial thoughts, 4 expansions, 1 final call
    assert_eq!(provider.calls(), 7);
    assert_eq!(expansions.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn rewoo_threads_plan_and_work() {
    let program = with_techniques(
        "Research.",
        vec![Technique::ReWOO(ReWooBlocks {
            planner: vec![literal("search docs")],
            worker: vec![Stmt::text(
                Template::literal("did ").push_expr(Expr::ident("plan")),
            )],
            solver: vec![Stmt::text(
                Template::new(vec![])
                    .push_expr(Expr::ident("plan"))
                    .push_text(" -> ")
                    .push_expr(Expr::ident("work")),
            )],
        })],
    );
    let provider = TestProvider::echo();
    let outcome = run(&interpreter(&provider), &program).await;

    assert_eq!(
        first_result(&outcome),
        &Value::object([
            ("plan", Value::string("search docs")),
            ("work", Value::string("did search docs")),
            ("solution", Value::string("search docs -> did search docs")),
        ])
    );
    assert_eq!(provider.calls(), 1);
}

fn react(action: Vec<Stmt>) -> Program {
    with_techniques(
        "Find the answer.",
        vec![Technique::ReAct(ReActBlocks {
            observation: vec![literal("looked around")],
            thought: vec![Stmt::text(
                Template::literal("after ").push_expr(Expr::ident("observation")),
            )],
            action,
        })],
    )
}

#[tokio::test]
async fn react_stops_when_an_action_mentions_finish() {
    // first round: no previous action, so search; second round: Finish
    let program = react(vec![Stmt::if_else(
        Expr::ident("action"),
        vec![literal("Finish")],
        Some(vec![literal("search")]),
    )]);
    let provider = TestProvider::echo();
    let outcome = run(&interpreter(&provider), &program).await;

    let steps = first_result(&outcome).as_array().expect("steps");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].get_member("action"), Value::string("search"));
    assert_eq!(steps[0].get_member("thought"), Value::string("after looked around"));
    assert_eq!(steps[1].get_member("action"), Value::string("Finish"));
}

#[tokio::test]
async fn react_without_finish_is_capped() {
    let program = react(vec![literal("keep going")]);
    let provider = TestProvider::echo();
    let interpreter = interpreter(&provider).with_options(InterpreterOptions {
        max_react_iterations: 3,
        ..InterpreterOptions::default()
    });
    let err = interpreter
        .execute(&program, no_params())
        .await
        .expect_err("loop never finishes");
    assert_eq!(err.code(), "depth_exceeded");
    assert!(err.to_string().contains("limit of 3"), "{}", err);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn reflection_fills_a_memory_buffer() {
    let program = with_techniques(
        "Write a haiku.",
        vec![
            field_technique(
                "reflection",
                vec![
                    ("reflectionPrompt", Expr::string("What went wrong last time?")),
                    ("memoryBuffer", Expr::string("notes")),
                ],
            ),
            field_technique("zeroShot", vec![("instruction", Expr::ident("notes"))]),
        ],
    );
    let provider = TestProvider::new(|prompt| {
        Ok(if prompt == "What went wrong last time?" {
            "Too many syllables.".to_string()
        } else {
            prompt.to_string()
        })
    });
    let outcome = run(&interpreter(&provider), &program).await;

    assert_eq!(first_result(&outcome), &Value::string("Too many syllables."));
    assert_eq!(
        outcome.prompt,
        "Instruction:\nToo many syllables.\n\nTask:\nWrite a haiku."
    );
}

#[tokio::test]
async fn expert_prompting_interpolates_without_calls() {
    let program = Program::from(Prompt::new(
        "Expert",
        vec![
            Section::Meta(vec![Field::new("field", Expr::string("astronomy"))]),
            Section::Body(vec![literal("Why is the sky dark at night?")]),
            Section::Technique(vec![field_technique(
                "expertPrompting",
                vec![
                    ("expertIdentity", Expr::string("Astrophysicist")),
                    (
                        "expertDescription",
                        Expr::binary(
                            nudge_core::ops::BinOpKind::Add,
                            Expr::string("Specialist in "),
                            Expr::path("meta.field"),
                        ),
                    ),
                ],
            )]),
        ],
    ));
    let provider = TestProvider::echo();
    let outcome = run(&interpreter(&provider), &program).await;

    assert_eq!(
        first_result(&outcome),
        &Value::object([
            ("identity", Value::string("Astrophysicist")),
            ("description", Value::string("Specialist in astronomy")),
        ])
    );
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn ape_keeps_the_best_local_score() {
    let program = with_techniques(
        "Suggest a prompt.",
        vec![field_technique(
            "ape",
            vec![
                ("candidatePool", Expr::number(3.0)),
                ("scoreFunction", Expr::string("length")),
            ],
        )],
    );
    let provider = TestProvider::scripted(&["short", "the longest candidate", "mid one"]);
    let outcome = run(&interpreter(&provider), &program).await;
    assert_eq!(first_result(&outcome), &Value::string("the longest candidate"));
}

#[tokio::test]
async fn ape_delegates_unknown_score_functions() {
    let program = with_techniques(
        "Suggest a prompt.",
        vec![field_technique(
            "ape",
            vec![
                ("candidatePool", Expr::number(3.0)),
                ("scoreFunction", Expr::string("clarity")),
            ],
        )],
    );
    let candidates = Mutex::new(VecDeque::from(["alpha", "beta", "gamma"]));
    let provider = TestProvider::new(move |prompt| {
        if prompt.starts_with("Score") {
            return Ok(if prompt.ends_with("beta") { "9" } else { "2" }.to_string());
        }
        let next = candidates.lock().expect("candidates").pop_front();
        Ok(next.unwrap_or("final").to_string())
    });
    let outcome = run(&interpreter(&provider), &program).await;

    assert_eq!(first_result(&outcome), &Value::string("beta"));
    // 3 candidates, 3 scores, 1 final call
    assert_eq!(provider.calls(), 7);
}

#[tokio::test]
async fn active_prompting_annotates_uncertain_questions() {
    let program = with_techniques(
        "What is X? Why is Y?",
        vec![field_technique(
            "activePrompting",
            vec![
                ("uncertaintyEstimation", Expr::string("length")),
                ("selectionStrategy", Expr::string("max_uncertainty")),
                ("annotationProcess", Expr::string("auto")),
            ],
        )],
    );
    let provider = TestProvider::new(|prompt| {
        Ok(match prompt {
            "What is X?" => "X is a letter.".to_string(),
            "Why is Y?" => "Because.".to_string(),
            other => other.to_string(),
        })
    });
    let outcome = run(&interpreter(&provider), &program).await;

    let result = first_result(&outcome);
    let questions = result.get_member("questions");
    let questions = questions.as_array().expect("questions");
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].get_member("question"), Value::string("What is X?"));
    assert_eq!(questions[0].get_member("annotation"), Value::string("X is a letter."));
    assert_eq!(questions[1].get_member("question"), Value::string("Why is Y?"));
    assert_eq!(
        result.get_member("response"),
        Value::string(
            "Task:\nWhat is X? Why is Y?\n\nAnnotated questions:\nWhat is X?: X is a letter.\nWhy is Y?: Because.\n"
        )
    );
    // 2 annotations, 1 follow-up, 1 final call
    assert_eq!(provider.calls(), 4);
}

struct CountingAnnotator(AtomicUsize);

impl Annotator for CountingAnnotator {
    fn annotate(&self, question: &str) -> eyre::Result<String> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(format!("reviewed: {}", question))
    }
}

#[tokio::test]
async fn human_in_the_loop_uses_the_annotator() {
    let program = with_techniques(
        "Is it safe? Is it fast?",
        vec![field_technique(
            "activePrompting",
            vec![
                ("uncertaintyEstimation", Expr::string("entropy")),
                ("selectionStrategy", Expr::string("random")),
                ("annotationProcess", Expr::string("human_in_the_loop")),
            ],
        )],
    );
    let provider = TestProvider::echo();
    let annotator = Arc::new(CountingAnnotator(AtomicUsize::new(0)));
    let interpreter = interpreter(&provider)
        .with_annotator(annotator.clone())
        .with_options(InterpreterOptions {
            seed: Some(42),
            ..InterpreterOptions::default()
        });
    let outcome = run(&interpreter, &program).await;

    assert_eq!(annotator.0.load(Ordering::SeqCst), 2);
    let questions = first_result(&outcome).get_member("questions");
    for question in questions.as_array().expect("questions") {
        let text = question.get_member("question").to_text();
        assert_eq!(
            question.get_member("annotation"),
            Value::string(format!("reviewed: {}", text))
        );
    }
    // follow-up and final call only
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn default_annotator_returns_a_placeholder() {
    let program = with_techniques(
        "Is it safe?",
        vec![field_technique(
            "activePrompting",
            vec![
                ("uncertaintyEstimation", Expr::string("length")),
                ("selectionStrategy", Expr::string("max_uncertainty")),
                ("annotationProcess", Expr::string("human_in_the_loop")),
            ],
        )],
    );
    let provider = TestProvider::echo();
    let outcome = run(&interpreter(&provider), &program).await;
    let questions = first_result(&outcome).get_member("questions");
    assert_eq!(
        questions.as_array().expect("questions")[0].get_member("annotation"),
        Value::string("Human annotation placeholder")
    );
}

#[tokio::test]
async fn auto_cot_generates_one_chain_per_cluster() {
    let program = with_techniques(
        "What is the capital of France? How tall is the Eiffel Tower? What is French cuisine known for?",
        vec![field_technique(
            "autoCot",
            vec![
                ("clusteringMethod", Expr::string("length")),
                ("representativeSelection", Expr::string("longest")),
            ],
        )],
    );
    let provider = TestProvider::echo();
    let outcome = run(&interpreter(&provider), &program).await;

    let chains = first_result(&outcome).as_array().expect("chains").clone();
    let questions: Vec<Value> = chains.iter().map(|c| c.get_member("question")).collect();
    assert_eq!(
        questions,
        vec![
            Value::string("What is the capital of France?"),
            Value::string("What is French cuisine known for?"),
        ]
    );
    assert_eq!(
        chains[0].get_member("chain"),
        Value::string("Generate a chain of thought for: What is the capital of France?")
    );
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn art_selects_task_tools_and_runs_each_step() {
    let program = with_techniques(
        "Calculate the area of a circle.",
        vec![field_technique(
            "art",
            vec![
                (
                    "taskLibrary",
                    Expr::object([
                        ("math", Expr::string("geometry")),
                        ("default", Expr::string("general question")),
                    ]),
                ),
                (
                    "toolLibrary",
                    Expr::object([
                        ("calculator", Expr::string("Calculator Tool")),
                        ("graphing_tool", Expr::string("Graphing Tool")),
                        ("thesaurus", Expr::string("Thesaurus Tool")),
                    ]),
                ),
                ("decompositionStrategy", Expr::string("sequential")),
            ],
        )],
    );
    let provider = TestProvider::echo();
    let outcome = run(&interpreter(&provider), &program).await;

    let result = first_result(&outcome);
    assert_eq!(result.get_member("task"), Value::string("geometry"));
    assert_eq!(result.get_member("category"), Value::string("math"));
    assert_eq!(
        result.get_member("tools"),
        Value::array([
            Value::string("Calculator Tool"),
            Value::string("Graphing Tool")
        ])
    );
    let steps = result.get_member("steps");
    let steps = steps.as_array().expect("steps");
    assert_eq!(steps.len(), 5);
    assert_eq!(
        steps[0].get_member("result"),
        Value::string("Understand the requirements of geometry")
    );
    assert_eq!(provider.calls(), 6);
}

#[tokio::test]
async fn hooks_are_callable_from_techniques() {
    let shout = HookDef::new(
        "shout",
        "text",
        vec![Stmt::ret(Expr::binary(
            nudge_core::ops::BinOpKind::Add,
            Expr::ident("text"),
            Expr::string("!"),
        ))],
    );
    let program = Program::from(Prompt::new(
        "Loud",
        vec![
            Section::Body(vec![literal("Speak.")]),
            Section::Hooks(vec![shout]),
            Section::Technique(vec![field_technique(
                "zeroShot",
                vec![(
                    "instruction",
                    Expr::call(Expr::path("hooks.shout"), vec![Expr::string("Be loud")]),
                )],
            )]),
        ],
    ));
    let provider = TestProvider::echo();
    let outcome = run(&interpreter(&provider), &program).await;
    assert_eq!(outcome.prompt, "Instruction:\nBe loud!\n\nTask:\nSpeak.");
}

fn concurrent(calls: usize) -> InterpreterOptions {
    InterpreterOptions {
        max_concurrent_calls: calls,
        ..InterpreterOptions::default()
    }
}

#[tokio::test]
async fn majority_vote_ties_follow_submission_order() {
    let program = with_techniques(
        "Pick a letter.",
        vec![field_technique(
            "selfConsistency",
            vec![
                ("generations", Expr::number(4.0)),
                ("selectionStrategy", Expr::string("majority_vote")),
            ],
        )],
    );
    // calls 0 and 2 answer A, calls 1 and 3 answer B; B finishes first
    let provider =
        StaggeredProvider::new(4, |index, _| (if index % 2 == 0 { "A" } else { "B" }).to_string());
    let interpreter = staggered_interpreter(&provider).with_options(concurrent(4));
    let outcome = run(&interpreter, &program).await;

    assert_eq!(first_result(&outcome), &Value::string("A"));
    assert_eq!(provider.completion_order()[..4].to_vec(), vec![3, 2, 1, 0]);
    assert_eq!(provider.peak_in_flight(), 4);
    assert_eq!(provider.calls(), 5);
}

#[tokio::test]
async fn art_steps_keep_their_order_under_concurrency() {
    let program = with_techniques(
        "Write a short story.",
        vec![field_technique(
            "art",
            vec![
                (
                    "taskLibrary",
                    Expr::object([("writing", Expr::string("storytelling"))]),
                ),
                ("toolLibrary", Expr::object(Vec::<(&str, Expr)>::new())),
                ("decompositionStrategy", Expr::string("parallel")),
            ],
        )],
    );
    let provider = StaggeredProvider::echo(5);
    let interpreter = staggered_interpreter(&provider).with_options(concurrent(3));
    let outcome = run(&interpreter, &program).await;

    let steps = first_result(&outcome).get_member("steps");
    let steps = steps.as_array().expect("steps");
    assert_eq!(steps.len(), 5);
    for step in steps {
        assert_eq!(step.get_member("result"), step.get_member("step"));
    }
    assert_eq!(
        steps[0].get_member("step"),
        Value::string("Analyze storytelling from a theoretical perspective")
    );
    assert!(provider.peak_in_flight() > 1);
    assert_ne!(provider.completion_order()[..5].to_vec(), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn auto_cot_chains_keep_their_order_under_concurrency() {
    let program = with_techniques(
        "What is the capital of France? How tall is the Eiffel Tower? What is French cuisine known for?",
        vec![field_technique(
            "autoCot",
            vec![
                ("clusteringMethod", Expr::string("length")),
                ("representativeSelection", Expr::string("longest")),
            ],
        )],
    );
    let provider = StaggeredProvider::echo(2);
    let interpreter = staggered_interpreter(&provider).with_options(concurrent(2));
    let outcome = run(&interpreter, &program).await;

    let chains = first_result(&outcome).as_array().expect("chains").clone();
    for chain in &chains {
        let expected = format!(
            "Generate a chain of thought for: {}",
            chain.get_member("question").to_text()
        );
        assert_eq!(chain.get_member("chain"), Value::string(expected));
    }
    assert_eq!(provider.completion_order()[..2].to_vec(), vec![1, 0]);
}

#[tokio::test]
async fn reflection_cannot_overwrite_engine_slots() {
    let program = with_techniques(
        "Write a haiku.",
        vec![field_technique(
            "reflection",
            vec![
                ("reflectionPrompt", Expr::string("What went wrong?")),
                ("memoryBuffer", Expr::string("params")),
            ],
        )],
    );
    let provider = TestProvider::echo();
    let err = interpreter(&provider)
        .execute(&program, no_params())
        .await
        .expect_err("params is reserved");
    assert_eq!(err.code(), "validation");
    assert!(err.to_string().contains("params"), "{}", err);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn planned_call_counts_are_capped() {
    let provider = TestProvider::echo();
    let interpreter = interpreter(&provider);

    let huge = with_techniques(
        "Pick.",
        vec![field_technique(
            "selfConsistency",
            vec![
                ("generations", Expr::number(1e18)),
                ("selectionStrategy", Expr::string("majority_vote")),
            ],
        )],
    );
    let err = interpreter
        .execute(&huge, no_params())
        .await
        .expect_err("generations above the ceiling");
    assert_eq!(err.code(), "validation");

    let wide = with_techniques(
        "Plan.",
        vec![field_technique(
            "treeOfThoughts",
            vec![
                ("breadth", Expr::number(100.0)),
                ("depth", Expr::number(10.0)),
                ("evaluationStrategy", Expr::string("length")),
            ],
        )],
    );
    let err = interpreter
        .execute(&wide, no_params())
        .await
        .expect_err("tree too large");
    assert_eq!(err.code(), "validation");
    assert!(err.to_string().contains("treeOfThoughts"), "{}", err);
    assert_eq!(provider.calls(), 0);

    let tight = interpreter.with_options(InterpreterOptions {
        max_technique_calls: 3,
        ..InterpreterOptions::default()
    });
    let four = with_techniques(
        "Pick.",
        vec![field_technique(
            "selfConsistency",
            vec![
                ("generations", Expr::number(4.0)),
                ("selectionStrategy", Expr::string("majority_vote")),
            ],
        )],
    );
    let err = tight
        .execute(&four, no_params())
        .await
        .expect_err("above a configured ceiling");
    assert!(err.to_string().contains("limit of 3"), "{}", err);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn strategies_are_checked_even_without_candidates() {
    let provider = TestProvider::echo();
    let interpreter = interpreter(&provider);

    let auto_cot = with_techniques(
        "",
        vec![field_technique(
            "autoCot",
            vec![
                ("clusteringMethod", Expr::string("length")),
                ("representativeSelection", Expr::string("shortest")),
            ],
        )],
    );
    let err = interpreter
        .execute(&auto_cot, no_params())
        .await
        .expect_err("unknown representative selection");
    assert_eq!(err.code(), "unknown_strategy");

    let active = with_techniques(
        "",
        vec![field_technique(
            "activePrompting",
            vec![
                ("uncertaintyEstimation", Expr::string("vibes")),
                ("selectionStrategy", Expr::string("max_uncertainty")),
                ("annotationProcess", Expr::string("auto")),
            ],
        )],
    );
    let err = interpreter
        .execute(&active, no_params())
        .await
        .expect_err("unknown uncertainty estimation");
    assert_eq!(err.code(), "unknown_strategy");
    assert_eq!(provider.calls(), 0);
}
