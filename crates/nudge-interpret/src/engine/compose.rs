use nudge_core::value::{ToJson, Value};

use super::env::{slots, Environment};

/// Assembles the text sent to the provider.
///
/// Blocks appear in a fixed order, each only when present: context, few-shot
/// examples, zero-shot instruction, chain-of-thought steps, then `Task:` and the
/// body. Hosts that compare transcripts depend on this layout.
pub fn compose_prompt(env: &Environment, body: &str) -> String {
    let mut out = String::new();

    if let Some(context) = env.slot_object(slots::CONTEXT).filter(|c| !c.is_empty()) {
        let rendered = serde_json::to_string_pretty(&context.to_json()).unwrap_or_default();
        out.push_str(&format!("Context:\n{}\n\n", rendered));
    }

    if let Some(examples) = env.slot(slots::EXAMPLES).and_then(Value::as_array) {
        out.push_str("Examples:\n");
        for example in examples {
            out.push_str(&format!(
                "Input: {}\nOutput: {}\n",
                example.get_member("input").to_text(),
                example.get_member("output").to_text()
            ));
        }
        out.push('\n');
    }

    if let Some(instruction) = env.slot(slots::INSTRUCTION) {
        out.push_str(&format!("Instruction:\n{}\n\n", instruction.to_text()));
    }

    if let Some(steps) = env.slot(slots::CHAIN_OF_THOUGHT).and_then(Value::as_array) {
        let steps: Vec<String> = steps.iter().map(Value::to_text).collect();
        out.push_str(&format!("Chain of Thought:\n{}\n\n", steps.join("\n")));
    }

    out.push_str("Task:\n");
    out.push_str(body);
    out
}
