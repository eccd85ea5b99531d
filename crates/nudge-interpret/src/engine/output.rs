use nudge_core::error::Error;
use nudge_core::value::Value;
use nudge_core::Result;

/// Applies the `output` section to the (possibly hook-transformed) response.
///
/// With `format: "json"` a string response is parsed; anything a hook already
/// turned into structured data is returned untouched.
pub fn post_process_output(response: Value, output: Option<&Value>) -> Result<Value> {
    let format = output.map(|output| output.get_member("format"));
    let wants_json = format
        .as_ref()
        .and_then(Value::as_str)
        .is_some_and(|format| format.eq_ignore_ascii_case("json"));
    if !wants_json {
        return Ok(response);
    }
    match response {
        Value::String(text) => serde_json::from_str::<serde_json::Value>(&text)
            .map(Value::from)
            .map_err(Error::OutputFormat),
        other => Ok(other),
    }
}
