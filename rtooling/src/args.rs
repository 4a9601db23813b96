//! JSON parameter parsing helpers shared by adapters and decision parsing.
//!
//! ```rust
//! use rtooling::{parse_json_object, required_string};
//!
//! let args = parse_json_object(r#"{"query":"from:alice@example.com"}"#).expect("object should parse");
//! let query = required_string(&args, "query").expect("query should be present");
//! assert_eq!(query, "from:alice@example.com");
//! ```

use serde_json::Value;

use crate::{Parameters, ToolError};

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_parameters(format!("invalid JSON arguments: {err}")))
}

/// Parses a JSON object. Blank input is treated as an empty object.
pub fn parse_json_object(args_json: &str) -> Result<Parameters, ToolError> {
    if args_json.trim().is_empty() {
        return Ok(Parameters::new());
    }

    match parse_json_value(args_json)? {
        Value::Object(object) => Ok(object),
        _ => Err(ToolError::invalid_parameters("expected JSON object arguments")),
    }
}

pub fn required_string(args: &Parameters, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_parameters(format!("missing required string: '{key}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolErrorKind;

    #[test]
    fn parse_object_and_extract_required_string() {
        let args = parse_json_object("{\"query\":\"rust\"}").expect("args should parse");
        let query = required_string(&args, "query").expect("query should exist");
        assert_eq!(query, "rust");
    }

    #[test]
    fn blank_arguments_are_an_empty_object() {
        assert!(parse_json_object("  ").expect("blank").is_empty());
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let error = parse_json_object("[1,2]").expect_err("array");
        assert_eq!(error.kind, ToolErrorKind::InvalidParameters);
    }

    #[test]
    fn parse_invalid_json_returns_invalid_parameters() {
        let error = parse_json_value("{").expect_err("json should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidParameters);
    }
}
