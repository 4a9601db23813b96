//! Tool descriptors, parameter schemas and parameter validation.
//!
//! ```rust
//! use rtooling::{ParameterSpec, ParameterType, ToolDescriptor};
//! use serde_json::json;
//!
//! let descriptor = ToolDescriptor::new("search_emails", "Searches the mailbox")
//!     .parameter(ParameterSpec::required("query", ParameterType::String, "Search query"))
//!     .parameter(
//!         ParameterSpec::optional("max_results", ParameterType::Integer, "Result limit")
//!             .with_default(json!(10))
//!             .with_minimum(0)
//!             .clamped_to(50),
//!     );
//!
//! let params = json!({"query": "from:alice@example.com", "max_results": 500});
//! let normalized = descriptor
//!     .validate(params.as_object().expect("object"))
//!     .into_result()
//!     .expect("valid parameters");
//! assert_eq!(normalized["max_results"], json!(50));
//! ```

use std::fmt::{Display, Formatter};

use rprovider::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::ToolError;

/// Tool call parameters keyed by parameter name.
pub type Parameters = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParameterType {
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::String, Value::String(_)) => Some(value.clone()),
            (Self::String, Value::Number(number)) => Some(Value::String(number.to_string())),
            (Self::String, Value::Bool(flag)) => Some(Value::String(flag.to_string())),
            (Self::Integer, Value::Number(number)) => whole_number(number).map(Value::from),
            (Self::Integer, Value::String(text)) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<u64>().ok().map(|_| i64::MAX))
                    .map(Value::from)
            }
            (Self::Number, Value::Number(_)) => Some(value.clone()),
            (Self::Number, Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            (Self::Boolean, Value::Bool(_)) => Some(value.clone()),
            (Self::Boolean, Value::String(text)) => match text.trim() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Positive integers past `i64::MAX` saturate so an upper bound can clamp them.
fn whole_number(number: &serde_json::Number) -> Option<i64> {
    if let Some(integer) = number.as_i64() {
        return Some(integer);
    }
    if number.as_u64().is_some() {
        return Some(i64::MAX);
    }
    number
        .as_f64()
        .filter(|float| float.is_finite() && float.fract() == 0.0)
        .filter(|float| *float > i64::MIN as f64)
        .map(|float| float as i64)
}

/// One entry of a tool's parameter schema.
///
/// `minimum` rejects smaller integers; `maximum` clamps larger ones instead of
/// rejecting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
}

impl ParameterSpec {
    pub fn required(
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
            default: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn clamped_to(mut self, maximum: i64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    fn schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(self.param_type.json_type()));
        schema.insert("description".to_string(), json!(self.description));
        if let Some(default) = &self.default {
            schema.insert("default".to_string(), default.clone());
        }
        if let Some(minimum) = self.minimum {
            schema.insert("minimum".to_string(), json!(minimum));
        }
        if let Some(maximum) = self.maximum {
            schema.insert("maximum".to_string(), json!(maximum));
        }
        Value::Object(schema)
    }

    fn normalize(&self, value: &Value) -> Result<Value, ParameterViolation> {
        let coerced = self.param_type.coerce(value).ok_or_else(|| {
            ParameterViolation::new(
                &self.name,
                format!("must be of type {}", self.param_type.json_type()),
            )
        })?;

        let Some(integer) = coerced.as_i64() else {
            return Ok(coerced);
        };

        if let Some(minimum) = self.minimum
            && integer < minimum
        {
            return Err(ParameterViolation::new(
                &self.name,
                format!("must be at least {minimum}"),
            ));
        }

        match self.maximum {
            Some(maximum) if integer > maximum => Ok(Value::from(maximum)),
            _ => Ok(coerced),
        }
    }
}

/// A constraint a parameter set failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterViolation {
    pub parameter: String,
    pub message: String,
}

impl ParameterViolation {
    pub fn new(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

impl Display for ParameterViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.parameter, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Parameters with defaults applied, types coerced and bounds clamped.
    Valid(Parameters),
    Invalid(Vec<ParameterViolation>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn into_result(self) -> Result<Parameters, ToolError> {
        match self {
            Self::Valid(parameters) => Ok(parameters),
            Self::Invalid(violations) => {
                let violations: Vec<String> =
                    violations.iter().map(ToString::to_string).collect();
                Err(ToolError::invalid_parameters(format!(
                    "invalid parameters: {}",
                    violations.join("; ")
                ))
                .with_violations(violations))
            }
        }
    }
}

/// Catalog entry for one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// JSON Schema for the arguments object.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|spec| (spec.name.clone(), spec.schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema().to_string(),
        }
    }

    /// Checks `parameters` against the schema. Undeclared parameters are rejected.
    pub fn validate(&self, parameters: &Parameters) -> ValidationResult {
        let mut violations: Vec<ParameterViolation> = parameters
            .keys()
            .filter(|key| !self.parameters.iter().any(|spec| &spec.name == *key))
            .map(|key| ParameterViolation::new(key.as_str(), "is not a declared parameter"))
            .collect();
        let mut normalized = Parameters::new();

        for spec in &self.parameters {
            match parameters.get(&spec.name) {
                None | Some(Value::Null) => {
                    if let Some(default) = &spec.default {
                        normalized.insert(spec.name.clone(), default.clone());
                    } else if spec.required {
                        violations.push(ParameterViolation::new(&spec.name, "is required"));
                    }
                }
                Some(value) => match spec.normalize(value) {
                    Ok(value) => {
                        normalized.insert(spec.name.clone(), value);
                    }
                    Err(violation) => violations.push(violation),
                },
            }
        }

        if violations.is_empty() {
            ValidationResult::Valid(normalized)
        } else {
            ValidationResult::Invalid(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolErrorKind;

    fn search_descriptor() -> ToolDescriptor {
        ToolDescriptor::new("search_emails", "Search the mailbox")
            .parameter(ParameterSpec::required(
                "query",
                ParameterType::String,
                "Gmail query",
            ))
            .parameter(
                ParameterSpec::optional("max_results", ParameterType::Integer, "Result cap")
                    .with_default(json!(10))
                    .with_minimum(0)
                    .clamped_to(50),
            )
    }

    fn object(value: Value) -> Parameters {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn validate_applies_defaults() {
        let result = search_descriptor().validate(&object(json!({"query": "is:unread"})));
        let ValidationResult::Valid(params) = result else {
            panic!("expected valid parameters");
        };
        assert_eq!(params["max_results"], json!(10));
        assert_eq!(params["query"], json!("is:unread"));
    }

    #[test]
    fn validate_reports_every_violation() {
        let result = search_descriptor().validate(&object(json!({
            "max_results": "lots",
            "folder": "inbox"
        })));
        let ValidationResult::Invalid(violations) = result else {
            panic!("expected violations");
        };

        let rendered: Vec<String> = violations.iter().map(ToString::to_string).collect();
        assert_eq!(rendered.len(), 3);
        assert!(rendered.contains(&"'folder' is not a declared parameter".to_string()));
        assert!(rendered.contains(&"'query' is required".to_string()));
        assert!(rendered.contains(&"'max_results' must be of type integer".to_string()));
    }

    #[test]
    fn validate_coerces_numeric_strings_and_clamps() {
        let result = search_descriptor().validate(&object(json!({
            "query": "budget",
            "max_results": "75"
        })));
        let params = result.into_result().expect("coercible input");
        assert_eq!(params["max_results"], json!(50));
    }

    #[test]
    fn validate_rejects_below_minimum() {
        let error = search_descriptor()
            .validate(&object(json!({"query": "x", "max_results": -1})))
            .into_result()
            .expect_err("negative bound");

        assert_eq!(error.kind, ToolErrorKind::InvalidParameters);
        assert_eq!(error.violations, vec!["'max_results' must be at least 0"]);
    }

    #[test]
    fn validate_accepts_zero_and_integral_floats() {
        let params = search_descriptor()
            .validate(&object(json!({"query": "x", "max_results": 0})))
            .into_result()
            .expect("zero is in range");
        assert_eq!(params["max_results"], json!(0));

        let params = search_descriptor()
            .validate(&object(json!({"query": "x", "max_results": 3.0})))
            .into_result()
            .expect("integral float");
        assert_eq!(params["max_results"], json!(3));
    }

    #[test]
    fn input_schema_lists_properties_and_required() {
        let schema = search_descriptor().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["max_results"]["maximum"], json!(50));
        assert_eq!(schema["properties"]["query"]["type"], "string");
    }

    #[test]
    fn to_definition_embeds_schema_text() {
        let definition = search_descriptor().to_definition();
        assert_eq!(definition.name, "search_emails");
        let parsed: Value =
            serde_json::from_str(&definition.input_schema).expect("schema is JSON");
        assert_eq!(parsed, search_descriptor().input_schema());
    }
}
