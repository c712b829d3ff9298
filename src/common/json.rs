use crate::common::errors::MdnError;
use serde::Serialize;
use serde_json::Value;

pub struct JsonUtil;

impl JsonUtil {
    pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, MdnError> {
        serde_json::to_string_pretty(value).map_err(|e| MdnError::InvalidArgument(e.to_string()))
    }

    // Strict JSON parse used by structural checks; YAML-only syntax is rejected.
    pub fn parse_strict(section: &str, text: &str) -> Result<Value, MdnError> {
        serde_json::from_str(text).map_err(|e| MdnError::malformed(section, e))
    }

    pub fn type_name(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}
