// Query parameter encoding. Structured query values (environments, option
// name lists) travel as base64url of their JSON serialization, padding kept.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde_json::Value;

use crate::error::{Error, Result};

pub fn encode_base64_param(value: &Value) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(URL_SAFE.encode(json.as_bytes()))
}

pub fn encode_base64_str(s: &str) -> String {
    URL_SAFE.encode(s.as_bytes())
}

pub fn decode_base64_param(s: &str) -> Result<Value> {
    let bytes = URL_SAFE
        .decode(s.as_bytes())
        .map_err(|e| Error::InvalidArgument(format!("invalid base64 parameter {s:?}: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::InvalidArgument(format!("invalid JSON in parameter {s:?}: {e}")))
}
