use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::errors::{AgentError, AgentResult};
use crate::graph::error::GraphError;
use crate::models::tool::{Tool, ToolCall};

pub mod calendar;
pub mod drive;
pub mod mail;

/// Core trait for a group of tools the agent can operate
#[async_trait]
pub trait System: Send + Sync {
    /// Get the name of the system
    fn name(&self) -> &str;

    /// Get the system description
    fn description(&self) -> &str;

    /// Get available tools
    fn tools(&self) -> &[Tool];

    /// Call a tool with the given parameters, returning the JSON envelope
    /// appended to the transcript. Graph failures are folded into an error
    /// envelope here; only unresolvable or malformed calls surface as Err.
    async fn call(&self, tool_call: ToolCall) -> AgentResult<Value>;
}

/// Deserialize a tool's argument payload into its typed shape, rejecting
/// unknown or malformed fields before any wrapper runs
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> AgentResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| AgentError::InvalidParameters(format!("{}: {}", tool, e)))
}

pub(crate) fn success_envelope<S: Into<String>>(message: S) -> Value {
    json!({ "status": "success", "message": message.into() })
}

pub(crate) fn error_envelope(error: &GraphError) -> Value {
    json!({ "status": "error", "message": error.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::mail::SendMailArgs;

    #[test]
    fn test_parse_args_maps_to_invalid_parameters() {
        let err = parse_args::<SendMailArgs>("send_outlook_email", json!({"subject": "hi"}))
            .unwrap_err();
        match err {
            AgentError::InvalidParameters(detail) => {
                assert!(detail.starts_with("send_outlook_email:"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_envelope_shape() {
        let envelope = error_envelope(&GraphError::Http {
            operation: "Failed to list files in 'root'".to_string(),
            status: 500,
            body: "boom".to_string(),
        });
        assert_eq!(envelope["status"], "error");
        assert!(envelope["message"].as_str().unwrap().contains("500"));
    }
}
