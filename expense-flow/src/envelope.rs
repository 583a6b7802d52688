use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::Result;

/// Status tag the agent reports for a handled request.
pub const SUCCESS_STATUS: &str = "success";

/// Optional context sent along with a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentContext {
    pub assets: Vec<String>,
}

/// A single message addressed to a remote agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub message: String,
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<AgentContext>,
}

impl AgentRequest {
    pub fn new(message: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            agent_id: agent_id.into(),
            context: None,
        }
    }

    /// Attach asset identifiers. An empty list leaves the request without context.
    pub fn with_assets(mut self, assets: Vec<String>) -> Self {
        self.context = if assets.is_empty() {
            None
        } else {
            Some(AgentContext { assets })
        };
        self
    }

    pub fn assets(&self) -> &[String] {
        self.context
            .as_ref()
            .map(|context| context.assets.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Normalized wrapper around every agent reply, including failed calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AgentResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AgentEnvelope {
    pub fn success(result: Value) -> Self {
        Self {
            success: true,
            response: Some(AgentResponse {
                status: SUCCESS_STATUS.to_string(),
                message: None,
                result: Some(result),
            }),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            message: Some(message.into()),
        }
    }

    /// Both the success flag and the response status must agree.
    pub fn is_success(&self) -> bool {
        self.success && self.status() == Some(SUCCESS_STATUS)
    }

    pub fn status(&self) -> Option<&str> {
        self.response.as_ref().map(|response| response.status.as_str())
    }

    /// Message carried by the response, falling back to the envelope's own.
    /// Blank messages count as absent.
    pub fn failure_message(&self) -> Option<&str> {
        let non_blank = |message: &&str| !message.trim().is_empty();

        self.response
            .as_ref()
            .and_then(|response| response.message.as_deref())
            .filter(non_blank)
            .or_else(|| self.message.as_deref().filter(non_blank))
    }

    pub fn decode_result<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.response.as_ref().and_then(|response| response.result.as_ref()) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}
