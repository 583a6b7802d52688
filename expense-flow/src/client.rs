use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    config::AgentConfig,
    envelope::{AgentEnvelope, AgentRequest},
    error::{AgentError, Result},
};

/// Remote agent seam used by every flow.
///
/// Implementations never fail: transport and remote errors come back as an
/// envelope with `success == false` and a readable message.
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn send(&self, request: &AgentRequest) -> AgentEnvelope;
}

/// Wire body for the agent inference endpoint
#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    user_id: &'a str,
    agent_id: &'a str,
    session_id: String,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    assets: Option<&'a [String]>,
}

/// Agent client over HTTP
#[derive(Clone)]
pub struct HttpAgentClient {
    config: AgentConfig,
    client: reqwest::Client,
}

impl HttpAgentClient {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn try_send(&self, request: &AgentRequest) -> Result<AgentEnvelope> {
        // Fresh session per call: the agent sees every turn in isolation
        let body = InferenceRequest {
            user_id: &self.config.user_id,
            agent_id: &request.agent_id,
            session_id: Uuid::new_v4().to_string(),
            message: &request.message,
            assets: request.context.as_ref().map(|context| context.assets.as_slice()),
        };

        debug!(
            url = %self.config.api_url,
            agent_id = %request.agent_id,
            message_length = request.message.len(),
            asset_count = request.assets().len(),
            "Sending agent request"
        );

        let mut builder = self.client.post(&self.config.api_url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header("x-api-key", api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Prefer the agent's own explanation when the error body is an envelope
            if let Ok(envelope) = serde_json::from_str::<AgentEnvelope>(&text) {
                if envelope.failure_message().is_some() {
                    warn!(status = %status, "Agent rejected request");
                    return Ok(AgentEnvelope {
                        success: false,
                        ..envelope
                    });
                }
            }
            return Err(AgentError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: AgentEnvelope = serde_json::from_str(&text)?;

        info!(
            success = envelope.success,
            status = ?envelope.status(),
            "Received agent response"
        );

        Ok(envelope)
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn send(&self, request: &AgentRequest) -> AgentEnvelope {
        match self.try_send(request).await {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(error = %e, agent_id = %request.agent_id, "Agent call failed");
                AgentEnvelope::failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn spawn_agent(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();

        let app = Router::new().route(
            "/inference/chat",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let sink = sink.clone();
                let reply = reply.clone();
                async move {
                    let key = headers
                        .get("x-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    sink.lock().await.push((key, body));
                    (status, Json(reply))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/inference/chat", addr), captured)
    }

    fn client_for(url: &str) -> HttpAgentClient {
        HttpAgentClient::new(AgentConfig::new(url, "http://unused/upload").with_api_key("secret"))
    }

    #[tokio::test]
    async fn test_send_returns_remote_envelope() {
        let (url, captured) = spawn_agent(
            StatusCode::OK,
            json!({
                "success": true,
                "response": { "status": "success", "result": { "answer": "Yes" } }
            }),
        )
        .await;

        let request = AgentRequest::new("Is this allowed?", "agent-1")
            .with_assets(vec!["asset-1".to_string()]);
        let envelope = client_for(&url).send(&request).await;

        assert!(envelope.is_success());

        let calls = captured.lock().await;
        assert_eq!(calls.len(), 1);
        let (key, body) = &calls[0];
        assert_eq!(key.as_deref(), Some("secret"));
        assert_eq!(body["agent_id"], "agent-1");
        assert_eq!(body["message"], "Is this allowed?");
        assert_eq!(body["assets"], json!(["asset-1"]));
        assert!(body["session_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_no_assets_field_without_attachments() {
        let (url, captured) = spawn_agent(
            StatusCode::OK,
            json!({ "success": true, "response": { "status": "success" } }),
        )
        .await;

        client_for(&url)
            .send(&AgentRequest::new("hello", "agent-1"))
            .await;

        let calls = captured.lock().await;
        assert!(calls[0].1.get("assets").is_none());
    }

    #[tokio::test]
    async fn test_http_error_becomes_failed_envelope() {
        let (url, _) = spawn_agent(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "detail": "boom" }),
        )
        .await;

        let envelope = client_for(&url)
            .send(&AgentRequest::new("hello", "agent-1"))
            .await;

        assert!(!envelope.success);
        let message = envelope.failure_message().unwrap();
        assert!(message.starts_with("Agent API error (500)"), "{message}");
    }

    #[tokio::test]
    async fn test_error_body_envelope_message_is_kept() {
        let (url, _) = spawn_agent(
            StatusCode::BAD_REQUEST,
            json!({ "success": true, "message": "Unknown agent" }),
        )
        .await;

        let envelope = client_for(&url)
            .send(&AgentRequest::new("hello", "missing"))
            .await;

        assert!(!envelope.success);
        assert_eq!(envelope.failure_message(), Some("Unknown agent"));
    }

    #[tokio::test]
    async fn test_unreachable_agent_reports_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let envelope = client_for(&format!("http://{}/inference/chat", addr))
            .send(&AgentRequest::new("hello", "agent-1"))
            .await;

        assert!(!envelope.is_success());
        assert!(envelope.failure_message().unwrap().starts_with("Network error"));
    }
}
