pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod flows;
pub mod models;
pub mod render;
pub mod upload;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export commonly used types
pub use client::{AgentClient, HttpAgentClient};
pub use config::{AgentConfig, DEFAULT_AGENT_ID};
pub use envelope::{AgentContext, AgentEnvelope, AgentRequest, AgentResponse};
pub use error::{AgentError, ConfigError, FlowError, Result};
pub use flows::{
    CategoryFilter, ChatFlow, ExpenseForm, StatusFilter, SubmissionFlow, SubmissionPhase,
    TrackingView,
};
pub use models::{
    ChatMessage, ChatRole, ExpenseCategory, ExpenseDetails, ExpenseResult, ExpenseStatus,
    PolicyValidation, TrackedExpense,
};
pub use upload::{HttpUploadAdapter, ReceiptFile, UploadAdapter, UploadOutcome};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedAgentClient, ScriptedUploadAdapter};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::{Mutex, Notify};

    #[tokio::test]
    async fn test_flows_keep_independent_state() {
        let client = ScriptedAgentClient::new()
            .with_reply(AgentEnvelope::failure("Agent unavailable"))
            .with_reply(AgentEnvelope::success(json!({ "answer": "Yes" })));
        let mut submission = SubmissionFlow::new(DEFAULT_AGENT_ID);
        let mut chat = ChatFlow::new(DEFAULT_AGENT_ID);

        submission
            .submit(
                &client,
                &ExpenseForm {
                    vendor: "Adobe".to_string(),
                    date: "2024-02-01".to_string(),
                    amount: "54.99".to_string(),
                    ..ExpenseForm::default()
                },
            )
            .await
            .unwrap();
        chat.ask(&client, "Is software covered?").await.unwrap();

        assert_eq!(submission.error(), Some("Agent unavailable"));
        assert!(chat.error().is_none());
        assert_eq!(chat.transcript().last().unwrap().content, "Yes");

        let requests = client.requests().await;
        assert!(requests.iter().all(|r| r.agent_id == DEFAULT_AGENT_ID));
    }

    #[tokio::test]
    async fn test_in_flight_turn_settles_before_next() {
        let gate = Arc::new(Notify::new());
        let client = Arc::new(
            ScriptedAgentClient::new()
                .with_reply(AgentEnvelope::success(json!({ "answer": "First" })))
                .gated(gate.clone()),
        );
        let chat = Arc::new(Mutex::new(ChatFlow::new("agent")));

        let request = {
            let mut chat = chat.lock().await;
            chat.set_draft("first question");
            chat.begin_turn().unwrap()
        };

        let pending = {
            let client = client.clone();
            let chat = chat.clone();
            tokio::spawn(async move {
                let envelope = client.send(&request).await;
                chat.lock().await.finish_turn(envelope);
            })
        };

        {
            let mut chat = chat.lock().await;
            chat.set_draft("second question");
            assert_eq!(chat.begin_turn(), Err(FlowError::Busy));
        }

        gate.notify_one();
        pending.await.unwrap();

        let chat = chat.lock().await;
        assert!(!chat.is_loading());
        let contents: Vec<&str> = chat.transcript().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first question", "First"]);
        assert_eq!(client.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_receipt_forwarded_to_adapter() {
        let uploads = ScriptedUploadAdapter::new()
            .with_outcome(UploadOutcome::uploaded(vec!["asset-9".to_string()]));
        let mut submission = SubmissionFlow::new("agent");
        let receipt = ReceiptFile::new("receipt.png", b"\x89PNG".to_vec());

        submission.upload(&uploads, receipt.clone()).await.unwrap();

        assert_eq!(uploads.files().await, vec![receipt]);
        assert_eq!(submission.asset_ids(), ["asset-9".to_string()]);
    }
}
