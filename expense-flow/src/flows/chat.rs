use serde::Serialize;
use tracing::{info, warn};

use crate::{
    client::AgentClient,
    envelope::{AgentEnvelope, AgentRequest},
    error::FlowError,
    models::{ChatMessage, ExpenseResult},
};

pub const NO_ANSWER: &str = "No answer provided";
pub const CHAT_FAILED: &str = "Failed to get a response from the policy assistant";
pub const APOLOGY: &str =
    "I'm sorry, I couldn't process your question right now. Please try again.";

/// View state of the policy Q&A panel.
///
/// The transcript only ever grows; each turn is sent to the agent on its own,
/// without earlier messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatFlow {
    agent_id: String,
    transcript: Vec<ChatMessage>,
    draft: String,
    loading: bool,
    error: Option<String>,
}

impl ChatFlow {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            transcript: Vec::new(),
            draft: String::new(),
            loading: false,
            error: None,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Send is disabled while a turn is in flight or the draft is blank.
    pub fn can_send(&self) -> bool {
        !self.loading && !self.draft.trim().is_empty()
    }

    /// Record the drafted question and produce the request for it.
    pub fn begin_turn(&mut self) -> Result<AgentRequest, FlowError> {
        if self.loading {
            return Err(FlowError::Busy);
        }
        if self.draft.trim().is_empty() {
            return Err(FlowError::EmptyQuestion);
        }

        let question = std::mem::take(&mut self.draft);
        self.transcript.push(ChatMessage::user(question.clone()));
        self.error = None;
        self.loading = true;

        Ok(AgentRequest::new(question, &self.agent_id))
    }

    /// Replace the draft with `question` and start a turn for it. A pending
    /// turn rejects this without touching the draft.
    pub fn begin_question(&mut self, question: &str) -> Result<AgentRequest, FlowError> {
        if self.loading {
            return Err(FlowError::Busy);
        }
        self.set_draft(question);
        self.begin_turn()
    }

    pub fn finish_turn(&mut self, envelope: AgentEnvelope) {
        self.loading = false;

        if envelope.is_success() {
            let result = match envelope.decode_result::<ExpenseResult>() {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "Agent result did not match expected schema");
                    None
                }
            };

            let (answer, recommendations) = result
                .map(|r| (r.answer, r.recommendations))
                .unwrap_or_default();

            let content = Some(answer)
                .filter(|a| !a.trim().is_empty())
                .or_else(|| envelope.failure_message().map(str::to_string))
                .unwrap_or_else(|| NO_ANSWER.to_string());

            info!(
                recommendations = recommendations.len(),
                "Policy answer received"
            );
            self.transcript
                .push(ChatMessage::assistant(content, recommendations));
        } else {
            let message = envelope.failure_message().unwrap_or(CHAT_FAILED).to_string();
            warn!(error = %message, "Policy question failed");
            self.error = Some(message);
            self.transcript
                .push(ChatMessage::assistant(APOLOGY, Vec::new()));
        }
    }

    /// Ask one question and wait for the reply.
    pub async fn ask(
        &mut self,
        client: &dyn AgentClient,
        question: &str,
    ) -> Result<(), FlowError> {
        let request = self.begin_question(question)?;
        let envelope = client.send(&request).await;
        self.finish_turn(envelope);
        Ok(())
    }
}
