//! Scripted stand-ins for the agent and the upload store.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

use crate::{
    client::AgentClient,
    envelope::{AgentEnvelope, AgentRequest},
    upload::{ReceiptFile, UploadAdapter, UploadOutcome},
};

/// Replays queued envelopes in order and records every request.
///
/// With a gate attached, each call waits for one `notify_one` before replying.
#[derive(Default)]
pub struct ScriptedAgentClient {
    replies: Mutex<VecDeque<AgentEnvelope>>,
    requests: Mutex<Vec<AgentRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedAgentClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, envelope: AgentEnvelope) -> Self {
        self.replies.get_mut().push_back(envelope);
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub async fn requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl AgentClient for ScriptedAgentClient {
    async fn send(&self, request: &AgentRequest) -> AgentEnvelope {
        self.requests.lock().await.push(request.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| AgentEnvelope::failure("No scripted reply"))
    }
}

/// Replays queued upload outcomes and records every received file.
///
/// Gated the same way as [`ScriptedAgentClient`].
#[derive(Default)]
pub struct ScriptedUploadAdapter {
    outcomes: Mutex<VecDeque<UploadOutcome>>,
    files: Mutex<Vec<ReceiptFile>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedUploadAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(mut self, outcome: UploadOutcome) -> Self {
        self.outcomes.get_mut().push_back(outcome);
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub async fn files(&self) -> Vec<ReceiptFile> {
        self.files.lock().await.clone()
    }
}

#[async_trait]
impl UploadAdapter for ScriptedUploadAdapter {
    async fn upload(&self, file: ReceiptFile) -> UploadOutcome {
        self.files.lock().await.push(file);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| UploadOutcome::failed("No scripted outcome"))
    }
}
