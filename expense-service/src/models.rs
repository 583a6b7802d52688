use expense_flow::{
    ChatFlow, ChatMessage, ExpenseResult, SubmissionFlow, SubmissionPhase, TrackedExpense,
    TrackingView,
    render::{render_submission, render_tracking, render_transcript},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackingQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub session_id: String,
    pub phase: SubmissionPhase,
    pub can_submit: bool,
    pub asset_ids: Vec<String>,
    pub result: Option<ExpenseResult>,
    pub error: Option<String>,
    pub rendered: String,
}

impl SubmissionResponse {
    pub fn new(session_id: &str, flow: &SubmissionFlow) -> Self {
        Self {
            session_id: session_id.to_string(),
            phase: flow.phase(),
            can_submit: flow.can_submit(),
            asset_ids: flow.asset_ids().to_vec(),
            result: flow.result().cloned(),
            error: flow.error().map(str::to_string),
            rendered: render_submission(flow),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub transcript: Vec<ChatMessage>,
    pub draft: String,
    pub loading: bool,
    pub error: Option<String>,
    pub rendered: String,
}

impl ChatResponse {
    pub fn new(session_id: &str, chat: &ChatFlow) -> Self {
        Self {
            session_id: session_id.to_string(),
            transcript: chat.transcript().to_vec(),
            draft: chat.draft().to_string(),
            loading: chat.is_loading(),
            error: chat.error().map(str::to_string),
            rendered: render_transcript(chat),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackingResponse {
    pub status: String,
    pub category: String,
    pub expenses: Vec<TrackedExpense>,
    pub shown: usize,
    pub total: usize,
    pub count_label: String,
    pub rendered: String,
}

impl From<&TrackingView> for TrackingResponse {
    fn from(view: &TrackingView) -> Self {
        Self {
            status: view.status.to_string(),
            category: view.category.to_string(),
            expenses: view.rows.clone(),
            shown: view.rows.len(),
            total: view.total,
            count_label: view.count_label(),
            rendered: render_tracking(view),
        }
    }
}
