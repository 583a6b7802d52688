use dashmap::DashMap;
use expense_flow::{ChatFlow, SubmissionFlow};
use std::sync::Arc;
use uuid::Uuid;

/// Per-visitor view state. Each flow is owned exclusively by its session.
#[derive(Debug, Clone)]
pub struct UiSession {
    pub id: String,
    pub submission: SubmissionFlow,
    pub chat: ChatFlow,
}

impl UiSession {
    pub fn new(id: String, agent_id: &str) -> Self {
        Self {
            id,
            submission: SubmissionFlow::new(agent_id),
            chat: ChatFlow::new(agent_id),
        }
    }
}

/// In-memory session store.
///
/// Reducer steps run under the entry lock through [`SessionStore::with_session`];
/// the lock is never held across an agent call.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, UiSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, agent_id: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions
            .insert(id.clone(), UiSession::new(id.clone(), agent_id));
        id
    }

    /// Run `f` against the session, or return `None` when it does not exist.
    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut UiSession) -> R) -> Option<R> {
        self.sessions.get_mut(id).map(|mut entry| f(entry.value_mut()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
