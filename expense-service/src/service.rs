use axum::{
    Router,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::{Json, Response},
    routing::{get, post},
};
use expense_flow::{
    AgentClient, AgentConfig, CategoryFilter, ExpenseForm, FlowError, HttpAgentClient,
    HttpUploadAdapter, ReceiptFile, StatusFilter, TrackedExpense, TrackingView, UploadAdapter,
    flows::seed_expenses,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    models::{
        AskRequest, ChatResponse, CreateSessionResponse, SubmissionResponse,
        TrackingQuery, TrackingResponse,
    },
    session::{SessionStore, UiSession},
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

fn flow_error(e: FlowError) -> ApiError {
    match e {
        FlowError::Busy => (StatusCode::CONFLICT, Json(json!({ "error": e.to_string() }))),
        _ => bad_request_error(&e.to_string()),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub agent: Arc<dyn AgentClient>,
    pub uploads: Arc<dyn UploadAdapter>,
    pub agent_id: String,
    pub expenses: Arc<Vec<TrackedExpense>>,
}

impl AppState {
    pub fn new(
        agent: Arc<dyn AgentClient>,
        uploads: Arc<dyn UploadAdapter>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            agent,
            uploads,
            agent_id: agent_id.into(),
            expenses: Arc::new(seed_expenses()),
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            Arc::new(HttpAgentClient::new(config.clone())),
            Arc::new(HttpUploadAdapter::new(config)),
            config.agent_id.clone(),
        )
    }

    fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut UiSession) -> R,
    ) -> Result<R, ApiError> {
        self.sessions.with_session(session_id, f).ok_or_else(|| {
            warn!(session_id = %session_id, "Session not found");
            not_found_error("Session not found", session_id)
        })
    }
}

pub fn create_app(config: &AgentConfig) -> Router {
    build_router(AppState::from_config(config))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route(
            "/sessions/{session_id}/submission",
            get(get_submission).post(submit_expense),
        )
        .route(
            "/sessions/{session_id}/submission/receipt",
            post(attach_receipt),
        )
        .route("/sessions/{session_id}/chat", get(get_chat).post(ask_question))
        .route("/expenses", get(list_expenses))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id,
        method = %request.method(),
        path = %request.uri().path()
    );

    next.run(request).instrument(span).await
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Expense Portal Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Expense submission, tracking and policy Q&A backed by a remote AI agent",
        "endpoints": {
            "POST /sessions": "Start a new portal session",
            "GET /sessions/{session_id}/submission": "Current submission panel",
            "POST /sessions/{session_id}/submission/receipt": "Upload a receipt (multipart/form-data)",
            "POST /sessions/{session_id}/submission": "Submit an expense for processing",
            "GET /sessions/{session_id}/chat": "Policy chat transcript",
            "POST /sessions/{session_id}/chat": "Ask a policy question",
            "GET /expenses?status=&category=": "Filtered expense tracking table",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.create(&state.agent_id);
    info!(session_id = %session_id, "Session created");

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse { session_id }),
    )
}

async fn get_submission(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SubmissionResponse> {
    state
        .with_session(&session_id, |session| {
            SubmissionResponse::new(&session.id, &session.submission)
        })
        .map(Json)
}

/// Run the remote half of a flow step on its own task.
///
/// Once a `begin_*` step has marked the flow pending, the matching `finish_*`
/// must run even if the caller disconnects and this handler is dropped.
async fn settle<T, F>(step: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(step.in_current_span()).await.map_err(|e| {
        error!(error = %e, "Flow step task failed");
        internal_error("Flow step failed")
    })?
}

/// First multipart field that carries a file name.
async fn read_receipt(multipart: &mut Multipart) -> Result<ReceiptFile, ApiError> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        warn!(error = %e, "Malformed multipart body");
        bad_request_error("Malformed multipart body")
    };

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(malformed)?;
        return Ok(ReceiptFile::new(file_name, bytes.to_vec()));
    }

    Err(bad_request_error("A receipt file is required"))
}

async fn attach_receipt(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<SubmissionResponse> {
    let receipt = read_receipt(&mut multipart).await?;

    info!(
        session_id = %session_id,
        file = %receipt.file_name,
        size = receipt.bytes.len(),
        "Attaching receipt"
    );

    state
        .with_session(&session_id, |session| session.submission.begin_upload())?
        .map_err(flow_error)?;

    settle(async move {
        let outcome = state.uploads.upload(receipt).await;

        if !outcome.is_success() {
            error!(session_id = %session_id, error = %outcome.error_message(), "Receipt upload failed");
        }

        state.with_session(&session_id, |session| {
            session.submission.finish_upload(outcome);
            SubmissionResponse::new(&session.id, &session.submission)
        })
    })
    .await
    .map(Json)
}

async fn submit_expense(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(form): Json<ExpenseForm>,
) -> ApiResult<SubmissionResponse> {
    info!(session_id = %session_id, vendor = %form.vendor, "Submitting expense");

    let request = state
        .with_session(&session_id, |session| session.submission.begin_submit(&form))?
        .map_err(flow_error)?;

    let response = settle(async move {
        let envelope = state.agent.send(&request).await;

        state.with_session(&session_id, |session| {
            session.submission.finish_submit(envelope);
            SubmissionResponse::new(&session.id, &session.submission)
        })
    })
    .await?;

    info!(
        session_id = %response.session_id,
        phase = ?response.phase,
        "Expense submission settled"
    );

    Ok(Json(response))
}

async fn get_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ChatResponse> {
    state
        .with_session(&session_id, |session| ChatResponse::new(&session.id, &session.chat))
        .map(Json)
}

async fn ask_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<AskRequest>,
) -> ApiResult<ChatResponse> {
    info!(
        session_id = %session_id,
        question_length = request.question.len(),
        "Policy question received"
    );

    let agent_request = state
        .with_session(&session_id, |session| {
            session.chat.begin_question(&request.question)
        })?
        .map_err(flow_error)?;

    settle(async move {
        let envelope = state.agent.send(&agent_request).await;

        state.with_session(&session_id, |session| {
            session.chat.finish_turn(envelope);
            ChatResponse::new(&session.id, &session.chat)
        })
    })
    .await
    .map(Json)
}

async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<TrackingQuery>,
) -> ApiResult<TrackingResponse> {
    let status = match query.status.as_deref() {
        Some(value) => value.parse::<StatusFilter>().map_err(flow_error)?,
        None => StatusFilter::All,
    };
    let category = match query.category.as_deref() {
        Some(value) => value.parse::<CategoryFilter>().map_err(flow_error)?,
        None => CategoryFilter::All,
    };

    let view = TrackingView::new(&state.expenses, status, category);
    info!(
        status = %status,
        category = %category,
        shown = view.rows.len(),
        "Tracking view filtered"
    );

    Ok(Json(TrackingResponse::from(&view)))
}
