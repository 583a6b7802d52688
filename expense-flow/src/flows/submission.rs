use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    client::AgentClient,
    envelope::{AgentEnvelope, AgentRequest},
    error::FlowError,
    models::ExpenseResult,
    upload::{ReceiptFile, UploadAdapter, UploadOutcome},
};

pub const SUBMISSION_FAILED: &str = "Failed to process expense";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    Idle,
    Uploading,
    Submitting,
    ResultShown,
    ErrorShown,
}

/// Raw form fields as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ExpenseForm {
    fn validate(&self) -> Result<(), FlowError> {
        for (name, value) in [
            ("vendor", &self.vendor),
            ("date", &self.date),
            ("amount", &self.amount),
        ] {
            if value.trim().is_empty() {
                return Err(FlowError::MissingField(name));
            }
        }
        Ok(())
    }

    /// Natural-language message the agent receives for this submission
    pub fn compose_message(&self, receipt_attached: bool) -> String {
        let optional = |value: &Option<String>, fallback: &'static str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        format!(
            "Please process this expense submission:
Vendor: {}
Date: {}
Amount: {}
Category: {}
Description: {}
Receipt: {}",
            self.vendor.trim(),
            self.date.trim(),
            self.amount.trim(),
            optional(&self.category, "Not specified"),
            optional(&self.description, "Not provided"),
            if receipt_attached { "Attached" } else { "Not attached" },
        )
    }
}

/// View state of the expense submission panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionFlow {
    agent_id: String,
    phase: SubmissionPhase,
    asset_ids: Vec<String>,
    result: Option<ExpenseResult>,
    error: Option<String>,
}

impl SubmissionFlow {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            phase: SubmissionPhase::Idle,
            asset_ids: Vec::new(),
            result: None,
            error: None,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn asset_ids(&self) -> &[String] {
        &self.asset_ids
    }

    pub fn result(&self) -> Option<&ExpenseResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The submit control is disabled while a call is outstanding.
    pub fn can_submit(&self) -> bool {
        !matches!(
            self.phase,
            SubmissionPhase::Uploading | SubmissionPhase::Submitting
        )
    }

    /// Start a new receipt upload. Earlier attachments and the previous
    /// outcome are dropped.
    pub fn begin_upload(&mut self) -> Result<(), FlowError> {
        if !self.can_submit() {
            return Err(FlowError::Busy);
        }
        self.asset_ids.clear();
        self.result = None;
        self.error = None;
        self.phase = SubmissionPhase::Uploading;
        Ok(())
    }

    pub fn finish_upload(&mut self, outcome: UploadOutcome) {
        if outcome.is_success() {
            info!(asset_count = outcome.asset_ids.len(), "Receipt attached");
            self.asset_ids = outcome.asset_ids;
            self.phase = SubmissionPhase::Idle;
        } else {
            let message = outcome.error_message().to_string();
            warn!(error = %message, "Receipt upload failed");
            self.error = Some(message);
            self.phase = SubmissionPhase::ErrorShown;
        }
    }

    pub fn begin_submit(&mut self, form: &ExpenseForm) -> Result<AgentRequest, FlowError> {
        if !self.can_submit() {
            return Err(FlowError::Busy);
        }
        form.validate()?;

        let message = form.compose_message(!self.asset_ids.is_empty());
        self.result = None;
        self.error = None;
        self.phase = SubmissionPhase::Submitting;

        Ok(AgentRequest::new(message, &self.agent_id).with_assets(self.asset_ids.clone()))
    }

    pub fn finish_submit(&mut self, envelope: AgentEnvelope) {
        if envelope.is_success() {
            match envelope.decode_result::<ExpenseResult>() {
                Ok(Some(result)) => {
                    info!(
                        compliant = result.policy_validation.is_compliant,
                        violations = result.policy_validation.violations.len(),
                        "Expense processed"
                    );
                    self.result = Some(result);
                    self.phase = SubmissionPhase::ResultShown;
                    return;
                }
                Ok(None) => warn!("Agent reported success without a result"),
                Err(e) => warn!(error = %e, "Agent result did not match expense schema"),
            }
        }

        let message = envelope
            .failure_message()
            .unwrap_or(SUBMISSION_FAILED)
            .to_string();
        self.error = Some(message);
        self.phase = SubmissionPhase::ErrorShown;
    }

    /// Upload a receipt and attach the returned asset identifiers.
    pub async fn upload(
        &mut self,
        adapter: &dyn UploadAdapter,
        file: ReceiptFile,
    ) -> Result<(), FlowError> {
        self.begin_upload()?;
        let outcome = adapter.upload(file).await;
        self.finish_upload(outcome);
        Ok(())
    }

    /// Send the form to the agent and record the outcome.
    pub async fn submit(
        &mut self,
        client: &dyn AgentClient,
        form: &ExpenseForm,
    ) -> Result<(), FlowError> {
        let request = self.begin_submit(form)?;
        let envelope = client.send(&request).await;
        self.finish_submit(envelope);
        Ok(())
    }
}
