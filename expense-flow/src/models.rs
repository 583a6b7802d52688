use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FlowError;

/// Fields the agent extracted from a submitted expense
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseDetails {
    pub vendor: String,
    pub date: String,
    pub amount: f64,
    pub currency: String,
    pub category: String,
    pub items: Vec<String>,
}

/// Policy compliance verdict for a submitted expense
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyValidation {
    pub is_compliant: bool,
    pub violations: Vec<String>,
    pub warnings: Vec<String>,
    pub approval_required: bool,
}

/// Structured agent payload shared by the submission and chat flows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseResult {
    pub expense_details: ExpenseDetails,
    pub policy_validation: PolicyValidation,
    pub answer: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Travel,
    Meals,
    #[serde(rename = "Office Supplies")]
    OfficeSupplies,
    Software,
    Hardware,
    Training,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        Self::Travel,
        Self::Meals,
        Self::OfficeSupplies,
        Self::Software,
        Self::Hardware,
        Self::Training,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Travel => "Travel",
            Self::Meals => "Meals",
            Self::OfficeSupplies => "Office Supplies",
            Self::Software => "Software",
            Self::Hardware => "Hardware",
            Self::Training => "Training",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| FlowError::InvalidFilter {
                kind: "category",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseStatus {
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub const ALL: [ExpenseStatus; 3] = [Self::PendingApproval, Self::Approved, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingApproval => "Pending Approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseStatus {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| FlowError::InvalidFilter {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// A previously submitted expense shown in the tracking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedExpense {
    pub id: String,
    pub date: NaiveDate,
    pub vendor: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub status: ExpenseStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One transcript entry of the policy chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            recommendations: None,
        }
    }

    /// Empty recommendation lists are stored as `None`.
    pub fn assistant(content: impl Into<String>, recommendations: Vec<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            recommendations: if recommendations.is_empty() {
                None
            } else {
                Some(recommendations)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_names_round_trip_through_from_str() {
        for category in ExpenseCategory::ALL {
            assert_eq!(category.as_str().parse::<ExpenseCategory>(), Ok(category));
        }
        assert!("Snacks".parse::<ExpenseCategory>().is_err());
    }

    #[test]
    fn test_status_serializes_with_display_name() {
        let value = serde_json::to_value(ExpenseStatus::PendingApproval).unwrap();
        assert_eq!(value, json!("Pending Approval"));
    }

    #[test]
    fn test_partial_agent_result_uses_defaults() {
        let result: ExpenseResult = serde_json::from_value(json!({
            "answer": "Limit is $50/day",
            "recommendations": ["Keep receipts"]
        }))
        .unwrap();

        assert_eq!(result.answer, "Limit is $50/day");
        assert_eq!(result.recommendations, vec!["Keep receipts".to_string()]);
        assert!(!result.policy_validation.is_compliant);
        assert!(result.expense_details.items.is_empty());
    }

    #[test]
    fn test_assistant_message_drops_empty_recommendations() {
        let message = ChatMessage::assistant("hello", Vec::new());
        assert!(message.recommendations.is_none());

        let serialized = serde_json::to_value(&message).unwrap();
        assert_eq!(serialized, json!({ "role": "assistant", "content": "hello" }));
    }
}
