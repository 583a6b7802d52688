//! Markdown renderings of each panel.
//!
//! These are what a client displays: error banners, the extracted expense
//! card, the tracking table and the chat transcript.

use std::fmt::Write;

use crate::{
    flows::{
        ChatFlow, SubmissionFlow, SubmissionPhase, TrackingView,
        tracking::NO_EXPENSES_FOUND,
    },
    models::{ChatRole, ExpenseResult},
};

pub const COMPLIANT_BADGE: &str = "✅ Compliant";
pub const NON_COMPLIANT_BADGE: &str = "❌ Non-Compliant";
pub const APPROVAL_REQUIRED_BADGE: &str = "⚠️ Approval Required";
pub const AUTO_APPROVED_BADGE: &str = "🟢 No Approval Needed";

fn error_banner(out: &mut String, message: &str) {
    let _ = writeln!(out, "> **Error:** {}", message);
}

fn bullet_section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n### {}", title);
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
}

/// Extracted details, policy verdict and recommendations for one result
pub fn render_expense_result(result: &ExpenseResult) -> String {
    let mut out = String::new();
    let details = &result.expense_details;
    let policy = &result.policy_validation;

    let _ = writeln!(out, "## Expense Details");
    let _ = writeln!(out, "- Vendor: {}", details.vendor);
    let _ = writeln!(out, "- Date: {}", details.date);
    let _ = writeln!(out, "- Amount: {} {:.2}", details.currency, details.amount);
    let _ = writeln!(out, "- Category: {}", details.category);
    bullet_section(&mut out, "Items", &details.items);

    let _ = writeln!(out, "\n## Policy Validation");
    let _ = writeln!(
        out,
        "{}",
        if policy.is_compliant {
            COMPLIANT_BADGE
        } else {
            NON_COMPLIANT_BADGE
        }
    );
    let _ = writeln!(
        out,
        "{}",
        if policy.approval_required {
            APPROVAL_REQUIRED_BADGE
        } else {
            AUTO_APPROVED_BADGE
        }
    );
    bullet_section(&mut out, "Violations", &policy.violations);
    bullet_section(&mut out, "Warnings", &policy.warnings);

    if !result.answer.trim().is_empty() {
        let _ = writeln!(out, "\n{}", result.answer);
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "\n## Recommendations");
        for recommendation in &result.recommendations {
            let _ = writeln!(out, "- {}", recommendation);
        }
    }

    out
}

pub fn render_submission(flow: &SubmissionFlow) -> String {
    let mut out = String::new();

    match flow.phase() {
        SubmissionPhase::Uploading => {
            let _ = writeln!(out, "_Uploading receipt..._");
        }
        SubmissionPhase::Submitting => {
            let _ = writeln!(out, "_Processing expense..._");
        }
        SubmissionPhase::ErrorShown => {
            if let Some(error) = flow.error() {
                error_banner(&mut out, error);
            }
        }
        SubmissionPhase::ResultShown => {
            if let Some(result) = flow.result() {
                out.push_str(&render_expense_result(result));
            }
        }
        SubmissionPhase::Idle => {}
    }

    if !flow.asset_ids().is_empty() {
        let _ = writeln!(out, "📎 Receipt attached ({} file(s))", flow.asset_ids().len());
    }

    out
}

pub fn render_tracking(view: &TrackingView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "| ID | Date | Vendor | Amount | Category | Status |");
    let _ = writeln!(out, "|---|---|---|---|---|---|");

    if view.rows.is_empty() {
        let _ = writeln!(out, "| {} |||||", NO_EXPENSES_FOUND);
    }
    for expense in &view.rows {
        let _ = writeln!(
            out,
            "| {} | {} | {} | ${:.2} | {} | {} |",
            expense.id,
            expense.date.format("%Y-%m-%d"),
            expense.vendor,
            expense.amount,
            expense.category,
            expense.status
        );
    }

    let _ = writeln!(out, "\n{}", view.count_label());
    out
}

pub fn render_transcript(chat: &ChatFlow) -> String {
    let mut out = String::new();

    if let Some(error) = chat.error() {
        error_banner(&mut out, error);
    }

    for message in chat.transcript() {
        let speaker = match message.role {
            ChatRole::User => "You",
            ChatRole::Assistant => "Assistant",
        };
        let _ = writeln!(out, "\n**{}:** {}", speaker, message.content);

        if let Some(recommendations) = message.recommendations.as_ref().filter(|r| !r.is_empty()) {
            let _ = writeln!(out, "\n---\n**Recommendations:**");
            for recommendation in recommendations {
                let _ = writeln!(out, "- {}", recommendation);
            }
        }
    }

    if chat.is_loading() {
        let _ = writeln!(out, "\n_Assistant is typing..._");
    }

    out
}
