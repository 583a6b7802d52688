// Expense portal flows: each owns its own view state
pub mod chat;
pub mod submission;
pub mod tracking;

pub use chat::ChatFlow;
pub use submission::{ExpenseForm, SubmissionFlow, SubmissionPhase};
pub use tracking::{
    CategoryFilter, StatusFilter, TrackingView, filter_expenses, seed_expenses,
};
