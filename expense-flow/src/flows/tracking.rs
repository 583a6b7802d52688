use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::{
    error::FlowError,
    models::{ExpenseCategory, ExpenseStatus, TrackedExpense},
};

pub const ALL_FILTER: &str = "all";
pub const NO_EXPENSES_FOUND: &str = "No expenses found matching the selected filters";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ExpenseStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: ExpenseStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_FILTER {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_FILTER),
            Self::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ExpenseCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: ExpenseCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_FILTER {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_FILTER),
            Self::Only(category) => fmt::Display::fmt(category, f),
        }
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn expense(
    id: &str,
    (year, month, day): (i32, u32, u32),
    vendor: &str,
    amount: f64,
    category: ExpenseCategory,
    status: ExpenseStatus,
) -> TrackedExpense {
    TrackedExpense {
        id: id.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
        vendor: vendor.to_string(),
        amount,
        category,
        status,
    }
}

/// Records every session starts with
pub fn seed_expenses() -> Vec<TrackedExpense> {
    use ExpenseCategory::*;
    use ExpenseStatus::*;

    vec![
        expense("EXP-001", (2024, 1, 15), "Delta Airlines", 450.00, Travel, Approved),
        expense("EXP-002", (2024, 1, 18), "Office Depot", 89.99, OfficeSupplies, PendingApproval),
        expense("EXP-003", (2024, 1, 20), "The Capital Grille", 125.50, Meals, Rejected),
        expense("EXP-004", (2024, 1, 22), "Adobe", 54.99, Software, Approved),
        expense("EXP-005", (2024, 1, 25), "Marriott Hotels", 320.00, Travel, PendingApproval),
    ]
}

/// Records matching both filters, in their original order.
pub fn filter_expenses<'a>(
    expenses: &'a [TrackedExpense],
    status: StatusFilter,
    category: CategoryFilter,
) -> Vec<&'a TrackedExpense> {
    expenses
        .iter()
        .filter(|e| status.matches(e.status) && category.matches(e.category))
        .collect()
}

/// Filtered table plus the totals shown under it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingView {
    pub status: StatusFilter,
    pub category: CategoryFilter,
    pub rows: Vec<TrackedExpense>,
    pub total: usize,
}

impl TrackingView {
    pub fn new(expenses: &[TrackedExpense], status: StatusFilter, category: CategoryFilter) -> Self {
        Self {
            status,
            category,
            rows: filter_expenses(expenses, status, category)
                .into_iter()
                .cloned()
                .collect(),
            total: expenses.len(),
        }
    }

    pub fn count_label(&self) -> String {
        format!("Showing {} of {} expenses", self.rows.len(), self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_status_filters() -> Vec<StatusFilter> {
        std::iter::once(StatusFilter::All)
            .chain(ExpenseStatus::ALL.into_iter().map(StatusFilter::Only))
            .collect()
    }

    fn all_category_filters() -> Vec<CategoryFilter> {
        std::iter::once(CategoryFilter::All)
            .chain(ExpenseCategory::ALL.into_iter().map(CategoryFilter::Only))
            .collect()
    }

    #[test]
    fn test_every_filter_combination_matches_predicates() {
        let seed = seed_expenses();

        for status in all_status_filters() {
            for category in all_category_filters() {
                let view = TrackingView::new(&seed, status, category);
                let expected: Vec<TrackedExpense> = seed
                    .iter()
                    .filter(|e| status.matches(e.status) && category.matches(e.category))
                    .cloned()
                    .collect();

                assert_eq!(view.rows, expected, "{status} / {category}");
                assert_eq!(
                    view.count_label(),
                    format!("Showing {} of 5 expenses", expected.len())
                );
            }
        }
    }

    #[test]
    fn test_all_filters_show_everything() {
        let seed = seed_expenses();
        let view = TrackingView::new(&seed, StatusFilter::All, CategoryFilter::All);

        assert_eq!(view.rows, seed);
        assert_eq!(view.count_label(), "Showing 5 of 5 expenses");
    }

    #[test]
    fn test_rejected_travel_is_empty() {
        let seed = seed_expenses();
        let view = TrackingView::new(
            &seed,
            "Rejected".parse().unwrap(),
            "Travel".parse().unwrap(),
        );

        assert!(view.rows.is_empty());
        assert_eq!(view.count_label(), "Showing 0 of 5 expenses");
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "Pending Approval".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(ExpenseStatus::PendingApproval))
        );
        assert_eq!(
            "Office Supplies".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(ExpenseCategory::OfficeSupplies))
        );
        assert_eq!(
            "Lunch".parse::<CategoryFilter>(),
            Err(FlowError::InvalidFilter {
                kind: "category",
                value: "Lunch".to_string()
            })
        );
    }

    #[test]
    fn test_seed_ids_unique() {
        let seed = seed_expenses();
        let mut ids: Vec<&str> = seed.iter().map(|e| e.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), seed.len());
    }
}
