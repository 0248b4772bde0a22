//! The shapes returned by the dashboard endpoint.

use serde::{Deserialize, Serialize};
use time::Date;

/// Everything the dashboard displays for one user, derived from their transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResult {
    /// All-time totals.
    pub totals: Totals,
    /// Daily sums over the recent trend windows.
    pub trend: Trend,
    /// Share of each category within each transaction type.
    pub category_distribution: CategoryDistribution,
}

/// The all-time sums of a user's transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all expenses.
    pub expense: f64,
    /// Income minus expense.
    pub balance: f64,
}

/// Daily income and expense over the last week and the last month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Days from local midnight seven days ago up to now.
    pub weekly: Vec<TrendPoint>,
    /// Days from local midnight thirty days ago up to now.
    pub monthly: Vec<TrendPoint>,
}

/// The sums for one local calendar day that has at least one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Serialized as "YYYY-MM-DD".
    pub date: Date,
    /// Income recorded on the day.
    pub income: f64,
    /// Expenses recorded on the day.
    pub expense: f64,
}

/// Category shares split by transaction type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDistribution {
    /// Income categories, largest first.
    pub income: Vec<CategoryShare>,
    /// Expense categories, largest first.
    pub expense: Vec<CategoryShare>,
}

/// The summed amount of one category and its percentage of the type total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    /// The category name.
    pub category: String,
    /// The summed amount of the category's transactions.
    pub amount: f64,
    /// A value in 0..=100.
    pub percentage: f64,
}
