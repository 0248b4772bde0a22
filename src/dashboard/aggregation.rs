//! Transaction aggregation for the dashboard.
//!
//! Computes all-time totals, daily trend series over rolling windows and
//! per-category shares from a user's transactions. Everything here is a pure
//! function of the transactions and the time passed in as "now".

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
};

use time::{Date, Duration, OffsetDateTime};
use time_tz::Tz;

use crate::{
    dashboard::models::{
        CategoryDistribution, CategoryShare, DashboardResult, Totals, Trend, TrendPoint,
    },
    timezone::to_local_time,
    transaction::{Transaction, TransactionType},
};

/// Number of days covered by the weekly trend.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;
/// Number of days covered by the monthly trend.
pub const MONTHLY_WINDOW_DAYS: i64 = 30;

/// Build the full dashboard for a set of transactions.
///
/// `timezone` decides the local calendar days used for the trend windows and
/// for grouping transactions into days.
pub fn build_dashboard(
    transactions: &[Transaction],
    now: OffsetDateTime,
    timezone: &Tz,
) -> DashboardResult {
    DashboardResult {
        totals: calculate_totals(transactions),
        trend: Trend {
            weekly: daily_trend(transactions, now, timezone, WEEKLY_WINDOW_DAYS),
            monthly: daily_trend(transactions, now, timezone, MONTHLY_WINDOW_DAYS),
        },
        category_distribution: category_distribution(transactions),
    }
}

/// Sum the amounts of all transactions per type.
pub(super) fn calculate_totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => totals.income += transaction.amount,
            TransactionType::Expense => totals.expense += transaction.amount,
        }
    }

    totals.balance = totals.income - totals.expense;
    totals
}

/// The first local calendar day of a trend window, `days` days before the
/// local date of `now`.
///
/// The window starts at local midnight of this day.
pub(super) fn window_start_date(now: OffsetDateTime, timezone: &Tz, days: i64) -> Date {
    to_local_time(now, timezone)
        .date()
        .checked_sub(Duration::days(days))
        .unwrap_or(Date::MIN)
}

/// Sum income and expense per local calendar day for the transactions created
/// between local midnight of [window_start_date] and `now`, inclusive.
///
/// Only days with at least one transaction are included. Rows are sorted by
/// date, oldest first.
pub(super) fn daily_trend(
    transactions: &[Transaction],
    now: OffsetDateTime,
    timezone: &Tz,
    days: i64,
) -> Vec<TrendPoint> {
    let start_date = window_start_date(now, timezone, days);
    let mut points: BTreeMap<Date, TrendPoint> = BTreeMap::new();

    for transaction in transactions {
        if transaction.created_at > now {
            continue;
        }

        let date = to_local_time(transaction.created_at, timezone).date();
        if date < start_date {
            continue;
        }

        let point = points.entry(date).or_insert(TrendPoint {
            date,
            income: 0.0,
            expense: 0.0,
        });

        match transaction.transaction_type {
            TransactionType::Income => point.income += transaction.amount,
            TransactionType::Expense => point.expense += transaction.amount,
        }
    }

    points.into_values().collect()
}

/// Split the transactions by type and compute each category's share.
pub(super) fn category_distribution(transactions: &[Transaction]) -> CategoryDistribution {
    let (income, expense): (Vec<&Transaction>, Vec<&Transaction>) = transactions
        .iter()
        .partition(|transaction| transaction.transaction_type == TransactionType::Income);

    CategoryDistribution {
        income: category_shares(&income),
        expense: category_shares(&expense),
    }
}

/// Sum the amounts per category name and express each as a percentage of the
/// total.
///
/// Sorted by amount, largest first. Equal amounts are ordered by category name.
fn category_shares(transactions: &[&Transaction]) -> Vec<CategoryShare> {
    let mut amounts: HashMap<&str, f64> = HashMap::new();
    let mut total = 0.0;

    for transaction in transactions {
        *amounts
            .entry(transaction.category.name.as_str())
            .or_insert(0.0) += transaction.amount;
        total += transaction.amount;
    }

    let mut shares: Vec<CategoryShare> = amounts
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category: category.to_owned(),
            amount,
            percentage: percent_of(amount, total),
        })
        .collect();

    shares.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    shares
}

fn percent_of(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total * 100.0
    }
}
