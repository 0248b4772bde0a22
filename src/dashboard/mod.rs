//! Dashboard module
//!
//! Provides the JSON endpoint with a user's totals, recent daily trends and
//! the share of each category within income and expenses.

mod aggregation;
mod handlers;
mod models;

pub use aggregation::build_dashboard;
pub use handlers::get_dashboard_data;
pub use models::DashboardResult;
