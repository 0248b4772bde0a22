//! Dashboard HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    api_response::ApiResponse,
    dashboard::{aggregation::build_dashboard, models::DashboardResult},
    timezone::get_timezone,
    transaction::get_transactions_by_user,
    user::UserId,
};

/// The state needed for computing the dashboard.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Get the totals, trends and category distribution for a user.
///
/// A user without transactions, including an unknown user, gets zero totals
/// and empty series.
pub async fn get_dashboard_data(
    State(state): State<DashboardState>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<DashboardResult>, Error> {
    let local_timezone = get_timezone(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_transactions_by_user(&UserId::new(user_id), &connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?
    };

    let dashboard = build_dashboard(&transactions, OffsetDateTime::now_utc(), local_timezone);

    Ok(ApiResponse::success(
        StatusCode::OK,
        dashboard,
        "Dashboard data fetched successfully",
    ))
}
