//! Application router configuration.

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    AppState, dashboard::get_dashboard_data, endpoints, not_found::get_404_not_found,
    sign_up::sign_up, transaction::create_transaction_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::SIGN_UP, post(sign_up))
        .route(endpoints::ADD_TRANSACTION, post(create_transaction_endpoint))
        .route(endpoints::DASHBOARD_DATA, get(get_dashboard_data))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Allow browsers on `allowed_origins` to call the API with credentials.
pub fn cors_layer(allowed_origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins.iter().cloned()))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
