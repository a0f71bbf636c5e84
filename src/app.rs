use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/calculate", post(handlers::calculate))
        .route("/record", post(handlers::record))
        .route("/delete-latest", post(handlers::delete_latest))
        .route("/settings", post(handlers::save_settings))
        .route("/settings/open", post(handlers::open_settings))
        .route("/settings/close", post(handlers::close_settings))
        .route("/api/settings", get(handlers::get_settings))
        .route("/api/records", get(handlers::get_records))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/session", get(handlers::get_session))
        .with_state(state)
}
