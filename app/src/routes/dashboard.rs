use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{core::state::AppState, handlers::dashboard::get_dashboard};

pub fn dashboard_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_dashboard))
}
