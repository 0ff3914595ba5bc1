pub mod dashboard;
pub mod projects;
pub mod tasks;

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::cors::CorsLayer;

use crate::{
    core::state::AppState,
    middlewares::auth::require_auth,
    routes::{dashboard::dashboard_routes, projects::project_routes, tasks::task_routes},
    utils::global_error_handler::global_error_handler,
};

pub fn create_routers(state: Arc<AppState>) -> Router<()> {
    let protected_routes = Router::new()
        .nest("/tasks", task_routes())
        .nest("/projects", project_routes())
        .nest("/dashboard", dashboard_routes())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/api", protected_routes)
        .layer(CorsLayer::permissive())
        .fallback(global_error_handler)
        .with_state(state)
}
