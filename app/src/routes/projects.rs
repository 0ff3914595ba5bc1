use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    core::state::AppState,
    handlers::projects::{
        add_member, create_project, delete_project, get_project, list_projects,
        project_statistics,
    },
};

pub fn project_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_project).get(list_projects))
        .route("/:id", get(get_project).delete(delete_project))
        .route("/:id/add_member", post(add_member))
        .route("/:id/statistics", get(project_statistics))
}
