use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{
    core::state::AppState,
    models::user::Model as User,
    services::dashboard::{self, DashboardSnapshot},
    utils::response::ApiResult,
};

pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<DashboardSnapshot>> {
    let snapshot = dashboard::snapshot(&state.database, &user).await?;

    Ok(Json(snapshot))
}
