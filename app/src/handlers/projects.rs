use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    core::state::AppState,
    models::{project::Model as Project, user::Model as User},
    repos::projects::{NewProject, ProjectStatistics, ProjectsRepo},
    utils::response::ApiResult,
};

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Option<String>,
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(input): Json<NewProject>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let projects_repo = ProjectsRepo::new(state.database.clone());
    let project = projects_repo.create(&user, input).await?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects_repo = ProjectsRepo::new(state.database.clone());
    let projects = projects_repo.list_visible(&user).await?;

    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Project>> {
    let projects_repo = ProjectsRepo::new(state.database.clone());
    let project = projects_repo.get(&project_id, &user).await?;

    Ok(Json(project))
}

pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(project_id): Path<String>,
    Json(input): Json<AddMemberRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let projects_repo = ProjectsRepo::new(state.database.clone());
    projects_repo
        .add_member(&project_id, &user, input.user_id.as_deref().unwrap_or(""))
        .await?;

    Ok(Json(
        serde_json::json!({ "status": "Member added successfully" }),
    ))
}

pub async fn project_statistics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ProjectStatistics>> {
    let projects_repo = ProjectsRepo::new(state.database.clone());
    let stats = projects_repo.statistics(&project_id, &user).await?;

    Ok(Json(stats))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(project_id): Path<String>,
) -> ApiResult<StatusCode> {
    let projects_repo = ProjectsRepo::new(state.database.clone());
    projects_repo.delete(&project_id, &user).await?;

    Ok(StatusCode::NO_CONTENT)
}
