use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    core::state::AppState,
    models::{task::Model as Task, task_history::Model as TaskHistory, user::Model as User},
    repos::tasks::{NewTask, TaskChanges, TasksRepo},
    utils::response::ApiResult,
};

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: Option<String>,
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(input): Json<NewTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    let task = tasks_repo.create(&user, input).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    let tasks = tasks_repo.list_visible(&user).await?;

    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    let task = tasks_repo.get(&task_id, &user).await?;

    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<String>,
    Json(changes): Json<TaskChanges>,
) -> ApiResult<Json<Task>> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    let task = tasks_repo.update(&task_id, &user, changes).await?;

    Ok(Json(task))
}

pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<String>,
    Json(input): Json<ChangeStatusRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    tasks_repo
        .change_status(&task_id, &user, input.status.as_deref().unwrap_or(""))
        .await?;

    Ok(Json(
        serde_json::json!({ "status": "Status updated successfully" }),
    ))
}

pub async fn task_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Vec<TaskHistory>>> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    let history = tasks_repo.history(&task_id, &user).await?;

    Ok(Json(history))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<String>,
) -> ApiResult<StatusCode> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    tasks_repo.delete(&task_id, &user).await?;

    Ok(StatusCode::NO_CONTENT)
}
