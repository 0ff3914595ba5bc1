use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    core::state::AppState,
    models::{
        task_attachment::Model as TaskAttachment, task_comment::Model as TaskComment,
        user::Model as User,
    },
    repos::{
        task_attachments::TaskAttachmentsRepo, task_comments::TaskCommentsRepo, tasks::TasksRepo,
    },
    utils::response::ApiResult,
};

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentRequest {
    pub file_ref: Option<String>,
}

pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<String>,
    Json(input): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<TaskComment>)> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    let task = tasks_repo.get(&task_id, &user).await?;

    let comments_repo = TaskCommentsRepo::new(state.database.clone());
    let comment = comments_repo
        .create(&task, &user, input.content.unwrap_or_default())
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Vec<TaskComment>>> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    let task = tasks_repo.get(&task_id, &user).await?;

    let comments_repo = TaskCommentsRepo::new(state.database.clone());
    let comments = comments_repo.list_for_task(&task.id).await?;

    Ok(Json(comments))
}

pub async fn edit_comment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path((task_id, comment_id)): Path<(String, String)>,
    Json(input): Json<CommentRequest>,
) -> ApiResult<Json<TaskComment>> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    tasks_repo.get(&task_id, &user).await?;

    let comments_repo = TaskCommentsRepo::new(state.database.clone());
    let comment = comments_repo
        .edit(&comment_id, &user, input.content.unwrap_or_default())
        .await?;

    Ok(Json(comment))
}

pub async fn add_attachment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<String>,
    Json(input): Json<AttachmentRequest>,
) -> ApiResult<(StatusCode, Json<TaskAttachment>)> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    let task = tasks_repo.get(&task_id, &user).await?;

    let attachments_repo = TaskAttachmentsRepo::new(state.database.clone());
    let attachment = attachments_repo
        .create(&task, &user, input.file_ref.unwrap_or_default())
        .await?;

    Ok((StatusCode::CREATED, Json(attachment)))
}

pub async fn list_attachments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Vec<TaskAttachment>>> {
    let tasks_repo = TasksRepo::new(state.database.clone());
    let task = tasks_repo.get(&task_id, &user).await?;

    let attachments_repo = TaskAttachmentsRepo::new(state.database.clone());
    let attachments = attachments_repo.list_for_task(&task.id).await?;

    Ok(Json(attachments))
}
