use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::{
    core::state::AppState,
    handlers::{
        comments::{add_attachment, add_comment, edit_comment, list_attachments, list_comments},
        tasks::{
            change_status, create_task, delete_task, get_task, list_tasks, task_history,
            update_task,
        },
    },
};

pub fn task_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_task).get(list_tasks))
        .route(
            "/:id",
            get(get_task)
                .put(update_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .route("/:id/change_status", post(change_status))
        .route("/:id/history", get(task_history))
        .route("/:id/comments", post(add_comment).get(list_comments))
        .route("/:id/comments/:comment_id", patch(edit_comment))
        .route("/:id/attachments", post(add_attachment).get(list_attachments))
}
