use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::{
    models::{
        task::Model as Task,
        task_comment::{self, ActiveModel, Entity as CommentEntity, Model as TaskComment},
        user::Model as User,
    },
    utils::{
        ids::generate_id,
        response::{ApiError, ApiResult},
    },
};

pub struct TaskCommentsRepo {
    db: DatabaseConnection,
}

impl TaskCommentsRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        task: &Task,
        author: &User,
        content: String,
    ) -> ApiResult<TaskComment> {
        if content.trim().is_empty() {
            return Err(ApiError::Validation("content is required".to_string()));
        }

        let now = Utc::now().naive_utc();
        let comment_model = ActiveModel {
            id: Set(generate_id()),
            task_id: Set(task.id.clone()),
            author_id: Set(author.id.clone()),
            content: Set(content),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let comment = comment_model.insert(&self.db).await?;

        Ok(comment)
    }

    pub async fn list_for_task(&self, task_id: &str) -> ApiResult<Vec<TaskComment>> {
        let comments = CommentEntity::find()
            .filter(task_comment::Column::TaskId.eq(task_id))
            .order_by_asc(task_comment::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(comments)
    }

    /// Only the author may edit; edits bump `updated_at`.
    pub async fn edit(
        &self,
        comment_id: &str,
        principal: &User,
        content: String,
    ) -> ApiResult<TaskComment> {
        if content.trim().is_empty() {
            return Err(ApiError::Validation("content is required".to_string()));
        }

        let comment = CommentEntity::find_by_id(comment_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

        if comment.author_id != principal.id {
            return Err(ApiError::Forbidden(
                "Only the author may edit this comment".to_string(),
            ));
        }

        let mut active: ActiveModel = comment.into();
        active.content = Set(content);
        active.updated_at = Set(Utc::now().naive_utc());
        let updated = active.update(&self.db).await?;

        Ok(updated)
    }
}
