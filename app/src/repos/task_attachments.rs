use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::{
    models::{
        task::Model as Task,
        task_attachment::{self, ActiveModel, Entity as AttachmentEntity, Model as TaskAttachment},
        user::Model as User,
    },
    utils::{
        ids::generate_id,
        response::{ApiError, ApiResult},
    },
};

pub struct TaskAttachmentsRepo {
    db: DatabaseConnection,
}

impl TaskAttachmentsRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        task: &Task,
        uploader: &User,
        file_ref: String,
    ) -> ApiResult<TaskAttachment> {
        if file_ref.trim().is_empty() {
            return Err(ApiError::Validation("file_ref is required".to_string()));
        }

        let attachment_model = ActiveModel {
            id: Set(generate_id()),
            task_id: Set(task.id.clone()),
            file_ref: Set(file_ref),
            uploaded_by: Set(uploader.id.clone()),
            uploaded_at: Set(Utc::now().naive_utc()),
        };
        let attachment = attachment_model.insert(&self.db).await?;

        Ok(attachment)
    }

    pub async fn list_for_task(&self, task_id: &str) -> ApiResult<Vec<TaskAttachment>> {
        let attachments = AttachmentEntity::find()
            .filter(task_attachment::Column::TaskId.eq(task_id))
            .order_by_asc(task_attachment::Column::UploadedAt)
            .all(&self.db)
            .await?;

        Ok(attachments)
    }
}
