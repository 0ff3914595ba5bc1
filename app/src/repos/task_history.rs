use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::{
    models::{
        task::TaskStatus,
        task_history::{self, ActiveModel, Entity as HistoryEntity, Model as TaskHistory},
    },
    utils::{ids::generate_id, response::ApiResult},
};

pub struct TaskHistoryRepo {
    db: DatabaseConnection,
}

impl TaskHistoryRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts an audit row on the given connection, usually the transaction
    /// that carries the task update itself. `index` is a per-task counter so
    /// entries sharing a timestamp still order deterministically.
    #[allow(clippy::too_many_arguments)]
    pub async fn record<C: ConnectionTrait>(
        conn: &C,
        task_id: &str,
        changed_by: &str,
        old_status: TaskStatus,
        new_status: TaskStatus,
        old_assigned_to: Option<String>,
        new_assigned_to: Option<String>,
        notes: String,
        changed_at: NaiveDateTime,
    ) -> Result<TaskHistory, DbErr> {
        let entry_count = HistoryEntity::find()
            .filter(task_history::Column::TaskId.eq(task_id))
            .count(conn)
            .await? as i16;

        let history_model = ActiveModel {
            id: Set(generate_id()),
            task_id: Set(task_id.to_string()),
            changed_by: Set(changed_by.to_string()),
            old_status: Set(old_status),
            new_status: Set(new_status),
            old_assigned_to: Set(old_assigned_to),
            new_assigned_to: Set(new_assigned_to),
            index: Set(entry_count),
            notes: Set(notes),
            changed_at: Set(changed_at),
        };

        history_model.insert(conn).await
    }

    /// All audit rows for a task, newest first.
    pub async fn list_for_task(&self, task_id: &str) -> ApiResult<Vec<TaskHistory>> {
        let history = HistoryEntity::find()
            .filter(task_history::Column::TaskId.eq(task_id))
            .order_by_desc(task_history::Column::ChangedAt)
            .order_by_desc(task_history::Column::Index)
            .all(&self.db)
            .await?;

        Ok(history)
    }
}
