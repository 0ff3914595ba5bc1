//! Task lifecycle engine: creation, field updates, status changes and the
//! audit trail. Every committed change to a task's status or assignee is
//! paired with exactly one history row in the same transaction.

use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Deserializer};

use crate::{
    models::{
        project::Entity as ProjectEntity,
        task::{self, ActiveModel, Entity as TaskEntity, Model as Task, TaskPriority, TaskStatus},
        task_attachment::{self, Entity as AttachmentEntity},
        task_comment::{self, Entity as CommentEntity},
        task_history::{self, Entity as HistoryEntity},
        user::Model as User,
    },
    repos::{task_history::TaskHistoryRepo, users::UsersRepo},
    services::visibility,
    utils::{
        ids::generate_id,
        response::{ApiError, ApiResult},
    },
};

/// Concurrent same-task writes are retried this many times before the
/// contention is surfaced to the caller.
const MAX_WRITE_ATTEMPTS: usize = 3;

#[derive(Debug, Deserialize)]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<String>,
    pub assigned_to: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<NaiveDateTime>,
}

/// Partial update. `assigned_to` distinguishes "leave alone" (absent) from
/// "unassign" (explicit null).
#[derive(Debug, Default, Deserialize)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<String>>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<NaiveDateTime>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Validated changes, ready to apply inside the write loop.
struct ResolvedChanges {
    title: Option<String>,
    description: Option<String>,
    assigned_to: Option<Option<String>>,
    priority: Option<TaskPriority>,
    status: Option<TaskStatus>,
    due_date: Option<NaiveDateTime>,
    manual_status_change: bool,
}

pub struct TasksRepo {
    db: DatabaseConnection,
}

impl TasksRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, principal: &User, input: NewTask) -> ApiResult<Task> {
        let title = input
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("title is required".to_string()))?;
        let description = input
            .description
            .ok_or_else(|| ApiError::Validation("description is required".to_string()))?;
        let due_date = input
            .due_date
            .ok_or_else(|| ApiError::Validation("due_date is required".to_string()))?;
        let project_id = input
            .project_id
            .ok_or_else(|| ApiError::Validation("project_id is required".to_string()))?;

        let project = ProjectEntity::find_by_id(&project_id).one(&self.db).await?;
        if project.is_none() {
            return Err(ApiError::Validation("Invalid project reference".to_string()));
        }

        let priority = match input.priority.as_deref() {
            Some(p) => TaskPriority::parse(p)
                .ok_or_else(|| ApiError::Validation("Invalid priority".to_string()))?,
            None => TaskPriority::Medium,
        };
        let status = match input.status.as_deref() {
            Some(s) => TaskStatus::parse(s)
                .ok_or_else(|| ApiError::Validation("Invalid status".to_string()))?,
            None => TaskStatus::Todo,
        };
        let assigned_to = match input.assigned_to {
            Some(user_id) => {
                self.ensure_assignee_exists(&user_id).await?;
                Some(user_id)
            }
            None => None,
        };

        let now = Utc::now().naive_utc();
        let task_model = ActiveModel {
            id: Set(generate_id()),
            title: Set(title),
            description: Set(description),
            project_id: Set(project_id),
            // the acting principal owns the task regardless of input
            created_by: Set(principal.id.clone()),
            assigned_to: Set(assigned_to),
            priority: Set(priority),
            status: Set(status),
            due_date: Set(due_date),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let task = task_model.insert(&self.db).await?;

        Ok(task)
    }

    pub async fn get(&self, task_id: &str, principal: &User) -> ApiResult<Task> {
        let task = TaskEntity::find_by_id(task_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

        if !visibility::can_access_task(&self.db, &principal.id, &task).await? {
            return Err(ApiError::Forbidden(
                "You do not have access to this task".to_string(),
            ));
        }

        Ok(task)
    }

    pub async fn list_visible(&self, principal: &User) -> ApiResult<Vec<Task>> {
        let tasks = visibility::visible_tasks(&self.db, &principal.id).await?;

        Ok(tasks)
    }

    pub async fn update(
        &self,
        task_id: &str,
        principal: &User,
        changes: TaskChanges,
    ) -> ApiResult<Task> {
        self.get(task_id, principal).await?;

        let status = match changes.status.as_deref() {
            Some(s) => Some(
                TaskStatus::parse(s)
                    .ok_or_else(|| ApiError::Validation("Invalid status".to_string()))?,
            ),
            None => None,
        };
        let priority = match changes.priority.as_deref() {
            Some(p) => Some(
                TaskPriority::parse(p)
                    .ok_or_else(|| ApiError::Validation("Invalid priority".to_string()))?,
            ),
            None => None,
        };
        if let Some(Some(user_id)) = &changes.assigned_to {
            self.ensure_assignee_exists(user_id).await?;
        }

        self.apply(
            task_id,
            principal,
            ResolvedChanges {
                title: changes.title,
                description: changes.description,
                assigned_to: changes.assigned_to,
                priority,
                status,
                due_date: changes.due_date,
                manual_status_change: false,
            },
        )
        .await
    }

    /// Restricted mutation touching only the status field. The status string
    /// is validated before any persisted state is read or written.
    pub async fn change_status(
        &self,
        task_id: &str,
        principal: &User,
        new_status: &str,
    ) -> ApiResult<Task> {
        let status = TaskStatus::parse(new_status)
            .ok_or_else(|| ApiError::Validation("Invalid status".to_string()))?;

        self.get(task_id, principal).await?;

        self.apply(
            task_id,
            principal,
            ResolvedChanges {
                title: None,
                description: None,
                assigned_to: None,
                priority: None,
                status: Some(status),
                due_date: None,
                manual_status_change: true,
            },
        )
        .await
    }

    pub async fn history(
        &self,
        task_id: &str,
        principal: &User,
    ) -> ApiResult<Vec<task_history::Model>> {
        self.get(task_id, principal).await?;

        let history_repo = TaskHistoryRepo::new(self.db.clone());
        history_repo.list_for_task(task_id).await
    }

    /// Deletes the task and its owned children (comments, attachments,
    /// history) as one transaction.
    pub async fn delete(&self, task_id: &str, principal: &User) -> ApiResult<()> {
        let task = self.get(task_id, principal).await?;

        let txn = self.db.begin().await?;
        AttachmentEntity::delete_many()
            .filter(task_attachment::Column::TaskId.eq(&task.id))
            .exec(&txn)
            .await?;
        CommentEntity::delete_many()
            .filter(task_comment::Column::TaskId.eq(&task.id))
            .exec(&txn)
            .await?;
        HistoryEntity::delete_many()
            .filter(task_history::Column::TaskId.eq(&task.id))
            .exec(&txn)
            .await?;
        TaskEntity::delete_by_id(&task.id).exec(&txn).await?;
        txn.commit().await?;

        Ok(())
    }

    /// Read-modify-write-and-audit as one serializable unit per task row.
    /// Optimistic compare-and-set on `updated_at`: a concurrent committed
    /// update invalidates the read snapshot and the attempt is retried.
    async fn apply(
        &self,
        task_id: &str,
        principal: &User,
        changes: ResolvedChanges,
    ) -> ApiResult<Task> {
        for _attempt in 0..MAX_WRITE_ATTEMPTS {
            let txn = self.db.begin().await?;

            let Some(current) = TaskEntity::find_by_id(task_id).one(&txn).await? else {
                txn.rollback().await?;
                return Err(ApiError::NotFound("Task not found".to_string()));
            };
            let old_status = current.status.clone();
            let old_assigned = current.assigned_to.clone();
            let new_status = changes.status.clone().unwrap_or_else(|| old_status.clone());
            let new_assigned = match &changes.assigned_to {
                Some(value) => value.clone(),
                None => old_assigned.clone(),
            };
            let now = Utc::now().naive_utc();

            let mut active: ActiveModel = Default::default();
            if let Some(title) = &changes.title {
                active.title = Set(title.clone());
            }
            if let Some(description) = &changes.description {
                active.description = Set(description.clone());
            }
            if let Some(due_date) = changes.due_date {
                active.due_date = Set(due_date);
            }
            if let Some(priority) = &changes.priority {
                active.priority = Set(priority.clone());
            }
            if let Some(status) = &changes.status {
                active.status = Set(status.clone());
            }
            if let Some(assigned) = &changes.assigned_to {
                active.assigned_to = Set(assigned.clone());
            }
            active.updated_at = Set(now);

            let result = TaskEntity::update_many()
                .set(active)
                .filter(task::Column::Id.eq(task_id))
                .filter(task::Column::UpdatedAt.eq(current.updated_at))
                .exec(&txn)
                .await?;
            if result.rows_affected == 0 {
                // snapshot superseded by a concurrent commit
                txn.rollback().await?;
                continue;
            }

            if new_status != old_status || new_assigned != old_assigned {
                let notes = if changes.manual_status_change {
                    format!("Status manually changed to {}", new_status.as_str())
                } else {
                    format!(
                        "Status changed from {} to {}",
                        old_status.as_str(),
                        new_status.as_str()
                    )
                };
                TaskHistoryRepo::record(
                    &txn,
                    &current.id,
                    &principal.id,
                    old_status,
                    new_status,
                    old_assigned,
                    new_assigned,
                    notes,
                    now,
                )
                .await?;
            }

            txn.commit().await?;

            let updated = TaskEntity::find_by_id(task_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
            return Ok(updated);
        }

        Err(ApiError::Database(DbErr::Custom(
            "Task update contention persisted across retries".to_string(),
        )))
    }

    async fn ensure_assignee_exists(&self, user_id: &str) -> ApiResult<()> {
        let users_repo = UsersRepo::new(self.db.clone());
        if !users_repo.exists(user_id).await? {
            return Err(ApiError::Validation("Unknown assignee".to_string()));
        }

        Ok(())
    }
}
