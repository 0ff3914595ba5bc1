//! Read-only workload snapshot for a principal. Recomputed on every call
//! from the visibility-scoped task set; keeps no bookkeeping of its own.

use chrono::NaiveDateTime;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;

use crate::models::{
    project, task,
    task::{TaskPriority, TaskStatus},
    user,
};
use crate::services::visibility;

const TOP_N: u64 = 5;

#[derive(Debug, Serialize)]
pub struct TaskStats {
    pub total: u64,
    pub todo: u64,
    pub in_progress: u64,
    pub completed: u64,
}

#[derive(Debug, Serialize)]
pub struct TaskOverview {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: NaiveDateTime,
    pub project_name: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardSnapshot {
    pub projects_count: u64,
    pub task_stats: TaskStats,
    pub recent_tasks: Vec<TaskOverview>,
    pub urgent_tasks: Vec<TaskOverview>,
}

fn to_overview(rows: Vec<(task::Model, Option<project::Model>)>) -> Vec<TaskOverview> {
    rows.into_iter()
        .map(|(t, p)| TaskOverview {
            id: t.id,
            title: t.title,
            status: t.status,
            priority: t.priority,
            due_date: t.due_date,
            project_name: p.map(|p| p.name).unwrap_or_default(),
        })
        .collect()
}

async fn count_with_status<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    status: TaskStatus,
) -> Result<u64, DbErr> {
    task::Entity::find()
        .filter(visibility::visible_tasks_condition(user_id))
        .filter(task::Column::Status.eq(status))
        .count(db)
        .await
}

pub async fn snapshot<C: ConnectionTrait>(
    db: &C,
    principal: &user::Model,
) -> Result<DashboardSnapshot, DbErr> {
    let projects_count = visibility::visible_project_count(db, &principal.id).await?;

    let total = task::Entity::find()
        .filter(visibility::visible_tasks_condition(&principal.id))
        .count(db)
        .await?;
    let task_stats = TaskStats {
        total,
        todo: count_with_status(db, &principal.id, TaskStatus::Todo).await?,
        in_progress: count_with_status(db, &principal.id, TaskStatus::InProgress).await?,
        completed: count_with_status(db, &principal.id, TaskStatus::Completed).await?,
    };

    let recent_tasks = task::Entity::find()
        .find_also_related(project::Entity)
        .filter(visibility::visible_tasks_condition(&principal.id))
        .order_by_desc(task::Column::UpdatedAt)
        .limit(TOP_N)
        .all(db)
        .await?;

    // Ordering is implementation-defined; due-date ascending keeps it deterministic.
    let urgent_tasks = task::Entity::find()
        .find_also_related(project::Entity)
        .filter(visibility::visible_tasks_condition(&principal.id))
        .filter(task::Column::Priority.eq(TaskPriority::High))
        .filter(task::Column::Status.is_in([TaskStatus::Todo, TaskStatus::InProgress]))
        .order_by_asc(task::Column::DueDate)
        .limit(TOP_N)
        .all(db)
        .await?;

    Ok(DashboardSnapshot {
        projects_count,
        task_stats,
        recent_tasks: to_overview(recent_tasks),
        urgent_tasks: to_overview(urgent_tasks),
    })
}
