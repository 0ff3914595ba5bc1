//! Single source of truth for which projects and tasks a principal may see.
//!
//! Listing, mutation authorization and the dashboard all consume the
//! conditions built here; the predicate is never re-derived elsewhere.
//! There is no separate read/write split: whoever can see a task can
//! mutate it.

use sea_orm::{
    sea_query::{Query, SelectStatement},
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
};

use crate::models::{project, project_member, task};

/// Subquery: ids of projects where the user has a membership row.
fn member_project_ids(user_id: &str) -> SelectStatement {
    Query::select()
        .column(project_member::Column::ProjectId)
        .from(project_member::Entity)
        .and_where(project_member::Column::UserId.eq(user_id))
        .to_owned()
}

/// Subquery: ids of projects created by the user. The creator gets a
/// membership row on project creation, but creator visibility must not
/// depend on that row existing.
fn created_project_ids(user_id: &str) -> SelectStatement {
    Query::select()
        .column(project::Column::Id)
        .from(project::Entity)
        .and_where(project::Column::CreatedBy.eq(user_id))
        .to_owned()
}

/// Projects visible to the user: created by them or joined via membership.
pub fn visible_projects_condition(user_id: &str) -> Condition {
    Condition::any()
        .add(project::Column::CreatedBy.eq(user_id))
        .add(project::Column::Id.in_subquery(member_project_ids(user_id)))
}

/// Tasks visible to the user: created by them, assigned to them, or
/// belonging to a project they can see.
pub fn visible_tasks_condition(user_id: &str) -> Condition {
    Condition::any()
        .add(task::Column::CreatedBy.eq(user_id))
        .add(task::Column::AssignedTo.eq(user_id))
        .add(task::Column::ProjectId.in_subquery(member_project_ids(user_id)))
        .add(task::Column::ProjectId.in_subquery(created_project_ids(user_id)))
}

pub async fn visible_projects<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<Vec<project::Model>, DbErr> {
    project::Entity::find()
        .filter(visible_projects_condition(user_id))
        .all(db)
        .await
}

pub async fn visible_project_count<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<u64, DbErr> {
    project::Entity::find()
        .filter(visible_projects_condition(user_id))
        .count(db)
        .await
}

pub async fn visible_tasks<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<Vec<task::Model>, DbErr> {
    task::Entity::find()
        .filter(visible_tasks_condition(user_id))
        .all(db)
        .await
}

/// Whether the user may see (and therefore mutate) this project.
pub async fn can_access_project<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    project: &project::Model,
) -> Result<bool, DbErr> {
    if project.created_by == user_id {
        return Ok(true);
    }

    let membership = project_member::Entity::find()
        .filter(project_member::Column::ProjectId.eq(&project.id))
        .filter(project_member::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    Ok(membership.is_some())
}

/// Whether the user may see (and therefore mutate) this task. Applies the
/// same predicate as [`visible_tasks_condition`] to a single row.
pub async fn can_access_task<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    task: &task::Model,
) -> Result<bool, DbErr> {
    if task.created_by == user_id || task.assigned_to.as_deref() == Some(user_id) {
        return Ok(true);
    }

    let project = project::Entity::find_by_id(&task.project_id).one(db).await?;
    match project {
        Some(p) => can_access_project(db, user_id, &p).await,
        None => Ok(false),
    }
}
