use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::{
    models::{
        project::{self, ActiveModel, Entity as ProjectEntity, Model as Project, ProjectStatus},
        project_member::{self, Entity as MemberEntity, Model as ProjectMember},
        task::{self, Entity as TaskEntity, TaskStatus},
        task_attachment::{self, Entity as AttachmentEntity},
        task_comment::{self, Entity as CommentEntity},
        task_history::{self, Entity as HistoryEntity},
        user::{Capability, Model as User},
    },
    repos::users::UsersRepo,
    services::visibility,
    utils::{
        ids::generate_id,
        response::{ApiError, ApiResult},
    },
};

#[derive(Debug, Deserialize)]
pub struct NewProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectStatistics {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub in_progress_tasks: u64,
    pub todo_tasks: u64,
    pub team_members: u64,
}

pub struct ProjectsRepo {
    db: DatabaseConnection,
}

impl ProjectsRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates the project and the creator's membership row in one
    /// transaction; the creator is always a member.
    pub async fn create(&self, principal: &User, input: NewProject) -> ApiResult<Project> {
        let name = input
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("name is required".to_string()))?;
        let start_date = input
            .start_date
            .ok_or_else(|| ApiError::Validation("start_date is required".to_string()))?;
        let end_date = input
            .end_date
            .ok_or_else(|| ApiError::Validation("end_date is required".to_string()))?;
        let status = match input.status.as_deref() {
            Some(s) => ProjectStatus::parse(s)
                .ok_or_else(|| ApiError::Validation("Invalid status".to_string()))?,
            None => ProjectStatus::Active,
        };

        let now = Utc::now().naive_utc();
        let txn = self.db.begin().await?;

        let project_model = ActiveModel {
            id: Set(generate_id()),
            name: Set(name),
            description: Set(input.description.unwrap_or_default()),
            start_date: Set(start_date),
            end_date: Set(end_date),
            status: Set(status),
            created_by: Set(principal.id.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let project = project_model.insert(&txn).await?;

        let member_model = project_member::ActiveModel {
            id: Set(generate_id()),
            project_id: Set(project.id.clone()),
            user_id: Set(principal.id.clone()),
            joined_at: Set(now),
        };
        member_model.insert(&txn).await?;

        txn.commit().await?;

        Ok(project)
    }

    pub async fn get(&self, project_id: &str, principal: &User) -> ApiResult<Project> {
        let project = ProjectEntity::find_by_id(project_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

        if !visibility::can_access_project(&self.db, &principal.id, &project).await? {
            return Err(ApiError::Forbidden(
                "You do not have access to this project".to_string(),
            ));
        }

        Ok(project)
    }

    pub async fn list_visible(&self, principal: &User) -> ApiResult<Vec<Project>> {
        let projects = visibility::visible_projects(&self.db, &principal.id).await?;

        Ok(projects)
    }

    /// Adds a user to the roster. Only the creator or a principal whose
    /// role carries `ManageMembers` may change it. The unique
    /// (project_id, user_id) index is the duplicate guard, so a concurrent
    /// duplicate still surfaces as a validation error.
    pub async fn add_member(
        &self,
        project_id: &str,
        principal: &User,
        user_id: &str,
    ) -> ApiResult<ProjectMember> {
        let project = self.get(project_id, principal).await?;

        if project.created_by != principal.id && !principal.role.can(Capability::ManageMembers) {
            return Err(ApiError::Forbidden(
                "You do not have permission to manage members of this project".to_string(),
            ));
        }

        let users_repo = UsersRepo::new(self.db.clone());
        users_repo.get(user_id).await?;

        let member_model = project_member::ActiveModel {
            id: Set(generate_id()),
            project_id: Set(project.id),
            user_id: Set(user_id.to_string()),
            joined_at: Set(Utc::now().naive_utc()),
        };
        let member = match member_model.insert(&self.db).await {
            Ok(member) => member,
            Err(err) => {
                return match err.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => Err(ApiError::Validation(
                        "User is already a member of this project".to_string(),
                    )),
                    _ => Err(err.into()),
                }
            }
        };

        Ok(member)
    }

    pub async fn statistics(
        &self,
        project_id: &str,
        principal: &User,
    ) -> ApiResult<ProjectStatistics> {
        let project = self.get(project_id, principal).await?;

        let count_status = |status: TaskStatus| {
            TaskEntity::find()
                .filter(task::Column::ProjectId.eq(project.id.clone()))
                .filter(task::Column::Status.eq(status))
                .count(&self.db)
        };

        Ok(ProjectStatistics {
            total_tasks: TaskEntity::find()
                .filter(task::Column::ProjectId.eq(project.id.clone()))
                .count(&self.db)
                .await?,
            completed_tasks: count_status(TaskStatus::Completed).await?,
            in_progress_tasks: count_status(TaskStatus::InProgress).await?,
            todo_tasks: count_status(TaskStatus::Todo).await?,
            team_members: MemberEntity::find()
                .filter(project_member::Column::ProjectId.eq(project.id.clone()))
                .count(&self.db)
                .await?,
        })
    }

    /// Deletes the project and everything it owns: memberships, tasks and
    /// each task's children, all in one transaction. Only the creator or a
    /// principal with the `ManageAnyProject` capability may delete.
    pub async fn delete(&self, project_id: &str, principal: &User) -> ApiResult<()> {
        let project = self.get(project_id, principal).await?;

        if project.created_by != principal.id && !principal.role.can(Capability::ManageAnyProject) {
            return Err(ApiError::Forbidden(
                "Only the project creator may delete this project".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let task_ids: Vec<String> = TaskEntity::find()
            .filter(task::Column::ProjectId.eq(&project.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        if !task_ids.is_empty() {
            AttachmentEntity::delete_many()
                .filter(task_attachment::Column::TaskId.is_in(task_ids.clone()))
                .exec(&txn)
                .await?;
            CommentEntity::delete_many()
                .filter(task_comment::Column::TaskId.is_in(task_ids.clone()))
                .exec(&txn)
                .await?;
            HistoryEntity::delete_many()
                .filter(task_history::Column::TaskId.is_in(task_ids))
                .exec(&txn)
                .await?;
            TaskEntity::delete_many()
                .filter(task::Column::ProjectId.eq(&project.id))
                .exec(&txn)
                .await?;
        }

        MemberEntity::delete_many()
            .filter(project_member::Column::ProjectId.eq(&project.id))
            .exec(&txn)
            .await?;
        ProjectEntity::delete_by_id(&project.id).exec(&txn).await?;

        txn.commit().await?;

        Ok(())
    }
}
