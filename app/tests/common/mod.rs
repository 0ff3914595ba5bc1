use chrono::{NaiveDate, NaiveDateTime};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use taskhub::models::{project, task, user};
use taskhub::repos::{
    projects::{NewProject, ProjectsRepo},
    tasks::{NewTask, TasksRepo},
    users::UsersRepo,
};

/// Fresh in-memory database with the real schema applied. A single pooled
/// connection keeps all queries on the same SQLite memory instance.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn seed_user(db: &DatabaseConnection, name: &str, role: user::Role) -> user::Model {
    UsersRepo::new(db.clone())
        .create(name.to_string(), format!("{name}@example.com"), role)
        .await
        .expect("seed user")
}

pub async fn create_project(
    db: &DatabaseConnection,
    creator: &user::Model,
    name: &str,
) -> project::Model {
    ProjectsRepo::new(db.clone())
        .create(
            creator,
            NewProject {
                name: Some(name.to_string()),
                description: Some("test project".to_string()),
                start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
                end_date: NaiveDate::from_ymd_opt(2026, 12, 31),
                status: None,
            },
        )
        .await
        .expect("create project")
}

pub fn due_date(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 9, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn new_task_input(project_id: &str, title: &str) -> NewTask {
    NewTask {
        title: Some(title.to_string()),
        description: Some("test task".to_string()),
        project_id: Some(project_id.to_string()),
        assigned_to: None,
        priority: None,
        status: None,
        due_date: Some(due_date(1)),
    }
}

pub async fn create_task(
    db: &DatabaseConnection,
    creator: &user::Model,
    project_id: &str,
    title: &str,
) -> task::Model {
    TasksRepo::new(db.clone())
        .create(creator, new_task_input(project_id, title))
        .await
        .expect("create task")
}
