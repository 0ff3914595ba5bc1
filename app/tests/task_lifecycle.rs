mod common;

use common::*;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};

use taskhub::models::{
    task::{self, TaskPriority, TaskStatus},
    task_history,
    user::Role,
};
use taskhub::repos::tasks::{NewTask, TaskChanges, TasksRepo};
use taskhub::utils::response::ApiError;

#[tokio::test]
async fn create_applies_defaults_and_forces_creator() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::ProjectManager).await;
    let project = create_project(&db, &alice, "Apollo").await;

    let task = create_task(&db, &alice, &project.id, "First task").await;

    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(task.priority, TaskPriority::Medium);
    assert_eq!(task.created_by, alice.id);
    assert_eq!(task.assigned_to, None);
}

#[tokio::test]
async fn create_rejects_missing_and_invalid_fields() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::ProjectManager).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let repo = TasksRepo::new(db.clone());

    let mut input = new_task_input(&project.id, "No title");
    input.title = None;
    let err = repo.create(&alice, input).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let mut input = new_task_input(&project.id, "Bad priority");
    input.priority = Some("urgent".to_string());
    let err = repo.create(&alice, input).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let input = new_task_input("no-such-project", "Bad project");
    let err = repo.create(&alice, input).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let mut input = new_task_input(&project.id, "Bad assignee");
    input.assigned_to = Some("no-such-user".to_string());
    let err = repo.create(&alice, input).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn status_update_records_exactly_one_history_row() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Track me").await;
    let repo = TasksRepo::new(db.clone());

    let updated = repo
        .update(
            &task.id,
            &alice,
            TaskChanges {
                status: Some("in_progress".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::InProgress);

    let history = repo.history(&task.id, &alice).await.unwrap();
    assert_eq!(history.len(), 1);
    let entry = &history[0];
    assert_eq!(entry.old_status, TaskStatus::Todo);
    assert_eq!(entry.new_status, TaskStatus::InProgress);
    assert_eq!(entry.old_assigned_to, None);
    assert_eq!(entry.new_assigned_to, None);
    assert_eq!(entry.changed_by, alice.id);
    assert_eq!(entry.notes, "Status changed from todo to in_progress");
}

#[tokio::test]
async fn neutral_update_records_no_history() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Old title").await;
    let repo = TasksRepo::new(db.clone());

    let updated = repo
        .update(
            &task.id,
            &alice,
            TaskChanges {
                title: Some("New title".to_string()),
                description: Some("reworded".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "New title");
    assert!(updated.updated_at > task.updated_at);

    let history = repo.history(&task.id, &alice).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn assignee_change_records_history() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::ProjectManager).await;
    let sam = seed_user(&db, "sam", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Handoff").await;
    let repo = TasksRepo::new(db.clone());

    repo.update(
        &task.id,
        &alice,
        TaskChanges {
            assigned_to: Some(Some(sam.id.clone())),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let history = repo.history(&task.id, &alice).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_assigned_to, None);
    assert_eq!(history[0].new_assigned_to, Some(sam.id.clone()));
    // status did not move
    assert_eq!(history[0].old_status, history[0].new_status);

    // explicit unassign is also a recorded transition
    repo.update(
        &task.id,
        &alice,
        TaskChanges {
            assigned_to: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let history = repo.history(&task.id, &alice).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].old_assigned_to, Some(sam.id.clone()));
    assert_eq!(history[0].new_assigned_to, None);
}

#[tokio::test]
async fn change_status_invalid_string_leaves_no_trace() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Untouched").await;
    let repo = TasksRepo::new(db.clone());

    let err = repo
        .change_status(&task.id, &alice, "done")
        .await
        .unwrap_err();
    match err {
        ApiError::Validation(msg) => assert_eq!(msg, "Invalid status"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let reloaded = repo.get(&task.id, &alice).await.unwrap();
    assert_eq!(reloaded.status, TaskStatus::Todo);
    assert_eq!(reloaded.updated_at, task.updated_at);
    assert!(repo.history(&task.id, &alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn change_status_records_manual_transition() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Move me").await;
    let repo = TasksRepo::new(db.clone());

    let updated = repo
        .change_status(&task.id, &alice, "in_progress")
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::InProgress);

    let history = repo.history(&task.id, &alice).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_status, TaskStatus::Todo);
    assert_eq!(history[0].new_status, TaskStatus::InProgress);
    assert_eq!(history[0].notes, "Status manually changed to in_progress");
}

#[tokio::test]
async fn change_status_to_same_value_records_nothing() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Stay put").await;
    let repo = TasksRepo::new(db.clone());

    repo.change_status(&task.id, &alice, "todo").await.unwrap();

    assert!(repo.history(&task.id, &alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn history_is_newest_first() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Busy task").await;
    let repo = TasksRepo::new(db.clone());

    repo.change_status(&task.id, &alice, "in_progress")
        .await
        .unwrap();
    repo.change_status(&task.id, &alice, "completed")
        .await
        .unwrap();

    let history = repo.history(&task.id, &alice).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].new_status, TaskStatus::Completed);
    assert_eq!(history[1].new_status, TaskStatus::InProgress);
    assert!(history[0].changed_at >= history[1].changed_at);
    // the per-task counter breaks timestamp ties
    assert_eq!(history[0].index, 1);
    assert_eq!(history[1].index, 0);
}

#[tokio::test]
async fn concurrent_status_updates_lose_no_history() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Contended").await;
    let repo = TasksRepo::new(db.clone());
    let other = TasksRepo::new(db.clone());

    let (first, second) = tokio::join!(
        repo.change_status(&task.id, &alice, "in_progress"),
        other.change_status(&task.id, &alice, "completed"),
    );
    first.unwrap();
    second.unwrap();

    // exactly one history row per committed change, and the rows chain:
    // each entry's old_status is the state the previous one left behind
    let history = repo.history(&task.id, &alice).await.unwrap();
    assert_eq!(history.len(), 2);
    let oldest = &history[1];
    let newest = &history[0];
    assert_eq!(oldest.old_status, TaskStatus::Todo);
    assert_eq!(newest.old_status, oldest.new_status);

    let current = repo.get(&task.id, &alice).await.unwrap();
    assert_eq!(current.status, newest.new_status);
}

#[tokio::test]
async fn stale_snapshot_write_is_rejected() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Guarded").await;
    let repo = TasksRepo::new(db.clone());

    // another writer commits first, superseding our snapshot's updated_at
    repo.change_status(&task.id, &alice, "in_progress")
        .await
        .unwrap();

    // a write conditioned on the stale snapshot must touch nothing
    let result = task::Entity::update_many()
        .set(task::ActiveModel {
            status: Set(TaskStatus::Completed),
            ..Default::default()
        })
        .filter(task::Column::Id.eq(task.id.clone()))
        .filter(task::Column::UpdatedAt.eq(task.updated_at))
        .exec(&db)
        .await
        .unwrap();
    assert_eq!(result.rows_affected, 0);

    let reloaded = repo.get(&task.id, &alice).await.unwrap();
    assert_eq!(reloaded.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn all_status_pairs_are_legal_transitions() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Wanderer").await;
    let repo = TasksRepo::new(db.clone());

    // permissive graph: completed back to todo is allowed
    for status in ["completed", "todo", "in_progress", "completed", "in_progress"] {
        let updated = repo.change_status(&task.id, &alice, status).await.unwrap();
        assert_eq!(updated.status.as_str(), status);
    }
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let repo = TasksRepo::new(db.clone());

    let err = repo.get("missing", &alice).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = repo
        .change_status("missing", &alice, "todo")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_task_and_owned_children() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let task = create_task(&db, &alice, &project.id, "Doomed").await;
    let repo = TasksRepo::new(db.clone());

    repo.change_status(&task.id, &alice, "in_progress")
        .await
        .unwrap();
    repo.delete(&task.id, &alice).await.unwrap();

    let err = repo.get(&task.id, &alice).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let orphaned = task_history::Entity::find().all(&db).await.unwrap();
    assert!(orphaned.is_empty());
}

#[tokio::test]
async fn create_ignores_creator_in_input() {
    let db = setup_db().await;
    let alice = seed_user(&db, "alice", Role::ProjectManager).await;
    let sam = seed_user(&db, "sam", Role::TeamMember).await;
    let project = create_project(&db, &alice, "Apollo").await;
    let repo = TasksRepo::new(db.clone());

    // assignment works, but ownership stays with the acting principal
    let input = NewTask {
        assigned_to: Some(sam.id.clone()),
        ..new_task_input(&project.id, "Delegated")
    };
    let task = repo.create(&alice, input).await.unwrap();
    assert_eq!(task.created_by, alice.id);
    assert_eq!(task.assigned_to, Some(sam.id));
}
