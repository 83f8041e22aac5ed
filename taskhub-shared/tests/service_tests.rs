/// Service-level tests over the in-memory store
///
/// These exercise the credential and task services end to end without a
/// database. The same services run against PostgreSQL in production.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use taskhub_shared::models::task::TaskStatus;
use taskhub_shared::models::user::CreateUser;
use taskhub_shared::repository::memory::InMemoryStore;
use taskhub_shared::repository::UserRepository;
use taskhub_shared::services::auth::{AuthService, LoginInput, RegisterInput};
use taskhub_shared::services::task::{CreateTaskInput, TaskService, UpdateTaskInput};
use taskhub_shared::services::ServiceError;
use uuid::Uuid;

const SECRET: &str = "service-test-secret-at-least-32-bytes";

struct Harness {
    auth: AuthService,
    tasks: TaskService,
}

fn harness() -> Harness {
    let store = InMemoryStore::new();
    Harness {
        auth: AuthService::new(Arc::new(store.users()), SECRET),
        tasks: TaskService::new(Arc::new(store.tasks())),
    }
}

fn register_input(username: &str, email: &str) -> RegisterInput {
    RegisterInput {
        username: username.to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
    }
}

async fn register(h: &Harness, username: &str) -> Uuid {
    h.auth
        .register(register_input(username, &format!("{username}@x.com")))
        .await
        .expect("registration should succeed")
        .user
        .id
}

fn titled(title: &str) -> CreateTaskInput {
    CreateTaskInput {
        title: title.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_registration_token_validates_to_user() {
    let h = harness();
    let response = h
        .auth
        .register(register_input("alice", "alice@x.com"))
        .await
        .unwrap();

    assert_eq!(response.user.username, "alice");
    assert_eq!(response.user.email, "alice@x.com");
    assert_eq!(h.auth.validate_token(&response.token).unwrap(), response.user.id);
}

#[tokio::test]
async fn test_duplicate_username_then_email() {
    let h = harness();
    register(&h, "alice").await;

    let err = h
        .auth
        .register(register_input("alice", "other@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UsernameTaken));

    let err = h
        .auth
        .register(register_input("bob", "alice@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::EmailTaken));

    // Both collide: username is checked first
    let err = h
        .auth
        .register(register_input("alice", "alice@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UsernameTaken));
}

#[tokio::test]
async fn test_short_password_rejected() {
    let h = harness();
    let mut input = register_input("alice", "alice@x.com");
    input.password = "short".to_string();

    let err = h.auth.register(input).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationFailed(_)));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = harness();
    register(&h, "alice").await;

    let wrong_password = h
        .auth
        .login(LoginInput {
            username: "alice".to_string(),
            password: "password124".to_string(),
        })
        .await
        .unwrap_err();
    let unknown_user = h
        .auth
        .login(LoginInput {
            username: "mallory".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
    assert!(matches!(unknown_user, ServiceError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn test_login_with_corrupt_stored_hash() {
    let store = InMemoryStore::new();
    let users = store.users();
    let auth = AuthService::new(Arc::new(users.clone()), SECRET);

    users
        .create(CreateUser {
            username: "legacy".to_string(),
            email: "legacy@x.com".to_string(),
            password_hash: "not-a-phc-string".to_string(),
        })
        .await
        .unwrap();

    let corrupt = auth
        .login(LoginInput {
            username: "legacy".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap_err();
    let unknown_user = auth
        .login(LoginInput {
            username: "mallory".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(corrupt, ServiceError::InvalidCredentials));
    assert_eq!(corrupt.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn test_login_issues_fresh_token() {
    let h = harness();
    let alice = register(&h, "alice").await;

    let response = h
        .auth
        .login(LoginInput {
            username: "alice".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.user.id, alice);
    assert_eq!(h.auth.validate_token(&response.token).unwrap(), alice);
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let h = harness();
    let other = AuthService::new(
        Arc::new(InMemoryStore::new().users()),
        "a-completely-different-secret-32-bytes",
    );
    let token = other.issue_token(Uuid::new_v4()).unwrap();

    assert!(matches!(
        h.auth.validate_token(&token),
        Err(ServiceError::InvalidToken)
    ));
    assert!(matches!(
        h.auth.validate_token("garbage"),
        Err(ServiceError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_get_profile() {
    let h = harness();
    let alice = register(&h, "alice").await;

    let profile = h.auth.get_profile(alice).await.unwrap();
    assert_eq!(profile.username, "alice");

    assert!(matches!(
        h.auth.get_profile(Uuid::new_v4()).await,
        Err(ServiceError::NotFound)
    ));
}

#[tokio::test]
async fn test_create_defaults_to_pending() {
    let h = harness();
    let alice = register(&h, "alice").await;

    let task = h.tasks.create(alice, titled("Buy milk")).await.unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.description, "");
    assert_eq!(task.user_id, alice);
    assert!(task.due_date.is_none());

    let due = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
    let task = h
        .tasks
        .create(
            alice,
            CreateTaskInput {
                title: "File taxes".to_string(),
                description: Some("before the deadline".to_string()),
                status: Some(TaskStatus::InProgress),
                due_date: Some(due),
            },
        )
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.due_date, Some(due));
}

#[tokio::test]
async fn test_blank_title_rejected() {
    let h = harness();
    let alice = register(&h, "alice").await;

    assert!(matches!(
        h.tasks.create(alice, titled("   ")).await,
        Err(ServiceError::ValidationFailed(_))
    ));

    let task = h.tasks.create(alice, titled("Buy milk")).await.unwrap();
    let err = h
        .tasks
        .update(
            task.id,
            alice,
            UpdateTaskInput {
                title: String::new(),
                description: None,
                status: TaskStatus::Completed,
                due_date: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationFailed(_)));
}

#[tokio::test]
async fn test_cross_user_access_is_conflated_with_missing() {
    let h = harness();
    let alice = register(&h, "alice").await;
    let bob = register(&h, "bob").await;
    let task = h.tasks.create(alice, titled("private")).await.unwrap();

    let update = UpdateTaskInput {
        title: "mine now".to_string(),
        description: None,
        status: TaskStatus::Completed,
        due_date: None,
    };

    for id in [task.id, Uuid::new_v4()] {
        let err = h.tasks.get(id, bob).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFoundOrUnauthorized));
        assert_eq!(err.to_string(), "task not found or unauthorized");

        assert!(matches!(
            h.tasks.update(id, bob, update.clone()).await,
            Err(ServiceError::NotFoundOrUnauthorized)
        ));
        assert!(matches!(
            h.tasks.delete(id, bob).await,
            Err(ServiceError::NotFoundOrUnauthorized)
        ));
    }

    let untouched = h.tasks.get(task.id, alice).await.unwrap();
    assert_eq!(untouched.title, "private");
    assert_eq!(untouched.status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_update_replaces_fields_and_advances_timestamp() {
    let h = harness();
    let alice = register(&h, "alice").await;
    let due = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
    let task = h
        .tasks
        .create(
            alice,
            CreateTaskInput {
                title: "Buy milk".to_string(),
                description: Some("whole".to_string()),
                status: None,
                due_date: Some(due),
            },
        )
        .await
        .unwrap();

    let updated = h
        .tasks
        .update(
            task.id,
            alice,
            UpdateTaskInput {
                title: "Buy oat milk".to_string(),
                description: None,
                status: TaskStatus::InProgress,
                due_date: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Buy oat milk");
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.description, "");
    assert!(updated.due_date.is_none());
    assert_eq!(updated.created_at, task.created_at);
    assert!(updated.updated_at >= task.updated_at);
}

#[tokio::test]
async fn test_list_filter_and_ordering() {
    let h = harness();
    let alice = register(&h, "alice").await;
    let bob = register(&h, "bob").await;

    let first = h.tasks.create(alice, titled("first")).await.unwrap();
    let second = h
        .tasks
        .create(
            alice,
            CreateTaskInput {
                status: Some(TaskStatus::Completed),
                ..titled("second")
            },
        )
        .await
        .unwrap();
    let third = h.tasks.create(alice, titled("third")).await.unwrap();
    h.tasks.create(bob, titled("bob's")).await.unwrap();

    let all = h.tasks.list(alice, None).await.unwrap();
    let ids: Vec<Uuid> = all.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    // Empty filter means no filter
    assert_eq!(h.tasks.list(alice, Some("")).await.unwrap().len(), 3);

    let completed = h.tasks.list(alice, Some("completed")).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, second.id);

    assert!(h.tasks.list(alice, Some("in_progress")).await.unwrap().is_empty());

    assert!(matches!(
        h.tasks.list(alice, Some("archived")).await,
        Err(ServiceError::InvalidFilter)
    ));
}

#[tokio::test]
async fn test_statistics() {
    let h = harness();
    let alice = register(&h, "alice").await;

    let empty = h.tasks.statistics(alice).await.unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.by_status.pending, 0);
    assert_eq!(empty.by_status.in_progress, 0);
    assert_eq!(empty.by_status.completed, 0);
    assert!(empty.last_update.is_none());

    h.tasks.create(alice, titled("a")).await.unwrap();
    h.tasks.create(alice, titled("b")).await.unwrap();
    let done = h
        .tasks
        .create(
            alice,
            CreateTaskInput {
                status: Some(TaskStatus::Completed),
                ..titled("c")
            },
        )
        .await
        .unwrap();

    let stats = h.tasks.statistics(alice).await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_status.pending, 2);
    assert_eq!(stats.by_status.completed, 1);
    assert!(stats.last_update.unwrap() >= done.updated_at);
}

#[tokio::test]
async fn test_alice_scenario() {
    let h = harness();

    let registered = h
        .auth
        .register(register_input("alice", "alice@x.com"))
        .await
        .unwrap();
    let alice = h.auth.validate_token(&registered.token).unwrap();
    assert_eq!(alice, registered.user.id);

    let task = h.tasks.create(alice, titled("Buy milk")).await.unwrap();
    assert_eq!(task.status, TaskStatus::Pending);

    let updated = h
        .tasks
        .update(
            task.id,
            alice,
            UpdateTaskInput {
                title: "Buy milk".to_string(),
                description: Some("2%".to_string()),
                status: TaskStatus::Completed,
                due_date: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.description, "2%");

    h.tasks.delete(task.id, alice).await.unwrap();
    assert!(matches!(
        h.tasks.get(task.id, alice).await,
        Err(ServiceError::NotFoundOrUnauthorized)
    ));
}
