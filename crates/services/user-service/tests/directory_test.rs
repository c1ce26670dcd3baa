//! User directory behaviour over the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{CreateUser, NewUser, UpdateUser, User, UserField, Violation};
use user_service_lib::infra::MemoryUnitOfWork;
use user_service_lib::repository::{InMemoryUserStore, UserRepository};
use user_service_lib::service::{UserManager, UserService};

fn directory() -> UserManager {
    let store: Arc<dyn UserRepository> = Arc::new(InMemoryUserStore::new());
    UserManager::new(Arc::new(MemoryUnitOfWork::new(store)))
}

fn create(username: &str, email: &str) -> Option<CreateUser> {
    Some(CreateUser {
        username: username.to_string(),
        email: email.to_string(),
    })
}

fn update(username: Option<&str>, email: Option<&str>) -> UpdateUser {
    UpdateUser {
        username: username.map(str::to_string),
        email: email.map(str::to_string),
    }
}

#[tokio::test]
async fn create_then_get_and_list() {
    let service = directory();

    let first = assert_ok!(service.create_user(create("valid_username", "valid_email@example.com")).await);
    let second = assert_ok!(service.create_user(create("other_username", "other@example.com")).await);

    let fetched = assert_ok!(service.get_user(first.id).await);
    assert_eq!(fetched, first);

    let all = assert_ok!(service.list_users().await);
    assert_eq!(all, vec![first, second]);
}

#[tokio::test]
async fn get_unknown_user_is_not_found() {
    let service = directory();

    let err = assert_err!(service.get_user(Uuid::new_v4()).await);
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn username_length_boundaries() {
    let service = directory();

    assert_ok!(service.create_user(create("abcde", "five@example.com")).await);
    assert_ok!(service.create_user(create(&"a".repeat(30), "thirty@example.com")).await);

    for username in ["abcd".to_string(), "a".repeat(31)] {
        let err = assert_err!(service.create_user(create(&username, "x@example.com")).await);
        assert!(matches!(
            err,
            AppError::Validation {
                field: UserField::Username,
                violation: Violation::Length { min: 5, max: 30 }
            }
        ));
    }

    assert_eq!(assert_ok!(service.list_users().await).len(), 2);
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let service = directory();

    let err = assert_err!(service.create_user(create("valid_username", "not_valid_email")).await);
    assert!(matches!(
        err,
        AppError::Validation {
            field: UserField::Email,
            violation: Violation::InvalidEmail
        }
    ));
}

#[tokio::test]
async fn absent_create_payload_is_malformed() {
    let service = directory();

    let err = assert_err!(service.create_user(None).await);
    assert!(matches!(err, AppError::MalformedRequest(_)));
}

#[tokio::test]
async fn duplicate_username_wins_over_duplicate_email() {
    let service = directory();
    assert_ok!(service.create_user(create("taken_name", "taken@example.com")).await);

    let err = assert_err!(service.create_user(create("taken_name", "taken@example.com")).await);
    assert!(matches!(err, AppError::UsernameConflict(ref name) if name == "taken_name"));

    let err = assert_err!(service.create_user(create("fresh_name", "taken@example.com")).await);
    assert!(matches!(err, AppError::EmailConflict(ref email) if email == "taken@example.com"));

    // Failed creates leave nothing behind
    assert_eq!(assert_ok!(service.list_users().await).len(), 1);
}

#[tokio::test]
async fn partial_update_merges_fields() {
    let service = directory();
    let user = assert_ok!(service.create_user(create("old_username", "old@example.com")).await);

    let renamed = assert_ok!(service.update_user(user.id, update(Some("new_username"), None)).await);
    assert_eq!(renamed.id, user.id);
    assert_eq!(renamed.username, "new_username");
    assert_eq!(renamed.email, "old@example.com");

    let moved = assert_ok!(service.update_user(user.id, update(None, Some("new@example.com"))).await);
    assert_eq!(moved.username, "new_username");
    assert_eq!(moved.email, "new@example.com");

    assert_eq!(assert_ok!(service.get_user(user.id).await), moved);
}

#[tokio::test]
async fn update_to_own_values_is_allowed() {
    let service = directory();
    let user = assert_ok!(service.create_user(create("same_username", "same@example.com")).await);

    let unchanged = assert_ok!(
        service
            .update_user(user.id, update(Some("same_username"), Some("same@example.com")))
            .await
    );
    assert_eq!(unchanged, user);
}

#[tokio::test]
async fn update_rejects_values_owned_by_others() {
    let service = directory();
    let first = assert_ok!(service.create_user(create("first_user", "first@example.com")).await);
    let second = assert_ok!(service.create_user(create("second_user", "second@example.com")).await);

    let err = assert_err!(
        service
            .update_user(second.id, update(Some("first_user"), Some("first@example.com")))
            .await
    );
    assert!(matches!(err, AppError::UsernameConflict(_)));

    let err = assert_err!(service.update_user(second.id, update(None, Some("first@example.com"))).await);
    assert!(matches!(err, AppError::EmailConflict(_)));

    // Nothing changed on either record
    assert_eq!(assert_ok!(service.get_user(first.id).await), first);
    assert_eq!(assert_ok!(service.get_user(second.id).await), second);
}

#[tokio::test]
async fn update_validation_failure_changes_nothing() {
    let service = directory();
    let user = assert_ok!(service.create_user(create("valid_username", "valid@example.com")).await);

    let err = assert_err!(service.update_user(user.id, update(Some("   "), None)).await);
    assert!(matches!(
        err,
        AppError::Validation {
            field: UserField::Username,
            violation: Violation::Blank
        }
    ));

    assert_eq!(assert_ok!(service.get_user(user.id).await), user);
}

#[tokio::test]
async fn update_unknown_user_is_not_found() {
    let service = directory();

    let err = assert_err!(service.update_user(Uuid::new_v4(), update(Some("new_username"), None)).await);
    assert!(matches!(err, AppError::NotFound(_)));
}

/// Store whose existence checks always miss, as if a concurrent writer had
/// committed right after they ran.
struct StalePreCheck(InMemoryUserStore);

#[async_trait]
impl UserRepository for StalePreCheck {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.0.find_by_id(id).await
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        self.0.find_all().await
    }

    async fn exists_by_username(&self, _username: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn exists_by_email(&self, _email: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn insert(&self, user: NewUser) -> AppResult<User> {
        self.0.insert(user).await
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        self.0.update(id, changes).await
    }
}

fn racing_directory() -> UserManager {
    let store: Arc<dyn UserRepository> = Arc::new(StalePreCheck(InMemoryUserStore::new()));
    UserManager::new(Arc::new(MemoryUnitOfWork::new(store)))
}

#[tokio::test]
async fn concurrent_creates_with_same_username_yield_one_user() {
    let service = racing_directory();

    let results = futures::future::join_all(vec![
        service.create_user(create("racing_username", "first@example.com")),
        service.create_user(create("racing_username", "second@example.com")),
    ])
    .await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppError::UsernameConflict(name)) if name == "racing_username")));

    assert_eq!(assert_ok!(service.list_users().await).len(), 1);
}

#[tokio::test]
async fn missed_email_precheck_still_reports_conflict() {
    let service = racing_directory();
    assert_ok!(service.create_user(create("first_user", "shared@example.com")).await);

    let err = assert_err!(service.create_user(create("second_user", "shared@example.com")).await);
    assert!(matches!(err, AppError::EmailConflict(ref email) if email == "shared@example.com"));

    let second = assert_ok!(service.create_user(create("second_user", "second@example.com")).await);
    let err = assert_err!(service.update_user(second.id, update(Some("first_user"), None)).await);
    assert!(matches!(err, AppError::UsernameConflict(_)));
}

#[tokio::test]
async fn concurrent_updates_of_different_fields_keep_both() {
    let service = directory();
    let user = assert_ok!(service.create_user(create("old_username", "old@example.com")).await);

    let (renamed, moved) = tokio::join!(
        service.update_user(user.id, update(Some("new_username"), None)),
        service.update_user(user.id, update(None, Some("new@example.com"))),
    );
    assert_ok!(renamed);
    assert_ok!(moved);

    let stored = assert_ok!(service.get_user(user.id).await);
    assert_eq!(stored.username, "new_username");
    assert_eq!(stored.email, "new@example.com");
}
