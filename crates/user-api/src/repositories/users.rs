//! User directory.
//!
//! Authoritative in-memory collection of user records. Reads share the lock;
//! every write holds the write guard across its check-then-mutate sequence,
//! so uniqueness checks and id assignment cannot race.
//!
//! Invariants:
//! - emails are unique (exact, case-sensitive match)
//! - ids are positive and never reused, even after the highest id is deleted

use crate::errors::ApiError;
use crate::models::{NewUser, Role, User, UserUpdate};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::{record_directory_operation, set_directory_size};
use tokio::sync::RwLock;
use tracing::instrument;

#[derive(Debug, Default)]
struct DirectoryState {
    /// Insertion order.
    users: Vec<User>,
    /// Highest id ever assigned.
    last_id: u64,
}

impl DirectoryState {
    fn next_id(&self) -> u64 {
        let max_existing = self.users.iter().map(|u| u.id).max().unwrap_or(0);
        self.last_id.max(max_existing) + 1
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.users.iter().position(|u| u.id == id)
    }

    fn email_taken(&self, email: &str, except_id: Option<u64>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except_id)
    }
}

#[derive(Debug, Default)]
pub struct UserDirectory {
    state: RwLock<DirectoryState>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

fn email_conflict() -> ApiError {
    ApiError::Conflict("Email already exists".to_string())
}

/// Record the outcome of a directory operation and pass the result through.
fn observe<T>(operation: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    let status = match &result {
        Ok(_) => "success",
        Err(ApiError::NotFound(_)) => "not_found",
        Err(ApiError::Conflict(_)) => "conflict",
        Err(ApiError::Validation(_)) => "invalid",
        Err(_) => "error",
    };
    record_directory_operation(operation, status);
    result
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::with_users(Vec::new())
    }

    /// Build a directory from existing records, keeping their order.
    ///
    /// Duplicate emails or ids among `users` are kept as given; callers
    /// supply consistent seed data.
    pub fn with_users(users: Vec<User>) -> Self {
        let last_id = users.iter().map(|u| u.id).max().unwrap_or(0);
        set_directory_size(users.len());
        Self {
            state: RwLock::new(DirectoryState { users, last_id }),
        }
    }

    /// The records the service starts with, matching the seeded credentials.
    pub fn seeded() -> Self {
        Self::with_users(vec![
            User {
                id: 1,
                email: "admin@example.com".to_string(),
                name: "Admin".to_string(),
                role: Role::Admin,
            },
            User {
                id: 2,
                email: "user@example.com".to_string(),
                name: "User One".to_string(),
                role: Role::User,
            },
        ])
    }

    /// All records in insertion order.
    pub async fn list(&self) -> Vec<User> {
        let state = self.state.read().await;
        record_directory_operation("list", "success");
        state.users.clone()
    }

    pub async fn get(&self, id: u64) -> Result<User, ApiError> {
        let state = self.state.read().await;
        let result = state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(not_found);
        observe("get", result)
    }

    /// Create a record. Role defaults to `user`.
    #[instrument(skip_all, name = "user_api.directory.create")]
    pub async fn create(&self, new_user: NewUser) -> Result<User, ApiError> {
        let mut state = self.state.write().await;
        let result = Self::create_locked(&mut state, new_user);
        set_directory_size(state.users.len());
        observe("create", result)
    }

    fn create_locked(state: &mut DirectoryState, new_user: NewUser) -> Result<User, ApiError> {
        let (email, name) = match (new_user.email, new_user.name) {
            (Some(email), Some(name)) if !email.is_empty() && !name.is_empty() => (email, name),
            _ => return Err(ApiError::Validation("Missing email or name".to_string())),
        };

        if state.email_taken(&email, None) {
            tracing::debug!(
                target: "user_api.directory",
                email_hash = %hash_for_correlation(&email),
                "Create rejected: email already exists"
            );
            return Err(email_conflict());
        }

        let user = User {
            id: state.next_id(),
            email,
            name,
            role: new_user.role.unwrap_or_default(),
        };

        state.last_id = user.id;
        state.users.push(user.clone());

        tracing::info!(
            target: "user_api.directory",
            user_id = user.id,
            role = %user.role,
            "User created"
        );

        Ok(user)
    }

    /// Overwrite the supplied fields of record `id`.
    ///
    /// Omitted fields are left unchanged. An explicitly empty email or name is
    /// rejected rather than silently ignored.
    #[instrument(skip_all, name = "user_api.directory.update", fields(user_id = id))]
    pub async fn update(&self, id: u64, update: UserUpdate) -> Result<User, ApiError> {
        let mut state = self.state.write().await;
        let result = Self::update_locked(&mut state, id, update);
        observe("update", result)
    }

    fn update_locked(
        state: &mut DirectoryState,
        id: u64,
        update: UserUpdate,
    ) -> Result<User, ApiError> {
        let idx = state.position(id).ok_or_else(not_found)?;

        if update.email.as_deref() == Some("") || update.name.as_deref() == Some("") {
            return Err(ApiError::Validation(
                "Email and name cannot be empty".to_string(),
            ));
        }

        if let Some(email) = update.email.as_deref() {
            if state.email_taken(email, Some(id)) {
                return Err(email_conflict());
            }
        }

        let user = state.users.get_mut(idx).ok_or_else(not_found)?;

        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }

        tracing::info!(
            target: "user_api.directory",
            user_id = user.id,
            role = %user.role,
            "User updated"
        );

        Ok(user.clone())
    }

    #[instrument(skip_all, name = "user_api.directory.delete", fields(user_id = id))]
    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        let result = match state.position(id) {
            Some(idx) => {
                state.users.remove(idx);
                tracing::info!(target: "user_api.directory", user_id = id, "User deleted");
                Ok(())
            }
            None => Err(not_found()),
        };
        set_directory_size(state.users.len());
        observe("delete", result)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.users.is_empty()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use std::sync::Arc;

    fn new_user(email: &str, name: &str) -> NewUser {
        NewUser {
            email: Some(email.to_string()),
            name: Some(name.to_string()),
            role: None,
        }
    }

    #[test]
    fn test_seeded_directory_reports_size() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            let _directory = UserDirectory::seeded();
        });

        let gauge = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .find(|(key, _, _, _)| key.key().name() == "user_api_directory_users")
            .map(|(_, _, _, value)| value);

        assert!(matches!(gauge, Some(DebugValue::Gauge(v)) if v.into_inner() == 2.0));
    }

    #[tokio::test]
    async fn test_seeded_directory() {
        let directory = UserDirectory::seeded();
        let users = directory.list().await;

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, 1);
        assert_eq!(users[0].role, Role::Admin);
        assert_eq!(users[1].email, "user@example.com");
    }

    #[tokio::test]
    async fn test_create_assigns_first_id_on_empty_directory() {
        let directory = UserDirectory::new();
        assert!(directory.is_empty().await);

        let user = directory.create(new_user("a@x.com", "A")).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.role, Role::User);
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_assigns_max_plus_one() {
        let directory = UserDirectory::with_users(vec![
            User {
                id: 5,
                email: "five@x.com".to_string(),
                name: "Five".to_string(),
                role: Role::User,
            },
            User {
                id: 2,
                email: "two@x.com".to_string(),
                name: "Two".to_string(),
                role: Role::User,
            },
        ]);

        let user = directory.create(new_user("a@x.com", "A")).await.unwrap();
        assert_eq!(user.id, 6);
    }

    #[tokio::test]
    async fn test_create_keeps_explicit_role() {
        let directory = UserDirectory::new();
        let user = directory
            .create(NewUser {
                role: Some(Role::Admin),
                ..new_user("a@x.com", "A")
            })
            .await
            .unwrap();

        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts() {
        let directory = UserDirectory::new();
        directory.create(new_user("a@x.com", "A")).await.unwrap();

        let result = directory.create(new_user("a@x.com", "B")).await;

        assert!(matches!(result, Err(ApiError::Conflict(msg)) if msg == "Email already exists"));
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_email_match_is_case_sensitive() {
        let directory = UserDirectory::new();
        directory.create(new_user("a@x.com", "A")).await.unwrap();

        assert!(directory.create(new_user("A@x.com", "B")).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_missing_fields_rejected() {
        let directory = UserDirectory::new();

        for input in [
            NewUser::default(),
            NewUser {
                email: Some("a@x.com".to_string()),
                ..NewUser::default()
            },
            NewUser {
                name: Some("A".to_string()),
                ..NewUser::default()
            },
            new_user("", "A"),
            new_user("a@x.com", ""),
        ] {
            let result = directory.create(input).await;
            assert!(
                matches!(result, Err(ApiError::Validation(ref msg)) if msg == "Missing email or name"),
                "unexpected result: {:?}",
                result
            );
        }

        assert!(directory.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let directory = UserDirectory::seeded();
        assert!(matches!(directory.get(99).await, Err(ApiError::NotFound(_))));
        assert!(matches!(directory.get(0).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_overwrites_only_supplied_fields() {
        let directory = UserDirectory::seeded();

        let updated = directory
            .update(
                2,
                UserUpdate {
                    name: Some("Renamed".to_string()),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, "user@example.com");
        assert_eq!(updated.role, Role::User);
        assert_eq!(directory.get(2).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_empty_body_is_noop() {
        let directory = UserDirectory::seeded();
        let before = directory.get(1).await.unwrap();

        let after = directory.update(1, UserUpdate::default()).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_update_role_escalation_allowed() {
        let directory = UserDirectory::seeded();

        let updated = directory
            .update(
                2,
                UserUpdate {
                    role: Some(Role::Admin),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_update_email_conflict_with_other_record() {
        let directory = UserDirectory::seeded();

        let result = directory
            .update(
                2,
                UserUpdate {
                    email: Some("admin@example.com".to_string()),
                    ..UserUpdate::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ApiError::Conflict(_))));
        assert_eq!(directory.get(2).await.unwrap().email, "user@example.com");
    }

    #[tokio::test]
    async fn test_update_same_email_on_same_record_is_allowed() {
        let directory = UserDirectory::seeded();

        let result = directory
            .update(
                2,
                UserUpdate {
                    email: Some("user@example.com".to_string()),
                    ..UserUpdate::default()
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_empty_strings_rejected() {
        let directory = UserDirectory::seeded();

        let result = directory
            .update(
                2,
                UserUpdate {
                    email: Some(String::new()),
                    name: Some("Still Valid".to_string()),
                    ..UserUpdate::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
        // Nothing applied
        assert_eq!(directory.get(2).await.unwrap().name, "User One");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let directory = UserDirectory::seeded();
        let result = directory.update(42, UserUpdate::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let directory = UserDirectory::seeded();

        directory.delete(2).await.unwrap();

        assert!(matches!(directory.get(2).await, Err(ApiError::NotFound(_))));
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let directory = UserDirectory::seeded();

        directory.delete(2).await.unwrap();
        let second = directory.delete(2).await;

        assert!(matches!(second, Err(ApiError::NotFound(_))));
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_deleted_highest_id_is_not_reused() {
        let directory = UserDirectory::seeded();

        let created = directory.create(new_user("a@x.com", "A")).await.unwrap();
        assert_eq!(created.id, 3);

        directory.delete(3).await.unwrap();

        let next = directory.create(new_user("b@x.com", "B")).await.unwrap();
        assert_eq!(next.id, 4);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let directory = UserDirectory::new();
        for (email, name) in [("c@x.com", "C"), ("a@x.com", "A"), ("b@x.com", "B")] {
            directory.create(new_user(email, name)).await.unwrap();
        }
        directory.delete(2).await.unwrap();

        let emails: Vec<String> = directory.list().await.into_iter().map(|u| u.email).collect();
        assert_eq!(emails, vec!["c@x.com", "b@x.com"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_unique_ids() {
        let directory = Arc::new(UserDirectory::new());

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let directory = Arc::clone(&directory);
                tokio::spawn(async move {
                    directory
                        .create(new_user(&format!("user{}@x.com", i), "U"))
                        .await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 50);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&50));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_creates_yield_one_winner() {
        let directory = Arc::new(UserDirectory::new());

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let directory = Arc::clone(&directory);
                tokio::spawn(async move { directory.create(new_user("same@x.com", "S")).await })
            })
            .collect();

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(ApiError::Conflict(_)) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 19);
    }
}
