use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::UserCredentials;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::UserCredentialsRepository;
use crate::domain::errors::ConflictError;
use crate::domain::errors::RepositoryError;

#[derive(Debug, Default)]
struct Accounts {
    by_id: HashMap<UserId, UserCredentials>,
    /// Index for lowercased email -> user ID lookup
    email_index: HashMap<String, UserId>,
}

/// In-memory account store.
///
/// Both maps sit behind one lock so the index never disagrees with the
/// accounts it points at.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserCredentialsRepository {
    accounts: Arc<RwLock<Accounts>>,
}

impl InMemoryUserCredentialsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account.
    ///
    /// # Errors
    /// * `ConflictError` (field `email`) - Email already registered
    pub async fn insert(&self, user: UserCredentials) -> Result<(), ConflictError> {
        let mut accounts = self.accounts.write().await;

        let email = user.email.as_str().to_lowercase();
        if accounts.email_index.contains_key(&email) {
            return Err(ConflictError::for_field(
                "email",
                format!("Email already registered: {}", user.email),
            ));
        }

        accounts.email_index.insert(email, user.id);
        accounts.by_id.insert(user.id, user);

        Ok(())
    }
}

#[async_trait]
impl UserCredentialsRepository for InMemoryUserCredentialsRepository {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let accounts = self.accounts.read().await;

        Ok(accounts
            .email_index
            .get(&email.as_str().to_lowercase())
            .and_then(|user_id| accounts.by_id.get(user_id))
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserCredentials>, RepositoryError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.by_id.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::models::Role;

    fn credentials(email: &str) -> UserCredentials {
        UserCredentials {
            id: UserId::new(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            role: Role::User,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repository = InMemoryUserCredentialsRepository::new();
        let alice = credentials("alice@example.com");
        repository.insert(alice.clone()).await.unwrap();

        let by_email = repository
            .find_by_email(&EmailAddress::new("Alice@Example.com".to_string()).unwrap())
            .await
            .unwrap();
        assert_eq!(by_email, Some(alice.clone()));

        let by_id = repository.find_by_id(&alice.id).await.unwrap();
        assert_eq!(by_id, Some(alice));

        assert!(repository.find_by_id(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_email() {
        let repository = InMemoryUserCredentialsRepository::new();
        repository
            .insert(credentials("alice@example.com"))
            .await
            .unwrap();

        let err = repository
            .insert(credentials("alice@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("email"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_inserts_interleaved_with_lookups() {
        let repository = InMemoryUserCredentialsRepository::new();
        let emails: Vec<String> = (0..50).map(|i| format!("user{}@example.com", i)).collect();

        let mut handles = Vec::new();
        for email in &emails {
            let writer = repository.clone();
            let account = credentials(email);
            handles.push(tokio::spawn(async move { writer.insert(account).await.is_ok() }));

            let reader = repository.clone();
            let lookup = EmailAddress::new(email.clone()).unwrap();
            handles.push(tokio::spawn(async move {
                reader.find_by_email(&lookup).await.is_ok()
            }));
        }

        let finished = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            for handle in handles {
                assert!(handle.await.unwrap());
            }
        })
        .await;

        assert!(finished.is_ok(), "store operations did not complete");
        for email in emails {
            let email = EmailAddress::new(email).unwrap();
            assert!(repository.find_by_email(&email).await.unwrap().is_some());
        }
    }
}
