use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::auth::models::RefreshToken;
use crate::domain::auth::models::RefreshTokenId;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::RefreshTokenRepository;
use crate::domain::errors::RepositoryError;

/// In-memory refresh token store keyed by token id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: Arc<RwLock<HashMap<RefreshTokenId, RefreshToken>>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, expired ones included.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.token() == token).cloned())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Vec<RefreshToken>, RepositoryError> {
        let tokens = self.tokens.read().await;
        let mut found: Vec<RefreshToken> = tokens
            .values()
            .filter(|t| t.user_id() == *user_id)
            .cloned()
            .collect();
        found.sort_by_key(|t| t.created_at());

        Ok(found)
    }

    async fn save(&self, refresh_token: RefreshToken) -> Result<RefreshToken, RepositoryError> {
        let mut tokens = self.tokens.write().await;
        tokens.insert(refresh_token.id(), refresh_token.clone());

        Ok(refresh_token)
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, RepositoryError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.token() != token);

        Ok(tokens.len() < before)
    }

    async fn delete_by_user_id(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.user_id() != *user_id);

        Ok((before - tokens.len()) as u64)
    }

    async fn delete_expired(&self) -> Result<u64, RepositoryError> {
        let now = Utc::now();
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired_at(now));

        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn token(user_id: UserId, token: &str, expires_in: Duration) -> RefreshToken {
        let now = Utc::now();
        RefreshToken::new(
            RefreshTokenId::new(),
            token.to_string(),
            user_id,
            now + expires_in,
            now,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repository = InMemoryRefreshTokenRepository::new();
        let user_id = UserId::new();
        let saved = repository
            .save(token(user_id, "a.b.c", Duration::days(7)))
            .await
            .unwrap();

        let found = repository.find_by_token("a.b.c").await.unwrap();
        assert_eq!(found, Some(saved.clone()));
        assert!(repository.find_by_token("x.y.z").await.unwrap().is_none());

        let by_user = repository.find_by_user_id(&user_id).await.unwrap();
        assert_eq!(by_user, vec![saved]);
    }

    #[tokio::test]
    async fn test_save_upserts_by_id() {
        let repository = InMemoryRefreshTokenRepository::new();
        let original = token(UserId::new(), "a.b.c", Duration::days(7));
        let replacement = RefreshToken::new(
            original.id(),
            "d.e.f".to_string(),
            original.user_id(),
            original.expires_at(),
            original.created_at(),
        )
        .unwrap();

        repository.save(original).await.unwrap();
        repository.save(replacement).await.unwrap();

        assert_eq!(repository.len().await, 1);
        assert!(repository.find_by_token("a.b.c").await.unwrap().is_none());
        assert!(repository.find_by_token("d.e.f").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_operations() {
        let repository = InMemoryRefreshTokenRepository::new();
        let alice = UserId::new();
        let bob = UserId::new();

        repository.save(token(alice, "alice.1.t", Duration::days(7))).await.unwrap();
        repository.save(token(alice, "alice.2.t", Duration::days(7))).await.unwrap();
        repository.save(token(bob, "bob.1.t", Duration::days(7))).await.unwrap();
        repository.save(token(bob, "bob.2.t", Duration::seconds(-1))).await.unwrap();

        assert!(repository.delete_by_token("alice.1.t").await.unwrap());
        assert!(!repository.delete_by_token("alice.1.t").await.unwrap());

        assert_eq!(repository.delete_expired().await.unwrap(), 1);
        assert_eq!(repository.delete_by_user_id(&alice).await.unwrap(), 1);
        assert_eq!(repository.len().await, 1);
        assert!(repository.find_by_token("bob.1.t").await.unwrap().is_some());
    }
}
