use async_trait::async_trait;
use tokio::task;

use crate::domain::auth::ports::PasswordHasher;
use crate::domain::errors::RepositoryError;

/// bcrypt-backed password hasher.
///
/// Hashing is deliberately slow, so both operations run on the blocking
/// thread pool instead of the async workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptPasswordHasher {
    inner: auth::PasswordHasher,
}

impl BcryptPasswordHasher {
    /// Create a hasher with the given bcrypt cost.
    ///
    /// # Errors
    /// * `RepositoryError` - Cost outside the supported range
    pub fn new(cost: u32) -> Result<Self, RepositoryError> {
        let inner = auth::PasswordHasher::with_cost(cost)
            .map_err(|e| RepositoryError::new(e.to_string()).with_code("INVALID_HASH_COST"))?;

        Ok(Self { inner })
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, RepositoryError> {
        let hasher = self.inner;
        let password = password.to_string();

        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing task failed");
                RepositoryError::new("Password hashing failed")
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                RepositoryError::new("Password hashing failed")
            })
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, RepositoryError> {
        let hasher = self.inner;
        let password = password.to_string();
        let hash = hash.to_string();

        task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password verification task failed");
                RepositoryError::new("Password verification failed")
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "Password verification failed");
                RepositoryError::new("Password verification failed")
            })
    }
}
