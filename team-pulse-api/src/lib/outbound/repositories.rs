pub mod refresh_token;
pub mod user_credentials;

pub use refresh_token::InMemoryRefreshTokenRepository;
pub use user_credentials::InMemoryUserCredentialsRepository;
