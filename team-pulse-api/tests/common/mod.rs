use std::sync::Arc;

use team_pulse_api::domain::auth::models::EmailAddress;
use team_pulse_api::domain::auth::models::Role;
use team_pulse_api::domain::auth::models::UserCredentials;
use team_pulse_api::domain::auth::models::UserId;
use team_pulse_api::domain::auth::password::BcryptPasswordHasher;
use team_pulse_api::domain::auth::ports::PasswordHasher;
use team_pulse_api::domain::auth::service::AuthService;
use team_pulse_api::domain::auth::session::SessionService;
use team_pulse_api::domain::auth::token_factory::TokenFactory;
use team_pulse_api::inbound::http::router::create_router;
use team_pulse_api::outbound::repositories::InMemoryRefreshTokenRepository;
use team_pulse_api::outbound::repositories::InMemoryUserCredentialsRepository;

pub const ACCESS_SECRET: &str = "integration-access-secret-at-least-32-bytes";
pub const REFRESH_SECRET: &str = "integration-refresh-secret-at-least-32-bytes";
pub const PASSWORD: &str = "correct-horse-battery";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const USER_EMAIL: &str = "user@example.com";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub refresh_tokens: Arc<InMemoryRefreshTokenRepository>,
    pub token_factory: Arc<TokenFactory>,
}

impl TestApp {
    /// Spawn the application in a background task with one admin and one
    /// regular account seeded.
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let token_factory = Arc::new(
            TokenFactory::new(ACCESS_SECRET, REFRESH_SECRET).expect("Invalid test secrets"),
        );
        let password_hasher = Arc::new(BcryptPasswordHasher::new(4).expect("Invalid cost"));
        let refresh_tokens = Arc::new(InMemoryRefreshTokenRepository::new());
        let users = Arc::new(InMemoryUserCredentialsRepository::new());

        for (email, role) in [(ADMIN_EMAIL, Role::Admin), (USER_EMAIL, Role::User)] {
            users
                .insert(UserCredentials {
                    id: UserId::new(),
                    email: EmailAddress::new(email.to_string()).unwrap(),
                    role,
                    password_hash: password_hasher.hash(PASSWORD).await.unwrap(),
                })
                .await
                .expect("Failed to seed account");
        }

        let session_service = Arc::new(SessionService::new(
            Arc::clone(&refresh_tokens),
            users,
            password_hasher,
            Arc::clone(&token_factory),
        ));
        let auth_service = Arc::new(AuthService::new(Arc::clone(&token_factory)));

        let router = create_router(session_service, auth_service);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            refresh_tokens,
            token_factory,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Log in and return the `data` object of the response.
    pub async fn login(&self, email: &str) -> serde_json::Value {
        let response = self
            .post("/api/auth/login")
            .json(&serde_json::json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }
}
