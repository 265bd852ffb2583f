use std::sync::Arc;
use std::time::Duration;

use team_pulse_api::config::BootstrapConfig;
use team_pulse_api::config::Config;
use team_pulse_api::domain::auth::models::UserCredentials;
use team_pulse_api::domain::auth::models::UserId;
use team_pulse_api::domain::auth::password::BcryptPasswordHasher;
use team_pulse_api::domain::auth::ports::PasswordHasher;
use team_pulse_api::domain::auth::ports::SessionServicePort;
use team_pulse_api::domain::auth::service::AuthService;
use team_pulse_api::domain::auth::session::SessionService;
use team_pulse_api::domain::auth::token_factory::TokenFactory;
use team_pulse_api::inbound::http::router::create_router;
use team_pulse_api::outbound::repositories::InMemoryRefreshTokenRepository;
use team_pulse_api::outbound::repositories::InMemoryUserCredentialsRepository;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "team_pulse_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "team-pulse-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        password_cost = config.password.cost,
        purge_interval_secs = config.sessions.purge_interval_secs,
        bootstrap = config.bootstrap.is_some(),
        "Configuration loaded"
    );

    let token_factory = Arc::new(TokenFactory::new(
        &config.jwt.access_secret,
        &config.jwt.refresh_secret,
    )?);
    let password_hasher = Arc::new(BcryptPasswordHasher::new(config.password.cost)?);
    let refresh_token_repository = Arc::new(InMemoryRefreshTokenRepository::new());
    let user_repository = Arc::new(InMemoryUserCredentialsRepository::new());

    if let Some(bootstrap) = &config.bootstrap {
        seed_account(&user_repository, password_hasher.as_ref(), bootstrap).await?;
    }

    let session_service: Arc<dyn SessionServicePort> = Arc::new(SessionService::new(
        refresh_token_repository,
        user_repository,
        password_hasher,
        Arc::clone(&token_factory),
    ));
    let auth_service = Arc::new(AuthService::new(token_factory));

    spawn_purge_task(
        Arc::clone(&session_service),
        Duration::from_secs(config.sessions.purge_interval_secs.max(1)),
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(session_service, auth_service);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

async fn seed_account(
    users: &InMemoryUserCredentialsRepository,
    password_hasher: &BcryptPasswordHasher,
    bootstrap: &BootstrapConfig,
) -> Result<(), anyhow::Error> {
    let password_hash = password_hasher.hash(&bootstrap.password).await?;
    let account = UserCredentials {
        id: UserId::new(),
        email: bootstrap.email.clone(),
        role: bootstrap.role,
        password_hash,
    };
    let user_id = account.id;

    users.insert(account).await?;
    tracing::info!(
        user_id = %user_id,
        email = %bootstrap.email,
        role = %bootstrap.role,
        "Bootstrap account created"
    );

    Ok(())
}

fn spawn_purge_task(session_service: Arc<dyn SessionServicePort>, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match session_service.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Expired refresh tokens purged"),
                Err(e) => tracing::error!(error = %e, "Refresh token purge failed"),
            }
        }
    });
}
