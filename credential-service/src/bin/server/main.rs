use std::sync::Arc;

use credential_service::config::Config;
use credential_service::domain::account::service::AccountService;
use credential_service::inbound::http::router::create_router;
use credential_service::outbound::repositories::PostgresAccountRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// HS256 keys shorter than the hash output weaken the signature.
const MIN_JWT_SECRET_BYTES: usize = 32;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credential_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "credential-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_expiration_hours = config.jwt.expiration_hours,
        password_length = config.credentials.password_length,
        rotation_policy = ?config.rotation.policy(),
        disclose_rotated_password = config.rotation.disclose_password,
        "Configuration loaded"
    );

    if config.jwt.secret.len() < MIN_JWT_SECRET_BYTES {
        tracing::warn!(
            length = config.jwt.secret.len(),
            minimum = MIN_JWT_SECRET_BYTES,
            "JWT secret is shorter than recommended"
        );
    }
    if config.rotation.disclose_password {
        tracing::warn!("Rotated passwords will be returned in login change responses");
    }

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let account_repository = Arc::new(PostgresAccountRepository::new(pg_pool));
    let password_hasher = Arc::new(auth::PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?);
    let token_service = Arc::new(auth::TokenService::new(
        config.jwt.secret.as_bytes(),
        config.jwt.token_lifetime()?,
    ));
    let secret_generator = Arc::new(auth::SecretGenerator::new(
        config.credentials.password_length,
    )?);

    let account_service = Arc::new(
        AccountService::new(
            account_repository,
            password_hasher,
            token_service,
            secret_generator,
        )
        .with_rotation_policy(config.rotation.policy())
        .with_rotated_password_disclosure(config.rotation.disclose_password),
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(account_service)).await?;

    tracing::info!("Server exited");

    Ok(())
}
