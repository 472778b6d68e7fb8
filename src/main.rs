//! Contacts Service Server
//!
//! Binary entry point: loads configuration, connects PostgreSQL and Redis
//! (the counting store must be reachable or startup fails), wires the
//! services, and serves the API.

use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use contacts_service::{
    api::{create_routes, AppState},
    config::AppConfig,
    service::{
        ContactService, ContactStore, EmailService, MediaStorage, RateLimiter, RequestLimiter,
        SessionCache, TokenService, UserCache, UserService, UserStore,
    },
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();
    env_logger::init();

    log::info!("Starting contacts service v{}", contacts_service::VERSION);

    let config = AppConfig::from_env()?;
    config.validate()?;

    // Database
    let db_pool = config.database.create_pool().await?;
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    log::info!("Database migrations completed");

    // Redis backs the rate limiter and the session cache; the service does
    // not start without it.
    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let mut redis_conn = redis::aio::ConnectionManager::new(redis_client).await?;
    redis::cmd("PING")
        .query_async::<String>(&mut redis_conn)
        .await?;
    log::info!("Connected to Redis at {}", config.redis.url);

    // Services
    let tokens = Arc::new(TokenService::new(&config.auth));
    let users: Arc<dyn UserStore> = Arc::new(UserService::new(db_pool.clone()));
    let contacts: Arc<dyn ContactStore> = Arc::new(ContactService::new(db_pool.clone()));
    let session_cache: Arc<dyn UserCache> = Arc::new(SessionCache::new(redis_conn.clone()));
    let rate_limiter: Arc<dyn RequestLimiter> =
        Arc::new(RateLimiter::new(redis_conn, &config.rate_limit));

    let mailer = match config.mail.clone() {
        Some(mail_config) => Some(Arc::new(EmailService::new(mail_config)?)),
        None => {
            log::warn!("SMTP not configured; confirmation emails will be skipped");
            None
        }
    };

    let media = config.media.clone().map(MediaStorage::new).map(Arc::new);
    if media.is_none() {
        log::warn!("Image host not configured; avatar upload is disabled");
    }

    let state = AppState {
        users,
        contacts,
        tokens,
        session_cache,
        rate_limiter,
        mailer,
        media,
        base_url: config.server.base_url.clone(),
    };

    // CORS open to all origins, as the API serves browser clients directly
    let app = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    log::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
