mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth;
use crate::features::auth::routes as auth_routes;
use crate::features::breeds::{routes as breeds_routes, BreedService};
use crate::features::comments::{routes as comments_routes, CommentService, CommentState};
use crate::features::geocoding::{routes as geocoding_routes, GeocodingService};
use crate::features::reports::{routes as reports_routes, ImageService, ReportService, ReportState};
use crate::features::users::{routes as users_routes, UserProfileService};
use crate::modules::gemini::{GeminiClient, GenerativeModel};
use crate::modules::storage::{ImageStore, MinIOClient};
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Configuration loaded (tokio_worker_threads={}, pid={})",
        worker_threads,
        std::process::id()
    );

    // Database
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.jwks_url,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuers.clone(),
        config.auth.client_id.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized");

    // Photo storage
    let minio_client = MinIOClient::new(config.minio.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?;
    let image_store: Arc<dyn ImageStore> = Arc::new(minio_client);
    let image_service = Arc::new(ImageService::new(image_store));

    // Services
    let report_service = Arc::new(ReportService::new(pool.clone()));
    let comment_service = Arc::new(CommentService::new(pool.clone()));
    let user_profile_service = Arc::new(UserProfileService::new(pool.clone()));
    let geocoding_service = Arc::new(
        GeocodingService::new(&config.geocoding)
            .map_err(|e| anyhow::anyhow!("Failed to initialize geocoding: {}", e))?,
    );
    tracing::info!("Geocoding via {}", config.geocoding.base_url);

    let gemini: Option<Arc<dyn GenerativeModel>> = GeminiClient::new(&config.gemini)
        .map_err(|e| anyhow::anyhow!("Failed to initialize Gemini client: {}", e))?
        .map(|client| Arc::new(client) as Arc<dyn GenerativeModel>);
    let breed_service = Arc::new(BreedService::new(gemini));
    if breed_service.is_enabled() {
        tracing::info!("Breed suggestion enabled (model: {})", config.gemini.model);
    } else {
        tracing::warn!("GEMINI_API_KEY not set. Breed suggestion is disabled.");
    }

    let report_state = ReportState {
        report_service,
        image_service,
    };
    let comment_state = CommentState { comment_service };

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require a verified Google ID token)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes())
        .merge(users_routes::routes(user_profile_service))
        .merge(reports_routes::protected_routes(report_state.clone()))
        .merge(comments_routes::protected_routes(comment_state.clone()))
        .merge(breeds_routes::routes(breed_service))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(reports_routes::public_routes(report_state))
        .merge(comments_routes::public_routes(comment_state))
        .merge(geocoding_routes::routes(geocoding_service));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
