use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::{Database, DatabaseError, Repository};
use crate::handlers::{auth, crud, customers, health, invoices};
use crate::middleware::require_auth;
use crate::resources::{Customer, Invoice, Revenue, User};
use crate::state::AppState;

/// Full application router with global layers applied.
pub fn router(state: AppState) -> Router {
    let gate = middleware::from_fn_with_state(state.clone(), require_auth);

    let mut resources = Router::new()
        .merge(crud::routes::<User>("/users"))
        .route("/customers/count", get(crud::count::<Customer>))
        .route("/customers/totals", get(customers::totals))
        .merge(crud::routes::<Customer>("/customers"))
        .route("/invoices/count", get(crud::count::<Invoice>))
        .route("/invoices/latest", get(invoices::latest))
        .merge(crud::routes::<Invoice>("/invoices"))
        .merge(crud::routes::<Revenue>("/revenues"));

    if state.config.security.require_auth {
        resources = resources.route_layer(gate.clone());
    }

    let sessions = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/signout", get(auth::signout).route_layer(gate));

    let cors = build_cors(&state.config.security.cors_origins);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .merge(sessions)
        .merge(resources)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(300));

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(allowed))
}

/// Unique indexes backing the email uniqueness rules.
pub async fn ensure_indexes(db: &Database) -> Result<(), DatabaseError> {
    Repository::<User>::new(db).ensure_indexes().await?;
    Repository::<Customer>::new(db).ensure_indexes().await?;
    Ok(())
}

/// Connect, serve until SIGINT/SIGTERM, then drain for the grace period.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    if config.security.jwt_secret.trim().is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }

    let db = Database::connect(&config.database)
        .await
        .context("failed to connect to MongoDB")?;
    ensure_indexes(&db)
        .await
        .context("failed to create indexes")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid listen address")?;
    let grace = Duration::from_secs(config.server.shutdown_grace_secs);

    info!(
        "Starting Invoice API in {:?} mode (auth required: {})",
        config.environment, config.security.require_auth
    );

    let app = router(AppState::new(db, config));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on http://{}", addr);

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result.context("server task failed")?.context("server error")?;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    info!("shutting down, draining for up to {:?}", grace);
    let _ = stop_tx.send(true);

    match tokio::time::timeout(grace, server).await {
        Ok(result) => {
            result.context("server task failed")?.context("server error")?;
            info!("server stopped");
        }
        Err(_) => warn!("grace period elapsed, forcing shutdown"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
