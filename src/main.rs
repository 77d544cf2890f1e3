//! ScoutLink server entry point.
//!
//! Loads configuration, connects to PostgreSQL, wires the adapters into
//! the application layer and serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scoutlink::adapters::http::{
    interaction_routes, subscription_router, InteractionAppState, SubscriptionAppState,
};
use scoutlink::adapters::postgres::{
    PostgresInteractionRepository, PostgresMatchRepository, PostgresPlanRepository,
    PostgresProfileDirectory, PostgresSubscriptionRepository,
};
use scoutlink::adapters::stripe::{MockPaymentGateway, StripeConfig, StripePaymentGateway};
use scoutlink::application::EntitlementGate;
use scoutlink::config::AppConfig;
use scoutlink::domain::subscription::PaymentWebhookVerifier;
use scoutlink::ports::{
    InteractionRepository, MatchRepository, PaymentGateway, PlanRepository, ProfileDirectory,
    SubscriptionRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    // Honor RUST_LOG when set, otherwise fall back to the configured filter.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        environment = ?config.server.environment,
        "Starting ScoutLink server"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    // Adapters behind their ports.
    let interactions: Arc<dyn InteractionRepository> =
        Arc::new(PostgresInteractionRepository::new(pool.clone()));
    let matches: Arc<dyn MatchRepository> = Arc::new(PostgresMatchRepository::new(pool.clone()));
    let profiles: Arc<dyn ProfileDirectory> = Arc::new(PostgresProfileDirectory::new(pool.clone()));
    let plans: Arc<dyn PlanRepository> = Arc::new(PostgresPlanRepository::new(pool.clone()));
    let subscriptions: Arc<dyn SubscriptionRepository> =
        Arc::new(PostgresSubscriptionRepository::new(pool));

    let gateway: Arc<dyn PaymentGateway> = if config.payment.mock {
        warn!("Payment mock mode enabled, checkout sessions are not real");
        Arc::new(MockPaymentGateway::new())
    } else {
        Arc::new(StripePaymentGateway::new(StripeConfig::new(
            config.payment.stripe_api_key.clone(),
        )))
    };

    let gate = Arc::new(EntitlementGate::new(
        interactions.clone(),
        subscriptions.clone(),
    ));
    let webhook_verifier = Arc::new(PaymentWebhookVerifier::new(
        config.payment.stripe_webhook_secret.clone(),
    ));

    let interaction_state = InteractionAppState {
        interactions,
        matches,
        profiles,
        gate,
    };
    let subscription_state = SubscriptionAppState {
        subscriptions,
        plans,
        gateway,
        webhook_verifier,
        checkout_success_url: config.payment.checkout_success_url.clone(),
        checkout_cancel_url: config.payment.checkout_cancel_url.clone(),
    };

    let app = Router::new()
        .nest(
            "/api/interactions",
            interaction_routes().with_state(interaction_state),
        )
        .nest("/api", subscription_router().with_state(subscription_state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config.server.cors_origins_list()));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the CORS layer from the configured origin list.
///
/// No configured origins means permissive CORS, which is only
/// appropriate for development setups.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}
