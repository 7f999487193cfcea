//! Course Market API server.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use course_market::adapters::auth::{AuthApiConfig, HttpAuthProvider, JwtConfig, JwtSessionValidator};
use course_market::adapters::http::{app_router, AppState, BillingSettings, Collaborators, HttpSettings};
use course_market::adapters::notification::{BackgroundNotifier, ResendConfig, ResendEmailSender};
use course_market::adapters::payment::{HttpPaymentProvider, PaymentApiConfig};
use course_market::adapters::postgres::{
    connect, run_migrations, PostgresEntitlementStore, PostgresWebhookEventRepository,
};
use course_market::config::AppConfig;
use course_market::ports::WebhookEventRepository;

const RETENTION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(environment = ?config.server.environment, "Starting Course Market API");

    let pool = connect(&config.database).await?;
    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    let store = Arc::new(PostgresEntitlementStore::new(pool.clone()));
    let webhook_events: Arc<dyn WebhookEventRepository> =
        Arc::new(PostgresWebhookEventRepository::new(pool));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut resend = ResendConfig::new(config.email.resend_api_key.clone(), config.email.sender());
    if let Some(reply_to) = &config.email.reply_to {
        resend = resend.with_reply_to(reply_to.clone());
    }
    let email = ResendEmailSender::new(resend);
    let (notifier, notifier_worker) = BackgroundNotifier::spawn(
        Arc::new(email),
        config.notifications.worker_config(),
        shutdown_rx.clone(),
    );

    let collaborators = Collaborators {
        payment_provider: Arc::new(HttpPaymentProvider::new(PaymentApiConfig::new(
            config.payment.api_base_url.clone(),
            config.payment.access_token.clone(),
        ))),
        auth_provider: Arc::new(HttpAuthProvider::new(AuthApiConfig::new(
            config.auth.provider_url.clone(),
            config.auth.anon_key.clone(),
            config.auth.service_role_key.clone(),
        ))),
        session_validator: Arc::new(JwtSessionValidator::new(JwtConfig::new(
            config.auth.jwt_secret.clone(),
            config.auth.jwt_audience.clone(),
        ))),
        notifier: Arc::new(notifier),
    };

    let retention = tokio::spawn(purge_webhook_events(
        webhook_events.clone(),
        chrono::Duration::days(i64::from(config.payment.webhook_retention_days)),
        shutdown_rx,
    ));

    let state = AppState::new(
        store,
        webhook_events,
        collaborators,
        BillingSettings {
            webhook_secret: config.payment.webhook_secret.clone(),
            checkout_success_url: config.payment.checkout_success_url.clone(),
            plans: config.payment.plan_catalog(),
        },
    );

    let http = HttpSettings {
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
    };
    let app = app_router(state, &http);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down background workers");
    let _ = shutdown_tx.send(true);
    if let Err(e) = notifier_worker.await {
        tracing::warn!(error = %e, "Notification worker ended abnormally");
    }
    if let Err(e) = retention.await {
        tracing::warn!(error = %e, "Retention task ended abnormally");
    }

    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Forgets processed deliveries older than the retention window.
async fn purge_webhook_events(
    repository: Arc<dyn WebhookEventRepository>,
    retention: chrono::Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(RETENTION_SWEEP_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match repository.delete_before(Utc::now() - retention).await {
                    Ok(0) => {}
                    Ok(deleted) => tracing::info!(deleted, "Purged old webhook deliveries"),
                    Err(e) => tracing::warn!(error = %e, "Webhook retention sweep failed"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}
