//! Trellis daemon.
//!
//! Loads configuration from the environment, selects the `PostgreSQL` store
//! when `DATABASE_URL` is set (the in-memory store otherwise), wires the
//! services, and logs every fan-out event until interrupted.
//!
//! ```text
//! DATABASE_URL=postgres://localhost/trellis RUST_LOG=trellis=debug trellisd
//! ```

use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;
use tracing::{info, warn};
use trellis::{
    config::{ConfigError, TrellisConfig},
    identity::{adapters::Argon2CredentialHasher, ports::UserRepository, services::AccountService},
    mail::{
        adapters::{BackgroundMailDispatcher, LogTransport, TemplateMailer},
        ports::MailError,
    },
    membership::{ports::MembershipRepository, services::MembershipService},
    notification::{adapters::BroadcastFanout, domain::Topic},
    persistence::{InMemoryStore, PostgresStore, postgres::StoreSetupError},
    task::{ports::TaskRepository, services::TaskLifecycleService},
    telemetry,
    verification::ports::OneTimeCodeRepository,
};

#[derive(Debug, Error)]
enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to install tracing subscriber: {0}")]
    Tracing(#[from] tracing_subscriber::util::TryInitError),

    #[error(transparent)]
    Store(#[from] StoreSetupError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error("failed to wait for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let config = TrellisConfig::from_env()?;
    telemetry::init_tracing(config.log_json)?;
    info!(version = env!("CARGO_PKG_VERSION"), "trellisd starting");

    if let Some(url) = config.database_url.as_deref() {
        let store = PostgresStore::connect(url, config.max_connections)?;
        store.apply_schema().await?;
        info!(max_connections = config.max_connections, "using PostgreSQL store");
        serve(Arc::new(store), &config).await
    } else {
        warn!("DATABASE_URL not set; state is kept in memory and lost on exit");
        serve(Arc::new(InMemoryStore::new()), &config).await
    }
}

async fn serve<S>(store: Arc<S>, config: &TrellisConfig) -> Result<(), DaemonError>
where
    S: UserRepository
        + OneTimeCodeRepository
        + MembershipRepository
        + TaskRepository
        + 'static,
{
    let clock = Arc::new(DefaultClock);
    let template = TemplateMailer::new(LogTransport, &config.mail_from, &config.frontend_url)?
        .with_code_ttl_minutes(config.code_ttl_minutes);
    let mailer = Arc::new(BackgroundMailDispatcher::new(Arc::new(template)));
    let fanout = Arc::new(BroadcastFanout::new(config.event_capacity));

    let accounts = AccountService::new(
        Arc::clone(&store),
        Arc::new(Argon2CredentialHasher::new()),
        Arc::clone(&mailer),
        Arc::clone(&clock),
    )
    .with_code_policy(config.code_policy()?);
    let memberships = MembershipService::new(Arc::clone(&store), mailer, Arc::clone(&clock));
    let tasks = TaskLifecycleService::new(store, Arc::clone(&fanout), clock);

    let mut listeners = JoinSet::new();
    for topic in Topic::ALL {
        if let Some(receiver) = fanout.subscribe(topic) {
            listeners.spawn(log_events(topic, receiver));
        }
    }
    info!(
        code_digits = accounts.codes().policy().digits(),
        "services ready; waiting for events"
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    listeners.abort_all();
    drop((accounts, memberships, tasks));
    Ok(())
}

async fn log_events(
    topic: Topic,
    mut receiver: tokio::sync::broadcast::Receiver<trellis::notification::domain::Notification>,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => info!(
                topic = topic.as_str(),
                event_type = event.event_type(),
                project_id = %event.project_id(),
                payload = %event.payload(),
                "event published"
            ),
            Err(RecvError::Lagged(skipped)) => {
                warn!(topic = topic.as_str(), skipped, "event listener lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
