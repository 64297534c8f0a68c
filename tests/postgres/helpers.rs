//! Shared setup for `PostgreSQL` integration tests.
//!
//! Every test gets its own database cloned from a migrated template on the
//! shared embedded cluster. The database is dropped when the platform is.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use eyre::{OptionExt, WrapErr};
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;
use trellis::{
    clock::ManualClock,
    identity::{adapters::Argon2CredentialHasher, domain::Email, services::AccountService},
    mail::adapters::RecordingMailDispatcher,
    membership::{
        domain::{ProjectId, ProjectRole},
        services::MembershipService,
    },
    notification::adapters::BroadcastFanout,
    persistence::{PostgresStore, postgres::SCHEMA_SQL},
    task::services::TaskLifecycleService,
};

/// Template database holding the migrated schema.
pub const TEMPLATE_DB: &str = "trellis_test_template";

/// Pool size for test stores; concurrent tests need more than one.
const POOL_SIZE: u32 = 4;

/// Account service wired to a `PostgreSQL` store.
pub type Accounts =
    AccountService<PostgresStore, Argon2CredentialHasher, RecordingMailDispatcher, ManualClock>;

/// Membership service wired to a `PostgreSQL` store.
pub type Memberships = MembershipService<PostgresStore, RecordingMailDispatcher, ManualClock>;

/// Task service wired to a `PostgreSQL` store.
pub type Tasks = TaskLifecycleService<PostgresStore, BroadcastFanout, ManualClock>;

/// Creates a runtime for driving async store calls from sync tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> eyre::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("build test runtime")
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if the template cannot be created or migrated.
pub fn ensure_template(cluster: &TestCluster) -> eyre::Result<()> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            // The schema contains a DO block, so it must run as one batch.
            conn.batch_execute(SCHEMA_SQL)
                .map_err(|e| eyre::eyre!("schema error: {e}"))?;
            Ok(())
        })
        .map_err(|err| eyre::eyre!("template setup failed: {err}"))
}

/// Database cloned from the template, dropped on scope exit.
pub struct TestDatabase {
    cluster: &'static TestCluster,
    name: String,
}

impl TestDatabase {
    /// Clones the template into a uniquely named database.
    ///
    /// # Errors
    ///
    /// Returns an error if the template or the clone cannot be created.
    pub fn create(cluster: &'static TestCluster) -> eyre::Result<Self> {
        ensure_template(cluster)?;
        let name = format!("trellis_{}", uuid::Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|err| eyre::eyre!("create {name}: {err}"))?;
        Ok(Self { cluster, name })
    }

    /// Returns the connection URL.
    #[must_use]
    pub fn url(&self) -> String {
        self.cluster.connection().database_url(&self.name)
    }
}

impl Drop for TestDatabase {
    #[expect(
        clippy::print_stderr,
        reason = "Test cleanup warnings are informational"
    )]
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(self.name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {err}", self.name);
        }
    }
}

/// Every service over one `PostgreSQL` store.
///
/// Field order matters: the pool must close before the database is dropped.
pub struct PgPlatform {
    pub accounts: Accounts,
    pub memberships: Memberships,
    pub tasks: Tasks,
    pub store: Arc<PostgresStore>,
    pub mailer: Arc<RecordingMailDispatcher>,
    pub clock: Arc<ManualClock>,
    pub runtime: Runtime,
    _database: TestDatabase,
}

impl PgPlatform {
    /// Builds a platform over a fresh database with the clock frozen.
    ///
    /// # Errors
    ///
    /// Returns an error if the database, pool, or hasher cannot be set up.
    pub fn new(cluster: &'static TestCluster) -> eyre::Result<Self> {
        let database = TestDatabase::create(cluster)?;
        let store = Arc::new(
            PostgresStore::connect(&database.url(), POOL_SIZE).wrap_err("connect store")?,
        );
        let mailer = Arc::new(RecordingMailDispatcher::new());
        let start = Utc
            .with_ymd_and_hms(2026, 4, 14, 8, 0, 0)
            .single()
            .ok_or_eyre("fixed start instant")?;
        let clock = Arc::new(ManualClock::new(start));
        let hasher = Argon2CredentialHasher::with_params(1024, 1, 1)
            .map_err(|err| eyre::eyre!("argon2 params: {err}"))?;

        let accounts = AccountService::new(
            Arc::clone(&store),
            Arc::new(hasher),
            Arc::clone(&mailer),
            Arc::clone(&clock),
        );
        let memberships =
            MembershipService::new(Arc::clone(&store), Arc::clone(&mailer), Arc::clone(&clock));
        let tasks = TaskLifecycleService::new(
            Arc::clone(&store),
            Arc::new(BroadcastFanout::new(16)),
            Arc::clone(&clock),
        );

        Ok(Self {
            accounts,
            memberships,
            tasks,
            store,
            mailer,
            clock,
            runtime: test_runtime()?,
            _database: database,
        })
    }

    /// Registers and verifies a user, returning their normalized email.
    ///
    /// # Errors
    ///
    /// Returns an error if registration or verification fails.
    pub async fn signed_up(&self, name: &str, address: &str) -> eyre::Result<Email> {
        let user = self
            .accounts
            .register(name, address, "correct horse")
            .await
            .wrap_err_with(|| format!("register {address}"))?;
        let email = user.email().clone();
        let code = self
            .mailer
            .last_code_for(&email)
            .ok_or_eyre("verification code mailed")?;
        self.accounts
            .verify(&email, code.as_str())
            .await
            .wrap_err_with(|| format!("verify {address}"))?;
        Ok(email)
    }

    /// Invites `target` and returns the mailed token without redeeming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the invitation fails or no mail was recorded.
    pub async fn invite(
        &self,
        project_id: ProjectId,
        admin: &Email,
        target: &Email,
        role: ProjectRole,
    ) -> eyre::Result<String> {
        self.memberships
            .invite_member(project_id, admin, target, Some(role))
            .await
            .wrap_err_with(|| format!("invite {target}"))?;
        let invite = self
            .mailer
            .last_invite_for(target)
            .ok_or_eyre("invitation mailed")?;
        Ok(invite.token.as_str().to_owned())
    }

    /// Invites `target` and redeems the token on their behalf.
    ///
    /// # Errors
    ///
    /// Returns an error if the invitation or acceptance fails.
    pub async fn join(
        &self,
        project_id: ProjectId,
        admin: &Email,
        target: &Email,
        role: ProjectRole,
    ) -> eyre::Result<()> {
        let token = self.invite(project_id, admin, target, role).await?;
        self.memberships
            .accept_invite(&token)
            .await
            .wrap_err_with(|| format!("accept invitation for {target}"))?;
        Ok(())
    }
}
