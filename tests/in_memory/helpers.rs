//! Shared fixtures for in-memory integration tests.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use eyre::{OptionExt, WrapErr};
use rstest::fixture;
use trellis::{
    clock::ManualClock,
    identity::{adapters::Argon2CredentialHasher, domain::Email, services::AccountService},
    mail::adapters::RecordingMailDispatcher,
    membership::{
        domain::{ProjectId, ProjectRole},
        services::MembershipService,
    },
    notification::adapters::BroadcastFanout,
    persistence::InMemoryStore,
    task::services::TaskLifecycleService,
};

/// Account service wired to the shared store.
pub type Accounts =
    AccountService<InMemoryStore, Argon2CredentialHasher, RecordingMailDispatcher, ManualClock>;

/// Membership service wired to the shared store.
pub type Memberships = MembershipService<InMemoryStore, RecordingMailDispatcher, ManualClock>;

/// Task service wired to the shared store.
pub type Tasks = TaskLifecycleService<InMemoryStore, BroadcastFanout, ManualClock>;

/// Every service over one store, one recording mailer, and one clock.
pub struct Platform {
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<RecordingMailDispatcher>,
    pub fanout: Arc<BroadcastFanout>,
    pub clock: Arc<ManualClock>,
    pub accounts: Accounts,
    pub memberships: Memberships,
    pub tasks: Tasks,
}

impl Platform {
    /// Builds a platform with the clock frozen at a fixed instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the test clock or hasher cannot be built.
    pub fn new() -> eyre::Result<Self> {
        let store = Arc::new(InMemoryStore::new());
        let mailer = Arc::new(RecordingMailDispatcher::new());
        let fanout = Arc::new(BroadcastFanout::new(64));
        let start = Utc
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
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
            Arc::clone(&fanout),
            Arc::clone(&clock),
        );

        Ok(Self {
            store,
            mailer,
            fanout,
            clock,
            accounts,
            memberships,
            tasks,
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

    /// Invites `target` and redeems the mailed token on their behalf.
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
        self.memberships
            .invite_member(project_id, admin, target, Some(role))
            .await
            .wrap_err_with(|| format!("invite {target}"))?;
        let token = self.invite_token(target)?;
        self.memberships
            .accept_invite(&token)
            .await
            .wrap_err_with(|| format!("accept invitation for {target}"))?;
        Ok(())
    }

    /// Returns the last invitation token mailed to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if no invitation was mailed.
    pub fn invite_token(&self, target: &Email) -> eyre::Result<String> {
        let invite = self
            .mailer
            .last_invite_for(target)
            .ok_or_eyre("invitation mailed")?;
        Ok(invite.token.as_str().to_owned())
    }
}

/// Fresh platform for each test.
///
/// # Errors
///
/// Returns an error if the platform cannot be built.
#[fixture]
pub fn platform() -> eyre::Result<Platform> {
    Platform::new()
}
