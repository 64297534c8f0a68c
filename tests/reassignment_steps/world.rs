//! Shared world state for task reassignment BDD scenarios.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use eyre::WrapErr;
use rstest::fixture;
use trellis::{
    clock::ManualClock,
    identity::{
        domain::{CredentialHash, DisplayName, Email, User},
        ports::UserRepository,
    },
    mail::adapters::RecordingMailDispatcher,
    membership::{domain::ProjectId, services::MembershipService},
    notification::adapters::BroadcastFanout,
    persistence::InMemoryStore,
    task::{
        domain::{Task, TaskId},
        ports::TaskRepository,
        services::TaskLifecycleService,
    },
};

/// Membership service type used by the BDD world.
pub type TestMembershipService =
    MembershipService<InMemoryStore, RecordingMailDispatcher, ManualClock>;

/// Task service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryStore, BroadcastFanout, ManualClock>;

/// Scenario world for reassignment behaviour tests.
pub struct ReassignmentWorld {
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<RecordingMailDispatcher>,
    pub clock: Arc<ManualClock>,
    pub memberships: TestMembershipService,
    pub tasks: TestTaskService,
    pub project_id: Option<ProjectId>,
    pub admin: Option<Email>,
    pub task_id: Option<TaskId>,
    pub assigned_before: Option<DateTime<Utc>>,
}

impl ReassignmentWorld {
    /// Creates a world with no users or projects.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let mailer = Arc::new(RecordingMailDispatcher::new());
        let clock = Arc::new(ManualClock::default());
        let memberships =
            MembershipService::new(Arc::clone(&store), Arc::clone(&mailer), Arc::clone(&clock));
        let tasks = TaskLifecycleService::new(
            Arc::clone(&store),
            Arc::new(BroadcastFanout::new(16)),
            Arc::clone(&clock),
        );

        Self {
            store,
            mailer,
            clock,
            memberships,
            tasks,
            project_id: None,
            admin: None,
            task_id: None,
            assigned_before: None,
        }
    }

    /// Stores a user directly, bypassing account flows.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the store rejects the
    /// user.
    pub fn register(&self, address: &str) -> Result<Email, eyre::Report> {
        let email = Email::new(address)?;
        let user = User::register(
            email.clone(),
            DisplayName::new(address)?,
            CredentialHash::new("not-a-real-hash"),
            &*self.clock,
        );
        run_async(self.store.store_user(&user)).wrap_err("store scenario user")?;
        Ok(email)
    }

    /// Returns the scenario project and its administrator.
    ///
    /// # Errors
    ///
    /// Returns an error if no project has been set up yet.
    pub fn project(&self) -> Result<(ProjectId, Email), eyre::Report> {
        let project_id = self
            .project_id
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))?;
        let admin = self
            .admin
            .clone()
            .ok_or_else(|| eyre::eyre!("missing admin in scenario world"))?;
        Ok((project_id, admin))
    }

    /// Loads the scenario task as currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if no task was created or it no longer exists.
    pub fn current_task(&self) -> Result<Task, eyre::Report> {
        let task_id = self
            .task_id
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;
        run_async(self.store.find_task(task_id))?
            .ok_or_else(|| eyre::eyre!("task {task_id} no longer stored"))
    }
}

impl Default for ReassignmentWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ReassignmentWorld {
    ReassignmentWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
