//! Thread-safe in-memory store.
//!
//! Every port call takes the state lock once, so each call is atomic with
//! respect to every other call on the same store.

mod identity;
mod membership;
mod task;
mod verification;

use crate::{
    identity::domain::{Email, User},
    membership::domain::{Project, ProjectId, ProjectMember},
    task::domain::{Task, TaskId},
    verification::domain::OneTimeCode,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory implementation of every repository port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<Email, User>,
    codes: HashMap<Email, OneTimeCode>,
    projects: HashMap<ProjectId, Project>,
    members: BTreeMap<(ProjectId, Email), ProjectMember>,
    tasks: HashMap<TaskId, Task>,
}

impl StoreState {
    fn has_active_member(&self, project_id: ProjectId, email: &Email) -> bool {
        self.members
            .get(&(project_id, email.clone()))
            .is_some_and(ProjectMember::is_active)
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, StoreState>, std::io::Error> {
        self.state.read().map_err(lock_error)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>, std::io::Error> {
        self.state.write().map_err(lock_error)
    }
}

fn lock_error<T>(err: PoisonError<T>) -> std::io::Error {
    std::io::Error::other(err.to_string())
}
