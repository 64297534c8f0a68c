//! `PostgreSQL` store built on diesel and an r2d2 pool.
//!
//! Blocking diesel calls run on tokio's blocking pool. Operations that touch
//! several rows run inside one transaction; task writes take a share lock on
//! the assignee's membership row so that a concurrent member removal either
//! sees the new task or makes the write fail.

mod identity;
mod membership;
mod models;
mod schema;
mod task;
mod verification;

use crate::{
    identity::ports::UserRepositoryError, membership::ports::MembershipRepositoryError,
    task::ports::TaskRepositoryError, verification::ports::OneTimeCodeRepositoryError,
};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::Error as DieselError;
use thiserror::Error;

/// `PostgreSQL` connection pool type used by the store.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// DDL creating every table the store uses. Statements are idempotent.
pub const SCHEMA_SQL: &str =
    include_str!("../../../migrations/2026-10-01-000000_create_trellis_tables/up.sql");

/// Errors raised while connecting or preparing the schema.
#[derive(Debug, Error)]
pub enum StoreSetupError {
    /// The pool could not be built or could not hand out a connection.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    /// Applying the schema failed.
    #[error("schema error: {0}")]
    Schema(#[from] DieselError),

    /// The blocking worker panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// `PostgreSQL` implementation of every repository port.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store from an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool of at most `max_connections` connections to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreSetupError::Pool`] when the pool cannot be built.
    pub fn connect(url: &str, max_connections: u32) -> Result<Self, StoreSetupError> {
        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool = Pool::builder().max_size(max_connections).build(manager)?;
        Ok(Self::new(pool))
    }

    /// Returns the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates any missing tables, constraints and indexes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreSetupError`] when a connection cannot be obtained or
    /// the DDL fails.
    pub async fn apply_schema(&self) -> Result<(), StoreSetupError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreSetupError> {
            let mut connection = pool.get()?;
            connection.batch_execute(SCHEMA_SQL)?;
            Ok(())
        })
        .await?
    }

    async fn run_blocking<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: StoreError + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(E::wrap)?;
            f(&mut connection)
        })
        .await
        .map_err(E::wrap)?
    }
}

/// Port errors that can wrap an infrastructure failure.
trait StoreError: From<DieselError> {
    fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self;
}

macro_rules! store_error {
    ($($error:ty),+ $(,)?) => {
        $(
            impl StoreError for $error {
                fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
                    <$error>::persistence(err)
                }
            }

            impl From<DieselError> for $error {
                fn from(err: DieselError) -> Self {
                    <$error>::persistence(err)
                }
            }
        )+
    };
}

store_error!(
    UserRepositoryError,
    OneTimeCodeRepositoryError,
    MembershipRepositoryError,
    TaskRepositoryError,
);
