// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the AgriConnect marketplace.
//!
//! This crate stores users, service requests and offers in `SQLite` via
//! Diesel, and runs every state-changing command as a single unit of work.
//!
//! ## Units of Work
//!
//! [`Persistence::execute`] opens a `BEGIN IMMEDIATE` transaction, loads the
//! request aggregate the command addresses, runs the pure transition
//! engine over it, and writes the resulting effects. Any failure rolls the
//! whole transaction back. Because `IMMEDIATE` takes the write lock before
//! the aggregate is read, two concurrent commands on the same request are
//! serialized and the second one sees the first one's outcome.
//!
//! ## Connections
//!
//! Connections come from an r2d2 pool. Each checkout enables foreign keys
//! and sets a busy timeout. File databases run in WAL mode so reads are
//! not blocked by the single writer.
//!
//! ## Testing Philosophy
//!
//! - Each test gets its own shared in-memory database
//! - Concurrency tests use a temporary file database, since shared-cache
//!   in-memory databases do not honour busy timeouts

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use agri_connect::{
    AggregateKey, Command, Notification, Outcome, RequestAggregate, TransitionResult, apply,
};
use agri_connect_domain::ServiceRequest;
use diesel::SqliteConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

mod backend;
mod data_models;
mod diesel_schema;
mod encoding;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{OfferScope, OfferView, RequestWithOffers, UserData};
pub use error::{PersistenceError, UnitOfWorkError};

use backend::sqlite::{ConnectionOptions, SqlitePool};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

type SqliteConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Tuning for file-backed storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageConfig {
    /// Maximum number of pooled connections.
    pub pool_size: u32,
    /// How long a writer waits for the database lock.
    pub busy_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// A command that has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTransition {
    /// What the transition did.
    pub outcome: Outcome,
    /// Notifications to deliver now that the writes are durable.
    pub notifications: Vec<Notification>,
    /// The id of the row the command created, for create commands.
    pub inserted_id: Option<i64>,
}

/// Persistence adapter for the marketplace.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Clone)]
pub struct Persistence {
    pool: SqlitePool,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call gets its own database, named from an atomic counter.
    /// The pool holds a single connection, which keeps the database alive
    /// and serves every caller in turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:agri_connect_mem_{db_id}?mode=memory&cache=shared");

        let pool: SqlitePool = backend::sqlite::build_pool(
            &shared_memory_url,
            1,
            ConnectionOptions {
                busy_timeout: StorageConfig::default().busy_timeout,
            },
        )?;

        Self::initialize(pool, false)
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    /// * `config` - Pool size and lock wait settings
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(
        path: P,
        config: &StorageConfig,
    ) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let pool: SqlitePool = backend::sqlite::build_pool(
            path_str,
            config.pool_size,
            ConnectionOptions {
                busy_timeout: config.busy_timeout,
            },
        )?;

        Self::initialize(pool, true)
    }

    fn initialize(pool: SqlitePool, wal: bool) -> Result<Self, PersistenceError> {
        let mut conn: SqliteConn = pool.get()?;

        if wal {
            backend::sqlite::enable_wal_mode(&mut conn)?;
        }
        backend::sqlite::run_migrations(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;
        drop(conn);

        info!("Persistence initialized");
        Ok(Self { pool })
    }

    fn connection(&self) -> Result<SqliteConn, PersistenceError> {
        Ok(self.pool.get()?)
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&self) -> Result<(), PersistenceError> {
        let mut conn: SqliteConn = self.connection()?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)
    }

    /// Checks that a connection can be obtained and the database answers.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the query fails.
    pub fn health_check(&self) -> Result<(), PersistenceError> {
        let mut conn: SqliteConn = self.connection()?;
        backend::sqlite::ping(&mut conn)
    }

    /// The most connections the pool will open.
    #[must_use]
    pub fn max_connections(&self) -> u32 {
        self.pool.max_size()
    }

    // ========================================================================
    // Units of Work
    // ========================================================================

    /// Runs a command as one atomic unit of work.
    ///
    /// Loads the addressed aggregate, applies the transition rules and
    /// writes the effects inside a single `BEGIN IMMEDIATE` transaction.
    /// Notifications are returned only once the transaction has committed.
    ///
    /// # Arguments
    ///
    /// * `command` - The command to run
    /// * `now` - The time to stamp on created or completed records
    ///
    /// # Errors
    ///
    /// Returns `UnitOfWorkError::Rejected` if the rules refuse the command,
    /// or `UnitOfWorkError::Storage` if the database fails. In both cases
    /// nothing was written.
    pub fn execute(
        &self,
        command: Command,
        now: OffsetDateTime,
    ) -> Result<CommittedTransition, UnitOfWorkError> {
        let name: &'static str = command.name();
        let key: AggregateKey = command.aggregate_key();

        let result: Result<CommittedTransition, UnitOfWorkError> = self
            .connection()?
            .immediate_transaction::<_, UnitOfWorkError, _>(|conn| {
                let aggregate: Option<RequestAggregate> = queries::load_aggregate(conn, key)?;
                let transition: TransitionResult = apply(aggregate.as_ref(), command, now)?;
                let inserted_id: Option<i64> =
                    mutations::apply_effects(conn, &transition.effects)?;

                Ok(CommittedTransition {
                    outcome: transition.outcome,
                    notifications: transition.notifications,
                    inserted_id,
                })
            });

        match &result {
            Ok(committed) => debug!(
                command = name,
                inserted_id = committed.inserted_id,
                notifications = committed.notifications.len(),
                "Unit of work committed"
            ),
            Err(UnitOfWorkError::Rejected(err)) => {
                debug!(command = name, error = %err, "Command rejected");
            }
            Err(UnitOfWorkError::Storage(err)) => {
                warn!(command = name, error = %err, "Unit of work rolled back");
            }
        }

        result
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Retrieves a service request by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_request(&self, request_id: i64) -> Result<Option<ServiceRequest>, PersistenceError> {
        let mut conn: SqliteConn = self.connection()?;
        queries::get_request(&mut conn, request_id)
    }

    /// Lists requests still open to offers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_open_requests(&self) -> Result<Vec<ServiceRequest>, PersistenceError> {
        let mut conn: SqliteConn = self.connection()?;
        queries::list_open_requests(&mut conn)
    }

    /// Lists a farmer's requests with their offers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_requests_for_farmer(
        &self,
        farmer_id: i64,
    ) -> Result<Vec<RequestWithOffers>, PersistenceError> {
        let mut conn: SqliteConn = self.connection()?;
        queries::list_requests_for_farmer(&mut conn, farmer_id)
    }

    /// Lists offers in a scope, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_offers(&self, scope: OfferScope) -> Result<Vec<OfferView>, PersistenceError> {
        let mut conn: SqliteConn = self.connection()?;
        queries::list_offers(&mut conn, scope)
    }

    /// Retrieves an offer with its request summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_offer_view(&self, offer_id: i64) -> Result<Option<OfferView>, PersistenceError> {
        let mut conn: SqliteConn = self.connection()?;
        queries::get_offer_view(&mut conn, offer_id)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Adds a user to the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is taken or the role is unknown.
    pub fn create_user(
        &self,
        username: &str,
        role: &str,
        now: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let mut conn: SqliteConn = self.connection()?;
        mutations::create_user(&mut conn, username, role, now)
    }

    /// Retrieves a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        let mut conn: SqliteConn = self.connection()?;
        queries::get_user(&mut conn, user_id)
    }

    /// Retrieves a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserData>, PersistenceError> {
        let mut conn: SqliteConn = self.connection()?;
        queries::get_user_by_username(&mut conn, username)
    }
}
