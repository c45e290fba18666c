//! Record persistence.
//!
//! [`RecordStore`] is the seam between the handler and the relational store.
//! Its methods accept only [`Verified`] values and always bind them as
//! statement parameters. No method assembles SQL from data.
//!
//! [`SqliteStore`] is the shipped implementation. It opens one connection per
//! operation and drops it before returning, on success and failure alike.

use std::ops::ControlFlow;

use rusqlite::{params, Connection, OpenFlags};
use thiserror::Error;

use crate::config::StoreConfig;
use crate::Verified;

/// Boxed source error carried by [`StoreError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

const CREATE_SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS user_data (
        user_id TEXT NOT NULL,
        email   TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_user_data_user_id ON user_data (user_id);
";

const INSERT_RECORD_SQL: &str = "INSERT INTO user_data (user_id, email) VALUES (?1, ?2)";

const SELECT_BY_USER_ID_SQL: &str =
    "SELECT user_id, email FROM user_data WHERE user_id = ?1 ORDER BY rowid";

/// A stored `(user_id, email)` pair.
///
/// Values read back from the store are as untrusted as the request they
/// came from. Render them through [`Html::escape`](crate::Html::escape) and
/// never splice them into another statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// External user identifier. Not unique.
    pub user_id: String,
    /// Email address as submitted.
    pub email: String,
}

/// Errors raised by a [`RecordStore`].
///
/// The `Display` text names the failed operation only. Driver detail lives
/// in `source()` and belongs in logs, not responses.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A connection could not be opened or configured.
    #[error("could not open store connection")]
    Connect(#[source] BoxError),

    /// The store rejected or could not perform an insert.
    #[error("store write failed")]
    Write(#[source] BoxError),

    /// The store rejected or could not perform a query.
    #[error("store read failed")]
    Read(#[source] BoxError),

    /// Schema creation failed.
    #[error("store schema initialization failed")]
    Schema(#[source] BoxError),
}

impl StoreError {
    /// Wraps a source error as [`StoreError::Write`].
    pub fn write(source: impl Into<BoxError>) -> Self {
        Self::Write(source.into())
    }

    /// Wraps a source error as [`StoreError::Read`].
    pub fn read(source: impl Into<BoxError>) -> Self {
        Self::Read(source.into())
    }

    fn connect(source: rusqlite::Error) -> Self {
        Self::Connect(Box::new(source))
    }

    fn schema(source: rusqlite::Error) -> Self {
        Self::Schema(Box::new(source))
    }
}

/// Persistence operations the handler needs.
///
/// # Invariants
///
/// Implementations MUST:
/// - Bind `user_id` and `email` as data parameters, never as command text
/// - Match `user_id` exactly in `for_each_by_user_id`
/// - Release any connection or session before returning, on every path
pub trait RecordStore {
    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot perform the insert.
    fn insert(&self, user_id: &Verified<String>, email: &Verified<String>)
        -> Result<(), StoreError>;

    /// Streams every record whose `user_id` equals `user_id` to `visit`, in
    /// insertion order.
    ///
    /// Stops early if `visit` returns `ControlFlow::Break`. Returns the number
    /// of records handed to `visit`. A failure after some records have been
    /// visited still returns `Err`. Those records are not replayed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query cannot be run or a row cannot be read.
    fn for_each_by_user_id(
        &self,
        user_id: &Verified<String>,
        visit: &mut dyn FnMut(UserRecord) -> ControlFlow<()>,
    ) -> Result<usize, StoreError>;
}

/// SQLite-backed [`RecordStore`].
///
/// # Examples
///
/// ```no_run
/// use profile_guard::{RecordStore, SqliteStore, StoreConfig};
///
/// let store = SqliteStore::new(StoreConfig::new("profiles.db"));
/// store.initialize().expect("schema");
/// ```
#[derive(Debug, Clone)]
pub struct SqliteStore {
    config: StoreConfig,
}

impl SqliteStore {
    /// Creates a store. No connection is opened until an operation runs.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Creates the `user_data` table and its index if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connect` or `StoreError::Schema`.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute_batch(CREATE_SCHEMA_SQL)
            .map_err(StoreError::schema)?;
        tracing::debug!(target: "profile_guard::store", "schema ready");
        Ok(())
    }

    // The returned connection is owned by the caller's stack frame and closes
    // when it drops, on success and on `?` alike.
    fn connect(&self) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(self.config.url.expose_secret(), flags)
            .map_err(StoreError::connect)?;
        conn.busy_timeout(self.config.busy_timeout)
            .map_err(StoreError::connect)?;
        Ok(conn)
    }
}

impl RecordStore for SqliteStore {
    fn insert(
        &self,
        user_id: &Verified<String>,
        email: &Verified<String>,
    ) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let changed = conn
            .execute(INSERT_RECORD_SQL, params![user_id.as_str(), email.as_str()])
            .map_err(StoreError::write)?;

        if changed != 1 {
            return Err(StoreError::write(format!(
                "insert affected {changed} rows, expected 1"
            )));
        }
        Ok(())
    }

    fn for_each_by_user_id(
        &self,
        user_id: &Verified<String>,
        visit: &mut dyn FnMut(UserRecord) -> ControlFlow<()>,
    ) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(SELECT_BY_USER_ID_SQL)
            .map_err(StoreError::read)?;
        let mut rows = stmt
            .query(params![user_id.as_str()])
            .map_err(StoreError::read)?;

        let mut visited = 0;
        while let Some(row) = rows.next().map_err(StoreError::read)? {
            let record = UserRecord {
                user_id: row.get(0).map_err(StoreError::read)?,
                email: row.get(1).map_err(StoreError::read)?,
            };
            visited += 1;
            if visit(record).is_break() {
                break;
            }
        }
        Ok(visited)
    }
}
