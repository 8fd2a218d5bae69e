// SPDX-License-Identifier: Apache-2.0

//! User directory lookup (the DataQuery collaborator seam).
//!
//! The query template is fixed at build time; the username travels to SQLite
//! as a bound parameter, out-of-band from the query text. Quotes, semicolons
//! and comment markers in the value are inert - the only possible effect is
//! an equality match against the stored username.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, params};

use crate::error::DiagError;

/// The only statement a lookup can execute. Column and table names are
/// decided here, never derived from request input.
const USER_LOOKUP_SQL: &str = "SELECT username FROM users WHERE username = ?1";

/// One row returned by a user lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    /// Stored username, copied verbatim into the response.
    pub username: String,
}

/// Read access to the user directory.
///
/// The handler consumes this as `&dyn UserDirectory`, so tests can substitute
/// a recording or failing directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the rows whose stored username equals `username` exactly.
    async fn lookup(&self, username: &str) -> Result<Vec<UserRow>, DiagError>;
}

/// SQLite-backed user directory.
///
/// Holds a single connection behind a mutex; lookups run on the blocking
/// thread pool. Connection pooling is the driver's concern, not this seam's.
#[derive(Debug, Clone)]
pub struct SqliteDirectory {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDirectory {
    /// Opens the directory at `path`. `:memory:` opens an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`DiagError::DataStore`] if the database cannot be opened.
    pub fn open(path: &str) -> Result<Self, DiagError> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already-open connection. Used by tests to seed fixtures.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Creates the `users` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DiagError::DataStore`] on any SQLite error.
    pub fn init_schema(&self) -> Result<(), DiagError> {
        let conn = self.lock()?;
        conn.execute_batch("CREATE TABLE IF NOT EXISTS users (username TEXT NOT NULL)")?;
        Ok(())
    }

    /// Inserts a user row. The username is bound as a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`DiagError::DataStore`] on any SQLite error.
    pub fn insert_user(&self, username: &str) -> Result<(), DiagError> {
        let conn = self.lock()?;
        conn.execute("INSERT INTO users (username) VALUES (?1)", params![username])?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, DiagError> {
        self.conn.lock().map_err(|_| DiagError::DataStore {
            message: "connection lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl UserDirectory for SqliteDirectory {
    async fn lookup(&self, username: &str) -> Result<Vec<UserRow>, DiagError> {
        let conn = Arc::clone(&self.conn);
        let username = username.to_owned();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| DiagError::DataStore {
                message: "connection lock poisoned".to_string(),
            })?;
            let mut stmt = conn.prepare_cached(USER_LOOKUP_SQL)?;
            let rows = stmt
                .query_map(params![username], |row| {
                    Ok(UserRow {
                        username: row.get(0)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(|e| DiagError::DataStore {
            message: format!("lookup task failed: {e}"),
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteDirectory {
        let dir = SqliteDirectory::open(":memory:").unwrap();
        dir.init_schema().unwrap();
        dir.insert_user("alice").unwrap();
        dir.insert_user("bob").unwrap();
        dir
    }

    #[tokio::test]
    async fn finds_exact_match() {
        let dir = seeded();
        let rows = dir.lookup("alice").await.unwrap();
        assert_eq!(
            rows,
            vec![UserRow {
                username: "alice".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn no_match_returns_empty() {
        let dir = seeded();
        let rows = dir.lookup("mallory").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn sql_metacharacters_are_inert() {
        let dir = seeded();

        // The classic tautology matches nothing: it is compared as a literal
        let rows = dir.lookup("admin' OR '1'='1").await.unwrap();
        assert!(rows.is_empty());

        // Statement terminators and comment markers are data too
        let rows = dir.lookup("alice'; DROP TABLE users; --").await.unwrap();
        assert!(rows.is_empty());

        // The table survived
        let rows = dir.lookup("bob").await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn stored_metacharacters_match_literally() {
        let dir = seeded();
        dir.insert_user("o'brien; --").unwrap();

        let rows = dir.lookup("o'brien; --").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "o'brien; --");
    }

    #[tokio::test]
    async fn missing_table_is_a_data_store_error() {
        let dir = SqliteDirectory::open(":memory:").unwrap();
        let err = dir.lookup("alice").await.unwrap_err();
        assert!(matches!(err, DiagError::DataStore { .. }));
    }

    #[tokio::test]
    async fn on_disk_database_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("users.db");
        let dir = SqliteDirectory::open(path.to_str().unwrap()).unwrap();
        dir.init_schema().unwrap();
        dir.insert_user("carol").unwrap();

        let rows = dir.lookup("carol").await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
