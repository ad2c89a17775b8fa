//! SQLite database handle shared by the account and assignment stores.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE accounts (
//!     id TEXT PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     email TEXT NOT NULL UNIQUE,       -- one email, one account, one role
//!     password_hash TEXT NOT NULL,
//!     role TEXT NOT NULL,               -- 'user' | 'admin'
//!     created_at TEXT NOT NULL
//! );
//!
//! CREATE TABLE assignments (
//!     id TEXT PRIMARY KEY,
//!     user_id TEXT NOT NULL REFERENCES accounts(id),
//!     admin_id TEXT NOT NULL REFERENCES accounts(id),
//!     task TEXT NOT NULL,
//!     status TEXT NOT NULL,             -- 'pending' | 'accepted' | 'rejected'
//!     created_at TEXT NOT NULL          -- RFC 3339, fixed microsecond precision
//! );
//! ```

use anyhow::{Context, Result};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Cloneable handle to a single SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `path` and initialize the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        let db = Self::from_connection(conn)?;
        info!("🗄️  Database ready at {}", path.display());
        Ok(db)
    }

    /// In-memory database, used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Lock the connection for a sequence of statements.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock();

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('user', 'admin')),
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_accounts_role_name ON accounts(role, name);

            CREATE TABLE IF NOT EXISTS assignments (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES accounts(id),
                admin_id TEXT NOT NULL REFERENCES accounts(id),
                task TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('pending', 'accepted', 'rejected')),
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_assignments_admin_created
                ON assignments(admin_id, created_at DESC);
            "#,
        )
        .context("Failed to initialize schema")?;

        Ok(())
    }
}
