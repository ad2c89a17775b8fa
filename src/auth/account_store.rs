//! Account Storage
//! Mission: Store user and admin accounts in one role-tagged SQLite table

use crate::auth::models::{Account, NewAccount, Role};
use crate::db::Database;
use anyhow::{Context, Result};
use bcrypt::{hash, verify};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;
use uuid::Uuid;

/// bcrypt work factor used unless configured otherwise
pub const DEFAULT_BCRYPT_COST: u32 = 10;

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

/// Account storage with SQLite backend
pub struct AccountStore {
    db: Database,
    bcrypt_cost: u32,
}

impl AccountStore {
    pub fn new(db: Database, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }

    /// Create a new account unless the email is already registered under
    /// either role. The password is hashed before the connection lock is
    /// taken; the final check and the insert run under one lock.
    pub fn create_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<NewAccount> {
        // Skip the hash for emails that are obviously taken
        if let Some(existing) = self.get_by_email(email)? {
            return Ok(NewAccount::EmailTaken(existing.role));
        }

        let password_hash = hash(password, self.bcrypt_cost).context("Failed to hash password")?;

        let conn = self.db.lock();

        if let Some(existing) = find_one(&conn, "WHERE email = ?1", params![email])? {
            return Ok(NewAccount::EmailTaken(existing.role));
        }

        let account = Account {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            created_at: Utc::now().to_rfc3339(),
        };

        conn.execute(
            "INSERT INTO accounts (id, name, email, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account.id.to_string(),
                account.name,
                account.email,
                account.password_hash,
                account.role.as_str(),
                account.created_at,
            ],
        )
        .context("Failed to insert account")?;

        info!("✅ Created {} account: {}", account.role, account.name);

        Ok(NewAccount::Created(account))
    }

    /// Get account by email, whatever its role
    pub fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let conn = self.db.lock();
        find_one(&conn, "WHERE email = ?1", params![email])
    }

    /// Get account by email within a single role
    pub fn get_by_email_and_role(&self, email: &str, role: Role) -> Result<Option<Account>> {
        let conn = self.db.lock();
        find_one(
            &conn,
            "WHERE email = ?1 AND role = ?2",
            params![email, role.as_str()],
        )
    }

    /// Get the earliest-registered account of `role` with display name `name`
    pub fn get_by_name(&self, name: &str, role: Role) -> Result<Option<Account>> {
        let conn = self.db.lock();
        find_one(
            &conn,
            "WHERE name = ?1 AND role = ?2 ORDER BY rowid LIMIT 1",
            params![name, role.as_str()],
        )
    }

    /// Verify email and password within the role the caller claims.
    /// Returns the account only when both match.
    pub fn verify_password(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Option<Account>> {
        match self.get_by_email_and_role(email, role)? {
            Some(account) => {
                let valid = verify(password, &account.password_hash)
                    .context("Failed to verify password")?;
                Ok(valid.then_some(account))
            }
            None => Ok(None),
        }
    }

    /// Display names of every account with `role`, in registration order
    pub fn list_names(&self, role: Role) -> Result<Vec<String>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare("SELECT name FROM accounts WHERE role = ?1 ORDER BY rowid")?;
        let names = stmt
            .query_map(params![role.as_str()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()
            .context("Failed to list account names")?;

        Ok(names)
    }
}

fn find_one(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Option<Account>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts {filter}");
    let row = conn
        .query_row(&sql, params, read_account_row)
        .optional()
        .context("Failed to query accounts")?;

    row.map(AccountRow::into_account).transpose()
}

/// Raw column values; converted outside the rusqlite closure so bad data
/// surfaces as an error instead of a panic.
struct AccountRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: String,
}

fn read_account_row(row: &Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl AccountRow {
    fn into_account(self) -> Result<Account> {
        let id = Uuid::parse_str(&self.id)
            .with_context(|| format!("Corrupt account id: {}", self.id))?;
        let role = Role::from_str(&self.role)
            .with_context(|| format!("Unknown role {} for account {}", self.role, self.id))?;

        Ok(Account {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration as StdDuration;
    use tempfile::NamedTempFile;

    fn create_test_store() -> AccountStore {
        AccountStore::new(Database::in_memory().unwrap(), 4)
    }

    fn created(outcome: NewAccount) -> Account {
        match outcome {
            NewAccount::Created(account) => account,
            NewAccount::EmailTaken(role) => panic!("email already taken by {role}"),
        }
    }

    #[test]
    fn test_create_and_retrieve_account() {
        let store = create_test_store();

        let alice = created(
            store
                .create_account("alice", "alice@example.com", "password123", Role::User)
                .unwrap(),
        );
        assert_eq!(alice.name, "alice");
        assert_eq!(alice.role, Role::User);
        assert_ne!(alice.password_hash, "password123");

        let retrieved = store.get_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(retrieved.id, alice.id);
        assert_eq!(retrieved.role, Role::User);
    }

    #[test]
    fn test_duplicate_email_across_roles() {
        let store = create_test_store();

        created(
            store
                .create_account("bob", "bob@example.com", "pw", Role::Admin)
                .unwrap(),
        );

        let again = store
            .create_account("bob", "bob@example.com", "pw", Role::Admin)
            .unwrap();
        assert!(matches!(again, NewAccount::EmailTaken(Role::Admin)));

        let as_user = store
            .create_account("bobby", "bob@example.com", "other", Role::User)
            .unwrap();
        assert!(matches!(as_user, NewAccount::EmailTaken(Role::Admin)));
    }

    #[test]
    fn test_password_verification() {
        let store = create_test_store();
        created(
            store
                .create_account("alice", "alice@example.com", "s3cret", Role::User)
                .unwrap(),
        );

        // Correct password and role
        assert!(store
            .verify_password("alice@example.com", "s3cret", Role::User)
            .unwrap()
            .is_some());

        // Incorrect password
        assert!(store
            .verify_password("alice@example.com", "wrong", Role::User)
            .unwrap()
            .is_none());

        // Correct password, wrong role
        assert!(store
            .verify_password("alice@example.com", "s3cret", Role::Admin)
            .unwrap()
            .is_none());

        // Non-existent account
        assert!(store
            .verify_password("nobody@example.com", "s3cret", Role::User)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_get_by_name_is_role_scoped() {
        let store = create_test_store();
        created(
            store
                .create_account("sam", "sam-user@example.com", "pw", Role::User)
                .unwrap(),
        );
        let admin = created(
            store
                .create_account("sam", "sam-admin@example.com", "pw", Role::Admin)
                .unwrap(),
        );

        let found = store.get_by_name("sam", Role::Admin).unwrap().unwrap();
        assert_eq!(found.id, admin.id);
        assert!(store.get_by_name("nobody", Role::User).unwrap().is_none());
    }

    #[test]
    fn test_get_by_name_prefers_earliest() {
        let store = create_test_store();
        let first = created(
            store
                .create_account("dana", "dana1@example.com", "pw", Role::Admin)
                .unwrap(),
        );
        created(
            store
                .create_account("dana", "dana2@example.com", "pw", Role::Admin)
                .unwrap(),
        );

        let found = store.get_by_name("dana", Role::Admin).unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[test]
    fn test_list_names() {
        let store = create_test_store();
        for (name, role) in [
            ("bob", Role::Admin),
            ("alice", Role::User),
            ("carol", Role::Admin),
        ] {
            created(
                store
                    .create_account(name, &format!("{name}@example.com"), "pw", role)
                    .unwrap(),
            );
        }

        assert_eq!(store.list_names(Role::Admin).unwrap(), vec!["bob", "carol"]);
        assert_eq!(store.list_names(Role::User).unwrap(), vec!["alice"]);
    }

    #[test]
    fn test_accounts_persist_on_disk() {
        let temp_file = NamedTempFile::new().unwrap();

        {
            let store = AccountStore::new(Database::open(temp_file.path()).unwrap(), 4);
            created(
                store
                    .create_account("alice", "alice@example.com", "pw", Role::User)
                    .unwrap(),
            );
        }

        let store = AccountStore::new(Database::open(temp_file.path()).unwrap(), 4);
        assert!(store
            .verify_password("alice@example.com", "pw", Role::User)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_reads_not_blocked_by_password_hashing() {
        // A slow work factor keeps the hash running well past the read below
        let store = Arc::new(AccountStore::new(Database::in_memory().unwrap(), 12));
        created(
            store
                .create_account("bob", "bob@example.com", "pw", Role::Admin)
                .unwrap(),
        );

        let finished = Arc::new(AtomicBool::new(false));
        let registration = {
            let store = store.clone();
            let finished = finished.clone();
            thread::spawn(move || {
                let outcome = store
                    .create_account("alice", "alice@example.com", "pw", Role::User)
                    .unwrap();
                finished.store(true, Ordering::SeqCst);
                outcome
            })
        };

        thread::sleep(StdDuration::from_millis(20));
        let names = store.list_names(Role::Admin).unwrap();
        assert_eq!(names, vec!["bob"]);
        assert!(
            !finished.load(Ordering::SeqCst),
            "read waited for a registration's password hash"
        );

        created(registration.join().unwrap());
        assert!(store.get_by_email("alice@example.com").unwrap().is_some());
    }
}
