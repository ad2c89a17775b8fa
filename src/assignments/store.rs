//! Assignment Storage
//! Mission: Persist assignments and scope reads/writes to the owning admin

use crate::assignments::models::{AdminAssignment, Assignment, AssignmentStatus};
use crate::db::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Row};
use tracing::{debug, info};
use uuid::Uuid;

/// Assignment storage sharing the account database
pub struct AssignmentStore {
    db: Database,
}

impl AssignmentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a new assignment
    pub fn insert(&self, assignment: &Assignment) -> Result<()> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO assignments (id, user_id, admin_id, task, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                assignment.id.to_string(),
                assignment.user_id.to_string(),
                assignment.admin_id.to_string(),
                assignment.task,
                assignment.status.as_str(),
                encode_time(&assignment.created_at),
            ],
        )
        .context("Failed to insert assignment")?;

        info!(
            "📥 Assignment {} uploaded by {} for admin {}",
            assignment.id, assignment.user_id, assignment.admin_id
        );
        Ok(())
    }

    /// Fetch one assignment by id
    #[cfg(test)]
    pub(crate) fn get(&self, id: &str) -> Result<Option<Assignment>> {
        use rusqlite::OptionalExtension;

        let conn = self.db.lock();
        let row = conn
            .query_row(
                "SELECT id, user_id, admin_id, task, status, created_at
                 FROM assignments WHERE id = ?1",
                params![id],
                read_assignment_row,
            )
            .optional()
            .context("Failed to query assignment")?;

        row.map(AssignmentRow::into_assignment).transpose()
    }

    /// Every assignment addressed to `admin_id`, newest first, with the
    /// uploading user's name. Insertion order breaks timestamp ties.
    pub fn list_for_admin(&self, admin_id: Uuid) -> Result<Vec<AdminAssignment>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT a.id, a.user_id, a.admin_id, a.task, a.status, a.created_at, u.name
             FROM assignments a
             JOIN accounts u ON u.id = a.user_id
             WHERE a.admin_id = ?1
             ORDER BY a.created_at DESC, a.rowid DESC",
        )?;

        let rows = stmt
            .query_map(params![admin_id.to_string()], |row| {
                Ok((read_assignment_row(row)?, row.get::<_, String>(6)?))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list assignments")?;

        rows.into_iter()
            .map(|(row, user_name)| -> Result<AdminAssignment> {
                Ok(AdminAssignment {
                    assignment: row.into_assignment()?,
                    user_name,
                })
            })
            .collect()
    }

    /// Set the status of an assignment owned by `admin_id`.
    ///
    /// Returns `None` when no assignment matches both the id and the owner,
    /// without distinguishing the two cases.
    pub fn set_status(
        &self,
        id: &str,
        admin_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<Option<Assignment>> {
        let conn = self.db.lock();

        let updated = conn
            .execute(
                "UPDATE assignments SET status = ?1 WHERE id = ?2 AND admin_id = ?3",
                params![status.as_str(), id, admin_id.to_string()],
            )
            .context("Failed to update assignment status")?;

        if updated == 0 {
            debug!("No assignment {} owned by admin {}", id, admin_id);
            return Ok(None);
        }

        let row = conn
            .query_row(
                "SELECT id, user_id, admin_id, task, status, created_at
                 FROM assignments WHERE id = ?1",
                params![id],
                read_assignment_row,
            )
            .context("Failed to reload assignment")?;

        info!("📝 Assignment {} marked {} by admin {}", id, status.as_str(), admin_id);
        row.into_assignment().map(Some)
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering
fn encode_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

struct AssignmentRow {
    id: String,
    user_id: String,
    admin_id: String,
    task: String,
    status: String,
    created_at: String,
}

fn read_assignment_row(row: &Row<'_>) -> rusqlite::Result<AssignmentRow> {
    Ok(AssignmentRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        admin_id: row.get(2)?,
        task: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl AssignmentRow {
    fn into_assignment(self) -> Result<Assignment> {
        let parse_id = |raw: &str| {
            Uuid::parse_str(raw).with_context(|| format!("Corrupt id in assignment {}", self.id))
        };

        Ok(Assignment {
            id: parse_id(&self.id)?,
            user_id: parse_id(&self.user_id)?,
            admin_id: parse_id(&self.admin_id)?,
            status: AssignmentStatus::from_str(&self.status)
                .with_context(|| format!("Unknown status {} in assignment {}", self.status, self.id))?,
            created_at: DateTime::parse_from_rfc3339(&self.created_at)
                .with_context(|| format!("Corrupt timestamp in assignment {}", self.id))?
                .with_timezone(&Utc),
            task: self.task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        models::{NewAccount, Role},
        AccountStore,
    };
    use chrono::{Duration, TimeZone};

    struct Fixture {
        store: AssignmentStore,
        accounts: AccountStore,
    }

    impl Fixture {
        fn new() -> Self {
            let db = Database::in_memory().unwrap();
            Self {
                store: AssignmentStore::new(db.clone()),
                accounts: AccountStore::new(db, 4),
            }
        }

        fn account(&self, name: &str, role: Role) -> Uuid {
            match self
                .accounts
                .create_account(name, &format!("{name}@example.com"), "pw", role)
                .unwrap()
            {
                NewAccount::Created(account) => account.id,
                NewAccount::EmailTaken(_) => panic!("duplicate fixture account {name}"),
            }
        }
    }

    #[test]
    fn test_insert_and_get() {
        let fx = Fixture::new();
        let alice = fx.account("alice", Role::User);
        let bob = fx.account("bob", Role::Admin);

        let assignment = Assignment::pending(alice, bob, "Write report".to_string());
        fx.store.insert(&assignment).unwrap();

        let loaded = fx.store.get(&assignment.id.to_string()).unwrap().unwrap();
        assert_eq!(loaded.task, "Write report");
        assert_eq!(loaded.status, AssignmentStatus::Pending);
        assert_eq!(loaded.user_id, alice);
        assert_eq!(loaded.admin_id, bob);
        // Microsecond precision survives the round trip
        assert_eq!(
            loaded.created_at.timestamp_micros(),
            assignment.created_at.timestamp_micros()
        );

        assert!(fx.store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_scoped_and_newest_first() {
        let fx = Fixture::new();
        let alice = fx.account("alice", Role::User);
        let bob = fx.account("bob", Role::Admin);
        let carol = fx.account("carol", Role::Admin);

        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        for (offset, task) in [(1, "second"), (0, "first"), (2, "third")] {
            let mut a = Assignment::pending(alice, bob, task.to_string());
            a.created_at = base + Duration::minutes(offset);
            fx.store.insert(&a).unwrap();
        }
        fx.store
            .insert(&Assignment::pending(alice, carol, "for carol".to_string()))
            .unwrap();

        let listed = fx.store.list_for_admin(bob).unwrap();
        let tasks: Vec<&str> = listed.iter().map(|r| r.assignment.task.as_str()).collect();
        assert_eq!(tasks, vec!["third", "second", "first"]);
        assert!(listed.iter().all(|r| r.user_name == "alice"));

        let for_carol = fx.store.list_for_admin(carol).unwrap();
        assert_eq!(for_carol.len(), 1);
        assert_eq!(for_carol[0].assignment.task, "for carol");
    }

    #[test]
    fn test_identical_timestamps_keep_insertion_order() {
        let fx = Fixture::new();
        let alice = fx.account("alice", Role::User);
        let bob = fx.account("bob", Role::Admin);

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        for task in ["older", "newer"] {
            let mut a = Assignment::pending(alice, bob, task.to_string());
            a.created_at = at;
            fx.store.insert(&a).unwrap();
        }

        let listed = fx.store.list_for_admin(bob).unwrap();
        assert_eq!(listed[0].assignment.task, "newer");
        assert_eq!(listed[1].assignment.task, "older");
    }

    #[test]
    fn test_set_status_requires_owner() {
        let fx = Fixture::new();
        let alice = fx.account("alice", Role::User);
        let bob = fx.account("bob", Role::Admin);
        let carol = fx.account("carol", Role::Admin);

        let assignment = Assignment::pending(alice, bob, "Write report".to_string());
        fx.store.insert(&assignment).unwrap();
        let id = assignment.id.to_string();

        // Another admin cannot touch it
        assert!(fx
            .store
            .set_status(&id, carol, AssignmentStatus::Rejected)
            .unwrap()
            .is_none());
        assert_eq!(
            fx.store.get(&id).unwrap().unwrap().status,
            AssignmentStatus::Pending
        );

        // Unknown id looks the same
        assert!(fx
            .store
            .set_status(&Uuid::new_v4().to_string(), bob, AssignmentStatus::Accepted)
            .unwrap()
            .is_none());

        let updated = fx
            .store
            .set_status(&id, bob, AssignmentStatus::Accepted)
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AssignmentStatus::Accepted);

        // Re-applying is harmless
        let again = fx
            .store
            .set_status(&id, bob, AssignmentStatus::Accepted)
            .unwrap()
            .unwrap();
        assert_eq!(again, updated);
    }
}
