//! Assignment data structures and their API projections

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Review state of an assignment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Rejected,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AssignmentStatus::Pending),
            "accepted" => Some(AssignmentStatus::Accepted),
            "rejected" => Some(AssignmentStatus::Rejected),
            _ => None,
        }
    }
}

/// A task a user addressed to an admin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub admin_id: Uuid,
    pub task: String,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    /// New assignment awaiting review, stamped now
    pub fn pending(user_id: Uuid, admin_id: Uuid, task: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            admin_id,
            task,
            status: AssignmentStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Assignment joined with the uploading user's display name
#[derive(Debug, Clone)]
pub struct AdminAssignment {
    pub assignment: Assignment,
    pub user_name: String,
}

/// Upload request body. `userId` and `admin` carry display names, not ids.
#[derive(Debug, Default, Deserialize)]
pub struct UploadRequest {
    #[serde(rename = "userId")]
    pub user_name: Option<String>,
    pub task: Option<String>,
    pub admin: Option<String>,
}

/// One row of the admin's assignment list
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub user_name: String,
    pub task: String,
    pub status: AssignmentStatus,
    pub created_at: String,
}

impl AssignmentView {
    pub fn new<Tz: TimeZone>(row: AdminAssignment, tz: &Tz) -> Self
    where
        Tz::Offset: Display,
    {
        Self {
            created_at: format_display_time(&row.assignment.created_at.with_timezone(tz)),
            user_name: row.user_name,
            task: row.assignment.task,
            status: row.assignment.status,
        }
    }
}

/// Accept/reject response body
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusChangeResponse {
    pub message: String,
    pub assignment: Assignment,
}

/// `D-M-YYYY HH:MM:SS`: day and month unpadded, 24-hour clock
pub fn format_display_time<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format("%-d-%-m-%Y %H:%M:%S").to_string()
}
