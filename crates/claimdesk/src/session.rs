//! The acting user, passed explicitly to every operation that needs it.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::staff_repo;
use crate::db::DatabaseError;

/// Permission group of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum PermissionGroup {
    Employer,
    DataEntry,
    Other(u32),
}

impl From<u32> for PermissionGroup {
    fn from(id: u32) -> Self {
        match id {
            15 => Self::Employer,
            18 => Self::DataEntry,
            other => Self::Other(other),
        }
    }
}

impl From<PermissionGroup> for u32 {
    fn from(group: PermissionGroup) -> Self {
        match group {
            PermissionGroup::Employer => 15,
            PermissionGroup::DataEntry => 18,
            PermissionGroup::Other(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Auth profile id.
    pub user_id: String,
    /// `OSMStaffID` of the acting staff member.
    pub staff_id: i64,
    pub group: PermissionGroup,
}

impl Session {
    pub fn new(user_id: impl Into<String>, staff_id: i64, group: PermissionGroup) -> Self {
        Self {
            user_id: user_id.into(),
            staff_id,
            group,
        }
    }
}

/// Builds a session from an auth profile id by resolving the linked staff
/// row. Returns `None` when the profile is not a staff member.
pub fn resolve_staff(
    conn: &Connection,
    user_id: &str,
    group: PermissionGroup,
) -> Result<Option<Session>, DatabaseError> {
    Ok(staff_repo::find_by_user_id(conn, user_id)?
        .map(|staff| Session::new(user_id, staff.staff_id, group)))
}
