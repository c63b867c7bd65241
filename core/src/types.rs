//! Domain records and request payloads for the OfficeVibe v2 API.
//!
//! # Design
//! Wire names are camelCase. The vendor sometimes spells `firstName` as
//! `fistName`; `User` decodes through `UserWire`, which accepts both and keeps
//! the correctly spelled value when it is present and non-empty.
//!
//! Response records derive `Default` so an envelope whose `data` is missing or
//! `null` still yields a value.

use serde::{Deserialize, Deserializer, Serialize};

/// A user as returned by the users and groups endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "UserWire")]
pub struct User {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub job_title: String,
    pub is_group_manager: bool,
    pub is_company_manager: bool,
    pub is_admin: bool,
    /// Ids of the groups this user manages.
    pub managed_groups: Vec<String>,
    /// Ids of the groups this user belongs to.
    pub member_groups: Vec<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UserWire {
    #[serde(deserialize_with = "nullable")]
    email: String,
    first_name: Option<String>,
    fist_name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    last_name: String,
    #[serde(deserialize_with = "nullable")]
    user_name: String,
    #[serde(deserialize_with = "nullable")]
    job_title: String,
    #[serde(deserialize_with = "nullable")]
    is_group_manager: bool,
    #[serde(deserialize_with = "nullable")]
    is_company_manager: bool,
    #[serde(deserialize_with = "nullable")]
    is_admin: bool,
    #[serde(deserialize_with = "nullable")]
    managed_groups: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    member_groups: Vec<String>,
}

/// Reads `null` as the type's default value.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        let first_name = match wire.first_name {
            Some(name) if !name.is_empty() => name,
            _ => wire.fist_name.unwrap_or_default(),
        };
        Self {
            email: wire.email,
            first_name,
            last_name: wire.last_name,
            user_name: wire.user_name,
            job_title: wire.job_title,
            is_group_manager: wire.is_group_manager,
            is_company_manager: wire.is_company_manager,
            is_admin: wire.is_admin,
            managed_groups: wire.managed_groups,
            member_groups: wire.member_groups,
        }
    }
}

/// `data` of the users list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserList {
    pub user_count: u64,
    #[serde(deserialize_with = "nullable")]
    pub users: Vec<User>,
}

/// A group. `users` is only populated by the single-group endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub user_count: u64,
    pub manager_count: u64,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,
}

/// `data` of the groups list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupList {
    pub group_count: u64,
    #[serde(deserialize_with = "nullable")]
    pub groups: Vec<Group>,
}

/// Counts reported by a successful sync.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSummary {
    pub user_count: u64,
    pub group_count: u64,
    pub mapping_count: u64,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeactivateUserRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveGroupRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddUsersToGroupRequest {
    pub group_id: String,
    pub emails: Vec<String>,
    pub to_managers: bool,
    pub to_members: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoveUsersFromGroupRequest {
    pub group_id: String,
    pub emails: Vec<String>,
    pub from_members: bool,
    pub from_managers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAllUsersFromGroupRequest {
    pub group_id: String,
    pub from_members: bool,
    pub from_managers: bool,
}

/// Bulk replacement of the whole directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub settings: SyncSettings,
    pub users: Vec<SyncUser>,
    pub groups: Vec<SyncGroup>,
    pub mappings: Vec<SyncMapping>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    /// Invite users that did not exist before the sync.
    pub send_invitations: bool,
    /// Deactivate users absent from the sync payload.
    pub deactivate_missing_users: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncUser {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncGroup {
    pub name: String,
}

/// Places `email` in the group called `group_name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncMapping {
    pub group_name: String,
    pub email: String,
    #[serde(default)]
    pub is_manager: bool,
    #[serde(default)]
    pub is_member: bool,
}
