//! In-memory fake of the OfficeVibe v2 API.
//!
//! Mirrors the vendor's observable behaviour closely enough to exercise the
//! client end to end: JSON envelopes with `isSuccess`, an HTML login page for
//! a missing or wrong bearer token, `fistName` in single-user payloads, and
//! a `sync` endpoint that reports a list of errors.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Served with status 200 when the bearer token does not match.
pub const LOGIN_PAGE: &str = "<html><body>Login</body></html>";

#[derive(Clone, Debug, Default)]
pub struct UserRecord {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub is_admin: bool,
    pub active: bool,
}

impl UserRecord {
    fn invited(email: &str) -> Self {
        Self {
            email: email.to_string(),
            active: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
    pub members: BTreeSet<String>,
    pub managers: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct Directory {
    pub users: BTreeMap<String, UserRecord>,
    pub groups: BTreeMap<String, GroupRecord>,
}

impl Directory {
    fn active_user(&self, email: &str) -> Option<&UserRecord> {
        self.users.get(email).filter(|user| user.active)
    }

    fn group_by_name(&self, name: &str) -> Option<&GroupRecord> {
        self.groups.values().find(|group| group.name == name)
    }

    /// `first_name_key` lets callers reproduce the vendor's `fistName` typo.
    fn user_json(&self, user: &UserRecord, first_name_key: &str) -> Value {
        let managed: Vec<&str> = self
            .groups
            .values()
            .filter(|g| g.managers.contains(&user.email))
            .map(|g| g.id.as_str())
            .collect();
        let member: Vec<&str> = self
            .groups
            .values()
            .filter(|g| g.members.contains(&user.email))
            .map(|g| g.id.as_str())
            .collect();
        let mut value = json!({
            "email": user.email,
            "lastName": user.last_name,
            "userName": user.email.split('@').next().unwrap_or_default(),
            "jobTitle": user.job_title,
            "isGroupManager": !managed.is_empty(),
            "isCompanyManager": false,
            "isAdmin": user.is_admin,
            "managedGroups": managed,
            "memberGroups": member,
        });
        value[first_name_key] = Value::String(user.first_name.clone());
        value
    }

    fn group_json(&self, group: &GroupRecord, with_users: bool) -> Value {
        let mut value = json!({
            "id": group.id,
            "name": group.name,
            "userCount": group.members.len(),
            "managerCount": group.managers.len(),
        });
        if with_users {
            let emails: BTreeSet<&String> = group.members.union(&group.managers).collect();
            let users: Vec<Value> = emails
                .into_iter()
                .filter_map(|email| self.users.get(email))
                .map(|user| self.user_json(user, "fistName"))
                .collect();
            value["users"] = Value::Array(users);
        }
        value
    }
}

pub type Db = Arc<RwLock<Directory>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    db: Db,
}

type Reply = (StatusCode, Json<Value>);

fn success(data: Value) -> Reply {
    (
        StatusCode::OK,
        Json(json!({"isSuccess": true, "errorMessage": "", "data": data})),
    )
}

fn confirmed() -> Reply {
    (
        StatusCode::OK,
        Json(json!({"isSuccess": true, "errorMessage": ""})),
    )
}

fn failure(status: StatusCode, message: impl Into<String>) -> Reply {
    (
        status,
        Json(json!({"isSuccess": false, "errorMessage": message.into()})),
    )
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct EmailBody {
    pub email: String,
}

#[derive(Deserialize)]
pub struct NameBody {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupQuery {
    pub group_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUsersBody {
    pub group_id: String,
    pub emails: Vec<String>,
    #[serde(default)]
    pub to_managers: bool,
    #[serde(default)]
    pub to_members: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveUsersBody {
    pub group_id: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub from_members: bool,
    #[serde(default)]
    pub from_managers: bool,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettingsBody {
    pub send_invitations: bool,
    pub deactivate_missing_users: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncUserBody {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub job_title: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMappingBody {
    pub group_name: String,
    pub email: String,
    #[serde(default)]
    pub is_manager: bool,
    #[serde(default)]
    pub is_member: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SyncBody {
    pub settings: SyncSettingsBody,
    pub users: Vec<SyncUserBody>,
    pub groups: Vec<NameBody>,
    pub mappings: Vec<SyncMappingBody>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the router; requests must carry `Authorization: Bearer {api_key}`.
pub fn app(api_key: &str) -> Router {
    app_with_directory(api_key, Directory::default())
}

pub fn app_with_directory(api_key: &str, directory: Directory) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        db: Arc::new(RwLock::new(directory)),
    };
    Router::new()
        .route("/ping", get(ping))
        .route("/users", get(list_users))
        .route("/users/deactivate", post(deactivate_user))
        .route("/users/{email}", get(get_user).post(update_user))
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/", get(get_group))
        .route("/groups/remove", post(remove_group))
        .route("/groups/addUsers", post(add_users_to_group))
        .route("/groups/removeUsers", post(remove_users_from_group))
        .route("/groups/removeAllUsers", post(remove_all_users_from_group))
        .route("/sync", post(sync))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.api_key);
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if presented == Some(expected.as_str()) {
        next.run(request).await
    } else {
        debug!(uri = %request.uri(), "rejecting request without a valid api key");
        (StatusCode::OK, Html(LOGIN_PAGE)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

async fn ping() -> Reply {
    confirmed()
}

async fn list_users(State(state): State<AppState>) -> Reply {
    let dir = state.db.read().await;
    let users: Vec<Value> = dir
        .users
        .values()
        .filter(|user| user.active)
        .map(|user| dir.user_json(user, "firstName"))
        .collect();
    success(json!({"userCount": users.len(), "users": users}))
}

async fn get_user(State(state): State<AppState>, Path(email): Path<String>) -> Reply {
    let dir = state.db.read().await;
    match dir.active_user(&email) {
        Some(user) => success(dir.user_json(user, "fistName")),
        None => failure(StatusCode::NOT_FOUND, "user not found"),
    }
}

async fn update_user(State(state): State<AppState>, Path(email): Path<String>) -> Reply {
    if !email.contains('@') {
        return failure(StatusCode::BAD_REQUEST, format!("invalid email: {email}"));
    }
    let mut dir = state.db.write().await;
    dir.users
        .entry(email.clone())
        .and_modify(|user| user.active = true)
        .or_insert_with(|| {
            info!(%email, "inviting new user");
            UserRecord::invited(&email)
        });
    confirmed()
}

async fn deactivate_user(State(state): State<AppState>, Json(body): Json<EmailBody>) -> Reply {
    let mut dir = state.db.write().await;
    match dir.users.get_mut(&body.email).filter(|user| user.active) {
        Some(user) => {
            user.active = false;
            confirmed()
        }
        None => failure(StatusCode::NOT_FOUND, "user not found"),
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

async fn list_groups(State(state): State<AppState>) -> Reply {
    let dir = state.db.read().await;
    let groups: Vec<Value> = dir
        .groups
        .values()
        .map(|group| dir.group_json(group, false))
        .collect();
    success(json!({"groupCount": groups.len(), "groups": groups}))
}

async fn get_group(State(state): State<AppState>, Query(query): Query<GroupQuery>) -> Reply {
    let Some(group_id) = query.group_id else {
        return failure(StatusCode::BAD_REQUEST, "groupId is required");
    };
    let dir = state.db.read().await;
    match dir.groups.get(&group_id) {
        Some(group) => success(dir.group_json(group, true)),
        None => failure(StatusCode::NOT_FOUND, "group not found"),
    }
}

async fn create_group(State(state): State<AppState>, Json(body): Json<NameBody>) -> Reply {
    let mut dir = state.db.write().await;
    if dir.group_by_name(&body.name).is_some() {
        return failure(
            StatusCode::OK,
            format!("group already exists: {}", body.name),
        );
    }
    let id = Uuid::new_v4().to_string();
    dir.groups.insert(
        id.clone(),
        GroupRecord {
            id,
            name: body.name,
            ..GroupRecord::default()
        },
    );
    confirmed()
}

async fn remove_group(State(state): State<AppState>, Json(body): Json<NameBody>) -> Reply {
    let mut dir = state.db.write().await;
    let Some(id) = dir.group_by_name(&body.name).map(|group| group.id.clone()) else {
        return failure(StatusCode::NOT_FOUND, "group not found");
    };
    dir.groups.remove(&id);
    confirmed()
}

async fn add_users_to_group(
    State(state): State<AppState>,
    Json(body): Json<AddUsersBody>,
) -> Reply {
    let mut dir = state.db.write().await;
    if !dir.groups.contains_key(&body.group_id) {
        return failure(StatusCode::NOT_FOUND, "group not found");
    }
    let unknown: Vec<&str> = body
        .emails
        .iter()
        .filter(|email| dir.active_user(email).is_none())
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return failure(
            StatusCode::OK,
            format!("unknown users: {}", unknown.join(", ")),
        );
    }
    if let Some(group) = dir.groups.get_mut(&body.group_id) {
        for email in body.emails {
            if body.to_members {
                group.members.insert(email.clone());
            }
            if body.to_managers {
                group.managers.insert(email);
            }
        }
    }
    confirmed()
}

async fn remove_users_from_group(
    State(state): State<AppState>,
    Json(body): Json<RemoveUsersBody>,
) -> Reply {
    let mut dir = state.db.write().await;
    let Some(group) = dir.groups.get_mut(&body.group_id) else {
        return failure(StatusCode::NOT_FOUND, "group not found");
    };
    for email in &body.emails {
        if body.from_members {
            group.members.remove(email);
        }
        if body.from_managers {
            group.managers.remove(email);
        }
    }
    confirmed()
}

async fn remove_all_users_from_group(
    State(state): State<AppState>,
    Json(body): Json<RemoveUsersBody>,
) -> Reply {
    let mut dir = state.db.write().await;
    let Some(group) = dir.groups.get_mut(&body.group_id) else {
        return failure(StatusCode::NOT_FOUND, "group not found");
    };
    if body.from_members {
        group.members.clear();
    }
    if body.from_managers {
        group.managers.clear();
    }
    confirmed()
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

fn validate_sync(body: &SyncBody) -> Vec<String> {
    let group_names: BTreeSet<&str> = body.groups.iter().map(|g| g.name.as_str()).collect();
    let emails: BTreeSet<&str> = body.users.iter().map(|u| u.email.as_str()).collect();

    let mut errors: Vec<String> = body
        .users
        .iter()
        .filter(|user| !user.email.contains('@'))
        .map(|user| format!("invalid email: {}", user.email))
        .collect();
    for mapping in &body.mappings {
        if !group_names.contains(mapping.group_name.as_str()) {
            errors.push(format!("unknown group: {}", mapping.group_name));
        }
        if !emails.contains(mapping.email.as_str()) {
            errors.push(format!("unknown user: {}", mapping.email));
        }
    }
    errors
}

async fn sync(State(state): State<AppState>, Json(body): Json<SyncBody>) -> Reply {
    let errors = validate_sync(&body);
    if !errors.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"isSuccess": false, "errors": errors})),
        );
    }

    let mut dir = state.db.write().await;
    let synced: BTreeSet<&str> = body.users.iter().map(|u| u.email.as_str()).collect();
    if body.settings.deactivate_missing_users {
        for user in dir.users.values_mut() {
            if !synced.contains(user.email.as_str()) {
                user.active = false;
            }
        }
    }
    for incoming in &body.users {
        let user = dir
            .users
            .entry(incoming.email.clone())
            .or_insert_with(|| UserRecord::invited(&incoming.email));
        user.active = true;
        if let Some(first_name) = &incoming.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &incoming.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(job_title) = &incoming.job_title {
            user.job_title = job_title.clone();
        }
    }

    // Groups keep their id across syncs when the name is unchanged.
    let mut groups = BTreeMap::new();
    for incoming in &body.groups {
        let id = dir
            .group_by_name(&incoming.name)
            .map(|group| group.id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        groups.insert(
            id.clone(),
            GroupRecord {
                id,
                name: incoming.name.clone(),
                ..GroupRecord::default()
            },
        );
    }
    for mapping in &body.mappings {
        if let Some(group) = groups.values_mut().find(|g| g.name == mapping.group_name) {
            if mapping.is_member {
                group.members.insert(mapping.email.clone());
            }
            if mapping.is_manager {
                group.managers.insert(mapping.email.clone());
            }
        }
    }
    dir.groups = groups;

    info!(
        users = body.users.len(),
        groups = body.groups.len(),
        mappings = body.mappings.len(),
        send_invitations = body.settings.send_invitations,
        "sync applied"
    );
    (
        StatusCode::OK,
        Json(json!({
            "isSuccess": true,
            "errors": [],
            "data": {
                "userCount": body.users.len(),
                "groupCount": body.groups.len(),
                "mappingCount": body.mappings.len(),
            }
        })),
    )
}
