//! Stateless request builder and response parser for the OfficeVibe v2 API.
//!
//! # Design
//! `VibeClient` holds the base URL and API key and nothing else. Each vendor
//! operation is a `build_*` method producing an `HttpRequest` and a `parse_*`
//! method consuming an `HttpResponse`. All requests go through `request` and
//! all responses through `envelope::parse`, so the only per-endpoint facts are
//! the method, the path, the body and the envelope type.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::envelope::{self, Confirmation, Response, SyncResponse};
use crate::error::VibeError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AddUsersToGroupRequest, CreateGroupRequest, DeactivateUserRequest, Group, GroupList,
    RemoveAllUsersFromGroupRequest, RemoveGroupRequest, RemoveUsersFromGroupRequest, SyncRequest,
    SyncSummary, User, UserList,
};

/// Builds `HttpRequest` values and parses `HttpResponse` values for every
/// vendor endpoint without touching the network.
#[derive(Clone)]
pub struct VibeClient {
    base_url: String,
    api_key: String,
}

impl fmt::Debug for VibeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VibeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl VibeClient {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_key(), config.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let url = format!("{}/{path}", self.base_url);
        debug!(%method, %url, "building vendor request");
        HttpRequest {
            method,
            url,
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", self.api_key)),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, VibeError> {
        let body = serde_json::to_string(body).map_err(VibeError::SerializationError)?;
        Ok(self.request(HttpMethod::Post, path, Some(body)))
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn build_ping(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "ping", None)
    }

    pub fn build_list_users(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "users", None)
    }

    /// The email is embedded in the path as given.
    pub fn build_get_user(&self, email: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("users/{email}"), None)
    }

    /// Creates the user and sends an invitation if they do not exist yet.
    pub fn build_update_user(&self, email: &str) -> HttpRequest {
        self.request(HttpMethod::Post, &format!("users/{email}"), None)
    }

    pub fn build_deactivate_user(
        &self,
        input: &DeactivateUserRequest,
    ) -> Result<HttpRequest, VibeError> {
        self.json_request("users/deactivate", input)
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    pub fn build_list_groups(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "groups", None)
    }

    pub fn build_get_group(&self, group_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("groups/?groupId={group_id}"), None)
    }

    pub fn build_create_group(&self, input: &CreateGroupRequest) -> Result<HttpRequest, VibeError> {
        self.json_request("groups", input)
    }

    pub fn build_remove_group(&self, input: &RemoveGroupRequest) -> Result<HttpRequest, VibeError> {
        self.json_request("groups/remove", input)
    }

    pub fn build_add_users_to_group(
        &self,
        input: &AddUsersToGroupRequest,
    ) -> Result<HttpRequest, VibeError> {
        self.json_request("groups/addUsers", input)
    }

    pub fn build_remove_users_from_group(
        &self,
        input: &RemoveUsersFromGroupRequest,
    ) -> Result<HttpRequest, VibeError> {
        self.json_request("groups/removeUsers", input)
    }

    pub fn build_remove_all_users_from_group(
        &self,
        input: &RemoveAllUsersFromGroupRequest,
    ) -> Result<HttpRequest, VibeError> {
        self.json_request("groups/removeAllUsers", input)
    }

    /// Replaces every user, group and membership in one call.
    pub fn build_sync(&self, input: &SyncRequest) -> Result<HttpRequest, VibeError> {
        self.json_request("sync", input)
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    pub fn parse_ping(&self, response: &HttpResponse) -> Result<(), VibeError> {
        confirm(response)
    }

    pub fn parse_list_users(&self, response: &HttpResponse) -> Result<UserList, VibeError> {
        envelope::parse::<Response<UserList>>(response)
    }

    pub fn parse_get_user(&self, response: &HttpResponse) -> Result<User, VibeError> {
        envelope::parse::<Response<User>>(response)
    }

    pub fn parse_update_user(&self, response: &HttpResponse) -> Result<(), VibeError> {
        confirm(response)
    }

    pub fn parse_deactivate_user(&self, response: &HttpResponse) -> Result<(), VibeError> {
        confirm(response)
    }

    pub fn parse_list_groups(&self, response: &HttpResponse) -> Result<GroupList, VibeError> {
        envelope::parse::<Response<GroupList>>(response)
    }

    pub fn parse_get_group(&self, response: &HttpResponse) -> Result<Group, VibeError> {
        envelope::parse::<Response<Group>>(response)
    }

    pub fn parse_create_group(&self, response: &HttpResponse) -> Result<(), VibeError> {
        confirm(response)
    }

    pub fn parse_remove_group(&self, response: &HttpResponse) -> Result<(), VibeError> {
        confirm(response)
    }

    pub fn parse_add_users_to_group(&self, response: &HttpResponse) -> Result<(), VibeError> {
        confirm(response)
    }

    pub fn parse_remove_users_from_group(&self, response: &HttpResponse) -> Result<(), VibeError> {
        confirm(response)
    }

    pub fn parse_remove_all_users_from_group(
        &self,
        response: &HttpResponse,
    ) -> Result<(), VibeError> {
        confirm(response)
    }

    pub fn parse_sync(&self, response: &HttpResponse) -> Result<SyncSummary, VibeError> {
        envelope::parse::<SyncResponse<SyncSummary>>(response)
    }
}

fn confirm(response: &HttpResponse) -> Result<(), VibeError> {
    envelope::parse::<Confirmation>(response).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SyncGroup, SyncMapping, SyncSettings, SyncUser};

    fn client() -> VibeClient {
        VibeClient::new("t3stT0K3n", "http://localhost:3000")
    }

    fn body_json(req: &HttpRequest) -> serde_json::Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn every_request_carries_auth_and_content_type() {
        let c = client();
        let requests = vec![
            c.build_ping(),
            c.build_list_users(),
            c.build_get_user("a@b.com"),
            c.build_update_user("a@b.com"),
            c.build_list_groups(),
            c.build_get_group("g1"),
            c.build_create_group(&CreateGroupRequest {
                name: "Eng".to_string(),
            })
            .unwrap(),
        ];
        for req in requests {
            assert_eq!(req.header("Authorization"), Some("Bearer t3stT0K3n"), "{}", req.url);
            assert_eq!(req.header("content-type"), Some("application/json"), "{}", req.url);
        }
    }

    #[test]
    fn build_ping_produces_correct_request() {
        let req = client().build_ping();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/ping");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_user_embeds_email_verbatim() {
        let req = client().build_get_user("a@b.com");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/users/a@b.com");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_update_user_posts_without_body() {
        let req = client().build_update_user("a@b.com");
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/users/a@b.com");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_deactivate_user_sends_email() {
        let req = client()
            .build_deactivate_user(&DeactivateUserRequest {
                email: "a@b.com".to_string(),
            })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/users/deactivate");
        assert_eq!(body_json(&req), serde_json::json!({"email": "a@b.com"}));
    }

    #[test]
    fn build_get_group_uses_query_parameter() {
        let req = client().build_get_group("g-42");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/groups/?groupId=g-42");
    }

    #[test]
    fn build_group_membership_requests() {
        let c = client();

        let req = c
            .build_remove_users_from_group(&RemoveUsersFromGroupRequest {
                group_id: "g1".to_string(),
                emails: vec!["a@b.com".to_string(), "c@d.com".to_string()],
                from_members: true,
                from_managers: false,
            })
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/groups/removeUsers");
        assert_eq!(
            body_json(&req),
            serde_json::json!({
                "groupId": "g1",
                "emails": ["a@b.com", "c@d.com"],
                "fromMembers": true,
                "fromManagers": false
            })
        );

        let req = c
            .build_remove_all_users_from_group(&RemoveAllUsersFromGroupRequest {
                group_id: "g1".to_string(),
                from_members: false,
                from_managers: true,
            })
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/groups/removeAllUsers");
        assert_eq!(
            body_json(&req),
            serde_json::json!({"groupId": "g1", "fromMembers": false, "fromManagers": true})
        );

        let req = c
            .build_remove_group(&RemoveGroupRequest {
                name: "Eng".to_string(),
            })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/groups/remove");
        assert_eq!(body_json(&req), serde_json::json!({"name": "Eng"}));
    }

    #[test]
    fn build_sync_serializes_full_payload() {
        let input = SyncRequest {
            settings: SyncSettings {
                send_invitations: true,
                deactivate_missing_users: false,
            },
            users: vec![SyncUser {
                email: "a@b.com".to_string(),
                first_name: Some("Ada".to_string()),
                ..SyncUser::default()
            }],
            groups: vec![SyncGroup {
                name: "Eng".to_string(),
            }],
            mappings: vec![SyncMapping {
                group_name: "Eng".to_string(),
                email: "a@b.com".to_string(),
                is_manager: false,
                is_member: true,
            }],
        };
        let req = client().build_sync(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/sync");
        let body = body_json(&req);
        assert_eq!(body["settings"]["sendInvitations"], true);
        assert_eq!(body["users"][0]["firstName"], "Ada");
        assert_eq!(body["groups"][0]["name"], "Eng");
        assert_eq!(body["mappings"][0]["groupName"], "Eng");
        assert_eq!(body["mappings"][0]["isMember"], true);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = VibeClient::new("k", "http://localhost:3000/");
        assert_eq!(client.build_list_users().url, "http://localhost:3000/users");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("t3stT0K3n"));
        assert!(rendered.contains("localhost:3000"));
    }

    #[test]
    fn parse_list_users_success() {
        let response = HttpResponse::new(
            200,
            r#"{"isSuccess":true,"errorMessage":"","data":{"userCount":1,"users":[{"email":"a@b.com","fistName":"Ada"}]}}"#,
        );
        let list = client().parse_list_users(&response).unwrap();
        assert_eq!(list.user_count, 1);
        assert_eq!(list.users[0].first_name, "Ada");
    }

    #[test]
    fn parse_get_user_not_found() {
        let response = HttpResponse::new(
            404,
            r#"{"isSuccess":false,"errorMessage":"user not found"}"#,
        );
        let err = client().parse_get_user(&response).unwrap_err();
        assert_eq!(
            err.to_string(),
            "vendor error: status: `404`, message: `user not found`"
        );
    }

    #[test]
    fn parse_get_group_with_members() {
        let response = HttpResponse::new(
            200,
            r#"{"isSuccess":true,"data":{"id":"g1","name":"Eng","userCount":1,"managerCount":0,
                "users":[{"email":"a@b.com","firstName":"Ada","memberGroups":["g1"]}]}}"#,
        );
        let group = client().parse_get_group(&response).unwrap();
        assert_eq!(group.id, "g1");
        assert_eq!(group.users.len(), 1);
        assert_eq!(group.users[0].member_groups, vec!["g1"]);
    }

    #[test]
    fn parse_confirmations_reject_failed_envelope() {
        let c = client();
        let response = HttpResponse::new(
            200,
            r#"{"isSuccess":false,"errorMessage":"group already exists"}"#,
        );
        for result in [
            c.parse_update_user(&response),
            c.parse_deactivate_user(&response),
            c.parse_create_group(&response),
            c.parse_remove_group(&response),
            c.parse_add_users_to_group(&response),
            c.parse_remove_users_from_group(&response),
            c.parse_remove_all_users_from_group(&response),
        ] {
            match result {
                Err(VibeError::ApiError { status, message }) => {
                    assert_eq!(status, 200);
                    assert_eq!(message, "group already exists");
                }
                other => panic!("expected ApiError, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_ping_bad_json() {
        let response = HttpResponse::new(200, "<html><body>Login</body></html>");
        let err = client().parse_ping(&response).unwrap_err();
        assert!(matches!(err, VibeError::DecodingError(_)));
    }
}
