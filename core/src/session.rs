//! Blocking, network-backed client: `VibeClient` plus a `Transport`.
//!
//! Each method builds a request, hands it to the transport and parses the
//! response through the same `call` helper. A `Session` holds no mutable
//! state and can be shared across threads when its transport can.

use tracing::debug;

use crate::client::VibeClient;
use crate::config::ClientConfig;
use crate::error::{VibeError, VibeResult};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    AddUsersToGroupRequest, CreateGroupRequest, DeactivateUserRequest, Group, GroupList,
    RemoveAllUsersFromGroupRequest, RemoveGroupRequest, RemoveUsersFromGroupRequest, SyncRequest,
    SyncSummary, User, UserList,
};

#[derive(Debug, Clone)]
pub struct Session<T = UreqTransport> {
    client: VibeClient,
    transport: T,
}

impl Session<UreqTransport> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new(config.timeout()))
    }

    /// Reads the configuration from the environment; see `ClientConfig::from_env`.
    pub fn from_env() -> VibeResult<Self> {
        Ok(Self::new(&ClientConfig::from_env()?))
    }
}

impl<T: Transport> Session<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: VibeClient::from_config(config),
            transport,
        }
    }

    pub fn client(&self) -> &VibeClient {
        &self.client
    }

    fn call<R, P>(&self, request: HttpRequest, parse: P) -> Result<R, VibeError>
    where
        P: FnOnce(&VibeClient, &HttpResponse) -> Result<R, VibeError>,
    {
        let response = self.transport.execute(&request)?;
        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "parsing vendor response"
        );
        parse(&self.client, &response)
    }

    /// Checks that the API key is accepted.
    pub fn ping(&self) -> VibeResult<()> {
        self.call(self.client.build_ping(), VibeClient::parse_ping)
    }

    pub fn list_users(&self) -> VibeResult<UserList> {
        self.call(self.client.build_list_users(), VibeClient::parse_list_users)
    }

    pub fn get_user(&self, email: &str) -> VibeResult<User> {
        self.call(self.client.build_get_user(email), VibeClient::parse_get_user)
    }

    /// Creates and invites the user if they do not exist.
    pub fn update_user(&self, email: &str) -> VibeResult<()> {
        self.call(
            self.client.build_update_user(email),
            VibeClient::parse_update_user,
        )
    }

    pub fn deactivate_user(&self, input: &DeactivateUserRequest) -> VibeResult<()> {
        self.call(
            self.client.build_deactivate_user(input)?,
            VibeClient::parse_deactivate_user,
        )
    }

    pub fn list_groups(&self) -> VibeResult<GroupList> {
        self.call(self.client.build_list_groups(), VibeClient::parse_list_groups)
    }

    pub fn get_group(&self, group_id: &str) -> VibeResult<Group> {
        self.call(
            self.client.build_get_group(group_id),
            VibeClient::parse_get_group,
        )
    }

    pub fn create_group(&self, input: &CreateGroupRequest) -> VibeResult<()> {
        self.call(
            self.client.build_create_group(input)?,
            VibeClient::parse_create_group,
        )
    }

    pub fn remove_group(&self, input: &RemoveGroupRequest) -> VibeResult<()> {
        self.call(
            self.client.build_remove_group(input)?,
            VibeClient::parse_remove_group,
        )
    }

    pub fn add_users_to_group(&self, input: &AddUsersToGroupRequest) -> VibeResult<()> {
        self.call(
            self.client.build_add_users_to_group(input)?,
            VibeClient::parse_add_users_to_group,
        )
    }

    pub fn remove_users_from_group(
        &self,
        input: &RemoveUsersFromGroupRequest,
    ) -> VibeResult<()> {
        self.call(
            self.client.build_remove_users_from_group(input)?,
            VibeClient::parse_remove_users_from_group,
        )
    }

    pub fn remove_all_users_from_group(
        &self,
        input: &RemoveAllUsersFromGroupRequest,
    ) -> VibeResult<()> {
        self.call(
            self.client.build_remove_all_users_from_group(input)?,
            VibeClient::parse_remove_all_users_from_group,
        )
    }

    pub fn sync(&self, input: &SyncRequest) -> VibeResult<SyncSummary> {
        self.call(self.client.build_sync(input)?, VibeClient::parse_sync)
    }
}
