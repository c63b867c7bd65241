//! Blocking client for the OfficeVibe v2 REST API.
//!
//! # Overview
//! `VibeClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. `Session` pairs it with a `Transport`
//! (by default `UreqTransport`) and exposes one method per vendor operation.
//!
//! # Design
//! - Every vendor response is an envelope with an `isSuccess` flag. A call
//!   succeeds only when the HTTP status is 200 and the flag is true; see
//!   `envelope`.
//! - Errors fall into three disjoint kinds: `TransportError` (no response),
//!   `DecodingError` (body is not the expected JSON, usually the vendor's
//!   login page for a bad API key) and `ApiError` (vendor reported failure).
//! - Failed calls never return a payload.
//! - The library logs through `tracing` and never installs a subscriber.
//!
//! ```no_run
//! use vibezy::{ClientConfig, Session};
//!
//! let session = Session::new(&ClientConfig::new("my-api-key"));
//! session.ping()?;
//! for user in session.list_users()?.users {
//!     println!("{} {}", user.first_name, user.email);
//! }
//! # Ok::<(), vibezy::VibeError>(())
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;

pub use client::VibeClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{TransportError, VibeError, VibeResult, DECODING_ERROR_HINT};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::Session;
pub use transport::{Transport, UreqTransport};
pub use types::{
    AddUsersToGroupRequest, CreateGroupRequest, DeactivateUserRequest, Group, GroupList,
    RemoveAllUsersFromGroupRequest, RemoveGroupRequest, RemoveUsersFromGroupRequest, SyncGroup,
    SyncMapping, SyncRequest, SyncSettings, SyncSummary, SyncUser, User, UserList,
};
