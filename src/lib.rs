//! Client library for the ALKS temporary AWS credential broker.
//!
//! This crate provides both async and sync (blocking) clients for the
//! broker API:
//!
//! - STS sessions: [`Client::create_session`], [`Client::create_iam_session`]
//! - Account metadata: [`Client::get_login_role`], [`Client::get_accounts`]
//! - IAM roles: [`Client::create_iam_role`], [`Client::get_iam_role`], …
//! - Machine identities: [`Client::add_role_machine_identity`], …
//! - IAM users and long-term keys: [`Client::create_iam_user`],
//!   [`Client::get_long_term_keys`], …
//!
//! A client authenticates either with a username and password or with an
//! STS session issued by the broker. Switching from one to the other yields
//! a new client through [`Client::with_credentials`].
//!
//! # Quick Start (async)
//!
//! ```no_run
//! use rs_alks::{AccountContext, Client, Credentials};
//!
//! # async fn example() -> rs_alks::Result<()> {
//! let account = AccountContext::new("012345678910/ALKSAdmin - awstest123", "Admin")?;
//! let client = Client::new(
//!     "https://alks.example.com/rest",
//!     Credentials::basic("user", "pass"),
//!     account,
//! )?;
//!
//! let session = client.create_session(2).await?;
//! let client = client.with_credentials(session.credentials())?;
//!
//! if let Some(role) = client.get_iam_role("my-role").await? {
//!     println!("ARN: {}", role.role.role_arn);
//! }
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod accounts;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod iam_enabled;
pub mod iam_role;
pub mod iam_user;
pub mod login_role;
pub mod long_term_key;
pub mod machine_identity;
pub mod request;
pub mod response;
pub mod session;

#[cfg(feature = "blocking")]
pub mod blocking;

mod exec;

pub use account::AccountContext;
pub use accounts::{AccountRole, GetAccountsResponse};
pub use client::Client;
pub use config::ClientConfig;
pub use credential::{CredentialProvider, Credentials, EnvProvider};
pub use error::{AlksError, Result};
pub use iam_enabled::IsIamEnabledResponse;
pub use iam_role::{
    CreateIamRoleOptions, IamRole, IamRoleResponse, UpdateIamRoleRequest, UpdateIamRoleResponse,
};
pub use iam_user::{
    CreateIamUserResponse, DeleteIamUserResponse, GetIamUsersResponse, IamUser, IamUserOptions,
    IamUserResponse,
};
pub use login_role::{LoginRole, LoginRoleResponse};
pub use long_term_key::{GetLongTermKeysResponse, LongTermKey};
pub use machine_identity::MachineIdentityResponse;
pub use request::PreparedRequest;
pub use response::{BaseResponse, Envelope, Tag};
pub use session::{SUPPORTED_SESSION_DURATIONS, SessionResponse};

// Compile-time assertions: key types must be Send + Sync for use across threads.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<Client>;
    let _ = assert_send_sync::<AlksError>;
    let _ = assert_send_sync::<Credentials>;
};
