//! API client library for TheTVDB.
//!
//! Logs in with an API key, user key and user name, then fetches series
//! search results, series details and series casts as typed records.

mod api;
mod client;
mod credentials;
mod date;
mod error;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTvdbApi, TvdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_TIMEOUT, TvdbClient, TvdbClientBuilder};
#[cfg(feature = "keyring")]
pub use credentials::KeyringCredentials;
pub use credentials::{
    API_KEY_LABEL, ChainedCredentials, CredentialSource, EnvCredentials, USER_KEY_LABEL,
    USER_NAME_LABEL,
};
pub use date::{DateParseError, parse_date};
#[allow(clippy::module_name_repetitions)]
pub use error::{AuthFailure, Result, TvdbError};
pub use types::{Actor, Show, ShowStatus};
