//! `TvdbApi` trait definition.
#![allow(clippy::future_not_send)]

use std::time::Duration;

use crate::error::Result;
use crate::types::{Actor, Show};

/// TVDB API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
///
/// Methods take `&mut self` because the first call logs in and stores the
/// session token on the client.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TvdbApi: Send)]
pub trait LocalTvdbApi {
    /// Searches for series by name.
    ///
    /// `None` or an empty name returns an empty list without any request.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request, or conversion of
    /// any result fails. No match is reported as [`crate::TvdbError::NotFound`].
    async fn search_show(&mut self, name: Option<&str>, timeout: Duration) -> Result<Vec<Show>>;

    /// Fetches the full record of one series.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request, or conversion fails.
    async fn show_info(&mut self, identifier: u64, timeout: Duration) -> Result<Show>;

    /// Fetches the cast of a series by series ID.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication or the HTTP request fails, or if any
    /// actor record is malformed.
    async fn actors_from_show_id(
        &mut self,
        identifier: u64,
        timeout: Duration,
    ) -> Result<Vec<Actor>>;

    /// Fetches the cast of the given series.
    ///
    /// # Errors
    ///
    /// Same as [`LocalTvdbApi::actors_from_show_id`].
    async fn actors_from_show(&mut self, show: &Show, timeout: Duration) -> Result<Vec<Actor>>;
}
