//! # Inbound Ports
//!
//! The API producers and readers drive the engine through.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{Address, Epoch, Feed, FeedError, LookupResult, Query, Request, Topic};

/// Feed API - inbound port.
///
/// Every operation that touches the store takes the caller's cancellation
/// token; a cancelled token surfaces as [`FeedError::Cancelled`].
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// Draft the first update of a new feed, timestamped now.
    fn new_first_request(&self, topic: Topic) -> Request;

    /// Draft the next update of `feed`, at the epoch following its latest one.
    ///
    /// A feed with no updates yet is not an error: the draft then targets the
    /// first epoch.
    async fn new_request(
        &self,
        cancel: &CancellationToken,
        feed: &Feed,
    ) -> Result<Request, FeedError>;

    /// Publish a signed request, returning its chunk address.
    ///
    /// # Errors
    /// * `FeedError::Conflict` - a different update occupies the epoch
    /// * `FeedError::InvalidSignature` - unsigned or wrongly signed request
    /// * `FeedError::Store` - persistence failed
    async fn update(
        &self,
        cancel: &CancellationToken,
        request: &Request,
    ) -> Result<Address, FeedError>;

    /// Find the newest update at or before the query's time limit.
    async fn lookup(
        &self,
        cancel: &CancellationToken,
        query: &Query,
    ) -> Result<LookupResult, FeedError>;

    /// Epoch and payload of the last successful lookup for `feed`.
    fn get_content(&self, feed: &Feed) -> Result<(Epoch, Vec<u8>), FeedError>;

    /// Whether `bytes` is an authentic update chunk stored under `address`.
    fn validate(&self, address: &Address, bytes: &[u8]) -> bool;
}
