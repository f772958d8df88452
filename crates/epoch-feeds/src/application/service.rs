//! # Feed Handler Service
//!
//! Orchestrates epoch assignment, chunk encoding, authentication and the
//! lookup search on top of a [`ChunkStore`].
//!
//! ## Flow
//!
//! ```text
//! producer: new_request -> set_payload -> sign -> update
//!                 |                                  |
//!                 v                                  v
//!            lookup(now)                  load (conflict check) -> save
//!
//! reader:   lookup(query) -> search over epochs -> load + authenticate per probe
//! ```
//!
//! Durable state lives only in the store. The handler keeps an advisory
//! per-feed cache that seeds lookups with a hint and backs `get_content`.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::adapters::{Keccak256Hasher, Secp256k1Recovery, SystemTimeSource};
use crate::algorithms::{codec, next_epoch, search, signing, EpochReader, Found, UpdateChunk};
use crate::config::FeedConfig;
use crate::domain::{
    Address, Epoch, Feed, FeedError, LookupResult, Query, Request, SignatureError, StoreError,
    Timestamp, Topic, UpdateId,
};
use crate::metrics::FeedMetrics;
use crate::ports::{ChunkStore, ChunkValidator, FeedApi, Hasher, SignatureRecovery, TimeSource};

use super::cache::{CachedUpdate, EpochCache};
use super::validator::UpdateValidator;

/// Run a store call, giving up as soon as `cancel` fires.
async fn guarded<T, F>(cancel: &CancellationToken, call: F) -> Result<T, FeedError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FeedError::Cancelled),
        result = call => result.map_err(FeedError::from),
    }
}

/// The feed engine.
pub struct FeedHandler<S: ChunkStore> {
    config: FeedConfig,
    store: S,
    clock: Arc<dyn TimeSource>,
    hasher: Arc<dyn Hasher>,
    recovery: Arc<dyn SignatureRecovery>,
    cache: EpochCache,
    metrics: FeedMetrics,
}

impl<S: ChunkStore> FeedHandler<S> {
    /// Handler with the system clock, Keccak-256 and secp256k1 recovery.
    pub fn new(config: FeedConfig, store: S) -> Self {
        let cache = EpochCache::new(config.cache_capacity);
        Self {
            config,
            store,
            clock: Arc::new(SystemTimeSource),
            hasher: Arc::new(Keccak256Hasher),
            recovery: Arc::new(Secp256k1Recovery),
            cache,
            metrics: FeedMetrics::new(),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the hash function.
    pub fn with_hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Replace the signature recovery capability.
    pub fn with_recovery(mut self, recovery: Arc<dyn SignatureRecovery>) -> Self {
        self.recovery = recovery;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Operation counters.
    pub fn metrics(&self) -> &FeedMetrics {
        &self.metrics
    }

    /// Hash function used for addresses and digests.
    pub fn hasher(&self) -> &dyn Hasher {
        self.hasher.as_ref()
    }

    /// Admission check sharing this handler's capabilities, detached from
    /// its store.
    pub fn validator(&self) -> UpdateValidator {
        UpdateValidator::new(Arc::clone(&self.hasher), Arc::clone(&self.recovery))
    }

    /// Last epoch known for `feed`, if any. Advisory only.
    pub fn last_epoch(&self, feed: &Feed) -> Option<Epoch> {
        self.cache.hint(feed)
    }

    /// Chunk address of `(feed, epoch)`.
    pub fn address_of(&self, feed: &Feed, epoch: Epoch) -> Address {
        codec::address(&UpdateId::new(*feed, epoch), self.hasher.as_ref())
    }

    /// Authenticate `bytes` as the update of `feed` at `epoch`.
    pub fn verify_update(
        &self,
        feed: &Feed,
        epoch: Epoch,
        address: &Address,
        bytes: &[u8],
    ) -> Result<UpdateChunk, FeedError> {
        signing::verify_update(
            feed,
            epoch,
            address,
            bytes,
            self.hasher.as_ref(),
            self.recovery.as_ref(),
        )
    }

    fn check_publishable(&self, request: &Request) -> Result<(), FeedError> {
        let len = request.payload().len();
        if len == 0 {
            return Err(FeedError::InvalidRequest("empty payload".to_string()));
        }
        if len > self.config.max_payload_len {
            return Err(FeedError::InvalidRequest(format!(
                "payload of {} bytes exceeds limit of {}",
                len, self.config.max_payload_len
            )));
        }
        if !request.epoch().contains(request.timestamp()) {
            return Err(FeedError::InvalidRequest(format!(
                "timestamp {} outside epoch {}",
                request.timestamp(),
                request.epoch()
            )));
        }
        Ok(())
    }
}

/// Reads one feed's updates out of the store for the search.
struct StoreReader<'a, S: ChunkStore> {
    handler: &'a FeedHandler<S>,
    feed: Feed,
    cancel: &'a CancellationToken,
}

#[async_trait]
impl<S: ChunkStore> EpochReader for StoreReader<'_, S> {
    type Value = (Address, UpdateChunk);

    async fn read(
        &self,
        epoch: Epoch,
        time_limit: Timestamp,
    ) -> Result<Option<Self::Value>, FeedError> {
        let handler = self.handler;
        let address = handler.address_of(&self.feed, epoch);
        let Some(bytes) = guarded(self.cancel, handler.store.load(&address)).await? else {
            debug!(%epoch, "probe miss");
            return Ok(None);
        };

        let checked = if handler.config.verify_on_read {
            handler.verify_update(&self.feed, epoch, &address, &bytes)
        } else {
            codec::decode(&bytes).map_err(FeedError::from).and_then(|chunk| {
                let derived = codec::address(&chunk.id, handler.hasher());
                if derived == address {
                    Ok(chunk)
                } else {
                    Err(SignatureError::AddressMismatch {
                        claimed: address,
                        derived,
                    }
                    .into())
                }
            })
        };

        let chunk = match checked {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(%epoch, %address, error = %e, "ignoring invalid chunk");
                handler.metrics.record_rejected_chunk();
                return Ok(None);
            }
        };

        if chunk.timestamp > time_limit {
            debug!(%epoch, timestamp = chunk.timestamp, "probe hit after time limit");
            return Ok(None);
        }
        debug!(%epoch, timestamp = chunk.timestamp, "probe hit");
        Ok(Some((address, chunk)))
    }
}

#[async_trait]
impl<S: ChunkStore> FeedApi for FeedHandler<S> {
    fn new_first_request(&self, topic: Topic) -> Request {
        Request::first(topic, self.clock.now())
    }

    #[instrument(skip_all, fields(feed = %feed))]
    async fn new_request(
        &self,
        cancel: &CancellationToken,
        feed: &Feed,
    ) -> Result<Request, FeedError> {
        let now = self.clock.now();
        let last = match self.lookup(cancel, &Query::at(*feed, now)).await {
            Ok(found) => Some(found.epoch),
            Err(FeedError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        let epoch = next_epoch(last, now);
        debug!(?last, %epoch, "drafted request");
        Ok(Request::new(*feed, epoch, now))
    }

    #[instrument(skip_all, fields(feed = %request.feed(), epoch = %request.epoch()))]
    async fn update(
        &self,
        cancel: &CancellationToken,
        request: &Request,
    ) -> Result<Address, FeedError> {
        self.check_publishable(request)?;
        request.verify(self.recovery.as_ref(), self.hasher.as_ref())?;
        let (address, bytes) = request.to_chunk(self.hasher.as_ref())?;

        if let Some(existing) = guarded(cancel, self.store.load(&address)).await? {
            if existing == bytes {
                debug!(%address, "update already stored");
                self.metrics.record_idempotent();
                return Ok(address);
            }
            warn!(%address, "epoch already holds a different update");
            self.metrics.record_conflict();
            return Err(FeedError::Conflict {
                feed: *request.feed(),
                epoch: request.epoch(),
                address,
            });
        }

        guarded(cancel, self.store.save(&address, &bytes)).await?;
        self.metrics.record_update();
        self.cache.advance(
            *request.feed(),
            CachedUpdate {
                epoch: request.epoch(),
                timestamp: request.timestamp(),
                payload: request.payload().to_vec(),
                address,
            },
        );

        info!(%address, timestamp = request.timestamp(), "update stored");
        Ok(address)
    }

    #[instrument(skip_all, fields(feed = %query.feed))]
    async fn lookup(
        &self,
        cancel: &CancellationToken,
        query: &Query,
    ) -> Result<LookupResult, FeedError> {
        let time_limit = query.time_limit.unwrap_or_else(|| self.clock.now());
        let hint = query.hint.or_else(|| self.cache.hint(&query.feed));

        let reader = StoreReader {
            handler: self,
            feed: query.feed,
            cancel,
        };
        let outcome = search(&reader, time_limit, hint).await?;
        self.metrics
            .record_lookup(outcome.probes, outcome.found.is_some());

        let Some(Found {
            epoch,
            value: (address, chunk),
        }) = outcome.found
        else {
            info!(time_limit, probes = outcome.probes, "no update found");
            return Err(FeedError::NotFound {
                feed: query.feed,
                time_limit,
            });
        };

        let result = LookupResult {
            epoch,
            timestamp: chunk.timestamp,
            payload: chunk.payload,
            address,
            probes: outcome.probes,
        };
        self.cache.record(query.feed, CachedUpdate::from(&result));

        info!(%epoch, time_limit, probes = result.probes, "lookup resolved");
        Ok(result)
    }

    fn get_content(&self, feed: &Feed) -> Result<(Epoch, Vec<u8>), FeedError> {
        self.cache
            .get(feed)
            .map(|cached| (cached.epoch, cached.payload))
            .ok_or(FeedError::NoCachedContent { feed: *feed })
    }

    fn validate(&self, address: &Address, bytes: &[u8]) -> bool {
        self.validator().validate(address, bytes)
    }
}

impl<S: ChunkStore> ChunkValidator for FeedHandler<S> {
    fn validate(&self, address: &Address, bytes: &[u8]) -> bool {
        FeedApi::validate(self, address, bytes)
    }
}
