//! Shared helpers for the scenario flows and benchmarks.

use std::sync::Arc;

use epoch_feeds::test_utils::FakeClock;
use epoch_feeds::{
    next_epoch, ChunkStore, Epoch, Feed, FeedApi, FeedConfig, FeedError, FeedHandler,
    Keccak256Hasher, Request, Signer, TimeSource, Timestamp, Topic, HIGHEST_LEVEL,
};
use tokio_util::sync::CancellationToken;

/// Start time of the dense scenario.
pub const START: Timestamp = 4200;

/// Seconds in a 365-day year.
pub const YEAR: u64 = 365 * 86_400;

/// Seconds in a 30-day month.
pub const MONTH: u64 = 30 * 86_400;

/// "Today" for the sparse scenario (August 2018).
pub const TODAY: Timestamp = 1_533_799_046;

/// Handler with test configuration, driven by `clock`.
pub fn handler<S: ChunkStore>(store: S, clock: &Arc<FakeClock>) -> FeedHandler<S> {
    let clock: Arc<dyn TimeSource> = clock.clone();
    FeedHandler::new(FeedConfig::for_testing(), store).with_clock(clock)
}

/// Fill in `payload`, sign and publish.
pub async fn publish<S: ChunkStore>(
    handler: &FeedHandler<S>,
    signer: &dyn Signer,
    mut request: Request,
    payload: &[u8],
) -> Result<Request, FeedError> {
    request.set_payload(payload.to_vec());
    request
        .sign(signer, &Keccak256Hasher)
        .map_err(FeedError::from)?;
    handler.update(&CancellationToken::new(), &request).await?;
    Ok(request)
}

/// Publish blinky, pinky, inky and clyde at 4200, 4242, 4284 and 4285.
///
/// Between blinky and pinky an attempt to force the occupied root epoch is
/// made and must fail.
pub async fn publish_ghosts<S: ChunkStore>(
    handler: &FeedHandler<S>,
    clock: &FakeClock,
    signer: &dyn Signer,
) -> Feed {
    let cancel = CancellationToken::new();
    clock.set(START);

    let first = handler.new_first_request(Topic::new("ghosts", None));
    let first = publish(handler, signer, first, b"blinky").await.unwrap();
    let feed = *first.feed();

    clock.fast_forward(21);
    let mut forced = handler.new_request(&cancel, &feed).await.unwrap();
    assert_eq!(forced.epoch(), Epoch::new(0, HIGHEST_LEVEL - 1).unwrap());
    forced.set_epoch(Epoch::new(forced.timestamp(), HIGHEST_LEVEL).unwrap());
    let refused = publish(handler, signer, forced, b"pinky").await;
    assert!(matches!(refused, Err(FeedError::Conflict { .. })));

    for (step, name) in [(21, "pinky"), (42, "inky"), (1, "clyde")] {
        clock.fast_forward(step);
        let request = handler.new_request(&cancel, &feed).await.unwrap();
        publish(handler, signer, request, name.as_bytes()).await.unwrap();
    }
    feed
}

/// Publish one update every five years from time zero until [`TODAY`],
/// each payload being its own timestamp in decimal. Returns the feed and the
/// time of the last update.
pub async fn publish_sparse<S: ChunkStore>(
    handler: &FeedHandler<S>,
    signer: &dyn Signer,
) -> (Feed, Timestamp) {
    let feed = Feed::new(signer.user(), Topic::new("sparse", None));
    let mut previous = None;
    let mut last = 0;

    let mut t = 0;
    while t < TODAY {
        let epoch = next_epoch(previous, t);
        let request = Request::new(feed, epoch, t);
        publish(handler, signer, request, t.to_string().as_bytes())
            .await
            .unwrap();
        previous = Some(epoch);
        last = t;
        t += 5 * YEAR;
    }
    (feed, last)
}
