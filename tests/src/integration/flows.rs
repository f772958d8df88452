//! Publish and resolve flows against an in-memory store.
//!
//! ## Scenarios
//!
//! 1. Dense feed: four updates within two minutes
//! 2. Sparse feed: one update every five years since 1970
//! 3. Two writers racing for the same epoch
//! 4. Tampered chunks
//! 5. Concurrent readers, outages and cancellation

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use epoch_feeds::test_utils::{FakeClock, FlakyStore, StallingStore};
    use epoch_feeds::{
        Epoch, FeedApi, FeedError, InMemoryChunkStore, Keccak256Hasher, Query, Request,
        Secp256k1Signer, StoreError, HIGHEST_LEVEL,
    };
    use tokio_util::sync::CancellationToken;

    use crate::fixtures::{
        handler, publish, publish_ghosts, publish_sparse, MONTH, START, TODAY, YEAR,
    };

    fn payload_of(result: &epoch_feeds::LookupResult) -> &str {
        std::str::from_utf8(&result.payload).unwrap()
    }

    // =========================================================================
    // SCENARIO 1: Dense feed
    // =========================================================================

    #[tokio::test]
    async fn test_dense_feed_resolves_every_instant() {
        feeds_telemetry::try_init_for_tests();
        let store = Arc::new(InMemoryChunkStore::new());
        let clock = Arc::new(FakeClock::new(START));
        let producer = handler(Arc::clone(&store), &clock);
        let signer = Secp256k1Signer::generate();

        let feed = publish_ghosts(&producer, &clock, &signer).await;
        assert_eq!(store.len(), 4);
        assert_eq!(producer.metrics().snapshot().conflicts, 1);

        // A reader with no history of its own
        let reader = handler(Arc::clone(&store), &clock);
        let cancel = CancellationToken::new();

        let latest = reader.lookup(&cancel, &Query::latest(feed)).await.unwrap();
        assert_eq!(payload_of(&latest), "clyde");
        assert_eq!(latest.epoch, Epoch::new(0, HIGHEST_LEVEL - 3).unwrap());
        assert_eq!(latest.timestamp, 4285);

        let cases = [
            (4200, "blinky"),
            (4241, "blinky"),
            (4242, "pinky"),
            (4283, "pinky"),
            (4284, "inky"),
            (4285, "clyde"),
            (1_000_000, "clyde"),
        ];
        for (at, expected) in cases {
            let fresh = handler(Arc::clone(&store), &clock);
            let found = fresh.lookup(&cancel, &Query::at(feed, at)).await.unwrap();
            assert_eq!(payload_of(&found), expected, "lookup at {at}");
        }

        let before = reader.lookup(&cancel, &Query::at(feed, START - 1)).await;
        assert!(matches!(before, Err(e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_stale_hint_still_converges() {
        feeds_telemetry::try_init_for_tests();
        let store = Arc::new(InMemoryChunkStore::new());
        let clock = Arc::new(FakeClock::new(START));
        let producer = handler(Arc::clone(&store), &clock);
        let signer = Secp256k1Signer::generate();
        let feed = publish_ghosts(&producer, &clock, &signer).await;

        let reader = handler(Arc::clone(&store), &clock);
        let cancel = CancellationToken::new();
        for hint in [
            Epoch::new(0, HIGHEST_LEVEL).unwrap(),
            Epoch::new(0, HIGHEST_LEVEL - 1).unwrap(),
            Epoch::new(4096, 12).unwrap(),
            Epoch::new(1 << 40, 31).unwrap(),
        ] {
            let found = reader
                .lookup(&cancel, &Query::at(feed, 4285).with_hint(hint))
                .await
                .unwrap();
            assert_eq!(payload_of(&found), "clyde", "hint {hint}");
        }
    }

    #[tokio::test]
    async fn test_far_future_queries_stay_cheap() {
        feeds_telemetry::try_init_for_tests();
        let store = Arc::new(InMemoryChunkStore::new());
        let clock = Arc::new(FakeClock::new(START));
        let producer = handler(Arc::clone(&store), &clock);
        let signer = Secp256k1Signer::generate();
        let feed = publish_ghosts(&producer, &clock, &signer).await;
        let cancel = CancellationToken::new();
        let bound = 2 * (HIGHEST_LEVEL as usize + 1);

        let silent = epoch_feeds::Feed::new(
            epoch_feeds::Signer::user(&Secp256k1Signer::generate()),
            epoch_feeds::Topic::new("silent", None),
        );
        for limit in [1u64 << 44, u64::MAX] {
            let reader = handler(Arc::clone(&store), &clock);
            let missing = reader.lookup(&cancel, &Query::at(silent, limit)).await;
            assert!(matches!(missing, Err(e) if e.is_not_found()));
            assert!(reader.metrics().snapshot().probes <= 2);

            let found = reader.lookup(&cancel, &Query::at(feed, limit)).await.unwrap();
            assert_eq!(payload_of(&found), "clyde");
            assert!(found.probes <= bound, "{} probes at {limit}", found.probes);
        }
    }

    #[tokio::test]
    async fn test_first_request_of_unknown_feed() {
        feeds_telemetry::try_init_for_tests();
        let clock = Arc::new(FakeClock::new(START));
        let producer = handler(InMemoryChunkStore::new(), &clock);
        let signer = Secp256k1Signer::generate();

        let feed = epoch_feeds::Feed::new(
            epoch_feeds::Signer::user(&signer),
            epoch_feeds::Topic::new("nothing yet", None),
        );
        let draft = producer
            .new_request(&CancellationToken::new(), &feed)
            .await
            .unwrap();
        assert_eq!(draft.epoch(), Epoch::new(START, HIGHEST_LEVEL).unwrap());
        assert_eq!(draft.timestamp(), START);

        let content = producer.get_content(&feed);
        assert!(matches!(content, Err(FeedError::NoCachedContent { .. })));
    }

    // =========================================================================
    // SCENARIO 2: Sparse feed
    // =========================================================================

    #[tokio::test]
    async fn test_sparse_feed_over_decades() {
        feeds_telemetry::try_init_for_tests();
        let store = Arc::new(InMemoryChunkStore::new());
        let clock = Arc::new(FakeClock::new(TODAY));
        let producer = handler(Arc::clone(&store), &clock);
        let signer = Secp256k1Signer::generate();

        let (feed, last) = publish_sparse(&producer, &signer).await;
        assert_eq!(last, 45 * YEAR);

        let reader = handler(Arc::clone(&store), &clock);
        let cancel = CancellationToken::new();

        let latest = reader.lookup(&cancel, &Query::latest(feed)).await.unwrap();
        assert_eq!(payload_of(&latest), last.to_string());
        assert_eq!(latest.epoch, Epoch::new(0, HIGHEST_LEVEL - 9).unwrap());

        let (epoch, content) = reader.get_content(&feed).unwrap();
        assert_eq!(epoch, latest.epoch);
        assert_eq!(content, last.to_string().into_bytes());

        // Halfway between two updates resolves to the older one
        let mid = 35 * YEAR + 6 * MONTH;
        let found = reader.lookup(&cancel, &Query::at(feed, mid)).await.unwrap();
        assert_eq!(payload_of(&found), (35 * YEAR).to_string());
        assert_eq!(reader.get_content(&feed).unwrap().1, found.payload);

        let origin = reader.lookup(&cancel, &Query::at(feed, 0)).await.unwrap();
        assert_eq!(payload_of(&origin), "0");
    }

    // =========================================================================
    // SCENARIO 3: Racing writers
    // =========================================================================

    #[tokio::test]
    async fn test_racing_writers_reconcile_on_next_epoch() {
        feeds_telemetry::try_init_for_tests();
        let store = Arc::new(InMemoryChunkStore::new());
        let clock = Arc::new(FakeClock::new(START));
        let signer = Secp256k1Signer::generate();
        let cancel = CancellationToken::new();

        let laptop = handler(Arc::clone(&store), &clock);
        let phone = handler(Arc::clone(&store), &clock);

        let first = laptop.new_first_request(epoch_feeds::Topic::new("status", None));
        let first = publish(&laptop, &signer, first, b"online").await.unwrap();
        let feed = *first.feed();

        clock.set(5000);
        let from_laptop = laptop.new_request(&cancel, &feed).await.unwrap();
        let from_phone = phone.new_request(&cancel, &feed).await.unwrap();
        assert_eq!(from_laptop.epoch(), from_phone.epoch());

        publish(&laptop, &signer, from_laptop, b"away").await.unwrap();
        let lost = publish(&phone, &signer, from_phone.clone(), b"busy").await;
        assert!(matches!(
            lost,
            Err(FeedError::Conflict { epoch, .. }) if epoch == from_phone.epoch()
        ));

        // Retrying the identical update is harmless
        let again = publish(&laptop, &signer, from_phone.clone(), b"away").await;
        assert!(again.is_ok());
        assert_eq!(laptop.metrics().snapshot().updates_idempotent, 1);

        // The loser drafts again a second later and lands one level down
        assert_eq!(clock.tick(), 5001);
        let retry = phone.new_request(&cancel, &feed).await.unwrap();
        assert!(retry.epoch().level() < from_phone.epoch().level());
        publish(&phone, &signer, retry, b"busy").await.unwrap();

        let latest = laptop.lookup(&cancel, &Query::latest(feed)).await.unwrap();
        assert_eq!(payload_of(&latest), "busy");
        let earlier = laptop.lookup(&cancel, &Query::at(feed, 5000)).await.unwrap();
        assert_eq!(payload_of(&earlier), "away");
    }

    #[tokio::test]
    async fn test_rejects_unpublishable_requests() {
        feeds_telemetry::try_init_for_tests();
        let clock = Arc::new(FakeClock::new(START));
        let producer = handler(InMemoryChunkStore::new(), &clock);
        let signer = Secp256k1Signer::generate();
        let cancel = CancellationToken::new();

        let unsigned = producer.new_first_request(epoch_feeds::Topic::new("x", None));
        let result = producer.update(&cancel, &unsigned).await;
        assert!(matches!(
            result,
            Err(FeedError::InvalidRequest(_)) | Err(FeedError::InvalidSignature(_))
        ));

        let empty = producer.new_first_request(epoch_feeds::Topic::new("x", None));
        let result = publish(&producer, &signer, empty, b"").await;
        assert!(matches!(result, Err(FeedError::InvalidRequest(_))));

        let oversized = producer.new_first_request(epoch_feeds::Topic::new("x", None));
        let limit = producer.config().max_payload_len;
        let result = publish(&producer, &signer, oversized, &vec![7u8; limit + 1]).await;
        assert!(matches!(result, Err(FeedError::InvalidRequest(_))));

        let mut misplaced = producer.new_first_request(epoch_feeds::Topic::new("x", None));
        misplaced.set_epoch(Epoch::new(START, 3).unwrap());
        misplaced.set_timestamp(START + 100);
        let result = publish(&producer, &signer, misplaced, b"late").await;
        assert!(matches!(result, Err(FeedError::InvalidRequest(_))));
    }

    // =========================================================================
    // SCENARIO 4: Tampering
    // =========================================================================

    #[tokio::test]
    async fn test_tampered_chunks_fail_validation() {
        feeds_telemetry::try_init_for_tests();
        let clock = Arc::new(FakeClock::new(START));
        let producer = handler(InMemoryChunkStore::new(), &clock);
        let signer = Secp256k1Signer::generate();

        let request = producer.new_first_request(epoch_feeds::Topic::new("prices", None));
        let request = publish(&producer, &signer, request, b"EUR 1.13").await.unwrap();
        let (address, bytes) = request.to_chunk(&Keccak256Hasher).unwrap();
        assert!(producer.validate(&address, &bytes));

        let mut wrong_address = address;
        wrong_address.0[0] ^= 0xff;
        wrong_address.0[15] ^= 0xff;
        assert!(!producer.validate(&wrong_address, &bytes));

        let mut altered = bytes.clone();
        let last_payload_byte = altered.len() - 66;
        altered[last_payload_byte] ^= 0x01;
        assert!(!producer.validate(&address, &altered));

        let mut bad_signature = bytes.clone();
        let tail = bad_signature.len() - 1;
        bad_signature[tail] ^= 0x01;
        assert!(!producer.validate(&address, &bad_signature));

        assert!(!producer.validate(&address, &bytes[..bytes.len() - 1]));
        assert!(!producer.validate(&address, &[]));
    }

    #[tokio::test]
    async fn test_impostor_cannot_publish_into_foreign_feed() {
        feeds_telemetry::try_init_for_tests();
        let store = Arc::new(InMemoryChunkStore::new());
        let clock = Arc::new(FakeClock::new(START));
        let producer = handler(Arc::clone(&store), &clock);
        let owner = Secp256k1Signer::generate();
        let impostor = Secp256k1Signer::generate();

        let request = producer.new_first_request(epoch_feeds::Topic::new("news", None));
        let request = publish(&producer, &owner, request, b"genuine").await.unwrap();
        let feed = *request.feed();

        // Signing rebinds the request to the impostor's own feed
        clock.fast_forward(60);
        let draft = producer
            .new_request(&CancellationToken::new(), &feed)
            .await
            .unwrap();
        let forged = publish(&producer, &impostor, draft, b"forged").await.unwrap();
        assert_ne!(forged.feed(), &feed);

        let latest = producer
            .lookup(&CancellationToken::new(), &Query::latest(feed))
            .await
            .unwrap();
        assert_eq!(payload_of(&latest), "genuine");
    }

    // =========================================================================
    // SCENARIO 5: Concurrency, outages, cancellation
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_agree() {
        feeds_telemetry::try_init_for_tests();
        let store = Arc::new(InMemoryChunkStore::new());
        let clock = Arc::new(FakeClock::new(START));
        let producer = handler(Arc::clone(&store), &clock);
        let signer = Secp256k1Signer::generate();
        let feed = publish_ghosts(&producer, &clock, &signer).await;

        let reader = Arc::new(handler(Arc::clone(&store), &clock));
        let mut tasks = Vec::new();
        for i in 0..16u64 {
            let reader = Arc::clone(&reader);
            tasks.push(tokio::spawn(async move {
                let at = if i % 2 == 0 { 4285 } else { 4242 };
                reader
                    .lookup(&CancellationToken::new(), &Query::at(feed, at))
                    .await
                    .map(|found| (at, found.payload))
            }));
        }

        for task in tasks {
            let (at, payload) = task.await.unwrap().unwrap();
            let expected: &[u8] = if at == 4285 { b"clyde" } else { b"pinky" };
            assert_eq!(payload, expected);
        }
        assert_eq!(reader.metrics().snapshot().lookups_found, 16);
    }

    #[tokio::test]
    async fn test_store_outage_surfaces_and_recovers() {
        feeds_telemetry::try_init_for_tests();
        let store = Arc::new(FlakyStore::new(InMemoryChunkStore::new()));
        let clock = Arc::new(FakeClock::new(START));
        let producer = handler(Arc::clone(&store), &clock);
        let signer = Secp256k1Signer::generate();
        let feed = publish_ghosts(&producer, &clock, &signer).await;
        let cancel = CancellationToken::new();

        store.set_failing(true);
        let result = producer.lookup(&cancel, &Query::latest(feed)).await;
        assert!(matches!(
            result,
            Err(FeedError::Store(StoreError::Unavailable(_)))
        ));
        let draft = producer.new_request(&cancel, &feed).await;
        assert!(matches!(draft, Err(FeedError::Store(_))));

        store.set_failing(false);
        let latest = producer.lookup(&cancel, &Query::latest(feed)).await.unwrap();
        assert_eq!(payload_of(&latest), "clyde");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_stalled_store() {
        feeds_telemetry::try_init_for_tests();
        let clock = Arc::new(FakeClock::new(START));
        let stalled = handler(StallingStore, &clock);
        let feed = epoch_feeds::Feed::default();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let result = stalled.lookup(&cancel, &Query::latest(feed)).await;
        assert!(matches!(result, Err(FeedError::Cancelled)));

        let mut request = Request::new(feed, Epoch::new(START, HIGHEST_LEVEL).unwrap(), START);
        request.set_payload(b"never stored".to_vec());
        request
            .sign(&Secp256k1Signer::generate(), &Keccak256Hasher)
            .unwrap();
        let result = stalled.update(&cancel, &request).await;
        assert!(matches!(result, Err(FeedError::Cancelled)));
    }
}
