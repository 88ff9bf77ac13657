//! # Ledger Flows
//!
//! End-to-end behaviour of the ledger engine as seen from outside the crate:
//!
//! 1. **Sealing**: appended blocks meet the difficulty and link to their parent
//! 2. **Validation**: untouched chains pass, any edited sealed field is caught
//! 3. **Lookup**: duplicate-tolerant, empty on misses
//! 4. **Service**: single writer, events, snapshots shared with the sync ledger

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::timeout;

    use fc_ledger::{
        ChainSnapshot, ChainValidity, InvalidityReason, Ledger, LedgerApi, LedgerConfig,
        LedgerEvent, LedgerService, StorageRef, GENESIS_FILE_HASH, GENESIS_PREVIOUS_HASH,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn storage(i: usize) -> StorageRef {
        StorageRef::new(format!("cid-{i}"), format!("https://gateway.example/ipfs/cid-{i}"))
    }

    /// Ledger with `count` appended records named `file-<i>.txt`
    fn ledger_with(difficulty: u32, count: usize) -> Ledger {
        let mut ledger = Ledger::with_difficulty(difficulty).unwrap();
        for i in 0..count {
            ledger.append(format!("hash-{i}"), format!("file-{i}.txt"), storage(i));
        }
        ledger
    }

    /// Re-host an edited copy of `ledger`'s blocks, the way a store would
    fn tampered(ledger: &Ledger, edit: impl FnOnce(&mut ChainSnapshot)) -> Ledger {
        let mut snapshot = ledger.snapshot();
        edit(&mut snapshot);
        Ledger::restore(snapshot, &Default::default()).unwrap()
    }

    // =============================================================================
    // SEALING AND VALIDATION
    // =============================================================================

    #[test]
    fn test_difficulty_one_hash_starts_with_zero() {
        let mut ledger = Ledger::with_difficulty(1).unwrap();
        let block = ledger.append("abc123", "a.txt", StorageRef::empty());

        assert!(block.hash.starts_with('0'));
        assert_eq!(block.hash.len(), 64);
        assert_eq!(block.index, 1);
        assert_eq!(block.previous_hash, ledger.blocks()[0].hash);
    }

    #[test]
    fn test_genesis_only_chain_is_valid_at_default_difficulty() {
        let ledger = Ledger::new(&LedgerConfig::default()).unwrap();
        let genesis = ledger.tip();

        assert_eq!(ledger.difficulty(), 4);
        assert_eq!(ledger.len(), 1);
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.file_hash, GENESIS_FILE_HASH);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.storage_ref.is_empty());
        assert!(genesis.hash.starts_with("0000"));
        assert!(ledger.is_valid());
    }

    #[test]
    fn test_flipped_file_hash_is_detected() {
        let ledger = ledger_with(1, 3);
        assert!(ledger.is_valid());

        let edited = tampered(&ledger, |snapshot| {
            let block = &mut snapshot.blocks[2];
            let flipped = if block.file_hash.starts_with('h') { "H" } else { "h" };
            block.file_hash.replace_range(0..1, flipped);
        });

        assert!(!edited.is_valid());
        match edited.validate() {
            ChainValidity::Invalid {
                index: 2,
                reason: InvalidityReason::HashMismatch { stored, computed },
            } => assert_ne!(stored, computed),
            other => panic!("expected hash mismatch at 2, got {other:?}"),
        }

        // The identical, untouched build still passes
        assert!(ledger_with(1, 3).is_valid());
    }

    #[test]
    fn test_edited_file_name_is_detected() {
        let ledger = ledger_with(1, 3);
        let edited = tampered(&ledger, |snapshot| {
            snapshot.blocks[1].file_name = "renamed.txt".to_string();
        });
        assert!(matches!(
            edited.validate(),
            ChainValidity::Invalid { index: 1, .. }
        ));
    }

    #[test]
    fn test_resealed_block_breaks_the_next_link() {
        let ledger = ledger_with(1, 3);
        let edited = tampered(&ledger, |snapshot| {
            let block = &mut snapshot.blocks[1];
            block.file_name = "renamed.txt".to_string();
            block.hash = block.compute_hash();
        });

        // The reseal skipped mining, so either its work falls short or block 2's link breaks
        match edited.validate() {
            ChainValidity::Invalid {
                index: 1,
                reason: InvalidityReason::InsufficientWork { difficulty: 1 },
            } => {}
            ChainValidity::Invalid {
                index: 2,
                reason: InvalidityReason::BrokenLink { .. },
            } => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_validation_is_repeatable() {
        let ledger = ledger_with(1, 4);
        let results: Vec<_> = (0..5).map(|_| ledger.validate()).collect();
        assert!(results.iter().all(|r| *r == ChainValidity::Valid));
    }

    // =============================================================================
    // LOOKUP
    // =============================================================================

    #[test]
    fn test_duplicate_hashes_returned_in_append_order() {
        let mut ledger = Ledger::with_difficulty(1).unwrap();
        ledger.append("same", "first.txt", storage(0));
        ledger.append("other", "between.txt", storage(1));
        ledger.append("same", "second.txt", storage(2));

        let found = ledger.find_by_file_hash("same");
        let names: Vec<_> = found.iter().map(|b| b.file_name.as_str()).collect();
        assert_eq!(names, vec!["first.txt", "second.txt"]);
        assert!(found[0].index < found[1].index);
        assert!(ledger.is_valid());
    }

    #[test]
    fn test_missing_hash_is_empty() {
        let ledger = ledger_with(1, 2);
        assert!(ledger.find_by_file_hash("nonexistent").is_empty());
        assert!(!ledger.has_file_hash("nonexistent"));

        let fresh = Ledger::with_difficulty(0).unwrap();
        assert!(fresh.find_by_file_hash("nonexistent").is_empty());
    }

    #[test]
    fn test_returned_blocks_are_copies() {
        let ledger = ledger_with(1, 1);
        let mut found = ledger.find_by_file_hash("hash-0");
        found[0].file_name = "changed".to_string();

        assert_eq!(ledger.blocks()[1].file_name, "file-0.txt");
        assert!(ledger.is_valid());
    }

    // =============================================================================
    // SERVICE
    // =============================================================================

    #[tokio::test]
    async fn test_service_and_ledger_agree() {
        let service = LedgerService::spawn(LedgerConfig::with_difficulty(1))
            .await
            .unwrap();
        for i in 0..3 {
            service
                .append(format!("hash-{i}"), format!("file-{i}.txt"), storage(i))
                .await
                .unwrap();
        }

        let snapshot = service.snapshot().unwrap();
        let ledger = Ledger::restore(snapshot.clone(), &Default::default()).unwrap();
        assert_eq!(ledger.blocks(), service.blocks().await.unwrap().as_slice());
        assert!(ledger.is_valid());
        assert_eq!(service.validate().await.unwrap(), ChainValidity::Valid);

        // Snapshot survives JSON with camelCase block fields
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["blocks"][1]["fileHash"].is_string());
        assert!(json["blocks"][1]["previousHash"].is_string());
        let back: ChainSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[tokio::test]
    async fn test_parallel_writers_produce_one_linear_chain() {
        let service = LedgerService::spawn(LedgerConfig::with_difficulty(1))
            .await
            .unwrap();
        let mut events = service.subscribe();

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .append(format!("hash-{i}"), format!("file-{i}.txt"), storage(i))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let blocks = service.blocks().await.unwrap();
        assert_eq!(blocks.len(), 7);
        for pair in blocks.windows(2) {
            assert_eq!(pair[1].previous_hash, pair[0].hash);
            assert_eq!(pair[1].index, pair[0].index + 1);
        }
        assert!(service.is_valid().await.unwrap());

        let mut appended = Vec::new();
        while appended.len() < 6 {
            let event = timeout(Duration::from_secs(5), events.recv())
                .await
                .expect("timeout waiting for event")
                .expect("should receive event");
            if let LedgerEvent::BlockAppended(e) = event {
                appended.push(e.index);
            }
        }
        assert_eq!(appended, vec![1, 2, 3, 4, 5, 6]);

        let status = service.status().await;
        assert_eq!(status.height, 7);
        assert_eq!(status.blocks_appended, 6);
        assert_eq!(status.last_validity, Some(ChainValidity::Valid));
    }
}
