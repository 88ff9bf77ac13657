//! # Registry Flows
//!
//! Upload and verification through `fc-node` on top of the ledger:
//!
//! 1. **Upload → Seal**: bytes are hashed, stored, and recorded with a full storage reference
//! 2. **Verify**: presented bytes resolve to their earliest registration
//! 3. **Restart**: a persisted chain and file directory come back intact
//! 4. **Tampered snapshot**: a doctored record is reported on the next start,
//!    a snapshot without a genesis block is refused

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fc_ledger::{
        content_hash, ChainSnapshot, ChainValidity, FsFileStore, InMemoryFileStore, LedgerApi,
        LedgerConfig, LedgerError, LedgerService,
    };
    use fc_node::{DuplicatePolicy, FileChainNode, FileRegistry, NodeConfig};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    async fn volatile_registry() -> FileRegistry {
        let ledger = LedgerService::spawn(LedgerConfig::with_difficulty(1))
            .await
            .unwrap();
        FileRegistry::new(Arc::new(ledger), Arc::new(InMemoryFileStore::new()))
    }

    fn persistent_config(dir: &std::path::Path) -> NodeConfig {
        NodeConfig::default()
            .with_difficulty(1)
            .with_store_dir(dir.join("files"))
            .with_snapshot_path(dir.join("chain.json"))
    }

    // =============================================================================
    // UPLOAD AND VERIFY
    // =============================================================================

    #[tokio::test]
    async fn test_upload_records_full_storage_reference() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = LedgerService::spawn(LedgerConfig::with_difficulty(1))
            .await
            .unwrap();
        let store = FsFileStore::open(dir.path()).await.unwrap();
        let registry = FileRegistry::new(Arc::new(ledger.clone()), Arc::new(store));

        let registration = registry
            .register("contract.pdf", b"signed terms".to_vec(), DuplicatePolicy::Reject)
            .await
            .unwrap();
        let block = &registration.block;

        assert_eq!(block.file_hash, content_hash(b"signed terms"));
        assert!(!block.storage_ref.id.is_empty());
        assert!(block.storage_ref.url.starts_with("file://"));
        assert!(dir.path().join(&block.storage_ref.id).exists());
        assert_eq!(ledger.tip().await.unwrap(), *block);
        assert!(ledger.is_valid().await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_reports_earliest_registration() {
        let registry = volatile_registry().await;
        let first = registry
            .register("v1.txt", b"payload".to_vec(), DuplicatePolicy::Allow)
            .await
            .unwrap();
        registry
            .register("noise.txt", b"unrelated".to_vec(), DuplicatePolicy::Allow)
            .await
            .unwrap();
        registry
            .register("v2.txt", b"payload".to_vec(), DuplicatePolicy::Allow)
            .await
            .unwrap();

        let verification = registry.verify(b"payload").await.unwrap();
        assert_eq!(verification.matches.len(), 2);
        assert_eq!(verification.first(), Some(&first.block));

        assert!(!registry.verify(b"never uploaded").await.unwrap().is_registered());
    }

    #[tokio::test]
    async fn test_rejected_duplicate_leaves_chain_alone() {
        let registry = volatile_registry().await;
        registry
            .register("a.txt", b"dup".to_vec(), DuplicatePolicy::Reject)
            .await
            .unwrap();
        let before = registry.ledger().blocks().await.unwrap();

        let err = registry
            .register("b.txt", b"dup".to_vec(), DuplicatePolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateFile { existing: 1, .. }));
        assert!(!err.is_critical());
        assert_eq!(registry.ledger().blocks().await.unwrap(), before);
    }

    // =============================================================================
    // RESTARTS
    // =============================================================================

    #[tokio::test]
    async fn test_restart_keeps_chain_and_files() {
        let dir = tempfile::tempdir().unwrap();

        let node = FileChainNode::open(persistent_config(dir.path())).await.unwrap();
        for (name, body) in [("a.txt", "alpha"), ("b.txt", "beta"), ("c.txt", "gamma")] {
            node.registry()
                .register(name, body.as_bytes().to_vec(), DuplicatePolicy::Reject)
                .await
                .unwrap();
        }
        assert!(node.persist().await.unwrap());
        let before = node.ledger().blocks().await.unwrap();
        drop(node);

        let node = FileChainNode::open(persistent_config(dir.path())).await.unwrap();
        assert_eq!(node.ledger().blocks().await.unwrap(), before);
        assert!(node.ledger().is_valid().await.unwrap());

        for block in &before[1..] {
            let bytes = node.registry().download(block).await.unwrap();
            assert_eq!(content_hash(&bytes), block.file_hash);
        }

        // New registrations extend the restored tip
        let next = node
            .registry()
            .register("d.txt", b"delta".to_vec(), DuplicatePolicy::Reject)
            .await
            .unwrap();
        assert_eq!(next.block.index, 4);
        assert_eq!(next.block.previous_hash, before[3].hash);
    }

    #[tokio::test]
    async fn test_doctored_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = persistent_config(dir.path());

        let node = FileChainNode::open(config.clone()).await.unwrap();
        node.registry()
            .register("invoice.txt", b"amount: 100".to_vec(), DuplicatePolicy::Reject)
            .await
            .unwrap();
        node.persist().await.unwrap();
        drop(node);

        // Rename the record on disk without resealing it
        let path = dir.path().join("chain.json");
        let mut snapshot: ChainSnapshot =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        snapshot.blocks[1].file_name = "receipt.txt".to_string();
        tokio::fs::write(&path, serde_json::to_vec(&snapshot).unwrap())
            .await
            .unwrap();

        let node = FileChainNode::open(config).await.unwrap();
        assert!(matches!(
            node.ledger().validate().await.unwrap(),
            ChainValidity::Invalid { index: 1, .. }
        ));
        assert!(!node.ledger().is_valid().await.unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_without_genesis_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let config = persistent_config(dir.path());

        let node = FileChainNode::open(config.clone()).await.unwrap();
        node.registry()
            .register("invoice.txt", b"amount: 100".to_vec(), DuplicatePolicy::Reject)
            .await
            .unwrap();
        node.persist().await.unwrap();
        drop(node);

        let path = dir.path().join("chain.json");
        let mut snapshot: ChainSnapshot =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        snapshot.blocks[0].index = u64::MAX;
        tokio::fs::write(&path, serde_json::to_vec(&snapshot).unwrap())
            .await
            .unwrap();

        assert!(matches!(
            FileChainNode::open(config).await,
            Err(LedgerError::MissingGenesis { index: u64::MAX })
        ));
    }

    #[tokio::test]
    async fn test_history_and_download_after_restart() {
        let dir = tempfile::tempdir().unwrap();

        let node = FileChainNode::open(persistent_config(dir.path())).await.unwrap();
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.txt");
        tokio::fs::write(&first, b"alpha").await.unwrap();
        tokio::fs::write(&second, b"beta").await.unwrap();
        let report = node
            .register_paths(&[first, second], DuplicatePolicy::Reject)
            .await
            .unwrap();
        assert!(report.persisted);
        drop(node);

        let node = FileChainNode::open(persistent_config(dir.path())).await.unwrap();
        let history = node.registry().history().await.unwrap();
        let names: Vec<_> = history.iter().map(|e| e.block.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert!(history.iter().all(|e| e.available));

        let out = dir.path().join("b-restored.txt");
        let (block, _) = node.download_to(2, Some(&out)).await.unwrap();
        assert_eq!(block.file_name, "b.txt");
        assert_eq!(tokio::fs::read(&out).await.unwrap(), b"beta");
    }
}
