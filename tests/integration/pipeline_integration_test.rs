#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::Utc;
    use std::sync::Arc;

    use mp_database_postgres::{DatabaseContext, MentionRepository};
    use mp_ingest::{DedupConfig, DedupWriter, Normalizer};
    use mp_models::{RawRecord, SourceDescriptor, SourceType};
    use serde_json::json;

    fn source() -> SourceDescriptor {
        SourceDescriptor {
            platform: "integration-test".to_string(),
            source_name: "fixture".to_string(),
            source_type: SourceType::Citizen,
            queries: vec!["fuel".to_string()],
            lookback_days: 3,
            max_lookback_days: 14,
            overlap_hours: 2,
            interval_secs: 900,
            item_cap: 100,
        }
    }

    async fn context() -> Result<DatabaseContext> {
        let url = std::env::var("DATABASE_URL")?;
        Ok(DatabaseContext::new(&url).await.map_err(|e| anyhow::anyhow!(e.to_string()))?)
    }

    /// Requires a disposable database pointed at by DATABASE_URL.
    #[tokio::test]
    #[ignore]
    async fn test_ingest_idempotence_against_live_database() -> Result<()> {
        let db = context().await?;
        let mentions = db.mention_repository();
        let writer = DedupWriter::new(Arc::clone(&mentions), DedupConfig::default());
        let normalizer = Normalizer::default();

        let raw = RawRecord::from_value(json!({
            "id": "itest-0001",
            "text": "integration fixture: no fuel at any station",
            "likes": 10
        }))
        .unwrap();
        let mention = normalizer.normalize(&raw, &source(), Utc::now()).unwrap();

        let first = writer.ingest(&mention).await?;
        let second = writer.ingest(&mention).await?;

        assert_eq!(format!("{:?}", first), "Inserted");
        assert_eq!(format!("{:?}", second), "Updated");
        Ok(())
    }

    /// Requires a disposable database pointed at by DATABASE_URL.
    #[tokio::test]
    #[ignore]
    async fn test_claim_batches_partition_between_dispatchers() -> Result<()> {
        let db = context().await?;
        let mentions = db.mention_repository();

        let first = mentions.claim_batch(10).await.map_err(|e| anyhow::anyhow!(e.to_string()))?;
        let second = mentions.claim_batch(10).await.map_err(|e| anyhow::anyhow!(e.to_string()))?;

        for claimed in &first {
            assert!(
                !second.iter().any(|other| other.entry_id == claimed.entry_id),
                "mention {} claimed twice",
                claimed.entry_id
            );
        }
        Ok(())
    }
}
