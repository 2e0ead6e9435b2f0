use crate::classify::ServerKind;
use crate::error::IngestError;
use crate::report::{decode_report, Receipt, StatsReport};
use crate::store::StatsStore;

/// Decode, classify and persist one submission.
///
/// Nothing is written if decoding fails. On success returns the sender kind
/// the report was filed under.
pub async fn ingest(
    store: &dyn StatsStore,
    body: &[u8],
    receipt: Receipt,
) -> Result<ServerKind, IngestError> {
    let decoded = decode_report(body)?;
    let report = StatsReport::assemble(decoded, receipt);
    store.insert_report(&report).await?;
    Ok(report.kind())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::PersistError;

    #[derive(Default)]
    struct RecordingStore {
        reports: Mutex<Vec<StatsReport>>,
        fail: bool,
    }

    #[async_trait]
    impl StatsStore for RecordingStore {
        async fn insert_report(&self, report: &StatsReport) -> Result<(), PersistError> {
            if self.fail {
                return Err(PersistError::Store(anyhow::anyhow!("disk full")));
            }
            self.reports
                .lock()
                .expect("lock recorded reports")
                .push(report.clone());
            Ok(())
        }

        async fn ping(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn receipt(user_agent: &str) -> Receipt {
        Receipt::now("127.0.0.1:9000", None, Some(user_agent))
    }

    #[tokio::test]
    async fn stores_one_report_per_call() {
        let store = RecordingStore::default();
        let kind = ingest(&store, br#"{"total_users": 3}"#, receipt("Dendrite/0.3.1"))
            .await
            .expect("ingest");
        assert_eq!(kind, ServerKind::Dendrite);
        assert_eq!(store.reports.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn decode_failure_writes_nothing() {
        let store = RecordingStore::default();
        let err = ingest(&store, b"not json", receipt("Synapse/1.90"))
            .await
            .expect_err("must fail");
        assert!(matches!(err, IngestError::Decode(_)));
        assert!(store.reports.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_a_persist_error() {
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };
        let err = ingest(&store, b"{}", receipt("Synapse/1.90"))
            .await
            .expect_err("must fail");
        assert!(matches!(err, IngestError::Persist(_)));
    }
}
