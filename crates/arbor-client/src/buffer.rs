use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use arbor_protocol::{StorageChange, StorageChangeSet};

use crate::error::{StoreError, StoreResult};

/// Destination of a flushed change set — one batched network call.
#[async_trait]
pub trait ChangeSink: Send + Sync {
    async fn send(&self, change_set: StorageChangeSet) -> StoreResult<()>;
}

/// Ordered accumulator for deferrable changes, one per store connection.
///
/// `record` appends locally and auto-flushes once the configured change
/// count or byte estimate is reached; `flush` pushes whatever is pending as
/// a single change set. One mutex covers record, threshold check and
/// auto-flush, so a change recorded while a flush is in flight lands in the
/// next change set, never inside the one being sent.
///
/// A failed flush is reported exactly once, to whoever triggered it; the
/// drained batch is abandoned, never resubmitted automatically.
pub struct ChangeBuffer {
    sink: Arc<dyn ChangeSink>,
    max_changes: usize,
    max_bytes: usize,
    pending: Mutex<Pending>,
}

#[derive(Default)]
struct Pending {
    set: StorageChangeSet,
    bytes: usize,
}

impl ChangeBuffer {
    pub fn new(sink: Arc<dyn ChangeSink>, max_changes: usize, max_bytes: usize) -> Self {
        Self {
            sink,
            max_changes,
            max_bytes,
            pending: Mutex::new(Pending::default()),
        }
    }

    /// Append a change. Blocks on the network only when a threshold is hit.
    pub async fn record(&self, change: StorageChange) -> StoreResult<()> {
        let mut pending = self.pending.lock().await;
        let size = change.estimated_size()?;
        pending.set.changes.push(change);
        pending.bytes += size;
        if pending.set.len() >= self.max_changes || pending.bytes >= self.max_bytes {
            tracing::debug!(
                changes = pending.set.len(),
                bytes = pending.bytes,
                "change buffer threshold reached"
            );
            self.flush_locked(&mut pending).await?;
        }
        Ok(())
    }

    /// Send everything pending as one change set. No-op when empty.
    pub async fn flush(&self) -> StoreResult<()> {
        let mut pending = self.pending.lock().await;
        self.flush_locked(&mut pending).await
    }

    async fn flush_locked(&self, pending: &mut Pending) -> StoreResult<()> {
        if pending.set.is_empty() {
            return Ok(());
        }
        let count = pending.set.len();
        let set = std::mem::take(&mut pending.set);
        pending.bytes = 0;
        tracing::debug!(changes = count, "flushing change set");
        self.sink.send(set).await.map_err(|e| StoreError::Flush {
            count,
            source: Box::new(e),
        })
    }

    /// Number of changes currently pending.
    pub async fn pending_changes(&self) -> usize {
        self.pending.lock().await.set.len()
    }

    /// Current serialized-size estimate of the pending set.
    pub async fn pending_bytes(&self) -> usize {
        self.pending.lock().await.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_types::DoubleDataChunk;
    use std::sync::Mutex as StdMutex;

    struct RecordingSink {
        sent: StdMutex<Vec<StorageChangeSet>>,
        fail: bool,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: StdMutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                sent: StdMutex::new(Vec::new()),
                fail: true,
            })
        }

        fn flush_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        fn sent_sets(&self) -> Vec<StorageChangeSet> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChangeSink for RecordingSink {
        async fn send(&self, change_set: StorageChangeSet) -> StoreResult<()> {
            if self.fail {
                return Err(StoreError::ServerFault("rejected".into()));
            }
            self.sent.lock().unwrap().push(change_set);
            Ok(())
        }
    }

    fn chunk_change(name: &str, points: usize) -> StorageChange {
        StorageChange::DoubleTimeSeriesChunksAddition {
            node_id: "n1".into(),
            version: 1,
            time_series_name: name.into(),
            chunks: vec![DoubleDataChunk::new(0, vec![0.5; points])],
        }
    }

    #[tokio::test]
    async fn below_thresholds_nothing_is_sent() {
        let sink = RecordingSink::new();
        let buffer = ChangeBuffer::new(sink.clone(), 1000, 1 << 20);

        for i in 0..5 {
            buffer.record(chunk_change(&format!("ts{i}"), 1)).await.unwrap();
        }
        assert_eq!(sink.flush_count(), 0);
        assert_eq!(buffer.pending_changes().await, 5);
    }

    #[tokio::test]
    async fn explicit_flush_drains_pending() {
        let sink = RecordingSink::new();
        let buffer = ChangeBuffer::new(sink.clone(), 1000, 1 << 20);

        buffer.record(chunk_change("a", 1)).await.unwrap();
        buffer.record(chunk_change("b", 1)).await.unwrap();
        buffer.flush().await.unwrap();

        assert_eq!(sink.flush_count(), 1);
        assert_eq!(buffer.pending_changes().await, 0);
        assert_eq!(buffer.pending_bytes().await, 0);

        // Flushing an empty buffer is a no-op.
        buffer.flush().await.unwrap();
        assert_eq!(sink.flush_count(), 1);
    }

    #[tokio::test]
    async fn count_threshold_triggers_auto_flush() {
        let sink = RecordingSink::new();
        let buffer = ChangeBuffer::new(sink.clone(), 3, 1 << 20);

        buffer.record(chunk_change("a", 1)).await.unwrap();
        buffer.record(chunk_change("b", 1)).await.unwrap();
        assert_eq!(sink.flush_count(), 0);

        // Third record reaches the count threshold; the batch holds exactly 3.
        buffer.record(chunk_change("c", 1)).await.unwrap();
        assert_eq!(sink.flush_count(), 1);
        assert_eq!(sink.sent_sets()[0].len(), 3);
        assert_eq!(buffer.pending_changes().await, 0);

        // The next record starts a fresh batch.
        buffer.record(chunk_change("d", 1)).await.unwrap();
        assert_eq!(sink.flush_count(), 1);
        assert_eq!(buffer.pending_changes().await, 1);
    }

    #[tokio::test]
    async fn byte_threshold_triggers_auto_flush() {
        let sink = RecordingSink::new();
        let small = chunk_change("ts", 1).estimated_size().unwrap();
        let buffer = ChangeBuffer::new(sink.clone(), 1000, small + 1);

        buffer.record(chunk_change("ts", 1)).await.unwrap();
        assert_eq!(sink.flush_count(), 0);

        // A fat chunk pushes the estimate past the byte limit.
        buffer.record(chunk_change("ts", 4096)).await.unwrap();
        assert_eq!(sink.flush_count(), 1);
        assert_eq!(buffer.pending_changes().await, 0);
    }

    #[tokio::test]
    async fn order_is_preserved_across_flushes() {
        let sink = RecordingSink::new();
        let buffer = ChangeBuffer::new(sink.clone(), 2, 1 << 20);

        for name in ["a", "b", "c", "d"] {
            buffer.record(chunk_change(name, 1)).await.unwrap();
        }
        buffer.flush().await.unwrap();

        let names: Vec<String> = sink
            .sent_sets()
            .iter()
            .flat_map(|set| set.changes.iter())
            .map(|change| match change {
                StorageChange::DoubleTimeSeriesChunksAddition {
                    time_series_name, ..
                } => time_series_name.clone(),
                other => panic!("unexpected change {}", other.type_name()),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn failed_flush_reports_once_and_abandons_batch() {
        let sink = RecordingSink::failing();
        let buffer = ChangeBuffer::new(sink.clone(), 1000, 1 << 20);

        for name in ["a", "b", "c"] {
            buffer.record(chunk_change(name, 1)).await.unwrap();
        }
        let err = buffer.flush().await.unwrap_err();
        match err {
            StoreError::Flush { count, source } => {
                assert_eq!(count, 3);
                assert!(matches!(*source, StoreError::ServerFault(_)));
            }
            other => panic!("unexpected error: {other}"),
        }

        // The batch is gone; a second flush has nothing to send and succeeds.
        assert_eq!(buffer.pending_changes().await, 0);
        buffer.flush().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_records_all_arrive() {
        let sink = RecordingSink::new();
        let buffer = Arc::new(ChangeBuffer::new(sink.clone(), 1000, 1 << 20));

        let mut handles = Vec::new();
        for i in 0..16 {
            let buffer = Arc::clone(&buffer);
            handles.push(tokio::spawn(async move {
                buffer.record(chunk_change(&format!("ts{i}"), 1)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        buffer.flush().await.unwrap();
        let total: usize = sink.sent_sets().iter().map(|set| set.len()).sum();
        assert_eq!(total, 16);
    }
}
