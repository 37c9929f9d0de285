//! CSV sink and its writer task
//!
//! Call tasks finish in any order. All of them hand their outcome to one
//! channel drained by a single writer task, which is the only code touching
//! the file.

use super::format::{OutputRow, CSV_HEADER};
use crate::dispatch::{CallOutcome, GroupOutcome};
use crate::error::BatchError;
use crate::grouping::RolePatterns;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

pub struct CsvSink<W: AsyncWrite + Unpin> {
    writer: W,
    rows: usize,
}

impl CsvSink<BufWriter<File>> {
    /// Create (or truncate) the output file and write the header
    pub async fn create(path: &Path) -> Result<Self, BatchError> {
        let output_error = |source| BatchError::Output {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).await.map_err(output_error)?;
        CsvSink::new(BufWriter::new(file)).await.map_err(output_error)
    }
}

impl<W: AsyncWrite + Unpin> CsvSink<W> {
    pub async fn new(mut writer: W) -> std::io::Result<Self> {
        writer.write_all(format!("{}\n", CSV_HEADER).as_bytes()).await?;
        Ok(Self { writer, rows: 0 })
    }

    pub async fn append(&mut self, row: &OutputRow) -> std::io::Result<()> {
        let line = format!("{}\n", row.to_csv_line());
        self.writer.write_all(line.as_bytes()).await?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the writer
    pub async fn finish(mut self) -> std::io::Result<W> {
        self.writer.flush().await?;
        Ok(self.writer)
    }
}

/// What the writer task produced
#[derive(Debug)]
pub struct WrittenOutput<W> {
    pub rows: usize,
    pub writer: W,
}

/// Drain `outcomes` into `sink` until every sender is gone.
///
/// Only completed calls with an event result become rows. The first failed
/// write ends the task and drops the receiver, which stops further dispatch.
pub fn spawn_outcome_writer<W>(
    mut sink: CsvSink<W>,
    patterns: RolePatterns,
    mut outcomes: UnboundedReceiver<GroupOutcome>,
) -> JoinHandle<std::io::Result<WrittenOutput<W>>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(outcome) = outcomes.recv().await {
            let CallOutcome::Completed(Some(result)) = &outcome.outcome else {
                continue;
            };

            let row = OutputRow::from_result(&outcome.group.files, &patterns, result);
            if let Err(e) = sink.append(&row).await {
                tracing::error!(group = %outcome.group.key, error = %e, "[Writer] Failed to write row");
                return Err(e);
            }
            tracing::debug!(
                group = %outcome.group.key,
                call_ms = outcome.elapsed.as_millis() as u64,
                "[Writer] Row written"
            );
        }

        let rows = sink.rows();
        let writer = sink.finish().await?;
        Ok(WrittenOutput { rows, writer })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::grouping::Group;
    use crate::proto::EventResult;
    use crate::scan::ImageFile;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn outcome(key: &str, names: &[&str], outcome: CallOutcome) -> GroupOutcome {
        GroupOutcome {
            group: Group {
                key: key.to_string(),
                files: names.iter().map(|n| ImageFile::new(format!("/img/{n}"))).collect(),
            },
            outcome,
            elapsed: Duration::from_millis(3),
        }
    }

    fn result(node: &str) -> CallOutcome {
        CallOutcome::Completed(Some(EventResult {
            node: node.to_string(),
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_sink_writes_header_first() {
        let sink = CsvSink::new(Vec::new()).await.unwrap();
        let bytes = sink.finish().await.unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), format!("{}\n", CSV_HEADER));
    }

    #[tokio::test]
    async fn test_writer_only_writes_results() {
        let patterns = RolePatterns::new("front", "rear", "overview").unwrap();
        let sink = CsvSink::new(Vec::new()).await.unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_outcome_writer(sink, patterns, rx);

        tx.send(outcome("c1", &["c1_front.jpg", "c1_rear.jpg"], result("N1"))).unwrap();
        tx.send(outcome(
            "c2",
            &["c2_front.jpg"],
            CallOutcome::Failed(ServiceError::Timeout(Duration::from_secs(1))),
        ))
        .unwrap();
        tx.send(outcome("c3", &["c3_front.jpg"], CallOutcome::Completed(None))).unwrap();
        drop(tx);

        let written = handle.await.unwrap().unwrap();
        let text = String::from_utf8(written.writer).unwrap();

        assert_eq!(written.rows, 1);
        assert_eq!(
            text,
            format!("{}\nc1_front.jpg,c1_rear.jpg,,N1,,,,,,\n", CSV_HEADER)
        );
    }

    #[tokio::test]
    async fn test_create_reports_path_on_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("no/such/dir/out.csv");
        match CsvSink::create(&missing).await {
            Err(BatchError::Output { path, .. }) => assert_eq!(path, missing),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected failure"),
        }
    }
}
