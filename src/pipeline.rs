//! Collect, normalize, snapshot, load: one run, strictly in that order.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::collectors::{Collector, ObservationSource};
use crate::config::PipelineConfig;
use crate::error::{Result, Stage, StageExt};
use crate::processors::{BatchReport, NormalizedBatch, Normalizer};
use crate::store::{MergeOutcome, ObservationSink};
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvSnapshot;

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: BatchReport,
    pub snapshot: Option<PathBuf>,
    /// `None` when the run stopped before loading.
    pub merge: Option<MergeOutcome>,
}

pub struct Pipeline<'a, S, K> {
    config: &'a PipelineConfig,
    collector: Collector<S>,
    normalizer: Normalizer,
    sink: Option<K>,
    write_snapshot: bool,
}

impl<'a, S, K> Pipeline<'a, S, K>
where
    S: ObservationSource,
    K: ObservationSink,
{
    pub fn new(config: &'a PipelineConfig, source: S) -> Self {
        Self {
            config,
            collector: Collector::new(source).with_concurrent(config.concurrent),
            normalizer: Normalizer::new(),
            sink: None,
            write_snapshot: true,
        }
    }

    /// Without a sink the run ends after the snapshot.
    pub fn with_sink(mut self, sink: K) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_snapshot(mut self, write_snapshot: bool) -> Self {
        self.write_snapshot = write_snapshot;
        self
    }

    pub fn sink(&self) -> Option<&K> {
        self.sink.as_ref()
    }

    pub fn into_sink(self) -> Option<K> {
        self.sink
    }

    /// Collect and normalize only.
    pub async fn extract(&self, progress: Option<&ProgressReporter>) -> Result<NormalizedBatch> {
        let raw = self
            .collector
            .collect(&self.config.locations, progress)
            .await
            .stage(Stage::Collect)?;
        info!(records = raw.len(), "extracted");

        let batch = self.normalizer.normalize(&raw);
        info!(rows = batch.rows.len(), "normalized");
        Ok(batch)
    }

    pub async fn run(&mut self, progress: Option<&ProgressReporter>) -> Result<RunSummary> {
        let batch = self.extract(progress).await?;

        let snapshot = if self.write_snapshot {
            write_snapshot_best_effort(&batch, &self.config.csv_output)
        } else {
            None
        };

        let merge = match self.sink.as_mut() {
            Some(sink) => {
                if let Some(p) = progress {
                    p.set_message("Merging into store...");
                }
                Some(sink.merge(&batch.rows).stage(Stage::Load)?)
            }
            None => None,
        };

        Ok(RunSummary {
            report: batch.report,
            snapshot,
            merge,
        })
    }
}

/// The snapshot is a debugging aid; failing to write it does not stop the run.
fn write_snapshot_best_effort(batch: &NormalizedBatch, path: &Path) -> Option<PathBuf> {
    match CsvSnapshot::new().write_rows(&batch.rows, path) {
        Ok(()) => Some(path.to_path_buf()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not write CSV snapshot");
            None
        }
    }
}

/// Re-load a CSV snapshot: normalize it again and merge it into `sink`.
pub fn load_snapshot<K: ObservationSink>(
    path: &Path,
    sink: &mut K,
) -> Result<(BatchReport, MergeOutcome)> {
    let records = CsvSnapshot::new()
        .read_records(path)
        .stage(Stage::Normalize)?;
    let batch = Normalizer::new().normalize_snapshot(records);
    info!(rows = batch.rows.len(), path = %path.display(), "rows to load");

    let outcome = sink.merge(&batch.rows).stage(Stage::Load)?;
    Ok((batch.report, outcome))
}
