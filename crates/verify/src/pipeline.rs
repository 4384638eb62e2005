//! Bounded dispatch pipeline and statistics aggregation
//!
//! Paths flow through a bounded queue to a fixed set of workers; every
//! worker pushes exactly one report per path onto a second bounded queue,
//! drained by a single consumer that owns the run statistics. Submission
//! blocks when the queue is full, bounding memory use regardless of how
//! large the tree being walked is.

use crate::{FileReport, Verifier};
use rottag_types::RunStats;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::warn;

/// Sink for per-file reports, drained by the CLI's printer.
pub type ReportSender = mpsc::UnboundedSender<FileReport>;

/// A running verification pipeline.
///
/// With `jobs <= 1` files are verified inline at submission, preserving
/// input order exactly. With more workers, completion order is
/// unspecified but aggregate counts stay exact: the outcome queue is
/// drained to completion before [`Pipeline::finish`] returns.
pub struct Pipeline {
    mode: Mode,
}

enum Mode {
    Sequential {
        verifier: Verifier,
        reports: Option<ReportSender>,
        stats: RunStats,
    },
    Parallel {
        path_tx: mpsc::Sender<PathBuf>,
        workers: Vec<JoinHandle<()>>,
        consumer: JoinHandle<RunStats>,
    },
}

impl Verifier {
    /// Start a pipeline for this run's options.
    ///
    /// Reports are forwarded to `reports` in the order statistics are
    /// recorded, so a printer downstream sees exactly what was counted.
    #[must_use]
    pub fn pipeline(&self, reports: Option<ReportSender>) -> Pipeline {
        let jobs = self.options().jobs;
        if jobs <= 1 {
            return Pipeline {
                mode: Mode::Sequential {
                    verifier: self.clone(),
                    reports,
                    stats: RunStats::default(),
                },
            };
        }

        let (path_tx, path_rx) = mpsc::channel::<PathBuf>(jobs);
        let path_rx = Arc::new(Mutex::new(path_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<FileReport>(jobs);

        let mut workers = Vec::with_capacity(jobs);
        for _ in 0..jobs {
            let verifier = self.clone();
            let path_rx = Arc::clone(&path_rx);
            let outcome_tx = outcome_tx.clone();
            workers.push(tokio::spawn(async move {
                loop {
                    // Hold the receiver lock only while pulling the next
                    // path, never across the verification itself.
                    let next = { path_rx.lock().await.recv().await };
                    let Some(path) = next else { break };
                    let report = verifier.verify_file(&path).await;
                    if outcome_tx.send(report).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(outcome_tx);

        // The single consumer is the only mutator of the statistics.
        let consumer = tokio::spawn(async move {
            let mut stats = RunStats::default();
            while let Some(report) = outcome_rx.recv().await {
                stats.record(report.outcome);
                if let Some(tx) = &reports {
                    let _ = tx.send(report);
                }
            }
            stats
        });

        Pipeline {
            mode: Mode::Parallel {
                path_tx,
                workers,
                consumer,
            },
        }
    }

    /// Verify a batch of paths and return the aggregated statistics.
    pub async fn run<I>(&self, paths: I, reports: Option<ReportSender>) -> RunStats
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut pipeline = self.pipeline(reports);
        for path in paths {
            pipeline.submit(path).await;
        }
        pipeline.finish().await
    }
}

impl Pipeline {
    /// Submit one path for verification.
    ///
    /// Sequential pipelines verify it before returning; parallel ones
    /// block here while the input queue is full (backpressure).
    pub async fn submit(&mut self, path: PathBuf) {
        match &mut self.mode {
            Mode::Sequential {
                verifier,
                reports,
                stats,
            } => {
                let report = verifier.verify_file(&path).await;
                stats.record(report.outcome);
                if let Some(tx) = reports {
                    let _ = tx.send(report);
                }
            }
            Mode::Parallel { path_tx, .. } => {
                // Workers only stop pulling if the run is being torn
                // down, in which case dropping the path is correct.
                let _ = path_tx.send(path).await;
            }
        }
    }

    /// Close the input queue, await every worker, then the consumer.
    pub async fn finish(self) -> RunStats {
        match self.mode {
            Mode::Sequential { stats, .. } => stats,
            Mode::Parallel {
                path_tx,
                workers,
                consumer,
            } => {
                drop(path_tx);
                for worker in workers {
                    if let Err(e) = worker.await {
                        warn!(error = %e, "verification worker panicked");
                    }
                }
                match consumer.await {
                    Ok(stats) => stats,
                    Err(e) => {
                        warn!(error = %e, "statistics consumer panicked");
                        RunStats::default()
                    }
                }
            }
        }
    }
}
