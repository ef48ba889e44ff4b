//! Best-effort joining of variant tasks.
//!
//! A failed variant never cancels its siblings. Every outcome is kept so the caller (or a
//! later flush) can see exactly which variants are missing.

use std::future::Future;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinSet};

use super::types::{VariantFailure, VariantReport, VariantResult};

/// Run every task to completion and collect all outcomes.
pub async fn gather_best_effort<I, F>(tasks: I) -> VariantReport
where
    I: IntoIterator<Item = F>,
    F: Future<Output = VariantResult>,
{
    VariantReport::from_results(join_all(tasks).await)
}

/// Variant tasks that outlive the ingest call that started them.
///
/// Finished tasks are reaped whenever a new one is spawned, so a host that never flushes
/// holds only the running tasks and their folded outcomes. Dropping the tracker detaches
/// whatever is still running instead of aborting it.
#[derive(Default)]
pub struct VariantTracker {
    state: Mutex<TrackerState>,
}

#[derive(Default)]
struct TrackerState {
    tasks: JoinSet<VariantResult>,
    finished: VariantReport,
}

impl TrackerState {
    fn reap(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            record_joined(&mut self.finished, joined);
        }
    }
}

fn record_joined(report: &mut VariantReport, joined: Result<VariantResult, JoinError>) {
    match joined {
        Ok(result) => report.record(result),
        Err(e) => {
            tracing::error!(error = %e, "Variant task aborted");
            report.failed.push(VariantFailure {
                label: String::new(),
                key: String::new(),
                error: format!("variant task aborted: {}", e),
            });
        }
    }
}

impl VariantTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = VariantResult> + Send + 'static,
    {
        let mut state = self.state.lock().await;
        state.reap();
        state.tasks.spawn(task);
    }

    /// Number of tasks still running.
    pub async fn in_flight(&self) -> usize {
        let mut state = self.state.lock().await;
        state.reap();
        state.tasks.len()
    }

    /// Wait for every tracked task and report their outcomes, including tasks that
    /// finished since the last flush.
    pub async fn flush(&self) -> VariantReport {
        let (mut tasks, mut report) = {
            let mut state = self.state.lock().await;
            (
                std::mem::take(&mut state.tasks),
                std::mem::take(&mut state.finished),
            )
        };

        while let Some(joined) = tasks.join_next().await {
            record_joined(&mut report, joined);
        }

        report
    }
}

impl Drop for VariantTracker {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.reap();
        let running = state.tasks.len();
        if running > 0 {
            tracing::warn!(
                running = running,
                "Variant tracker dropped with tasks in flight; detaching them unreported"
            );
            state.tasks.detach_all();
        }
        if !state.finished.failed.is_empty() {
            tracing::warn!(
                failed = state.finished.failed.len(),
                "Variant tracker dropped with unflushed variant failures"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::types::StoredVariant;

    fn ok(label: &str) -> VariantResult {
        Ok(StoredVariant {
            label: label.to_string(),
            key: format!("size/{}/a.jpg", label),
            url: format!("https://cdn/size/{}/a.jpg", label),
        })
    }

    fn failed(label: &str) -> VariantResult {
        Err(VariantFailure {
            label: label.to_string(),
            key: format!("size/{}/a.jpg", label),
            error: "boom".to_string(),
        })
    }

    #[tokio::test]
    async fn gather_keeps_every_outcome() {
        let results = vec![ok("w100"), failed("w200"), ok("w300")];
        let report = gather_best_effort(results.into_iter().map(|r| async move { r })).await;

        assert_eq!(report.stored.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].label, "w200");
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn tracker_flushes_spawned_tasks() {
        let tracker = VariantTracker::new();
        tracker.spawn(async { ok("w100") }).await;
        tracker
            .spawn(async {
                tokio::task::yield_now().await;
                failed("w200")
            })
            .await;

        let report = tracker.flush().await;
        assert_eq!(report.stored.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(tracker.in_flight().await, 0);

        // Nothing left to flush
        assert_eq!(tracker.flush().await, VariantReport::default());
    }

    #[tokio::test]
    async fn tracker_reports_panicked_task() {
        let tracker = VariantTracker::new();
        tracker
            .spawn(async {
                if true {
                    panic!("resize exploded");
                }
                ok("w100")
            })
            .await;

        let report = tracker.flush().await;
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].error.contains("aborted"));
    }

    #[tokio::test]
    async fn finished_tasks_are_reaped_without_flush() {
        let tracker = VariantTracker::new();
        for _ in 0..100 {
            tracker.spawn(async { ok("w100") }).await;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert_eq!(tracker.in_flight().await, 0);
        // Outcomes of reaped tasks are still reported
        let report = tracker.flush().await;
        assert_eq!(report.stored.len(), 100);
    }

    #[tokio::test]
    async fn dropped_tracker_lets_tasks_finish() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let done = Arc::new(AtomicBool::new(false));
        let tracker = VariantTracker::new();
        let flag = Arc::clone(&done);
        tracker
            .spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                flag.store(true, Ordering::SeqCst);
                ok("w100")
            })
            .await;

        drop(tracker);
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        assert!(done.load(Ordering::SeqCst));
    }
}
