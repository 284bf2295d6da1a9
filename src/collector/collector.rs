//! One collection run: every configured pass, in order.

use std::sync::Arc;

use anyhow::Result;
use log::{error, info, warn};

use super::passes::{self, PassReport};
use crate::api::ResourceFetcher;
use crate::config::{CollectorSettings, FailurePolicy, PassKind};
use crate::db::DocumentStore;

/// Runs the configured passes sequentially against one API client and one
/// document store.
pub struct Collector {
    api: Arc<dyn ResourceFetcher>,
    db: Arc<dyn DocumentStore>,
    settings: Arc<CollectorSettings>,
}

/// Outcome of every pass in a run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub completed: Vec<PassReport>,
    pub failed: Vec<(PassKind, anyhow::Error)>,
    /// Passes not attempted because an earlier one failed under `abort`
    pub skipped: Vec<PassKind>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Collector {
    pub fn new(
        api: Arc<dyn ResourceFetcher>,
        db: Arc<dyn DocumentStore>,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            api,
            db,
            settings: Arc::new(settings),
        }
    }

    /// Runs a single pass.
    pub async fn run_pass(&self, pass: PassKind) -> Result<PassReport> {
        let api = self.api.as_ref();
        let db = self.db.as_ref();
        let settings = self.settings.as_ref();

        match pass {
            PassKind::Summary => passes::summary::run(api, db, settings).await,
            PassKind::Channels => passes::channels::run(api, db, settings).await,
            PassKind::Games => passes::games::run(api, db, settings).await,
        }
    }

    /// Runs every configured pass under the configured failure policy and
    /// reports each outcome. Never fails itself.
    pub async fn collect(&self) -> RunReport {
        let mut report = RunReport::default();
        let policy = self.settings.on_pass_failure;

        for (i, pass) in self.settings.passes.iter().copied().enumerate() {
            if policy == FailurePolicy::Abort && !report.failed.is_empty() {
                report.skipped = self.settings.passes[i..].to_vec();
                warn!(
                    "Skipping {} pass(es) after failure: {:?}",
                    report.skipped.len(),
                    report.skipped
                );
                break;
            }

            let start = std::time::Instant::now();
            match self.run_pass(pass).await {
                Ok(pass_report) => {
                    info!("{} in {:?}", pass_report, start.elapsed());
                    report.completed.push(pass_report);
                },
                Err(e) => {
                    error!("{} pass failed after {:?}: {:#}", pass, start.elapsed(), e);
                    report.failed.push((pass, e));
                },
            }
        }

        report
    }

    /// Runs every configured pass; fails if any pass failed.
    ///
    /// The returned error wraps the first failure, so its root cause (URL,
    /// status, entity) stays intact.
    pub async fn run(&self) -> Result<RunReport> {
        let mut report = self.collect().await;
        if report.is_success() {
            info!(
                "Collection run finished: {} pass(es) completed",
                report.completed.len()
            );
            return Ok(report);
        }

        let names: Vec<&str> = report.failed.iter().map(|(pass, _)| pass.as_str()).collect();
        let summary = format!(
            "collection run failed: {} of {} pass(es) failed ({})",
            report.failed.len(),
            self.settings.passes.len(),
            names.join(", ")
        );

        let (_, first) = report.failed.remove(0);
        Err(first.context(summary))
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
