use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracker_core::{BaselineStore, Checker, FetchAttempt, Observation, PageMeta, RunSummary};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::decode::decode_body;
use crate::extract::{HtmlMetaExtractor, MetaExtractor};
use crate::fetch::Fetcher;

/// Source of observation timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Drives one check run: fetch, decode and extract each site, then hand the
/// observation to the [`Checker`].
///
/// Sites are processed one after another with an optional pause between them.
/// A failing site never stops the run.
pub struct RunEngine {
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn MetaExtractor>,
    checker: Checker,
    politeness_delay: Duration,
    clock: Clock,
}

impl RunEngine {
    pub fn new(fetcher: Arc<dyn Fetcher>, checker: Checker) -> Self {
        Self {
            fetcher,
            extractor: Box::new(HtmlMetaExtractor::default()),
            checker,
            politeness_delay: Duration::ZERO,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn MetaExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_politeness_delay(mut self, delay: Duration) -> Self {
        self.politeness_delay = delay;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    /// Fetches one URL and turns the response into an observation.
    pub async fn observe(&self, url: &str) -> FetchAttempt {
        let output = match self.fetcher.fetch(url).await {
            Ok(output) => output,
            Err(err) => return FetchAttempt::failed(url, err.to_string()),
        };
        tracker_debug!(
            "Fetched {} ({} bytes, status {})",
            output.metadata.final_url,
            output.metadata.byte_len,
            output.metadata.status
        );

        let decoded = decode_body(&output.bytes, output.metadata.content_type.as_deref());
        let meta = match self.extractor.extract(&decoded.text) {
            Ok(meta) => meta,
            Err(err) => {
                tracker_warn!("No metadata for {}: {}", url, err);
                PageMeta::new()
            }
        };

        FetchAttempt::fetched(
            url,
            Observation {
                body: decoded.text,
                meta,
                observed_at: (self.clock)(),
            },
        )
    }

    /// Checks every URL in order and returns the aggregated summary.
    pub async fn run(
        &self,
        urls: &[String],
        store: &mut dyn BaselineStore,
        run_id: u64,
    ) -> RunSummary {
        tracker_logging::set_run_id(run_id);
        tracker_info!("Checking {} site(s)", urls.len());

        let mut results = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            if index > 0 && !self.politeness_delay.is_zero() {
                tokio::time::sleep(self.politeness_delay).await;
            }
            let attempt = self.observe(url).await;
            let result = self.checker.check(store, attempt);
            tracker_info!("{}: {}", url, describe(&result));
            results.push(result);
        }

        let summary = RunSummary::assemble(results);
        tracker_info!(
            "Run finished: {} changed, {} failed, {} checked",
            summary.changed_count,
            summary.errored_count,
            summary.results.len()
        );
        tracker_logging::clear_run_id();
        summary
    }
}

fn describe(result: &tracker_core::CheckResult) -> String {
    if let Some(err) = &result.error {
        return format!("error ({err})");
    }
    if result.first_sight {
        return "baseline established".to_string();
    }
    result.change_kind.to_string()
}
