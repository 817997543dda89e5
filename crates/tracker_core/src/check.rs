use crate::classify::{classify, ClassifierConfig, Observation};
use crate::highlight::RuleSet;
use crate::result::{CheckResult, SiteError};
use crate::store::BaselineStore;
use crate::summary::RunSummary;
use tracker_logging::{tracker_error, tracker_warn};

/// What the fetch collaborator produced for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    pub url: String,
    pub outcome: Result<Observation, String>,
}

impl FetchAttempt {
    pub fn fetched(url: impl Into<String>, observation: Observation) -> Self {
        Self {
            url: url.into(),
            outcome: Ok(observation),
        }
    }

    pub fn failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: Err(message.into()),
        }
    }
}

/// Runs the load, classify and save cycle for each site.
#[derive(Debug)]
pub struct Checker {
    config: ClassifierConfig,
    rules: RuleSet,
}

impl Checker {
    pub fn new(config: ClassifierConfig, rules: RuleSet) -> Self {
        Self { config, rules }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Checks one site. Failures are recorded on the result and leave the baseline untouched.
    pub fn check(&self, store: &mut dyn BaselineStore, attempt: FetchAttempt) -> CheckResult {
        let FetchAttempt { url, outcome } = attempt;
        let observation = match outcome {
            Ok(observation) => observation,
            Err(message) => {
                tracker_warn!("Could not fetch {}: {}", url, message);
                return CheckResult::failed(url, SiteError::Fetch(message));
            }
        };

        let site = match store.load(&url) {
            Ok(site) => site,
            Err(err) => {
                tracker_error!("{}", err);
                return CheckResult::failed(url, SiteError::Store(err.to_string()));
            }
        };

        let classification = classify(&site, &observation, &self.config, &self.rules);
        if let Err(err) = store.save(&classification.updated) {
            tracker_error!("{}", err);
            return CheckResult::failed(url, SiteError::Store(err.to_string()));
        }
        classification.result
    }

    /// Checks every attempt in order and aggregates the results.
    pub fn run<I>(&self, store: &mut dyn BaselineStore, attempts: I) -> RunSummary
    where
        I: IntoIterator<Item = FetchAttempt>,
    {
        let results = attempts
            .into_iter()
            .map(|attempt| self.check(store, attempt))
            .collect();
        RunSummary::assemble(results)
    }
}
