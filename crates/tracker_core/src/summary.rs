use crate::result::CheckResult;

/// Aggregate outcome of one run over all tracked sites.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// One result per site, in tracking order.
    pub results: Vec<CheckResult>,
    pub changed_count: usize,
    pub errored_count: usize,
    /// No site changed. Errors alone never turn a run into an alert.
    pub is_heartbeat: bool,
}

impl RunSummary {
    pub fn assemble(results: Vec<CheckResult>) -> Self {
        let changed_count = results.iter().filter(|r| r.is_change()).count();
        let errored_count = results.iter().filter(|r| r.is_error()).count();
        Self {
            results,
            changed_count,
            errored_count,
            is_heartbeat: changed_count == 0,
        }
    }

    pub fn changes(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.is_change())
    }

    pub fn errors(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.is_error())
    }

    pub fn baselines_established(&self) -> usize {
        self.results.iter().filter(|r| r.first_sight).count()
    }
}
