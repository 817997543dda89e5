use std::fmt::Write;

use crate::result::CheckResult;
use crate::summary::RunSummary;
use crate::tracking::SiteGroup;

const UNGROUPED: &str = "Ungrouped sites";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// At least one site changed; recipients are mentioned.
    Alert,
    /// Nothing changed and every site was checked.
    Heartbeat,
    /// Nothing changed but some sites could not be checked.
    HeartbeatWithErrors,
}

/// Semantic payload handed to a transport; formatting for the wire is the transport's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub mentions: Vec<String>,
}

impl Notification {
    pub fn is_alert(&self) -> bool {
        self.kind == NotificationKind::Alert
    }
}

/// Maps run summaries to notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationPolicy {
    recipients: Vec<String>,
    groups: Vec<SiteGroup>,
}

impl NotificationPolicy {
    pub fn new(recipients: Vec<String>) -> Self {
        Self {
            recipients,
            groups: Vec::new(),
        }
    }

    /// Changed sites are listed under the name of the group holding them.
    pub fn with_groups(mut self, groups: Vec<SiteGroup>) -> Self {
        self.groups = groups;
        self
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Mentions are attached exactly when the run is not a heartbeat.
    pub fn compose(&self, summary: &RunSummary) -> Notification {
        if summary.is_heartbeat {
            return compose_heartbeat(summary);
        }

        let mut body = String::new();
        if self.groups.is_empty() {
            for result in summary.changes() {
                describe_change(&mut body, result);
            }
        } else {
            for (group, results) in self.group_changes(summary) {
                let _ = writeln!(body, "{group}:");
                for result in results {
                    describe_change(&mut body, result);
                }
            }
        }
        if summary.errored_count > 0 {
            describe_errors(&mut body, summary);
        }

        Notification {
            kind: NotificationKind::Alert,
            title: format!("{} website(s) changed", summary.changed_count),
            body: body.trim_end().to_string(),
            mentions: self.recipients.clone(),
        }
    }

    fn group_changes<'a>(&self, summary: &'a RunSummary) -> Vec<(String, Vec<&'a CheckResult>)> {
        let mut grouped: Vec<(String, Vec<&'a CheckResult>)> = Vec::new();
        for result in summary.changes() {
            let name = self
                .groups
                .iter()
                .find(|group| group.contains(&result.url))
                .map(|group| group.name.as_str())
                .unwrap_or(UNGROUPED);
            match grouped.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, results)) => results.push(result),
                None => grouped.push((name.to_string(), vec![result])),
            }
        }
        grouped
    }
}

/// Builds the notification for a run with the given recipients.
pub fn compose_notification(summary: &RunSummary, recipients: &[String]) -> Notification {
    NotificationPolicy::new(recipients.to_vec()).compose(summary)
}

fn compose_heartbeat(summary: &RunSummary) -> Notification {
    let total = summary.results.len();
    let mut body = format!("No changes detected across {total} site(s).\n");
    let established = summary.baselines_established();
    if established > 0 {
        let _ = writeln!(body, "Baseline established for {established} new site(s).");
    }

    if summary.errored_count == 0 {
        return Notification {
            kind: NotificationKind::Heartbeat,
            title: "Heartbeat: all systems running normally".to_string(),
            body: body.trim_end().to_string(),
            mentions: Vec::new(),
        };
    }

    describe_errors(&mut body, summary);
    Notification {
        kind: NotificationKind::HeartbeatWithErrors,
        title: format!(
            "Heartbeat: no changes, {} site(s) could not be checked",
            summary.errored_count
        ),
        body: body.trim_end().to_string(),
        mentions: Vec::new(),
    }
}

fn describe_change(body: &mut String, result: &CheckResult) {
    let _ = writeln!(body, "{} ({})", result.url, result.change_kind);
    if result.content_size_delta != 0 {
        let _ = writeln!(body, "  Content size: {:+} bytes", result.content_size_delta);
    }
    for (field, change) in &result.meta_diff {
        let _ = writeln!(body, "  {field}: {:?} -> {:?}", change.old, change.new);
    }
    for highlight in &result.highlight_diff.added {
        let _ = writeln!(body, "  + [{}] {}", highlight.label, highlight.text);
    }
    for highlight in &result.highlight_diff.removed {
        let _ = writeln!(body, "  - [{}] {}", highlight.label, highlight.text);
    }
}

fn describe_errors(body: &mut String, summary: &RunSummary) {
    let _ = writeln!(
        body,
        "{} site(s) could not be checked:",
        summary.errored_count
    );
    for result in summary.errors() {
        if let Some(error) = &result.error {
            let _ = writeln!(body, "  {}: {}", result.url, error);
        }
    }
}
