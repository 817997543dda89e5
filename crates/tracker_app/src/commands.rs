use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracker_core::{BaselineStore, Checker, NotificationPolicy, RunSummary, SiteState};
use tracker_engine::{
    DiscordWebhookNotifier, JsonBaselineStore, LogNotifier, Notifier, ReqwestFetcher, RunEngine,
};
use tracker_logging::{tracker_error, tracker_info, tracker_warn};

use crate::cli::{Cli, Command};
use crate::config::TrackerConfig;

pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = TrackerConfig::load_or_create(&cli.config)?;
    let webhook = cli.discord_webhook_url.as_deref();

    match cli.command {
        Command::Check { heartbeat } => {
            let mut session = Session::open(&config, webhook, heartbeat)?;
            session.run_once(1).await;
        }
        Command::Monitor { heartbeat } => {
            let mut session = Session::open(&config, webhook, heartbeat)?;
            monitor(&mut session, &config).await;
        }
        Command::Add { group, urls } => add_urls(&mut config, &cli.config, group.as_deref(), &urls)?,
        Command::Remove { urls } => remove_urls(&mut config, &cli.config, &urls)?,
        Command::List => list(&config),
        Command::Status => status(&config, webhook)?,
    }
    Ok(())
}

/// Everything one or more check runs need, built once from the configuration.
struct Session {
    engine: RunEngine,
    store: JsonBaselineStore,
    urls: Vec<String>,
    policy: NotificationPolicy,
    notifier: Box<dyn Notifier>,
    send_heartbeat: bool,
}

impl Session {
    fn open(config: &TrackerConfig, webhook: Option<&str>, heartbeat: bool) -> Result<Self> {
        let checker = Checker::new(config.classifier_config(), config.rule_set()?);
        let fetcher = Arc::new(
            ReqwestFetcher::new(config.fetch_settings()).context("invalid fetch settings")?,
        );
        let engine =
            RunEngine::new(fetcher, checker).with_politeness_delay(config.politeness_delay());

        let store = JsonBaselineStore::open(&config.baseline_path).with_context(|| {
            format!("failed to open baselines at {}", config.baseline_path.display())
        })?;

        let notifier: Box<dyn Notifier> = match config.webhook_url(webhook) {
            Some(url) => Box::new(
                DiscordWebhookNotifier::new(url, config.fetch_settings().request_timeout)
                    .context("invalid Discord webhook")?,
            ),
            None => {
                tracker_info!("No Discord webhook configured; notifications go to the log");
                Box::new(LogNotifier)
            }
        };

        let policy = NotificationPolicy::new(config.notification.recipient_mentions.clone())
            .with_groups(config.groups.groups().to_vec());

        Ok(Self {
            engine,
            store,
            urls: config.groups.urls(),
            policy,
            notifier,
            send_heartbeat: heartbeat || config.notification.send_heartbeat,
        })
    }

    async fn run_once(&mut self, run_id: u64) -> RunSummary {
        if self.urls.is_empty() {
            tracker_warn!("No URLs are tracked; add some with `site_tracker add <url>`");
        }
        let summary = self.engine.run(&self.urls, &mut self.store, run_id).await;
        self.deliver(&summary).await;
        summary
    }

    async fn deliver(&self, summary: &RunSummary) {
        let notification = self.policy.compose(summary);
        if !notification.is_alert() && !self.send_heartbeat {
            tracker_info!("{}; heartbeat not sent", notification.title);
            return;
        }
        match self.notifier.deliver(&notification).await {
            Ok(()) => tracker_info!("Notification sent: {}", notification.title),
            Err(err) => tracker_error!("Failed to send notification: {}", err),
        }
    }
}

async fn monitor(session: &mut Session, config: &TrackerConfig) {
    let interval = config.check_interval();
    tracker_info!(
        "Monitoring {} site(s) every {}s; press Ctrl-C to stop",
        session.urls.len(),
        interval.as_secs()
    );

    let mut run_id = 0;
    loop {
        run_id += 1;
        session.run_once(run_id).await;
        tracker_info!("Next check in {}s", interval.as_secs());
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                tracker_info!("Monitoring stopped");
                break;
            }
        }
    }
}

fn add_urls(
    config: &mut TrackerConfig,
    config_path: &Path,
    group: Option<&str>,
    urls: &[String],
) -> Result<()> {
    let mut added = 0;
    for url in urls {
        if config.groups.add_url(url, group) {
            tracker_info!("Now tracking {}", url);
            added += 1;
        } else {
            tracker_warn!("{} is already tracked", url);
        }
    }
    if added > 0 {
        config.save(config_path)?;
    }
    println!("Added {added} URL(s) to the tracking list.");
    Ok(())
}

/// Baselines go first so a failure leaves the URL tracked with its baseline intact.
fn remove_urls(config: &mut TrackerConfig, config_path: &Path, urls: &[String]) -> Result<()> {
    let mut removed = Vec::new();
    for url in urls {
        match config.groups.remove_url(url) {
            Some(stored) => removed.push(stored),
            None => tracker_warn!("{} is not tracked", url),
        }
    }
    if removed.is_empty() {
        println!("Removed 0 URL(s) from the tracking list.");
        return Ok(());
    }

    let mut store = JsonBaselineStore::open(&config.baseline_path).with_context(|| {
        format!("failed to open baselines at {}", config.baseline_path.display())
    })?;
    for url in &removed {
        if store.remove(url)? {
            tracker_info!("Forgot baseline for {}", url);
        }
    }
    config.save(config_path)?;
    println!("Removed {} URL(s) from the tracking list.", removed.len());
    Ok(())
}

fn list(config: &TrackerConfig) {
    if config.groups.is_empty() {
        println!("No websites are currently being tracked.");
        println!("Use `site_tracker add <url>` to add one.");
        return;
    }
    println!("Currently tracking {} website(s):", config.groups.len());
    for group in config.groups.groups() {
        if group.urls.is_empty() {
            continue;
        }
        println!("{}:", group.name);
        for url in &group.urls {
            println!("  {url}");
        }
    }
}

fn status(config: &TrackerConfig, webhook: Option<&str>) -> Result<()> {
    let store = JsonBaselineStore::open(&config.baseline_path).with_context(|| {
        format!("failed to open baselines at {}", config.baseline_path.display())
    })?;

    println!("=== Site Tracker Status ===");
    println!("Total URLs tracked: {}", config.groups.len());
    match config.webhook_url(webhook) {
        Some(_) => println!("Notifications: Discord webhook"),
        None => println!("Notifications: log only"),
    }
    println!("Check interval: {} seconds", config.check_interval_secs);

    for url in config.groups.urls() {
        println!("  {url}");
        let site = store.load(url.as_str())?;
        match &site.state {
            SiteState::Uninitialized => println!("    Never checked"),
            SiteState::Established(baseline) => {
                println!("    Last checked: {}", baseline.last_checked_at.to_rfc3339());
                match baseline.last_changed_at {
                    Some(at) => println!("    Last changed: {}", at.to_rfc3339()),
                    None => println!("    Last changed: never"),
                }
                println!("    Checks: {}", baseline.check_count);
            }
        }
    }
    Ok(())
}
