//! CLI `sync` command: replay documents queued while offline.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use gabu_tutor::config::TutorConfig;
use gabu_tutor::offline::SyncOutcome;

pub async fn sync(config: TutorConfig) -> Result<()> {
    let services = super::open_services(config)?;
    let status = services.offline.status()?;
    if let Some(last) = status.last_sync {
        println!("Last sync: {}", last.format("%Y-%m-%d %H:%M UTC"));
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg}")
            .expect("valid template"),
    );
    pb.set_message(format!("syncing {} pending change(s)", status.pending_changes));
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcome = services.offline.sync_data().await;
    pb.finish_and_clear();

    match outcome? {
        SyncOutcome::Synced { keys } => println!("Synced {keys} change(s)."),
        SyncOutcome::NothingPending => println!("Nothing to sync."),
        SyncOutcome::Offline => println!("Offline; changes stay queued."),
        SyncOutcome::AlreadySyncing => println!("A sync is already running."),
    }
    Ok(())
}
