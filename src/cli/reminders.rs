//! CLI `reminders` commands.

use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;

use gabu_tutor::config::TutorConfig;
use gabu_tutor::reminders::scheduler::LogNotifier;
use gabu_tutor::reminders::types::NewReminder;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const RESCAN: Duration = Duration::from_secs(15 * 60);

pub fn list(config: TutorConfig) -> Result<()> {
    let services = super::open_services(config)?;
    let reminders = services.reminders.get_reminders()?;
    if reminders.is_empty() {
        println!("No reminders. Add one with `gabu reminders add`.");
        return Ok(());
    }

    let next: std::collections::HashMap<String, _> = services
        .reminders
        .upcoming(Local::now().naive_local())?
        .into_iter()
        .map(|(r, at)| (r.id, at))
        .collect();

    for r in &reminders {
        let days: Vec<&str> = r
            .days
            .iter()
            .filter_map(|d| DAY_NAMES.get(*d as usize).copied())
            .collect();
        let status = if r.is_active { "on " } else { "off" };
        println!("  [{status}] {} at {} on {} ({})", r.title, r.time, days.join(","), r.id);
        if let Some(at) = next.get(&r.id) {
            println!("        next: {}", at.format("%a %Y-%m-%d %H:%M"));
        }
    }
    Ok(())
}

pub fn add(config: TutorConfig, title: String, time: String, days: Vec<u8>, message: String) -> Result<()> {
    let services = super::open_services(config)?;
    let reminder = services.reminders.add_reminder(NewReminder {
        title,
        message,
        time,
        days,
    })?;
    println!("Added reminder {} ({}).", reminder.title, reminder.id);
    Ok(())
}

pub fn remove(config: TutorConfig, id: &str) -> Result<()> {
    let services = super::open_services(config)?;
    if services.reminders.delete_reminder(id)? {
        println!("Removed reminder {id}.");
    } else {
        println!("No reminder with id {id}.");
    }
    Ok(())
}

pub fn toggle(config: TutorConfig, id: &str) -> Result<()> {
    let services = super::open_services(config)?;
    match services.reminders.toggle_reminder(id)? {
        Some(r) if r.is_active => println!("Reminder {} is on.", r.title),
        Some(r) => println!("Reminder {} is off.", r.title),
        None => println!("No reminder with id {id}."),
    }
    Ok(())
}

/// Fire reminders in the foreground until Ctrl-C.
pub async fn run(config: TutorConfig) -> Result<()> {
    let services = super::open_services(config)?;
    let scheduler = services.reminder_scheduler(Arc::new(LogNotifier));

    let mut notices = scheduler.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            println!(
                "[{}] {}: {}",
                notice.fired_at.with_timezone(&Local).format("%H:%M"),
                notice.title,
                notice.body
            );
        }
    });

    println!("Watching reminders. Press Ctrl-C to stop.");
    scheduler
        .run(RESCAN, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    printer.abort();
    Ok(())
}
