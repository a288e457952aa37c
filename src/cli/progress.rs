//! CLI `progress`, `focus`, and `bookmarks` commands.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use gabu_tutor::config::TutorConfig;
use gabu_tutor::progress::weekly_percentage;

pub fn progress(config: TutorConfig, goal: Option<u32>) -> Result<()> {
    let services = super::open_services(config)?;
    let progress = match goal {
        Some(minutes) => services.progress.set_weekly_goal(minutes)?,
        None => services.progress.get_progress()?,
    };

    println!("Study Progress");
    println!("{}", "=".repeat(40));
    println!("  Total study time:    {} min", progress.total_study_time);
    println!("  Sessions today:      {}", progress.sessions_today);
    println!("  Current streak:      {} day(s)", progress.current_streak);
    println!("  Longest streak:      {} day(s)", progress.longest_streak);
    println!("  Topics studied:      {}", progress.topics_studied.len());
    println!("  Bookmarks:           {}", progress.bookmarks_count);
    println!(
        "  Weekly goal:         {}/{} min ({:.0}%)",
        progress.weekly_progress,
        progress.weekly_goal,
        weekly_percentage(&progress)
    );
    if let Some(last) = progress.last_study_date {
        println!("  Last studied:        {}", last.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(open) = services.progress.current_session()? {
        println!();
        println!(
            "Open session since {} ({} question(s))",
            open.start_time.format("%H:%M UTC"),
            open.questions_asked
        );
    }
    Ok(())
}

/// Run one focus interval with a countdown bar.
pub async fn focus(config: TutorConfig, minutes: Option<u64>, topics: &[String]) -> Result<()> {
    let services = super::open_services(config)?;
    let timer = services.focus_timer(minutes);
    let total = timer.duration().as_secs();

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  focus {bar:40.green/white} {elapsed_precise} / {msg}")
            .expect("valid template")
            .progress_chars("##-"),
    );
    pb.set_message(format!("{} min", total / 60));

    let ticker = {
        let pb = pb.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                pb.inc(1);
            }
        })
    };

    let outcome = tokio::select! {
        closed = timer.run(topics) => closed,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nStopped early.");
            services.progress.end_session()
        }
    };
    ticker.abort();
    pb.finish_and_clear();

    match outcome? {
        Some(session) => println!("Focus session complete: {} min logged.", session.total_time),
        None => println!("No session was open."),
    }
    Ok(())
}

pub fn bookmarks(config: TutorConfig, query: Option<&str>) -> Result<()> {
    let services = super::open_services(config)?;
    let bookmarks = match query {
        Some(q) => services.progress.search_bookmarks(q)?,
        None => services.progress.get_bookmarks()?,
    };

    if bookmarks.is_empty() {
        println!("No bookmarks found.");
        return Ok(());
    }

    for b in &bookmarks {
        println!(
            "  [{}] {} ({}, {})",
            b.kind,
            b.title,
            b.timestamp.format("%Y-%m-%d"),
            b.id
        );
        println!("      {}", super::preview(&b.content, 100));
        if !b.tags.is_empty() {
            println!("      tags: {}", b.tags.join(", "));
        }
    }
    Ok(())
}

pub fn delete_bookmark(config: TutorConfig, id: &str) -> Result<()> {
    let services = super::open_services(config)?;
    if services.progress.delete_bookmark(id)? {
        println!("Deleted bookmark {id}.");
    } else {
        println!("No bookmark with id {id}.");
    }
    Ok(())
}
