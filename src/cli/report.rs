//! CLI `report`, `recommend`, and `analytics` commands.

use anyhow::Result;

use gabu_tutor::collaboration::{report_summary, ReportPeriod};
use gabu_tutor::config::TutorConfig;

pub fn report(config: TutorConfig, period: ReportPeriod, share: bool) -> Result<()> {
    let services = super::open_services(config)?;
    let report = services.collaboration.generate_learning_report(period)?;

    if share {
        print!("{}", report_summary(&report));
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn recommend(config: TutorConfig) -> Result<()> {
    let services = super::open_services(config)?;
    let recommendations = services.adaptive.generate_recommendations()?;

    if recommendations.is_empty() {
        println!("No recommendations yet. Take a quiz or two first.");
        return Ok(());
    }

    for (i, r) in recommendations.iter().enumerate() {
        println!(
            "  {}. [{:?}/{:?}] {} (confidence {}%)",
            i + 1,
            r.kind,
            r.priority,
            r.title,
            r.confidence
        );
        println!("     {}", r.description);
        println!("     why: {}", r.reason);
    }
    Ok(())
}

pub fn analytics(config: TutorConfig) -> Result<()> {
    let services = super::open_services(config)?;
    let analytics = services.adaptive.get_learning_analytics()?;
    let profile = services.adaptive.get_profile()?;

    println!("Learning Analytics");
    println!("{}", "=".repeat(40));
    println!("  Activities:          {}", analytics.total_activities);
    println!("  Time spent:          {} min", analytics.total_time_spent);
    println!("  Average score:       {:.1}", analytics.average_score);
    println!("  Completed paths:     {}", analytics.completed_paths);
    println!("  Activity streak:     {} day(s)", analytics.current_streak);
    println!("  Velocity:            {:.1} points/hour", analytics.learning_velocity);
    if !analytics.favorite_subjects.is_empty() {
        println!("  Favorite subjects:   {}", analytics.favorite_subjects.join(", "));
    }
    println!();

    println!("Levels:");
    if profile.current_level.is_empty() {
        println!("  (none yet)");
    }
    for (subject, level) in &profile.current_level {
        println!("  {:<12} {}", subject, level);
    }
    if !profile.strengths.is_empty() {
        println!("Strengths:  {}", profile.strengths.join(", "));
    }
    if !profile.weaknesses.is_empty() {
        println!("Needs work: {}", profile.weaknesses.join(", "));
    }
    Ok(())
}
