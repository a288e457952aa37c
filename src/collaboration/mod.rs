//! Periodic learning reports built from closed study sessions.
//!
//! Reports are derived on demand and never stored; the session history is
//! the source of truth. The free-text findings come from fixed threshold
//! rules, listed next to each rule below.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;

use crate::clock::Clock;
use crate::progress::types::StudySession;
use crate::store::{keys, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            Self::Daily => Duration::days(1),
            Self::Weekly => Duration::days(7),
            Self::Monthly => Duration::days(30),
        }
    }
}

impl std::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("unknown report period: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningReport {
    pub id: String,
    pub period: ReportPeriod,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Minutes.
    pub total_study_time: i64,
    pub sessions_count: usize,
    pub topics_covered: Vec<String>,
    pub bookmarks_created: u32,
    pub quiz_scores: Vec<f64>,
    pub average_quiz_score: Option<f64>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

pub struct CollaborationService {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl CollaborationService {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn generate_learning_report(&self, period: ReportPeriod) -> Result<LearningReport> {
        let sessions: Vec<StudySession> = self.store.get_or_default(keys::STUDY_SESSIONS)?;
        let report = build_report(&sessions, period, self.clock.now());
        tracing::info!(
            period = %period,
            sessions = report.sessions_count,
            minutes = report.total_study_time,
            "learning report generated"
        );
        Ok(report)
    }
}

/// Aggregate the sessions that started inside `[now - period, now]`.
pub fn build_report(sessions: &[StudySession], period: ReportPeriod, now: DateTime<Utc>) -> LearningReport {
    let start = now - period.window();
    let in_window: Vec<&StudySession> = sessions
        .iter()
        .filter(|s| s.start_time >= start && s.start_time <= now)
        .collect();

    let total_study_time: i64 = in_window.iter().map(|s| s.total_time).sum();
    let bookmarks_created: u32 = in_window.iter().map(|s| s.bookmarks_created).sum();

    let mut topics_covered: Vec<String> = Vec::new();
    for topic in in_window.iter().flat_map(|s| s.topics.iter()) {
        if !topics_covered.contains(topic) {
            topics_covered.push(topic.clone());
        }
    }

    let quiz_scores: Vec<f64> = in_window.iter().filter_map(|s| s.quiz_score).collect();
    let average_quiz_score = mean(&quiz_scores);
    let average_session = if in_window.is_empty() {
        None
    } else {
        Some(total_study_time as f64 / in_window.len() as f64)
    };

    let findings = Findings::derive(
        in_window.len(),
        average_session,
        topics_covered.len(),
        average_quiz_score,
        bookmarks_created,
    );

    LearningReport {
        id: uuid::Uuid::now_v7().to_string(),
        period,
        start_date: start,
        end_date: now,
        total_study_time,
        sessions_count: in_window.len(),
        topics_covered,
        bookmarks_created,
        quiz_scores,
        average_quiz_score,
        strengths: findings.strengths,
        areas_for_improvement: findings.improvements,
        recommendations: findings.recommendations,
        generated_at: now,
    }
}

struct Findings {
    strengths: Vec<String>,
    improvements: Vec<String>,
    recommendations: Vec<String>,
}

impl Findings {
    fn derive(
        sessions: usize,
        average_session: Option<f64>,
        topic_count: usize,
        average_quiz: Option<f64>,
        bookmarks: u32,
    ) -> Self {
        let mut strengths = Vec::new();
        let mut improvements = Vec::new();
        let mut recommendations = Vec::new();

        if sessions == 0 {
            improvements.push("No study sessions recorded in this period".to_string());
            recommendations.push("Start a short study session to build momentum".to_string());
            return Self { strengths, improvements, recommendations };
        }

        // average session length: > 20 min strength, < 10 min improvement
        if let Some(avg) = average_session {
            if avg > 20.0 {
                strengths.push("Good focus with long study sessions".to_string());
            } else if avg < 10.0 {
                improvements.push("Could study longer in each session".to_string());
            }
            if avg < 15.0 {
                recommendations
                    .push("Try the focus timer for 25-minute study sessions".to_string());
            }
        }

        // session count: ≥ 5 strength
        if sessions >= 5 {
            strengths.push("Studies consistently".to_string());
        }

        // topic breadth: ≥ 5 strength, < 3 improvement
        if topic_count >= 5 {
            strengths.push("Explores a wide variety of topics".to_string());
        } else if topic_count < 3 {
            improvements.push("Try exploring more topics".to_string());
        }

        // quiz mean: ≥ 80 strength, < 60 improvement, < 70 recommendation
        if let Some(avg) = average_quiz {
            if avg >= 80.0 {
                strengths.push("Strong quiz performance".to_string());
            } else if avg < 60.0 {
                improvements.push("Review quiz material to improve scores".to_string());
            }
            if avg < 70.0 {
                recommendations.push("Take practice quizzes on recent topics".to_string());
            }
        } else {
            recommendations.push("Take a quiz to check your understanding".to_string());
        }

        if bookmarks == 0 {
            recommendations.push("Bookmark key explanations to review later".to_string());
        }

        if recommendations.is_empty() {
            recommendations
                .push("Keep up the great work and challenge yourself with new topics".to_string());
        }

        Self { strengths, improvements, recommendations }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Plain-text rendering of a report, suitable for sharing with a parent or teacher.
pub fn report_summary(report: &LearningReport) -> String {
    let mut out = String::new();
    let title = match report.period {
        ReportPeriod::Daily => "Daily",
        ReportPeriod::Weekly => "Weekly",
        ReportPeriod::Monthly => "Monthly",
    };
    let _ = writeln!(out, "{title} Learning Report");
    let _ = writeln!(
        out,
        "{} to {}",
        report.start_date.format("%Y-%m-%d"),
        report.end_date.format("%Y-%m-%d")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Study time:   {} min over {} sessions", report.total_study_time, report.sessions_count);
    let _ = writeln!(out, "Topics:       {}", report.topics_covered.len());
    let _ = writeln!(out, "Bookmarks:    {}", report.bookmarks_created);
    if let Some(avg) = report.average_quiz_score {
        let _ = writeln!(out, "Quiz average: {avg:.0}% ({} quizzes)", report.quiz_scores.len());
    }

    for (heading, items) in [
        ("Strengths", &report.strengths),
        ("Areas for improvement", &report.areas_for_improvement),
        ("Recommendations", &report.recommendations),
    ] {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{heading}:");
        for item in items {
            let _ = writeln!(out, "  - {item}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-04-10T12:00:00Z".parse().unwrap()
    }

    fn session(hours_ago: i64, minutes: i64, topics: &[&str], quiz: Option<f64>) -> StudySession {
        let start = now() - Duration::hours(hours_ago);
        StudySession {
            id: format!("s-{hours_ago}"),
            start_time: start,
            end_time: Some(start + Duration::minutes(minutes)),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            questions_asked: 1,
            bookmarks_created: 1,
            quiz_score: quiz,
            total_time: minutes,
        }
    }

    #[test]
    fn window_filters_sessions() {
        let sessions = vec![
            session(2, 30, &["Fractions"], Some(90.0)),
            session(30, 30, &["Cells"], None),
            session(24 * 10, 30, &["Grammar"], None),
        ];

        let daily = build_report(&sessions, ReportPeriod::Daily, now());
        assert_eq!(daily.sessions_count, 1);
        assert_eq!(daily.total_study_time, 30);

        let weekly = build_report(&sessions, ReportPeriod::Weekly, now());
        assert_eq!(weekly.sessions_count, 2);
        assert_eq!(weekly.topics_covered, vec!["Fractions", "Cells"]);

        let monthly = build_report(&sessions, ReportPeriod::Monthly, now());
        assert_eq!(monthly.sessions_count, 3);
        assert_eq!(monthly.total_study_time, 90);
    }

    #[test]
    fn long_sessions_are_a_strength() {
        let sessions = vec![session(1, 25, &["Fractions"], None), session(3, 35, &["Decimals"], None)];
        let report = build_report(&sessions, ReportPeriod::Daily, now());
        assert!(report.strengths.iter().any(|s| s.contains("Good focus")));
        assert!(report.average_quiz_score.is_none());
    }

    #[test]
    fn short_sessions_need_improvement() {
        let sessions = vec![session(1, 5, &["Fractions"], Some(50.0))];
        let report = build_report(&sessions, ReportPeriod::Daily, now());
        assert!(report.areas_for_improvement.iter().any(|s| s.contains("study longer")));
        assert!(report.areas_for_improvement.iter().any(|s| s.contains("quiz")));
        assert!(report.recommendations.iter().any(|s| s.contains("practice quizzes")));
    }

    #[test]
    fn boundary_twenty_minutes_is_not_a_strength() {
        let sessions = vec![session(1, 20, &["Fractions"], None)];
        let report = build_report(&sessions, ReportPeriod::Daily, now());
        assert!(!report.strengths.iter().any(|s| s.contains("Good focus")));
        assert!(!report.areas_for_improvement.iter().any(|s| s.contains("study longer")));
    }

    #[test]
    fn empty_period_reports_nothing_studied() {
        let report = build_report(&[], ReportPeriod::Weekly, now());
        assert_eq!(report.sessions_count, 0);
        assert_eq!(report.total_study_time, 0);
        assert!(report.strengths.is_empty());
        assert_eq!(report.areas_for_improvement.len(), 1);
    }

    #[test]
    fn summary_lists_sections() {
        let sessions = vec![session(1, 25, &["Fractions"], Some(85.0))];
        let report = build_report(&sessions, ReportPeriod::Daily, now());
        let text = report_summary(&report);
        assert!(text.starts_with("Daily Learning Report"));
        assert!(text.contains("Quiz average: 85%"));
        assert!(text.contains("Strengths:"));
    }
}
