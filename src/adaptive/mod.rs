//! Adaptive learning engine.
//!
//! Keeps the [`LearningProfile`] (strengths, weaknesses, per-subject level,
//! activity log) and derives recommendations and analytics from it.

pub mod paths;
pub mod subject;
pub mod types;

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use crate::clock::Clock;
use crate::store::{keys, Store};
use crate::streak;
pub use subject::infer_subject;
use types::{
    AdaptiveSettings, Difficulty, LearningActivity, LearningAnalytics, LearningPath,
    LearningProfile, LearningRecommendation, LearningStyle, Level, Pace, Priority,
    RecommendationKind,
};

/// Score at or above which a topic counts as a strength.
pub const STRENGTH_THRESHOLD: f64 = 80.0;
/// Score below which a topic counts as a weakness.
pub const WEAKNESS_THRESHOLD: f64 = 60.0;
/// How many recent activities feed the rolling-average recommendation.
const ROLLING_WINDOW: usize = 10;

pub struct AdaptiveLearningService {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl AdaptiveLearningService {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    // ── Profile ─────────────────────────────────────────────────────────────

    pub fn get_profile(&self) -> Result<LearningProfile> {
        self.store.get_or_default(keys::LEARNING_PROFILE)
    }

    fn save_profile(&self, profile: &LearningProfile) -> Result<()> {
        self.store.set(keys::LEARNING_PROFILE, profile)
    }

    fn update_profile(&self, f: impl FnOnce(&mut LearningProfile)) -> Result<LearningProfile> {
        let mut profile = self.get_profile()?;
        f(&mut profile);
        self.save_profile(&profile)?;
        Ok(profile)
    }

    pub fn set_interests(&self, interests: Vec<String>) -> Result<LearningProfile> {
        self.update_profile(|p| p.interests = interests)
    }

    pub fn set_learning_style(&self, style: LearningStyle) -> Result<LearningProfile> {
        self.update_profile(|p| p.learning_style = style)
    }

    pub fn set_preferred_pace(&self, pace: Pace) -> Result<LearningProfile> {
        self.update_profile(|p| p.preferred_pace = pace)
    }

    pub fn set_adaptive_settings(&self, settings: AdaptiveSettings) -> Result<LearningProfile> {
        self.update_profile(|p| p.adaptive_settings = settings)
    }

    // ── Activities ──────────────────────────────────────────────────────────

    /// Append a scored activity and update strengths, weaknesses, and the
    /// subject's level.
    ///
    /// Level moves up one tier on a score ≥ 80 at `Hard`, down one tier on a
    /// score < 60 at `Easy`, and otherwise stays put. Disabled entirely when
    /// the profile's `difficulty_adjustment` setting is off.
    pub fn record_learning_activity(
        &self,
        topic: &str,
        score: f64,
        time_spent: u32,
        difficulty: Difficulty,
    ) -> Result<LearningActivity> {
        anyhow::ensure!(score.is_finite(), "activity score must be a finite number, got {score}");
        let topic = topic.trim().to_string();
        let subject = infer_subject(&topic).to_string();
        let score = score.clamp(0.0, 100.0);

        let activity = LearningActivity {
            id: uuid::Uuid::now_v7().to_string(),
            topic: topic.clone(),
            subject: subject.clone(),
            score,
            time_spent,
            difficulty,
            timestamp: self.clock.now(),
        };

        let mut profile = self.get_profile()?;
        profile.learning_history.push(activity.clone());

        if score >= STRENGTH_THRESHOLD {
            add_unique(&mut profile.strengths, &topic);
            profile.weaknesses.retain(|w| w != &topic);
        } else if score < WEAKNESS_THRESHOLD {
            add_unique(&mut profile.weaknesses, &topic);
            profile.strengths.retain(|s| s != &topic);
        }

        let current = profile
            .current_level
            .get(&subject)
            .copied()
            .unwrap_or(Level::Beginner);
        let next = if profile.adaptive_settings.difficulty_adjustment {
            next_level(current, score, difficulty)
        } else {
            current
        };
        if next != current {
            tracing::info!(subject = %subject, from = %current, to = %next, "level changed");
        }
        profile.current_level.insert(subject, next);

        self.save_profile(&profile)?;
        tracing::debug!(topic = %activity.topic, score, %difficulty, "learning activity recorded");
        Ok(activity)
    }

    // ── Learning paths ──────────────────────────────────────────────────────

    /// The stored path catalog, seeded with the built-in paths on first use.
    pub fn get_learning_paths(&self) -> Result<Vec<LearningPath>> {
        if let Some(paths) = self.store.get(keys::LEARNING_PATHS)? {
            return Ok(paths);
        }
        let paths = paths::default_paths();
        self.store.set(keys::LEARNING_PATHS, &paths)?;
        Ok(paths)
    }

    /// Set a path's completion percentage (clamped to 0–100).
    pub fn update_path_progress(&self, path_id: &str, progress: f64) -> Result<Option<LearningPath>> {
        let mut paths = self.get_learning_paths()?;
        let Some(path) = paths.iter_mut().find(|p| p.id == path_id) else {
            return Ok(None);
        };
        path.progress = progress.clamp(0.0, 100.0);
        let updated = path.clone();
        self.store.set(keys::LEARNING_PATHS, &paths)?;
        Ok(Some(updated))
    }

    // ── Derived views ───────────────────────────────────────────────────────

    /// Build a fresh recommendation list. Nothing is persisted and nothing
    /// is deduplicated against earlier calls.
    pub fn generate_recommendations(&self) -> Result<Vec<LearningRecommendation>> {
        let profile = self.get_profile()?;
        let paths = self.get_learning_paths()?;
        let mut recs = Vec::new();

        for weakness in &profile.weaknesses {
            recs.push(recommendation(
                RecommendationKind::Practice,
                format!("Practice {weakness}"),
                format!("Strengthen your understanding of {weakness} with targeted practice."),
                Priority::High,
                85,
                format!("Recent scores in {weakness} were below {WEAKNESS_THRESHOLD}%"),
                None,
            ));
        }

        for path in &paths {
            if let Some(interest) = profile
                .interests
                .iter()
                .find(|i| paths::path_matches_interest(path, i))
            {
                recs.push(recommendation(
                    RecommendationKind::Path,
                    path.title.clone(),
                    path.description.clone(),
                    Priority::Medium,
                    70,
                    format!("Matches your interest in {interest}"),
                    Some(path.id.clone()),
                ));
            }
        }

        if let Some(avg) = rolling_average(&profile.learning_history, ROLLING_WINDOW) {
            if avg > 80.0 {
                recs.push(recommendation(
                    RecommendationKind::Challenge,
                    "Try an advanced challenge".into(),
                    "You're doing great! Take on harder problems to keep growing.".into(),
                    Priority::Medium,
                    75,
                    format!("Your recent average score is {avg:.0}%"),
                    None,
                ));
            } else if avg < 60.0 {
                recs.push(recommendation(
                    RecommendationKind::Review,
                    "Review and practice".into(),
                    "Go back over recent topics and practice the basics before moving on.".into(),
                    Priority::High,
                    80,
                    format!("Your recent average score is {avg:.0}%"),
                    None,
                ));
            }
        }

        tracing::debug!(count = recs.len(), "recommendations generated");
        Ok(recs)
    }

    pub fn get_learning_analytics(&self) -> Result<LearningAnalytics> {
        let profile = self.get_profile()?;
        let paths = self.get_learning_paths()?;
        let history = &profile.learning_history;

        let total_time_spent: u64 = history.iter().map(|a| a.time_spent as u64).sum();
        let average_score = if history.is_empty() {
            0.0
        } else {
            history.iter().map(|a| a.score).sum::<f64>() / history.len() as f64
        };
        let completed_paths = paths.iter().filter(|p| p.progress >= 100.0).count();

        let timestamps: Vec<_> = history.iter().map(|a| a.timestamp).collect();
        let current_streak = streak::streak_from_history(self.clock.now(), &timestamps);

        let hours = total_time_spent as f64 / 60.0;
        let learning_velocity = if hours > 0.0 {
            average_score * history.len() as f64 / hours
        } else {
            0.0
        };

        Ok(LearningAnalytics {
            total_time_spent,
            average_score,
            completed_paths,
            current_streak,
            favorite_subjects: favorite_subjects(history, 3),
            learning_velocity,
            total_activities: history.len(),
        })
    }
}

fn next_level(current: Level, score: f64, difficulty: Difficulty) -> Level {
    match difficulty {
        Difficulty::Hard if score >= STRENGTH_THRESHOLD => current.promoted(),
        Difficulty::Easy if score < WEAKNESS_THRESHOLD => current.demoted(),
        _ => current,
    }
}

fn rolling_average(history: &[LearningActivity], window: usize) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let recent = &history[history.len().saturating_sub(window)..];
    Some(recent.iter().map(|a| a.score).sum::<f64>() / recent.len() as f64)
}

/// Top `n` subjects by activity count; ties broken alphabetically.
fn favorite_subjects(history: &[LearningActivity], n: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for a in history {
        *counts.entry(a.subject.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().take(n).map(|(s, _)| s.to_string()).collect()
}

fn add_unique(list: &mut Vec<String>, item: &str) {
    if !item.is_empty() && !list.iter().any(|x| x == item) {
        list.push(item.to_string());
    }
}

fn recommendation(
    kind: RecommendationKind,
    title: String,
    description: String,
    priority: Priority,
    confidence: u8,
    reason: String,
    path_id: Option<String>,
) -> LearningRecommendation {
    LearningRecommendation {
        id: uuid::Uuid::now_v7().to_string(),
        kind,
        title,
        description,
        priority,
        confidence,
        reason,
        path_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_moves_one_step_and_saturates() {
        assert_eq!(next_level(Level::Beginner, 90.0, Difficulty::Hard), Level::Intermediate);
        assert_eq!(next_level(Level::Advanced, 95.0, Difficulty::Hard), Level::Advanced);
        assert_eq!(next_level(Level::Intermediate, 40.0, Difficulty::Easy), Level::Beginner);
        assert_eq!(next_level(Level::Beginner, 10.0, Difficulty::Easy), Level::Beginner);
        // high score on easy or low score on hard does nothing
        assert_eq!(next_level(Level::Intermediate, 95.0, Difficulty::Easy), Level::Intermediate);
        assert_eq!(next_level(Level::Intermediate, 20.0, Difficulty::Hard), Level::Intermediate);
        assert_eq!(next_level(Level::Intermediate, 90.0, Difficulty::Medium), Level::Intermediate);
    }

    #[test]
    fn rolling_average_uses_last_window() {
        let clock_now = chrono::Utc::now();
        let mk = |score: f64| LearningActivity {
            id: String::new(),
            topic: "t".into(),
            subject: "General".into(),
            score,
            time_spent: 1,
            difficulty: Difficulty::Medium,
            timestamp: clock_now,
        };
        let mut history: Vec<_> = (0..5).map(|_| mk(0.0)).collect();
        history.extend((0..10).map(|_| mk(90.0)));
        assert_eq!(rolling_average(&history, 10), Some(90.0));
        assert_eq!(rolling_average(&[], 10), None);
    }

    #[test]
    fn favorite_subjects_rank_by_count() {
        let now = chrono::Utc::now();
        let mk = |subject: &str| LearningActivity {
            id: String::new(),
            topic: String::new(),
            subject: subject.into(),
            score: 50.0,
            time_spent: 1,
            difficulty: Difficulty::Medium,
            timestamp: now,
        };
        let history = vec![
            mk("Science"),
            mk("Math"),
            mk("Math"),
            mk("English"),
            mk("General"),
            mk("Science"),
            mk("Math"),
        ];
        assert_eq!(favorite_subjects(&history, 3), vec!["Math", "Science", "English"]);
    }
}
