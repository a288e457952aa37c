//! Progress & streak engine.
//!
//! Tracks study sessions, the running [`LearningProgress`] totals, the daily
//! streak, and bookmarks. All state lives in the [`Store`]; the service holds
//! no caches, so two services over the same store always agree.

pub mod timer;
pub mod types;

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use std::sync::Arc;

use crate::clock::Clock;
use crate::store::{keys, Store};
use crate::streak::{self, StreakChange, StreakState};
use types::{Bookmark, LearningProgress, NewBookmark, StudySession};

pub struct ProgressService {
    store: Store,
    clock: Arc<dyn Clock>,
    default_weekly_goal: u32,
}

impl ProgressService {
    pub fn new(store: Store, clock: Arc<dyn Clock>, default_weekly_goal: u32) -> Self {
        Self {
            store,
            clock,
            default_weekly_goal,
        }
    }

    // ── Progress document ───────────────────────────────────────────────────

    /// Current totals. Day and week counters read as zero once their
    /// period has passed, even before the next session closes.
    pub fn get_progress(&self) -> Result<LearningProgress> {
        let mut progress = self.store.get(keys::PROGRESS)?.unwrap_or_else(|| LearningProgress {
            weekly_goal: self.default_weekly_goal,
            ..LearningProgress::default()
        });
        roll_counters(&mut progress, self.clock.now().date_naive());
        Ok(progress)
    }

    fn save_progress(&self, progress: &LearningProgress) -> Result<()> {
        self.store.set(keys::PROGRESS, progress)
    }

    pub fn set_weekly_goal(&self, minutes: u32) -> Result<LearningProgress> {
        let mut progress = self.get_progress()?;
        progress.weekly_goal = minutes;
        self.save_progress(&progress)?;
        Ok(progress)
    }

    /// Share of the weekly goal reached, clamped to `[0, 100]`. A zero goal reads as 0%.
    pub fn get_weekly_progress_percentage(&self) -> Result<f64> {
        Ok(weekly_percentage(&self.get_progress()?))
    }

    // ── Sessions ────────────────────────────────────────────────────────────

    pub fn current_session(&self) -> Result<Option<StudySession>> {
        self.store.get(keys::CURRENT_SESSION)
    }

    /// Most-recent-first list of closed sessions.
    pub fn get_sessions(&self) -> Result<Vec<StudySession>> {
        self.store.get_or_default(keys::STUDY_SESSIONS)
    }

    /// Open a new session. An already-open session is discarded without
    /// being recorded.
    pub fn start_session(&self, topics: &[String]) -> Result<StudySession> {
        if let Some(open) = self.current_session()? {
            tracing::warn!(session_id = %open.id, "abandoning open study session");
        }

        let session = StudySession {
            id: uuid::Uuid::now_v7().to_string(),
            start_time: self.clock.now(),
            end_time: None,
            topics: dedup_topics(topics),
            questions_asked: 0,
            bookmarks_created: 0,
            quiz_score: None,
            total_time: 0,
        };
        self.store.set(keys::CURRENT_SESSION, &session)?;

        if !session.topics.is_empty() {
            let mut progress = self.get_progress()?;
            for topic in &session.topics {
                push_unique(&mut progress.topics_studied, topic);
            }
            self.save_progress(&progress)?;
        }

        tracing::info!(session_id = %session.id, topics = session.topics.len(), "study session started");
        Ok(session)
    }

    /// Close the open session, if any, and fold it into the progress totals.
    pub fn end_session(&self) -> Result<Option<StudySession>> {
        let Some(mut session) = self.current_session()? else {
            return Ok(None);
        };

        let now = self.clock.now();
        let elapsed_ms = (now - session.start_time).num_milliseconds().max(0);
        session.end_time = Some(now);
        session.total_time = (elapsed_ms as f64 / 60_000.0).round() as i64;

        let mut sessions = self.get_sessions()?;
        sessions.insert(0, session.clone());
        self.store.set(keys::STUDY_SESSIONS, &sessions)?;
        self.store.remove(keys::CURRENT_SESSION)?;

        let mut progress = self.get_progress()?;
        progress.sessions_today += 1;
        progress.total_study_time += session.total_time;
        progress.weekly_progress = progress
            .weekly_progress
            .saturating_add(session.total_time.clamp(0, u32::MAX as i64) as u32);
        progress.last_session_at = Some(now);
        self.save_progress(&progress)?;

        self.update_streak()?;

        tracing::info!(
            session_id = %session.id,
            minutes = session.total_time,
            questions = session.questions_asked,
            "study session ended"
        );
        Ok(Some(session))
    }

    /// Credit today's study toward the streak.
    pub fn update_streak(&self) -> Result<StreakChange> {
        let mut progress = self.get_progress()?;
        let state = StreakState {
            current: progress.current_streak,
            longest: progress.longest_streak,
            last_credited: progress.last_study_date,
        };

        let (next, change) = streak::advance(state, self.clock.now());
        if change != StreakChange::Unchanged {
            progress.current_streak = next.current;
            progress.longest_streak = next.longest;
            progress.last_study_date = next.last_credited;
            self.save_progress(&progress)?;
            tracing::debug!(?change, streak = next.current, "streak updated");
        }
        Ok(change)
    }

    /// Count a question against the open session and remember its topic.
    /// No-op on the session when none is open; the topic is still recorded.
    pub fn record_question(&self, topic: &str) -> Result<()> {
        let topic = topic.trim();
        if let Some(mut session) = self.current_session()? {
            session.questions_asked += 1;
            if !topic.is_empty() {
                push_unique(&mut session.topics, topic);
            }
            self.store.set(keys::CURRENT_SESSION, &session)?;
        }

        if !topic.is_empty() {
            let mut progress = self.get_progress()?;
            if push_unique(&mut progress.topics_studied, topic) {
                self.save_progress(&progress)?;
            }
        }
        Ok(())
    }

    pub fn record_quiz_score(&self, score: f64) -> Result<()> {
        anyhow::ensure!(score.is_finite(), "quiz score must be a finite number, got {score}");
        if let Some(mut session) = self.current_session()? {
            session.quiz_score = Some(score);
            self.store.set(keys::CURRENT_SESSION, &session)?;
        }
        Ok(())
    }

    // ── Bookmarks ───────────────────────────────────────────────────────────

    /// Newest first.
    pub fn get_bookmarks(&self) -> Result<Vec<Bookmark>> {
        self.store.get_or_default(keys::BOOKMARKS)
    }

    pub fn save_bookmark(&self, new: NewBookmark) -> Result<Bookmark> {
        let bookmark = Bookmark {
            id: uuid::Uuid::now_v7().to_string(),
            title: new.title,
            content: new.content,
            topic: new.topic,
            timestamp: self.clock.now(),
            kind: new.kind,
            tags: new.tags,
        };

        let mut bookmarks = self.get_bookmarks()?;
        bookmarks.insert(0, bookmark.clone());
        self.store.set(keys::BOOKMARKS, &bookmarks)?;

        let mut progress = self.get_progress()?;
        progress.bookmarks_count += 1;
        self.save_progress(&progress)?;

        if let Some(mut session) = self.current_session()? {
            session.bookmarks_created += 1;
            self.store.set(keys::CURRENT_SESSION, &session)?;
        }

        tracing::info!(bookmark_id = %bookmark.id, kind = %bookmark.kind, "bookmark saved");
        Ok(bookmark)
    }

    /// Remove the bookmark with `id`. Returns `false` if it was already gone.
    pub fn delete_bookmark(&self, id: &str) -> Result<bool> {
        let mut bookmarks = self.get_bookmarks()?;
        let Some(pos) = bookmarks.iter().position(|b| b.id == id) else {
            return Ok(false);
        };
        bookmarks.remove(pos);
        self.store.set(keys::BOOKMARKS, &bookmarks)?;

        let mut progress = self.get_progress()?;
        progress.bookmarks_count = progress.bookmarks_count.saturating_sub(1);
        self.save_progress(&progress)?;
        Ok(true)
    }

    pub fn search_bookmarks(&self, query: &str) -> Result<Vec<Bookmark>> {
        let needle = query.trim().to_lowercase();
        let bookmarks = self.get_bookmarks()?;
        if needle.is_empty() {
            return Ok(bookmarks);
        }
        Ok(bookmarks.into_iter().filter(|b| b.matches(&needle)).collect())
    }
}

pub fn weekly_percentage(progress: &LearningProgress) -> f64 {
    if progress.weekly_goal == 0 {
        return 0.0;
    }
    (progress.weekly_progress as f64 / progress.weekly_goal as f64 * 100.0).clamp(0.0, 100.0)
}

/// Reset the per-day and per-week counters when `today` has moved past them.
fn roll_counters(progress: &mut LearningProgress, today: NaiveDate) {
    let last_day = progress.last_session_at.map(|t| t.date_naive());
    if last_day != Some(today) {
        progress.sessions_today = 0;
    }

    let monday = week_start(today);
    if progress.week_start != Some(monday) {
        progress.weekly_progress = 0;
        progress.week_start = Some(monday);
    }
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

fn push_unique(list: &mut Vec<String>, item: &str) -> bool {
    if list.iter().any(|t| t == item) {
        false
    } else {
        list.push(item.to_string());
        true
    }
}

fn dedup_topics(topics: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for t in topics {
        let t = t.trim();
        if !t.is_empty() {
            push_unique(&mut out, t);
        }
    }
    out
}
