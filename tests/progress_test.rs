mod helpers;

use std::sync::Arc;

use chrono::Duration;
use gabu_tutor::progress::timer::FocusTimer;
use gabu_tutor::progress::types::{BookmarkType, NewBookmark};
use gabu_tutor::progress::ProgressService;
use gabu_tutor::streak::StreakChange;

use helpers::{test_clock, test_store, TokioClock};

fn service() -> (ProgressService, Arc<gabu_tutor::clock::ManualClock>) {
    let clock = test_clock();
    (ProgressService::new(test_store(), clock.clone(), 300), clock)
}

fn study(svc: &ProgressService, clock: &gabu_tutor::clock::ManualClock, minutes: i64) {
    svc.start_session(&[]).unwrap();
    clock.advance(Duration::minutes(minutes));
    svc.end_session().unwrap();
}

fn bookmark(title: &str, tags: &[&str]) -> NewBookmark {
    NewBookmark {
        title: title.into(),
        content: format!("Notes on {title}"),
        topic: title.into(),
        kind: BookmarkType::Explanation,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[test]
fn streak_grows_one_per_day_and_resets_after_gap() {
    let (svc, clock) = service();

    assert_eq!(svc.update_streak().unwrap(), StreakChange::Started);
    for expected in 2..=4 {
        clock.advance(Duration::hours(24));
        assert_eq!(svc.update_streak().unwrap(), StreakChange::Extended);
        assert_eq!(svc.get_progress().unwrap().current_streak, expected);
    }

    clock.advance(Duration::hours(49));
    assert_eq!(
        svc.update_streak().unwrap(),
        StreakChange::Reset { previous: 4 }
    );

    let progress = svc.get_progress().unwrap();
    assert_eq!(progress.current_streak, 1);
    assert_eq!(progress.longest_streak, 4);
}

#[test]
fn same_day_study_does_not_move_streak() {
    let (svc, clock) = service();
    svc.update_streak().unwrap();
    let credited = svc.get_progress().unwrap().last_study_date;

    clock.advance(Duration::hours(23));
    assert_eq!(svc.update_streak().unwrap(), StreakChange::Unchanged);

    let progress = svc.get_progress().unwrap();
    assert_eq!(progress.current_streak, 1);
    assert_eq!(progress.last_study_date, credited);
}

#[test]
fn session_minutes_are_rounded() {
    let (svc, clock) = service();
    svc.start_session(&["Fractions".into(), "Fractions".into(), " ".into()])
        .unwrap();
    clock.advance(Duration::seconds(29 * 60 + 31));
    let session = svc.end_session().unwrap().unwrap();

    assert_eq!(session.total_time, 30);
    assert_eq!(session.topics, vec!["Fractions".to_string()]);
    assert!(svc.current_session().unwrap().is_none());

    let progress = svc.get_progress().unwrap();
    assert_eq!(progress.total_study_time, 30);
    assert_eq!(progress.sessions_today, 1);
    assert_eq!(progress.weekly_progress, 30);
}

#[test]
fn short_session_rounds_to_zero() {
    let (svc, clock) = service();
    svc.start_session(&[]).unwrap();
    clock.advance(Duration::seconds(29));
    assert_eq!(svc.end_session().unwrap().unwrap().total_time, 0);
}

#[test]
fn weekly_percentage_is_clamped() {
    let (svc, clock) = service();
    svc.set_weekly_goal(60).unwrap();

    study(&svc, &clock, 30);
    assert_eq!(svc.get_weekly_progress_percentage().unwrap(), 50.0);

    study(&svc, &clock, 90);
    assert_eq!(svc.get_weekly_progress_percentage().unwrap(), 100.0);
    assert_eq!(svc.get_progress().unwrap().weekly_progress, 120);
}

#[test]
fn sessions_today_resets_on_new_day() {
    let (svc, clock) = service();
    study(&svc, &clock, 10);
    study(&svc, &clock, 10);
    assert_eq!(svc.get_progress().unwrap().sessions_today, 2);

    clock.advance(Duration::days(1));
    study(&svc, &clock, 10);
    assert_eq!(svc.get_progress().unwrap().sessions_today, 1);
    assert_eq!(svc.get_sessions().unwrap().len(), 3);
}

#[test]
fn new_week_reads_zero_before_any_session_closes() {
    let (svc, clock) = service();
    study(&svc, &clock, 300);
    assert_eq!(svc.get_weekly_progress_percentage().unwrap(), 100.0);

    clock.advance(Duration::days(7));
    assert_eq!(svc.get_weekly_progress_percentage().unwrap(), 0.0);
    let progress = svc.get_progress().unwrap();
    assert_eq!(progress.weekly_progress, 0);
    assert_eq!(progress.sessions_today, 0);
    assert_eq!(progress.total_study_time, 300);
}

#[test]
fn sessions_today_reads_zero_the_next_morning() {
    let (svc, clock) = service();
    study(&svc, &clock, 20);
    assert_eq!(svc.get_progress().unwrap().sessions_today, 1);

    clock.advance(Duration::days(1));
    let progress = svc.get_progress().unwrap();
    assert_eq!(progress.sessions_today, 0);
    // same ISO week, so the weekly minutes carry over
    assert_eq!(progress.weekly_progress, 20);
}

#[test]
fn non_finite_quiz_score_is_rejected() {
    let (svc, _) = service();
    svc.start_session(&[]).unwrap();
    assert!(svc.record_quiz_score(f64::NAN).is_err());
    assert!(svc.record_quiz_score(f64::INFINITY).is_err());
    assert_eq!(svc.current_session().unwrap().unwrap().quiz_score, None);
}

#[test]
fn questions_and_quiz_score_land_on_open_session() {
    let (svc, _) = service();
    svc.start_session(&[]).unwrap();
    svc.record_question("Fractions.").unwrap();
    svc.record_question("Fractions.").unwrap();
    svc.record_quiz_score(75.0).unwrap();

    let session = svc.current_session().unwrap().unwrap();
    assert_eq!(session.questions_asked, 2);
    assert_eq!(session.topics, vec!["Fractions.".to_string()]);
    assert_eq!(session.quiz_score, Some(75.0));
    assert_eq!(svc.get_progress().unwrap().topics_studied.len(), 1);
}

#[test]
fn bookmarks_are_newest_first() {
    let (svc, clock) = service();
    svc.save_bookmark(bookmark("Fractions", &[])).unwrap();
    clock.advance(Duration::minutes(1));
    svc.save_bookmark(bookmark("Decimals", &[])).unwrap();

    let titles: Vec<_> = svc
        .get_bookmarks()
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["Decimals", "Fractions"]);
    assert_eq!(svc.get_progress().unwrap().bookmarks_count, 2);
}

#[test]
fn delete_bookmark_is_idempotent() {
    let (svc, _) = service();
    let saved = svc.save_bookmark(bookmark("Fractions", &[])).unwrap();

    assert!(svc.delete_bookmark(&saved.id).unwrap());
    assert!(!svc.delete_bookmark(&saved.id).unwrap());
    assert!(svc.get_bookmarks().unwrap().is_empty());
    assert_eq!(svc.get_progress().unwrap().bookmarks_count, 0);
}

#[test]
fn search_matches_text_and_tags() {
    let (svc, _) = service();
    svc.save_bookmark(bookmark("Fractions", &["math"])).unwrap();
    svc.save_bookmark(bookmark("The water cycle", &["science"])).unwrap();

    assert_eq!(svc.search_bookmarks("WATER").unwrap().len(), 1);
    assert_eq!(svc.search_bookmarks("math").unwrap()[0].title, "Fractions");
    assert!(svc.search_bookmarks("volcano").unwrap().is_empty());
    assert_eq!(svc.search_bookmarks("  ").unwrap().len(), 2);
}

#[test]
fn bookmark_timestamps_round_trip() {
    let (svc, clock) = service();
    clock.advance(Duration::milliseconds(1234));
    let saved = svc.save_bookmark(bookmark("Fractions", &[])).unwrap();

    let loaded = svc.get_bookmarks().unwrap().remove(0);
    assert_eq!(loaded.timestamp, saved.timestamp);
    assert_eq!(loaded, saved);
}

#[tokio::test(start_paused = true)]
async fn focus_timer_records_full_interval() {
    let clock = Arc::new(TokioClock::new(helpers::t0()));
    let progress = Arc::new(ProgressService::new(test_store(), clock, 300));

    let timer = FocusTimer::minutes(progress.clone(), 25);
    let session = timer.run(&["Fractions".to_string()]).await.unwrap().unwrap();

    assert_eq!(session.total_time, 25);
    let snapshot = progress.get_progress().unwrap();
    assert_eq!(snapshot.total_study_time, 25);
    assert_eq!(snapshot.current_streak, 1);
}
