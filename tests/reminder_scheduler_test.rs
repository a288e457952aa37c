mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use gabu_tutor::reminders::scheduler::{Notifier, ReminderNotice, ReminderScheduler};
use gabu_tutor::reminders::types::{NewGoal, NewReminder};
use gabu_tutor::reminders::ReminderService;

use helpers::{t0, test_store, TokioClock};

const EVERY_DAY: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

#[derive(Default)]
struct CountingNotifier {
    fired: AtomicUsize,
}

impl Notifier for CountingNotifier {
    fn notify(&self, _notice: &ReminderNotice) {
        self.fired.fetch_add(1, Ordering::SeqCst);
    }
}

/// Local `HH:MM` one minute after the test origin.
fn one_minute_in() -> String {
    (t0() + chrono::Duration::minutes(1))
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string()
}

fn setup(enabled: bool) -> (Arc<ReminderService>, ReminderScheduler, Arc<CountingNotifier>) {
    let clock = Arc::new(TokioClock::new(t0()));
    let reminders = Arc::new(ReminderService::new(test_store(), clock.clone()));
    let notifier = Arc::new(CountingNotifier::default());
    let scheduler = ReminderScheduler::new(reminders.clone(), clock, notifier.clone(), enabled);
    (reminders, scheduler, notifier)
}

fn daily(title: &str, message: &str) -> NewReminder {
    NewReminder {
        title: title.into(),
        message: message.into(),
        time: one_minute_in(),
        days: EVERY_DAY.to_vec(),
    }
}

#[tokio::test(start_paused = true)]
async fn reminder_fires_and_rearms() {
    let (reminders, scheduler, notifier) = setup(true);
    let reminder = reminders.add_reminder(daily("Math practice", "")).unwrap();
    let mut notices = scheduler.subscribe();

    assert_eq!(scheduler.schedule_reminders().unwrap(), 1);

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert!(notices.try_recv().is_err());

    tokio::time::sleep(Duration::from_secs(2)).await;
    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.source_id, reminder.id);
    assert_eq!(notice.title, "Math practice");
    assert_eq!(notice.body, "Time to study!");
    assert_eq!(notifier.fired.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
    assert!(notices.try_recv().is_ok());
    assert_eq!(notifier.fired.load(Ordering::SeqCst), 2);
    assert_eq!(scheduler.armed_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn rescheduling_does_not_stack_timers() {
    let (reminders, scheduler, notifier) = setup(true);
    reminders.add_reminder(daily("Reading", "Read one chapter")).unwrap();

    for _ in 0..3 {
        scheduler.schedule_reminders().unwrap();
    }
    assert_eq!(scheduler.armed_count(), 1);

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(notifier.fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn inactive_reminders_are_not_armed() {
    let (reminders, scheduler, _) = setup(true);
    let reminder = reminders.add_reminder(daily("Science", "")).unwrap();
    reminders.toggle_reminder(&reminder.id).unwrap();

    assert_eq!(scheduler.schedule_reminders().unwrap(), 0);
    assert_eq!(scheduler.armed_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn disabled_notifications_still_deliver_in_app() {
    let (reminders, scheduler, notifier) = setup(false);
    reminders.add_reminder(daily("Spelling", "")).unwrap();
    let mut notices = scheduler.subscribe();

    scheduler.schedule_reminders().unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert!(notices.try_recv().is_ok());
    assert_eq!(notifier.fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn goals_fire_with_target_minutes() {
    let (reminders, scheduler, _) = setup(true);
    reminders
        .add_goal(NewGoal {
            title: "Daily study".into(),
            description: String::new(),
            target_minutes: 30,
            time: one_minute_in(),
            days: EVERY_DAY.to_vec(),
        })
        .unwrap();
    let mut notices = scheduler.subscribe();

    scheduler.schedule_reminders().unwrap();
    tokio::time::sleep(Duration::from_secs(61)).await;

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.body, "Goal: study for 30 minutes today");
}

#[tokio::test(start_paused = true)]
async fn run_stops_on_shutdown() {
    let (reminders, scheduler, notifier) = setup(true);
    reminders.add_reminder(daily("History", "")).unwrap();

    let shutdown = tokio::time::sleep(Duration::from_secs(90));
    scheduler
        .run(Duration::from_secs(15 * 60), shutdown)
        .await
        .unwrap();

    assert_eq!(notifier.fired.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.armed_count(), 0);
}

#[test]
fn invalid_schedules_are_rejected() {
    let reminders = ReminderService::new(test_store(), helpers::test_clock());

    let bad_time = NewReminder {
        title: "x".into(),
        message: String::new(),
        time: "25:00".into(),
        days: vec![1],
    };
    assert!(reminders.add_reminder(bad_time).is_err());

    let no_days = NewReminder {
        title: "x".into(),
        message: String::new(),
        time: "16:00".into(),
        days: vec![],
    };
    assert!(reminders.add_reminder(no_days).is_err());
    assert!(reminders.get_reminders().unwrap().is_empty());
}
