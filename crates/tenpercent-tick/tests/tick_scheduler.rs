//! Integration tests for the tick scheduler.
//!
//! Uses paused Tokio time so `sleep_until` resolves as soon as the
//! runtime has nothing else to do.

use std::time::Duration;

use tenpercent_tick::{Countdown, CountdownStep, TickConfig, TickScheduler};

fn config_100ms() -> TickConfig {
    TickConfig::default()
}

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_interval_is_100ms() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.interval, Duration::from_millis(100));
}

#[test]
fn test_zero_interval_is_clamped() {
    let cfg = TickConfig::with_interval(Duration::ZERO).validated();
    assert_eq!(cfg.interval, TickConfig::MIN_INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_initial_state() {
    let s = TickScheduler::new(config_100ms());
    assert_eq!(s.tick_count(), 0);
    assert_eq!(s.interval(), Duration::from_millis(100));
}

// =========================================================================
// Tick firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_ticks_fire_on_cadence() {
    let mut s = TickScheduler::new(config_100ms());
    let start = tokio::time::Instant::now();

    for expected in 1..=5 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.tick, expected);
        assert_eq!(info.dt, Duration::from_millis(100));
        assert!(!info.overrun);
        assert_eq!(info.elapsed(), Duration::from_millis(100));
    }
    assert_eq!(start.elapsed(), Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_skip_policy_reports_missed_intervals() {
    let mut s = TickScheduler::new(config_100ms());

    // Block the "actor" for 350ms past the first deadline.
    tokio::time::advance(Duration::from_millis(450)).await;
    let info = s.wait_for_tick().await;

    assert!(info.overrun);
    assert_eq!(info.ticks_skipped, 3);
    assert_eq!(info.elapsed(), Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn test_skipped_ticks_resume_from_wakeup() {
    let mut s = TickScheduler::new(config_100ms());

    tokio::time::advance(Duration::from_millis(330)).await;
    s.wait_for_tick().await;
    let woke = tokio::time::Instant::now();
    let info = s.wait_for_tick().await;

    assert_eq!(info.tick, 2);
    assert!(!info.overrun);
    assert_eq!(woke.elapsed(), Duration::from_millis(100));
}

// =========================================================================
// Independent cadences
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cadence_is_anchored_at_creation() {
    let mut early = TickScheduler::new(config_100ms());
    tokio::time::advance(Duration::from_millis(950)).await;
    let mut late = TickScheduler::new(config_100ms());
    let created = tokio::time::Instant::now();

    // The early scheduler is far behind, the late one is not.
    assert!(early.wait_for_tick().await.overrun);
    let info = late.wait_for_tick().await;

    assert_eq!(info.tick, 1);
    assert!(!info.overrun);
    assert_eq!(info.elapsed(), Duration::from_millis(100));
    assert_eq!(created.elapsed(), Duration::from_millis(100));
}

// =========================================================================
// Driving a countdown (mirrors the game actor loop)
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_scheduler_drives_countdown_to_expiry() {
    let mut s = TickScheduler::new(config_100ms());
    let mut countdown = Countdown::new(1.0, 1);
    let start = tokio::time::Instant::now();

    let mut published = vec![countdown.remaining()];
    loop {
        let info = s.wait_for_tick().await;
        match countdown.tick(info.elapsed()) {
            CountdownStep::Tick(r) => published.push(r),
            CountdownStep::Quiet => {}
            CountdownStep::Expired => {
                published.push(0.0);
                break;
            }
        }
    }

    assert_eq!(published.first(), Some(&1.0));
    assert_eq!(published.last(), Some(&0.0));
    assert_eq!(published.len(), 11);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_select_loop_serves_commands_between_ticks() {
    let mut s = TickScheduler::new(config_100ms());
    let (tx, mut rx) = tokio::sync::mpsc::channel::<&str>(10);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(350)).await;
        tx.send("stop").await.ok();
    });

    let mut ticks_fired = 0u64;
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => {
                assert_eq!(cmd, "stop");
                break;
            }
            info = s.wait_for_tick() => {
                ticks_fired += 1;
                assert_eq!(info.tick, ticks_fired);
            }
        }
    }

    assert_eq!(ticks_fired, 3);
}
