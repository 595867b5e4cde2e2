use std::sync::Arc;
use std::time::Duration;

use motion_core::{
    ConfirmReason, FalsePositiveFilter, FilterCfg, SessionStart, TimerEvent, TimerQueue, Verdict,
};
use motion_hardware::SimulatedLocationProvider;
use motion_traits::clock::Clock;
use motion_traits::scheduler::Scheduler;
use motion_traits::{LocationSample, ManualClock};
use rstest::rstest;

struct Bench {
    clock: ManualClock,
    location: SimulatedLocationProvider,
    timers: TimerQueue<TimerEvent>,
    filter: FalsePositiveFilter,
}

fn bench() -> Bench {
    let clock = ManualClock::new();
    let location = SimulatedLocationProvider::new();
    let shared: Arc<dyn Clock + Send + Sync> = Arc::new(clock.clone());
    let timers = TimerQueue::new(shared.clone());
    let filter = FalsePositiveFilter::new(
        Box::new(location.clone()),
        shared,
        FilterCfg::default(),
        10.0,
    );
    Bench {
        clock,
        location,
        timers,
        filter,
    }
}

fn at(b: &Bench, lat: f64, lon: f64) -> LocationSample {
    LocationSample::new(lat, lon, b.clock.now())
}

#[test]
fn update_location_takes_last_known_only_once() {
    let mut b = bench();
    b.location.set_last_known(at(&b, 1.0, 1.0));
    b.filter.update_location(&mut b.timers);
    b.location.set_last_known(at(&b, 2.0, 2.0));
    b.filter.update_location(&mut b.timers);
    let cached = b.filter.last_location().expect("baseline");
    assert_eq!((cached.lat, cached.lon), (1.0, 1.0));
}

#[test]
fn missing_last_known_is_not_an_error() {
    let mut b = bench();
    b.filter.update_location(&mut b.timers);
    assert!(b.filter.last_location().is_none());
    assert!(b.filter.warm_since().is_some());
    assert_eq!(b.filter.start_session(&mut b.timers), SessionStart::NoBaseline);
    assert!(!b.filter.is_listening());
    assert_eq!(b.timers.pending(), 0);
}

#[rstest]
#[case(Duration::ZERO, true)]
#[case(Duration::from_secs(7_199), true)]
#[case(Duration::from_secs(7_200), false)]
#[case(Duration::from_secs(10_000), false)]
fn warm_window(#[case] elapsed: Duration, #[case] warm: bool) {
    let mut b = bench();
    assert!(b.filter.is_gps_still_warm());
    b.clock.advance(elapsed);
    assert_eq!(b.filter.is_gps_still_warm(), warm);
}

#[test]
fn reset_restarts_the_warmth_clock() {
    let mut b = bench();
    b.filter.update_location(&mut b.timers);
    b.clock.advance(Duration::from_secs(3 * 60 * 60));
    assert!(!b.filter.is_gps_still_warm());
    b.filter.reset(&mut b.timers);
    assert!(b.filter.warm_since().is_none());
    assert!(b.filter.is_gps_still_warm());
}

#[test]
fn session_opens_one_subscription_and_one_timeout() {
    let mut b = bench();
    b.location.set_last_known(at(&b, 52.0, 4.0));
    b.filter.update_location(&mut b.timers);
    assert_eq!(b.filter.start_session(&mut b.timers), SessionStart::Opened);
    assert_eq!(b.filter.start_session(&mut b.timers), SessionStart::Opened);
    assert!(b.location.is_subscribed());
    assert_eq!(b.location.subscribe_calls(), 2);
    assert_eq!(b.timers.pending(), 1);
    let session = b.filter.session().expect("open session");
    assert!(b.timers.is_pending(session.timeout_handle()));
}

#[test]
fn end_session_is_idempotent() {
    let mut b = bench();
    b.filter.end_session(&mut b.timers);
    b.location.set_last_known(at(&b, 52.0, 4.0));
    b.filter.update_location(&mut b.timers);
    b.filter.start_session(&mut b.timers);
    b.filter.end_session(&mut b.timers);
    b.filter.end_session(&mut b.timers);
    assert!(!b.filter.is_listening());
    assert!(!b.location.is_subscribed());
    assert_eq!(b.timers.pending(), 0);
}

#[rstest]
#[case(0.000_05, false)] // about 5.6 m
#[case(0.000_089, false)] // just under 10 m
#[case(0.000_091, true)] // just over 10 m
#[case(0.01, true)]
fn distance_threshold(#[case] dlat: f64, #[case] confirmed: bool) {
    let mut b = bench();
    b.location.set_last_known(at(&b, 52.0, 4.0));
    b.filter.update_location(&mut b.timers);
    b.filter.start_session(&mut b.timers);
    let fix = at(&b, 52.0 + dlat, 4.0);
    let verdict = b
        .filter
        .on_location_update(fix, &mut b.timers)
        .expect("verdict");
    assert_eq!(verdict.is_confirmed(), confirmed, "{verdict:?}");
    assert_eq!(b.filter.last_location().is_some(), !confirmed);
    assert!(!b.filter.is_listening());
    assert_eq!(b.timers.pending(), 0);
}

#[test]
fn update_outside_session_is_ignored() {
    let mut b = bench();
    b.location.set_last_known(at(&b, 52.0, 4.0));
    b.filter.update_location(&mut b.timers);
    let fix = at(&b, 53.0, 4.0);
    assert_eq!(b.filter.on_location_update(fix, &mut b.timers), None);
    assert!(b.filter.last_location().is_some());
}

#[test]
fn late_fix_counts_as_timeout() {
    let mut b = bench();
    b.location.set_last_known(at(&b, 52.0, 4.0));
    b.filter.update_location(&mut b.timers);
    b.filter.start_session(&mut b.timers);
    b.clock.advance(Duration::from_secs(31));
    // The timer is due but has not been dispatched yet
    let fix = at(&b, 52.0, 4.0);
    assert_eq!(
        b.filter.on_location_update(fix, &mut b.timers),
        Some(Verdict::Confirmed(ConfirmReason::SessionTimedOut))
    );
    assert_eq!(b.timers.pop_due(), None);
}

#[test]
fn timeout_without_fix_fails_open() {
    let mut b = bench();
    b.location.set_last_known(at(&b, 52.0, 4.0));
    b.filter.update_location(&mut b.timers);
    b.filter.start_session(&mut b.timers);
    b.clock.advance(Duration::from_secs(30));
    assert_eq!(b.timers.pop_due(), Some(TimerEvent::SessionTimeout));
    assert_eq!(
        b.filter.on_session_timeout(&mut b.timers),
        Some(Verdict::Confirmed(ConfirmReason::SessionTimedOut))
    );
    assert!(!b.location.is_subscribed());
    // Baseline survives a timeout
    assert!(b.filter.last_location().is_some());
    assert_eq!(b.filter.on_session_timeout(&mut b.timers), None);
}

#[test]
fn denied_subscription_opens_nothing() {
    let mut b = bench();
    b.location.set_last_known(at(&b, 52.0, 4.0));
    b.location.deny_subscriptions(Some("no permission".into()));
    b.filter.update_location(&mut b.timers);
    assert_eq!(
        b.filter.start_session(&mut b.timers),
        SessionStart::SubscriptionFailed
    );
    assert!(!b.filter.is_listening());
    assert_eq!(b.timers.pending(), 0);
}
