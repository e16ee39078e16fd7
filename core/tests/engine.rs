//! Engine and scheduler tests — full ticks against the in-memory surface.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::time::Duration;
use worldclock_core::{
    clock::{FixedTimeSource, SteppingTimeSource, TimeSource},
    config::DashboardConfig,
    engine::DashboardEngine,
    error::ClockError,
    event::DashEvent,
    layout::SegmentRef,
    render::{MemorySurface, TIME_PLACEHOLDER},
    scheduler::Scheduler,
};

/// Friday 2025-08-22, 09:00 UTC.
fn friday_morning_utc() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 22, 9, 0, 0).unwrap()
}

fn build() -> DashboardEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    DashboardEngine::build_test().expect("build test engine")
}

fn rendered(events: &[DashEvent], id: &str) -> Option<(bool, bool)> {
    events.iter().find_map(|e| match e {
        DashEvent::CardRendered { card_id, is_day, red_time, .. } if card_id == id => {
            Some((*is_day, *red_time))
        }
        _ => None,
    })
}

#[test]
fn one_tick_renders_every_zoned_card() {
    let mut engine = build();
    let mut surface = MemorySurface::new();

    let events = engine.tick(friday_morning_utc(), &mut surface);

    assert_eq!(engine.clock.current_tick, 1);
    assert_eq!(engine.clock.last_instant, Some(friday_morning_utc()));
    assert!(matches!(events.first(), Some(DashEvent::DashboardMounted { cards: 7, .. })));
    assert!(matches!(events.last(), Some(DashEvent::TickCompleted { tick: 1, rendered: 6 })));
    assert_eq!(surface.updates, 6);

    //                          (is_day, red_time)
    assert_eq!(rendered(&events, "us-east"),       Some((false, true)),  "05:00 Fri in New York");
    assert_eq!(rendered(&events, "uk-ireland"),    Some((true,  false)), "10:00 Fri in London");
    assert_eq!(rendered(&events, "saudi-bahrain"), Some((true,  true)),  "Friday is weekend in Riyadh");
    assert_eq!(rendered(&events, "gulf"),          Some((true,  true)),  "Friday is weekend in Dubai");
    assert_eq!(rendered(&events, "india"),         Some((true,  false)), "14:30 Fri in Kolkata");
    assert_eq!(rendered(&events, "japan-korea"),   Some((false, true)),  "18:00 Fri in Tokyo");
    assert_eq!(rendered(&events, "hq"), None);
}

#[test]
fn surface_receives_labels_and_styles() {
    let mut engine = build();
    let mut surface = MemorySurface::new();
    engine.tick(friday_morning_utc(), &mut surface);

    let india = surface.card("india").expect("india frame");
    let labels = india.labels.as_ref().unwrap();
    assert_eq!(labels.time, "02:30 PM");
    assert_eq!(labels.utc, "UTC+05:30");
    assert_eq!(labels.date, "Fri,Aug 22,2025");
    let style = india.style.as_ref().unwrap();
    assert_eq!(style.background, "#008000");
    assert_eq!(style.text_color, "white");
    assert_eq!(style.time_color.as_deref(), Some("white"));

    let tokyo = surface.card("japan-korea").unwrap();
    let style = tokyo.style.as_ref().unwrap();
    assert_eq!(style.background, engine.config().palette.night_background);
    assert_eq!(style.time_color.as_deref(), Some("red"));
    assert_eq!(tokyo.labels.as_ref().unwrap().utc, "UTC+09:00");
}

#[test]
fn cards_are_initialised_exactly_once() {
    let mut engine = build();
    let mut surface = MemorySurface::new();

    let first = engine.tick(friday_morning_utc(), &mut surface);
    let inits = first.iter().filter(|e| matches!(e, DashEvent::CardInitialized { .. })).count();
    assert_eq!(inits, 7, "every card, zoned or not, gets static content");

    let source = FixedTimeSource(friday_morning_utc());
    engine.run_ticks(4, &source, &mut surface);
    assert_eq!(engine.clock.current_tick, 5);

    for (id, frame) in &surface.cards {
        assert_eq!(frame.inits, 1, "card {id} initialised {} times", frame.inits);
    }
    assert!(engine.registry().iter().all(|e| e.is_initialized()));
}

#[test]
fn zoneless_card_keeps_placeholders() {
    let mut engine = build();
    let mut surface = MemorySurface::new();
    let events = engine.tick(friday_morning_utc(), &mut surface);

    assert!(events.iter().any(|e| matches!(e, DashEvent::CardSkipped { card_id, .. } if card_id == "hq")));
    let hq = surface.card("hq").unwrap();
    assert_eq!(hq.labels.as_ref().unwrap().time, TIME_PLACEHOLDER);
    assert!(hq.style.is_none());
    assert_eq!(hq.content.as_ref().unwrap().name, "Headquarters");
    assert!(hq.content.as_ref().unwrap().flags.is_empty());
}

#[test]
fn mirror_segment_is_painted_every_tick() {
    let mut engine = build();
    let mut surface = MemorySurface::new();
    let mirror = SegmentRef { group: 3, segment: 0 };

    let events = engine.tick(friday_morning_utc(), &mut surface);
    assert!(events.contains(&DashEvent::ReferenceMirrored { tick: 1, segment: mirror }));

    let chip = surface.segment(mirror).expect("mirror chip inserted");
    assert_eq!(chip.placement.label, "India");
    let paint = chip.paint.as_ref().expect("mirror chip painted");
    assert_eq!(paint.background, "#008000");
    assert_eq!(paint.text_color, "white");

    // Night in Kolkata does not change the chip.
    let night = Utc.with_ymd_and_hms(2025, 8, 22, 20, 0, 0).unwrap();
    let events = engine.tick(night, &mut surface);
    assert!(events.contains(&DashEvent::ReferenceMirrored { tick: 2, segment: mirror }));
    assert_eq!(surface.segment(mirror).unwrap().paint.as_ref().unwrap().background, "#008000");

    let others_painted = surface.segments.iter().filter(|s| s.paint.is_some()).count();
    assert_eq!(others_painted, 1, "only the mirror chip is painted");
}

#[test]
fn segments_are_mounted_once() {
    let mut engine = build();
    let mut surface = MemorySurface::new();
    let source = FixedTimeSource(friday_morning_utc());
    engine.run_ticks(3, &source, &mut surface);

    assert!(engine.is_mounted());
    assert_eq!(surface.segments.len(), engine.placements().len());
    assert_eq!(surface.segments.len(), 21);
}

#[test]
fn tick_results_depend_only_on_the_instant() {
    let now = friday_morning_utc();
    let mut a = build();
    let mut b = build();
    let mut sa = MemorySurface::new();
    let mut sb = MemorySurface::new();

    // b renders a different instant first; its next frame must still match a's.
    b.tick(now + ChronoDuration::hours(7), &mut sb);
    a.tick(now, &mut sa);
    b.tick(now, &mut sb);

    for id in ["us-east", "uk-ireland", "saudi-bahrain", "gulf", "india", "japan-korea"] {
        assert_eq!(sa.card(id).unwrap().labels, sb.card(id).unwrap().labels, "card {id}");
        assert_eq!(sa.card(id).unwrap().style, sb.card(id).unwrap().style, "card {id}");
        assert_eq!(a.card_result(id, now), b.card_result(id, now), "card {id}");
    }
    assert!(a.card_result("hq", now).is_none());
    assert!(a.card_result("nope", now).is_none());
}

#[test]
fn walking_a_day_flips_day_and_red_states() {
    let mut engine = build();
    let mut surface = MemorySurface::new();
    // Wednesday 2025-08-20 00:00 UTC, one hour per tick.
    let start = Utc.with_ymd_and_hms(2025, 8, 20, 0, 0, 0).unwrap();
    let source = SteppingTimeSource::new(start, ChronoDuration::hours(1));

    let mut london = Vec::new();
    for _ in 0..24 {
        let events = engine.tick(source.now(), &mut surface);
        london.push(rendered(&events, "uk-ireland").unwrap());
    }

    // London is UTC+1 in August: local hour = utc hour + 1.
    for (utc_hour, (is_day, red)) in london.iter().enumerate() {
        let local = (utc_hour as u32 + 1) % 24;
        assert_eq!(*is_day, (6..18).contains(&local), "local {local}:00");
        assert_eq!(*red, !(8..17).contains(&local), "local {local}:00");
    }
}

#[test]
fn build_rejects_bad_reference_zone() {
    let mut config = DashboardConfig::default_test();
    config.reference.time_zone = "Asia/Atlantis".into();
    assert!(DashboardEngine::build(config).is_err());
}

#[test]
fn scheduler_ticks_until_stopped() {
    let mut engine = build();
    let mut surface = MemorySurface::new();
    let scheduler = Scheduler::new(Duration::ZERO);
    let stop = scheduler.stop_handle();
    let source = FixedTimeSource(friday_morning_utc());

    let mut seen = Vec::new();
    let ticks = scheduler.start(&mut engine, &mut surface, &source, |engine, _surface, events| {
        seen.push(events.len());
        if engine.clock.current_tick == 3 {
            stop.stop();
        }
    });

    assert_eq!(ticks, 3);
    assert_eq!(seen.len(), 3);
    assert_eq!(engine.clock.current_tick, 3);
    assert!(!scheduler.is_running());
    assert!(seen[0] > seen[1], "first tick also mounts and initialises");
    assert_eq!(seen[1], seen[2]);
}

#[test]
fn scheduler_keeps_its_period() {
    let mut engine = build();
    let mut surface = MemorySurface::new();
    let period = Duration::from_millis(20);
    let scheduler = Scheduler::new(period);
    let stop = scheduler.stop_handle();
    let source = FixedTimeSource(friday_morning_utc());

    let started = std::time::Instant::now();
    scheduler.start(&mut engine, &mut surface, &source, |engine, _, _| {
        if engine.clock.current_tick == 4 {
            stop.stop();
        }
    });

    // First tick is immediate, then three periods.
    assert!(started.elapsed() >= period * 3, "elapsed {:?}", started.elapsed());
    assert_eq!(scheduler.period(), period);
}

#[test]
fn build_rejects_mirror_outside_declared_groups() {
    let mut config = DashboardConfig::default_test();
    config.reference.mirror = SegmentRef { group: 7, segment: 0 };
    assert!(matches!(
        DashboardEngine::build(config),
        Err(ClockError::Layout { group: 7, .. })
    ));

    let mut config = DashboardConfig::default_test();
    config.reference.mirror = SegmentRef { group: 3, segment: 9 };
    assert!(matches!(
        DashboardEngine::build(config),
        Err(ClockError::Layout { group: 3, .. })
    ));
}

#[test]
fn stop_before_start_is_not_lost() {
    let mut engine = build();
    let mut surface = MemorySurface::new();
    let scheduler = Scheduler::new(Duration::ZERO);
    let stop = scheduler.stop_handle();
    let source = FixedTimeSource(friday_morning_utc());

    stop.stop();
    let mut calls = 0;
    let ticks = scheduler.start(&mut engine, &mut surface, &source, |engine, _, _| {
        calls += 1;
        // Backstop so a lost stop cannot hang the test.
        if engine.clock.current_tick >= 5 {
            stop.stop();
        }
    });

    assert_eq!(ticks, 0, "a stop issued before start must hold");
    assert_eq!(calls, 0);
    assert_eq!(engine.clock.current_tick, 0);
    assert!(!scheduler.is_running());
    assert!(surface.cards.is_empty(), "nothing rendered");
}

#[test]
fn overrunning_tick_neither_bursts_nor_stalls() {
    let mut engine = build();
    let mut surface = MemorySurface::new();
    let period = Duration::from_millis(40);
    let overrun = Duration::from_millis(100);
    let scheduler = Scheduler::new(period);
    let stop = scheduler.stop_handle();
    let source = FixedTimeSource(friday_morning_utc());

    let mut fired = Vec::new();
    scheduler.start(&mut engine, &mut surface, &source, |engine, _, _| {
        fired.push(std::time::Instant::now());
        match engine.clock.current_tick {
            1 => std::thread::sleep(overrun),
            4 => stop.stop(),
            _ => {}
        }
    });

    assert_eq!(fired.len(), 4);
    let after_overrun = fired[1] - fired[0];
    assert!(after_overrun >= overrun, "gap {after_overrun:?}");
    assert!(
        after_overrun < overrun + period / 2,
        "tick after an overrun fires at once, gap {after_overrun:?}"
    );
    for pair in fired[1..].windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= period / 2, "missed deadlines are not made up in a burst, gap {gap:?}");
    }
}

#[test]
fn scheduler_defaults_to_one_second() {
    assert_eq!(Scheduler::default().period(), Duration::from_secs(1));
    let engine = build();
    assert_eq!(Scheduler::for_engine(&engine).period(), Duration::from_secs(1));
}
