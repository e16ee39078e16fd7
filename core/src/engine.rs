//! The dashboard engine — one tick repaints every card.
//!
//! TICK ORDER (fixed):
//!   1. Mount bar segments, first tick only.
//!   2. For each card in registry order:
//!        a. write static content if the card has never been initialised;
//!        b. skip it if it has no zone;
//!        c. compute its TickResult and push labels + style to the surface.
//!   3. Paint the reference-mirror bar segment (unconditional).
//!
//! RULES:
//!   - A tick reads only the registry and the instant it was given.
//!   - Cards are independent; no card's output depends on another's.
//!   - Nothing on the tick path can fail. Bad config fails in build().

use crate::{
    clock::{DashClock, TimeSource},
    config::DashboardConfig,
    error::ClockResult,
    event::DashEvent,
    format::parse_zone,
    layout::{check_segment_ref, plan_segments, SegmentPlacement},
    registry::{CardRegistry, WeekendPolicy},
    render::{card_content, card_labels, card_style, reference_paint, RenderSurface, TickResult},
    types::Tick,
};
use chrono::{DateTime, Utc};
use std::time::Duration;

pub struct DashboardEngine {
    pub clock:  DashClock,
    config:     DashboardConfig,
    registry:   CardRegistry,
    placements: Vec<SegmentPlacement>,
    mounted:    bool,
}

impl DashboardEngine {
    /// Validate `config` and build the registry and bar layout.
    pub fn build(config: DashboardConfig) -> ClockResult<Self> {
        parse_zone(&config.reference.time_zone)?;

        let policy = WeekendPolicy::from_config(&config.weekend);
        let registry = CardRegistry::build(&config.cards, &policy, config.reference.time_zone.trim())?;
        let placements = plan_segments(&config.segment_groups, registry.len(), config.grid_columns)?;
        check_segment_ref(&config.segment_groups, config.reference.mirror)?;

        log::info!(
            "dashboard built: {} cards, {} bar segments, reference zone {}",
            registry.len(),
            placements.len(),
            config.reference.time_zone
        );

        Ok(Self {
            clock: DashClock::new(),
            config,
            registry,
            placements,
            mounted: false,
        })
    }

    /// Engine over `DashboardConfig::default_test()`.
    pub fn build_test() -> ClockResult<Self> {
        Self::build(DashboardConfig::default_test())
    }

    pub fn config(&self) -> &DashboardConfig { &self.config }

    pub fn registry(&self) -> &CardRegistry { &self.registry }

    pub fn placements(&self) -> &[SegmentPlacement] { &self.placements }

    pub fn is_mounted(&self) -> bool { self.mounted }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.config.tick_period_ms)
    }

    /// Insert bar segments. Idempotent: the surface replaces old chips.
    pub fn mount<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> DashEvent {
        surface.insert_segments(&self.placements);
        self.mounted = true;
        log::info!("mounted {} bar segments", self.placements.len());
        DashEvent::DashboardMounted {
            cards:    self.registry.len(),
            segments: self.placements.len(),
        }
    }

    /// What card `id` shows at `now`. `None` for unknown or zone-less cards.
    pub fn card_result(&self, id: &str, now: DateTime<Utc>) -> Option<TickResult> {
        let entry = self.registry.get(id)?;
        entry.tz.map(|tz| TickResult::compute(now, tz, entry.weekend))
    }

    /// Advance one tick and repaint everything.
    pub fn tick<S: RenderSurface + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        surface: &mut S,
    ) -> Vec<DashEvent> {
        let mut events = Vec::with_capacity(self.registry.len() + 4);
        if !self.mounted {
            events.push(self.mount(&mut *surface));
        }

        let tick = self.clock.advance(now);
        events.push(DashEvent::TickStarted { tick, at: now });

        let template = self.config.flag_url_template.as_str();
        let reference = &self.config.reference;
        let palette = &self.config.palette;
        let mut rendered = 0;

        for entry in self.registry.iter_mut() {
            if !entry.is_initialized() {
                surface.init_card(&entry.card.id, &card_content(&entry.card, template));
                events.push(DashEvent::CardInitialized { tick, card_id: entry.card.id.clone() });
                entry.mark_initialized();
            }

            let card_id = &entry.card.id;

            let Some(tz) = entry.tz else {
                events.push(DashEvent::CardSkipped { tick, card_id: card_id.clone() });
                continue;
            };

            let result = TickResult::compute(now, tz, entry.weekend);
            let style = card_style(&result.class, entry.is_reference, reference, palette);
            surface.update_card(card_id, &card_labels(&result), &style);
            rendered += 1;

            log::trace!(
                "tick={tick} card={card_id}: {} {} {} day={} red={}",
                result.time_label,
                result.utc_label,
                result.date_label,
                result.class.is_day,
                result.class.red_time
            );

            events.push(DashEvent::CardRendered {
                tick,
                card_id:    card_id.clone(),
                time_label: result.time_label,
                utc_label:  result.utc_label,
                is_day:     result.class.is_day,
                red_time:   result.class.red_time,
            });
        }

        // The mirror chip carries no card data; it is repainted every tick.
        surface.paint_segment(reference.mirror, &reference_paint(reference));
        events.push(DashEvent::ReferenceMirrored { tick, segment: reference.mirror });

        events.push(DashEvent::TickCompleted { tick, rendered });
        log::debug!("tick={tick} rendered {rendered}/{} cards", self.registry.len());
        events
    }

    /// Run n ticks back to back, reading the time from `source` each tick.
    /// Used for testing and fast-forward. Returns the final tick.
    pub fn run_ticks<S, T>(&mut self, n: u64, source: &T, surface: &mut S) -> Tick
    where
        S: RenderSurface + ?Sized,
        T: TimeSource + ?Sized,
    {
        for _ in 0..n {
            self.tick(source.now(), &mut *surface);
        }
        self.clock.current_tick
    }
}
