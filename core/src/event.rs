//! Events emitted by the engine, one batch per tick.
//!
//! Nothing consumes these inside the core. They exist so the host can log,
//! trace or forward what a tick did without diffing the surface.

use crate::{
    layout::SegmentRef,
    types::{CardId, Tick},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashEvent {
    // ── Mount ─────────────────────────────────────
    DashboardMounted {
        cards: usize,
        segments: usize,
    },

    // ── Tick lifecycle ────────────────────────────
    TickStarted {
        tick: Tick,
        at: DateTime<Utc>,
    },
    TickCompleted {
        tick: Tick,
        rendered: usize,
    },

    // ── Per card ──────────────────────────────────
    CardInitialized {
        tick: Tick,
        card_id: CardId,
    },
    CardRendered {
        tick: Tick,
        card_id: CardId,
        time_label: String,
        utc_label: String,
        is_day: bool,
        red_time: bool,
    },
    CardSkipped {
        tick: Tick,
        card_id: CardId,
    },

    // ── Decoration ────────────────────────────────
    ReferenceMirrored {
        tick: Tick,
        segment: SegmentRef,
    },
}

impl DashEvent {
    /// Stable snake_case name, identical to the serialized `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            DashEvent::DashboardMounted { .. }  => "dashboard_mounted",
            DashEvent::TickStarted { .. }       => "tick_started",
            DashEvent::TickCompleted { .. }     => "tick_completed",
            DashEvent::CardInitialized { .. }   => "card_initialized",
            DashEvent::CardRendered { .. }      => "card_rendered",
            DashEvent::CardSkipped { .. }       => "card_skipped",
            DashEvent::ReferenceMirrored { .. } => "reference_mirrored",
        }
    }
}
