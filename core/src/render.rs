//! Style/content application — the boundary with the rendering surface.
//!
//! The core never draws. It computes strings and style values and hands
//! them to a `RenderSurface`. `MemorySurface` keeps the latest frame in
//! memory; the runner prints it and the tests inspect it.

use crate::{
    classify::{classify, Classification, WeekendDays},
    config::{Palette, ReferenceRegion},
    format::{date_label, time_label, utc_label},
    layout::{SegmentPlacement, SegmentRef},
    registry::{flag_url, Card},
    types::CardId,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

pub const TIME_PLACEHOLDER: &str = "--:--";
pub const UTC_PLACEHOLDER:  &str = "UTC--";
pub const DATE_PLACEHOLDER: &str = "---";

/// Everything the dashboard shows for one card at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickResult {
    pub time_label: String,
    pub utc_label:  String,
    pub date_label: String,
    #[serde(flatten)]
    pub class:      Classification,
}

impl TickResult {
    pub fn compute(instant: DateTime<Utc>, tz: Tz, weekend: WeekendDays) -> Self {
        Self {
            time_label: time_label(instant, tz),
            utc_label:  utc_label(instant, tz),
            date_label: date_label(instant, tz),
            class:      classify(instant, tz, weekend),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardLabels {
    pub time: String,
    pub utc:  String,
    pub date: String,
}

/// Style values for one card. `None` means "leave the surface default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardStyle {
    pub time_color: Option<String>,
    pub background: String,
    pub text_color: String,
}

/// Colour pair painted onto a bar chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentPaint {
    pub background: String,
    pub text_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagImage {
    pub src:  String,
    pub alt:  String,
    pub lazy: bool,
}

/// Static content written once, the first time a card is seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardContent {
    pub flags:  Vec<FlagImage>,
    pub name:   String,
    pub labels: CardLabels,
}

/// The rendering collaborator. Implementations must tolerate repeated
/// identical calls; every tick repaints everything.
pub trait RenderSurface {
    fn init_card(&mut self, card: &CardId, content: &CardContent);

    fn update_card(&mut self, card: &CardId, labels: &CardLabels, style: &CardStyle);

    /// Replace all bar chips with `placements`.
    fn insert_segments(&mut self, placements: &[SegmentPlacement]);

    /// Paint one chip. A chip that was never inserted is ignored.
    fn paint_segment(&mut self, at: SegmentRef, paint: &SegmentPaint);
}

pub fn card_content(card: &Card, flag_url_template: &str) -> CardContent {
    CardContent {
        flags: card
            .flag_codes
            .iter()
            .map(|code| FlagImage {
                src:  flag_url(flag_url_template, code),
                alt:  format!("{} flag", code.to_uppercase()),
                lazy: true,
            })
            .collect(),
        name: card.name.clone(),
        labels: CardLabels {
            time: TIME_PLACEHOLDER.into(),
            utc:  UTC_PLACEHOLDER.into(),
            date: DATE_PLACEHOLDER.into(),
        },
    }
}

pub fn card_labels(result: &TickResult) -> CardLabels {
    CardLabels {
        time: result.time_label.clone(),
        utc:  result.utc_label.clone(),
        date: result.date_label.clone(),
    }
}

/// Styling rules:
///   - time text: red on red time, else the reference text colour on the
///     reference card, else untouched;
///   - card: reference colours on the reference card, else day theme or
///     night gradient.
pub fn card_style(
    class: &Classification,
    is_reference: bool,
    reference: &ReferenceRegion,
    palette: &Palette,
) -> CardStyle {
    let time_color = if class.red_time {
        Some(palette.red_text.clone())
    } else if is_reference {
        Some(reference.text_color.clone())
    } else {
        None
    };

    let (background, text_color) = if is_reference {
        (&reference.color, &reference.text_color)
    } else if class.is_day {
        (&palette.day_background, &palette.day_text)
    } else {
        (&palette.night_background, &palette.night_text)
    };

    CardStyle {
        time_color,
        background: background.clone(),
        text_color: text_color.clone(),
    }
}

pub fn reference_paint(reference: &ReferenceRegion) -> SegmentPaint {
    SegmentPaint {
        background: reference.color.clone(),
        text_color: reference.text_color.clone(),
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CardFrame {
    pub content: Option<CardContent>,
    pub labels:  Option<CardLabels>,
    pub style:   Option<CardStyle>,
    /// Number of times content was initialised; anything above 1 is a bug.
    pub inits:   u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentFrame {
    pub placement: SegmentPlacement,
    pub paint:     Option<SegmentPaint>,
}

/// In-memory surface holding the latest state of every card and chip.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemorySurface {
    pub cards:    BTreeMap<CardId, CardFrame>,
    /// In insertion order.
    pub segments: Vec<SegmentFrame>,
    pub updates:  u64,
}

impl MemorySurface {
    pub fn new() -> Self { Self::default() }

    pub fn card(&self, id: &str) -> Option<&CardFrame> { self.cards.get(id) }

    pub fn segment(&self, at: SegmentRef) -> Option<&SegmentFrame> {
        self.segments.iter().find(|s| s.placement.at == at)
    }
}

impl RenderSurface for MemorySurface {
    fn init_card(&mut self, card: &CardId, content: &CardContent) {
        let frame = self.cards.entry(card.clone()).or_default();
        frame.content = Some(content.clone());
        frame.labels = Some(content.labels.clone());
        frame.inits += 1;
    }

    fn update_card(&mut self, card: &CardId, labels: &CardLabels, style: &CardStyle) {
        let frame = self.cards.entry(card.clone()).or_default();
        frame.labels = Some(labels.clone());
        frame.style = Some(style.clone());
        self.updates += 1;
    }

    fn insert_segments(&mut self, placements: &[SegmentPlacement]) {
        self.segments = placements
            .iter()
            .map(|p| SegmentFrame { placement: p.clone(), paint: None })
            .collect();
    }

    fn paint_segment(&mut self, at: SegmentRef, paint: &SegmentPaint) {
        if let Some(frame) = self.segments.iter_mut().find(|s| s.placement.at == at) {
            frame.paint = Some(paint.clone());
        }
    }
}
