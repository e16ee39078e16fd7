//! Card registry — the fixed set of cards the dashboard paints.
//!
//! Built once before the first tick. Zones are parsed and weekend sets
//! resolved here, so the per-tick path never fails and never looks at
//! display text. The only per-card mutable state is `initialized`.

use crate::{
    classify::WeekendDays,
    config::{CardConfig, NameMarker, WeekendConfig},
    error::{ClockError, ClockResult},
    format::parse_zone,
    types::{CardId, ZoneName},
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id:         CardId,
    pub name:       String,
    pub time_zone:  Option<ZoneName>,
    pub flag_codes: Vec<String>,
}

impl From<&CardConfig> for Card {
    fn from(c: &CardConfig) -> Self {
        Self {
            id:         c.id.clone(),
            name:       c.name.clone(),
            time_zone:  c.time_zone.clone(),
            flag_codes: c.flags.clone(),
        }
    }
}

/// Weekend-day resolution: explicit per-card entries first, then name
/// markers in declaration order, then the default set.
#[derive(Debug, Clone, Default)]
pub struct WeekendPolicy {
    default: WeekendDays,
    by_id:   BTreeMap<CardId, WeekendDays>,
    markers: Vec<NameMarker>,
}

impl WeekendPolicy {
    pub fn from_config(config: &WeekendConfig) -> Self {
        Self {
            default: config.default_days,
            by_id:   config.overrides.iter().map(|o| (o.card_id.clone(), o.days)).collect(),
            markers: config.name_markers.clone(),
        }
    }

    pub fn resolve(&self, card: &Card) -> WeekendDays {
        if let Some(days) = self.by_id.get(&card.id) {
            return *days;
        }
        self.markers
            .iter()
            .find(|m| card.name.contains(m.contains.as_str()))
            .map(|m| m.days)
            .unwrap_or(self.default)
    }
}

#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub card:         Card,
    /// `None` when the card has no zone configured.
    pub tz:           Option<Tz>,
    pub weekend:      WeekendDays,
    pub is_reference: bool,
    initialized:      bool,
}

impl RegistryEntry {
    pub fn is_initialized(&self) -> bool { self.initialized }

    pub(crate) fn mark_initialized(&mut self) { self.initialized = true; }
}

#[derive(Debug, Clone, Default)]
pub struct CardRegistry {
    entries: Vec<RegistryEntry>,
}

impl CardRegistry {
    /// Build the registry, failing fast on an unknown zone or duplicate id.
    pub fn build(
        cards: &[CardConfig],
        policy: &WeekendPolicy,
        reference_zone: &str,
    ) -> ClockResult<Self> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(cards.len());

        for config in cards {
            if !seen.insert(config.id.as_str()) {
                return Err(ClockError::DuplicateCard { id: config.id.clone() });
            }
            let card = Card::from(config);
            let zone = card.time_zone.as_deref().map(str::trim).filter(|z| !z.is_empty());
            let tz = zone.map(parse_zone).transpose()?;
            let is_reference = zone == Some(reference_zone);
            let weekend = policy.resolve(&card);

            entries.push(RegistryEntry { card, tz, weekend, is_reference, initialized: false });
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut RegistryEntry> {
        self.entries.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.card.id == id)
    }
}

/// Split `"sa, bh,,"` into `["sa", "bh"]`.
pub fn parse_flag_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand a `{code}` URL template.
pub fn flag_url(template: &str, code: &str) -> String {
    template.replace("{code}", code)
}
