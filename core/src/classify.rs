//! Day/night and weekend/red-time classification.
//!
//! RULES (boundaries are exact and must not be reinterpreted):
//!   - is_day:     06:00 <= local time < 18:00
//!   - is_weekend: local weekday is in the card's weekend-day set
//!   - red_time:   is_weekend, or local hour >= 17, or local hour < 8
//!
//! All three are derived from ONE conversion of the instant into the zone.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const DAY_START_HOUR:  u32 = 6;
pub const DAY_END_HOUR:    u32 = 18;
pub const WORK_START_HOUR: u32 = 8;
pub const WORK_END_HOUR:   u32 = 17;

/// A set of weekdays, stored as a 7-bit mask (bit 0 = Monday).
/// Serialises as a list of short weekday names: `["Fri", "Sat"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct WeekendDays(u8);

impl WeekendDays {
    /// Saturday and Sunday.
    pub const DEFAULT: WeekendDays = WeekendDays(bit(Weekday::Sat) | bit(Weekday::Sun));
    /// Friday and Saturday, as observed across the Gulf states.
    pub const FRI_SAT: WeekendDays = WeekendDays(bit(Weekday::Fri) | bit(Weekday::Sat));

    pub fn from_days(days: &[Weekday]) -> Self {
        Self(days.iter().fold(0, |mask, d| mask | bit(*d)))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    /// Days in Monday-first order.
    pub fn days(&self) -> Vec<Weekday> {
        WEEK.into_iter().filter(|d| self.contains(*d)).collect()
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu,
    Weekday::Fri, Weekday::Sat, Weekday::Sun,
];

const fn bit(day: Weekday) -> u8 {
    match day {
        Weekday::Mon => 1 << 0,
        Weekday::Tue => 1 << 1,
        Weekday::Wed => 1 << 2,
        Weekday::Thu => 1 << 3,
        Weekday::Fri => 1 << 4,
        Weekday::Sat => 1 << 5,
        Weekday::Sun => 1 << 6,
    }
}

impl Default for WeekendDays {
    fn default() -> Self { Self::DEFAULT }
}

impl From<Vec<Weekday>> for WeekendDays {
    fn from(days: Vec<Weekday>) -> Self { Self::from_days(&days) }
}

impl From<WeekendDays> for Vec<Weekday> {
    fn from(set: WeekendDays) -> Self { set.days() }
}

/// The classifier's output for one card at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Zone-local hour, 0–23.
    pub hour:       u32,
    pub weekday:    Weekday,
    pub is_day:     bool,
    pub is_weekend: bool,
    pub red_time:   bool,
}

/// Classify `instant` for a card in `tz` with the given weekend days.
pub fn classify(instant: DateTime<Utc>, tz: Tz, weekend: WeekendDays) -> Classification {
    let local = instant.with_timezone(&tz);
    classify_local(local.hour(), local.weekday(), weekend)
}

/// The rule table itself, on already-converted local fields.
pub fn classify_local(hour: u32, weekday: Weekday, weekend: WeekendDays) -> Classification {
    let is_day = (DAY_START_HOUR..DAY_END_HOUR).contains(&hour);
    let is_weekend = weekend.contains(weekday);
    let red_time = is_weekend || hour >= WORK_END_HOUR || hour < WORK_START_HOUR;

    Classification { hour, weekday, is_day, is_weekend, red_time }
}
