//! Shared primitive types used across the dashboard.

/// A dashboard tick. One tick = one repaint of every card.
pub type Tick = u64;

/// A stable, unique identifier for a card. Never derived from display text.
pub type CardId = String;

/// An IANA time zone identifier as written in configuration.
pub type ZoneName = String;
