//! worldclock-core — a grid of region cards showing local time, UTC offset,
//! date and off-hours highlighting, repainted once per second.

pub mod classify;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod format;
pub mod layout;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod types;
