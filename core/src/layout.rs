//! Bar segment layout — decorative labelled chips laid over the card grid.
//!
//! Each group is a row of chips inserted in front of one card. A group's
//! column spans must fill exactly one grid row.

use crate::error::{ClockError, ClockResult};
use serde::{Deserialize, Serialize};

/// Width of the card grid in columns.
pub const GRID_COLUMNS: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentGroup {
    /// Index of the card the chips are inserted in front of.
    pub before: usize,
    pub spans:  Vec<u8>,
    /// One label per span. Missing labels render as empty chips.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Addresses one chip: zero-based group and segment index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentRef {
    pub group:   usize,
    pub segment: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentPlacement {
    pub at:          SegmentRef,
    pub before_card: usize,
    pub span:        u8,
    pub label:       String,
    pub role:        &'static str,
    pub aria_label:  String,
}

impl SegmentGroup {
    fn validate(&self, group: usize, columns: u8) -> ClockResult<()> {
        let total: u32 = self.spans.iter().map(|s| u32::from(*s)).sum();
        if self.spans.contains(&0) {
            return Err(ClockError::Layout { group, reason: "zero-width span".into() });
        }
        if total != u32::from(columns) {
            return Err(ClockError::Layout {
                group,
                reason: format!("spans sum to {total}, grid has {columns} columns"),
            });
        }
        if self.labels.len() > self.spans.len() {
            return Err(ClockError::Layout {
                group,
                reason: format!("{} labels for {} spans", self.labels.len(), self.spans.len()),
            });
        }
        Ok(())
    }
}

/// Validate every group up front, without regard to how many cards exist.
pub fn validate_groups(groups: &[SegmentGroup], columns: u8) -> ClockResult<()> {
    groups
        .iter()
        .enumerate()
        .try_for_each(|(gi, g)| g.validate(gi, columns))
}

/// `at` must name a declared chip. Whether it is placed still depends on
/// the card count.
pub fn check_segment_ref(groups: &[SegmentGroup], at: SegmentRef) -> ClockResult<()> {
    let group = groups.get(at.group).ok_or_else(|| ClockError::Layout {
        group:  at.group,
        reason: format!("no such bar group; {} declared", groups.len()),
    })?;
    if at.segment >= group.spans.len() {
        return Err(ClockError::Layout {
            group:  at.group,
            reason: format!("no segment {} in a group of {}", at.segment, group.spans.len()),
        });
    }
    Ok(())
}

/// Plan chip placements for a grid holding `card_count` cards.
///
/// Groups whose anchor card does not exist are skipped, not rejected:
/// a shorter registry simply shows fewer bars.
pub fn plan_segments(
    groups: &[SegmentGroup],
    card_count: usize,
    columns: u8,
) -> ClockResult<Vec<SegmentPlacement>> {
    validate_groups(groups, columns)?;

    let mut placements = Vec::new();
    for (gi, group) in groups.iter().enumerate() {
        if group.before >= card_count {
            log::warn!(
                "bar group {} anchored before card {} but only {card_count} cards exist; skipped",
                gi + 1,
                group.before
            );
            continue;
        }
        for (si, span) in group.spans.iter().enumerate() {
            placements.push(SegmentPlacement {
                at:          SegmentRef { group: gi, segment: si },
                before_card: group.before,
                span:        *span,
                label:       group.labels.get(si).cloned().unwrap_or_default(),
                role:        "group",
                aria_label:  format!("Bar {} Segment {}", gi + 1, si + 1),
            });
        }
    }
    Ok(placements)
}

/// The four bars of the stock dashboard: one per row of nine cards.
pub fn default_segment_groups() -> Vec<SegmentGroup> {
    fn group(before: usize, spans: &[u8], labels: &[&str]) -> SegmentGroup {
        SegmentGroup {
            before,
            spans:  spans.to_vec(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    vec![
        group(0, &[3, 3, 1, 1, 1], &[
            "Mexico&CAM cluster", "SAM Cluster", "NAM Cluster", "Brazil", "UKI Cluster",
        ]),
        group(9, &[2, 1, 1, 2, 3], &[
            "Iberia Region", "Belgium/Luxembourg", "DACH Region", "France&Italy Cluster", "Nordics",
        ]),
        group(18, &[2, 2, 1, 1, 1, 2], &[
            "NEA Cluster", "SEE Region", "Saudi & Bahrain", "Baltics", "Gulf Cluster",
            "Central Asia(Sub Cluster)",
        ]),
        group(27, &[1, 2, 3, 1, 2], &[
            "India", "Indonesia,Thailan,Vietnam", "East Asian Countries", "Japan& Korea",
            "Pacific Cluster",
        ]),
    ]
}
