//! Plank sack estimation.
//!
//! The sack cannot be inspected directly, so its contents are tracked as an
//! estimate that is either a count in `0..=SACK_CAPACITY` or unknown. Updates
//! come from three sources, in decreasing order of authority:
//!
//! 1. explicit reports from chat (check output, "full", "empty"),
//! 2. inventory deltas observed around a sack interaction,
//! 3. deductions when a build consumes planks the inventory did not hold.
//!
//! Inferred updates never invent a count: while the estimate is unknown they
//! are skipped.
use serde::{Deserialize, Serialize};

use crate::constants::{SACK_CAPACITY, UNKNOWN_ESTIMATE};
use crate::inventory::{self, InventorySnapshot};

/// Estimated sack contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum PlankEstimate {
    #[default]
    Unknown,
    Known(u8),
}

impl PlankEstimate {
    /// Build a known estimate, clamping into the sack's range.
    #[must_use]
    pub fn known(count: i32) -> Self {
        let clamped = count.clamp(0, i32::from(SACK_CAPACITY));
        Self::Known(u8::try_from(clamped).unwrap_or(SACK_CAPACITY))
    }

    #[must_use]
    pub const fn count(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::Known(count) => Some(count),
        }
    }

    #[must_use]
    pub const fn is_known(self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Persisted form: the count, or `-1` when unknown.
    #[must_use]
    pub fn encode(self) -> i32 {
        self.count().map_or(UNKNOWN_ESTIMATE, i32::from)
    }

    /// Decode a persisted value. Any negative value is unknown; larger values
    /// are clamped to capacity.
    #[must_use]
    pub fn decode(raw: i32) -> Self {
        if raw < 0 {
            Self::Unknown
        } else {
            Self::known(raw)
        }
    }
}

impl From<i32> for PlankEstimate {
    fn from(value: i32) -> Self {
        Self::decode(value)
    }
}

impl From<PlankEstimate> for i32 {
    fn from(value: PlankEstimate) -> Self {
        value.encode()
    }
}

impl std::fmt::Display for PlankEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Known(count) => write!(f, "{count}"),
        }
    }
}

/// Baseline captured when a sack interaction is recognized.
///
/// `before` is `None` when the inventory was unavailable at arming time; the
/// comparison is still consumed, it just yields nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingComparison {
    before: Option<InventorySnapshot>,
}

/// Single owner of the sack estimate.
#[derive(Debug, Clone, Default)]
pub struct SackEstimator {
    estimate: PlankEstimate,
    pending: Option<PendingComparison>,
}

impl SackEstimator {
    #[must_use]
    pub fn new(estimate: PlankEstimate) -> Self {
        Self {
            estimate,
            pending: None,
        }
    }

    #[must_use]
    pub const fn estimate(&self) -> PlankEstimate {
        self.estimate
    }

    /// Replace the estimate with a persisted value (login, start-up).
    pub fn restore(&mut self, estimate: PlankEstimate) {
        self.estimate = estimate;
    }

    /// Authoritative total from a sack report.
    pub fn set_authoritative(&mut self, total: i32) -> PlankEstimate {
        self.estimate = PlankEstimate::known(total);
        log::debug!("sack estimate set from report: {}", self.estimate);
        self.estimate
    }

    pub fn set_full(&mut self) -> PlankEstimate {
        self.set_authoritative(i32::from(SACK_CAPACITY))
    }

    pub fn set_empty(&mut self) -> PlankEstimate {
        self.set_authoritative(0)
    }

    /// Shift a known estimate by `delta`, clamped to the sack's range.
    ///
    /// `delta` is positive when planks moved from the inventory into the sack.
    /// Returns `None` and leaves the estimate untouched when it is unknown.
    pub fn apply_inferred_delta(&mut self, delta: i32) -> Option<PlankEstimate> {
        let current = self.estimate.count()?;
        self.estimate = PlankEstimate::known(i32::from(current).saturating_add(delta));
        log::debug!("sack estimate shifted by {delta}: {}", self.estimate);
        Some(self.estimate)
    }

    /// Remove planks a build drew from the sack.
    ///
    /// Skipped when the estimate is unknown or nothing is needed; never drops
    /// below zero.
    pub fn deduct_for_build(&mut self, needed: i32) -> Option<PlankEstimate> {
        let current = self.estimate.count()?;
        if needed <= 0 {
            return None;
        }
        self.estimate = PlankEstimate::known(i32::from(current).saturating_sub(needed));
        log::debug!("sack estimate reduced by {needed} for a build: {}", self.estimate);
        Some(self.estimate)
    }

    /// Arm the one-shot comparison with the inventory as it is now.
    pub fn arm_comparison(&mut self, before: Option<InventorySnapshot>) {
        self.pending = Some(PendingComparison { before });
    }

    /// Drop any armed comparison without applying it.
    pub fn cancel_comparison(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub const fn is_comparison_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the armed comparison against the inventory after the action.
    ///
    /// The comparison is cleared whether or not it produced an update.
    pub fn resolve_comparison(&mut self, after: Option<&InventorySnapshot>) -> Option<PlankEstimate> {
        let pending = self.pending.take()?;
        let before = pending.before?;
        let after = after?;
        // Planks leaving the inventory went into the sack.
        let moved_into_sack = inventory::delta(after, &before);
        self.apply_inferred_delta(moved_into_sack)
    }
}
