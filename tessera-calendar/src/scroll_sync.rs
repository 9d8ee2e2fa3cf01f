//! Keeps the "current month" in step with the scroll position.
//!
//! ## Usage
//!
//! Feed every scroll sample through [`ScrollSync::sync`] to derive which month
//! block sits at the top of the visible band, and route programmatic scrolls
//! through [`ScrollSync::plan_application`] so repeated offsets still land.
use smallvec::{SmallVec, smallvec};
use tracing::trace;

/// How a navigation offset is pushed to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ScrollApplyPolicy {
    /// Re-apply the previous offset before a new one, for scroll primitives
    /// that drop consecutive or coalesced requests.
    #[default]
    Reapply,
    /// Apply the new offset once.
    Direct,
}

/// Result of a passive sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The current month moved to this index.
    Changed(usize),
    /// The current month is still this index.
    Unchanged(usize),
    /// The list is scrolled although its content fits the viewport, i.e. the
    /// sample is elastic bounce; it is ignored.
    Overshoot,
    /// No month overlaps the band.
    NoMatch,
    /// The sample was taken before a newer navigation and was dropped.
    Stale,
}

/// Scroll-derived state of the month list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollSync {
    current: Option<usize>,
    raw_offset: f32,
    last_applied: Option<f32>,
    policy: ScrollApplyPolicy,
}

impl ScrollSync {
    /// Creates the sync state with no current month.
    pub fn new(policy: ScrollApplyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Index of the current month, once a sync has matched.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Offset of the last accepted sample.
    pub fn raw_offset(&self) -> f32 {
        self.raw_offset
    }

    /// Offset most recently pushed by a navigation.
    pub fn last_applied(&self) -> Option<f32> {
        self.last_applied
    }

    /// Returns the offset application policy.
    pub fn policy(&self) -> ScrollApplyPolicy {
        self.policy
    }

    /// Changes the offset application policy.
    pub fn set_policy(&mut self, policy: ScrollApplyPolicy) {
        self.policy = policy;
    }

    /// Forgets the current month, e.g. after the month list was rebuilt.
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Derives the current month from a scroll sample.
    ///
    /// `heights` are the rendered heights of the month blocks in list order.
    pub fn sync(&mut self, offset: f32, viewport_height: f32, heights: &[f32]) -> SyncOutcome {
        let total: f32 = heights.iter().sum();
        let band_top = offset;
        let band_bottom = offset + viewport_height;
        // Content that fits the viewport cannot legitimately scroll, so any
        // positive offset there is elastic bounce.
        if offset > 0.0 && band_bottom > total && total <= viewport_height {
            trace!("Scroll overshoot at {offset} (band ends {band_bottom}, content {total})");
            return SyncOutcome::Overshoot;
        }

        self.raw_offset = offset;
        let mut top = 0.0;
        for (index, height) in heights.iter().enumerate() {
            let bottom = top + height;
            if top < band_bottom && bottom > band_top {
                if self.current == Some(index) {
                    return SyncOutcome::Unchanged(index);
                }
                self.current = Some(index);
                return SyncOutcome::Changed(index);
            }
            top = bottom;
        }
        SyncOutcome::NoMatch
    }

    /// Returns the offsets to push to the viewport, in order, to reach
    /// `target`, and records `target` as applied.
    pub fn plan_application(&mut self, target: f32) -> SmallVec<[f32; 2]> {
        let plan = match (self.policy, self.last_applied) {
            (ScrollApplyPolicy::Reapply, Some(previous)) if previous != target => {
                smallvec![previous, target]
            }
            _ => smallvec![target],
        };
        self.last_applied = Some(target);
        plan
    }
}

/// Container scroll offset that brings an item to the top of the viewport.
///
/// `item_top` and `container_top` share one coordinate space; `current_scroll`
/// is the container offset at the time both were measured.
pub fn navigation_offset(item_top: f32, container_top: f32, current_scroll: f32) -> f32 {
    item_top - container_top + current_scroll
}
