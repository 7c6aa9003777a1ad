//! Pose transition history and gesture sequence matching.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use hand_model::TimeMs;

use crate::catalog::{GestureId, GestureSpec, PoseId};

/// How long a pose transition stays visible to the matcher.
pub const RETENTION_MS: f64 = 5_000.0;

/// Extra slack past a step's gap bound before the backward scan gives up.
/// Entries inside the slack that don't match the step are skipped as noise;
/// entries past it end the search for that step.
const GAP_SLACK_MS: f64 = 500.0;

// ════════════════════════════════════════════════════════════════════════════
// PoseHistory
// ════════════════════════════════════════════════════════════════════════════

/// One logged pose transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistoryEntry {
    pub t: TimeMs,
    pub pose_id: PoseId,
}

/// Append-only, time-pruned log of pose *transitions* — one entry per pose
/// change, not one per frame.  This is the only cross-frame state feeding
/// the matcher; gestures rely on the inter-pose ordering it preserves, so
/// it is a single ordered log rather than anything keyed by pose.
#[derive(Debug, Default)]
pub struct PoseHistory {
    entries: VecDeque<HistoryEntry>,
}

impl PoseHistory {
    pub fn new() -> Self {
        PoseHistory::default()
    }

    /// Log the frame's classified pose.
    ///
    /// Appends only when the pose differs from the most recent entry, then
    /// prunes everything older than the retention window.  `None` (tracking
    /// loss or no qualifying pose) is a no-op, so prior context survives
    /// brief gaps.
    pub fn record(&mut self, now: TimeMs, pose_id: Option<PoseId>) {
        let Some(pose_id) = pose_id else { return };

        if self.entries.back().map(|e| e.pose_id) == Some(pose_id) {
            return;
        }
        self.entries.push_back(HistoryEntry { t: now, pose_id });

        while let Some(front) = self.entries.front() {
            if now - front.t >= RETENTION_MS {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&HistoryEntry> {
        self.entries.get(idx)
    }

    /// Oldest-first view, for debug overlays.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SequenceMatcher
// ════════════════════════════════════════════════════════════════════════════

/// Matches the trailing pose history against the gesture catalog.
///
/// Gestures are held longest-first (the registry orders them at build time)
/// so a compound gesture beats a prefix-matching simple one.  At most one
/// gesture triggers per call.
pub struct SequenceMatcher {
    specs: Vec<GestureSpec>,
    history: PoseHistory,
    last_trigger: HashMap<GestureId, TimeMs>,
}

impl SequenceMatcher {
    pub(crate) fn new(specs: Vec<GestureSpec>) -> Self {
        SequenceMatcher {
            specs,
            history: PoseHistory::new(),
            last_trigger: HashMap::new(),
        }
    }

    /// Feed the current frame's classified pose into the history log.
    pub fn record(&mut self, now: TimeMs, pose_id: Option<PoseId>) {
        self.history.record(now, pose_id);
    }

    /// Try to match one gesture against the trailing history.
    ///
    /// # Algorithm
    ///
    /// For each gesture not inside its own cooldown window, walk the
    /// sequence backward from its final step, anchored at `now`.  For each
    /// step, scan the history backward for an entry with the step's pose
    /// whose gap to the anchor is within the step's bound; entries with a
    /// different pose inside the bound are skipped as noise, and an entry
    /// past the bound plus a fixed slack ends the scan as a failure.  A
    /// matched entry becomes the anchor for the previous step.  Walking
    /// backward from "now" keeps the *final* pose recent while tolerating
    /// noisy intermediates and bounded timing jitter.
    ///
    /// The first gesture whose every step matches records its trigger time
    /// and is returned; nothing else is checked that frame.
    pub fn try_match(&mut self, now: TimeMs) -> Option<GestureId> {
        for spec in &self.specs {
            if let Some(&t0) = self.last_trigger.get(spec.id) {
                if now - t0 < spec.cooldown_ms {
                    continue;
                }
            }

            if Self::matches(&self.history, spec, now) {
                self.last_trigger.insert(spec.id, now);
                debug!("gesture `{}` matched at t={now:.0}", spec.id);
                return Some(spec.id);
            }
        }
        None
    }

    fn matches(history: &PoseHistory, spec: &GestureSpec, now: TimeMs) -> bool {
        let mut hist_idx = history.len() as isize - 1;
        let mut anchor = now;

        let mut seq_idx = spec.sequence.len() as isize - 1;
        while seq_idx >= 0 {
            let step = &spec.sequence[seq_idx as usize];
            let mut found = false;

            while hist_idx >= 0 {
                let entry = match history.get(hist_idx as usize) {
                    Some(e) => *e,
                    None => break,
                };
                let gap = anchor - entry.t;

                if gap > step.max_gap_ms + GAP_SLACK_MS {
                    break;
                }
                if entry.pose_id == step.pose_id && gap <= step.max_gap_ms {
                    found = true;
                    anchor = entry.t;
                    hist_idx -= 1;
                    break;
                }
                hist_idx -= 1;
            }

            if !found {
                return false;
            }
            seq_idx -= 1;
        }
        true
    }

    pub fn history(&self) -> &PoseHistory {
        &self.history
    }

    /// Gesture ids in evaluation order.
    pub fn gesture_ids(&self) -> Vec<GestureId> {
        self.specs.iter().map(|s| s.id).collect()
    }

    pub fn gesture_name(&self, id: GestureId) -> Option<&'static str> {
        self.specs.iter().find(|s| s.id == id).map(|s| s.name)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GestureStep;

    fn step(pose_id: PoseId, max_gap_ms: f64) -> GestureStep {
        GestureStep { pose_id, max_gap_ms, min_hold_ms: None }
    }

    fn spec(id: GestureId, steps: Vec<GestureStep>, cooldown_ms: f64) -> GestureSpec {
        GestureSpec {
            id,
            name: "test",
            sequence: steps,
            min_confidence: 0.6,
            max_duration_ms: 3000.0,
            cooldown_ms,
        }
    }

    fn slash_like() -> GestureSpec {
        spec("slash", vec![step("fist", 2000.0), step("two_fingers", 2000.0)], 2000.0)
    }

    // ── history ──────────────────────────────────────────────────────────

    #[test]
    fn history_skips_consecutive_duplicates() {
        let mut h = PoseHistory::new();
        h.record(0.0, Some("fist"));
        h.record(16.0, Some("fist"));
        h.record(32.0, Some("fist"));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn history_logs_transitions() {
        let mut h = PoseHistory::new();
        h.record(0.0, Some("fist"));
        h.record(100.0, Some("open"));
        h.record(200.0, Some("fist"));
        assert_eq!(h.len(), 3);
        assert_eq!(h.get(2).unwrap().pose_id, "fist");
    }

    #[test]
    fn history_ignores_none() {
        let mut h = PoseHistory::new();
        h.record(0.0, Some("fist"));
        h.record(100.0, None);
        h.record(200.0, Some("fist"));
        // The None did not break the run, so the second fist is a duplicate.
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn history_prunes_old_entries_on_append() {
        let mut h = PoseHistory::new();
        h.record(0.0, Some("a"));
        h.record(100.0, Some("b"));
        h.record(5100.0, Some("c"));
        assert_eq!(h.len(), 1);
        assert_eq!(h.get(0).unwrap().pose_id, "c");
    }

    #[test]
    fn history_no_two_consecutive_entries_share_a_pose() {
        let mut h = PoseHistory::new();
        for (t, p) in [(0.0, "a"), (10.0, "a"), (20.0, "b"), (30.0, "b"), (40.0, "a")] {
            h.record(t, Some(p));
        }
        let ids: Vec<_> = h.iter().map(|e| e.pose_id).collect();
        assert_eq!(ids, vec!["a", "b", "a"]);
    }

    // ── matching ─────────────────────────────────────────────────────────

    #[test]
    fn two_step_gesture_matches() {
        let mut m = SequenceMatcher::new(vec![slash_like()]);
        m.record(0.0, Some("fist"));
        m.record(500.0, Some("two_fingers"));
        assert_eq!(m.try_match(500.0), Some("slash"));
    }

    #[test]
    fn trigger_is_blocked_inside_own_cooldown() {
        let mut m = SequenceMatcher::new(vec![slash_like()]);
        m.record(0.0, Some("fist"));
        m.record(500.0, Some("two_fingers"));
        assert_eq!(m.try_match(500.0), Some("slash"));
        // Within cooldown=2000 measured from the trigger at t=500.
        assert_eq!(m.try_match(600.0), None);
        assert_eq!(m.try_match(2400.0), None);
    }

    #[test]
    fn stale_final_step_does_not_rematch_after_cooldown() {
        let mut m = SequenceMatcher::new(vec![slash_like()]);
        m.record(0.0, Some("fist"));
        m.record(500.0, Some("two_fingers"));
        assert_eq!(m.try_match(500.0), Some("slash"));
        // Cooldown has expired, but the final step is now 2100ms old —
        // past its 2000ms bound, so no rematch.
        assert_eq!(m.try_match(2600.0), None);
    }

    #[test]
    fn gap_past_bound_plus_slack_fails() {
        let mut m = SequenceMatcher::new(vec![slash_like()]);
        m.record(0.0, Some("fist"));
        m.record(2600.0, Some("two_fingers"));
        // fist is 2600ms before the two_fingers anchor: past 2000+500.
        assert_eq!(m.try_match(2600.0), None);
    }

    #[test]
    fn noisy_intermediate_pose_is_skipped() {
        let mut m = SequenceMatcher::new(vec![slash_like()]);
        m.record(0.0, Some("fist"));
        m.record(300.0, Some("open"));
        m.record(500.0, Some("two_fingers"));
        assert_eq!(m.try_match(500.0), Some("slash"));
    }

    #[test]
    fn longer_gesture_is_preferred_over_its_suffix() {
        let long = spec("long", vec![step("fist", 2000.0), step("two_fingers", 2000.0)], 0.0);
        let short = spec("short", vec![step("two_fingers", 2000.0)], 0.0);
        // Evaluation order is the held order; the registry puts longer first.
        let mut m = SequenceMatcher::new(vec![long, short]);
        m.record(0.0, Some("fist"));
        m.record(400.0, Some("two_fingers"));
        assert_eq!(m.try_match(400.0), Some("long"));
    }

    #[test]
    fn cooldown_on_one_gesture_lets_another_match() {
        let long = spec("long", vec![step("fist", 2000.0), step("two_fingers", 2000.0)], 5000.0);
        let short = spec("short", vec![step("two_fingers", 2000.0)], 0.0);
        let mut m = SequenceMatcher::new(vec![long, short]);
        m.record(0.0, Some("fist"));
        m.record(400.0, Some("two_fingers"));
        assert_eq!(m.try_match(400.0), Some("long"));
        // long is cooling down; the shorter suffix gesture now matches.
        assert_eq!(m.try_match(500.0), Some("short"));
    }

    #[test]
    fn empty_history_matches_nothing() {
        let mut m = SequenceMatcher::new(vec![slash_like()]);
        assert_eq!(m.try_match(1000.0), None);
    }

    #[test]
    fn single_step_gesture_retriggers_without_cooldown() {
        let aura = spec("aura", vec![step("open", 1000.0)], 0.0);
        let mut m = SequenceMatcher::new(vec![aura]);
        m.record(0.0, Some("open"));
        assert_eq!(m.try_match(16.0), Some("aura"));
        assert_eq!(m.try_match(32.0), Some("aura"));
        // Past the step's gap bound the transition is too old.
        assert_eq!(m.try_match(1100.0), None);
    }

    #[test]
    fn steps_must_appear_in_order() {
        let mut m = SequenceMatcher::new(vec![slash_like()]);
        m.record(0.0, Some("two_fingers"));
        m.record(400.0, Some("fist"));
        assert_eq!(m.try_match(400.0), None);
    }
}
