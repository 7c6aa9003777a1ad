//! Technique lifecycle scheduling.
//!
//! The [`FxEngine`] owns the technique catalog and the runtime state of
//! every currently active technique.  Techniques move Idle → Active →
//! Idle; while Active the engine holds a strongly-typed state value the
//! technique borrows for the duration of each lifecycle call, so no state
//! is shared across techniques and nothing needs locking.

use tracing::debug;

use hand_model::{FeaturesFrame, HandFrame, TimeMs};

use crate::canvas::Canvas;
use crate::catalog::{GestureId, TechniqueId};

/// Minimum spacing between starts of any two non-exempt techniques.
pub const GLOBAL_COOLDOWN_MS: f64 = 1_500.0;

// ════════════════════════════════════════════════════════════════════════════
// Context and trait
// ════════════════════════════════════════════════════════════════════════════

/// Per-call context handed to every lifecycle hook.  Hooks draw on the
/// canvas and read the tracking frames; they never touch the scheduler's
/// own bookkeeping.
pub struct FxContext<'a> {
    pub now: TimeMs,
    pub frame: &'a HandFrame,
    pub features: &'a FeaturesFrame,
    pub canvas: &'a mut Canvas,
}

/// A named, versioned visual effect with start/update/stop lifecycle hooks.
///
/// `S` is the shared technique-state type (one tagged variant per
/// technique); [`Technique::fresh_state`] produces this technique's empty
/// variant, and the engine hands it back mutably on every call while the
/// technique is active.
pub trait Technique<S> {
    fn id(&self) -> TechniqueId;
    fn name(&self) -> &'static str;
    fn version(&self) -> &'static str;
    /// The gesture whose trigger starts this technique.
    fn gesture_id(&self) -> GestureId;
    /// Whether this technique bypasses the global start cooldown.  At most
    /// one technique in a catalog may claim this.
    fn exempt(&self) -> bool {
        false
    }
    fn fresh_state(&self) -> S;
    fn start(&self, ctx: &mut FxContext<'_>, state: &mut S);
    fn update(&self, ctx: &mut FxContext<'_>, state: &mut S);
    fn stop(&self, ctx: &mut FxContext<'_>, state: &mut S);
}

// ════════════════════════════════════════════════════════════════════════════
// FxEngine
// ════════════════════════════════════════════════════════════════════════════

struct ActiveFx<S> {
    /// Index into the catalog.
    idx: usize,
    state: S,
}

/// The technique lifecycle engine.
pub struct FxEngine<S> {
    catalog: Vec<Box<dyn Technique<S>>>,
    /// Currently active techniques in start order.
    active: Vec<ActiveFx<S>>,
    /// Timestamp of the most recent non-exempt start; `None` until one
    /// happens, so a fresh session begins with no cooldown pending.
    last_start: Option<TimeMs>,
    last_started_name: Option<&'static str>,
}

impl<S> FxEngine<S> {
    pub(crate) fn new(catalog: Vec<Box<dyn Technique<S>>>) -> Self {
        FxEngine {
            catalog,
            active: Vec::new(),
            last_start: None,
            last_started_name: None,
        }
    }

    // ── queries ──────────────────────────────────────────────────────────

    pub fn is_active(&self, id: TechniqueId) -> bool {
        self.active.iter().any(|f| self.catalog[f.idx].id() == id)
    }

    /// Remaining global cooldown in ms (`0.0` = ready).
    pub fn cooldown_remaining(&self, now: TimeMs) -> f64 {
        match self.last_start {
            Some(t) => (GLOBAL_COOLDOWN_MS - (now - t)).max(0.0),
            None => 0.0,
        }
    }

    /// Display name of the last non-exempt technique started.
    pub fn last_started_name(&self) -> Option<&'static str> {
        self.last_started_name
    }

    /// Currently active technique ids, in start order.
    pub fn active_ids(&self) -> Vec<TechniqueId> {
        self.active.iter().map(|f| self.catalog[f.idx].id()).collect()
    }

    pub fn is_exempt(&self, id: TechniqueId) -> bool {
        self.catalog.iter().any(|t| t.id() == id && t.exempt())
    }

    pub fn technique_for_gesture(&self, gesture_id: GestureId) -> Option<TechniqueId> {
        self.catalog
            .iter()
            .find(|t| t.gesture_id() == gesture_id)
            .map(|t| t.id())
    }

    pub fn technique_name(&self, id: TechniqueId) -> Option<&'static str> {
        self.catalog.iter().find(|t| t.id() == id).map(|t| t.name())
    }

    // ── transitions ──────────────────────────────────────────────────────

    /// Start a technique, restarting it if already active.
    ///
    /// Non-exempt starts are rejected while the global cooldown from the
    /// previous non-exempt start is still running — an expected outcome,
    /// not an error.  A restart runs the stop hook (with the old state)
    /// exactly once before the new start hook runs on a fresh state.
    pub fn start(&mut self, id: TechniqueId, ctx: &mut FxContext<'_>) -> bool {
        let Some(idx) = self.catalog.iter().position(|t| t.id() == id) else {
            return false;
        };
        let exempt = self.catalog[idx].exempt();

        if !exempt && self.cooldown_remaining(ctx.now) > 0.0 {
            debug!("`{}` rejected by global cooldown", id);
            return false;
        }

        if self.is_active(id) {
            self.stop(id, ctx);
        }

        let mut state = self.catalog[idx].fresh_state();
        self.catalog[idx].start(ctx, &mut state);
        self.active.push(ActiveFx { idx, state });

        if !exempt {
            self.last_start = Some(ctx.now);
            self.last_started_name = Some(self.catalog[idx].name());
        }
        debug!("`{}` started at t={:.0}", id, ctx.now);
        true
    }

    /// Stop a technique and discard its state.  No-op when idle.
    pub fn stop(&mut self, id: TechniqueId, ctx: &mut FxContext<'_>) {
        let Some(i) = self
            .active
            .iter()
            .position(|f| self.catalog[f.idx].id() == id)
        else {
            return;
        };
        // The entry leaves the active set before the hook runs, so a hook
        // failure cannot leave the id active.
        let mut fx = self.active.remove(i);
        self.catalog[fx.idx].stop(ctx, &mut fx.state);
        debug!("`{}` stopped at t={:.0}", id, ctx.now);
    }

    /// Per-tick render pass: clear the shared canvas, then run every active
    /// technique's update hook in start order.
    ///
    /// Runs every tick whether or not any detection happened.  Techniques
    /// that have outlived their intrinsic duration simply render nothing;
    /// they stay active until somebody calls [`FxEngine::stop`].
    pub fn update(&mut self, ctx: &mut FxContext<'_>) {
        ctx.canvas.clear();
        for fx in self.active.iter_mut() {
            self.catalog[fx.idx].update(ctx, &mut fx.state);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
