// Action payloads carried by successful results.
//
// A `BreakContext` or `InteractContext` is everything an external executor
// needs to carry out one action: the hit to click, the rotation to request,
// the hotbar slot to select, and the state the cell is expected to end up
// in. Both implement `BuildContext`, the shared view the contextual
// comparator orders by.
//
// See also: `result/mod.rs` for `Contextual` and `BuildResult::compare`,
// `sim/break_sim.rs` and `sim/interact_sim.rs` which build these.
//
// **Critical constraint: determinism.** The `Random` sort value is drawn
// from `PlanRng::keyed(seed, key)` where the key is the hit cell, face and
// action kind, so it never depends on scheduling.

use super::{Color, CompareView, Drawable, HintShape, RenderHint, point_marker};
use crate::config::SortMode;
use crate::geometry::Vec3;
use crate::inventory::StackSelection;
use crate::rotation::RotationRequest;
use crate::state::{BlockState, FluidState};
use crate::types::BlockPos;
use crate::world::BlockHit;
use blockwright_prng::PlanRng;
use serde::Serialize;
use std::cmp::Ordering;

/// Shared read-only view of an action payload.
pub trait BuildContext {
    fn hit(&self) -> &BlockHit;
    fn rotation_request(&self) -> &RotationRequest;
    fn hotbar_index(&self) -> u8;
    /// State of the cell when the plan was made.
    fn cached_state(&self) -> &BlockState;
    /// State the cell should hold once the action lands.
    fn expected_state(&self) -> &BlockState;
    fn pos(&self) -> BlockPos;
    fn sorter(&self) -> SortMode;
    fn sort_distance(&self) -> f64;
    fn random(&self) -> f64;

    /// Fluid in the target cell; only placements care.
    fn fluid(&self) -> Option<FluidState> {
        None
    }

    /// Whether the action is performed sneaking; only interactions sneak.
    fn sneak(&self) -> Option<bool> {
        None
    }

    fn instant_break(&self) -> bool {
        false
    }
}

fn tie_break_value(seed: u64, hit: &BlockHit, kind: i64) -> f64 {
    let key = [
        i64::from(hit.pos.x),
        i64::from(hit.pos.y),
        i64::from(hit.pos.z),
        hit.side as i64,
        kind,
    ];
    PlanRng::keyed(seed, &key).next_f64()
}

// ---------------------------------------------------------------------------
// Break
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BreakContext {
    pub hit: BlockHit,
    pub rotation_request: RotationRequest,
    pub hotbar_index: u8,
    pub item_selection: StackSelection,
    pub instant_break: bool,
    /// The eye is inside the block's outline; the hit is wherever the
    /// current aim lands.
    pub inside_block: bool,
    pub cached_state: BlockState,
    pub expected_state: BlockState,
    pub sorter: SortMode,
    pub sort_distance: f64,
    pub random: f64,
}

/// Inputs to a `BreakContext` that are not copied straight through.
pub struct BreakContextParams<'a> {
    pub pov: Vec3,
    pub entity_reach: f64,
    pub sorter: SortMode,
    pub seed: u64,
    pub state: &'a BlockState,
}

impl BreakContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hit: BlockHit,
        rotation_request: RotationRequest,
        hotbar_index: u8,
        item_selection: StackSelection,
        instant_break: bool,
        inside_block: bool,
        params: BreakContextParams<'_>,
    ) -> Self {
        let mut d = hit.point - params.pov;
        // Falling blocks sort as if they were lower, so columns get broken
        // bottom-up before the blocks above come down.
        if params.state.kind().is_falling() {
            d.y -= params.entity_reach / 2.0;
        }
        Self {
            hit,
            rotation_request,
            hotbar_index,
            item_selection,
            instant_break,
            inside_block,
            cached_state: params.state.clone(),
            expected_state: params.state.empty_state(),
            sorter: params.sorter,
            sort_distance: d.length(),
            random: tie_break_value(params.seed, &hit, 0),
        }
    }
}

impl BuildContext for BreakContext {
    fn hit(&self) -> &BlockHit {
        &self.hit
    }
    fn rotation_request(&self) -> &RotationRequest {
        &self.rotation_request
    }
    fn hotbar_index(&self) -> u8 {
        self.hotbar_index
    }
    fn cached_state(&self) -> &BlockState {
        &self.cached_state
    }
    fn expected_state(&self) -> &BlockState {
        &self.expected_state
    }
    fn pos(&self) -> BlockPos {
        self.hit.pos
    }
    fn sorter(&self) -> SortMode {
        self.sorter
    }
    fn sort_distance(&self) -> f64 {
        self.sort_distance
    }
    fn random(&self) -> f64 {
        self.random
    }
    fn instant_break(&self) -> bool {
        self.instant_break
    }
}

impl Drawable for BreakContext {
    fn render_hint(&self) -> RenderHint {
        RenderHint {
            shape: HintShape::Box(point_marker(self.hit.point, self.hit.side)),
            fill: Color::new(222, 0, 0, 25),
            outline: Color::new(222, 0, 0, 100),
        }
    }
}

// ---------------------------------------------------------------------------
// Interact
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InteractContext {
    pub hit: BlockHit,
    pub rotation_request: RotationRequest,
    pub hotbar_index: u8,
    /// The cell being changed (not the clicked neighbour).
    pub pos: BlockPos,
    pub cached_state: BlockState,
    pub expected_state: BlockState,
    /// Places a block, as opposed to using an item on one.
    pub placing: bool,
    pub sneak: bool,
    /// The rotation the agent already holds on the server produces the
    /// expected state.
    pub current_dir_valid: bool,
    pub sorter: SortMode,
    pub sort_distance: f64,
    pub random: f64,
}

impl InteractContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hit: BlockHit,
        rotation_request: RotationRequest,
        hotbar_index: u8,
        pos: BlockPos,
        cached_state: BlockState,
        expected_state: BlockState,
        placing: bool,
        sneak: bool,
        current_dir_valid: bool,
        pov: Vec3,
        sorter: SortMode,
        seed: u64,
    ) -> Self {
        Self {
            sort_distance: pov.distance(hit.point),
            random: tie_break_value(seed, &hit, 1),
            hit,
            rotation_request,
            hotbar_index,
            pos,
            cached_state,
            expected_state,
            placing,
            sneak,
            current_dir_valid,
            sorter,
        }
    }
}

impl BuildContext for InteractContext {
    fn hit(&self) -> &BlockHit {
        &self.hit
    }
    fn rotation_request(&self) -> &RotationRequest {
        &self.rotation_request
    }
    fn hotbar_index(&self) -> u8 {
        self.hotbar_index
    }
    fn cached_state(&self) -> &BlockState {
        &self.cached_state
    }
    fn expected_state(&self) -> &BlockState {
        &self.expected_state
    }
    fn pos(&self) -> BlockPos {
        self.pos
    }
    fn sorter(&self) -> SortMode {
        self.sorter
    }
    fn sort_distance(&self) -> f64 {
        self.sort_distance
    }
    fn random(&self) -> f64 {
        self.random
    }
    fn fluid(&self) -> Option<FluidState> {
        Some(self.cached_state.fluid_state())
    }
    fn sneak(&self) -> Option<bool> {
        Some(self.sneak)
    }
}

impl Drawable for InteractContext {
    fn render_hint(&self) -> RenderHint {
        RenderHint {
            shape: HintShape::Box(point_marker(self.hit.point, self.hit.side)),
            fill: Color::new(35, 188, 254, 50),
            outline: Color::new(35, 188, 254, 100),
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// `true` sorts before `false`.
fn prefer(a: bool, b: bool) -> Ordering {
    b.cmp(&a)
}

fn sort_key(ctx: &dyn BuildContext, view: &CompareView) -> f64 {
    match ctx.sorter() {
        SortMode::Tool | SortMode::Closest => ctx.sort_distance(),
        SortMode::Farthest => -ctx.sort_distance(),
        SortMode::Rotation => ctx
            .rotation_request()
            .rotation(view.active_rotation)
            .dist(view.active_rotation),
        SortMode::Random => ctx.random(),
    }
}

/// Order two action payloads, best first.
///
/// Fluids are handled first (lava before water, sources before flowing,
/// higher and fuller cells first), then the held slot under `Tool` sorting,
/// then the sort mode, then sneak state, held slot and instant breaks.
pub fn compare_contexts(a: &dyn BuildContext, b: &dyn BuildContext, view: &CompareView) -> Ordering {
    let fluid_index = |c: &dyn BuildContext| c.fluid().map_or(FluidState::EMPTY.sort_index(), |f| f.sort_index());
    let fluid_y = |c: &dyn BuildContext| match c.fluid() {
        Some(f) if f.level != 0 => c.pos().y,
        _ => i32::MIN,
    };
    let fluid_level = |c: &dyn BuildContext| c.fluid().map_or(i32::MIN, |f| i32::from(f.level));
    let tool_held = |c: &dyn BuildContext| a.sorter() == SortMode::Tool && c.hotbar_index() == view.selected_slot;
    let sneak_matches = |c: &dyn BuildContext| c.sneak() == Some(view.sneaking);

    fluid_index(a)
        .cmp(&fluid_index(b))
        .then_with(|| fluid_y(b).cmp(&fluid_y(a)))
        .then_with(|| fluid_level(b).cmp(&fluid_level(a)))
        .then_with(|| prefer(tool_held(a), tool_held(b)))
        .then_with(|| sort_key(a, view).total_cmp(&sort_key(b, view)))
        .then_with(|| prefer(sneak_matches(a), sneak_matches(b)))
        .then_with(|| prefer(a.hotbar_index() == view.selected_slot, b.hotbar_index() == view.selected_slot))
        .then_with(|| prefer(a.instant_break(), b.instant_break()))
}
