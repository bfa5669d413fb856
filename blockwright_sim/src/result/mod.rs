// The result model: every outcome the checks and simulators can produce.
//
// `BuildResult` is a two-level tagged union: a family (`PreSim`, `Generic`,
// `Break`, `Interact`) and a variant inside it. Every variant carries a
// position, a human-readable name and a `Rank`; capabilities are attached
// per variant through small traits instead of a shared base type:
//
//   Drawable    a render hint for an overlay renderer
//   Navigable   a movement goal for a path navigator
//   Resolvable  a corrective inventory action, given the agent
//   Contextual  a resolved action payload for an executor
//   Dependent   wraps the result of a nested simulation
//
// A dependency wrapper reports the rank and capabilities of its innermost
// result, so a scheduler never has to special-case prerequisite chains.
//
// See also: `result/context.rs` for action payloads and the contextual
// comparator, `planner.rs` which orders whole passes with `compare`.
//
// **Critical constraint: determinism.** `compare` is a total order over
// results with the same `CompareView`; ties fall through to comparisons of
// positions and PRNG values keyed by position, never to insertion order.

pub mod breaking;
pub mod context;
pub mod generic;
pub mod interact;
pub mod pre_sim;

pub use breaking::BreakResult;
pub use context::{BreakContext, BuildContext, InteractContext};
pub use generic::GenericResult;
pub use interact::InteractResult;
pub use pre_sim::PreSimResult;

use crate::agent::Agent;
use crate::geometry::{Aabb, Vec3};
use crate::inventory::StackSelection;
use crate::rotation::Rotation;
use crate::types::{BlockPos, Direction, SideSet};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// Global priority of a result. Declaration order is the sort order: the
/// first group can be acted on now, the second needs something solved
/// first, the third is settled, the last can never succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Rank {
    BreakSuccess,
    PlaceSuccess,
    WrongItem,
    BreakItemCantMine,

    PlaceBlockedByPlayer,
    NotVisible,
    OutOfReach,
    BreakNotExposed,
    ChunkNotLoaded,
    PlaceCantReplace,
    BreakPlayerOnTop,
    BreakSubmerge,
    BreakIsBlockedByFluid,
    PlaceBlockedByEntity,

    Done,
    Ignored,
    Unbreakable,
    BreakNoPermission,
    PlaceScaffoldExceeded,
    PlaceBlockFeatureDisabled,
    UnexpectedPosition,
    PlaceIllegalUsage,

    OutOfWorld,
    BreakRestricted,
    PlaceNoIntegrity,
}

impl Rank {
    pub fn is_actionable(self) -> bool {
        self <= Rank::BreakItemCantMine
    }
}

// ---------------------------------------------------------------------------
// Capability payloads
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum HintShape {
    /// The whole cell, outlined on `sides`.
    Block { pos: BlockPos, sides: SideSet },
    Box(Aabb),
}

/// What an overlay renderer should draw for a result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderHint {
    pub shape: HintShape,
    pub fill: Color,
    pub outline: Color,
}

impl RenderHint {
    pub fn block(pos: BlockPos, color: Color) -> Self {
        Self {
            shape: HintShape::Block { pos, sides: SideSet::ALL },
            fill: color,
            outline: color,
        }
    }

    pub fn marker(center: Vec3, radius: f64, color: Color) -> Self {
        Self {
            shape: HintShape::Box(Aabb::around(center, radius)),
            fill: color,
            outline: color,
        }
    }
}

/// A small box just outside `side` at `point`, so it is not hidden inside
/// the clicked face.
pub fn point_marker(point: Vec3, side: Direction) -> Aabb {
    Aabb::around(point + Vec3::of_direction(side) * 0.05, 0.05)
}

/// Movement goal for an external navigator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Goal {
    /// Within `range` blocks of `pos`.
    Near { pos: BlockPos, range: u32 },
    /// Standing at `pos`.
    Block(BlockPos),
    /// Anywhere the inner goal is not satisfied.
    Inverted(Box<Goal>),
}

/// An inventory change that would make a result actionable.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Resolution {
    /// Swap the stack in `from_slot` into the main hand.
    MoveToMainHand { from_slot: u8, selection: StackSelection },
}

pub trait Drawable {
    fn render_hint(&self) -> RenderHint;
}

pub trait Navigable {
    fn goal(&self) -> Goal;
}

pub trait Resolvable {
    /// `None` when the inventory holds nothing that would help, or the
    /// right stack is already in hand.
    fn resolve(&self, agent: &Agent) -> Option<Resolution>;
}

pub trait Contextual {
    fn context(&self) -> &dyn BuildContext;
}

pub trait Dependent {
    fn dependency(&self) -> &BuildResult;

    /// Innermost result of the chain.
    fn last_dependency(&self) -> &BuildResult {
        let mut current = self.dependency();
        while let Some(next) = current.as_dependent() {
            current = next.dependency();
        }
        current
    }
}

/// Resolution shared by the wrong-item results: find the best stack for
/// `selection` and move it to the main hand unless it is already there.
pub(crate) fn move_to_main_hand(selection: &StackSelection, agent: &Agent) -> Option<Resolution> {
    let stack = agent.inventory.select_stack(selection, agent)?;
    if stack.slot == agent.inventory.selected_slot {
        return None;
    }
    Some(Resolution::MoveToMainHand {
        from_slot: stack.slot,
        selection: selection.clone(),
    })
}

/// The result of a nested simulation, wrapped by the simulator that ran it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dependency {
    pub pos: BlockPos,
    pub inner: Box<BuildResult>,
}

impl Dependency {
    pub fn new(pos: BlockPos, inner: BuildResult) -> Self {
        Self {
            pos,
            inner: Box::new(inner),
        }
    }
}

impl Dependent for Dependency {
    fn dependency(&self) -> &BuildResult {
        &self.inner
    }
}

// ---------------------------------------------------------------------------
// BuildResult
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum BuildResult {
    PreSim(PreSimResult),
    Generic(GenericResult),
    Break(BreakResult),
    Interact(InteractResult),
}

/// The parts of the agent the result comparator reads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompareView {
    pub selected_slot: u8,
    pub active_rotation: Rotation,
    pub sneaking: bool,
}

impl CompareView {
    pub fn of(agent: &Agent) -> Self {
        Self {
            selected_slot: agent.inventory.selected_slot,
            active_rotation: agent.server_rotation,
            sneaking: agent.sneaking,
        }
    }
}

impl BuildResult {
    pub fn pos(&self) -> BlockPos {
        match self {
            BuildResult::PreSim(r) => r.pos(),
            BuildResult::Generic(r) => r.pos(),
            BuildResult::Break(r) => r.pos(),
            BuildResult::Interact(r) => r.pos(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            BuildResult::PreSim(r) => r.name(),
            BuildResult::Generic(r) => r.name(),
            BuildResult::Break(r) => r.name(),
            BuildResult::Interact(r) => r.name(),
        }
    }

    /// Rank of the innermost result.
    pub fn rank(&self) -> Rank {
        self.innermost().own_rank()
    }

    fn own_rank(&self) -> Rank {
        match self {
            BuildResult::PreSim(r) => r.rank(),
            BuildResult::Generic(r) => r.rank(),
            BuildResult::Break(r) => r.rank(),
            BuildResult::Interact(r) => r.rank(),
        }
    }

    /// Follows dependency wrappers down to the result that decides this
    /// one's rank and capabilities.
    pub fn innermost(&self) -> &BuildResult {
        match self.as_dependent() {
            Some(dep) => dep.last_dependency(),
            None => self,
        }
    }

    pub fn as_dependent(&self) -> Option<&dyn Dependent> {
        match self {
            BuildResult::Break(BreakResult::Dependency(d))
            | BuildResult::Interact(InteractResult::Dependency(d)) => Some(d),
            _ => None,
        }
    }

    pub fn as_drawable(&self) -> Option<&dyn Drawable> {
        match self.innermost() {
            BuildResult::PreSim(r) => r.as_drawable(),
            BuildResult::Generic(r) => r.as_drawable(),
            BuildResult::Break(r) => r.as_drawable(),
            BuildResult::Interact(r) => r.as_drawable(),
        }
    }

    pub fn as_navigable(&self) -> Option<&dyn Navigable> {
        match self.innermost() {
            BuildResult::PreSim(r) => r.as_navigable(),
            BuildResult::Generic(r) => r.as_navigable(),
            BuildResult::Break(r) => r.as_navigable(),
            BuildResult::Interact(r) => r.as_navigable(),
        }
    }

    pub fn as_resolvable(&self) -> Option<&dyn Resolvable> {
        match self.innermost() {
            BuildResult::Generic(r) => r.as_resolvable(),
            BuildResult::Break(r) => r.as_resolvable(),
            BuildResult::PreSim(_) | BuildResult::Interact(_) => None,
        }
    }

    pub fn as_contextual(&self) -> Option<&dyn Contextual> {
        match self.innermost() {
            BuildResult::Break(r) => r.as_contextual(),
            BuildResult::Interact(r) => r.as_contextual(),
            BuildResult::PreSim(_) | BuildResult::Generic(_) => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.rank().is_actionable()
    }

    /// Total order over results, best first: rank, then the tie-break for
    /// two results of the same kind.
    pub fn compare(&self, other: &BuildResult, view: &CompareView) -> Ordering {
        let (a, b) = (self.innermost(), other.innermost());
        a.own_rank()
            .cmp(&b.own_rank())
            .then_with(|| a.tie_break(b, view))
    }

    fn tie_break(&self, other: &BuildResult, view: &CompareView) -> Ordering {
        if let (Some(x), Some(y)) = (self.as_contextual(), other.as_contextual()) {
            return context::compare_contexts(x.context(), y.context(), view);
        }
        match (self, other) {
            (
                BuildResult::Generic(GenericResult::NotVisible(a)),
                BuildResult::Generic(GenericResult::NotVisible(b)),
            ) => a.distance.total_cmp(&b.distance),
            (
                BuildResult::Generic(GenericResult::OutOfReach(a)),
                BuildResult::Generic(GenericResult::OutOfReach(b)),
            ) => a.distance().total_cmp(&b.distance()),
            (
                BuildResult::PreSim(PreSimResult::ChunkNotLoaded(a)),
                BuildResult::PreSim(PreSimResult::ChunkNotLoaded(b)),
            ) => a.pos.cmp(&b.pos),
            (
                BuildResult::Break(BreakResult::NotExposed(a)),
                BuildResult::Break(BreakResult::NotExposed(b)),
            ) => a.pos.cmp(&b.pos),
            (
                BuildResult::Break(BreakResult::ItemCantMine(a)),
                BuildResult::Break(BreakResult::ItemCantMine(b)),
            ) => a.bad_item.name().cmp(&b.bad_item.name()),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<PreSimResult> for BuildResult {
    fn from(r: PreSimResult) -> Self {
        BuildResult::PreSim(r)
    }
}

impl From<GenericResult> for BuildResult {
    fn from(r: GenericResult) -> Self {
        BuildResult::Generic(r)
    }
}

impl From<BreakResult> for BuildResult {
    fn from(r: BreakResult) -> Self {
        BuildResult::Break(r)
    }
}

impl From<InteractResult> for BuildResult {
    fn from(r: InteractResult) -> Self {
        BuildResult::Interact(r)
    }
}
