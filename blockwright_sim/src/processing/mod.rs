// Pre-simulation rewrites of a position's target.
//
// Before a non-empty target is simulated, the `Registry` derives a
// `PreProcessingInfo` for the (current state, expected state) pair: which
// state the interact simulator should aim for, which item produces it,
// which faces may be clicked and which half of the cell, whether the work
// is a placement or a right-click, and which properties to ignore when
// checking a simulated placement.
//
// Three kinds of processors feed the info, tried in this order:
// - `StateProcessor`s recognize special transitions (growing bamboo,
//   lighting fire, filling a flower pot). The first one that accepts wins
//   and the other two kinds are skipped.
// - `PropertyPreProcessor`s run when the cell holds a different block than
//   the expected one; each narrows sides or offers a surface scan for one
//   property of the expected state.
// - `PropertyPostProcessor`s run when the cell already holds the expected
//   block with different properties.
//
// When no state processor accepts and the cell holds a block that is
// neither replaceable nor the expected block, there is no info: the
// position must be cleared first and is routed to the break simulator.
//
// Infos are cached per `(current, expected)` pair unless a processor
// marked the info as position-dependent (`no_caching`).
//
// See also: `sim/mod.rs` which routes on the info, `visibility.rs` for
// `SurfaceScan`, `processing/state.rs` and `processing/property.rs` for the
// standard processors.

pub mod property;
pub mod state;

use crate::agent::Agent;
use crate::config::InventoryConfig;
use crate::item::Item;
use crate::state::{BlockState, Property};
use crate::target::TargetState;
use crate::types::{BlockPos, Direction, SideSet};
use crate::visibility::SurfaceScan;
use crate::world::WorldView;
use rustc_hash::FxHashMap;
use std::sync::{Mutex, PoisonError};
use tracing::trace;

/// Properties a placement may get wrong because they are set after the
/// block is down (by toggling, powering, growth or flow).
pub const POST_PROCESSED_PROPERTIES: &[Property] = &[
    Property::Lit,
    Property::Open,
    Property::Powered,
    Property::Waterlogged,
    Property::Age,
    Property::Level,
];

/// Properties changed by right-clicking the block.
pub const STANDARD_INTERACT_PROPERTIES: &[Property] = &[Property::Open];

// ---------------------------------------------------------------------------
// PreProcessingInfo
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct PreProcessingInfo {
    pub expected_state: BlockState,
    /// `Item::Empty` means any stack will do.
    pub item: Item,
    pub surface_scan: SurfaceScan,
    pub ignore: Vec<Property>,
    pub sides: SideSet,
    pub placing: bool,
    pub no_caching: bool,
    /// Nothing needs placing; the target is reached by waiting.
    pub omit_placement: bool,
}

impl PreProcessingInfo {
    /// The starting point every processor refines.
    pub fn new(expected_state: BlockState, item: Item) -> Self {
        Self {
            expected_state,
            item,
            surface_scan: SurfaceScan::DEFAULT,
            ignore: POST_PROCESSED_PROPERTIES.to_vec(),
            sides: SideSet::ALL,
            placing: true,
            no_caching: false,
            omit_placement: false,
        }
    }

    /// Replace the surface scan if `scan` has a higher priority.
    pub fn offer_surface_scan(&mut self, scan: SurfaceScan) {
        if scan.mode.priority() > self.surface_scan.mode.priority() {
            self.surface_scan = scan;
        }
    }

    pub fn add_ignore(&mut self, property: Property) {
        if !self.ignore.contains(&property) {
            self.ignore.push(property);
        }
    }

    pub fn retain_sides(&mut self, keep: impl Fn(Direction) -> bool) {
        self.sides.retain(keep);
    }

    pub fn retain_only(&mut self, side: Direction) {
        self.sides = self.sides.intersection(SideSet::only(side));
    }

    /// Whether `state` is what this info aims for. Unless `completely`,
    /// the ignored properties may differ.
    pub fn matches_target(&self, state: &BlockState, completely: bool) -> bool {
        let ignore: &[Property] = if completely { &[] } else { &self.ignore };
        self.expected_state.matches(state, ignore)
    }
}

// ---------------------------------------------------------------------------
// Processor traits
// ---------------------------------------------------------------------------

/// Rewrites a whole transition. Registered processors must not accept
/// overlapping pairs.
pub trait StateProcessor: Send + Sync {
    fn accepts(&self, state: &BlockState, target: &BlockState) -> bool;

    fn process(
        &self,
        info: &mut PreProcessingInfo,
        state: &BlockState,
        target: &BlockState,
        pos: BlockPos,
        world: &dyn WorldView,
    );
}

/// Narrows how a different block is replaced by the expected one.
pub trait PropertyPreProcessor: Send + Sync {
    fn accepts(&self, expected: &BlockState) -> bool;

    fn process(&self, info: &mut PreProcessingInfo, state: &BlockState, expected: &BlockState);
}

/// Adjusts work on a cell that already holds the expected block.
pub trait PropertyPostProcessor: Send + Sync {
    fn accepts(&self, state: &BlockState, expected: &BlockState) -> bool;

    fn process(&self, info: &mut PreProcessingInfo, state: &BlockState, expected: &BlockState);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

type CacheKey = (BlockState, BlockState);

/// Ordered processor lists plus the info cache. Shared by reference across
/// the planner's worker threads.
pub struct Registry {
    state_processors: Vec<Box<dyn StateProcessor>>,
    pre_processors: Vec<Box<dyn PropertyPreProcessor>>,
    post_processors: Vec<Box<dyn PropertyPostProcessor>>,
    cache: Mutex<FxHashMap<CacheKey, Option<PreProcessingInfo>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// The standard processors.
    pub fn new() -> Self {
        Self::empty()
            .with_state_processor(state::BambooProcessor)
            .with_state_processor(state::FireProcessor)
            .with_state_processor(state::FlowerPotProcessor)
            .with_pre_processor(property::AttachmentProcessor)
            .with_pre_processor(property::BlockFaceProcessor)
            .with_pre_processor(property::BlockHalfProcessor)
            .with_pre_processor(property::DoorHingeProcessor)
            .with_pre_processor(property::HopperFacingProcessor)
            .with_pre_processor(property::SlabProcessor)
            .with_post_processor(property::SlabProcessor)
            .with_post_processor(property::InteractToggleProcessor)
    }

    /// No processors at all: every non-empty target is placed as is.
    pub fn empty() -> Self {
        Self {
            state_processors: Vec::new(),
            pre_processors: Vec::new(),
            post_processors: Vec::new(),
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn with_state_processor(mut self, processor: impl StateProcessor + 'static) -> Self {
        self.state_processors.push(Box::new(processor));
        self
    }

    pub fn with_pre_processor(mut self, processor: impl PropertyPreProcessor + 'static) -> Self {
        self.pre_processors.push(Box::new(processor));
        self
    }

    pub fn with_post_processor(mut self, processor: impl PropertyPostProcessor + 'static) -> Self {
        self.post_processors.push(Box::new(processor));
        self
    }

    /// Number of cached `(current, expected)` pairs.
    pub fn cached(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// The info for turning `state` at `pos` into `target`, or `None` when
    /// the cell has to be broken first.
    pub fn processing_info(
        &self,
        state: &BlockState,
        target: &TargetState,
        pos: BlockPos,
        world: &dyn WorldView,
        agent: &Agent,
        inventory: &InventoryConfig,
    ) -> Option<PreProcessingInfo> {
        let expected = target.expected_state(pos, world, agent, inventory);
        let key = (state.clone(), expected.clone());
        if let Some(hit) = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(&key) {
            return hit.clone();
        }

        let item = target.required_item(agent, inventory);
        let info = self.process(state, expected, item, pos, world);
        if info.as_ref().is_none_or(|i| !i.no_caching) {
            trace!(%pos, "caching preprocessing info");
            self.cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key, info.clone());
        }
        info
    }

    fn process(
        &self,
        state: &BlockState,
        expected: BlockState,
        item: Item,
        pos: BlockPos,
        world: &dyn WorldView,
    ) -> Option<PreProcessingInfo> {
        let target = expected.clone();
        let mut info = PreProcessingInfo::new(expected, item);

        let claimed = self
            .state_processors
            .iter()
            .find(|p| p.accepts(state, &target));
        if let Some(processor) = claimed {
            processor.process(&mut info, state, &target, pos, world);
            return Some(info);
        }

        let expected = info.expected_state.clone();
        if state.kind() != expected.kind() {
            if !state.is_replaceable() {
                return None;
            }
            for processor in self.pre_processors.iter().filter(|p| p.accepts(&expected)) {
                processor.process(&mut info, state, &expected);
            }
        } else {
            for processor in self.post_processors.iter().filter(|p| p.accepts(state, &expected)) {
                processor.process(&mut info, state, &expected);
            }
        }
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::geometry::Vec3;
    use crate::state::{PropertyValue, SlabType};
    use crate::visibility::ScanMode;
    use crate::world::GridWorld;

    fn world() -> GridWorld {
        let mut w = GridWorld::new(8, 8, 8);
        w.fill(BlockPos::new(0, 0, 0), BlockPos::new(7, 0, 7), &BlockState::of(BlockKind::Dirt));
        w
    }

    fn info(registry: &Registry, w: &GridWorld, pos: BlockPos, target: TargetState) -> Option<PreProcessingInfo> {
        let agent = Agent::new(Vec3::new(4.5, 1.0, 4.5));
        registry.processing_info(
            &w.block_state(pos),
            &target,
            pos,
            w,
            &agent,
            &InventoryConfig::default(),
        )
    }

    #[test]
    fn plain_placement_keeps_defaults() {
        let w = world();
        let i = info(&Registry::new(), &w, BlockPos::new(1, 1, 1), TargetState::Block(BlockKind::Stone)).unwrap();
        assert!(i.placing);
        assert_eq!(i.sides, SideSet::ALL);
        assert_eq!(i.item, Item::Block(BlockKind::Stone));
        assert!(i.ignore.contains(&Property::Waterlogged));
    }

    #[test]
    fn foreign_solid_block_has_no_info() {
        let mut w = world();
        let pos = BlockPos::new(1, 1, 1);
        w.set(pos, BlockState::of(BlockKind::Cobblestone));
        assert!(info(&Registry::new(), &w, pos, TargetState::Block(BlockKind::Stone)).is_none());
    }

    #[test]
    fn infos_are_cached_per_pair() {
        let w = world();
        let registry = Registry::new();
        info(&registry, &w, BlockPos::new(1, 1, 1), TargetState::Block(BlockKind::Stone));
        info(&registry, &w, BlockPos::new(2, 1, 1), TargetState::Block(BlockKind::Stone));
        assert_eq!(registry.cached(), 1);
        info(&registry, &w, BlockPos::new(2, 1, 1), TargetState::Block(BlockKind::Glass));
        assert_eq!(registry.cached(), 2);
    }

    #[test]
    fn bamboo_is_never_cached() {
        let w = world();
        let registry = Registry::new();
        info(&registry, &w, BlockPos::new(1, 1, 1), TargetState::Block(BlockKind::Bamboo));
        assert_eq!(registry.cached(), 0);
    }

    #[test]
    fn first_half_scan_offered_sticks() {
        let mut i = PreProcessingInfo::new(BlockState::of(BlockKind::OakSlab), Item::Empty);
        i.offer_surface_scan(SurfaceScan::new(ScanMode::LesserBlockHalf, crate::types::Axis::Y));
        i.offer_surface_scan(SurfaceScan::new(ScanMode::GreaterBlockHalf, crate::types::Axis::X));
        i.offer_surface_scan(SurfaceScan::DEFAULT);
        assert_eq!(i.surface_scan.mode, ScanMode::LesserBlockHalf);
    }

    #[test]
    fn matches_target_ignores_post_processed_properties() {
        let slab = BlockState::of(BlockKind::OakSlab);
        let i = PreProcessingInfo::new(slab.clone(), Item::Block(BlockKind::OakSlab));
        let wet = slab.with(Property::Waterlogged, PropertyValue::Bool(true));
        assert!(i.matches_target(&wet, false));
        assert!(!i.matches_target(&wet, true));
        let top = wet.with(Property::SlabType, PropertyValue::Slab(SlabType::Top));
        assert!(!i.matches_target(&top, false));
    }

    #[test]
    fn empty_registry_places_everything_as_is() {
        let w = world();
        let target = TargetState::Block(BlockKind::Fire);
        let i = info(&Registry::empty(), &w, BlockPos::new(1, 1, 1), target).unwrap();
        assert!(i.placing);
        assert_eq!(i.item, Item::Empty);
    }
}
