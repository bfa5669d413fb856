// State processors for transitions that are not a plain placement.

use super::{PreProcessingInfo, StateProcessor};
use crate::block::BlockKind;
use crate::item::Item;
use crate::state::BlockState;
use crate::types::BlockPos;
use crate::world::WorldView;

/// Bamboo is planted as a sapling and grows on its own. A sapling already
/// in place needs nothing but time; anywhere else the first block is a
/// sapling unless it continues a stalk.
pub struct BambooProcessor;

impl StateProcessor for BambooProcessor {
    fn accepts(&self, state: &BlockState, target: &BlockState) -> bool {
        (state.is_replaceable() || state.kind() == BlockKind::BambooSapling)
            && target.kind() == BlockKind::Bamboo
    }

    fn process(
        &self,
        info: &mut PreProcessingInfo,
        state: &BlockState,
        _target: &BlockState,
        pos: BlockPos,
        world: &dyn WorldView,
    ) {
        if state.kind() == BlockKind::BambooSapling {
            info.omit_placement = true;
            return;
        }
        // Depends on the block below, so the answer is per position.
        info.no_caching = true;
        let below = world.block_state(pos.down()).kind();
        if !matches!(below, BlockKind::Bamboo | BlockKind::BambooSapling) {
            info.expected_state = BlockState::of(BlockKind::BambooSapling);
        }
    }
}

/// Fire is lit with flint and steel, never placed.
pub struct FireProcessor;

impl StateProcessor for FireProcessor {
    fn accepts(&self, state: &BlockState, target: &BlockState) -> bool {
        state.is_replaceable() && target.kind() == BlockKind::Fire
    }

    fn process(
        &self,
        info: &mut PreProcessingInfo,
        _state: &BlockState,
        _target: &BlockState,
        _pos: BlockPos,
        _world: &dyn WorldView,
    ) {
        info.item = Item::FlintAndSteel;
        info.placing = false;
    }
}

/// A potted flower is an empty pot first, then the flower is used on it.
pub struct FlowerPotProcessor;

impl StateProcessor for FlowerPotProcessor {
    fn accepts(&self, state: &BlockState, target: &BlockState) -> bool {
        (state.is_replaceable() || state.kind() == BlockKind::FlowerPot)
            && target.kind().is_potted_flower()
    }

    fn process(
        &self,
        info: &mut PreProcessingInfo,
        state: &BlockState,
        target: &BlockState,
        _pos: BlockPos,
        _world: &dyn WorldView,
    ) {
        if state.kind() != BlockKind::FlowerPot {
            info.expected_state = BlockState::of(BlockKind::FlowerPot);
            info.item = Item::Block(BlockKind::FlowerPot);
        } else {
            info.placing = false;
            info.item = target.kind().item();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::GridWorld;

    fn world_with_below(kind: BlockKind) -> GridWorld {
        let mut w = GridWorld::new(4, 4, 4);
        w.set(BlockPos::new(1, 0, 1), BlockState::of(kind));
        w
    }

    fn run(p: &dyn StateProcessor, state: BlockKind, target: BlockKind, w: &GridWorld) -> Option<PreProcessingInfo> {
        let (state, target) = (BlockState::of(state), BlockState::of(target));
        if !p.accepts(&state, &target) {
            return None;
        }
        let mut info = PreProcessingInfo::new(target.clone(), target.kind().item());
        p.process(&mut info, &state, &target, BlockPos::new(1, 1, 1), w);
        Some(info)
    }

    #[test]
    fn bamboo_starts_as_sapling_on_soil() {
        let w = world_with_below(BlockKind::Dirt);
        let info = run(&BambooProcessor, BlockKind::Air, BlockKind::Bamboo, &w).unwrap();
        assert_eq!(info.expected_state.kind(), BlockKind::BambooSapling);
        assert!(info.no_caching);
        assert_eq!(info.item, Item::Block(BlockKind::Bamboo));
    }

    #[test]
    fn bamboo_continues_a_stalk() {
        let w = world_with_below(BlockKind::Bamboo);
        let info = run(&BambooProcessor, BlockKind::Air, BlockKind::Bamboo, &w).unwrap();
        assert_eq!(info.expected_state.kind(), BlockKind::Bamboo);
    }

    #[test]
    fn sapling_only_waits() {
        let w = world_with_below(BlockKind::Dirt);
        let info = run(&BambooProcessor, BlockKind::BambooSapling, BlockKind::Bamboo, &w).unwrap();
        assert!(info.omit_placement);
        assert!(!info.no_caching);
    }

    #[test]
    fn fire_needs_flint_and_no_placement() {
        let w = world_with_below(BlockKind::Stone);
        let info = run(&FireProcessor, BlockKind::Air, BlockKind::Fire, &w).unwrap();
        assert_eq!(info.item, Item::FlintAndSteel);
        assert!(!info.placing);
        assert!(run(&FireProcessor, BlockKind::Stone, BlockKind::Fire, &w).is_none());
    }

    #[test]
    fn flower_pot_is_placed_then_filled() {
        let w = world_with_below(BlockKind::Stone);
        let first = run(&FlowerPotProcessor, BlockKind::Air, BlockKind::PottedPoppy, &w).unwrap();
        assert_eq!(first.expected_state.kind(), BlockKind::FlowerPot);
        assert_eq!(first.item, Item::Block(BlockKind::FlowerPot));
        assert!(first.placing);

        let second = run(&FlowerPotProcessor, BlockKind::FlowerPot, BlockKind::PottedPoppy, &w).unwrap();
        assert_eq!(second.expected_state.kind(), BlockKind::PottedPoppy);
        assert_eq!(second.item, Item::Block(BlockKind::Poppy));
        assert!(!second.placing);
    }
}
