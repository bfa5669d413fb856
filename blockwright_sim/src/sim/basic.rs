// Pre-flight checks run before any simulator.
//
// A fixed chain, stopping at the first failure: unloaded chunk, already
// done, ignored block (break route only), restricted game mode, operator
// block without operator rights, outside the world, unbreakable block.

use super::{SimContext, is_done};
use crate::result::generic::Ignored;
use crate::result::pre_sim::{
    ChunkNotLoaded, NoPermission, OutOfWorld, PreSimResult, Restricted, Unbreakable,
};
use crate::result::{BuildResult, GenericResult};
use crate::state::BlockState;
use crate::target::TargetState;
use crate::types::BlockPos;

/// The result that ends simulation of `pos` early, if any. `breaking` is
/// true when the position is routed to the break simulator.
pub fn check(
    ctx: &SimContext<'_>,
    pos: BlockPos,
    state: &BlockState,
    target: &TargetState,
    breaking: bool,
) -> Option<BuildResult> {
    let world = ctx.world;
    let agent = ctx.agent;

    if !world.is_loaded(pos) {
        return Some(PreSimResult::ChunkNotLoaded(ChunkNotLoaded { pos }).into());
    }
    if is_done(ctx, pos, state, target) {
        return Some(PreSimResult::done(pos).into());
    }
    if breaking && ctx.config.breaking.ignored_blocks.contains(&state.kind()) {
        return Some(GenericResult::Ignored(Ignored { pos }).into());
    }
    if agent.is_block_breaking_restricted() {
        return Some(PreSimResult::Restricted(Restricted { pos }).into());
    }
    if state.kind().is_operator_only() && !agent.is_creative_op() {
        return Some(
            PreSimResult::NoPermission(NoPermission {
                pos,
                state: state.clone(),
            })
            .into(),
        );
    }
    if !world.border_contains(pos) || world.is_out_of_height_limit(pos) {
        return Some(PreSimResult::OutOfWorld(OutOfWorld { pos }).into());
    }
    if state.hardness() < 0.0 && !agent.is_creative() {
        return Some(
            PreSimResult::Unbreakable(Unbreakable {
                pos,
                state: state.clone(),
            })
            .into(),
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, GameMode};
    use crate::block::BlockKind;
    use crate::config::PlannerConfig;
    use crate::processing::Registry;
    use crate::world::WorldView;
    use crate::result::Rank;
    use crate::world::{GridWorld, WorldBorder};
    use proptest::prelude::*;

    fn world() -> GridWorld {
        let mut w = GridWorld::new(32, 16, 32);
        w.fill(BlockPos::new(0, 0, 0), BlockPos::new(31, 0, 31), &BlockState::of(BlockKind::Stone));
        w
    }

    fn rank_of(w: &GridWorld, agent: &Agent, config: &PlannerConfig, pos: BlockPos, target: TargetState) -> Option<Rank> {
        let registry = Registry::new();
        let ctx = SimContext::new(w, agent, config, &registry);
        check(&ctx, pos, &w.block_state(pos), &target, true).map(|r| r.rank())
    }

    fn agent() -> Agent {
        Agent::standing_on(BlockPos::new(4, 0, 4))
    }

    #[test]
    fn unloaded_comes_first() {
        let mut w = world();
        let pos = BlockPos::new(20, 0, 20);
        w.unload_chunk(pos.chunk());
        let rank = rank_of(&w, &agent(), &PlannerConfig::default(), pos, TargetState::Block(BlockKind::Stone));
        assert_eq!(rank, Some(Rank::ChunkNotLoaded));
    }

    #[test]
    fn matching_state_is_done() {
        let rank = rank_of(&world(), &agent(), &PlannerConfig::default(), BlockPos::new(5, 0, 5), TargetState::solid());
        assert_eq!(rank, Some(Rank::Done));
    }

    #[test]
    fn ignored_blocks_are_skipped() {
        let mut config = PlannerConfig::default();
        config.breaking.ignored_blocks.push(BlockKind::Stone);
        let rank = rank_of(&world(), &agent(), &config, BlockPos::new(5, 0, 5), TargetState::Air);
        assert_eq!(rank, Some(Rank::Ignored));
    }

    #[test]
    fn adventure_mode_is_restricted() {
        let mut a = agent();
        a.game_mode = GameMode::Adventure;
        let rank = rank_of(&world(), &a, &PlannerConfig::default(), BlockPos::new(5, 0, 5), TargetState::Air);
        assert_eq!(rank, Some(Rank::BreakRestricted));
    }

    #[test]
    fn command_blocks_need_creative_op() {
        let mut w = world();
        let pos = BlockPos::new(5, 1, 5);
        w.set(pos, BlockState::of(BlockKind::CommandBlock));
        let config = PlannerConfig::default();
        assert_eq!(rank_of(&w, &agent(), &config, pos, TargetState::Air), Some(Rank::BreakNoPermission));

        let mut op = agent();
        op.game_mode = GameMode::Creative;
        op.op_level = 2;
        assert_eq!(rank_of(&w, &op, &config, pos, TargetState::Air), None);
    }

    #[test]
    fn outside_border_is_out_of_world() {
        let mut w = world();
        w.set_border(WorldBorder {
            min_x: 0,
            min_z: 0,
            max_x: 8,
            max_z: 8,
        });
        let rank = rank_of(&w, &agent(), &PlannerConfig::default(), BlockPos::new(10, 0, 10), TargetState::Air);
        assert_eq!(rank, Some(Rank::OutOfWorld));
    }

    #[test]
    fn above_height_limit_is_out_of_world() {
        let mut w = world();
        w.set_height_limit(0, 4);
        let config = PlannerConfig::default();
        let above = BlockPos::new(5, 4, 5);
        assert_eq!(rank_of(&w, &agent(), &config, above, TargetState::solid()), Some(Rank::OutOfWorld));
        let below = BlockPos::new(5, 3, 5);
        assert_eq!(rank_of(&w, &agent(), &config, below, TargetState::solid()), None);
    }

    #[test]
    fn bedrock_is_unbreakable_outside_creative() {
        let mut w = world();
        let pos = BlockPos::new(5, 0, 5);
        w.set(pos, BlockState::of(BlockKind::Bedrock));
        let config = PlannerConfig::default();
        assert_eq!(rank_of(&w, &agent(), &config, pos, TargetState::Air), Some(Rank::Unbreakable));

        let mut creative = agent();
        creative.game_mode = GameMode::Creative;
        assert_eq!(rank_of(&w, &creative, &config, pos, TargetState::Air), None);
    }

    fn any_kind() -> impl Strategy<Value = BlockKind> {
        proptest::sample::select(BlockKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn matching_targets_are_always_done(kind in any_kind(), x in 1..30i32, z in 1..30i32) {
            let mut w = world();
            let pos = BlockPos::new(x, 2, z);
            w.set(pos, BlockState::of(kind));
            let rank = rank_of(&w, &agent(), &PlannerConfig::default(), pos, TargetState::Block(kind));
            prop_assert_eq!(rank, Some(Rank::Done));
        }

        #[test]
        fn unloaded_positions_never_get_further(kind in any_kind(), y in 0..16i32) {
            let mut w = world();
            let pos = BlockPos::new(20, y, 20);
            w.unload_chunk(pos.chunk());
            let rank = rank_of(&w, &agent(), &PlannerConfig::default(), pos, TargetState::Block(kind));
            prop_assert_eq!(rank, Some(Rank::ChunkNotLoaded));
        }
    }
}
