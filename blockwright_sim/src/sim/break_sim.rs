// Break simulator.
//
// Decides how the block at a position is broken, or why it should not be
// yet. Checked in order:
// 1. The agent stands on the block (`PlayerOnTop`), when configured to
//    avoid that.
// 2. The cell holds fluid in a replaceable block: the fluid is displaced
//    first (`Submerge`), by a nested `Solid` simulation at the same cell.
// 3. Breaking would let fluid flow, directly or through falling blocks
//    above and beside the cell: one `Submerge` per fluid cell plus a
//    `BlockedByFluid` summary, when configured to avoid that.
// 4. The tool: the best hotbar stack passing the configured filters, or
//    `WrongItemSelection`.
// 5. The aim: when the eye is inside the block the current aim is reused,
//    otherwise every face is scanned and the point selection picks one.
//
// See also: `sim/mod.rs` for routing and `scan_shape`, `inventory.rs` for
// `StackSelection`, `item.rs` for the breaking-speed math.

use super::{Scan, SimContext, dependencies, scan_shape};
use crate::config::BreakConfig;
use crate::error::SimError;
use crate::geometry::Vec3;
use crate::inventory::{ContainerSelection, StackFilter, StackSelection, StackSort};
use crate::item::{self, ItemStack, ToolTier};
use crate::result::breaking::{BlockedByFluid, Break, PlayerOnTop, Submerge};
use crate::result::context::BreakContextParams;
use crate::result::generic::{Ignored, WrongItemSelection};
use crate::result::{BreakContext, BreakResult, BuildResult, Dependency, GenericResult};
use crate::rotation::{RequestOwner, Rotation, RotationRequest};
use crate::state::BlockState;
use crate::target::TargetState;
use crate::types::{BlockPos, Direction, SideSet};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

fn wrap(dependency: Dependency) -> BuildResult {
    BreakResult::Dependency(dependency).into()
}

#[instrument(skip_all, name = "break_sim", fields(%pos))]
pub fn simulate(
    ctx: &SimContext<'_>,
    pos: BlockPos,
    state: &BlockState,
) -> Result<Vec<BuildResult>, SimError> {
    let config = &ctx.config.breaking;

    if config.avoid_supporting && ctx.agent.supporting_block(ctx.world) == Some(pos) {
        let on_top = PlayerOnTop {
            pos,
            state: state.clone(),
        };
        return Ok(vec![BreakResult::PlayerOnTop(on_top).into()]);
    }

    if state.has_fluid() && state.is_replaceable() {
        let submerge = Submerge {
            pos,
            state: state.clone(),
        };
        let mut out = vec![BreakResult::Submerge(submerge).into()];
        out.extend(dependencies(ctx, pos, pos, &TargetState::solid(), wrap)?);
        return Ok(out);
    }

    let fluid = if config.avoid_liquids {
        fluid_blockage(ctx, pos, state)
    } else {
        None
    };
    if let Some(blocked) = fluid {
        return Ok(blocked);
    }

    let selection = tool_selection(config, state);
    let hotbar = ctx
        .agent
        .inventory
        .find_containers_with_material(&selection, &ContainerSelection::hotbar());
    let candidates = hotbar.iter().flat_map(|c| c.matching_stacks(&selection));
    let ranked = selection.filter_stacks(candidates, ctx.agent);
    let Some(stack) = ranked.first().copied() else {
        let wrong = WrongItemSelection {
            pos,
            needed: selection,
            current: ctx.agent.inventory.main_hand().clone(),
        };
        return Ok(vec![GenericResult::WrongItemSelection(wrong).into()]);
    };

    let held = if config.swap_tools {
        stack
    } else {
        ctx.agent.inventory.main_hand()
    };
    let instant = item::instant_breakable(state, held, ctx.agent, config.break_threshold);
    debug!(tool = %stack.item, instant, "picked tool");

    Ok(aim(ctx, pos, state, stack, selection, instant)
        .into_iter()
        .collect())
}

/// The filters and sort order for picking a tool against `state`.
pub fn tool_selection(config: &BreakConfig, state: &BlockState) -> StackSelection {
    let tiers = [
        (ToolTier::Wooden, config.use_wooden_tools),
        (ToolTier::Stone, config.use_stone_tools),
        (ToolTier::Iron, config.use_iron_tools),
        (ToolTier::Golden, config.use_gold_tools),
        (ToolTier::Diamond, config.use_diamond_tools),
        (ToolTier::Netherite, config.use_netherite_tools),
    ];
    let selection = StackSelection::everything()
        .filter_if(config.efficient_only, StackFilter::EfficientFor(state.clone()))
        .filter_if(config.suitable_tools_only, StackFilter::SuitableFor(state.clone()))
        .filter_if(config.force_silk_touch, StackFilter::SilkTouch)
        .filter_if(config.force_fortune, StackFilter::MinFortune(config.min_fortune_level));
    tiers
        .into_iter()
        .fold(selection, |s, (tier, allowed)| s.filter_if(!allowed, StackFilter::ExcludeTier(tier)))
        .sort_by(StackSort::CanHarvest(state.clone()))
        .sort_by(StackSort::BreakDelta(state.clone()))
        .sort_by(StackSort::SelectedSlot)
}

/// The `Break` result, or the scan failure explaining its absence. `None`
/// when the eye is inside the block and the current aim hits nothing.
fn aim(
    ctx: &SimContext<'_>,
    pos: BlockPos,
    state: &BlockState,
    stack: &ItemStack,
    selection: StackSelection,
    instant: bool,
) -> Option<BuildResult> {
    let build = &ctx.config.build;
    let pov = ctx.pov;
    let owner = RequestOwner::Break(pos);
    let params = BreakContextParams {
        pov,
        entity_reach: build.entity_reach,
        sorter: ctx.config.breaking.sorter,
        seed: ctx.config.seed,
        state,
    };

    let shape = state.outline_shape();
    let inside = shape.at(pos).any(|b| b.contains(pov));
    let (hit, request) = if inside {
        let end = pov + ctx.agent.server_rotation.vector() * build.block_reach;
        let hit = ctx.world.raycast(pov, end)?;
        let request = RotationRequest::fixed(Rotation::rotation_to(pov, Vec3::center_of(pos)), owner);
        (hit, request)
    } else {
        let hits = match scan_shape(ctx, pov, &shape, pos, pos, SideSet::ALL, None) {
            Scan::Hits(hits) => hits,
            Scan::Missed(result) => return Some(result),
        };
        let best = build.point_selection.select(&hits, ctx.agent.server_rotation)?;
        (best.hit, RotationRequest::fixed(best.rotation, owner))
    };

    let context = BreakContext::new(hit, request, stack.slot, selection, instant, inside, params);
    Some(BreakResult::Break(Break { pos, context }).into())
}

/// Fluids that would start flowing if `pos` were broken. `None` when there
/// are none; otherwise the results that block the break.
fn fluid_blockage(ctx: &SimContext<'_>, pos: BlockPos, state: &BlockState) -> Option<Vec<BuildResult>> {
    let world = ctx.world;

    // Falling blocks that would come down once `pos` is gone.
    let mut affected = BTreeSet::from([pos]);
    let mut queue = vec![pos];
    while let Some(current) = queue.pop() {
        for side in Direction::ALL {
            let next = current.offset(side);
            if !world.block_state(next).kind().is_falling() || affected.contains(&next) {
                continue;
            }
            if side == Direction::Up || world.block_state(next.down()).kind().can_fall_through() {
                affected.insert(next);
                queue.push(next);
            }
        }
    }

    let mut fluids: BTreeMap<BlockPos, BlockState> = BTreeMap::new();
    for block in &affected {
        for side in Direction::ALL {
            if side == Direction::Down {
                continue;
            }
            let next = block.offset(side);
            let neighbour = world.block_state(next);
            let fluid = neighbour.fluid_state();
            if fluid.is_empty() || !fluid.fluid.is_flowable() {
                continue;
            }
            let flows = side == Direction::Up
                || neighbour.kind().is_waterloggable()
                || fluid.level > fluid.fluid.level_decrease_per_block();
            if flows {
                fluids.insert(next, neighbour);
            }
        }
    }

    if fluids.is_empty() {
        return None;
    }
    debug!(%pos, fluids = fluids.len(), "break would release fluid");
    if fluids.keys().any(|p| !world.border_contains(*p)) {
        return Some(vec![GenericResult::Ignored(Ignored { pos }).into()]);
    }

    let mut out: Vec<BuildResult> = fluids
        .iter()
        .map(|(p, s)| {
            BreakResult::Submerge(Submerge {
                pos: *p,
                state: s.clone(),
            })
            .into()
        })
        .collect();
    out.push(
        BreakResult::BlockedByFluid(BlockedByFluid {
            pos,
            state: state.clone(),
            affected: fluids.into_keys().collect(),
        })
        .into(),
    );
    Some(out)
}
