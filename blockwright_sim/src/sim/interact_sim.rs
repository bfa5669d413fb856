// Interact simulator.
//
// Decides how a position is brought to its expected state by using an item
// on a block face: placing a block, or right-clicking one (toggling a door,
// lighting fire, filling a pot). Every allowed side of the position is a
// branch, and so is every neighbour face the block could be placed
// against. Branches are independent and run on rayon.
//
// Per branch:
// 1. Scan the tested face for reachable points and pick one.
// 2. Find the hotbar stack to use (`WrongItemSelection` when none).
// 3. Non-placing interactions end here with an `Interact`.
// 4. Placements resolve the landing cell and reject scaffolding overruns,
//    clicks that land elsewhere, clicks the agent may not make, and
//    landing cells that are occupied.
// 5. The orientation search tries agent rotations until the placed state
//    matches the expected one. When none does, the branch explains why:
//    entities in the way (`BlockedByEntity`, with nested breaks of their
//    footing when spleefing), or `NoIntegrity`.
// 6. An item whose feature is switched off in this world cancels the
//    remaining branches (`BlockFeatureDisabled`).
//
// See also: `placement.rs` for `PlacementContext`, `sim/mod.rs` for
// `scan_shape` and the branch-order collection rule.
//
// **Critical constraint: determinism.** Branch outputs are concatenated in
// branch order. Cancellation only saves work: once any branch reports the
// item disabled, that report is the whole result.

use super::{CancelToken, Scan, SimContext, dependencies, scan_shape};
use crate::agent::Agent;
use crate::error::SimError;
use crate::geometry::{Aabb, Shape};
use crate::inventory::{ContainerSelection, StackSelection, StackSort};
use crate::item::ItemStack;
use crate::placement::{PlacementContext, sign_rotation_to_yaw};
use crate::processing::PreProcessingInfo;
use crate::result::generic::WrongItemSelection;
use crate::result::interact::{
    BlockFeatureDisabled, BlockedByEntity, BlockedBySelf, CantReplace, IllegalUsage, Interact,
    NoIntegrity, ScaffoldExceeded, UnexpectedPosition,
};
use crate::result::{BuildResult, Dependency, GenericResult, InteractContext, InteractResult};
use crate::rotation::{PlaceDirection, RequestOwner, Rotation, RotationRequest};
use crate::state::{BlockState, Property};
use crate::target::TargetState;
use crate::types::{BlockPos, Direction, SideSet};
use crate::visibility::{CheckedHit, ScanRestriction};
use crate::world::{Entity, EntityId};
use rayon::prelude::*;
use tracing::{debug, info_span, instrument, trace};

fn wrap(dependency: Dependency) -> BuildResult {
    InteractResult::Dependency(dependency).into()
}

#[instrument(skip_all, name = "interact_sim", fields(%pos))]
pub fn simulate(
    ctx: &SimContext<'_>,
    pos: BlockPos,
    state: &BlockState,
    info: &PreProcessingInfo,
) -> Result<Vec<BuildResult>, SimError> {
    let against_neighbours = info.placing || state.outline_shape().is_empty();
    let branches: Vec<(BlockPos, Direction)> = info
        .sides
        .iter()
        .flat_map(|side| {
            let neighbour = against_neighbours.then_some((pos.offset(side), side.opposite()));
            std::iter::once((pos, side)).chain(neighbour)
        })
        .collect();

    let sim = InteractSim {
        ctx: *ctx,
        pos,
        state,
        info,
        cancel: CancelToken::new(),
    };
    let outputs: Vec<Result<Vec<BuildResult>, SimError>> = {
        let _span = info_span!("interact_branches", count = branches.len()).entered();
        branches
            .par_iter()
            .map(|&(tested, side)| sim.branch(tested, side))
            .collect()
    };

    let mut results = Vec::new();
    for output in outputs {
        results.extend(output?);
    }

    let disabled = results.iter().find(|r| {
        matches!(
            r,
            BuildResult::Interact(InteractResult::BlockFeatureDisabled(_))
        )
    });
    if let Some(disabled) = disabled {
        debug!("item feature disabled");
        return Ok(vec![disabled.clone()]);
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

struct InteractSim<'a> {
    ctx: SimContext<'a>,
    pos: BlockPos,
    state: &'a BlockState,
    info: &'a PreProcessingInfo,
    cancel: CancelToken,
}

/// Result of one try of the orientation search.
enum Attempt {
    Placed(BlockState),
    /// Refused: unsupported, or something is in the way.
    Blocked(PlacementContext),
    /// Placed, but not as expected.
    Mismatch(BlockState),
}

/// A successful orientation.
struct Orientation {
    state: BlockState,
    rotation: Rotation,
    /// The rotation the agent holds on the server would do as well.
    current_dir_valid: bool,
}

impl<'a> InteractSim<'a> {
    /// Click `side` of the block at `tested`.
    fn branch(&self, tested: BlockPos, side: Direction) -> Result<Vec<BuildResult>, SimError> {
        let mut out = Vec::new();
        let world = self.ctx.world;
        if self.cancel.is_cancelled() || !world.border_contains(tested) {
            return Ok(out);
        }

        let tested_state = world.block_state(tested);
        let outline = tested_state.outline_shape();
        let shape = if outline.is_empty() && self.ctx.config.interact.air_place {
            Shape::full_cube()
        } else {
            outline
        };
        if shape.is_empty() {
            return Ok(out);
        }

        // Clicking an interactive block would use it instead of placing.
        let sneak = tested_state.kind().is_interactive() && self.info.placing;
        let fake = self.ctx.agent.at_eye(self.ctx.pov, sneak);
        let pov = fake.eye_pos();

        let restrict = ScanRestriction {
            scan: self.info.surface_scan,
            origin: self.pos,
        };
        let sides = SideSet::only(side);
        let hits = match scan_shape(&self.ctx, pov, &shape, tested, self.pos, sides, Some(&restrict)) {
            Scan::Hits(hits) => hits,
            Scan::Missed(result) => {
                out.push(result);
                return Ok(out);
            }
        };
        let selection = self.ctx.config.build.point_selection;
        let Some(checked) = selection.select(&hits, self.ctx.agent.server_rotation) else {
            return Ok(out);
        };
        trace!(%tested, ?side, point = ?checked.point(), "selected hit");

        let stack = self.swap_stack(&mut out);
        if self.info.placing {
            self.place(&fake, checked, stack, &mut out)?;
        } else if let Some(stack) = stack {
            let request = RotationRequest::fixed(checked.rotation, self.owner());
            let context = self.context(checked, request, stack, self.info.expected_state.clone(), false, &fake, true);
            out.push(InteractResult::Interact(Interact { pos: self.pos, context }).into());
        }
        Ok(out)
    }

    fn owner(&self) -> RequestOwner {
        RequestOwner::Interact(self.pos)
    }

    #[allow(clippy::too_many_arguments)]
    fn context(
        &self,
        checked: CheckedHit,
        request: RotationRequest,
        stack: &ItemStack,
        expected: BlockState,
        placing: bool,
        fake: &Agent,
        current_dir_valid: bool,
    ) -> InteractContext {
        InteractContext::new(
            checked.hit,
            request,
            stack.slot,
            self.pos,
            self.state.clone(),
            expected,
            placing,
            fake.sneaking,
            current_dir_valid,
            fake.eye_pos(),
            self.ctx.config.interact.sorter,
            self.ctx.config.seed,
        )
    }

    /// The hotbar stack to use: the selected slot when it qualifies,
    /// otherwise the best match. Reports `WrongItemSelection` when the
    /// hotbar holds nothing usable.
    fn swap_stack(&self, out: &mut Vec<BuildResult>) -> Option<&'a ItemStack> {
        let agent: &'a Agent = self.ctx.agent;
        let selection = if self.info.item.is_empty() {
            StackSelection::everything().sort_by(StackSort::SelectedSlot)
        } else {
            StackSelection::of_item(self.info.item)
        };
        let containers = agent
            .inventory
            .find_containers_with_material(&selection, &ContainerSelection::hotbar());
        let Some(container) = containers.first() else {
            let wrong = WrongItemSelection {
                pos: self.pos,
                needed: selection,
                current: agent.inventory.main_hand().clone(),
            };
            out.push(GenericResult::WrongItemSelection(wrong).into());
            return None;
        };
        let stacks = selection.filter_stacks(container.matching_stacks(&selection), agent);
        stacks
            .iter()
            .find(|s| s.slot == agent.inventory.selected_slot)
            .or(stacks.first())
            .copied()
    }

    fn place(
        &self,
        fake: &Agent,
        checked: CheckedHit,
        stack: Option<&ItemStack>,
        out: &mut Vec<BuildResult>,
    ) -> Result<(), SimError> {
        let ctx = &self.ctx;
        let world = ctx.world;
        let pos = self.pos;
        let item = self.info.item;
        if item.block().is_none() {
            return Err(SimError::NotABlockItem { pos, item });
        }

        let Some(placement) =
            PlacementContext::resolve(world, item, checked.hit, checked.rotation, fake.sneaking)
        else {
            out.push(InteractResult::ScaffoldExceeded(ScaffoldExceeded { pos }).into());
            return Ok(());
        };
        if placement.pos != pos {
            let unexpected = UnexpectedPosition {
                pos,
                actual: placement.pos,
            };
            out.push(InteractResult::UnexpectedPosition(unexpected).into());
            return Ok(());
        }
        let clicked = world.block_state(checked.hit.pos).kind();
        if !ctx.agent.allow_modify_world && !stack.is_some_and(|s| s.can_place_on(clicked)) {
            out.push(InteractResult::IllegalUsage(IllegalUsage { pos }).into());
            return Ok(());
        }
        if !placement.can_place(world) {
            let cant = CantReplace {
                pos,
                landing: placement.pos,
            };
            out.push(InteractResult::CantReplace(cant).into());
            return Ok(());
        }

        let Some(found) = self.orientation(&placement, out)? else {
            return Ok(());
        };
        let expected = &self.info.expected_state;
        let request = if ctx.config.interact.axis_rotate && !expected.has(Property::Rotation) {
            RotationRequest::look_in_direction(PlaceDirection::from_rotation(found.rotation), self.owner())
        } else {
            RotationRequest::fixed(found.rotation, self.owner())
        };

        let Some(stack) = stack else {
            return Ok(());
        };
        if !world.is_item_enabled(stack.item) {
            let disabled = BlockFeatureDisabled {
                pos,
                stack: stack.clone(),
            };
            out.push(InteractResult::BlockFeatureDisabled(disabled).into());
            self.cancel.cancel();
            return Ok(());
        }

        let context = self.context(checked, request, stack, found.state, true, fake, found.current_dir_valid);
        out.push(InteractResult::Interact(Interact { pos, context }).into());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Orientation search
    // -----------------------------------------------------------------------

    /// Rotations to try, in order. Without axis rotation only the aimed
    /// rotation counts.
    fn rotations(&self, aimed: Rotation) -> Vec<Rotation> {
        if !self.ctx.config.interact.axis_rotate {
            return vec![aimed];
        }
        let mut rotations = vec![aimed, self.ctx.agent.rotation];
        if let Some(step) = self.info.expected_state.int(Property::Rotation) {
            for step in [step, (step + 8) & 15] {
                for pitch in [90.0, 0.0, -90.0] {
                    rotations.push(Rotation::new(sign_rotation_to_yaw(step), pitch));
                }
            }
        }
        rotations.extend(PlaceDirection::ALL.iter().rev().map(|d| d.rotation()));
        rotations
    }

    fn attempt(&self, placement: &PlacementContext, rotation: Rotation) -> Attempt {
        let rotated = PlacementContext {
            rotation,
            ..placement.clone()
        };
        match rotated.checked_placement_state(self.ctx.world, self.ctx.agent) {
            None => Attempt::Blocked(rotated),
            Some(state) if self.info.matches_target(&state, false) => Attempt::Placed(state),
            Some(state) => Attempt::Mismatch(state),
        }
    }

    /// The first rotation producing the expected state. When there is none,
    /// the reasons are pushed to `out` instead.
    fn orientation(
        &self,
        placement: &PlacementContext,
        out: &mut Vec<BuildResult>,
    ) -> Result<Option<Orientation>, SimError> {
        let server = self.ctx.agent.server_rotation;
        let current_dir_valid = matches!(self.attempt(placement, server), Attempt::Placed(_));

        let mut blocked = None;
        let mut mismatch = None;
        for rotation in self.rotations(placement.rotation) {
            match self.attempt(placement, rotation) {
                Attempt::Placed(state) => {
                    trace!(?rotation, current_dir_valid, "orientation found");
                    return Ok(Some(Orientation {
                        state,
                        rotation,
                        current_dir_valid,
                    }));
                }
                Attempt::Blocked(rotated) => blocked = Some(rotated),
                Attempt::Mismatch(state) => mismatch = Some(state),
            }
        }

        let explained = match &blocked {
            Some(rotated) => self.entity_blockage(rotated, out)?,
            None => false,
        };
        if mismatch.is_some() || !explained {
            let no_integrity = NoIntegrity {
                pos: self.pos,
                expected: self.info.expected_state.clone(),
                actual: mismatch,
                hit: placement.hit,
            };
            out.push(InteractResult::NoIntegrity(no_integrity).into());
        }
        Ok(None)
    }

    /// Report entities whose hitbox the placed block would overlap. False
    /// when nothing is in the way.
    fn entity_blockage(
        &self,
        placement: &PlacementContext,
        out: &mut Vec<BuildResult>,
    ) -> Result<bool, SimError> {
        let world = self.ctx.world;
        let agent = self.ctx.agent;
        let Some(state) = placement.placement_state(world) else {
            return Ok(false);
        };
        let boxes: Vec<Aabb> = state.collision_shape().at(placement.pos).collect();
        let self_blocked = boxes.iter().any(|b| agent.hitbox().intersects(b));
        let mut entities: Vec<&Entity> = Vec::new();
        for b in &boxes {
            for entity in world.entities_in(b) {
                if !entities.iter().any(|e| e.id == entity.id) {
                    entities.push(entity);
                }
            }
        }
        if !self_blocked && entities.is_empty() {
            return Ok(false);
        }

        if self.ctx.config.build.spleef_entities {
            if self_blocked {
                out.push(InteractResult::BlockedBySelf(BlockedBySelf { pos: placement.pos }).into());
            }
            let y = placement.pos.y;
            for entity in &entities {
                let min_y = (f64::from(y) - entity.height()).floor() as i32;
                for footing in entity.positions_within_hitbox_xz(min_y, y) {
                    out.extend(dependencies(&self.ctx, self.pos, footing, &TargetState::Empty, wrap)?);
                }
            }
        }

        let mut ids: Vec<EntityId> = entities.iter().map(|e| e.id).collect();
        if self_blocked {
            ids.insert(0, agent.id);
        }
        debug!(pos = %placement.pos, count = ids.len(), "placement blocked by entities");
        let blocked = BlockedByEntity {
            pos: self.pos,
            entities: ids,
            hit_point: placement.hit.point,
            side: placement.hit.side,
        };
        out.push(InteractResult::BlockedByEntity(blocked).into());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::config::PlannerConfig;
    use crate::geometry::Vec3;
    use crate::inventory::Inventory;
    use crate::item::Item;
    use crate::processing::Registry;
    use crate::result::Rank;
    use crate::world::WorldView;
    use crate::rotation::RotationTarget;
    use crate::state::PropertyValue;
    use crate::types::Axis;
    use crate::world::GridWorld;

    const TARGET: BlockPos = BlockPos::new(6, 1, 5);

    fn floor_world() -> GridWorld {
        let mut w = GridWorld::new(16, 8, 16);
        w.fill(BlockPos::new(0, 0, 0), BlockPos::new(15, 0, 15), &BlockState::of(BlockKind::Stone));
        w
    }

    fn agent_holding(item: Item) -> Agent {
        Agent::standing_on(BlockPos::new(5, 0, 5)).with_inventory(Inventory::new().with(ItemStack::new(item, 64, 0)))
    }

    fn run(w: &GridWorld, agent: &Agent, config: &PlannerConfig, target: TargetState) -> Vec<BuildResult> {
        let registry = Registry::new();
        let ctx = SimContext::new(w, agent, config, &registry);
        crate::sim::simulate(&ctx, TARGET, &target).unwrap()
    }

    /// Rotations the orientation search would try for `expected` at `TARGET`.
    fn search_order(agent: &Agent, config: &PlannerConfig, expected: BlockState, aimed: Rotation) -> Vec<Rotation> {
        let w = floor_world();
        let registry = Registry::new();
        let state = w.block_state(TARGET);
        let info = registry
            .processing_info(&state, &TargetState::Exact(expected), TARGET, &w, agent, &config.inventory)
            .unwrap();
        let sim = InteractSim {
            ctx: SimContext::new(&w, agent, config, &registry),
            pos: TARGET,
            state: &state,
            info: &info,
            cancel: CancelToken::new(),
        };
        sim.rotations(aimed)
    }

    fn furnace_facing(facing: Direction) -> BlockState {
        BlockState::of(BlockKind::Furnace).with(Property::HorizontalFacing, PropertyValue::Direction(facing))
    }

    fn interacts(results: &[BuildResult]) -> Vec<&Interact> {
        results
            .iter()
            .filter_map(|r| match r {
                BuildResult::Interact(InteractResult::Interact(i)) => Some(i),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn places_stone_on_the_floor() {
        let w = floor_world();
        let agent = agent_holding(Item::Block(BlockKind::Stone));
        let results = run(&w, &agent, &PlannerConfig::default(), TargetState::Block(BlockKind::Stone));
        let placed = interacts(&results);
        assert_eq!(placed.len(), 1);
        let context = &placed[0].context;
        assert!(context.placing);
        assert_eq!(context.hit.pos, TARGET.down());
        assert_eq!(context.hit.side, Direction::Up);
        assert_eq!(context.expected_state.kind(), BlockKind::Stone);
        assert_eq!(results[0].rank(), Rank::PlaceSuccess);
    }

    #[test]
    fn wrong_axis_has_no_integrity() {
        let w = floor_world();
        let agent = agent_holding(Item::Block(BlockKind::OakLog));
        let log = BlockState::of(BlockKind::OakLog)
            .with(Property::Axis, PropertyValue::Axis(crate::types::Axis::X));
        let results = run(&w, &agent, &PlannerConfig::default(), TargetState::Exact(log));
        assert!(interacts(&results).is_empty());
        let Some(BuildResult::Interact(InteractResult::NoIntegrity(r))) = results.first() else {
            panic!("expected no integrity, got {results:?}");
        };
        assert_eq!(r.actual.as_ref().and_then(|s| s.axis()), Some(crate::types::Axis::Y));
    }

    #[test]
    fn missing_item_is_wrong_selection() {
        let w = floor_world();
        let agent = Agent::standing_on(BlockPos::new(5, 0, 5));
        let results = run(&w, &agent, &PlannerConfig::default(), TargetState::Block(BlockKind::Stone));
        assert!(results.iter().any(|r| r.rank() == Rank::WrongItem));
        assert!(interacts(&results).is_empty());
    }

    #[test]
    fn opens_a_closed_door() {
        let mut w = floor_world();
        let door = BlockState::of(BlockKind::OakDoor);
        w.set(TARGET, door.clone());
        let agent = Agent::standing_on(BlockPos::new(5, 0, 5));
        let open = door.with(Property::Open, PropertyValue::Bool(true));
        let results = run(&w, &agent, &PlannerConfig::default(), TargetState::Exact(open));
        let used = interacts(&results);
        assert!(!used.is_empty());
        assert!(used.iter().all(|i| !i.context.placing && i.context.current_dir_valid));
        assert!(used.iter().all(|i| i.context.expected_state.flag(Property::Open)));
    }

    #[test]
    fn fire_is_lit_from_the_block_below() {
        let w = floor_world();
        let agent = agent_holding(Item::FlintAndSteel);
        let results = run(&w, &agent, &PlannerConfig::default(), TargetState::Block(BlockKind::Fire));
        let used = interacts(&results);
        assert_eq!(used.len(), 1);
        assert!(!used[0].context.placing);
        assert_eq!(used[0].context.hit.pos, TARGET.down());
    }

    #[test]
    fn entity_in_the_cell_blocks_placement() {
        let mut w = floor_world();
        w.add_entity(Entity::standing(EntityId(7), Vec3::bottom_center_of(TARGET), 0.6, 1.8));
        let agent = agent_holding(Item::Block(BlockKind::Stone));
        let results = run(&w, &agent, &PlannerConfig::default(), TargetState::Block(BlockKind::Stone));
        assert!(interacts(&results).is_empty());
        let blocked: Vec<_> = results
            .iter()
            .filter_map(|r| match r {
                BuildResult::Interact(InteractResult::BlockedByEntity(b)) => Some(b),
                _ => None,
            })
            .collect();
        assert!(!blocked.is_empty());
        assert_eq!(blocked[0].entities, vec![EntityId(7)]);
        assert!(!results.iter().any(|r| r.rank() == Rank::PlaceNoIntegrity));
    }

    #[test]
    fn spleefing_breaks_the_entity_footing() {
        let mut w = floor_world();
        w.add_entity(Entity::standing(EntityId(7), Vec3::bottom_center_of(TARGET), 0.6, 1.8));
        let agent = agent_holding(Item::Block(BlockKind::Stone));
        let mut config = PlannerConfig::default();
        config.build.spleef_entities = true;
        let results = run(&w, &agent, &config, TargetState::Block(BlockKind::Stone));
        let footing = results.iter().any(|r| {
            matches!(r, BuildResult::Interact(InteractResult::Dependency(d)) if d.inner.pos() == TARGET.down())
        });
        assert!(footing);
    }

    #[test]
    fn disabled_item_is_the_only_result() {
        let mut w = floor_world();
        w.disable_item(Item::Block(BlockKind::Stone));
        let agent = agent_holding(Item::Block(BlockKind::Stone));
        let results = run(&w, &agent, &PlannerConfig::default(), TargetState::Block(BlockKind::Stone));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rank(), Rank::PlaceBlockFeatureDisabled);
    }

    #[test]
    fn signs_try_their_own_rotation() {
        let w = floor_world();
        let agent = agent_holding(Item::Block(BlockKind::OakSign));
        let sign = BlockState::of(BlockKind::OakSign).with(Property::Rotation, PropertyValue::Int(4));
        let results = run(&w, &agent, &PlannerConfig::default(), TargetState::Exact(sign));
        let placed = interacts(&results);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].context.expected_state.int(Property::Rotation), Some(4));
        assert!(matches!(
            placed[0].context.rotation_request.target,
            crate::rotation::RotationTarget::Fixed(_)
        ));
    }

    #[test]
    fn orientation_search_order() {
        let agent = agent_holding(Item::Block(BlockKind::OakSign)).with_rotation(Rotation::new(10.0, 20.0));
        let config = PlannerConfig::default();
        let aimed = Rotation::new(-90.0, 60.0);
        let sign = BlockState::of(BlockKind::OakSign).with(Property::Rotation, PropertyValue::Int(4));

        let canonical = [
            Rotation::new(-90.0, 0.0),
            Rotation::new(90.0, 0.0),
            Rotation::new(0.0, 0.0),
            Rotation::new(-180.0, 0.0),
            Rotation::new(-90.0, 90.0),
            Rotation::new(90.0, 90.0),
            Rotation::new(0.0, 90.0),
            Rotation::new(-180.0, 90.0),
            Rotation::new(-90.0, -90.0),
            Rotation::new(90.0, -90.0),
            Rotation::new(0.0, -90.0),
            Rotation::new(-180.0, -90.0),
        ];
        let mut expected = vec![
            aimed,
            agent.rotation,
            // Sign step 4 and its opposite, step 12.
            Rotation::new(-90.0, 90.0),
            Rotation::new(-90.0, 0.0),
            Rotation::new(-90.0, -90.0),
            Rotation::new(90.0, 90.0),
            Rotation::new(90.0, 0.0),
            Rotation::new(90.0, -90.0),
        ];
        expected.extend(canonical);
        assert_eq!(search_order(&agent, &config, sign, aimed), expected);

        let log = BlockState::of(BlockKind::OakLog).with(Property::Axis, PropertyValue::Axis(Axis::X));
        let mut expected = vec![aimed, agent.rotation];
        expected.extend(canonical);
        assert_eq!(search_order(&agent, &config, log.clone(), aimed), expected);

        let mut fixed = config.clone();
        fixed.interact.axis_rotate = false;
        assert_eq!(search_order(&agent, &fixed, log, aimed), vec![aimed]);
    }

    #[test]
    fn world_protection_needs_can_place_on() {
        let w = floor_world();
        let mut agent = agent_holding(Item::Block(BlockKind::Stone));
        agent.allow_modify_world = false;
        let results = run(&w, &agent, &PlannerConfig::default(), TargetState::Block(BlockKind::Stone));
        assert!(interacts(&results).is_empty());
        assert!(matches!(
            results.as_slice(),
            [BuildResult::Interact(InteractResult::IllegalUsage(u))] if u.pos == TARGET
        ));

        let stack = ItemStack::new(Item::Block(BlockKind::Stone), 64, 0).with_can_place_on([BlockKind::Stone]);
        let mut allowed = Agent::standing_on(BlockPos::new(5, 0, 5)).with_inventory(Inventory::new().with(stack));
        allowed.allow_modify_world = false;
        let results = run(&w, &allowed, &PlannerConfig::default(), TargetState::Block(BlockKind::Stone));
        assert_eq!(interacts(&results).len(), 1);
        assert_eq!(results[0].rank(), Rank::PlaceSuccess);
    }

    #[test]
    fn clicking_replaceable_neighbour_lands_in_it() {
        let mut w = floor_world();
        let grass = BlockPos::new(7, 1, 5);
        w.set(grass, BlockState::of(BlockKind::ShortGrass));
        let agent = agent_holding(Item::Block(BlockKind::Stone));
        let results = run(&w, &agent, &PlannerConfig::default(), TargetState::Block(BlockKind::Stone));
        let landed = results.iter().any(|r| {
            matches!(
                r,
                BuildResult::Interact(InteractResult::UnexpectedPosition(u)) if u.pos == TARGET && u.actual == grass
            )
        });
        assert!(landed, "expected a landing in the grass, got {results:?}");
        // The floor below still works.
        assert_eq!(interacts(&results).len(), 1);
    }

    #[test]
    fn occupied_landing_cannot_be_replaced() {
        let mut w = floor_world();
        w.set(TARGET, furnace_facing(Direction::West));
        let agent = agent_holding(Item::Block(BlockKind::Furnace));
        let target = TargetState::Exact(furnace_facing(Direction::North));
        let results = run(&w, &agent, &PlannerConfig::default(), target);
        assert!(interacts(&results).is_empty());
        let cant: Vec<_> = results
            .iter()
            .filter_map(|r| match r {
                BuildResult::Interact(InteractResult::CantReplace(c)) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(cant.len(), 1);
        assert_eq!(cant[0].pos, TARGET);
        assert_eq!(cant[0].landing, TARGET);
    }

    #[test]
    fn facing_blocks_request_a_direction() {
        let w = floor_world();
        // Looking east places the furnace facing west.
        let agent = agent_holding(Item::Block(BlockKind::Furnace)).with_rotation(Rotation::new(-90.0, 45.0));
        let north = TargetState::Exact(furnace_facing(Direction::North));
        let results = run(&w, &agent, &PlannerConfig::default(), north);
        let placed = interacts(&results);
        assert_eq!(placed.len(), 1);
        let context = &placed[0].context;
        assert_eq!(context.rotation_request.target, RotationTarget::LookInDirection(PlaceDirection::South));
        assert!(!context.current_dir_valid);
        assert_eq!(context.expected_state.facing(), Some(Direction::North));
        let settled = context.rotation_request.rotation(Rotation::new(10.0, 30.0));
        assert!(PlaceDirection::South.is_in_area(settled));
    }

    #[test]
    fn fixed_rotation_keeps_the_aimed_facing() {
        let w = floor_world();
        let agent = agent_holding(Item::Block(BlockKind::Furnace)).with_rotation(Rotation::new(-90.0, 45.0));
        let mut config = PlannerConfig::default();
        config.interact.axis_rotate = false;

        let north = TargetState::Exact(furnace_facing(Direction::North));
        let results = run(&w, &agent, &config, north);
        assert!(interacts(&results).is_empty());
        assert!(results.iter().any(|r| r.rank() == Rank::PlaceNoIntegrity));

        let west = TargetState::Exact(furnace_facing(Direction::West));
        let results = run(&w, &agent, &config, west);
        let placed = interacts(&results);
        assert_eq!(placed.len(), 1);
        let RotationTarget::Fixed(rotation) = placed[0].context.rotation_request.target else {
            panic!("expected a fixed rotation");
        };
        assert_eq!(rotation.horizontal_facing(), Direction::East);
        assert!(placed[0].context.current_dir_valid);
    }
}
