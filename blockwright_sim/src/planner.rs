// Structure-level planning: many positions, one ranked answer.
//
// A `Structure` maps positions to the state each should end up in. The
// `Planner` owns the configuration and the preprocessing `Registry` and
// runs one simulation per position, fanned out over rayon. Every position's
// results land in one `PassReport`, sorted best first with the result
// comparator. A position whose simulation fails with a `SimError` is
// recorded as failed-this-pass and the others carry on.
//
// `Simulation` searches for a good place to stand: it simulates the whole
// structure as seen from candidate standing cells, caches each cell's
// results, and reports the cells that left the agent something to do.
//
// See also: `sim/mod.rs` for the per-position entry point, `result/mod.rs`
// for `BuildResult::compare`.
//
// **Critical constraint: determinism.** Positions are visited in
// `BTreeMap` order and the parallel outputs are collected in that order
// before a stable sort, so equal inputs give identically ordered reports.

use crate::agent::{Agent, STANDING_EYE_HEIGHT, STANDING_HEIGHT, WIDTH};
use crate::config::PlannerConfig;
use crate::error::SimError;
use crate::geometry::{Aabb, Vec3};
use crate::processing::Registry;
use crate::result::{BuildResult, Color, CompareView, Drawable, HintShape, RenderHint};
use crate::sim::{self, SimContext};
use crate::target::TargetState;
use crate::types::BlockPos;
use crate::world::WorldView;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info_span, instrument, warn};

/// Target state per position.
pub type Structure = BTreeMap<BlockPos, TargetState>;

/// Candidate standing cells farther than this from the structure's bounds
/// are not simulated.
const MAX_VIEW_DISTANCE: f64 = 10.0;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// A position whose simulation could not be completed this pass.
#[derive(Debug)]
pub struct FailedPosition {
    pub pos: BlockPos,
    pub error: SimError,
}

#[derive(Debug, Default)]
pub struct PassReport {
    /// Every result of the pass, best first.
    pub results: Vec<BuildResult>,
    pub failed: Vec<FailedPosition>,
}

impl PassReport {
    pub fn best(&self) -> Option<&BuildResult> {
        self.results.first()
    }

    /// Results the agent can act on right away.
    pub fn actionable(&self) -> impl Iterator<Item = &BuildResult> {
        self.results.iter().filter(|r| r.is_actionable())
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

pub struct Planner {
    config: PlannerConfig,
    registry: Registry,
}

impl Planner {
    /// A planner with the default processors registered.
    pub fn new(config: PlannerConfig) -> Self {
        Self::with_registry(config, Registry::new())
    }

    pub fn with_registry(config: PlannerConfig, registry: Registry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn context<'a>(&'a self, world: &'a dyn WorldView, agent: &'a Agent) -> SimContext<'a> {
        SimContext::new(world, agent, &self.config, &self.registry)
    }

    /// All results for reaching `target` at `pos`, in emission order.
    pub fn simulate(
        &self,
        world: &dyn WorldView,
        agent: &Agent,
        pos: BlockPos,
        target: &TargetState,
    ) -> Result<Vec<BuildResult>, SimError> {
        sim::simulate(&self.context(world, agent), pos, target)
    }

    /// The single best result for `pos`, by the result comparator.
    pub fn best(
        &self,
        world: &dyn WorldView,
        agent: &Agent,
        pos: BlockPos,
        target: &TargetState,
    ) -> Result<Option<BuildResult>, SimError> {
        let view = CompareView::of(agent);
        let results = self.simulate(world, agent, pos, target)?;
        Ok(results.into_iter().min_by(|a, b| a.compare(b, &view)))
    }

    /// Simulate every position of `structure` from the agent's eyes.
    pub fn simulate_structure(
        &self,
        world: &dyn WorldView,
        agent: &Agent,
        structure: &Structure,
    ) -> PassReport {
        self.simulate_structure_from(world, agent, structure, agent.eye_pos())
    }

    /// Simulate every position of `structure` with rays cast from `pov`.
    #[instrument(skip_all, name = "simulate_structure", fields(positions = structure.len()))]
    pub fn simulate_structure_from(
        &self,
        world: &dyn WorldView,
        agent: &Agent,
        structure: &Structure,
        pov: Vec3,
    ) -> PassReport {
        let ctx = self.context(world, agent).with_pov(pov);
        let positions: Vec<(&BlockPos, &TargetState)> = structure.iter().collect();

        let outcomes: Vec<(BlockPos, Result<Vec<BuildResult>, SimError>)> = {
            let _span = info_span!("positions_parallel", count = positions.len()).entered();
            positions
                .par_iter()
                .map(|&(&pos, target)| (pos, sim::simulate(&ctx, pos, target)))
                .collect()
        };

        let mut report = PassReport::default();
        for (pos, outcome) in outcomes {
            match outcome {
                Ok(results) => report.results.extend(results),
                Err(error) => {
                    warn!(%pos, %error, "position failed this pass");
                    report.failed.push(FailedPosition { pos, error });
                }
            }
        }
        let view = CompareView::of(agent);
        report.results.sort_by(|a, b| a.compare(b, &view));
        debug!(
            results = report.results.len(),
            failed = report.failed.len(),
            "structure pass done"
        );
        report
    }

    /// A viewpoint search over `structure`.
    pub fn simulation<'a>(
        &'a self,
        world: &'a dyn WorldView,
        agent: &'a Agent,
        structure: &'a Structure,
    ) -> Simulation<'a> {
        Simulation::new(self, world, agent, structure)
    }
}

// ---------------------------------------------------------------------------
// Viewpoint search
// ---------------------------------------------------------------------------

/// A standing cell worth moving to, and how many actionable results the
/// structure gives from there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PossiblePos {
    pub pos: BlockPos,
    pub interactions: usize,
}

impl Drawable for PossiblePos {
    fn render_hint(&self) -> RenderHint {
        let color = Color::new(0, 255, 0, 50);
        RenderHint {
            shape: HintShape::Box(player_box(Vec3::bottom_center_of(self.pos))),
            fill: color,
            outline: color,
        }
    }
}

/// The standing hitbox with feet at `feet`, shrunk so touching faces do not
/// count as overlap.
fn player_box(feet: Vec3) -> Aabb {
    let r = WIDTH / 2.0;
    Aabb::new(
        feet.x - r,
        feet.y,
        feet.z - r,
        feet.x + r,
        feet.y + STANDING_HEIGHT,
        feet.z + r,
    )
    .contract(1.0e-6)
}

pub struct Simulation<'a> {
    planner: &'a Planner,
    world: &'a dyn WorldView,
    agent: &'a Agent,
    structure: &'a Structure,
    /// Bounds of the structure's cells; `None` for an empty structure.
    bounds: Option<Aabb>,
    cache: BTreeMap<BlockPos, Vec<BuildResult>>,
}

impl<'a> Simulation<'a> {
    pub fn new(
        planner: &'a Planner,
        world: &'a dyn WorldView,
        agent: &'a Agent,
        structure: &'a Structure,
    ) -> Self {
        let bounds = structure.keys().fold(None, |acc: Option<Aabb>, pos| {
            let cell = Aabb::unit().at(*pos);
            Some(match acc {
                None => cell,
                Some(b) => Aabb::new(
                    b.min.x.min(cell.min.x),
                    b.min.y.min(cell.min.y),
                    b.min.z.min(cell.min.z),
                    b.max.x.max(cell.max.x),
                    b.max.y.max(cell.max.y),
                    b.max.z.max(cell.max.z),
                ),
            })
        });
        Self {
            planner,
            world,
            agent,
            structure,
            bounds,
            cache: BTreeMap::new(),
        }
    }

    /// Results of the whole structure with the agent standing in `cell`.
    /// Empty for cells the agent cannot stand in or that are too far away.
    pub fn simulate(&mut self, cell: BlockPos) -> &[BuildResult] {
        if !self.cache.contains_key(&cell) {
            let results = self.evaluate(cell);
            self.cache.insert(cell, results);
        }
        self.cache.get(&cell).map(Vec::as_slice).unwrap_or_default()
    }

    fn evaluate(&self, cell: BlockPos) -> Vec<BuildResult> {
        let feet = Vec3::bottom_center_of(cell);
        let pov = feet + Vec3::new(0.0, STANDING_EYE_HEIGHT, 0.0);
        let Some(bounds) = self.bounds else {
            return Vec::new();
        };
        if !bounds.contains(pov) && closest_point(&bounds, pov).distance(pov) > MAX_VIEW_DISTANCE {
            return Vec::new();
        }
        if !self.world.block_state(cell.down()).is_solid_block() {
            return Vec::new();
        }
        if !space_is_empty(self.world, &player_box(feet)) {
            return Vec::new();
        }

        let standing = self.agent.at_eye(pov, false);
        self.planner
            .simulate_structure_from(self.world, &standing, self.structure, pov)
            .results
    }

    /// Simulated cells with at least one actionable result, in position
    /// order.
    pub fn good_positions(&self) -> Vec<PossiblePos> {
        self.cache
            .iter()
            .filter_map(|(pos, results)| {
                let interactions = results.iter().filter(|r| r.is_actionable()).count();
                (interactions > 0).then_some(PossiblePos {
                    pos: *pos,
                    interactions,
                })
            })
            .collect()
    }
}

fn closest_point(b: &Aabb, p: Vec3) -> Vec3 {
    Vec3::new(
        p.x.clamp(b.min.x, b.max.x),
        p.y.clamp(b.min.y, b.max.y),
        p.z.clamp(b.min.z, b.max.z),
    )
}

/// No block collision box overlaps `area`.
fn space_is_empty(world: &dyn WorldView, area: &Aabb) -> bool {
    let (min, max) = (area.min.block_pos(), area.max.block_pos());
    for x in min.x..=max.x {
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                let pos = BlockPos::new(x, y, z);
                if world
                    .block_state(pos)
                    .collision_shape()
                    .at(pos)
                    .any(|b| b.intersects(area))
                {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::inventory::Inventory;
    use crate::item::{Item, ItemStack, ToolTier};
    use crate::processing::{PreProcessingInfo, StateProcessor};
    use crate::result::Rank;
    use crate::state::BlockState;
    use crate::world::GridWorld;

    fn floor_world() -> GridWorld {
        let mut w = GridWorld::new(24, 12, 24);
        w.fill(BlockPos::new(0, 0, 0), BlockPos::new(23, 0, 23), &BlockState::of(BlockKind::Stone));
        w
    }

    fn builder() -> Agent {
        let inventory = Inventory::new()
            .with(ItemStack::new(Item::Pickaxe(ToolTier::Iron), 1, 0))
            .with(ItemStack::new(Item::Block(BlockKind::Cobblestone), 64, 1));
        Agent::standing_on(BlockPos::new(5, 0, 5)).with_inventory(inventory)
    }

    #[test]
    fn report_is_sorted_best_first() {
        let mut w = floor_world();
        w.set(BlockPos::new(6, 1, 5), BlockState::of(BlockKind::Stone));
        let structure = Structure::from([
            (BlockPos::new(6, 1, 5), TargetState::Air),
            (BlockPos::new(5, 1, 7), TargetState::Block(BlockKind::Cobblestone)),
            (BlockPos::new(20, 1, 20), TargetState::Block(BlockKind::Cobblestone)),
        ]);
        let planner = Planner::new(PlannerConfig::default());
        let report = planner.simulate_structure(&w, &builder(), &structure);
        assert!(report.failed.is_empty());
        let ranks: Vec<Rank> = report.results.iter().map(|r| r.rank()).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(report.best().map(|r| r.rank()), Some(Rank::BreakSuccess));
        assert!(report.actionable().count() >= 2);
    }

    /// Hands out an item that places nothing for a placement.
    struct FlintForGlass;

    impl StateProcessor for FlintForGlass {
        fn accepts(&self, state: &BlockState, target: &BlockState) -> bool {
            state.is_replaceable() && target.kind() == BlockKind::Glass
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
        }
    }

    #[test]
    fn failed_positions_do_not_stop_the_pass() {
        let w = floor_world();
        let structure = Structure::from([
            (BlockPos::new(6, 1, 5), TargetState::Block(BlockKind::Glass)),
            (BlockPos::new(5, 1, 7), TargetState::Block(BlockKind::Cobblestone)),
        ]);
        let registry = Registry::new().with_state_processor(FlintForGlass);
        let planner = Planner::with_registry(PlannerConfig::default(), registry);
        let report = planner.simulate_structure(&w, &builder(), &structure);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].pos, BlockPos::new(6, 1, 5));
        assert!(matches!(report.failed[0].error, SimError::NotABlockItem { .. }));
        assert!(report.results.iter().any(|r| r.pos() == BlockPos::new(5, 1, 7)));
    }

    #[test]
    fn best_matches_the_head_of_the_report() {
        let mut w = floor_world();
        let pos = BlockPos::new(6, 1, 5);
        w.set(pos, BlockState::of(BlockKind::Stone));
        let planner = Planner::new(PlannerConfig::default());
        let agent = builder();
        let best = planner.best(&w, &agent, pos, &TargetState::Air).unwrap();
        let report = planner.simulate_structure(&w, &agent, &Structure::from([(pos, TargetState::Air)]));
        assert_eq!(best.as_ref(), report.best());
    }

    #[test]
    fn passes_are_repeatable() {
        let mut w = floor_world();
        w.fill(BlockPos::new(6, 1, 4), BlockPos::new(7, 2, 6), &BlockState::of(BlockKind::Dirt));
        let structure: Structure = (4..=6)
            .flat_map(|z| (1..=2).map(move |y| (BlockPos::new(6, y, z), TargetState::Air)))
            .collect();
        let planner = Planner::new(PlannerConfig::default());
        let agent = builder();
        let first = planner.simulate_structure(&w, &agent, &structure);
        let second = planner.simulate_structure(&w, &agent, &structure);
        assert_eq!(first.results, second.results);
    }

    #[test]
    fn viewpoint_search_skips_unusable_cells() {
        let mut w = floor_world();
        let target = BlockPos::new(10, 1, 10);
        w.set(BlockPos::new(12, 1, 10), BlockState::of(BlockKind::Stone));
        w.set(BlockPos::new(10, 0, 12), BlockState::air());
        let structure = Structure::from([(target, TargetState::Block(BlockKind::Cobblestone))]);
        let planner = Planner::new(PlannerConfig::default());
        let agent = builder();
        let mut simulation = planner.simulation(&w, &agent, &structure);

        // Occupied by a block.
        assert!(simulation.simulate(BlockPos::new(12, 1, 10)).is_empty());
        // No floor.
        assert!(simulation.simulate(BlockPos::new(10, 1, 12)).is_empty());
        // Too far from the structure.
        assert!(simulation.simulate(BlockPos::new(22, 1, 22)).is_empty());
        // Next to the target.
        assert!(!simulation.simulate(BlockPos::new(9, 1, 10)).is_empty());

        let good = simulation.good_positions();
        assert_eq!(good.len(), 1);
        assert_eq!(good[0].pos, BlockPos::new(9, 1, 10));
        assert!(good[0].interactions >= 1);
    }
}
