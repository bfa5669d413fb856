// Test-only scene builder for end-to-end planning scenarios.
//
// A `Scene` bundles a `GridWorld`, an `Agent` and a `PlannerConfig` behind
// a small builder API so each scenario reads as "this world, this agent,
// this target". Planning goes through the public `Planner` only, the same
// entry points an embedding application uses.
//
// See also: `tests/planning_scenarios.rs` for the scenarios themselves.

use blockwright_sim::agent::Agent;
use blockwright_sim::block::BlockKind;
use blockwright_sim::config::PlannerConfig;
use blockwright_sim::geometry::Vec3;
use blockwright_sim::inventory::Inventory;
use blockwright_sim::item::{Item, ItemStack};
use blockwright_sim::planner::{PassReport, Planner, Structure};
use blockwright_sim::result::BuildResult;
use blockwright_sim::state::BlockState;
use blockwright_sim::target::TargetState;
use blockwright_sim::types::BlockPos;
use blockwright_sim::world::{Entity, EntityId, GridWorld};

/// Scene edge length; large enough for a few blocks of reach either way.
const SCENE_SIZE: u32 = 16;

pub struct Scene {
    pub world: GridWorld,
    pub agent: Agent,
    pub config: PlannerConfig,
}

impl Scene {
    /// A stone floor at y = 0 with the agent standing on (5, 0, 5) and an
    /// empty inventory.
    pub fn flat() -> Self {
        let mut world = GridWorld::new(SCENE_SIZE, SCENE_SIZE, SCENE_SIZE);
        world.fill(
            BlockPos::new(0, 0, 0),
            BlockPos::new(SCENE_SIZE as i32 - 1, 0, SCENE_SIZE as i32 - 1),
            &BlockState::of(BlockKind::Stone),
        );
        Self {
            world,
            agent: Agent::standing_on(BlockPos::new(5, 0, 5)),
            config: PlannerConfig::default(),
        }
    }

    pub fn block(mut self, pos: BlockPos, kind: BlockKind) -> Self {
        self.world.set(pos, BlockState::of(kind));
        self
    }

    pub fn fill(mut self, a: BlockPos, b: BlockPos, kind: BlockKind) -> Self {
        self.world.fill(a, b, &BlockState::of(kind));
        self
    }

    /// A 0.6 x 1.8 entity with its feet at the bottom center of `cell`.
    pub fn entity(mut self, id: u32, cell: BlockPos) -> Self {
        let feet = Vec3::bottom_center_of(cell);
        self.world
            .add_entity(Entity::standing(EntityId(id), feet, 0.6, 1.8));
        self
    }

    /// Move the agent onto `floor`, keeping its inventory.
    pub fn agent_on(mut self, floor: BlockPos) -> Self {
        let inventory = std::mem::take(&mut self.agent.inventory);
        self.agent = Agent::standing_on(floor).with_inventory(inventory);
        self
    }

    /// Fill the hotbar from slot 0 with full stacks of `items`.
    pub fn hotbar(mut self, items: &[Item]) -> Self {
        let inventory = items
            .iter()
            .zip(0u8..)
            .fold(Inventory::new(), |inv, (&item, slot)| {
                inv.with(ItemStack::new(item, 64, slot))
            });
        self.agent.inventory = inventory;
        self
    }

    /// Override config fields from a partial JSON object.
    pub fn config_json(mut self, json: serde_json::Value) -> Self {
        self.config = PlannerConfig::from_json(&json.to_string()).expect("scenario config");
        self
    }

    pub fn planner(&self) -> Planner {
        Planner::new(self.config.clone())
    }

    pub fn simulate(&self, pos: BlockPos, target: TargetState) -> Vec<BuildResult> {
        self.planner()
            .simulate(&self.world, &self.agent, pos, &target)
            .expect("simulation failed")
    }

    pub fn pass(&self, structure: &Structure) -> PassReport {
        self.planner()
            .simulate_structure(&self.world, &self.agent, structure)
    }
}

/// Number of dependency wrappers around the result that decides `result`.
pub fn dependency_depth(result: &BuildResult) -> usize {
    match result.as_dependent() {
        Some(dep) => 1 + dependency_depth(dep.dependency()),
        None => 0,
    }
}

/// The result at the end of `result`'s dependency chain, found one link at
/// a time.
pub fn chain_leaf(result: &BuildResult) -> &BuildResult {
    match result.as_dependent() {
        Some(dep) => chain_leaf(dep.dependency()),
        None => result,
    }
}
