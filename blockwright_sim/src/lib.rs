// blockwright_sim: voxel-world automation planning engine.
//
// Given a world snapshot, an agent, and the state each position should end
// up in, the planner decides what the agent should do next at every
// position (break a block, place one, use an item on one) or explains why
// it cannot yet, as ranked, capability-tagged `BuildResult`s. It never
// mutates the world or the inventory; an external executor carries out the
// actions the results describe.
//
// Module overview:
// - `types.rs`:      BlockPos, Direction, Axis, SideSet.
// - `geometry.rs`:   Vec3, Aabb, Shape (block outlines as box lists).
// - `block.rs`:      BlockKind catalogue with hardness, tools, placement and support rules.
// - `state.rs`:      BlockState (kind + properties), fluids, outline/collision shapes.
// - `item.rs`:       Items, stacks, enchantments, and the breaking-speed model.
// - `inventory.rs`:  Inventory snapshot, StackSelection, material containers.
// - `agent.rs`:      The acting agent: position, rotations, permissions, effects.
// - `world.rs`:      WorldView trait (block access, border, chunks, raycast) + GridWorld.
// - `rotation.rs`:   Rotation, PlaceDirection, RotationRequest.
// - `target.rs`:     TargetState families and matching.
// - `placement.rs`:  PlacementContext: where a click lands and the state it produces.
// - `visibility.rs`: Point samplers over box faces, CheckedHit, point selection.
// - `processing/`:   Preprocessors that refine a target into a PreProcessingInfo.
// - `result/`:       BuildResult families, Rank, capability traits, action contexts.
// - `sim/`:          Pre-flight checks, break and interact simulators, routing.
// - `planner.rs`:    Structure passes over rayon, viewpoint search.
// - `config.rs`:     PlannerConfig: every tunable, loaded from JSON.
// - `error.rs`:      SimError for the exceptional cases.
// - `prng`:          Re-exported from `blockwright_prng`, xoshiro256++ with SplitMix64 seeding.
//
// **Critical constraint: determinism.** A pass is a pure function of
// `(world, agent, config, structure)`. Random tie-breaks come from the
// seeded PRNG, parallel work is collected in input order, and ordered
// collections are `BTreeMap`/`BTreeSet`.

pub mod agent;
pub mod block;
pub mod config;
pub mod error;
pub mod geometry;
pub mod inventory;
pub mod item;
pub mod placement;
pub mod planner;
pub use blockwright_prng as prng;
pub mod processing;
pub mod result;
pub mod rotation;
pub mod sim;
pub mod state;
pub mod target;
pub mod types;
pub mod visibility;
pub mod world;
