// Per-position simulation: routing, dependency nesting, and shape scans.
//
// `simulate` is the entry point for one position and one target. It reads
// the current state, asks the processing `Registry` for a
// `PreProcessingInfo`, runs the pre-flight checks in `basic.rs`, and then
// routes the position:
// - a non-empty target with processing info goes to the interact
//   simulator (`interact_sim.rs`), or is reported `Done` when the info says
//   nothing needs placing;
// - everything else (empty targets, or a foreign block in the way) goes to
//   the break simulator (`break_sim.rs`).
//
// Simulators return every result they produce, in emission order, as a
// `Vec<BuildResult>`. A simulator that needs another position handled
// first runs a nested `simulate` through `dependencies`, which wraps each
// nested result in the caller's `Dependency` variant. Nesting stops once
// the chain is `max_build_dependencies` deep.
//
// `scan_shape` turns a block shape into candidate `CheckedHit`s, or into
// the `OutOfReach`/`NotVisible` result explaining why there are none.
//
// See also: `planner.rs` which fans positions out over rayon and sorts the
// results, `visibility.rs` for the point samplers, `processing/` for the
// info the router reads.
//
// **Critical constraint: determinism.** Results for one position depend
// only on the world, agent, config and target. The interact simulator's
// parallel branches are collected in branch order, never completion order.

pub mod basic;
pub mod break_sim;
pub mod interact_sim;

use crate::agent::Agent;
use crate::config::PlannerConfig;
use crate::error::SimError;
use crate::geometry::{Shape, Vec3};
use crate::processing::{POST_PROCESSED_PROPERTIES, Registry, STANDARD_INTERACT_PROPERTIES};
use crate::result::generic::{NotVisible, OutOfReach};
use crate::result::pre_sim::PreSimResult;
use crate::result::{BuildResult, Dependency, GenericResult};
use crate::rotation::Rotation;
use crate::state::{BlockState, Property};
use crate::target::TargetState;
use crate::types::{BlockPos, Direction, SideSet};
use crate::visibility::{CheckedHit, ScanRestriction, scan_closest_points, scan_surfaces};
use crate::world::{BlockHit, WorldView};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument, trace};

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative cancellation shared by the branches of one scope.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// SimContext
// ---------------------------------------------------------------------------

/// Everything a simulation reads. Cheap to copy; nested simulations get a
/// copy with a deeper `depth`.
#[derive(Clone, Copy)]
pub struct SimContext<'a> {
    pub world: &'a dyn WorldView,
    pub agent: &'a Agent,
    pub config: &'a PlannerConfig,
    pub registry: &'a Registry,
    /// Where rays are cast from.
    pub pov: Vec3,
    /// How many simulations this one is nested in.
    pub depth: usize,
}

impl<'a> SimContext<'a> {
    pub fn new(
        world: &'a dyn WorldView,
        agent: &'a Agent,
        config: &'a PlannerConfig,
        registry: &'a Registry,
    ) -> Self {
        Self {
            world,
            agent,
            config,
            registry,
            pov: agent.eye_pos(),
            depth: 0,
        }
    }

    /// The same context seen from another eye position.
    pub fn with_pov(self, pov: Vec3) -> Self {
        Self { pov, ..self }
    }

    fn nested(&self) -> Option<Self> {
        if self.depth >= self.config.build.max_build_dependencies {
            return None;
        }
        Some(Self {
            depth: self.depth + 1,
            ..*self
        })
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Simulate reaching `target` at `pos`.
#[instrument(skip_all, name = "simulate", fields(%pos, depth = ctx.depth))]
pub fn simulate(
    ctx: &SimContext<'_>,
    pos: BlockPos,
    target: &TargetState,
) -> Result<Vec<BuildResult>, SimError> {
    let missing = match target {
        TargetState::Exact(expected) => expected.missing_property(),
        _ => None,
    };
    if let Some(property) = missing {
        return Err(SimError::MissingProperty { pos, property });
    }

    let state = ctx.world.block_state(pos);
    let info = if target.is_empty() || !ctx.world.is_loaded(pos) {
        None
    } else {
        ctx.registry.processing_info(
            &state,
            target,
            pos,
            ctx.world,
            ctx.agent,
            &ctx.config.inventory,
        )
    };

    if let Some(early) = basic::check(ctx, pos, &state, target, info.is_none()) {
        return Ok(vec![early]);
    }

    let results = match info {
        Some(info) if info.omit_placement => vec![PreSimResult::done(pos).into()],
        Some(info) => {
            debug!(placing = info.placing, item = %info.item, "routed to interact");
            interact_sim::simulate(ctx, pos, &state, &info)?
        }
        None => {
            debug!(state = %state, "routed to break");
            break_sim::simulate(ctx, pos, &state)?
        }
    };
    debug!(count = results.len(), "simulated position");
    Ok(results)
}

/// Run a nested simulation of `target` at `pos` on behalf of the simulation
/// at `owner`, wrapping every result with `wrap`. Empty once the chain is
/// as deep as the config allows.
pub(crate) fn dependencies(
    ctx: &SimContext<'_>,
    owner: BlockPos,
    pos: BlockPos,
    target: &TargetState,
    wrap: fn(Dependency) -> BuildResult,
) -> Result<Vec<BuildResult>, SimError> {
    let Some(nested) = ctx.nested() else {
        trace!(%owner, %pos, "dependency chain too deep");
        return Ok(Vec::new());
    };
    Ok(simulate(&nested, pos, target)?
        .into_iter()
        .map(|inner| wrap(Dependency::new(owner, inner)))
        .collect())
}

// ---------------------------------------------------------------------------
// Shape scans
// ---------------------------------------------------------------------------

/// Outcome of scanning one shape.
pub(crate) enum Scan {
    Hits(Vec<CheckedHit>),
    /// No usable point; the result says why.
    Missed(BuildResult),
}

/// Candidate hits on `shape` placed at `pos`, limited to `sides`, as seen
/// from `pov`. In strict mode every point must be the first thing the ray
/// from `pov` hits. Outside strict mode only reach and facing are checked,
/// so points hidden behind other blocks are still returned. A miss is
/// reported against `owner`, the position being simulated.
pub(crate) fn scan_shape(
    ctx: &SimContext<'_>,
    pov: Vec3,
    shape: &Shape,
    pos: BlockPos,
    owner: BlockPos,
    sides: SideSet,
    restrict: Option<&ScanRestriction>,
) -> Scan {
    let build = &ctx.config.build;
    let reach_sq = build.block_reach * build.block_reach;
    let mut hits = Vec::new();
    let mut misses: Vec<(Vec3, Direction)> = Vec::new();

    for b in shape.at(pos) {
        if !build.strict_raycast {
            let allow_inside = ctx.config.interact.air_place;
            for (point, side) in scan_closest_points(&b, pov, sides, restrict, allow_inside, build) {
                if pov.distance_sq(point) > reach_sq {
                    misses.push((point, side));
                    continue;
                }
                hits.push(CheckedHit {
                    hit: BlockHit { pos, side, point },
                    rotation: Rotation::rotation_to(pov, point),
                });
            }
            continue;
        }

        for (point, side) in scan_surfaces(&b, pov, sides, restrict, false, build) {
            if pov.distance_sq(point) > reach_sq {
                misses.push((point, side));
                continue;
            }
            let rotation = Rotation::rotation_to(pov, point);
            let end = pov + rotation.vector() * build.block_reach;
            let Some(hit) = ctx.world.raycast(pov, end) else {
                continue;
            };
            if hit.pos == pos && hit.side == side {
                hits.push(CheckedHit { hit, rotation });
            }
        }
    }
    trace!(%pos, hits = hits.len(), misses = misses.len(), "scanned shape");

    if !hits.is_empty() {
        return Scan::Hits(hits);
    }
    let missed = if misses.is_empty() {
        GenericResult::NotVisible(NotVisible {
            pos: owner,
            hit_pos: pos,
            distance: pov.distance(Vec3::of_pos(pos)),
        })
    } else {
        GenericResult::OutOfReach(OutOfReach {
            pos: owner,
            pov,
            misses,
        })
    };
    Scan::Missed(missed.into())
}

/// Properties that settle by themselves once the block is down; a cell
/// differing from its target only in these is already done.
pub(crate) fn settled_properties() -> Vec<Property> {
    POST_PROCESSED_PROPERTIES
        .iter()
        .copied()
        .filter(|p| !STANDARD_INTERACT_PROPERTIES.contains(p))
        .collect()
}

/// Whether `state` already satisfies `target` at `pos`.
pub(crate) fn is_done(
    ctx: &SimContext<'_>,
    pos: BlockPos,
    state: &BlockState,
    target: &TargetState,
) -> bool {
    target.matches(state, pos, ctx.world, &settled_properties())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::config::BuildConfig;
    use crate::world::GridWorld;
    use proptest::prelude::*;

    fn floor_world() -> GridWorld {
        let mut w = GridWorld::new(16, 16, 16);
        w.fill(BlockPos::new(0, 0, 0), BlockPos::new(15, 0, 15), &BlockState::of(BlockKind::Stone));
        w
    }

    fn run<R>(w: &GridWorld, agent: &Agent, config: &PlannerConfig, f: impl FnOnce(&SimContext<'_>) -> R) -> R {
        let registry = Registry::new();
        let ctx = SimContext::new(w, agent, config, &registry);
        f(&ctx)
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let branch = token.clone();
        assert!(!branch.is_cancelled());
        token.cancel();
        assert!(branch.is_cancelled());
    }

    #[test]
    fn nesting_stops_at_the_configured_depth() {
        let w = floor_world();
        let agent = Agent::standing_on(BlockPos::new(8, 0, 8));
        let config = PlannerConfig {
            build: BuildConfig {
                max_build_dependencies: 2,
                ..BuildConfig::default()
            },
            ..PlannerConfig::default()
        };
        run(&w, &agent, &config, |ctx| {
            let one = ctx.nested().unwrap();
            let two = one.nested().unwrap();
            assert_eq!(two.depth, 2);
            assert!(two.nested().is_none());
        });
    }

    #[test]
    fn far_block_is_out_of_reach() {
        let w = floor_world();
        let agent = Agent::standing_on(BlockPos::new(1, 0, 1));
        let config = PlannerConfig::default();
        run(&w, &agent, &config, |ctx| {
            let pos = BlockPos::new(14, 0, 14);
            match scan_shape(ctx, ctx.pov, &Shape::full_cube(), pos, pos, SideSet::ALL, None) {
                Scan::Missed(BuildResult::Generic(GenericResult::OutOfReach(r))) => {
                    assert_eq!(r.pos, pos);
                    assert!(r.distance() > config.build.block_reach);
                }
                _ => panic!("expected out of reach"),
            }
        });
    }

    #[test]
    fn hits_stay_within_reach() {
        let w = floor_world();
        let agent = Agent::standing_on(BlockPos::new(5, 0, 5));
        let config = PlannerConfig::default();
        run(&w, &agent, &config, |ctx| {
            let pos = BlockPos::new(6, 0, 5);
            let Scan::Hits(hits) = scan_shape(ctx, ctx.pov, &Shape::full_cube(), pos, pos, SideSet::ALL, None) else {
                panic!("expected hits");
            };
            assert!(hits.iter().all(|h| ctx.pov.distance(h.point()) <= config.build.block_reach));
            assert!(hits.iter().all(|h| h.hit.pos == pos));
        });
    }

    #[test]
    fn strict_scan_rejects_occluded_faces() {
        let mut w = floor_world();
        let pos = BlockPos::new(5, 1, 7);
        // Wall between the agent and the target.
        w.fill(BlockPos::new(3, 1, 6), BlockPos::new(7, 3, 6), &BlockState::of(BlockKind::Glass));
        let agent = Agent::standing_on(BlockPos::new(5, 0, 4));
        let config = PlannerConfig {
            build: BuildConfig {
                strict_raycast: true,
                ..BuildConfig::default()
            },
            ..PlannerConfig::default()
        };
        run(&w, &agent, &config, |ctx| {
            match scan_shape(ctx, ctx.pov, &Shape::full_cube(), pos, pos, SideSet::only(Direction::North), None) {
                Scan::Missed(BuildResult::Generic(GenericResult::NotVisible(r))) => assert_eq!(r.pos, pos),
                _ => panic!("expected not visible"),
            }
        });
    }

    #[test]
    fn relaxed_scan_ignores_occlusion() {
        let mut w = floor_world();
        let pos = BlockPos::new(5, 1, 7);
        w.fill(BlockPos::new(3, 1, 6), BlockPos::new(7, 3, 6), &BlockState::of(BlockKind::Glass));
        let agent = Agent::standing_on(BlockPos::new(5, 0, 4));
        run(&w, &agent, &PlannerConfig::default(), |ctx| {
            match scan_shape(ctx, ctx.pov, &Shape::full_cube(), pos, pos, SideSet::only(Direction::North), None) {
                Scan::Hits(hits) => {
                    assert!(!hits.is_empty());
                    assert!(hits.iter().all(|h| h.hit.pos == pos && h.hit.side == Direction::North));
                }
                Scan::Missed(result) => panic!("expected hits behind the wall, got {result:?}"),
            }
        });
    }

    #[test]
    fn target_missing_a_declared_property_fails() {
        let w = floor_world();
        let agent = Agent::standing_on(BlockPos::new(5, 0, 5));
        let log: BlockState = serde_json::from_str(r#"{ "kind": "oak_log", "props": [] }"#).unwrap();
        let pos = BlockPos::new(6, 1, 5);
        let err = run(&w, &agent, &PlannerConfig::default(), |ctx| {
            simulate(ctx, pos, &TargetState::Exact(log)).unwrap_err()
        });
        assert!(matches!(
            err,
            SimError::MissingProperty { property: Property::Axis, .. }
        ));
    }

    proptest! {
        #[test]
        fn scanned_points_never_exceed_reach(x in 1..15i32, z in 1..15i32, tx in 1..15i32, tz in 1..15i32) {
            let w = floor_world();
            let agent = Agent::standing_on(BlockPos::new(x, 0, z));
            let config = PlannerConfig::default();
            run(&w, &agent, &config, |ctx| {
                let pos = BlockPos::new(tx, 1, tz);
                if let Scan::Hits(hits) = scan_shape(ctx, ctx.pov, &Shape::full_cube(), pos, pos, SideSet::ALL, None) {
                    for hit in &hits {
                        prop_assert!(ctx.pov.distance(hit.point()) <= config.build.block_reach);
                    }
                }
                Ok(())
            })?;
        }
    }

    #[test]
    fn settled_properties_keep_interact_toggles() {
        let settled = settled_properties();
        assert!(settled.contains(&Property::Waterlogged));
        assert!(!settled.contains(&Property::Open));
    }
}
