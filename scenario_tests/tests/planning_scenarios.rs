// End-to-end planning scenarios.
//
// Each test builds a small scene, runs the public planner on it, and checks
// the shape of the ranked results: which variants appear, in what order,
// and what they point at. Scenes are flat stone floors with the agent
// standing on (5, 0, 5) unless a test moves it.

use blockwright_sim::block::BlockKind;
use blockwright_sim::item::{Item, ToolTier};
use blockwright_sim::planner::Structure;
use blockwright_sim::result::{BreakResult, BuildResult, InteractResult, Rank};
use blockwright_sim::state::{BlockState, Property, PropertyValue};
use blockwright_sim::target::TargetState;
use blockwright_sim::types::{Axis, BlockPos, Direction};
use scenario_tests::{Scene, chain_leaf, dependency_depth};
use serde_json::json;

/// The cell east of the agent's feet.
const BESIDE: BlockPos = BlockPos::new(6, 1, 5);

fn interacts(results: &[BuildResult]) -> usize {
    results
        .iter()
        .filter(|r| matches!(r, BuildResult::Interact(InteractResult::Interact(_))))
        .count()
}

// ---------------------------------------------------------------------------
// Pre-flight
// ---------------------------------------------------------------------------

#[test]
fn matching_and_unloaded_positions_stop_early() {
    let mut scene = Scene::flat();
    let unloaded = BlockPos::new(40, 1, 40);
    scene.world.unload_chunk(unloaded.chunk());
    let floor = BlockPos::new(6, 0, 5);
    let structure = Structure::from([
        (floor, TargetState::Block(BlockKind::Stone)),
        (unloaded, TargetState::Block(BlockKind::Stone)),
    ]);

    let report = scene.pass(&structure);
    assert!(report.failed.is_empty());
    assert_eq!(report.results.len(), 2);
    let rank_at = |pos| {
        report
            .results
            .iter()
            .find(|r| r.pos() == pos)
            .map(|r| r.rank())
    };
    assert_eq!(rank_at(floor), Some(Rank::Done));
    assert_eq!(rank_at(unloaded), Some(Rank::ChunkNotLoaded));
}

// ---------------------------------------------------------------------------
// Breaking
// ---------------------------------------------------------------------------

#[test]
fn water_is_submerged_before_anything_else() {
    let scene = Scene::flat()
        .block(BESIDE, BlockKind::Water)
        .hotbar(&[Item::Block(BlockKind::Cobblestone)]);
    let results = scene.simulate(BESIDE, TargetState::Empty);

    let Some(BuildResult::Break(BreakResult::Submerge(first))) = results.first() else {
        panic!("expected submerge first, got {results:?}");
    };
    assert_eq!(first.pos, BESIDE);

    let nested = &results[1..];
    assert!(!nested.is_empty());
    for result in nested {
        let BuildResult::Break(BreakResult::Dependency(dep)) = result else {
            panic!("expected a dependency, got {result}");
        };
        assert_eq!(dep.pos, BESIDE);
        assert_eq!(dep.inner.pos(), BESIDE);
    }
    // The nested solid fill is placeable right away.
    assert!(nested.iter().any(|r| r.rank() == Rank::PlaceSuccess));
}

#[test]
fn buried_block_is_broken_through_its_top_face() {
    let scene = Scene::flat()
        .fill(BlockPos::new(0, 1, 0), BlockPos::new(15, 1, 15), BlockKind::Stone)
        .agent_on(BlockPos::new(5, 1, 5))
        .hotbar(&[Item::Pickaxe(ToolTier::Iron)])
        .config_json(json!({ "build": { "strict_raycast": true } }));
    let target = TargetState::Exact(BlockState::of(BlockKind::Cobblestone));
    let results = scene.simulate(BESIDE, target);

    let Some(BuildResult::Break(BreakResult::Break(b))) = results.first() else {
        panic!("expected a break, got {results:?}");
    };
    assert_eq!(b.context.hit.pos, BESIDE);
    assert_eq!(b.context.hit.side, Direction::Up);
    assert!((b.context.hit.point.y - 2.0).abs() < 1e-6);
}

#[test]
fn tool_that_yields_a_drop_wins_over_a_faster_one() {
    let scene = Scene::flat()
        .block(BESIDE, BlockKind::Obsidian)
        .hotbar(&[Item::Pickaxe(ToolTier::Golden), Item::Pickaxe(ToolTier::Diamond)])
        .config_json(json!({ "breaking": { "suitable_tools_only": false } }));
    let results = scene.simulate(BESIDE, TargetState::Air);

    let Some(BuildResult::Break(BreakResult::Break(b))) = results.first() else {
        panic!("expected a break, got {results:?}");
    };
    assert_eq!(b.context.hotbar_index, 1);
    assert!(!b.context.instant_break);
}

// ---------------------------------------------------------------------------
// Placing
// ---------------------------------------------------------------------------

#[test]
fn impossible_orientation_never_succeeds() {
    let log = BlockState::of(BlockKind::OakLog).with(Property::Axis, PropertyValue::Axis(Axis::X));
    let scene = Scene::flat().hotbar(&[Item::Block(BlockKind::OakLog)]);
    let report = scene.pass(&Structure::from([(BESIDE, TargetState::Exact(log))]));

    assert_eq!(interacts(&report.results), 0);
    assert!(report.results.iter().any(|r| r.rank() == Rank::PlaceNoIntegrity));
}

#[test]
fn spleefing_chains_dependencies_three_deep() {
    let scene = Scene::flat()
        .block(BESIDE, BlockKind::Water)
        .entity(9, BESIDE)
        .hotbar(&[Item::Block(BlockKind::Cobblestone)])
        .config_json(json!({ "build": { "spleef_entities": true } }));
    let results = scene.simulate(BESIDE, TargetState::Empty);

    let deep: Vec<&BuildResult> = results.iter().filter(|r| dependency_depth(r) >= 3).collect();
    assert!(!deep.is_empty());
    for result in deep {
        let leaf = chain_leaf(result);
        assert!(leaf.as_dependent().is_none());
        assert_eq!(result.rank(), leaf.rank());
    }
}

// ---------------------------------------------------------------------------
// Whole passes
// ---------------------------------------------------------------------------

#[test]
fn repeated_passes_agree() {
    let scene = Scene::flat()
        .fill(BlockPos::new(6, 1, 3), BlockPos::new(7, 2, 7), BlockKind::Dirt)
        .block(BlockPos::new(4, 1, 7), BlockKind::Water)
        .hotbar(&[
            Item::Shovel(ToolTier::Iron),
            Item::Block(BlockKind::Cobblestone),
        ]);
    let mut structure: Structure = (3..=7)
        .flat_map(|z| (1..=2).map(move |y| (BlockPos::new(6, y, z), TargetState::Air)))
        .collect();
    structure.insert(BlockPos::new(4, 1, 7), TargetState::Empty);
    structure.insert(BlockPos::new(4, 1, 4), TargetState::Block(BlockKind::Cobblestone));

    let first = scene.pass(&structure);
    let second = scene.pass(&structure);
    assert!(!first.results.is_empty());
    assert_eq!(first.results, second.results);
    let ranks = |r: &[BuildResult]| r.iter().map(|x| x.rank()).collect::<Vec<_>>();
    assert_eq!(ranks(&first.results), ranks(&second.results));
}
