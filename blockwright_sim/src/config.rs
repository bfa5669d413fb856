// Data-driven planner configuration.
//
// Every tunable the checks and simulators read lives in `PlannerConfig`,
// grouped the way the planner is: `BuildConfig` for reach and point
// selection shared by both simulators, `BreakConfig` for tool choice and
// liquid/support safety, `InteractConfig` for placement, and
// `InventoryConfig` for filler materials. The simulators never use magic
// numbers; they read from here.
//
// Every struct is `#[serde(default)]`, so a JSON file only needs to name
// the values it changes.
//
// See also: `sim/mod.rs` where the config is threaded through
// `SimContext`, `visibility.rs` for `PointSelection`, `result/context.rs`
// for `SortMode`.
//
// **Critical constraint: determinism.** Two passes with the same config,
// world, and agent produce identically ordered results. `seed` feeds the
// `Random` sort mode.

use crate::block::BlockKind;
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How to pick one point among all visible, reachable candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointSelection {
    /// Smallest turn from the agent's current rotation.
    ByRotation,
    /// Closest to the mean of all candidates.
    #[default]
    Optimum,
}

/// Ordering among contextual results that tie on everything else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    /// Prefer the held tool, then closest.
    #[default]
    Tool,
    Closest,
    Farthest,
    /// Smallest turn from the active rotation.
    Rotation,
    Random,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Reach used when sorting falling blocks (half of it is discounted).
    pub entity_reach: f64,
    pub block_reach: f64,
    /// Only scan faces the eye can see.
    pub check_side_visibility: bool,
    /// Scan a grid of points on each face and raycast every one, instead of
    /// taking the closest point on each face.
    pub strict_raycast: bool,
    /// Grid steps per face axis in strict mode.
    pub resolution: u32,
    pub point_selection: PointSelection,
    /// Break blocks under obstructing entities so they fall out of the way.
    pub spleef_entities: bool,
    /// How many nested simulations one result may depend on.
    pub max_build_dependencies: usize,
    /// Inset applied to shapes before scanning so points never sit on an edge.
    pub shrink_factor: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            entity_reach: 3.0,
            block_reach: 4.5,
            check_side_visibility: true,
            strict_raycast: false,
            resolution: 5,
            point_selection: PointSelection::Optimum,
            spleef_entities: false,
            max_build_dependencies: 3,
            shrink_factor: 0.001,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakConfig {
    /// Break progress at which a block counts as broken.
    pub break_threshold: f32,
    /// Refuse breaks that would let fluids flow.
    pub avoid_liquids: bool,
    /// Refuse to break the block the agent stands on.
    pub avoid_supporting: bool,
    pub efficient_only: bool,
    pub suitable_tools_only: bool,
    pub force_silk_touch: bool,
    pub force_fortune: bool,
    pub min_fortune_level: u8,
    pub use_wooden_tools: bool,
    pub use_stone_tools: bool,
    pub use_iron_tools: bool,
    pub use_gold_tools: bool,
    pub use_diamond_tools: bool,
    pub use_netherite_tools: bool,
    /// Swap to the best tool before breaking; otherwise break with whatever
    /// is in hand.
    pub swap_tools: bool,
    pub ignored_blocks: Vec<BlockKind>,
    pub sorter: SortMode,
}

impl Default for BreakConfig {
    fn default() -> Self {
        Self {
            break_threshold: 0.7,
            avoid_liquids: true,
            avoid_supporting: true,
            efficient_only: true,
            suitable_tools_only: true,
            force_silk_touch: false,
            force_fortune: false,
            min_fortune_level: 1,
            use_wooden_tools: true,
            use_stone_tools: true,
            use_iron_tools: true,
            use_gold_tools: true,
            use_diamond_tools: true,
            use_netherite_tools: true,
            swap_tools: true,
            ignored_blocks: Vec::new(),
            sorter: SortMode::Tool,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractConfig {
    /// Place against air as if it were a full block.
    pub air_place: bool,
    /// Search agent orientations for orientation-sensitive blocks.
    pub axis_rotate: bool,
    pub sorter: SortMode,
}

impl Default for InteractConfig {
    fn default() -> Self {
        Self {
            air_place: false,
            axis_rotate: true,
            sorter: SortMode::Tool,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Blocks that may be used as throwaway filler for `Solid` targets.
    pub disposables: Vec<BlockKind>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            disposables: vec![
                BlockKind::Netherrack,
                BlockKind::Cobblestone,
                BlockKind::Dirt,
                BlockKind::Stone,
            ],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub build: BuildConfig,
    pub breaking: BreakConfig,
    pub interact: InteractConfig,
    pub inventory: InventoryConfig,
    /// Seed for the `Random` sort mode.
    pub seed: u64,
}

impl PlannerConfig {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_overrides_only_named_values() {
        let config = PlannerConfig::from_json(
            r#"{ "build": { "block_reach": 6.0 }, "breaking": { "sorter": "Random" } }"#,
        )
        .unwrap();
        assert_eq!(config.build.block_reach, 6.0);
        assert_eq!(config.build.resolution, 5);
        assert_eq!(config.breaking.sorter, SortMode::Random);
        assert!(config.breaking.avoid_liquids);
        assert_eq!(config.inventory.disposables.len(), 4);
    }

    #[test]
    fn config_roundtrip() {
        let config = PlannerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back = PlannerConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = PlannerConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = PlannerConfig::from_json_file("/nonexistent/blockwright.json").unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
