// Block catalogue: every block kind the planner understands, with the
// metadata the checks and simulators read.
//
// Each `BlockKind` answers static questions (hardness, which tool mines it,
// whether it is replaceable, whether it falls, which properties its states
// carry, how it is placed). Per-state questions (shape, fluid, property
// values) live on `BlockState` in `state.rs`.
//
// The catalogue is deliberately closed: adding a block means adding a
// variant and filling in every `match` below, which the compiler enforces.
//
// See also: `state.rs` for `BlockState`, `item.rs` for the items that place
// or mine these blocks, `placement.rs` for how placement rules resolve.

use crate::item::{Item, ToolKind};
use crate::state::Property;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a block item turns a click into a block state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementRule {
    /// Default state, waterlogged if placed into water.
    Simple,
    /// Log-like: axis follows the clicked face.
    Pillar,
    /// Faces back toward the placing agent.
    FacingAgent,
    /// Facing follows the agent; half from the clicked face and hit height.
    Stairs,
    /// Half from the clicked face and hit height; merges into a double slab.
    Slab,
    /// Facing follows the agent; hinge from the hit offset.
    Door,
    /// Lever-style: floor, ceiling or wall from the clicked face.
    WallMounted,
    /// Bell-style attachment from the clicked face.
    Bell,
    /// Points into the block it was placed against; never up.
    Hopper,
    /// Standing sign; 16-step rotation from the agent's yaw.
    StandingSign,
    /// Bamboo items place a sapling unless stacking onto bamboo.
    Bamboo,
    /// Climbs along the clicked direction when placed onto scaffolding.
    Scaffolding,
    /// Has no block item.
    NotPlaceable,
}

/// What a block needs next to it to stay placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupportRule {
    None,
    /// A solid block directly below.
    SolidBelow,
    /// Bamboo, a sapling, or soil below.
    BambooSoil,
    /// Attached to the face recorded in its own properties.
    Attached,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Air,
    Water,
    Lava,
    Stone,
    Cobblestone,
    Dirt,
    GrassBlock,
    ShortGrass,
    Sand,
    Gravel,
    Netherrack,
    Obsidian,
    Bedrock,
    OakLog,
    OakPlanks,
    OakSlab,
    OakStairs,
    OakDoor,
    Glass,
    Lever,
    Bell,
    Hopper,
    OakSign,
    Bamboo,
    BambooSapling,
    Fire,
    FlowerPot,
    PottedPoppy,
    PottedDandelion,
    Poppy,
    Dandelion,
    CommandBlock,
    Scaffolding,
    Chest,
    Furnace,
}

impl BlockKind {
    pub const ALL: [BlockKind; 35] = [
        BlockKind::Air,
        BlockKind::Water,
        BlockKind::Lava,
        BlockKind::Stone,
        BlockKind::Cobblestone,
        BlockKind::Dirt,
        BlockKind::GrassBlock,
        BlockKind::ShortGrass,
        BlockKind::Sand,
        BlockKind::Gravel,
        BlockKind::Netherrack,
        BlockKind::Obsidian,
        BlockKind::Bedrock,
        BlockKind::OakLog,
        BlockKind::OakPlanks,
        BlockKind::OakSlab,
        BlockKind::OakStairs,
        BlockKind::OakDoor,
        BlockKind::Glass,
        BlockKind::Lever,
        BlockKind::Bell,
        BlockKind::Hopper,
        BlockKind::OakSign,
        BlockKind::Bamboo,
        BlockKind::BambooSapling,
        BlockKind::Fire,
        BlockKind::FlowerPot,
        BlockKind::PottedPoppy,
        BlockKind::PottedDandelion,
        BlockKind::Poppy,
        BlockKind::Dandelion,
        BlockKind::CommandBlock,
        BlockKind::Scaffolding,
        BlockKind::Chest,
        BlockKind::Furnace,
    ];

    /// Seconds-ish resistance to mining. `-1` means unbreakable.
    pub fn hardness(self) -> f32 {
        use BlockKind::*;
        match self {
            Air | ShortGrass | Fire | FlowerPot | PottedPoppy | PottedDandelion | Poppy
            | Dandelion | Scaffolding => 0.0,
            Water | Lava => 100.0,
            Stone => 1.5,
            Cobblestone | OakPlanks | OakLog | OakSlab | OakStairs => 2.0,
            Dirt | Sand => 0.5,
            GrassBlock | Gravel => 0.6,
            Netherrack => 0.4,
            Obsidian => 50.0,
            Bedrock | CommandBlock => -1.0,
            OakDoor | Hopper => 3.0,
            Glass => 0.3,
            Lever => 0.5,
            Bell => 5.0,
            OakSign | Bamboo | BambooSapling => 1.0,
            Chest => 2.5,
            Furnace => 3.5,
        }
    }

    /// Whether a placement may overwrite this block in place.
    pub fn is_replaceable(self) -> bool {
        matches!(
            self,
            BlockKind::Air | BlockKind::Water | BlockKind::Lava | BlockKind::ShortGrass | BlockKind::Fire
        )
    }

    /// Full opaque cube in every state.
    pub fn is_solid_cube(self) -> bool {
        use BlockKind::*;
        matches!(
            self,
            Stone
                | Cobblestone
                | Dirt
                | GrassBlock
                | Sand
                | Gravel
                | Netherrack
                | Obsidian
                | Bedrock
                | OakLog
                | OakPlanks
                | CommandBlock
                | Furnace
        )
    }

    /// Affected by gravity.
    pub fn is_falling(self) -> bool {
        matches!(self, BlockKind::Sand | BlockKind::Gravel)
    }

    /// A falling block can drop into this block.
    pub fn can_fall_through(self) -> bool {
        matches!(
            self,
            BlockKind::Air | BlockKind::Water | BlockKind::Lava | BlockKind::Fire | BlockKind::ShortGrass
        )
    }

    /// Requires an operator in creative mode to alter.
    pub fn is_operator_only(self) -> bool {
        matches!(self, BlockKind::CommandBlock)
    }

    /// Right-clicking the block does something, so placing against it
    /// requires sneaking.
    pub fn is_interactive(self) -> bool {
        use BlockKind::*;
        matches!(
            self,
            OakDoor | Lever | Bell | Hopper | OakSign | FlowerPot | PottedPoppy | PottedDandelion
                | CommandBlock | Chest | Furnace
        )
    }

    pub fn is_waterloggable(self) -> bool {
        matches!(
            self,
            BlockKind::OakSlab | BlockKind::OakStairs | BlockKind::OakSign | BlockKind::Chest
        )
    }

    pub fn is_slab(self) -> bool {
        matches!(self, BlockKind::OakSlab)
    }

    pub fn is_potted_flower(self) -> bool {
        matches!(self, BlockKind::PottedPoppy | BlockKind::PottedDandelion)
    }

    /// Tool category that mines this block faster.
    pub fn mineable_with(self) -> Option<ToolKind> {
        use BlockKind::*;
        match self {
            Stone | Cobblestone | Netherrack | Obsidian | Furnace | Hopper | Bell => {
                Some(ToolKind::Pickaxe)
            }
            OakLog | OakPlanks | OakSlab | OakStairs | OakDoor | OakSign | Chest | Bamboo
            | BambooSapling => Some(ToolKind::Axe),
            Dirt | GrassBlock | Sand | Gravel => Some(ToolKind::Shovel),
            ShortGrass => Some(ToolKind::Shears),
            _ => None,
        }
    }

    /// Minimum tool level needed for the block to drop anything, if the
    /// block requires a tool at all.
    pub fn required_tool_level(self) -> Option<u8> {
        use BlockKind::*;
        match self {
            Stone | Cobblestone | Netherrack | Furnace | Hopper | Bell => Some(0),
            Obsidian => Some(3),
            _ => None,
        }
    }

    pub fn placement_rule(self) -> PlacementRule {
        use BlockKind::*;
        match self {
            Air | Water | Lava | Fire | PottedPoppy | PottedDandelion => PlacementRule::NotPlaceable,
            OakLog => PlacementRule::Pillar,
            Chest | Furnace => PlacementRule::FacingAgent,
            OakStairs => PlacementRule::Stairs,
            OakSlab => PlacementRule::Slab,
            OakDoor => PlacementRule::Door,
            Lever => PlacementRule::WallMounted,
            Bell => PlacementRule::Bell,
            Hopper => PlacementRule::Hopper,
            OakSign => PlacementRule::StandingSign,
            Bamboo | BambooSapling => PlacementRule::Bamboo,
            Scaffolding => PlacementRule::Scaffolding,
            _ => PlacementRule::Simple,
        }
    }

    pub fn support_rule(self) -> SupportRule {
        use BlockKind::*;
        match self {
            OakSign | OakDoor | FlowerPot | PottedPoppy | PottedDandelion | Poppy | Dandelion
            | Fire | ShortGrass => SupportRule::SolidBelow,
            Bamboo | BambooSapling => SupportRule::BambooSoil,
            Lever | Bell => SupportRule::Attached,
            _ => SupportRule::None,
        }
    }

    /// Properties every state of this kind carries, in canonical order.
    pub fn properties(self) -> &'static [Property] {
        use BlockKind::*;
        match self {
            Water | Lava => &[Property::Level],
            OakLog => &[Property::Axis],
            OakSlab => &[Property::SlabType, Property::Waterlogged],
            OakStairs => &[Property::HorizontalFacing, Property::Half, Property::Waterlogged],
            OakDoor => &[
                Property::HorizontalFacing,
                Property::Hinge,
                Property::Open,
                Property::Powered,
            ],
            Lever => &[Property::Face, Property::HorizontalFacing, Property::Powered],
            Bell => &[Property::Attachment, Property::HorizontalFacing, Property::Powered],
            Hopper => &[Property::HopperFacing],
            OakSign => &[Property::Rotation, Property::Waterlogged],
            Bamboo | Fire => &[Property::Age],
            Chest => &[Property::HorizontalFacing, Property::Waterlogged],
            Furnace => &[Property::HorizontalFacing, Property::Lit],
            _ => &[],
        }
    }

    /// The item that places this block, or that the block is picked as.
    pub fn item(self) -> Item {
        use BlockKind::*;
        match self {
            Air | Water | Lava | Fire => Item::Empty,
            BambooSapling => Item::Block(Bamboo),
            PottedPoppy => Item::Block(Poppy),
            PottedDandelion => Item::Block(Dandelion),
            other => Item::Block(other),
        }
    }

    /// The block an item of this kind places by default.
    pub fn placed_by_item(self) -> BlockKind {
        match self {
            BlockKind::Bamboo => BlockKind::BambooSapling,
            other => other,
        }
    }

    pub fn name(self) -> &'static str {
        use BlockKind::*;
        match self {
            Air => "air",
            Water => "water",
            Lava => "lava",
            Stone => "stone",
            Cobblestone => "cobblestone",
            Dirt => "dirt",
            GrassBlock => "grass_block",
            ShortGrass => "short_grass",
            Sand => "sand",
            Gravel => "gravel",
            Netherrack => "netherrack",
            Obsidian => "obsidian",
            Bedrock => "bedrock",
            OakLog => "oak_log",
            OakPlanks => "oak_planks",
            OakSlab => "oak_slab",
            OakStairs => "oak_stairs",
            OakDoor => "oak_door",
            Glass => "glass",
            Lever => "lever",
            Bell => "bell",
            Hopper => "hopper",
            OakSign => "oak_sign",
            Bamboo => "bamboo",
            BambooSapling => "bamboo_sapling",
            Fire => "fire",
            FlowerPot => "flower_pot",
            PottedPoppy => "potted_poppy",
            PottedDandelion => "potted_dandelion",
            Poppy => "poppy",
            Dandelion => "dandelion",
            CommandBlock => "command_block",
            Scaffolding => "scaffolding",
            Chest => "chest",
            Furnace => "furnace",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
