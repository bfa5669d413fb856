// Items, item stacks, and the block-breaking speed model.
//
// `Item` is the closed set of things an agent can hold: an empty hand,
// block items, tools in six tiers, shears, and flint and steel. `ItemStack`
// is an item in a specific inventory slot with its enchantments and
// adventure-mode `can_place_on` list.
//
// The second half of the file is the breaking math the break simulator uses
// to rank tools and decide whether a break finishes in a single tick:
// `break_delta` is the fraction of the block broken per tick, and
// `instant_breakable` compares it against the configured threshold.
//
// See also: `inventory.rs` for how stacks are selected, `block.rs` for the
// per-kind hardness and tool requirements these formulas read,
// `sim/break_sim.rs` for the consumer.

use crate::agent::Agent;
use crate::block::BlockKind;
use crate::state::BlockState;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolKind {
    Pickaxe,
    Axe,
    Shovel,
    Shears,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolTier {
    Wooden,
    Stone,
    Iron,
    Golden,
    Diamond,
    Netherite,
}

impl ToolTier {
    pub const ALL: [ToolTier; 6] = [
        ToolTier::Wooden,
        ToolTier::Stone,
        ToolTier::Iron,
        ToolTier::Golden,
        ToolTier::Diamond,
        ToolTier::Netherite,
    ];

    /// Mining speed multiplier against blocks this tier's tool is made for.
    pub fn speed(self) -> f32 {
        match self {
            ToolTier::Wooden => 2.0,
            ToolTier::Stone => 4.0,
            ToolTier::Iron => 6.0,
            ToolTier::Golden => 12.0,
            ToolTier::Diamond => 8.0,
            ToolTier::Netherite => 9.0,
        }
    }

    /// Harvest level compared against `BlockKind::required_tool_level`.
    pub fn level(self) -> u8 {
        match self {
            ToolTier::Wooden | ToolTier::Golden => 0,
            ToolTier::Stone => 1,
            ToolTier::Iron => 2,
            ToolTier::Diamond => 3,
            ToolTier::Netherite => 4,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ToolTier::Wooden => "wooden",
            ToolTier::Stone => "stone",
            ToolTier::Iron => "iron",
            ToolTier::Golden => "golden",
            ToolTier::Diamond => "diamond",
            ToolTier::Netherite => "netherite",
        }
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Item {
    /// Nothing in hand. Empty inventory slots hold this.
    Empty,
    Block(BlockKind),
    Pickaxe(ToolTier),
    Axe(ToolTier),
    Shovel(ToolTier),
    Shears,
    FlintAndSteel,
}

impl Item {
    pub fn is_empty(self) -> bool {
        self == Item::Empty
    }

    /// The block this item places, if it is a block item.
    pub fn block(self) -> Option<BlockKind> {
        match self {
            Item::Block(kind) => Some(kind.placed_by_item()),
            _ => None,
        }
    }

    pub fn is_block_item(self) -> bool {
        self.block().is_some()
    }

    pub fn tool_kind(self) -> Option<ToolKind> {
        match self {
            Item::Pickaxe(_) => Some(ToolKind::Pickaxe),
            Item::Axe(_) => Some(ToolKind::Axe),
            Item::Shovel(_) => Some(ToolKind::Shovel),
            Item::Shears => Some(ToolKind::Shears),
            _ => None,
        }
    }

    pub fn tier(self) -> Option<ToolTier> {
        match self {
            Item::Pickaxe(t) | Item::Axe(t) | Item::Shovel(t) => Some(t),
            _ => None,
        }
    }

    /// Speed multiplier of this item against `state`. 1.0 unless the item
    /// is the tool the block is mined with.
    pub fn mining_speed(self, state: &BlockState) -> f32 {
        match (self.tool_kind(), state.kind().mineable_with()) {
            (Some(ToolKind::Shears), Some(ToolKind::Shears)) => 2.0,
            (Some(kind), Some(wanted)) if kind == wanted => {
                self.tier().map_or(1.0, ToolTier::speed)
            }
            _ => 1.0,
        }
    }

    /// Whether breaking `state` with this item yields a drop.
    pub fn can_harvest(self, state: &BlockState) -> bool {
        let Some(level) = state.kind().required_tool_level() else {
            return true;
        };
        self.tool_kind() == state.kind().mineable_with()
            && self.tier().is_some_and(|tier| tier.level() >= level)
    }

    pub fn name(self) -> String {
        match self {
            Item::Empty => "air".to_string(),
            Item::Block(kind) => kind.name().to_string(),
            Item::Pickaxe(t) => format!("{}_pickaxe", t.name()),
            Item::Axe(t) => format!("{}_axe", t.name()),
            Item::Shovel(t) => format!("{}_shovel", t.name()),
            Item::Shears => "shears".to_string(),
            Item::FlintAndSteel => "flint_and_steel".to_string(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ---------------------------------------------------------------------------
// Item stacks
// ---------------------------------------------------------------------------

/// Slot index of the offhand in the flat inventory numbering.
pub const OFFHAND_SLOT: u8 = 40;

/// An item in one inventory slot. Slots 0..9 are the hotbar, 9..36 the main
/// inventory, 40 the offhand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: Item,
    pub count: u32,
    pub slot: u8,
    #[serde(default)]
    pub silk_touch: bool,
    #[serde(default)]
    pub fortune: u8,
    #[serde(default)]
    pub efficiency: u8,
    /// Adventure-mode whitelist of blocks this item may be placed against.
    #[serde(default)]
    pub can_place_on: Vec<BlockKind>,
}

impl ItemStack {
    pub fn new(item: Item, count: u32, slot: u8) -> Self {
        Self {
            item,
            count: if item.is_empty() { 0 } else { count },
            slot,
            silk_touch: false,
            fortune: 0,
            efficiency: 0,
            can_place_on: Vec::new(),
        }
    }

    pub fn empty(slot: u8) -> Self {
        Self::new(Item::Empty, 0, slot)
    }

    pub fn with_silk_touch(mut self) -> Self {
        self.silk_touch = true;
        self
    }

    pub fn with_fortune(mut self, level: u8) -> Self {
        self.fortune = level;
        self
    }

    pub fn with_efficiency(mut self, level: u8) -> Self {
        self.efficiency = level;
        self
    }

    pub fn with_can_place_on(mut self, kinds: impl IntoIterator<Item = BlockKind>) -> Self {
        self.can_place_on = kinds.into_iter().collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_empty() || self.count == 0
    }

    pub fn can_place_on(&self, kind: BlockKind) -> bool {
        self.can_place_on.contains(&kind)
    }
}

// ---------------------------------------------------------------------------
// Breaking speed
// ---------------------------------------------------------------------------

/// Fraction of `state` broken per tick by `agent` holding `stack`.
pub fn break_delta(state: &BlockState, stack: &ItemStack, agent: &Agent) -> f32 {
    let hardness = state.hardness();
    if hardness == -1.0 {
        return 0.0;
    }
    let harvest_divisor = if stack.item.can_harvest(state) { 30.0 } else { 100.0 };
    block_breaking_speed(state, stack, agent) / hardness / harvest_divisor
}

fn block_breaking_speed(state: &BlockState, stack: &ItemStack, agent: &Agent) -> f32 {
    let mut speed = stack.item.mining_speed(state);
    if speed > 1.0 && stack.efficiency > 0 {
        let level = f32::from(stack.efficiency);
        speed += level * level + 1.0;
    }
    if let Some(amplifier) = agent.haste {
        speed *= 1.0 + 0.2 * (f32::from(amplifier) + 1.0);
    }
    if let Some(amplifier) = agent.mining_fatigue {
        speed *= match amplifier {
            0 => 0.3,
            1 => 0.09,
            2 => 0.0027,
            _ => 8.1e-4,
        };
    }
    if agent.submerged {
        speed *= 0.2;
    }
    if !agent.on_ground {
        speed /= 5.0;
    }
    speed
}

/// Whether the break completes within one tick given `threshold`, the
/// fraction of progress at which a break counts as finished.
pub fn instant_breakable(state: &BlockState, stack: &ItemStack, agent: &Agent, threshold: f32) -> bool {
    let ticks_needed = 1.0 / (break_delta(state, stack, agent) / threshold);
    (ticks_needed <= 1.0 && ticks_needed != 0.0) || agent.is_creative()
}
