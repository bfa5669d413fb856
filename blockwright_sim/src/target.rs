// Target states: what the planner is trying to achieve at a position.
//
// A target is a family of acceptable states, not a single state. `matches`
// decides membership; `expected_state` picks the concrete state the
// simulators aim for; `required_item` names the item that produces it.
//
// See also: `state.rs` for `BlockState::matches`, `processing/` which may
// rewrite the expected state and item before simulation, `sim/mod.rs` which
// routes a target to the break or interact simulator.

use crate::agent::Agent;
use crate::block::BlockKind;
use crate::config::InventoryConfig;
use crate::item::Item;
use crate::state::{BlockState, Property};
use crate::types::{BlockPos, Direction};
use crate::world::WorldView;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TargetState {
    /// No block and no fluid.
    Empty,
    Air,
    /// Any full solid block not in `replace`.
    Solid { replace: Vec<BlockKind> },
    /// Something solid to lean on from `direction`: satisfied if that
    /// neighbour is solid already or this cell is.
    Support(Direction),
    /// A specific state, compared property by property.
    Exact(BlockState),
    /// Any state of a block kind.
    Block(BlockKind),
}

impl TargetState {
    pub fn solid() -> Self {
        TargetState::Solid { replace: Vec::new() }
    }

    pub fn matches(
        &self,
        state: &BlockState,
        pos: BlockPos,
        world: &dyn WorldView,
        ignore: &[Property],
    ) -> bool {
        match self {
            TargetState::Empty => state.is_empty() && !state.has_fluid(),
            TargetState::Air => state.is_air(),
            TargetState::Solid { replace } => {
                state.is_solid_block() && !replace.contains(&state.kind())
            }
            TargetState::Support(direction) => {
                world.block_state(pos.offset(*direction)).is_solid_block() || state.is_solid_block()
            }
            TargetState::Exact(target) => state.matches(target, ignore),
            TargetState::Block(kind) => state.kind() == *kind,
        }
    }

    /// The concrete state simulation aims for.
    pub fn expected_state(
        &self,
        pos: BlockPos,
        world: &dyn WorldView,
        agent: &Agent,
        inventory: &InventoryConfig,
    ) -> BlockState {
        match self {
            TargetState::Empty => world.block_state(pos).empty_state(),
            TargetState::Air => BlockState::air(),
            TargetState::Solid { .. } | TargetState::Support(_) => self
                .required_item(agent, inventory)
                .block()
                .map_or_else(|| BlockState::of(BlockKind::Netherrack), BlockState::of),
            TargetState::Exact(state) => state.clone(),
            TargetState::Block(kind) => BlockState::of(*kind),
        }
    }

    /// The item that produces the expected state. Filler targets take the
    /// first disposable block in the inventory, falling back to netherrack.
    pub fn required_item(&self, agent: &Agent, inventory: &InventoryConfig) -> Item {
        let replace: &[BlockKind] = match self {
            TargetState::Empty | TargetState::Air => return Item::Empty,
            TargetState::Exact(state) => return state.kind().item(),
            TargetState::Block(kind) => return kind.item(),
            TargetState::Solid { replace } => replace,
            TargetState::Support(_) => &[],
        };
        agent
            .inventory
            .items()
            .filter_map(|stack| match stack.item {
                Item::Block(kind) => Some(kind),
                _ => None,
            })
            .find(|kind| inventory.disposables.contains(kind) && !replace.contains(kind))
            .map_or(Item::Block(BlockKind::Netherrack), Item::Block)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TargetState::Empty | TargetState::Air => true,
            TargetState::Solid { .. } | TargetState::Support(_) => false,
            TargetState::Exact(state) => state.is_empty(),
            TargetState::Block(kind) => BlockState::of(*kind).is_empty(),
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetState::Empty => f.write_str("Empty"),
            TargetState::Air => f.write_str("Air"),
            TargetState::Solid { .. } => f.write_str("Solid"),
            TargetState::Support(direction) => write!(f, "Support for {direction}"),
            TargetState::Exact(state) => write!(f, "State of {state}"),
            TargetState::Block(kind) => write!(f, "Block of {kind}"),
        }
    }
}
