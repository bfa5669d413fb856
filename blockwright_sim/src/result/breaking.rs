// Outcomes of the break simulator.

use super::{
    BreakContext, BuildContext, Color, Contextual, Dependency, Dependent, Drawable, Goal, HintShape,
    Navigable, Rank, RenderHint, Resolution, Resolvable, move_to_main_hand,
};
use crate::agent::Agent;
use crate::geometry::Vec3;
use crate::inventory::{StackFilter, StackSelection, StackSort};
use crate::item::Item;
use crate::state::BlockState;
use crate::types::{BlockPos, Direction, SideSet};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum BreakResult {
    Break(Break),
    NotExposed(NotExposed),
    ItemCantMine(ItemCantMine),
    Submerge(Submerge),
    BlockedByFluid(BlockedByFluid),
    PlayerOnTop(PlayerOnTop),
    Dependency(Dependency),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Break {
    pub pos: BlockPos,
    pub context: BreakContext,
}

/// The hit face is covered.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NotExposed {
    pub pos: BlockPos,
    pub side: Direction,
}

/// The held item cannot mine the block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemCantMine {
    pub pos: BlockPos,
    pub state: BlockState,
    pub bad_item: Item,
}

/// Fluid at `pos` has to be displaced first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Submerge {
    pub pos: BlockPos,
    pub state: BlockState,
}

/// Breaking would let the fluids in `affected` flow.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockedByFluid {
    pub pos: BlockPos,
    pub state: BlockState,
    pub affected: BTreeSet<BlockPos>,
}

/// The agent is standing on the block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerOnTop {
    pub pos: BlockPos,
    pub state: BlockState,
}

impl BreakResult {
    pub fn pos(&self) -> BlockPos {
        match self {
            BreakResult::Break(r) => r.pos,
            BreakResult::NotExposed(r) => r.pos,
            BreakResult::ItemCantMine(r) => r.pos,
            BreakResult::Submerge(r) => r.pos,
            BreakResult::BlockedByFluid(r) => r.pos,
            BreakResult::PlayerOnTop(r) => r.pos,
            BreakResult::Dependency(r) => r.pos,
        }
    }

    pub fn name(&self) -> String {
        let kind = match self {
            BreakResult::Break(_) => "Break",
            BreakResult::NotExposed(_) => "NotExposed",
            BreakResult::ItemCantMine(_) => "ItemCantMine",
            BreakResult::Submerge(_) => "Submerge",
            BreakResult::BlockedByFluid(_) => "BlockedByFluid",
            BreakResult::PlayerOnTop(_) => "PlayerOnTop",
            BreakResult::Dependency(d) => {
                return format!("Break at {} depends on {}", d.pos, d.dependency().name());
            }
        };
        format!("{kind} at {}", self.pos())
    }

    pub fn rank(&self) -> Rank {
        match self {
            BreakResult::Break(_) => Rank::BreakSuccess,
            BreakResult::NotExposed(_) => Rank::BreakNotExposed,
            BreakResult::ItemCantMine(_) => Rank::BreakItemCantMine,
            BreakResult::Submerge(_) => Rank::BreakSubmerge,
            BreakResult::BlockedByFluid(_) => Rank::BreakIsBlockedByFluid,
            BreakResult::PlayerOnTop(_) => Rank::BreakPlayerOnTop,
            BreakResult::Dependency(d) => d.last_dependency().rank(),
        }
    }

    pub fn as_drawable(&self) -> Option<&dyn Drawable> {
        match self {
            BreakResult::Break(r) => Some(&r.context),
            BreakResult::NotExposed(r) => Some(r),
            BreakResult::ItemCantMine(_) => None,
            BreakResult::Submerge(r) => Some(r),
            BreakResult::BlockedByFluid(r) => Some(r),
            BreakResult::PlayerOnTop(r) => Some(r),
            BreakResult::Dependency(d) => d.last_dependency().as_drawable(),
        }
    }

    pub fn as_navigable(&self) -> Option<&dyn Navigable> {
        match self {
            BreakResult::PlayerOnTop(r) => Some(r),
            BreakResult::Dependency(d) => d.last_dependency().as_navigable(),
            _ => None,
        }
    }

    pub fn as_resolvable(&self) -> Option<&dyn Resolvable> {
        match self {
            BreakResult::ItemCantMine(r) => Some(r),
            BreakResult::Dependency(d) => d.last_dependency().as_resolvable(),
            _ => None,
        }
    }

    pub fn as_contextual(&self) -> Option<&dyn Contextual> {
        match self {
            BreakResult::Break(r) => Some(r),
            BreakResult::Dependency(d) => d.last_dependency().as_contextual(),
            _ => None,
        }
    }
}

impl Contextual for Break {
    fn context(&self) -> &dyn BuildContext {
        &self.context
    }
}

impl Drawable for NotExposed {
    fn render_hint(&self) -> RenderHint {
        let color = Color::new(46, 0, 0, 30);
        RenderHint {
            shape: HintShape::Block {
                pos: self.pos,
                sides: SideSet::only(self.side),
            },
            fill: color,
            outline: color,
        }
    }
}

impl Resolvable for ItemCantMine {
    fn resolve(&self, agent: &Agent) -> Option<Resolution> {
        let selection = StackSelection::everything()
            .filter(StackFilter::NotItem(self.bad_item))
            .sort_by(StackSort::SelectedSlot);
        move_to_main_hand(&selection, agent)
    }
}

impl Drawable for Submerge {
    fn render_hint(&self) -> RenderHint {
        RenderHint::block(self.pos, Color::new(114, 27, 255, 100))
    }
}

impl Drawable for BlockedByFluid {
    fn render_hint(&self) -> RenderHint {
        RenderHint::marker(Vec3::center_of(self.pos), 0.1, Color::new(50, 12, 112, 100))
    }
}

impl Drawable for PlayerOnTop {
    fn render_hint(&self) -> RenderHint {
        RenderHint::block(self.pos, Color::new(252, 3, 207, 100))
    }
}

impl Navigable for PlayerOnTop {
    fn goal(&self) -> Goal {
        Goal::Inverted(Box::new(Goal::Block(self.pos)))
    }
}
