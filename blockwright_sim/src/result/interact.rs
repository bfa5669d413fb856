// Outcomes of the interact/place simulator.

use super::{
    BuildContext, Color, Contextual, Dependency, Dependent, Drawable, Goal, HintShape, InteractContext,
    Navigable, Rank, RenderHint, point_marker,
};
use crate::geometry::Vec3;
use crate::item::ItemStack;
use crate::state::BlockState;
use crate::types::{BlockPos, Direction};
use crate::world::{BlockHit, EntityId};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum InteractResult {
    Interact(Interact),
    NoIntegrity(NoIntegrity),
    BlockedBySelf(BlockedBySelf),
    BlockedByEntity(BlockedByEntity),
    CantReplace(CantReplace),
    ScaffoldExceeded(ScaffoldExceeded),
    BlockFeatureDisabled(BlockFeatureDisabled),
    UnexpectedPosition(UnexpectedPosition),
    IllegalUsage(IllegalUsage),
    Dependency(Dependency),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Interact {
    pub pos: BlockPos,
    pub context: InteractContext,
}

/// No tried orientation produced a state matching the target. `actual` is
/// the last state a placement would have produced, if any.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoIntegrity {
    pub pos: BlockPos,
    pub expected: BlockState,
    pub actual: Option<BlockState>,
    pub hit: BlockHit,
}

/// The agent's own hitbox is in the way.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockedBySelf {
    pub pos: BlockPos,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockedByEntity {
    pub pos: BlockPos,
    pub entities: Vec<EntityId>,
    pub hit_point: Vec3,
    pub side: Direction,
}

/// The landing cell holds something that is not replaceable.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CantReplace {
    pub pos: BlockPos,
    pub landing: BlockPos,
}

/// Scaffolding would extend past its limit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScaffoldExceeded {
    pub pos: BlockPos,
}

/// The world has the item's feature switched off.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockFeatureDisabled {
    pub pos: BlockPos,
    pub stack: ItemStack,
}

/// The block would land at `actual` instead of `pos`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnexpectedPosition {
    pub pos: BlockPos,
    pub actual: BlockPos,
}

/// The agent may not modify the world and the item may not be placed on
/// the clicked block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IllegalUsage {
    pub pos: BlockPos,
}

impl InteractResult {
    pub fn pos(&self) -> BlockPos {
        match self {
            InteractResult::Interact(r) => r.pos,
            InteractResult::NoIntegrity(r) => r.pos,
            InteractResult::BlockedBySelf(r) => r.pos,
            InteractResult::BlockedByEntity(r) => r.pos,
            InteractResult::CantReplace(r) => r.pos,
            InteractResult::ScaffoldExceeded(r) => r.pos,
            InteractResult::BlockFeatureDisabled(r) => r.pos,
            InteractResult::UnexpectedPosition(r) => r.pos,
            InteractResult::IllegalUsage(r) => r.pos,
            InteractResult::Dependency(r) => r.pos,
        }
    }

    pub fn name(&self) -> String {
        let kind = match self {
            InteractResult::Interact(_) => "Interact",
            InteractResult::NoIntegrity(_) => "NoIntegrity",
            InteractResult::BlockedBySelf(_) => "BlockedBySelf",
            InteractResult::BlockedByEntity(_) => "BlockedByEntity",
            InteractResult::CantReplace(_) => "CantReplace",
            InteractResult::ScaffoldExceeded(_) => "ScaffoldExceeded",
            InteractResult::BlockFeatureDisabled(_) => "BlockFeatureDisabled",
            InteractResult::UnexpectedPosition(_) => "UnexpectedPosition",
            InteractResult::IllegalUsage(_) => "IllegalUsage",
            InteractResult::Dependency(d) => {
                return format!("Interact at {} depends on {}", d.pos, d.dependency().name());
            }
        };
        format!("{kind} at {}", self.pos())
    }

    pub fn rank(&self) -> Rank {
        match self {
            InteractResult::Interact(_) => Rank::PlaceSuccess,
            InteractResult::NoIntegrity(_) => Rank::PlaceNoIntegrity,
            InteractResult::BlockedBySelf(_) => Rank::PlaceBlockedByPlayer,
            InteractResult::BlockedByEntity(_) => Rank::PlaceBlockedByEntity,
            InteractResult::CantReplace(_) => Rank::PlaceCantReplace,
            InteractResult::ScaffoldExceeded(_) => Rank::PlaceScaffoldExceeded,
            InteractResult::BlockFeatureDisabled(_) => Rank::PlaceBlockFeatureDisabled,
            InteractResult::UnexpectedPosition(_) => Rank::UnexpectedPosition,
            InteractResult::IllegalUsage(_) => Rank::PlaceIllegalUsage,
            InteractResult::Dependency(d) => d.last_dependency().rank(),
        }
    }

    pub fn as_drawable(&self) -> Option<&dyn Drawable> {
        match self {
            InteractResult::Interact(r) => Some(&r.context),
            InteractResult::NoIntegrity(r) => Some(r),
            InteractResult::BlockedByEntity(r) => Some(r),
            InteractResult::Dependency(d) => d.last_dependency().as_drawable(),
            _ => None,
        }
    }

    pub fn as_navigable(&self) -> Option<&dyn Navigable> {
        match self {
            InteractResult::BlockedBySelf(r) => Some(r),
            InteractResult::Dependency(d) => d.last_dependency().as_navigable(),
            _ => None,
        }
    }

    pub fn as_contextual(&self) -> Option<&dyn Contextual> {
        match self {
            InteractResult::Interact(r) => Some(r),
            InteractResult::Dependency(d) => d.last_dependency().as_contextual(),
            _ => None,
        }
    }
}

impl Contextual for Interact {
    fn context(&self) -> &dyn BuildContext {
        &self.context
    }
}

impl Drawable for NoIntegrity {
    fn render_hint(&self) -> RenderHint {
        let color = Color::new(252, 3, 3, 100);
        RenderHint {
            shape: HintShape::Box(point_marker(self.hit.point, self.hit.side)),
            fill: color,
            outline: color,
        }
    }
}

impl Navigable for BlockedBySelf {
    fn goal(&self) -> Goal {
        Goal::Inverted(Box::new(Goal::Block(self.pos)))
    }
}

impl Drawable for BlockedByEntity {
    fn render_hint(&self) -> RenderHint {
        let color = Color::new(252, 3, 3, 100);
        RenderHint {
            shape: HintShape::Box(point_marker(self.hit_point, self.side)),
            fill: color,
            outline: color,
        }
    }
}
