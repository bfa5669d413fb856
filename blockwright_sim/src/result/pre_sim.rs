// Outcomes of the pre-flight checks in `sim/basic.rs`.

use super::{Color, Drawable, Goal, Navigable, Rank, RenderHint};
use crate::state::BlockState;
use crate::types::BlockPos;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum PreSimResult {
    Done(Done),
    ChunkNotLoaded(ChunkNotLoaded),
    Restricted(Restricted),
    NoPermission(NoPermission),
    OutOfWorld(OutOfWorld),
    Unbreakable(Unbreakable),
}

/// The cell already satisfies its target.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Done {
    pub pos: BlockPos,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChunkNotLoaded {
    pub pos: BlockPos,
}

/// The agent's game mode forbids changing blocks.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Restricted {
    pub pos: BlockPos,
}

/// The block needs operator rights to change.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoPermission {
    pub pos: BlockPos,
    pub state: BlockState,
}

/// Outside the world border or height limit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutOfWorld {
    pub pos: BlockPos,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Unbreakable {
    pub pos: BlockPos,
    pub state: BlockState,
}

impl PreSimResult {
    pub fn done(pos: BlockPos) -> Self {
        PreSimResult::Done(Done { pos })
    }

    pub fn pos(&self) -> BlockPos {
        match self {
            PreSimResult::Done(r) => r.pos,
            PreSimResult::ChunkNotLoaded(r) => r.pos,
            PreSimResult::Restricted(r) => r.pos,
            PreSimResult::NoPermission(r) => r.pos,
            PreSimResult::OutOfWorld(r) => r.pos,
            PreSimResult::Unbreakable(r) => r.pos,
        }
    }

    pub fn name(&self) -> String {
        let pos = self.pos();
        match self {
            PreSimResult::Done(_) => format!("Build at {pos} is done."),
            PreSimResult::ChunkNotLoaded(_) => format!("Chunk at {pos} is not loaded."),
            PreSimResult::Restricted(_) => format!("Restricted at {pos}."),
            PreSimResult::NoPermission(_) => format!("No permission at {pos}."),
            PreSimResult::OutOfWorld(_) => format!("{pos} is out of the world."),
            PreSimResult::Unbreakable(_) => format!("Unbreakable at {pos}."),
        }
    }

    pub fn rank(&self) -> Rank {
        match self {
            PreSimResult::Done(_) => Rank::Done,
            PreSimResult::ChunkNotLoaded(_) => Rank::ChunkNotLoaded,
            PreSimResult::Restricted(_) => Rank::BreakRestricted,
            PreSimResult::NoPermission(_) => Rank::BreakNoPermission,
            PreSimResult::OutOfWorld(_) => Rank::OutOfWorld,
            PreSimResult::Unbreakable(_) => Rank::Unbreakable,
        }
    }

    pub fn as_drawable(&self) -> Option<&dyn Drawable> {
        match self {
            PreSimResult::Done(_) => None,
            PreSimResult::ChunkNotLoaded(r) => Some(r),
            PreSimResult::Restricted(r) => Some(r),
            PreSimResult::NoPermission(r) => Some(r),
            PreSimResult::OutOfWorld(r) => Some(r),
            PreSimResult::Unbreakable(r) => Some(r),
        }
    }

    pub fn as_navigable(&self) -> Option<&dyn Navigable> {
        match self {
            PreSimResult::ChunkNotLoaded(r) => Some(r),
            _ => None,
        }
    }
}

impl Drawable for ChunkNotLoaded {
    fn render_hint(&self) -> RenderHint {
        RenderHint::block(self.pos, Color::new(252, 165, 3, 100))
    }
}

impl Navigable for ChunkNotLoaded {
    fn goal(&self) -> Goal {
        Goal::Block(self.pos)
    }
}

impl Drawable for Restricted {
    fn render_hint(&self) -> RenderHint {
        RenderHint::block(self.pos, Color::new(255, 0, 0, 100))
    }
}

impl Drawable for NoPermission {
    fn render_hint(&self) -> RenderHint {
        RenderHint::block(self.pos, Color::new(255, 0, 0, 100))
    }
}

impl Drawable for OutOfWorld {
    fn render_hint(&self) -> RenderHint {
        RenderHint::block(self.pos, Color::new(3, 148, 252, 100))
    }
}

impl Drawable for Unbreakable {
    fn render_hint(&self) -> RenderHint {
        RenderHint::block(self.pos, Color::new(11, 11, 11, 100))
    }
}
