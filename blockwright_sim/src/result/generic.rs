// Outcomes shared by both simulators: visibility, reach, item choice.

use super::{Color, Drawable, Goal, Navigable, Rank, RenderHint, Resolution, Resolvable, move_to_main_hand};
use crate::agent::Agent;
use crate::geometry::Vec3;
use crate::inventory::StackSelection;
use crate::item::ItemStack;
use crate::types::{BlockPos, Direction};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum GenericResult {
    NotVisible(NotVisible),
    Ignored(Ignored),
    WrongItemSelection(WrongItemSelection),
    OutOfReach(OutOfReach),
}

/// Every face point was within reach, but none could be seen.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NotVisible {
    pub pos: BlockPos,
    pub hit_pos: BlockPos,
    pub distance: f64,
}

/// The block is on the ignore list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ignored {
    pub pos: BlockPos,
}

/// A usable stack exists, but not in a container the planner may use
/// without moving items.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WrongItemSelection {
    pub pos: BlockPos,
    pub needed: StackSelection,
    pub current: ItemStack,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutOfReach {
    pub pos: BlockPos,
    pub pov: Vec3,
    /// Sampled points that were beyond reach, with their face.
    pub misses: Vec<(Vec3, Direction)>,
}

impl OutOfReach {
    /// Distance from the viewpoint to the closest miss.
    pub fn distance(&self) -> f64 {
        self.misses
            .iter()
            .map(|(p, _)| self.pov.distance(*p))
            .min_by(f64::total_cmp)
            .unwrap_or(0.0)
    }
}

impl GenericResult {
    pub fn pos(&self) -> BlockPos {
        match self {
            GenericResult::NotVisible(r) => r.pos,
            GenericResult::Ignored(r) => r.pos,
            GenericResult::WrongItemSelection(r) => r.pos,
            GenericResult::OutOfReach(r) => r.pos,
        }
    }

    pub fn name(&self) -> String {
        match self {
            GenericResult::NotVisible(r) => format!("Not visible at {}.", r.pos),
            GenericResult::Ignored(r) => format!("Build at {} is ignored.", r.pos),
            GenericResult::WrongItemSelection(r) => {
                format!("Wrong item ({}) for {} need {}", r.current.item, r.pos, r.needed)
            }
            GenericResult::OutOfReach(r) => format!("Out of reach at {}.", r.pos),
        }
    }

    pub fn rank(&self) -> Rank {
        match self {
            GenericResult::NotVisible(_) => Rank::NotVisible,
            GenericResult::Ignored(_) => Rank::Ignored,
            GenericResult::WrongItemSelection(_) => Rank::WrongItem,
            GenericResult::OutOfReach(_) => Rank::OutOfReach,
        }
    }

    pub fn as_drawable(&self) -> Option<&dyn Drawable> {
        match self {
            GenericResult::NotVisible(r) => Some(r),
            GenericResult::Ignored(_) => None,
            GenericResult::WrongItemSelection(r) => Some(r),
            GenericResult::OutOfReach(r) => Some(r),
        }
    }

    pub fn as_navigable(&self) -> Option<&dyn Navigable> {
        match self {
            GenericResult::OutOfReach(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_resolvable(&self) -> Option<&dyn Resolvable> {
        match self {
            GenericResult::WrongItemSelection(r) => Some(r),
            _ => None,
        }
    }
}

impl Drawable for NotVisible {
    fn render_hint(&self) -> RenderHint {
        RenderHint::marker(Vec3::center_of(self.pos), 0.05, Color::new(46, 0, 0, 80))
    }
}

impl Drawable for WrongItemSelection {
    fn render_hint(&self) -> RenderHint {
        RenderHint::marker(Vec3::center_of(self.pos), 0.1, Color::new(3, 252, 169, 25))
    }
}

impl Resolvable for WrongItemSelection {
    fn resolve(&self, agent: &Agent) -> Option<Resolution> {
        move_to_main_hand(&self.needed, agent)
    }
}

impl Drawable for OutOfReach {
    fn render_hint(&self) -> RenderHint {
        RenderHint::marker(Vec3::center_of(self.pos), 0.1, Color::new(252, 3, 207, 25))
    }
}

impl Navigable for OutOfReach {
    fn goal(&self) -> Goal {
        Goal::Near {
            pos: self.pos,
            range: 3,
        }
    }
}
