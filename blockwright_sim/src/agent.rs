// The acting agent: position, rotation, permissions, status effects, and
// inventory.
//
// The planner reads the agent as an immutable snapshot for the whole pass.
// Hypothetical agents (standing at a candidate viewpoint, sneaking to place
// against an interactive block) are produced by cloning and adjusting,
// never by mutating the live one.
//
// See also: `inventory.rs` for the stack selection contract, `world.rs`
// for the `WorldView` the agent's support block is looked up in,
// `rotation.rs` for `Rotation`.

use crate::geometry::{Aabb, Vec3};
use crate::inventory::Inventory;
use crate::rotation::Rotation;
use crate::types::BlockPos;
use crate::world::{EntityId, WorldView};
use serde::{Deserialize, Serialize};

pub const STANDING_EYE_HEIGHT: f64 = 1.62;
pub const SNEAKING_EYE_HEIGHT: f64 = 1.27;
pub const WIDTH: f64 = 0.6;
pub const STANDING_HEIGHT: f64 = 1.8;
pub const SNEAKING_HEIGHT: f64 = 1.5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: EntityId,
    /// Bottom centre of the hitbox.
    pub feet: Vec3,
    /// Rotation the client is rendering.
    pub rotation: Rotation,
    /// Rotation last reported to the server; placements read this one.
    pub server_rotation: Rotation,
    pub sneaking: bool,
    pub game_mode: GameMode,
    pub op_level: u8,
    /// False in adventure-style restrictions where placing needs a
    /// `can_place_on` whitelist.
    pub allow_modify_world: bool,
    pub on_ground: bool,
    /// Eyes under water (mining is slowed).
    pub submerged: bool,
    /// Haste amplifier, if the effect is active.
    pub haste: Option<u8>,
    /// Mining fatigue amplifier, if the effect is active.
    pub mining_fatigue: Option<u8>,
    pub inventory: Inventory,
}

impl Agent {
    pub fn new(feet: Vec3) -> Self {
        Self {
            id: EntityId(0),
            feet,
            rotation: Rotation::ZERO,
            server_rotation: Rotation::ZERO,
            sneaking: false,
            game_mode: GameMode::Survival,
            op_level: 0,
            allow_modify_world: true,
            on_ground: true,
            submerged: false,
            haste: None,
            mining_fatigue: None,
            inventory: Inventory::new(),
        }
    }

    /// An agent standing on top of `floor`.
    pub fn standing_on(floor: BlockPos) -> Self {
        Self::new(Vec3::bottom_center_of(floor.up()))
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self.server_rotation = rotation;
        self
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn eye_height(&self) -> f64 {
        if self.sneaking { SNEAKING_EYE_HEIGHT } else { STANDING_EYE_HEIGHT }
    }

    pub fn height(&self) -> f64 {
        if self.sneaking { SNEAKING_HEIGHT } else { STANDING_HEIGHT }
    }

    /// Point of view: where rays are cast from.
    pub fn eye_pos(&self) -> Vec3 {
        self.feet + Vec3::new(0.0, self.eye_height(), 0.0)
    }

    pub fn hitbox(&self) -> Aabb {
        let r = WIDTH / 2.0;
        Aabb::new(
            self.feet.x - r,
            self.feet.y,
            self.feet.z - r,
            self.feet.x + r,
            self.feet.y + self.height(),
            self.feet.z + r,
        )
    }

    pub fn is_creative(&self) -> bool {
        self.game_mode == GameMode::Creative
    }

    /// Creative mode with enough operator level to edit operator blocks.
    pub fn is_creative_op(&self) -> bool {
        self.is_creative() && self.op_level >= 2
    }

    /// Adventure and spectator agents cannot change blocks at all.
    pub fn is_block_breaking_restricted(&self) -> bool {
        matches!(self.game_mode, GameMode::Adventure | GameMode::Spectator)
    }

    /// A copy of this agent whose eye sits at `pov`, optionally sneaking.
    /// Rotations and inventory carry over.
    pub fn at_eye(&self, pov: Vec3, sneaking: bool) -> Agent {
        let mut copy = self.clone();
        copy.feet = pov - Vec3::new(0.0, self.eye_height(), 0.0);
        copy.sneaking = sneaking;
        copy
    }

    /// The block the agent is standing on: among the blocks whose collision
    /// shape touches the bottom of the hitbox, the one closest to the feet.
    pub fn supporting_block(&self, world: &dyn WorldView) -> Option<BlockPos> {
        if !self.on_ground {
            return None;
        }
        let hb = self.hitbox();
        let below = Aabb::new(hb.min.x, hb.min.y - 1e-6, hb.min.z, hb.max.x, hb.min.y, hb.max.z);
        let mut best: Option<(f64, BlockPos)> = None;
        for x in below.min.x.floor() as i32..=below.max.x.floor() as i32 {
            for z in below.min.z.floor() as i32..=below.max.z.floor() as i32 {
                let pos = BlockPos::new(x, below.min.y.floor() as i32, z);
                let collides = world
                    .block_state(pos)
                    .collision_shape()
                    .at(pos)
                    .any(|b| b.intersects(&below));
                if !collides {
                    continue;
                }
                let d = Vec3::center_of(pos).distance_sq(self.feet);
                if best.is_none_or(|(bd, bp)| d < bd || (d == bd && pos < bp)) {
                    best = Some((d, pos));
                }
            }
        }
        best.map(|(_, pos)| pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::world::GridWorld;

    #[test]
    fn eye_height_follows_sneaking() {
        let mut a = Agent::standing_on(BlockPos::new(2, 3, 2));
        assert!((a.eye_pos().y - (4.0 + STANDING_EYE_HEIGHT)).abs() < 1e-9);
        a.sneaking = true;
        assert!((a.eye_pos().y - (4.0 + SNEAKING_EYE_HEIGHT)).abs() < 1e-9);
    }

    #[test]
    fn at_eye_places_eye_exactly() {
        let a = Agent::standing_on(BlockPos::new(0, 0, 0));
        let pov = Vec3::new(3.5, 7.62, 1.5);
        let moved = a.at_eye(pov, false);
        assert!(moved.eye_pos().distance(pov) < 1e-9);
        assert!(moved.at_eye(pov, true).sneaking);
    }

    #[test]
    fn supporting_block_is_block_below() {
        let mut world = GridWorld::new(8, 8, 8);
        world.set(BlockPos::new(3, 2, 3), BlockKind::Stone.into());
        let a = Agent::standing_on(BlockPos::new(3, 2, 3));
        assert_eq!(a.supporting_block(&world), Some(BlockPos::new(3, 2, 3)));
    }

    #[test]
    fn no_support_in_the_air() {
        let world = GridWorld::new(8, 8, 8);
        let a = Agent::standing_on(BlockPos::new(3, 2, 3));
        assert_eq!(a.supporting_block(&world), None);
    }

    #[test]
    fn creative_op_needs_level_two() {
        let mut a = Agent::new(Vec3::ZERO);
        a.game_mode = GameMode::Creative;
        assert!(!a.is_creative_op());
        a.op_level = 2;
        assert!(a.is_creative_op());
    }
}
