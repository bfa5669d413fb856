// Placement model: what happens when a block item is used on a block face.
//
// `PlacementContext::resolve` turns a click (item, hit face, agent
// rotation) into the cell the block would land in. Clicking a replaceable
// block (grass, water, a slab that can double up) places into the clicked
// cell; anything else places into the neighbour across the clicked face.
// Scaffolding clicked onto scaffolding climbs instead: up when a side is
// clicked, along the agent's facing when the top is clicked, for at most 7
// horizontal steps. Running out of steps means there is no context at all,
// which the interact simulator reports as `ScaffoldExceeded`.
//
// `placement_state` then applies the block's `PlacementRule` to produce the
// raw state (axis from the clicked face, facing from the agent, slab and
// stair halves from the hit height, door hinge from the hit offset, ...).
// `checked_placement_state` additionally requires the block's support and
// that the new collision shape overlaps no entity, matching what the world
// would accept.
//
// See also: `block.rs` for `PlacementRule`/`SupportRule`,
// `sim/interact_sim.rs` which runs the orientation search over these
// functions, `rotation.rs` for `Rotation::horizontal_facing`.

use crate::agent::Agent;
use crate::block::{BlockKind, PlacementRule, SupportRule};
use crate::item::Item;
use crate::rotation::Rotation;
use crate::state::{
    Attachment, BlockFace, BlockHalf, BlockState, DoorHinge, Property, PropertyValue, SlabType,
};
use crate::types::{BlockPos, Direction};
use crate::world::{BlockHit, WorldView};

/// Horizontal steps scaffolding may extend from the clicked scaffolding.
const SCAFFOLDING_REACH: usize = 7;

#[derive(Clone, Debug, PartialEq)]
pub struct PlacementContext {
    pub item: Item,
    pub hit: BlockHit,
    /// Rotation of the placing agent; facing-based rules read it.
    pub rotation: Rotation,
    pub sneaking: bool,
    /// The cell the block lands in.
    pub pos: BlockPos,
    /// The clicked block itself is being replaced.
    pub replace_click: bool,
}

impl PlacementContext {
    /// Resolve where a click lands. `None` when scaffolding cannot extend.
    pub fn resolve(
        world: &dyn WorldView,
        item: Item,
        hit: BlockHit,
        rotation: Rotation,
        sneaking: bool,
    ) -> Option<Self> {
        let clicked = world.block_state(hit.pos);
        let replace_click = can_replace(&clicked, item, hit, hit.pos, true);
        let pos = if replace_click { hit.pos } else { hit.pos.offset(hit.side) };
        let ctx = Self {
            item,
            hit,
            rotation,
            sneaking,
            pos,
            replace_click,
        };

        if item.block() != Some(BlockKind::Scaffolding)
            || world.block_state(pos).kind() != BlockKind::Scaffolding
        {
            return Some(ctx);
        }
        ctx.extend_scaffolding(world)
    }

    fn extend_scaffolding(self, world: &dyn WorldView) -> Option<Self> {
        let direction = if self.sneaking {
            if self.replace_click { self.hit.side.opposite() } else { self.hit.side }
        } else if self.hit.side == Direction::Up {
            self.rotation.horizontal_facing()
        } else {
            Direction::Up
        };

        let mut cursor = self.pos.offset(direction);
        let mut horizontal_steps = 0;
        while horizontal_steps < SCAFFOLDING_REACH {
            if world.is_out_of_height_limit(cursor) {
                return None;
            }
            let state = world.block_state(cursor);
            if state.kind() != BlockKind::Scaffolding {
                if state.is_replaceable() {
                    return Some(Self {
                        pos: cursor,
                        replace_click: true,
                        ..self
                    });
                }
                return None;
            }
            cursor = cursor.offset(direction);
            if direction.is_horizontal() {
                horizontal_steps += 1;
            }
        }
        None
    }

    pub fn side(&self) -> Direction {
        self.hit.side
    }

    /// Horizontal direction the placing agent faces.
    pub fn facing(&self) -> Direction {
        self.rotation.horizontal_facing()
    }

    fn hit_fraction_y(&self) -> f64 {
        self.hit.point.y - self.pos.y as f64
    }

    /// Whether the landing cell can take a new block.
    pub fn can_place(&self, world: &dyn WorldView) -> bool {
        self.replace_click || can_replace(&world.block_state(self.pos), self.item, self.hit, self.pos, false)
    }

    /// The state the item would produce, before support and entity checks.
    /// `None` when the rule refuses this click outright.
    pub fn placement_state(&self, world: &dyn WorldView) -> Option<BlockState> {
        let kind = self.item.block()?;
        let existing = world.block_state(self.pos);
        let side = self.side();
        let top_half = side == Direction::Down
            || (side != Direction::Up && self.hit_fraction_y() > 0.5);

        let state = match kind.placement_rule() {
            PlacementRule::NotPlaceable => return None,
            PlacementRule::Simple | PlacementRule::Scaffolding => BlockState::of(kind),
            PlacementRule::Pillar => BlockState::of(kind)
                .with(Property::Axis, PropertyValue::Axis(side.axis())),
            PlacementRule::FacingAgent => BlockState::of(kind).with(
                Property::HorizontalFacing,
                PropertyValue::Direction(self.facing().opposite()),
            ),
            PlacementRule::Stairs => BlockState::of(kind)
                .with(Property::HorizontalFacing, PropertyValue::Direction(self.facing()))
                .with(
                    Property::Half,
                    PropertyValue::Half(if top_half { BlockHalf::Top } else { BlockHalf::Bottom }),
                ),
            PlacementRule::Slab => {
                if existing.kind() == kind {
                    return Some(
                        BlockState::of(kind)
                            .with(Property::SlabType, PropertyValue::Slab(SlabType::Double)),
                    );
                }
                BlockState::of(kind).with(
                    Property::SlabType,
                    PropertyValue::Slab(if top_half { SlabType::Top } else { SlabType::Bottom }),
                )
            }
            PlacementRule::Door => {
                if !world.block_state(self.pos.up()).is_replaceable()
                    || world.is_out_of_height_limit(self.pos.up())
                {
                    return None;
                }
                let facing = self.facing();
                BlockState::of(kind)
                    .with(Property::HorizontalFacing, PropertyValue::Direction(facing))
                    .with(Property::Hinge, PropertyValue::Hinge(self.door_hinge(facing)))
            }
            PlacementRule::WallMounted => {
                let (face, facing) = match side {
                    Direction::Up => (BlockFace::Floor, self.facing()),
                    Direction::Down => (BlockFace::Ceiling, self.facing()),
                    horizontal => (BlockFace::Wall, horizontal),
                };
                BlockState::of(kind)
                    .with(Property::Face, PropertyValue::Face(face))
                    .with(Property::HorizontalFacing, PropertyValue::Direction(facing))
            }
            PlacementRule::Bell => {
                let (attachment, facing) = match side {
                    Direction::Up => (Attachment::Floor, self.facing()),
                    Direction::Down => (Attachment::Ceiling, self.facing()),
                    horizontal => (Attachment::SingleWall, horizontal),
                };
                BlockState::of(kind)
                    .with(Property::Attachment, PropertyValue::Attachment(attachment))
                    .with(Property::HorizontalFacing, PropertyValue::Direction(facing))
            }
            PlacementRule::Hopper => {
                let facing = match side.opposite() {
                    Direction::Up | Direction::Down => Direction::Down,
                    horizontal => horizontal,
                };
                BlockState::of(kind).with(Property::HopperFacing, PropertyValue::Direction(facing))
            }
            PlacementRule::StandingSign => {
                if side != Direction::Up {
                    return None;
                }
                BlockState::of(kind).with(
                    Property::Rotation,
                    PropertyValue::Int(sign_rotation(self.rotation.yaw)),
                )
            }
            PlacementRule::Bamboo => {
                if existing.has_fluid() {
                    return None;
                }
                match world.block_state(self.pos.down()).kind() {
                    BlockKind::Bamboo | BlockKind::BambooSapling => BlockState::of(BlockKind::Bamboo),
                    BlockKind::Dirt | BlockKind::GrassBlock | BlockKind::Sand | BlockKind::Gravel => {
                        BlockState::of(BlockKind::BambooSapling)
                    }
                    _ => return None,
                }
            }
        };

        let waterlog = existing.fluid_state().still
            && existing.kind() == BlockKind::Water
            && state.has(Property::Waterlogged);
        Some(if waterlog {
            state.with(Property::Waterlogged, PropertyValue::Bool(true))
        } else {
            state
        })
    }

    /// The raw state, provided the block would stay put and no entity
    /// (including `agent`) is in the way.
    pub fn checked_placement_state(&self, world: &dyn WorldView, agent: &Agent) -> Option<BlockState> {
        if world.is_out_of_height_limit(self.pos) {
            return None;
        }
        let state = self.placement_state(world)?;
        if !is_supported(&state, self.pos, world) {
            return None;
        }
        let blocked = state.collision_shape().at(self.pos).any(|b| {
            agent.hitbox().intersects(&b) || !world.entities_in(&b).is_empty()
        });
        if blocked { None } else { Some(state) }
    }

    fn door_hinge(&self, facing: Direction) -> DoorHinge {
        let d = self.hit.point.x - self.pos.x as f64;
        let e = self.hit.point.z - self.pos.z as f64;
        let right = match facing {
            Direction::North => d > 0.5,
            Direction::South => d < 0.5,
            Direction::East => e > 0.5,
            Direction::West => e < 0.5,
            Direction::Up | Direction::Down => false,
        };
        if right { DoorHinge::Right } else { DoorHinge::Left }
    }
}

/// 16-step sign rotation for an agent with the given yaw.
pub fn sign_rotation(yaw: f64) -> u8 {
    (((180.0 + yaw) * 16.0 / 360.0 + 0.5).floor() as i64 & 15) as u8
}

/// Yaw an agent needs for a sign to get `rotation`.
pub fn sign_rotation_to_yaw(rotation: u8) -> f64 {
    f64::from(rotation & 15) * 22.5 - 180.0
}

/// Whether `state` at `pos` may be replaced by a click with `item`.
/// `replace_click` is true when `state` is the clicked block itself.
fn can_replace(state: &BlockState, item: Item, hit: BlockHit, pos: BlockPos, replace_click: bool) -> bool {
    let placed = item.block();
    if state.kind().is_slab() && placed == Some(state.kind()) {
        let Some(slab) = state.slab_type() else {
            return false;
        };
        if slab == SlabType::Double {
            return false;
        }
        if !replace_click {
            return true;
        }
        let upper = hit.point.y - pos.y as f64 > 0.5;
        return match slab {
            SlabType::Bottom => hit.side == Direction::Up || (upper && hit.side.is_horizontal()),
            _ => hit.side == Direction::Down || (!upper && hit.side.is_horizontal()),
        };
    }
    if state.kind() == BlockKind::Scaffolding {
        return placed == Some(BlockKind::Scaffolding);
    }
    state.is_replaceable() && placed != Some(state.kind())
}

fn is_supported(state: &BlockState, pos: BlockPos, world: &dyn WorldView) -> bool {
    match state.kind().support_rule() {
        SupportRule::None => true,
        SupportRule::SolidBelow => world.block_state(pos.down()).is_solid_block(),
        SupportRule::BambooSoil => matches!(
            world.block_state(pos.down()).kind(),
            BlockKind::Bamboo
                | BlockKind::BambooSapling
                | BlockKind::Dirt
                | BlockKind::GrassBlock
                | BlockKind::Sand
                | BlockKind::Gravel
        ),
        SupportRule::Attached => {
            let toward = match (state.face(), state.attachment()) {
                (Some(BlockFace::Floor), _) | (_, Some(Attachment::Floor)) => Direction::Down,
                (Some(BlockFace::Ceiling), _) | (_, Some(Attachment::Ceiling)) => Direction::Up,
                _ => match state.facing() {
                    Some(facing) => facing.opposite(),
                    None => return false,
                },
            };
            world.block_state(pos.offset(toward)).is_solid_block()
        }
    }
}
