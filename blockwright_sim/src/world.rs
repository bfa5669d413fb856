// World access for the planner: the `WorldView` trait and a dense-grid
// implementation.
//
// `WorldView` is everything the planner reads from the world: block states,
// chunk loading, the world border and height limit, live entities, which
// items are enabled, and a block raycast. It is `Send + Sync` because a
// structure pass reads one view from many rayon workers at once. The
// planner never writes to it.
//
// `GridWorld` stores block states in a flat `Vec<BlockState>` indexed by
// `x + z * size_x + y * size_x * size_z`. Out-of-bounds reads return air;
// out-of-bounds writes are no-ops. Chunk loading, the border, entities and
// disabled items are layered on top so tests can build any situation the
// checks distinguish.
//
// The default `raycast` is a 3D DDA (Amanatides & Woo) voxel traversal.
// Unlike a solid/non-solid test it clips the segment against each visited
// cell's outline shape, so slabs, levers and open doors occlude only where
// their boxes are. Shapes never leave their own cell, so the first cell
// with a hit holds the nearest hit.
//
// See also: `visibility.rs` which raycasts candidate points, `state.rs`
// for outline shapes, `agent.rs` for the agent's own hitbox.
//
// **Critical constraint: determinism.** Entities are returned in insertion
// order and cells are visited in ray order; nothing here iterates a hash
// container.

use crate::geometry::{Aabb, Vec3};
use crate::item::Item;
use crate::state::BlockState;
use crate::types::{BlockPos, Direction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Entities and hits
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// A live entity that can block placements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub hitbox: Aabb,
}

impl Entity {
    /// A standing-size entity with its feet at `feet`.
    pub fn standing(id: EntityId, feet: Vec3, width: f64, height: f64) -> Self {
        let r = width / 2.0;
        Self {
            id,
            hitbox: Aabb::new(
                feet.x - r,
                feet.y,
                feet.z - r,
                feet.x + r,
                feet.y + height,
                feet.z + r,
            ),
        }
    }

    /// Feet position (bottom centre of the hitbox).
    pub fn pos(&self) -> Vec3 {
        let c = self.hitbox.center();
        Vec3::new(c.x, self.hitbox.min.y, c.z)
    }

    pub fn height(&self) -> f64 {
        self.hitbox.max.y - self.hitbox.min.y
    }

    /// Cells in `min_y..=max_y` whose column the hitbox overlaps in X and Z.
    pub fn positions_within_hitbox_xz(&self, min_y: i32, max_y: i32) -> Vec<BlockPos> {
        let hb = self.hitbox;
        let mut out = Vec::new();
        for y in min_y..=max_y {
            for x in hb.min.x.floor() as i32..=(hb.max.x - 1e-7).floor() as i32 {
                for z in hb.min.z.floor() as i32..=(hb.max.z - 1e-7).floor() as i32 {
                    out.push(BlockPos::new(x, y, z));
                }
            }
        }
        out
    }
}

/// A ray hit against a block outline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockHit {
    pub pos: BlockPos,
    pub side: Direction,
    pub point: Vec3,
}

// ---------------------------------------------------------------------------
// WorldView
// ---------------------------------------------------------------------------

pub trait WorldView: Send + Sync {
    fn block_state(&self, pos: BlockPos) -> BlockState;

    fn is_loaded(&self, pos: BlockPos) -> bool;

    fn border_contains(&self, pos: BlockPos) -> bool;

    fn is_out_of_height_limit(&self, pos: BlockPos) -> bool;

    fn entities(&self) -> &[Entity];

    fn is_item_enabled(&self, _item: Item) -> bool {
        true
    }

    /// Entities whose hitbox strictly overlaps `area`.
    fn entities_in(&self, area: &Aabb) -> Vec<&Entity> {
        self.entities()
            .iter()
            .filter(|e| e.hitbox.intersects(area))
            .collect()
    }

    /// First block outline hit along the segment `from -> to`.
    ///
    /// Uses the Amanatides & Woo voxel traversal algorithm. Stops early at
    /// the first cell whose outline the segment enters, or when the segment
    /// ends. A segment that starts inside an outline does not hit it.
    fn raycast(&self, from: Vec3, to: Vec3) -> Option<BlockHit> {
        let dir = to - from;
        let origin = [from.x, from.y, from.z];
        let delta = [dir.x, dir.y, dir.z];

        let mut cell = [
            from.x.floor() as i32,
            from.y.floor() as i32,
            from.z.floor() as i32,
        ];
        let end_cell = [to.x.floor() as i32, to.y.floor() as i32, to.z.floor() as i32];

        let mut step = [0i32; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];
        for axis in 0..3 {
            if delta[axis] > 0.0 {
                step[axis] = 1;
                t_delta[axis] = 1.0 / delta[axis];
                t_max[axis] = ((cell[axis] as f64 + 1.0) - origin[axis]) / delta[axis];
            } else if delta[axis] < 0.0 {
                step[axis] = -1;
                t_delta[axis] = 1.0 / -delta[axis];
                t_max[axis] = (origin[axis] - cell[axis] as f64) / -delta[axis];
            }
        }

        // Bounds the walk even if the float arithmetic misbehaves.
        let max_steps = (0..3)
            .map(|a| (end_cell[a] - cell[a]).unsigned_abs())
            .sum::<u32>()
            + 3;

        for _ in 0..=max_steps {
            let pos = BlockPos::new(cell[0], cell[1], cell[2]);
            if let Some(hit) = clip_cell(self.block_state(pos), pos, from, to) {
                return Some(hit);
            }
            if cell == end_cell {
                return None;
            }

            let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
                0
            } else if t_max[1] <= t_max[2] {
                1
            } else {
                2
            };
            if t_max[axis] > 1.0 {
                return None;
            }
            cell[axis] += step[axis];
            t_max[axis] += t_delta[axis];
        }
        None
    }
}

fn clip_cell(state: BlockState, pos: BlockPos, from: Vec3, to: Vec3) -> Option<BlockHit> {
    state
        .outline_shape()
        .at(pos)
        .filter_map(|b| b.clip(from, to))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(t, side)| BlockHit {
            pos,
            side,
            point: from + (to - from) * t,
        })
}

// ---------------------------------------------------------------------------
// GridWorld
// ---------------------------------------------------------------------------

/// Axis-aligned world border in X/Z, min inclusive, max exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBorder {
    pub min_x: i32,
    pub min_z: i32,
    pub max_x: i32,
    pub max_z: i32,
}

impl WorldBorder {
    pub fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min_x && pos.x < self.max_x && pos.z >= self.min_z && pos.z < self.max_z
    }
}

/// Dense 3D block grid.
#[derive(Clone, Debug, Default)]
pub struct GridWorld {
    /// Flat storage: index = x + z * size_x + y * size_x * size_z.
    blocks: Vec<BlockState>,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    /// Chunk columns `(cx, cz)` that are not loaded.
    unloaded_chunks: BTreeSet<(i32, i32)>,
    border: Option<WorldBorder>,
    /// Buildable Y range, min inclusive, max exclusive.
    height_limit: (i32, i32),
    entities: Vec<Entity>,
    disabled_items: Vec<Item>,
}

impl GridWorld {
    /// Create a new world filled with air. The height limit is the grid's
    /// Y extent and there is no border.
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        let total = (size_x as usize) * (size_y as usize) * (size_z as usize);
        Self {
            blocks: vec![BlockState::air(); total],
            size_x,
            size_y,
            size_z,
            unloaded_chunks: BTreeSet::new(),
            border: None,
            height_limit: (0, size_y as i32),
            entities: Vec::new(),
            disabled_items: Vec::new(),
        }
    }

    pub fn in_bounds(&self, pos: BlockPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && (pos.x as u32) < self.size_x
            && (pos.y as u32) < self.size_y
            && (pos.z as u32) < self.size_z
    }

    fn index(&self, pos: BlockPos) -> Option<usize> {
        if self.in_bounds(pos) {
            let sx = self.size_x as usize;
            let sz = self.size_z as usize;
            Some(pos.x as usize + pos.z as usize * sx + pos.y as usize * sx * sz)
        } else {
            None
        }
    }

    pub fn get(&self, pos: BlockPos) -> BlockState {
        self.index(pos)
            .and_then(|i| self.blocks.get(i))
            .cloned()
            .unwrap_or_else(BlockState::air)
    }

    pub fn set(&mut self, pos: BlockPos, state: BlockState) {
        if let Some(i) = self.index(pos) {
            self.blocks[i] = state;
        }
    }

    /// Fill the inclusive box `a..=b`.
    pub fn fill(&mut self, a: BlockPos, b: BlockPos, state: &BlockState) {
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            for z in a.z.min(b.z)..=a.z.max(b.z) {
                for x in a.x.min(b.x)..=a.x.max(b.x) {
                    self.set(BlockPos::new(x, y, z), state.clone());
                }
            }
        }
    }

    pub fn unload_chunk(&mut self, chunk: (i32, i32)) {
        self.unloaded_chunks.insert(chunk);
    }

    pub fn set_border(&mut self, border: WorldBorder) {
        self.border = Some(border);
    }

    pub fn set_height_limit(&mut self, min_y: i32, max_y: i32) {
        self.height_limit = (min_y, max_y);
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn disable_item(&mut self, item: Item) {
        self.disabled_items.push(item);
    }
}

impl WorldView for GridWorld {
    fn block_state(&self, pos: BlockPos) -> BlockState {
        self.get(pos)
    }

    fn is_loaded(&self, pos: BlockPos) -> bool {
        !self.unloaded_chunks.contains(&pos.chunk())
    }

    fn border_contains(&self, pos: BlockPos) -> bool {
        self.border.is_none_or(|b| b.contains(pos))
    }

    fn is_out_of_height_limit(&self, pos: BlockPos) -> bool {
        pos.y < self.height_limit.0 || pos.y >= self.height_limit.1
    }

    fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn is_item_enabled(&self, item: Item) -> bool {
        !self.disabled_items.contains(&item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::state::{Property, PropertyValue, SlabType};

    fn stone() -> BlockState {
        BlockState::of(BlockKind::Stone)
    }

    #[test]
    fn new_world_is_all_air() {
        let world = GridWorld::new(4, 4, 4);
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    assert!(world.get(BlockPos::new(x, y, z)).is_air());
                }
            }
        }
    }

    #[test]
    fn set_get_and_out_of_bounds() {
        let mut world = GridWorld::new(8, 8, 8);
        let pos = BlockPos::new(3, 5, 2);
        world.set(pos, stone());
        assert_eq!(world.get(pos), stone());
        assert!(world.get(BlockPos::new(3, 5, 3)).is_air());
        assert!(world.get(BlockPos::new(-1, 0, 0)).is_air());
        // Out-of-bounds writes are ignored.
        world.set(BlockPos::new(100, 0, 0), stone());
    }

    #[test]
    fn raycast_reports_entry_face() {
        let mut world = GridWorld::new(16, 16, 16);
        world.set(BlockPos::new(8, 4, 8), stone());
        let hit = world
            .raycast(Vec3::new(0.5, 4.5, 8.5), Vec3::new(15.5, 4.5, 8.5))
            .unwrap();
        assert_eq!(hit.pos, BlockPos::new(8, 4, 8));
        assert_eq!(hit.side, Direction::West);
        assert!((hit.point.x - 8.0).abs() < 1e-9);
    }

    #[test]
    fn raycast_hits_nearest_block() {
        let mut world = GridWorld::new(16, 16, 16);
        world.set(BlockPos::new(5, 4, 8), stone());
        world.set(BlockPos::new(9, 4, 8), stone());
        let hit = world
            .raycast(Vec3::new(0.5, 4.5, 8.5), Vec3::new(10.5, 4.5, 8.5))
            .unwrap();
        assert_eq!(hit.pos, BlockPos::new(5, 4, 8));
    }

    #[test]
    fn raycast_passes_over_bottom_slab() {
        let mut world = GridWorld::new(16, 16, 16);
        let slab = BlockState::of(BlockKind::OakSlab)
            .with(Property::SlabType, PropertyValue::Slab(SlabType::Bottom));
        world.set(BlockPos::new(5, 4, 8), slab);
        // Ray through the upper half of the slab's cell.
        assert!(world
            .raycast(Vec3::new(0.5, 4.75, 8.5), Vec3::new(10.5, 4.75, 8.5))
            .is_none());
        assert!(world
            .raycast(Vec3::new(0.5, 4.25, 8.5), Vec3::new(10.5, 4.25, 8.5))
            .is_some());
    }

    #[test]
    fn raycast_stops_at_segment_end() {
        let mut world = GridWorld::new(16, 16, 16);
        world.set(BlockPos::new(8, 4, 8), stone());
        assert!(world
            .raycast(Vec3::new(0.5, 4.5, 8.5), Vec3::new(7.5, 4.5, 8.5))
            .is_none());
    }

    #[test]
    fn chunks_border_and_height() {
        let mut world = GridWorld::new(32, 16, 32);
        world.unload_chunk((1, 0));
        assert!(world.is_loaded(BlockPos::new(3, 0, 3)));
        assert!(!world.is_loaded(BlockPos::new(17, 0, 3)));

        assert!(world.border_contains(BlockPos::new(1000, 0, 0)));
        world.set_border(WorldBorder {
            min_x: 0,
            min_z: 0,
            max_x: 10,
            max_z: 10,
        });
        assert!(!world.border_contains(BlockPos::new(10, 0, 0)));

        assert!(world.is_out_of_height_limit(BlockPos::new(0, 16, 0)));
        assert!(world.is_out_of_height_limit(BlockPos::new(0, -1, 0)));
    }

    #[test]
    fn entity_columns_cover_hitbox() {
        let e = Entity::standing(EntityId(7), Vec3::new(3.0, 1.0, 3.5), 0.6, 1.8);
        let cells = e.positions_within_hitbox_xz(1, 1);
        assert_eq!(cells, vec![BlockPos::new(2, 1, 3), BlockPos::new(3, 1, 3)]);
        assert_eq!(e.positions_within_hitbox_xz(0, 1).len(), 4);
        assert!((e.height() - 1.8).abs() < 1e-9);
    }

    #[test]
    fn disabled_items_are_reported() {
        let mut world = GridWorld::new(1, 1, 1);
        world.disable_item(Item::FlintAndSteel);
        assert!(!world.is_item_enabled(Item::FlintAndSteel));
        assert!(world.is_item_enabled(Item::Shears));
    }
}
