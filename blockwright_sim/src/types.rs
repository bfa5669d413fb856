// Core grid types shared across the planner.
//
// Defines block positions (`BlockPos`), the six face directions
// (`Direction`) with their axes, and `SideSet`, a compact set of faces used
// wherever the planner restricts which sides of a block may be clicked. All
// types derive `Serialize`/`Deserialize` so results and configs can be
// dumped to JSON for debugging.
//
// See also: `geometry.rs` for the continuous-space types (`Vec3`, `Aabb`,
// `Shape`) that sit on top of this grid.
//
// **Critical constraint: determinism.** `Direction::ALL` fixes the order in
// which faces are visited. Anything that iterates faces (scans, fluid
// flood-fill, orientation search) relies on that order for reproducible
// output.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A cell in the world grid. Each component is in block units.
///
/// The coordinate system is right-handed:
/// - X: east  (positive) / west  (negative)
/// - Y: up    (positive) / down  (negative)
/// - Z: south (positive) / north (negative)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The neighbouring cell across `side`.
    pub fn offset(self, side: Direction) -> Self {
        let (dx, dy, dz) = side.offset();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn up(self) -> Self {
        self.offset(Direction::Up)
    }

    pub fn down(self) -> Self {
        self.offset(Direction::Down)
    }

    /// Manhattan distance between two positions.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        ((self.x - other.x).unsigned_abs())
            + ((self.y - other.y).unsigned_abs())
            + ((self.z - other.z).unsigned_abs())
    }

    /// The chunk column (16 x 16 in XZ) containing this position.
    pub fn chunk(self) -> (i32, i32) {
        (self.x.div_euclid(16), self.z.div_euclid(16))
    }

    /// Coordinate along `axis`.
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn positive(self) -> Direction {
        match self {
            Axis::X => Direction::East,
            Axis::Y => Direction::Up,
            Axis::Z => Direction::South,
        }
    }

    pub fn negative(self) -> Direction {
        match self {
            Axis::X => Direction::West,
            Axis::Y => Direction::Down,
            Axis::Z => Direction::North,
        }
    }
}

/// One of the six faces of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    pub const HORIZONTAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Unit offset of the neighbour across this face.
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    pub const fn axis(self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Y,
            Direction::North | Direction::South => Axis::Z,
            Direction::West | Direction::East => Axis::X,
        }
    }

    pub fn is_horizontal(self) -> bool {
        self.axis() != Axis::Y
    }

    /// Yaw (degrees) of an agent looking in this horizontal direction.
    /// Vertical directions map to 0.
    pub fn yaw(self) -> f64 {
        match self {
            Direction::North => -180.0,
            Direction::South => 0.0,
            Direction::East => -90.0,
            Direction::West => 90.0,
            Direction::Down | Direction::Up => 0.0,
        }
    }

    /// Horizontal direction an agent with the given yaw is facing.
    pub fn from_yaw(yaw: f64) -> Self {
        let quadrant = ((yaw / 90.0) + 0.5).floor() as i64;
        match quadrant.rem_euclid(4) {
            0 => Direction::South,
            1 => Direction::West,
            2 => Direction::North,
            _ => Direction::East,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Side sets
// ---------------------------------------------------------------------------

/// A set of faces, stored as a 6-bit mask. Iterates in `Direction::ALL` order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideSet(u8);

impl SideSet {
    pub const EMPTY: SideSet = SideSet(0);
    pub const ALL: SideSet = SideSet(0b11_1111);

    pub fn only(side: Direction) -> Self {
        SideSet(side.bit())
    }

    pub fn contains(self, side: Direction) -> bool {
        self.0 & side.bit() != 0
    }

    pub fn insert(&mut self, side: Direction) {
        self.0 |= side.bit();
    }

    pub fn remove(&mut self, side: Direction) {
        self.0 &= !side.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn intersection(self, other: SideSet) -> SideSet {
        SideSet(self.0 & other.0)
    }

    pub fn difference(self, other: SideSet) -> SideSet {
        SideSet(self.0 & !other.0)
    }

    /// Keep only the sides for which `keep` returns true.
    pub fn retain(&mut self, keep: impl Fn(Direction) -> bool) {
        for side in Direction::ALL {
            if !keep(side) {
                self.remove(side);
            }
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for SideSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = SideSet::EMPTY;
        for side in iter {
            set.insert(side);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_opposite_cancel() {
        let origin = BlockPos::new(3, -2, 7);
        for side in Direction::ALL {
            assert_eq!(origin.offset(side).offset(side.opposite()), origin);
        }
    }

    #[test]
    fn axis_directions_agree() {
        for axis in Axis::ALL {
            assert_eq!(axis.positive().axis(), axis);
            assert_eq!(axis.negative().axis(), axis);
            assert_eq!(axis.positive().opposite(), axis.negative());
        }
    }

    #[test]
    fn yaw_round_trips_for_horizontals() {
        for side in Direction::HORIZONTAL {
            assert_eq!(Direction::from_yaw(side.yaw()), side);
        }
        // Slightly off-axis yaws still snap to the nearest quadrant.
        assert_eq!(Direction::from_yaw(-170.0), Direction::North);
        assert_eq!(Direction::from_yaw(200.0), Direction::North);
        assert_eq!(Direction::from_yaw(-80.0), Direction::East);
    }

    #[test]
    fn chunk_uses_floor_division() {
        assert_eq!(BlockPos::new(0, 0, 0).chunk(), (0, 0));
        assert_eq!(BlockPos::new(15, 0, 16).chunk(), (0, 1));
        assert_eq!(BlockPos::new(-1, 0, -17).chunk(), (-1, -2));
    }

    #[test]
    fn side_set_operations() {
        let mut set: SideSet = [Direction::Up, Direction::North].into_iter().collect();
        assert!(set.contains(Direction::Up));
        assert!(!set.contains(Direction::Down));
        assert_eq!(set.len(), 2);

        set.retain(|d| d.is_horizontal());
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Direction::North]);

        let rest = SideSet::ALL.difference(set);
        assert_eq!(rest.len(), 5);
        assert!(rest.intersection(set).is_empty());
    }

    #[test]
    fn side_set_iterates_in_canonical_order() {
        let order: Vec<_> = SideSet::ALL.iter().collect();
        assert_eq!(order, Direction::ALL.to_vec());
    }

    #[test]
    fn manhattan_distance() {
        let a = BlockPos::new(0, 0, 0);
        let b = BlockPos::new(3, -4, 5);
        assert_eq!(a.manhattan_distance(b), 12);
        assert_eq!(b.manhattan_distance(a), 12);
    }
}
