// Continuous-space geometry: points, axis-aligned boxes, and block shapes.
//
// `Vec3` is an f64 point/vector. `Aabb` is an axis-aligned box with the
// ray/segment intersection the visibility search needs. `Shape` is the
// outline of one block as a short list of boxes in block-local coordinates
// (a full cube, a slab half, a thin lever base), offset to world space on
// demand.
//
// See also: `types.rs` for the integer grid, `visibility.rs` which samples
// points on box faces, `world.rs` whose raycast tests rays against shapes.

use crate::types::{Axis, BlockPos, Direction, SideSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::ops::{Add, Mul, Sub};

// ---------------------------------------------------------------------------
// Vec3
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Minimum corner of a block cell.
    pub fn of_pos(pos: BlockPos) -> Self {
        Self::new(pos.x as f64, pos.y as f64, pos.z as f64)
    }

    /// Centre of a block cell.
    pub fn center_of(pos: BlockPos) -> Self {
        Self::new(pos.x as f64 + 0.5, pos.y as f64 + 0.5, pos.z as f64 + 0.5)
    }

    /// Centre of the bottom face of a block cell (where an agent stands).
    pub fn bottom_center_of(pos: BlockPos) -> Self {
        Self::new(pos.x as f64 + 0.5, pos.y as f64, pos.z as f64 + 0.5)
    }

    pub fn distance_sq(self, other: Vec3) -> f64 {
        let d = other - self;
        d.x * d.x + d.y * d.y + d.z * d.z
    }

    pub fn distance(self, other: Vec3) -> f64 {
        self.distance_sq(other).sqrt()
    }

    pub fn length(self) -> f64 {
        self.distance(Vec3::ZERO)
    }

    pub fn get(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// The block cell containing this point.
    pub fn block_pos(self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    /// Unit vector pointing out of `side`.
    pub fn of_direction(side: Direction) -> Self {
        let (x, y, z) = side.offset();
        Self::new(x as f64, y as f64, z as f64)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

// ---------------------------------------------------------------------------
// Aabb
// ---------------------------------------------------------------------------

/// Axis-aligned box. `min` is componentwise `<= max`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) -> Self {
        Self {
            min: Vec3::new(min_x.min(max_x), min_y.min(max_y), min_z.min(max_z)),
            max: Vec3::new(min_x.max(max_x), min_y.max(max_y), min_z.max(max_z)),
        }
    }

    pub fn unit() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0)
    }

    /// A cube of half-size `r` around `center`.
    pub fn around(center: Vec3, r: f64) -> Self {
        Self::new(
            center.x - r,
            center.y - r,
            center.z - r,
            center.x + r,
            center.y + r,
            center.z + r,
        )
    }

    pub fn translate(self, by: Vec3) -> Self {
        Self {
            min: self.min + by,
            max: self.max + by,
        }
    }

    /// Move a block-local box into world space at `pos`.
    pub fn at(self, pos: BlockPos) -> Self {
        self.translate(Vec3::of_pos(pos))
    }

    /// Shrink every face inward by `amount`.
    pub fn contract(self, amount: f64) -> Self {
        let shrink = |lo: f64, hi: f64| {
            if hi - lo <= 2.0 * amount {
                let mid = (lo + hi) * 0.5;
                (mid, mid)
            } else {
                (lo + amount, hi - amount)
            }
        };
        let (x0, x1) = shrink(self.min.x, self.max.x);
        let (y0, y1) = shrink(self.min.y, self.max.y);
        let (z0, z1) = shrink(self.min.z, self.max.z);
        Self::new(x0, y0, z0, x1, y1, z1)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn length(&self, axis: Axis) -> f64 {
        self.max.get(axis) - self.min.get(axis)
    }

    pub fn min_on(&self, axis: Axis) -> f64 {
        self.min.get(axis)
    }

    pub fn max_on(&self, axis: Axis) -> f64 {
        self.max.get(axis)
    }

    /// Half-open containment: `min <= p < max` on every axis.
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x < self.max.x
            && p.y >= self.min.y
            && p.y < self.max.y
            && p.z >= self.min.z
            && p.z < self.max.z
    }

    /// Strict overlap; boxes that only touch do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Degenerate box covering exactly the face on `side`.
    pub fn face(&self, side: Direction) -> Aabb {
        let (lo, hi) = (self.min, self.max);
        match side {
            Direction::Down => Aabb::new(lo.x, lo.y, lo.z, hi.x, lo.y, hi.z),
            Direction::Up => Aabb::new(lo.x, hi.y, lo.z, hi.x, hi.y, hi.z),
            Direction::North => Aabb::new(lo.x, lo.y, lo.z, hi.x, hi.y, lo.z),
            Direction::South => Aabb::new(lo.x, lo.y, hi.z, hi.x, hi.y, hi.z),
            Direction::West => Aabb::new(lo.x, lo.y, lo.z, lo.x, hi.y, hi.z),
            Direction::East => Aabb::new(hi.x, lo.y, lo.z, hi.x, hi.y, hi.z),
        }
    }

    /// Faces of this box that an eye at `eye` can see: those whose outward
    /// normal points toward the eye. An eye level with a box on some axis
    /// sees neither face on that axis.
    pub fn visible_surfaces(&self, eye: Vec3) -> SideSet {
        let mut sides = SideSet::EMPTY;
        let center = self.center();
        for axis in Axis::ALL {
            let diff = eye.get(axis) - center.get(axis);
            let limit = self.length(axis) / 2.0;
            if diff < -limit {
                sides.insert(axis.negative());
            } else if diff > limit {
                sides.insert(axis.positive());
            }
        }
        sides
    }

    /// Intersect the segment `from -> to` with this box (slab method).
    ///
    /// Returns the segment parameter `t` in [0, 1] of the entry point and
    /// the face entered. A segment starting inside the box does not hit it.
    pub fn clip(&self, from: Vec3, to: Vec3) -> Option<(f64, Direction)> {
        let dir = to - from;
        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        let mut entered: Option<Direction> = None;

        for axis in Axis::ALL {
            let o = from.get(axis);
            let d = dir.get(axis);
            let (lo, hi) = (self.min_on(axis), self.max_on(axis));
            if d.abs() < 1e-12 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (t0, t1, face) = if d > 0.0 {
                ((lo - o) / d, (hi - o) / d, axis.negative())
            } else {
                ((hi - o) / d, (lo - o) / d, axis.positive())
            };
            if t0 > t_enter {
                t_enter = t0;
                entered = Some(face);
            }
            t_exit = t_exit.min(t1);
        }

        let face = entered?;
        if t_enter > t_exit || !(0.0..=1.0).contains(&t_enter) {
            return None;
        }
        Some((t_enter, face))
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Outline of a block in block-local coordinates. Empty for air and fluids.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    boxes: SmallVec<[Aabb; 2]>,
}

impl Shape {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn full_cube() -> Self {
        Self::of(Aabb::unit())
    }

    pub fn of(b: Aabb) -> Self {
        let mut boxes = SmallVec::new();
        boxes.push(b);
        Self { boxes }
    }

    pub fn union(mut self, b: Aabb) -> Self {
        self.boxes.push(b);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// World-space boxes for this shape placed at `pos`.
    pub fn at(&self, pos: BlockPos) -> impl Iterator<Item = Aabb> + '_ {
        self.boxes.iter().map(move |b| b.at(pos))
    }

    /// True if the shape fills the whole cell.
    pub fn is_full_cube(&self) -> bool {
        self.boxes.len() == 1 && self.boxes[0] == Aabb::unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_shrinks_each_face() {
        let b = Aabb::unit().contract(0.1);
        assert!((b.min.x - 0.1).abs() < 1e-12);
        assert!((b.max.y - 0.9).abs() < 1e-12);
    }

    #[test]
    fn contract_collapses_thin_boxes_to_their_midplane() {
        let thin = Aabb::new(0.0, 0.0, 0.0, 1.0, 0.001, 1.0).contract(0.01);
        assert_eq!(thin.min.y, thin.max.y);
        assert!((thin.min.y - 0.0005).abs() < 1e-12);
    }

    #[test]
    fn visible_surfaces_from_above_corner() {
        let b = Aabb::unit();
        let sides = b.visible_surfaces(Vec3::new(2.0, 3.0, -1.0));
        assert!(sides.contains(Direction::Up));
        assert!(sides.contains(Direction::East));
        assert!(sides.contains(Direction::North));
        assert_eq!(sides.len(), 3);
    }

    #[test]
    fn eye_level_with_box_sees_no_vertical_face() {
        let b = Aabb::unit();
        let sides = b.visible_surfaces(Vec3::new(0.5, 0.5, 3.0));
        assert_eq!(sides.iter().collect::<Vec<_>>(), vec![Direction::South]);
    }

    #[test]
    fn clip_reports_entry_face() {
        let b = Aabb::unit();
        let hit = b.clip(Vec3::new(0.5, 3.0, 0.5), Vec3::new(0.5, -3.0, 0.5));
        let (t, face) = hit.unwrap();
        assert_eq!(face, Direction::Up);
        assert!((t - (2.0 / 6.0)).abs() < 1e-9);
    }

    #[test]
    fn clip_misses_when_segment_too_short() {
        let b = Aabb::unit();
        assert!(b.clip(Vec3::new(0.5, 3.0, 0.5), Vec3::new(0.5, 2.0, 0.5)).is_none());
    }

    #[test]
    fn clip_from_inside_is_not_a_hit() {
        let b = Aabb::unit();
        assert!(b.clip(Vec3::new(0.5, 0.5, 0.5), Vec3::new(0.5, 5.0, 0.5)).is_none());
    }

    #[test]
    fn containment_is_half_open() {
        let b = Aabb::unit();
        assert!(b.contains(Vec3::new(0.0, 0.0, 0.0)));
        assert!(!b.contains(Vec3::new(1.0, 0.5, 0.5)));
    }

    #[test]
    fn shape_offsets_to_world_space() {
        let shape = Shape::of(Aabb::new(0.0, 0.0, 0.0, 1.0, 0.5, 1.0));
        let world: Vec<_> = shape.at(BlockPos::new(2, 3, 4)).collect();
        assert_eq!(world[0], Aabb::new(2.0, 3.0, 4.0, 3.0, 3.5, 5.0));
        assert!(!shape.is_full_cube());
        assert!(Shape::full_cube().is_full_cube());
    }
}
