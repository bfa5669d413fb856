// Candidate interaction points on block shapes.
//
// Two samplers generate points on the faces of one box of a block's
// outline, as seen from an eye position:
// - `scan_closest_points` takes, per face, the point of that face closest to
//   the eye (the eye clamped onto the face rectangle). Used when strict
//   raycasting is off.
// - `scan_surfaces` lays a `(resolution + 1)^2` grid over each face. Used in
//   strict mode, where every grid point is then raycast by the caller.
//
// Both inset the box by the configured shrink factor first so no point sits
// on an edge, then push the sampled face back out by the same amount so the
// point lies on the real surface. A `ScanRestriction` limits sampling to one
// half of the target cell along an axis (stairs and slab halves, door
// hinges); the face on the cut side is dropped unless the caller is allowed
// to click from inside the box.
//
// `PointSelection` picks one `CheckedHit` out of the accepted candidates.
//
// See also: `sim/mod.rs` (`SimContext::scan_shape`) which raycasts the
// candidates and turns empty scans into `OutOfReach`/`NotVisible`,
// `processing/` which produces the `SurfaceScan` for a target state.
//
// **Critical constraint: determinism.** Points are generated in
// `Direction::ALL` face order and row-major grid order, and selection breaks
// ties by taking the first candidate.

use crate::config::{BuildConfig, PointSelection};
use crate::geometry::{Aabb, Vec3};
use crate::rotation::Rotation;
use crate::types::{Axis, BlockPos, Direction, SideSet};
use crate::world::BlockHit;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Surface scans
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanMode {
    Full,
    /// Only the upper half of the cell along the scan axis.
    GreaterBlockHalf,
    /// Only the lower half of the cell along the scan axis.
    LesserBlockHalf,
}

impl ScanMode {
    /// A scan offered with a higher priority replaces the current one.
    /// Half scans tie, so the first one offered sticks.
    pub fn priority(self) -> u8 {
        match self {
            ScanMode::Full => 0,
            ScanMode::GreaterBlockHalf | ScanMode::LesserBlockHalf => 1,
        }
    }
}

/// Which part of a cell may be clicked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceScan {
    pub mode: ScanMode,
    pub axis: Axis,
}

impl SurfaceScan {
    pub const DEFAULT: SurfaceScan = SurfaceScan {
        mode: ScanMode::Full,
        axis: Axis::Y,
    };

    pub const fn new(mode: ScanMode, axis: Axis) -> Self {
        Self { mode, axis }
    }
}

impl Default for SurfaceScan {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A surface scan anchored at the cell it was computed for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanRestriction {
    pub scan: SurfaceScan,
    pub origin: BlockPos,
}

// ---------------------------------------------------------------------------
// Checked hits and selection
// ---------------------------------------------------------------------------

/// A reachable, unobstructed interaction point and the rotation aiming at it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckedHit {
    pub hit: BlockHit,
    pub rotation: Rotation,
}

impl CheckedHit {
    pub fn point(&self) -> Vec3 {
        self.hit.point
    }
}

impl PointSelection {
    /// Pick one hit. `active` is the rotation the agent currently holds.
    pub fn select(self, hits: &[CheckedHit], active: Rotation) -> Option<CheckedHit> {
        match self {
            PointSelection::ByRotation => hits
                .iter()
                .min_by(|a, b| active.dist(a.rotation).total_cmp(&active.dist(b.rotation)))
                .copied(),
            PointSelection::Optimum => {
                if hits.is_empty() {
                    return None;
                }
                let sum = hits.iter().fold(Vec3::ZERO, |acc, h| acc + h.point());
                let mean = sum * (1.0 / hits.len() as f64);
                hits.iter()
                    .min_by(|a, b| {
                        a.point().distance_sq(mean).total_cmp(&b.point().distance_sq(mean))
                    })
                    .copied()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Sides worth scanning: `sides` narrowed to the faces the eye can see when
/// side visibility or strict raycasting is on.
fn visible_sides(sides: SideSet, b: &Aabb, eye: Vec3, config: &BuildConfig) -> SideSet {
    if config.check_side_visibility || config.strict_raycast {
        sides.intersection(b.visible_surfaces(eye))
    } else {
        sides
    }
}

/// Clip `[min, max]` to the scanned half along `axis`. Returns the new range
/// (or `None` when it is empty) and the face the cut exposed, if any.
fn to_scan_range(
    min: f64,
    max: f64,
    origin: i32,
    axis: Axis,
    scan: SurfaceScan,
) -> (Option<(f64, f64)>, Option<Direction>) {
    let (lo, hi) = if scan.axis == axis {
        match scan.mode {
            ScanMode::GreaterBlockHalf => ((origin as f64 + 0.501).max(min), max),
            _ => (min, (origin as f64 + 0.499).min(max)),
        }
    } else {
        (min, max)
    };
    let cut = match scan.mode {
        ScanMode::GreaterBlockHalf if lo > min => Some(axis.negative()),
        ScanMode::LesserBlockHalf if hi < max => Some(axis.positive()),
        _ => None,
    };
    let range = if lo <= hi { Some((lo, hi)) } else { None };
    (range, cut)
}

/// The inset box to sample, plus faces that must not be sampled. `None`
/// when the restriction leaves nothing of this box.
fn scan_box(
    b: &Aabb,
    restrict: Option<&ScanRestriction>,
    allow_inside: bool,
    shrink: f64,
) -> Option<(Aabb, SideSet)> {
    let inset = b.contract(shrink);
    let Some(restrict) = restrict.filter(|r| r.scan.mode != ScanMode::Full) else {
        return Some((inset, SideSet::EMPTY));
    };

    let mut bounds = [(0.0, 0.0); 3];
    let mut invalid = SideSet::EMPTY;
    for (slot, axis) in bounds.iter_mut().zip(Axis::ALL) {
        let (range, cut) = to_scan_range(
            inset.min_on(axis),
            inset.max_on(axis),
            restrict.origin.get(axis),
            axis,
            restrict.scan,
        );
        *slot = range?;
        if let (Some(side), false) = (cut, allow_inside) {
            invalid.insert(side);
        }
    }
    let [(x0, x1), (y0, y1), (z0, z1)] = bounds;
    Some((Aabb::new(x0, y0, z0, x1, y1, z1), invalid))
}

/// The sampled face on `side`: the inset box pushed back out by `shrink`.
fn sample_face(inset: &Aabb, side: Direction, shrink: f64) -> Aabb {
    inset
        .translate(Vec3::of_direction(side) * shrink)
        .face(side)
}

/// Per face, the point of the face closest to `pov`.
pub fn scan_closest_points(
    b: &Aabb,
    pov: Vec3,
    sides: SideSet,
    restrict: Option<&ScanRestriction>,
    allow_inside: bool,
    config: &BuildConfig,
) -> Vec<(Vec3, Direction)> {
    let visible = visible_sides(sides, b, pov, config);
    let Some((inset, invalid)) = scan_box(b, restrict, allow_inside, config.shrink_factor) else {
        return Vec::new();
    };
    visible
        .difference(invalid)
        .iter()
        .map(|side| {
            let face = sample_face(&inset, side, config.shrink_factor);
            let point = Vec3::new(
                pov.x.clamp(face.min.x, face.max.x),
                pov.y.clamp(face.min.y, face.max.y),
                pov.z.clamp(face.min.z, face.max.z),
            );
            (point, side)
        })
        .collect()
}

/// A `(resolution + 1)^2` grid of points on each face.
pub fn scan_surfaces(
    b: &Aabb,
    pov: Vec3,
    sides: SideSet,
    restrict: Option<&ScanRestriction>,
    allow_inside: bool,
    config: &BuildConfig,
) -> Vec<(Vec3, Direction)> {
    let visible = visible_sides(sides, b, pov, config);
    let Some((inset, invalid)) = scan_box(b, restrict, allow_inside, config.shrink_factor) else {
        return Vec::new();
    };
    let resolution = config.resolution.max(1);
    let steps = f64::from(resolution);
    let mut out = Vec::new();
    for side in visible.difference(invalid).iter() {
        let face = sample_face(&inset, side, config.shrink_factor);
        let step_x = face.length(Axis::X) / steps;
        let step_y = face.length(Axis::Y) / steps;
        let step_z = face.length(Axis::Z) / steps;
        for i in 0..=resolution {
            let x = face.min.x + step_x * f64::from(i);
            for j in 0..=resolution {
                let y = face.min.y + step_y * f64::from(j);
                // The face is flat on one axis; z takes whichever index the
                // other varying axis left free.
                let k = if step_x != 0.0 { j } else { i };
                let z = face.min.z + step_z * f64::from(k);
                out.push((Vec3::new(x, y, z), side));
            }
        }
    }
    out
}
