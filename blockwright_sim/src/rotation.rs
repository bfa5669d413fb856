// Agent rotations and the rotation requests the planner emits.
//
// `Rotation` is yaw/pitch in degrees using the voxel world's convention:
// yaw 0 looks south (+Z), yaw 90 west, yaw -90 east, yaw ±180 north;
// positive pitch looks down. `rotation_to` aims from one point at another
// and `vector` converts back to a unit look direction, so a rotation
// computed for a hit point can be re-cast to verify what it actually hits.
//
// `PlaceDirection` is the 12-way coarse orientation used when the exact
// aimed rotation does not give the placement the target wants: each entry is
// a canonical rotation, and `from_rotation` classifies any rotation into the
// entry a placement would read it as (the same ordering the world uses to
// pick a placed block's facing).
//
// The planner never turns the agent. It returns `RotationRequest`s inside
// action contexts for an external rotation subsystem to carry out.
//
// See also: `visibility.rs` which produces rotations for hit points,
// `sim/interact_sim.rs` for the orientation search over `PlaceDirection`.

use crate::geometry::Vec3;
use crate::types::{BlockPos, Direction};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wrap an angle in degrees into [-180, 180).
pub fn wrap_degrees(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d >= 180.0 {
        d -= 360.0;
    }
    if d < -180.0 {
        d += 360.0;
    }
    d
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f64,
    pub pitch: f64,
}

impl Rotation {
    pub const ZERO: Rotation = Rotation::new(0.0, 0.0);
    pub const DOWN: Rotation = Rotation::new(0.0, 90.0);
    pub const UP: Rotation = Rotation::new(0.0, -90.0);

    pub const fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }

    /// Rotation looking horizontally toward `side`.
    pub fn of_direction(side: Direction) -> Self {
        Self::new(side.yaw(), 0.0)
    }

    /// Rotation that aims from `from` at `to`.
    pub fn rotation_to(from: Vec3, to: Vec3) -> Self {
        let d = to - from;
        let yaw = d.z.atan2(d.x).to_degrees() - 90.0;
        let pitch = (-d.y.atan2(d.x.hypot(d.z))).to_degrees().clamp(-90.0, 90.0);
        Self::new(yaw, pitch)
    }

    /// Angular distance, with yaw and pitch differences wrapped.
    pub fn dist(self, other: Rotation) -> f64 {
        wrap_degrees(self.yaw - other.yaw).hypot(wrap_degrees(self.pitch - other.pitch))
    }

    /// Unit look vector.
    pub fn vector(self) -> Vec3 {
        let yaw = (-self.yaw).to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(yaw.sin() * pitch.cos(), -pitch.sin(), yaw.cos() * pitch.cos())
    }

    /// Horizontal facing of an agent with this rotation.
    pub fn horizontal_facing(self) -> Direction {
        Direction::from_yaw(self.yaw)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.yaw, self.pitch)
    }
}

// ---------------------------------------------------------------------------
// PlaceDirection
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceDirection {
    UpNorth,
    UpSouth,
    UpWest,
    UpEast,
    DownNorth,
    DownSouth,
    DownWest,
    DownEast,
    North,
    South,
    West,
    East,
}

impl PlaceDirection {
    pub const ALL: [PlaceDirection; 12] = [
        PlaceDirection::UpNorth,
        PlaceDirection::UpSouth,
        PlaceDirection::UpWest,
        PlaceDirection::UpEast,
        PlaceDirection::DownNorth,
        PlaceDirection::DownSouth,
        PlaceDirection::DownWest,
        PlaceDirection::DownEast,
        PlaceDirection::North,
        PlaceDirection::South,
        PlaceDirection::West,
        PlaceDirection::East,
    ];

    /// The canonical rotation for this orientation.
    pub fn rotation(self) -> Rotation {
        let (yaw, pitch) = match self {
            PlaceDirection::UpNorth => (-180.0, -90.0),
            PlaceDirection::UpSouth => (0.0, -90.0),
            PlaceDirection::UpWest => (90.0, -90.0),
            PlaceDirection::UpEast => (-90.0, -90.0),
            PlaceDirection::DownNorth => (-180.0, 90.0),
            PlaceDirection::DownSouth => (0.0, 90.0),
            PlaceDirection::DownWest => (90.0, 90.0),
            PlaceDirection::DownEast => (-90.0, 90.0),
            PlaceDirection::North => (-180.0, 0.0),
            PlaceDirection::South => (0.0, 0.0),
            PlaceDirection::West => (90.0, 0.0),
            PlaceDirection::East => (-90.0, 0.0),
        };
        Rotation::new(yaw, pitch)
    }

    /// Classify `rotation` by its dominant look axis, preferring the
    /// horizontal axis the agent faces more strongly and reporting up/down
    /// only when the pitch outweighs it.
    pub fn from_rotation(rotation: Rotation) -> Self {
        let pitch = (rotation.pitch as f32).to_radians();
        let yaw = (-rotation.yaw as f32).to_radians();
        let (sin_pitch, cos_pitch) = (pitch.sin(), pitch.cos());
        let (sin_yaw, cos_yaw) = (yaw.sin(), yaw.cos());

        let facing_east = sin_yaw > 0.0;
        let facing_up = sin_pitch < 0.0;
        let facing_south = cos_yaw > 0.0;

        let east_west = sin_yaw.abs();
        let up_down = sin_pitch.abs();
        let north_south = cos_yaw.abs();

        if east_west > north_south {
            if up_down > east_west * cos_pitch {
                match (facing_up, facing_east) {
                    (true, true) => PlaceDirection::UpEast,
                    (true, false) => PlaceDirection::UpWest,
                    (false, true) => PlaceDirection::DownEast,
                    (false, false) => PlaceDirection::DownWest,
                }
            } else if facing_east {
                PlaceDirection::East
            } else {
                PlaceDirection::West
            }
        } else if up_down > north_south * cos_pitch {
            match (facing_up, facing_south) {
                (true, true) => PlaceDirection::UpSouth,
                (true, false) => PlaceDirection::UpNorth,
                (false, true) => PlaceDirection::DownSouth,
                (false, false) => PlaceDirection::DownNorth,
            }
        } else if facing_south {
            PlaceDirection::South
        } else {
            PlaceDirection::North
        }
    }

    pub fn is_in_area(self, rotation: Rotation) -> bool {
        Self::from_rotation(rotation) == self
    }
}

// ---------------------------------------------------------------------------
// Rotation requests
// ---------------------------------------------------------------------------

/// What a request wants the agent to look at.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RotationTarget {
    Fixed(Rotation),
    /// Anything classified as this direction; keeps the current rotation
    /// if it already is.
    LookInDirection(PlaceDirection),
}

/// Which simulation asked for the rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestOwner {
    Break(BlockPos),
    Interact(BlockPos),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotationRequest {
    pub target: RotationTarget,
    pub owner: RequestOwner,
}

impl RotationRequest {
    pub fn fixed(rotation: Rotation, owner: RequestOwner) -> Self {
        Self {
            target: RotationTarget::Fixed(rotation),
            owner,
        }
    }

    pub fn look_in_direction(direction: PlaceDirection, owner: RequestOwner) -> Self {
        Self {
            target: RotationTarget::LookInDirection(direction),
            owner,
        }
    }

    /// The rotation the agent would end up at, given its `current` one.
    pub fn rotation(&self, current: Rotation) -> Rotation {
        match self.target {
            RotationTarget::Fixed(r) => r,
            RotationTarget::LookInDirection(dir) if dir.is_in_area(current) => current,
            RotationTarget::LookInDirection(dir) => dir.rotation(),
        }
    }

    /// Satisfied when the active rotation is within a thousandth of a degree.
    pub fn is_done(&self, active: Rotation) -> bool {
        active.dist(self.rotation(active)) <= 0.001
    }
}
