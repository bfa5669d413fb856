// Property processors: per-property narrowing of how a state is reached.
//
// Sides here are sides of the target cell. A side `s` admits a click on the
// target's own face `s` and a click on the neighbour at `s` through its
// face pointing back at the target, so a block resting on the floor is
// reached through `Down`.
//
// Half scans restrict clicks to one half of the target cell along an axis.
// Only the first half scan offered is kept (see
// `PreProcessingInfo::offer_surface_scan`), so processor order in the
// registry matters for blocks carrying several halving properties.

use super::{PreProcessingInfo, PropertyPostProcessor, PropertyPreProcessor, STANDARD_INTERACT_PROPERTIES};
use crate::item::Item;
use crate::state::{Attachment, BlockFace, BlockHalf, BlockState, DoorHinge, Property, SlabType};
use crate::types::{Axis, Direction};
use crate::visibility::{ScanMode, SurfaceScan};

fn lesser(axis: Axis) -> SurfaceScan {
    SurfaceScan::new(ScanMode::LesserBlockHalf, axis)
}

fn greater(axis: Axis) -> SurfaceScan {
    SurfaceScan::new(ScanMode::GreaterBlockHalf, axis)
}

/// Sides for something hanging off a wall it faces away from.
fn wall_sides(info: &mut PreProcessingInfo, expected: &BlockState) {
    match expected.facing() {
        Some(facing) => info.retain_only(facing.opposite()),
        None => info.retain_sides(Direction::is_horizontal),
    }
}

// ---------------------------------------------------------------------------
// Pre-processors
// ---------------------------------------------------------------------------

/// Bells: floor, ceiling or wall mounting.
pub struct AttachmentProcessor;

impl PropertyPreProcessor for AttachmentProcessor {
    fn accepts(&self, expected: &BlockState) -> bool {
        expected.has(Property::Attachment)
    }

    fn process(&self, info: &mut PreProcessingInfo, _state: &BlockState, expected: &BlockState) {
        match expected.attachment() {
            Some(Attachment::Floor) => info.retain_only(Direction::Down),
            Some(Attachment::Ceiling) => info.retain_only(Direction::Up),
            Some(Attachment::SingleWall) => wall_sides(info, expected),
            Some(Attachment::DoubleWall) | None => info.retain_sides(Direction::is_horizontal),
        }
    }
}

/// Levers and other face-mounted blocks.
pub struct BlockFaceProcessor;

impl PropertyPreProcessor for BlockFaceProcessor {
    fn accepts(&self, expected: &BlockState) -> bool {
        expected.has(Property::Face)
    }

    fn process(&self, info: &mut PreProcessingInfo, _state: &BlockState, expected: &BlockState) {
        match expected.face() {
            Some(BlockFace::Floor) => info.retain_only(Direction::Down),
            Some(BlockFace::Ceiling) => info.retain_only(Direction::Up),
            Some(BlockFace::Wall) | None => wall_sides(info, expected),
        }
    }
}

/// Stairs and other top/bottom blocks are set by which half is clicked.
pub struct BlockHalfProcessor;

impl PropertyPreProcessor for BlockHalfProcessor {
    fn accepts(&self, expected: &BlockState) -> bool {
        expected.has(Property::Half)
    }

    fn process(&self, info: &mut PreProcessingInfo, _state: &BlockState, expected: &BlockState) {
        match expected.half() {
            Some(BlockHalf::Bottom) => info.offer_surface_scan(lesser(Axis::Y)),
            Some(BlockHalf::Top) => info.offer_surface_scan(greater(Axis::Y)),
            None => {}
        }
    }
}

/// Door hinges follow which half of the cell, across the door, is clicked.
pub struct DoorHingeProcessor;

impl PropertyPreProcessor for DoorHingeProcessor {
    fn accepts(&self, expected: &BlockState) -> bool {
        expected.has(Property::Hinge) && expected.facing().is_some()
    }

    fn process(&self, info: &mut PreProcessingInfo, _state: &BlockState, expected: &BlockState) {
        let (Some(facing), Some(hinge)) = (expected.facing(), expected.hinge()) else {
            return;
        };
        let left = hinge == DoorHinge::Left;
        let scan = match facing {
            Direction::North => if left { lesser(Axis::X) } else { greater(Axis::X) },
            Direction::South => if left { greater(Axis::X) } else { lesser(Axis::X) },
            Direction::East => if left { lesser(Axis::Z) } else { greater(Axis::Z) },
            Direction::West => if left { greater(Axis::Z) } else { lesser(Axis::Z) },
            Direction::Up | Direction::Down => return,
        };
        info.offer_surface_scan(scan);
    }
}

/// Hoppers face away from the clicked face; vertical ones point down.
pub struct HopperFacingProcessor;

impl PropertyPreProcessor for HopperFacingProcessor {
    fn accepts(&self, expected: &BlockState) -> bool {
        expected.has(Property::HopperFacing)
    }

    fn process(&self, info: &mut PreProcessingInfo, _state: &BlockState, expected: &BlockState) {
        match expected.facing() {
            Some(Direction::Up | Direction::Down) | None => {
                info.retain_sides(|side| side.axis() == Axis::Y);
            }
            Some(facing) => info.retain_only(facing),
        }
    }
}

/// Slabs: which half is clicked decides the slab type, and a double slab is
/// two placements into the same cell.
pub struct SlabProcessor;

impl PropertyPreProcessor for SlabProcessor {
    fn accepts(&self, expected: &BlockState) -> bool {
        expected.has(Property::SlabType)
    }

    fn process(&self, info: &mut PreProcessingInfo, _state: &BlockState, expected: &BlockState) {
        match expected.slab_type() {
            Some(SlabType::Bottom) => info.offer_surface_scan(lesser(Axis::Y)),
            Some(SlabType::Top) => info.offer_surface_scan(greater(Axis::Y)),
            // First half of a double slab: either half will do.
            Some(SlabType::Double) => info.add_ignore(Property::SlabType),
            None => {}
        }
    }
}

impl PropertyPostProcessor for SlabProcessor {
    fn accepts(&self, state: &BlockState, expected: &BlockState) -> bool {
        state.kind() == expected.kind()
            && expected.slab_type() == Some(SlabType::Double)
            && matches!(state.slab_type(), Some(SlabType::Bottom | SlabType::Top))
    }

    fn process(&self, info: &mut PreProcessingInfo, state: &BlockState, _expected: &BlockState) {
        // Click into the half that is still missing.
        if state.slab_type() == Some(SlabType::Bottom) {
            info.offer_surface_scan(greater(Axis::Y));
        } else {
            info.offer_surface_scan(lesser(Axis::Y));
        }
    }
}

// ---------------------------------------------------------------------------
// Post-processors
// ---------------------------------------------------------------------------

/// Properties a right-click toggles (an open door) are fixed by using the
/// block in place, with any stack.
pub struct InteractToggleProcessor;

impl PropertyPostProcessor for InteractToggleProcessor {
    fn accepts(&self, state: &BlockState, expected: &BlockState) -> bool {
        STANDARD_INTERACT_PROPERTIES
            .iter()
            .any(|p| expected.has(*p) && state.get(*p) != expected.get(*p))
    }

    fn process(&self, info: &mut PreProcessingInfo, _state: &BlockState, _expected: &BlockState) {
        info.placing = false;
        info.item = Item::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::state::PropertyValue;
    use crate::types::SideSet;

    fn pre(p: &dyn PropertyPreProcessor, expected: BlockState) -> PreProcessingInfo {
        let mut info = PreProcessingInfo::new(expected.clone(), expected.kind().item());
        assert!(p.accepts(&expected));
        p.process(&mut info, &BlockState::air(), &expected);
        info
    }

    fn sides(info: &PreProcessingInfo) -> Vec<Direction> {
        info.sides.iter().collect()
    }

    #[test]
    fn floor_lever_only_from_below() {
        let lever = BlockState::of(BlockKind::Lever).with(Property::Face, PropertyValue::Face(BlockFace::Floor));
        assert_eq!(sides(&pre(&BlockFaceProcessor, lever)), vec![Direction::Down]);
    }

    #[test]
    fn wall_lever_hangs_off_the_wall_behind_it() {
        let lever = BlockState::of(BlockKind::Lever)
            .with(Property::Face, PropertyValue::Face(BlockFace::Wall))
            .with(Property::HorizontalFacing, PropertyValue::Direction(Direction::East));
        assert_eq!(sides(&pre(&BlockFaceProcessor, lever)), vec![Direction::West]);
    }

    #[test]
    fn ceiling_bell_from_above() {
        let bell = BlockState::of(BlockKind::Bell)
            .with(Property::Attachment, PropertyValue::Attachment(Attachment::Ceiling));
        assert_eq!(sides(&pre(&AttachmentProcessor, bell)), vec![Direction::Up]);
    }

    #[test]
    fn stair_halves_pick_scan() {
        let top = BlockState::of(BlockKind::OakStairs).with(Property::Half, PropertyValue::Half(BlockHalf::Top));
        assert_eq!(pre(&BlockHalfProcessor, top).surface_scan, greater(Axis::Y));
        let bottom = BlockState::of(BlockKind::OakStairs);
        assert_eq!(pre(&BlockHalfProcessor, bottom).surface_scan, lesser(Axis::Y));
    }

    #[test]
    fn door_hinge_follows_facing() {
        let door = |facing, hinge| {
            BlockState::of(BlockKind::OakDoor)
                .with(Property::HorizontalFacing, PropertyValue::Direction(facing))
                .with(Property::Hinge, PropertyValue::Hinge(hinge))
        };
        let scan = |facing, hinge| pre(&DoorHingeProcessor, door(facing, hinge)).surface_scan;
        assert_eq!(scan(Direction::North, DoorHinge::Left), lesser(Axis::X));
        assert_eq!(scan(Direction::North, DoorHinge::Right), greater(Axis::X));
        assert_eq!(scan(Direction::South, DoorHinge::Left), greater(Axis::X));
        assert_eq!(scan(Direction::East, DoorHinge::Right), greater(Axis::Z));
        assert_eq!(scan(Direction::West, DoorHinge::Left), greater(Axis::Z));
        assert_eq!(scan(Direction::West, DoorHinge::Right), lesser(Axis::Z));
    }

    #[test]
    fn hopper_sides() {
        let down = BlockState::of(BlockKind::Hopper);
        assert_eq!(sides(&pre(&HopperFacingProcessor, down)), vec![Direction::Down, Direction::Up]);
        let north = BlockState::of(BlockKind::Hopper)
            .with(Property::HopperFacing, PropertyValue::Direction(Direction::North));
        assert_eq!(pre(&HopperFacingProcessor, north).sides, SideSet::only(Direction::North));
    }

    #[test]
    fn double_slab_from_nothing_accepts_either_half() {
        let double = BlockState::of(BlockKind::OakSlab)
            .with(Property::SlabType, PropertyValue::Slab(SlabType::Double));
        let info = pre(&SlabProcessor, double);
        assert!(info.ignore.contains(&Property::SlabType));
        assert_eq!(info.surface_scan, SurfaceScan::DEFAULT);
        let half = BlockState::of(BlockKind::OakSlab);
        assert!(info.matches_target(&half, false));
    }

    #[test]
    fn double_slab_completes_the_missing_half() {
        let double = BlockState::of(BlockKind::OakSlab)
            .with(Property::SlabType, PropertyValue::Slab(SlabType::Double));
        let bottom = BlockState::of(BlockKind::OakSlab);
        assert!(PropertyPostProcessor::accepts(&SlabProcessor, &bottom, &double));
        let mut info = PreProcessingInfo::new(double.clone(), Item::Block(BlockKind::OakSlab));
        PropertyPostProcessor::process(&SlabProcessor, &mut info, &bottom, &double);
        assert_eq!(info.surface_scan, greater(Axis::Y));
        assert!(!PropertyPostProcessor::accepts(&SlabProcessor, &double, &double));
    }

    #[test]
    fn closed_door_is_opened_by_hand() {
        let closed = BlockState::of(BlockKind::OakDoor);
        let open = closed.clone().with(Property::Open, PropertyValue::Bool(true));
        assert!(InteractToggleProcessor.accepts(&closed, &open));
        assert!(!InteractToggleProcessor.accepts(&open, &open));
        let mut info = PreProcessingInfo::new(open.clone(), Item::Block(BlockKind::OakDoor));
        InteractToggleProcessor.process(&mut info, &closed, &open);
        assert!(!info.placing);
        assert_eq!(info.item, Item::Empty);
    }
}
