// Block states: a block kind plus its property values.
//
// `BlockState` is the opaque per-cell snapshot the planner compares
// against targets. Two states are compared with `matches(other, ignore)`,
// never by identity, because a target usually accepts a family of states
// (any waterlogging, any lit/unlit furnace, ...). The derived views live
// here too: outline and collision shapes, the fluid occupying the cell, and
// what the cell becomes once the block is broken (`empty_state`).
//
// Properties are stored as a short sorted list of `(Property, Value)` pairs
// in `Property` order, so two states with the same values are always
// byte-identical and hash the same. The preprocessor cache keys on that.
//
// See also: `block.rs` for per-kind metadata, `target.rs` for the target
// families built on `matches`, `processing/` for which properties are
// ignored when checking placements.

use crate::block::BlockKind;
use crate::geometry::{Aabb, Shape};
use crate::types::{Axis, Direction};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    HorizontalFacing,
    HopperFacing,
    Axis,
    Half,
    SlabType,
    Hinge,
    Face,
    Attachment,
    Rotation,
    Lit,
    Open,
    Powered,
    Waterlogged,
    Age,
    Level,
}

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Property::HorizontalFacing | Property::HopperFacing => "facing",
            Property::Axis => "axis",
            Property::Half => "half",
            Property::SlabType => "type",
            Property::Hinge => "hinge",
            Property::Face => "face",
            Property::Attachment => "attachment",
            Property::Rotation => "rotation",
            Property::Lit => "lit",
            Property::Open => "open",
            Property::Powered => "powered",
            Property::Waterlogged => "waterlogged",
            Property::Age => "age",
            Property::Level => "level",
        }
    }

    /// Value a freshly created state carries.
    fn default_value(self) -> PropertyValue {
        match self {
            Property::HorizontalFacing => PropertyValue::Direction(Direction::North),
            Property::HopperFacing => PropertyValue::Direction(Direction::Down),
            Property::Axis => PropertyValue::Axis(Axis::Y),
            Property::Half => PropertyValue::Half(BlockHalf::Bottom),
            Property::SlabType => PropertyValue::Slab(SlabType::Bottom),
            Property::Hinge => PropertyValue::Hinge(DoorHinge::Left),
            Property::Face => PropertyValue::Face(BlockFace::Wall),
            Property::Attachment => PropertyValue::Attachment(Attachment::Floor),
            Property::Rotation | Property::Age | Property::Level => PropertyValue::Int(0),
            Property::Lit | Property::Open | Property::Powered | Property::Waterlogged => {
                PropertyValue::Bool(false)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockHalf {
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlabType {
    Top,
    Bottom,
    Double,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorHinge {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockFace {
    Floor,
    Wall,
    Ceiling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attachment {
    Floor,
    Ceiling,
    SingleWall,
    DoubleWall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(u8),
    Direction(Direction),
    Axis(Axis),
    Half(BlockHalf),
    Slab(SlabType),
    Hinge(DoorHinge),
    Face(BlockFace),
    Attachment(Attachment),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyValue::Bool(b) => return write!(f, "{b}"),
            PropertyValue::Int(i) => return write!(f, "{i}"),
            PropertyValue::Direction(d) => return write!(f, "{d}"),
            PropertyValue::Axis(Axis::X) => "x",
            PropertyValue::Axis(Axis::Y) => "y",
            PropertyValue::Axis(Axis::Z) => "z",
            PropertyValue::Half(BlockHalf::Top) | PropertyValue::Slab(SlabType::Top) => "top",
            PropertyValue::Half(BlockHalf::Bottom) | PropertyValue::Slab(SlabType::Bottom) => {
                "bottom"
            }
            PropertyValue::Slab(SlabType::Double) => "double",
            PropertyValue::Hinge(DoorHinge::Left) => "left",
            PropertyValue::Hinge(DoorHinge::Right) => "right",
            PropertyValue::Face(BlockFace::Floor) | PropertyValue::Attachment(Attachment::Floor) => {
                "floor"
            }
            PropertyValue::Face(BlockFace::Wall) => "wall",
            PropertyValue::Face(BlockFace::Ceiling)
            | PropertyValue::Attachment(Attachment::Ceiling) => "ceiling",
            PropertyValue::Attachment(Attachment::SingleWall) => "single_wall",
            PropertyValue::Attachment(Attachment::DoubleWall) => "double_wall",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Fluids
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fluid {
    Empty,
    Water,
    Lava,
}

impl Fluid {
    /// Level lost per block of horizontal spread.
    pub fn level_decrease_per_block(self) -> u8 {
        match self {
            Fluid::Empty => 0,
            Fluid::Water => 1,
            Fluid::Lava => 2,
        }
    }

    pub fn is_flowable(self) -> bool {
        self != Fluid::Empty
    }
}

/// The fluid occupying a cell. `level` is 8 for sources and falling fluid,
/// 1..=7 for spreading fluid, 0 when empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FluidState {
    pub fluid: Fluid,
    pub level: u8,
    pub still: bool,
}

impl FluidState {
    pub const EMPTY: FluidState = FluidState {
        fluid: Fluid::Empty,
        level: 0,
        still: false,
    };

    pub fn source(fluid: Fluid) -> Self {
        Self {
            fluid,
            level: 8,
            still: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fluid == Fluid::Empty
    }

    /// Sort position used when ordering placements into fluids: lava
    /// sources first, then flowing lava, water sources, flowing water, and
    /// finally cells with no fluid.
    pub fn sort_index(&self) -> usize {
        match (self.fluid, self.still) {
            (Fluid::Lava, true) => 0,
            (Fluid::Lava, false) => 1,
            (Fluid::Water, true) => 2,
            (Fluid::Water, false) => 3,
            (Fluid::Empty, _) => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// BlockState
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    kind: BlockKind,
    props: SmallVec<[(Property, PropertyValue); 4]>,
}

impl BlockState {
    /// The default state of `kind`: every declared property at its default.
    pub fn of(kind: BlockKind) -> Self {
        let props = kind
            .properties()
            .iter()
            .map(|p| (*p, p.default_value()))
            .collect();
        Self { kind, props }
    }

    pub fn air() -> Self {
        Self::of(BlockKind::Air)
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn has(&self, property: Property) -> bool {
        self.props.iter().any(|(p, _)| *p == property)
    }

    pub fn get(&self, property: Property) -> Option<PropertyValue> {
        self.props
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| *v)
    }

    /// Copy with `property` set to `value`. Properties the kind does not
    /// declare are left alone, so a state never gains foreign properties.
    pub fn with(mut self, property: Property, value: PropertyValue) -> Self {
        if let Some(slot) = self.props.iter_mut().find(|(p, _)| *p == property) {
            slot.1 = value;
        }
        self
    }

    pub fn properties(&self) -> impl Iterator<Item = (Property, PropertyValue)> + '_ {
        self.props.iter().copied()
    }

    /// The first property the kind declares that this state lacks. Only a
    /// deserialized state can lack one.
    pub fn missing_property(&self) -> Option<Property> {
        self.kind.properties().iter().copied().find(|p| !self.has(*p))
    }

    // -- typed accessors ----------------------------------------------------

    pub fn facing(&self) -> Option<Direction> {
        match self.get(Property::HorizontalFacing).or(self.get(Property::HopperFacing)) {
            Some(PropertyValue::Direction(d)) => Some(d),
            _ => None,
        }
    }

    pub fn axis(&self) -> Option<Axis> {
        match self.get(Property::Axis) {
            Some(PropertyValue::Axis(a)) => Some(a),
            _ => None,
        }
    }

    pub fn half(&self) -> Option<BlockHalf> {
        match self.get(Property::Half) {
            Some(PropertyValue::Half(h)) => Some(h),
            _ => None,
        }
    }

    pub fn slab_type(&self) -> Option<SlabType> {
        match self.get(Property::SlabType) {
            Some(PropertyValue::Slab(s)) => Some(s),
            _ => None,
        }
    }

    pub fn hinge(&self) -> Option<DoorHinge> {
        match self.get(Property::Hinge) {
            Some(PropertyValue::Hinge(h)) => Some(h),
            _ => None,
        }
    }

    pub fn face(&self) -> Option<BlockFace> {
        match self.get(Property::Face) {
            Some(PropertyValue::Face(f)) => Some(f),
            _ => None,
        }
    }

    pub fn attachment(&self) -> Option<Attachment> {
        match self.get(Property::Attachment) {
            Some(PropertyValue::Attachment(a)) => Some(a),
            _ => None,
        }
    }

    pub fn int(&self, property: Property) -> Option<u8> {
        match self.get(property) {
            Some(PropertyValue::Int(i)) => Some(i),
            _ => None,
        }
    }

    pub fn flag(&self, property: Property) -> bool {
        matches!(self.get(property), Some(PropertyValue::Bool(true)))
    }

    // -- comparison ---------------------------------------------------------

    /// Same kind, and every property not in `ignore` has the same value.
    pub fn matches(&self, other: &BlockState, ignore: &[Property]) -> bool {
        self.kind == other.kind
            && self
                .props
                .iter()
                .all(|(p, v)| ignore.contains(p) || other.get(*p) == Some(*v))
    }

    // -- derived views ------------------------------------------------------

    pub fn is_air(&self) -> bool {
        self.kind == BlockKind::Air
    }

    pub fn hardness(&self) -> f32 {
        self.kind.hardness()
    }

    pub fn is_replaceable(&self) -> bool {
        self.kind.is_replaceable()
    }

    /// A full opaque cube: solid blocks and double slabs.
    pub fn is_solid_block(&self) -> bool {
        self.kind.is_solid_cube() || self.slab_type() == Some(SlabType::Double)
    }

    pub fn fluid_state(&self) -> FluidState {
        let fluid = match self.kind {
            BlockKind::Water => Fluid::Water,
            BlockKind::Lava => Fluid::Lava,
            _ if self.flag(Property::Waterlogged) => return FluidState::source(Fluid::Water),
            _ => return FluidState::EMPTY,
        };
        match self.int(Property::Level).unwrap_or(0) {
            0 => FluidState::source(fluid),
            l @ 1..=7 => FluidState {
                fluid,
                level: 8 - l,
                still: false,
            },
            _ => FluidState {
                fluid,
                level: 8,
                still: false,
            },
        }
    }

    pub fn has_fluid(&self) -> bool {
        !self.fluid_state().is_empty()
    }

    /// What the cell holds once this block is broken: its fluid, or air.
    pub fn empty_state(&self) -> BlockState {
        match self.kind {
            BlockKind::Water | BlockKind::Lava => self.clone(),
            _ if self.flag(Property::Waterlogged) => BlockState::of(BlockKind::Water),
            _ => BlockState::air(),
        }
    }

    /// Air, or nothing but the fluid that would remain after breaking.
    pub fn is_empty(&self) -> bool {
        self.is_air() || self.matches(&self.empty_state(), &[])
    }

    /// Outline used for clicking and for line-of-sight.
    pub fn outline_shape(&self) -> Shape {
        use BlockKind::*;
        let px = |a: f64, b: f64, c: f64, d: f64, e: f64, f: f64| {
            Aabb::new(a / 16.0, b / 16.0, c / 16.0, d / 16.0, e / 16.0, f / 16.0)
        };
        match self.kind {
            Air | Water | Lava | Fire => Shape::empty(),
            ShortGrass => Shape::of(px(2.0, 0.0, 2.0, 14.0, 13.0, 14.0)),
            OakSlab => match self.slab_type() {
                Some(SlabType::Top) => Shape::of(px(0.0, 8.0, 0.0, 16.0, 16.0, 16.0)),
                Some(SlabType::Double) => Shape::full_cube(),
                _ => Shape::of(px(0.0, 0.0, 0.0, 16.0, 8.0, 16.0)),
            },
            OakStairs => {
                let (base, step_y) = match self.half() {
                    Some(BlockHalf::Top) => (px(0.0, 8.0, 0.0, 16.0, 16.0, 16.0), (0.0, 8.0)),
                    _ => (px(0.0, 0.0, 0.0, 16.0, 8.0, 16.0), (8.0, 16.0)),
                };
                let (y0, y1) = step_y;
                let step = match self.facing() {
                    Some(Direction::South) => px(0.0, y0, 8.0, 16.0, y1, 16.0),
                    Some(Direction::West) => px(0.0, y0, 0.0, 8.0, y1, 16.0),
                    Some(Direction::East) => px(8.0, y0, 0.0, 16.0, y1, 16.0),
                    _ => px(0.0, y0, 0.0, 16.0, y1, 8.0),
                };
                Shape::of(base).union(step)
            }
            OakDoor => {
                let north = px(0.0, 0.0, 13.0, 16.0, 16.0, 16.0);
                let south = px(0.0, 0.0, 0.0, 16.0, 16.0, 3.0);
                let east = px(0.0, 0.0, 0.0, 3.0, 16.0, 16.0);
                let west = px(13.0, 0.0, 0.0, 16.0, 16.0, 16.0);
                let closed = !self.flag(Property::Open);
                let right = self.hinge() == Some(DoorHinge::Right);
                let b = match self.facing() {
                    Some(Direction::South) => {
                        if closed { south } else if right { east } else { west }
                    }
                    Some(Direction::West) => {
                        if closed { west } else if right { south } else { north }
                    }
                    Some(Direction::East) => {
                        if closed { east } else if right { north } else { south }
                    }
                    _ => {
                        if closed { north } else if right { west } else { east }
                    }
                };
                Shape::of(b)
            }
            Lever => {
                let along_x = matches!(self.facing(), Some(Direction::East | Direction::West));
                let b = match self.face() {
                    Some(BlockFace::Floor) if along_x => px(4.0, 0.0, 5.0, 12.0, 6.0, 11.0),
                    Some(BlockFace::Floor) => px(5.0, 0.0, 4.0, 11.0, 6.0, 12.0),
                    Some(BlockFace::Ceiling) if along_x => px(4.0, 10.0, 5.0, 12.0, 16.0, 11.0),
                    Some(BlockFace::Ceiling) => px(5.0, 10.0, 4.0, 11.0, 16.0, 12.0),
                    _ => match self.facing() {
                        Some(Direction::South) => px(5.0, 4.0, 0.0, 11.0, 12.0, 6.0),
                        Some(Direction::West) => px(10.0, 4.0, 5.0, 16.0, 12.0, 11.0),
                        Some(Direction::East) => px(0.0, 4.0, 5.0, 6.0, 12.0, 11.0),
                        _ => px(5.0, 4.0, 10.0, 11.0, 12.0, 16.0),
                    },
                };
                Shape::of(b)
            }
            Bell => Shape::of(px(4.0, 0.0, 4.0, 12.0, 16.0, 12.0)),
            OakSign => Shape::of(px(4.0, 0.0, 4.0, 12.0, 16.0, 12.0)),
            Bamboo => Shape::of(px(6.5, 0.0, 6.5, 9.5, 16.0, 9.5)),
            BambooSapling => Shape::of(px(4.0, 0.0, 4.0, 12.0, 12.0, 12.0)),
            FlowerPot | PottedPoppy | PottedDandelion => Shape::of(px(5.0, 0.0, 5.0, 11.0, 6.0, 11.0)),
            Poppy | Dandelion => Shape::of(px(5.0, 0.0, 5.0, 11.0, 10.0, 11.0)),
            Chest => Shape::of(px(1.0, 0.0, 1.0, 15.0, 14.0, 15.0)),
            Stone | Cobblestone | Dirt | GrassBlock | Sand | Gravel | Netherrack | Obsidian
            | Bedrock | OakLog | OakPlanks | Glass | Hopper | CommandBlock | Scaffolding
            | Furnace => Shape::full_cube(),
        }
    }

    /// Shape entities collide with. Plants, fire, levers and signs have none.
    pub fn collision_shape(&self) -> Shape {
        use BlockKind::*;
        match self.kind {
            ShortGrass | Poppy | Dandelion | Lever | OakSign | BambooSapling => Shape::empty(),
            _ => self.outline_shape(),
        }
    }
}

impl From<BlockKind> for BlockState {
    fn from(kind: BlockKind) -> Self {
        BlockState::of(kind)
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.props.is_empty() {
            let parts: Vec<String> = self
                .props
                .iter()
                .map(|(p, v)| format!("{}={v}", p.name()))
                .collect();
            write!(f, "[{}]", parts.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stairs(facing: Direction, half: BlockHalf) -> BlockState {
        BlockState::of(BlockKind::OakStairs)
            .with(Property::HorizontalFacing, PropertyValue::Direction(facing))
            .with(Property::Half, PropertyValue::Half(half))
    }

    #[test]
    fn default_state_carries_declared_properties() {
        let furnace = BlockState::of(BlockKind::Furnace);
        assert_eq!(furnace.facing(), Some(Direction::North));
        assert!(!furnace.flag(Property::Lit));
        assert!(!furnace.has(Property::Waterlogged));
    }

    #[test]
    fn with_ignores_undeclared_properties() {
        let stone = BlockState::of(BlockKind::Stone).with(Property::Lit, PropertyValue::Bool(true));
        assert_eq!(stone, BlockState::of(BlockKind::Stone));
    }

    #[test]
    fn matches_respects_ignore_list() {
        let a = stairs(Direction::North, BlockHalf::Bottom);
        let b = a.clone().with(Property::Waterlogged, PropertyValue::Bool(true));
        assert!(!a.matches(&b, &[]));
        assert!(a.matches(&b, &[Property::Waterlogged]));
        let c = stairs(Direction::South, BlockHalf::Bottom);
        assert!(!a.matches(&c, &[Property::Waterlogged]));
    }

    #[test]
    fn matches_requires_same_kind() {
        assert!(!BlockState::of(BlockKind::Stone).matches(&BlockState::of(BlockKind::Dirt), &[]));
    }

    #[test]
    fn water_levels_map_to_fluid_state() {
        let source = BlockState::of(BlockKind::Water);
        assert_eq!(source.fluid_state(), FluidState::source(Fluid::Water));
        let flowing = source.clone().with(Property::Level, PropertyValue::Int(3));
        let fs = flowing.fluid_state();
        assert_eq!(fs.level, 5);
        assert!(!fs.still);
        let falling = source.with(Property::Level, PropertyValue::Int(9));
        assert_eq!(falling.fluid_state().level, 8);
    }

    #[test]
    fn waterlogged_blocks_hold_water_and_leave_it_behind() {
        let slab = BlockState::of(BlockKind::OakSlab).with(Property::Waterlogged, PropertyValue::Bool(true));
        assert!(slab.has_fluid());
        assert_eq!(slab.empty_state().kind(), BlockKind::Water);
        assert!(!slab.is_empty());
    }

    #[test]
    fn water_counts_as_empty_but_not_air() {
        let water = BlockState::of(BlockKind::Water);
        assert!(water.is_empty());
        assert!(!water.is_air());
        assert!(!BlockState::of(BlockKind::Stone).is_empty());
    }

    #[test]
    fn fluid_sort_index_orders_lava_before_water() {
        let lava = BlockState::of(BlockKind::Lava).fluid_state();
        let water = BlockState::of(BlockKind::Water).fluid_state();
        assert!(lava.sort_index() < water.sort_index());
        assert!(water.sort_index() < FluidState::EMPTY.sort_index());
    }

    #[test]
    fn slab_shapes_follow_type() {
        let top = BlockState::of(BlockKind::OakSlab).with(Property::SlabType, PropertyValue::Slab(SlabType::Top));
        assert!(top.outline_shape().boxes()[0].min.y >= 0.5);
        let double = top.with(Property::SlabType, PropertyValue::Slab(SlabType::Double));
        assert!(double.outline_shape().is_full_cube());
        assert!(double.is_solid_block());
    }

    #[test]
    fn stairs_have_base_and_step() {
        let s = stairs(Direction::East, BlockHalf::Bottom);
        let shape = s.outline_shape();
        assert_eq!(shape.boxes().len(), 2);
        assert!(shape.boxes()[1].min.x >= 0.5);
    }

    #[test]
    fn plants_have_no_collision() {
        assert!(BlockState::of(BlockKind::Poppy).collision_shape().is_empty());
        assert!(!BlockState::of(BlockKind::Poppy).outline_shape().is_empty());
    }

    #[test]
    fn display_lists_properties() {
        let s = stairs(Direction::East, BlockHalf::Top);
        assert_eq!(s.to_string(), "oak_stairs[facing=east,half=top,waterlogged=false]");
    }
}
