// Exceptional planner errors.
//
// Expected outcomes (a block out of reach, the wrong tool, an entity in the
// way) are `BuildResult` variants, not errors. `SimError` covers only what
// the planner cannot reason about: malformed target/item pairings, states
// missing declared properties, and configuration that fails to load. The
// structure pass turns a per-position `SimError` into a failed-this-pass
// entry and keeps going.

use crate::item::Item;
use crate::state::Property;
use crate::types::BlockPos;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// A placement was requested with an item that places no block.
    #[error("item {item} at {pos} cannot place a block")]
    NotABlockItem { pos: BlockPos, item: Item },
    /// A state lacks a property its block kind declares.
    #[error("state at {pos} is missing property {property:?}")]
    MissingProperty { pos: BlockPos, property: Property },
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
