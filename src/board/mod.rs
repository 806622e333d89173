//! Board representation and game-state types.
//!
//! Contains the core data structures for sectors, the territory graph,
//! units with their derived combat stats, and movement orders.

pub mod order;
pub mod sector;
pub mod unit;

pub use order::{MoveKind, MoveOrder};
pub use sector::{Board, PlayerId, Sector, SectorId};
pub use unit::{
    DamageKind, Item, StatBlock, Unit, UnitClass, UnitId, INJURED_STAT_MULTIPLIER,
};
