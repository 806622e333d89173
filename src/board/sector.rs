//! Sector graph and board state.
//!
//! The board owns every sector on the map, keyed by id. Sectors carry the
//! data the outer game layers author (ownership, color, income, adjacency)
//! plus the resident army this core moves and fights with. Iteration order
//! is deterministic so repeated resolutions of the same snapshot agree.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::unit::{Unit, UnitId};

/// Identifies a sector on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectorId(pub u32);

/// Identifies a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// A node in the territory graph.
///
/// The army list is a damage stack: the last unit in the list is the first
/// to be targeted in combat. Code that appends to `army` is therefore
/// deciding who stands in front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: SectorId,
    pub owner: Option<PlayerId>,
    /// Display tag supplied by the board import layer; opaque to this core.
    #[serde(default)]
    pub color: Option<String>,
    /// Per-turn yield, consumed by the economy layer; opaque to this core.
    #[serde(default)]
    pub income: u32,
    #[serde(default)]
    pub army: Vec<Unit>,
    #[serde(default)]
    pub neighbors: BTreeSet<SectorId>,
}

impl Sector {
    /// Creates an unowned, empty sector.
    pub fn new(id: SectorId) -> Self {
        Sector {
            id,
            owner: None,
            color: None,
            income: 0,
            army: Vec::new(),
            neighbors: BTreeSet::new(),
        }
    }

    /// Creates an empty sector owned by the given player.
    pub fn owned(id: SectorId, owner: PlayerId) -> Self {
        Sector {
            owner: Some(owner),
            ..Sector::new(id)
        }
    }
}

/// The complete territory graph for one game, plus its unit-id sequence.
///
/// Ids are minted per board rather than from a process-wide counter, so
/// independent boards (and parallel test fixtures) never collide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    sectors: BTreeMap<SectorId, Sector>,
    next_unit_id: u32,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Board::default()
    }

    /// Adds a sector. Returns false if the id is already taken.
    pub fn add_sector(&mut self, sector: Sector) -> bool {
        if self.sectors.contains_key(&sector.id) {
            return false;
        }
        self.sectors.insert(sector.id, sector);
        true
    }

    /// Returns the sector with the given id, if present.
    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(&id)
    }

    /// Returns the sector with the given id for mutation, if present.
    pub fn sector_mut(&mut self, id: SectorId) -> Option<&mut Sector> {
        self.sectors.get_mut(&id)
    }

    /// Returns whether a sector with the given id exists.
    pub fn sector_exists(&self, id: SectorId) -> bool {
        self.sectors.contains_key(&id)
    }

    /// Iterates all sectors in id order.
    pub fn sectors(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.values()
    }

    /// Returns every sector currently owned by the given player, in id order.
    pub fn sectors_owned_by(&self, player: PlayerId) -> Vec<&Sector> {
        self.sectors
            .values()
            .filter(|s| s.owner == Some(player))
            .collect()
    }

    /// Records a symmetric adjacency between two sectors.
    ///
    /// Returns false (and records nothing) unless both sectors exist.
    pub fn link(&mut self, a: SectorId, b: SectorId) -> bool {
        if !self.sector_exists(a) || !self.sector_exists(b) {
            return false;
        }
        if let Some(s) = self.sectors.get_mut(&a) {
            s.neighbors.insert(b);
        }
        if let Some(s) = self.sectors.get_mut(&b) {
            s.neighbors.insert(a);
        }
        true
    }

    /// Mints the next unit id in this board's sequence.
    pub fn mint_unit_id(&mut self) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        id
    }
}
