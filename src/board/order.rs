//! Movement orders.
//!
//! One `MoveOrder` captures a single player intent for the turn: move these
//! units from here to there, optionally through an intermediate sector.
//! Orders are created per turn, mutated by the resolution pipeline (instant
//! labeling, crossing cancellation, interception truncation), and discarded
//! once the turn is resolved; nothing here is persisted.

use serde::{Deserialize, Serialize};

use super::sector::{PlayerId, SectorId};
use super::unit::UnitId;

/// The declared character of a move, as submitted by the player layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    /// Movement wholly within the player's own territory.
    Internal,
    /// Movement into an unowned sector.
    Neutral,
    /// Movement into another player's sector.
    Enemy,
    /// A two-hop move through an intermediate sector.
    DoubleMove,
}

/// A single movement order for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOrder {
    /// Issuing player. Nullable at intake: an order arriving without a
    /// player is structurally invalid and dropped by the validator.
    #[serde(default)]
    pub player: Option<PlayerId>,
    pub from: SectorId,
    pub to: SectorId,
    pub kind: MoveKind,
    /// Intermediate sector, required iff `kind` is `DoubleMove`.
    #[serde(default)]
    pub via: Option<SectorId>,
    /// Units to move; all must reside in `from` when the order executes.
    pub units: Vec<UnitId>,
    /// Set by the interception checker when a two-hop move stops short.
    #[serde(default)]
    pub intercepted: bool,
    /// Set by the classifier; instant orders execute before conflict
    /// resolution.
    #[serde(default)]
    pub instant: bool,
    /// Set by the conflict resolver when this order crossed an opposing one.
    #[serde(default)]
    pub cancelled: bool,
}

impl MoveOrder {
    /// Creates a single-hop order.
    pub fn new(
        player: PlayerId,
        from: SectorId,
        to: SectorId,
        kind: MoveKind,
        units: Vec<UnitId>,
    ) -> Self {
        MoveOrder {
            player: Some(player),
            from,
            to,
            kind,
            via: None,
            units,
            intercepted: false,
            instant: false,
            cancelled: false,
        }
    }

    /// Creates a two-hop order through `via`.
    pub fn double(
        player: PlayerId,
        from: SectorId,
        via: SectorId,
        to: SectorId,
        units: Vec<UnitId>,
    ) -> Self {
        MoveOrder {
            via: Some(via),
            ..MoveOrder::new(player, from, to, MoveKind::DoubleMove, units)
        }
    }

    /// Where this order actually delivers its units: the declared
    /// destination, or the intermediate sector once intercepted.
    pub fn effective_destination(&self) -> SectorId {
        if self.intercepted {
            // The checker only intercepts two-hop orders, which carry `via`.
            self.via.expect("intercepted order without intermediate sector")
        } else {
            self.to
        }
    }
}
