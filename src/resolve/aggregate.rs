//! Battle aggregation.
//!
//! After deferred moves execute, every destination sector that received
//! units from more than one player becomes a battle. The aggregator drains
//! the contested units out of the sector's army into per-player buckets so
//! the combat resolver can consume them while the one-army-per-unit
//! invariant keeps holding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{Board, MoveOrder, PlayerId, SectorId, Unit, UnitId};

/// Classification of a contested sector by party count and ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleType {
    /// No parties present.
    None,
    /// A single party: an uncontested occupation, not a battle.
    Occupation,
    /// Two parties, neither of them the sector's original owner.
    Attack,
    /// Two parties, one of them the sector's original owner.
    Defense,
    /// Three or more parties.
    MultiPlayer,
}

/// One pending battle: the contested sector and the forces present.
///
/// Buckets are kept in first-arrival order. Within a bucket, pre-existing
/// residents precede arriving units, so arrivals stand at the top of the
/// damage stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSetup {
    pub sector: SectorId,
    pub original_owner: Option<PlayerId>,
    pub forces: Vec<(PlayerId, Vec<Unit>)>,
    pub kind: BattleType,
}

impl BattleSetup {
    /// The distinct players with units in this battle.
    pub fn players(&self) -> Vec<PlayerId> {
        self.forces.iter().map(|(p, _)| *p).collect()
    }
}

/// Classifies a battle from its party count and whether the sector's
/// original owner is among the parties.
pub fn classify_battle(parties: usize, owner_present: bool) -> BattleType {
    match parties {
        0 => BattleType::None,
        1 => BattleType::Occupation,
        2 if owner_present => BattleType::Defense,
        2 => BattleType::Attack,
        _ => BattleType::MultiPlayer,
    }
}

/// Groups executed deferred orders by effective destination and builds a
/// `BattleSetup` for every sector contested by at least two players.
///
/// The sector's pre-existing residents join the battle only when their
/// owner also arrives by order this turn; otherwise they stay in the
/// sector's army and take no part (inherited behavior, surfaced with a
/// warning). Single-claimant destinations are silent occupations and emit
/// nothing. Setups come back in sector-id order.
pub fn aggregate_battles(board: &mut Board, orders: &[MoveOrder]) -> Vec<BattleSetup> {
    let mut by_destination: BTreeMap<SectorId, Vec<&MoveOrder>> = BTreeMap::new();
    for order in orders {
        by_destination
            .entry(order.effective_destination())
            .or_default()
            .push(order);
    }

    let mut battles = Vec::new();
    for (destination, group) in by_destination {
        // Arriving players in first-appearance order, unit lists merged.
        let mut arrivals: Vec<(PlayerId, Vec<UnitId>)> = Vec::new();
        for order in &group {
            let player = order.player.expect("validated order without issuing player");
            match arrivals.iter_mut().find(|(p, _)| *p == player) {
                Some((_, units)) => units.extend(order.units.iter().copied()),
                None => arrivals.push((player, order.units.clone())),
            }
        }
        if arrivals.len() < 2 {
            continue;
        }

        let sector = board
            .sector_mut(destination)
            .expect("executed order targeting nonexistent sector");
        let owner = sector.owner;
        let owner_arrived = owner.map(|o| arrivals.iter().any(|(p, _)| *p == o));

        let mut buckets: Vec<(PlayerId, Vec<Unit>)> = Vec::new();
        for (player, _) in &arrivals {
            buckets.push((*player, Vec::new()));
        }

        // Split the army into per-player arrivals and leftover residents,
        // preserving stack order throughout.
        let mut residents: Vec<Unit> = Vec::new();
        for unit in sector.army.drain(..) {
            let claimant = arrivals
                .iter()
                .position(|(_, ids)| ids.contains(&unit.id));
            match claimant {
                Some(idx) => buckets[idx].1.push(unit),
                None => residents.push(unit),
            }
        }

        match (owner, owner_arrived) {
            (Some(owner), Some(true)) if !residents.is_empty() => {
                // Residents defend alongside the owner's arrivals, standing
                // below them in the stack.
                let bucket = buckets
                    .iter_mut()
                    .find(|(p, _)| *p == owner)
                    .expect("owner marked as arrived but has no bucket");
                residents.extend(bucket.1.drain(..));
                bucket.1 = residents;
                residents = Vec::new();
            }
            _ => {
                if !residents.is_empty() {
                    tracing::warn!(
                        ?destination,
                        ?owner,
                        residents = residents.len(),
                        "resident army has no claimant in battle; units stand aside"
                    );
                }
                sector.army = residents;
                residents = Vec::new();
            }
        }
        debug_assert!(residents.is_empty());

        let owner_present = owner
            .map(|o| buckets.iter().any(|(p, units)| *p == o && !units.is_empty()))
            .unwrap_or(false);
        let kind = classify_battle(buckets.len(), owner_present);

        battles.push(BattleSetup {
            sector: destination,
            original_owner: owner,
            forces: buckets,
            kind,
        });
    }
    battles
}
