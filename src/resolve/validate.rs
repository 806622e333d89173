//! Order validation and instant/deferred classification.
//!
//! Validation is a filter, not a gate: structurally broken orders are
//! dropped from the batch without raising, and the rest of the turn
//! proceeds. Classification labels each surviving order instant (executes
//! before conflict resolution) or deferred.

use crate::board::{Board, MoveKind, MoveOrder, PlayerId, SectorId};

/// Drops structurally invalid orders, preserving the order of the rest.
///
/// An order is invalid when its issuing player is unset, its unit list is
/// empty, its source or destination sector does not exist, or (for a
/// two-hop move) its intermediate sector is missing or does not exist.
pub fn validate_orders(board: &Board, orders: Vec<MoveOrder>) -> Vec<MoveOrder> {
    orders
        .into_iter()
        .filter(|order| match invalid_reason(board, order) {
            None => true,
            Some(reason) => {
                tracing::debug!(?order.player, ?order.from, ?order.to, reason, "dropping order");
                false
            }
        })
        .collect()
}

fn invalid_reason(board: &Board, order: &MoveOrder) -> Option<&'static str> {
    if order.player.is_none() {
        return Some("issuing player unset");
    }
    if order.units.is_empty() {
        return Some("empty unit list");
    }
    if !board.sector_exists(order.from) {
        return Some("source sector does not exist");
    }
    if !board.sector_exists(order.to) {
        return Some("destination sector does not exist");
    }
    if order.kind == MoveKind::DoubleMove {
        match order.via {
            None => return Some("two-hop move without intermediate sector"),
            Some(via) if !board.sector_exists(via) => {
                return Some("intermediate sector does not exist")
            }
            Some(_) => {}
        }
    }
    None
}

/// Labels each order instant or deferred.
///
/// Internal moves are always instant. A two-hop move is instant only when
/// source, intermediate, and destination are all owned by the issuing
/// player. Neutral and enemy moves are never instant.
pub fn classify_orders(board: &Board, orders: &mut [MoveOrder]) {
    for order in orders.iter_mut() {
        order.instant = match order.kind {
            MoveKind::Internal => true,
            MoveKind::DoubleMove => {
                let player = order
                    .player
                    .expect("validated order without issuing player");
                let via = order
                    .via
                    .expect("validated two-hop order without intermediate sector");
                owns(board, player, order.from)
                    && owns(board, player, via)
                    && owns(board, player, order.to)
            }
            MoveKind::Neutral | MoveKind::Enemy => false,
        };
    }
}

fn owns(board: &Board, player: PlayerId, sector: SectorId) -> bool {
    board
        .sector(sector)
        .map(|s| s.owner == Some(player))
        .unwrap_or(false)
}
