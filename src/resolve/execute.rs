//! Move execution and the turn pipeline.
//!
//! `resolve_turn` is the single entry point the turn service calls: it runs
//! validation, classification, instant execution, crossing cancellation,
//! interception, deferred execution, and battle aggregation as one
//! synchronous unit of work over the board snapshot.

use crate::board::{Board, MoveOrder, Unit};
use crate::resolve::aggregate::{aggregate_battles, BattleSetup};
use crate::resolve::conflict::{cancel_crossings, check_interceptions};
use crate::resolve::validate::{classify_orders, validate_orders};

/// Relocates an order's units from its source to its effective destination.
///
/// Only moves; battle computation happens later. Panics if a unit named by
/// the order is not in the source army: orders are validated before
/// execution, so a missing unit means the caller broke the contract that
/// ordered units reside in their claimed source sector.
pub fn execute_move(board: &mut Board, order: &MoveOrder) {
    let source = board
        .sector_mut(order.from)
        .expect("executed order with nonexistent source sector");

    let mut moved: Vec<Unit> = Vec::with_capacity(order.units.len());
    for unit_id in &order.units {
        let position = source.army.iter().position(|u| u.id == *unit_id);
        match position {
            Some(idx) => moved.push(source.army.remove(idx)),
            None => panic!(
                "unit {:?} ordered out of sector {:?} but not present in its army",
                unit_id, order.from
            ),
        }
    }

    let destination = board
        .sector_mut(order.effective_destination())
        .expect("executed order with nonexistent destination sector");
    destination.army.append(&mut moved);
}

/// Resolves one turn's worth of simultaneous orders against the board.
///
/// Mutates sector armies in place; units arriving at a contested sector are
/// drained into the returned setups for the combat resolver. The caller
/// serializes turn submissions per board: nothing here is safe to run
/// concurrently against the same snapshot.
pub fn resolve_turn(board: &mut Board, orders: Vec<MoveOrder>) -> Vec<BattleSetup> {
    let mut orders = validate_orders(board, orders);
    classify_orders(board, &mut orders);

    // Instant orders execute before any conflict filtering of the rest.
    for order in orders.iter().filter(|o| o.instant) {
        execute_move(board, order);
    }

    let mut deferred: Vec<MoveOrder> = orders.into_iter().filter(|o| !o.instant).collect();
    cancel_crossings(&mut deferred);
    deferred.retain(|o| !o.cancelled);
    check_interceptions(board, &mut deferred);

    for order in &deferred {
        execute_move(board, order);
    }

    aggregate_battles(board, &deferred)
}
