//! Crossing cancellation and two-hop interception.
//!
//! Both passes run on the deferred (non-instant) orders only: instant moves
//! have already executed by the time these checks apply.

use crate::board::{Board, MoveKind, MoveOrder};

/// Cancels mutually opposing order pairs.
///
/// Two orders cross when they would swap occupants between the same two
/// sectors and belong to different players; both are cancelled and their
/// units stay where they are. The scan is a single greedy left-to-right
/// pass: each order cancels at most once, and the first matching partner
/// wins.
pub fn cancel_crossings(orders: &mut [MoveOrder]) {
    for i in 0..orders.len() {
        if orders[i].cancelled {
            continue;
        }
        for j in (i + 1)..orders.len() {
            if orders[j].cancelled {
                continue;
            }
            let crossing = orders[i].from == orders[j].to
                && orders[i].to == orders[j].from
                && orders[i].player != orders[j].player;
            if crossing {
                orders[i].cancelled = true;
                orders[j].cancelled = true;
                tracing::debug!(
                    from = ?orders[i].from,
                    to = ?orders[i].to,
                    "crossing orders cancelled"
                );
                break;
            }
        }
    }
}

/// Truncates two-hop orders that pass through contested territory.
///
/// A surviving `DoubleMove` order is intercepted when its intermediate
/// sector holds a non-empty army owned by someone else, or when another
/// surviving order from a different player declares that intermediate
/// sector as its own destination. Both conditions read the declared
/// (pre-interception) destinations; truncations apply afterwards in one
/// pass, rewriting the effective destination to the intermediate sector.
pub fn check_interceptions(board: &Board, orders: &mut [MoveOrder]) {
    // Declared destinations, captured before any truncation this pass.
    let declared: Vec<_> = orders
        .iter()
        .map(|o| (o.player, o.to, o.cancelled))
        .collect();

    for (i, order) in orders.iter_mut().enumerate() {
        if order.cancelled || order.kind != MoveKind::DoubleMove {
            continue;
        }
        let via = order
            .via
            .expect("validated two-hop order without intermediate sector");

        let garrisoned = board
            .sector(via)
            .map(|s| !s.army.is_empty() && s.owner != order.player)
            .unwrap_or(false);

        let converged = declared.iter().enumerate().any(|(j, (player, to, cancelled))| {
            j != i && !*cancelled && *player != order.player && *to == via
        });

        if garrisoned || converged {
            order.intercepted = true;
            tracing::debug!(?order.from, ?via, "two-hop order intercepted");
        }
    }
}
