//! Single-direction volley mechanics.
//!
//! A volley spends one side's pooled phase points against the opposing
//! army. The army is a damage stack: the last unit in the list is targeted
//! first, and the volley walks down the stack as units die or evade.

use rand::Rng;

use crate::board::{DamageKind, Unit};

/// The outcome of one volley against one army.
///
/// The targets list itself holds the survivors (in their surviving order);
/// casualties are moved out here, and `leftover` is the firing side's
/// unspent points, floored at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseResult {
    pub casualties: Vec<Unit>,
    pub leftover: f64,
}

/// Fires `points` of the given damage kind into `targets`.
///
/// Per target, from the top of the stack down:
/// - an evading unit costs the attacker its full remaining toughness in
///   points but takes no damage, and is not targeted again this volley;
/// - a unit whose pre-resistance toughness cost fits in the remaining pool
///   is destroyed and moved to the casualties list;
/// - otherwise the remaining points land as partial damage (armor first,
///   then defense) and the volley ends.
pub fn fire_volley(
    kind: DamageKind,
    points: f64,
    targets: &mut Vec<Unit>,
    rng: &mut impl Rng,
) -> PhaseResult {
    let mut available = points;
    let mut casualties = Vec::new();
    // One past the current target; evaded units stay below the cursor.
    let mut cursor = targets.len();

    while available > 0.0 && cursor > 0 {
        let idx = cursor - 1;

        let evasion = targets[idx].evasion;
        if evasion > 0 {
            let roll: u8 = rng.gen_range(1..=100);
            if roll <= evasion {
                available -= targets[idx].toughness();
                cursor -= 1;
                continue;
            }
        }

        let resistance = targets[idx].resistance(kind);
        let effective = available * (1.0 - resistance);
        let toughness = targets[idx].toughness();

        if toughness <= effective {
            // Pre-resistance cost of the kill.
            available -= toughness / (1.0 - resistance);
            casualties.push(targets.remove(idx));
            cursor -= 1;
        } else {
            let unit = &mut targets[idx];
            if effective <= unit.armor {
                unit.armor -= effective;
            } else {
                unit.defense -= effective - unit.armor;
                unit.armor = 0.0;
            }
            available = 0.0;
        }
    }

    PhaseResult {
        casualties,
        leftover: available.max(0.0),
    }
}

/// Spreads a volley's unspent points back across the firing side's units.
///
/// Each unit's stat for the kind is overwritten with its share, capped at
/// the unit's own current stat; trailing units get zero. The rewritten
/// stats become the pool for a same-kind second round.
pub fn redistribute_leftover(kind: DamageKind, leftover: f64, units: &mut [Unit]) {
    let mut remaining = leftover.max(0.0);
    for unit in units {
        let grant = remaining.min(unit.stat(kind));
        unit.set_stat(kind, grant);
        remaining -= grant;
    }
}
