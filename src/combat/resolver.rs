//! Battle resolution.
//!
//! Drives the phase state machine over a `BattleSetup`:
//! ranged → optional ranged second round → melee → optional melee second
//! round → attack, terminating early whenever a side is wiped out. Both
//! sides of a phase pool their points from the pre-phase stacks, the
//! initiating side's volley lands first, and a side wiped before its volley
//! never fires. Multi-party battles resolve as sequential pairwise
//! engagements with the sector's original owner defending last.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{DamageKind, PlayerId, SectorId, Unit};
use crate::combat::volley::{fire_volley, redistribute_leftover, PhaseResult};
use crate::resolve::aggregate::{BattleSetup, BattleType};

/// Resource limits for one battle resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct BattleOptions {
    /// Wall-clock budget for the whole battle; checked before every volley
    /// exchange. `None` means unbounded (the loop is still finite: each
    /// volley retires at least one target or zeroes the pool).
    pub deadline: Option<Duration>,
}

/// Errors from the guarded battle entry point.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("battle at sector {0:?} exceeded its resolution deadline")]
    DeadlineExceeded(SectorId),
}

/// The outcome of one resolved battle.
///
/// Every party appears in both maps, possibly with an empty list. The
/// winner is the sole player with surviving units; a battle where no side
/// or more than one side still stands has no winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub sector: SectorId,
    pub kind: BattleType,
    pub winner: Option<PlayerId>,
    pub casualties: BTreeMap<PlayerId, Vec<Unit>>,
    pub survivors: BTreeMap<PlayerId, Vec<Unit>>,
}

/// Resolves a battle with no deadline.
pub fn resolve_battle(setup: BattleSetup, rng: &mut impl Rng) -> BattleReport {
    match resolve_battle_with(setup, rng, &BattleOptions::default()) {
        Ok(report) => report,
        Err(e) => unreachable!("battle without deadline cannot fail: {e}"),
    }
}

/// Resolves a battle under the given resource limits.
pub fn resolve_battle_with(
    setup: BattleSetup,
    rng: &mut impl Rng,
    options: &BattleOptions,
) -> Result<BattleReport, BattleError> {
    let BattleSetup {
        sector,
        original_owner,
        mut forces,
        kind,
    } = setup;
    tracing::debug!(?sector, ?kind, parties = forces.len(), "resolving battle");

    // The original owner's bucket defends last: arriving forces engage each
    // other before the home force.
    if let Some(owner) = original_owner {
        if let Some(pos) = forces.iter().position(|(p, _)| *p == owner) {
            let bucket = forces.remove(pos);
            forces.push(bucket);
        }
    }

    let mut casualties: BTreeMap<PlayerId, Vec<Unit>> = BTreeMap::new();
    let mut survivors: BTreeMap<PlayerId, Vec<Unit>> = BTreeMap::new();
    for (player, _) in &forces {
        casualties.entry(*player).or_default();
        survivors.entry(*player).or_default();
    }

    let deadline = options.deadline.map(|d| Instant::now() + d);

    let mut queue = forces.into_iter();
    let mut incumbent = queue.next();
    // Sides that fought an engagement to a standstill keep their survivors
    // but do not fight again.
    let mut retired: Vec<(PlayerId, Vec<Unit>)> = Vec::new();

    for (challenger, mut challenging) in queue {
        match incumbent.take() {
            None => incumbent = Some((challenger, challenging)),
            Some((holder, mut holding)) => {
                let (holder_fallen, challenger_fallen) =
                    engage(&mut holding, &mut challenging, rng, deadline, sector)?;
                casualties.get_mut(&holder).unwrap().extend(holder_fallen);
                casualties
                    .get_mut(&challenger)
                    .unwrap()
                    .extend(challenger_fallen);

                incumbent = match (holding.is_empty(), challenging.is_empty()) {
                    (false, true) => Some((holder, holding)),
                    (true, false) => Some((challenger, challenging)),
                    (true, true) => None,
                    (false, false) => {
                        retired.push((challenger, challenging));
                        Some((holder, holding))
                    }
                };
            }
        }
    }

    if let Some((player, units)) = incumbent {
        survivors.get_mut(&player).unwrap().extend(units);
    }
    for (player, units) in retired {
        survivors.get_mut(&player).unwrap().extend(units);
    }

    let mut alive = survivors.iter().filter(|(_, units)| !units.is_empty());
    let winner = match (alive.next(), alive.next()) {
        (Some((player, _)), None) => Some(*player),
        _ => None,
    };

    Ok(BattleReport {
        sector,
        kind,
        winner,
        casualties,
        survivors,
    })
}

/// Runs the full phase sequence between two sides.
///
/// Mutates both armies in place and returns each side's casualties.
/// Surviving units whose defense fell below their class base are converted
/// to the injured state once the engagement ends.
fn engage(
    side_a: &mut Vec<Unit>,
    side_b: &mut Vec<Unit>,
    rng: &mut impl Rng,
    deadline: Option<Instant>,
    sector: SectorId,
) -> Result<(Vec<Unit>, Vec<Unit>), BattleError> {
    let mut a_fallen: Vec<Unit> = Vec::new();
    let mut b_fallen: Vec<Unit> = Vec::new();
    let mut terminal = false;

    for kind in [DamageKind::Ranged, DamageKind::Melee] {
        let ex = exchange(kind, side_a, side_b, rng, deadline, sector)?;
        a_fallen.extend(ex.a_fallen);
        b_fallen.extend(ex.b_fallen);
        if side_a.is_empty() || side_b.is_empty() {
            terminal = true;
            break;
        }

        redistribute_leftover(kind, ex.a_leftover, side_a);
        redistribute_leftover(kind, ex.b_leftover, side_b);

        // Second round of the same kind, fed by the redistributed leftovers.
        if ex.a_leftover > 0.0 || ex.b_leftover > 0.0 {
            let second = exchange(kind, side_a, side_b, rng, deadline, sector)?;
            a_fallen.extend(second.a_fallen);
            b_fallen.extend(second.b_fallen);
            if side_a.is_empty() || side_b.is_empty() {
                terminal = true;
                break;
            }
            redistribute_leftover(kind, second.a_leftover, side_a);
            redistribute_leftover(kind, second.b_leftover, side_b);
        }
    }

    if !terminal {
        let ex = exchange(DamageKind::Attack, side_a, side_b, rng, deadline, sector)?;
        a_fallen.extend(ex.a_fallen);
        b_fallen.extend(ex.b_fallen);
    }

    convert_injured(side_a);
    convert_injured(side_b);
    Ok((a_fallen, b_fallen))
}

/// One symmetric exchange of a single damage kind.
struct Exchange {
    a_fallen: Vec<Unit>,
    b_fallen: Vec<Unit>,
    a_leftover: f64,
    b_leftover: f64,
}

fn exchange(
    kind: DamageKind,
    side_a: &mut Vec<Unit>,
    side_b: &mut Vec<Unit>,
    rng: &mut impl Rng,
    deadline: Option<Instant>,
    sector: SectorId,
) -> Result<Exchange, BattleError> {
    if let Some(limit) = deadline {
        if Instant::now() >= limit {
            return Err(BattleError::DeadlineExceeded(sector));
        }
    }

    // Both pools come from the pre-phase stacks.
    let pool_a: f64 = side_a.iter().map(|u| u.stat(kind)).sum();
    let pool_b: f64 = side_b.iter().map(|u| u.stat(kind)).sum();

    let PhaseResult {
        casualties: b_fallen,
        leftover: a_leftover,
    } = fire_volley(kind, pool_a, side_b, rng);

    // A side wiped out by the first volley cannot fire back.
    let (a_fallen, b_leftover) = if side_b.is_empty() {
        (Vec::new(), 0.0)
    } else {
        let PhaseResult {
            casualties,
            leftover,
        } = fire_volley(kind, pool_b, side_a, rng);
        (casualties, leftover)
    };

    Ok(Exchange {
        a_fallen,
        b_fallen,
        a_leftover,
        b_leftover,
    })
}

/// Converts battle-worn survivors to the injured state.
fn convert_injured(units: &mut [Unit]) {
    for unit in units {
        if !unit.injured && unit.defense < unit.base_defense() {
            unit.mark_injured();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{UnitClass, UnitId};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn unit(id: u32, attack: f64, defense: f64) -> Unit {
        Unit {
            id: UnitId(id),
            class: UnitClass::Infantry,
            attack,
            defense,
            ranged: 0.0,
            melee: 0.0,
            armor: 0.0,
            evasion: 0,
            injured: false,
        }
    }

    fn setup(forces: Vec<(u32, Vec<Unit>)>, owner: Option<u32>, kind: BattleType) -> BattleSetup {
        BattleSetup {
            sector: SectorId(3),
            original_owner: owner.map(PlayerId),
            forces: forces
                .into_iter()
                .map(|(p, units)| (PlayerId(p), units))
                .collect(),
            kind,
        }
    }

    #[test]
    fn exactly_lethal_attack_wins_without_return_fire() {
        // Both units carry 10 attack and 10 toughness; the initiating side
        // lands first and the wiped defender never fires.
        let battle = setup(
            vec![
                (1, vec![unit(1, 10.0, 10.0)]),
                (2, vec![unit(2, 10.0, 10.0)]),
            ],
            None,
            BattleType::Attack,
        );
        let report = resolve_battle(battle, &mut rng());

        assert_eq!(report.winner, Some(PlayerId(1)));
        assert_eq!(report.casualties[&PlayerId(2)].len(), 1);
        assert!(report.casualties[&PlayerId(1)].is_empty());
        assert_eq!(report.survivors[&PlayerId(1)].len(), 1);
        assert!(report.survivors[&PlayerId(2)].is_empty());
    }

    #[test]
    fn surviving_side_returns_fire_with_pre_phase_pool() {
        // The defender survives the first volley and answers with its full
        // pre-phase pool, despite the damage just taken.
        let battle = setup(
            vec![
                (1, vec![unit(1, 5.0, 8.0)]),
                (2, vec![unit(2, 5.0, 20.0)]),
            ],
            None,
            BattleType::Attack,
        );
        let report = resolve_battle(battle, &mut rng());

        assert_eq!(report.winner, None);
        let defender = &report.survivors[&PlayerId(2)][0];
        assert_eq!(defender.defense, 15.0);
        let attacker = &report.survivors[&PlayerId(1)][0];
        assert_eq!(attacker.defense, 3.0);
    }

    #[test]
    fn battered_survivor_is_converted_to_injured() {
        // Infantry base defense is 8; the survivor ends below it.
        let battle = setup(
            vec![
                (1, vec![unit(1, 5.0, 20.0)]),
                (2, vec![unit(2, 0.0, 8.0)]),
            ],
            None,
            BattleType::Attack,
        );
        let report = resolve_battle(battle, &mut rng());

        let survivor = &report.survivors[&PlayerId(2)][0];
        assert!(survivor.injured);
        assert_eq!(survivor.defense, 3.0);
        // The uninjured side keeps its stats.
        assert!(!report.survivors[&PlayerId(1)][0].injured);
    }

    #[test]
    fn injured_survivor_offense_is_halved() {
        let mut defender = unit(2, 6.0, 8.0);
        defender.melee = 4.0;
        let battle = setup(
            vec![(1, vec![unit(1, 5.0, 20.0)]), (2, vec![defender])],
            None,
            BattleType::Attack,
        );
        let report = resolve_battle(battle, &mut rng());

        let survivor = &report.survivors[&PlayerId(2)][0];
        assert!(survivor.injured);
        assert_eq!(survivor.attack, 3.0);
        // The melee pool was fully spent in its phase, so redistribution
        // left nothing for the injury multiplier to halve.
        assert_eq!(survivor.melee, 0.0);
    }

    #[test]
    fn ranged_phase_resolves_before_attack() {
        // The archer kills the swordsman in the ranged phase; the swordsman
        // never reaches the attack phase, so the archer takes no damage.
        // 12 ranged points land as 10.8 effective against infantry's 0.10
        // ranged resistance, enough for the 10-toughness kill.
        let mut archer = unit(1, 0.0, 4.0);
        archer.ranged = 12.0;
        let battle = setup(
            vec![(1, vec![archer]), (2, vec![unit(2, 50.0, 10.0)])],
            None,
            BattleType::Attack,
        );
        let report = resolve_battle(battle, &mut rng());

        assert_eq!(report.winner, Some(PlayerId(1)));
        assert_eq!(report.survivors[&PlayerId(1)][0].defense, 4.0);
    }

    #[test]
    fn always_evading_defender_forces_a_second_ranged_round() {
        // Evasion 100 evades every volley: round one leaves leftover, so a
        // second ranged round fires and charges toughness again.
        let mut archer = unit(1, 0.0, 30.0);
        archer.ranged = 12.0;
        let mut ghost = unit(2, 0.0, 5.0);
        ghost.evasion = 100;

        let battle = setup(
            vec![(1, vec![archer]), (2, vec![ghost])],
            None,
            BattleType::Attack,
        );
        let report = resolve_battle(battle, &mut rng());

        // Neither side can finish the other: stalemate.
        assert_eq!(report.winner, None);
        assert_eq!(report.survivors[&PlayerId(2)][0].defense, 5.0);
        // Rounds one and two spent 5 toughness each from the 12-point pool,
        // leaving the archer's ranged stat at the remaining 2.
        assert_eq!(report.survivors[&PlayerId(1)][0].ranged, 2.0);
    }

    #[test]
    fn occupation_setup_reports_sole_party_as_winner() {
        let battle = setup(
            vec![(1, vec![unit(1, 10.0, 10.0)])],
            None,
            BattleType::Occupation,
        );
        let report = resolve_battle(battle, &mut rng());
        assert_eq!(report.winner, Some(PlayerId(1)));
        assert_eq!(report.survivors[&PlayerId(1)].len(), 1);
    }

    #[test]
    fn multi_party_battle_engages_owner_last() {
        // Player 3 owns the sector. The two invaders fight first; the
        // winner then meets the garrison.
        let battle = setup(
            vec![
                (3, vec![unit(30, 0.0, 10.0)]),
                (1, vec![unit(10, 100.0, 50.0)]),
                (2, vec![unit(20, 0.0, 10.0)]),
            ],
            Some(3),
            BattleType::MultiPlayer,
        );
        let report = resolve_battle(battle, &mut rng());

        assert_eq!(report.winner, Some(PlayerId(1)));
        assert_eq!(report.casualties[&PlayerId(2)].len(), 1);
        assert_eq!(report.casualties[&PlayerId(3)].len(), 1);
        assert_eq!(report.survivors[&PlayerId(1)].len(), 1);
    }

    #[test]
    fn stalemate_retires_challenger_and_reports_no_winner() {
        // Neither side can hurt the other: both survive, nobody wins.
        let battle = setup(
            vec![
                (1, vec![unit(1, 0.0, 10.0)]),
                (2, vec![unit(2, 0.0, 10.0)]),
            ],
            None,
            BattleType::Attack,
        );
        let report = resolve_battle(battle, &mut rng());
        assert_eq!(report.winner, None);
        assert_eq!(report.survivors[&PlayerId(1)].len(), 1);
        assert_eq!(report.survivors[&PlayerId(2)].len(), 1);
    }

    #[test]
    fn stalemate_survivors_block_an_outright_winner() {
        // Parties 1 and 2 fight to a standstill, so party 2 retires with
        // its survivors. Party 3 then crushes the incumbent, but the
        // retired survivors mean nobody holds the field alone.
        let battle = setup(
            vec![
                (1, vec![unit(1, 0.0, 10.0)]),
                (2, vec![unit(2, 0.0, 10.0)]),
                (3, vec![unit(3, 100.0, 50.0)]),
            ],
            None,
            BattleType::MultiPlayer,
        );
        let report = resolve_battle(battle, &mut rng());

        assert_eq!(report.winner, None);
        assert_eq!(report.casualties[&PlayerId(1)].len(), 1);
        assert_eq!(report.survivors[&PlayerId(2)].len(), 1);
        assert_eq!(report.survivors[&PlayerId(3)].len(), 1);
    }

    #[test]
    fn resolution_is_deterministic_without_evasion() {
        let build = || {
            setup(
                vec![
                    (1, vec![unit(1, 7.0, 9.0), unit(2, 3.0, 12.0)]),
                    (2, vec![unit(3, 6.0, 11.0), unit(4, 5.0, 8.0)]),
                ],
                None,
                BattleType::Attack,
            )
        };
        let first = resolve_battle(build(), &mut SmallRng::seed_from_u64(7));
        let second = resolve_battle(build(), &mut SmallRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn zero_deadline_reports_deadline_exceeded() {
        let battle = setup(
            vec![
                (1, vec![unit(1, 10.0, 10.0)]),
                (2, vec![unit(2, 10.0, 10.0)]),
            ],
            None,
            BattleType::Attack,
        );
        let options = BattleOptions {
            deadline: Some(Duration::ZERO),
        };
        let result = resolve_battle_with(battle, &mut rng(), &options);
        assert_eq!(result, Err(BattleError::DeadlineExceeded(SectorId(3))));
    }
}
