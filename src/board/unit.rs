//! Unit combat model.
//!
//! A unit's effective stats are derived at construction from its class base
//! line plus the additive bonuses of its equipped items. During combat the
//! stats are mutated in place (armor and defense wear down, phase stats are
//! overwritten by leftover redistribution, the injured flag is set); a unit
//! is only ever destroyed by removal from its army list.

use serde::{Deserialize, Serialize};

/// Identifies a unit. Minted by the owning board's sequence, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// The damage types exchanged during battle phases.
///
/// `Ranged` (PDF) resolves first, then `Melee` (PDC), then `Attack` (ATK).
/// The set is closed: dispatch on damage type is exhaustive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    Ranged,
    Melee,
    Attack,
}

/// The base class of a unit, supplying its stat line and resistances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    Infantry,
    Archer,
    Cavalry,
    Siege,
}

/// A full stat line: class base values and item bonuses share this shape.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatBlock {
    pub attack: f64,
    pub defense: f64,
    pub ranged: f64,
    pub melee: f64,
    pub armor: f64,
    pub evasion: u8,
}

impl UnitClass {
    /// Returns the unmodified stat line for this class.
    pub const fn base(self) -> StatBlock {
        match self {
            UnitClass::Infantry => StatBlock {
                attack: 6.0,
                defense: 8.0,
                ranged: 0.0,
                melee: 4.0,
                armor: 2.0,
                evasion: 0,
            },
            UnitClass::Archer => StatBlock {
                attack: 3.0,
                defense: 4.0,
                ranged: 6.0,
                melee: 1.0,
                armor: 0.0,
                evasion: 10,
            },
            UnitClass::Cavalry => StatBlock {
                attack: 8.0,
                defense: 6.0,
                ranged: 0.0,
                melee: 6.0,
                armor: 1.0,
                evasion: 15,
            },
            UnitClass::Siege => StatBlock {
                attack: 10.0,
                defense: 3.0,
                ranged: 8.0,
                melee: 0.0,
                armor: 4.0,
                evasion: 0,
            },
        }
    }

    /// Fraction of incoming damage of the given kind this class shrugs off.
    ///
    /// Always in `[0, 1)`; classes without a listed resistance take full damage.
    pub const fn resistance(self, kind: DamageKind) -> f64 {
        match (self, kind) {
            (UnitClass::Infantry, DamageKind::Ranged) => 0.10,
            (UnitClass::Infantry, DamageKind::Melee) => 0.25,
            (UnitClass::Archer, DamageKind::Ranged) => 0.30,
            (UnitClass::Cavalry, DamageKind::Ranged) => 0.15,
            (UnitClass::Cavalry, DamageKind::Melee) => 0.10,
            (UnitClass::Siege, DamageKind::Attack) => 0.20,
            _ => 0.0,
        }
    }
}

/// An equipped item granting additive stat bonuses.
///
/// The shopping layer that assigns items is external; this crate only folds
/// the bonuses into the unit's derived stats at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub bonus: StatBlock,
}

/// Multiplier applied to a unit's attack, ranged, and melee stats when it is
/// converted to the injured state.
pub const INJURED_STAT_MULTIPLIER: f64 = 0.5;

/// A military unit, reduced to its combat-relevant slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub class: UnitClass,
    pub attack: f64,
    pub defense: f64,
    pub ranged: f64,
    pub melee: f64,
    pub armor: f64,
    /// Chance in percent (0..=100) to evade a volley targeting this unit.
    pub evasion: u8,
    pub injured: bool,
}

impl Unit {
    /// Creates a unit with its class base stats and no equipment.
    pub fn new(id: UnitId, class: UnitClass) -> Self {
        Self::outfitted(id, class, &[])
    }

    /// Creates a unit with class base stats plus the given items' bonuses.
    ///
    /// Evasion is additive and saturates at 100.
    pub fn outfitted(id: UnitId, class: UnitClass, items: &[Item]) -> Self {
        let base = class.base();
        let mut unit = Unit {
            id,
            class,
            attack: base.attack,
            defense: base.defense,
            ranged: base.ranged,
            melee: base.melee,
            armor: base.armor,
            evasion: base.evasion,
            injured: false,
        };
        for item in items {
            unit.attack += item.bonus.attack;
            unit.defense += item.bonus.defense;
            unit.ranged += item.bonus.ranged;
            unit.melee += item.bonus.melee;
            unit.armor += item.bonus.armor;
            unit.evasion = unit.evasion.saturating_add(item.bonus.evasion).min(100);
        }
        unit
    }

    /// Returns the stat this unit contributes to a phase of the given kind.
    pub fn stat(&self, kind: DamageKind) -> f64 {
        match kind {
            DamageKind::Ranged => self.ranged,
            DamageKind::Melee => self.melee,
            DamageKind::Attack => self.attack,
        }
    }

    /// Overwrites the stat backing a phase of the given kind.
    pub fn set_stat(&mut self, kind: DamageKind, value: f64) {
        match kind {
            DamageKind::Ranged => self.ranged = value,
            DamageKind::Melee => self.melee = value,
            DamageKind::Attack => self.attack = value,
        }
    }

    /// Fraction of incoming damage of the given kind this unit resists.
    pub fn resistance(&self, kind: DamageKind) -> f64 {
        self.class.resistance(kind)
    }

    /// Remaining points needed to destroy this unit, before resistance.
    pub fn toughness(&self) -> f64 {
        self.defense + self.armor
    }

    /// The defense value this unit's class starts with, used to detect
    /// battle damage when converting survivors to the injured state.
    pub fn base_defense(&self) -> f64 {
        self.class.base().defense
    }

    /// Converts this unit to the injured state, halving its offensive stats.
    ///
    /// Defense and armor keep their battle-worn values. Idempotent via the
    /// `injured` flag: a unit is never degraded twice.
    pub fn mark_injured(&mut self) {
        if self.injured {
            return;
        }
        self.injured = true;
        self.attack *= INJURED_STAT_MULTIPLIER;
        self.ranged *= INJURED_STAT_MULTIPLIER;
        self.melee *= INJURED_STAT_MULTIPLIER;
    }
}
