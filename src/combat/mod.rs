//! Phase-based combat.
//!
//! Contains the volley mechanics (per-unit damage allocation, evasion,
//! resistance) and the battle resolver that drives them through the phase
//! state machine for every party in a contested sector.

pub mod resolver;
pub mod volley;

pub use resolver::{
    resolve_battle, resolve_battle_with, BattleError, BattleOptions, BattleReport,
};
pub use volley::{fire_volley, redistribute_leftover, PhaseResult};
