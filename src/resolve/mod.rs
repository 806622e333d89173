//! Turn resolution.
//!
//! Resolves a set of simultaneous movement orders into executed moves and
//! pending battles: validation, instant/deferred classification, crossing
//! cancellation, interception, execution, and battle aggregation.

pub mod aggregate;
pub mod conflict;
pub mod execute;
pub mod validate;

pub use aggregate::{aggregate_battles, classify_battle, BattleSetup, BattleType};
pub use conflict::{cancel_crossings, check_interceptions};
pub use execute::{execute_move, resolve_turn};
pub use validate::{classify_orders, validate_orders};
