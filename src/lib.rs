//! Vanguard engine library.
//!
//! Resolves one turn's worth of simultaneous movement orders across a graph
//! of territorial sectors, then computes the outcome of the resulting
//! battles. Exposes the board representation, the turn resolver, the combat
//! resolver, and the order intake helpers for use by an external
//! turn-processing service.

pub mod board;
pub mod combat;
pub mod protocol;
pub mod resolve;
