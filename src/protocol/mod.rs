//! Order intake.
//!
//! The outer turn service ships order batches as JSON arrays. This module
//! is transport only: a payload that parses is still subject to the
//! validator's structural checks, and a payload that does not parse is a
//! typed error rather than a dropped batch.

use thiserror::Error;

use crate::board::MoveOrder;

/// Errors that can occur when decoding an order payload.
#[derive(Debug, Error)]
pub enum OrderParseError {
    #[error("malformed order payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parses a JSON array of orders into a batch.
pub fn parse_orders(json: &str) -> Result<Vec<MoveOrder>, OrderParseError> {
    Ok(serde_json::from_str(json)?)
}

/// Parses a single JSON order object.
pub fn parse_order(json: &str) -> Result<MoveOrder, OrderParseError> {
    Ok(serde_json::from_str(json)?)
}

/// Encodes a batch of orders as a JSON array.
pub fn format_orders(orders: &[MoveOrder]) -> String {
    serde_json::to_string(orders).expect("order batch serialization cannot fail")
}
