//! Order analysis modules.
//!
//! Item text parsing lives in [`parser`]; grouping and totals in
//! [`aggregator`].

pub mod aggregator;
pub mod parser;

pub use aggregator::*;
