//! Deterministic keyword-rule bucket classification.
//!
//! `bucket-core` assigns every record one code per category group (`main`,
//! `personality`) by counting keyword hits in the record's tags, and drives
//! that classification over an unbounded record store in committed pages.
//! Identical tags and rules always produce identical codes; ties resolve by
//! the group's declared category order.

pub mod batch;
pub mod classify;
pub mod record;
pub mod rules;
pub mod types;
