//! Shared utilities.
//!
//! Path helpers used across the crate, plus test helpers.

pub mod paths;

#[cfg(test)]
pub mod testutil;
