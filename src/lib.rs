//! pesowatch: Argentine savings monitor: fund NAVs, dollar quotes and
//! inflation consolidated into one daily table, plus compound-interest
//! projections over it.
//!
//! Hexagonal architecture: pure logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], command wiring in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
