//! snaptrader — daily equity snapshot collector.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], and the run pipeline in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
