//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_log_adapter;
pub mod file_config_adapter;
pub mod upstox_adapter;
pub mod yahoo_adapter;
