//! Port traits for the collaborators the pipeline talks to.

pub mod history_port;
pub mod fundamentals_port;
pub mod record_port;
pub mod config_port;
