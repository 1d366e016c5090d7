//! Command handlers, one module per command group

pub mod backup;
pub mod config;
pub mod record;
pub mod stats;
pub mod status;
pub mod transfer;
