//! Port traits decoupling domain logic from concrete adapters.

pub mod config_port;
pub mod ledger_port;
