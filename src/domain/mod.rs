//! Core domain types and market engine logic.

pub mod user;
pub mod market;
pub mod trade;
pub mod pricing;
pub mod position;
pub mod settlement;
pub mod executor;
pub mod resolution;
pub mod feed;
pub mod error;
