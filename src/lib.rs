//! pnlview - brokerage profit/loss viewer
//!
//! This library fetches an account/position snapshot from a remote gateway
//! and transforms it into per-account profit/loss views: a reconciled
//! "current" record per account and per-account daily/cumulative P/L series.

pub mod config;
pub mod error;
pub mod fetch;
pub mod reconcile;
pub mod series;
pub mod snapshot;
pub mod utils;
