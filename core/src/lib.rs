//! netcost-core: cellular deployment cost and subsidy assessment.
//!
//! Pipeline: strategy → cost structure → per-site costs → financials →
//! cross-subsidy allocation. See engine.rs for the stage order.

pub mod asset;
pub mod config;
pub mod cost_structure;
pub mod discount;
pub mod engine;
pub mod error;
pub mod event;
pub mod financials_subsystem;
pub mod network;
pub mod region;
pub mod site_cost_subsystem;
pub mod stage;
pub mod strategy;
pub mod subsidy_subsystem;
pub mod types;
