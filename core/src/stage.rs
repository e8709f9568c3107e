//! Stage trait — the contract between the engine and each engine stage.
//!
//! RULE: Every stage implements AssessmentStage.
//! The engine calls update() on each registered stage once per run,
//! in registration order.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    error::CostResult,
    event::AssessmentEvent,
    region::AssessedRegion,
    types::RegionId,
};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// A region dropped from the batch by a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFailure {
    pub gid_id: RegionId,
    pub stage:  String,
    pub reason: String,
}

/// What a stage hands back to the engine.
#[derive(Debug, Default)]
pub struct StageOutput {
    /// Regions that passed the stage, in input order.
    pub regions:  Vec<AssessedRegion>,
    /// Regions the stage could not assess. They take no further part in the run.
    pub failures: Vec<RegionFailure>,
    pub events:   Vec<AssessmentEvent>,
}

impl StageOutput {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            regions:  Vec::with_capacity(n),
            failures: Vec::new(),
            events:   Vec::new(),
        }
    }

    /// Record a per-region error and move on.
    pub fn fail(&mut self, stage: &str, gid_id: &str, reason: impl ToString) {
        let reason = reason.to_string();
        log::warn!("{stage}: region {gid_id} failed: {reason}");
        self.failures.push(RegionFailure {
            gid_id: gid_id.to_string(),
            stage:  stage.to_string(),
            reason,
        });
    }
}

/// The contract every stage must fulfill.
pub trait AssessmentStage: Send {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// Called once per run by the engine with every surviving region.
    ///
    /// Returns the augmented regions. An `Err` aborts the whole run and is
    /// reserved for batch-level faults; per-region errors go in
    /// `StageOutput::failures`.
    fn update(&mut self, regions: Vec<AssessedRegion>) -> CostResult<StageOutput>;

    /// For downcasting in tests and tooling only.
    fn as_any(&self) -> &dyn Any;
}
