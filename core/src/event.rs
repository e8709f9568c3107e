//! The assessment event log — an ordered record of what each stage did.
//!
//! RULE: Stages report outcomes ONLY through events and failures.
//! A stage may never call another stage's functions directly.
//! Events are informational; no stage reads another stage's events to
//! decide a number.

use crate::{
    network::CostCondition,
    subsidy_subsystem::DepletionOrder,
    types::{RegionId, RunId, Usd},
};
use serde::{Deserialize, Serialize};

/// Every event emitted during an assessment run.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssessmentEvent {
    // ── Engine events ──────────────────────────────
    RunInitialized {
        run_id:   RunId,
        country:  String,
        strategy: String,
        regions:  usize,
    },
    RunCompleted {
        run_id:    RunId,
        assessed:  usize,
        failed:    usize,
    },
    RegionFailed {
        gid_id: RegionId,
        stage:  String,
        reason: String,
    },

    // ── Site cost events ───────────────────────────
    RegionCosted {
        gid_id:       RegionId,
        sites:        u32,
        network_cost: Usd,
    },
    UnrecognizedTechnology {
        gid_id:    RegionId,
        condition: CostCondition,
    },

    // ── Financials events ──────────────────────────
    RegionPriced {
        gid_id:        RegionId,
        spectrum_cost: Usd,
        tax:           Usd,
        profit_margin: Usd,
        total_cost:    Usd,
    },

    // ── Subsidy events ─────────────────────────────
    CrossSubsidyPooled {
        pool:            Usd,
        total_deficit:   Usd,
        depletion_order: DepletionOrder,
    },
    SubsidyAllocated {
        gid_id:                 RegionId,
        used_cross_subsidy:     Usd,
        required_state_subsidy: Usd,
        pool_remaining:         Usd,
    },
}

impl AssessmentEvent {
    /// Stable name for the `event_type` field of a log entry.
    pub fn type_name(&self) -> &'static str {
        match self {
            AssessmentEvent::RunInitialized { .. }         => "run_initialized",
            AssessmentEvent::RunCompleted { .. }           => "run_completed",
            AssessmentEvent::RegionFailed { .. }           => "region_failed",
            AssessmentEvent::RegionCosted { .. }           => "region_costed",
            AssessmentEvent::UnrecognizedTechnology { .. } => "unrecognized_technology",
            AssessmentEvent::RegionPriced { .. }           => "region_priced",
            AssessmentEvent::CrossSubsidyPooled { .. }     => "cross_subsidy_pooled",
            AssessmentEvent::SubsidyAllocated { .. }       => "subsidy_allocated",
        }
    }
}

/// One entry of a run's event log, as written by the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub sequence:   u64,
    pub run_id:     RunId,
    pub stage:      String,
    pub event_type: String,
    pub payload:    String, // JSON-serialized AssessmentEvent
}
