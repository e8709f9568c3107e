//! The assessment engine — runs one strategy over one country's regions.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Site cost subsystem    (network cost and cost buckets)
//!   2. Financials subsystem   (spectrum, tax, profit, total cost, BCR)
//!   3. Subsidy subsystem      (cross-subsidy pool and state subsidy)
//!
//! RULES:
//!   - Stages execute in registration order, once per run.
//!   - Each stage sees only the regions that survived earlier stages.
//!   - A region that fails a stage is recorded and dropped; the rest of
//!     the batch carries on.
//!   - All outcomes are recorded in the event log.

use crate::{
    config::AssessmentConfig,
    error::CostResult,
    event::{AssessmentEvent, EventLogEntry},
    financials_subsystem::FinancialsSubsystem,
    region::{AssessedRegion, Region},
    site_cost_subsystem::SiteCostSubsystem,
    stage::{AssessmentStage, RegionFailure},
    strategy::Strategy,
    subsidy_subsystem::{SubsidyState, SubsidySubsystem},
    types::{RunId, Usd},
};
use serde::{Deserialize, Serialize};

/// Country totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub regions_assessed:       usize,
    pub regions_failed:         usize,
    pub network_cost:           Usd,
    pub total_cost:             Usd,
    pub total_revenue:          Usd,
    pub cross_subsidy_pool:     Usd,
    pub used_cross_subsidy:     Usd,
    pub required_state_subsidy: Usd,
}

impl AssessmentSummary {
    fn from_regions(regions: &[AssessedRegion], failed: usize) -> Self {
        let mut summary = Self {
            regions_assessed: regions.len(),
            regions_failed: failed,
            ..Default::default()
        };
        for r in regions {
            summary.network_cost += r.network_cost();
            summary.total_cost += r.total_cost;
            summary.total_revenue += r.region.total_revenue;
            summary.cross_subsidy_pool += r.available_cross_subsidy;
            summary.used_cross_subsidy += r.used_cross_subsidy;
            summary.required_state_subsidy += r.required_state_subsidy;
        }
        summary
    }
}

#[derive(Debug)]
pub struct AssessmentOutcome {
    pub run_id:   RunId,
    /// Assessed regions, in input order.
    pub regions:  Vec<AssessedRegion>,
    pub failures: Vec<RegionFailure>,
    pub events:   Vec<EventLogEntry>,
    pub summary:  AssessmentSummary,
}

pub struct AssessmentEngine {
    pub run_id:  RunId,
    pub country: String,
    strategy:    String,
    stages:      Vec<Box<dyn AssessmentStage>>,
    sequence:    u64,
}

impl AssessmentEngine {
    pub fn new(run_id: RunId, country: impl Into<String>, strategy: &Strategy) -> Self {
        Self {
            run_id,
            country:  country.into(),
            strategy: strategy.to_string(),
            stages:   Vec::new(),
            sequence: 0,
        }
    }

    /// Build a fully wired engine with all stages registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(
        run_id: RunId,
        country: impl Into<String>,
        strategy: Strategy,
        config: AssessmentConfig,
    ) -> Self {
        let mut engine = Self::build_from_network_costs(run_id, country, strategy.clone(), config.clone());
        // Site costs run before everything else.
        engine.stages.insert(0, Box::new(SiteCostSubsystem::new(strategy, config)));
        engine
    }

    /// Engine for regions whose `network_cost` is already known.
    /// Runs financials and subsidy allocation only.
    pub fn build_from_network_costs(
        run_id: RunId,
        country: impl Into<String>,
        strategy: Strategy,
        config: AssessmentConfig,
    ) -> Self {
        let mut engine = Self::new(run_id, country, &strategy);
        let order = config.global.depletion_order;
        engine.register(Box::new(FinancialsSubsystem::new(strategy, config)));
        engine.register(Box::new(SubsidySubsystem::new(order)));
        engine
    }

    /// Register a stage. Call in the documented execution order.
    pub fn register(&mut self, stage: Box<dyn AssessmentStage>) {
        self.stages.push(stage);
    }

    /// Assess raw regions from the upstream models.
    pub fn run(&mut self, regions: Vec<Region>) -> CostResult<AssessmentOutcome> {
        self.run_assessed(regions.into_iter().map(AssessedRegion::new).collect())
    }

    /// Assess regions that may already carry computed fields.
    pub fn run_assessed(&mut self, regions: Vec<AssessedRegion>) -> CostResult<AssessmentOutcome> {
        self.sequence = 0;
        let mut log = Vec::new();
        let mut failures = Vec::new();

        log.push(self.entry("engine", &AssessmentEvent::RunInitialized {
            run_id:   self.run_id.clone(),
            country:  self.country.clone(),
            strategy: self.strategy.clone(),
            regions:  regions.len(),
        })?);
        log::info!(
            "Run {}: assessing {} regions of {} under {}",
            self.run_id,
            regions.len(),
            self.country,
            self.strategy
        );

        let mut current = regions;
        // Index loop: `entry` needs &mut self while a stage is borrowed.
        for i in 0..self.stages.len() {
            let output = self.stages[i].update(current)?;
            let stage_name = self.stages[i].name();

            for event in &output.events {
                log.push(self.entry(stage_name, event)?);
            }
            for failure in &output.failures {
                log.push(self.entry(stage_name, &AssessmentEvent::RegionFailed {
                    gid_id: failure.gid_id.clone(),
                    stage:  failure.stage.clone(),
                    reason: failure.reason.clone(),
                })?);
            }

            failures.extend(output.failures);
            current = output.regions;
        }

        let summary = AssessmentSummary::from_regions(&current, failures.len());
        log.push(self.entry("engine", &AssessmentEvent::RunCompleted {
            run_id:   self.run_id.clone(),
            assessed: summary.regions_assessed,
            failed:   summary.regions_failed,
        })?);
        log::info!(
            "Run {} complete: {} assessed, {} failed, network cost {:.2}, state subsidy {:.2}",
            self.run_id,
            summary.regions_assessed,
            summary.regions_failed,
            summary.network_cost,
            summary.required_state_subsidy
        );

        Ok(AssessmentOutcome {
            run_id: self.run_id.clone(),
            regions: current,
            failures,
            events: log,
            summary,
        })
    }

    /// Query the SubsidySubsystem's state after the last run.
    /// Used by the runner to print end-of-run summaries.
    pub fn last_subsidy_state(&self) -> Option<&SubsidyState> {
        self.stages.iter().find_map(|stage| {
            stage
                .as_any()
                .downcast_ref::<SubsidySubsystem>()
                .map(|s| &s.state)
        })
    }

    fn entry(&mut self, stage: &str, event: &AssessmentEvent) -> CostResult<EventLogEntry> {
        self.sequence += 1;
        Ok(EventLogEntry {
            sequence:   self.sequence,
            run_id:     self.run_id.clone(),
            stage:      stage.to_string(),
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(event)?,
        })
    }
}
