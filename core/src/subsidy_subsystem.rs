//! Subsidy subsystem — cross-subsidy pooling and state subsidy.
//!
//! Phase 1 (per region, independent): surplus = revenue − total cost.
//! A positive surplus is available to the national pool; otherwise its
//! magnitude is the region's deficit.
//!
//! Phase 2 (sequential over the whole country): the pool is depleted
//! across deficit regions in the configured order. Whatever the pool
//! cannot cover becomes required state subsidy.
//!
//! RULES:
//!   - A region never has both available cross-subsidy and a deficit.
//!   - The pool is never over-allocated: Σ used ≤ Σ available.
//!   - Output order always equals input order, whatever the depletion order.

use crate::{
    error::CostResult,
    event::AssessmentEvent,
    region::AssessedRegion,
    stage::{AssessmentStage, StageOutput},
    types::Usd,
};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Order in which deficit regions draw on the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepletionOrder {
    /// First come, first served in input order.
    #[default]
    InputOrder,
    /// Smallest deficits are covered first; ties keep input order.
    SmallestDeficitFirst,
    /// Every deficit is covered by the same fraction, capped at 1.
    Proportional,
}

/// Country-level result of one allocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubsidyState {
    pub depletion_order:        DepletionOrder,
    /// Σ available cross-subsidy before depletion.
    pub pool:                   Usd,
    pub total_deficit:          Usd,
    pub used_cross_subsidy:     Usd,
    pub pool_remaining:         Usd,
    pub required_state_subsidy: Usd,
}

/// Phase 1: split a region's surplus into available excess or deficit.
pub fn allocate_available_excess(mut region: AssessedRegion) -> AssessedRegion {
    let surplus = region.region.total_revenue - region.total_cost;
    if surplus > 0.0 {
        region.available_cross_subsidy = surplus;
        region.deficit = 0.0;
    } else {
        region.available_cross_subsidy = 0.0;
        region.deficit = surplus.abs();
    }
    region
}

/// Phase 2 step: cover as much of the region's deficit as the pool allows.
/// Returns the updated region and what is left in the pool.
pub fn estimate_subsidies(mut region: AssessedRegion, pool: Usd) -> (AssessedRegion, Usd) {
    let pool = cover_deficit(&mut region, pool);
    (region, pool)
}

fn cover_deficit(region: &mut AssessedRegion, pool: Usd) -> Usd {
    if region.deficit > 0.0 {
        let used = region.deficit.min(pool);
        region.used_cross_subsidy = used;
        region.required_state_subsidy = region.deficit - used;
        pool - used
    } else {
        region.used_cross_subsidy = 0.0;
        region.required_state_subsidy = 0.0;
        pool
    }
}

/// One draw on the pool: which region was served and what it left.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Draw {
    index:          usize,
    pool_remaining: Usd,
}

/// Run both phases over a country. Pure: the input is consumed and an
/// augmented copy returned in the same order.
pub fn allocate(regions: Vec<AssessedRegion>, order: DepletionOrder) -> (Vec<AssessedRegion>, SubsidyState) {
    let (regions, state, _) = allocate_with_draws(regions, order);
    (regions, state)
}

/// As `allocate`, also returning the draws in the order they were made.
fn allocate_with_draws(
    regions: Vec<AssessedRegion>,
    order: DepletionOrder,
) -> (Vec<AssessedRegion>, SubsidyState, Vec<Draw>) {
    let mut regions: Vec<AssessedRegion> = regions.into_iter().map(allocate_available_excess).collect();

    let pool: Usd = regions.iter().map(|r| r.available_cross_subsidy).sum();
    let total_deficit: Usd = regions.iter().map(|r| r.deficit).sum();
    let mut remaining = pool;
    let mut draws = Vec::new();

    match order {
        DepletionOrder::InputOrder => {
            for (index, region) in regions.iter_mut().enumerate() {
                remaining = cover_deficit(region, remaining);
                if region.deficit > 0.0 {
                    draws.push(Draw { index, pool_remaining: remaining });
                }
            }
        }
        DepletionOrder::SmallestDeficitFirst => {
            let mut visit: Vec<usize> = (0..regions.len()).collect();
            visit.sort_by(|&a, &b| regions[a].deficit.total_cmp(&regions[b].deficit));
            for index in visit {
                remaining = cover_deficit(&mut regions[index], remaining);
                if regions[index].deficit > 0.0 {
                    draws.push(Draw { index, pool_remaining: remaining });
                }
            }
        }
        DepletionOrder::Proportional => {
            let share = if total_deficit > 0.0 { (pool / total_deficit).min(1.0) } else { 0.0 };
            for (index, region) in regions.iter_mut().enumerate() {
                let used = (region.deficit * share).min(remaining);
                region.used_cross_subsidy = used;
                region.required_state_subsidy = region.deficit - used;
                remaining -= used;
                if region.deficit > 0.0 {
                    draws.push(Draw { index, pool_remaining: remaining });
                }
            }
        }
    }

    let state = SubsidyState {
        depletion_order:        order,
        pool,
        total_deficit,
        used_cross_subsidy:     regions.iter().map(|r| r.used_cross_subsidy).sum(),
        pool_remaining:         remaining,
        required_state_subsidy: regions.iter().map(|r| r.required_state_subsidy).sum(),
    };
    (regions, state, draws)
}

// ── Subsystem ──────────────────────────────────────────────────────

pub struct SubsidySubsystem {
    order:     DepletionOrder,
    /// Result of the most recent run. Read by the engine for summaries.
    pub state: SubsidyState,
}

impl SubsidySubsystem {
    pub fn new(order: DepletionOrder) -> Self {
        Self {
            order,
            state: SubsidyState { depletion_order: order, ..Default::default() },
        }
    }
}

impl AssessmentStage for SubsidySubsystem {
    fn name(&self) -> &'static str {
        "subsidy"
    }

    fn update(&mut self, regions: Vec<AssessedRegion>) -> CostResult<StageOutput> {
        let (regions, state, draws) = allocate_with_draws(regions, self.order);

        log::info!(
            "Cross-subsidy: pool={:.2} deficit={:.2} used={:.2} state subsidy={:.2} ({:?})",
            state.pool,
            state.total_deficit,
            state.used_cross_subsidy,
            state.required_state_subsidy,
            state.depletion_order,
        );

        let mut out = StageOutput::with_capacity(regions.len());
        out.events.push(AssessmentEvent::CrossSubsidyPooled {
            pool:            state.pool,
            total_deficit:   state.total_deficit,
            depletion_order: state.depletion_order,
        });

        // One event per draw, in the order the pool was drawn down.
        for draw in draws {
            let region = &regions[draw.index];
            out.events.push(AssessmentEvent::SubsidyAllocated {
                gid_id:                 region.gid_id().to_string(),
                used_cross_subsidy:     region.used_cross_subsidy,
                required_state_subsidy: region.required_state_subsidy,
                pool_remaining:         draw.pool_remaining,
            });
        }

        self.state = state;
        out.regions = regions;
        Ok(out)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
