//! Site cost subsystem — per-site classification and regional accumulation.
//!
//! For each site of a region the subsystem picks a build path, takes the
//! path's cost structure, classifies every item by cost type, discounts
//! it and rolls it into one of the five cost buckets.
//!
//! Site loop: sites are numbered 1..=upgraded+new. The first
//! `upgraded_sites` follow the upgrade path, the rest are greenfield.
//! The first `backhaul_new` sites pay for a backhaul link.
//!
//! RULES:
//!   - Backhaul is skipped for sites without a new link.
//!   - Regional edges and nodes are skipped under microwave backhaul.
//!   - Integration trims most items by the regional integration factor;
//!     spectrum acquisition and administration are halved instead.
//!   - Core and regional items are spread over all of the region's sites
//!     after discounting.
//!   - Bucket totals are summed site by site, in site order.

use crate::{
    asset::{Asset, CostBucket, CostBuckets, CostType},
    config::AssessmentConfig,
    cost_structure::{BuildPath, CostStructure},
    discount::{discount_capex_and_opex, discount_opex},
    error::CostResult,
    event::AssessmentEvent,
    network::CostCondition,
    region::{AssessedRegion, NetworkCost, Region},
    stage::{AssessmentStage, StageOutput},
    strategy::{BackhaulMedium, Integration, Strategy},
    types::Usd,
};
use std::any::Any;

/// 1 when site `site` (1-based) gets a new backhaul link, else 0.
pub fn backhaul_quantity(site: u32, backhaul_new: u32) -> u32 {
    if site <= backhaul_new { 1 } else { 0 }
}

/// Per-site inputs that stay fixed across a region.
#[derive(Debug, Clone, Copy)]
pub struct SiteContext<'a> {
    pub strategy:    &'a Strategy,
    pub config:      &'a AssessmentConfig,
    pub integration: Integration,
    /// Upgraded plus new sites in the region.
    pub total_sites: u32,
}

/// Discounted, adjusted cost of one item for one site, or `None` when the
/// item does not apply to this site.
pub fn classify_item(
    asset: Asset,
    cost: Usd,
    backhaul_quantity: u32,
    ctx: &SiteContext<'_>,
) -> Option<Usd> {
    if asset == Asset::Backhaul && backhaul_quantity == 0 {
        return None;
    }
    if asset.is_regional() && ctx.strategy.backhaul == BackhaulMedium::Microwave {
        return None;
    }

    let global = &ctx.config.global;
    let wacc = ctx.config.country.financials.wacc;
    let integrated = ctx.integration == Integration::Integration;
    let integration_share = 1.0 - global.regional_integration_factor / 100.0;

    let cost = match asset.cost_type() {
        CostType::CapexAndOpex => {
            let mut cost = discount_capex_and_opex(cost, global, wacc);
            if integrated {
                cost *= integration_share;
            }
            if asset == Asset::SingleSectorAntenna {
                cost *= global.sectorization;
            }
            if asset.network_asset().is_some() {
                cost /= f64::from(ctx.total_sites);
            }
            cost
        }
        CostType::Capex => {
            if integrated && asset == Asset::PerSiteSpectrumAcquisitionCost {
                cost / 2.0
            } else if integrated {
                cost * integration_share
            } else {
                cost
            }
        }
        CostType::Opex => {
            let cost = discount_opex(cost, global, wacc);
            if integrated && asset == Asset::PerSiteAdministrationCost {
                cost / 2.0
            } else if integrated {
                cost * integration_share
            } else {
                cost
            }
        }
    };
    Some(cost)
}

/// Bucket totals for a single site built from `structure`.
pub fn calc_costs(
    structure: &CostStructure,
    backhaul_quantity: u32,
    ctx: &SiteContext<'_>,
) -> CostBuckets {
    let mut buckets = CostBuckets::default();
    for &(asset, cost) in &structure.items {
        if let Some(cost) = classify_item(asset, cost, backhaul_quantity, ctx) {
            buckets.add_item(asset.bucket(), cost);
        }
    }
    buckets
}

/// Network cost of a region under `strategy`, plus any conditions raised
/// while resolving its cost structures.
pub fn network_cost(
    region: &Region,
    strategy: &Strategy,
    config: &AssessmentConfig,
) -> CostResult<(NetworkCost, Vec<CostCondition>)> {
    let total_sites = region.total_sites()?;
    if total_sites == 0 {
        return Ok((NetworkCost::default(), Vec::new()));
    }

    let ctx = SiteContext {
        strategy,
        config,
        integration: region.effective_integration(strategy)?,
        total_sites,
    };

    // Each path's structure depends only on the region, so build it once.
    let upgrade = if region.upgraded_sites > 0 {
        let path = BuildPath::for_site(strategy.generation, true);
        Some(CostStructure::build(path, region, strategy, config)?)
    } else {
        None
    };
    let greenfield = if region.new_sites > 0 {
        let path = BuildPath::for_site(strategy.generation, false);
        Some(CostStructure::build(path, region, strategy, config)?)
    } else {
        None
    };

    let mut totals = CostBuckets::default();
    for site in 1..=total_sites {
        let structure = if site <= region.upgraded_sites {
            upgrade.as_ref()
        } else {
            greenfield.as_ref()
        };
        if let Some(structure) = structure {
            let site_buckets = calc_costs(structure, backhaul_quantity(site, region.backhaul_new), &ctx);
            totals.accumulate(&site_buckets);
        }
    }

    let mut conditions: Vec<CostCondition> = Vec::new();
    for condition in upgrade.iter().chain(greenfield.iter()).flat_map(|s| s.conditions.iter()) {
        if !conditions.contains(condition) {
            conditions.push(condition.clone());
        }
    }

    Ok((NetworkCost::from_buckets(totals), conditions))
}

// ── Subsystem ──────────────────────────────────────────────────────

pub struct SiteCostSubsystem {
    strategy: Strategy,
    config:   AssessmentConfig,
}

impl SiteCostSubsystem {
    pub fn new(strategy: Strategy, config: AssessmentConfig) -> Self {
        Self { strategy, config }
    }
}

impl AssessmentStage for SiteCostSubsystem {
    fn name(&self) -> &'static str {
        "site_cost"
    }

    fn update(&mut self, regions: Vec<AssessedRegion>) -> CostResult<StageOutput> {
        let mut out = StageOutput::with_capacity(regions.len());

        for mut assessed in regions {
            let costed = assessed
                .region
                .total_sites()
                .and_then(|sites| {
                    network_cost(&assessed.region, &self.strategy, &self.config).map(|costed| (sites, costed))
                });
            match costed {
                Ok((sites, (cost, conditions))) => {
                    log::debug!(
                        "{}: {} sites, ran={:.2} backhaul={:.2} civils={:.2} core={:.2} admin={:.2} total={:.2}",
                        assessed.gid_id(),
                        sites,
                        cost.buckets.get(CostBucket::Ran),
                        cost.buckets.get(CostBucket::BackhaulFronthaul),
                        cost.buckets.get(CostBucket::Civils),
                        cost.buckets.get(CostBucket::CoreNetwork),
                        cost.buckets.get(CostBucket::AdminAndOps),
                        cost.network_cost,
                    );
                    out.events.push(AssessmentEvent::RegionCosted {
                        gid_id:       assessed.gid_id().to_string(),
                        sites,
                        network_cost: cost.network_cost,
                    });
                    for condition in &conditions {
                        out.events.push(AssessmentEvent::UnrecognizedTechnology {
                            gid_id:    assessed.gid_id().to_string(),
                            condition: condition.clone(),
                        });
                    }
                    assessed.network = cost;
                    assessed.conditions.extend(conditions);
                    out.regions.push(assessed);
                }
                Err(e) => out.fail(self.name(), assessed.gid_id(), e),
            }
        }

        Ok(out)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backhaul_goes_to_the_first_sites() {
        assert_eq!(backhaul_quantity(1, 2), 1);
        assert_eq!(backhaul_quantity(2, 2), 1);
        assert_eq!(backhaul_quantity(3, 2), 0);
        assert_eq!(backhaul_quantity(1, 0), 0);
    }

    #[test]
    fn microwave_skips_regional_items() {
        let config = AssessmentConfig::default_test();
        let strategy = Strategy::parse("4G_epc_microwave_baseline_baseline_baseline_baseline_baseline").unwrap();
        let ctx = SiteContext {
            strategy: &strategy,
            config: &config,
            integration: Integration::Baseline,
            total_sites: 1,
        };
        assert_eq!(classify_item(Asset::RegionalEdge, 5000.0, 1, &ctx), None);
        assert_eq!(classify_item(Asset::RegionalNode, 5000.0, 1, &ctx), None);
        assert!(classify_item(Asset::CoreNode, 5000.0, 1, &ctx).is_some());
        assert_eq!(classify_item(Asset::Backhaul, 5000.0, 0, &ctx), None);
    }

    #[test]
    fn capex_items_are_not_discounted() {
        let config = AssessmentConfig::default_test();
        let strategy = Strategy::parse("4G_epc_fiber_baseline_baseline").unwrap();
        let mut ctx = SiteContext {
            strategy: &strategy,
            config: &config,
            integration: Integration::Baseline,
            total_sites: 1,
        };
        assert_eq!(classify_item(Asset::Tower, 10_000.0, 1, &ctx), Some(10_000.0));

        ctx.integration = Integration::Integration;
        assert_eq!(classify_item(Asset::Tower, 10_000.0, 1, &ctx), Some(9_000.0));
        assert_eq!(classify_item(Asset::PerSiteSpectrumAcquisitionCost, 1_000.0, 1, &ctx), Some(500.0));
    }

    #[test]
    fn empty_region_costs_nothing() {
        let config = AssessmentConfig::default_test();
        let strategy = Strategy::parse("4G_epc_fiber_baseline_baseline").unwrap();
        let region = Region {
            gid_id:         "MWI.1.1.1_1".into(),
            geotype:        "urban".into(),
            area_km2:       2.0,
            population:     10_000.0,
            new_sites:      0,
            upgraded_sites: 0,
            backhaul_new:   0,
            integration:    None,
            total_revenue:  0.0,
            extra:          Default::default(),
        };
        let (cost, conditions) = network_cost(&region, &strategy, &config).unwrap();
        assert_eq!(cost.network_cost, 0.0);
        assert!(conditions.is_empty());
    }
}
