//! Financials subsystem — spectrum, tax, profit and total cost per region.
//!
//! Runs after site costs. Reads `network_cost` and writes
//! `spectrum_cost`, `tax`, `profit_margin`, `total_cost` and `bcr`.
//!
//! The benefit-cost ratio compares revenue with total cost only. It does
//! not change when cross-subsidy is later allocated to the region.

use crate::{
    config::{AssessmentConfig, CountryParameters, Financials},
    error::CostResult,
    event::AssessmentEvent,
    region::AssessedRegion,
    stage::{AssessmentStage, StageOutput},
    strategy::{Generation, Strategy, Tier},
    types::Usd,
};
use std::any::Any;

/// Licence cost of the generation's spectrum for the region's population.
///
/// Population is rounded to a whole number of people first.
pub fn spectrum_cost(
    population: f64,
    generation: Generation,
    tier: Tier,
    country: &CountryParameters,
) -> CostResult<Usd> {
    let population = population.round_ties_even();
    let financials = &country.financials;

    let mut cost = 0.0;
    for block in country.frequencies(generation)? {
        let bandwidth = block.total_bandwidth_mhz()?;
        let price = if block.is_coverage() {
            financials.spectrum_coverage_baseline_usd_mhz_pop
        } else {
            financials.spectrum_capacity_baseline_usd_mhz_pop
        };
        cost += price * bandwidth * population;
    }

    Ok(match tier {
        Tier::Baseline => cost,
        Tier::Low      => cost * (financials.spectrum_cost_low / 100.0),
        Tier::High     => cost * (financials.spectrum_cost_high / 100.0),
    })
}

pub fn calculate_tax(network_cost: Usd, tier: Tier, financials: &Financials) -> Usd {
    network_cost * (financials.tax_rate(tier) / 100.0)
}

pub fn calculate_profit(network_cost: Usd, spectrum_cost: Usd, tax: Usd, financials: &Financials) -> Usd {
    (network_cost + spectrum_cost + tax) * (financials.profit_margin / 100.0)
}

/// Revenue per dollar of total cost; `None` when there is no cost.
pub fn benefit_cost_ratio(total_revenue: Usd, total_cost: Usd) -> Option<f64> {
    if total_cost == 0.0 {
        None
    } else {
        Some(total_revenue / total_cost)
    }
}

/// Price one region. Pure: returns a new record.
pub fn price_region(
    mut region: AssessedRegion,
    generation: Generation,
    spectrum_tier: Tier,
    tax_tier: Tier,
    country: &CountryParameters,
) -> CostResult<AssessedRegion> {
    let financials = &country.financials;
    let network = region.network_cost();

    let spectrum = spectrum_cost(region.region.population, generation, spectrum_tier, country)?;
    let tax = calculate_tax(network, tax_tier, financials);
    let profit = calculate_profit(network, spectrum, tax, financials);

    region.spectrum_cost = spectrum;
    region.tax = tax;
    region.profit_margin = profit;
    region.total_cost = network + spectrum + tax + profit;
    region.bcr = benefit_cost_ratio(region.region.total_revenue, region.total_cost);
    Ok(region)
}

// ── Subsystem ──────────────────────────────────────────────────────

pub struct FinancialsSubsystem {
    strategy: Strategy,
    config:   AssessmentConfig,
}

impl FinancialsSubsystem {
    pub fn new(strategy: Strategy, config: AssessmentConfig) -> Self {
        Self { strategy, config }
    }
}

impl AssessmentStage for FinancialsSubsystem {
    fn name(&self) -> &'static str {
        "financials"
    }

    fn update(&mut self, regions: Vec<AssessedRegion>) -> CostResult<StageOutput> {
        let mut out = StageOutput::with_capacity(regions.len());
        let generation = self.strategy.generation;

        // A strategy without tier tokens cannot price any region.
        let tiers = self
            .strategy
            .spectrum_tier()
            .and_then(|spectrum| self.strategy.tax_tier().map(|tax| (spectrum, tax)));
        let (spectrum_tier, tax_tier) = match tiers {
            Ok(tiers) => tiers,
            Err(e) => {
                let reason = e.to_string();
                for region in &regions {
                    out.fail(self.name(), region.gid_id(), &reason);
                }
                return Ok(out);
            }
        };

        for region in regions {
            let gid_id = region.gid_id().to_string();
            match price_region(region, generation, spectrum_tier, tax_tier, &self.config.country) {
                Ok(priced) => {
                    log::debug!(
                        "{gid_id}: spectrum={:.2} tax={:.2} profit={:.2} total={:.2} bcr={:?}",
                        priced.spectrum_cost,
                        priced.tax,
                        priced.profit_margin,
                        priced.total_cost,
                        priced.bcr,
                    );
                    out.events.push(AssessmentEvent::RegionPriced {
                        gid_id,
                        spectrum_cost: priced.spectrum_cost,
                        tax:           priced.tax,
                        profit_margin: priced.profit_margin,
                        total_cost:    priced.total_cost,
                    });
                    out.regions.push(priced);
                }
                Err(e) => out.fail(self.name(), &gid_id, e),
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
    fn zero_cost_has_no_ratio() {
        assert_eq!(benefit_cost_ratio(1000.0, 0.0), None);
        assert_eq!(benefit_cost_ratio(0.0, 0.0), None);
        assert_eq!(benefit_cost_ratio(500.0, 1000.0), Some(0.5));
    }

    #[test]
    fn population_rounds_half_to_even() {
        let mut country = AssessmentConfig::default_test().country;
        country.frequencies.insert(
            "4G".into(),
            vec![crate::config::FrequencyBlock { frequency: 800.0, bandwidth: "1x1".into() }],
        );
        assert_eq!(spectrum_cost(2.5, Generation::FourG, Tier::Baseline, &country).unwrap(), 2.0);
        assert_eq!(spectrum_cost(3.5, Generation::FourG, Tier::Baseline, &country).unwrap(), 4.0);
    }

    #[test]
    fn capacity_price_applies_from_1000_mhz() {
        let mut country = AssessmentConfig::default_test().country;
        country.financials.spectrum_capacity_baseline_usd_mhz_pop = 3.0;
        country.frequencies.insert(
            "4G".into(),
            vec![crate::config::FrequencyBlock { frequency: 1000.0, bandwidth: "2x5".into() }],
        );
        assert_eq!(spectrum_cost(100.0, Generation::FourG, Tier::Baseline, &country).unwrap(), 3000.0);
    }
}
