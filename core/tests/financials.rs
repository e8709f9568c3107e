//! Financials tests — spectrum, tax, profit and benefit-cost ratio.

use netcost_core::{
    config::AssessmentConfig,
    financials_subsystem::{
        benefit_cost_ratio, calculate_profit, calculate_tax, price_region, spectrum_cost,
    },
    region::{AssessedRegion, Region},
    strategy::{Generation, Tier},
};

fn region(population: f64, revenue: f64) -> Region {
    Region {
        gid_id:         "MWI.1.1.1_1".into(),
        geotype:        "urban".into(),
        area_km2:       2.0,
        population,
        new_sites:      1,
        upgraded_sites: 0,
        backhaul_new:   0,
        integration:    None,
        total_revenue:  revenue,
        extra:          Default::default(),
    }
}

#[test]
fn baseline_spectrum_cost() {
    let country = AssessmentConfig::default_test().country;
    // 2x10 at 800 MHz + 2x10 at 1800 MHz = 40 MHz × 10,000 people × $1.
    let cost = spectrum_cost(10_000.0, Generation::FourG, Tier::Baseline, &country).unwrap();
    assert_eq!(cost, 400_000.0);
}

#[test]
fn tiered_spectrum_cost() {
    let country = AssessmentConfig::default_test().country;
    let high = spectrum_cost(10_000.0, Generation::FourG, Tier::High, &country).unwrap();
    let low = spectrum_cost(10_000.0, Generation::FourG, Tier::Low, &country).unwrap();
    assert_eq!(high, 200_000.0, "spectrum_cost_high = 50%");
    assert_eq!(low, 200_000.0, "spectrum_cost_low = 50%");
}

#[test]
fn missing_generation_frequencies_fail() {
    let mut country = AssessmentConfig::default_test().country;
    country.frequencies.remove("3G");
    assert!(spectrum_cost(10_000.0, Generation::ThreeG, Tier::Baseline, &country).is_err());
}

#[test]
fn tax_by_tier() {
    let financials = AssessmentConfig::default_test().country.financials;
    assert_eq!(calculate_tax(1e6, Tier::Baseline, &financials), 250_000.0);
    assert_eq!(calculate_tax(1e6, Tier::High, &financials), 400_000.0);
    assert_eq!(calculate_tax(1e6, Tier::Low, &financials), 100_000.0);
}

#[test]
fn profit_on_cost_before_profit() {
    let financials = AssessmentConfig::default_test().country.financials;
    assert_eq!(calculate_profit(1e6, 6e4, 265e3, &financials), 265e3);
}

#[test]
fn bcr_ignores_cross_subsidy() {
    assert_eq!(benefit_cost_ratio(159e4, 159e4), Some(1.0));
    assert_eq!(benefit_cost_ratio(20_000.0, 0.0), None, "zero cost has no ratio");
}

#[test]
fn priced_region_totals() {
    let country = AssessmentConfig::default_test().country;
    let assessed = AssessedRegion::with_network_cost(region(1_000.0, 20_000.0), 5_000.0);

    let priced = price_region(assessed, Generation::FourG, Tier::Baseline, Tier::Baseline, &country).unwrap();

    assert_eq!(priced.spectrum_cost, 40_000.0);
    assert_eq!(priced.tax, 1_250.0);
    assert_eq!(priced.profit_margin, 9_250.0);
    assert_eq!(priced.total_cost, 55_500.0);
    assert_eq!(priced.bcr, Some(0.36036036036036034));
    assert_eq!(
        priced.total_cost,
        priced.network_cost() + priced.spectrum_cost + priced.tax + priced.profit_margin
    );
}

#[test]
fn fractional_population_is_rounded_half_to_even() {
    let country = AssessmentConfig::default_test().country;
    let a = spectrum_cost(10_000.5, Generation::FourG, Tier::Baseline, &country).unwrap();
    let b = spectrum_cost(10_001.5, Generation::FourG, Tier::Baseline, &country).unwrap();
    assert_eq!(a, 400_000.0);
    assert_eq!(b, 400_080.0);
}
