//! Strategy decoder tests.

use netcost_core::{
    error::CostError,
    region::Geotype,
    strategy::{BackhaulMedium, CoreType, Generation, Integration, SharingModel, Strategy, Tier},
};

#[test]
fn nine_token_strategy_decodes_first_eight() {
    // Upstream scenario files carry a trailing token the engine never reads.
    let s: Strategy = "4G_epc_microwave_baseline_baseline_baseline_baseline_baseline_baseline"
        .parse()
        .unwrap();

    assert_eq!(s.generation, Generation::FourG);
    assert_eq!(s.core, CoreType::Epc);
    assert_eq!(s.backhaul, BackhaulMedium::Microwave);
    assert_eq!(s.sharing, SharingModel::Baseline);
    assert_eq!(s.spectrum_tier().unwrap(), Tier::Baseline);
    assert_eq!(s.tax_tier().unwrap(), Tier::Baseline);
    assert_eq!(s.integration().unwrap(), Integration::Baseline);
    assert_eq!(
        s.to_string(),
        "4G_epc_microwave_baseline_baseline_baseline_baseline_baseline_baseline",
        "Display must round-trip the raw identifier"
    );
}

#[test]
fn seven_token_strategy_fails_only_on_integration() {
    let s = Strategy::parse("4G_epc_microwave_baseline_baseline_high_high").unwrap();
    assert_eq!(s.spectrum_tier().unwrap(), Tier::High);
    assert_eq!(s.tax_tier().unwrap(), Tier::High);

    let err = s.integration().unwrap_err();
    assert!(
        matches!(err, CostError::MalformedStrategy { field: "integration", position: 7, .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn empty_strategy_reports_generation_missing() {
    let err = Strategy::parse("").unwrap_err();
    assert!(
        matches!(err, CostError::MalformedStrategy { field: "generation", position: 0, .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn unknown_generation_is_rejected() {
    let err = Strategy::parse("5G_sa_fiber_baseline_baseline").unwrap_err();
    assert!(matches!(err, CostError::UnknownToken { field: "generation", .. }));
}

#[test]
fn unknown_tier_is_rejected() {
    let err = Strategy::parse("4G_epc_fiber_baseline_baseline_cheap").unwrap_err();
    assert!(matches!(err, CostError::UnknownToken { field: "spectrum", .. }));
}

#[test]
fn srn_leaves_urban_sharing_unchanged() {
    let s = Strategy::parse("3G_sa_fiber_moran_srn").unwrap();
    assert_eq!(s.effective_sharing(Geotype::Urban), SharingModel::Moran);
    assert_eq!(s.effective_sharing(Geotype::Rural), SharingModel::Cns);
    assert!(s.forces_co_location(Geotype::Rural));
    assert!(!s.forces_co_location(Geotype::Suburban));
}
