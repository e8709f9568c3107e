//! Cost structure builder — the itemised unit costs of one site build.
//!
//! A structure lists every asset of a build path, in build order, with its
//! unit cost after infrastructure sharing. Nothing is discounted here.
//!
//! RULES:
//!   - Upgrades reuse the existing tower and civils; greenfield builds pay
//!     for power generation, tower, civil materials and transportation.
//!   - Assets in the effective sharing set are split between the geotype's
//!     operators. Forced co-location (srn in rural areas) applies the split
//!     as a reciprocal multiplier.
//!   - Item order is the summation order downstream. Do not reorder.

use crate::{
    asset::Asset,
    config::AssessmentConfig,
    error::CostResult,
    network::{backhaul_cost, network_asset_cost, CostCondition},
    region::{Geotype, Region},
    strategy::{Generation, Strategy},
    types::Usd,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPath {
    Upgrade3g,
    Upgrade4g,
    Greenfield3g,
    Greenfield4g,
}

const UPGRADE_ASSETS: [Asset; 18] = [
    Asset::SingleSectorAntenna,
    Asset::SingleRemoteRadioUnit,
    Asset::IoFronthaul,
    Asset::Processing,
    Asset::IoS1X2,
    Asset::ControlUnit,
    Asset::CoolingFans,
    Asset::DistributedPowerSupplyConverter,
    Asset::BbuCabinet,
    Asset::Installation,
    Asset::SiteRental,
    Asset::Backhaul,
    Asset::CoreEdge,
    Asset::CoreNode,
    Asset::RegionalEdge,
    Asset::RegionalNode,
    Asset::PerSiteSpectrumAcquisitionCost,
    Asset::PerSiteAdministrationCost,
];

const GREENFIELD_ASSETS: [Asset; 22] = [
    Asset::SingleSectorAntenna,
    Asset::SingleRemoteRadioUnit,
    Asset::IoFronthaul,
    Asset::Processing,
    Asset::IoS1X2,
    Asset::ControlUnit,
    Asset::CoolingFans,
    Asset::DistributedPowerSupplyConverter,
    Asset::PowerGeneratorBatterySystem,
    Asset::BbuCabinet,
    Asset::Tower,
    Asset::CivilMaterials,
    Asset::Transportation,
    Asset::Installation,
    Asset::SiteRental,
    Asset::Backhaul,
    Asset::CoreEdge,
    Asset::CoreNode,
    Asset::RegionalEdge,
    Asset::RegionalNode,
    Asset::PerSiteSpectrumAcquisitionCost,
    Asset::PerSiteAdministrationCost,
];

impl BuildPath {
    /// Path for a site of the given generation that is either an upgrade of
    /// an existing site or a new greenfield build.
    pub fn for_site(generation: Generation, upgrade: bool) -> Self {
        match (generation, upgrade) {
            (Generation::ThreeG, true)  => BuildPath::Upgrade3g,
            (Generation::FourG, true)   => BuildPath::Upgrade4g,
            (Generation::ThreeG, false) => BuildPath::Greenfield3g,
            (Generation::FourG, false)  => BuildPath::Greenfield4g,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuildPath::Upgrade3g    => "upgrade_3g",
            BuildPath::Upgrade4g    => "upgrade_4g",
            BuildPath::Greenfield3g => "greenfield_3g",
            BuildPath::Greenfield4g => "greenfield_4g",
        }
    }

    pub fn is_greenfield(&self) -> bool {
        matches!(self, BuildPath::Greenfield3g | BuildPath::Greenfield4g)
    }

    /// Assets in build order. Both generations share the same item list;
    /// they differ only in where they sit in the site loop.
    pub fn assets(&self) -> &'static [Asset] {
        if self.is_greenfield() {
            &GREENFIELD_ASSETS
        } else {
            &UPGRADE_ASSETS
        }
    }
}

/// Itemised unit costs for one build path in one region.
#[derive(Debug, Clone, PartialEq)]
pub struct CostStructure {
    pub path:       BuildPath,
    pub items:      Vec<(Asset, Usd)>,
    pub conditions: Vec<CostCondition>,
}

impl CostStructure {
    pub fn cost_of(&self, asset: Asset) -> Option<Usd> {
        self.items.iter().find(|(a, _)| *a == asset).map(|(_, c)| *c)
    }

    /// Resolve every asset of `path` for `region` and apply sharing.
    pub fn build(
        path: BuildPath,
        region: &Region,
        strategy: &Strategy,
        config: &AssessmentConfig,
    ) -> CostResult<Self> {
        let geotype = region.geotype()?;
        let operators = config.country.operators(geotype)?;
        let sharing = strategy.effective_sharing(geotype);
        let co_located = strategy.forces_co_location(geotype);

        let mut items = Vec::with_capacity(path.assets().len());
        let mut conditions = Vec::new();

        for &asset in path.assets() {
            let value = unit_cost(asset, region, geotype, strategy, config, operators, &mut conditions)?;
            let value = if !asset.is_shared_under(sharing) {
                value
            } else if co_located {
                value * (1.0 / operators)
            } else {
                value / operators
            };
            items.push((asset, value));
        }

        Ok(Self { path, items, conditions })
    }
}

fn unit_cost(
    asset: Asset,
    region: &Region,
    geotype: Geotype,
    strategy: &Strategy,
    config: &AssessmentConfig,
    operators: f64,
    conditions: &mut Vec<CostCondition>,
) -> CostResult<Usd> {
    if let Some(network_asset) = asset.network_asset() {
        return network_asset_cost(
            region,
            network_asset,
            strategy.core,
            &config.catalog,
            &config.core_lut,
            operators,
        );
    }

    match asset {
        Asset::SiteRental => config.catalog.price(&format!("site_rental_{geotype}")),
        Asset::Backhaul => {
            let backhaul = backhaul_cost(
                region,
                geotype,
                &strategy.backhaul,
                &config.catalog,
                &config.core_lut,
            )?;
            log::debug!(
                "{}: {} backhaul over {:.0} m costs {:.2}",
                region.gid_id,
                strategy.backhaul.as_str(),
                backhaul.distance_m,
                backhaul.cost
            );
            conditions.extend(backhaul.condition);
            Ok(backhaul.cost)
        }
        other => config.catalog.price(other.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(geotype: &str) -> Region {
        Region {
            gid_id:         "MWI.1.1.1_1".into(),
            geotype:        geotype.into(),
            area_km2:       2.0,
            population:     10_000.0,
            new_sites:      1,
            upgraded_sites: 1,
            backhaul_new:   1,
            integration:    None,
            total_revenue:  0.0,
            extra:          Default::default(),
        }
    }

    #[test]
    fn greenfield_adds_passive_infrastructure() {
        let upgrade = BuildPath::for_site(Generation::FourG, true);
        let greenfield = BuildPath::for_site(Generation::FourG, false);
        assert_eq!(upgrade.assets().len() + 4, greenfield.assets().len());
        for asset in [Asset::Tower, Asset::CivilMaterials, Asset::Transportation,
                      Asset::PowerGeneratorBatterySystem] {
            assert!(!upgrade.assets().contains(&asset));
            assert!(greenfield.assets().contains(&asset));
        }
    }

    #[test]
    fn baseline_sharing_keeps_full_unit_costs() {
        let config = AssessmentConfig::default_test();
        let strategy = Strategy::parse("4G_epc_fiber_baseline_baseline").unwrap();
        let s = CostStructure::build(BuildPath::Greenfield4g, &region("urban"), &strategy, &config).unwrap();
        assert_eq!(s.cost_of(Asset::Tower), Some(10_000.0));
        assert_eq!(s.cost_of(Asset::SiteRental), Some(9_600.0));
        assert_eq!(s.cost_of(Asset::Backhaul), Some(2_500.0));
    }

    #[test]
    fn passive_sharing_halves_civils_only() {
        let config = AssessmentConfig::default_test();
        let strategy = Strategy::parse("4G_epc_fiber_pss_baseline").unwrap();
        let s = CostStructure::build(BuildPath::Greenfield4g, &region("suburban"), &strategy, &config).unwrap();
        assert_eq!(s.cost_of(Asset::Tower), Some(5_000.0));
        assert_eq!(s.cost_of(Asset::SiteRental), Some(2_000.0));
        assert_eq!(s.cost_of(Asset::SingleRemoteRadioUnit), Some(4_000.0));
        assert_eq!(s.cost_of(Asset::Backhaul), Some(1_250.0));
    }

    #[test]
    fn srn_in_rural_areas_shares_everything_but_admin() {
        let config = AssessmentConfig::default_test();
        let strategy = Strategy::parse("4G_epc_fiber_baseline_srn").unwrap();
        let s = CostStructure::build(BuildPath::Upgrade4g, &region("rural"), &strategy, &config).unwrap();
        assert_eq!(s.cost_of(Asset::SingleRemoteRadioUnit), Some(2_000.0));
        assert_eq!(s.cost_of(Asset::SiteRental), Some(1_000.0));
        assert_eq!(s.cost_of(Asset::PerSiteAdministrationCost), Some(100.0));

        let urban = CostStructure::build(BuildPath::Upgrade4g, &region("urban"), &strategy, &config).unwrap();
        assert_eq!(urban.cost_of(Asset::SingleRemoteRadioUnit), Some(4_000.0));
    }

    #[test]
    fn unknown_backhaul_is_carried_as_condition() {
        let config = AssessmentConfig::default_test();
        let strategy = Strategy::parse("4G_epc_copper_baseline_baseline").unwrap();
        let s = CostStructure::build(BuildPath::Upgrade4g, &region("urban"), &strategy, &config).unwrap();
        assert_eq!(s.cost_of(Asset::Backhaul), Some(0.0));
        assert_eq!(
            s.conditions,
            vec![CostCondition::UnrecognizedBackhaul { technology: "copper".into() }]
        );
    }
}
