//! Network resource resolvers — backhaul, core and regional network costs.
//!
//! Pure functions over a region, the cost catalog and the network lookup.
//! Results are unit costs for a single site; discounting and per-site
//! division happen later in the site cost classifier.
//!
//! RULES:
//!   - Backhaul distance comes from node density over the region's area.
//!   - Core and regional costs use only the `{region}_new` lookup entries.
//!   - Edge and node costs are truncated to whole dollars before
//!     normalisation by the per-operator site ratio.
//!   - An unrecognised backhaul technology costs nothing and is reported
//!     as a `CostCondition`, never silently dropped.

use crate::{
    asset::NetworkAsset,
    config::{AssetAge, CostCatalog, NetworkLookup},
    error::{CostError, CostResult},
    region::{Geotype, Region},
    strategy::{BackhaulMedium, CoreType},
    types::Usd,
};
use serde::{Deserialize, Serialize};

/// Average link length below which a small microwave link suffices.
pub const MICROWAVE_SMALL_MAX_M: f64 = 15_000.0;
/// Average link length below which a medium microwave link suffices.
/// Large links are priced per multiple of this distance.
pub const MICROWAVE_MEDIUM_MAX_M: f64 = 30_000.0;

/// Non-fatal conditions attached to an assessed region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CostCondition {
    /// The strategy's backhaul technology has no pricing rule; its
    /// backhaul was costed at zero.
    UnrecognizedBackhaul { technology: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackhaulCost {
    pub cost:       Usd,
    /// Average distance from a site to the nearest node, metres.
    pub distance_m: f64,
    pub condition:  Option<CostCondition>,
}

// ── Backhaul ───────────────────────────────────────────────────────

/// Total core and regional nodes, new and existing, serving the region.
pub fn node_count(region: &Region, lut: &NetworkLookup) -> CostResult<f64> {
    let mut nodes = 0.0;
    for asset in [NetworkAsset::CoreNode, NetworkAsset::RegionalNode] {
        for age in [AssetAge::New, AssetAge::Existing] {
            nodes += lut.required_quantity(asset, &region.gid_id, age)?;
        }
    }
    Ok(nodes)
}

/// Average distance from a site to a node, in metres.
///
/// Half the mean node spacing when the region has nodes, otherwise the
/// side length of the region treated as a square.
pub fn average_distance_to_node_m(region: &Region, lut: &NetworkLookup) -> CostResult<f64> {
    if region.area_km2.is_nan() || region.area_km2 <= 0.0 {
        return Err(CostError::InvalidRegion {
            gid_id: region.gid_id.clone(),
            reason: format!("area_km2 must be positive, got {}", region.area_km2),
        });
    }

    let density = node_count(region, lut)? / region.area_km2;
    if density > 0.0 {
        Ok(((1.0 / density).sqrt() / 2.0) * 1000.0)
    } else {
        Ok(region.area_km2.sqrt() * 1000.0)
    }
}

pub fn backhaul_cost(
    region: &Region,
    geotype: Geotype,
    medium: &BackhaulMedium,
    catalog: &CostCatalog,
    lut: &NetworkLookup,
) -> CostResult<BackhaulCost> {
    let distance_m = average_distance_to_node_m(region, lut)?;

    let (cost, condition) = match medium {
        BackhaulMedium::Microwave => {
            let cost = if distance_m < MICROWAVE_SMALL_MAX_M {
                catalog.price("microwave_small")?
            } else if distance_m < MICROWAVE_MEDIUM_MAX_M {
                catalog.price("microwave_medium")?
            } else {
                catalog.price("microwave_large")? * (distance_m / MICROWAVE_MEDIUM_MAX_M)
            };
            (cost, None)
        }
        BackhaulMedium::Fiber => {
            let per_metre = catalog.price(&format!("fiber_{geotype}_m"))?;
            (per_metre * distance_m, None)
        }
        BackhaulMedium::Other(technology) => {
            log::warn!(
                "{}: unrecognised backhaul technology '{technology}', costed at zero",
                region.gid_id
            );
            (
                0.0,
                Some(CostCondition::UnrecognizedBackhaul {
                    technology: technology.clone(),
                }),
            )
        }
    };

    Ok(BackhaulCost { cost, distance_m, condition })
}

// ── Core and regional network ──────────────────────────────────────

/// Catalog key for a network asset's unit price.
pub fn price_key(asset: NetworkAsset, core: CoreType) -> String {
    match asset {
        NetworkAsset::CoreEdge     => "core_edge".to_string(),
        NetworkAsset::CoreNode     => format!("core_node_{}", core.as_str()),
        NetworkAsset::RegionalEdge => "regional_edge".to_string(),
        NetworkAsset::RegionalNode => format!("regional_node_{}", core.as_str()),
    }
}

/// Cost of the newly planned core or regional assets serving a region,
/// normalised by the number of sites each operator builds.
///
/// `operators` is the geotype operator count and must be positive.
pub fn network_asset_cost(
    region: &Region,
    asset: NetworkAsset,
    core: CoreType,
    catalog: &CostCatalog,
    lut: &NetworkLookup,
    operators: f64,
) -> CostResult<Usd> {
    let Some(quantity) = lut.quantity(asset, &region.gid_id, AssetAge::New) else {
        return Ok(0.0);
    };

    let cost = (quantity * catalog.price(&price_key(asset, core))?).trunc();
    let site_ratio = f64::from(region.total_sites()?) / operators;

    if site_ratio == 0.0 {
        return Ok(0.0);
    }

    let normalised = match asset {
        NetworkAsset::CoreEdge | NetworkAsset::CoreNode => {
            if site_ratio < 1.0 { cost } else { cost / site_ratio }
        }
        NetworkAsset::RegionalEdge => {
            if site_ratio <= 1.0 { cost * site_ratio } else { cost / site_ratio }
        }
        NetworkAsset::RegionalNode => {
            if site_ratio <= 1.0 { cost } else { cost / site_ratio }
        }
    };
    Ok(normalised)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssessmentConfig;

    fn region(upgraded: u32, new: u32, area_km2: f64) -> Region {
        Region {
            gid_id:         "MWI.1.1.1_1".into(),
            geotype:        "urban".into(),
            area_km2,
            population:     10_000.0,
            new_sites:      new,
            upgraded_sites: upgraded,
            backhaul_new:   0,
            integration:    None,
            total_revenue:  0.0,
            extra:          Default::default(),
        }
    }

    #[test]
    fn distance_uses_half_node_spacing() {
        let config = AssessmentConfig::default_test();
        // 8 nodes over 2 km² → 4 per km² → 0.5 km spacing.
        let d = average_distance_to_node_m(&region(1, 0, 2.0), &config.core_lut).unwrap();
        assert_eq!(d, 250.0);
    }

    #[test]
    fn distance_falls_back_to_region_side_without_nodes() {
        let mut lut = NetworkLookup::default();
        for asset in [NetworkAsset::CoreNode, NetworkAsset::RegionalNode] {
            lut.insert(asset, "MWI.1.1.1_1", AssetAge::New, 0.0);
            lut.insert(asset, "MWI.1.1.1_1", AssetAge::Existing, 0.0);
        }
        let d = average_distance_to_node_m(&region(1, 0, 400.0), &lut).unwrap();
        assert_eq!(d, 20_000.0);
    }

    #[test]
    fn non_positive_area_is_rejected() {
        let config = AssessmentConfig::default_test();
        assert!(matches!(
            average_distance_to_node_m(&region(1, 0, 0.0), &config.core_lut),
            Err(CostError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn missing_node_entry_is_an_error() {
        let config = AssessmentConfig::default_test();
        let mut r = region(1, 0, 2.0);
        r.gid_id = "MWI.9.9.9_1".into();
        assert!(matches!(
            node_count(&r, &config.core_lut),
            Err(CostError::MissingLookupEntry { asset_type: "core_node", .. })
        ));
    }

    #[test]
    fn fiber_and_microwave_pricing() {
        let config = AssessmentConfig::default_test();
        let r = region(1, 0, 2.0);

        let fiber = backhaul_cost(&r, Geotype::Urban, &BackhaulMedium::Fiber,
            &config.catalog, &config.core_lut).unwrap();
        assert_eq!(fiber.cost, 2500.0);

        let microwave = backhaul_cost(&r, Geotype::Urban, &BackhaulMedium::Microwave,
            &config.catalog, &config.core_lut).unwrap();
        assert_eq!(microwave.cost, 10_000.0);
        assert!(microwave.condition.is_none());
    }

    #[test]
    fn unknown_backhaul_is_zero_with_condition() {
        let config = AssessmentConfig::default_test();
        let medium = BackhaulMedium::Other("satellite".into());
        let result = backhaul_cost(&region(1, 0, 2.0), Geotype::Urban, &medium,
            &config.catalog, &config.core_lut).unwrap();
        assert_eq!(result.cost, 0.0);
        assert_eq!(
            result.condition,
            Some(CostCondition::UnrecognizedBackhaul { technology: "satellite".into() })
        );
    }

    #[test]
    fn core_and_regional_normalisation() {
        let config = AssessmentConfig::default_test();
        let cost = |asset, upgraded| {
            network_asset_cost(&region(upgraded, 0, 2.0), asset, CoreType::Epc,
                &config.catalog, &config.core_lut, 2.0).unwrap()
        };

        // One site, two operators → ratio 0.5.
        assert_eq!(cost(NetworkAsset::CoreEdge, 1), 20_000.0);
        assert_eq!(cost(NetworkAsset::RegionalEdge, 1), 5_000.0);
        assert_eq!(cost(NetworkAsset::RegionalNode, 1), 200_000.0);

        // Two sites → ratio exactly 1.
        assert_eq!(cost(NetworkAsset::CoreNode, 2), 200_000.0);
        assert_eq!(cost(NetworkAsset::RegionalEdge, 2), 10_000.0);

        // Four sites → ratio 2.
        assert_eq!(cost(NetworkAsset::CoreEdge, 4), 10_000.0);
        assert_eq!(cost(NetworkAsset::RegionalNode, 4), 100_000.0);

        // No sites.
        assert_eq!(cost(NetworkAsset::CoreNode, 0), 0.0);
    }

    #[test]
    fn missing_new_entry_costs_nothing() {
        let config = AssessmentConfig::default_test();
        let mut r = region(1, 0, 2.0);
        r.gid_id = "MWI.9.9.9_1".into();
        let cost = network_asset_cost(&r, NetworkAsset::CoreEdge, CoreType::Sa,
            &config.catalog, &config.core_lut, 2.0).unwrap();
        assert_eq!(cost, 0.0);
    }
}
