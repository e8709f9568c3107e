use crate::{
    asset::NetworkAsset,
    error::{CostError, CostResult},
    region::Geotype,
    strategy::{Generation, Tier},
    subsidy_subsystem::DepletionOrder,
    types::Usd,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Cost catalog ───────────────────────────────────────────────────

/// Unit prices keyed by asset name. Geotype- and core-qualified assets use
/// suffixed keys (`site_rental_rural`, `core_node_epc`, `fiber_urban_m`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostCatalog(HashMap<String, Usd>);

impl CostCatalog {
    pub fn price(&self, key: &str) -> CostResult<Usd> {
        self.0
            .get(key)
            .copied()
            .ok_or_else(|| CostError::MissingCatalogEntry { key: key.to_string() })
    }

    pub fn insert(&mut self, key: impl Into<String>, price: Usd) {
        self.0.insert(key.into(), price);
    }
}

impl<K: Into<String>> FromIterator<(K, Usd)> for CostCatalog {
    fn from_iter<I: IntoIterator<Item = (K, Usd)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ── Network lookup ─────────────────────────────────────────────────

/// Whether a lookup quantity refers to planned or already-built assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetAge {
    New,
    Existing,
}

impl AssetAge {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetAge::New      => "new",
            AssetAge::Existing => "existing",
        }
    }
}

/// `core_lut`: asset table → `{region_id}_{new|existing}` → quantity.
/// Edge quantities are metres, node quantities are counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkLookup(HashMap<String, HashMap<String, f64>>);

impl NetworkLookup {
    pub fn key(gid_id: &str, age: AssetAge) -> String {
        format!("{gid_id}_{}", age.as_str())
    }

    /// Quantity for a region, or `None` when the table or key is absent.
    pub fn quantity(&self, asset: NetworkAsset, gid_id: &str, age: AssetAge) -> Option<f64> {
        self.0
            .get(asset.lookup_table())
            .and_then(|table| table.get(&Self::key(gid_id, age)))
            .copied()
    }

    /// Quantity for a region; absence is a configuration error.
    pub fn required_quantity(
        &self,
        asset: NetworkAsset,
        gid_id: &str,
        age: AssetAge,
    ) -> CostResult<f64> {
        self.quantity(asset, gid_id, age)
            .ok_or_else(|| CostError::MissingLookupEntry {
                asset_type: asset.lookup_table(),
                key:        Self::key(gid_id, age),
            })
    }

    pub fn insert(&mut self, asset: NetworkAsset, gid_id: &str, age: AssetAge, quantity: f64) {
        self.0
            .entry(asset.lookup_table().to_string())
            .or_default()
            .insert(Self::key(gid_id, age), quantity);
    }
}

// ── Global parameters ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalParameters {
    /// Years over which opex is discounted.
    pub return_period:               u32,
    /// Annual discount rate, percent.
    pub discount_rate:               f64,
    pub opex_percentage_of_capex:    f64,
    /// Multiplier applied to the single-sector antenna cost.
    pub sectorization:               f64,
    /// Percentage saved on most items when a region is integrated.
    pub regional_integration_factor: f64,
    #[serde(default)]
    pub depletion_order:             DepletionOrder,
}

// ── Country parameters ─────────────────────────────────────────────

/// One licensed frequency block, e.g. `{ "frequency": 800, "bandwidth": "2x10" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyBlock {
    /// Centre frequency, MHz.
    pub frequency: f64,
    /// `"{channels}x{MHz}"`.
    pub bandwidth: String,
}

impl FrequencyBlock {
    /// Below this frequency spectrum is priced as coverage spectrum.
    pub const COVERAGE_CEILING_MHZ: f64 = 1000.0;

    /// Total bandwidth in MHz (channels × channel width).
    pub fn total_bandwidth_mhz(&self) -> CostResult<f64> {
        let invalid = || CostError::InvalidBandwidth(self.bandwidth.clone());
        let (channels, width) = self.bandwidth.split_once('x').ok_or_else(invalid)?;
        let channels: u32 = channels.trim().parse().map_err(|_| invalid())?;
        let width: f64 = width.trim().parse().map_err(|_| invalid())?;
        Ok(f64::from(channels) * width)
    }

    pub fn is_coverage(&self) -> bool {
        self.frequency < Self::COVERAGE_CEILING_MHZ
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Financials {
    /// Weighted average cost of capital, percent.
    pub wacc:                                   f64,
    /// Operator profit margin, percent.
    pub profit_margin:                          f64,
    pub spectrum_coverage_baseline_usd_mhz_pop: f64,
    pub spectrum_capacity_baseline_usd_mhz_pop: f64,
    /// Percentage of the baseline spectrum price paid in the low tier.
    pub spectrum_cost_low:                      f64,
    /// Percentage of the baseline spectrum price paid in the high tier.
    pub spectrum_cost_high:                     f64,
    pub tax_low:                                f64,
    pub tax_baseline:                           f64,
    pub tax_high:                               f64,
}

impl Financials {
    pub fn tax_rate(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Baseline => self.tax_baseline,
            Tier::Low      => self.tax_low,
            Tier::High     => self.tax_high,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryParameters {
    /// Operator count keyed `baseline_{geotype}`.
    pub networks:    HashMap<String, u32>,
    /// Licensed blocks keyed by generation (`"3G"`, `"4G"`).
    pub frequencies: HashMap<String, Vec<FrequencyBlock>>,
    pub financials:  Financials,
}

impl CountryParameters {
    /// Number of operators splitting shared assets in a geotype.
    pub fn operators(&self, geotype: Geotype) -> CostResult<f64> {
        let key = format!("baseline_{geotype}");
        match self.networks.get(&key) {
            Some(0) => Err(CostError::InvalidParameter {
                name:   "networks",
                reason: format!("'{key}' must be at least 1"),
            }),
            Some(n) => Ok(f64::from(*n)),
            None => Err(CostError::MissingOperatorCount { key }),
        }
    }

    pub fn frequencies(&self, generation: Generation) -> CostResult<&[FrequencyBlock]> {
        self.frequencies
            .get(generation.as_str())
            .map(Vec::as_slice)
            .ok_or_else(|| CostError::MissingFrequencies {
                generation: generation.as_str().to_string(),
            })
    }
}

// ── Assessment config ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    pub catalog:  CostCatalog,
    pub global:   GlobalParameters,
    pub country:  CountryParameters,
    pub core_lut: NetworkLookup,
}

impl AssessmentConfig {
    /// Load from the data/ directory.
    /// In tests, use AssessmentConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let catalog_path = format!("{data_dir}/costs/cost_catalog.json");
        let catalog_content = std::fs::read_to_string(&catalog_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {catalog_path}: {e}"))?;
        let catalog: CostCatalog = serde_json::from_str(&catalog_content)?;

        let global_path = format!("{data_dir}/parameters/global_parameters.json");
        let global_content = std::fs::read_to_string(&global_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {global_path}: {e}"))?;
        let global: GlobalParameters = serde_json::from_str(&global_content)?;

        let country_path = format!("{data_dir}/parameters/country_parameters.json");
        let country_content = std::fs::read_to_string(&country_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {country_path}: {e}"))?;
        let country: CountryParameters = serde_json::from_str(&country_content)?;

        let lut_path = format!("{data_dir}/network/core_lut.json");
        let lut_content = std::fs::read_to_string(&lut_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {lut_path}: {e}"))?;
        let core_lut: NetworkLookup = serde_json::from_str(&lut_content)?;

        if global.return_period == 0 {
            anyhow::bail!("{global_path}: return_period must be at least 1");
        }

        Ok(Self { catalog, global, country, core_lut })
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// The network lookup holds one region, `MWI.1.1.1_1`, with two new
    /// and two existing nodes and 1 km of new and existing edge per table.
    pub fn default_test() -> Self {
        let catalog: CostCatalog = [
            ("single_sector_antenna", 1500.0),
            ("single_remote_radio_unit", 4000.0),
            ("io_fronthaul", 1500.0),
            ("processing", 1500.0),
            ("io_s1_x2", 1500.0),
            ("control_unit", 1500.0),
            ("cooling_fans", 250.0),
            ("distributed_power_supply_converter", 250.0),
            ("power_generator_battery_system", 5000.0),
            ("bbu_cabinet", 500.0),
            ("tower", 10000.0),
            ("civil_materials", 5000.0),
            ("transportation", 5000.0),
            ("installation", 5000.0),
            ("site_rental_urban", 9600.0),
            ("site_rental_suburban", 4000.0),
            ("site_rental_rural", 2000.0),
            ("router", 2000.0),
            ("microwave_small", 10000.0),
            ("microwave_medium", 20000.0),
            ("microwave_large", 40000.0),
            ("fiber_urban_m", 10.0),
            ("fiber_suburban_m", 5.0),
            ("fiber_rural_m", 2.0),
            ("core_node_epc", 100000.0),
            ("core_node_nsa", 150000.0),
            ("core_node_sa", 200000.0),
            ("core_edge", 20.0),
            ("regional_node_epc", 100000.0),
            ("regional_node_nsa", 150000.0),
            ("regional_node_sa", 200000.0),
            ("regional_edge", 10.0),
            ("per_site_spectrum_acquisition_cost", 1000.0),
            ("per_site_administration_cost", 100.0),
        ]
        .into_iter()
        .collect();

        let global = GlobalParameters {
            return_period:               2,
            discount_rate:               5.0,
            opex_percentage_of_capex:    10.0,
            sectorization:               3.0,
            regional_integration_factor: 10.0,
            depletion_order:             DepletionOrder::InputOrder,
        };

        let networks = [
            ("baseline_urban".to_string(), 2),
            ("baseline_suburban".to_string(), 2),
            ("baseline_rural".to_string(), 2),
        ]
        .into();

        let block = |frequency: f64, bandwidth: &str| FrequencyBlock {
            frequency,
            bandwidth: bandwidth.into(),
        };
        let frequencies = [
            ("3G".to_string(), vec![block(900.0, "2x5"), block(2100.0, "2x10")]),
            ("4G".to_string(), vec![block(800.0, "2x10"), block(1800.0, "2x10")]),
        ]
        .into();

        let country = CountryParameters {
            networks,
            frequencies,
            financials: Financials {
                wacc:                                   15.0,
                profit_margin:                          20.0,
                spectrum_coverage_baseline_usd_mhz_pop: 1.0,
                spectrum_capacity_baseline_usd_mhz_pop: 1.0,
                spectrum_cost_low:                      50.0,
                spectrum_cost_high:                     50.0,
                tax_low:                                10.0,
                tax_baseline:                           25.0,
                tax_high:                               40.0,
            },
        };

        let mut core_lut = NetworkLookup::default();
        for asset in [
            NetworkAsset::CoreEdge,
            NetworkAsset::CoreNode,
            NetworkAsset::RegionalEdge,
            NetworkAsset::RegionalNode,
        ] {
            let quantity = if asset.is_edge() { 1000.0 } else { 2.0 };
            core_lut.insert(asset, "MWI.1.1.1_1", AssetAge::New, quantity);
            core_lut.insert(asset, "MWI.1.1.1_1", AssetAge::Existing, quantity);
        }

        Self { catalog, global, country, core_lut }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bandwidth_is_channels_times_width() {
        let block = FrequencyBlock { frequency: 3500.0, bandwidth: "1x50".into() };
        assert_eq!(block.total_bandwidth_mhz().unwrap(), 50.0);
        assert!(!block.is_coverage());

        let bad = FrequencyBlock { frequency: 800.0, bandwidth: "twenty".into() };
        assert!(matches!(bad.total_bandwidth_mhz(), Err(CostError::InvalidBandwidth(_))));
    }

    #[test]
    fn missing_catalog_entry_is_an_error() {
        let config = AssessmentConfig::default_test();
        assert_eq!(config.catalog.price("tower").unwrap(), 10000.0);
        assert!(matches!(
            config.catalog.price("satellite_dish"),
            Err(CostError::MissingCatalogEntry { .. })
        ));
    }

    #[test]
    fn operator_count_must_be_positive() {
        let mut config = AssessmentConfig::default_test();
        assert_eq!(config.country.operators(Geotype::Rural).unwrap(), 2.0);

        config.country.networks.insert("baseline_rural".into(), 0);
        assert!(config.country.operators(Geotype::Rural).is_err());

        config.country.networks.remove("baseline_rural");
        assert!(matches!(
            config.country.operators(Geotype::Rural),
            Err(CostError::MissingOperatorCount { .. })
        ));
    }

    #[test]
    fn country_parameters_parse_original_layout() {
        let json = r#"{
            "networks": { "baseline_urban": 3, "baseline_suburban": 2, "baseline_rural": 1 },
            "frequencies": { "4G": [ { "frequency": 800, "bandwidth": "2x10" } ] },
            "financials": {
                "wacc": 15, "profit_margin": 20,
                "spectrum_coverage_baseline_usd_mhz_pop": 1,
                "spectrum_capacity_baseline_usd_mhz_pop": 1,
                "spectrum_cost_low": 50, "spectrum_cost_high": 50,
                "tax_low": 10, "tax_baseline": 25, "tax_high": 40,
                "acquisition_per_subscriber": 10
            }
        }"#;
        let country: CountryParameters = serde_json::from_str(json).unwrap();
        assert_eq!(country.operators(Geotype::Urban).unwrap(), 3.0);
        assert_eq!(country.frequencies(Generation::FourG).unwrap().len(), 1);
        assert!(country.frequencies(Generation::ThreeG).is_err());
        assert_eq!(country.financials.tax_rate(Tier::High), 40.0);
    }
}
