//! Region records — the input contract and the assessed output record.
//!
//! RULES:
//!   - Input regions are never mutated. Every stage takes the assessed
//!     records by value and returns new ones.
//!   - Upstream fields this crate does not read are carried through to
//!     the output record untouched. Computed fields replace any upstream
//!     value of the same name.

use crate::{
    asset::CostBuckets,
    error::{CostError, CostResult},
    network::CostCondition,
    strategy::{Integration, Strategy},
    types::{RegionId, Usd},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Output fields computed by the assessment.
pub const COMPUTED_FIELDS: [&str; 16] = [
    "ran",
    "backhaul_fronthaul",
    "civils",
    "core_network",
    "admin_and_ops",
    "network_cost",
    "spectrum_cost",
    "tax",
    "profit_margin",
    "total_cost",
    "available_cross_subsidy",
    "deficit",
    "used_cross_subsidy",
    "required_state_subsidy",
    "bcr",
    "conditions",
];

/// Settlement type. Parsed from the first whitespace token of the
/// `geotype` field, so `"rural 2"` is rural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geotype {
    Urban,
    Suburban,
    Rural,
}

impl Geotype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Geotype::Urban    => "urban",
            Geotype::Suburban => "suburban",
            Geotype::Rural    => "rural",
        }
    }
}

impl fmt::Display for Geotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A region as delivered by the upstream demand and site-count models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "GID_id")]
    pub gid_id:         RegionId,
    pub geotype:        String,
    pub area_km2:       f64,
    pub population:     f64,
    pub new_sites:      u32,
    pub upgraded_sites: u32,
    /// Number of sites that need a new backhaul link.
    pub backhaul_new:   u32,
    /// Falls back to the strategy's integration token when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration:    Option<Integration>,
    pub total_revenue:  Usd,
    /// Every other upstream field (`GID_0`, `decile`, demand columns, ...).
    #[serde(flatten)]
    pub extra:          Map<String, Value>,
}

impl Region {
    pub fn total_sites(&self) -> CostResult<u32> {
        self.upgraded_sites
            .checked_add(self.new_sites)
            .ok_or_else(|| CostError::InvalidRegion {
                gid_id: self.gid_id.clone(),
                reason: format!(
                    "site count overflows: {} upgraded + {} new",
                    self.upgraded_sites, self.new_sites
                ),
            })
    }

    pub fn geotype(&self) -> CostResult<Geotype> {
        let token = self.geotype.split_whitespace().next().unwrap_or_default();
        match token {
            "urban"    => Ok(Geotype::Urban),
            "suburban" => Ok(Geotype::Suburban),
            "rural"    => Ok(Geotype::Rural),
            other => Err(CostError::InvalidRegion {
                gid_id: self.gid_id.clone(),
                reason: format!("unknown geotype '{other}'"),
            }),
        }
    }

    /// The integration flag governing this region's cost adjustments.
    pub fn effective_integration(&self, strategy: &Strategy) -> CostResult<Integration> {
        match self.integration {
            Some(flag) => Ok(flag),
            None => strategy.integration(),
        }
    }
}

/// Network cost of a region: the five buckets plus their total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkCost {
    #[serde(flatten)]
    pub buckets:      CostBuckets,
    pub network_cost: Usd,
}

impl NetworkCost {
    pub fn from_buckets(buckets: CostBuckets) -> Self {
        Self {
            network_cost: buckets.total(),
            buckets,
        }
    }
}

/// A region after assessment. Serialises as one flat record: the input
/// fields followed by every computed field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessedRegion {
    #[serde(flatten)]
    pub region:                  Region,
    #[serde(flatten)]
    pub network:                 NetworkCost,
    pub spectrum_cost:           Usd,
    pub tax:                     Usd,
    pub profit_margin:           Usd,
    pub total_cost:              Usd,
    pub available_cross_subsidy: Usd,
    pub deficit:                 Usd,
    pub used_cross_subsidy:      Usd,
    pub required_state_subsidy:  Usd,
    /// Benefit-cost ratio; `None` when the total cost is zero.
    pub bcr:                     Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions:              Vec<CostCondition>,
}

impl AssessedRegion {
    pub fn new(mut region: Region) -> Self {
        region.extra.retain(|key, _| !COMPUTED_FIELDS.contains(&key.as_str()));
        Self {
            region,
            network:                 NetworkCost::default(),
            spectrum_cost:           0.0,
            tax:                     0.0,
            profit_margin:           0.0,
            total_cost:              0.0,
            available_cross_subsidy: 0.0,
            deficit:                 0.0,
            used_cross_subsidy:      0.0,
            required_state_subsidy:  0.0,
            bcr:                     None,
            conditions:              Vec::new(),
        }
    }

    /// Start from a region whose network cost was computed elsewhere.
    pub fn with_network_cost(region: Region, network_cost: Usd) -> Self {
        let mut assessed = Self::new(region);
        assessed.network.network_cost = network_cost;
        assessed
    }

    pub fn gid_id(&self) -> &str {
        &self.region.gid_id
    }

    pub fn network_cost(&self) -> Usd {
        self.network.network_cost
    }
}
