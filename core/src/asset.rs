//! Asset classification tables.
//!
//! Every cost line a build path can produce is a variant of `Asset`.
//! Its cost type, its bucket and the sharing models that split it are
//! exhaustive matches, so an unclassified asset cannot be constructed.

use crate::{strategy::SharingModel, types::Usd};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    SingleSectorAntenna,
    SingleRemoteRadioUnit,
    IoFronthaul,
    Processing,
    IoS1X2,
    ControlUnit,
    CoolingFans,
    DistributedPowerSupplyConverter,
    PowerGeneratorBatterySystem,
    BbuCabinet,
    Tower,
    CivilMaterials,
    Transportation,
    Installation,
    SiteRental,
    Backhaul,
    CoreEdge,
    CoreNode,
    RegionalEdge,
    RegionalNode,
    PerSiteSpectrumAcquisitionCost,
    PerSiteAdministrationCost,
}

/// How a cost line is treated over the return period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    Capex,
    Opex,
    CapexAndOpex,
}

/// The five reporting categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBucket {
    Ran,
    BackhaulFronthaul,
    Civils,
    CoreNetwork,
    AdminAndOps,
}

/// Core and regional network assets, priced from the network lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkAsset {
    CoreEdge,
    CoreNode,
    RegionalEdge,
    RegionalNode,
}

impl NetworkAsset {
    /// Key of this asset's table in the network lookup.
    pub fn lookup_table(&self) -> &'static str {
        match self {
            NetworkAsset::CoreEdge     => "core_edge",
            NetworkAsset::CoreNode     => "core_node",
            NetworkAsset::RegionalEdge => "regional_edge",
            NetworkAsset::RegionalNode => "regional_node",
        }
    }

    pub fn is_edge(&self) -> bool {
        matches!(self, NetworkAsset::CoreEdge | NetworkAsset::RegionalEdge)
    }
}

impl Asset {
    pub fn name(&self) -> &'static str {
        match self {
            Asset::SingleSectorAntenna             => "single_sector_antenna",
            Asset::SingleRemoteRadioUnit           => "single_remote_radio_unit",
            Asset::IoFronthaul                     => "io_fronthaul",
            Asset::Processing                      => "processing",
            Asset::IoS1X2                          => "io_s1_x2",
            Asset::ControlUnit                     => "control_unit",
            Asset::CoolingFans                     => "cooling_fans",
            Asset::DistributedPowerSupplyConverter => "distributed_power_supply_converter",
            Asset::PowerGeneratorBatterySystem     => "power_generator_battery_system",
            Asset::BbuCabinet                      => "bbu_cabinet",
            Asset::Tower                           => "tower",
            Asset::CivilMaterials                  => "civil_materials",
            Asset::Transportation                  => "transportation",
            Asset::Installation                    => "installation",
            Asset::SiteRental                      => "site_rental",
            Asset::Backhaul                        => "backhaul",
            Asset::CoreEdge                        => "core_edge",
            Asset::CoreNode                        => "core_node",
            Asset::RegionalEdge                    => "regional_edge",
            Asset::RegionalNode                    => "regional_node",
            Asset::PerSiteSpectrumAcquisitionCost  => "per_site_spectrum_acquisition_cost",
            Asset::PerSiteAdministrationCost       => "per_site_administration_cost",
        }
    }

    pub fn cost_type(&self) -> CostType {
        match self {
            Asset::BbuCabinet
            | Asset::Tower
            | Asset::CivilMaterials
            | Asset::Transportation
            | Asset::Installation
            | Asset::PerSiteSpectrumAcquisitionCost => CostType::Capex,

            Asset::SiteRental | Asset::PerSiteAdministrationCost => CostType::Opex,

            Asset::SingleSectorAntenna
            | Asset::SingleRemoteRadioUnit
            | Asset::IoFronthaul
            | Asset::Processing
            | Asset::IoS1X2
            | Asset::ControlUnit
            | Asset::CoolingFans
            | Asset::DistributedPowerSupplyConverter
            | Asset::PowerGeneratorBatterySystem
            | Asset::Backhaul
            | Asset::CoreEdge
            | Asset::CoreNode
            | Asset::RegionalEdge
            | Asset::RegionalNode => CostType::CapexAndOpex,
        }
    }

    pub fn bucket(&self) -> CostBucket {
        match self {
            Asset::SingleSectorAntenna
            | Asset::SingleRemoteRadioUnit
            | Asset::IoFronthaul
            | Asset::Processing
            | Asset::IoS1X2
            | Asset::ControlUnit
            | Asset::CoolingFans
            | Asset::DistributedPowerSupplyConverter
            | Asset::BbuCabinet => CostBucket::Ran,

            Asset::Backhaul => CostBucket::BackhaulFronthaul,

            Asset::Tower
            | Asset::CivilMaterials
            | Asset::Transportation
            | Asset::Installation
            | Asset::SiteRental
            | Asset::PowerGeneratorBatterySystem => CostBucket::Civils,

            Asset::CoreEdge
            | Asset::CoreNode
            | Asset::RegionalEdge
            | Asset::RegionalNode => CostBucket::CoreNetwork,

            Asset::PerSiteSpectrumAcquisitionCost
            | Asset::PerSiteAdministrationCost => CostBucket::AdminAndOps,
        }
    }

    pub fn network_asset(&self) -> Option<NetworkAsset> {
        match self {
            Asset::CoreEdge     => Some(NetworkAsset::CoreEdge),
            Asset::CoreNode     => Some(NetworkAsset::CoreNode),
            Asset::RegionalEdge => Some(NetworkAsset::RegionalEdge),
            Asset::RegionalNode => Some(NetworkAsset::RegionalNode),
            _ => None,
        }
    }

    pub fn is_regional(&self) -> bool {
        matches!(self, Asset::RegionalEdge | Asset::RegionalNode)
    }

    /// Passive site assets: shared from `pss` upwards.
    fn is_passive_site(&self) -> bool {
        self.bucket() == CostBucket::Civils
    }

    /// Whether operators split this asset's cost under `sharing`.
    pub fn is_shared_under(&self, sharing: SharingModel) -> bool {
        match sharing {
            SharingModel::Baseline => false,
            SharingModel::Pss => self.is_passive_site(),
            SharingModel::Psb => self.is_passive_site() || *self == Asset::Backhaul,
            SharingModel::Moran => {
                self.is_passive_site()
                    || *self == Asset::Backhaul
                    || self.bucket() == CostBucket::Ran
            }
            SharingModel::Cns => self.bucket() != CostBucket::AdminAndOps,
        }
    }
}

/// Per-bucket cost totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBuckets {
    pub ran:                Usd,
    pub backhaul_fronthaul: Usd,
    pub civils:             Usd,
    pub core_network:       Usd,
    pub admin_and_ops:      Usd,
}

impl CostBuckets {
    pub fn add_item(&mut self, bucket: CostBucket, cost: Usd) {
        match bucket {
            CostBucket::Ran               => self.ran += cost,
            CostBucket::BackhaulFronthaul => self.backhaul_fronthaul += cost,
            CostBucket::Civils            => self.civils += cost,
            CostBucket::CoreNetwork       => self.core_network += cost,
            CostBucket::AdminAndOps       => self.admin_and_ops += cost,
        }
    }

    pub fn accumulate(&mut self, other: &CostBuckets) {
        self.ran += other.ran;
        self.backhaul_fronthaul += other.backhaul_fronthaul;
        self.civils += other.civils;
        self.core_network += other.core_network;
        self.admin_and_ops += other.admin_and_ops;
    }

    /// Sum in fixed bucket order.
    pub fn total(&self) -> Usd {
        self.ran + self.backhaul_fronthaul + self.civils + self.core_network + self.admin_and_ops
    }

    pub fn get(&self, bucket: CostBucket) -> Usd {
        match bucket {
            CostBucket::Ran               => self.ran,
            CostBucket::BackhaulFronthaul => self.backhaul_fronthaul,
            CostBucket::Civils            => self.civils,
            CostBucket::CoreNetwork       => self.core_network,
            CostBucket::AdminAndOps       => self.admin_and_ops,
        }
    }
}
