//! Strategy decoder — turns an encoded strategy identifier into a typed
//! configuration record.
//!
//! FORMAT: `generation_core_backhaul_sharing_rollout_spectrum_tax_integration`
//!   e.g. `4G_epc_microwave_baseline_baseline_baseline_baseline_baseline`
//!
//! RULES:
//!   - The first five tokens (the network design) are always required.
//!   - The spectrum, tax and integration tokens may be omitted, but only by
//!     callers that never ask for them. Asking for an absent token fails;
//!     there are no defaults for omitted trailing fields.
//!   - Tokens past the eighth are ignored.
//!   - Decoding happens once per run. Downstream code receives the typed
//!     `Strategy` and never re-splits the string.

use crate::{
    error::{CostError, CostResult},
    region::Geotype,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const STRATEGY_DELIMITER: char = '_';

/// Number of tokens that must always be present.
const NETWORK_DESIGN_TOKENS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    #[serde(rename = "3G")]
    ThreeG,
    #[serde(rename = "4G")]
    FourG,
}

impl Generation {
    pub fn from_token(token: &str) -> CostResult<Self> {
        match token {
            "3G" => Ok(Self::ThreeG),
            "4G" => Ok(Self::FourG),
            other => Err(unknown("generation", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeG => "3G",
            Self::FourG  => "4G",
        }
    }
}

/// Core network type. Qualifies the core and regional node prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreType {
    Epc,
    Nsa,
    Sa,
}

impl CoreType {
    pub fn from_token(token: &str) -> CostResult<Self> {
        match token {
            "epc" => Ok(Self::Epc),
            "nsa" => Ok(Self::Nsa),
            "sa"  => Ok(Self::Sa),
            other => Err(unknown("core", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epc => "epc",
            Self::Nsa => "nsa",
            Self::Sa  => "sa",
        }
    }
}

/// Backhaul medium. Anything other than fiber or microwave is carried
/// through as `Other` so the resolver can report it instead of the decoder
/// rejecting the whole strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackhaulMedium {
    Fiber,
    Microwave,
    Other(String),
}

impl BackhaulMedium {
    pub fn from_token(token: &str) -> CostResult<Self> {
        match token {
            "fiber"     => Ok(Self::Fiber),
            "microwave" => Ok(Self::Microwave),
            ""          => Err(unknown("backhaul", token)),
            other       => Ok(Self::Other(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Fiber        => "fiber",
            Self::Microwave    => "microwave",
            Self::Other(other) => other,
        }
    }
}

/// Infrastructure sharing model. See `asset::Asset::is_shared_under` for the
/// asset set each model splits between operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingModel {
    /// Nothing shared.
    Baseline,
    /// Passive site sharing.
    Pss,
    /// Passive site + backhaul sharing.
    Psb,
    /// Multi-operator RAN.
    Moran,
    /// Complete network sharing, including core and regional network.
    Cns,
}

impl SharingModel {
    pub fn from_token(token: &str) -> CostResult<Self> {
        match token {
            "baseline" => Ok(Self::Baseline),
            "pss"      => Ok(Self::Pss),
            "psb"      => Ok(Self::Psb),
            "moran"    => Ok(Self::Moran),
            "cns"      => Ok(Self::Cns),
            other      => Err(unknown("sharing", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Pss      => "pss",
            Self::Psb      => "psb",
            Self::Moran    => "moran",
            Self::Cns      => "cns",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutPolicy {
    Baseline,
    /// Single rollout network: full co-location in rural areas.
    Srn,
}

impl RolloutPolicy {
    pub fn from_token(token: &str) -> CostResult<Self> {
        match token {
            "baseline" => Ok(Self::Baseline),
            "srn"      => Ok(Self::Srn),
            other      => Err(unknown("rollout", other)),
        }
    }
}

/// Price tier shared by the spectrum and tax tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Baseline,
    Low,
    High,
}

impl Tier {
    pub fn from_token(field: &'static str, token: &str) -> CostResult<Self> {
        match token {
            "baseline" => Ok(Self::Baseline),
            "low"      => Ok(Self::Low),
            "high"     => Ok(Self::High),
            other      => Err(unknown(field, other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Low      => "low",
            Self::High     => "high",
        }
    }
}

/// Regional integration flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    Baseline,
    Integration,
}

impl Integration {
    pub fn from_token(token: &str) -> CostResult<Self> {
        match token {
            "baseline"    => Ok(Self::Baseline),
            "integration" => Ok(Self::Integration),
            other         => Err(unknown("integration", other)),
        }
    }
}

/// A decoded strategy. Built once with `Strategy::parse` and passed by
/// reference to every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    raw:             String,
    pub generation:  Generation,
    pub core:        CoreType,
    pub backhaul:    BackhaulMedium,
    pub sharing:     SharingModel,
    pub rollout:     RolloutPolicy,
    spectrum_tier:   Option<Tier>,
    tax_tier:        Option<Tier>,
    integration:     Option<Integration>,
}

impl Strategy {
    pub fn parse(raw: &str) -> CostResult<Self> {
        let tokens: Vec<&str> = raw.split(STRATEGY_DELIMITER).collect();

        let present = if raw.is_empty() { 0 } else { tokens.len() };
        if present < NETWORK_DESIGN_TOKENS {
            let (field, position) = FIELDS[present];
            return Err(CostError::MalformedStrategy {
                strategy: raw.to_string(),
                field,
                position,
            });
        }

        let strategy = Self {
            raw:           raw.to_string(),
            generation:    Generation::from_token(tokens[0])?,
            core:          CoreType::from_token(tokens[1])?,
            backhaul:      BackhaulMedium::from_token(tokens[2])?,
            sharing:       SharingModel::from_token(tokens[3])?,
            rollout:       RolloutPolicy::from_token(tokens[4])?,
            spectrum_tier: tokens.get(5).map(|t| Tier::from_token("spectrum", t)).transpose()?,
            tax_tier:      tokens.get(6).map(|t| Tier::from_token("tax", t)).transpose()?,
            integration:   tokens.get(7).copied().map(Integration::from_token).transpose()?,
        };

        if tokens.len() > FIELDS.len() {
            log::debug!(
                "strategy '{raw}': ignoring {} trailing token(s)",
                tokens.len() - FIELDS.len()
            );
        }

        Ok(strategy)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn spectrum_tier(&self) -> CostResult<Tier> {
        self.spectrum_tier.ok_or_else(|| self.missing(5))
    }

    pub fn tax_tier(&self) -> CostResult<Tier> {
        self.tax_tier.ok_or_else(|| self.missing(6))
    }

    pub fn integration(&self) -> CostResult<Integration> {
        self.integration.ok_or_else(|| self.missing(7))
    }

    /// True when the single-rollout-network policy forces full
    /// co-location for this geotype.
    pub fn forces_co_location(&self, geotype: Geotype) -> bool {
        self.rollout == RolloutPolicy::Srn && geotype == Geotype::Rural
    }

    /// The sharing model that actually applies to a region.
    pub fn effective_sharing(&self, geotype: Geotype) -> SharingModel {
        if self.forces_co_location(geotype) {
            SharingModel::Cns
        } else {
            self.sharing
        }
    }

    fn missing(&self, position: usize) -> CostError {
        CostError::MalformedStrategy {
            strategy: self.raw.clone(),
            field:    FIELDS[position].0,
            position: FIELDS[position].1,
        }
    }
}

impl FromStr for Strategy {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::parse(s)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// (field name, token position) in encoding order.
const FIELDS: [(&str, usize); 8] = [
    ("generation", 0),
    ("core", 1),
    ("backhaul", 2),
    ("sharing", 3),
    ("rollout", 4),
    ("spectrum", 5),
    ("tax", 6),
    ("integration", 7),
];

fn unknown(field: &'static str, token: &str) -> CostError {
    CostError::UnknownToken {
        field,
        token: token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_all_eight_fields() {
        let s = Strategy::parse("4G_epc_microwave_moran_srn_high_low_integration").unwrap();
        assert_eq!(s.generation, Generation::FourG);
        assert_eq!(s.core, CoreType::Epc);
        assert_eq!(s.backhaul, BackhaulMedium::Microwave);
        assert_eq!(s.sharing, SharingModel::Moran);
        assert_eq!(s.rollout, RolloutPolicy::Srn);
        assert_eq!(s.spectrum_tier().unwrap(), Tier::High);
        assert_eq!(s.tax_tier().unwrap(), Tier::Low);
        assert_eq!(s.integration().unwrap(), Integration::Integration);
    }

    #[test]
    fn short_strategy_fails_only_when_trailing_field_is_needed() {
        let s = Strategy::parse("3G_nsa_fiber_pss_baseline").unwrap();
        assert!(matches!(
            s.spectrum_tier(),
            Err(CostError::MalformedStrategy { field: "spectrum", position: 5, .. })
        ));
        assert!(s.tax_tier().is_err());
        assert!(s.integration().is_err());
    }

    #[test]
    fn too_few_tokens_names_the_first_missing_field() {
        let err = Strategy::parse("4G_epc_fiber").unwrap_err();
        assert!(
            matches!(err, CostError::MalformedStrategy { field: "sharing", position: 3, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn unknown_backhaul_is_kept_for_the_resolver() {
        let s = Strategy::parse("4G_epc_satellite_baseline_baseline").unwrap();
        assert_eq!(s.backhaul, BackhaulMedium::Other("satellite".into()));
    }

    #[test]
    fn unknown_sharing_token_is_rejected() {
        let err = Strategy::parse("4G_epc_fiber_everything_baseline").unwrap_err();
        assert!(matches!(err, CostError::UnknownToken { field: "sharing", .. }));
    }

    #[test]
    fn srn_forces_cns_only_in_rural_areas() {
        let s = Strategy::parse("4G_epc_fiber_pss_srn").unwrap();
        assert_eq!(s.effective_sharing(Geotype::Rural), SharingModel::Cns);
        assert_eq!(s.effective_sharing(Geotype::Urban), SharingModel::Pss);
        assert_eq!(s.effective_sharing(Geotype::Suburban), SharingModel::Pss);
    }
}
