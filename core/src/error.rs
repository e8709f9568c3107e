use thiserror::Error;

#[derive(Error, Debug)]
pub enum CostError {
    #[error("Malformed strategy '{strategy}': missing {field} (token {position})")]
    MalformedStrategy {
        strategy: String,
        field:    &'static str,
        position: usize,
    },

    #[error("Unknown {field} token '{token}'")]
    UnknownToken { field: &'static str, token: String },

    #[error("Cost catalog has no entry for '{key}'")]
    MissingCatalogEntry { key: String },

    #[error("Network lookup has no '{key}' entry under '{asset_type}'")]
    MissingLookupEntry { asset_type: &'static str, key: String },

    #[error("No operator count configured for '{key}'")]
    MissingOperatorCount { key: String },

    #[error("No frequency allocation configured for {generation}")]
    MissingFrequencies { generation: String },

    #[error("Invalid bandwidth '{0}': expected '<channels>x<MHz>'")]
    InvalidBandwidth(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid region '{gid_id}': {reason}")]
    InvalidRegion { gid_id: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CostResult<T> = Result<T, CostError>;
