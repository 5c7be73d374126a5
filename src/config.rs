//! Service configuration.
//!
//! Contract endpoints are resolved once, when the service is built. An absent
//! or malformed endpoint means "no chain tier" rather than an error at call
//! time, so the registry and ledger only ever see `Option<RegistryEndpoint>`.

use std::fmt;
use thiserror::Error;
use tracing::warn;

pub const ENV_IP_ASSET_CONTRACT: &str = "STORYPROOF_IP_ASSET_CONTRACT";
pub const ENV_PROOF_CONTRACT: &str = "STORYPROOF_PROOF_CONTRACT";
pub const ENV_USE_TESTNET: &str = "STORYPROOF_USE_TESTNET";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Contract address is empty")]
    Empty,

    #[error("Contract address is the zero address")]
    ZeroAddress,

    #[error("Invalid contract address '{0}': expected 0x followed by 40 hex digits")]
    Malformed(String),
}

/// Address of a deployed registry or ledger contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEndpoint {
    address: String,
}

impl RegistryEndpoint {
    /// Parse a `0x`-prefixed 20-byte contract address.
    ///
    /// The zero address is the placeholder shipped in unconfigured
    /// deployments and is rejected.
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EndpointError::Empty);
        }
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| EndpointError::Malformed(trimmed.to_string()))?;
        if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EndpointError::Malformed(trimmed.to_string()));
        }
        if digits.chars().all(|c| c == '0') {
            return Err(EndpointError::ZeroAddress);
        }
        Ok(Self {
            address: format!("0x{}", digits.to_ascii_lowercase()),
        })
    }

    /// Lower-cased address with `0x` prefix.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for RegistryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// Configuration for [`CheckpointService`](crate::service::CheckpointService).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Ownership registry (IP asset) contract.
    pub registry: Option<RegistryEndpoint>,
    /// Checkpoint proof contract.
    pub ledger: Option<RegistryEndpoint>,
    /// Switch wallets to the Story testnet instead of mainnet.
    pub use_testnet: bool,
}

impl ServiceConfig {
    /// Read endpoints and network choice from the environment.
    ///
    /// Unset variables leave the tier unconfigured. Set but invalid addresses
    /// are logged and treated the same way.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let endpoint = |name: &str| {
            let raw = lookup(name)?;
            match RegistryEndpoint::parse(&raw) {
                Ok(endpoint) => Some(endpoint),
                Err(e) => {
                    warn!(variable = name, error = %e, "ignoring contract address");
                    None
                }
            }
        };

        Self {
            registry: endpoint(ENV_IP_ASSET_CONTRACT),
            ledger: endpoint(ENV_PROOF_CONTRACT),
            use_testnet: lookup(ENV_USE_TESTNET)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}
