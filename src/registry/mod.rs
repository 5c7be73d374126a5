//! Ownership claims ("IP assets").
//!
//! A claim binds a content address to the identity that registered it.
//! [`OwnershipRegistry::register_claim`] tries the registry contract first and
//! drops to a local claim whenever any part of the chain path is missing or
//! fails:
//!
//! 1. a wallet session is attached and reports its network
//! 2. a registry endpoint and a ledger backend are configured
//! 3. the wallet is on a home network, or switches to one when asked once
//! 4. the contract accepts the claim and returns a well-formed receipt
//!
//! Local claims carry a [`ProofReference::Placeholder`] so nobody mistakes them
//! for anchored ones. Every claim, on-chain or not, is appended to the owner's
//! local claim set.

pub mod license;

pub use license::{License, LicenseTerms};

use crate::chain::network::{home_network, is_home_network};
use crate::chain::{
    ChainError, ClaimReceipt, ClaimSubmission, LedgerBackend, TxReceipt, WalletProvider,
};
use crate::clock::Clock;
use crate::config::RegistryEndpoint;
use crate::content::ContentLocator;
use crate::hashing::ContentAddress;
use crate::identity::Identity;
use crate::kv::{keys, AppendLog, KeyValueStore, KvError};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Prefix of claim ids issued by the local fallback.
pub const LOCAL_CLAIM_PREFIX: &str = "ip-";

/// Prefix of placeholder proof markers.
pub const PLACEHOLDER_PREFIX: &str = "local-";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Local storage error: {0}")]
    Local(#[from] KvError),

    #[error("No claim '{0}' held by this identity")]
    UnknownClaim(String),

    #[error("Royalty percentage {0} is above 100")]
    InvalidRoyalty(u8),
}

/// Descriptive metadata submitted with a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimMetadata {
    pub name: String,
    pub description: String,
    pub kind: String,
}

impl ClaimMetadata {
    /// Metadata for a registered file.
    pub fn file(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: "file".to_string(),
        }
    }
}

/// Evidence that a claim exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofReference {
    /// The registry contract mined the claim.
    OnChain(TxReceipt),
    /// Local marker (`local-<hex>`). Not an on-chain reference.
    Placeholder(String),
}

impl ProofReference {
    pub fn is_on_chain(&self) -> bool {
        matches!(self, Self::OnChain(_))
    }

    /// Transaction hash, or the placeholder marker.
    pub fn reference(&self) -> &str {
        match self {
            Self::OnChain(receipt) => &receipt.tx_hash,
            Self::Placeholder(marker) => marker,
        }
    }
}

/// A registered ownership claim. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipClaim {
    pub claim_id: String,
    pub address: ContentAddress,
    pub locator: ContentLocator,
    pub owner: Identity,
    pub created_at: u64,
    pub proof: ProofReference,
    pub metadata: ClaimMetadata,
}

impl OwnershipClaim {
    /// Whether the claim id was issued locally rather than by the contract.
    pub fn is_local(&self) -> bool {
        !self.proof.is_on_chain()
    }
}

pub struct OwnershipRegistry {
    wallet: Option<Arc<dyn WalletProvider>>,
    backend: Option<Arc<dyn LedgerBackend>>,
    endpoint: Option<RegistryEndpoint>,
    use_testnet: bool,
    claims: AppendLog<OwnershipClaim>,
    licenses: AppendLog<License>,
    clock: Arc<dyn Clock>,
}

impl OwnershipRegistry {
    /// Registry with only the local tier.
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            wallet: None,
            backend: None,
            endpoint: None,
            use_testnet: false,
            claims: AppendLog::new(kv.clone()),
            licenses: AppendLog::new(kv),
            clock,
        }
    }

    /// Enable the chain tier. Each part may be absent; the tier is only used
    /// when all of them are present at call time.
    pub fn with_chain(
        mut self,
        wallet: Option<Arc<dyn WalletProvider>>,
        backend: Option<Arc<dyn LedgerBackend>>,
        endpoint: Option<RegistryEndpoint>,
        use_testnet: bool,
    ) -> Self {
        self.wallet = wallet;
        self.backend = backend;
        self.endpoint = endpoint;
        self.use_testnet = use_testnet;
        self
    }

    /// Register a claim for `address` under `owner`.
    ///
    /// Chain failures never surface here. Only a failure to persist the claim
    /// locally is an error.
    pub async fn register_claim(
        &self,
        address: &ContentAddress,
        locator: &ContentLocator,
        metadata: ClaimMetadata,
        owner: &Identity,
    ) -> Result<OwnershipClaim, RegistryError> {
        let submission = ClaimSubmission {
            address: *address,
            locator: locator.clone(),
            metadata,
            owner: owner.clone(),
        };

        let (claim_id, proof) = match self.claim_on_chain(&submission).await {
            Ok(receipt) => {
                info!(
                    claim_id = %receipt.claim_id,
                    tx_hash = %receipt.receipt.tx_hash,
                    "ownership claim registered on chain"
                );
                (receipt.claim_id, ProofReference::OnChain(receipt.receipt))
            }
            Err(e) => {
                match e {
                    ChainError::NoWallet | ChainError::NoNetwork | ChainError::NotConfigured => {
                        debug!(reason = %e, "registry chain tier unavailable, claiming locally")
                    }
                    _ => warn!(error = %e, "on-chain claim failed, claiming locally"),
                }
                (local_claim_id(), ProofReference::Placeholder(placeholder_marker()))
            }
        };

        let claim = OwnershipClaim {
            claim_id,
            address: submission.address,
            locator: submission.locator,
            owner: submission.owner,
            created_at: self.clock.now(),
            proof,
            metadata: submission.metadata,
        };
        self.claims
            .append(&keys::claims(owner), claim.clone())
            .await?;
        Ok(claim)
    }

    async fn claim_on_chain(
        &self,
        submission: &ClaimSubmission,
    ) -> Result<ClaimReceipt, ChainError> {
        let wallet = self.wallet.as_ref().ok_or(ChainError::NoWallet)?;
        let chain_id = wallet
            .current_network()
            .await
            .ok_or(ChainError::NoNetwork)?;
        let (endpoint, backend) = match (&self.endpoint, &self.backend) {
            (Some(endpoint), Some(backend)) => (endpoint, backend),
            _ => return Err(ChainError::NotConfigured),
        };

        // The signer becomes the on-chain owner, so it must be the registering identity.
        let connected = wallet
            .current_identity()
            .await
            .ok_or(ChainError::NoWallet)?;
        if connected != submission.owner {
            return Err(ChainError::WrongAccount {
                connected: connected.to_string(),
                owner: submission.owner.to_string(),
            });
        }

        if !is_home_network(chain_id) {
            let home = home_network(self.use_testnet);
            debug!(from = chain_id, to = home.chain_id, "asking wallet to switch network");
            if !wallet.switch_network(home.chain_id).await {
                return Err(ChainError::SwitchFailed(home.chain_id));
            }
        }

        let receipt = backend.submit_claim(endpoint, submission).await?;
        if receipt.claim_id.trim().is_empty() {
            return Err(ChainError::MalformedReceipt("missing claim id".to_string()));
        }
        if receipt.receipt.tx_hash.trim().is_empty() {
            return Err(ChainError::MalformedReceipt(
                "missing transaction hash".to_string(),
            ));
        }
        Ok(receipt)
    }

    /// Whether `owner` holds `claim_id`. Never fails: any chain problem falls
    /// back to the local claim set, and a local read error reads as `false`.
    pub async fn verify_ownership(&self, claim_id: &str, owner: &Identity) -> bool {
        // Locally issued ids were never submitted, so the contract cannot know them.
        if !claim_id.starts_with(LOCAL_CLAIM_PREFIX) {
            if let (Some(endpoint), Some(backend)) = (&self.endpoint, &self.backend) {
                match backend.query_ownership(endpoint, claim_id, owner).await {
                    Ok(owned) => return owned,
                    Err(e) => {
                        warn!(error = %e, claim_id, "ownership query failed, checking local claims")
                    }
                }
            }
        }

        match self.claims.read(&keys::claims(owner)).await {
            Ok(claims) => claims
                .iter()
                .any(|c| c.claim_id == claim_id && c.owner == *owner),
            Err(e) => {
                warn!(error = %e, claim_id, "could not read local claims");
                false
            }
        }
    }

    /// Claims held by `owner`, in registration order.
    pub async fn list_claims(&self, owner: &Identity) -> Result<Vec<OwnershipClaim>, RegistryError> {
        Ok(self.claims.read(&keys::claims(owner)).await?)
    }

    /// Record licence terms for a claim `owner` holds.
    pub async fn create_license(
        &self,
        claim_id: &str,
        terms: LicenseTerms,
        owner: &Identity,
    ) -> Result<License, RegistryError> {
        terms.validate()?;
        let held = self
            .list_claims(owner)
            .await?
            .iter()
            .any(|c| c.claim_id == claim_id);
        if !held {
            return Err(RegistryError::UnknownClaim(claim_id.to_string()));
        }

        let license = License::new(claim_id, terms, self.clock.now());
        self.licenses
            .append(&keys::licenses(owner), license.clone())
            .await?;
        debug!(license_id = %license.license_id, claim_id, "licence created");
        Ok(license)
    }

    /// Licences `owner` has created, oldest first.
    pub async fn list_licenses(&self, owner: &Identity) -> Result<Vec<License>, RegistryError> {
        Ok(self.licenses.read(&keys::licenses(owner)).await?)
    }
}

fn local_claim_id() -> String {
    format!("{}{}", LOCAL_CLAIM_PREFIX, uuid::Uuid::new_v4())
}

fn placeholder_marker() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", PLACEHOLDER_PREFIX, hex::encode(bytes))
}
