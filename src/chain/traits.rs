//! Trait abstractions for wallet and ledger operations.
//!
//! Real wallet sessions and contract clients live outside this crate. The
//! registry and ledger only see these traits, which keeps the fallback
//! decisions testable without a chain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RegistryEndpoint;
use crate::content::ContentLocator;
use crate::hashing::ContentAddress;
use crate::identity::Identity;
use crate::registry::ClaimMetadata;

/// Chain-side failures. All of them are recoverable through the fallback tier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("No wallet session available")]
    NoWallet,

    #[error("Wallet network could not be determined")]
    NoNetwork,

    #[error("Switch to chain {0} failed")]
    SwitchFailed(u64),

    #[error("Contract not configured")]
    NotConfigured,

    #[error("Wallet is connected as {connected}, not {owner}")]
    WrongAccount { connected: String, owner: String },

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Malformed receipt: {0}")]
    MalformedReceipt(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

/// Reference to a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: u64,
}

/// Receipt for an ownership-claim registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    /// Claim identifier assigned by the registry contract.
    pub claim_id: String,
    pub receipt: TxReceipt,
}

/// Payload for `submit_claim`.
#[derive(Debug, Clone)]
pub struct ClaimSubmission {
    pub address: ContentAddress,
    pub locator: ContentLocator,
    pub metadata: ClaimMetadata,
    pub owner: Identity,
}

/// Payload for `submit_checkpoint`.
#[derive(Debug, Clone)]
pub struct CheckpointSubmission {
    pub address: ContentAddress,
    pub locator: ContentLocator,
    pub note: String,
    pub owner: Identity,
}

/// Wallet/session provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Identity of the connected account, if any.
    async fn current_identity(&self) -> Option<Identity>;

    /// Chain id the wallet is connected to, if it can be determined.
    async fn current_network(&self) -> Option<u64>;

    /// Ask the wallet to switch chains. Returns whether it did.
    async fn switch_network(&self, chain_id: u64) -> bool;
}

/// Registry/ledger contract client.
#[async_trait]
pub trait LedgerBackend: Send + Sync {
    async fn submit_claim(
        &self,
        contract: &RegistryEndpoint,
        claim: &ClaimSubmission,
    ) -> Result<ClaimReceipt, ChainError>;

    async fn submit_checkpoint(
        &self,
        contract: &RegistryEndpoint,
        checkpoint: &CheckpointSubmission,
    ) -> Result<TxReceipt, ChainError>;

    async fn query_ownership(
        &self,
        contract: &RegistryEndpoint,
        claim_id: &str,
        owner: &Identity,
    ) -> Result<bool, ChainError>;
}
