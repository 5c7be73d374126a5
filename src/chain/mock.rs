//! Mock wallet and ledger for testing.
//!
//! Both mocks share state across clones so a test can keep a handle for
//! toggling failures and inspecting submissions after moving a clone into the
//! service.

use super::traits::*;
use crate::config::RegistryEndpoint;
use crate::identity::Identity;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock wallet session.
#[derive(Clone)]
pub struct MockWallet {
    state: Arc<Mutex<WalletState>>,
}

struct WalletState {
    identity: Option<Identity>,
    network: Option<u64>,
    allow_switch: bool,
    switch_attempts: usize,
}

impl MockWallet {
    /// Wallet connected as `identity` on `chain_id`, accepting switches.
    pub fn connected(identity: Identity, chain_id: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(WalletState {
                identity: Some(identity),
                network: Some(chain_id),
                allow_switch: true,
                switch_attempts: 0,
            })),
        }
    }

    /// Wallet present but with no resolvable network.
    pub fn without_network(identity: Identity) -> Self {
        let wallet = Self::connected(identity, 0);
        wallet.state.lock().unwrap().network = None;
        wallet
    }

    pub fn set_allow_switch(&self, allow: bool) {
        self.state.lock().unwrap().allow_switch = allow;
    }

    pub fn switch_attempts(&self) -> usize {
        self.state.lock().unwrap().switch_attempts
    }

    pub fn network(&self) -> Option<u64> {
        self.state.lock().unwrap().network
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn current_identity(&self) -> Option<Identity> {
        self.state.lock().unwrap().identity.clone()
    }

    async fn current_network(&self) -> Option<u64> {
        self.state.lock().unwrap().network
    }

    async fn switch_network(&self, chain_id: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        state.switch_attempts += 1;
        if state.allow_switch {
            state.network = Some(chain_id);
            true
        } else {
            false
        }
    }
}

/// Failure modes for [`MockLedger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerFaults {
    pub reject_claims: bool,
    pub reject_checkpoints: bool,
    pub fail_queries: bool,
    /// Claims succeed on chain but come back with an unparseable receipt.
    pub malformed_claim_receipts: bool,
}

/// Mock registry/ledger contract.
#[derive(Clone, Default)]
pub struct MockLedger {
    state: Arc<Mutex<LedgerState>>,
}

#[derive(Default)]
struct LedgerState {
    faults: LedgerFaults,
    block: u64,
    claims: HashMap<String, String>,
    checkpoints: Vec<CheckpointSubmission>,
    contracts_seen: Vec<String>,
}

impl LedgerState {
    fn next_receipt(&mut self, tag: &str) -> TxReceipt {
        self.block += 1;
        let mut hasher = Sha256::new();
        hasher.update(tag.as_bytes());
        hasher.update(self.block.to_le_bytes());
        TxReceipt {
            tx_hash: format!("0x{}", hex::encode(hasher.finalize())),
            block_number: 1_000 + self.block,
        }
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_faults(&self, faults: LedgerFaults) {
        self.state.lock().unwrap().faults = faults;
    }

    /// Claims accepted on chain.
    pub fn claim_count(&self) -> usize {
        self.state.lock().unwrap().claims.len()
    }

    /// Checkpoints accepted on chain, in submission order.
    pub fn checkpoints(&self) -> Vec<CheckpointSubmission> {
        self.state.lock().unwrap().checkpoints.clone()
    }

    /// Contract addresses every call was made against.
    pub fn contracts_seen(&self) -> Vec<String> {
        self.state.lock().unwrap().contracts_seen.clone()
    }
}

#[async_trait]
impl LedgerBackend for MockLedger {
    async fn submit_claim(
        &self,
        contract: &RegistryEndpoint,
        claim: &ClaimSubmission,
    ) -> Result<ClaimReceipt, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.contracts_seen.push(contract.address().to_string());
        if state.faults.reject_claims {
            return Err(ChainError::Rejected("claim reverted".to_string()));
        }

        let receipt = state.next_receipt("claim");
        let claim_id = if state.faults.malformed_claim_receipts {
            String::new()
        } else {
            format!("{}", state.block)
        };
        state
            .claims
            .insert(claim_id.clone(), claim.owner.normalized());
        Ok(ClaimReceipt { claim_id, receipt })
    }

    async fn submit_checkpoint(
        &self,
        contract: &RegistryEndpoint,
        checkpoint: &CheckpointSubmission,
    ) -> Result<TxReceipt, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.contracts_seen.push(contract.address().to_string());
        if state.faults.reject_checkpoints {
            return Err(ChainError::Rejected("checkpoint reverted".to_string()));
        }
        state.checkpoints.push(checkpoint.clone());
        Ok(state.next_receipt("checkpoint"))
    }

    async fn query_ownership(
        &self,
        contract: &RegistryEndpoint,
        claim_id: &str,
        owner: &Identity,
    ) -> Result<bool, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.contracts_seen.push(contract.address().to_string());
        if state.faults.fail_queries {
            return Err(ChainError::Rpc("query timed out".to_string()));
        }
        Ok(state
            .claims
            .get(claim_id)
            .map(|o| *o == owner.normalized())
            .unwrap_or(false))
    }
}
