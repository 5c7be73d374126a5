//! Per-identity checkpoint history.
//!
//! Each identity has one append-only list of [`Checkpoint`]s. A checkpoint is
//! submitted to the proof contract when one is configured; whatever happens
//! there, it is then appended to the local history, which is the list callers
//! read back. Records are never rewritten, so a proof attached at append time
//! stays attached.

use crate::chain::{CheckpointSubmission, LedgerBackend, TxReceipt};
use crate::clock::Clock;
use crate::config::RegistryEndpoint;
use crate::content::ContentLocator;
use crate::hashing::{CommitmentHash, ContentAddress};
use crate::identity::Identity;
use crate::kv::{keys, AppendLog, KeyValueStore, KvError};
use crate::registry::ProofReference;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The ownership claim a checkpoint was registered alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRef {
    pub claim_id: String,
    pub proof: ProofReference,
}

/// How a checkpoint is anchored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointProof {
    /// Submitted to the proof contract.
    Ledger(TxReceipt),
    /// Ledger unavailable; the claim's proof stands in.
    ClaimReuse(ProofReference),
}

/// Summary of [`CheckpointProof`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchoring {
    /// Own transaction on the proof contract.
    OnChain,
    /// No own transaction, but the attached claim was mined.
    ClaimBacked,
    /// Nothing on chain.
    LocalOnly,
}

/// One registered version of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub address: ContentAddress,
    pub locator: ContentLocator,
    pub commitment: CommitmentHash,
    pub note: String,
    pub owner: Identity,
    pub created_at: u64,
    pub claim: Option<ClaimRef>,
    pub proof: Option<CheckpointProof>,
}

impl Checkpoint {
    pub fn anchoring(&self) -> Anchoring {
        match &self.proof {
            Some(CheckpointProof::Ledger(_)) => Anchoring::OnChain,
            Some(CheckpointProof::ClaimReuse(p)) if p.is_on_chain() => Anchoring::ClaimBacked,
            _ => Anchoring::LocalOnly,
        }
    }

    /// Transaction hash of the checkpoint's own ledger entry, if any.
    pub fn tx_hash(&self) -> Option<&str> {
        match &self.proof {
            Some(CheckpointProof::Ledger(receipt)) => Some(&receipt.tx_hash),
            _ => None,
        }
    }

    pub fn claim_id(&self) -> Option<&str> {
        self.claim.as_ref().map(|c| c.claim_id.as_str())
    }
}

/// Everything about a checkpoint the caller decides. The ledger fills in the
/// owner, timestamp and proof.
#[derive(Debug, Clone)]
pub struct CheckpointDraft {
    pub address: ContentAddress,
    pub locator: ContentLocator,
    pub commitment: CommitmentHash,
    pub note: String,
    pub claim: Option<ClaimRef>,
}

/// An identity's checkpoints in append order.
///
/// Version numbers are 1-based positions: the first checkpoint is version 1
/// and the most recent has the highest number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointHistory {
    entries: Vec<Checkpoint>,
}

impl CheckpointHistory {
    pub fn new(entries: Vec<Checkpoint>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checkpoint with the given 1-based version number.
    pub fn version(&self, version: usize) -> Option<&Checkpoint> {
        version.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn latest(&self) -> Option<&Checkpoint> {
        self.entries.last()
    }

    /// `(version, checkpoint)` pairs, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &Checkpoint)> {
        self.entries.iter().enumerate().map(|(i, c)| (i + 1, c))
    }

    /// `(version, checkpoint)` pairs, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = (usize, &Checkpoint)> {
        self.iter().rev()
    }

    pub fn as_slice(&self) -> &[Checkpoint] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Checkpoint> {
        self.entries
    }
}

pub struct CheckpointLedger {
    backend: Option<Arc<dyn LedgerBackend>>,
    endpoint: Option<RegistryEndpoint>,
    history: AppendLog<Checkpoint>,
    clock: Arc<dyn Clock>,
}

impl CheckpointLedger {
    /// Ledger with only the local history.
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend: None,
            endpoint: None,
            history: AppendLog::new(kv),
            clock,
        }
    }

    /// Submit checkpoints to `endpoint` through `backend` when both are set.
    pub fn with_chain(
        mut self,
        backend: Option<Arc<dyn LedgerBackend>>,
        endpoint: Option<RegistryEndpoint>,
    ) -> Self {
        self.backend = backend;
        self.endpoint = endpoint;
        self
    }

    /// Anchor `draft` as far as possible and append it to `owner`'s history.
    ///
    /// Only the local append can fail.
    pub async fn append(
        &self,
        draft: CheckpointDraft,
        owner: &Identity,
    ) -> Result<Checkpoint, KvError> {
        let submitted = self.submit(&draft, owner).await;
        let proof = match submitted {
            Some(receipt) => Some(CheckpointProof::Ledger(receipt)),
            None => draft
                .claim
                .as_ref()
                .map(|c| CheckpointProof::ClaimReuse(c.proof.clone())),
        };

        let now = self.clock.now();
        let checkpoint = Checkpoint {
            address: draft.address,
            locator: draft.locator,
            commitment: draft.commitment,
            note: draft.note,
            owner: owner.clone(),
            created_at: now,
            claim: draft.claim,
            proof,
        };
        // Stamps strictly increase within a history, even inside one clock tick.
        let (version, checkpoint) = self
            .history
            .append_with(&keys::checkpoints(owner), |existing| {
                let created_at = existing
                    .last()
                    .map_or(now, |last| now.max(last.created_at + 1));
                Checkpoint {
                    created_at,
                    ..checkpoint.clone()
                }
            })
            .await?;
        debug!(version, anchoring = ?checkpoint.anchoring(), "checkpoint appended");
        Ok(checkpoint)
    }

    async fn submit(&self, draft: &CheckpointDraft, owner: &Identity) -> Option<TxReceipt> {
        let (endpoint, backend) = match (&self.endpoint, &self.backend) {
            (Some(endpoint), Some(backend)) => (endpoint, backend),
            _ => {
                debug!("proof contract not configured, keeping checkpoint locally");
                return None;
            }
        };

        let submission = CheckpointSubmission {
            address: draft.address,
            locator: draft.locator.clone(),
            note: draft.note.clone(),
            owner: owner.clone(),
        };
        match backend.submit_checkpoint(endpoint, &submission).await {
            Ok(receipt) if !receipt.tx_hash.trim().is_empty() => {
                info!(tx_hash = %receipt.tx_hash, block = receipt.block_number, "checkpoint submitted");
                Some(receipt)
            }
            Ok(_) => {
                warn!("proof contract returned a receipt without a transaction hash");
                None
            }
            Err(e) => {
                warn!(error = %e, "checkpoint submission failed, keeping checkpoint locally");
                None
            }
        }
    }

    /// `owner`'s history, oldest first.
    pub async fn list_history(&self, owner: &Identity) -> Result<CheckpointHistory, KvError> {
        Ok(CheckpointHistory::new(
            self.history.read(&keys::checkpoints(owner)).await?,
        ))
    }

    /// Remove `owner`'s local history. Claims and stored files are untouched.
    pub async fn clear_history(&self, owner: &Identity) -> Result<(), KvError> {
        self.history.clear(&keys::checkpoints(owner)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{LedgerFaults, MockLedger};
    use crate::clock::SteppingClock;
    use crate::hashing::{commitment, digest};
    use crate::kv::MemoryKvStore;

    fn owner() -> Identity {
        Identity::new("0xabc").unwrap()
    }

    fn endpoint() -> RegistryEndpoint {
        RegistryEndpoint::parse("0x3333333333333333333333333333333333333333").unwrap()
    }

    fn ledger() -> CheckpointLedger {
        CheckpointLedger::new(
            Arc::new(MemoryKvStore::new()),
            Arc::new(SteppingClock::new(1_700_000_000, 10)),
        )
    }

    fn draft(note: &str, claim: Option<ClaimRef>) -> CheckpointDraft {
        let address = digest(note.as_bytes());
        CheckpointDraft {
            address,
            locator: ContentLocator::Local("QmDraft".to_string()),
            commitment: commitment(&address, "0xabc"),
            note: note.to_string(),
            claim,
        }
    }

    fn chain_claim() -> ClaimRef {
        ClaimRef {
            claim_id: "7".to_string(),
            proof: ProofReference::OnChain(TxReceipt {
                tx_hash: "0xfeed".to_string(),
                block_number: 7,
            }),
        }
    }

    #[tokio::test]
    async fn test_local_only_without_claim() {
        let ledger = ledger();
        let checkpoint = ledger.append(draft("v1", None), &owner()).await.unwrap();
        assert_eq!(checkpoint.proof, None);
        assert_eq!(checkpoint.anchoring(), Anchoring::LocalOnly);
        assert_eq!(checkpoint.created_at, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_claim_proof_reused_when_ledger_unavailable() {
        let ledger = ledger();
        let checkpoint = ledger
            .append(draft("v1", Some(chain_claim())), &owner())
            .await
            .unwrap();
        assert_eq!(
            checkpoint.proof,
            Some(CheckpointProof::ClaimReuse(chain_claim().proof))
        );
        assert_eq!(checkpoint.anchoring(), Anchoring::ClaimBacked);
        assert_eq!(checkpoint.claim_id(), Some("7"));
    }

    #[tokio::test]
    async fn test_placeholder_claim_is_local_only() {
        let ledger = ledger();
        let claim = ClaimRef {
            claim_id: "ip-1".to_string(),
            proof: ProofReference::Placeholder("local-00".to_string()),
        };
        let checkpoint = ledger
            .append(draft("v1", Some(claim)), &owner())
            .await
            .unwrap();
        assert!(matches!(checkpoint.proof, Some(CheckpointProof::ClaimReuse(_))));
        assert_eq!(checkpoint.anchoring(), Anchoring::LocalOnly);
    }

    #[tokio::test]
    async fn test_chain_submission_fills_receipt() {
        let backend = MockLedger::new();
        let ledger = ledger().with_chain(Some(Arc::new(backend.clone())), Some(endpoint()));

        let checkpoint = ledger
            .append(draft("v1", Some(chain_claim())), &owner())
            .await
            .unwrap();
        assert_eq!(checkpoint.anchoring(), Anchoring::OnChain);
        assert!(checkpoint.tx_hash().is_some());
        assert_eq!(backend.checkpoints().len(), 1);
        assert_eq!(backend.checkpoints()[0].note, "v1");

        // Still recorded locally.
        assert_eq!(ledger.list_history(&owner()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_submission_still_appends() {
        let backend = MockLedger::new();
        backend.set_faults(LedgerFaults {
            reject_checkpoints: true,
            ..Default::default()
        });
        let ledger = ledger().with_chain(Some(Arc::new(backend)), Some(endpoint()));

        let checkpoint = ledger.append(draft("v1", None), &owner()).await.unwrap();
        assert_eq!(checkpoint.anchoring(), Anchoring::LocalOnly);
        assert_eq!(ledger.list_history(&owner()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_backend_without_endpoint_is_not_used() {
        let backend = MockLedger::new();
        let ledger = ledger().with_chain(Some(Arc::new(backend.clone())), None);
        ledger.append(draft("v1", None), &owner()).await.unwrap();
        assert!(backend.checkpoints().is_empty());
    }

    #[tokio::test]
    async fn test_history_versions() {
        let ledger = ledger();
        for note in ["v1", "v2", "v3"] {
            ledger.append(draft(note, None), &owner()).await.unwrap();
        }

        let history = ledger.list_history(&owner()).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.version(1).map(|c| c.note.as_str()), Some("v1"));
        assert_eq!(history.latest().map(|c| c.note.as_str()), Some("v3"));
        assert!(history.version(0).is_none());
        assert!(history.version(4).is_none());

        let newest: Vec<(usize, &str)> = history
            .newest_first()
            .map(|(v, c)| (v, c.note.as_str()))
            .collect();
        assert_eq!(newest, vec![(3, "v3"), (2, "v2"), (1, "v1")]);

        let stamps: Vec<u64> = history.iter().map(|(_, c)| c.created_at).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_same_tick_appends_get_distinct_stamps() {
        // The clock never moves.
        let ledger = CheckpointLedger::new(
            Arc::new(MemoryKvStore::new()),
            Arc::new(SteppingClock::new(1_700_000_000, 0)),
        );
        let first = ledger.append(draft("v1", None), &owner()).await.unwrap();
        let second = ledger.append(draft("v1", None), &owner()).await.unwrap();
        let third = ledger.append(draft("v1", None), &owner()).await.unwrap();

        assert_eq!(first.created_at, 1_700_000_000);
        assert_eq!(second.created_at, 1_700_000_001);
        assert_eq!(third.created_at, 1_700_000_002);

        // The returned checkpoint is the one stored.
        let history = ledger.list_history(&owner()).await.unwrap();
        assert_eq!(history.version(2), Some(&second));
    }

    #[tokio::test]
    async fn test_clear_history() {
        let ledger = ledger();
        ledger.append(draft("v1", None), &owner()).await.unwrap();
        ledger.clear_history(&owner()).await.unwrap();
        assert!(ledger.list_history(&owner()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_histories_are_per_identity() {
        let ledger = ledger();
        let other = Identity::new("0xdef").unwrap();
        ledger.append(draft("v1", None), &owner()).await.unwrap();
        assert!(ledger.list_history(&other).await.unwrap().is_empty());
        assert_eq!(
            ledger
                .list_history(&Identity::new("0xABC").unwrap())
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
