//! Integration tests for tier selection and degradation.
//!
//! Uses the in-memory mocks for the wallet, the registry/proof contracts and
//! the content network. Every scenario checks that `register` still returns
//! an address, locator and commitment, and labels the result correctly.

use std::sync::Arc;
use storyproof::chain::network::{ETHEREUM, STORY};
use storyproof::chain::{LedgerFaults, MockLedger, MockWallet};
use storyproof::clock::SteppingClock;
use storyproof::config::{RegistryEndpoint, ServiceConfig};
use storyproof::content::{ContentLocator, MockContentNetwork, Provider};
use storyproof::hashing::{commitment, digest};
use storyproof::identity::Identity;
use storyproof::kv::MemoryKvStore;
use storyproof::ledger::{Anchoring, CheckpointProof};
use storyproof::registry::ProofReference;
use storyproof::service::{CheckpointService, FileUpload, ServiceError};

// === Test Fixtures ===

const IP_ASSET_CONTRACT: &str = "0x1111111111111111111111111111111111111111";
const PROOF_CONTRACT: &str = "0x2222222222222222222222222222222222222222";

fn creator() -> Identity {
    Identity::new("0xAbC").unwrap()
}

fn hello() -> FileUpload {
    FileUpload::new("hello.txt", "text/plain", b"hello".to_vec())
}

fn full_config() -> ServiceConfig {
    ServiceConfig {
        registry: Some(RegistryEndpoint::parse(IP_ASSET_CONTRACT).unwrap()),
        ledger: Some(RegistryEndpoint::parse(PROOF_CONTRACT).unwrap()),
        use_testnet: false,
    }
}

struct Rig {
    service: CheckpointService,
    kv: MemoryKvStore,
    wallet: MockWallet,
    ledger: MockLedger,
    network: MockContentNetwork,
}

fn rig(config: ServiceConfig, chain_id: u64) -> Rig {
    let kv = MemoryKvStore::new();
    let wallet = MockWallet::connected(creator(), chain_id);
    let ledger = MockLedger::new();
    let network = MockContentNetwork::new();
    let service = CheckpointService::builder(Arc::new(kv.clone()))
        .with_clock(Arc::new(SteppingClock::new(1_700_000_000, 1)))
        .with_config(config)
        .with_wallet(Arc::new(wallet.clone()))
        .with_ledger_backend(Arc::new(ledger.clone()))
        .with_content_network(Arc::new(network.clone()))
        .build();
    Rig {
        service,
        kv,
        wallet,
        ledger,
        network,
    }
}

fn assert_core_fields(checkpoint: &storyproof::ledger::Checkpoint) {
    let address = digest(b"hello");
    assert_eq!(checkpoint.address, address);
    assert_eq!(checkpoint.commitment, commitment(&address, "0xabc"));
    assert!(!checkpoint.locator.cid().is_empty());
}

// === Scenarios ===

#[tokio::test]
async fn test_everything_available_anchors_on_chain() {
    let rig = rig(full_config(), STORY.chain_id);
    let checkpoint = rig.service.register(hello(), &creator(), "v1").await.unwrap();

    assert_core_fields(&checkpoint);
    assert!(matches!(checkpoint.locator, ContentLocator::Network(_)));
    assert_eq!(checkpoint.anchoring(), Anchoring::OnChain);
    assert!(checkpoint.tx_hash().is_some());
    assert!(checkpoint.claim.as_ref().unwrap().proof.is_on_chain());

    assert_eq!(rig.network.put_count(), 1);
    assert_eq!(rig.ledger.claim_count(), 1);
    assert_eq!(rig.ledger.checkpoints().len(), 1);

    let metadata = rig
        .service
        .blob_metadata(&checkpoint.locator)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(metadata.provider, Provider::Network);

    let plain = rig
        .service
        .fetch_published(&checkpoint.locator, &creator())
        .await
        .unwrap();
    assert_eq!(plain, Some(b"hello".to_vec()));
}

#[tokio::test]
async fn test_nothing_configured_stays_local() {
    let service = CheckpointService::builder(Arc::new(MemoryKvStore::new())).build();
    let checkpoint = service.register(hello(), &creator(), "v1").await.unwrap();

    assert_core_fields(&checkpoint);
    assert!(!checkpoint.locator.is_resolvable());
    assert_eq!(checkpoint.anchoring(), Anchoring::LocalOnly);
    assert!(checkpoint.claim_id().unwrap().starts_with("ip-"));
}

#[tokio::test]
async fn test_every_backend_failing_still_registers() {
    let rig = rig(full_config(), STORY.chain_id);
    rig.network.set_offline(true);
    rig.ledger.set_faults(LedgerFaults {
        reject_claims: true,
        reject_checkpoints: true,
        fail_queries: true,
        malformed_claim_receipts: false,
    });

    let checkpoint = rig.service.register(hello(), &creator(), "v1").await.unwrap();
    assert_core_fields(&checkpoint);
    assert!(matches!(checkpoint.locator, ContentLocator::Local(_)));
    assert_eq!(checkpoint.anchoring(), Anchoring::LocalOnly);

    let history = rig.service.list_history(&creator()).await.unwrap();
    assert_eq!(history.len(), 1);
    // Ownership falls back to the local claim set.
    assert!(
        rig.service
            .verify_ownership(history.latest().unwrap(), &creator())
            .await
    );
}

#[tokio::test]
async fn test_ledger_down_reuses_claim_proof() {
    let rig = rig(full_config(), STORY.chain_id);
    rig.ledger.set_faults(LedgerFaults {
        reject_checkpoints: true,
        ..Default::default()
    });

    let checkpoint = rig.service.register(hello(), &creator(), "v1").await.unwrap();
    let claim = checkpoint.claim.clone().unwrap();
    assert!(matches!(claim.proof, ProofReference::OnChain(_)));
    assert_eq!(checkpoint.proof, Some(CheckpointProof::ClaimReuse(claim.proof)));
    assert_eq!(checkpoint.anchoring(), Anchoring::ClaimBacked);
}

#[tokio::test]
async fn test_wrong_network_switches_before_claiming() {
    let rig = rig(full_config(), ETHEREUM.chain_id);
    let checkpoint = rig.service.register(hello(), &creator(), "v1").await.unwrap();

    assert_eq!(rig.wallet.switch_attempts(), 1);
    assert_eq!(rig.wallet.network(), Some(STORY.chain_id));
    assert!(checkpoint.claim.unwrap().proof.is_on_chain());
}

#[tokio::test]
async fn test_refused_switch_degrades_claim_only() {
    let rig = rig(full_config(), ETHEREUM.chain_id);
    rig.wallet.set_allow_switch(false);

    let checkpoint = rig.service.register(hello(), &creator(), "v1").await.unwrap();
    assert!(!checkpoint.claim.as_ref().unwrap().proof.is_on_chain());
    assert_eq!(rig.ledger.claim_count(), 0);
    // The proof contract does not need the home network.
    assert_eq!(checkpoint.anchoring(), Anchoring::OnChain);
}

#[tokio::test]
async fn test_unconfigured_contracts_are_not_called() {
    let rig = rig(ServiceConfig::default(), STORY.chain_id);
    let checkpoint = rig.service.register(hello(), &creator(), "v1").await.unwrap();

    assert_eq!(checkpoint.anchoring(), Anchoring::LocalOnly);
    assert!(rig.ledger.contracts_seen().is_empty());
    assert_eq!(rig.wallet.switch_attempts(), 0);
}

#[tokio::test]
async fn test_contract_calls_use_configured_endpoints() {
    let rig = rig(full_config(), STORY.chain_id);
    rig.service.register(hello(), &creator(), "v1").await.unwrap();

    assert_eq!(
        rig.ledger.contracts_seen(),
        vec![IP_ASSET_CONTRACT.to_string(), PROOF_CONTRACT.to_string()]
    );
}

#[tokio::test]
async fn test_local_write_failure_aborts() {
    let rig = rig(full_config(), STORY.chain_id);
    rig.kv.set_fail_writes(true);

    let result = rig.service.register(hello(), &creator(), "v1").await;
    assert!(matches!(
        result,
        Err(ServiceError::Local(_)) | Err(ServiceError::Store(_))
    ));

    rig.kv.set_fail_writes(false);
    assert!(rig.service.list_history(&creator()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_chain_claims_verify_through_contract() {
    let rig = rig(full_config(), STORY.chain_id);
    let checkpoint = rig.service.register(hello(), &creator(), "v1").await.unwrap();

    assert!(rig.service.verify_ownership(&checkpoint, &creator()).await);

    let stranger = Identity::new("0xdef").unwrap();
    let mut presented = storyproof::service::ClaimedProof::from(&checkpoint);
    presented.owner = stranger;
    assert!(
        !rig.service
            .verify_proof(&checkpoint.address, &checkpoint.locator, &presented)
            .await
    );
}

#[tokio::test]
async fn test_published_blob_with_offline_network_is_unavailable() {
    let rig = rig(full_config(), STORY.chain_id);
    let checkpoint = rig.service.register(hello(), &creator(), "v1").await.unwrap();

    rig.network.set_offline(true);
    let result = rig
        .service
        .fetch_published(&checkpoint.locator, &creator())
        .await;
    assert!(matches!(result, Err(ServiceError::Store(_))));

    // The plaintext copy is still local.
    let stored = rig
        .service
        .retrieve_file(&checkpoint.address)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.bytes, b"hello");
}
