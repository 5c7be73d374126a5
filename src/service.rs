//! Checkpoint registration and verification.
//!
//! [`CheckpointService::register`] runs the whole pipeline for one upload:
//!
//! ```text
//! bytes ──digest──▶ address
//!   │                  │
//!   └─encrypt(secret)─▶ blob ──ContentStore──▶ locator
//!                      │
//!   address + secret ──▶ commitment
//!   (address, locator) ──OwnershipRegistry──▶ claim     (degrades)
//!   draft ──CheckpointLedger──▶ checkpoint              (degrades, local append required)
//! ```
//!
//! Hashing, encryption and local persistence abort a registration. The
//! content network, the registry contract and the proof contract only ever
//! degrade it to a lower tier.

use crate::chain::{LedgerBackend, WalletProvider};
use crate::clock::{Clock, SystemClock};
use crate::config::ServiceConfig;
use crate::content::{BlobMetadata, ContentLocator, ContentNetwork, ContentStore, StoreError};
use crate::crypto::{decrypt, encrypt, CryptoError};
use crate::hashing::{commitment, digest, ContentAddress};
use crate::identity::Identity;
use crate::kv::{keys, KeyValueStore, KvError};
use crate::ledger::{Checkpoint, CheckpointDraft, CheckpointHistory, CheckpointLedger, ClaimRef};
use crate::registry::{
    ClaimMetadata, License, LicenseTerms, OwnershipClaim, OwnershipRegistry, RegistryError,
};
use crate::serialization::{from_cbor, to_cbor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const DEFAULT_CLAIM_NAME: &str = "IP Asset";
const DEFAULT_CLAIM_DESCRIPTION: &str = "Intellectual Property Asset";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Local(#[from] KvError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Stored file for {0} does not match its address")]
    CorruptFile(ContentAddress),
}

/// A file handed to [`CheckpointService::register`].
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Plaintext copy of a registered file, kept under `file_<address>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub bytes: Vec<u8>,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub stored_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub matches: bool,
    pub computed: ContentAddress,
}

/// Hash `bytes` and compare against `expected` (hex, any case).
///
/// Needs no store, so callers without a service can use it directly.
pub fn verify_content(bytes: &[u8], expected: &str) -> VerificationResult {
    let computed = digest(bytes);
    VerificationResult {
        matches: computed.matches_hex(expected),
        computed,
    }
}

/// What a third party presents as proof of a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedProof {
    pub address: ContentAddress,
    pub locator: ContentLocator,
    pub owner: Identity,
    pub claim_id: Option<String>,
}

impl From<&Checkpoint> for ClaimedProof {
    fn from(checkpoint: &Checkpoint) -> Self {
        Self {
            address: checkpoint.address,
            locator: checkpoint.locator.clone(),
            owner: checkpoint.owner.clone(),
            claim_id: checkpoint.claim_id().map(str::to_string),
        }
    }
}

/// Assembles a [`CheckpointService`] from whichever backends are available.
pub struct ServiceBuilder {
    kv: Arc<dyn KeyValueStore>,
    config: ServiceConfig,
    clock: Arc<dyn Clock>,
    wallet: Option<Arc<dyn WalletProvider>>,
    ledger_backend: Option<Arc<dyn LedgerBackend>>,
    content_network: Option<Arc<dyn ContentNetwork>>,
}

impl ServiceBuilder {
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn with_ledger_backend(mut self, backend: Arc<dyn LedgerBackend>) -> Self {
        self.ledger_backend = Some(backend);
        self
    }

    pub fn with_content_network(mut self, network: Arc<dyn ContentNetwork>) -> Self {
        self.content_network = Some(network);
        self
    }

    pub fn build(self) -> CheckpointService {
        let mut content = ContentStore::new(self.kv.clone(), self.clock.clone());
        if let Some(network) = self.content_network {
            content = content.with_network(network);
        }

        let registry = OwnershipRegistry::new(self.kv.clone(), self.clock.clone()).with_chain(
            self.wallet,
            self.ledger_backend.clone(),
            self.config.registry,
            self.config.use_testnet,
        );
        let ledger = CheckpointLedger::new(self.kv.clone(), self.clock.clone())
            .with_chain(self.ledger_backend, self.config.ledger);

        CheckpointService {
            kv: self.kv,
            clock: self.clock,
            content,
            registry,
            ledger,
        }
    }
}

pub struct CheckpointService {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    content: ContentStore,
    registry: OwnershipRegistry,
    ledger: CheckpointLedger,
}

impl CheckpointService {
    /// Start building a service over `kv`. Without further configuration
    /// every tier runs locally.
    pub fn builder(kv: Arc<dyn KeyValueStore>) -> ServiceBuilder {
        ServiceBuilder {
            kv,
            config: ServiceConfig::default(),
            clock: Arc::new(SystemClock),
            wallet: None,
            ledger_backend: None,
            content_network: None,
        }
    }

    /// Register `file` as a new checkpoint in `identity`'s history.
    ///
    /// Identical bytes registered twice produce two checkpoints.
    pub async fn register(
        &self,
        file: FileUpload,
        identity: &Identity,
        note: &str,
    ) -> Result<Checkpoint, ServiceError> {
        let address = digest(&file.bytes);
        let secret = identity.secret();
        let blob = encrypt(&file.bytes, &secret)?;
        let locator = self.content.put(&file.name, blob.as_bytes()).await?;
        debug!(address = %address, locator = %locator, "blob published");

        self.store_file(&address, &file).await?;
        let commitment = commitment(&address, &secret);

        let metadata = ClaimMetadata::file(
            non_empty_or(&file.name, DEFAULT_CLAIM_NAME),
            non_empty_or(note, DEFAULT_CLAIM_DESCRIPTION),
        );
        let claim = match self
            .registry
            .register_claim(&address, &locator, metadata, identity)
            .await
        {
            Ok(claim) => Some(ClaimRef {
                claim_id: claim.claim_id,
                proof: claim.proof,
            }),
            Err(e) => {
                warn!(error = %e, "ownership claim failed, continuing without one");
                None
            }
        };

        let checkpoint = self
            .ledger
            .append(
                CheckpointDraft {
                    address,
                    locator,
                    commitment,
                    note: note.to_string(),
                    claim,
                },
                identity,
            )
            .await?;

        info!(
            address = %checkpoint.address,
            owner = %identity,
            anchoring = ?checkpoint.anchoring(),
            "checkpoint registered"
        );
        Ok(checkpoint)
    }

    async fn store_file(&self, address: &ContentAddress, file: &FileUpload) -> Result<(), KvError> {
        let record = StoredFile {
            bytes: file.bytes.clone(),
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.bytes.len() as u64,
            stored_at: self.clock.now(),
        };
        self.kv
            .set(&keys::stored_file(address), &to_cbor(&record)?)
            .await
    }

    /// Hash `bytes` and compare against `expected` (hex, any case).
    pub fn verify_content(&self, bytes: &[u8], expected: &str) -> VerificationResult {
        verify_content(bytes, expected)
    }

    /// Check a presented proof against a known address and locator.
    ///
    /// A proof naming a claim additionally needs the registry to confirm that
    /// the proof's owner holds it.
    pub async fn verify_proof(
        &self,
        address: &ContentAddress,
        locator: &ContentLocator,
        claimed: &ClaimedProof,
    ) -> bool {
        if claimed.address != *address || claimed.locator != *locator {
            return false;
        }
        match &claimed.claim_id {
            Some(claim_id) => self.registry.verify_ownership(claim_id, &claimed.owner).await,
            None => true,
        }
    }

    /// Whether `identity` registered `checkpoint`: same owner, a commitment
    /// that re-derives from its secret, and registry confirmation of any
    /// attached claim.
    pub async fn verify_ownership(&self, checkpoint: &Checkpoint, identity: &Identity) -> bool {
        if checkpoint.owner != *identity {
            return false;
        }
        if commitment(&checkpoint.address, &identity.secret()) != checkpoint.commitment {
            return false;
        }
        match checkpoint.claim_id() {
            Some(claim_id) => self.registry.verify_ownership(claim_id, identity).await,
            None => true,
        }
    }

    pub async fn list_history(&self, identity: &Identity) -> Result<CheckpointHistory, ServiceError> {
        Ok(self.ledger.list_history(identity).await?)
    }

    pub async fn clear_history(&self, identity: &Identity) -> Result<(), ServiceError> {
        Ok(self.ledger.clear_history(identity).await?)
    }

    pub async fn list_claims(&self, identity: &Identity) -> Result<Vec<OwnershipClaim>, ServiceError> {
        Ok(self.registry.list_claims(identity).await?)
    }

    pub async fn create_license(
        &self,
        claim_id: &str,
        terms: LicenseTerms,
        identity: &Identity,
    ) -> Result<License, ServiceError> {
        Ok(self.registry.create_license(claim_id, terms, identity).await?)
    }

    pub async fn list_licenses(&self, identity: &Identity) -> Result<Vec<License>, ServiceError> {
        Ok(self.registry.list_licenses(identity).await?)
    }

    /// Plaintext copy of a registered file.
    ///
    /// A record whose bytes no longer hash to `address` is reported as
    /// [`ServiceError::CorruptFile`].
    pub async fn retrieve_file(
        &self,
        address: &ContentAddress,
    ) -> Result<Option<StoredFile>, ServiceError> {
        let bytes = match self.kv.get(&keys::stored_file(address)).await? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        let record: StoredFile = from_cbor(&bytes).map_err(KvError::from)?;
        if digest(&record.bytes) != *address {
            return Err(ServiceError::CorruptFile(*address));
        }
        Ok(Some(record))
    }

    /// Fetch a published blob and decrypt it with `identity`'s secret.
    pub async fn fetch_published(
        &self,
        locator: &ContentLocator,
        identity: &Identity,
    ) -> Result<Option<Vec<u8>>, ServiceError> {
        match self.content.get(locator).await? {
            Some(blob) => Ok(Some(decrypt(&blob, &identity.secret())?)),
            None => Ok(None),
        }
    }

    /// Upload metadata recorded when `locator` was published.
    pub async fn blob_metadata(
        &self,
        locator: &ContentLocator,
    ) -> Result<Option<BlobMetadata>, ServiceError> {
        Ok(self.content.metadata(locator).await?)
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;
    use crate::kv::MemoryKvStore;

    fn service(kv: MemoryKvStore) -> CheckpointService {
        CheckpointService::builder(Arc::new(kv))
            .with_clock(Arc::new(SteppingClock::new(1_700_000_000, 1)))
            .build()
    }

    fn hello() -> FileUpload {
        FileUpload::new("hello.txt", "text/plain", b"hello".to_vec())
    }

    fn identity() -> Identity {
        Identity::new("0xabc").unwrap()
    }

    #[test]
    fn test_verify_content_without_service() {
        let hex = digest(b"hello").to_hex();
        let standalone = verify_content(b"hello", &hex.to_uppercase());
        assert!(standalone.matches);
        assert_eq!(
            standalone,
            service(MemoryKvStore::new()).verify_content(b"hello", &hex)
        );
        assert!(!verify_content(b"hello!", &hex).matches);
    }

    #[tokio::test]
    async fn test_register_fills_hashes() {
        let service = service(MemoryKvStore::new());
        let checkpoint = service.register(hello(), &identity(), "v1").await.unwrap();

        assert_eq!(
            checkpoint.address.to_hex(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(checkpoint.commitment, commitment(&checkpoint.address, "0xabc"));
        assert_eq!(checkpoint.note, "v1");
        assert!(checkpoint.claim.is_some());
    }

    #[tokio::test]
    async fn test_published_blob_decrypts_to_original() {
        let service = service(MemoryKvStore::new());
        let checkpoint = service.register(hello(), &identity(), "v1").await.unwrap();

        let plain = service
            .fetch_published(&checkpoint.locator, &identity())
            .await
            .unwrap();
        assert_eq!(plain, Some(b"hello".to_vec()));

        let stranger = Identity::new("0xdef").unwrap();
        assert!(matches!(
            service.fetch_published(&checkpoint.locator, &stranger).await,
            Err(ServiceError::Crypto(CryptoError::Decryption(_)))
        ));

        let metadata = service
            .blob_metadata(&checkpoint.locator)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(metadata.file_name, "hello.txt");
    }

    #[tokio::test]
    async fn test_retrieve_file() {
        let service = service(MemoryKvStore::new());
        let checkpoint = service.register(hello(), &identity(), "v1").await.unwrap();

        let stored = service
            .retrieve_file(&checkpoint.address)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.bytes, b"hello");
        assert_eq!(stored.name, "hello.txt");
        assert_eq!(stored.mime_type, "text/plain");
        assert_eq!(stored.size, 5);

        assert_eq!(service.retrieve_file(&digest(b"other")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_stored_file_is_reported() {
        let kv = MemoryKvStore::new();
        let service = service(kv.clone());
        let address = digest(b"hello");
        let tampered = StoredFile {
            bytes: b"goodbye".to_vec(),
            name: "hello.txt".to_string(),
            mime_type: "text/plain".to_string(),
            size: 7,
            stored_at: 0,
        };
        kv.set(&keys::stored_file(&address), &to_cbor(&tampered).unwrap())
            .await
            .unwrap();

        assert!(matches!(
            service.retrieve_file(&address).await,
            Err(ServiceError::CorruptFile(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_ownership() {
        let service = service(MemoryKvStore::new());
        let checkpoint = service.register(hello(), &identity(), "v1").await.unwrap();

        assert!(service.verify_ownership(&checkpoint, &identity()).await);
        assert!(
            service
                .verify_ownership(&checkpoint, &Identity::new("0xABC").unwrap())
                .await
        );
        assert!(
            !service
                .verify_ownership(&checkpoint, &Identity::new("0xdef").unwrap())
                .await
        );

        let mut forged = checkpoint.clone();
        forged.commitment = commitment(&checkpoint.address, "someone-else");
        assert!(!service.verify_ownership(&forged, &identity()).await);
    }

    #[tokio::test]
    async fn test_empty_note_gets_default_description() {
        let service = service(MemoryKvStore::new());
        service.register(hello(), &identity(), "").await.unwrap();
        let claims = service.list_claims(&identity()).await.unwrap();
        assert_eq!(claims[0].metadata.description, DEFAULT_CLAIM_DESCRIPTION);
        assert_eq!(claims[0].metadata.name, "hello.txt");
    }

    #[tokio::test]
    async fn test_licence_for_registered_claim() {
        let service = service(MemoryKvStore::new());
        let checkpoint = service.register(hello(), &identity(), "v1").await.unwrap();
        let claim_id = checkpoint.claim_id().unwrap().to_string();

        service
            .create_license(&claim_id, LicenseTerms::default(), &identity())
            .await
            .unwrap();
        assert_eq!(service.list_licenses(&identity()).await.unwrap().len(), 1);
    }

    #[test]
    fn test_non_empty_or() {
        assert_eq!(non_empty_or("  ", "x"), "x");
        assert_eq!(non_empty_or("a", "x"), "a");
    }
}
