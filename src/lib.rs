//! StoryProof - tamper-evident version checkpoints
//!
//! Registers successive versions of a file as timestamped checkpoints tied to
//! a creator identity, and verifies them later.
//!
//! Key principles:
//! - content is addressed by its SHA-256 digest
//! - every backend beyond the local store is optional; failures degrade a
//!   registration, they never lose it
//! - histories are append-only and never reordered
//!
//! The encryption and commitment secret is the lower-cased public identity.
//! See [`identity`] before relying on blob encryption for confidentiality.

pub mod chain;
pub mod clock;
pub mod config;
pub mod content;
pub mod crypto;
pub mod hashing;
pub mod identity;
pub mod kv;
pub mod ledger;
pub mod registry;
pub mod serialization;
pub mod service;

pub use service::{CheckpointService, ServiceError};
