//! On-chain integration seams.
//!
//! This module provides:
//! - wallet and ledger trait abstractions (`traits`)
//! - the known-network catalogue (`network`)
//! - mock implementations for testing (`mock`)

pub mod mock;
pub mod network;
pub mod traits;

pub use mock::{LedgerFaults, MockLedger, MockWallet};
pub use network::{home_network, is_home_network, Network};
pub use traits::{
    ChainError, CheckpointSubmission, ClaimReceipt, ClaimSubmission, LedgerBackend, TxReceipt,
    WalletProvider,
};
