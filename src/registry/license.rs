//! Programmable licence records attached to ownership claims.
//!
//! Licences are local records only. They are never submitted to a contract.

use super::RegistryError;
use serde::{Deserialize, Serialize};

/// Prefix of licence ids.
pub const LICENSE_PREFIX: &str = "license-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseTerms {
    pub commercial_use: bool,
    pub derivative_works: bool,
    pub attribution_required: bool,
    /// Royalty owed on commercial use, 0-100.
    pub royalty_percentage: Option<u8>,
}

impl LicenseTerms {
    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        match self.royalty_percentage {
            Some(pct) if pct > 100 => Err(RegistryError::InvalidRoyalty(pct)),
            _ => Ok(()),
        }
    }
}

impl Default for LicenseTerms {
    /// Non-commercial, no derivatives, attribution required.
    fn default() -> Self {
        Self {
            commercial_use: false,
            derivative_works: false,
            attribution_required: true,
            royalty_percentage: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub license_id: String,
    pub claim_id: String,
    pub terms: LicenseTerms,
    pub created_at: u64,
}

impl License {
    pub(crate) fn new(claim_id: &str, terms: LicenseTerms, created_at: u64) -> Self {
        Self {
            license_id: format!("{}{}", LICENSE_PREFIX, uuid::Uuid::new_v4()),
            claim_id: claim_id.to_string(),
            terms,
            created_at,
        }
    }
}
