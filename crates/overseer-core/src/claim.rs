//! Claim identifiers for the resource ticket lock.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Identifier of one attempt to acquire a resource lock.
///
/// Must be unique per attempt; [`ClaimId::derive`] salts every id so two
/// derivations from the same seeds never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(String);

impl ClaimId {
    /// Derives a fresh claim id from `seeds` plus a random salt.
    #[must_use]
    pub fn derive(seeds: &[&str]) -> Self {
        let salt = Uuid::new_v4().to_string();
        let mut hasher = Sha256::new();
        for seed in seeds.iter().copied().chain(std::iter::once(salt.as_str())) {
            hasher.update(seed.as_bytes());
            hasher.update(b"::");
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps an externally supplied claim id.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
