//! Digest chain of completed requests.
//!
//! Two peers that executed the same requests in the same order hold equal
//! chain digests, which makes divergence detectable without shipping state.

use sha2::{Digest, Sha256};

use crate::queue::Completed;
use crate::types::ActionTypeId;

/// SHA-256 digest of a request or of the chain.
pub type RequestDigest = [u8; 32];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayEntry {
    pub sequence: u64,
    pub kind: ActionTypeId,
    pub digest: RequestDigest,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayLog {
    entries: Vec<ReplayEntry>,
    chain: RequestDigest,
}

impl ReplayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed request and folds its digest into the chain.
    pub fn record(&mut self, completed: &Completed) -> &ReplayEntry {
        let mut hasher = Sha256::new();
        hasher.update(self.chain);
        hasher.update(completed.digest);
        self.chain = hasher.finalize().into();

        let sequence = self.entries.len() as u64;
        self.entries.push(ReplayEntry {
            sequence,
            kind: completed.request.kind().clone(),
            digest: completed.digest,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[ReplayEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn chain_digest(&self) -> RequestDigest {
        self.chain
    }

    pub fn chain_hex(&self) -> String {
        hex::encode(self.chain)
    }
}
