use crate::Nibbles;
use alloy_primitives::B256;
use thiserror::Error;

/// Error during proof verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProofVerificationError {
    /// A node referenced by hash is absent from the proof bag.
    ///
    /// Absence is always a verification failure, never "key not found".
    #[error("missing node {hash} in proof")]
    MissingNode {
        /// Hash of the missing node.
        hash: B256,
    },
    /// The walk diverged from the key before reaching its value.
    #[error("key mismatch after walking path {path:?}")]
    KeyMismatch {
        /// The key nibbles consumed before the divergence.
        path: Nibbles,
    },
    /// Error during RLP decoding of a trie node.
    #[error(transparent)]
    Rlp(#[from] alloy_rlp::Error),
}
