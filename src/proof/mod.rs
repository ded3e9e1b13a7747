//! Proof generation and verification.

mod bag;
pub use bag::{ProofBag, ProofNodes};

mod error;
pub use error::ProofVerificationError;

mod verify;
pub use verify::verify_proof;
