#![doc = include_str!("../README.md")]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]

pub mod nodes;
pub use nodes::{BranchNode, DecodedNode, ExtensionNode, LeafNode, Node, RlpNode};

pub mod proof;
pub use proof::{verify_proof, ProofBag, ProofNodes, ProofVerificationError};

mod trie;
pub use trie::Trie;

pub use nybbles::Nibbles;

/// Root hash of an empty trie: `keccak256(rlp(""))`.
pub const EMPTY_ROOT_HASH: alloy_primitives::B256 =
    alloy_primitives::b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");
