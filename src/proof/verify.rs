//! Proof verification logic.

use crate::{
    nodes::{DecodedNode, RlpNode},
    proof::{ProofBag, ProofVerificationError},
    Nibbles,
};
use alloy_primitives::{Bytes, B256};
use alloy_rlp::Decodable;
use tracing::trace;

/// Verifies an inclusion proof for the given key against the claimed root
/// hash, returning the proven value.
///
/// The walk starts at the node stored under `root` in the bag and consumes
/// the key nibble by nibble. Child references shorter than 32 bytes are
/// decoded in place; hash references are resolved through the bag, and a
/// reference that resolves to nothing fails with
/// [`ProofVerificationError::MissingNode`] rather than "not found".
pub fn verify_proof<B: ProofBag + ?Sized>(
    root: B256,
    key: &[u8],
    proof: &B,
) -> Result<Bytes, ProofVerificationError> {
    let path = Nibbles::unpack(key);
    let mut remaining: &[u8] = &path;
    let mut node = resolve(&RlpNode::word_rlp(&root), proof)?;
    loop {
        match node {
            DecodedNode::EmptyRoot => {
                return Err(key_mismatch(&path, remaining));
            }
            DecodedNode::Leaf(leaf) => {
                return if leaf.key[..] == *remaining {
                    Ok(Bytes::from(leaf.value))
                } else {
                    Err(key_mismatch(&path, remaining))
                };
            }
            DecodedNode::Extension { key: extension_key, child } => {
                if !remaining.starts_with(&extension_key[..]) {
                    return Err(key_mismatch(&path, remaining));
                }
                remaining = &remaining[extension_key.len()..];
                node = resolve(&child, proof)?;
            }
            DecodedNode::Branch { children, value } => {
                let Some((&index, rest)) = remaining.split_first() else {
                    return value.map(Bytes::from).ok_or_else(|| key_mismatch(&path, remaining));
                };
                let Some(child) = &children[index as usize] else {
                    return Err(key_mismatch(&path, remaining));
                };
                remaining = rest;
                node = resolve(child, proof)?;
            }
        }
    }
}

/// Resolves a child reference into a decoded node: by bag lookup when the
/// reference is a hash, by decoding in place when the child was inlined.
fn resolve<B: ProofBag + ?Sized>(
    node_ref: &RlpNode,
    proof: &B,
) -> Result<DecodedNode, ProofVerificationError> {
    match node_ref.as_hash() {
        Some(hash) => {
            let node =
                proof.get(&hash).ok_or(ProofVerificationError::MissingNode { hash })?;
            trace!(target: "trie::verify", %hash, len = node.len(), "resolved node from bag");
            Ok(DecodedNode::decode(&mut &node[..])?)
        }
        None => Ok(DecodedNode::decode(&mut &node_ref[..])?),
    }
}

fn key_mismatch(path: &Nibbles, remaining: &[u8]) -> ProofVerificationError {
    ProofVerificationError::KeyMismatch { path: path.slice(..path.len() - remaining.len()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{proof::ProofNodes, Trie};
    use alloy_primitives::hex;

    fn two_key_trie() -> Trie {
        let mut trie = Trie::new();
        trie.put(&hex!("010203"), b"hello".to_vec());
        trie.put(&hex!("0102030405"), b"world".to_vec());
        trie
    }

    #[test]
    fn proof_round_trip() {
        let trie = two_key_trie();
        let root = trie.root_hash();

        let proof = trie.prove(&hex!("010203")).unwrap();
        assert_eq!(verify_proof(root, &hex!("010203"), &proof), Ok(Bytes::from_static(b"hello")));

        let proof = trie.prove(&hex!("0102030405")).unwrap();
        assert_eq!(
            verify_proof(root, &hex!("0102030405"), &proof),
            Ok(Bytes::from_static(b"world"))
        );
    }

    #[test]
    fn no_proof_for_absent_key() {
        let trie = two_key_trie();
        assert_eq!(trie.prove(&hex!("01020304")), None);
        assert_eq!(trie.prove(&hex!("0102")), None);
        assert_eq!(trie.prove(&hex!("0f")), None);
    }

    #[test]
    fn proof_bound_to_root() {
        let mut trie = two_key_trie();
        let stale_root = trie.root_hash();

        trie.put(&hex!("050607"), b"trie".to_vec());
        let proof = trie.prove(&hex!("010203")).unwrap();

        // Against the current root the proof verifies ...
        assert_eq!(
            verify_proof(trie.root_hash(), &hex!("010203"), &proof),
            Ok(Bytes::from_static(b"hello"))
        );
        // ... against the stale one it must fail: the stale root node is not
        // in the bag.
        assert_eq!(
            verify_proof(stale_root, &hex!("010203"), &proof),
            Err(ProofVerificationError::MissingNode { hash: stale_root })
        );
    }

    #[test]
    fn missing_interior_node() {
        let trie = two_key_trie();
        let root = trie.root_hash();
        let proof = trie.prove(&hex!("010203")).unwrap();

        // Keep only the root node of the bag.
        let pruned: ProofNodes =
            proof.iter().filter(|(hash, _)| **hash == root).map(|(h, n)| (*h, n.clone())).collect();
        match verify_proof(root, &hex!("010203"), &pruned) {
            Err(ProofVerificationError::MissingNode { hash }) => assert_ne!(hash, root),
            result => panic!("expected missing node, got {result:?}"),
        }
    }

    #[test]
    fn mismatching_key_fails() {
        let trie = two_key_trie();
        let root = trie.root_hash();
        let proof = trie.prove(&hex!("010203")).unwrap();

        // Diverges below the proven leaf.
        assert!(matches!(
            verify_proof(root, &hex!("010203ff"), &proof),
            Err(ProofVerificationError::KeyMismatch { .. })
        ));
        // Ends at a valueless position.
        assert!(matches!(
            verify_proof(root, &hex!("0102"), &proof),
            Err(ProofVerificationError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn malformed_bag_fails() {
        let root = two_key_trie().root_hash();

        // Root resolves to an empty list: wrong arity.
        let mut bag = ProofNodes::default();
        bag.put(root, Bytes::from_static(&[0xc0]));
        assert!(matches!(
            verify_proof(root, &hex!("010203"), &bag),
            Err(ProofVerificationError::Rlp(_))
        ));

        // Root resolves to truncated RLP.
        let mut bag = ProofNodes::default();
        bag.put(root, Bytes::from_static(&[0xf8, 0x80]));
        assert!(matches!(
            verify_proof(root, &hex!("010203"), &bag),
            Err(ProofVerificationError::Rlp(_))
        ));

        // Root resolves to the empty node.
        let mut bag = ProofNodes::default();
        bag.put(root, Bytes::from_static(&[0x80]));
        assert!(matches!(
            verify_proof(root, &hex!("010203"), &bag),
            Err(ProofVerificationError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn single_leaf_proof() {
        let mut trie = Trie::new();
        trie.put(&hex!("01020304"), b"verb".to_vec());
        let proof = trie.prove(&hex!("01020304")).unwrap();
        assert_eq!(proof.len(), 1);
        assert_eq!(
            verify_proof(trie.root_hash(), &hex!("01020304"), &proof),
            Ok(Bytes::from_static(b"verb"))
        );
    }

    #[test]
    fn branch_value_proof() {
        // The shorter key terminates on the branch itself.
        let mut trie = Trie::new();
        trie.put(&hex!("01020304"), b"verb".to_vec());
        trie.put(&hex!("010203040506"), b"coin".to_vec());

        let proof = trie.prove(&hex!("01020304")).unwrap();
        assert_eq!(
            verify_proof(trie.root_hash(), &hex!("01020304"), &proof),
            Ok(Bytes::from_static(b"verb"))
        );
        let proof = trie.prove(&hex!("010203040506")).unwrap();
        assert_eq!(
            verify_proof(trie.root_hash(), &hex!("010203040506"), &proof),
            Ok(Bytes::from_static(b"coin"))
        );
    }

    proptest::proptest! {
        #[test]
        fn proofs_verify_for_every_key(
            entries in proptest::collection::btree_map(
                proptest::collection::vec(proptest::prelude::any::<u8>(), 1..8),
                proptest::collection::vec(proptest::prelude::any::<u8>(), 1..16),
                1..15,
            )
        ) {
            let mut trie = Trie::new();
            for (key, value) in &entries {
                trie.put(key, value.clone());
            }
            let root = trie.root_hash();
            for (key, value) in &entries {
                let proof = trie.prove(key).unwrap();
                proptest::prop_assert_eq!(
                    verify_proof(root, key, &proof),
                    Ok(Bytes::copy_from_slice(value))
                );
            }
        }
    }
}
