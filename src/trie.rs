//! The trie itself and its mutation algorithm.

use crate::{
    nodes::{BranchNode, ExtensionNode, LeafNode, Node},
    proof::{ProofBag, ProofNodes},
    Nibbles, EMPTY_ROOT_HASH,
};
use alloy_primitives::{keccak256, Bytes, B256};
use alloy_rlp::Encodable;
use core::mem;
use tracing::trace;

/// An in-memory Merkle Patricia Trie.
///
/// The trie maps byte keys to byte values. Its [root hash](Trie::root_hash)
/// commits to the exact set of entries regardless of insertion order, and
/// [`Trie::prove`] extracts the inclusion proof for any stored key.
///
/// Values are opaque nonempty byte strings; an empty value means "absent".
/// There is no removal operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trie {
    root: Option<Node>,
}

impl Trie {
    /// Creates an empty trie.
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Returns the root hash committing to the current contents of the trie.
    ///
    /// The empty trie hashes to [`EMPTY_ROOT_HASH`]. The root node is always
    /// addressed by its full Keccak-256 digest, regardless of its size.
    pub fn root_hash(&self) -> B256 {
        match &self.root {
            Some(node) => node.hash(),
            None => EMPTY_ROOT_HASH,
        }
    }

    /// Inserts the value under the given key, replacing any previous value.
    pub fn put(&mut self, key: &[u8], value: Vec<u8>) {
        let path = Nibbles::unpack(key);
        trace!(target: "trie::put", ?path, value_len = value.len(), "inserting");
        match &mut self.root {
            Some(node) => node.insert(&path, value),
            root @ None => *root = Some(Node::Leaf(LeafNode::new(path, value))),
        }
    }

    /// Returns the value stored under the given key, if any.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let path = Nibbles::unpack(key);
        let mut node = self.root.as_ref()?;
        let mut remaining: &[u8] = &path;
        loop {
            match node {
                Node::Leaf(leaf) => {
                    trace!(target: "trie::get", key = ?leaf.key, "reached leaf");
                    return (leaf.key[..] == *remaining).then_some(leaf.value.as_slice());
                }
                Node::Branch(branch) => {
                    let Some((&index, rest)) = remaining.split_first() else {
                        return branch.value.as_deref();
                    };
                    node = branch.children[index as usize].as_deref()?;
                    remaining = rest;
                }
                Node::Extension(extension) => {
                    if !remaining.starts_with(&extension.key[..]) {
                        return None;
                    }
                    remaining = &remaining[extension.key.len()..];
                    node = &extension.child;
                }
            }
        }
    }

    /// Builds an inclusion proof for the given key.
    ///
    /// The proof is the content-addressed bag of every serialized node on the
    /// walk from the root to the key's terminal node. Returns `None` when the
    /// key is not present: no partial bags are handed out.
    pub fn prove(&self, key: &[u8]) -> Option<ProofNodes> {
        let path = Nibbles::unpack(key);
        let mut node = self.root.as_ref()?;
        let mut remaining: &[u8] = &path;
        let mut proof = ProofNodes::default();
        let mut rlp_buf = Vec::new();
        loop {
            rlp_buf.clear();
            node.encode(&mut rlp_buf);
            let hash = keccak256(&rlp_buf);
            trace!(target: "trie::prove", %hash, len = rlp_buf.len(), "retaining node");
            proof.put(hash, Bytes::copy_from_slice(&rlp_buf));

            match node {
                Node::Leaf(leaf) => {
                    return (leaf.key[..] == *remaining).then_some(proof);
                }
                Node::Branch(branch) => {
                    let Some((&index, rest)) = remaining.split_first() else {
                        return branch.value.is_some().then_some(proof);
                    };
                    node = branch.children[index as usize].as_deref()?;
                    remaining = rest;
                }
                Node::Extension(extension) => {
                    if !remaining.starts_with(&extension.key[..]) {
                        return None;
                    }
                    remaining = &remaining[extension.key.len()..];
                    node = &extension.child;
                }
            }
        }
    }
}

impl Node {
    /// Inserts `value` at the remaining key `path` below this node, splitting
    /// leaves and extensions as needed. Every step either terminates or
    /// strictly shortens the remaining path.
    fn insert(&mut self, path: &[u8], value: Vec<u8>) {
        match self {
            Node::Leaf(leaf) => {
                let matched = leaf.key.common_prefix_length(path);
                if matched == leaf.key.len() && matched == path.len() {
                    trace!(target: "trie::put", "updating leaf in place");
                    leaf.value = value;
                    return;
                }

                // The paths diverge: distribute both pairs over a new branch.
                // A pair whose path ends at the divergence point becomes the
                // branch value; a longer one becomes a tail leaf.
                let mut branch = BranchNode::default();
                if matched < leaf.key.len() {
                    let tail = LeafNode::new(leaf.key.slice(matched + 1..), mem::take(&mut leaf.value));
                    branch.children[leaf.key[matched] as usize] = Some(Box::new(Node::Leaf(tail)));
                } else {
                    branch.value = Some(mem::take(&mut leaf.value));
                }
                if matched < path.len() {
                    let tail =
                        LeafNode::new(Nibbles::from_nibbles_unchecked(&path[matched + 1..]), value);
                    branch.children[path[matched] as usize] = Some(Box::new(Node::Leaf(tail)));
                } else {
                    branch.value = Some(value);
                }

                trace!(target: "trie::put", matched, "splitting leaf");
                *self = if matched > 0 {
                    Node::Extension(ExtensionNode::new(leaf.key.slice(..matched), Node::Branch(branch)))
                } else {
                    Node::Branch(branch)
                };
            }
            Node::Branch(branch) => {
                let Some((&index, rest)) = path.split_first() else {
                    branch.value = Some(value);
                    return;
                };
                match &mut branch.children[index as usize] {
                    Some(child) => child.insert(rest, value),
                    slot @ None => {
                        let leaf = LeafNode::new(Nibbles::from_nibbles_unchecked(rest), value);
                        *slot = Some(Box::new(Node::Leaf(leaf)));
                    }
                }
            }
            Node::Extension(extension) => {
                let matched = extension.key.common_prefix_length(path);
                if matched == extension.key.len() {
                    return extension.child.insert(&path[matched..], value);
                }

                // The search path leaves the extension's path: split the
                // extension at the divergence point. The old child keeps its
                // tail (wrapped in a shorter extension when nonempty), the
                // new pair lands on the branch.
                let mut branch = BranchNode::default();
                let old_tail = extension.key.slice(matched + 1..);
                let next = mem::replace(
                    &mut extension.child,
                    Box::new(Node::Branch(BranchNode::default())),
                );
                branch.children[extension.key[matched] as usize] = Some(if old_tail.is_empty() {
                    next
                } else {
                    Box::new(Node::Extension(ExtensionNode { key: old_tail, child: next }))
                });
                if matched < path.len() {
                    let tail =
                        LeafNode::new(Nibbles::from_nibbles_unchecked(&path[matched + 1..]), value);
                    branch.children[path[matched] as usize] = Some(Box::new(Node::Leaf(tail)));
                } else {
                    branch.value = Some(value);
                }

                trace!(target: "trie::put", matched, "splitting extension");
                *self = if matched > 0 {
                    Node::Extension(ExtensionNode::new(
                        extension.key.slice(..matched),
                        Node::Branch(branch),
                    ))
                } else {
                    Node::Branch(branch)
                };
            }
        }
    }
}
