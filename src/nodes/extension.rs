use super::{rlp::RlpNode, Node};
use crate::Nibbles;
use alloy_primitives::hex;
use alloy_rlp::{length_of_length, BufMut, Encodable, Header};
use core::fmt;

/// An intermediate node that exists solely to compress the trie's paths. It
/// contains a path segment (a shared prefix of keys) and a single child
/// pointer. Essentially, an extension node can be thought of as a shortcut
/// within the trie to reduce its overall depth.
///
/// The purpose of an extension node is to optimize the trie structure by
/// collapsing multiple nodes with a single child into one node. This
/// simplification reduces the space and computational complexity when
/// performing operations on the trie.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtensionNode {
    /// The key for this extension node.
    pub key: Nibbles,
    /// The child node the key path leads into.
    pub child: Box<Node>,
}

impl fmt::Debug for ExtensionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionNode")
            .field("key", &self.key)
            .field("child", &self.child)
            .finish()
    }
}

impl Encodable for ExtensionNode {
    fn encode(&self, out: &mut dyn BufMut) {
        let mut rlp_buf = Vec::new();
        let child = self.child.rlp(&mut rlp_buf);
        ExtensionNodeRef::new(&self.key, &child).encode(out)
    }
}

impl ExtensionNode {
    /// Creates a new extension node with the given key and child.
    pub fn new(key: Nibbles, child: Node) -> Self {
        Self { key, child: Box::new(child) }
    }
}

/// Reference to an extension node with its child reference already resolved.
/// See [ExtensionNode] for more information.
#[derive(Clone, Copy)]
pub struct ExtensionNodeRef<'a> {
    /// The key for this extension node.
    pub key: &'a Nibbles,
    /// The RLP reference to the child node.
    pub child: &'a [u8],
}

impl fmt::Debug for ExtensionNodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionNodeRef")
            .field("key", &self.key)
            .field("child", &hex::encode(self.child))
            .finish()
    }
}

impl Encodable for ExtensionNodeRef<'_> {
    fn encode(&self, out: &mut dyn BufMut) {
        Header { list: true, payload_length: self.rlp_payload_length() }.encode(out);
        self.key.encode_path_leaf(false).as_slice().encode(out);
        // Pointer to the child is already RLP encoded.
        out.put_slice(self.child);
    }

    fn length(&self) -> usize {
        let payload_length = self.rlp_payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl<'a> ExtensionNodeRef<'a> {
    /// Creates a new extension node reference.
    pub const fn new(key: &'a Nibbles, child: &'a [u8]) -> Self {
        Self { key, child }
    }

    /// RLP encodes the node and returns either RLP(node) or RLP(keccak(RLP(node))).
    pub fn rlp(&self, buf: &mut Vec<u8>) -> RlpNode {
        self.encode(buf);
        RlpNode::from_rlp(buf)
    }

    /// Returns the length of RLP encoded fields of extension node.
    fn rlp_payload_length(&self) -> usize {
        let mut encoded_key_len = self.key.len() / 2 + 1;
        // For extension nodes the first byte cannot be greater than 0x80.
        if encoded_key_len != 1 {
            encoded_key_len += length_of_length(encoded_key_len);
        }
        encoded_key_len + self.child.len()
    }
}
