use super::rlp::RlpNode;
use crate::Nibbles;
use alloy_primitives::hex;
use alloy_rlp::{length_of_length, BufMut, Encodable, Header};
use core::fmt;

/// A leaf node represents the endpoint of a key path. It holds the remainder
/// of the key that was not consumed by the nodes above it, together with the
/// value stored under the full key.
///
/// The remainder may be empty when the branch structure above the leaf has
/// already consumed the whole key.
#[derive(Clone, PartialEq, Eq)]
pub struct LeafNode {
    /// The remaining key nibbles for this leaf.
    pub key: Nibbles,
    /// The value stored under the key.
    pub value: Vec<u8>,
}

impl fmt::Debug for LeafNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafNode")
            .field("key", &self.key)
            .field("value", &hex::encode(&self.value))
            .finish()
    }
}

impl Encodable for LeafNode {
    fn encode(&self, out: &mut dyn BufMut) {
        self.as_ref().encode(out)
    }

    fn length(&self) -> usize {
        self.as_ref().length()
    }
}

impl LeafNode {
    /// Creates a new leaf node with the given key and value.
    pub const fn new(key: Nibbles, value: Vec<u8>) -> Self {
        Self { key, value }
    }

    /// Return leaf node as [LeafNodeRef].
    pub fn as_ref(&self) -> LeafNodeRef<'_> {
        LeafNodeRef { key: &self.key, value: &self.value }
    }
}

/// Reference to the leaf node. See [LeafNode] for more information.
#[derive(Clone, Copy)]
pub struct LeafNodeRef<'a> {
    /// The remaining key nibbles for this leaf.
    pub key: &'a Nibbles,
    /// The value stored under the key.
    pub value: &'a [u8],
}

impl fmt::Debug for LeafNodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafNodeRef")
            .field("key", &self.key)
            .field("value", &hex::encode(self.value))
            .finish()
    }
}

impl Encodable for LeafNodeRef<'_> {
    fn encode(&self, out: &mut dyn BufMut) {
        Header { list: true, payload_length: self.rlp_payload_length() }.encode(out);
        self.key.encode_path_leaf(true).as_slice().encode(out);
        self.value.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.rlp_payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl<'a> LeafNodeRef<'a> {
    /// Creates a new leaf node reference.
    pub const fn new(key: &'a Nibbles, value: &'a [u8]) -> Self {
        Self { key, value }
    }

    /// RLP encodes the node and returns either RLP(node) or RLP(keccak(RLP(node))).
    pub fn rlp(&self, buf: &mut Vec<u8>) -> RlpNode {
        self.encode(buf);
        RlpNode::from_rlp(buf)
    }

    /// Returns the length of RLP encoded fields of leaf node.
    fn rlp_payload_length(&self) -> usize {
        let mut encoded_key_len = self.key.len() / 2 + 1;
        // For leaf nodes the first byte cannot be greater than 0x80.
        if encoded_key_len != 1 {
            encoded_key_len += length_of_length(encoded_key_len);
        }
        encoded_key_len + self.value.length()
    }
}
