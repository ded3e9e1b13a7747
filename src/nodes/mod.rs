//! Trie node types and their canonical RLP forms.

use crate::Nibbles;
use alloy_primitives::{keccak256, B256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header, PayloadView, EMPTY_STRING_CODE};
use core::ops::Range;

mod branch;
pub use branch::{BranchNode, BranchNodeRef};

mod extension;
pub use extension::{ExtensionNode, ExtensionNodeRef};

mod leaf;
pub use leaf::{LeafNode, LeafNodeRef};

mod rlp;
pub use rlp::RlpNode;

/// The range of valid child indexes.
pub const CHILD_INDEX_RANGE: Range<u8> = 0..16;

/// A node in the trie.
///
/// The empty node is the absence of a node and is represented by
/// `Option::None` at the owning slot; its RLP form is the empty string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A leaf node holding a key remainder and its value.
    Leaf(LeafNode),
    /// An extension node compressing a shared key segment.
    Extension(ExtensionNode),
    /// A 16-way branch node with an optional value.
    Branch(BranchNode),
}

impl Encodable for Node {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Self::Leaf(leaf) => leaf.encode(out),
            Self::Extension(extension) => extension.encode(out),
            Self::Branch(branch) => branch.encode(out),
        }
    }
}

impl Node {
    /// RLP encodes the node and returns either RLP(node) or RLP(keccak(RLP(node))).
    pub fn rlp(&self, rlp_buf: &mut Vec<u8>) -> RlpNode {
        self.encode(rlp_buf);
        RlpNode::from_rlp(rlp_buf)
    }

    /// The Keccak-256 digest of the node's canonical RLP serialization.
    ///
    /// This is the node's identity, independently of whether a parent embeds
    /// the node or references it by hash.
    pub fn hash(&self) -> B256 {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        keccak256(&buf)
    }
}

/// The wire form of a node as read back from its RLP serialization.
///
/// Child references stay unresolved: a reference is either the child node
/// inlined (an RLP list shorter than 32 bytes) or the child's 32-byte hash.
/// The proof verifier resolves hash references through a proof bag and
/// decodes inlined references in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedNode {
    /// The decoded form of the empty string, i.e. the empty node.
    EmptyRoot,
    /// A leaf node.
    Leaf(LeafNode),
    /// An extension node and the reference to its child.
    Extension {
        /// The key for the extension node.
        key: Nibbles,
        /// The reference to the child node.
        child: RlpNode,
    },
    /// A branch node with unresolved child references.
    Branch {
        /// Child references, one slot per nibble.
        children: Box<[Option<RlpNode>; 16]>,
        /// The value stored at the branch, if any.
        value: Option<Vec<u8>>,
    },
}

impl Decodable for DecodedNode {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let items = match Header::decode_raw(buf)? {
            PayloadView::List(list) => list,
            PayloadView::String(val) => {
                return if val.is_empty() {
                    Ok(Self::EmptyRoot)
                } else {
                    Err(alloy_rlp::Error::UnexpectedString)
                }
            }
        };

        // A valid node is either a 17-item branch or a 2-item leaf/extension.
        match items.len() {
            17 => {
                let mut children: Box<[Option<RlpNode>; 16]> = Default::default();
                for (slot, item) in children.iter_mut().zip(&items) {
                    if *item != [EMPTY_STRING_CODE] {
                        *slot = Some(RlpNode::from_raw_rlp(item)?);
                    }
                }
                let value = if items[16] == [EMPTY_STRING_CODE] {
                    None
                } else {
                    Some(Header::decode_bytes(&mut &*items[16], false)?.to_vec())
                };
                Ok(Self::Branch { children, value })
            }
            2 => {
                let path = Header::decode_bytes(&mut &*items[0], false)?;
                let (key, is_leaf) = decode_path_leaf(path)?;
                if is_leaf {
                    let value = Header::decode_bytes(&mut &*items[1], false)?.to_vec();
                    Ok(Self::Leaf(LeafNode::new(key, value)))
                } else {
                    if key.is_empty() {
                        return Err(alloy_rlp::Error::Custom("extension node key empty"));
                    }
                    let child = RlpNode::from_raw_rlp(items[1])?;
                    Ok(Self::Extension { key, child })
                }
            }
            _ => Err(alloy_rlp::Error::Custom("invalid number of items in the list")),
        }
    }
}

/// Decodes a hex-prefix encoded path into its nibbles and the leaf flag.
///
/// This is the inverse of [`Nibbles::encode_path_leaf`]: the high nibble of
/// the first byte carries the leaf bit and the odd-length bit, an even-length
/// path additionally carries a zero padding nibble.
pub fn decode_path_leaf(encoded: &[u8]) -> alloy_rlp::Result<(Nibbles, bool)> {
    let Some(&first) = encoded.first() else {
        return Err(alloy_rlp::Error::Custom("node key empty"));
    };
    let (is_leaf, odd_nibble) = match first & 0xf0 {
        0x00 => (false, None),
        0x10 => (false, Some(first & 0x0f)),
        0x20 => (true, None),
        0x30 => (true, Some(first & 0x0f)),
        _ => return Err(alloy_rlp::Error::Custom("invalid path prefix")),
    };
    Ok((unpack_path_to_nibbles(odd_nibble, &encoded[1..]), is_leaf))
}

/// Unpack a node path to nibbles.
///
/// `first` is the path's leading nibble when the path length is odd; `rest`
/// holds the remaining nibbles packed two per byte, high nibble first.
pub(crate) fn unpack_path_to_nibbles(first: Option<u8>, rest: &[u8]) -> Nibbles {
    let rest = rest.iter().flat_map(|b| [b >> 4, b & 0x0f]);
    Nibbles::from_vec_unchecked(first.into_iter().chain(rest).collect())
}
