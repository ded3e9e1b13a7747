use super::{rlp::RlpNode, Node, CHILD_INDEX_RANGE};
use alloy_primitives::hex;
use alloy_rlp::{length_of_length, BufMut, Encodable, Header, EMPTY_STRING_CODE};
use core::fmt;

/// A branch node is the 16-way fork of the trie: one child slot per nibble
/// value, plus a value slot for a key that terminates exactly at this node.
///
/// Its canonical form is a 17-element list. Slots without a child encode as
/// the empty string, as does an absent value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BranchNode {
    /// The child slots, one per nibble.
    pub children: [Option<Box<Node>>; 16],
    /// The value stored at this branch, if a key terminates here.
    pub value: Option<Vec<u8>>,
}

impl fmt::Debug for BranchNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchNode")
            .field("children", &self.children)
            .field("value", &self.value.as_deref().map(hex::encode))
            .finish()
    }
}

impl Encodable for BranchNode {
    fn encode(&self, out: &mut dyn BufMut) {
        let mut rlp_buf = Vec::new();
        let mut stack: [Option<RlpNode>; 16] = Default::default();
        for (slot, child) in stack.iter_mut().zip(&self.children) {
            if let Some(child) = child {
                rlp_buf.clear();
                *slot = Some(child.rlp(&mut rlp_buf));
            }
        }
        BranchNodeRef::new(&stack, self.value.as_deref()).encode(out)
    }
}

/// Reference to a branch node with all child references already resolved.
/// See [BranchNode] for more information.
#[derive(Clone, Copy)]
pub struct BranchNodeRef<'a> {
    /// The RLP references to the children, one slot per nibble.
    pub stack: &'a [Option<RlpNode>; 16],
    /// The value stored at this branch, if a key terminates here.
    pub value: Option<&'a [u8]>,
}

impl fmt::Debug for BranchNodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchNodeRef")
            .field("stack", &self.stack)
            .field("value", &self.value.map(hex::encode))
            .finish()
    }
}

/// Implementation of RLP encoding for a branch node. Encodes it as a
/// 17-element list consisting of 16 slots that correspond to each child of
/// the node (0-f) and an additional slot for a value.
impl Encodable for BranchNodeRef<'_> {
    fn encode(&self, out: &mut dyn BufMut) {
        Header { list: true, payload_length: self.rlp_payload_length() }.encode(out);

        for index in CHILD_INDEX_RANGE {
            match &self.stack[index as usize] {
                Some(child) => out.put_slice(child),
                None => out.put_u8(EMPTY_STRING_CODE),
            }
        }

        match self.value {
            Some(value) => value.encode(out),
            None => out.put_u8(EMPTY_STRING_CODE),
        }
    }

    fn length(&self) -> usize {
        let payload_length = self.rlp_payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl<'a> BranchNodeRef<'a> {
    /// Creates a new branch node reference.
    pub const fn new(stack: &'a [Option<RlpNode>; 16], value: Option<&'a [u8]>) -> Self {
        Self { stack, value }
    }

    /// RLP encodes the node and returns either RLP(node) or RLP(keccak(RLP(node))).
    pub fn rlp(&self, buf: &mut Vec<u8>) -> RlpNode {
        self.encode(buf);
        RlpNode::from_rlp(buf)
    }

    /// Returns the length of RLP encoded fields of branch node.
    fn rlp_payload_length(&self) -> usize {
        let mut payload_length = 0;
        for child in self.stack.iter() {
            payload_length += child.as_ref().map_or(1, |child| child.len());
        }
        payload_length + self.value.map_or(1, |value| value.length())
    }
}
