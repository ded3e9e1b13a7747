use alloy_primitives::{hex, keccak256, B256};
use alloy_rlp::EMPTY_STRING_CODE;
use arrayvec::ArrayVec;
use core::fmt;

/// Maximum length of a node reference: the RLP encoding of a 32-byte hash.
const MAX: usize = 33;

/// The RLP reference to a child node.
///
/// A reference is either the child's RLP serialization inlined verbatim, when
/// that serialization is shorter than 32 bytes, or the RLP encoding of the
/// child's 32-byte Keccak-256 digest. The two cases are distinguishable on
/// decode: a 32-byte string is a hash pointer, anything else is an inlined
/// node.
#[derive(Clone, PartialEq, Eq)]
pub struct RlpNode(ArrayVec<u8, MAX>);

impl core::ops::Deref for RlpNode {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for RlpNode {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RlpNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RlpNode({})", hex::encode_prefixed(&self.0))
    }
}

impl RlpNode {
    /// Creates a new RLP-encoded node from the given data.
    ///
    /// Returns `None` if the data is longer than 33 bytes.
    #[inline]
    pub fn from_raw(data: &[u8]) -> Option<Self> {
        let mut buf = ArrayVec::new();
        buf.try_extend_from_slice(data).ok()?;
        Some(Self(buf))
    }

    /// Creates a new RLP-encoded node from the given data.
    #[inline]
    pub fn from_raw_rlp(data: &[u8]) -> alloy_rlp::Result<Self> {
        Self::from_raw(data).ok_or(alloy_rlp::Error::Custom("RLP node too large"))
    }

    /// Given an RLP-encoded node, returns it either as `rlp(node)` or
    /// `rlp(keccak(rlp(node)))`.
    ///
    /// The comparison is strict: a 32-byte serialization is already replaced
    /// by its hash, so that decoders can tell the two forms apart by length.
    #[inline]
    pub fn from_rlp(rlp: &[u8]) -> Self {
        if rlp.len() < B256::len_bytes() {
            // An inlined node always fits: len < 32 < MAX.
            Self::from_raw(rlp).expect("inlined node fits the reference buffer")
        } else {
            Self::word_rlp(&keccak256(rlp))
        }
    }

    /// RLP-encodes the given word and returns it as a new RLP node.
    #[inline]
    pub fn word_rlp(word: &B256) -> Self {
        let mut buf = [0u8; MAX];
        buf[0] = EMPTY_STRING_CODE + 32;
        buf[1..].copy_from_slice(word.as_slice());
        Self(ArrayVec::from(buf))
    }

    /// Returns true if this is an RLP-encoded hash.
    #[inline]
    pub fn is_hash(&self) -> bool {
        self.len() == B256::len_bytes() + 1
    }

    /// Returns the hash if this is an RLP-encoded hash.
    #[inline]
    pub fn as_hash(&self) -> Option<B256> {
        if self.is_hash() {
            Some(B256::from_slice(&self.0[1..]))
        } else {
            None
        }
    }

    /// Returns the RLP-encoded node as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_reference() {
        let hash = B256::repeat_byte(0xab);
        let node = RlpNode::word_rlp(&hash);
        assert_eq!(node.len(), 33);
        assert_eq!(node[0], EMPTY_STRING_CODE + 32);
        assert!(node.is_hash());
        assert_eq!(node.as_hash(), Some(hash));
    }

    #[test]
    fn embed_below_32_bytes() {
        let rlp = [0xc7, 0x82, 0x35, 0x06, 0x83, 0x61, 0x62, 0x63];
        let node = RlpNode::from_rlp(&rlp);
        assert!(!node.is_hash());
        assert_eq!(node.as_slice(), &rlp);
        assert_eq!(node.as_hash(), None);
    }

    #[test]
    fn hash_at_32_bytes() {
        let rlp = [0x01u8; 32];
        let node = RlpNode::from_rlp(&rlp);
        assert!(node.is_hash());
        assert_eq!(node.as_hash(), Some(keccak256(rlp)));

        let rlp = [0x01u8; 31];
        assert!(!RlpNode::from_rlp(&rlp).is_hash());
    }

    #[test]
    fn raw_rejects_oversized() {
        assert!(RlpNode::from_raw(&[0u8; 34]).is_none());
        assert!(RlpNode::from_raw_rlp(&[0u8; 34]).is_err());
        assert!(RlpNode::from_raw(&[0u8; 33]).is_some());
    }
}
