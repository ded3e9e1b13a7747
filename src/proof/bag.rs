use alloy_primitives::{map::HashMap, Bytes, B256};

/// A content-addressed store of serialized trie nodes.
///
/// [`Trie::prove`](crate::Trie::prove) fills a bag with every node on the
/// walk to a key; [`verify_proof`](crate::verify_proof) reads nodes back by
/// their Keccak-256 digest. The trait keeps the backing pluggable.
pub trait ProofBag {
    /// Inserts a serialized node under its Keccak-256 digest.
    fn put(&mut self, hash: B256, node: Bytes);

    /// Returns the serialized node stored under the digest, if present.
    fn get(&self, hash: &B256) -> Option<&[u8]>;
}

/// A wrapper struct for the mapping of node hash to RLP encoded trie node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProofNodes(HashMap<B256, Bytes>);

impl ProofBag for ProofNodes {
    fn put(&mut self, hash: B256, node: Bytes) {
        self.0.insert(hash, node);
    }

    fn get(&self, hash: &B256) -> Option<&[u8]> {
        self.0.get(hash).map(|node| &node[..])
    }
}

impl FromIterator<(B256, Bytes)> for ProofNodes {
    fn from_iter<I: IntoIterator<Item = (B256, Bytes)>>(iter: I) -> Self {
        Self(HashMap::from_iter(iter))
    }
}

impl Extend<(B256, Bytes)> for ProofNodes {
    fn extend<I: IntoIterator<Item = (B256, Bytes)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl ProofNodes {
    /// Returns `true` if a node with the given hash is present.
    pub fn contains(&self, hash: &B256) -> bool {
        self.0.contains_key(hash)
    }

    /// Returns the number of nodes in the bag.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the bag holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over hash / serialized node pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&B256, &Bytes)> {
        self.0.iter()
    }

    /// Converts the bag into a vec of serialized nodes, sorted by hash.
    pub fn into_nodes_sorted(self) -> Vec<(B256, Bytes)> {
        let mut nodes = Vec::from_iter(self.0);
        nodes.sort_unstable_by_key(|(hash, _)| *hash);
        nodes
    }

    /// Convert wrapper struct into inner map.
    pub fn into_inner(self) -> HashMap<B256, Bytes> {
        self.0
    }
}
