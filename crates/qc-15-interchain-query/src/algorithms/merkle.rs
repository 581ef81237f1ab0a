//! # Sorted Merkle Commitments
//!
//! Key-value Merkle tree over leaves sorted by key, with existence and
//! non-existence proofs.
//!
//! ## Hashing
//!
//! - leaf  = SHA256(leaf_prefix || len(key) as u32 BE || key || SHA256(value))
//! - inner = SHA256(inner_prefix || left || right)
//! - empty = SHA256(leaf_prefix)
//!
//! An odd node at the end of a level is paired with itself.
//!
//! Absence of a key is proven by the existence of its two adjacent
//! neighbours (or of the first/last leaf when the key sorts outside the
//! tree).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::{Hash, ProofOp, ProofOps, ProofSpec};

/// Proof op tag of an application substore proof.
pub const PROOF_OP_IAVL: &str = "ics23:iavl";

/// Proof op tag of a multistore proof.
pub const PROOF_OP_SIMPLE: &str = "ics23:simple";

/// Merkle proof errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// Proof bytes could not be decoded.
    #[error("could not decode commitment proof: {0}")]
    Decode(String),

    /// Proof op carries a tag this engine does not understand.
    #[error("unknown proof op type: {0}")]
    UnknownProofType(String),

    /// Proof walks more levels than the spec allows.
    #[error("proof depth {depth} exceeds maximum {max}")]
    DepthExceeded {
        /// Levels in the proof.
        depth: usize,
        /// Allowed levels.
        max: usize,
    },

    /// Proof structure is inconsistent.
    #[error("malformed proof: {0}")]
    Malformed(String),

    /// Recomputed root differs from the expected root.
    #[error("calculated root doesn't match provided root")]
    RootMismatch,
}

/// Proof that `key` maps to `value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenceProof {
    /// Proven key.
    pub key: Vec<u8>,
    /// Proven value.
    pub value: Vec<u8>,
    /// Position of the leaf.
    pub leaf_index: u64,
    /// Number of leaves in the tree.
    pub leaf_count: u64,
    /// Sibling hashes, leaf level first.
    pub siblings: Vec<Hash>,
}

impl ExistenceProof {
    /// Recompute the root this proof commits to.
    pub fn calculate_root(&self, spec: &ProofSpec) -> Result<Hash, MerkleError> {
        if self.leaf_count == 0 || self.leaf_index >= self.leaf_count {
            return Err(MerkleError::Malformed(format!(
                "leaf index {} out of range for {} leaves",
                self.leaf_index, self.leaf_count
            )));
        }
        if self.siblings.len() > spec.max_depth as usize {
            return Err(MerkleError::DepthExceeded {
                depth: self.siblings.len(),
                max: spec.max_depth as usize,
            });
        }

        let mut current = leaf_hash(spec, &self.key, &self.value);
        let mut index = self.leaf_index;
        let mut width = self.leaf_count;
        let mut siblings = self.siblings.iter();

        while width > 1 {
            let sibling = siblings
                .next()
                .ok_or_else(|| MerkleError::Malformed("too few siblings".to_string()))?;

            current = if index % 2 == 1 {
                inner_hash(spec, sibling, &current)
            } else {
                // Last node of an odd level pairs with itself.
                if index + 1 == width && *sibling != current {
                    return Err(MerkleError::Malformed(
                        "unpaired node must be duplicated".to_string(),
                    ));
                }
                inner_hash(spec, &current, sibling)
            };

            index /= 2;
            width = width.div_ceil(2);
        }

        if siblings.next().is_some() {
            return Err(MerkleError::Malformed("too many siblings".to_string()));
        }

        Ok(current)
    }

    /// Verify against `root`.
    pub fn verify(&self, spec: &ProofSpec, root: &Hash) -> Result<(), MerkleError> {
        if self.calculate_root(spec)? != *root {
            return Err(MerkleError::RootMismatch);
        }
        Ok(())
    }
}

/// Proof that `key` is absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonExistenceProof {
    /// Key proven absent.
    pub key: Vec<u8>,
    /// Greatest leaf below `key`, if any.
    pub left: Option<ExistenceProof>,
    /// Smallest leaf above `key`, if any.
    pub right: Option<ExistenceProof>,
}

impl NonExistenceProof {
    /// Recompute the root this proof commits to.
    pub fn calculate_root(&self, spec: &ProofSpec) -> Result<Hash, MerkleError> {
        match (&self.left, &self.right) {
            (None, None) => Ok(empty_root(spec)),
            (Some(left), None) => {
                self.check_left(left)?;
                if left.leaf_index + 1 != left.leaf_count {
                    return Err(MerkleError::Malformed(
                        "left neighbour is not the last leaf".to_string(),
                    ));
                }
                left.calculate_root(spec)
            }
            (None, Some(right)) => {
                self.check_right(right)?;
                if right.leaf_index != 0 {
                    return Err(MerkleError::Malformed(
                        "right neighbour is not the first leaf".to_string(),
                    ));
                }
                right.calculate_root(spec)
            }
            (Some(left), Some(right)) => {
                self.check_left(left)?;
                self.check_right(right)?;
                if left.leaf_count != right.leaf_count || left.leaf_index + 1 != right.leaf_index {
                    return Err(MerkleError::Malformed(
                        "neighbours are not adjacent".to_string(),
                    ));
                }
                let root = left.calculate_root(spec)?;
                if right.calculate_root(spec)? != root {
                    return Err(MerkleError::Malformed(
                        "neighbours commit to different roots".to_string(),
                    ));
                }
                Ok(root)
            }
        }
    }

    /// Verify against `root`.
    pub fn verify(&self, spec: &ProofSpec, root: &Hash) -> Result<(), MerkleError> {
        if self.calculate_root(spec)? != *root {
            return Err(MerkleError::RootMismatch);
        }
        Ok(())
    }

    fn check_left(&self, left: &ExistenceProof) -> Result<(), MerkleError> {
        if left.key >= self.key {
            return Err(MerkleError::Malformed(
                "left neighbour does not sort below key".to_string(),
            ));
        }
        Ok(())
    }

    fn check_right(&self, right: &ExistenceProof) -> Result<(), MerkleError> {
        if right.key <= self.key {
            return Err(MerkleError::Malformed(
                "right neighbour does not sort above key".to_string(),
            ));
        }
        Ok(())
    }
}

/// Commitment proof carried inside one proof op.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentProof {
    /// Key is present.
    Exist(ExistenceProof),
    /// Key is absent.
    NonExist(NonExistenceProof),
}

impl CommitmentProof {
    /// Decode a proof op.
    pub fn from_proof_op(op: &ProofOp) -> Result<Self, MerkleError> {
        match op.field_type.as_str() {
            PROOF_OP_IAVL | PROOF_OP_SIMPLE => {}
            other => return Err(MerkleError::UnknownProofType(other.to_string())),
        }
        let proof: CommitmentProof =
            bincode::deserialize(&op.data).map_err(|e| MerkleError::Decode(e.to_string()))?;
        if proof.key() != op.key.as_slice() {
            return Err(MerkleError::Malformed(
                "proof op key does not match proof key".to_string(),
            ));
        }
        Ok(proof)
    }

    /// Encode as a proof op with the given tag.
    pub fn to_proof_op(&self, field_type: &str) -> Result<ProofOp, MerkleError> {
        let data = bincode::serialize(self).map_err(|e| MerkleError::Decode(e.to_string()))?;
        Ok(ProofOp {
            field_type: field_type.to_string(),
            key: self.key().to_vec(),
            data,
        })
    }

    /// Key the proof is about.
    pub fn key(&self) -> &[u8] {
        match self {
            CommitmentProof::Exist(p) => &p.key,
            CommitmentProof::NonExist(p) => &p.key,
        }
    }
}

/// Decode every op of a chained proof, innermost first.
pub fn convert_proof_ops(proof_ops: &ProofOps) -> Result<Vec<CommitmentProof>, MerkleError> {
    if proof_ops.ops.is_empty() {
        return Err(MerkleError::Malformed("proof has no ops".to_string()));
    }
    proof_ops.ops.iter().map(CommitmentProof::from_proof_op).collect()
}

/// Leaf hash.
pub fn leaf_hash(spec: &ProofSpec, key: &[u8], value: &[u8]) -> Hash {
    let value_hash = Sha256::digest(value);
    let mut hasher = Sha256::new();
    hasher.update([spec.leaf_prefix]);
    hasher.update((key.len() as u32).to_be_bytes());
    hasher.update(key);
    hasher.update(value_hash);
    finalize(hasher)
}

/// Inner node hash.
pub fn inner_hash(spec: &ProofSpec, left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([spec.inner_prefix]);
    hasher.update(left);
    hasher.update(right);
    finalize(hasher)
}

/// Root of a tree with no leaves.
pub fn empty_root(spec: &ProofSpec) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([spec.leaf_prefix]);
    finalize(hasher)
}

fn finalize(hasher: Sha256) -> Hash {
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Merkle tree over sorted key-value pairs.
#[derive(Clone, Debug)]
pub struct SortedMerkleTree {
    spec: ProofSpec,
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    // levels[0] = leaves, last = [root].
    levels: Vec<Vec<Hash>>,
}

impl SortedMerkleTree {
    /// Build a tree over `entries`.
    pub fn new(spec: ProofSpec, entries: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        let entries: Vec<(Vec<u8>, Vec<u8>)> = entries.into_iter().collect();
        let leaves: Vec<Hash> = entries
            .iter()
            .map(|(k, v)| leaf_hash(&spec, k, v))
            .collect();

        let mut levels = vec![leaves];
        while levels.last().map_or(0, Vec::len) > 1 {
            let level = &levels[levels.len() - 1];
            let next: Vec<Hash> = level
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    inner_hash(&spec, left, right)
                })
                .collect();
            levels.push(next);
        }

        Self {
            spec,
            entries,
            levels,
        }
    }

    /// Tree root.
    pub fn root(&self) -> Hash {
        match self.levels.last().and_then(|level| level.first()) {
            Some(root) => *root,
            None => empty_root(&self.spec),
        }
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.position(key).ok().map(|i| self.entries[i].1.as_slice())
    }

    /// Prove `key` is present.
    pub fn prove_existence(&self, key: &[u8]) -> Option<ExistenceProof> {
        self.position(key).ok().map(|index| self.existence_at(index))
    }

    /// Prove `key` is absent.
    pub fn prove_non_existence(&self, key: &[u8]) -> Option<NonExistenceProof> {
        let insert_at = self.position(key).err()?;
        Some(self.non_existence_at(key, insert_at))
    }

    /// Existence or non-existence proof, whichever holds.
    pub fn prove(&self, key: &[u8]) -> CommitmentProof {
        match self.position(key) {
            Ok(index) => CommitmentProof::Exist(self.existence_at(index)),
            Err(insert_at) => CommitmentProof::NonExist(self.non_existence_at(key, insert_at)),
        }
    }

    fn position(&self, key: &[u8]) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| k.as_slice().cmp(key))
    }

    fn non_existence_at(&self, key: &[u8], insert_at: usize) -> NonExistenceProof {
        let left = insert_at.checked_sub(1).map(|i| self.existence_at(i));
        let right = (insert_at < self.entries.len()).then(|| self.existence_at(insert_at));
        NonExistenceProof {
            key: key.to_vec(),
            left,
            right,
        }
    }

    fn existence_at(&self, leaf_index: usize) -> ExistenceProof {
        let mut siblings = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut index = leaf_index;
        for level in &self.levels[..self.levels.len().saturating_sub(1)] {
            let sibling = index ^ 1;
            siblings.push(*level.get(sibling).unwrap_or(&level[index]));
            index /= 2;
        }
        let (key, value) = &self.entries[leaf_index];
        ExistenceProof {
            key: key.clone(),
            value: value.clone(),
            leaf_index: leaf_index as u64,
            leaf_count: self.entries.len() as u64,
            siblings,
        }
    }
}

/// Two-level commitment: named substores committed by a multistore tree.
///
/// Mirrors a chain whose app hash commits one root per module store.
#[derive(Clone, Debug, Default)]
pub struct MultiStoreTree {
    stores: BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MultiStoreTree {
    /// Empty multistore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value` in `store`, creating the store if needed.
    pub fn insert(&mut self, store: &str, key: &[u8], value: &[u8]) {
        self.stores
            .entry(store.to_string())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
    }

    /// Create an empty store.
    pub fn add_store(&mut self, store: &str) {
        self.stores.entry(store.to_string()).or_default();
    }

    fn substore(&self, store: &str) -> Option<SortedMerkleTree> {
        self.stores
            .get(store)
            .map(|entries| SortedMerkleTree::new(ProofSpec::iavl(), entries.clone()))
    }

    fn outer(&self) -> SortedMerkleTree {
        let roots: BTreeMap<Vec<u8>, Vec<u8>> = self
            .stores
            .iter()
            .map(|(name, entries)| {
                let root = SortedMerkleTree::new(ProofSpec::iavl(), entries.clone()).root();
                (name.as_bytes().to_vec(), root.to_vec())
            })
            .collect();
        SortedMerkleTree::new(ProofSpec::tendermint(), roots)
    }

    /// App hash committing every store.
    pub fn root(&self) -> Hash {
        self.outer().root()
    }

    /// Chained proof of `key` in `store`: membership if present, otherwise
    /// non-membership. `None` if the store does not exist.
    pub fn prove(&self, store: &str, key: &[u8]) -> Option<ProofOps> {
        let inner = self.substore(store)?.prove(key);
        let outer = self.outer().prove_existence(store.as_bytes())?;
        let ops = vec![
            inner.to_proof_op(PROOF_OP_IAVL).ok()?,
            CommitmentProof::Exist(outer)
                .to_proof_op(PROOF_OP_SIMPLE)
                .ok()?,
        ];
        Some(ProofOps { ops })
    }
}
