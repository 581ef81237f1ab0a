//! Merkle Commitment Adapter
//!
//! Implements the `CommitmentVerifier` port with the sorted SHA-256 Merkle
//! engine. A proof is a chain of ops, innermost first: each op proves its
//! path segment under the root computed by the op before it, and the last
//! root must equal the consensus root.

use crate::algorithms::merkle::{convert_proof_ops, CommitmentProof, MerkleError};
use crate::config::InterchainQueryConfig;
use crate::domain::{CommitmentError, CommitmentRoot, MerklePath, ProofOps, ProofSpec};
use crate::ports::outbound::CommitmentVerifier;

/// Chained Merkle proof verifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct MerkleCommitmentVerifier {
    depth_cap: Option<u32>,
}

impl MerkleCommitmentVerifier {
    /// Verifier bounded only by each spec's own depth.
    pub fn new() -> Self {
        Self { depth_cap: None }
    }

    /// Verifier that additionally caps every spec at `max_depth`.
    pub fn with_max_depth(max_depth: u32) -> Self {
        Self {
            depth_cap: Some(max_depth),
        }
    }

    /// Verifier capped at the configured proof depth.
    pub fn from_config(config: &InterchainQueryConfig) -> Self {
        Self::with_max_depth(config.max_proof_depth)
    }

    fn bounded(&self, spec: &ProofSpec) -> ProofSpec {
        let mut spec = *spec;
        if let Some(cap) = self.depth_cap {
            spec.max_depth = spec.max_depth.min(cap);
        }
        spec
    }

    fn verify_chain(
        &self,
        specs: &[ProofSpec],
        root: &CommitmentRoot,
        path: &MerklePath,
        proof: &ProofOps,
        value: Option<&[u8]>,
    ) -> Result<(), CommitmentError> {
        let proofs = convert_proof_ops(proof)
            .map_err(|e| CommitmentError::ProofConversion(e.to_string()))?;

        if proofs.len() != specs.len() || proofs.len() != path.len() {
            return Err(CommitmentError::Verification(format!(
                "proof has {} ops, path has {} segments, {} specs supplied",
                proofs.len(),
                path.len(),
                specs.len()
            )));
        }

        // Path segments are outermost first; proofs innermost first.
        let mut segments = path.key_path.iter().rev();
        let mut computed: Option<Vec<u8>> = None;

        for (level, (commitment, spec)) in proofs.iter().zip(specs).enumerate() {
            let spec = self.bounded(spec);
            let key = segments
                .next()
                .ok_or_else(|| CommitmentError::Verification("path too short".to_string()))?;
            if commitment.key() != key.as_slice() {
                return Err(CommitmentError::Verification(format!(
                    "proof at level {} is for a different key",
                    level
                )));
            }

            let sub_root = match (commitment, level, value) {
                (CommitmentProof::NonExist(absent), 0, None) => absent.calculate_root(&spec),
                (CommitmentProof::Exist(present), 0, Some(expected)) => {
                    check_value(present.value.as_slice(), expected)?;
                    present.calculate_root(&spec)
                }
                (CommitmentProof::Exist(present), _, _) if level > 0 => {
                    let expected = computed.as_deref().unwrap_or_default();
                    check_value(present.value.as_slice(), expected)?;
                    present.calculate_root(&spec)
                }
                _ => {
                    return Err(CommitmentError::Verification(format!(
                        "unexpected proof kind at level {}",
                        level
                    )))
                }
            }
            .map_err(verification_error)?;

            computed = Some(sub_root.to_vec());
        }

        match computed {
            Some(calculated) if calculated.as_slice() == root.hash().as_slice() => Ok(()),
            _ => Err(verification_error(MerkleError::RootMismatch)),
        }
    }
}

fn check_value(proven: &[u8], expected: &[u8]) -> Result<(), CommitmentError> {
    if proven != expected {
        return Err(CommitmentError::Verification(
            "proven value does not match".to_string(),
        ));
    }
    Ok(())
}

fn verification_error(err: MerkleError) -> CommitmentError {
    CommitmentError::Verification(err.to_string())
}

impl CommitmentVerifier for MerkleCommitmentVerifier {
    fn verify_membership(
        &self,
        specs: &[ProofSpec],
        root: &CommitmentRoot,
        path: &MerklePath,
        proof: &ProofOps,
        value: &[u8],
    ) -> Result<(), CommitmentError> {
        if value.is_empty() {
            return Err(CommitmentError::Verification(
                "membership value cannot be empty".to_string(),
            ));
        }
        self.verify_chain(specs, root, path, proof, Some(value))
    }

    fn verify_non_membership(
        &self,
        specs: &[ProofSpec],
        root: &CommitmentRoot,
        path: &MerklePath,
        proof: &ProofOps,
    ) -> Result<(), CommitmentError> {
        self.verify_chain(specs, root, path, proof, None)
    }
}
