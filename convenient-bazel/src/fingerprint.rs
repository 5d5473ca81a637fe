//! Parallel content fingerprinting of source-file targets
//!
//! A fingerprint is a SHA-256 digest over a source target's label, its
//! subinclude labels in declared order, and optionally a digest of the
//! backing file's content. It is a pure function of that target's own
//! data: scheduling and batch composition never change it.

use crate::error::{QueryError, QueryResult};
use crate::target::{SourceFileTarget, Target};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

/// A deterministic content digest of one source-file target
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering of the digest
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

/// Supplies a digest of the file content backing a target label
///
/// Implementations must be deterministic for identical file content.
/// `Ok(None)` means no workspace file backs the label (for example an
/// external-repository label); the fingerprint then covers only the
/// label and its subincludes.
pub trait ContentDigestProvider: Sync {
    /// Digest the content behind `name`
    fn digest_of(&self, name: &str) -> io::Result<Option<Vec<u8>>>;
}

/// Default provider: reads label-relative files under the workspace root
/// and digests their bytes with SHA-256
pub struct WorkspaceDigestProvider {
    root: PathBuf,
}

impl WorkspaceDigestProvider {
    /// Create a provider rooted at the bazel workspace directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map `//pkg:path/file` to the workspace-relative path `pkg/path/file`
    fn label_to_relative_path(name: &str) -> Option<PathBuf> {
        let rest = name.strip_prefix("//")?;
        let rel = rest.replace(':', "/");
        Some(PathBuf::from(rel.trim_start_matches('/')))
    }
}

impl ContentDigestProvider for WorkspaceDigestProvider {
    fn digest_of(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        let Some(relative) = Self::label_to_relative_path(name) else {
            // External-repository labels have no file under this workspace.
            return Ok(None);
        };
        let content = std::fs::read(self.root.join(relative))?;
        let mut hasher = Sha256::new();
        hasher.update(&content);
        Ok(Some(hasher.finalize().to_vec()))
    }
}

/// Computes fingerprints for the source-file targets of a query result
pub struct SourceFingerprintComputer<P> {
    provider: P,
}

impl<P: ContentDigestProvider> SourceFingerprintComputer<P> {
    /// Create a computer backed by the given digest provider
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fingerprint every source-file target in `targets`
    ///
    /// Non-source variants are skipped silently. Each retained target is
    /// fingerprinted independently on the rayon pool. If any unit fails,
    /// the remaining units still run to completion, the first captured
    /// failure is raised afterwards, and no partial mapping is returned.
    /// When several units fail concurrently, which failure surfaces is
    /// unspecified.
    pub fn compute(
        &self,
        targets: &[Target],
        include_content_digest: bool,
    ) -> QueryResult<HashMap<String, Fingerprint>> {
        // Single-slot failure cell: first writer wins, later failures are
        // dropped. Any captured failure discards the whole batch.
        let failure: OnceLock<QueryError> = OnceLock::new();

        let entries: Vec<(String, Fingerprint)> = targets
            .par_iter()
            .filter_map(Target::as_source_file)
            .filter_map(|source| {
                match self.fingerprint_one(source, include_content_digest) {
                    Ok(fingerprint) => Some((source.name.clone(), fingerprint)),
                    Err(e) => {
                        let _ = failure.set(e);
                        None
                    }
                }
            })
            .collect();

        if let Some(e) = failure.into_inner() {
            return Err(e);
        }
        Ok(entries.into_iter().collect())
    }

    fn fingerprint_one(
        &self,
        source: &SourceFileTarget,
        include_content_digest: bool,
    ) -> QueryResult<Fingerprint> {
        let mut hasher = Sha256::new();
        hasher.update(source.name.as_bytes());
        // Subinclude order is fingerprintable content: reordering loads is
        // a change the diff must detect.
        for subinclude in &source.subincludes {
            hasher.update(subinclude.as_bytes());
        }
        if include_content_digest {
            let digest = self.provider.digest_of(&source.name).map_err(|e| {
                QueryError::FingerprintComputation {
                    name: source.name.clone(),
                    source: e,
                }
            })?;
            if let Some(digest) = digest {
                hasher.update(&digest);
            }
        }
        Ok(Fingerprint(hasher.finalize().into()))
    }
}
