//! Public facade over the query pipeline
//!
//! [`BazelClient`] is the boundary the surrounding impact-analysis
//! pipeline consumes: two operations, no retained state between calls.

use crate::config::BazelQueryConfig;
use crate::error::QueryResult;
use crate::fingerprint::{
    ContentDigestProvider, Fingerprint, SourceFingerprintComputer, WorkspaceDigestProvider,
};
use crate::runner::QueryRunner;
use crate::target::Target;
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

/// Every target under the workspace plus every external-repository target
const ALL_TARGETS_QUERY: &str = "'//external:all-targets' + '//...:all-targets'";

/// Only source-file-kind targets under the workspace
const SOURCE_FILE_TARGETS_QUERY: &str = "kind('source file', //...:all-targets)";

/// Client for extracting a workspace's dependency graph via `bazel query`
///
/// Owns its [`BazelQueryConfig`] for the duration of each query. Every
/// call performs exactly one query round-trip and returns in-memory
/// structures; nothing is cached across invocations.
pub struct BazelClient<P = WorkspaceDigestProvider> {
    runner: QueryRunner,
    fingerprints: SourceFingerprintComputer<P>,
}

impl BazelClient<WorkspaceDigestProvider> {
    /// Create a client whose content digests come from files under the
    /// configured working directory
    pub fn new(config: BazelQueryConfig) -> Self {
        let provider = WorkspaceDigestProvider::new(&config.working_directory);
        Self::with_digest_provider(config, provider)
    }
}

impl<P: ContentDigestProvider> BazelClient<P> {
    /// Create a client with a custom content-digest collaborator
    pub fn with_digest_provider(config: BazelQueryConfig, provider: P) -> Self {
        Self {
            runner: QueryRunner::new(config),
            fingerprints: SourceFingerprintComputer::new(provider),
        }
    }

    fn verbose(&self) -> bool {
        self.runner.config().verbose
    }

    /// Query every target in the workspace, in stream order
    pub fn query_all_targets(&self) -> QueryResult<Vec<Target>> {
        let query_start = Instant::now();
        let targets = self.runner.run(ALL_TARGETS_QUERY)?;
        if self.verbose() {
            info!("All targets queried in {:?}", query_start.elapsed());
        }
        Ok(targets)
    }

    /// Query every source-file target and fingerprint each one
    ///
    /// Fingerprints include the backing file's content digest. The
    /// returned map has no meaningful iteration order.
    pub fn query_all_source_file_targets(&self) -> QueryResult<HashMap<String, Fingerprint>> {
        let query_start = Instant::now();
        let targets = self.runner.run(SOURCE_FILE_TARGETS_QUERY)?;
        let query_elapsed = query_start.elapsed();

        let hash_start = Instant::now();
        let fingerprints = self.fingerprints.compute(&targets, true)?;
        if self.verbose() {
            info!("All source files queried in {query_elapsed:?}");
            info!("Content fingerprints calculated in {:?}", hash_start.elapsed());
        }
        Ok(fingerprints)
    }
}
