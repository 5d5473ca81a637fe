//! Bazel query ingestion for dependency-graph impact analysis
//!
//! This crate drives `bazel query` as a subprocess, decodes its streamed
//! binary output into typed targets, and computes stable content
//! fingerprints for source-file targets. It is the ingestion layer of an
//! impact-analysis pipeline: downstream consumers hash the graph
//! transitively and diff two snapshots to decide which tests must re-run.
//!
//! # Features
//!
//! - Deadlock-free subprocess execution with a dedicated stderr drain
//! - Streaming varint-framed record decoding in constant memory
//! - Typed target model with exhaustive kind matching
//! - Parallel SHA256 fingerprinting with whole-batch failure semantics
//!
//! # Example
//!
//! ```no_run
//! use convenient_bazel::{BazelClient, BazelQueryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BazelQueryConfig::new("/workspace", "/usr/bin/bazel")
//!         .with_keep_going(true)
//!         .with_verbose(true);
//!     let client = BazelClient::new(config);
//!
//!     let targets = client.query_all_targets()?;
//!     println!("{} targets in the graph", targets.len());
//!
//!     let fingerprints = client.query_all_source_file_targets()?;
//!     for (name, fingerprint) in &fingerprints {
//!         println!("{name} {fingerprint}");
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod framing;
pub mod proto;
pub mod runner;
pub mod target;

pub use client::BazelClient;
pub use config::BazelQueryConfig;
pub use error::{QueryError, QueryResult};
pub use fingerprint::{
    ContentDigestProvider, Fingerprint, SourceFingerprintComputer, WorkspaceDigestProvider,
};
pub use framing::FrameDecoder;
pub use runner::QueryRunner;
pub use target::{
    EnvironmentGroupTarget, GeneratedFileTarget, PackageGroupTarget, RuleTarget,
    SourceFileTarget, Target, TargetKind,
};
