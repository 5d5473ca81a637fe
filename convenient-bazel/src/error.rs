//! Error types for the query ingestion pipeline

use std::io;

/// Result alias used throughout the crate
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while ingesting a bazel query
///
/// Every variant is fatal to the current query; the crate performs no
/// retries and no silent recovery. Retry policy belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Temp-file I/O, process spawn, or stream read failure while
    /// interacting with the bazel subprocess
    #[error("{context}: {source}")]
    ProcessExecution {
        /// Which step of the subprocess interaction failed
        context: String,
        #[source]
        source: io::Error,
    },

    /// The output stream violated the length-delimited framing contract
    /// (truncated frame or invalid length prefix)
    #[error("malformed query stream: frame at byte offset {offset} cannot be decoded")]
    MalformedStream {
        /// Byte offset at which the offending frame begins
        offset: u64,
    },

    /// A well-framed record's payload violated the target wire structure
    #[error("invalid target record: {0}")]
    RecordDecode(String),

    /// The content-digest provider failed during parallel fingerprinting;
    /// the whole batch is discarded
    #[error("fingerprint computation failed for {name}: {source}")]
    FingerprintComputation {
        /// Label of the source-file target whose unit failed
        name: String,
        #[source]
        source: io::Error,
    },
}

impl QueryError {
    /// Wrap an I/O failure from the subprocess interaction
    pub(crate) fn process(context: impl Into<String>, source: io::Error) -> Self {
        Self::ProcessExecution {
            context: context.into(),
            source,
        }
    }
}

impl From<prost::DecodeError> for QueryError {
    fn from(err: prost::DecodeError) -> Self {
        Self::RecordDecode(err.to_string())
    }
}
