//! Subprocess lifecycle for one bazel query round-trip
//!
//! Runs `bazel query` with streamed binary output, draining stderr on a
//! dedicated thread while the caller's thread decodes stdout. Both pipes
//! have bounded kernel buffers: a parent that only reads stdout while the
//! child fills stderr deadlocks once that buffer is full, so the drain
//! thread is a correctness requirement, not a nicety.

use crate::config::BazelQueryConfig;
use crate::error::{QueryError, QueryResult};
use crate::framing::FrameDecoder;
use crate::target::Target;
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, info, warn};

/// Drives one `bazel query` invocation and decodes its streamed output
pub struct QueryRunner {
    config: BazelQueryConfig,
}

impl QueryRunner {
    /// Create a runner for the given configuration
    pub fn new(config: BazelQueryConfig) -> Self {
        Self { config }
    }

    /// The configuration this runner was built with
    pub fn config(&self) -> &BazelQueryConfig {
        &self.config
    }

    /// Run `query` and return the decoded targets in stream order
    ///
    /// A non-zero exit status is logged but not fatal: the contract is
    /// "decode whatever was streamed before end-of-stream", and callers
    /// needing exit-code semantics check them at their own layer. The
    /// query file is per-invocation and removed on every exit path.
    pub fn run(&self, query: &str) -> QueryResult<Vec<Target>> {
        if self.config.verbose {
            info!("Executing query: {query}");
        }

        // The query text travels through a file, never argv: expressions
        // enumerating a large workspace overflow OS argument-length limits.
        let mut query_file = tempfile::NamedTempFile::new()
            .map_err(|e| QueryError::process("creating query file", e))?;
        query_file
            .write_all(query.as_bytes())
            .and_then(|()| query_file.flush())
            .map_err(|e| QueryError::process("writing query file", e))?;

        let mut child = Command::new(&self.config.bazel_path)
            .args(self.command_args(query_file.path()))
            .current_dir(&self.config.working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| QueryError::process("spawning bazel", e))?;

        let stop = Arc::new(AtomicBool::new(false));
        let drain = spawn_stderr_drain(&mut child, stop.clone(), self.config.verbose);

        let decoded = decode_targets(&mut child);

        // Cleanup runs on every path: signal the drain thread, reap the
        // child (closing both pipes), then join.
        stop.store(true, Ordering::Relaxed);
        if decoded.is_err() {
            // Bazel may still be streaming; closing our pipe ends is not
            // guaranteed to stop it before wait().
            let _ = child.kill();
        }
        match child.wait() {
            Ok(status) if !status.success() => {
                warn!("bazel query exited with {status}");
            }
            Ok(_) => {}
            Err(e) => warn!("failed to reap bazel query process: {e}"),
        }
        if let Some(handle) = drain {
            let _ = handle.join();
        }

        decoded
    }

    /// Assemble the argument vector for one invocation
    ///
    /// Bazel's argument parser is positional: startup options must come
    /// before the `query` subcommand, command options after it.
    fn command_args(&self, query_file: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if self.config.debug {
            args.push("--bazelrc=/dev/null".into());
        }
        args.extend(self.config.startup_options.iter().map(OsString::from));
        args.push("query".into());
        args.push("--output".into());
        args.push("streamed_proto".into());
        args.push("--order_output=no".into());
        if self.config.keep_going {
            args.push("--keep_going".into());
        }
        args.extend(self.config.command_options.iter().map(OsString::from));
        args.push("--query_file".into());
        args.push(query_file.as_os_str().to_os_string());
        args
    }
}

/// Decode stdout frames into targets until end-of-stream
fn decode_targets(child: &mut Child) -> QueryResult<Vec<Target>> {
    let stdout = child.stdout.take().ok_or_else(|| {
        QueryError::process(
            "capturing bazel stdout",
            io::Error::new(io::ErrorKind::BrokenPipe, "stdout was not piped"),
        )
    })?;

    let mut targets = Vec::new();
    for frame in FrameDecoder::new(BufReader::new(stdout)) {
        targets.push(Target::from_record(&frame?)?);
    }
    debug!("decoded {} targets from query stream", targets.len());
    Ok(targets)
}

/// Continuously drain the child's stderr so its pipe buffer never fills
fn spawn_stderr_drain(
    child: &mut Child,
    stop: Arc<AtomicBool>,
    verbose: bool,
) -> Option<thread::JoinHandle<()>> {
    let stderr = child.stderr.take()?;
    Some(thread::spawn(move || {
        for line in BufReader::new(stderr).lines() {
            let Ok(line) = line else { break };
            if verbose {
                info!("bazel: {line}");
            } else {
                debug!("bazel: {line}");
            }
            if stop.load(Ordering::Relaxed) {
                break;
            }
        }
    }))
}
