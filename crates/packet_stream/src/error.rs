//! Stream error types

use contracts::SinkError;
use thiserror::Error;

/// Packet-stream-specific errors
#[derive(Debug, Error)]
pub enum StreamError {
    /// Write attempted past the declared length
    #[error("write past the end of the stream")]
    EndOfStream,

    /// Write attempted on a closed stream
    #[error("stream is closed")]
    Closed,

    /// A stream needs at least one writer
    #[error("replica set is empty")]
    EmptyReplicaSet,

    /// Parallel replica lists of different lengths
    #[error("mismatched replica lists: {endpoints} endpoints, {sessions} session ids")]
    MismatchedReplicaLists { endpoints: usize, sessions: usize },

    /// Sink failure during dispatch or flush (from contract)
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// One or more sinks failed while the stream was shutting down.
    ///
    /// Every sink still received its close/cancel attempt; `failures` keeps
    /// each observed error in sink order.
    #[error("{op} failed on {} of {attempted} sinks (last: {})", .failures.len(), last_failure(.failures))]
    Shutdown {
        op: &'static str,
        attempted: usize,
        failures: Vec<SinkError>,
    },
}

fn last_failure(failures: &[SinkError]) -> String {
    failures.last().map(ToString::to_string).unwrap_or_default()
}

impl StreamError {
    /// Aggregate shutdown failures, keeping every sink's error
    pub fn shutdown(op: &'static str, attempted: usize, failures: Vec<SinkError>) -> Self {
        Self::Shutdown {
            op,
            attempted,
            failures,
        }
    }
}
