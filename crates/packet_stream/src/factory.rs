//! Stream construction helpers
//!
//! Builds [`PacketOutStream`] instances over a [`PacketWriterFactory`].
//! Connection and session establishment stay inside the factory; these
//! helpers only decide how many writers a stream needs and where they point.

use std::net::SocketAddr;

use tracing::instrument;

use contracts::{BlockId, PacketWriterFactory, SessionId, WriteRequestKind};

use crate::error::StreamError;
use crate::stream::PacketOutStream;

/// Create a stream that writes to a local file managed by the worker.
///
/// # Errors
/// Fails when the factory cannot create the writer.
#[instrument(name = "stream_create_local", skip(factory))]
pub async fn local_stream<F: PacketWriterFactory>(
    factory: &F,
    block_id: BlockId,
    length: u64,
) -> Result<PacketOutStream<F::Writer>, StreamError> {
    let writer = factory.local_writer(block_id).await?;
    Ok(PacketOutStream::new(writer, length))
}

/// Create a stream that writes to a single remote storage worker.
///
/// # Errors
/// Fails when the factory cannot create the writer.
#[instrument(name = "stream_create_remote", skip(factory))]
pub async fn remote_stream<F: PacketWriterFactory>(
    factory: &F,
    endpoint: SocketAddr,
    session_id: SessionId,
    block_id: BlockId,
    length: u64,
    kind: WriteRequestKind,
) -> Result<PacketOutStream<F::Writer>, StreamError> {
    replicated_stream(factory, &[endpoint], &[session_id], block_id, length, kind).await
}

/// Create a stream replicated across a set of remote storage workers.
///
/// `endpoints` and `session_ids` are parallel lists, one entry per replica;
/// length and block id are shared across the set.
///
/// # Errors
/// Fails with [`StreamError::MismatchedReplicaLists`] when the lists differ
/// in length, [`StreamError::EmptyReplicaSet`] when they are empty, and
/// propagates factory failures.
#[instrument(
    name = "stream_create_replicated",
    skip(factory, endpoints, session_ids),
    fields(replicas = endpoints.len())
)]
pub async fn replicated_stream<F: PacketWriterFactory>(
    factory: &F,
    endpoints: &[SocketAddr],
    session_ids: &[SessionId],
    block_id: BlockId,
    length: u64,
    kind: WriteRequestKind,
) -> Result<PacketOutStream<F::Writer>, StreamError> {
    if endpoints.len() != session_ids.len() {
        return Err(StreamError::MismatchedReplicaLists {
            endpoints: endpoints.len(),
            sessions: session_ids.len(),
        });
    }

    let mut writers = Vec::with_capacity(endpoints.len());
    for (endpoint, session_id) in endpoints.iter().zip(session_ids) {
        writers.push(
            factory
                .remote_writer(*endpoint, *session_id, block_id, length, kind)
                .await?,
        );
    }
    PacketOutStream::with_writers(writers, length)
}
