//! PacketWriterFactory trait - writer construction seam
//!
//! Connection and session establishment stay behind this trait; the stream
//! crate only decides how many writers it needs and where they point.

use std::net::SocketAddr;

use crate::{BlockId, PacketWriter, SessionId, SinkError, WriteRequestKind};

/// Constructs writers for local or remote targets.
///
/// The factory value stands for the worker handle: a local writer is created
/// against the worker the factory wraps, a remote writer against an explicit
/// endpoint and session.
#[trait_variant::make(PacketWriterFactory: Send)]
pub trait LocalPacketWriterFactory {
    /// Writer type this factory produces.
    type Writer: PacketWriter;

    /// Create a writer targeting a local file managed by the worker.
    ///
    /// # Errors
    /// Returns a connection error if the worker rejects the stream.
    async fn local_writer(&self, block_id: BlockId) -> Result<Self::Writer, SinkError>;

    /// Create a writer targeting a remote storage worker.
    ///
    /// # Errors
    /// Returns a connection error if the endpoint is unreachable or the
    /// session is rejected.
    async fn remote_writer(
        &self,
        endpoint: SocketAddr,
        session_id: SessionId,
        block_id: BlockId,
        length: u64,
        kind: WriteRequestKind,
    ) -> Result<Self::Writer, SinkError>;
}
