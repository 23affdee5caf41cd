//! PacketOutStream - byte writes coalesced into replicated packets
//!
//! The stream fills one packet buffer at a time. When the buffer is full, or
//! when flush/close finalizes the stream, every writer in the replica set is
//! handed its own view of the packet before the stream releases its own.

use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, error, instrument, warn};

use contracts::{PacketWriter, SinkError};

use crate::error::StreamError;
use crate::metrics::StreamMetrics;

/// Which shutdown operation is being fanned out to the replica set
#[derive(Debug, Clone, Copy)]
enum ShutdownOp {
    Cancel,
    Close,
}

impl ShutdownOp {
    fn name(self) -> &'static str {
        match self {
            ShutdownOp::Cancel => "cancel",
            ShutdownOp::Close => "close",
        }
    }
}

/// Packet-batching output stream replicating to a fixed set of writers.
///
/// Not safe for concurrent use: all mutating operations take `&mut self` and
/// callers with concurrent producers must serialize externally. Backpressure
/// from a slow writer propagates by keeping the write call pending.
#[derive(Debug)]
pub struct PacketOutStream<W> {
    /// Declared stream length; `UNKNOWN_LENGTH` means unbounded
    length: u64,
    /// Packet size, taken from the first writer
    packet_size: usize,
    /// Ordered, non-empty replica set
    writers: Vec<W>,
    /// In-flight packet being filled; `None` when no data is pending
    current: Option<BytesMut>,
    closed: bool,
    metrics: Arc<StreamMetrics>,
}

impl<W: PacketWriter> PacketOutStream<W> {
    /// Create a stream with a single writer
    pub fn new(writer: W, length: u64) -> Self {
        let packet_size = writer.packet_size();
        Self {
            length,
            packet_size,
            writers: vec![writer],
            current: None,
            closed: false,
            metrics: Arc::new(StreamMetrics::new()),
        }
    }

    /// Create a stream replicating to every writer in `writers`
    ///
    /// # Errors
    /// Fails with [`StreamError::EmptyReplicaSet`] for an empty set.
    pub fn with_writers(writers: Vec<W>, length: u64) -> Result<Self, StreamError> {
        let Some(first) = writers.first() else {
            return Err(StreamError::EmptyReplicaSet);
        };
        let packet_size = first.packet_size();
        if writers.iter().any(|w| w.packet_size() != packet_size) {
            warn!(packet_size, "Replica packet sizes differ, using the first writer's");
        }
        Ok(Self {
            length,
            packet_size,
            writers,
            current: None,
            closed: false,
            metrics: Arc::new(StreamMetrics::new()),
        })
    }

    /// Bytes left to write before the declared length is satisfied.
    ///
    /// Aggregates the slowest replica's progress plus the bytes pending in
    /// the current packet. Safe to call at any time, including after close.
    pub fn remaining(&self) -> u64 {
        let pos = self.writers.iter().map(|w| w.pos()).min().unwrap_or(0);
        let pending = self.current.as_ref().map_or(0, |p| p.len() as u64);
        self.length.saturating_sub(pos).saturating_sub(pending)
    }

    /// Whether the stream has transitioned to its terminal state
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Packet size used for every allocation
    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    /// Number of writers in the replica set
    pub fn replica_count(&self) -> usize {
        self.writers.len()
    }

    /// Shared handle to the stream's dispatch counters
    pub fn metrics(&self) -> Arc<StreamMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Append a single byte.
    ///
    /// # Errors
    /// Fails with [`StreamError::Closed`] after close and
    /// [`StreamError::EndOfStream`] when no capacity remains.
    pub async fn write_u8(&mut self, byte: u8) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        if self.remaining() == 0 {
            return Err(StreamError::EndOfStream);
        }
        self.update_current_packet(false).await?;
        let packet_size = self.packet_size;
        self.current
            .get_or_insert_with(|| BytesMut::with_capacity(packet_size))
            .put_u8(byte);
        // An exactly filled packet dispatches now rather than lingering
        // across the call boundary.
        self.update_current_packet(false).await
    }

    /// Append a slice, dispatching packets as they fill.
    ///
    /// The length bound is enforced up front: an overflowing write fails
    /// before any of its bytes is buffered or dispatched.
    ///
    /// # Errors
    /// Fails with [`StreamError::Closed`] after close and
    /// [`StreamError::EndOfStream`] when `buf` exceeds the remaining
    /// capacity. Writer failures propagate as [`StreamError::Sink`].
    pub async fn write(&mut self, mut buf: &[u8]) -> Result<(), StreamError> {
        if buf.is_empty() {
            return Ok(());
        }
        if self.closed {
            return Err(StreamError::Closed);
        }
        if buf.len() as u64 > self.remaining() {
            return Err(StreamError::EndOfStream);
        }

        while !buf.is_empty() {
            self.update_current_packet(false).await?;
            let packet_size = self.packet_size;
            let packet = self
                .current
                .get_or_insert_with(|| BytesMut::with_capacity(packet_size));
            let take = buf.len().min(packet_size - packet.len());
            packet.extend_from_slice(&buf[..take]);
            buf = &buf[take..];
        }
        // Handles the case where the write exactly filled the packet.
        self.update_current_packet(false).await
    }

    /// Finalize the current packet and flush every writer.
    ///
    /// When the declared length is fully written afterwards, the stream
    /// closes itself so a connection reused for many bounded streams is
    /// released without waiting for an explicit close.
    #[instrument(name = "packet_stream_flush", skip(self))]
    pub async fn flush(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        self.update_current_packet(true).await?;
        for writer in &mut self.writers {
            writer.flush().await?;
        }
        self.metrics.inc_flush_count();

        if self.remaining() == 0 {
            debug!("Declared length satisfied, closing stream early");
            self.close().await?;
        }
        Ok(())
    }

    /// Discard the pending packet and cancel every writer.
    ///
    /// The pending buffer is released without ever being offered to a
    /// writer. Cancellation is per-writer best-effort: every writer receives
    /// its cancel attempt and failures are aggregated. Marks the stream
    /// closed, so repeated cancels are no-ops.
    #[instrument(name = "packet_stream_cancel", skip(self))]
    pub async fn cancel(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        self.current = None;
        self.closed = true;

        let attempted = self.writers.len();
        let failures = Self::shutdown_writers(&mut self.writers, ShutdownOp::Cancel).await;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(StreamError::shutdown("cancel", attempted, failures))
        }
    }

    /// Finalize the current packet as last and close every writer.
    ///
    /// Idempotent: a second call issues no writer operations. Every writer
    /// receives its close attempt even when earlier ones fail; failures are
    /// aggregated and take precedence over a finalize failure.
    #[instrument(name = "packet_stream_close", skip(self))]
    pub async fn close(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        let finalized = self.update_current_packet(true).await;
        self.closed = true;

        let attempted = self.writers.len();
        let failures = Self::shutdown_writers(&mut self.writers, ShutdownOp::Close).await;
        if !failures.is_empty() {
            return Err(StreamError::shutdown("close", attempted, failures));
        }
        finalized
    }

    /// The packet boundary policy.
    ///
    /// Lazily allocates the current packet, and dispatches it to the replica
    /// set once it is full or the stream is finalizing. A fresh packet is
    /// allocated to continue filling unless this was the last packet.
    async fn update_current_packet(&mut self, finalize: bool) -> Result<(), StreamError> {
        // Fast path for the common case: still filling.
        if let Some(packet) = &self.current {
            if packet.len() < self.packet_size && !finalize {
                return Ok(());
            }
        }

        let Some(packet) = self.current.take() else {
            if !finalize {
                self.current = Some(BytesMut::with_capacity(self.packet_size));
            }
            return Ok(());
        };

        if !packet.is_empty() {
            self.dispatch(packet.freeze()).await?;
        }
        if !finalize {
            self.current = Some(BytesMut::with_capacity(self.packet_size));
        }
        Ok(())
    }

    /// Hand one view of `packet` to every writer, in replica order.
    ///
    /// The stream's own reference drops when `packet` leaves scope, error
    /// paths included, so it is released exactly once.
    async fn dispatch(&mut self, packet: Bytes) -> Result<(), StreamError> {
        let bytes = packet.len();
        for writer in &mut self.writers {
            writer.write_packet(packet.clone()).await?;
        }
        self.metrics.record_dispatch(bytes);
        debug!(bytes, replicas = self.writers.len(), "Packet dispatched");
        Ok(())
    }

    async fn shutdown_writers(writers: &mut [W], op: ShutdownOp) -> Vec<SinkError> {
        let mut failures = Vec::new();
        for (replica, writer) in writers.iter_mut().enumerate() {
            let result = match op {
                ShutdownOp::Cancel => writer.cancel().await,
                ShutdownOp::Close => writer.close().await,
            };
            if let Err(e) = result {
                error!(replica, op = op.name(), error = %e, "Writer shutdown failed");
                failures.push(e);
            }
        }
        failures
    }
}
