//! PacketWriter trait - per-replica packet consumer
//!
//! Defines the abstract interface every sink implementation must provide.

use bytes::Bytes;

use crate::SinkError;

/// Packet consumer for one logical stream.
///
/// A writer accepts ordered packets for a single target (local file, network
/// channel to a storage worker) and reports its durable progress via
/// [`pos`](LocalPacketWriter::pos). Async operations may stay pending to
/// exert backpressure on the producer.
#[trait_variant::make(PacketWriter: Send)]
pub trait LocalPacketWriter {
    /// Bytes durably accepted so far; monotonically non-decreasing.
    fn pos(&self) -> u64;

    /// Fixed packet size configured for this writer.
    fn packet_size(&self) -> usize;

    /// Accept one packet, taking ownership of the view.
    ///
    /// Must preserve packet order. Dropping the view releases the reference.
    ///
    /// # Errors
    /// Returns a write error; the packet is considered lost for this writer.
    async fn write_packet(&mut self, packet: Bytes) -> Result<(), SinkError>;

    /// Push any buffered packets toward durable delivery.
    async fn flush(&mut self) -> Result<(), SinkError>;

    /// Abort outstanding work and discard unflushed data.
    async fn cancel(&mut self) -> Result<(), SinkError>;

    /// Finalize and release writer resources; idempotent.
    async fn close(&mut self) -> Result<(), SinkError>;
}
