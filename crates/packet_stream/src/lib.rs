//! # Packet Stream
//!
//! Packet-batching output stream with replica fan-out.
//!
//! Responsibilities:
//! - Coalesce byte-oriented writes into fixed-size packets
//! - Replicate every packet identically to each writer in the replica set
//! - Track per-replica progress to compute remaining capacity
//! - Release connections eagerly once the declared length is written

pub mod error;
pub mod factory;
pub mod metrics;
pub mod mock;
pub mod stream;

pub use contracts::{PacketWriter, PacketWriterFactory, SinkError, UNKNOWN_LENGTH};
pub use error::StreamError;
pub use factory::{local_stream, remote_stream, replicated_stream};
pub use metrics::{MetricsSnapshot, StreamMetrics};
pub use mock::{MockEvent, MockPacketWriter, MockWriterFactory, MockWriterState};
pub use stream::PacketOutStream;
