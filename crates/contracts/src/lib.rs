//! # Contracts
//!
//! Frozen interface contracts (ICD), defining the packet stream's external
//! seams. Business crates depend only on this crate, never on each other's
//! internals.
//!
//! ## Ownership Model
//! - Packets cross the `PacketWriter` boundary as [`bytes::Bytes`] views:
//!   cloning shares the backing storage, dropping releases the reference
//! - A writer owns every view it is handed and releases it when done

mod error;
mod factory;
mod ids;
mod writer;

pub use error::SinkError;
pub use factory::{LocalPacketWriterFactory, PacketWriterFactory};
pub use ids::{BlockId, SessionId, WriteRequestKind, UNKNOWN_LENGTH};
pub use writer::{LocalPacketWriter, PacketWriter};
