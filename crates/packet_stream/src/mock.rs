//! Mock packet writer for tests and offline development
//!
//! Records every packet and lifecycle call through a shared state handle so
//! tests can assert on a writer after the stream has consumed it.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;

use contracts::{
    BlockId, PacketWriter, PacketWriterFactory, SessionId, SinkError, WriteRequestKind,
};

/// One observed writer call, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// A packet of the given length was accepted
    Packet(usize),
    Flush,
    Cancel,
    Close,
}

/// Shared view of everything a mock writer has received
#[derive(Debug, Default)]
pub struct MockWriterState {
    packets: Mutex<Vec<Bytes>>,
    events: Mutex<Vec<MockEvent>>,
    pos: AtomicU64,
    flush_count: AtomicU64,
    cancel_count: AtomicU64,
    close_count: AtomicU64,
}

impl MockWriterState {
    /// Accepted packets, in dispatch order
    pub fn packets(&self) -> Vec<Bytes> {
        lock(&self.packets).clone()
    }

    /// Accepted packets concatenated in dispatch order
    pub fn received_bytes(&self) -> Vec<u8> {
        lock(&self.packets)
            .iter()
            .flat_map(|p| p.iter().copied())
            .collect()
    }

    /// Every call observed by the writer, in order
    pub fn events(&self) -> Vec<MockEvent> {
        lock(&self.events).clone()
    }

    /// Bytes accepted so far
    pub fn pos(&self) -> u64 {
        self.pos.load(Ordering::Relaxed)
    }

    /// Number of flush calls
    pub fn flush_count(&self) -> u64 {
        self.flush_count.load(Ordering::Relaxed)
    }

    /// Number of cancel calls
    pub fn cancel_count(&self) -> u64 {
        self.cancel_count.load(Ordering::Relaxed)
    }

    /// Number of close calls
    pub fn close_count(&self) -> u64 {
        self.close_count.load(Ordering::Relaxed)
    }

    fn record_event(&self, event: MockEvent) {
        lock(&self.events).push(event);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// In-memory [`PacketWriter`] recording every call.
///
/// Failure modes are scriptable builder-style, mirroring how sinks misbehave
/// in practice: a write failing mid-stream, a close failing at shutdown.
#[derive(Debug)]
pub struct MockPacketWriter {
    name: String,
    packet_size: usize,
    state: Arc<MockWriterState>,
    fail_write: bool,
    fail_cancel: bool,
    fail_close: bool,
    frozen_pos: bool,
}

impl MockPacketWriter {
    /// Create a writer with the given packet size
    pub fn new(name: impl Into<String>, packet_size: usize) -> Self {
        Self {
            name: name.into(),
            packet_size,
            state: Arc::new(MockWriterState::default()),
            fail_write: false,
            fail_cancel: false,
            fail_close: false,
            frozen_pos: false,
        }
    }

    /// Handle to the shared state, valid after the writer is consumed
    pub fn state(&self) -> Arc<MockWriterState> {
        Arc::clone(&self.state)
    }

    /// Fail every write_packet call
    pub fn fail_on_write(mut self) -> Self {
        self.fail_write = true;
        self
    }

    /// Fail the cancel call
    pub fn fail_on_cancel(mut self) -> Self {
        self.fail_cancel = true;
        self
    }

    /// Fail the close call
    pub fn fail_on_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Keep `pos()` at zero, simulating a replica that accepts packets but
    /// never acknowledges durability
    pub fn with_frozen_pos(mut self) -> Self {
        self.frozen_pos = true;
        self
    }
}

impl PacketWriter for MockPacketWriter {
    fn pos(&self) -> u64 {
        if self.frozen_pos {
            0
        } else {
            self.state.pos()
        }
    }

    fn packet_size(&self) -> usize {
        self.packet_size
    }

    async fn write_packet(&mut self, packet: Bytes) -> Result<(), SinkError> {
        if self.fail_write {
            return Err(SinkError::write(&self.name, "mock write failure"));
        }
        self.state.record_event(MockEvent::Packet(packet.len()));
        self.state
            .pos
            .fetch_add(packet.len() as u64, Ordering::Relaxed);
        lock(&self.state.packets).push(packet);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.state.record_event(MockEvent::Flush);
        self.state.flush_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn cancel(&mut self) -> Result<(), SinkError> {
        self.state.record_event(MockEvent::Cancel);
        self.state.cancel_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_cancel {
            return Err(SinkError::write(&self.name, "mock cancel failure"));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.state.record_event(MockEvent::Close);
        self.state.close_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_close {
            return Err(SinkError::write(&self.name, "mock close failure"));
        }
        Ok(())
    }
}

/// Factory producing mock writers and retaining a state handle per writer
#[derive(Debug, Default)]
pub struct MockWriterFactory {
    packet_size: usize,
    created: Mutex<Vec<Arc<MockWriterState>>>,
}

impl MockWriterFactory {
    /// Create a factory whose writers use the given packet size
    pub fn new(packet_size: usize) -> Self {
        Self {
            packet_size,
            created: Mutex::new(Vec::new()),
        }
    }

    /// State handles of every writer created so far, in creation order
    pub fn created(&self) -> Vec<Arc<MockWriterState>> {
        lock(&self.created).clone()
    }

    fn register(&self, writer: MockPacketWriter) -> MockPacketWriter {
        lock(&self.created).push(writer.state());
        writer
    }
}

impl PacketWriterFactory for MockWriterFactory {
    type Writer = MockPacketWriter;

    async fn local_writer(&self, block_id: BlockId) -> Result<MockPacketWriter, SinkError> {
        Ok(self.register(MockPacketWriter::new(
            format!("local-{block_id}"),
            self.packet_size,
        )))
    }

    async fn remote_writer(
        &self,
        endpoint: SocketAddr,
        session_id: SessionId,
        block_id: BlockId,
        _length: u64,
        _kind: WriteRequestKind,
    ) -> Result<MockPacketWriter, SinkError> {
        Ok(self.register(MockPacketWriter::new(
            format!("{endpoint}/{session_id}/{block_id}"),
            self.packet_size,
        )))
    }
}
