//! # Integration Tests
//!
//! End-to-end write-script tests over the public stream APIs.
//!
//! Covers:
//! - Construction through the factory seam
//! - Replication fidelity across a replica set
//! - Lifecycle sequences (flush auto-close, cancel, repeated close)

#[cfg(test)]
mod e2e_tests {
    use std::net::SocketAddr;

    use contracts::{BlockId, SessionId, WriteRequestKind, UNKNOWN_LENGTH};
    use packet_stream::{
        local_stream, replicated_stream, MockWriterFactory, PacketOutStream, StreamError,
    };

    fn endpoints(n: usize) -> Vec<SocketAddr> {
        (0..n)
            .map(|i| format!("10.0.0.{}:29999", i + 1).parse().unwrap())
            .collect()
    }

    fn sessions(n: usize) -> Vec<SessionId> {
        (0..n).map(|i| SessionId::new(i as u64)).collect()
    }

    /// End-to-end: factory -> replicated stream -> mixed write script.
    ///
    /// Verifies the full flow:
    /// 1. One writer is created per replica
    /// 2. Every replica sees identical packet content and boundaries
    /// 3. Flush at zero remaining closes every replica
    #[tokio::test]
    async fn test_e2e_replicated_write_script() {
        let factory = MockWriterFactory::new(16);
        let declared = 100u64;
        let mut stream = replicated_stream(
            &factory,
            &endpoints(3),
            &sessions(3),
            BlockId::new(77),
            declared,
            WriteRequestKind::Block,
        )
        .await
        .unwrap();

        // Mixed script: single bytes, sub-packet slices, multi-packet slices
        let script: Vec<u8> = (0..declared).map(|i| (i % 251) as u8).collect();
        let mut offset = 0usize;
        for chunk_len in [1, 3, 40, 16, 25, 15] {
            let chunk = &script[offset..offset + chunk_len];
            if chunk_len == 1 {
                stream.write_u8(chunk[0]).await.unwrap();
            } else {
                stream.write(chunk).await.unwrap();
            }
            offset += chunk_len;
        }
        assert_eq!(offset as u64, declared);
        assert_eq!(stream.remaining(), 0);

        stream.flush().await.unwrap();
        assert!(stream.is_closed());

        let states = factory.created();
        assert_eq!(states.len(), 3);
        let reference = states[0].packets();
        assert!(reference.iter().all(|p| p.len() <= 16));
        for state in &states {
            assert_eq!(state.received_bytes(), script);
            assert_eq!(state.packets(), reference);
            assert_eq!(state.flush_count(), 1);
            assert_eq!(state.close_count(), 1);
        }
    }

    /// Cancel mid-stream: earlier packets may be durable on the replicas,
    /// the pending buffer is dropped everywhere, and every replica is
    /// cancelled exactly once.
    #[tokio::test]
    async fn test_e2e_cancel_discards_pending_data() {
        let factory = MockWriterFactory::new(8);
        let mut stream = replicated_stream(
            &factory,
            &endpoints(2),
            &sessions(2),
            BlockId::new(5),
            64,
            WriteRequestKind::UnderlyingStorage,
        )
        .await
        .unwrap();

        stream.write(&[0xAB; 8]).await.unwrap(); // dispatched
        stream.write(&[0xCD; 3]).await.unwrap(); // pending at cancel time
        stream.cancel().await.unwrap();

        for state in factory.created() {
            assert_eq!(state.packets().len(), 1);
            assert_eq!(state.received_bytes(), vec![0xAB; 8]);
            assert_eq!(state.cancel_count(), 1);
        }

        // Terminal: a later close is a no-op on every replica
        stream.close().await.unwrap();
        for state in factory.created() {
            assert_eq!(state.close_count(), 0);
        }
    }

    /// A local bounded stream written over several flush cycles only closes
    /// once the declared length is reached.
    #[tokio::test]
    async fn test_e2e_local_stream_flush_cycles() {
        let factory = MockWriterFactory::new(4);
        let mut stream = local_stream(&factory, BlockId::new(3), 12).await.unwrap();

        for round in 0..3u8 {
            stream.write(&[round; 4]).await.unwrap();
            stream.flush().await.unwrap();
        }
        assert!(stream.is_closed());
        assert_eq!(stream.remaining(), 0);

        let state = &factory.created()[0];
        assert_eq!(state.packets().len(), 3);
        assert_eq!(state.close_count(), 1);
        // Flushes before the final one left the stream open
        assert_eq!(state.flush_count(), 3);
    }

    /// Unbounded streams never self-close and reject nothing by length.
    #[tokio::test]
    async fn test_e2e_unbounded_stream_explicit_close() {
        let factory = MockWriterFactory::new(32);
        let mut stream = local_stream(&factory, BlockId::new(8), UNKNOWN_LENGTH)
            .await
            .unwrap();

        stream.write(&vec![7u8; 100]).await.unwrap();
        stream.flush().await.unwrap();
        assert!(!stream.is_closed());

        stream.close().await.unwrap();
        let state = &factory.created()[0];
        assert_eq!(state.received_bytes().len(), 100);
        assert_eq!(state.close_count(), 1);
    }

    /// Overflow across the public surface: neither the overflowing bulk
    /// write nor a trailing byte reaches any replica.
    #[tokio::test]
    async fn test_e2e_overflow_rejected_before_replicas() {
        let factory = MockWriterFactory::new(4);
        let mut stream = replicated_stream(
            &factory,
            &endpoints(2),
            &sessions(2),
            BlockId::new(2),
            10,
            WriteRequestKind::Block,
        )
        .await
        .unwrap();

        stream.write(&[1u8; 10]).await.unwrap();
        assert!(matches!(
            stream.write(&[2u8]).await.unwrap_err(),
            StreamError::EndOfStream
        ));
        assert!(matches!(
            stream.write_u8(2).await.unwrap_err(),
            StreamError::EndOfStream
        ));

        stream.close().await.unwrap();
        for state in factory.created() {
            assert_eq!(state.received_bytes(), vec![1u8; 10]);
        }
    }

    /// The generic stream accepts any writer implementation, not only the
    /// factory-built ones.
    #[tokio::test]
    async fn test_e2e_direct_construction() {
        use packet_stream::MockPacketWriter;

        let writer = MockPacketWriter::new("direct", 4);
        let state = writer.state();
        let mut stream = PacketOutStream::new(writer, 8);
        let metrics = stream.metrics();

        stream.write(&[9u8; 8]).await.unwrap();
        stream.close().await.unwrap();

        assert_eq!(state.packets().len(), 2);
        assert_eq!(metrics.snapshot().bytes_dispatched, 8);
    }
}
