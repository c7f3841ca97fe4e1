//! Read loop for the stream connection.
//!
//! Owns the connection's single [`PacketFramer`], feeds it every socket read
//! and hands decoded messages to the consumer over a channel, in arrival
//! order:
//!
//! ```text
//! Socket ─► read buf ─► PacketFramer ─► MessageDispatcher ─► mpsc ─► consumer
//! ```
//!
//! Dropped packets and buffer discards are logged and counted; they never
//! end the loop. The loop ends when the peer closes, the read fails, or the
//! consumer drops its receiver.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::StreamConfig;
use crate::dispatch::{DecodedMessage, MessageDispatcher};
use crate::error::Result;
use crate::protocol::{FramerEvent, PacketFramer};

/// Counters for one connection, returned when the read loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Packets decoded and delivered.
    pub packets: u64,
    /// Packets framed but dropped by the dispatcher.
    pub dropped: u64,
    /// Buffer discards caused by bad magic.
    pub sync_losses: u64,
    /// Buffer discards caused by an oversized length.
    pub oversized: u64,
}

/// Spawn the read loop for one connection.
///
/// Returns the receiver for decoded messages and the task handle, which
/// resolves to the connection's counters.
pub fn spawn_reader_task<R>(
    reader: R,
    config: &StreamConfig,
) -> (mpsc::Receiver<DecodedMessage>, JoinHandle<Result<ReaderStats>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let config = config.clone();

    let task = tokio::spawn(async move {
        let result = read_loop(reader, tx, &config).await;
        if let Err(e) = &result {
            tracing::error!("Read loop error: {}", e);
        }
        result
    });

    (rx, task)
}

/// Read, frame and dispatch until the connection or the consumer goes away.
pub async fn read_loop<R>(
    mut reader: R,
    tx: mpsc::Sender<DecodedMessage>,
    config: &StreamConfig,
) -> Result<ReaderStats>
where
    R: AsyncRead + Unpin,
{
    let mut framer = PacketFramer::with_max_payload(config.max_payload_size);
    let mut dispatcher = MessageDispatcher::new();
    let mut stats = ReaderStats::default();
    let mut buf = vec![0u8; config.read_buffer_size.max(1)];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            if !framer.is_empty() {
                tracing::debug!(pending = framer.len(), "connection closed mid-packet");
            }
            return Ok(stats);
        }

        for event in framer.feed(&buf[..n]) {
            match event {
                FramerEvent::Packet(packet) => match dispatcher.dispatch(&packet) {
                    Ok(message) => {
                        if tx.send(message).await.is_err() {
                            tracing::debug!("message receiver dropped, stopping read loop");
                            return Ok(stats);
                        }
                        stats.packets += 1;
                    }
                    Err(_) => stats.dropped += 1,
                },
                FramerEvent::SyncLost { .. } => stats.sync_losses += 1,
                FramerEvent::OversizedPacket { .. } => stats.oversized += 1,
            }
        }
    }
}
