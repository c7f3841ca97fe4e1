//! Dedicated writer task for the stream connection.
//!
//! Producers (acquisition loop, classifier, state changes) encode packets and
//! hand them to one task that owns the write half of the socket:
//!
//! ```text
//! Sampler    ─┐
//! Classifier ─┼─► mpsc::Sender<Bytes> ─► Writer Task ─► Socket
//! State      ─┘
//! ```
//!
//! Packets leave in the order they were queued. Ready packets are batched
//! into one vectored write.

use std::io::IoSlice;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::codec::{encode_model_output, encode_state, encode_three_axis};
use crate::config::StreamConfig;
use crate::dispatch::DecodedMessage;
use crate::error::{Result, WireError};

/// Maximum packets to batch in a single write operation.
const MAX_BATCH_SIZE: usize = 32;

/// Handle for queueing packets on the writer task.
///
/// Cheaply cloneable; every clone feeds the same ordered queue.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Bytes>,
}

impl WriterHandle {
    /// Queue an already encoded packet, waiting for room.
    pub async fn send_packet(&self, packet: Bytes) -> Result<()> {
        self.tx
            .send(packet)
            .await
            .map_err(|_| WireError::ConnectionClosed)
    }

    /// Queue a packet without waiting.
    ///
    /// Returns `Err(Backpressure)` immediately if the queue is full.
    pub fn try_send_packet(&self, packet: Bytes) -> Result<()> {
        self.tx.try_send(packet).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => WireError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => WireError::ConnectionClosed,
        })
    }

    /// Encode and queue a ThreeAxis packet.
    pub async fn send_three_axis(&self, x: &[f64], y: &[f64], z: &[f64]) -> Result<()> {
        self.send_packet(encode_three_axis(x, y, z)?).await
    }

    /// Encode and queue a ModelOutput packet.
    pub async fn send_model_output(&self, class_name: &str, confidence: f64) -> Result<()> {
        self.send_packet(encode_model_output(class_name, confidence)?)
            .await
    }

    /// Encode and queue a State packet.
    pub async fn send_state(&self, text: &str) -> Result<()> {
        self.send_packet(encode_state(text)?).await
    }

    /// Encode and queue any decoded message.
    pub async fn send_message(&self, message: &DecodedMessage) -> Result<()> {
        self.send_packet(message.encode()?).await
    }

    /// True once the writer task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawn the writer task and return a handle for queueing packets.
///
/// The task ends cleanly once every handle is dropped, or with the first
/// write error. Nothing is retried after an error.
pub fn spawn_writer_task<W>(
    writer: W,
    config: &StreamConfig,
) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let task = tokio::spawn(async move {
        let result = writer_loop(rx, writer).await;
        if let Err(e) = &result {
            tracing::error!("Writer task error: {}", e);
        }
        result
    });

    (WriterHandle { tx }, task)
}

/// Receive packets and write them in order until the channel closes.
async fn writer_loop<W>(mut rx: mpsc::Receiver<Bytes>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(first) = rx.recv().await {
        let mut batch = Vec::with_capacity(MAX_BATCH_SIZE);
        batch.push(first);

        while batch.len() < MAX_BATCH_SIZE {
            match rx.try_recv() {
                Ok(packet) => batch.push(packet),
                Err(_) => break,
            }
        }

        write_batch(&mut writer, &batch).await?;
        tracing::debug!(packets = batch.len(), "batch written");
    }

    writer.shutdown().await?;
    Ok(())
}

/// Write a batch of packets using vectored I/O.
///
/// Partial writes continue from where the transport stopped. A write that
/// accepts zero bytes surfaces as `IncompleteWrite`.
async fn write_batch<W>(writer: &mut W, batch: &[Bytes]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let expected: usize = batch.iter().map(Bytes::len).sum();
    let mut total_written = 0;

    while total_written < expected {
        let slices = remaining_slices(batch, total_written);
        let written = writer.write_vectored(&slices).await?;
        if written == 0 {
            return Err(WireError::IncompleteWrite {
                written: total_written,
                expected,
            });
        }
        total_written += written;
    }

    writer.flush().await?;
    Ok(())
}

/// IoSlices covering everything after the first `skip` bytes of the batch.
fn remaining_slices(batch: &[Bytes], mut skip: usize) -> Vec<IoSlice<'_>> {
    let mut slices = Vec::with_capacity(batch.len());

    for packet in batch {
        if skip >= packet.len() {
            skip -= packet.len();
            continue;
        }
        slices.push(IoSlice::new(&packet[skip..]));
        skip = 0;
    }

    slices
}
