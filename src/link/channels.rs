//! Inbound chunk channel.
//!
//! Uses an `embassy-sync` bounded channel to bridge the transport's
//! delivery callback (any thread) with the single task that owns the
//! session and decodes telegrams.
//!
//! ```text
//! ┌──────────────┐  ChunkMsg   ┌──────────────────┐
//! │  Transport   │────────────▶│ TelemetrySession │
//! │  (callback)  │             │ (consumer task)  │
//! └──────────────┘             └──────────────────┘
//! ```
//!
//! Every connection attempt is tagged with a generation number.  A sink
//! from an older generation is dead: its chunks are dropped at the door,
//! so a read callback racing a disconnect never reaches the new session.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::{debug, warn};

/// Largest payload carried by one channel message.  Bigger deliveries are
/// split in order.
pub const CHUNK_CAPACITY: usize = 256;

/// Channel depth for inbound chunks.
pub const INBOUND_DEPTH: usize = 32;

/// Generation value meaning "no session".
const NO_SESSION: u32 = 0;

/// One delivery from the transport.
#[derive(Debug, Clone)]
pub struct ChunkMsg {
    /// Connection attempt this chunk belongs to.
    pub generation: u32,
    /// Bytes were dropped before this chunk; the decoder must resync.
    pub resync: bool,
    pub data: Vec<u8, CHUNK_CAPACITY>,
}

/// Shared state between the session and its delivery handles.
pub(crate) struct InboundLink {
    channel: Channel<CriticalSectionRawMutex, ChunkMsg, INBOUND_DEPTH>,
    active: AtomicU32,
    overrun: AtomicBool,
}

impl InboundLink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            channel: Channel::new(),
            active: AtomicU32::new(NO_SESSION),
            overrun: AtomicBool::new(false),
        })
    }

    /// Start accepting chunks for `generation` and hand out its sink.
    pub(crate) fn open(self: &Arc<Self>, generation: u32) -> InboundSink {
        self.active.store(generation, Ordering::Release);
        self.overrun.store(false, Ordering::Release);
        self.discard_queued();
        InboundSink {
            link: Arc::clone(self),
            generation,
        }
    }

    /// Stop accepting chunks and throw away anything queued.
    pub(crate) fn close(&self) {
        self.active.store(NO_SESSION, Ordering::Release);
        self.discard_queued();
    }

    pub(crate) fn try_receive(&self) -> Option<ChunkMsg> {
        self.channel.try_receive().ok()
    }

    pub(crate) async fn receive(&self) -> ChunkMsg {
        self.channel.receive().await
    }

    fn discard_queued(&self) {
        let mut n = 0usize;
        while self.channel.try_receive().is_ok() {
            n += 1;
        }
        if n > 0 {
            debug!("Link: discarded {} queued chunks", n);
        }
    }
}

/// Delivery handle given to the transport on `connect`.
///
/// Cheap to clone and `Send`, so a platform callback on another thread can
/// own one.
#[derive(Clone)]
pub struct InboundSink {
    link: Arc<InboundLink>,
    generation: u32,
}

impl InboundSink {
    /// Queue `bytes` for decoding.  Returns `false` when this sink belongs
    /// to a session that has since been torn down (the bytes are ignored).
    pub fn deliver(&self, bytes: &[u8]) -> bool {
        if !self.is_current() {
            debug!(
                "Link: ignoring {} bytes from stale generation {}",
                bytes.len(),
                self.generation
            );
            return false;
        }

        for piece in bytes.chunks(CHUNK_CAPACITY) {
            let Ok(data) = Vec::from_slice(piece) else {
                debug_assert!(false, "chunk of {} bytes exceeds capacity", piece.len());
                self.link.overrun.store(true, Ordering::Release);
                continue;
            };
            let msg = ChunkMsg {
                generation: self.generation,
                resync: self.link.overrun.swap(false, Ordering::AcqRel),
                data,
            };
            if self.link.channel.try_send(msg).is_err() {
                self.link.overrun.store(true, Ordering::Release);
                warn!(
                    "Link: inbound channel full, dropping {} bytes",
                    piece.len()
                );
            }
        }
        true
    }

    /// Whether the owning session is still the active one.
    pub fn is_current(&self) -> bool {
        self.link.active.load(Ordering::Acquire) == self.generation
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl core::fmt::Debug for InboundSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InboundSink")
            .field("generation", &self.generation)
            .field("current", &self.is_current())
            .finish()
    }
}
