//! Single contiguous buffer with one `rw_idx` cursor, serving the framed
//! codec (spec.md §3/§4.3).
//!
//! Two flavors live here: [`FrameWriteBuffer`] (plain `&mut self`
//! mutation, matching the write side's straight-line append pattern) and
//! [`FrameReadBuffer`] (a `Cell`-based cursor so primitive reads can
//! borrow `&self` and hand back zero-copy slices of the current frame —
//! see the module docs on [`crate::codec::framed`] for why this is the
//! idiomatic Rust rendition of the source's raw aliasing trick).

use std::cell::Cell;

use super::grow::{grown_capacity, shrink_target};

/// Write-side buffer: reserved 4-byte header prefix, cursor `rw_idx`
/// always `>= 4` between flushes.
pub(crate) struct FrameWriteBuffer {
    pub(crate) buf: Vec<u8>,
    pub(crate) rw_idx: usize,
}

impl FrameWriteBuffer {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            buf: vec![0u8; cap + 4],
            rw_idx: 4,
        }
    }

    /// Adopts a caller-provided region (pool-borrow form). Per spec.md
    /// §9, the adopted buffer's own capacity is authoritative; no size
    /// parameter is accepted here.
    pub(crate) fn adopt(mut buf: Vec<u8>) -> Self {
        if buf.len() < 4 {
            buf.resize(4, 0);
        }
        Self { buf, rw_idx: 4 }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Grows the backing region so `rw_idx + extra` bytes are available.
    pub(crate) fn ensure_capacity(&mut self, extra: usize) {
        let needed = self.rw_idx + extra;
        if needed <= self.buf.len() {
            return;
        }
        let new_cap = grown_capacity(self.buf.len(), extra);
        let mut new_buf = vec![0u8; new_cap];
        new_buf[..self.rw_idx].copy_from_slice(&self.buf[..self.rw_idx]);
        self.buf = new_buf;
    }

    /// Resets the cursor to just past the reserved header, shrinking the
    /// backing allocation if it exceeds the cap.
    pub(crate) fn reset(&mut self) {
        if let Some(target) = shrink_target(self.buf.len()) {
            self.buf = vec![0u8; target];
        }
        self.rw_idx = 4;
    }
}

/// Read-side buffer for the framed codec.
///
/// `rw_idx`/`frame_size` are [`Cell`]s so that primitive read operations
/// take `&self` and return slices borrowed from `buf` with a lifetime
/// tied to that shared borrow. Only [`FrameReadBuffer::ensure_exact`],
/// [`FrameReadBuffer::clear_cursor`] and [`FrameReadBuffer::reset`] need
/// `&mut self`; the borrow checker then refuses to compile a call to any
/// of these while a borrowed string/binary slice from a previous read is
/// still alive, which is exactly the "valid until the next
/// ReadFrame/Reset" lifetime spec.md §3 and §9 ask for — enforced
/// statically instead of by convention.
pub(crate) struct FrameReadBuffer {
    pub(crate) buf: Vec<u8>,
    pub(crate) rw_idx: Cell<usize>,
    pub(crate) frame_size: Cell<usize>,
}

impl FrameReadBuffer {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            buf: vec![0u8; cap],
            rw_idx: Cell::new(0),
            frame_size: Cell::new(0),
        }
    }

    pub(crate) fn adopt(buf: Vec<u8>) -> Self {
        Self {
            buf,
            rw_idx: Cell::new(0),
            frame_size: Cell::new(0),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub(crate) fn rw_idx(&self) -> usize {
        self.rw_idx.get()
    }

    #[inline]
    pub(crate) fn frame_size(&self) -> usize {
        self.frame_size.get()
    }

    #[inline]
    pub(crate) fn advance(&self, n: usize) {
        self.rw_idx.set(self.rw_idx.get() + n);
    }

    /// Ensures the backing region is at least `needed` bytes, reallocating
    /// exactly `needed` if not — the framed codec fits the buffer to the
    /// declared frame size exactly rather than growing geometrically.
    pub(crate) fn ensure_exact(&mut self, needed: usize) {
        if self.buf.len() < needed {
            self.buf.resize(needed, 0);
        }
    }

    pub(crate) fn reset(&mut self) {
        if let Some(target) = shrink_target(self.buf.len()) {
            self.buf = vec![0u8; target];
        }
        self.rw_idx.set(0);
        self.frame_size.set(0);
    }

    /// Resets the cursors to begin reading the next frame, without the
    /// shrink check `reset` performs. Used internally by
    /// [`crate::codec::framed::FramedCodec::read_frame`] between frames:
    /// per spec.md §9, `ReadMessageEnd` is a no-op on the framed codec,
    /// so shrinking only happens on an explicit full [`Self::reset`].
    pub(crate) fn clear_cursor(&mut self) {
        self.rw_idx.set(0);
        self.frame_size.set(0);
    }
}
