// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `io` module provides `SniffStream`, a re-peekable view over a media segment byte source.

use std::io;
use std::ops::{Deref, DerefMut};

use crate::errors::{end_of_stream_error, Result};

/// A source of media segment bytes.
///
/// Seeking is intentionally not required: segments are delivered as forward-only transport
/// payloads. Backtracking during format detection is provided by `SniffStream`'s buffer instead.
pub trait MediaSource: io::Read + Send {}

impl<T: io::Read + Send> MediaSource for T {}

/// The number of source bytes fetched at a time.
const FETCH_LEN: usize = 4 * 1024;

/// `SniffStream` wraps a `MediaSource` and maintains two positions into it: a committed read
/// position that only moves forward, and a peek position at or ahead of it.
///
/// Peeked bytes are buffered, and the peek position may be reset back to the committed position
/// at any time, so any number of recognition probes can examine the same leading bytes of the
/// stream without consuming them. Bytes are only released from the buffer when the committed
/// position advances past them.
pub struct SniffStream {
    /// The source reader.
    inner: Box<dyn MediaSource>,
    /// Bytes fetched from the source covering stream positions `[base, base + buf.len())`.
    buf: Vec<u8>,
    /// The absolute stream position of `buf[0]`.
    base: u64,
    /// The committed read position. Invariant: `base <= pos <= peek_pos`.
    pos: u64,
    /// The peek position.
    peek_pos: u64,
}

impl SniffStream {
    pub fn new(source: Box<dyn MediaSource>) -> Self {
        SniffStream { inner: source, buf: Vec::new(), base: 0, pos: 0, peek_pos: 0 }
    }

    /// Gets the committed read position.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Gets the peek position.
    pub fn peek_pos(&self) -> u64 {
        self.peek_pos
    }

    /// Resets the peek position back to the committed read position.
    pub fn reset_peek_position(&mut self) {
        self.peek_pos = self.pos;
    }

    /// Sets the peek position to an absolute stream position. The position must be between the
    /// committed read position and the end of the fetched data.
    pub fn seek_peek(&mut self, pos: u64) {
        assert!(pos >= self.pos && pos <= self.base + self.buf.len() as u64);
        self.peek_pos = pos;
    }

    /// Fills `buf` with bytes at the peek position and advances the peek position past them.
    /// Returns an end-of-stream error if the source ends before `buf` is filled; the peek
    /// position is unchanged in that case.
    pub fn peek_buf_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.peek_pos + buf.len() as u64;

        if !self.fetch_until(end)? {
            return end_of_stream_error();
        }

        let start = (self.peek_pos - self.base) as usize;
        buf.copy_from_slice(&self.buf[start..start + buf.len()]);

        self.peek_pos = end;
        Ok(())
    }

    /// Advances the peek position by `len` bytes, fetching them to verify they exist. Returns an
    /// end-of-stream error if the source ends first; the peek position is unchanged in that case.
    pub fn advance_peek(&mut self, len: u64) -> Result<()> {
        let end = self.peek_pos + len;

        if !self.fetch_until(end)? {
            return end_of_stream_error();
        }

        self.peek_pos = end;
        Ok(())
    }

    /// Fills `buf` with bytes at the committed read position and advances it past them, releasing
    /// the consumed bytes. The peek position is moved up to the new read position if it would
    /// otherwise fall behind it.
    pub fn read_buf_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.pos + buf.len() as u64;

        if !self.fetch_until(end)? {
            return end_of_stream_error();
        }

        let start = (self.pos - self.base) as usize;
        buf.copy_from_slice(&self.buf[start..start + buf.len()]);

        self.pos = end;
        self.peek_pos = self.peek_pos.max(self.pos);

        // Release consumed bytes.
        self.buf.drain(..(self.pos - self.base) as usize);
        self.base = self.pos;

        Ok(())
    }

    /// Acquires a scoped guard that restores the current peek position when dropped, regardless
    /// of how the scope exits.
    pub fn peek_guard(&mut self) -> PeekGuard<'_> {
        let start = self.peek_pos;
        PeekGuard { stream: self, start }
    }

    /// Fetches source bytes until the buffer covers the absolute position `end`. Returns false if
    /// the source ended first.
    fn fetch_until(&mut self, end: u64) -> Result<bool> {
        while self.base + (self.buf.len() as u64) < end {
            let len = self.buf.len();
            self.buf.resize(len + FETCH_LEN, 0);

            // A failed read must not leave the preallocated bytes in the buffer, or they would
            // be served as stream data on a retry.
            let count = match self.inner.read(&mut self.buf[len..]) {
                Ok(count) => count,
                Err(err) => {
                    self.buf.truncate(len);
                    return Err(err.into());
                }
            };
            self.buf.truncate(len + count);

            if count == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// A scoped acquisition of a `SniffStream`'s peek cursor. On drop, the peek position is restored
/// to what it was when the guard was created, on every exit path.
pub struct PeekGuard<'a> {
    stream: &'a mut SniffStream,
    start: u64,
}

impl Deref for PeekGuard<'_> {
    type Target = SniffStream;

    fn deref(&self) -> &SniffStream {
        self.stream
    }
}

impl DerefMut for PeekGuard<'_> {
    fn deref_mut(&mut self) -> &mut SniffStream {
        self.stream
    }
}

impl Drop for PeekGuard<'_> {
    fn drop(&mut self) {
        // The committed position cannot move while the guard holds the stream exclusively, so
        // the saved position is always still reachable.
        self.stream.seek_peek(self.start);
    }
}
