// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ADTS-framed AAC elementary stream extractor recognition.

use crate::errors::{is_end_of_stream, Result};
use crate::format::FormatId;
use crate::io::SniffStream;

use super::mp3::skip_id3v2;
use super::Extractor;

/// The fixed ADTS header length, excluding the optional CRC.
const ADTS_HEADER_LEN: u64 = 7;

/// An ADTS elementary stream extractor.
#[derive(Default)]
pub struct AdtsExtractor {}

impl AdtsExtractor {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Extractor for AdtsExtractor {
    fn format(&self) -> FormatId {
        FormatId::Adts
    }

    fn sniff(&mut self, input: &mut SniffStream) -> Result<bool> {
        skip_id3v2(input)?;

        let mut header = [0u8; 6];
        input.peek_buf_exact(&mut header)?;

        if !is_adts_sync(header[0], header[1]) {
            return Ok(false);
        }

        // 13-bit frame length, spanning bytes 3 to 5, includes the header itself.
        let frame_len = (u64::from(header[3] & 0x03) << 11)
            | (u64::from(header[4]) << 3)
            | (u64::from(header[5]) >> 5);

        if frame_len < ADTS_HEADER_LEN {
            return Ok(false);
        }

        // If the stream carries another frame, its syncword must be found exactly at the frame
        // boundary. A stream that ends within the first frame is still accepted since segments
        // may be truncated.
        let frame_start = input.peek_pos() - 6;
        input.seek_peek(frame_start);

        let mut next = [0u8; 2];
        match input.advance_peek(frame_len).and_then(|_| input.peek_buf_exact(&mut next)) {
            Ok(()) => Ok(is_adts_sync(next[0], next[1])),
            Err(ref err) if is_end_of_stream(err) => Ok(true),
            Err(err) => Err(err),
        }
    }
}

/// Checks the 12-bit ADTS syncword and that the MPEG layer bits are zero.
fn is_adts_sync(byte0: u8, byte1: u8) -> bool {
    byte0 == 0xFF && (byte1 & 0xF6) == 0xF0
}
