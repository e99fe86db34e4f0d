// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MPEG audio (MP3) elementary stream extractor recognition.

use crate::errors::{is_end_of_stream, limit_error, Result};
use crate::format::FormatId;
use crate::io::SniffStream;

use super::Extractor;

/// An MPEG audio elementary stream extractor.
#[derive(Default)]
pub struct Mp3Extractor {}

impl Mp3Extractor {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Extractor for Mp3Extractor {
    fn format(&self) -> FormatId {
        FormatId::Mp3
    }

    fn sniff(&mut self, input: &mut SniffStream) -> Result<bool> {
        skip_id3v2(input)?;

        let mut header = [0u8; 4];
        input.peek_buf_exact(&mut header)?;

        Ok(is_mpeg_audio_header(u32::from_be_bytes(header)))
    }
}

/// Validates the fixed fields of a 4-byte MPEG audio frame header.
fn is_mpeg_audio_header(header: u32) -> bool {
    // Frame synchronization, 11 set bits.
    if (header >> 21) & 0x7FF != 0x7FF {
        return false;
    }
    // Version: 0b01 is reserved.
    if (header >> 19) & 0x3 == 0x1 {
        return false;
    }
    // Layer: 0b00 is reserved.
    if (header >> 17) & 0x3 == 0x0 {
        return false;
    }
    // Bitrate: 0b1111 is invalid, 0b0000 (free format) is unsupported.
    let bitrate = (header >> 12) & 0xF;
    if bitrate == 0xF || bitrate == 0x0 {
        return false;
    }
    // Sample rate: 0b11 is reserved.
    if (header >> 10) & 0x3 == 0x3 {
        return false;
    }

    true
}

/// The maximum number of ID3v2 tag bytes skipped before a probe gives up.
const ID3_SKIP_LIMIT: u64 = 32 * 1024;

/// Advances the peek position past any ID3v2 tags at the current peek position. Tags exceeding
/// the skip limit yield a limit error.
pub(crate) fn skip_id3v2(input: &mut SniffStream) -> Result<()> {
    let start = input.peek_pos();

    loop {
        let mut header = [0u8; 10];

        match input.peek_buf_exact(&mut header) {
            Ok(()) => (),
            // Too short for a tag header, nothing to skip.
            Err(ref err) if is_end_of_stream(err) => return Ok(()),
            Err(err) => return Err(err),
        }

        if &header[0..3] != b"ID3" {
            // Not a tag. Back the peek position up to where the header began.
            let pos = input.peek_pos() - 10;
            input.seek_peek(pos);
            return Ok(());
        }

        // The tag length is a 28-bit syncsafe integer, excluding the 10-byte header and the
        // optional 10-byte footer.
        let mut len: u64 = 0;
        for byte in &header[6..10] {
            len = (len << 7) | u64::from(byte & 0x7F);
        }

        if header[5] & 0x10 != 0 {
            len += 10;
        }

        if input.peek_pos() - start + len > ID3_SKIP_LIMIT {
            return limit_error("mp3: id3v2 tags exceed probe budget");
        }

        input.advance_peek(len)?;
    }
}
