// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AC-3 and E-AC-3 elementary stream extractor recognition.

use crate::errors::Result;
use crate::format::FormatId;
use crate::io::SniffStream;

use super::Extractor;

/// The AC-3 syncframe syncword.
const AC3_SYNCWORD: [u8; 2] = [0x0B, 0x77];

/// The largest bitstream identifier defined by AC-3 (8) and E-AC-3 (16).
const MAX_BSID: u8 = 16;

/// An AC-3/E-AC-3 elementary stream extractor.
#[derive(Default)]
pub struct Ac3Extractor {}

impl Ac3Extractor {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Extractor for Ac3Extractor {
    fn format(&self) -> FormatId {
        FormatId::Ac3
    }

    fn sniff(&mut self, input: &mut SniffStream) -> Result<bool> {
        let mut header = [0u8; 6];
        input.peek_buf_exact(&mut header)?;

        if header[0..2] != AC3_SYNCWORD {
            return Ok(false);
        }

        // The bitstream identifier occupies the top 5 bits of the sixth header byte.
        Ok(header[5] >> 3 <= MAX_BSID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SniffStream;

    use std::io::Cursor;

    fn stream_over(data: Vec<u8>) -> SniffStream {
        SniffStream::new(Box::new(Cursor::new(data)))
    }

    #[test]
    fn verify_sniff_ac3() {
        // bsid 8 (AC-3).
        let mut input = stream_over(vec![0x0B, 0x77, 0x00, 0x00, 0x00, 8 << 3]);
        assert!(Ac3Extractor::new().sniff(&mut input).unwrap());
    }

    #[test]
    fn verify_sniff_eac3() {
        // bsid 16 (E-AC-3).
        let mut input = stream_over(vec![0x0B, 0x77, 0x00, 0x00, 0x00, 16 << 3]);
        assert!(Ac3Extractor::new().sniff(&mut input).unwrap());
    }

    #[test]
    fn verify_sniff_rejects() {
        // No syncword.
        let mut input = stream_over(vec![0x0B, 0x78, 0x00, 0x00, 0x00, 0x00]);
        assert!(!Ac3Extractor::new().sniff(&mut input).unwrap());

        // Reserved bsid.
        let mut input = stream_over(vec![0x0B, 0x77, 0x00, 0x00, 0x00, 17 << 3]);
        assert!(!Ac3Extractor::new().sniff(&mut input).unwrap());
    }
}
