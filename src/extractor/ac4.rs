// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AC-4 elementary stream extractor recognition.

use crate::errors::Result;
use crate::format::FormatId;
use crate::io::SniffStream;

use super::Extractor;

/// An AC-4 elementary stream extractor.
#[derive(Default)]
pub struct Ac4Extractor {}

impl Ac4Extractor {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Extractor for Ac4Extractor {
    fn format(&self) -> FormatId {
        FormatId::Ac4
    }

    fn sniff(&mut self, input: &mut SniffStream) -> Result<bool> {
        let mut syncword = [0u8; 2];
        input.peek_buf_exact(&mut syncword)?;

        // The CRC-less and CRC-carrying sync frame variants.
        Ok(syncword == [0xAC, 0x40] || syncword == [0xAC, 0x41])
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
    fn verify_sniff() {
        let mut input = stream_over(vec![0xAC, 0x40, 0x00, 0x00]);
        assert!(Ac4Extractor::new().sniff(&mut input).unwrap());

        let mut input = stream_over(vec![0xAC, 0x41, 0x00, 0x00]);
        assert!(Ac4Extractor::new().sniff(&mut input).unwrap());

        let mut input = stream_over(vec![0xAC, 0x42, 0x00, 0x00]);
        assert!(!Ac4Extractor::new().sniff(&mut input).unwrap());
    }
}
