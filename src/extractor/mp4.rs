// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fragmented ISO base media file format (fMP4/CMAF) extractor configuration and recognition.

use std::sync::Arc;

use bitflags::bitflags;
use log::debug;

use crate::errors::{limit_error, Result};
use crate::format::FormatId;
use crate::io::SniffStream;
use crate::timestamp::TimestampAdjuster;
use crate::track::TrackFormat;

use super::Extractor;

/// The maximum number of bytes examined while walking top-level boxes.
const SNIFF_LIMIT: u64 = 4 * 1024;

bitflags! {
    /// Flags controlling optional outputs of the fragmented MP4 extractor.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct Mp4Flags: u32 {
        /// Emit a timed-metadata track for `emsg` boxes. Only the primary variant track of a
        /// rendition set should enable this, to avoid one metadata track per audio rendition.
        const ENABLE_EMSG_TRACK = 1 << 0;
    }
}

/// A fragmented MP4 extractor, configured for one segment.
pub struct FragmentedMp4Extractor {
    flags: Mp4Flags,
    caption_formats: Vec<TrackFormat>,
    timestamp_adjuster: Arc<TimestampAdjuster>,
}

impl FragmentedMp4Extractor {
    pub fn new(
        flags: Mp4Flags,
        timestamp_adjuster: Arc<TimestampAdjuster>,
        caption_formats: Vec<TrackFormat>,
    ) -> Self {
        FragmentedMp4Extractor { flags, caption_formats, timestamp_adjuster }
    }

    pub fn flags(&self) -> Mp4Flags {
        self.flags
    }

    pub fn caption_formats(&self) -> &[TrackFormat] {
        &self.caption_formats
    }

    pub fn timestamp_adjuster(&self) -> &Arc<TimestampAdjuster> {
        &self.timestamp_adjuster
    }
}

impl Extractor for FragmentedMp4Extractor {
    fn format(&self) -> FormatId {
        FormatId::Mp4
    }

    fn sniff(&mut self, input: &mut SniffStream) -> Result<bool> {
        // Walk the top-level box structure. The stream is a fragmented MP4 if a movie fragment
        // (`moof`) or segment type (`styp`) box appears before the walk budget runs out.
        let start = input.peek_pos();

        loop {
            if input.peek_pos() - start >= SNIFF_LIMIT {
                return limit_error("mp4: probe budget exceeded");
            }

            let mut header = [0u8; 8];
            input.peek_buf_exact(&mut header)?;

            let mut size = u64::from(u32::from_be_bytes([
                header[0], header[1], header[2], header[3],
            ]));
            let mut header_len = 8u64;

            let fourcc = [header[4], header[5], header[6], header[7]];

            if !fourcc.iter().all(|b| b.is_ascii_graphic()) {
                return Ok(false);
            }

            if size == 1 {
                // 64-bit extended size.
                let mut ext = [0u8; 8];
                input.peek_buf_exact(&mut ext)?;
                size = u64::from_be_bytes(ext);
                header_len = 16;
            }

            if size != 0 && size < header_len {
                return Ok(false);
            }

            match &fourcc {
                b"moof" | b"styp" => {
                    debug!("fragmented mp4 signature box '{}'", String::from_utf8_lossy(&fourcc));
                    return Ok(true);
                }
                b"ftyp" | b"sidx" | b"emsg" | b"prft" | b"free" | b"skip" | b"pdin" | b"uuid"
                | b"moov" | b"mdat" => {
                    // A box that extends to the end of the stream cannot be walked past.
                    if size == 0 {
                        return Ok(false);
                    }

                    // Never fetch past the walk budget: a box too large to skip within it ends
                    // the walk.
                    let payload_len = size - header_len;

                    if (input.peek_pos() - start).saturating_add(payload_len) >= SNIFF_LIMIT {
                        return limit_error("mp4: box exceeds probe budget");
                    }

                    input.advance_peek(payload_len)?;
                }
                _ => return Ok(false),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::io::SniffStream;

    use std::io::Cursor;

    fn stream_over(data: Vec<u8>) -> SniffStream {
        SniffStream::new(Box::new(Cursor::new(data)))
    }

    fn mp4_extractor() -> FragmentedMp4Extractor {
        FragmentedMp4Extractor::new(
            Mp4Flags::default(),
            Arc::new(TimestampAdjuster::new(0)),
            Vec::new(),
        )
    }

    fn push_box(data: &mut Vec<u8>, fourcc: &[u8; 4], payload_len: usize) {
        data.extend_from_slice(&(8 + payload_len as u32).to_be_bytes());
        data.extend_from_slice(fourcc);
        data.extend_from_slice(&vec![0u8; payload_len]);
    }

    #[test]
    fn verify_sniff_styp() {
        let mut data = Vec::new();
        push_box(&mut data, b"styp", 16);
        push_box(&mut data, b"moof", 64);

        let mut input = stream_over(data);
        assert!(mp4_extractor().sniff(&mut input).unwrap());
    }

    #[test]
    fn verify_sniff_moof_after_ftyp_and_sidx() {
        let mut data = Vec::new();
        push_box(&mut data, b"ftyp", 16);
        push_box(&mut data, b"sidx", 32);
        push_box(&mut data, b"moof", 64);

        let mut input = stream_over(data);
        assert!(mp4_extractor().sniff(&mut input).unwrap());
    }

    #[test]
    fn verify_sniff_rejects_progressive_layout() {
        // A progressive MP4 whose mdat extends to the end of the stream is not fragmented.
        let mut data = Vec::new();
        push_box(&mut data, b"ftyp", 16);
        push_box(&mut data, b"moov", 128);
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(b"mdat");

        let mut input = stream_over(data);
        assert!(!mp4_extractor().sniff(&mut input).unwrap());
    }

    #[test]
    fn verify_sniff_rejects_non_box_data() {
        let mut input = stream_over(vec![0x47u8; 1024]);
        assert!(!mp4_extractor().sniff(&mut input).unwrap());
    }

    #[test]
    fn verify_sniff_budget_is_bounded() {
        // An mdat claiming more bytes than the walk budget ends the probe with a limit error
        // instead of fetching the claimed bytes.
        let mut data = Vec::new();
        data.extend_from_slice(&(1024u32 * 1024).to_be_bytes());
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&[0u8; 64]);

        let mut input = stream_over(data);
        let err = mp4_extractor().sniff(&mut input).unwrap_err();
        assert!(matches!(err, Error::LimitError(_)));
    }

    #[test]
    fn verify_sniff_extended_size() {
        let mut data = Vec::new();
        // An ftyp with a 64-bit size, followed by a moof.
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(&24u64.to_be_bytes());
        data.extend_from_slice(&[0u8; 8]);
        push_box(&mut data, b"moof", 8);

        let mut input = stream_over(data);
        assert!(mp4_extractor().sniff(&mut input).unwrap());
    }
}
