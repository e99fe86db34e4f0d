// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MPEG transport stream extractor configuration and recognition.

use std::sync::Arc;

use bitflags::bitflags;
use log::debug;

use crate::errors::Result;
use crate::format::FormatId;
use crate::io::SniffStream;
use crate::timestamp::TimestampAdjuster;
use crate::track::TrackFormat;

use super::Extractor;

/// The transport stream packet length in bytes.
pub const TS_PACKET_LEN: usize = 188;

/// The transport stream packet synchronization byte.
pub const TS_SYNC_BYTE: u8 = 0x47;

/// The number of consecutive synchronized packets required to recognize a transport stream.
const SNIFF_PACKET_COUNT: usize = 5;

bitflags! {
    /// Flags controlling which elementary streams of a transport stream are surfaced by the
    /// payload readers.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct TsFlags: u32 {
        /// Treat samples that are not initialized with an IDR frame as keyframes.
        const ALLOW_NON_IDR_KEYFRAMES = 1 << 0;
        /// Ignore any declared AAC elementary stream.
        const IGNORE_AAC_STREAM = 1 << 1;
        /// Ignore any declared H.264 elementary stream.
        const IGNORE_H264_STREAM = 1 << 2;
        /// Derive access unit boundaries from the bitstream instead of the PES framing.
        const DETECT_ACCESS_UNITS = 1 << 3;
        /// Ignore the SCTE-35 splice information stream.
        const IGNORE_SPLICE_INFO_STREAM = 1 << 4;
        /// Use the sideloaded caption track list instead of embedded caption service
        /// descriptors.
        const OVERRIDE_CAPTION_DESCRIPTORS = 1 << 5;
    }
}

/// The de-multiplexing profile of a transport stream extractor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TsMode {
    /// A fully multiplexed program stream.
    Multiplexed,
    /// A stream carrying a single program map table.
    SinglePmt,
    /// A segmented adaptive-streaming payload. Timestamps are continuous across segment
    /// boundaries and the stream may be truncated at any packet boundary.
    Hls,
}

/// An MPEG transport stream extractor, configured for one segment.
pub struct TsExtractor {
    mode: TsMode,
    flags: TsFlags,
    caption_formats: Vec<TrackFormat>,
    timestamp_adjuster: Arc<TimestampAdjuster>,
}

impl TsExtractor {
    pub fn new(
        mode: TsMode,
        timestamp_adjuster: Arc<TimestampAdjuster>,
        flags: TsFlags,
        caption_formats: Vec<TrackFormat>,
    ) -> Self {
        TsExtractor { mode, flags, caption_formats, timestamp_adjuster }
    }

    pub fn mode(&self) -> TsMode {
        self.mode
    }

    pub fn flags(&self) -> TsFlags {
        self.flags
    }

    /// The caption tracks the payload readers will expose.
    pub fn caption_formats(&self) -> &[TrackFormat] {
        &self.caption_formats
    }

    pub fn timestamp_adjuster(&self) -> &Arc<TimestampAdjuster> {
        &self.timestamp_adjuster
    }
}

impl Extractor for TsExtractor {
    fn format(&self) -> FormatId {
        FormatId::Ts
    }

    fn sniff(&mut self, input: &mut SniffStream) -> Result<bool> {
        // Look for a run of synchronization bytes at packet-length spacing. The run may begin
        // anywhere within the first packet length of the stream.
        let mut window = [0u8; TS_PACKET_LEN * SNIFF_PACKET_COUNT];
        input.peek_buf_exact(&mut window)?;

        for start in 0..TS_PACKET_LEN {
            let synced = (0..SNIFF_PACKET_COUNT)
                .all(|packet| window[start + packet * TS_PACKET_LEN] == TS_SYNC_BYTE);

            if synced {
                if start > 0 {
                    debug!("ts sync found at offset {}", start);
                }
                return Ok(true);
            }
        }

        Ok(false)
    }
}
