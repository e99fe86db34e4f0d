// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WebVTT subtitle text extractor configuration and recognition.

use std::sync::Arc;

use crate::errors::Result;
use crate::format::FormatId;
use crate::io::SniffStream;
use crate::timestamp::TimestampAdjuster;

use super::Extractor;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A WebVTT subtitle extractor, configured for one segment.
pub struct WebvttExtractor {
    language: Option<String>,
    timestamp_adjuster: Arc<TimestampAdjuster>,
}

impl WebvttExtractor {
    pub fn new(language: Option<&str>, timestamp_adjuster: Arc<TimestampAdjuster>) -> Self {
        WebvttExtractor { language: language.map(|l| l.to_string()), timestamp_adjuster }
    }

    /// The declared language of the subtitle track, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn timestamp_adjuster(&self) -> &Arc<TimestampAdjuster> {
        &self.timestamp_adjuster
    }
}

impl Extractor for WebvttExtractor {
    fn format(&self) -> FormatId {
        FormatId::Webvtt
    }

    fn sniff(&mut self, input: &mut SniffStream) -> Result<bool> {
        let mut magic = [0u8; 6];
        input.peek_buf_exact(&mut magic)?;

        if magic[0..3] == UTF8_BOM {
            let mut rest = [0u8; 3];
            input.peek_buf_exact(&mut rest)?;
            Ok(&magic[3..6] == b"WEB" && &rest == b"VTT")
        }
        else {
            Ok(&magic == b"WEBVTT")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SniffStream;

    use std::io::Cursor;

    fn stream_over(data: &[u8]) -> SniffStream {
        SniffStream::new(Box::new(Cursor::new(data.to_vec())))
    }

    fn webvtt_extractor() -> WebvttExtractor {
        WebvttExtractor::new(Some("en"), Arc::new(TimestampAdjuster::new(0)))
    }

    #[test]
    fn verify_sniff() {
        let mut input = stream_over(b"WEBVTT\n\n00:00.000 --> 00:01.000\nhi\n");
        assert!(webvtt_extractor().sniff(&mut input).unwrap());
    }

    #[test]
    fn verify_sniff_with_bom() {
        let mut input = stream_over(b"\xEF\xBB\xBFWEBVTT\n");
        assert!(webvtt_extractor().sniff(&mut input).unwrap());
    }

    #[test]
    fn verify_sniff_rejects() {
        let mut input = stream_over(b"NOTVTT\n\n");
        assert!(!webvtt_extractor().sniff(&mut input).unwrap());
    }
}
