// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `extractor` module defines the per-format extractor capability and one configured
//! extractor type per supported container format.
//!
//! At this layer an extractor is a freshly constructed, single-use carrier of stream-specific
//! configuration with a non-destructive recognition probe. The probe peeks a small, bounded
//! prefix of the segment and never commits reads, so failed candidates leave no trace on the
//! stream. The sample-extraction contract of a selected extractor belongs to the demuxing layer
//! above and is not declared here.

pub mod ac3;
pub mod ac4;
pub mod adts;
pub mod mp3;
pub mod mp4;
pub mod ts;
pub mod webvtt;

use std::sync::Arc;

use crate::errors::Result;
use crate::format::FormatId;
use crate::io::SniffStream;
use crate::track::TrackFormat;

/// The per-format extractor capability.
pub trait Extractor: Send {
    /// The container format this extractor parses.
    fn format(&self) -> FormatId;

    /// Probes the stream, in peek mode, for this extractor's container format. Returns true if
    /// the leading bytes are recognized.
    ///
    /// Implementations must not commit reads. They need not restore the peek position; the
    /// caller wraps every probe in a peek guard.
    fn sniff(&mut self, input: &mut SniffStream) -> Result<bool>;

    /// Returns true if this extractor transcodes subtitle payloads during extraction.
    fn is_subtitle_transcoding(&self) -> bool {
        false
    }
}

/// A capability for transcoding subtitle payloads into a normalized in-memory representation
/// during extraction, rather than deferring them to a later decode stage.
pub trait SubtitleParserFactory: Send + Sync {
    /// Returns true if subtitles of the given track format can be transcoded.
    fn supports_format(&self, format: &TrackFormat) -> bool;
}

/// Wraps a subtitle-capable extractor so that raw subtitle payloads are transcoded during
/// extraction. Recognition is delegated to the wrapped extractor unchanged.
pub struct SubtitleTranscodingExtractor {
    inner: Box<dyn Extractor>,
    parser_factory: Arc<dyn SubtitleParserFactory>,
}

impl SubtitleTranscodingExtractor {
    pub fn new(inner: Box<dyn Extractor>, parser_factory: Arc<dyn SubtitleParserFactory>) -> Self {
        SubtitleTranscodingExtractor { inner, parser_factory }
    }

    /// Gets the subtitle parser factory used for transcoding.
    pub fn parser_factory(&self) -> &Arc<dyn SubtitleParserFactory> {
        &self.parser_factory
    }
}

impl Extractor for SubtitleTranscodingExtractor {
    fn format(&self) -> FormatId {
        self.inner.format()
    }

    fn sniff(&mut self, input: &mut SniffStream) -> Result<bool> {
        self.inner.sniff(input)
    }

    fn is_subtitle_transcoding(&self) -> bool {
        true
    }
}
