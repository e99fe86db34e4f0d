// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `factory` module selects and configures the extractor for a media segment.
//!
//! Selection merges the format hints resolved from out-of-band metadata with a fixed priority
//! order into a candidate list, then probes each candidate's extractor non-destructively against
//! the leading bytes of the segment. The first extractor that recognizes the stream wins. If none
//! do, the first candidate that was hinted at, or the transport stream candidate, is used as a
//! fallback: misdetected segments are most often transport stream payloads whose signature sniff
//! failed for a correctable reason.

use std::sync::Arc;

use log::{debug, info};
use smallvec::SmallVec;

use crate::errors::{is_end_of_stream, Error, Result};
use crate::extractor::ac3::Ac3Extractor;
use crate::extractor::ac4::Ac4Extractor;
use crate::extractor::adts::AdtsExtractor;
use crate::extractor::mp3::Mp3Extractor;
use crate::extractor::mp4::{FragmentedMp4Extractor, Mp4Flags};
use crate::extractor::ts::{TsExtractor, TsFlags, TsMode};
use crate::extractor::webvtt::WebvttExtractor;
use crate::extractor::{Extractor, SubtitleParserFactory, SubtitleTranscodingExtractor};
use crate::format::{FormatId, ResponseHeaders, DEFAULT_EXTRACTOR_ORDER};
use crate::io::SniffStream;
use crate::mime;
use crate::timestamp::TimestampAdjuster;
use crate::track::{MetadataEntry, TrackFormat};

/// An ordered, deduplicated list of candidate formats. Never longer than the fixed priority
/// order.
type FormatOrder = SmallVec<[FormatId; 8]>;

/// The selected extractor for one segment, bundled with the context the demuxing layer needs to
/// drive it.
pub struct BundledChunkExtractor {
    extractor: Box<dyn Extractor>,
    track_format: TrackFormat,
    timestamp_adjuster: Arc<TimestampAdjuster>,
    subtitle_parser_factory: Option<Arc<dyn SubtitleParserFactory>>,
}

impl BundledChunkExtractor {
    fn new(
        extractor: Box<dyn Extractor>,
        track_format: TrackFormat,
        timestamp_adjuster: Arc<TimestampAdjuster>,
        subtitle_parser_factory: Option<Arc<dyn SubtitleParserFactory>>,
    ) -> Self {
        BundledChunkExtractor {
            extractor,
            track_format,
            timestamp_adjuster,
            subtitle_parser_factory,
        }
    }

    /// The container format of the selected extractor.
    pub fn format(&self) -> FormatId {
        self.extractor.format()
    }

    pub fn extractor(&mut self) -> &mut dyn Extractor {
        self.extractor.as_mut()
    }

    /// The track descriptor the selection was made for.
    pub fn track_format(&self) -> &TrackFormat {
        &self.track_format
    }

    pub fn timestamp_adjuster(&self) -> &Arc<TimestampAdjuster> {
        &self.timestamp_adjuster
    }

    /// The subtitle transcoding capability in effect for this selection, if any.
    pub fn subtitle_parser_factory(&self) -> Option<&Arc<dyn SubtitleParserFactory>> {
        self.subtitle_parser_factory.as_ref()
    }

    /// Returns true if the selected extractor transcodes subtitle payloads during extraction.
    pub fn is_subtitle_transcoding(&self) -> bool {
        self.extractor.is_subtitle_transcoding()
    }

    /// Returns true if the selected extractor reads a packed audio elementary stream.
    pub fn is_packed_audio_extractor(&self) -> bool {
        matches!(
            self.format(),
            FormatId::Adts | FormatId::Ac3 | FormatId::Ac4 | FormatId::Mp3
        )
    }

    /// Returns true if the selected extractor may be reused for following segments of the same
    /// track.
    pub fn is_reusable(&self) -> bool {
        matches!(self.format(), FormatId::Mp4 | FormatId::Ts)
    }
}

/// `ExtractorFactory` selects a configured extractor for each media segment.
///
/// A factory may be shared between concurrent selections for different segments. The subtitle
/// transcoding capability is snapshotted at the start of each selection, so reconfiguring it
/// never produces a mixed-configuration result for an in-flight selection.
pub struct ExtractorFactory {
    ts_flags: TsFlags,
    expose_cea608_when_missing_declarations: bool,
    subtitle_parser_factory: Option<Arc<dyn SubtitleParserFactory>>,
}

impl Default for ExtractorFactory {
    fn default() -> Self {
        ExtractorFactory::new(TsFlags::empty(), true)
    }
}

impl ExtractorFactory {
    /// Creates a factory for segment extractors.
    ///
    /// `ts_flags` are added to every transport stream extractor built by this factory, on top of
    /// the flags derived per stream. If `expose_cea608_when_missing_declarations` is set,
    /// transport stream extractors expose a CEA-608 caption track when the playlist declares no
    /// caption renditions at all; the flag is ignored whenever any declaration is present.
    pub fn new(ts_flags: TsFlags, expose_cea608_when_missing_declarations: bool) -> Self {
        ExtractorFactory {
            ts_flags,
            expose_cea608_when_missing_declarations,
            subtitle_parser_factory: None,
        }
    }

    /// Sets the subtitle transcoding capability. When present, and it supports the track being
    /// selected for, subtitle-capable extractors built by this factory convert subtitle payloads
    /// to a normalized representation during extraction instead of deferring them to a later
    /// decode stage.
    pub fn with_subtitle_parser_factory(
        mut self,
        parser_factory: Arc<dyn SubtitleParserFactory>,
    ) -> Self {
        self.subtitle_parser_factory = Some(parser_factory);
        self
    }

    /// Sets or clears the subtitle transcoding capability. Takes effect for all subsequent
    /// selections.
    pub fn set_subtitle_parser_factory(
        &mut self,
        parser_factory: Option<Arc<dyn SubtitleParserFactory>>,
    ) {
        self.subtitle_parser_factory = parser_factory;
    }

    /// Selects an extractor for one segment.
    ///
    /// Format hints are resolved from the track's declared sample MIME type, the transport
    /// response headers, and the segment URI, in that priority order. Hinted formats are probed
    /// before the remaining formats of the fixed priority order. Probing peeks the stream and
    /// restores the peek position after every attempt, so the selected extractor and any later
    /// consumer observe the stream exactly as it was on entry.
    ///
    /// An unrecognized stream is not an error: the first hinted candidate, or the transport
    /// stream candidate, is returned as a fallback. Only a genuine IO failure (not end-of-data)
    /// while probing is returned as an error.
    pub fn create_extractor(
        &self,
        uri: &str,
        track_format: &TrackFormat,
        muxed_caption_formats: Option<&[TrackFormat]>,
        timestamp_adjuster: &Arc<TimestampAdjuster>,
        response_headers: &ResponseHeaders,
        input: &mut SniffStream,
    ) -> Result<BundledChunkExtractor> {
        // Snapshot the capability so a concurrent reconfiguration cannot affect this selection.
        let subtitle_parser_factory = self.subtitle_parser_factory.clone();

        let hints = [
            FormatId::from_mime_type(track_format.sample_mime_type.as_deref()),
            FormatId::from_response_headers(response_headers),
            FormatId::from_uri(uri),
        ];

        let order = build_format_order(&hints);

        debug!("candidate order for '{}': {:?}", uri, order);

        input.reset_peek_position();

        let mut fallback: Option<Box<dyn Extractor>> = None;

        for &format_id in order.iter() {
            let mut extractor = self.create_extractor_by_format(
                format_id,
                track_format,
                muxed_caption_formats,
                timestamp_adjuster,
                subtitle_parser_factory.as_ref(),
            );

            if sniff_quietly(extractor.as_mut(), input)? {
                info!("selected '{}' extractor", format_id);

                return Ok(BundledChunkExtractor::new(
                    extractor,
                    track_format.clone(),
                    timestamp_adjuster.clone(),
                    subtitle_parser_factory,
                ));
            }

            if fallback.is_none()
                && (hints.contains(&Some(format_id)) || format_id == FormatId::Ts)
            {
                fallback = Some(extractor);
            }
        }

        // The candidate list always contains the transport stream format, so a fallback was
        // noted at the latest when it was tried.
        let Some(extractor) = fallback
        else {
            unreachable!("the fixed extractor order must contain the transport stream format");
        };

        info!("no extractor recognized the stream, using '{}' fallback", extractor.format());

        Ok(BundledChunkExtractor::new(
            extractor,
            track_format.clone(),
            timestamp_adjuster.clone(),
            subtitle_parser_factory,
        ))
    }

    /// Builds a fully configured extractor for one candidate format.
    fn create_extractor_by_format(
        &self,
        format_id: FormatId,
        track_format: &TrackFormat,
        muxed_caption_formats: Option<&[TrackFormat]>,
        timestamp_adjuster: &Arc<TimestampAdjuster>,
        subtitle_parser_factory: Option<&Arc<dyn SubtitleParserFactory>>,
    ) -> Box<dyn Extractor> {
        match format_id {
            FormatId::Webvtt => {
                let base =
                    WebvttExtractor::new(track_format.language.as_deref(), timestamp_adjuster.clone());

                match subtitle_parser_factory {
                    Some(factory) if factory.supports_format(track_format) => Box::new(
                        SubtitleTranscodingExtractor::new(Box::new(base), factory.clone()),
                    ),
                    _ => Box::new(base),
                }
            }
            FormatId::Adts => Box::new(AdtsExtractor::new()),
            FormatId::Ac3 => Box::new(Ac3Extractor::new()),
            FormatId::Ac4 => Box::new(Ac4Extractor::new()),
            FormatId::Mp3 => Box::new(Mp3Extractor::new()),
            FormatId::Mp4 => {
                let base: Box<dyn Extractor> = Box::new(create_mp4_extractor(
                    track_format,
                    muxed_caption_formats,
                    timestamp_adjuster,
                ));

                match subtitle_parser_factory {
                    Some(factory) => {
                        Box::new(SubtitleTranscodingExtractor::new(base, factory.clone()))
                    }
                    None => base,
                }
            }
            FormatId::Ts => Box::new(self.create_ts_extractor(
                track_format,
                muxed_caption_formats,
                timestamp_adjuster,
            )),
        }
    }

    /// Derives the per-stream transport stream configuration.
    fn create_ts_extractor(
        &self,
        track_format: &TrackFormat,
        muxed_caption_formats: Option<&[TrackFormat]>,
        timestamp_adjuster: &Arc<TimestampAdjuster>,
    ) -> TsExtractor {
        let mut flags = self.ts_flags | TsFlags::IGNORE_SPLICE_INFO_STREAM;

        let caption_formats = match muxed_caption_formats {
            Some(formats) => {
                // The playlist declares its caption renditions, so embedded caption service
                // descriptors are ignored, even if the declared list is empty.
                flags |= TsFlags::OVERRIDE_CAPTION_DESCRIPTORS;
                formats.to_vec()
            }
            None if self.expose_cea608_when_missing_declarations => {
                // No caption information at all: preemptively declare a CEA-608 track on the
                // default channel.
                vec![TrackFormat::new().with_sample_mime_type(mime::APPLICATION_CEA608)]
            }
            None => Vec::new(),
        };

        if let Some(codecs) = track_format.codecs.as_deref().filter(|codecs| !codecs.is_empty()) {
            // Transport streams sometimes declare AAC or H.264 elementary streams that carry no
            // data. When the codecs attribute positively excludes a codec family, suppress the
            // corresponding stream type instead of trusting the declaration.
            if !mime::codecs_correspond_to_mime_type(codecs, mime::AUDIO_AAC) {
                flags |= TsFlags::IGNORE_AAC_STREAM;
            }
            if !mime::codecs_correspond_to_mime_type(codecs, mime::VIDEO_H264) {
                flags |= TsFlags::IGNORE_H264_STREAM;
            }
        }

        TsExtractor::new(TsMode::Hls, timestamp_adjuster.clone(), flags, caption_formats)
    }
}

/// Merges the resolved hints, in priority order, with the fixed extractor order into a
/// deduplicated candidate list. Hinted formats always precede their default placement.
fn build_format_order(hints: &[Option<FormatId>; 3]) -> FormatOrder {
    let mut order = FormatOrder::new();

    // Every `FormatId` is a member of the fixed order, so a resolved hint is always a valid
    // candidate.
    for hint in hints.iter().flatten() {
        if !order.contains(hint) {
            order.push(*hint);
        }
    }

    for format_id in DEFAULT_EXTRACTOR_ORDER {
        if !order.contains(&format_id) {
            order.push(format_id);
        }
    }

    order
}

/// Builds the fragmented MP4 extractor for a track.
fn create_mp4_extractor(
    track_format: &TrackFormat,
    muxed_caption_formats: Option<&[TrackFormat]>,
    timestamp_adjuster: &Arc<TimestampAdjuster>,
) -> FragmentedMp4Extractor {
    // Only the primary variant track emits a timed-metadata track, to avoid one metadata track
    // per audio rendition of a video stream.
    let flags = if is_primary_variant(track_format) {
        Mp4Flags::ENABLE_EMSG_TRACK
    }
    else {
        Mp4Flags::empty()
    };

    let caption_formats =
        muxed_caption_formats.map(|formats| formats.to_vec()).unwrap_or_default();

    FragmentedMp4Extractor::new(flags, timestamp_adjuster.clone(), caption_formats)
}

/// Runs an extractor's recognition probe with the peek position restored on every exit path. A
/// probe that runs out of data, or that hits its inspection budget, is treated as not
/// recognizing the stream.
fn sniff_quietly(extractor: &mut dyn Extractor, input: &mut SniffStream) -> Result<bool> {
    let mut guard = input.peek_guard();

    match extractor.sniff(&mut guard) {
        Err(ref err) if is_end_of_stream(err) => Ok(false),
        Err(Error::LimitError(_)) => Ok(false),
        result => result,
    }
}

/// Returns true if the track is the primary (variant) track of a multi-rendition set, judged by
/// the first rendition information entry of its side metadata.
fn is_primary_variant(track_format: &TrackFormat) -> bool {
    track_format
        .metadata
        .iter()
        .find_map(|entry| match entry {
            MetadataEntry::TrackInfo(info) => Some(!info.variant_infos.is_empty()),
            _ => None,
        })
        .unwrap_or(false)
}
