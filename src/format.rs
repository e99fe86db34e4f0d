// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `format` module identifies container format families and resolves weak out-of-band hints
//! (MIME type, transport response headers, resource URI) into format guesses.

use std::collections::HashMap;
use std::fmt;

use crate::mime;

/// Transport response metadata: lowercase header names mapped to their ordered values.
pub type ResponseHeaders = HashMap<String, Vec<String>>;

/// `FormatId` identifies a container format family that segments may be delivered in.
///
/// An absent or unresolvable format is represented by `Option<FormatId>::None`, so every
/// `FormatId` value names a concrete, supported container family.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FormatId {
    /// Fragmented ISO base media file format (fMP4, CMAF).
    Mp4,
    /// WebVTT subtitle text.
    Webvtt,
    /// MPEG transport stream.
    Ts,
    /// AAC audio framed in ADTS.
    Adts,
    /// AC-3 or E-AC-3 elementary audio.
    Ac3,
    /// AC-4 elementary audio.
    Ac4,
    /// MPEG audio (MP3) elementary stream.
    Mp3,
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FormatId::Mp4 => write!(f, "fmp4"),
            FormatId::Webvtt => write!(f, "webvtt"),
            FormatId::Ts => write!(f, "ts"),
            FormatId::Adts => write!(f, "adts"),
            FormatId::Ac3 => write!(f, "ac3"),
            FormatId::Ac4 => write!(f, "ac4"),
            FormatId::Mp3 => write!(f, "mp3"),
        }
    }
}

/// The order in which extractors are tried when no hint takes precedence. Formats with cheap,
/// unambiguous signatures come first, audio-only elementary stream formats last.
pub const DEFAULT_EXTRACTOR_ORDER: [FormatId; 7] = [
    FormatId::Mp4,
    FormatId::Webvtt,
    FormatId::Ts,
    FormatId::Adts,
    FormatId::Ac3,
    FormatId::Ac4,
    FormatId::Mp3,
];

// The fallback policy in the extractor factory requires that a transport stream candidate is
// always attempted.
const _: () = assert!(order_contains_ts(&DEFAULT_EXTRACTOR_ORDER));

const fn order_contains_ts(order: &[FormatId]) -> bool {
    let mut i = 0;
    while i < order.len() {
        if matches!(order[i], FormatId::Ts) {
            return true;
        }
        i += 1;
    }
    false
}

impl FormatId {
    /// Infers the container format from a MIME type, ignoring any parameters. Returns `None` when
    /// the MIME type is absent or maps to no supported format.
    pub fn from_mime_type(mime_type: Option<&str>) -> Option<FormatId> {
        let mime_type = mime_type?.split(';').next()?.trim().to_ascii_lowercase();

        match mime_type.as_str() {
            "audio/ac3" | "audio/eac3" => Some(FormatId::Ac3),
            "audio/ac4" => Some(FormatId::Ac4),
            "audio/aac" => Some(FormatId::Adts),
            "audio/mpeg" | "audio/mpeg-l1" | "audio/mpeg-l2" | "audio/mp3" => Some(FormatId::Mp3),
            m if m == mime::AUDIO_MP4 || m == mime::VIDEO_MP4 || m == mime::APPLICATION_MP4 => {
                Some(FormatId::Mp4)
            }
            m if m == mime::VIDEO_MP2T => Some(FormatId::Ts),
            m if m == mime::TEXT_VTT => Some(FormatId::Webvtt),
            _ => None,
        }
    }

    /// Infers the container format from the transport response headers, using the first
    /// `content-type` value.
    pub fn from_response_headers(headers: &ResponseHeaders) -> Option<FormatId> {
        let content_type = headers.get("content-type").and_then(|values| values.first());

        FormatId::from_mime_type(content_type.map(|value| value.as_str()))
    }

    /// Infers the container format from the file-name suffix of a resource URI's last path
    /// segment. The query string and fragment, if any, are ignored.
    pub fn from_uri(uri: &str) -> Option<FormatId> {
        let path = uri.split(['?', '#']).next()?;
        let segment = path.rsplit('/').next()?.to_ascii_lowercase();
        let segment = segment.as_str();

        if segment.ends_with(".ac3") || segment.ends_with(".ec3") {
            Some(FormatId::Ac3)
        }
        else if segment.ends_with(".ac4") {
            Some(FormatId::Ac4)
        }
        else if segment.ends_with(".adts") || segment.ends_with(".aac") {
            Some(FormatId::Adts)
        }
        else if segment.ends_with(".mp3") {
            Some(FormatId::Mp3)
        }
        else if segment.ends_with(".vtt") || segment.ends_with(".webvtt") {
            Some(FormatId::Webvtt)
        }
        else if has_extension_prefix(segment, ".mp4")
            || has_extension_prefix(segment, ".m4")
            || has_extension_prefix(segment, ".cmf")
        {
            // Covers .mp4, .mp4a, .mp4v, .m4s, .m4a, .m4v, and CMAF's .cmfv/.cmfa/.cmft.
            Some(FormatId::Mp4)
        }
        else if has_extension_prefix(segment, ".ts") {
            Some(FormatId::Ts)
        }
        else {
            None
        }
    }
}

/// Returns true if the file name's extension equals `prefix` or starts with it (e.g. `.m4` also
/// matches `.m4s`).
fn has_extension_prefix(file_name: &str, prefix: &str) -> bool {
    match file_name.rfind('.') {
        Some(idx) => file_name[idx..].starts_with(prefix),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_from_mime_type() {
        assert_eq!(FormatId::from_mime_type(Some("video/mp2t")), Some(FormatId::Ts));
        assert_eq!(FormatId::from_mime_type(Some("Video/MP2T")), Some(FormatId::Ts));
        assert_eq!(FormatId::from_mime_type(Some("video/mp4")), Some(FormatId::Mp4));
        assert_eq!(FormatId::from_mime_type(Some("audio/mp4")), Some(FormatId::Mp4));
        assert_eq!(FormatId::from_mime_type(Some("application/mp4")), Some(FormatId::Mp4));
        assert_eq!(FormatId::from_mime_type(Some("text/vtt; charset=utf-8")), Some(FormatId::Webvtt));
        assert_eq!(FormatId::from_mime_type(Some("audio/aac")), Some(FormatId::Adts));
        assert_eq!(FormatId::from_mime_type(Some("audio/eac3")), Some(FormatId::Ac3));
        assert_eq!(FormatId::from_mime_type(Some("audio/ac4")), Some(FormatId::Ac4));
        assert_eq!(FormatId::from_mime_type(Some("audio/mpeg")), Some(FormatId::Mp3));
        assert_eq!(FormatId::from_mime_type(Some("application/octet-stream")), None);
        assert_eq!(FormatId::from_mime_type(None), None);
    }

    #[test]
    fn verify_from_response_headers() {
        let mut headers = ResponseHeaders::new();
        assert_eq!(FormatId::from_response_headers(&headers), None);

        headers.insert(
            "content-type".to_string(),
            vec!["video/mp2t".to_string(), "audio/mpeg".to_string()],
        );

        // Only the first value is considered.
        assert_eq!(FormatId::from_response_headers(&headers), Some(FormatId::Ts));
    }

    #[test]
    fn verify_from_uri() {
        assert_eq!(FormatId::from_uri("https://cdn.example.com/seg/0001.ts"), Some(FormatId::Ts));
        assert_eq!(FormatId::from_uri("https://cdn.example.com/seg/0001.TS"), Some(FormatId::Ts));
        assert_eq!(FormatId::from_uri("http://x/y/init.mp4?token=abc"), Some(FormatId::Mp4));
        assert_eq!(FormatId::from_uri("http://x/y/seg-3.m4s"), Some(FormatId::Mp4));
        assert_eq!(FormatId::from_uri("http://x/y/seg-3.cmfv"), Some(FormatId::Mp4));
        assert_eq!(FormatId::from_uri("http://x/y/subs_en.vtt"), Some(FormatId::Webvtt));
        assert_eq!(FormatId::from_uri("http://x/y/a.webvtt#t=1"), Some(FormatId::Webvtt));
        assert_eq!(FormatId::from_uri("http://x/y/a.aac"), Some(FormatId::Adts));
        assert_eq!(FormatId::from_uri("http://x/y/a.ec3"), Some(FormatId::Ac3));
        assert_eq!(FormatId::from_uri("http://x/y/a.ac4"), Some(FormatId::Ac4));
        assert_eq!(FormatId::from_uri("http://x/y/a.mp3"), Some(FormatId::Mp3));
        assert_eq!(FormatId::from_uri("http://x/y/playlist.m3u8"), None);
        assert_eq!(FormatId::from_uri("http://x/y/no_extension"), None);
        // The extension must belong to the last path segment, not an earlier one.
        assert_eq!(FormatId::from_uri("http://x/a.ts/manifest"), None);
    }
}
