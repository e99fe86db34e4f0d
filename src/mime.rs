// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `mime` module defines well-known media MIME types and maps RFC 6381 codec strings onto
//! them.

pub const AUDIO_AAC: &str = "audio/mp4a-latm";
pub const AUDIO_AC3: &str = "audio/ac3";
pub const AUDIO_E_AC3: &str = "audio/eac3";
pub const AUDIO_AC4: &str = "audio/ac4";
pub const AUDIO_MPEG: &str = "audio/mpeg";
pub const AUDIO_MP4: &str = "audio/mp4";
pub const AUDIO_OPUS: &str = "audio/opus";

pub const VIDEO_H264: &str = "video/avc";
pub const VIDEO_H265: &str = "video/hevc";
pub const VIDEO_MP4: &str = "video/mp4";
pub const VIDEO_MP2T: &str = "video/mp2t";

pub const APPLICATION_MP4: &str = "application/mp4";
pub const APPLICATION_CEA608: &str = "application/cea-608";
pub const APPLICATION_TTML: &str = "application/ttml+xml";

pub const TEXT_VTT: &str = "text/vtt";

/// Maps a single RFC 6381 codec string (e.g. `avc1.64001f` or `mp4a.40.2`) to the MIME type of
/// the media it encodes. Returns `None` for unrecognized or empty codec strings.
pub fn media_mime_type_from_codec(codec: &str) -> Option<&'static str> {
    let codec = codec.trim();

    if codec.is_empty() {
        return None;
    }

    let base = codec.split('.').next()?;

    match base.to_ascii_lowercase().as_str() {
        "avc1" | "avc3" => Some(VIDEO_H264),
        "hev1" | "hvc1" => Some(VIDEO_H265),
        "ac-3" | "dac3" => Some(AUDIO_AC3),
        "ec-3" | "dec3" => Some(AUDIO_E_AC3),
        "ac-4" | "dac4" => Some(AUDIO_AC4),
        "opus" | "dops" => Some(AUDIO_OPUS),
        "wvtt" => Some(TEXT_VTT),
        "stpp" => Some(APPLICATION_TTML),
        "mp4a" => {
            // The object type indication selects the actual audio codec carried in an MP4 audio
            // sample entry. No indication, or the AAC family (0x40), is AAC.
            match codec.to_ascii_lowercase().as_str() {
                "mp4a.a5" => Some(AUDIO_AC3),
                "mp4a.a6" => Some(AUDIO_E_AC3),
                "mp4a.69" | "mp4a.6b" => Some(AUDIO_MPEG),
                _ => Some(AUDIO_AAC),
            }
        }
        _ => None,
    }
}

/// Returns true if any codec in the comma-separated `codecs` attribute encodes media of the given
/// MIME type.
pub fn codecs_correspond_to_mime_type(codecs: &str, mime_type: &str) -> bool {
    codecs.split(',').any(|codec| {
        media_mime_type_from_codec(codec)
            .map(|mime| mime.eq_ignore_ascii_case(mime_type))
            .unwrap_or(false)
    })
}
