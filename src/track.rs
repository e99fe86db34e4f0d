// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `track` module describes the out-of-band declaration of a track: the language, codec
//! string, sample MIME type, and side metadata attached to it by the playlist layer.

/// Information about one alternative rendition (bitrate variant) of the content a track belongs
/// to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariantInfo {
    /// The average bitrate of the variant in bits per second, or 0 if unknown.
    pub average_bitrate: u32,
    /// The peak bitrate of the variant in bits per second, or 0 if unknown.
    pub peak_bitrate: u32,
}

/// Rendition information attached to a track by the playlist layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrackInfo {
    /// The rendition group the track belongs to, if any.
    pub group_id: Option<String>,
    /// The human readable name of the rendition, if any.
    pub name: Option<String>,
    /// The variants the track is multiplexed into. Non-empty only for the primary (variant)
    /// track of a multi-rendition set.
    pub variant_infos: Vec<VariantInfo>,
}

/// One typed entry of a track's side metadata.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetadataEntry {
    /// Rendition information for the track.
    TrackInfo(TrackInfo),
    /// An opaque, privately framed entry.
    Priv {
        /// The identifier of the entry's owner.
        owner: String,
        /// The entry payload.
        data: Box<[u8]>,
    },
}

/// `TrackFormat` is the immutable out-of-band description of a track.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TrackFormat {
    /// An identifier for the track, if any.
    pub id: Option<String>,
    /// The declared language of the track, if any.
    pub language: Option<String>,
    /// The RFC 6381 codecs attribute declared for the track, if any.
    pub codecs: Option<String>,
    /// The MIME type of the track's samples, if declared.
    pub sample_mime_type: Option<String>,
    /// Side metadata attached to the track, in declaration order.
    pub metadata: Vec<MetadataEntry>,
}

impl TrackFormat {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn with_codecs(mut self, codecs: &str) -> Self {
        self.codecs = Some(codecs.to_string());
        self
    }

    pub fn with_sample_mime_type(mut self, mime_type: &str) -> Self {
        self.sample_mime_type = Some(mime_type.to_string());
        self
    }

    pub fn with_metadata_entry(mut self, entry: MetadataEntry) -> Self {
        self.metadata.push(entry);
        self
    }
}
