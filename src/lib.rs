// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segsniff selects a container-format extractor for a single HLS-style media segment.
//!
//! A segment's container format is only weakly implied by out-of-band information: the declared
//! codec string of the track, the transport response headers, and the segment URI. Segsniff
//! resolves those hints into an ordered list of candidate formats, probes each candidate's
//! extractor non-destructively against a re-peekable view of the segment bytes, and returns the
//! first extractor that recognizes the stream (or an informed fallback if none do), already
//! configured with stream-specific options such as caption injection and subtitle transcoding.
//!
//! The entry point is [`factory::ExtractorFactory::create_extractor`].

pub mod errors;
pub mod extractor;
pub mod factory;
pub mod format;
pub mod io;
pub mod mime;
pub mod timestamp;
pub mod track;
