// Segsniff
// Copyright (c) 2026 The Segsniff Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `timestamp` module provides `TimestampAdjuster`, the helper that rewrites per-sample
//! timestamps into a common timeline across all extractors and segments of a playback.

use std::sync::Mutex;

use log::debug;

/// One more than the largest 33-bit MPEG presentation timestamp.
const MAX_PTS_PLUS_ONE: i64 = 1 << 33;

/// `TimestampAdjuster` offsets sample timestamps so that the first sample of a timeline maps to a
/// chosen target timestamp, and unwraps 33-bit MPEG PTS wraparound.
///
/// One adjuster is shared by reference between every extractor built for a segment, so the offset
/// established by whichever extractor parses first is seen by all of them. All methods take
/// `&self`; the internal state is mutex-guarded.
pub struct TimestampAdjuster {
    state: Mutex<State>,
}

struct State {
    /// The timestamp, in microseconds, that the first sample should be adjusted to.
    first_sample_timestamp_us: i64,
    /// The established offset, in microseconds, once the first sample has been seen.
    timestamp_offset_us: Option<i64>,
    /// The last 90 kHz timestamp passed to `adjust_pts_timestamp`, before unwrapping.
    last_unadjusted_pts: Option<i64>,
}

impl TimestampAdjuster {
    /// Creates an adjuster that maps the first seen sample timestamp to
    /// `first_sample_timestamp_us`.
    pub fn new(first_sample_timestamp_us: i64) -> Self {
        TimestampAdjuster {
            state: Mutex::new(State {
                first_sample_timestamp_us,
                timestamp_offset_us: None,
                last_unadjusted_pts: None,
            }),
        }
    }

    /// Adjusts a sample timestamp in microseconds onto the shared timeline. The first call
    /// establishes the offset.
    pub fn adjust_sample_timestamp(&self, time_us: i64) -> i64 {
        let mut state = self.state.lock().unwrap();

        let offset = match state.timestamp_offset_us {
            Some(offset) => offset,
            None => {
                let offset = state.first_sample_timestamp_us - time_us;
                debug!("established timestamp offset of {}us", offset);
                state.timestamp_offset_us = Some(offset);
                offset
            }
        };

        time_us + offset
    }

    /// Unwraps a 33-bit 90 kHz MPEG presentation timestamp and adjusts it onto the shared
    /// timeline in microseconds.
    pub fn adjust_pts_timestamp(&self, pts: i64) -> i64 {
        let unwrapped = {
            let mut state = self.state.lock().unwrap();

            let unwrapped = match state.last_unadjusted_pts {
                Some(last) => {
                    // Select the wrap count that lands closest to the previous timestamp.
                    let closest_wrap_count = (last + (MAX_PTS_PLUS_ONE / 2)) / MAX_PTS_PLUS_ONE;

                    let ahead = pts + (MAX_PTS_PLUS_ONE * closest_wrap_count);
                    let behind = pts + (MAX_PTS_PLUS_ONE * (closest_wrap_count - 1));

                    if (ahead - last).abs() < (behind - last).abs() {
                        ahead
                    }
                    else {
                        behind
                    }
                }
                None => pts,
            };

            state.last_unadjusted_pts = Some(unwrapped);
            unwrapped
        };

        self.adjust_sample_timestamp(pts_to_us(unwrapped))
    }

    /// Resets the adjuster for a new timeline that should start at
    /// `first_sample_timestamp_us`.
    pub fn reset(&self, first_sample_timestamp_us: i64) {
        let mut state = self.state.lock().unwrap();

        state.first_sample_timestamp_us = first_sample_timestamp_us;
        state.timestamp_offset_us = None;
        state.last_unadjusted_pts = None;
    }
}

/// Converts a 90 kHz clock timestamp to microseconds.
pub fn pts_to_us(pts: i64) -> i64 {
    (pts * 100) / 9
}

/// Converts a timestamp in microseconds to the 90 kHz clock.
pub fn us_to_pts(us: i64) -> i64 {
    (us * 9) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_first_sample_anchoring() {
        let adjuster = TimestampAdjuster::new(10_000_000);

        assert_eq!(adjuster.adjust_sample_timestamp(2_000_000), 10_000_000);
        assert_eq!(adjuster.adjust_sample_timestamp(2_500_000), 10_500_000);

        adjuster.reset(0);

        assert_eq!(adjuster.adjust_sample_timestamp(7_000_000), 0);
    }

    #[test]
    fn verify_pts_wraparound() {
        let adjuster = TimestampAdjuster::new(0);

        let near_wrap = MAX_PTS_PLUS_ONE - 90_000;

        assert_eq!(adjuster.adjust_pts_timestamp(near_wrap), 0);

        // One second later the 33-bit counter has wrapped to 0. The adjusted timeline must keep
        // increasing monotonically.
        let adjusted = adjuster.adjust_pts_timestamp(0);
        assert_eq!(adjusted, pts_to_us(MAX_PTS_PLUS_ONE) - pts_to_us(near_wrap));
        assert_eq!(adjusted, 1_000_000);
    }

    #[test]
    fn verify_pts_to_us() {
        assert_eq!(pts_to_us(90_000), 1_000_000);
        assert_eq!(us_to_pts(1_000_000), 90_000);
    }
}
