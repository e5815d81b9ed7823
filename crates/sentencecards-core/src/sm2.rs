// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The SM-2 variant used to schedule cards.
//!
//! Failures (`Again`, `Hard`) reset the streak and shorten the interval.
//! Successes (`Good`, `Excellent`) walk two fixed bootstrap steps and then
//! grow the interval multiplicatively by the ease factor.

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::InvalidQuality;
use crate::types::timestamp::Timestamp;

pub const DEFAULT_INTERVAL: f64 = 0.0;
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const DEFAULT_REPETITIONS: u32 = 0;

pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 3.0;

pub const MIN_INTERVAL_DAYS: f64 = 1.0;
pub const MAX_INTERVAL_DAYS: f64 = 365.0;

/// How soon a card graded `Again` comes back.
pub const IMMEDIATE_REVIEW_MINUTES: i64 = 10;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Quality {
    /// Failed completely.
    Again,
    /// Failed, but only just.
    Hard,
    /// Recalled.
    Good,
    /// Recalled effortlessly.
    Excellent,
}

impl Quality {
    pub fn as_i64(self) -> i64 {
        match self {
            Quality::Again => 0,
            Quality::Hard => 1,
            Quality::Good => 2,
            Quality::Excellent => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::Again => "Again",
            Quality::Hard => "Hard",
            Quality::Good => "Good",
            Quality::Excellent => "Excellent",
        }
    }

    /// Whether the review counts as a correct answer.
    pub fn is_correct(self) -> bool {
        matches!(self, Quality::Good | Quality::Excellent)
    }
}

impl TryFrom<i64> for Quality {
    type Error = InvalidQuality;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Quality::Again),
            1 => Ok(Quality::Hard),
            2 => Ok(Quality::Good),
            3 => Ok(Quality::Excellent),
            _ => Err(InvalidQuality(value)),
        }
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Quality {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.as_i64())
    }
}

impl<'de> Deserialize<'de> for Quality {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Quality::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// The part of a card the scheduler reads and writes.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    /// Days until the next review. Zero only right after an `Again`.
    pub interval: f64,
    pub ease_factor: f64,
    /// Consecutive successful reviews since the last failure.
    pub repetitions: u32,
    pub next_review_at: Timestamp,
}

impl SchedulingState {
    /// The state of a card that has never been reviewed.
    pub fn initial(now: Timestamp) -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            ease_factor: DEFAULT_EASE_FACTOR,
            repetitions: DEFAULT_REPETITIONS,
            next_review_at: now,
        }
    }
}

/// Validate a raw quality rating, then schedule.
pub fn next_state(
    state: &SchedulingState,
    quality: i64,
    now: Timestamp,
) -> Result<SchedulingState, InvalidQuality> {
    let quality = Quality::try_from(quality)?;
    Ok(schedule(state, quality, now))
}

/// Compute a card's next scheduling state after a review at `now`.
pub fn schedule(state: &SchedulingState, quality: Quality, now: Timestamp) -> SchedulingState {
    let SchedulingState {
        interval,
        ease_factor,
        repetitions,
        ..
    } = *state;
    let (interval, ease_factor, repetitions, next_review_at) = match quality {
        Quality::Again => (
            0.0,
            (ease_factor - 0.20).max(MIN_EASE_FACTOR),
            0,
            now.plus_minutes(IMMEDIATE_REVIEW_MINUTES),
        ),
        Quality::Hard => (
            1.0,
            (ease_factor - 0.15).max(MIN_EASE_FACTOR),
            0,
            now.plus_days(1.0),
        ),
        Quality::Good => {
            let interval = grow(interval, ease_factor, repetitions, (1.0, 3.0));
            (
                interval,
                ease_factor + 0.05,
                repetitions.saturating_add(1),
                now.plus_days(interval),
            )
        }
        Quality::Excellent => {
            let interval = grow(interval, ease_factor, repetitions, (3.0, 7.0));
            (
                interval,
                ease_factor + 0.15,
                repetitions.saturating_add(1),
                now.plus_days(interval),
            )
        }
    };
    SchedulingState {
        interval,
        ease_factor: ease_factor.clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR),
        repetitions,
        next_review_at,
    }
}

/// The interval after a successful review. The multiplicative formula is
/// unstable while the interval is still 0 or 1, so the first two successes
/// use fixed steps.
fn grow(interval: f64, ease_factor: f64, repetitions: u32, bootstrap: (f64, f64)) -> f64 {
    let raw = match repetitions {
        0 => bootstrap.0,
        1 => bootstrap.1,
        _ => (interval * ease_factor).round(),
    };
    raw.clamp(MIN_INTERVAL_DAYS, MAX_INTERVAL_DAYS)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
    }

    fn state(interval: f64, ease_factor: f64, repetitions: u32) -> SchedulingState {
        SchedulingState {
            interval,
            ease_factor,
            repetitions,
            next_review_at: now(),
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_new_card_excellent() {
        let next = schedule(&state(0.0, 2.5, 0), Quality::Excellent, now());
        assert_eq!(next.interval, 3.0);
        assert_close(next.ease_factor, 2.65);
        assert_eq!(next.repetitions, 1);
        assert_eq!(next.next_review_at, now().plus_days(3.0));
    }

    #[test]
    fn test_second_excellent() {
        let next = schedule(&state(3.0, 2.65, 1), Quality::Excellent, now());
        assert_eq!(next.interval, 7.0);
        assert_close(next.ease_factor, 2.80);
        assert_eq!(next.repetitions, 2);
    }

    #[test]
    fn test_steady_state_good() {
        let next = schedule(&state(7.0, 2.80, 2), Quality::Good, now());
        assert_eq!(next.interval, 20.0);
        assert_close(next.ease_factor, 2.85);
        assert_eq!(next.repetitions, 3);
        assert_eq!(next.next_review_at, now().plus_days(20.0));
    }

    #[test]
    fn test_again_resets_streak() {
        let next = schedule(&state(15.0, 2.9, 5), Quality::Again, now());
        assert_eq!(next.interval, 0.0);
        assert_close(next.ease_factor, 2.70);
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.next_review_at, now().plus_minutes(10));
    }

    #[test]
    fn test_again_on_long_streak() {
        let next = schedule(&state(120.0, 2.5, 10), Quality::Again, now());
        assert_eq!(next.repetitions, 0);
    }

    #[test]
    fn test_hard() {
        let next = schedule(&state(15.0, 2.5, 4), Quality::Hard, now());
        assert_eq!(next.interval, 1.0);
        assert_close(next.ease_factor, 2.35);
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.next_review_at, now().plus_days(1.0));
    }

    #[test]
    fn test_clamped_at_both_limits() {
        let next = schedule(&state(200.0, 3.0, 15), Quality::Excellent, now());
        assert_eq!(next.interval, 365.0);
        assert_eq!(next.ease_factor, 3.0);
        assert_eq!(next.repetitions, 16);
    }

    #[test]
    fn test_new_card_good_is_one_day() {
        let next = schedule(&state(0.0, 2.5, 0), Quality::Good, now());
        assert_eq!(next.interval, 1.0);
        assert_close(next.ease_factor, 2.55);
        assert_eq!(next.repetitions, 1);
    }

    #[test]
    fn test_second_good_is_three_days() {
        let next = schedule(&state(1.0, 2.55, 1), Quality::Good, now());
        assert_eq!(next.interval, 3.0);
    }

    #[test]
    fn test_ease_factor_floor() {
        let mut current = state(10.0, 1.4, 3);
        for _ in 0..5 {
            current = schedule(&current, Quality::Again, now());
        }
        assert_eq!(current.ease_factor, MIN_EASE_FACTOR);
        let current = schedule(&current, Quality::Hard, now());
        assert_eq!(current.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_interval_floor_after_growth() {
        // A card that regained a streak from a zero interval still waits at
        // least a day.
        let next = schedule(&state(0.0, 1.3, 2), Quality::Good, now());
        assert_eq!(next.interval, MIN_INTERVAL_DAYS);
    }

    #[test]
    fn test_invalid_quality() {
        let current = state(3.0, 2.5, 1);
        assert_eq!(next_state(&current, 4, now()), Err(InvalidQuality(4)));
        assert_eq!(next_state(&current, -1, now()), Err(InvalidQuality(-1)));
    }

    #[test]
    fn test_next_state_matches_schedule() {
        let current = state(3.0, 2.5, 1);
        assert_eq!(
            next_state(&current, 2, now()),
            Ok(schedule(&current, Quality::Good, now()))
        );
    }

    #[test]
    fn test_bounds_hold_for_every_path() {
        let qualities = [
            Quality::Again,
            Quality::Hard,
            Quality::Good,
            Quality::Excellent,
        ];
        for interval in [0.0, 1.0, 3.0, 17.0, 200.0, 365.0] {
            for ease_factor in [1.3, 1.9, 2.5, 2.95, 3.0] {
                for repetitions in [0, 1, 2, 9] {
                    for quality in qualities {
                        let before = state(interval, ease_factor, repetitions);
                        let after = schedule(&before, quality, now());
                        assert!(after.ease_factor >= MIN_EASE_FACTOR);
                        assert!(after.ease_factor <= MAX_EASE_FACTOR);
                        if after.repetitions > 0 {
                            assert!(after.interval >= MIN_INTERVAL_DAYS);
                            assert!(after.interval <= MAX_INTERVAL_DAYS);
                        }
                        if quality.is_correct() {
                            assert_eq!(after.repetitions, repetitions + 1);
                        } else {
                            assert_eq!(after.repetitions, 0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_repetitions_saturate() {
        let before = state(120.0, 2.5, u32::MAX);
        let after = schedule(&before, Quality::Excellent, now());
        assert_eq!(after.repetitions, u32::MAX);
        assert_eq!(after.interval, 300.0);
    }

    #[test]
    fn test_quality_conversions() {
        assert_eq!(Quality::try_from(3), Ok(Quality::Excellent));
        assert_eq!(Quality::Good.as_i64(), 2);
        assert_eq!(Quality::Hard.to_string(), "Hard");
        assert!(!Quality::Hard.is_correct());
        assert!(Quality::Good.is_correct());
    }
}
