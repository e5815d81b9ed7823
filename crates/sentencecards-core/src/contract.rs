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

//! The request/response shapes shared by every client of the scheduler.

use serde::Deserialize;
use serde::Serialize;

use crate::level::Level;
use crate::review::Reviewed;
use crate::sm2::Quality;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Raw rating; validated by the scheduler.
    pub quality: i64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Minutes,
    Hours,
    Day,
    Days,
}

/// An interval in the unit a person would use for it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct FormattedInterval {
    pub value: u32,
    pub unit: IntervalUnit,
}

pub fn format_interval(interval: f64) -> FormattedInterval {
    if interval < 0.01 {
        return FormattedInterval {
            value: 10,
            unit: IntervalUnit::Minutes,
        };
    }
    if interval < 1.0 {
        let minutes = (interval * 24.0 * 60.0).round() as u32;
        if minutes < 60 {
            return FormattedInterval {
                value: minutes,
                unit: IntervalUnit::Minutes,
            };
        }
        return FormattedInterval {
            value: (minutes as f64 / 60.0).round() as u32,
            unit: IntervalUnit::Hours,
        };
    }
    if interval == 1.0 {
        return FormattedInterval {
            value: 1,
            unit: IntervalUnit::Day,
        };
    }
    FormattedInterval {
        value: interval.round() as u32,
        unit: IntervalUnit::Days,
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousState {
    pub interval: f64,
    pub interval_formatted: FormattedInterval,
    pub ease_factor: f64,
    pub repetitions: u32,
    pub level: Level,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    pub interval: f64,
    pub interval_formatted: FormattedInterval,
    pub ease_factor: f64,
    pub repetitions: u32,
    pub next_review_at: Timestamp,
    pub level: Level,
    pub quality: Quality,
    pub quality_label: &'static str,
    pub previous: PreviousState,
}

impl From<&Reviewed> for ReviewResult {
    fn from(reviewed: &Reviewed) -> Self {
        let next = reviewed.card.scheduling;
        let previous = reviewed.previous;
        Self {
            interval: next.interval,
            interval_formatted: format_interval(next.interval),
            ease_factor: next.ease_factor,
            repetitions: next.repetitions,
            next_review_at: next.next_review_at,
            level: reviewed.card.level(),
            quality: reviewed.quality,
            quality_label: reviewed.quality.label(),
            previous: PreviousState {
                interval: previous.interval,
                interval_formatted: format_interval(previous.interval),
                ease_factor: previous.ease_factor,
                repetitions: previous.repetitions,
                level: reviewed.previous_level,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::review::apply_review;
    use crate::types::card::Card;
    use crate::types::card_id::UserId;

    #[test]
    fn test_format_interval() {
        let f = |interval| {
            let FormattedInterval { value, unit } = format_interval(interval);
            (value, unit)
        };
        assert_eq!(f(0.0), (10, IntervalUnit::Minutes));
        assert_eq!(f(0.005), (10, IntervalUnit::Minutes));
        assert_eq!(f(0.02), (29, IntervalUnit::Minutes));
        assert_eq!(f(0.5), (12, IntervalUnit::Hours));
        assert_eq!(f(1.0), (1, IntervalUnit::Day));
        assert_eq!(f(20.0), (20, IntervalUnit::Days));
        assert_eq!(f(2.6), (3, IntervalUnit::Days));
    }

    #[test]
    fn test_review_result_json() {
        let now = Timestamp::new(Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap());
        let card = Card::new(UserId::new("anna"), "Bis bald", "See you soon", now);
        let reviewed = apply_review(&card, 3, now).unwrap();
        let json = serde_json::to_value(ReviewResult::from(&reviewed)).unwrap();
        assert_eq!(json["interval"], 3.0);
        assert_eq!(json["intervalFormatted"]["unit"], "days");
        assert_eq!(json["repetitions"], 1);
        assert_eq!(json["level"], "learning");
        assert_eq!(json["quality"], 3);
        assert_eq!(json["qualityLabel"], "Excellent");
        assert_eq!(json["nextReviewAt"], "2025-07-04T09:00:00.000Z");
        assert_eq!(json["previous"]["level"], "new");
        assert_eq!(json["previous"]["intervalFormatted"]["value"], 10);
    }

    #[test]
    fn test_review_request_json() {
        let request: ReviewRequest = serde_json::from_str(r#"{"quality": 2}"#).unwrap();
        assert_eq!(request.quality, 2);
    }
}
