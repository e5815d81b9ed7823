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

use crate::error::InvalidQuality;
use crate::level::Level;
use crate::sm2::Quality;
use crate::sm2::SchedulingState;
use crate::sm2::schedule;
use crate::types::card::Card;
use crate::types::history::HistoryEntry;
use crate::types::history::ReviewHistory;
use crate::types::timestamp::Timestamp;

/// The outcome of reviewing a card.
#[derive(Clone, Debug)]
pub struct Reviewed {
    /// The card after the review.
    pub card: Card,
    pub quality: Quality,
    /// The scheduling state before the review.
    pub previous: SchedulingState,
    pub previous_level: Level,
    /// The history entry that was appended.
    pub entry: HistoryEntry,
}

/// Review a card at `now`, returning the updated card. The input is left
/// untouched.
pub fn apply_review(card: &Card, quality: i64, now: Timestamp) -> Result<Reviewed, InvalidQuality> {
    let quality = Quality::try_from(quality)?;
    let previous = card.scheduling;
    let scheduling = schedule(&previous, quality, now);
    let entry = HistoryEntry {
        date: now,
        quality,
        interval_before: previous.interval,
        interval_after: scheduling.interval,
    };
    let mut next = card.clone();
    next.scheduling = scheduling;
    next.review_count += 1;
    if quality.is_correct() {
        next.correct_count += 1;
    } else {
        next.wrong_count += 1;
    }
    next.history.push(entry);
    next.last_reviewed_at = Some(now);
    Ok(Reviewed {
        card: next,
        quality,
        previous,
        previous_level: card.level(),
        entry,
    })
}

/// Forget everything learned about a card. Content and the favorite flag
/// are kept.
pub fn reset(card: &Card, now: Timestamp) -> Card {
    Card {
        scheduling: SchedulingState::initial(now),
        review_count: 0,
        correct_count: 0,
        wrong_count: 0,
        history: ReviewHistory::new(),
        last_reviewed_at: None,
        ..card.clone()
    }
}
