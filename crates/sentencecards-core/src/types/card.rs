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

use serde::Deserialize;
use serde::Serialize;

use crate::level::Level;
use crate::sm2::SchedulingState;
use crate::types::card_id::CardId;
use crate::types::card_id::UserId;
use crate::types::history::ReviewHistory;
use crate::types::timestamp::Timestamp;

/// A sentence and its translation, with its scheduling state and review
/// statistics.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub owner: UserId,
    /// The sentence being learned.
    pub source: String,
    /// Its translation.
    pub translation: String,
    #[serde(flatten)]
    pub scheduling: SchedulingState,
    pub review_count: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    #[serde(default)]
    pub history: ReviewHistory,
    #[serde(default)]
    pub favorite: bool,
    pub last_reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Card {
    /// A fresh card, due immediately.
    pub fn new(
        owner: UserId,
        source: impl Into<String>,
        translation: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        let source = source.into();
        let id = CardId::derive(&owner, &source_key(&source), now);
        Self {
            id,
            owner,
            source,
            translation: translation.into(),
            scheduling: SchedulingState::initial(now),
            review_count: 0,
            correct_count: 0,
            wrong_count: 0,
            history: ReviewHistory::new(),
            favorite: false,
            last_reviewed_at: None,
            created_at: now,
        }
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.scheduling.next_review_at <= now
    }

    pub fn level(&self) -> Level {
        Level::from_interval(self.scheduling.interval)
    }

    /// The key under which two sentences count as duplicates.
    pub fn source_key(&self) -> String {
        source_key(&self.source)
    }
}

/// Trimmed and lowercased, so duplicates are detected case-insensitively.
pub fn source_key(source: &str) -> String {
    source.trim().to_lowercase()
}
