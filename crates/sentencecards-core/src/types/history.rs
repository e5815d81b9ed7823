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

use std::collections::VecDeque;

use serde::Deserialize;
use serde::Serialize;

use crate::sm2::Quality;
use crate::types::timestamp::Timestamp;

/// How many past reviews a card keeps.
pub const MAX_HISTORY_ENTRIES: usize = 100;

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: Timestamp,
    pub quality: Quality,
    pub interval_before: f64,
    pub interval_after: f64,
}

/// A card's most recent reviews, oldest first.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewHistory {
    entries: VecDeque<HistoryEntry>,
}

impl ReviewHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, dropping the oldest ones past the cap.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > MAX_HISTORY_ENTRIES {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

impl FromIterator<HistoryEntry> for ReviewHistory {
    fn from_iter<I: IntoIterator<Item = HistoryEntry>>(iter: I) -> Self {
        let mut history = ReviewHistory::new();
        for entry in iter {
            history.push(entry);
        }
        history
    }
}
