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

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ParseError;

/// A card's mastery label, derived from its interval alone.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    New,
    Learning,
    Hard,
    Good,
    Excellent,
    Mastered,
}

/// Presentation metadata for a level.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct LevelDetails {
    pub label: Level,
    pub emoji: &'static str,
    pub color: &'static str,
}

/// Ascending `(minimum interval, level)` pairs.
const THRESHOLDS: [(f64, Level); 6] = [
    (0.0, Level::New),
    (1.0, Level::Learning),
    (4.0, Level::Hard),
    (10.0, Level::Good),
    (30.0, Level::Excellent),
    (365.0, Level::Mastered),
];

impl Level {
    pub const ALL: [Level; 6] = [
        Level::New,
        Level::Learning,
        Level::Hard,
        Level::Good,
        Level::Excellent,
        Level::Mastered,
    ];

    /// The highest level whose threshold the interval meets.
    pub fn from_interval(interval: f64) -> Self {
        THRESHOLDS
            .iter()
            .rev()
            .find(|(threshold, _)| interval >= *threshold)
            .map(|(_, level)| *level)
            .unwrap_or(Level::New)
    }

    /// The half-open range of intervals `[lower, upper)` that map to this
    /// level. `Mastered` has no upper bound.
    pub fn interval_bounds(self) -> (f64, Option<f64>) {
        let index = self.index();
        let lower = THRESHOLDS[index].0;
        let upper = THRESHOLDS.get(index + 1).map(|(threshold, _)| *threshold);
        (lower, upper)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::New => "new",
            Level::Learning => "learning",
            Level::Hard => "hard",
            Level::Good => "good",
            Level::Excellent => "excellent",
            Level::Mastered => "mastered",
        }
    }

    pub fn details(self) -> LevelDetails {
        let (emoji, color) = match self {
            Level::New => ("🆕", "#6366f1"),
            Level::Learning => ("📚", "#8b5cf6"),
            Level::Hard => ("😅", "#f59e0b"),
            Level::Good => ("👍", "#10b981"),
            Level::Excellent => ("⭐", "#3b82f6"),
            Level::Mastered => ("🏆", "#ef4444"),
        };
        LevelDetails {
            label: self,
            emoji,
            color,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Level::New => 0,
            Level::Learning => 1,
            Level::Hard => 2,
            Level::Good => 3,
            Level::Excellent => 4,
            Level::Mastered => 5,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ParseError::new(format!("invalid level '{s}'")))
    }
}
