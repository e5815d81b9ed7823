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

use serde::Serialize;

use crate::level::Level;
use crate::level::LevelDetails;
use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

/// What the aggregator needs to know about a card.
pub trait Reviewable {
    fn interval(&self) -> f64;
    fn review_count(&self) -> u32;
    fn correct_count(&self) -> u32;
    fn next_review_at(&self) -> Timestamp;
}

impl Reviewable for Card {
    fn interval(&self) -> f64 {
        self.scheduling.interval
    }

    fn review_count(&self) -> u32 {
        self.review_count
    }

    fn correct_count(&self) -> u32 {
        self.correct_count
    }

    fn next_review_at(&self) -> Timestamp {
        self.scheduling.next_review_at
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
pub struct LevelCounts {
    pub new: usize,
    pub learning: usize,
    pub hard: usize,
    pub good: usize,
    pub excellent: usize,
    pub mastered: usize,
}

impl LevelCounts {
    pub fn get(&self, level: Level) -> usize {
        match level {
            Level::New => self.new,
            Level::Learning => self.learning,
            Level::Hard => self.hard,
            Level::Good => self.good,
            Level::Excellent => self.excellent,
            Level::Mastered => self.mastered,
        }
    }

    fn increment(&mut self, level: Level) {
        let slot = match level {
            Level::New => &mut self.new,
            Level::Learning => &mut self.learning,
            Level::Hard => &mut self.hard,
            Level::Good => &mut self.good,
            Level::Excellent => &mut self.excellent,
            Level::Mastered => &mut self.mastered,
        };
        *slot += 1;
    }

    pub fn sum(&self) -> usize {
        Level::ALL.into_iter().map(|level| self.get(level)).sum()
    }
}

/// Aggregate statistics over one user's cards.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    #[serde(flatten)]
    pub levels: LevelCounts,
    pub due: usize,
    /// Share of excellent and mastered cards, in percent, one decimal.
    pub mastery_percentage: f64,
    pub total_reviews: u64,
    /// Share of correct reviews, in percent, one decimal.
    pub overall_accuracy: f64,
    /// Mean interval in whole days.
    pub average_interval: f64,
}

impl Stats {
    pub fn aggregate<'a, C, I>(cards: I, now: Timestamp) -> Self
    where
        C: Reviewable + 'a,
        I: IntoIterator<Item = &'a C>,
    {
        let mut total = 0;
        let mut levels = LevelCounts::default();
        let mut due = 0;
        let mut total_reviews: u64 = 0;
        let mut total_correct: u64 = 0;
        let mut total_interval = 0.0;
        for card in cards {
            total += 1;
            levels.increment(Level::from_interval(card.interval()));
            if card.next_review_at() <= now {
                due += 1;
            }
            total_reviews += card.review_count() as u64;
            total_correct += card.correct_count() as u64;
            total_interval += card.interval();
        }
        let mastery_percentage = percentage((levels.excellent + levels.mastered) as f64, total as f64);
        let overall_accuracy = percentage(total_correct as f64, total_reviews as f64);
        let average_interval = if total > 0 {
            (total_interval / total as f64).round()
        } else {
            0.0
        };
        Self {
            total,
            levels,
            due,
            mastery_percentage,
            total_reviews,
            overall_accuracy,
            average_interval,
        }
    }
}

/// `part / whole` in percent, rounded to one decimal; zero when `whole` is.
fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    (part / whole * 1000.0).round() / 10.0
}

/// Statistics about a single card, for display next to it.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStats {
    pub total_reviews: u32,
    pub correct: u32,
    pub wrong: u32,
    /// Whole percent.
    pub accuracy: u32,
    pub level: Level,
    pub level_emoji: &'static str,
    pub level_color: &'static str,
    pub interval: f64,
    pub ease_factor: f64,
    pub repetitions: u32,
    pub next_review_at: Timestamp,
    pub days_until_review: i64,
}

impl CardStats {
    pub fn of(card: &Card, now: Timestamp) -> Self {
        let accuracy = if card.review_count > 0 {
            (card.correct_count as f64 / card.review_count as f64 * 100.0).round() as u32
        } else {
            0
        };
        let LevelDetails {
            label,
            emoji,
            color,
        } = card.level().details();
        Self {
            total_reviews: card.review_count,
            correct: card.correct_count,
            wrong: card.wrong_count,
            accuracy,
            level: label,
            level_emoji: emoji,
            level_color: color,
            interval: card.scheduling.interval,
            ease_factor: card.scheduling.ease_factor,
            repetitions: card.scheduling.repetitions,
            next_review_at: card.scheduling.next_review_at,
            days_until_review: now.days_until(card.scheduling.next_review_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::review::apply_review;
    use crate::types::card_id::UserId;

    fn now() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 5, 5, 10, 0, 0).unwrap())
    }

    struct Fake {
        interval: f64,
        reviews: u32,
        correct: u32,
        due_in_days: f64,
    }

    impl Reviewable for Fake {
        fn interval(&self) -> f64 {
            self.interval
        }

        fn review_count(&self) -> u32 {
            self.reviews
        }

        fn correct_count(&self) -> u32 {
            self.correct
        }

        fn next_review_at(&self) -> Timestamp {
            now().plus_days(self.due_in_days)
        }
    }

    fn fake(interval: f64, reviews: u32, correct: u32, due_in_days: f64) -> Fake {
        Fake {
            interval,
            reviews,
            correct,
            due_in_days,
        }
    }

    #[test]
    fn test_empty_collection() {
        let cards: Vec<Fake> = Vec::new();
        let stats = Stats::aggregate(&cards, now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.due, 0);
        assert_eq!(stats.mastery_percentage, 0.0);
        assert_eq!(stats.overall_accuracy, 0.0);
        assert_eq!(stats.average_interval, 0.0);
        assert_eq!(stats.levels.sum(), 0);
    }

    #[test]
    fn test_aggregate() {
        let cards = vec![
            fake(0.0, 0, 0, 0.0),
            fake(1.0, 2, 1, 1.0),
            fake(12.0, 4, 3, -1.0),
            fake(45.0, 6, 6, 45.0),
            fake(365.0, 9, 8, 365.0),
            fake(400.0, 0, 0, 0.0),
        ];
        let stats = Stats::aggregate(&cards, now());
        assert_eq!(stats.total, 6);
        assert_eq!(stats.levels.new, 1);
        assert_eq!(stats.levels.learning, 1);
        assert_eq!(stats.levels.hard, 0);
        assert_eq!(stats.levels.good, 1);
        assert_eq!(stats.levels.excellent, 1);
        assert_eq!(stats.levels.mastered, 2);
        assert_eq!(stats.levels.sum(), stats.total);
        // Due exactly now counts as due.
        assert_eq!(stats.due, 3);
        // 3 / 6
        assert_eq!(stats.mastery_percentage, 50.0);
        assert_eq!(stats.total_reviews, 21);
        // 18 / 21 = 85.714...
        assert_eq!(stats.overall_accuracy, 85.7);
        // 823 / 6 = 137.17
        assert_eq!(stats.average_interval, 137.0);
    }

    #[test]
    fn test_mastery_rounds_to_one_decimal() {
        let cards = vec![fake(30.0, 0, 0, 1.0), fake(0.0, 0, 0, 1.0), fake(0.0, 0, 0, 1.0)];
        let stats = Stats::aggregate(&cards, now());
        assert_eq!(stats.mastery_percentage, 33.3);
        assert_eq!(stats.due, 0);
    }

    #[test]
    fn test_aggregate_real_cards() {
        let owner = UserId::new("anna");
        let fresh = Card::new(owner.clone(), "eins", "one", now());
        let reviewed = apply_review(&fresh, 3, now()).unwrap().card;
        let cards = vec![fresh, reviewed];
        let stats = Stats::aggregate(&cards, now());
        assert_eq!(stats.total, 2);
        assert_eq!(stats.due, 1);
        assert_eq!(stats.total_reviews, 1);
        assert_eq!(stats.overall_accuracy, 100.0);
    }

    #[test]
    fn test_json_field_names() {
        let cards = vec![fake(30.0, 2, 1, 0.0)];
        let json = serde_json::to_value(Stats::aggregate(&cards, now())).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["excellent"], 1);
        assert_eq!(json["masteryPercentage"], 100.0);
        assert_eq!(json["overallAccuracy"], 50.0);
        assert_eq!(json["totalReviews"], 2);
    }

    #[test]
    fn test_card_stats() {
        let card = Card::new(UserId::new("anna"), "zwei", "two", now());
        let card = apply_review(&card, 2, now()).unwrap().card;
        let card = apply_review(&card, 0, now()).unwrap().card;
        let card = apply_review(&card, 3, now()).unwrap().card;
        let stats = CardStats::of(&card, now());
        assert_eq!(stats.total_reviews, 3);
        assert_eq!(stats.correct, 2);
        assert_eq!(stats.wrong, 1);
        assert_eq!(stats.accuracy, 67);
        assert_eq!(stats.level, Level::Learning);
        assert_eq!(stats.level_emoji, "📚");
        assert_eq!(stats.days_until_review, 3);
    }
}
