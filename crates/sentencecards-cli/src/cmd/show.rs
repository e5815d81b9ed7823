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
use sentencecards_core::stats::CardStats;
use sentencecards_core::types::card::Card;
use sentencecards_core::types::timestamp::Timestamp;

use crate::collection::Collection;
use crate::error::Fallible;

/// A card together with the statistics derived from it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    #[serde(flatten)]
    pub card: Card,
    pub stats: CardStats,
}

impl CardView {
    pub fn new(card: Card, now: Timestamp) -> Self {
        let stats = CardStats::of(&card, now);
        Self { card, stats }
    }
}

pub fn show_card(coll: &Collection, id: &str, now: Timestamp) -> Fallible<()> {
    let id = coll.resolve(id)?;
    let view = CardView::new(coll.card(id)?, now);
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use sentencecards_core::review::apply_review;
    use sentencecards_core::types::card_id::UserId;

    use super::*;

    #[test]
    fn test_card_view_json() -> Fallible<()> {
        let now = Timestamp::new(Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap());
        let card = Card::new(UserId::new("anna"), "Tschüss", "Bye", now);
        let card = apply_review(&card, 2, now)?.card;
        let json = serde_json::to_value(CardView::new(card, now))?;
        assert_eq!(json["source"], "Tschüss");
        assert_eq!(json["interval"], 1.0);
        assert_eq!(json["history"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["stats"]["level"], "learning");
        assert_eq!(json["stats"]["accuracy"], 100);
        assert_eq!(json["stats"]["daysUntilReview"], 1);
        Ok(())
    }
}
