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
use sentencecards_core::stats::Stats;
use sentencecards_core::types::card::Card;
use sentencecards_core::types::card_id::UserId;
use sentencecards_core::types::timestamp::Timestamp;

use crate::collection::Collection;
use crate::error::Fallible;

pub fn export_collection(coll: &Collection, now: Timestamp) -> Fallible<()> {
    let export: Export = get_export(coll, now)?;
    let json: String = serde_json::to_string_pretty(&export)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export {
    owner: UserId,
    exported_at: Timestamp,
    stats: Stats,
    cards: Vec<Card>,
}

fn get_export(coll: &Collection, now: Timestamp) -> Fallible<Export> {
    let cards: Vec<Card> = coll.db.all_cards_with_history(&coll.user)?;
    let stats = Stats::aggregate(&cards, now);
    Ok(Export {
        owner: coll.user.clone(),
        exported_at: now,
        stats,
        cards,
    })
}
